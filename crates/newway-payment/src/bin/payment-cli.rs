//! Command-line driver for the configured payment provider.
//!
//! ```text
//! payment-cli form [--prefix P]                      < fields.json
//! payment-cli callback [--amount A] [--currency C]   < notification.json
//! payment-cli api <path>                             < params.json
//! ```
//!
//! Provider and credentials come from the environment (see `PaymentConfig`).

use std::io::Read;
use std::process::ExitCode;

use payment::{Fields, PaymentConfig, PaymentError, PaymentProvider, Provider};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: payment-cli <form [--prefix P] | callback [--amount A] [--currency C] | api <path>>";

enum Command {
    Form { prefix: Option<String> },
    Callback { amount: Option<String>, currency: Option<String> },
    Api { path: String },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let (name, rest) = args.split_first().ok_or_else(|| USAGE.to_string())?;
    let flag = |flag: &str| -> Result<Option<String>, String> {
        match rest.iter().position(|a| a == flag) {
            Some(i) => rest
                .get(i + 1)
                .cloned()
                .map(Some)
                .ok_or_else(|| format!("{flag} needs a value")),
            None => Ok(None),
        }
    };

    match name.as_str() {
        "form" => Ok(Command::Form {
            prefix: flag("--prefix")?,
        }),
        "callback" => Ok(Command::Callback {
            amount: flag("--amount")?,
            currency: flag("--currency")?,
        }),
        "api" => rest
            .first()
            .cloned()
            .map(|path| Command::Api { path })
            .ok_or_else(|| "api needs a <path> argument".to_string()),
        other => Err(format!("unknown command '{other}'\n{USAGE}")),
    }
}

fn read_stdin_json() -> Result<serde_json::Value, PaymentError> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| PaymentError::Config(format!("failed to read stdin: {e}")))?;
    Ok(serde_json::from_str(&input)?)
}

async fn run(command: Command, mut provider: PaymentProvider) -> Result<String, PaymentError> {
    match command {
        Command::Form { prefix } => {
            let fields = Fields::from_json(&read_stdin_json()?)?;
            provider.build_form_with_prefix(&fields, prefix.as_deref())
        }
        Command::Callback { amount, currency } => {
            let notification = Fields::from_json(&read_stdin_json()?)?;
            provider.ingest(&notification);
            provider.verify_signature()?;
            if let Some(amount) = amount {
                provider.verify_amount(&amount)?;
            }
            if let Some(currency) = currency {
                provider.verify_currency(&currency)?;
            }
            tracing::info!(provider = provider.name(), "notification verified");
            Ok(serde_json::to_string_pretty(&provider.build_acknowledgement())?)
        }
        Command::Api { path } => {
            let params = match read_stdin_json()? {
                serde_json::Value::Object(map) => map,
                _ => return Err(PaymentError::Config("expected a JSON object".to_string())),
            };
            let liqpay = provider.as_liqpay_mut().ok_or_else(|| {
                PaymentError::Config("the api command is only available for liqpay".to_string())
            })?;
            let response = liqpay.api(&path, &params).await?;
            Ok(serde_json::to_string_pretty(&response)?)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };

    let provider = match PaymentConfig::from_env().and_then(|c| c.create_provider()) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!("Failed to configure payment provider: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(command, provider).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_security_event() {
                tracing::warn!("Rejected notification: {e}");
            } else {
                tracing::error!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}

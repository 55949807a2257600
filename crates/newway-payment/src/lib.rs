//! Payment provider abstraction for Ukrainian acquirers.
//!
//! Builds signed HTML checkout forms and verifies asynchronous payment
//! notifications for Liqpay and Wayforpay behind one [`Provider`] trait.
//!
//! # Flow
//!
//! - **Checkout**: [`Provider::build_form`] validates merchant fields, signs them
//!   and renders an auto-postable form.
//! - **Callback**: [`Provider::ingest`] records the notification, then
//!   [`Provider::verify_signature`], [`Provider::verify_amount`] and
//!   [`Provider::verify_currency`] guard against forged or altered payments.
//! - **Acknowledgement**: [`Provider::build_acknowledgement`] returns the body the
//!   provider expects in reply to a notification.
//!
//! # Quick example
//!
//! ```no_run
//! use payment::{create, Fields, Provider};
//!
//! let credentials = Fields::new()
//!     .with("public_key", "YOUR_PUBLIC_KEY")
//!     .with("private_key", "YOUR_PRIVATE_KEY");
//! let provider = create("liqpay", &credentials).unwrap();
//!
//! let html = provider
//!     .build_form(
//!         &Fields::new()
//!             .with("amount", "10.00")
//!             .with("currency", "UAH")
//!             .with("description", "Order #42")
//!             .with("order_id", "42"),
//!     )
//!     .unwrap();
//! println!("{html}");
//! ```

// Core types
pub mod constants;
pub mod error;
pub mod fields;
pub mod messages;

// Validation, signing and rendering
pub mod form;
pub mod signature;
pub mod validation;

// Providers
pub mod factory;
pub mod liqpay;
pub mod provider;
pub mod wayforpay;

// Outbound API and runtime configuration
pub mod api_client;
pub mod config;

pub use api_client::ApiSettings;
pub use config::PaymentConfig;
pub use error::{HackReason, PaymentError, ValidationError};
pub use factory::{create, PaymentProvider, ProviderFactory, ProviderKind};
pub use fields::{FieldValue, Fields};
pub use liqpay::LiqpayProvider;
pub use messages::{Locale, MessageKey};
pub use provider::{Provider, TransactionData};
pub use signature::SignatureCodec;
pub use wayforpay::WayforpayProvider;

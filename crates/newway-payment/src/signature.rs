//! Signature codecs.
//!
//! Each provider signs an ordered list of field values with its secret:
//!
//! - **Liqpay**: `base64(sha1(key ‖ v1 ‖ v2 ‖ …))`, raw digest, standard alphabet
//! - **Wayforpay**: `hex(hmac_md5(key, v1;v2;…))`
//!
//! Callers pass values already canonicalised (currency alias rewritten,
//! list fields joined). Verification is constant time.

use base64::Engine;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacMd5 = Hmac<Md5>;

/// Canonical string layout and hash used by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCodec {
    Liqpay,
    Wayforpay,
}

impl SignatureCodec {
    /// The exact string that gets hashed (key excluded for Wayforpay,
    /// where it is the HMAC key instead).
    pub fn canonical_string(&self, parts: &[&str], key: &str) -> String {
        match self {
            SignatureCodec::Liqpay => {
                let len = key.len() + parts.iter().map(|p| p.len()).sum::<usize>();
                let mut s = String::with_capacity(len);
                s.push_str(key);
                parts.iter().for_each(|p| s.push_str(p));
                s
            }
            SignatureCodec::Wayforpay => parts.join(";"),
        }
    }

    pub fn compute(&self, parts: &[&str], key: &str) -> String {
        let canonical = self.canonical_string(parts, key);
        match self {
            SignatureCodec::Liqpay => sha1_base64(canonical.as_bytes()),
            SignatureCodec::Wayforpay => hmac_md5_hex(key.as_bytes(), canonical.as_bytes()),
        }
    }

    /// Constant-time equality of a received signature and a computed one.
    pub fn verify(expected: &str, computed: &str) -> bool {
        constant_time_eq(expected.as_bytes(), computed.as_bytes())
    }
}

/// Byte equality whose timing depends on neither content nor length.
///
/// Both sides are reduced to SHA-256 digests first, then compared with
/// `subtle`.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    Sha256::digest(a).ct_eq(&Sha256::digest(b)).into()
}

/// `base64(sha1(data))` over the raw 20-byte digest.
pub fn sha1_base64(data: &[u8]) -> String {
    let digest = Sha1::digest(data);
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// Hex-encoded HMAC-MD5 of `body` keyed by `secret`.
pub fn hmac_md5_hex(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacMd5::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Liqpay API request signature: `base64(sha1(private_key ‖ data ‖ private_key))`.
pub fn liqpay_api_signature(private_key: &str, data: &str) -> String {
    sha1_base64(format!("{private_key}{data}{private_key}").as_bytes())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().fold(String::new(), |mut s, b| {
            use std::fmt::Write;
            let _ = write!(s, "{b:02x}");
            s
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_base64_known_vector() {
        // sha1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d
        assert_eq!(sha1_base64(b"abc"), "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
    }

    #[test]
    fn hmac_md5_known_vector() {
        // RFC 2104 test case 2
        assert_eq!(
            hmac_md5_hex(b"Jefe", b"what do ya want for nothing?"),
            "750c783e6ab0b503eaa86e310a5db738"
        );
    }

    #[test]
    fn liqpay_layout_prefixes_key() {
        let codec = SignatureCodec::Liqpay;
        assert_eq!(codec.canonical_string(&["10", "UAH"], "priv"), "priv10UAH");
        assert_eq!(codec.compute(&["10", "UAH"], "priv"), sha1_base64(b"priv10UAH"));
    }

    #[test]
    fn wayforpay_layout_joins_with_semicolons() {
        let codec = SignatureCodec::Wayforpay;
        assert_eq!(codec.canonical_string(&["R1", "accept", "100"], "k"), "R1;accept;100");
        assert_eq!(
            codec.compute(&["R1", "accept", "100"], "secret"),
            hmac_md5_hex(b"secret", b"R1;accept;100")
        );
    }

    #[test]
    fn verify_is_exact() {
        let sig = SignatureCodec::Wayforpay.compute(&["a", "b"], "key");
        assert!(SignatureCodec::verify(&sig, &sig));
        assert!(!SignatureCodec::verify(&sig, &sig.to_uppercase()));
        assert!(!SignatureCodec::verify("", &sig));
    }

    #[test]
    fn constant_time_eq_ignores_length_differences() {
        assert!(constant_time_eq(b"c2lnbmF0dXJl", b"c2lnbmF0dXJl"));
        assert!(!constant_time_eq(b"c2lnbmF0dXJl", b"c2lnbmF0dXJm"));
        assert!(!constant_time_eq(b"short", b"much longer signature"));
        assert!(!constant_time_eq(b"", b"notempty"));
    }

    #[test]
    fn api_signature_wraps_data_with_key() {
        assert_eq!(liqpay_api_signature("k", "data"), sha1_base64(b"kdatak"));
    }
}

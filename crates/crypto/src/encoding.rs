// Path: crates/crypto/src/encoding.rs
//! Base64 (§6), used only for human-facing encodings (config files,
//! diagnostics) — never for hashing or wire bytes, which always go through
//! `sumeragi_types::codec`.

use base64::{engine::general_purpose::STANDARD, Engine};
use sumeragi_types::error::CryptoError;

pub fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn base64_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD.decode(s).map_err(|e| CryptoError::Base64Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let data = b"sumeragi core";
        let encoded = base64_encode(data);
        assert_eq!(base64_decode(&encoded).expect("decode"), data.to_vec());
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(base64_decode("not!base64!").is_err());
    }
}

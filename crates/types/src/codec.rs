// Path: crates/types/src/codec.rs
//! The single canonical codec used for hashing, storage, and the wire
//! (§6): a thin wrapper around `parity-scale-codec` so "canonical
//! serialization" names one concrete, deterministic byte format everywhere
//! it is mentioned in this specification.

use parity_scale_codec::{Decode, Encode};

pub fn to_bytes_canonical<T: Encode>(value: &T) -> Result<Vec<u8>, String> {
    Ok(value.encode())
}

pub fn from_bytes_canonical<T: Decode>(bytes: &[u8]) -> Result<T, String> {
    T::decode(&mut &bytes[..]).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let value: Vec<u32> = vec![1, 2, 3, 4];
        let bytes = to_bytes_canonical(&value).expect("encode");
        let back: Vec<u32> = from_bytes_canonical(&bytes).expect("decode");
        assert_eq!(value, back);
    }

    #[test]
    fn truncated_input_fails_to_decode() {
        let value: Vec<u32> = vec![1, 2, 3, 4];
        let mut bytes = to_bytes_canonical(&value).expect("encode");
        bytes.truncate(bytes.len() - 1);
        let result: Result<Vec<u32>, String> = from_bytes_canonical(&bytes);
        assert!(result.is_err());
    }
}

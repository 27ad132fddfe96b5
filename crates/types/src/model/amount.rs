// Path: crates/types/src/model/amount.rs
//! Fixed-point asset amounts (§3). `int_value` is conceptually a u256; this
//! codebase has no native u256 so it is represented as the big-endian bytes
//! of an unsigned 256-bit integer, with checked arithmetic implemented over
//! that byte representation directly (no external bigint dependency).

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Width, in bytes, of the fixed-point integer part. 256 bits.
pub const WIDTH: usize = 32;

/// A fixed-point amount: an unsigned 256-bit integer plus a decimal
/// precision. Two amounts are only arithmetically compatible when their
/// precisions match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Amount {
    /// Big-endian bytes of the unsigned 256-bit integer value.
    pub int_value: [u8; WIDTH],
    pub precision: u8,
}

impl Amount {
    pub const ZERO_PRECISION: u8 = 0;

    pub fn zero(precision: u8) -> Self {
        Self {
            int_value: [0u8; WIDTH],
            precision,
        }
    }

    pub fn from_u128(value: u128, precision: u8) -> Self {
        let mut buf = [0u8; WIDTH];
        buf[16..].copy_from_slice(&value.to_be_bytes());
        Self {
            int_value: buf,
            precision,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.int_value.iter().all(|b| *b == 0)
    }

    /// `(a + b) - b = a` when `a + b` does not overflow (§8).
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        if self.precision != other.precision {
            return None;
        }
        let mut result = [0u8; WIDTH];
        let mut carry = 0u16;
        for i in (0..WIDTH).rev() {
            let sum = self.int_value[i] as u16 + other.int_value[i] as u16 + carry;
            result[i] = (sum & 0xff) as u8;
            carry = sum >> 8;
        }
        if carry != 0 {
            return None; // overflow
        }
        Some(Amount {
            int_value: result,
            precision: self.precision,
        })
    }

    /// Fails iff `self < other` or the precisions mismatch (§8).
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.precision != other.precision || *self < *other {
            return None;
        }
        let mut result = [0u8; WIDTH];
        let mut borrow = 0i16;
        for i in (0..WIDTH).rev() {
            let diff = self.int_value[i] as i16 - other.int_value[i] as i16 - borrow;
            if diff < 0 {
                result[i] = (diff + 256) as u8;
                borrow = 1;
            } else {
                result[i] = diff as u8;
                borrow = 0;
            }
        }
        Some(Amount {
            int_value: result,
            precision: self.precision,
        })
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.int_value.cmp(&other.int_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_subtract_is_identity() {
        let a = Amount::from_u128(150_00, 2);
        let b = Amount::from_u128(25_00, 2);
        let sum = a.checked_add(&b).expect("no overflow");
        let back = sum.checked_sub(&b).expect("no underflow");
        assert_eq!(back, a);
    }

    #[test]
    fn subtract_fails_when_insufficient() {
        let a = Amount::from_u128(1_00, 2);
        let b = Amount::from_u128(2_00, 2);
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn subtract_fails_on_precision_mismatch() {
        let a = Amount::from_u128(100, 2);
        let b = Amount::from_u128(100, 3);
        assert!(a.checked_sub(&b).is_none());
        assert!(a.checked_add(&b).is_none());
    }

    #[test]
    fn add_overflows_at_u256_max() {
        let max = Amount {
            int_value: [0xff; WIDTH],
            precision: 0,
        };
        let one = Amount::from_u128(1, 0);
        assert!(max.checked_add(&one).is_none());
    }
}

// Path: crates/types/src/ids.rs
//! Newtypes for the fixed-size byte blobs that flow through the wire format,
//! the world state, and the Merkle repository. Keeping these distinct from
//! bare `[u8; N]` or `Vec<u8>` stops a hash from being compared against a
//! public key by accident.

use parity_scale_codec::{Decode, Encode, Error as CodecError, Input, Output};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `name@domain` — the key of an Account row.
pub type AccountId = String;
/// `name#domain` — the key of an Asset row.
pub type AssetId = String;
/// The key of a Domain row.
pub type DomainId = String;
/// The key of a Role row; also a role's display name.
pub type RoleId = String;

macro_rules! fixed_bytes_newtype {
    ($name:ident, $len:expr) => {
        // `parity-scale-codec`'s derive only has blanket array support up to
        // length 32; `Encode`/`Decode` are hand-rolled here instead so this
        // macro works uniformly for both the 32-byte and 64-byte cases.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub [u8; $len]);

        impl Encode for $name {
            fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
                dest.write(&self.0);
            }
        }

        impl Decode for $name {
            fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
                let mut buf = [0u8; $len];
                input.read(&mut buf)?;
                Ok(Self(buf))
            }
        }

        impl $name {
            pub const LEN: usize = $len;

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let mut buf = [0u8; $len];
                hex::decode_to_slice(s, &mut buf)?;
                Ok(Self(buf))
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(v: [u8; $len]) -> Self {
                Self(v)
            }
        }

        impl TryFrom<String> for $name {
            type Error = hex::FromHexError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::from_hex(&s)
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String {
                v.to_hex()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), self.to_hex())
            }
        }
    };
}

fixed_bytes_newtype!(PublicKeyBytes, 32);
fixed_bytes_newtype!(SignatureBytes, 64);
fixed_bytes_newtype!(TxHash, 32);
fixed_bytes_newtype!(MerkleRootHash, 32);

// Path: crates/crypto/src/sign.rs
//! Ed25519 signing and verification (§6), via `ed25519-dalek`.

use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signature as DalekSignature, Signer, Verifier};
use rand::rngs::OsRng;
use sumeragi_types::error::CryptoError;
use sumeragi_types::ids::{PublicKeyBytes, SignatureBytes};

/// An Ed25519 key pair. Holds the secret key in memory only as long as the
/// process needs it; this type is never logged or serialized wholesale.
pub struct Ed25519KeyPair {
    inner: Keypair,
}

impl Ed25519KeyPair {
    pub fn generate() -> Self {
        let mut rng = OsRng;
        Self {
            inner: Keypair::generate(&mut rng),
        }
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::from_bytes(secret)
            .map_err(|e| CryptoError::MalformedEncoding(e.to_string()))?;
        let public_key: PublicKey = (&secret_key).into();
        Ok(Self {
            inner: Keypair {
                secret: secret_key,
                public: public_key,
            },
        })
    }

    pub fn public_key(&self) -> PublicKeyBytes {
        PublicKeyBytes(self.inner.public.to_bytes())
    }

    pub fn to_secret_bytes(&self) -> [u8; 32] {
        self.inner.secret.to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> SignatureBytes {
        SignatureBytes(self.inner.sign(message).to_bytes())
    }
}

/// `sign(private_key, message) -> Signature` (§6). Exposed alongside
/// `Ed25519KeyPair::sign` for call sites that only hold raw secret bytes.
pub fn sign(secret: &[u8; 32], message: &[u8]) -> Result<SignatureBytes, CryptoError> {
    Ed25519KeyPair::from_secret_bytes(secret).map(|kp| kp.sign(message))
}

/// `verify(public_key, message, signature) -> Result<(), CryptoError>`
/// (§6).
pub fn verify(
    public_key: &PublicKeyBytes,
    message: &[u8],
    signature: &SignatureBytes,
) -> Result<(), CryptoError> {
    let public = PublicKey::from_bytes(&public_key.0)
        .map_err(|e| CryptoError::MalformedEncoding(e.to_string()))?;
    let sig = DalekSignature::from_bytes(&signature.0)
        .map_err(|e| CryptoError::MalformedEncoding(e.to_string()))?;
    public.verify(message, &sig).map_err(|_| {
        log::debug!("signature verification failed for key {}", hex::encode(public_key.0));
        CryptoError::InvalidSignature
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_roundtrips() {
        let kp = Ed25519KeyPair::generate();
        let message = b"commit this transaction";
        let signature = kp.sign(message);
        assert!(verify(&kp.public_key(), message, &signature).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let kp = Ed25519KeyPair::generate();
        let signature = kp.sign(b"original");
        assert_eq!(
            verify(&kp.public_key(), b"tampered", &signature),
            Err(CryptoError::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let signature = kp1.sign(b"hello");
        assert_eq!(
            verify(&kp2.public_key(), b"hello", &signature),
            Err(CryptoError::InvalidSignature)
        );
    }
}

// Path: crates/types/src/error/mod.rs
//! Error taxonomy for the Sumeragi core (§7).
//!
//! Every fallible function returns one of the enums below. Each implements
//! [`ErrorCode`] so structured logs and client-facing diagnostics carry a
//! stable identifier that survives `Display` message wording changes.

use crate::model::diagnostic::CommandDiagnostic;
use thiserror::Error;

/// Gives an error variant a stable, loggable string identifier independent
/// of its human-readable `Display` text.
pub trait ErrorCode {
    fn code(&self) -> &'static str;
}

/// Failures from the crypto pure-function contract (§6).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("signature does not verify under the declared public key")]
    InvalidSignature,
    #[error("malformed key or signature encoding: {0}")]
    MalformedEncoding(String),
    #[error("base64 decode failed: {0}")]
    Base64Decode(String),
}

impl ErrorCode for CryptoError {
    fn code(&self) -> &'static str {
        match self {
            CryptoError::InvalidSignature => "crypto.invalid_signature",
            CryptoError::MalformedEncoding(_) => "crypto.malformed_encoding",
            CryptoError::Base64Decode(_) => "crypto.base64_decode",
        }
    }
}

/// The `StatelessInvalid` family (§7): malformed payload, bad signature, bad
/// field format. Surfaced to the submitter; never enters the consensus
/// pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatelessError {
    #[error("transaction has no commands")]
    EmptyCommands,
    #[error("duplicate public key in signature set")]
    DuplicateSignature,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("malformed field {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },
}

impl ErrorCode for StatelessError {
    fn code(&self) -> &'static str {
        match self {
            StatelessError::EmptyCommands => "stateless_invalid.empty_commands",
            StatelessError::DuplicateSignature => "stateless_invalid.duplicate_signature",
            StatelessError::Crypto(_) => "stateless_invalid.crypto",
            StatelessError::MalformedField { .. } => "stateless_invalid.malformed_field",
        }
    }
}

/// The `StorageFailure` family (§7): failures reading or writing the world
/// state or Merkle repository. Fatal for the commit in progress.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("required key not found")]
    KeyNotFound,
    #[error("stored value failed to decode: {0}")]
    InvalidValue(String),
    #[error("batch apply failed: {0}")]
    BatchApplyFailed(String),
    #[error("entity already exists for this key")]
    AlreadyExists,
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            StateError::KeyNotFound => "storage_failure.key_not_found",
            StateError::InvalidValue(_) => "storage_failure.invalid_value",
            StateError::BatchApplyFailed(_) => "storage_failure.batch_apply_failed",
            StateError::AlreadyExists => "storage_failure.already_exists",
        }
    }
}

/// The `StatefulInvalid` / `PermissionDenied` family (§7): per-command
/// validation and permission failures produced by the validator (§4.2) and
/// the all-or-nothing failures produced by the executor (§4.3).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("permission denied: {0}")]
    PermissionDenied(CommandDiagnostic),
    #[error("command invalid: {0}")]
    Invalid(CommandDiagnostic),
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("precision mismatch: expected {expected}, got {got}")]
    PrecisionMismatch { expected: u8, got: u8 },
    #[error(transparent)]
    State(#[from] StateError),
}

impl ErrorCode for TransactionError {
    fn code(&self) -> &'static str {
        match self {
            TransactionError::PermissionDenied(_) => "permission_denied",
            TransactionError::Invalid(_) => "stateful_invalid.command",
            TransactionError::Overflow => "stateful_invalid.overflow",
            TransactionError::Underflow => "stateful_invalid.underflow",
            TransactionError::PrecisionMismatch { .. } => "stateful_invalid.precision_mismatch",
            TransactionError::State(e) => e.code(),
        }
    }
}

/// Errors owned by the consensus engine itself. Wraps the lower layers via
/// `#[from]` so a caller several layers up never loses the root cause.
#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("event failed stateless validation")]
    Stateless(#[from] StatelessError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error("signature in event does not verify")]
    InvalidEventSignature,
    #[error("event already carries a signature for this public key")]
    DuplicateEventSignature,
    #[error("leader-assigned order already used by a different transaction")]
    OrderConflict { order: u64 },
    #[error("round timed out before quorum was reached")]
    RoundTimeout,
    #[error("transport send/broadcast failed: {0}")]
    TransportFailure(String),
}

impl ErrorCode for ConsensusError {
    fn code(&self) -> &'static str {
        match self {
            ConsensusError::Stateless(e) => e.code(),
            ConsensusError::Transaction(e) => e.code(),
            ConsensusError::InvalidEventSignature => "consensus.invalid_event_signature",
            ConsensusError::DuplicateEventSignature => "consensus.duplicate_event_signature",
            ConsensusError::OrderConflict { .. } => "consensus.order_conflict",
            ConsensusError::RoundTimeout => "round_timeout",
            ConsensusError::TransportFailure(_) => "transport_failure",
        }
    }
}

/// Startup configuration errors (§6.1). Reserved as the one layer where
/// abort-on-error is appropriate (§9): a bad config exits the process before
/// any component is constructed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no peers configured")]
    NoPeers,
    #[error("`me` is not present in the configured peer set")]
    MeNotInPeerSet,
    #[error("panic_timeout_ms must be greater than zero")]
    ZeroPanicTimeout,
    #[error("failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::NoPeers => "config.no_peers",
            ConfigError::MeNotInPeerSet => "config.me_not_in_peer_set",
            ConfigError::ZeroPanicTimeout => "config.zero_panic_timeout",
            ConfigError::ParseFailed(_) => "config.parse_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable_strings() {
        assert_eq!(StateError::KeyNotFound.code(), "storage_failure.key_not_found");
        assert_eq!(
            TransactionError::Overflow.code(),
            "stateful_invalid.overflow"
        );
        let wrapped: TransactionError = StateError::AlreadyExists.into();
        assert_eq!(wrapped.code(), "storage_failure.already_exists");
    }
}

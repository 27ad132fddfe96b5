// Path: crates/types/src/model/transaction.rs
//! The transaction model (§3) and the canonical wire payloads (§6).

use crate::codec::to_bytes_canonical;
use crate::ids::{PublicKeyBytes, SignatureBytes};
use crate::model::command::Command;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct TxSignature {
    pub public_key: PublicKeyBytes,
    pub signature: SignatureBytes,
}

/// A transaction is immutable once hashed (§3): nothing on this type
/// mutates the creator, timestamp, or command list after construction.
#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct Transaction {
    pub creator_public_key: PublicKeyBytes,
    /// Unix milliseconds; must be monotonically increasing per creator.
    pub created_time: u64,
    pub commands: Vec<Command>,
    pub tx_signatures: Vec<TxSignature>,
}

impl Transaction {
    pub fn new(creator_public_key: PublicKeyBytes, created_time: u64, commands: Vec<Command>) -> Self {
        Self {
            creator_public_key,
            created_time,
            commands,
            tx_signatures: Vec::new(),
        }
    }

    /// The exact byte sequence the hash (§3) and every signature (§6) are
    /// computed over: the canonical serialization of
    /// `(creator, timestamp, commands)`, deliberately excluding
    /// `tx_signatures` so a signature never signs itself.
    pub fn signing_payload(&self) -> Vec<u8> {
        let payload = (&self.creator_public_key, self.created_time, &self.commands);
        // `to_bytes_canonical` only fails on a logic error (encoding a type
        // that has none), never on this concrete, always-encodable tuple.
        to_bytes_canonical(&payload).unwrap_or_default()
    }
}

/// `ConsensusEvent::status` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum ConsensusEventStatus {
    Uncommitted = 0,
    Committed = 1,
}

/// A carrier around a transaction during consensus (§3).
#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct ConsensusEvent {
    pub transaction: Transaction,
    pub event_signatures: Vec<TxSignature>,
    pub status: ConsensusEventStatus,
    pub order: u64,
}

impl ConsensusEvent {
    pub fn new_uncommitted(transaction: Transaction) -> Self {
        Self {
            transaction,
            event_signatures: Vec::new(),
            status: ConsensusEventStatus::Uncommitted,
            order: 0,
        }
    }

    /// No duplicate public key in `event_signatures` (§3 invariant).
    pub fn has_signature_from(&self, public_key: &PublicKeyBytes) -> bool {
        self.event_signatures.iter().any(|s| &s.public_key == public_key)
    }
}

/// Sent by the proxy tail at commit (§6).
#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct BlockCommit {
    pub consensus_event: ConsensusEvent,
    pub merkle_root_hash: crate::ids::MerkleRootHash,
    pub merkle_root_signatures: Vec<TxSignature>,
}

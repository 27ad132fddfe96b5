// Path: crates/types/src/model/status.rs
//! The transaction terminal-status graph (§7).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalStatus {
    NotReceived,
    StatelessValid,
    StatelessFailed,
    StatefulValid,
    StatefulFailed,
    MstPending,
    EnoughSignaturesCollected,
    Committed,
    MstExpired,
}

impl TerminalStatus {
    /// `COMMITTED`, `*_FAILED`, `NOT_RECEIVED`, and `MST_EXPIRED` are
    /// terminal (§7); the rest are transient pipeline states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TerminalStatus::NotReceived
                | TerminalStatus::StatelessFailed
                | TerminalStatus::StatefulFailed
                | TerminalStatus::Committed
                | TerminalStatus::MstExpired
        )
    }

    /// Logging/diagnostics only; never used for control flow.
    pub fn describe(&self) -> &'static str {
        match self {
            TerminalStatus::NotReceived => "not received",
            TerminalStatus::StatelessValid => "stateless valid",
            TerminalStatus::StatelessFailed => "stateless failed",
            TerminalStatus::StatefulValid => "stateful valid",
            TerminalStatus::StatefulFailed => "stateful failed",
            TerminalStatus::MstPending => "multi-signature pending",
            TerminalStatus::EnoughSignaturesCollected => "enough signatures collected",
            TerminalStatus::Committed => "committed",
            TerminalStatus::MstExpired => "multi-signature expired",
        }
    }
}

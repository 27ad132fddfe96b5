// Path: crates/types/src/model/diagnostic.rs
//! Diagnostic payload attached to rejected transactions (§3.1) so a client
//! can see which command failed and, where applicable, which permission was
//! missing — required for TESTABLE PROPERTIES scenario 6 (§8).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDiagnostic {
    /// Index of the offending command within the transaction's command list.
    pub command_index: usize,
    /// The single permission that was missing, when the rejection is a
    /// subset violation (e.g. `AppendRole`, `GrantPermission`).
    pub missing_permission: Option<String>,
    /// Human-readable reason, never used for control flow.
    pub reason: String,
}

impl CommandDiagnostic {
    pub fn new(command_index: usize, reason: impl Into<String>) -> Self {
        Self {
            command_index,
            missing_permission: None,
            reason: reason.into(),
        }
    }

    pub fn missing_permission(command_index: usize, permission: impl Into<String>) -> Self {
        let permission = permission.into();
        Self {
            command_index,
            reason: format!("missing permission `{permission}`"),
            missing_permission: Some(permission),
        }
    }
}

impl fmt::Display for CommandDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command[{}]: {}", self.command_index, self.reason)
    }
}

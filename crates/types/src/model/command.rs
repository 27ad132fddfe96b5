// Path: crates/types/src/model/command.rs
//! The command sum type (§3). The original source models commands as a
//! class hierarchy with a `ValueT` discriminant over a manually tagged
//! union of pointers; here it is a single exhaustively-matched enum, so
//! dispatch is a `match` rather than virtual dispatch and there is no
//! per-command heap allocation beyond what the variant's own fields need
//! (§9).

use crate::ids::{AccountId, AssetId, DomainId, PublicKeyBytes, RoleId};
use crate::model::amount::Amount;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub enum Command {
    AddAssetQuantity {
        asset_id: AssetId,
        amount: Amount,
    },
    SubtractAssetQuantity {
        asset_id: AssetId,
        amount: Amount,
    },
    TransferAsset {
        src_account: AccountId,
        dst_account: AccountId,
        asset_id: AssetId,
        amount: Amount,
        description: String,
    },
    CreateAccount {
        name: String,
        domain_id: DomainId,
        public_key: PublicKeyBytes,
    },
    SetAccountDetail {
        account_id: AccountId,
        key: String,
        value: String,
    },
    SetQuorum {
        account_id: AccountId,
        quorum: u8,
    },
    AddSignatory {
        account_id: AccountId,
        public_key: PublicKeyBytes,
    },
    RemoveSignatory {
        account_id: AccountId,
        public_key: PublicKeyBytes,
    },
    CreateAsset {
        name: String,
        domain_id: DomainId,
        precision: u8,
    },
    CreateDomain {
        domain_id: DomainId,
        default_role: RoleId,
    },
    CreateRole {
        name: RoleId,
        role_permissions_set: BTreeSet<String>,
    },
    AppendRole {
        account_id: AccountId,
        role: RoleId,
    },
    DetachRole {
        account_id: AccountId,
        role: RoleId,
    },
    GrantPermission {
        account_id: AccountId,
        grantable_permission: String,
    },
    RevokePermission {
        account_id: AccountId,
        grantable_permission: String,
    },
    AddPeer {
        address: String,
        public_key: PublicKeyBytes,
    },
}

impl Command {
    /// Stable, `snake_case` kind name used in logs and role-permission
    /// lookups (e.g. a role permission string is the command kind).
    pub fn kind(&self) -> &'static str {
        match self {
            Command::AddAssetQuantity { .. } => "add_asset_qty",
            Command::SubtractAssetQuantity { .. } => "subtract_asset_qty",
            Command::TransferAsset { .. } => "transfer_asset",
            Command::CreateAccount { .. } => "create_account",
            Command::SetAccountDetail { .. } => "set_account_detail",
            Command::SetQuorum { .. } => "set_quorum",
            Command::AddSignatory { .. } => "add_signatory",
            Command::RemoveSignatory { .. } => "remove_signatory",
            Command::CreateAsset { .. } => "create_asset",
            Command::CreateDomain { .. } => "create_domain",
            Command::CreateRole { .. } => "create_role",
            Command::AppendRole { .. } => "append_role",
            Command::DetachRole { .. } => "detach_role",
            Command::GrantPermission { .. } => "grant_permission",
            Command::RevokePermission { .. } => "revoke_permission",
            Command::AddPeer { .. } => "add_peer",
        }
    }
}

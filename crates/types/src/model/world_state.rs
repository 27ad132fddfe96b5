// Path: crates/types/src/model/world_state.rs
//! World-state entity records (§3). The world state owns these exclusively;
//! they are created by their corresponding `Create*` command and mutated
//! only by executor operations (§4.3).

use crate::ids::{AccountId, AssetId, DomainId, PublicKeyBytes, RoleId};
use crate::model::amount::Amount;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub domain_id: DomainId,
    /// 1 <= quorum <= 9 (§3 invariant).
    pub quorum: u8,
    pub json_data: String,
    /// Non-empty (§3 invariant): signatory count >= quorum.
    pub signatories: BTreeSet<PublicKeyBytes>,
    pub roles: BTreeSet<RoleId>,
}

impl Account {
    pub fn new(account_id: AccountId, domain_id: DomainId, default_role: RoleId) -> Self {
        let mut roles = BTreeSet::new();
        roles.insert(default_role);
        Self {
            account_id,
            domain_id,
            quorum: 1,
            json_data: "{}".to_string(),
            signatories: BTreeSet::new(),
            roles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    pub domain_id: DomainId,
    /// <= 255 (§3 invariant).
    pub precision: u8,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct Domain {
    pub domain_id: DomainId,
    pub default_role: RoleId,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct Role {
    pub role_name: RoleId,
    pub role_permission_set: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct AccountAsset {
    pub account_id: AccountId,
    pub asset_id: AssetId,
    /// `balance.precision == asset.precision`; `balance >= 0` (§3 invariant).
    pub balance: Amount,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct AccountSignatory {
    pub account_id: AccountId,
    pub public_key: PublicKeyBytes,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct AccountGrantable {
    pub grantee: AccountId,
    pub grantor: AccountId,
    pub permission: String,
}

/// Helper carried alongside Account rows so the validator (§4.2) can ask
/// "does this account have role permission P, directly or via a role" and
/// "what grantable permissions has account A granted to account B" without
/// re-deriving the answer from individual Role rows on every check.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    pub permissions_by_role: BTreeMap<RoleId, BTreeSet<String>>,
}

impl RoleCatalog {
    /// Union of permissions across every role the account currently holds.
    pub fn permissions_for(&self, account: &Account) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for role in &account.roles {
            if let Some(perms) = self.permissions_by_role.get(role) {
                out.extend(perms.iter().cloned());
            }
        }
        out
    }
}

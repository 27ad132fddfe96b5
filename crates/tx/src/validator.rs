// Path: crates/tx/src/validator.rs
//! `hasPermissions` and `isValid` (§4.2): the two gates a command must pass
//! before the executor runs it. Both read the world state but never mutate
//! it, and are unit-tested directly against `InMemoryState` fixtures.

use crate::rows;
use async_trait::async_trait;
use std::collections::BTreeSet;
use sumeragi_api::state::StateAccess;
use sumeragi_api::validator::Validator;
use sumeragi_types::error::TransactionError;
use sumeragi_types::ids::PublicKeyBytes;
use sumeragi_types::model::{Account, Command, CommandDiagnostic};

pub struct CommandValidator {
    state: std::sync::Arc<dyn StateAccess>,
}

impl CommandValidator {
    pub fn new(state: std::sync::Arc<dyn StateAccess>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Validator for CommandValidator {
    async fn validate_all(&self, commands: &[Command], creator: &PublicKeyBytes) -> Result<(), TransactionError> {
        let creator_id = rows::find_account_by_signatory(self.state.as_ref(), creator)
            .map_err(TransactionError::from)?
            .ok_or_else(|| TransactionError::Invalid(CommandDiagnostic::new(0, "creator account not found")))?;

        for (index, command) in commands.iter().enumerate() {
            if let Some(missing) = has_permissions(self.state.as_ref(), command, &creator_id).map_err(TransactionError::from)? {
                tracing::warn!(target: "sumeragi::tx", event = "permission_denied", creator = %creator_id, missing = %missing, index);
                return Err(TransactionError::PermissionDenied(CommandDiagnostic::missing_permission(
                    index, missing,
                )));
            }
            is_valid(self.state.as_ref(), command, &creator_id).map_err(|reason| {
                TransactionError::Invalid(CommandDiagnostic::new(index, reason))
            })?;
        }
        Ok(())
    }
}

fn effective_permissions(state: &dyn StateAccess, account: &Account) -> Result<BTreeSet<String>, sumeragi_types::error::StateError> {
    Ok(rows::load_role_catalog(state)?.permissions_for(account))
}

/// `hasPermissions(cmd, creator)` (§4.2 table). Returns the missing
/// permission name when denied, `None` when granted.
pub fn has_permissions(
    state: &dyn StateAccess,
    cmd: &Command,
    creator_id: &str,
) -> Result<Option<String>, sumeragi_types::error::StateError> {
    let creator_account = rows::get_account(state, creator_id)?;
    let creator_perms = match &creator_account {
        Some(account) => effective_permissions(state, account)?,
        None => BTreeSet::new(),
    };

    let denied = |permission: &str| Some(permission.to_string());

    Ok(match cmd {
        Command::AddAssetQuantity { .. } => required_role(&creator_perms, "add_asset_qty"),
        Command::SubtractAssetQuantity { .. } => required_role(&creator_perms, "subtract_asset_qty"),

        Command::AddSignatory { account_id, .. } => {
            own_or_grantable(state, &creator_perms, creator_id, account_id, "add_signatory", "add_my_signatory")?
        }
        Command::RemoveSignatory { account_id, .. } => own_or_grantable(
            state,
            &creator_perms,
            creator_id,
            account_id,
            "remove_signatory",
            "remove_my_signatory",
        )?,
        Command::SetQuorum { account_id, .. } => {
            own_or_grantable(state, &creator_perms, creator_id, account_id, "set_quorum", "set_my_quorum")?
        }
        Command::SetAccountDetail { account_id, .. } => {
            own_or_grantable(state, &creator_perms, creator_id, account_id, "set_detail", "set_my_account_detail")?
        }

        Command::TransferAsset { src_account, dst_account, .. } => {
            let dst_account_row = rows::get_account(state, dst_account)?;
            let dst_perms = match &dst_account_row {
                Some(account) => effective_permissions(state, account)?,
                None => BTreeSet::new(),
            };
            if !dst_perms.contains("can_receive") {
                denied("can_receive")
            } else if src_account == creator_id && creator_perms.contains("transfer") {
                None
            } else if rows::has_grantable(state, creator_id, src_account, "transfer_my_assets")? {
                None
            } else {
                denied("transfer_my_assets")
            }
        }

        Command::AddPeer { .. } => required_role(&creator_perms, "add_peer"),
        Command::CreateAccount { .. } => required_role(&creator_perms, "create_account"),
        Command::CreateAsset { .. } => required_role(&creator_perms, "create_asset"),
        Command::CreateDomain { .. } => required_role(&creator_perms, "create_domain"),
        Command::CreateRole { .. } => required_role(&creator_perms, "create_role"),
        Command::DetachRole { .. } => required_role(&creator_perms, "detach_role"),
        Command::AppendRole { .. } => required_role(&creator_perms, "append_role"),

        Command::GrantPermission { grantable_permission, .. } => {
            if creator_perms.contains(grantable_permission) {
                None
            } else {
                denied(grantable_permission)
            }
        }
        Command::RevokePermission { account_id, grantable_permission } => {
            if rows::has_grantable(state, account_id, creator_id, grantable_permission)? {
                None
            } else {
                denied(grantable_permission)
            }
        }
    })
}

fn required_role(perms: &BTreeSet<String>, permission: &str) -> Option<String> {
    if perms.contains(permission) {
        None
    } else {
        Some(permission.to_string())
    }
}

fn own_or_grantable(
    state: &dyn StateAccess,
    creator_perms: &BTreeSet<String>,
    creator_id: &str,
    target_account: &str,
    own_permission: &str,
    grantable_permission: &str,
) -> Result<Option<String>, sumeragi_types::error::StateError> {
    if target_account == creator_id && creator_perms.contains(own_permission) {
        return Ok(None);
    }
    if rows::has_grantable(state, creator_id, target_account, grantable_permission)? {
        return Ok(None);
    }
    Ok(Some(grantable_permission.to_string()))
}

/// `isValid(cmd)` (§4.2). Returns `Err(reason)` on rejection.
pub fn is_valid(state: &dyn StateAccess, cmd: &Command, creator_id: &str) -> Result<(), String> {
    let state_err = |e: sumeragi_types::error::StateError| e.to_string();
    match cmd {
        Command::AppendRole { role, .. } => {
            let role_row = rows::get_role(state, role).map_err(state_err)?.ok_or("role does not exist")?;
            let creator_account = rows::get_account(state, creator_id)
                .map_err(state_err)?
                .ok_or("creator account not found")?;
            let creator_perms = effective_permissions(state, &creator_account).map_err(state_err)?;
            if !role_row.role_permission_set.is_subset(&creator_perms) {
                return Err("role permissions are not a subset of the creator's permissions".into());
            }
            Ok(())
        }
        Command::CreateRole { role_permissions_set, .. } => {
            let creator_account = rows::get_account(state, creator_id)
                .map_err(state_err)?
                .ok_or("creator account not found")?;
            let creator_perms = effective_permissions(state, &creator_account).map_err(state_err)?;
            if !role_permissions_set.is_subset(&creator_perms) {
                return Err("new role grants a permission the creator does not hold".into());
            }
            Ok(())
        }
        Command::RemoveSignatory { account_id, .. } => {
            let account = rows::get_account(state, account_id).map_err(state_err)?.ok_or("account does not exist")?;
            if (account.signatories.len() as i64 - 1) < account.quorum as i64 {
                return Err("removing this signatory would drop below the account's quorum".into());
            }
            Ok(())
        }
        Command::SetQuorum { account_id, quorum } => {
            let account = rows::get_account(state, account_id).map_err(state_err)?.ok_or("account does not exist")?;
            if !(1..=9).contains(quorum) {
                return Err("quorum must be between 1 and 9".into());
            }
            if (account.signatories.len() as u8) < *quorum {
                return Err("not enough signatories to support the requested quorum".into());
            }
            Ok(())
        }
        Command::TransferAsset { src_account, dst_account, asset_id, amount, .. } => {
            let asset = rows::get_asset(state, asset_id).map_err(state_err)?.ok_or("asset does not exist")?;
            if amount.precision > asset.precision {
                return Err("amount precision exceeds the asset's declared precision".into());
            }
            rows::get_account(state, dst_account).map_err(state_err)?.ok_or("destination account does not exist")?;
            let src_wallet = rows::get_account_asset(state, src_account, asset_id)
                .map_err(state_err)?
                .ok_or("source account does not hold this asset")?;
            if src_wallet.balance < *amount {
                return Err("insufficient balance".into());
            }
            Ok(())
        }
        Command::AddAssetQuantity { asset_id, amount } => {
            let asset = rows::get_asset(state, asset_id).map_err(state_err)?.ok_or("asset does not exist")?;
            if amount.precision > asset.precision {
                return Err("amount precision exceeds the asset's declared precision".into());
            }
            if amount.is_zero() {
                return Err("amount must be greater than zero".into());
            }
            Ok(())
        }
        Command::SubtractAssetQuantity { asset_id, amount } => {
            let asset = rows::get_asset(state, asset_id).map_err(state_err)?.ok_or("asset does not exist")?;
            if amount.precision > asset.precision {
                return Err("amount precision exceeds the asset's declared precision".into());
            }
            if amount.is_zero() {
                return Err("amount must be greater than zero".into());
            }
            let wallet = rows::get_account_asset(state, creator_id, asset_id)
                .map_err(state_err)?
                .ok_or("source account does not hold this asset")?;
            if wallet.balance < *amount {
                return Err("insufficient balance".into());
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumeragi_api::memory_state::InMemoryState;
    use sumeragi_types::model::{Amount, AccountAsset, Asset, Role};
    use std::sync::Arc;

    fn setup_account(state: &dyn StateAccess, account_id: &str, domain: &str, pk: PublicKeyBytes, roles: &[&str]) {
        let mut account = Account::new(account_id.to_string(), domain.to_string(), "user".to_string());
        account.signatories.insert(pk);
        for r in roles {
            account.roles.insert(r.to_string());
        }
        rows::put_account(state, &account).expect("put account");
        rows::put_signatory(state, account_id, &pk).expect("put signatory");
    }

    fn setup_role(state: &dyn StateAccess, name: &str, perms: &[&str]) {
        rows::put_role(
            state,
            &Role {
                role_name: name.to_string(),
                role_permission_set: perms.iter().map(|s| s.to_string()).collect(),
            },
        )
        .expect("put role");
    }

    #[test]
    fn transfer_happy_path_permission_and_validity_pass() {
        let state: Arc<dyn StateAccess> = Arc::new(InMemoryState::new());
        setup_role(state.as_ref(), "sender", &["transfer"]);
        setup_role(state.as_ref(), "receiver", &["can_receive"]);
        setup_account(state.as_ref(), "alice@x", "x", PublicKeyBytes([1; 32]), &["sender"]);
        setup_account(state.as_ref(), "bob@x", "x", PublicKeyBytes([2; 32]), &["receiver"]);
        rows::put_asset(
            state.as_ref(),
            &Asset {
                asset_id: "coin#x".into(),
                domain_id: "x".into(),
                precision: 2,
            },
        )
        .expect("put asset");
        rows::put_account_asset(
            state.as_ref(),
            &AccountAsset {
                account_id: "alice@x".into(),
                asset_id: "coin#x".into(),
                balance: Amount::from_u128(150_00, 2),
            },
        )
        .expect("put wallet");

        let cmd = Command::TransferAsset {
            src_account: "alice@x".into(),
            dst_account: "bob@x".into(),
            asset_id: "coin#x".into(),
            amount: Amount::from_u128(150_00, 2),
            description: String::new(),
        };

        assert_eq!(has_permissions(state.as_ref(), &cmd, "alice@x").expect("perm check"), None);
        assert!(is_valid(state.as_ref(), &cmd, "alice@x").is_ok());
    }

    #[test]
    fn remove_signatory_below_quorum_is_invalid() {
        let state: Arc<dyn StateAccess> = Arc::new(InMemoryState::new());
        let mut account = Account::new("alice@x".into(), "x".into(), "user".into());
        account.quorum = 2;
        account.signatories.insert(PublicKeyBytes([1; 32]));
        account.signatories.insert(PublicKeyBytes([2; 32]));
        rows::put_account(state.as_ref(), &account).expect("put account");

        let cmd = Command::RemoveSignatory {
            account_id: "alice@x".into(),
            public_key: PublicKeyBytes([1; 32]),
        };
        assert!(is_valid(state.as_ref(), &cmd, "alice@x").is_err());
    }

    #[test]
    fn append_role_subset_violation_is_invalid() {
        let state: Arc<dyn StateAccess> = Arc::new(InMemoryState::new());
        setup_role(state.as_ref(), "limited", &["add_peer"]);
        setup_account(state.as_ref(), "alice@x", "x", PublicKeyBytes([1; 32]), &["limited"]);
        setup_role(state.as_ref(), "wide", &["add_peer", "create_role"]);

        let cmd = Command::AppendRole {
            account_id: "bob@x".into(),
            role: "wide".into(),
        };
        let err = is_valid(state.as_ref(), &cmd, "alice@x").expect_err("should reject");
        assert!(err.contains("subset"));
    }
}

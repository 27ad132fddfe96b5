// Path: crates/tx/src/executor.rs
//! Command execution (§4.3): a total, deterministic function per command
//! kind over the world state, run against a [`StagedWrite`] so the whole
//! transaction commits all-or-nothing.

use crate::rows;
use crate::staged::{StagedView, StagedWrite};
use async_trait::async_trait;
use std::sync::Arc;
use sumeragi_api::executor::Executor;
use sumeragi_api::peer_directory::PeerDirectory;
use sumeragi_api::state::StateAccess;
use sumeragi_types::error::TransactionError;
use sumeragi_types::ids::PublicKeyBytes;
use sumeragi_types::model::{Account, AccountAsset, Amount, Command, CommandDiagnostic, Peer};

pub struct CommandExecutor {
    state: Arc<dyn StateAccess>,
    peer_directory: Option<Arc<PeerDirectory>>,
}

impl CommandExecutor {
    pub fn new(state: Arc<dyn StateAccess>) -> Self {
        Self {
            state,
            peer_directory: None,
        }
    }

    pub fn with_peer_directory(state: Arc<dyn StateAccess>, peer_directory: Arc<PeerDirectory>) -> Self {
        Self {
            state,
            peer_directory: Some(peer_directory),
        }
    }
}

#[async_trait]
impl Executor for CommandExecutor {
    async fn execute_all(&self, commands: &[Command], creator: &PublicKeyBytes) -> Result<(), TransactionError> {
        let creator_id = rows::find_account_by_signatory(self.state.as_ref(), creator)?
            .ok_or_else(|| TransactionError::Invalid(CommandDiagnostic::new(0, "creator account not found")))?;

        let mut staged = StagedWrite::new(self.state.as_ref());
        {
            let view = StagedView::new(&mut staged);
            for (index, command) in commands.iter().enumerate() {
                execute_one(&view, &creator_id, command)
                    .map_err(|reason| TransactionError::Invalid(CommandDiagnostic::new(index, reason)))?;
            }
        }
        staged.commit()?;

        for command in commands {
            if let Command::AddPeer { address, public_key } = command {
                if let Some(directory) = &self.peer_directory {
                    directory.add_peer(Peer::new(*public_key, address.clone()));
                    tracing::info!(target: "sumeragi::tx", event = "peer_added", peer = %public_key, address = %address);
                }
            }
        }

        Ok(())
    }
}

/// Runs one command against a staged view. Returns a human-readable reason
/// on failure; the caller attaches the command's index.
fn execute_one(state: &dyn StateAccess, creator_id: &str, command: &Command) -> Result<(), String> {
    let state_err = |e: sumeragi_types::error::StateError| e.to_string();
    match command {
        Command::AddAssetQuantity { asset_id, amount } => {
            match rows::get_account_asset(state, creator_id, asset_id).map_err(state_err)? {
                Some(mut wallet) => {
                    wallet.balance = wallet.balance.checked_add(amount).ok_or("arithmetic overflow")?;
                    rows::put_account_asset(state, &wallet).map_err(state_err)?;
                }
                None => {
                    rows::put_account_asset(
                        state,
                        &AccountAsset {
                            account_id: creator_id.to_string(),
                            asset_id: asset_id.clone(),
                            balance: *amount,
                        },
                    )
                    .map_err(state_err)?;
                }
            }
            Ok(())
        }
        Command::SubtractAssetQuantity { asset_id, amount } => {
            let mut wallet = rows::get_account_asset(state, creator_id, asset_id)
                .map_err(state_err)?
                .ok_or("no wallet to subtract from")?;
            wallet.balance = wallet.balance.checked_sub(amount).ok_or("arithmetic underflow")?;
            rows::put_account_asset(state, &wallet).map_err(state_err)?;
            Ok(())
        }
        Command::TransferAsset { src_account, dst_account, asset_id, amount, .. } => {
            let mut src_wallet = rows::get_account_asset(state, src_account, asset_id)
                .map_err(state_err)?
                .ok_or("source account does not hold this asset")?;
            src_wallet.balance = src_wallet.balance.checked_sub(amount).ok_or("arithmetic underflow")?;

            let mut dst_wallet = match rows::get_account_asset(state, dst_account, asset_id).map_err(state_err)? {
                Some(wallet) => wallet,
                None => AccountAsset {
                    account_id: dst_account.clone(),
                    asset_id: asset_id.clone(),
                    balance: Amount::zero(amount.precision),
                },
            };
            dst_wallet.balance = dst_wallet.balance.checked_add(amount).ok_or("arithmetic overflow")?;

            rows::put_account_asset(state, &src_wallet).map_err(state_err)?;
            rows::put_account_asset(state, &dst_wallet).map_err(state_err)?;
            Ok(())
        }
        Command::CreateAccount { name, domain_id, public_key } => {
            let account_id = format!("{name}@{domain_id}");
            let default_role = rows::get_domain(state, domain_id)
                .map_err(state_err)?
                .map(|domain| domain.default_role)
                .unwrap_or_else(|| "user".to_string());
            let mut account = Account::new(account_id.clone(), domain_id.clone(), default_role);
            account.signatories.insert(*public_key);
            rows::put_signatory(state, &account_id, public_key).map_err(state_err)?;
            rows::put_account(state, &account).map_err(state_err)?;
            Ok(())
        }
        Command::SetAccountDetail { account_id, key, value } => {
            let mut account = rows::get_account(state, account_id).map_err(state_err)?.ok_or("account does not exist")?;
            set_json_detail(&mut account.json_data, creator_id, key, value);
            rows::put_account(state, &account).map_err(state_err)?;
            Ok(())
        }
        Command::SetQuorum { account_id, quorum } => {
            let mut account = rows::get_account(state, account_id).map_err(state_err)?.ok_or("account does not exist")?;
            account.quorum = *quorum;
            rows::put_account(state, &account).map_err(state_err)?;
            Ok(())
        }
        Command::AddSignatory { account_id, public_key } => {
            let mut account = rows::get_account(state, account_id).map_err(state_err)?.ok_or("account does not exist")?;
            account.signatories.insert(*public_key);
            rows::put_signatory(state, account_id, public_key).map_err(state_err)?;
            rows::put_account(state, &account).map_err(state_err)?;
            Ok(())
        }
        Command::RemoveSignatory { account_id, public_key } => {
            let mut account = rows::get_account(state, account_id).map_err(state_err)?.ok_or("account does not exist")?;
            account.signatories.remove(public_key);
            rows::delete_signatory(state, account_id, public_key).map_err(state_err)?;
            rows::put_account(state, &account).map_err(state_err)?;
            Ok(())
        }
        Command::CreateAsset { name, domain_id, precision } => {
            rows::put_asset(
                state,
                &sumeragi_types::model::Asset {
                    asset_id: format!("{name}#{domain_id}"),
                    domain_id: domain_id.clone(),
                    precision: *precision,
                },
            )
            .map_err(state_err)?;
            Ok(())
        }
        Command::CreateDomain { domain_id, default_role } => {
            rows::put_domain(
                state,
                &sumeragi_types::model::Domain {
                    domain_id: domain_id.clone(),
                    default_role: default_role.clone(),
                },
            )
            .map_err(state_err)?;
            Ok(())
        }
        Command::CreateRole { name, role_permissions_set } => {
            rows::put_role(
                state,
                &sumeragi_types::model::Role {
                    role_name: name.clone(),
                    role_permission_set: role_permissions_set.clone(),
                },
            )
            .map_err(state_err)?;
            Ok(())
        }
        Command::AppendRole { account_id, role } => {
            let mut account = rows::get_account(state, account_id).map_err(state_err)?.ok_or("account does not exist")?;
            account.roles.insert(role.clone());
            rows::put_account(state, &account).map_err(state_err)?;
            Ok(())
        }
        Command::DetachRole { account_id, role } => {
            let mut account = rows::get_account(state, account_id).map_err(state_err)?.ok_or("account does not exist")?;
            account.roles.remove(role);
            rows::put_account(state, &account).map_err(state_err)?;
            Ok(())
        }
        Command::GrantPermission { account_id, grantable_permission } => {
            rows::put_grantable(state, account_id, creator_id, grantable_permission).map_err(state_err)?;
            Ok(())
        }
        Command::RevokePermission { account_id, grantable_permission } => {
            rows::delete_grantable(state, account_id, creator_id, grantable_permission).map_err(state_err)?;
            Ok(())
        }
        Command::AddPeer { .. } => {
            // The peer directory is an RCU structure outside `StateAccess`
            // (§4.5); it is updated after this staged batch commits, in
            // `execute_all` above.
            Ok(())
        }
    }
}

/// Merges one key/value under `detail[setter][key]`, following the original
/// convention of nesting account details by the account that set them.
fn set_json_detail(json_data: &mut String, setter: &str, key: &str, value: &str) {
    let mut root: serde_json::Value = serde_json::from_str(json_data).unwrap_or_else(|_| serde_json::json!({}));
    if !root.is_object() {
        root = serde_json::json!({});
    }
    let entry = root
        .as_object_mut()
        .map(|obj| obj.entry(setter.to_string()).or_insert_with(|| serde_json::json!({})))
        .and_then(|v| v.as_object_mut());
    if let Some(entry) = entry {
        entry.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    *json_data = root.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumeragi_api::memory_state::InMemoryState;

    #[test]
    fn add_then_subtract_asset_quantity_round_trips() {
        let state = InMemoryState::new();
        rows::put_account(&state, &Account::new("alice@x".into(), "x".into(), "user".into())).expect("put account");

        execute_one(
            &state,
            "alice@x",
            &Command::AddAssetQuantity {
                asset_id: "coin#x".into(),
                amount: Amount::from_u128(100, 2),
            },
        )
        .expect("add");

        execute_one(
            &state,
            "alice@x",
            &Command::SubtractAssetQuantity {
                asset_id: "coin#x".into(),
                amount: Amount::from_u128(40, 2),
            },
        )
        .expect("subtract");

        let wallet = rows::get_account_asset(&state, "alice@x", "coin#x").expect("get").expect("present");
        assert_eq!(wallet.balance, Amount::from_u128(60, 2));
    }

    #[test]
    fn subtract_without_a_wallet_fails() {
        let state = InMemoryState::new();
        let result = execute_one(
            &state,
            "alice@x",
            &Command::SubtractAssetQuantity {
                asset_id: "coin#x".into(),
                amount: Amount::from_u128(1, 2),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn transfer_creates_destination_wallet_when_absent() {
        let state = InMemoryState::new();
        rows::put_account_asset(
            &state,
            &AccountAsset {
                account_id: "alice@x".into(),
                asset_id: "coin#x".into(),
                balance: Amount::from_u128(150_00, 2),
            },
        )
        .expect("seed wallet");

        execute_one(
            &state,
            "alice@x",
            &Command::TransferAsset {
                src_account: "alice@x".into(),
                dst_account: "bob@x".into(),
                asset_id: "coin#x".into(),
                amount: Amount::from_u128(150_00, 2),
                description: String::new(),
            },
        )
        .expect("transfer");

        let alice = rows::get_account_asset(&state, "alice@x", "coin#x").expect("get").expect("present");
        let bob = rows::get_account_asset(&state, "bob@x", "coin#x").expect("get").expect("present");
        assert!(alice.balance.is_zero());
        assert_eq!(bob.balance, Amount::from_u128(150_00, 2));
    }

    #[test]
    fn transfer_overflowing_the_destination_wallet_fails() {
        let state = InMemoryState::new();
        let max = Amount {
            int_value: [0xff; sumeragi_types::model::amount::WIDTH],
            precision: 0,
        };
        rows::put_account_asset(
            &state,
            &AccountAsset {
                account_id: "alice@x".into(),
                asset_id: "coin#x".into(),
                balance: Amount::from_u128(1, 0),
            },
        )
        .expect("seed src");
        rows::put_account_asset(
            &state,
            &AccountAsset {
                account_id: "bob@x".into(),
                asset_id: "coin#x".into(),
                balance: max,
            },
        )
        .expect("seed dst at max");

        let result = execute_one(
            &state,
            "alice@x",
            &Command::TransferAsset {
                src_account: "alice@x".into(),
                dst_account: "bob@x".into(),
                asset_id: "coin#x".into(),
                amount: Amount::from_u128(1, 0),
                description: String::new(),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn set_account_detail_nests_under_the_setter() {
        let mut json_data = "{}".to_string();
        set_json_detail(&mut json_data, "admin@x", "age", "30");
        let parsed: serde_json::Value = serde_json::from_str(&json_data).expect("parse");
        assert_eq!(parsed["admin@x"]["age"], "30");
    }

    #[test]
    fn remove_signatory_clears_the_binding_but_keeps_other_accounts_intact() {
        let state = InMemoryState::new();
        let pk = sumeragi_types::ids::PublicKeyBytes([7; 32]);
        let mut account = Account::new("alice@x".into(), "x".into(), "user".into());
        account.signatories.insert(pk);
        rows::put_account(&state, &account).expect("put account");
        rows::put_signatory(&state, "alice@x", &pk).expect("put signatory");

        execute_one(
            &state,
            "alice@x",
            &Command::RemoveSignatory {
                account_id: "alice@x".into(),
                public_key: pk,
            },
        )
        .expect("remove signatory");

        assert!(!rows::has_signatory(&state, "alice@x", &pk).expect("check"));
        let updated = rows::get_account(&state, "alice@x").expect("get").expect("present");
        assert!(!updated.signatories.contains(&pk));
    }
}

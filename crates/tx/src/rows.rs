// Path: crates/tx/src/rows.rs
//! Thin row-access helpers over [`StateAccess`] for the world-state entities
//! (§3). Both the validator (read-only) and the executor (through a
//! [`crate::staged::StagedWrite`] overlay) go through these so the wire
//! format for each entity is defined in exactly one place.

use sumeragi_api::state::StateAccess;
use sumeragi_types::codec::{from_bytes_canonical, to_bytes_canonical};
use sumeragi_types::error::StateError;
use sumeragi_types::ids::PublicKeyBytes;
use sumeragi_types::keys::{
    account_asset_key, account_grantable_key, account_key, account_signatory_key, asset_key, domain_key, role_key,
    ACCOUNT_SIGNATORY_PREFIX, ROLE_PREFIX,
};
use sumeragi_types::model::{Account, AccountAsset, Asset, Domain, Role, RoleCatalog};

pub fn get_account(state: &dyn StateAccess, account_id: &str) -> Result<Option<Account>, StateError> {
    read(state, &account_key(account_id))
}

pub fn put_account(state: &dyn StateAccess, account: &Account) -> Result<(), StateError> {
    write(state, &account_key(&account.account_id), account)
}

pub fn get_asset(state: &dyn StateAccess, asset_id: &str) -> Result<Option<Asset>, StateError> {
    read(state, &asset_key(asset_id))
}

pub fn put_asset(state: &dyn StateAccess, asset: &Asset) -> Result<(), StateError> {
    write(state, &asset_key(&asset.asset_id), asset)
}

pub fn get_domain(state: &dyn StateAccess, domain_id: &str) -> Result<Option<Domain>, StateError> {
    read(state, &domain_key(domain_id))
}

pub fn put_domain(state: &dyn StateAccess, domain: &Domain) -> Result<(), StateError> {
    write(state, &domain_key(&domain.domain_id), domain)
}

pub fn get_role(state: &dyn StateAccess, role_name: &str) -> Result<Option<Role>, StateError> {
    read(state, &role_key(role_name))
}

pub fn put_role(state: &dyn StateAccess, role: &Role) -> Result<(), StateError> {
    write(state, &role_key(&role.role_name), role)
}

pub fn get_account_asset(
    state: &dyn StateAccess,
    account_id: &str,
    asset_id: &str,
) -> Result<Option<AccountAsset>, StateError> {
    read(state, &account_asset_key(account_id, asset_id))
}

pub fn put_account_asset(state: &dyn StateAccess, row: &AccountAsset) -> Result<(), StateError> {
    write(state, &account_asset_key(&row.account_id, &row.asset_id), row)
}

pub fn has_signatory(state: &dyn StateAccess, account_id: &str, public_key: &PublicKeyBytes) -> Result<bool, StateError> {
    let key = account_signatory_key(account_id, &public_key.to_hex());
    Ok(state.get(&key)?.is_some())
}

pub fn put_signatory(state: &dyn StateAccess, account_id: &str, public_key: &PublicKeyBytes) -> Result<(), StateError> {
    state.insert(&account_signatory_key(account_id, &public_key.to_hex()), &[])
}

pub fn delete_signatory(state: &dyn StateAccess, account_id: &str, public_key: &PublicKeyBytes) -> Result<(), StateError> {
    state.delete(&account_signatory_key(account_id, &public_key.to_hex()))
}

/// True if any other account still references this signatory (§4.3
/// RemoveSignatory: the signatory record itself is only removed once no
/// account binds to it any longer).
pub fn signatory_referenced_elsewhere(
    state: &dyn StateAccess,
    public_key: &PublicKeyBytes,
    excluding_account: &str,
) -> Result<bool, StateError> {
    let suffix = format!(":{}", public_key.to_hex());
    let stem_len = ACCOUNT_SIGNATORY_PREFIX.len();
    for (key, _) in state.prefix_scan(ACCOUNT_SIGNATORY_PREFIX)? {
        let key_str = String::from_utf8_lossy(&key).into_owned();
        let Some(without_suffix) = key_str.strip_suffix(&suffix) else {
            continue;
        };
        let account_id = without_suffix.get(stem_len..).unwrap_or_default();
        if account_id != excluding_account {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Resolves a creator public key to the account it signs for, by scanning
/// `AccountSignatory` rows. The data model carries only a public key on
/// `Transaction` (§3), so this lookup is how the validator/executor learn
/// which account's permissions and rows apply.
pub fn find_account_by_signatory(
    state: &dyn StateAccess,
    public_key: &PublicKeyBytes,
) -> Result<Option<String>, StateError> {
    let suffix = format!(":{}", public_key.to_hex());
    let stem_len = ACCOUNT_SIGNATORY_PREFIX.len();
    for (key, _) in state.prefix_scan(ACCOUNT_SIGNATORY_PREFIX)? {
        let key_str = String::from_utf8_lossy(&key).into_owned();
        if let Some(without_suffix) = key_str.strip_suffix(&suffix) {
            if let Some(account_id) = without_suffix.get(stem_len..) {
                return Ok(Some(account_id.to_string()));
            }
        }
    }
    Ok(None)
}

pub fn has_grantable(state: &dyn StateAccess, grantee: &str, grantor: &str, permission: &str) -> Result<bool, StateError> {
    Ok(state.get(&account_grantable_key(grantee, grantor, permission))?.is_some())
}

pub fn put_grantable(state: &dyn StateAccess, grantee: &str, grantor: &str, permission: &str) -> Result<(), StateError> {
    state.insert(&account_grantable_key(grantee, grantor, permission), &[])
}

pub fn delete_grantable(state: &dyn StateAccess, grantee: &str, grantor: &str, permission: &str) -> Result<(), StateError> {
    state.delete(&account_grantable_key(grantee, grantor, permission))
}

/// Loads every Role row into a [`RoleCatalog`] so the validator can compute
/// an account's effective permission set without one read per role.
pub fn load_role_catalog(state: &dyn StateAccess) -> Result<RoleCatalog, StateError> {
    let mut catalog = RoleCatalog::default();
    for (_, value) in state.prefix_scan(ROLE_PREFIX)? {
        let role: Role = from_bytes_canonical(&value).map_err(StateError::InvalidValue)?;
        catalog.permissions_by_role.insert(role.role_name.clone(), role.role_permission_set);
    }
    Ok(catalog)
}

fn read<T: parity_scale_codec::Decode>(state: &dyn StateAccess, key: &[u8]) -> Result<Option<T>, StateError> {
    match state.get(key)? {
        None => Ok(None),
        Some(bytes) => from_bytes_canonical(&bytes).map(Some).map_err(StateError::InvalidValue),
    }
}

fn write<T: parity_scale_codec::Encode>(state: &dyn StateAccess, key: &[u8], value: &T) -> Result<(), StateError> {
    let bytes = to_bytes_canonical(value).map_err(StateError::InvalidValue)?;
    state.insert(key, &bytes)
}

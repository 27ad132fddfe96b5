// Path: crates/types/src/keys.rs
//! Well-known key-prefix constants for the `StateAccess` contract (§6). The
//! world state, peer directory, and Merkle repository share one underlying
//! key/value store, distinguished only by these prefixes, so a disk-backed
//! implementation of the storage contract never has to reason about more
//! than flat byte keys.

pub const ACCOUNT_PREFIX: &[u8] = b"ws:account:";
pub const ASSET_PREFIX: &[u8] = b"ws:asset:";
pub const DOMAIN_PREFIX: &[u8] = b"ws:domain:";
pub const ROLE_PREFIX: &[u8] = b"ws:role:";
pub const ACCOUNT_ASSET_PREFIX: &[u8] = b"ws:account_asset:";
pub const ACCOUNT_SIGNATORY_PREFIX: &[u8] = b"ws:account_signatory:";
pub const ACCOUNT_GRANTABLE_PREFIX: &[u8] = b"ws:account_grantable:";

pub const PEER_DIRECTORY_KEY: &[u8] = b"ws:peers";

pub const MERKLE_NODE_PREFIX: &[u8] = b"merkle:node:";
pub const MERKLE_LEAF_PREFIX: &[u8] = b"merkle:leaf:";
pub const MERKLE_ROOT_KEY: &[u8] = b"merkle:root";
pub const MERKLE_LAST_ORDER_KEY: &[u8] = b"merkle:last_order";

pub const SEEN_COMMITS_PREFIX: &[u8] = b"consensus:seen_commit:";
pub const COMMITTED_COUNT_KEY: &[u8] = b"consensus:committed_count";

pub fn account_key(account_id: &str) -> Vec<u8> {
    [ACCOUNT_PREFIX, account_id.as_bytes()].concat()
}

pub fn asset_key(asset_id: &str) -> Vec<u8> {
    [ASSET_PREFIX, asset_id.as_bytes()].concat()
}

pub fn domain_key(domain_id: &str) -> Vec<u8> {
    [DOMAIN_PREFIX, domain_id.as_bytes()].concat()
}

pub fn role_key(role_name: &str) -> Vec<u8> {
    [ROLE_PREFIX, role_name.as_bytes()].concat()
}

pub fn account_asset_key(account_id: &str, asset_id: &str) -> Vec<u8> {
    [ACCOUNT_ASSET_PREFIX, account_id.as_bytes(), b":", asset_id.as_bytes()].concat()
}

pub fn account_signatory_key(account_id: &str, public_key_hex: &str) -> Vec<u8> {
    [
        ACCOUNT_SIGNATORY_PREFIX,
        account_id.as_bytes(),
        b":",
        public_key_hex.as_bytes(),
    ]
    .concat()
}

pub fn account_grantable_key(grantee: &str, grantor: &str, permission: &str) -> Vec<u8> {
    [
        ACCOUNT_GRANTABLE_PREFIX,
        grantee.as_bytes(),
        b":",
        grantor.as_bytes(),
        b":",
        permission.as_bytes(),
    ]
    .concat()
}

pub fn merkle_node_key(hash_hex: &str) -> Vec<u8> {
    [MERKLE_NODE_PREFIX, hash_hex.as_bytes()].concat()
}

pub fn merkle_leaf_key(tx_hash_hex: &str) -> Vec<u8> {
    [MERKLE_LEAF_PREFIX, tx_hash_hex.as_bytes()].concat()
}

pub fn seen_commit_key(tx_hash_hex: &str) -> Vec<u8> {
    [SEEN_COMMITS_PREFIX, tx_hash_hex.as_bytes()].concat()
}

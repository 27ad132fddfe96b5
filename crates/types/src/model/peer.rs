// Path: crates/types/src/model/peer.rs
//! The peer (validator) model and the deterministic validator ordering (§3).

use crate::ids::PublicKeyBytes;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub struct Peer {
    pub public_key: PublicKeyBytes,
    pub address: String,
    pub trust_score: f64,
    pub is_live: bool,
}

impl Peer {
    pub fn new(public_key: PublicKeyBytes, address: impl Into<String>) -> Self {
        Self {
            public_key,
            address: address.into(),
            trust_score: 0.0,
            is_live: true,
        }
    }
}

/// Primarily descending trust score, ties broken by ascending public key
/// (§3). Used both to sort a fresh peer list and to compare two independent
/// sorts for the peer-ordering-determinism invariant (§8).
pub fn peer_order(a: &Peer, b: &Peer) -> Ordering {
    match b.trust_score.partial_cmp(&a.trust_score) {
        Some(Ordering::Equal) | None => a.public_key.cmp(&b.public_key),
        Some(ord) => ord,
    }
}

pub fn sort_peers(peers: &mut [Peer]) {
    peers.sort_by(peer_order);
}

/// Maximum tolerated Byzantine faults, `⌊N/3⌋`, unless overridden by
/// `CoreConfig::max_faulty_peers` (§6).
pub fn compute_f(n: usize, max_faulty_peers_override: Option<usize>) -> usize {
    max_faulty_peers_override.unwrap_or(n / 3)
}

/// `min(2f, N-1)`, clamped so a tiny peer set never indexes out of bounds.
pub fn proxy_tail_index(n: usize, f: usize) -> usize {
    (2 * f).min(n.saturating_sub(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles {
    pub f: usize,
    pub proxy_tail_index: usize,
}

impl Roles {
    pub fn compute(n: usize, max_faulty_peers_override: Option<usize>) -> Self {
        let f = compute_f(n, max_faulty_peers_override);
        Roles {
            f,
            proxy_tail_index: proxy_tail_index(n, f),
        }
    }

    /// `2f + 1`: the BFT quorum threshold (§3, GLOSSARY).
    pub fn quorum(&self) -> usize {
        2 * self.f + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pk(byte: u8) -> PublicKeyBytes {
        PublicKeyBytes([byte; 32])
    }

    #[test]
    fn ordering_is_deterministic_across_independent_sorts() {
        let mut a = vec![
            Peer {
                public_key: pk(3),
                address: "a".into(),
                trust_score: 1.0,
                is_live: true,
            },
            Peer {
                public_key: pk(1),
                address: "b".into(),
                trust_score: 5.0,
                is_live: true,
            },
            Peer {
                public_key: pk(2),
                address: "c".into(),
                trust_score: 1.0,
                is_live: true,
            },
        ];
        let mut b = a.clone();
        b.reverse();

        sort_peers(&mut a);
        sort_peers(&mut b);

        let a_keys: Vec<_> = a.iter().map(|p| p.public_key).collect();
        let b_keys: Vec<_> = b.iter().map(|p| p.public_key).collect();
        assert_eq!(a_keys, b_keys);
        // highest trust first, then ascending pubkey among ties
        assert_eq!(a_keys, vec![pk(1), pk(2), pk(3)]);
    }

    #[test]
    fn roles_for_seven_peers_match_scenario_4() {
        let roles = Roles::compute(7, None);
        assert_eq!(roles.f, 2);
        assert_eq!(roles.quorum(), 5);
        assert_eq!(roles.proxy_tail_index, 4);
    }
}

// Path: crates/api/src/peer_directory.rs
//! The RCU peer directory (§4.5): reads are lock-free against an
//! `arc_swap::ArcSwap<Vec<Peer>>` snapshot; writes only happen through
//! `AddPeer` execution under the world-state write lock.

use arc_swap::ArcSwap;
use std::sync::Arc;
use sumeragi_types::ids::PublicKeyBytes;
use sumeragi_types::model::{sort_peers, Peer, Roles};

pub struct PeerDirectory {
    snapshot: ArcSwap<Vec<Peer>>,
    max_faulty_peers_override: Option<usize>,
}

impl PeerDirectory {
    pub fn new(mut peers: Vec<Peer>, max_faulty_peers_override: Option<usize>) -> Self {
        sort_peers(&mut peers);
        Self {
            snapshot: ArcSwap::from_pointee(peers),
            max_faulty_peers_override,
        }
    }

    /// Clones the `Arc`, never blocking a concurrent writer (§4.5).
    pub fn snapshot(&self) -> Arc<Vec<Peer>> {
        self.snapshot.load_full()
    }

    pub fn roles(&self) -> Roles {
        Roles::compute(self.snapshot().len(), self.max_faulty_peers_override)
    }

    pub fn leader(&self) -> Option<Peer> {
        self.snapshot().first().cloned()
    }

    pub fn proxy_tail(&self) -> Option<Peer> {
        let peers = self.snapshot();
        let roles = Roles::compute(peers.len(), self.max_faulty_peers_override);
        peers.get(roles.proxy_tail_index).cloned()
    }

    pub fn is_leader(&self, public_key: &PublicKeyBytes) -> bool {
        self.leader().map(|p| p.public_key == *public_key).unwrap_or(false)
    }

    /// Peers ordered `[broadcast_start, broadcast_end]`, clamped to
    /// `[0, N-1]` (§4.1 panic path).
    pub fn peers_in_range(&self, start: usize, end: usize) -> Vec<Peer> {
        let peers = self.snapshot();
        let last = peers.len().saturating_sub(1);
        let start = start.min(last);
        let end = end.min(last);
        if peers.is_empty() {
            return Vec::new();
        }
        peers[start..=end].to_vec()
    }

    /// Installs a new, fully-sorted peer list. This store is the RCU's sole
    /// synchronization point (§4.5); the caller holds the world-state write
    /// lock while it runs.
    pub fn add_peer(&self, peer: Peer) {
        let mut peers = (*self.snapshot()).clone();
        if peers.iter().any(|p| p.public_key == peer.public_key) {
            return;
        }
        peers.push(peer);
        sort_peers(&mut peers);
        self.snapshot.store(Arc::new(peers));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(byte: u8, trust: f64) -> Peer {
        Peer {
            public_key: PublicKeyBytes([byte; 32]),
            address: format!("addr-{byte}"),
            trust_score: trust,
            is_live: true,
        }
    }

    fn seven_peers() -> Vec<Peer> {
        (0..7).map(|i| peer(i, 1.0)).collect()
    }

    #[test]
    fn roles_match_scenario_4() {
        let dir = PeerDirectory::new(seven_peers(), None);
        let roles = dir.roles();
        assert_eq!(roles.f, 2);
        assert_eq!(roles.quorum(), 5);
        assert_eq!(roles.proxy_tail_index, 4);
    }

    #[test]
    fn add_peer_does_not_disturb_an_outstanding_snapshot() {
        let dir = PeerDirectory::new(seven_peers(), None);
        let old_snapshot = dir.snapshot();
        dir.add_peer(peer(9, 1.0));
        assert_eq!(old_snapshot.len(), 7);
        assert_eq!(dir.snapshot().len(), 8);
    }

    #[test]
    fn add_peer_is_idempotent_for_a_known_key() {
        let dir = PeerDirectory::new(seven_peers(), None);
        dir.add_peer(peer(3, 1.0));
        assert_eq!(dir.snapshot().len(), 7);
    }

    #[test]
    fn peers_in_range_clamps_to_last_index() {
        let dir = PeerDirectory::new(seven_peers(), None);
        let range = dir.peers_in_range(5, 100);
        assert_eq!(range.len(), 2);
    }
}

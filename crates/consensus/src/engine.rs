// Path: crates/consensus/src/engine.rs
//! `SumeragiEngine`: role computation, event lifecycle, commit path, and
//! panic/reconfiguration (§4.1).

use crate::timer::PanicTimers;
use dashmap::{DashMap, DashSet};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sumeragi_api::executor::Executor;
use sumeragi_api::merkle::MerkleRepository;
use sumeragi_api::peer_directory::PeerDirectory;
use sumeragi_api::state::StateAccess;
use sumeragi_api::transport::{Envelope, Transport, WireMessage};
use sumeragi_api::validator::Validator;
use sumeragi_crypto::hash::tx_hash;
use sumeragi_crypto::{sign, verify};
use sumeragi_types::config::CoreConfig;
use sumeragi_types::error::{ConsensusError, StatelessError, TransactionError};
use sumeragi_types::ids::{PublicKeyBytes, TxHash};
use sumeragi_types::model::{ConsensusEvent, ConsensusEventStatus, Peer, Transaction, TxSignature};
use tracing::{debug, info, warn};

pub type EngineHandle = Arc<SumeragiEngine>;

pub struct SumeragiEngine {
    config: Arc<CoreConfig>,
    state: Arc<dyn StateAccess>,
    merkle: Arc<dyn MerkleRepository>,
    validator: Arc<dyn Validator>,
    executor: Arc<dyn Executor>,
    transport: Arc<dyn Transport>,
    peer_directory: Arc<PeerDirectory>,
    my_public_key: PublicKeyBytes,
    my_secret_key: [u8; 32],
    /// World-state write lock (§4.1 Commit path, §5 Shared-resource policy):
    /// serializes commits across events so at most one transaction commits
    /// at a given moment, regardless of how many workers validated in
    /// parallel.
    write_lock: tokio::sync::Mutex<()>,
    seen_commits: DashSet<TxHash>,
    committed_count: AtomicU64,
    next_order: AtomicU64,
    panic_counts: DashMap<TxHash, u32>,
    pending_events: DashMap<TxHash, ConsensusEvent>,
    timers: PanicTimers,
}

impl SumeragiEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        config: Arc<CoreConfig>,
        state: Arc<dyn StateAccess>,
        merkle: Arc<dyn MerkleRepository>,
        validator: Arc<dyn Validator>,
        executor: Arc<dyn Executor>,
        transport: Arc<dyn Transport>,
    ) -> Result<EngineHandle, sumeragi_types::error::CryptoError> {
        let mut secret = [0u8; 32];
        hex::decode_to_slice(&config.me.private_key, &mut secret)
            .map_err(|e| sumeragi_types::error::CryptoError::MalformedEncoding(e.to_string()))?;

        let peers: Vec<Peer> = config.peers.iter().map(|p| Peer::new(p.public_key, p.ip.clone())).collect();
        let peer_directory = Arc::new(PeerDirectory::new(peers, config.max_faulty_peers));
        let (timers, fired_rx) = PanicTimers::spawn();

        let engine = Arc::new(Self {
            my_public_key: config.me.public_key,
            my_secret_key: secret,
            config,
            state,
            merkle,
            validator,
            executor,
            transport,
            peer_directory,
            write_lock: tokio::sync::Mutex::new(()),
            seen_commits: DashSet::new(),
            committed_count: AtomicU64::new(0),
            next_order: AtomicU64::new(0),
            panic_counts: DashMap::new(),
            pending_events: DashMap::new(),
            timers,
        });

        Arc::clone(&engine).spawn_panic_listener(fired_rx);
        Ok(engine)
    }

    fn spawn_panic_listener(self: Arc<Self>, mut fired_rx: tokio::sync::mpsc::UnboundedReceiver<TxHash>) {
        tokio::spawn(async move {
            while let Some(hash) = fired_rx.recv().await {
                self.on_panic(hash).await;
            }
        });
    }

    pub fn committed_count(&self) -> u64 {
        self.committed_count.load(Ordering::SeqCst)
    }

    pub fn public_key(&self) -> PublicKeyBytes {
        self.my_public_key
    }

    pub fn peer_directory(&self) -> &Arc<PeerDirectory> {
        &self.peer_directory
    }

    pub fn state(&self) -> &Arc<dyn StateAccess> {
        &self.state
    }

    pub fn merkle(&self) -> &Arc<dyn MerkleRepository> {
        &self.merkle
    }

    /// Entry point for every inbound message (§4.1, §6).
    pub async fn handle_message(self: &Arc<Self>, envelope: Envelope) -> Result<(), ConsensusError> {
        match envelope.message {
            WireMessage::ConsensusEvent(event) => self.handle_event(event).await,
            WireMessage::BlockCommit(commit) => self.handle_committed(commit.consensus_event).await,
            WireMessage::Transaction(transaction) => self.handle_event(ConsensusEvent::new_uncommitted(transaction)).await,
        }
    }

    async fn handle_event(self: &Arc<Self>, event: ConsensusEvent) -> Result<(), ConsensusError> {
        match event.status {
            ConsensusEventStatus::Committed => self.handle_committed(event).await,
            ConsensusEventStatus::Uncommitted => self.handle_uncommitted(event).await,
        }
    }

    /// On receipt of a COMMITTED event: idempotent against the seen-commits
    /// cache (§4.1, TESTABLE PROPERTIES scenario 5).
    async fn handle_committed(self: &Arc<Self>, event: ConsensusEvent) -> Result<(), ConsensusError> {
        let hash = tx_hash(&event.transaction);
        self.commit(&event.transaction).await?;
        self.timers.cancel(hash);
        self.pending_events.remove(&hash);
        self.panic_counts.remove(&hash);
        Ok(())
    }

    async fn handle_uncommitted(self: &Arc<Self>, mut event: ConsensusEvent) -> Result<(), ConsensusError> {
        let hash = tx_hash(&event.transaction);
        if self.seen_commits.contains(&hash) {
            return Ok(());
        }

        verify_event_signatures(&event)?;

        if !event.has_signature_from(&self.my_public_key) {
            let signature = sign(&self.my_secret_key, hash.as_bytes()).map_err(|_| ConsensusError::InvalidEventSignature)?;
            event.event_signatures.push(TxSignature {
                public_key: self.my_public_key,
                signature,
            });
            debug!(target: "sumeragi::consensus", event = "signature_collected", tx_hash = %hash, signatures = event.event_signatures.len());
        }

        // The event carried exactly the signature we just added: this is
        // this replica's first sighting, so the leader assigns the order.
        if event.event_signatures.len() == 1 && self.peer_directory.is_leader(&self.my_public_key) {
            event.order = self.next_order();
        }

        let roles = self.peer_directory.roles();
        if count_valid_signatures(&event) >= roles.quorum() {
            event.status = ConsensusEventStatus::Committed;
            self.commit(&event.transaction).await?;
            self.timers.cancel(hash);
            self.pending_events.remove(&hash);
            self.panic_counts.remove(&hash);
            self.transport.broadcast_all(WireMessage::ConsensusEvent(event)).await?;
            return Ok(());
        }

        self.pending_events.insert(hash, event.clone());
        if self.is_proxy_tail() {
            self.transport.broadcast_all(WireMessage::ConsensusEvent(event)).await?;
        } else if let Some(tail) = self.peer_directory.proxy_tail() {
            self.transport.send(&tail.address, WireMessage::ConsensusEvent(event)).await?;
        }
        self.timers.arm(hash, Duration::from_millis(self.config.panic_timeout_ms));
        Ok(())
    }

    /// The commit path (§4.1): validate, execute, append to the Merkle
    /// tree, record as seen, all under the world-state write lock.
    /// Idempotent: a transaction already in the seen-commits cache is a
    /// no-op (scenario 5).
    async fn commit(&self, tx: &Transaction) -> Result<(), ConsensusError> {
        let _guard = self.write_lock.lock().await;
        let hash = tx_hash(tx);
        if self.seen_commits.contains(&hash) {
            return Ok(());
        }
        self.validator.validate_all(&tx.commands, &tx.creator_public_key).await?;
        self.executor.execute_all(&tx.commands, &tx.creator_public_key).await?;
        let root = self.merkle.append(tx).map_err(TransactionError::from)?;
        self.seen_commits.insert(hash);
        let count = self.committed_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(target: "sumeragi::consensus", event = "committed", tx_hash = %hash, merkle_root = %root, committed_count = count);
        Ok(())
    }

    /// Panic / reconfiguration (§4.1): widens the broadcast range by `f`
    /// peers per round until quorum is reached or the peer list is
    /// exhausted. Re-checks commit status before acting (§5 Cancellation).
    async fn on_panic(self: &Arc<Self>, hash: TxHash) {
        if self.seen_commits.contains(&hash) {
            return;
        }
        let Some(event) = self.pending_events.get(&hash).map(|e| e.clone()) else {
            return;
        };

        let previous_count = {
            let mut entry = self.panic_counts.entry(hash).or_insert(0);
            let previous = *entry;
            *entry += 1;
            previous
        };

        let roles = self.peer_directory.roles();
        let broadcast_start = 2 * roles.f + 1 + roles.f * previous_count as usize;
        let broadcast_end = broadcast_start + roles.f;
        warn!(
            target: "sumeragi::consensus",
            event = "panic",
            tx_hash = %hash,
            round = previous_count + 1,
            broadcast_start,
            broadcast_end,
        );
        for peer in self.peer_directory.peers_in_range(broadcast_start, broadcast_end) {
            let _ = self.transport.send(&peer.address, WireMessage::ConsensusEvent(event.clone())).await;
        }
        self.timers.arm(hash, Duration::from_millis(self.config.panic_timeout_ms));
    }

    fn is_proxy_tail(&self) -> bool {
        self.peer_directory.proxy_tail().map(|p| p.public_key == self.my_public_key).unwrap_or(false)
    }

    /// `next_order = last_assigned_order + 1`, monotonic per leader (§4.1).
    fn next_order(&self) -> u64 {
        self.next_order.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn verify_event_signatures(event: &ConsensusEvent) -> Result<(), ConsensusError> {
    if event.transaction.commands.is_empty() {
        return Err(ConsensusError::Stateless(StatelessError::EmptyCommands));
    }
    let hash = tx_hash(&event.transaction);
    let mut seen = HashSet::new();
    for sig in &event.event_signatures {
        if !seen.insert(sig.public_key) {
            return Err(ConsensusError::DuplicateEventSignature);
        }
        verify(&sig.public_key, hash.as_bytes(), &sig.signature).map_err(|_| ConsensusError::InvalidEventSignature)?;
    }
    Ok(())
}

fn count_valid_signatures(event: &ConsensusEvent) -> usize {
    let hash = tx_hash(&event.transaction);
    event
        .event_signatures
        .iter()
        .filter(|sig| verify(&sig.public_key, hash.as_bytes(), &sig.signature).is_ok())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumeragi_api::memory_state::InMemoryState;
    use sumeragi_api::transport::{InMemoryNetwork, MessageKind};
    use sumeragi_crypto::Ed25519KeyPair;
    use std::collections::HashMap;
    use sumeragi_storage::MerkleTree;
    use sumeragi_tx::{CommandExecutor, CommandValidator};
    use sumeragi_types::config::{MeConfigEntry, PeerConfigEntry};
    use sumeragi_types::model::{Account, Command};

    fn config_for(me: &Ed25519KeyPair, peers: &[&Ed25519KeyPair], panic_timeout_ms: u64) -> Arc<CoreConfig> {
        let peer_entries = peers
            .iter()
            .enumerate()
            .map(|(_, kp)| PeerConfigEntry {
                ip: format!("peer-{}", hex::encode(kp.public_key().as_bytes())),
                public_key: kp.public_key(),
            })
            .collect();
        Arc::new(CoreConfig {
            max_faulty_peers: None,
            concurrency: 1,
            pool_worker_queue_size: 16,
            panic_timeout_ms,
            database_path: "/tmp/sumeragi-test".into(),
            peers: peer_entries,
            me: MeConfigEntry {
                ip: "self".into(),
                public_key: me.public_key(),
                private_key: hex::encode(me.to_secret_bytes()),
            },
        })
    }

    fn build_engine(
        network: &Arc<InMemoryNetwork>,
        me: &Ed25519KeyPair,
        peers: &[&Ed25519KeyPair],
        state: Arc<dyn StateAccess>,
    ) -> EngineHandle {
        let config = config_for(me, peers, 30);
        let merkle = Arc::new(MerkleTree::new(Arc::clone(&state)));
        let validator = Arc::new(CommandValidator::new(Arc::clone(&state)));
        let executor = Arc::new(CommandExecutor::new(Arc::clone(&state)));
        let transport = Arc::new(network.register(format!("peer-{}", hex::encode(me.public_key().as_bytes())), me.public_key()));
        SumeragiEngine::spawn(config, state, merkle, validator, executor, transport).expect("spawn engine")
    }

    #[tokio::test]
    async fn single_replica_transfer_commits_and_appends_a_merkle_leaf() {
        let me = Ed25519KeyPair::generate();
        let network = InMemoryNetwork::new();
        let state: Arc<dyn StateAccess> = Arc::new(InMemoryState::new());

        let mut alice = Account::new("alice@x".into(), "x".into(), "user".into());
        alice.signatories.insert(me.public_key());
        alice.roles.insert("all".into());
        sumeragi_tx::rows::put_account(state.as_ref(), &alice).expect("put alice");
        sumeragi_tx::rows::put_signatory(state.as_ref(), "alice@x", &me.public_key()).expect("put signatory");
        sumeragi_tx::rows::put_role(
            state.as_ref(),
            &sumeragi_types::model::Role {
                role_name: "all".into(),
                role_permission_set: ["add_asset_qty"].into_iter().map(String::from).collect(),
            },
        )
        .expect("put role");
        sumeragi_tx::rows::put_asset(
            state.as_ref(),
            &sumeragi_types::model::Asset {
                asset_id: "coin#x".into(),
                domain_id: "x".into(),
                precision: 2,
            },
        )
        .expect("put asset");

        let engine = build_engine(&network, &me, &[&me], Arc::clone(&state));

        let tx = Transaction::new(
            me.public_key(),
            1,
            vec![Command::AddAssetQuantity {
                asset_id: "coin#x".into(),
                amount: sumeragi_types::model::Amount::from_u128(10_00, 2),
            }],
        );
        engine.handle_message(Envelope {
            sender: me.public_key(),
            message: WireMessage::Transaction(tx),
        })
        .await
        .expect("handle message");

        assert_eq!(engine.committed_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_committed_broadcast_commits_exactly_once() {
        let me = Ed25519KeyPair::generate();
        let network = InMemoryNetwork::new();
        let state: Arc<dyn StateAccess> = Arc::new(InMemoryState::new());

        let mut account = Account::new("me@x".into(), "x".into(), "user".into());
        account.signatories.insert(me.public_key());
        sumeragi_tx::rows::put_account(state.as_ref(), &account).expect("put account");
        sumeragi_tx::rows::put_signatory(state.as_ref(), "me@x", &me.public_key()).expect("put signatory");

        let engine = build_engine(&network, &me, &[&me], Arc::clone(&state));

        let tx = Transaction::new(me.public_key(), 1, vec![]);
        let mut event = ConsensusEvent::new_uncommitted(tx);
        event.status = ConsensusEventStatus::Committed;

        for _ in 0..2 {
            let _ = engine
                .handle_message(Envelope {
                    sender: me.public_key(),
                    message: WireMessage::ConsensusEvent(event.clone()),
                })
                .await;
        }

        assert_eq!(engine.committed_count(), 1);
    }

    fn seed_transfer_fixture(state: &Arc<dyn StateAccess>, creator: &Ed25519KeyPair) {
        let mut account = Account::new("leader@x".into(), "x".into(), "user".into());
        account.signatories.insert(creator.public_key());
        account.roles.insert("all".into());
        sumeragi_tx::rows::put_account(state.as_ref(), &account).expect("put account");
        sumeragi_tx::rows::put_signatory(state.as_ref(), "leader@x", &creator.public_key()).expect("put signatory");
        sumeragi_tx::rows::put_role(
            state.as_ref(),
            &sumeragi_types::model::Role {
                role_name: "all".into(),
                role_permission_set: ["add_asset_qty"].into_iter().map(String::from).collect(),
            },
        )
        .expect("put role");
        sumeragi_tx::rows::put_asset(
            state.as_ref(),
            &sumeragi_types::model::Asset {
                asset_id: "coin#x".into(),
                domain_id: "x".into(),
                precision: 2,
            },
        )
        .expect("put asset");
    }

    fn transfer_tx(creator: &Ed25519KeyPair) -> Transaction {
        Transaction::new(
            creator.public_key(),
            1,
            vec![Command::AddAssetQuantity {
                asset_id: "coin#x".into(),
                amount: sumeragi_types::model::Amount::from_u128(10_00, 2),
            }],
        )
    }

    /// Scenario 4: N=7 peers, f=2. The proxy tail withholds its broadcast,
    /// so the leader's panic/reconfiguration path widens delivery to
    /// `peers_in_range(5, 6)` (clamped from `(5, 7)`) once the panic timer
    /// fires.
    #[tokio::test]
    async fn panic_triggered_quorum_widens_broadcast_to_the_expected_peers() {
        let me = Ed25519KeyPair::generate();
        let others: Vec<Ed25519KeyPair> = (0..6).map(|_| Ed25519KeyPair::generate()).collect();
        let network = InMemoryNetwork::new();
        let state: Arc<dyn StateAccess> = Arc::new(InMemoryState::new());
        seed_transfer_fixture(&state, &me);

        let other_refs: Vec<&Ed25519KeyPair> = others.iter().collect();
        let mut all_refs: Vec<&Ed25519KeyPair> = other_refs.clone();
        all_refs.push(&me);

        let engine = build_engine(&network, &me, &all_refs, Arc::clone(&state));
        let roles = engine.peer_directory().roles();
        assert_eq!((roles.f, roles.quorum(), roles.proxy_tail_index), (2, 5, 4));

        let ordered = engine.peer_directory().snapshot();
        let proxy_tail = ordered[4].clone();
        let widened = [ordered[5].clone(), ordered[6].clone()];

        // the proxy tail's address is registered so `send` succeeds, but
        // nothing ever subscribes to it: it withholds its broadcast past
        // `panic_timeout_ms`.
        let _proxy_tail_transport = network.register(proxy_tail.address.clone(), proxy_tail.public_key);

        let received: Arc<DashMap<String, Envelope>> = Arc::new(DashMap::new());
        let mut widened_transports = Vec::new();
        for peer in &widened {
            let transport = network.register(peer.address.clone(), peer.public_key);
            let received = Arc::clone(&received);
            let address = peer.address.clone();
            transport
                .subscribe(
                    MessageKind::Consensus,
                    Arc::new(move |envelope: Envelope| {
                        received.insert(address.clone(), envelope);
                    }),
                )
                .await;
            widened_transports.push(transport);
        }

        let tx = transfer_tx(&me);
        let hash = tx_hash(&tx);
        engine
            .handle_message(Envelope {
                sender: me.public_key(),
                message: WireMessage::Transaction(tx),
            })
            .await
            .expect("handle message");

        // simulate the panic timer firing rather than sleeping past
        // `panic_timeout_ms`.
        Arc::clone(&engine).on_panic(hash).await;
        // let the widened peers' background receive loops drain their
        // channels before asserting on what they recorded.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(received.len(), 2, "both widened peers should have received the event");
        for peer in &widened {
            let envelope = received.get(&peer.address).expect("widened peer received the event");
            match &envelope.message {
                WireMessage::ConsensusEvent(event) => {
                    assert_eq!(event.event_signatures.len(), 1);
                    assert_eq!(event.event_signatures[0].public_key, me.public_key());
                }
                other => panic!("unexpected message widened to {}: {other:?}", peer.address),
            }
        }
        drop(widened_transports);
    }

    /// Scenario 4, continued: once a quorum of signatures has reached a
    /// replica in the widened range, its own processing commits the round.
    #[tokio::test]
    async fn widened_peer_commits_once_enough_signatures_have_arrived() {
        let creator = Ed25519KeyPair::generate();
        let others: Vec<Ed25519KeyPair> = (0..6).map(|_| Ed25519KeyPair::generate()).collect();
        let network = InMemoryNetwork::new();
        let state: Arc<dyn StateAccess> = Arc::new(InMemoryState::new());
        seed_transfer_fixture(&state, &creator);

        let other_refs: Vec<&Ed25519KeyPair> = others.iter().collect();
        let mut all_refs: Vec<&Ed25519KeyPair> = other_refs.clone();
        all_refs.push(&creator);
        let key_by_public_key: HashMap<_, _> = all_refs.iter().map(|kp| (kp.public_key(), *kp)).collect();

        // any honest replica commits once quorum-worth of signatures is
        // present, regardless of whether it is the leader, the proxy
        // tail, or one of the peers reached by widening (§4.1).
        let receiving_peer = others.first().expect("at least one other peer");
        let engine = build_engine(&network, receiving_peer, &all_refs, Arc::clone(&state));
        let ordered = engine.peer_directory().snapshot();

        let tx = transfer_tx(&creator);
        let hash = tx_hash(&tx);
        let quorum = engine.peer_directory().roles().quorum();
        let mut event = ConsensusEvent::new_uncommitted(tx);
        event.order = 1;
        for signer in ordered.iter().take(quorum) {
            let kp = key_by_public_key[&signer.public_key];
            let signature = sign(&kp.to_secret_bytes(), hash.as_bytes()).expect("sign");
            event.event_signatures.push(TxSignature {
                public_key: signer.public_key,
                signature,
            });
        }

        engine
            .handle_message(Envelope {
                sender: creator.public_key(),
                message: WireMessage::ConsensusEvent(event),
            })
            .await
            .expect("handle message");

        assert_eq!(engine.committed_count(), 1);
        assert!(engine.merkle().contains(&hash).expect("contains"));
        assert!(engine.merkle().get_leaf(&hash).expect("get leaf").is_some());
    }
}

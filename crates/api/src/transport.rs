// Path: crates/api/src/transport.rs
//! The wire transport contract (§6) and an in-memory fake that loops
//! messages between co-located replica instances over
//! `tokio::sync::mpsc` channels, used by every multi-replica test in this
//! workspace. The real libp2p/gRPC-backed implementation is an external
//! collaborator satisfying [`Transport`], entirely outside this crate.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use sumeragi_types::error::ConsensusError;
use sumeragi_types::ids::PublicKeyBytes;
use sumeragi_types::model::{BlockCommit, ConsensusEvent, Transaction};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum WireMessage {
    Transaction(Transaction),
    ConsensusEvent(ConsensusEvent),
    BlockCommit(BlockCommit),
}

/// An inbound message, tagged with the sender's public key (§6).
#[derive(Debug, Clone)]
pub struct Envelope {
    pub sender: PublicKeyBytes,
    pub message: WireMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    TxIngest,
    Consensus,
}

pub type MessageHandler = Arc<dyn Fn(Envelope) + Send + Sync>;

/// Delivery may be reordered or lost; duplication is allowed. The engine,
/// not the transport, is responsible for idempotence (§6).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, peer_address: &str, message: WireMessage) -> Result<(), ConsensusError>;

    async fn broadcast_all(&self, message: WireMessage) -> Result<(), ConsensusError>;

    async fn subscribe(&self, kind: MessageKind, handler: MessageHandler);
}

/// A shared hub connecting every [`InMemoryTransport`] registered against
/// it, standing in for the real network during tests.
#[derive(Default)]
pub struct InMemoryNetwork {
    nodes: DashMap<String, mpsc::UnboundedSender<Envelope>>,
}

impl InMemoryNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a new replica at `address` and returns its transport
    /// handle. The returned transport is not yet listening; call
    /// `subscribe` to start dispatching.
    pub fn register(self: &Arc<Self>, address: impl Into<String>, public_key: PublicKeyBytes) -> InMemoryTransport {
        let (tx, rx) = mpsc::unbounded_channel();
        let address = address.into();
        self.nodes.insert(address.clone(), tx);
        InMemoryTransport {
            address,
            public_key,
            network: Arc::clone(self),
            inbox: tokio::sync::Mutex::new(Some(rx)),
            handlers: Arc::new(DashMap::new()),
        }
    }
}

pub struct InMemoryTransport {
    address: String,
    public_key: PublicKeyBytes,
    network: Arc<InMemoryNetwork>,
    inbox: tokio::sync::Mutex<Option<mpsc::UnboundedReceiver<Envelope>>>,
    handlers: Arc<DashMap<MessageKind, Vec<MessageHandler>>>,
}

impl InMemoryTransport {
    fn kind_of(message: &WireMessage) -> MessageKind {
        match message {
            WireMessage::Transaction(_) => MessageKind::TxIngest,
            WireMessage::ConsensusEvent(_) | WireMessage::BlockCommit(_) => MessageKind::Consensus,
        }
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, peer_address: &str, message: WireMessage) -> Result<(), ConsensusError> {
        let sender = self
            .network
            .nodes
            .get(peer_address)
            .ok_or_else(|| ConsensusError::TransportFailure(format!("unknown peer address {peer_address}")))?
            .clone();
        sender
            .send(Envelope {
                sender: self.public_key,
                message,
            })
            .map_err(|e| ConsensusError::TransportFailure(e.to_string()))
    }

    async fn broadcast_all(&self, message: WireMessage) -> Result<(), ConsensusError> {
        for entry in self.network.nodes.iter() {
            if entry.key() == &self.address {
                continue;
            }
            entry
                .value()
                .send(Envelope {
                    sender: self.public_key,
                    message: message.clone(),
                })
                .map_err(|e| ConsensusError::TransportFailure(e.to_string()))?;
        }
        Ok(())
    }

    async fn subscribe(&self, kind: MessageKind, handler: MessageHandler) {
        self.handlers.entry(kind).or_default().push(handler);

        let mut guard = self.inbox.lock().await;
        if let Some(mut rx) = guard.take() {
            let handlers = Arc::clone(&self.handlers);
            tokio::spawn(async move {
                while let Some(envelope) = rx.recv().await {
                    let kind = InMemoryTransport::kind_of(&envelope.message);
                    if let Some(registered) = handlers.get(&kind) {
                        for handler in registered.iter() {
                            handler(envelope.clone());
                        }
                    }
                }
            });
        }
    }
}

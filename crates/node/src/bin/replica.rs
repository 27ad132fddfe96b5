// Path: crates/node/src/bin/replica.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! The primary Sumeragi replica binary (§6.1, §9): loads `CoreConfig`, wires
//! storage, crypto and transport, and drives the consensus engine's worker
//! pool until interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sumeragi_api::memory_state::InMemoryState;
use sumeragi_api::state::StateAccess;
use sumeragi_api::transport::{InMemoryNetwork, MessageKind, Transport};
use sumeragi_consensus::{SumeragiEngine, WorkerPool};
use sumeragi_storage::MerkleTree;
use sumeragi_tx::{CommandExecutor, CommandValidator};
use sumeragi_types::config::CoreConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct ReplicaOpts {
    /// Path to this replica's `CoreConfig` TOML file.
    #[arg(long, default_value = "sumeragi.toml")]
    config: PathBuf,
}

fn load_config(path: &PathBuf) -> Result<CoreConfig> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading config file {path:?}"))?;
    CoreConfig::from_toml_str(&raw).map_err(|e| anyhow::anyhow!(e))
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let opts = ReplicaOpts::parse();
    // A bad config is the one place this process aborts at startup rather
    // than propagating a `Result` further in (§9).
    let config = load_config(&opts.config).context("failed to load CoreConfig")?;

    tracing::info!(
        target: "sumeragi",
        event = "startup",
        me = %config.me.public_key,
        address = %config.me.ip,
        peers = config.peers.len(),
    );

    let concurrency = config.concurrency;
    let queue_size = config.pool_worker_queue_size;
    let me_address = config.me.ip.clone();
    let me_public_key = config.me.public_key;
    let config = Arc::new(config);

    let state: Arc<dyn StateAccess> = Arc::new(InMemoryState::new());
    let merkle = Arc::new(MerkleTree::new(Arc::clone(&state)));
    let validator = Arc::new(CommandValidator::new(Arc::clone(&state)));
    let executor = Arc::new(CommandExecutor::new(Arc::clone(&state)));

    // The real libp2p/gRPC-backed transport is an external collaborator
    // satisfying `Transport`; this process drives its own single-replica
    // network hub, suitable as a default demo backend (§6).
    let network = InMemoryNetwork::new();
    let transport = Arc::new(network.register(me_address, me_public_key));

    let engine = SumeragiEngine::spawn(
        Arc::clone(&config),
        state,
        merkle,
        validator,
        executor,
        Arc::clone(&transport) as Arc<dyn Transport>,
    )
    .context("failed to start the consensus engine")?;

    let pool_engine = Arc::clone(&engine);
    let pool = Arc::new(WorkerPool::spawn(concurrency, queue_size, move |envelope| {
        let engine = Arc::clone(&pool_engine);
        async move {
            if let Err(e) = engine.handle_message(envelope).await {
                tracing::warn!(target: "sumeragi", event = "handle_message_failed", error = %e);
            }
        }
    }));

    for kind in [MessageKind::TxIngest, MessageKind::Consensus] {
        let pool = Arc::clone(&pool);
        transport
            .subscribe(
                kind,
                Arc::new(move |envelope| {
                    if pool.try_submit(envelope).is_err() {
                        tracing::warn!(target: "sumeragi", event = "worker_pool_saturated", kind = ?kind);
                    }
                }),
            )
            .await;
    }

    tracing::info!(target: "sumeragi", event = "ready", committed_count = engine.committed_count());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "sumeragi", event = "shutdown", reason = "ctrl-c");
        }
    }

    Ok(())
}

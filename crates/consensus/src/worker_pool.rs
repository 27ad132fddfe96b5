// Path: crates/consensus/src/worker_pool.rs
//! The bounded event-intake worker pool (§5.1): a `tokio::sync::mpsc`
//! channel, bounded at `pool_worker_queue_size`, feeds `concurrency` spawned
//! worker loops. Each worker pulls one queued event and hands it to the
//! supplied handler; submission beyond the bound awaits the channel's
//! backpressure rather than blocking a native thread.

use std::future::Future;
use std::sync::Arc;
use sumeragi_api::transport::Envelope;
use tokio::sync::{mpsc, Mutex};

pub struct WorkerPool {
    sender: mpsc::Sender<Envelope>,
}

impl WorkerPool {
    pub fn spawn<F, Fut>(concurrency: usize, queue_size: usize, handler: F) -> Self
    where
        F: Fn(Envelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(queue_size.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let handler = Arc::new(handler);

        for _ in 0..concurrency.max(1) {
            let receiver = Arc::clone(&receiver);
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                loop {
                    let event = {
                        let mut guard = receiver.lock().await;
                        guard.recv().await
                    };
                    match event {
                        Some(envelope) => handler(envelope).await,
                        None => return,
                    }
                }
            });
        }

        Self { sender }
    }

    /// Awaits queue backpressure rather than dropping the event (§5).
    pub async fn submit(&self, envelope: Envelope) -> Result<(), mpsc::error::SendError<Envelope>> {
        self.sender.send(envelope).await
    }

    /// Non-blocking submission for call sites (e.g. a transport's sync
    /// `MessageHandler`) that cannot await; the caller decides what to do
    /// with a full queue.
    pub fn try_submit(&self, envelope: Envelope) -> Result<(), mpsc::error::TrySendError<Envelope>> {
        self.sender.try_send(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use sumeragi_api::transport::WireMessage;
    use sumeragi_types::ids::PublicKeyBytes;
    use sumeragi_types::model::Transaction;

    fn envelope() -> Envelope {
        Envelope {
            sender: PublicKeyBytes([1; 32]),
            message: WireMessage::Transaction(Transaction::new(PublicKeyBytes([1; 32]), 1, vec![])),
        }
    }

    #[tokio::test]
    async fn every_submitted_event_reaches_a_worker() {
        let processed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&processed);
        let pool = WorkerPool::spawn(2, 4, move |_envelope| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        for _ in 0..10 {
            pool.submit(envelope()).await.expect("submit");
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(processed.load(Ordering::SeqCst), 10);
    }
}

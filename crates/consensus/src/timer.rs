// Path: crates/consensus/src/timer.rs
//! The panic-timer subsystem (§5.1): a single task owns a min-heap of
//! `(deadline, tx_hash)` so the timer thread count stays O(1) regardless of
//! how many events are in flight, instead of one detached thread per timer.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use sumeragi_types::ids::TxHash;

enum TimerCommand {
    Arm(TxHash, Duration),
    Cancel(TxHash),
}

/// Handle into the panic-timer task. Cloning shares the same background
/// task; dropping every handle lets the task exit.
#[derive(Clone)]
pub struct PanicTimers {
    commands: mpsc::UnboundedSender<TimerCommand>,
}

impl PanicTimers {
    /// Spawns the timer task and returns a handle to it plus the channel on
    /// which fired, not-yet-cancelled deadlines are delivered.
    pub fn spawn() -> (Self, mpsc::UnboundedReceiver<TxHash>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        tokio::spawn(run(command_rx, fired_tx));
        (Self { commands: command_tx }, fired_rx)
    }

    /// Arms a panic timer for `tx_hash`, `duration` from now. Re-arming an
    /// already-armed hash bumps its generation so the previous deadline's
    /// firing is ignored.
    pub fn arm(&self, tx_hash: TxHash, duration: Duration) {
        let _ = self.commands.send(TimerCommand::Arm(tx_hash, duration));
    }

    /// Cancels a pending timer, implicitly done by the engine once a
    /// transaction lands in the seen-commits cache (§5).
    pub fn cancel(&self, tx_hash: TxHash) {
        let _ = self.commands.send(TimerCommand::Cancel(tx_hash));
    }
}

async fn run(mut commands: mpsc::UnboundedReceiver<TimerCommand>, fired: mpsc::UnboundedSender<TxHash>) {
    let mut heap: BinaryHeap<Reverse<(Instant, TxHash, u64)>> = BinaryHeap::new();
    let mut generation: HashMap<TxHash, u64> = HashMap::new();

    loop {
        let next_deadline = heap.peek().map(|Reverse((at, _, _))| *at);
        let sleep = async {
            match next_deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(TimerCommand::Arm(tx_hash, duration)) => {
                        let gen = generation.entry(tx_hash).or_insert(0);
                        *gen += 1;
                        heap.push(Reverse((Instant::now() + duration, tx_hash, *gen)));
                    }
                    Some(TimerCommand::Cancel(tx_hash)) => {
                        generation.remove(&tx_hash);
                    }
                    None => return,
                }
            }
            _ = sleep => {
                if let Some(Reverse((_, tx_hash, gen))) = heap.pop() {
                    if generation.get(&tx_hash).copied() == Some(gen) {
                        generation.remove(&tx_hash);
                        let _ = fired.send(tx_hash);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn fires_after_the_armed_duration() {
        let (timers, mut fired) = PanicTimers::spawn();
        let tx_hash = TxHash([1; 32]);
        timers.arm(tx_hash, Duration::from_millis(10));

        tokio::time::advance(Duration::from_millis(11)).await;
        let got = fired.recv().await.expect("timer fires");
        assert_eq!(got, tx_hash);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn cancelling_suppresses_the_fire() {
        let (timers, mut fired) = PanicTimers::spawn();
        let tx_hash = TxHash([2; 32]);
        timers.arm(tx_hash, Duration::from_millis(10));
        timers.cancel(tx_hash);

        tokio::time::advance(Duration::from_millis(20)).await;
        // Nothing else is armed, so a short recv timeout proves silence.
        let outcome = tokio::time::timeout(Duration::from_millis(5), fired.recv()).await;
        assert!(outcome.is_err());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn rearming_ignores_the_earlier_deadline() {
        let (timers, mut fired) = PanicTimers::spawn();
        let tx_hash = TxHash([3; 32]);
        timers.arm(tx_hash, Duration::from_millis(5));
        timers.arm(tx_hash, Duration::from_millis(50));

        tokio::time::advance(Duration::from_millis(10)).await;
        let outcome = tokio::time::timeout(Duration::from_millis(5), fired.recv()).await;
        assert!(outcome.is_err());

        tokio::time::advance(Duration::from_millis(50)).await;
        let got = fired.recv().await.expect("second deadline fires");
        assert_eq!(got, tx_hash);
    }
}

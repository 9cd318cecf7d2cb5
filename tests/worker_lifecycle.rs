//! Worker registry and scheduling-loop lifecycle.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use wardend::config::Config;
use wardend::sched::{Probe, WorkerRegistry};

struct CountProbe(Arc<AtomicUsize>);

#[async_trait]
impl Probe for CountProbe {
    async fn tick(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Probe that announces cycle entry and waits for permission to finish,
/// letting a test cancel it mid-cycle.
struct GatedProbe {
    entered: Arc<Notify>,
    gate: Arc<Notify>,
    completed: Arc<AtomicUsize>,
}

#[async_trait]
impl Probe for GatedProbe {
    async fn tick(&mut self) {
        self.entered.notify_one();
        self.gate.notified().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

fn fast_config() -> Arc<Config> {
    Arc::new(Config::parse_str("bot.slowmode = false\n"))
}

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_immediately_and_release_stops_the_loop() {
    let registry = WorkerRegistry::new();
    let config = fast_config();
    let count = Arc::new(AtomicUsize::new(0));

    registry.watch(&config, 7, CountProbe(Arc::clone(&count)));
    assert!(registry.is_watched(7));

    // The first cycle is scheduled with zero delay.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    registry.release(7);
    assert!(!registry.is_watched(7));

    // The loop observes cancellation at the next cycle boundary; no
    // further ticks happen.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn duplicate_appear_cancels_the_displaced_worker() {
    let registry = WorkerRegistry::new();
    let config = fast_config();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    registry.watch(&config, 7, CountProbe(Arc::clone(&first)));
    // Displaces and cancels the first worker before it ever runs.
    registry.watch(&config, 7, CountProbe(Arc::clone(&second)));
    assert_eq!(registry.len(), 1);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert!(second.load(Ordering::SeqCst) >= 2);

    registry.release(7);
}

#[tokio::test]
async fn releasing_an_untracked_id_is_a_no_op() {
    let registry = WorkerRegistry::new();
    registry.release(404);
    assert!(registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancellation_mid_cycle_lets_the_cycle_complete() {
    let registry = WorkerRegistry::new();
    let config = fast_config();
    let entered = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());
    let completed = Arc::new(AtomicUsize::new(0));

    registry.watch(
        &config,
        7,
        GatedProbe {
            entered: Arc::clone(&entered),
            gate: Arc::clone(&gate),
            completed: Arc::clone(&completed),
        },
    );

    // Wait until the worker is inside its cycle, then cancel it there.
    entered.notified().await;
    registry.release(7);
    assert_eq!(completed.load(Ordering::SeqCst), 0);

    // The in-flight cycle still runs to completion (the documented
    // one-cycle-late side effect of cooperative cancellation)...
    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(completed.load(Ordering::SeqCst), 1);

    // ...but no new cycle begins.
    gate.notify_one();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(completed.load(Ordering::SeqCst), 1);
}

//! Recurring per-entity workers.
//!
//! Each monitored entity gets one worker: a spawned task that runs the
//! policy's probe once, then re-sleeps for the configured cycle delay.
//! Cancellation is cooperative and checked once at the top of each cycle,
//! so a cycle already under way runs to completion and may issue one final
//! action after its entity disconnected (bounded by one cycle).

pub mod registry;

pub use registry::WorkerRegistry;

use crate::config::{Config, Key};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Normal delay between poll cycles.
pub const FAST_CYCLE: Duration = Duration::from_secs(1);
/// Delay under `bot.slowmode`, respecting the server's command rate limit.
pub const SLOW_CYCLE: Duration = Duration::from_secs(5);
/// Pause between bulk-seeded workers at startup, spreading the initial
/// burst of remote queries.
pub const SEED_SPACING: Duration = Duration::from_millis(350);

/// One recurring policy check bound to one entity.
#[async_trait]
pub trait Probe: Send + 'static {
    /// Run one cycle. Command failures are handled (logged) inside the
    /// probe; they never stop the loop.
    async fn tick(&mut self);
}

/// Delay until the next cycle, re-read from configuration on every
/// reschedule so a slow-mode change takes effect one cycle later.
pub fn cycle_delay(config: &Config) -> Duration {
    match config.flag(Key::BotSlowmode) {
        Ok(true) => SLOW_CYCLE,
        _ => FAST_CYCLE,
    }
}

/// Spawn the self-rescheduling loop for one probe. The first cycle runs
/// immediately; the token stops the loop at the next cycle boundary.
pub fn spawn_probe<P: Probe>(config: Arc<Config>, token: CancellationToken, mut probe: P) {
    tokio::spawn(async move {
        loop {
            if token.is_cancelled() {
                break;
            }
            probe.tick().await;
            tokio::time::sleep(cycle_delay(&config)).await;
        }
    });
}

//! Moderation plugins.
//!
//! Each plugin binds one policy to the event stream: the monitor family
//! (afk, badname, recording) tracks per-client recurring probes through a
//! [`crate::sched::WorkerRegistry`], while support, welcome, and
//! advertisement are purely event- or timer-triggered. Events fan out to
//! every enabled plugin through an explicit dispatch loop.

pub mod advert;
pub mod afk;
pub mod badname;
pub mod recording;
pub mod support;
pub mod welcome;

pub use advert::Advertiser;
pub use afk::AfkWatch;
pub use badname::NameWatch;
pub use recording::RecordingWatch;
pub use support::SupportDesk;
pub use welcome::Welcome;

use crate::config::{Config, ConfigError, Key};
use crate::link::{ControlLink, Event, LinkResult, SessionContext};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// One enabled moderation policy.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-time startup work: seed workers for the entities that were
    /// already connected before the session began, or start a timer.
    async fn start(&self) -> LinkResult<()> {
        Ok(())
    }

    /// React to one lifecycle event.
    async fn handle(&self, event: &Event);
}

/// Instantiate the plugins enabled in `bot.plugins`. Unknown names are
/// logged and skipped.
pub fn build(
    config: &Arc<Config>,
    link: &Arc<dyn ControlLink>,
    ctx: SessionContext,
) -> Result<Vec<Arc<dyn Plugin>>, ConfigError> {
    let mut plugins: Vec<Arc<dyn Plugin>> = Vec::new();
    for name in config.list(Key::BotPlugins)? {
        match name.to_ascii_lowercase().as_str() {
            "welcome" => plugins.push(Arc::new(Welcome::new(config, link)?)),
            "afk" => plugins.push(Arc::new(AfkWatch::new(config, link)?)),
            "badname" => plugins.push(Arc::new(NameWatch::new(config, link)?)),
            "recording" => plugins.push(Arc::new(RecordingWatch::new(config, link)?)),
            "support" => plugins.push(Arc::new(SupportDesk::new(config, link, ctx)?)),
            "advertisement" => plugins.push(Arc::new(Advertiser::new(config, link)?)),
            other => warn!(plugin = other, "unknown plugin in bot.plugins, skipping"),
        }
    }
    Ok(plugins)
}

/// Fan incoming events out to every plugin until the stream ends (the
/// control connection was lost).
pub async fn dispatch(plugins: &[Arc<dyn Plugin>], mut events: mpsc::Receiver<Event>) {
    while let Some(event) = events.recv().await {
        trace!(?event, "dispatching event");
        for plugin in plugins {
            plugin.handle(&event).await;
        }
    }
}

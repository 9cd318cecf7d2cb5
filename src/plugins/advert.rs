//! Periodic server-wide broadcast.
//!
//! A single repeating timer with no per-entity state: the first message
//! goes out after one full delay, then once per delay.

use crate::config::{Config, ConfigError, Key};
use crate::link::{ControlLink, Event, LinkResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::Plugin;

pub struct Advertiser {
    link: Arc<dyn ControlLink>,
    message: String,
    delay: Duration,
}

impl Advertiser {
    pub fn new(config: &Arc<Config>, link: &Arc<dyn ControlLink>) -> Result<Self, ConfigError> {
        let minutes = config.int(Key::AdvertisementDelay)?;
        Ok(Self {
            message: config.str(Key::AdvertisementMessage)?.to_string(),
            delay: Duration::from_secs(minutes.max(1) as u64 * 60),
            link: Arc::clone(link),
        })
    }
}

#[async_trait]
impl Plugin for Advertiser {
    fn name(&self) -> &'static str {
        "advertisement"
    }

    async fn start(&self) -> LinkResult<()> {
        let link = Arc::clone(&self.link);
        let message = self.message.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(delay).await;
                if let Err(error) = link.broadcast(&message).await {
                    warn!(error = %error, "broadcast failed");
                }
            }
        });
        Ok(())
    }

    async fn handle(&self, _event: &Event) {}
}

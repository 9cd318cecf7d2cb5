//! Idle-timeout handling.
//!
//! Every non-exempt client gets a recurring probe. Crossing the idle
//! threshold moves the client to the configured channel (with an optional
//! notification) exactly once per continuous idle period; dropping back
//! below the threshold re-arms the state. With kicking enabled, a client
//! that stays idle past the kick threshold is removed from the server.

use crate::config::{Config, ConfigError, Key};
use crate::link::{ChannelId, ClientId, ClientKind, ControlLink, Event, LinkResult};
use crate::policy::{ActionKind, BypassRule, Enforcer, HysteresisState, NotifyKind};
use crate::sched::{Probe, WorkerRegistry, SEED_SPACING};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Plugin;

/// Snapshot of the afk configuration, taken once at construction.
#[derive(Debug, Clone)]
pub struct AfkSettings {
    idle_time: i64,
    channel: ChannelId,
    notify: bool,
    notify_kind: NotifyKind,
    notify_message: String,
    kick: bool,
    kick_time: i64,
    kick_reason: String,
}

impl AfkSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            idle_time: config.int(Key::AfkIdleTime)?,
            channel: config.int(Key::AfkChannel)?,
            notify: config.flag(Key::AfkNotify)?,
            notify_kind: config.str(Key::AfkNotifyType)?.parse()?,
            notify_message: config.str(Key::AfkNotifyMessage)?.to_string(),
            kick: config.flag(Key::AfkKick)?,
            kick_time: config.int(Key::AfkKickTime)?,
            kick_reason: config.str(Key::AfkKickReason)?.to_string(),
        })
    }
}

/// Recurring idle check for one client.
pub struct AfkProbe {
    link: Arc<dyn ControlLink>,
    enforcer: Enforcer,
    id: ClientId,
    rule: BypassRule,
    settings: AfkSettings,
    state: HysteresisState,
}

impl AfkProbe {
    pub fn new(
        link: Arc<dyn ControlLink>,
        id: ClientId,
        rule: BypassRule,
        settings: AfkSettings,
    ) -> Self {
        Self {
            enforcer: Enforcer::new(Arc::clone(&link)),
            link,
            id,
            rule,
            settings,
            state: HysteresisState::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle
    }
}

#[async_trait]
impl Probe for AfkProbe {
    async fn tick(&mut self) {
        let client = match self.link.client_info(self.id).await {
            Ok(client) => client,
            Err(error) if error.is_rejected() => return, // gone or a control identity
            Err(error) => {
                warn!(clid = self.id, error = %error, "idle poll failed");
                return;
            }
        };
        if self.rule.exempts_client(&client) {
            return;
        }

        let idle = client.idle.as_secs() as i64;
        if idle > self.settings.idle_time && !self.state.is_idle {
            if self.settings.notify {
                let notice = ActionKind::notify(
                    self.settings.notify_kind,
                    self.settings.notify_message.as_str(),
                );
                if let Err(error) = self.enforcer.apply(self.id, notice).await {
                    warn!(clid = self.id, error = %error, "idle notification failed");
                }
            }
            match self
                .enforcer
                .apply(self.id, ActionKind::Move(self.settings.channel))
                .await
            {
                Ok(()) => debug!(clid = self.id, idle, "moved idle client"),
                Err(error) => warn!(clid = self.id, error = %error, "idle move failed"),
            }
            self.state.is_idle = true;
        } else if idle < self.settings.idle_time && self.state.is_idle {
            // Re-engaged.
            self.state.is_idle = false;
        }

        if self.settings.kick && self.state.is_idle && idle > self.settings.kick_time {
            let kick = ActionKind::KickServer(self.settings.kick_reason.clone());
            match self.enforcer.apply(self.id, kick).await {
                Ok(()) => info!(clid = self.id, idle, "kicked idle client"),
                Err(error) => warn!(clid = self.id, error = %error, "idle kick failed"),
            }
        }
    }
}

/// The afk plugin: one probe per non-exempt client.
pub struct AfkWatch {
    config: Arc<Config>,
    link: Arc<dyn ControlLink>,
    registry: WorkerRegistry,
    rule: BypassRule,
    settings: AfkSettings,
}

impl AfkWatch {
    pub fn new(config: &Arc<Config>, link: &Arc<dyn ControlLink>) -> Result<Self, ConfigError> {
        Ok(Self {
            rule: BypassRule::new(
                config.ids(Key::AfkBypassGroups)?,
                config.ids(Key::AfkBypassChannel)?,
            ),
            settings: AfkSettings::from_config(config)?,
            config: Arc::clone(config),
            link: Arc::clone(link),
            registry: WorkerRegistry::new(),
        })
    }

    fn watch(&self, id: ClientId) {
        let probe = AfkProbe::new(
            Arc::clone(&self.link),
            id,
            self.rule.clone(),
            self.settings.clone(),
        );
        self.registry.watch(&self.config, id, probe);
    }
}

#[async_trait]
impl Plugin for AfkWatch {
    fn name(&self) -> &'static str {
        "afk"
    }

    async fn start(&self) -> LinkResult<()> {
        for client in self.link.clients().await? {
            if client.kind == ClientKind::Query || self.rule.exempts_groups(&client.groups) {
                continue;
            }
            self.watch(client.id);
            tokio::time::sleep(SEED_SPACING).await;
        }
        Ok(())
    }

    async fn handle(&self, event: &Event) {
        match *event {
            Event::ClientJoin { id } => {
                let client = match self.link.client_info(id).await {
                    Ok(client) => client,
                    Err(error) if error.is_rejected() => return, // control identity
                    Err(error) => {
                        warn!(clid = id, error = %error, "join lookup failed");
                        return;
                    }
                };
                if client.kind == ClientKind::Query || self.rule.exempts_groups(&client.groups) {
                    return;
                }
                self.watch(id);
            }
            Event::ClientLeave { id } => self.registry.release(id),
            _ => {}
        }
    }
}

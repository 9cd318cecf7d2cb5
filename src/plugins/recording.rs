//! Recording detection.
//!
//! No hysteresis: the action fires every cycle the client keeps recording,
//! relying on the kick or move itself to end the violation.

use crate::config::{Config, ConfigError, Key};
use crate::link::{ClientId, ClientKind, ControlLink, Event, LinkResult};
use crate::policy::{ActionKind, BypassRule, Enforcer};
use crate::sched::{Probe, WorkerRegistry, SEED_SPACING};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use super::Plugin;

/// What to do with a recording client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingAction {
    Kick,
    /// Remove from the current channel and explain via private message.
    Move,
}

impl FromStr for RecordingAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("kick") {
            Ok(Self::Kick)
        } else if s.eq_ignore_ascii_case("move") {
            Ok(Self::Move)
        } else {
            Err(ConfigError::Invalid {
                key: Key::RecordingAction.name(),
                value: s.to_string(),
                reason: "expected kick or move".into(),
            })
        }
    }
}

/// Settings snapshot for the recording policy.
#[derive(Debug, Clone)]
pub struct RecordingSettings {
    action: RecordingAction,
    kick_message: String,
    move_message: String,
}

impl RecordingSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            action: config.str(Key::RecordingAction)?.parse()?,
            kick_message: config.str(Key::RecordingKickMessage)?.to_string(),
            move_message: config.str(Key::RecordingMoveMessage)?.to_string(),
        })
    }
}

/// Recurring recording check for one client.
pub struct RecordingProbe {
    link: Arc<dyn ControlLink>,
    enforcer: Enforcer,
    id: ClientId,
    rule: BypassRule,
    settings: RecordingSettings,
}

impl RecordingProbe {
    pub fn new(
        link: Arc<dyn ControlLink>,
        id: ClientId,
        rule: BypassRule,
        settings: RecordingSettings,
    ) -> Self {
        Self {
            enforcer: Enforcer::new(Arc::clone(&link)),
            link,
            id,
            rule,
            settings,
        }
    }
}

#[async_trait]
impl Probe for RecordingProbe {
    async fn tick(&mut self) {
        let client = match self.link.client_info(self.id).await {
            Ok(client) => client,
            Err(error) if error.is_rejected() => return,
            Err(error) => {
                warn!(clid = self.id, error = %error, "recording poll failed");
                return;
            }
        };
        if self.rule.exempts_client(&client) || !client.recording {
            return;
        }

        match self.settings.action {
            RecordingAction::Kick => {
                let kick = ActionKind::KickServer(self.settings.kick_message.clone());
                match self.enforcer.apply(self.id, kick).await {
                    Ok(()) => info!(
                        clid = self.id,
                        nickname = %client.nickname,
                        "kicked client for recording in a forbidden channel"
                    ),
                    Err(error) => warn!(clid = self.id, error = %error, "recording kick failed"),
                }
            }
            RecordingAction::Move => {
                if let Err(error) = self.enforcer.apply(self.id, ActionKind::KickChannel).await {
                    warn!(clid = self.id, error = %error, "recording channel kick failed");
                }
                let notice = ActionKind::NotifyChat(self.settings.move_message.clone());
                if let Err(error) = self.enforcer.apply(self.id, notice).await {
                    warn!(clid = self.id, error = %error, "recording notice failed");
                }
            }
        }
    }
}

/// The recording plugin: one probe per non-exempt client.
pub struct RecordingWatch {
    config: Arc<Config>,
    link: Arc<dyn ControlLink>,
    registry: WorkerRegistry,
    rule: BypassRule,
    settings: RecordingSettings,
}

impl RecordingWatch {
    pub fn new(config: &Arc<Config>, link: &Arc<dyn ControlLink>) -> Result<Self, ConfigError> {
        Ok(Self {
            rule: BypassRule::new(
                config.ids(Key::RecordingBypassGroups)?,
                config.ids(Key::RecordingBypassChannel)?,
            ),
            settings: RecordingSettings::from_config(config)?,
            config: Arc::clone(config),
            link: Arc::clone(link),
            registry: WorkerRegistry::new(),
        })
    }

    fn watch(&self, id: ClientId) {
        let probe = RecordingProbe::new(
            Arc::clone(&self.link),
            id,
            self.rule.clone(),
            self.settings.clone(),
        );
        self.registry.watch(&self.config, id, probe);
    }
}

#[async_trait]
impl Plugin for RecordingWatch {
    fn name(&self) -> &'static str {
        "recording"
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
                    Err(error) if error.is_rejected() => return,
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

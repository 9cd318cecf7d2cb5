//! Corrective-action execution.
//!
//! Every policy funnels its side effects through [`Enforcer::apply`], one
//! remote command per action. Failures are reported to the caller, never
//! retried; the single exception is a rejected rename, which falls back to
//! deleting the channel (one level, no loop).

use crate::config::ConfigError;
use crate::link::{ChannelId, ControlLink, LinkResult};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use vsq_proto::QueryError;

/// How a notification is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Poke,
    Chat,
}

impl FromStr for NotifyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("poke") {
            Ok(Self::Poke)
        } else if s.eq_ignore_ascii_case("chat") {
            Ok(Self::Chat)
        } else {
            Err(ConfigError::Invalid {
                key: "notify-type",
                value: s.to_string(),
                reason: "expected poke or chat".into(),
            })
        }
    }
}

/// One corrective command, selected by policy configuration.
#[derive(Debug, Clone)]
pub enum ActionKind {
    NotifyPoke(String),
    NotifyChat(String),
    Move(ChannelId),
    KickChannel,
    KickServer(String),
    Rename(String),
    Delete,
}

impl ActionKind {
    /// A notification of the configured kind.
    pub fn notify(kind: NotifyKind, text: impl Into<String>) -> Self {
        match kind {
            NotifyKind::Poke => Self::NotifyPoke(text.into()),
            NotifyKind::Chat => Self::NotifyChat(text.into()),
        }
    }
}

/// Issues corrective commands through the control link.
#[derive(Clone)]
pub struct Enforcer {
    link: Arc<dyn ControlLink>,
}

impl Enforcer {
    pub fn new(link: Arc<dyn ControlLink>) -> Self {
        Self { link }
    }

    /// Apply one action to the target entity (a client id, or a channel id
    /// for the channel-shaped actions).
    pub async fn apply(&self, target: i64, action: ActionKind) -> LinkResult<()> {
        match action {
            ActionKind::NotifyPoke(text) => self.link.poke(target, &text).await,
            ActionKind::NotifyChat(text) => self.link.private_message(target, &text).await,
            ActionKind::Move(channel) => self.link.move_client(target, channel).await,
            ActionKind::KickChannel => self.link.kick_from_channel(target).await,
            ActionKind::KickServer(reason) => self.link.kick_from_server(target, &reason).await,
            ActionKind::Rename(name) => match self.link.rename_channel(target, &name).await {
                Err(QueryError::Rejected { id, msg }) => {
                    debug!(cid = target, code = id, msg = %msg, "rename rejected, deleting channel");
                    self.link.delete_channel(target).await
                }
                other => other,
            },
            ActionKind::Delete => self.link.delete_channel(target).await,
        }
    }

    /// Create an ephemeral sub-channel and return its id. Kept separate
    /// from [`Enforcer::apply`] because it is the one action with a result
    /// the caller needs.
    pub async fn open_channel(&self, name: &str, parent: ChannelId) -> LinkResult<ChannelId> {
        self.link.create_channel(name, parent).await
    }
}

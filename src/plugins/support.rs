//! Support-request escalation.
//!
//! Not scheduled: reacts once per "client moved into the support channel"
//! event. Staff (members of the notify groups) browsing the channel are
//! ignored; everyone else is treated as a requester.

use crate::config::{Config, ConfigError, Key};
use crate::link::{
    ChannelId, ClientId, ClientView, ControlLink, Event, LinkResult, SessionContext,
};
use crate::policy::{ActionKind, BypassRule, Enforcer};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{debug, warn};

use super::Plugin;

/// Settings snapshot for the support flow.
#[derive(Debug, Clone)]
pub struct SupportSettings {
    channel: ChannelId,
    create_channel: bool,
    channel_name: String,
    notify_message: String,
    fail_message: String,
    success_message: String,
}

impl SupportSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            channel: config.int(Key::SupportChannel)?,
            create_channel: config.flag(Key::SupportCreateChannel)?,
            channel_name: config.str(Key::SupportChannelName)?.to_string(),
            notify_message: config.str(Key::SupportNotifyMessage)?.to_string(),
            fail_message: config.str(Key::SupportMessageFail)?.to_string(),
            success_message: config.str(Key::SupportMessage)?.to_string(),
        })
    }
}

/// A clickable reference to the requester, usable inside a poke.
fn client_ref(client: &ClientView) -> String {
    format!(
        "[URL=client://{}/{}]{}[/URL]",
        client.id, client.unique_id, client.nickname
    )
}

/// Name for the ephemeral per-request sub-channel.
fn lounge_name(template: &str, nickname: &str, now: DateTime<Local>) -> String {
    template
        .replace("%clientName%", nickname)
        .replace("%date%", &now.format("%H:%M").to_string())
}

/// The support plugin.
pub struct SupportDesk {
    link: Arc<dyn ControlLink>,
    enforcer: Enforcer,
    ctx: SessionContext,
    /// Notify groups double as the staff bypass rule: members never count
    /// as requesters.
    rule: BypassRule,
    settings: SupportSettings,
}

impl SupportDesk {
    pub fn new(
        config: &Arc<Config>,
        link: &Arc<dyn ControlLink>,
        ctx: SessionContext,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            rule: BypassRule::new(config.ids(Key::SupportNotifyGroups)?, Vec::new()),
            settings: SupportSettings::from_config(config)?,
            enforcer: Enforcer::new(Arc::clone(link)),
            link: Arc::clone(link),
            ctx,
        })
    }

    async fn escalate(&self, id: ClientId) {
        let requester = match self.link.client_info(id).await {
            Ok(client) => client,
            Err(error) if error.is_rejected() => return,
            Err(error) => {
                warn!(clid = id, error = %error, "requester lookup failed");
                return;
            }
        };
        if self.rule.exempts_client(&requester) {
            // Staff self-browsing, not a request.
            return;
        }

        let connected = match self.link.clients().await {
            Ok(clients) => clients,
            Err(error) => {
                warn!(error = %error, "staff lookup failed");
                return;
            }
        };
        let staff: Vec<&ClientView> = connected
            .iter()
            .filter(|client| self.rule.exempts_groups(&client.groups))
            .collect();

        if staff.is_empty() {
            debug!(clid = id, "support request with nobody on duty");
            let notice = ActionKind::NotifyChat(self.settings.fail_message.clone());
            if let Err(error) = self.enforcer.apply(id, notice).await {
                warn!(clid = id, error = %error, "failure notice failed");
            }
            return;
        }

        if self.settings.create_channel {
            if let Err(error) = self.open_lounge(&requester).await {
                warn!(clid = id, error = %error, "support channel creation failed");
            }
        }

        let reference = client_ref(&requester);
        for member in &staff {
            let poke =
                ActionKind::NotifyPoke(self.settings.notify_message.replace("%clientName%", &reference));
            if let Err(error) = self.enforcer.apply(member.id, poke).await {
                warn!(clid = member.id, error = %error, "staff poke failed");
            }
        }

        let confirmation = ActionKind::NotifyChat(self.settings.success_message.clone());
        if let Err(error) = self.enforcer.apply(id, confirmation).await {
            warn!(clid = id, error = %error, "confirmation failed");
        }
    }

    /// Create the per-request sub-channel, move the requester into it, and
    /// return the acting identity to its home channel (creating a channel
    /// drags the creator inside).
    async fn open_lounge(&self, requester: &ClientView) -> LinkResult<()> {
        let name = lounge_name(&self.settings.channel_name, &requester.nickname, Local::now());
        let lounge = self.enforcer.open_channel(&name, self.settings.channel).await?;
        self.link.move_client(requester.id, lounge).await?;
        self.link
            .move_client(self.ctx.own_id, self.ctx.home_channel)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Plugin for SupportDesk {
    fn name(&self) -> &'static str {
        "support"
    }

    async fn handle(&self, event: &Event) {
        if let Event::ClientMoved { id, target } = *event {
            if target == self.settings.channel {
                self.escalate(id).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ClientKind;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn reference_is_clickable() {
        let client = ClientView {
            id: 12,
            nickname: "Help Me".into(),
            channel: 3,
            groups: vec![],
            idle: Duration::ZERO,
            kind: ClientKind::Voice,
            recording: false,
            unique_id: "abc123=".into(),
            ip: String::new(),
            country: String::new(),
            total_connections: 1,
            last_connected: 0,
        };
        assert_eq!(
            client_ref(&client),
            "[URL=client://12/abc123=]Help Me[/URL]"
        );
    }

    #[test]
    fn lounge_name_interpolates_name_and_time() {
        let now = Local.with_ymd_and_hms(2026, 3, 14, 15, 4, 0).unwrap();
        assert_eq!(
            lounge_name("Support %clientName% (%date%)", "Help Me", now),
            "Support Help Me (15:04)"
        );
    }
}

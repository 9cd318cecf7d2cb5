//! Greeting for connecting clients.

use crate::config::{Config, ConfigError, Key};
use crate::link::{ClientView, ControlLink, Event};
use crate::policy::{ActionKind, BypassRule, Enforcer};
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use std::sync::Arc;
use tracing::warn;

use super::Plugin;

/// Replace the greeting placeholders with the client's details.
fn interpolate(template: &str, client: &ClientView) -> String {
    let last_connection = Local
        .timestamp_opt(client.last_connected, 0)
        .single()
        .map(|time| time.format("%d. %B %Y %H:%M").to_string())
        .unwrap_or_default();
    template
        .replace("%clientName%", &client.nickname)
        .replace("%clientIP%", &client.ip)
        .replace("%clientCountry%", &client.country)
        .replace("%totalConnections%", &client.total_connections.to_string())
        .replace("%lastConnection%", &last_connection)
}

/// The welcome plugin: one private message per qualifying join.
pub struct Welcome {
    link: Arc<dyn ControlLink>,
    enforcer: Enforcer,
    rule: BypassRule,
    message: String,
    /// Greet only clients with at most this many total connections;
    /// `-1` greets everyone.
    connections: i64,
}

impl Welcome {
    pub fn new(config: &Arc<Config>, link: &Arc<dyn ControlLink>) -> Result<Self, ConfigError> {
        Ok(Self {
            rule: BypassRule::new(config.ids(Key::WelcomeGroups)?, Vec::new()),
            message: config.str(Key::WelcomeMessage)?.to_string(),
            connections: config.int(Key::WelcomeConnections)?,
            enforcer: Enforcer::new(Arc::clone(link)),
            link: Arc::clone(link),
        })
    }
}

#[async_trait]
impl Plugin for Welcome {
    fn name(&self) -> &'static str {
        "welcome"
    }

    async fn handle(&self, event: &Event) {
        let Event::ClientJoin { id } = *event else {
            return;
        };
        let client = match self.link.client_info(id).await {
            Ok(client) => client,
            Err(error) if error.is_rejected() => return, // control identity
            Err(error) => {
                warn!(clid = id, error = %error, "join lookup failed");
                return;
            }
        };
        if self.connections != -1 && client.total_connections > self.connections {
            return;
        }
        if self.rule.exempts_client(&client) {
            return;
        }

        let greeting = ActionKind::NotifyChat(interpolate(&self.message, &client));
        if let Err(error) = self.enforcer.apply(id, greeting).await {
            warn!(clid = id, error = %error, "greeting failed");
        }
    }
}

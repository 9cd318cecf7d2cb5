//! Shared test infrastructure: a programmable in-memory control link.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use vsq_proto::QueryError;
use wardend::config::Config;
use wardend::link::{
    ChannelId, ChannelView, ClientId, ClientKind, ClientView, ControlLink, LinkResult,
};

/// One side-effecting command the code under test issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issued {
    Message { clid: ClientId, text: String },
    Poke { clid: ClientId, text: String },
    Broadcast { text: String },
    Move { clid: ClientId, cid: ChannelId },
    KickChannel { clid: ClientId },
    KickServer { clid: ClientId, reason: String },
    Rename { cid: ChannelId, name: String },
    Create { name: String, parent: ChannelId },
    Delete { cid: ChannelId },
}

#[derive(Default)]
struct MockState {
    clients: HashMap<ClientId, ClientView>,
    channels: HashMap<ChannelId, ChannelView>,
    issued: Vec<Issued>,
    reject_rename: bool,
    next_channel: ChannelId,
}

/// In-memory [`ControlLink`] with a recorded command log.
#[derive(Default)]
pub struct MockLink {
    state: Mutex<MockState>,
}

impl MockLink {
    pub fn new() -> Arc<Self> {
        let link = Self::default();
        link.state.lock().next_channel = 900;
        Arc::new(link)
    }

    pub fn put_client(&self, client: ClientView) {
        self.state.lock().clients.insert(client.id, client);
    }

    pub fn remove_client(&self, id: ClientId) {
        self.state.lock().clients.remove(&id);
    }

    pub fn put_channel(&self, channel: ChannelView) {
        self.state.lock().channels.insert(channel.id, channel);
    }

    pub fn set_idle(&self, id: ClientId, seconds: u64) {
        if let Some(client) = self.state.lock().clients.get_mut(&id) {
            client.idle = Duration::from_secs(seconds);
        }
    }

    pub fn set_nickname(&self, id: ClientId, nickname: &str) {
        if let Some(client) = self.state.lock().clients.get_mut(&id) {
            client.nickname = nickname.to_string();
        }
    }

    pub fn set_recording(&self, id: ClientId, recording: bool) {
        if let Some(client) = self.state.lock().clients.get_mut(&id) {
            client.recording = recording;
        }
    }

    /// Make every rename command come back command-rejected.
    pub fn reject_rename(&self, reject: bool) {
        self.state.lock().reject_rename = reject;
    }

    pub fn issued(&self) -> Vec<Issued> {
        self.state.lock().issued.clone()
    }

    pub fn clear_issued(&self) {
        self.state.lock().issued.clear();
    }
}

fn rejected(msg: &str) -> QueryError {
    QueryError::Rejected {
        id: 512,
        msg: msg.to_string(),
    }
}

#[async_trait]
impl ControlLink for MockLink {
    async fn client_info(&self, id: ClientId) -> LinkResult<ClientView> {
        self.state
            .lock()
            .clients
            .get(&id)
            .cloned()
            .ok_or_else(|| rejected("invalid clientID"))
    }

    async fn channel_info(&self, id: ChannelId) -> LinkResult<ChannelView> {
        self.state
            .lock()
            .channels
            .get(&id)
            .cloned()
            .ok_or_else(|| rejected("invalid channelID"))
    }

    async fn clients(&self) -> LinkResult<Vec<ClientView>> {
        let mut clients: Vec<ClientView> = self.state.lock().clients.values().cloned().collect();
        clients.sort_by_key(|client| client.id);
        Ok(clients)
    }

    async fn channels(&self) -> LinkResult<Vec<ChannelView>> {
        let mut channels: Vec<ChannelView> =
            self.state.lock().channels.values().cloned().collect();
        channels.sort_by_key(|channel| channel.id);
        Ok(channels)
    }

    async fn private_message(&self, id: ClientId, text: &str) -> LinkResult<()> {
        self.state.lock().issued.push(Issued::Message {
            clid: id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn poke(&self, id: ClientId, text: &str) -> LinkResult<()> {
        self.state.lock().issued.push(Issued::Poke {
            clid: id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> LinkResult<()> {
        self.state.lock().issued.push(Issued::Broadcast {
            text: text.to_string(),
        });
        Ok(())
    }

    async fn move_client(&self, id: ClientId, channel: ChannelId) -> LinkResult<()> {
        let mut state = self.state.lock();
        state.issued.push(Issued::Move {
            clid: id,
            cid: channel,
        });
        if let Some(client) = state.clients.get_mut(&id) {
            client.channel = channel;
        }
        Ok(())
    }

    async fn kick_from_channel(&self, id: ClientId) -> LinkResult<()> {
        self.state.lock().issued.push(Issued::KickChannel { clid: id });
        Ok(())
    }

    async fn kick_from_server(&self, id: ClientId, reason: &str) -> LinkResult<()> {
        let mut state = self.state.lock();
        state.issued.push(Issued::KickServer {
            clid: id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn rename_channel(&self, id: ChannelId, name: &str) -> LinkResult<()> {
        let mut state = self.state.lock();
        state.issued.push(Issued::Rename {
            cid: id,
            name: name.to_string(),
        });
        if state.reject_rename {
            return Err(QueryError::Rejected {
                id: 771,
                msg: "channel name is already in use".to_string(),
            });
        }
        if let Some(channel) = state.channels.get_mut(&id) {
            channel.name = name.to_string();
        }
        Ok(())
    }

    async fn create_channel(&self, name: &str, parent: ChannelId) -> LinkResult<ChannelId> {
        let mut state = self.state.lock();
        state.issued.push(Issued::Create {
            name: name.to_string(),
            parent,
        });
        let id = state.next_channel;
        state.next_channel += 1;
        state.channels.insert(
            id,
            ChannelView {
                id,
                name: name.to_string(),
                parent,
            },
        );
        Ok(id)
    }

    async fn delete_channel(&self, id: ChannelId) -> LinkResult<()> {
        let mut state = self.state.lock();
        state.issued.push(Issued::Delete { cid: id });
        state.channels.remove(&id);
        Ok(())
    }
}

/// A plain voice client with harmless defaults.
pub fn voice(id: ClientId, nickname: &str) -> ClientView {
    ClientView {
        id,
        nickname: nickname.to_string(),
        channel: 1,
        groups: Vec::new(),
        idle: Duration::ZERO,
        kind: ClientKind::Voice,
        recording: false,
        unique_id: format!("uid{id}="),
        ip: "203.0.113.1".to_string(),
        country: "DE".to_string(),
        total_connections: 1,
        last_connected: 0,
    }
}

pub fn channel(id: ChannelId, name: &str) -> ChannelView {
    ChannelView {
        id,
        name: name.to_string(),
        parent: 0,
    }
}

/// Core keys every configuration needs, with slow mode off so tests that
/// exercise real timers stay fast.
pub const BASE_CONFIG: &str = "\
    server.host = 127.0.0.1\n\
    server.port = 9987\n\
    query.port = 10011\n\
    query.username = u\n\
    query.password = p\n\
    bot.username = Warden\n\
    bot.channel = 1\n\
    bot.slowmode = false\n\
    bot.plugins =\n";

pub fn config_with(extra: &str) -> Arc<Config> {
    Arc::new(Config::parse_str(&format!("{BASE_CONFIG}{extra}")))
}

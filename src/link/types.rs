//! Typed views over the remote server's entities and events.
//!
//! The server owns all of this state; the daemon only ever holds a
//! per-cycle snapshot fetched through the link.

use std::time::Duration;
use vsq_proto::{EventFrame, Record};

pub type ClientId = i64;
pub type ChannelId = i64;
pub type GroupId = i64;

/// Whether a connection is a human voice client or a query/control
/// session. Query identities are exempt from every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Voice,
    Query,
}

/// Snapshot of one connected client.
#[derive(Debug, Clone)]
pub struct ClientView {
    pub id: ClientId,
    pub nickname: String,
    pub channel: ChannelId,
    pub groups: Vec<GroupId>,
    /// Time since the client's last input activity.
    pub idle: Duration,
    pub kind: ClientKind,
    pub recording: bool,
    /// Stable identity string, used for clickable client references.
    pub unique_id: String,
    pub ip: String,
    pub country: String,
    pub total_connections: i64,
    /// Unix timestamp of the previous connection.
    pub last_connected: i64,
}

impl ClientView {
    /// Build a view from a reply record. `id` is passed separately because
    /// `clientinfo` replies do not repeat the queried id.
    pub fn from_record(id: ClientId, record: &Record) -> Self {
        let kind = match record.parsed::<i64>("client_type") {
            Some(0) | None => ClientKind::Voice,
            Some(_) => ClientKind::Query,
        };
        Self {
            id,
            nickname: record.get("client_nickname").unwrap_or_default().to_string(),
            channel: record.id("cid").unwrap_or_default(),
            groups: record.ids("client_servergroups"),
            idle: Duration::from_millis(record.parsed("client_idle_time").unwrap_or(0)),
            kind,
            recording: record.flag("client_is_recording"),
            unique_id: record
                .get("client_unique_identifier")
                .unwrap_or_default()
                .to_string(),
            ip: record
                .get("connection_client_ip")
                .unwrap_or_default()
                .to_string(),
            country: record.get("client_country").unwrap_or_default().to_string(),
            total_connections: record.parsed("client_totalconnections").unwrap_or(0),
            last_connected: record.parsed("client_lastconnected").unwrap_or(0),
        }
    }
}

/// Snapshot of one channel.
#[derive(Debug, Clone)]
pub struct ChannelView {
    pub id: ChannelId,
    pub name: String,
    pub parent: ChannelId,
}

impl ChannelView {
    pub fn from_record(id: ChannelId, record: &Record) -> Self {
        Self {
            id,
            name: record.get("channel_name").unwrap_or_default().to_string(),
            parent: record.id("pid").or_else(|| record.id("cpid")).unwrap_or(0),
        }
    }
}

/// Session lifecycle events delivered by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ClientJoin { id: ClientId },
    ClientLeave { id: ClientId },
    ClientMoved { id: ClientId, target: ChannelId },
    ChannelCreated { id: ChannelId },
    ChannelEdited { id: ChannelId },
}

impl Event {
    /// Map a wire frame to an event; `None` for frames the daemon does not
    /// subscribe to or malformed ones.
    pub fn from_frame(frame: &EventFrame) -> Option<Self> {
        let props = &frame.props;
        match frame.kind.as_str() {
            "cliententerview" => Some(Self::ClientJoin { id: props.id("clid")? }),
            "clientleftview" => Some(Self::ClientLeave { id: props.id("clid")? }),
            "clientmoved" => Some(Self::ClientMoved {
                id: props.id("clid")?,
                target: props.id("ctid")?,
            }),
            "channelcreated" => Some(Self::ChannelCreated { id: props.id("cid")? }),
            "channeledited" => Some(Self::ChannelEdited { id: props.id("cid")? }),
            _ => None,
        }
    }
}

/// The administrative session's own identity, threaded through the
/// components that must move or reference the daemon itself.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    pub own_id: ClientId,
    /// Channel the daemon returns to after acting elsewhere.
    pub home_channel: ChannelId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_subscribed_frames() {
        let frame = EventFrame::parse("notifycliententerview clid=8 ctid=1").unwrap();
        assert_eq!(Event::from_frame(&frame), Some(Event::ClientJoin { id: 8 }));

        let frame = EventFrame::parse("notifyclientmoved clid=8 ctid=42").unwrap();
        assert_eq!(
            Event::from_frame(&frame),
            Some(Event::ClientMoved { id: 8, target: 42 })
        );

        let frame = EventFrame::parse("notifytextmessage msg=hi").unwrap();
        assert_eq!(Event::from_frame(&frame), None);
    }

    #[test]
    fn client_view_defaults_are_safe() {
        let record = Record::parse("client_nickname=Eve client_type=1");
        let view = ClientView::from_record(9, &record);
        assert_eq!(view.kind, ClientKind::Query);
        assert_eq!(view.idle, Duration::ZERO);
        assert!(view.groups.is_empty());
        assert!(!view.recording);
    }
}

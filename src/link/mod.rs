//! The control-link boundary.
//!
//! [`ControlLink`] is the narrow interface the moderation core consumes:
//! entity snapshots in, corrective commands out. The production
//! implementation is [`session::QuerySession`]; tests substitute a mock.

pub mod session;
pub mod types;

pub use session::QuerySession;
pub use types::{
    ChannelId, ChannelView, ClientId, ClientKind, ClientView, Event, GroupId, SessionContext,
};

use async_trait::async_trait;
use vsq_proto::QueryError;

pub type LinkResult<T> = Result<T, QueryError>;

/// Commands and queries the moderation core issues against the remote
/// server. Every call may fail with [`QueryError::Rejected`] (the server
/// refused the command) or a transport-level error.
#[async_trait]
pub trait ControlLink: Send + Sync {
    async fn client_info(&self, id: ClientId) -> LinkResult<ClientView>;
    async fn channel_info(&self, id: ChannelId) -> LinkResult<ChannelView>;
    async fn clients(&self) -> LinkResult<Vec<ClientView>>;
    async fn channels(&self) -> LinkResult<Vec<ChannelView>>;

    async fn private_message(&self, id: ClientId, text: &str) -> LinkResult<()>;
    async fn poke(&self, id: ClientId, text: &str) -> LinkResult<()>;
    async fn broadcast(&self, text: &str) -> LinkResult<()>;

    async fn move_client(&self, id: ClientId, channel: ChannelId) -> LinkResult<()>;
    async fn kick_from_channel(&self, id: ClientId) -> LinkResult<()>;
    async fn kick_from_server(&self, id: ClientId, reason: &str) -> LinkResult<()>;

    async fn rename_channel(&self, id: ChannelId, name: &str) -> LinkResult<()>;
    async fn create_channel(&self, name: &str, parent: ChannelId) -> LinkResult<ChannelId>;
    async fn delete_channel(&self, id: ChannelId) -> LinkResult<()>;
}

//! Protocol-level errors.

use thiserror::Error;

/// Errors surfaced by a control-protocol session.
///
/// `Rejected` is the remote side refusing a command; everything else is a
/// transport or framing failure. Callers routinely branch on the two via
/// [`QueryError::is_rejected`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// The server answered with a non-zero status.
    #[error("command rejected by server (id {id}): {msg}")]
    Rejected { id: u32, msg: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("control connection closed")]
    Closed,

    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl QueryError {
    /// True for command-rejected replies, false for transport failures.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

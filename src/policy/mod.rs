//! Policy building blocks shared by the monitor family.

pub mod action;
pub mod bypass;

pub use action::{ActionKind, Enforcer, NotifyKind};
pub use bypass::BypassRule;

/// Per-worker flags that survive across poll cycles.
///
/// Owned exclusively by one worker's sequential cycle stream; never shared
/// between tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HysteresisState {
    /// The idle threshold has been crossed and acted on.
    pub is_idle: bool,
    /// The name warning has been delivered for the current violation.
    pub is_warned: bool,
}

//! Bypass-rule evaluation.

use crate::link::{ChannelId, ClientKind, ClientView, GroupId};
use std::collections::HashSet;

/// Configured exclusion sets for one policy.
///
/// An empty set means "no exclusions" (the `-1` convention in the config
/// file normalizes to an empty list before it reaches this type), never
/// "exclude everything".
#[derive(Debug, Clone, Default)]
pub struct BypassRule {
    groups: HashSet<GroupId>,
    channels: HashSet<ChannelId>,
}

impl BypassRule {
    pub fn new(groups: Vec<GroupId>, channels: Vec<ChannelId>) -> Self {
        Self {
            groups: groups.into_iter().collect(),
            channels: channels.into_iter().collect(),
        }
    }

    /// True if any of the client's group memberships is excluded.
    pub fn exempts_groups(&self, groups: &[GroupId]) -> bool {
        groups.iter().any(|group| self.groups.contains(group))
    }

    /// True if the channel id is excluded.
    pub fn exempts_channel(&self, channel: ChannelId) -> bool {
        self.channels.contains(&channel)
    }

    /// Full client check: non-human control identities are always exempt,
    /// otherwise group membership and current channel are tested against
    /// the exclusion sets.
    pub fn exempts_client(&self, client: &ClientView) -> bool {
        client.kind == ClientKind::Query
            || self.exempts_groups(&client.groups)
            || self.exempts_channel(client.channel)
    }
}

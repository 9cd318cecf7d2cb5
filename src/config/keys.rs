//! The full set of configuration keys.

/// Every key the daemon reads from its properties file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    BotUsername,
    BotChannel,
    BotSlowmode,
    BotPlugins,
    ServerHost,
    ServerPort,
    QueryPort,
    QueryUsername,
    QueryPassword,

    WelcomeMessage,
    WelcomeConnections,
    WelcomeGroups,

    AfkIdleTime,
    AfkChannel,
    AfkNotify,
    AfkNotifyType,
    AfkNotifyMessage,
    AfkKick,
    AfkKickTime,
    AfkKickReason,
    AfkBypassGroups,
    AfkBypassChannel,

    BadnameBypassChannel,
    BadnameBypassGroups,
    BadnamePattern,
    BadnameChannelAction,
    BadnameClientAction,
    BadnameClientWarnMessage,
    BadnameClientKickMessage,
    BadnameChannelRename,

    RecordingAction,
    RecordingMoveMessage,
    RecordingKickMessage,
    RecordingBypassChannel,
    RecordingBypassGroups,

    SupportChannel,
    SupportCreateChannel,
    SupportChannelName,
    SupportNotifyGroups,
    SupportNotifyMessage,
    SupportMessageFail,
    SupportMessage,

    AdvertisementMessage,
    AdvertisementDelay,
}

impl Key {
    /// The key as it appears in the properties file.
    pub const fn name(self) -> &'static str {
        match self {
            Key::BotUsername => "bot.username",
            Key::BotChannel => "bot.channel",
            Key::BotSlowmode => "bot.slowmode",
            Key::BotPlugins => "bot.plugins",
            Key::ServerHost => "server.host",
            Key::ServerPort => "server.port",
            Key::QueryPort => "query.port",
            Key::QueryUsername => "query.username",
            Key::QueryPassword => "query.password",

            Key::WelcomeMessage => "welcome.message",
            Key::WelcomeConnections => "welcome.connections",
            Key::WelcomeGroups => "welcome.groups",

            Key::AfkIdleTime => "afk.idle-time",
            Key::AfkChannel => "afk.channel",
            Key::AfkNotify => "afk.notify",
            Key::AfkNotifyType => "afk.notify-type",
            Key::AfkNotifyMessage => "afk.notify-message",
            Key::AfkKick => "afk.kick",
            Key::AfkKickTime => "afk.kick-time",
            Key::AfkKickReason => "afk.kick-reason",
            Key::AfkBypassGroups => "afk.bypass-groups",
            Key::AfkBypassChannel => "afk.bypass-channel",

            Key::BadnameBypassChannel => "badname.bypass-channel",
            Key::BadnameBypassGroups => "badname.bypass-groups",
            Key::BadnamePattern => "badname.pattern",
            Key::BadnameChannelAction => "badname.channel-action",
            Key::BadnameClientAction => "badname.client-action",
            Key::BadnameClientWarnMessage => "badname.client-warn-message",
            Key::BadnameClientKickMessage => "badname.client-kick-message",
            Key::BadnameChannelRename => "badname.channel-rename",

            Key::RecordingAction => "recording.action",
            Key::RecordingMoveMessage => "recording.move-message",
            Key::RecordingKickMessage => "recording.kick-message",
            Key::RecordingBypassChannel => "recording.bypass-channel",
            Key::RecordingBypassGroups => "recording.bypass-groups",

            Key::SupportChannel => "support.channel",
            Key::SupportCreateChannel => "support.channel-create",
            Key::SupportChannelName => "support.channel-name",
            Key::SupportNotifyGroups => "support.notify-groups",
            Key::SupportNotifyMessage => "support.notify-message",
            Key::SupportMessageFail => "support.message-fail",
            Key::SupportMessage => "support.message",

            Key::AdvertisementMessage => "advertisement.message",
            Key::AdvertisementDelay => "advertisement.delay",
        }
    }
}

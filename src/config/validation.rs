//! Configuration validation.
//!
//! Runs before the daemon connects, and collects every problem instead of
//! stopping at the first one. Core keys are always required; plugin keys
//! only when the plugin is enabled in `bot.plugins`.

use super::{Config, ConfigError, Key};
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{key} must be an integer")]
    NotInteger { key: &'static str },
    #[error("{key} must be true or false")]
    NotBoolean { key: &'static str },
    #[error("{key} must be a comma-separated integer list (or -1)")]
    NotIdList { key: &'static str },
    #[error("{key} must be one of: {expected}")]
    BadChoice {
        key: &'static str,
        expected: &'static str,
    },
    #[error("badname.pattern entry {pattern:?} is invalid: {reason}")]
    BadPattern { pattern: String, reason: String },
}

/// What a key's value must parse as.
enum Kind {
    Str,
    Int,
    Bool,
    IdList,
    Choice(&'static str, &'static [&'static str]),
}

const CORE: &[(Key, Kind)] = &[
    (Key::ServerHost, Kind::Str),
    (Key::ServerPort, Kind::Int),
    (Key::QueryPort, Kind::Int),
    (Key::QueryUsername, Kind::Str),
    (Key::QueryPassword, Kind::Str),
    (Key::BotUsername, Kind::Str),
    (Key::BotChannel, Kind::Int),
    (Key::BotSlowmode, Kind::Bool),
    (Key::BotPlugins, Kind::Str),
];

const WELCOME: &[(Key, Kind)] = &[
    (Key::WelcomeMessage, Kind::Str),
    (Key::WelcomeConnections, Kind::Int),
    (Key::WelcomeGroups, Kind::IdList),
];

const AFK: &[(Key, Kind)] = &[
    (Key::AfkIdleTime, Kind::Int),
    (Key::AfkChannel, Kind::Int),
    (Key::AfkNotify, Kind::Bool),
    (Key::AfkNotifyType, Kind::Choice("poke, chat", &["poke", "chat"])),
    (Key::AfkNotifyMessage, Kind::Str),
    (Key::AfkKick, Kind::Bool),
    (Key::AfkKickTime, Kind::Int),
    (Key::AfkKickReason, Kind::Str),
    (Key::AfkBypassGroups, Kind::IdList),
    (Key::AfkBypassChannel, Kind::IdList),
];

const BADNAME: &[(Key, Kind)] = &[
    (Key::BadnamePattern, Kind::Str),
    (
        Key::BadnameClientAction,
        Kind::Choice("warn, kick", &["warn", "kick"]),
    ),
    (Key::BadnameClientWarnMessage, Kind::Str),
    (Key::BadnameClientKickMessage, Kind::Str),
    (
        Key::BadnameChannelAction,
        Kind::Choice("rename, delete", &["rename", "delete"]),
    ),
    (Key::BadnameChannelRename, Kind::Str),
    (Key::BadnameBypassGroups, Kind::IdList),
    (Key::BadnameBypassChannel, Kind::IdList),
];

const RECORDING: &[(Key, Kind)] = &[
    (
        Key::RecordingAction,
        Kind::Choice("kick, move", &["kick", "move"]),
    ),
    (Key::RecordingMoveMessage, Kind::Str),
    (Key::RecordingKickMessage, Kind::Str),
    (Key::RecordingBypassChannel, Kind::IdList),
    (Key::RecordingBypassGroups, Kind::IdList),
];

const SUPPORT: &[(Key, Kind)] = &[
    (Key::SupportChannel, Kind::Int),
    (Key::SupportCreateChannel, Kind::Bool),
    (Key::SupportChannelName, Kind::Str),
    (Key::SupportNotifyGroups, Kind::IdList),
    (Key::SupportNotifyMessage, Kind::Str),
    (Key::SupportMessageFail, Kind::Str),
    (Key::SupportMessage, Kind::Str),
];

const ADVERTISEMENT: &[(Key, Kind)] = &[
    (Key::AdvertisementMessage, Kind::Str),
    (Key::AdvertisementDelay, Kind::Int),
];

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_table(config, CORE, &mut errors);

    for plugin in config.list(Key::BotPlugins).unwrap_or_default() {
        let name = plugin.to_ascii_lowercase();
        let table = match name.as_str() {
            "welcome" => WELCOME,
            "afk" => AFK,
            "badname" => BADNAME,
            "recording" => RECORDING,
            "support" => SUPPORT,
            "advertisement" => ADVERTISEMENT,
            // Unknown names are skipped at plugin load, not rejected here.
            _ => continue,
        };
        check_table(config, table, &mut errors);
        if name == "badname" {
            check_patterns(config, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_table(config: &Config, table: &[(Key, Kind)], errors: &mut Vec<ValidationError>) {
    for (key, kind) in table {
        let result = match kind {
            Kind::Str => config.str(*key).map(|_| ()),
            Kind::Int => config.int(*key).map(|_| ()),
            Kind::Bool => config.flag(*key).map(|_| ()),
            Kind::IdList => config.ids(*key).map(|_| ()),
            Kind::Choice(expected, choices) => match config.str(*key) {
                Ok(value) if choices.iter().any(|c| value.eq_ignore_ascii_case(c)) => Ok(()),
                Ok(_) => {
                    errors.push(ValidationError::BadChoice {
                        key: key.name(),
                        expected: *expected,
                    });
                    continue;
                }
                Err(e) => Err(e),
            },
        };
        if let Err(error) = result {
            errors.push(match (error, kind) {
                (ConfigError::Missing(name), _) => ValidationError::Missing(name),
                (_, Kind::Int) => ValidationError::NotInteger { key: key.name() },
                (_, Kind::Bool) => ValidationError::NotBoolean { key: key.name() },
                (_, Kind::IdList) => ValidationError::NotIdList { key: key.name() },
                (_, _) => ValidationError::Missing(key.name()),
            });
        }
    }
}

fn check_patterns(config: &Config, errors: &mut Vec<ValidationError>) {
    let Ok(patterns) = config.list(Key::BadnamePattern) else {
        return; // missing key already reported by the table pass
    };
    for pattern in patterns {
        if let Err(error) = crate::plugins::badname::anchored(&pattern) {
            errors.push(ValidationError::BadPattern {
                pattern,
                reason: error.to_string(),
            });
        }
    }
}

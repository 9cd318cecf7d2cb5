//! Outbound command construction.

use crate::escape::escape;
use std::fmt;

/// Builder for a single command line.
///
/// ```
/// use vsq_proto::Command;
///
/// let line = Command::new("clientkick")
///     .arg("clid", 42)
///     .arg("reasonmsg", "too idle")
///     .encode();
/// assert_eq!(line, "clientkick clid=42 reasonmsg=too\\sidle");
/// ```
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    params: Vec<(String, String)>,
    options: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Append a `key=value` parameter. The value is escaped on encode.
    pub fn arg(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a bare `-option` flag.
    pub fn option(mut self, name: &str) -> Self {
        self.options.push(name.to_string());
        self
    }

    /// Encode the command as one wire line (without the terminator).
    pub fn encode(&self) -> String {
        let mut line = self.name.clone();
        for (key, value) in &self.params {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(&escape(value));
        }
        for option in &self.options {
            line.push(' ');
            line.push('-');
            line.push_str(option);
        }
        line
    }
}

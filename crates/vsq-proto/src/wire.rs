//! Inbound line parsing: records, status lines, and event frames.

use crate::escape::unescape;
use std::collections::HashMap;
use std::str::FromStr;

/// One record of `key=value` properties from a reply or event line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(HashMap<String, String>);

impl Record {
    /// Parse one space-separated record chunk.
    ///
    /// Tokens without `=` are stored with an empty value (bare flags).
    pub fn parse(chunk: &str) -> Self {
        let mut map = HashMap::new();
        for token in chunk.split(' ').filter(|t| !t.is_empty()) {
            match token.split_once('=') {
                Some((key, value)) => map.insert(unescape(key), unescape(value)),
                None => map.insert(unescape(token), String::new()),
            };
        }
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parse a property with `FromStr`, `None` if absent or malformed.
    pub fn parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.parse().ok()
    }

    /// Integer id property.
    pub fn id(&self, key: &str) -> Option<i64> {
        self.parsed(key)
    }

    /// Boolean property encoded as `0`/`1`; absent counts as false.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }

    /// Comma-separated integer list property; absent yields an empty list.
    pub fn ids(&self, key: &str) -> Vec<i64> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .filter_map(|part| part.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Split a data line into its pipe-separated records.
pub fn parse_records(line: &str) -> Vec<Record> {
    line.split('|').map(Record::parse).collect()
}

/// Terminal reply status, `error id=<n> msg=<text>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub id: u32,
    pub msg: String,
}

impl Status {
    /// Parse a status line; `None` if the line is not one.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix("error ")?;
        let record = Record::parse(rest);
        Some(Self {
            id: record.parsed("id")?,
            msg: record.get("msg").unwrap_or_default().to_string(),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.id == 0
    }
}

/// An unsolicited `notify<kind> key=value ...` frame.
#[derive(Debug, Clone)]
pub struct EventFrame {
    /// Frame kind with the `notify` prefix stripped, e.g. `cliententerview`.
    pub kind: String,
    pub props: Record,
}

impl EventFrame {
    /// Parse an event line; `None` if the line is not a notify frame.
    pub fn parse(line: &str) -> Option<Self> {
        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
        if head.contains('=') {
            return None; // data record whose first key merely starts with "notify"
        }
        let kind = head.strip_prefix("notify")?;
        Some(Self {
            kind: kind.to_string(),
            props: Record::parse(rest),
        })
    }
}

//! Conversation messages and dialog identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::DialogError;

/// Timestamp pattern used both for history rendering and on the wire.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(DialogError::Parse(format!("unknown role: {other}"))),
        }
    }
}

/// Identifier grouping messages into one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct DialogId(String);

impl DialogId {
    /// Dialog used when the caller names none.
    pub const DEFAULT: &'static str = "default";

    /// Sentinel for one-off completions that are never persisted.
    pub const AD_HOC: &'static str = "random";

    /// Blank ids fall back to [`DialogId::DEFAULT`], so a dialog id is never empty.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            Self(Self::DEFAULT.to_string())
        } else if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn ad_hoc() -> Self {
        Self(Self::AD_HOC.to_string())
    }

    #[must_use]
    pub fn is_ad_hoc(&self) -> bool {
        self.0 == Self::AD_HOC
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DialogId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DialogId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DialogId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<DialogId> for String {
    fn from(id: DialogId) -> Self {
        id.0
    }
}

/// A single conversation message. Never edited after creation; fields are
/// only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    dialog_id: DialogId,
    timestamp: DateTime<Utc>,
    role: Role,
    content: String,
}

impl Message {
    /// Create a message with a fresh id and the current time.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>, dialog_id: DialogId) -> Self {
        Self {
            id: Uuid::now_v7(),
            dialog_id,
            timestamp: Utc::now(),
            role,
            content: content.into(),
        }
    }

    /// Rebuild a message read back from storage.
    #[must_use]
    pub const fn restore(
        id: Uuid,
        dialog_id: DialogId,
        timestamp: DateTime<Utc>,
        role: Role,
        content: String,
    ) -> Self {
        Self {
            id,
            dialog_id,
            timestamp,
            role,
            content,
        }
    }

    /// Same message stamped with `timestamp`; used where the creation time
    /// is known up front, such as fixtures and imports.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn dialog_id(&self) -> &DialogId {
        &self.dialog_id
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }

    #[must_use]
    pub fn user(content: impl Into<String>, dialog_id: DialogId) -> Self {
        Self::new(Role::User, content, dialog_id)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>, dialog_id: DialogId) -> Self {
        Self::new(Role::Assistant, content, dialog_id)
    }

    #[must_use]
    pub fn system(content: impl Into<String>, dialog_id: DialogId) -> Self {
        Self::new(Role::System, content, dialog_id)
    }

    /// Content length in characters, the unit the context budget is counted in.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Content as transmitted: the timestamp folded into the text.
    #[must_use]
    pub fn wire_content(&self) -> String {
        format!("{}: {}", self.formatted_timestamp(), self.content)
    }
}

//! One-shot notifications shown after a screen action.

use std::fmt;

use serde::Serialize;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn danger(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Danger,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Failure notice for `action`, described in terms the user can act on.
    pub fn from_error(action: impl Into<String>, error: &ClientError) -> Self {
        Self::danger(action, error.user_message())
    }

    pub fn is_success(&self) -> bool {
        self.level == Level::Success
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            Level::Success => "✓",
            Level::Danger => "✗",
        };
        if self.description.is_empty() {
            write!(f, "{} {}", marker, self.title)
        } else {
            write!(f, "{} {}: {}", marker, self.title, self.description)
        }
    }
}

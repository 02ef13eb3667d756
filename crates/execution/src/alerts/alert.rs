//! Alert values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    /// Informational.
    Info,
    /// Anomaly the keeper corrected on its own.
    Warning,
    /// Failure that interrupted the keeper.
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => f.write_str("INFO"),
            Self::Warning => f.write_str("WARNING"),
            Self::Critical => f.write_str("ERROR"),
        }
    }
}

/// A notification for a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Creates a new alert stamped with the current time.
    pub fn new(level: AlertLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates an info alert.
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Info, title, message)
    }

    /// Creates a warning alert.
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Warning, title, message)
    }

    /// Creates a critical alert.
    pub fn critical(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Critical, title, message)
    }

    /// Plain-text rendering used by chat transports.
    pub fn render(&self) -> String {
        format!("{}: {}\n{}", self.level, self.title, self.message)
    }
}

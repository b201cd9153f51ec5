//! Persisted user settings.
//!
//! [`Settings`] is the raw, user-editable settings bag as a settings store would
//! save it (JSON with camelCase keys). It is deliberately loose: keywords are a
//! comma-delimited string, exclusion patterns are newline-delimited, and code
//! patterns are not validated here. [`RuleSet::resolve`](crate::rules::RuleSet::resolve)
//! turns it into compiled rules.
//!
//! ```
//! use vericode::Settings;
//!
//! let settings = Settings::builder()
//!     .keywords("code, verify, login")
//!     .pattern(r"\b[0-9]{6}\b", 1)
//!     .excluded_sender("noreply@newsletter.example")
//!     .build();
//!
//! assert_eq!(settings.regex_items.len(), 1);
//! ```

use crate::error::{Error, Result};
use crate::rules::{DEFAULT_CODE_PATTERNS, DEFAULT_KEYWORDS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default notification display time in milliseconds.
pub const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 15_000;

/// One user-configured code pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexItem {
    /// Regex source.
    pub pattern: String,
    /// Lower is preferred. Entries below 1 are dropped at resolution time.
    pub priority: i64,
}

impl RegexItem {
    /// Creates a new pattern entry.
    #[must_use]
    pub fn new(pattern: impl Into<String>, priority: i64) -> Self {
        Self {
            pattern: pattern.into(),
            priority,
        }
    }
}

/// User settings as persisted by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Whether extraction runs at all.
    pub enabled: bool,
    /// Whether the host copies a found code without a click.
    pub auto_copy: bool,
    /// Notification display time in milliseconds; 0 keeps it until dismissed.
    pub notification_timeout: u64,
    /// Ordered code patterns.
    pub regex_items: Vec<RegexItem>,
    /// Comma-delimited keywords.
    pub keywords: String,
    /// Comma-delimited sender addresses to ignore.
    pub excluded_emails: String,
    /// Newline-delimited content patterns; a match suppresses extraction.
    pub exclude_regex: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_copy: false,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT_MS,
            regex_items: DEFAULT_CODE_PATTERNS
                .iter()
                .map(|&(pattern, priority)| RegexItem::new(pattern, i64::from(priority)))
                .collect(),
            keywords: DEFAULT_KEYWORDS.join(", "),
            excluded_emails: String::new(),
            exclude_regex: String::new(),
        }
    }
}

impl Settings {
    /// Creates a new settings builder.
    ///
    /// The builder starts from an empty rule surface (no keywords, no patterns),
    /// which the resolver treats as "use the built-in defaults".
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Reads settings from their persisted JSON form. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] if the JSON is malformed or a field has
    /// the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| Error::InvalidSettings { source })
    }

    /// Serializes settings to their persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| Error::InvalidSettings { source })
    }

    /// Returns how long a notification stays visible, or `None` if it stays
    /// until dismissed.
    #[must_use]
    pub fn dismiss_after(&self) -> Option<Duration> {
        (self.notification_timeout > 0).then(|| Duration::from_millis(self.notification_timeout))
    }
}

/// Builder for [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    enabled: Option<bool>,
    auto_copy: Option<bool>,
    notification_timeout: Option<Duration>,
    regex_items: Vec<RegexItem>,
    keywords: Vec<String>,
    excluded_emails: Vec<String>,
    exclude_regex: Vec<String>,
}

impl SettingsBuilder {
    /// Enables or disables extraction.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Sets whether found codes are copied automatically.
    #[must_use]
    pub fn auto_copy(mut self, auto_copy: bool) -> Self {
        self.auto_copy = Some(auto_copy);
        self
    }

    /// Sets the notification display time. `Duration::ZERO` disables auto-dismiss.
    #[must_use]
    pub fn notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = Some(timeout);
        self
    }

    /// Appends keywords from a comma-delimited string.
    #[must_use]
    pub fn keywords(mut self, keywords: &str) -> Self {
        self.keywords.extend(
            keywords
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        );
        self
    }

    /// Appends a single keyword.
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Appends a code pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>, priority: i64) -> Self {
        self.regex_items.push(RegexItem::new(pattern, priority));
        self
    }

    /// Appends a sender address to ignore.
    #[must_use]
    pub fn excluded_sender(mut self, sender: impl Into<String>) -> Self {
        self.excluded_emails.push(sender.into());
        self
    }

    /// Appends a content pattern that suppresses extraction when it matches.
    #[must_use]
    pub fn exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_regex.push(pattern.into());
        self
    }

    /// Builds the settings.
    #[must_use]
    pub fn build(self) -> Settings {
        let timeout_ms = self
            .notification_timeout
            .map_or(DEFAULT_NOTIFICATION_TIMEOUT_MS, |t| {
                u64::try_from(t.as_millis()).unwrap_or(u64::MAX)
            });

        Settings {
            enabled: self.enabled.unwrap_or(true),
            auto_copy: self.auto_copy.unwrap_or(false),
            notification_timeout: timeout_ms,
            regex_items: self.regex_items,
            keywords: self.keywords.join(", "),
            excluded_emails: self.excluded_emails.join(", "),
            exclude_regex: self.exclude_regex.join("\n"),
        }
    }
}

//! Sender and content exclusion.
//!
//! An excluded message never yields a code, however strong its keyword and
//! pattern evidence. The sender list is checked first and wins on its own; the
//! content patterns are checked only when the sender is not listed.

use crate::error::Error;
use crate::rules::split_list;
use email_address::EmailAddress;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Why a message was excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionMatch {
    /// The normalized sender address is on the deny list.
    Sender(String),
    /// The text matched this content pattern.
    Content(String),
}

impl std::fmt::Display for ExclusionMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionMatch::Sender(sender) => write!(f, "sender {sender} is excluded"),
            ExclusionMatch::Content(pattern) => {
                write!(f, "content matches exclude pattern {pattern}")
            }
        }
    }
}

/// Deny rules: exact sender addresses plus case-insensitive content patterns.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRule {
    senders: HashSet<String>,
    patterns: Vec<Regex>,
}

impl ExclusionRule {
    /// Builds the rule from a comma-delimited sender list and newline-delimited
    /// content patterns. Patterns that do not compile are logged and dropped.
    #[must_use]
    pub fn resolve(excluded_emails: &str, exclude_regex: &str) -> Self {
        let senders = split_list(excluded_emails, ',')
            .map(|sender| {
                if !EmailAddress::is_valid(sender) {
                    // Kept anyway: matching is a plain string comparison.
                    warn!(sender, "Excluded sender is not a valid address");
                }
                sender.to_lowercase()
            })
            .collect();

        let patterns = split_list(exclude_regex, '\n')
            .filter_map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| Error::InvalidExcludePattern {
                        pattern: pattern.to_string(),
                        source,
                    })
                    .inspect_err(|e| warn!(error = %e, "Dropping exclude pattern"))
                    .ok()
            })
            .collect();

        Self { senders, patterns }
    }

    /// Returns the number of excluded sender addresses.
    #[must_use]
    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    /// Returns the number of active content patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty() && self.patterns.is_empty()
    }

    /// Returns `true` if the message must not produce a code.
    #[must_use]
    pub fn should_exclude(&self, sender: Option<&str>, text: &str) -> bool {
        self.check(sender, text).is_some()
    }

    /// Returns the first rule the message hits, sender before content.
    #[must_use]
    pub fn check(&self, sender: Option<&str>, text: &str) -> Option<ExclusionMatch> {
        if !self.senders.is_empty() {
            if let Some(address) = sender.and_then(normalize_sender) {
                if self.senders.contains(&address) {
                    debug!(sender = %address, "Message excluded by sender");
                    return Some(ExclusionMatch::Sender(address));
                }
            }
        }

        if text.is_empty() {
            return None;
        }

        self.patterns
            .iter()
            .find(|pattern| pattern.is_match(text))
            .map(|pattern| {
                debug!(pattern = %pattern.as_str(), "Message excluded by content");
                ExclusionMatch::Content(pattern.as_str().to_string())
            })
    }
}

/// Reduces a sender to a bare lowercase address.
///
/// Accepts a bare address or a composite `Name <address>` form. Returns `None`
/// for blank input.
#[must_use]
pub fn normalize_sender(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = mailparse::addrparse(raw).ok().and_then(|list| {
        list.iter().find_map(|addr| match addr {
            mailparse::MailAddr::Single(info) => Some(info.addr.clone()),
            mailparse::MailAddr::Group(group) => group.addrs.first().map(|i| i.addr.clone()),
        })
    });

    let address = parsed.unwrap_or_else(|| match (raw.rfind('<'), raw.rfind('>')) {
        (Some(open), Some(close)) if open < close => raw[open + 1..close].to_string(),
        _ => raw.to_string(),
    });

    let address = address.trim().to_lowercase();
    (!address.is_empty()).then_some(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sender() {
        assert_eq!(
            normalize_sender("Spam Team <SPAM@Blocked.com>").as_deref(),
            Some("spam@blocked.com")
        );
        assert_eq!(
            normalize_sender("  spam@blocked.com ").as_deref(),
            Some("spam@blocked.com")
        );
        assert_eq!(
            normalize_sender("\"Doe, Jane\" <jane@example.org>").as_deref(),
            Some("jane@example.org")
        );
        assert_eq!(normalize_sender("   "), None);
    }

    #[test]
    fn test_sender_list_is_trimmed_and_lowercased() {
        let rule = ExclusionRule::resolve(" Spam@Blocked.com , ,other@x.org", "");
        assert_eq!(rule.sender_count(), 2);
        assert!(rule.should_exclude(Some("spam@blocked.com"), "anything"));
        assert!(rule.should_exclude(Some("Other <OTHER@x.org>"), ""));
        assert!(!rule.should_exclude(Some("friend@x.org"), "anything"));
        assert!(!rule.should_exclude(None, "anything"));
    }

    #[test]
    fn test_sender_match_wins_before_content() {
        let rule = ExclusionRule::resolve("spam@blocked.com", "newsletter");
        assert_eq!(
            rule.check(Some("spam@blocked.com"), "newsletter"),
            Some(ExclusionMatch::Sender("spam@blocked.com".into()))
        );
    }

    #[test]
    fn test_content_patterns_case_insensitive() {
        let rule = ExclusionRule::resolve("", "newsletter\n\n  promo\\s+code  ");
        assert_eq!(rule.pattern_count(), 2);
        assert!(rule.should_exclude(None, "Weekly NEWSLETTER"));
        assert_eq!(
            rule.check(Some("a@b.com"), "use PROMO   CODE 123456"),
            Some(ExclusionMatch::Content(r"promo\s+code".into()))
        );
        assert!(!rule.should_exclude(None, "your login code"));
        assert!(!rule.should_exclude(None, ""));
    }

    #[test]
    fn test_invalid_exclude_pattern_dropped() {
        let rule = ExclusionRule::resolve("", "[unclosed\nvalid");
        assert_eq!(rule.pattern_count(), 1);
        assert!(rule.should_exclude(None, "this is VALID"));
    }

    #[test]
    fn test_empty_rule() {
        let rule = ExclusionRule::default();
        assert!(rule.is_empty());
        assert!(!rule.should_exclude(Some("a@b.com"), "text"));
    }

    #[test]
    fn test_exclusion_match_display() {
        let m = ExclusionMatch::Sender("a@b.com".into());
        assert_eq!(m.to_string(), "sender a@b.com is excluded");
    }
}

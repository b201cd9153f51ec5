//! Rule resolution: raw [`Settings`] in, compiled [`RuleSet`] out.
//!
//! Resolution never fails. Every pattern is compiled on its own; an entry that
//! does not compile (or carries a priority below 1) is logged and dropped while
//! the rest of the rule set stays usable. Empty keyword or pattern fields fall
//! back to the built-in defaults.
//!
//! ```
//! use vericode::{RuleSet, Settings};
//!
//! let settings = Settings::builder()
//!     .pattern(r"\b[0-9]{6}\b", 1)
//!     .pattern(r"\b[0-9]{4", 2) // unbalanced, dropped
//!     .build();
//!
//! let rules = RuleSet::resolve(&settings);
//! assert_eq!(rules.patterns().len(), 1);
//! assert!(!rules.keywords().is_empty()); // built-in keywords
//! ```

use crate::error::Error;
use crate::exclusion::ExclusionRule;
use crate::settings::{RegexItem, Settings};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Built-in keywords that mark verification context (English and Chinese).
///
/// Several entries are stems ("verif", "validat") so that every inflection matches.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    // English
    "code",
    "verif",
    "login",
    "validat",
    "authenticate",
    "authorization",
    "authorize",
    "one-time",
    "onetime",
    "one time",
    "two-factor",
    "two factor",
    // Chinese
    "码",
    "验证",
    "校验",
    "认证",
    "动态",
    "登录",
    "口令",
    "授权",
    "动态密",
    "临时密",
    "一次性密",
    "双重验证",
    "两步验证",
];

/// Built-in code patterns as `(source, priority)`, disjoint by digit length.
///
/// The boundaries are ASCII word boundaries: CJK letters count as non-word
/// characters, so "验证码123456" still yields a 6-digit match.
pub const DEFAULT_CODE_PATTERNS: &[(&str, u32)] = &[
    (r"(?-u:\b)[0-9]{6}(?-u:\b)", 1),
    (r"(?-u:\b)[0-9]{4}(?-u:\b)", 2),
    (r"(?-u:\b)[0-9]{8}(?-u:\b)", 3),
    (r"(?-u:\b)[0-9]{5}(?-u:\b)", 4),
    (r"(?-u:\b)[0-9]{7}(?-u:\b)", 5),
];

static DEFAULT_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    let keywords = compile_keywords(DEFAULT_KEYWORDS.iter().copied());
    let patterns = DEFAULT_CODE_PATTERNS
        .iter()
        .filter_map(|&(source, priority)| CodePattern::new(source, i64::from(priority)).ok())
        .collect();
    RuleSet {
        keywords,
        patterns,
        exclusion: ExclusionRule::default(),
    }
});

/// A configured context keyword, matched case-insensitively as a plain substring.
#[derive(Debug, Clone)]
pub struct Keyword {
    text: String,
    matcher: Regex,
}

impl Keyword {
    /// Compiles a keyword into a case-insensitive literal matcher.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the escaped literal exceeds the
    /// regex size limit.
    pub fn new(text: &str) -> Result<Self, Error> {
        let matcher = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: text.to_string(),
                source,
            })?;
        Ok(Self {
            text: text.to_string(),
            matcher,
        })
    }

    /// Returns the keyword as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn matcher(&self) -> &Regex {
        &self.matcher
    }
}

/// A compiled code pattern with its priority (lower is preferred).
#[derive(Debug, Clone)]
pub struct CodePattern {
    source: String,
    priority: u32,
    regex: Regex,
}

impl CodePattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPriority`] if `priority` is below 1 or out of range,
    /// and [`Error::InvalidPattern`] if the regex does not compile.
    pub fn new(source: &str, priority: i64) -> Result<Self, Error> {
        let priority = u32::try_from(priority)
            .ok()
            .filter(|&p| p >= 1)
            .ok_or_else(|| Error::InvalidPriority {
                pattern: source.to_string(),
                priority,
            })?;
        let regex = Regex::new(source).map_err(|source_err| Error::InvalidPattern {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self {
            source: source.to_string(),
            priority,
            regex,
        })
    }

    /// Returns the pattern source as configured.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the priority.
    #[must_use]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// The compiled, immutable rule set every extraction runs against.
///
/// Build one with [`RuleSet::resolve`] whenever settings change and publish it
/// as a whole; never patch an existing one.
#[derive(Debug, Clone)]
pub struct RuleSet {
    keywords: Vec<Keyword>,
    patterns: Vec<CodePattern>,
    exclusion: ExclusionRule,
}

impl Default for RuleSet {
    /// Built-in keywords and patterns, no exclusions.
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

impl RuleSet {
    /// Resolves raw settings into compiled rules, dropping entries that do not compile.
    #[must_use]
    pub fn resolve(settings: &Settings) -> Self {
        let keyword_tokens: Vec<&str> = split_list(&settings.keywords, ',').collect();
        let keywords = if keyword_tokens.is_empty() {
            debug!("No keywords configured, using defaults");
            DEFAULT_RULES.keywords.clone()
        } else {
            compile_keywords(keyword_tokens.into_iter())
        };

        let patterns = if settings.regex_items.is_empty() {
            debug!("No code patterns configured, using defaults");
            DEFAULT_RULES.patterns.clone()
        } else {
            compile_patterns(&settings.regex_items)
        };

        let exclusion = ExclusionRule::resolve(&settings.excluded_emails, &settings.exclude_regex);

        debug!(
            keywords = keywords.len(),
            patterns = patterns.len(),
            excluded_senders = exclusion.sender_count(),
            exclude_patterns = exclusion.pattern_count(),
            "Resolved rule set"
        );

        Self {
            keywords,
            patterns,
            exclusion,
        }
    }

    /// Returns the active keywords in configured order.
    #[must_use]
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    /// Returns the active code patterns in configured order.
    #[must_use]
    pub fn patterns(&self) -> &[CodePattern] {
        &self.patterns
    }

    /// Returns the exclusion rule.
    #[must_use]
    pub fn exclusion(&self) -> &ExclusionRule {
        &self.exclusion
    }
}

/// Splits a delimited settings string into trimmed, non-empty tokens.
pub(crate) fn split_list(raw: &str, delimiter: char) -> impl Iterator<Item = &str> {
    raw.split(delimiter).map(str::trim).filter(|t| !t.is_empty())
}

fn compile_keywords<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<Keyword> {
    tokens
        .filter_map(|token| match Keyword::new(token) {
            Ok(keyword) => Some(keyword),
            Err(e) => {
                warn!(error = %e, "Dropping keyword");
                None
            }
        })
        .collect()
}

fn compile_patterns(items: &[RegexItem]) -> Vec<CodePattern> {
    items
        .iter()
        .filter_map(|item| match CodePattern::new(&item.pattern, item.priority) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!(error = %e, category = %e.category(), "Dropping code pattern");
                None
            }
        })
        .collect()
}

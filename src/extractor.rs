//! The extraction pipeline.
//!
//! exclusion → keyword context → candidates → ranking. [`RuleSet::extract`] and
//! [`RuleSet::test_extraction`] run the exact same steps; the latter only
//! reports which step stopped it.
//!
//! [`CodeExtractor`] owns the active configuration. Reconfiguring builds a new
//! snapshot and swaps the shared reference, so an extraction that is already
//! running keeps reading the snapshot it started with.
//!
//! ```
//! use vericode::{CodeExtractor, Settings};
//!
//! let extractor = CodeExtractor::new(&Settings::default());
//! let code = extractor.extract("Your login code is 482913, do not share it.", None);
//! assert_eq!(code.as_deref(), Some("482913"));
//!
//! // No context keywords, no code.
//! assert_eq!(extractor.extract("Order 123456 shipped.", None), None);
//! ```

use crate::candidates::{self, Candidate};
use crate::error::FailureReason;
use crate::exclusion::ExclusionMatch;
use crate::keywords;
use crate::message::IncomingMessage;
use crate::rules::RuleSet;
use crate::settings::Settings;
use crate::span::CharIndex;
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Where a pipeline run stopped.
enum Outcome<'t, 'r> {
    Found {
        candidate: Candidate<'t, 'r>,
        keywords: Vec<&'r str>,
    },
    Failed {
        reason: FailureReason,
        keywords: Vec<&'r str>,
        exclusion: Option<ExclusionMatch>,
    },
}

fn fail<'t, 'r>(
    reason: FailureReason,
    keywords: Vec<&'r str>,
    exclusion: Option<ExclusionMatch>,
) -> Outcome<'t, 'r> {
    Outcome::Failed {
        reason,
        keywords,
        exclusion,
    }
}

impl RuleSet {
    fn run<'t, 'r>(&'r self, text: &'t str, sender: Option<&str>) -> Outcome<'t, 'r> {
        if text.trim().is_empty() {
            return fail(FailureReason::Empty, Vec::new(), None);
        }

        if let Some(hit) = self.exclusion().check(sender, text) {
            debug!(rule = %hit, "Extraction suppressed by exclusion rule");
            return fail(FailureReason::Excluded, Vec::new(), Some(hit));
        }

        let index = CharIndex::new(text);
        let scan = keywords::scan_indexed(text, self.keywords(), &index);
        let found = scan.distinct().to_vec();
        if !scan.has_context() {
            debug!(
                distinct = found.len(),
                keywords = ?found,
                "Insufficient keyword context"
            );
            return fail(FailureReason::InsufficientKeywords, found, None);
        }

        let generated = candidates::generate_indexed(text, self.patterns(), &index);
        let first_keywords = &found[..found.len().min(3)];
        debug!(
            candidates = generated.len(),
            keyword_hits = scan.hits().len(),
            keywords = ?first_keywords,
            "Collected code candidates"
        );

        match candidates::best(generated, scan.hits()) {
            Some(candidate) => Outcome::Found {
                candidate,
                keywords: found,
            },
            None => {
                debug!("No code candidate found");
                fail(FailureReason::NoCodeFound, found, None)
            }
        }
    }

    /// Returns the best verification code in `text`, or `None`.
    ///
    /// Total over its inputs: empty text, excluded messages, missing keyword
    /// context and an empty candidate list all yield `None`.
    #[must_use]
    pub fn extract(&self, text: &str, sender: Option<&str>) -> Option<String> {
        match self.run(text, sender) {
            Outcome::Found { candidate, .. } => Some(candidate.code.to_string()),
            Outcome::Failed { .. } => None,
        }
    }

    /// Runs the pipeline and reports which step decided the result.
    #[must_use]
    pub fn test_extraction(&self, text: &str, sender: Option<&str>) -> TestResult {
        match self.run(text, sender) {
            Outcome::Found {
                candidate,
                keywords,
            } => TestResult::Success {
                code: candidate.code.to_string(),
                matched_pattern: candidate.pattern.to_string(),
                found_keywords: owned(&keywords),
            },
            Outcome::Failed {
                reason,
                keywords,
                exclusion,
            } => TestResult::Failure {
                reason,
                message: failure_message(reason, &keywords, exclusion.as_ref()),
                found_keywords: owned(&keywords),
            },
        }
    }
}

fn owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(ToString::to_string).collect()
}

fn failure_message(
    reason: FailureReason,
    keywords: &[&str],
    exclusion: Option<&ExclusionMatch>,
) -> String {
    match reason {
        FailureReason::Empty => "Please paste the text to test".to_string(),
        FailureReason::Excluded => match exclusion {
            Some(hit) => format!("Message excluded by exclusion rules ({hit})"),
            None => "Message excluded by exclusion rules".to_string(),
        },
        FailureReason::InsufficientKeywords if keywords.is_empty() => {
            "Not enough keywords (at least 2). Please check your keywords settings.".to_string()
        }
        FailureReason::InsufficientKeywords => format!(
            "Found {} keywords ({}), but need at least 2. Please check your keywords settings.",
            keywords.len(),
            keywords.join(", ")
        ),
        FailureReason::NoCodeFound => format!(
            "Found {} keywords ({}), but no verification code. Please check your regex patterns.",
            keywords.len(),
            keywords.join(", ")
        ),
    }
}

/// Outcome of a diagnostic extraction, for an interactive preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    /// A code was found.
    Success {
        /// The extracted code.
        code: String,
        /// Source of the pattern that produced it.
        matched_pattern: String,
        /// Distinct keywords found, in configured order.
        found_keywords: Vec<String>,
    },
    /// No code was found.
    Failure {
        /// The step that stopped the pipeline.
        reason: FailureReason,
        /// Distinct keywords found, in configured order.
        found_keywords: Vec<String>,
        /// Human-readable explanation.
        message: String,
    },
}

impl TestResult {
    /// Returns `true` if a code was found.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, TestResult::Success { .. })
    }

    /// Returns the code, if one was found.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            TestResult::Success { code, .. } => Some(code),
            TestResult::Failure { .. } => None,
        }
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            TestResult::Success { .. } => None,
            TestResult::Failure { reason, .. } => Some(*reason),
        }
    }

    /// Returns the distinct keywords found.
    #[must_use]
    pub fn found_keywords(&self) -> &[String] {
        match self {
            TestResult::Success { found_keywords, .. }
            | TestResult::Failure { found_keywords, .. } => found_keywords,
        }
    }

    /// Renders the result as the JSON object a preview surface consumes.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TestResult::Success {
                code,
                matched_pattern,
                found_keywords,
            } => json!({
                "success": true,
                "code": code,
                "matchedPatternSource": matched_pattern,
                "foundKeywords": found_keywords,
            }),
            TestResult::Failure {
                reason,
                found_keywords,
                message,
            } => json!({
                "success": false,
                "reason": reason.as_str(),
                "foundKeywords": found_keywords,
                "message": message,
            }),
        }
    }
}

/// Settings and the rules compiled from them, published together.
#[derive(Debug, Clone)]
pub struct Snapshot {
    settings: Settings,
    rules: RuleSet,
}

impl Snapshot {
    /// Compiles `settings` into a snapshot.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            rules: RuleSet::resolve(settings),
        }
    }

    /// Returns the settings this snapshot was built from.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the compiled rules.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

/// A code found in a delivered message, with what the host needs to present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// The extracted code.
    pub code: String,
    /// The message sender as delivered.
    pub sender: Option<String>,
    /// The message subject.
    pub subject: String,
    /// Whether the host should copy the code without a click.
    pub auto_copy: bool,
    /// How long the host should show the notification; `None` until dismissed.
    pub dismiss_after: Option<Duration>,
}

/// Thread-safe holder of the active configuration.
///
/// Extraction takes a snapshot once and never locks again; reconfiguration
/// replaces the snapshot as a whole.
#[derive(Debug)]
pub struct CodeExtractor {
    active: RwLock<Arc<Snapshot>>,
}

impl Default for CodeExtractor {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl CodeExtractor {
    /// Creates an extractor from settings.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            active: RwLock::new(Arc::new(Snapshot::new(settings))),
        }
    }

    /// Returns the active snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Compiles `settings` and atomically replaces the active snapshot.
    #[instrument(name = "CodeExtractor::reconfigure", skip_all)]
    pub fn reconfigure(&self, settings: &Settings) {
        let next = Arc::new(Snapshot::new(settings));
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = next;
        info!(enabled = settings.enabled, "Configuration replaced");
    }

    /// Returns the best verification code in `text`, or `None`.
    ///
    /// Does not consult the `enabled` flag; that gates delivery handling in
    /// [`first_detection`](Self::first_detection).
    #[instrument(
        name = "CodeExtractor::extract",
        skip_all,
        fields(text_len = text.len(), has_sender = sender.is_some())
    )]
    pub fn extract(&self, text: &str, sender: Option<&str>) -> Option<String> {
        let snapshot = self.snapshot();
        let code = snapshot.rules().extract(text, sender);
        if let Some(code) = &code {
            debug!(code_len = code.len(), "Selected verification code");
        }
        code
    }

    /// Runs the pipeline with per-step failure reporting.
    #[instrument(
        name = "CodeExtractor::test_extraction",
        skip_all,
        fields(text_len = text.len(), has_sender = sender.is_some())
    )]
    pub fn test_extraction(&self, text: &str, sender: Option<&str>) -> TestResult {
        self.snapshot().rules().test_extraction(text, sender)
    }

    /// Extracts a code from a flattened message (subject and body together).
    #[must_use]
    pub fn extract_from_message(&self, message: &IncomingMessage) -> Option<String> {
        self.extract(&message.combined_text(), message.sender())
    }

    /// Scans newly delivered messages in order and returns the first code found.
    ///
    /// Returns `None` without scanning when extraction is disabled.
    #[instrument(
        name = "CodeExtractor::first_detection",
        skip_all,
        fields(messages = messages.len())
    )]
    pub fn first_detection(&self, messages: &[IncomingMessage]) -> Option<Detection> {
        let snapshot = self.snapshot();
        let settings = snapshot.settings();
        if !settings.enabled {
            debug!("Extraction disabled, skipping delivered messages");
            return None;
        }

        messages.iter().find_map(|message| {
            let code = snapshot
                .rules()
                .extract(&message.combined_text(), message.sender())?;
            info!(subject = %message.subject(), "Found verification code");
            Some(Detection {
                code,
                sender: message.sender().map(str::to_string),
                subject: message.subject().to_string(),
                auto_copy: settings.auto_copy,
                dismiss_after: settings.dismiss_after(),
            })
        })
    }
}

//! # vericode
//!
//! Decides whether a message contains a one-time verification code and, if so,
//! which substring is the best candidate.
//!
//! The decision is deterministic and driven by a configurable rule set:
//! - **Keywords**: case-insensitive substrings ("code", "verif", "验证", ...) that
//!   mark verification context. At least two distinct keywords must occur.
//! - **Code patterns**: regexes with a priority (lower is preferred), by default
//!   6, 4, 8, 5 and 7 digit numbers in that order.
//! - **Exclusions**: sender addresses and content patterns that suppress
//!   extraction outright.
//!
//! Candidates are ranked by character distance to the nearest keyword
//! occurrence, with the pattern priority breaking ties.
//!
//! ## Quick Start
//!
//! ```
//! use vericode::{CodeExtractor, Settings};
//!
//! let extractor = CodeExtractor::new(&Settings::default());
//!
//! let code = extractor.extract("verification code: 4821, login token 58391", None);
//! assert_eq!(code.as_deref(), Some("4821"));
//! ```
//!
//! ## Reconfiguration
//!
//! [`CodeExtractor::reconfigure`] compiles new settings and swaps them in as a
//! whole. Invalid patterns are dropped one by one; resolution itself never fails.
//!
//! ```
//! use vericode::{CodeExtractor, Settings};
//!
//! let extractor = CodeExtractor::default();
//! extractor.reconfigure(
//!     &Settings::builder()
//!         .keywords("pin, token")
//!         .pattern(r"\b[0-9]{6}\b", 1)
//!         .pattern(r"\b[0-9]{4", 2) // does not compile, dropped
//!         .excluded_sender("promo@shop.example")
//!         .build(),
//! );
//!
//! assert_eq!(extractor.extract("pin token 123456", None).as_deref(), Some("123456"));
//! assert_eq!(
//!     extractor.extract("pin token 123456", Some("Shop <promo@shop.example>")),
//!     None
//! );
//! ```
//!
//! ## Diagnostics
//!
//! [`CodeExtractor::test_extraction`] runs the same pipeline and reports which
//! step stopped it:
//!
//! ```
//! use vericode::{CodeExtractor, FailureReason};
//!
//! let result = CodeExtractor::default().test_extraction("Your code is 123456", None);
//! assert_eq!(result.reason(), Some(FailureReason::InsufficientKeywords));
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing`. Public entry points emit spans named
//! `CodeExtractor::extract`, `CodeExtractor::test_extraction`,
//! `CodeExtractor::first_detection` and `CodeExtractor::reconfigure`; dropped
//! rules are reported at `warn`, pipeline decisions at `debug`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod candidates;
pub mod error;
pub mod exclusion;
pub mod extractor;
pub mod keywords;
pub mod message;
pub mod rules;
pub mod settings;
pub mod span;

// Re-exports for ergonomic API
pub use error::{Error, ErrorCategory, FailureReason, Result};
pub use exclusion::{normalize_sender, ExclusionMatch, ExclusionRule};
pub use extractor::{CodeExtractor, Detection, Snapshot, TestResult};
pub use message::IncomingMessage;
pub use rules::{CodePattern, Keyword, RuleSet, DEFAULT_CODE_PATTERNS, DEFAULT_KEYWORDS};
pub use settings::{RegexItem, Settings, SettingsBuilder};

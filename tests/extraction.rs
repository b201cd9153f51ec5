//! End-to-end extraction tests.
//!
//! These run the public API only, with the built-in rules unless a test says
//! otherwise.

use std::sync::Arc;
use std::thread;

use vericode::{
    CodeExtractor, FailureReason, IncomingMessage, RuleSet, Settings, TestResult,
    DEFAULT_CODE_PATTERNS,
};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn default_extract(text: &str) -> Option<String> {
    RuleSet::default().extract(text, None)
}

// ─────────────────────────────────────────────────────────────────────────────
// Keyword context
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_login_code_adjacent_to_keyword() {
    assert_eq!(
        default_extract("Your login code is 482913, do not share it. verify soon.").as_deref(),
        Some("482913")
    );
}

#[test]
fn test_no_keywords_no_code() {
    assert_eq!(default_extract("Order 123456 shipped."), None);
}

#[test]
fn test_single_keyword_is_not_enough() {
    for text in [
        "code 123456",
        "code code code 123456",
        "Invoice code: 4821",
        "验证 123456",
    ] {
        assert_eq!(default_extract(text), None, "text: {text}");
    }
}

#[test]
fn test_two_distinct_keywords_suffice() {
    assert_eq!(default_extract("code login 4821").as_deref(), Some("4821"));
}

#[test]
fn test_chinese_context() {
    assert_eq!(
        default_extract("您的验证码是：385027，请勿泄露。").as_deref(),
        Some("385027")
    );
}

#[test]
fn test_digits_glued_to_chinese_text() {
    assert_eq!(
        default_extract("您的验证码是123456，请勿泄露。").as_deref(),
        Some("123456")
    );
    assert_eq!(default_extract("验证码123456").as_deref(), Some("123456"));
    assert_eq!(default_extract("登录验证码为4821").as_deref(), Some("4821"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Ranking
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_distance_dominates_priority() {
    assert_eq!(
        default_extract("verification code: 4821, login token 58391").as_deref(),
        Some("4821")
    );
}

#[test]
fn test_nearest_candidate_wins() {
    let text = "Reference 111111 for your account. ---------------------------------- \
                Your verification code: 654321";
    assert_eq!(default_extract(text).as_deref(), Some("654321"));
}

#[test]
fn test_priority_breaks_distance_tie() {
    // "2580" and "913355" are each one character from "code".
    assert_eq!(
        default_extract("login: 2580 code 913355").as_deref(),
        Some("913355")
    );
}

#[test]
fn test_code_before_keyword() {
    let text = "Sign in to continue. 773201 is your one-time code.";
    assert_eq!(default_extract(text).as_deref(), Some("773201"));
}

#[test]
fn test_idempotent() {
    let rules = RuleSet::default();
    let text = "verification code: 4821, login token 58391";
    assert_eq!(rules.extract(text, None), rules.extract(text, None));
}

// ─────────────────────────────────────────────────────────────────────────────
// Exclusion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_excluded_sender_is_absolute() {
    let settings = Settings {
        excluded_emails: "spam@blocked.com, other@blocked.com".into(),
        ..Settings::default()
    };
    let rules = RuleSet::resolve(&settings);
    let text = "Your login code is 482913. Verify now.";

    assert_eq!(rules.extract(text, Some("spam@blocked.com")), None);
    assert_eq!(rules.extract(text, Some("Spam Bot <SPAM@blocked.com>")), None);
    assert_eq!(
        rules.extract(text, Some("friend@ok.com")).as_deref(),
        Some("482913")
    );
    assert_eq!(rules.extract(text, None).as_deref(), Some("482913"));
}

#[test]
fn test_content_exclusion_is_absolute() {
    let settings = Settings {
        exclude_regex: "weekly digest\n(promo|coupon) code".into(),
        ..Settings::default()
    };
    let rules = RuleSet::resolve(&settings);

    assert_eq!(
        rules.extract("Use COUPON CODE 482913 at login to verify", None),
        None
    );
    assert_eq!(
        rules
            .extract("Use code 482913 at login to verify", None)
            .as_deref(),
        Some("482913")
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_pattern_leaves_others_working() {
    let json = r#"{
        "regexItems": [
            {"pattern": "\\b[0-9]{6}\\b", "priority": 1},
            {"pattern": "\\b[0-9]{4", "priority": 2},
            {"pattern": "[unbalanced", "priority": 3},
            {"pattern": "\\b[0-9]{4}\\b", "priority": 4}
        ]
    }"#;
    let settings = Settings::from_json(json).unwrap();
    let rules = RuleSet::resolve(&settings);

    assert_eq!(rules.patterns().len(), 2);
    assert_eq!(
        rules.extract("login code 4821", None).as_deref(),
        Some("4821")
    );
    assert_eq!(
        rules.extract("login code 482913", None).as_deref(),
        Some("482913")
    );
}

#[test]
fn test_custom_keywords_replace_defaults() {
    let settings = Settings {
        keywords: "pin, passcode".into(),
        ..Settings::default()
    };
    let rules = RuleSet::resolve(&settings);
    assert_eq!(rules.extract("Your passcode PIN: 7788", None).as_deref(), Some("7788"));
    assert_eq!(rules.extract("login code 7788", None), None);
}

#[test]
fn test_alphanumeric_custom_pattern() {
    let settings = Settings::builder()
        .pattern(r"\b[A-Z0-9]{3}-[A-Z0-9]{3}\b", 1)
        .build();
    let rules = RuleSet::resolve(&settings);
    assert_eq!(
        rules.extract("Your login code: K7F-2QX", None).as_deref(),
        Some("K7F-2QX")
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Diagnostics
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_diagnostic_reasons() {
    let settings = Settings {
        excluded_emails: "spam@blocked.com".into(),
        ..Settings::default()
    };
    let rules = RuleSet::resolve(&settings);

    let cases = [
        ("", None, FailureReason::Empty),
        (
            "login code 482913",
            Some("spam@blocked.com"),
            FailureReason::Excluded,
        ),
        ("Order 123456", None, FailureReason::InsufficientKeywords),
        ("login code pending", None, FailureReason::NoCodeFound),
    ];
    for (text, sender, reason) in cases {
        assert_eq!(rules.test_extraction(text, sender).reason(), Some(reason));
    }
}

#[test]
fn test_diagnostic_success_matches_extract() {
    let rules = RuleSet::default();
    let text = "verification code: 4821, login token 58391";
    let result = rules.test_extraction(text, None);

    match result {
        TestResult::Success {
            code,
            matched_pattern,
            found_keywords,
        } => {
            assert_eq!(Some(code), rules.extract(text, None));
            assert_eq!(matched_pattern, DEFAULT_CODE_PATTERNS[1].0);
            assert_eq!(found_keywords, ["code", "verif", "login"]);
        }
        TestResult::Failure { message, .. } => panic!("unexpected failure: {message}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages and concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_raw_message_pipeline() {
    let raw = concat!(
        "From: Example Login <no-reply@example.com>\r\n",
        "Subject: Your verification code\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "\r\n",
        "Hi,\r\n",
        "Enter 604218 to finish signing in.\r\n",
    );
    let message = IncomingMessage::parse(raw.as_bytes()).unwrap();
    let extractor = CodeExtractor::default();
    assert_eq!(
        extractor.extract_from_message(&message).as_deref(),
        Some("604218")
    );

    extractor.reconfigure(&Settings {
        excluded_emails: "no-reply@example.com".into(),
        ..Settings::default()
    });
    assert_eq!(extractor.extract_from_message(&message), None);
}

#[test]
fn test_concurrent_reads_and_reconfigure() {
    let extractor = Arc::new(CodeExtractor::default());
    let text = "verification code: 4821, login token 58391";

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let extractor = Arc::clone(&extractor);
            thread::spawn(move || {
                for _ in 0..100 {
                    let snapshot = extractor.snapshot();
                    let first = snapshot.rules().extract(text, None);
                    let second = snapshot.rules().extract(text, None);
                    assert_eq!(first, second);
                }
            })
        })
        .collect();

    for i in 0..20 {
        let settings = if i % 2 == 0 {
            Settings::builder().keywords("token, login").build()
        } else {
            Settings::default()
        };
        extractor.reconfigure(&settings);
    }

    for reader in readers {
        reader.join().unwrap();
    }
}

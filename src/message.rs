//! Flattening delivered messages into extraction input.
//!
//! The extraction core only ever sees one string of text and an optional
//! sender. [`IncomingMessage`] is that shape; [`IncomingMessage::parse`] builds
//! one from a raw RFC 822 message. HTML is not converted: `text/html` parts
//! are used as-is, and only when the message has no `text/plain` part.

use crate::error::{Error, Result};
use mailparse::{parse_mail, MailHeaderMap, ParsedMail};
use tracing::{debug, warn};

/// A delivered message, reduced to what extraction needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    subject: String,
    sender: Option<String>,
    body: String,
}

impl IncomingMessage {
    /// Creates a message from already-flattened parts.
    #[must_use]
    pub fn new(subject: impl Into<String>, sender: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            sender: sender.map(str::to_string),
            body: body.into(),
        }
    }

    /// Parses a raw RFC 822 message.
    ///
    /// Text parts are collected from the whole MIME tree, depth first, and
    /// joined with spaces. Parts whose body cannot be decoded are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseMessage`] if the message structure cannot be parsed.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let parsed = parse_mail(raw).map_err(|source| Error::ParseMessage { source })?;

        let subject = parsed
            .headers
            .get_first_value("Subject")
            .unwrap_or_default();
        let sender = parsed.headers.get_first_value("From");

        let mut parts = Vec::new();
        collect_text(&parsed, "text/plain", &mut parts);
        if parts.is_empty() {
            collect_text(&parsed, "text/html", &mut parts);
        }
        debug!(text_parts = parts.len(), "Flattened message");

        Ok(Self {
            subject,
            sender,
            body: parts.join(" "),
        })
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the sender as delivered (bare or `Name <address>` form).
    #[must_use]
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Returns the flattened body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns subject and body joined by a space, the text extraction runs on.
    #[must_use]
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }
}

fn collect_text(part: &ParsedMail<'_>, mimetype: &str, out: &mut Vec<String>) {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect_text(sub, mimetype, out);
        }
        return;
    }

    if !part.ctype.mimetype.eq_ignore_ascii_case(mimetype) {
        return;
    }

    match part.get_body() {
        Ok(body) => out.push(body),
        Err(e) => warn!(
            error = %e,
            mimetype,
            "Failed to decode message part, skipping"
        ),
    }
}

//! Assistant command channel.
//!
//! Typing `/gpt <question>` and pressing Enter hands the question to an
//! external [`AssistantClient`]. The editor keeps a [`PendingQuery`] and
//! re-validates it when the answer arrives, because the user may have kept
//! editing (or replaced the whole document) in the meantime.

use crate::measure::GlyphMeasure;
use crate::objects::ObjectId;
use crate::storage::BoxFuture;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Reserved prefix that turns the typing buffer into a command.
pub const COMMAND_PREFIX: &str = "/gpt ";

/// Assistant failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssistantError {
    #[error("Assistant request failed: {0}")]
    Request(String),
    #[error("Assistant returned an empty response")]
    EmptyResponse,
    #[error("No assistant is configured")]
    Unavailable,
}

/// Assistant state surfaced to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssistantStatus {
    #[default]
    Idle,
    /// At least one query is outstanding.
    Pending,
    /// The last query failed; editing is unaffected.
    Failed(String),
}

/// A recognized assistant command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantCommand {
    pub question: String,
}

/// Recognize the `/gpt ` prefix. Returns None for ordinary text.
pub fn parse_command(text: &str) -> Option<AssistantCommand> {
    let rest = text.trim_start().strip_prefix(COMMAND_PREFIX)?;
    Some(AssistantCommand {
        question: rest.trim().to_string(),
    })
}

/// A question handed out to the client, waiting for its answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuery {
    pub id: u64,
    pub question: String,
    /// Text object holding the question; answers go below it.
    pub anchor: Option<ObjectId>,
    /// Fallback insertion point (baseline-left, world) if the anchor is gone.
    pub origin: Point,
    /// Wrap width in world units.
    pub wrap_width: f64,
    pub font_size: f64,
    /// Document epoch at dispatch; a replaced document invalidates the query.
    pub epoch: u64,
}

/// External question answerer.
#[cfg(not(target_arch = "wasm32"))]
pub trait AssistantClient: Send + Sync {
    fn ask(&self, question: &str) -> BoxFuture<'_, Result<String, AssistantError>>;
}

/// External question answerer (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait AssistantClient {
    fn ask(&self, question: &str) -> BoxFuture<'_, Result<String, AssistantError>>;
}

/// Answers from a fixed table; unknown questions fail.
#[derive(Debug, Clone, Default)]
pub struct CannedAssistant {
    replies: HashMap<String, String>,
}

impl CannedAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.replies.insert(question.into(), answer.into());
        self
    }

    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.replies.insert(question.into(), answer.into());
    }
}

impl AssistantClient for CannedAssistant {
    fn ask(&self, question: &str) -> BoxFuture<'_, Result<String, AssistantError>> {
        let reply = self
            .replies
            .get(question)
            .cloned()
            .ok_or_else(|| AssistantError::Request(format!("no canned reply for {question:?}")));
        Box::pin(async move { reply })
    }
}

/// Greedy word wrap of a single paragraph to `max_width`.
///
/// Words wider than the line on their own are split by character.
pub fn wrap_text(
    text: &str,
    max_width: f64,
    font_size: f64,
    measure: &dyn GlyphMeasure,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if measure.text_width(&candidate, font_size) <= max_width {
            line = candidate;
            continue;
        }
        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if measure.text_width(word, font_size) <= max_width {
            line = word.to_string();
            continue;
        }
        for ch in word.chars() {
            line.push(ch);
            if measure.text_width(&line, font_size) > max_width && line.chars().count() > 1 {
                line.pop();
                lines.push(std::mem::replace(&mut line, ch.to_string()));
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split a response into paragraphs (blank-line separated) and wrap each.
///
/// Each returned string is one paragraph with `\n` between wrapped lines.
pub fn response_paragraphs(
    response: &str,
    max_width: f64,
    font_size: f64,
    measure: &dyn GlyphMeasure,
) -> Vec<String> {
    response
        .split("\n\n")
        .map(|para| wrap_text(para, max_width, font_size, measure).join("\n"))
        .filter(|para| !para.is_empty())
        .collect()
}

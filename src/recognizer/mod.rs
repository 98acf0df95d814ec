//! Intent recognition seam
//!
//! The hosted NLU service is a black box to the dialog logic: it takes the
//! raw turn text and answers with a top intent and an entity map. The
//! [`IntentRecognizer`] trait is that boundary; [`KeywordRecognizer`] is a
//! deterministic rule-based stand-in used by tests and local demos.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::value_objects::{Course, Intent, RecognizerResult};

/// Errors from the classifier call
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// The classifier endpoint could not be reached or answered badly
    #[error("intent recognition failed: {0}")]
    Service(String),
}

/// The NLU boundary: raw text in, intent and entities out
#[async_trait]
pub trait IntentRecognizer: Send + Sync {
    /// Classify one turn of user text
    async fn recognize(&self, text: &str) -> Result<RecognizerResult, RecognizerError>;
}

const GREETING_KEYWORDS: [&str; 4] = ["hello", "hi", "hey", "greetings"];
const CANCEL_KEYWORDS: [&str; 3] = ["cancel", "stop", "nevermind"];
const HELP_KEYWORDS: [&str; 2] = ["help", "what can you do"];

/// Rule-based recognizer mirroring the hosted model's intents and entities
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRecognizer;

impl KeywordRecognizer {
    /// Create a new keyword recognizer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IntentRecognizer for KeywordRecognizer {
    async fn recognize(&self, text: &str) -> Result<RecognizerResult, RecognizerError> {
        let lower = text.trim().to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        let top_intent = if CANCEL_KEYWORDS.iter().any(|k| words.contains(k)) {
            Intent::Cancel
        } else if HELP_KEYWORDS.iter().any(|k| words.contains(k) || lower == *k) {
            Intent::Help
        } else if let Some(course) = Course::from_utterance(&lower) {
            let mut entities = HashMap::new();
            let key = match course {
                Course::Biology => "biology",
                Course::Math => "math",
                Course::Psychology => "psychology",
                Course::ComputerScience => "computerScience",
            };
            entities.insert(key.to_string(), vec![course.utterance().to_string()]);
            debug!(course = %course, "course utterance recognized");
            return Ok(RecognizerResult {
                top_intent: Intent::Course,
                entities,
            });
        } else if GREETING_KEYWORDS.iter().any(|k| words.contains(k)) {
            Intent::Greeting
        } else {
            Intent::None
        };

        debug!(?top_intent, "utterance classified");
        Ok(RecognizerResult::intent(top_intent))
    }
}

//! Bookstore ordering bot
//!
//! A scripted conversational assistant that walks a student through
//! ordering course materials: pick a course, pick textbooks, pick
//! supplies, optionally repeat for another course, then check out with a
//! total. It provides:
//! - A per-turn router handling interruptions, intent dispatch, and
//!   checkout
//! - Repeatable selection waterfalls driven as plain state machines
//! - Per-user profile and per-conversation dialog state, flushed once per
//!   turn
//! - A catalog store loaded to completion before any turn is accepted
//!
//! The NLU service, the SQL catalog backend, and the durable state store
//! are external collaborators behind traits; in-memory implementations
//! back the tests and demos.

pub mod activity;
pub mod catalog;
pub mod dialog;
pub mod recognizer;
pub mod router;
pub mod state;
pub mod value_objects;

// Re-export main types
pub use activity::{Activity, ActivityKind, OutgoingActivity, Responder, welcome_card};

pub use catalog::{Catalog, CatalogError, CatalogSource, MemoryCatalogSource};

pub use dialog::{
    ConfirmFlow, ConfirmOutcome, DONE_OPTION, DialogFrame, DialogState, GreetingFlow,
    GreetingStep, Prompt, RETRY_PROMPT, SelectionKind, SelectionWaterfall, StepOutcome,
    TurnStatus, WaterfallState, YES_OPTION,
};

pub use recognizer::{IntentRecognizer, KeywordRecognizer, RecognizerError};

pub use router::{BotError, TurnRouter};

pub use state::{MemoryStateStore, SessionState, StateError, StateStore};

pub use value_objects::{
    CatalogItem, Course, Intent, Invoice, OrderCart, RecognizerResult, UserProfile,
};

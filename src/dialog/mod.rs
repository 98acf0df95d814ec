//! Dialog state machines and the per-conversation dialog stack
//!
//! Every flow here is a plain state machine driven by explicit step
//! functions: the turn router feeds the raw user reply in and gets back a
//! prompt to re-issue, a retry, or a completion. Flows never touch storage
//! directly; the router owns the stack and threads profile and cart access
//! through to them.

pub mod confirm;
pub mod greeting;
pub mod waterfall;

pub use confirm::{ConfirmFlow, ConfirmOutcome, YES_OPTION};
pub use greeting::{GreetingFlow, GreetingStep};
pub use waterfall::{
    DONE_OPTION, Prompt, RETRY_PROMPT, SelectionKind, SelectionWaterfall, StepOutcome,
    WaterfallState,
};

use serde::{Deserialize, Serialize};

use crate::value_objects::{OrderCart, UserProfile};

/// One frame on the dialog stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DialogFrame {
    /// Name/city collection and greeting
    Greeting(GreetingFlow),
    /// Book picker for one course round
    BookSelection(SelectionWaterfall),
    /// Supply picker
    SupplySelection(SelectionWaterfall),
    /// "Another course?" confirmation
    AnotherCourse(ConfirmFlow),
}

/// Stack status after one turn's continuation, branched on by the router
/// when nothing has responded yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnStatus {
    /// No dialog was active; fresh intent dispatch applies
    Empty,
    /// A prompt is pending user input
    Waiting,
    /// Every dialog finished this turn; checkout applies
    Complete,
    /// The stack was torn down by an interruption
    Cancelled,
}

/// Per-conversation dialog state: the active dialog stack plus the order
/// cart accumulated across course rounds. Round-trips through the session
/// store between turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogState {
    /// Active dialog stack; the last frame is the one receiving input
    pub frames: Vec<DialogFrame>,
    /// Selections accumulated across all rounds of this order
    pub cart: OrderCart,
}

impl DialogState {
    /// Fresh state with no active dialog and an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a dialog is currently active
    pub fn has_active_dialog(&self) -> bool {
        !self.frames.is_empty()
    }

    /// The active (top) frame, if any
    pub fn active_frame(&self) -> Option<&DialogFrame> {
        self.frames.last()
    }

    /// Tear down the whole stack and drop the in-progress cart
    pub fn cancel_all(&mut self) {
        self.frames.clear();
        self.cart = OrderCart::default();
    }

    /// Re-render the active frame's pending prompt, for interruption
    /// reprompts. `None` when no dialog is active or nothing is pending.
    pub fn reprompt(&self, profile: &UserProfile) -> Option<String> {
        match self.active_frame()? {
            DialogFrame::Greeting(flow) => flow.reprompt(profile),
            DialogFrame::BookSelection(waterfall) | DialogFrame::SupplySelection(waterfall) => {
                (!waterfall.is_done()).then(|| waterfall.prompt().render())
            }
            DialogFrame::AnotherCourse(flow) => Some(flow.prompt().render()),
        }
    }
}

//! Generic repeatable selection waterfall
//!
//! One waterfall instance drives one "pick items from a list until done"
//! loop. It is a plain state machine: the router feeds it the raw user
//! reply and it answers with a prompt to re-issue, a retry, or the final
//! accumulated selection. It owns only its per-invocation selection list;
//! the conversation-wide cart stays with the router.

use serde::{Deserialize, Serialize};

use crate::value_objects::CatalogItem;

/// Sentinel choice that ends the loop
pub const DONE_OPTION: &str = "done";

/// Fixed retry line for unmatched replies
pub const RETRY_PROMPT: &str = "Please choose an option from the list.";

/// A restartable choice prompt: main text, retry text, and the offered
/// choice labels in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    pub retry_text: String,
    pub choices: Vec<String>,
}

impl Prompt {
    /// Render the prompt as a single outbound message with a numbered
    /// choice list
    pub fn render(&self) -> String {
        let mut out = self.text.clone();
        for (index, choice) in self.choices.iter().enumerate() {
            out.push_str(&format!("\n   {}. {}", index + 1, choice));
        }
        out
    }

    /// Render the retry variant of this prompt
    pub fn render_retry(&self) -> String {
        let mut out = self.retry_text.clone();
        for (index, choice) in self.choices.iter().enumerate() {
            out.push_str(&format!("\n   {}. {}", index + 1, choice));
        }
        out
    }
}

/// What kind of items this waterfall offers; only the prompt wording
/// differs between the two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionKind {
    Books,
    Supplies,
}

impl SelectionKind {
    fn first_prompt(self) -> &'static str {
        match self {
            SelectionKind::Books => {
                "Please select a textbook, or `done` to move to the cart."
            }
            SelectionKind::Supplies => {
                "Please select supplies, or `done` to move to the cart."
            }
        }
    }

    fn more_prompt(self, first_selected: &str) -> String {
        match self {
            SelectionKind::Books => format!(
                "You have selected **{first_selected}**. You can add another book, or choose `done` to finish."
            ),
            SelectionKind::Supplies => format!(
                "You have selected **{first_selected}**. You can add more supplies, or choose `done` to finish."
            ),
        }
    }
}

/// Waterfall loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterfallState {
    /// Nothing selected yet; first prompt pending
    AwaitingFirstChoice,
    /// At least one item selected; follow-up prompt pending
    AwaitingAdditionalChoice,
    /// Loop finished; resuming is a no-op
    Done,
}

/// Outcome of resuming the waterfall with one user reply
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// An item was accepted; suspend on this follow-up prompt
    Prompt(Prompt),
    /// The reply matched no offered choice; re-issue with the retry line
    Retry(Prompt),
    /// The loop terminated; the accumulated selection, in selection order
    Complete(Vec<CatalogItem>),
}

/// The generic repeatable picker.
///
/// Terminates when the user picks `done` or once more than one item has
/// been accumulated. The two-item cap reproduces the shipped behavior and
/// is pending product clarification; do not widen it silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionWaterfall {
    kind: SelectionKind,
    candidates: Vec<CatalogItem>,
    selected: Vec<CatalogItem>,
    state: WaterfallState,
}

impl SelectionWaterfall {
    /// Start a fresh loop over the given candidates
    pub fn new(kind: SelectionKind, candidates: Vec<CatalogItem>) -> Self {
        Self {
            kind,
            candidates,
            selected: Vec::new(),
            state: WaterfallState::AwaitingFirstChoice,
        }
    }

    /// Whether the loop has terminated
    pub fn is_done(&self) -> bool {
        self.state == WaterfallState::Done
    }

    /// Items accumulated so far, in selection order
    pub fn selected(&self) -> &[CatalogItem] {
        &self.selected
    }

    /// The currently pending prompt: every not-yet-chosen candidate plus
    /// the `done` sentinel
    pub fn prompt(&self) -> Prompt {
        let text = match self.selected.first() {
            None => self.kind.first_prompt().to_string(),
            Some(first) => self.kind.more_prompt(&first.name),
        };
        let mut choices: Vec<String> = self
            .remaining()
            .map(CatalogItem::display_label)
            .collect();
        choices.push(DONE_OPTION.to_string());
        Prompt {
            text,
            retry_text: RETRY_PROMPT.to_string(),
            choices,
        }
    }

    /// Feed the waterfall one user reply.
    ///
    /// Resuming after termination never mutates the selection.
    pub fn resume(&mut self, input: &str) -> StepOutcome {
        if self.is_done() {
            return StepOutcome::Complete(self.selected.clone());
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case(DONE_OPTION) {
            self.state = WaterfallState::Done;
            return StepOutcome::Complete(self.selected.clone());
        }

        let Some(choice) = self.remaining().find(|item| item.matches(input)).cloned() else {
            return StepOutcome::Retry(self.prompt());
        };

        self.selected.push(choice);
        if self.selected.len() > 1 {
            self.state = WaterfallState::Done;
            return StepOutcome::Complete(self.selected.clone());
        }

        self.state = WaterfallState::AwaitingAdditionalChoice;
        StepOutcome::Prompt(self.prompt())
    }

    fn remaining(&self) -> impl Iterator<Item = &CatalogItem> {
        self.candidates
            .iter()
            .filter(|item| !self.selected.contains(item))
    }
}

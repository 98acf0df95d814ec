//! Turn router: the per-turn driver of the whole bot
//!
//! One inbound activity enters, zero or more outbound activities leave,
//! and both halves of the session state are flushed exactly once on the
//! way out. The router owns the dialog stack: it classifies the turn,
//! handles Cancel/Help interruptions, resumes whichever flow is on top of
//! the stack, chains completed waterfalls into the next one, and computes
//! the invoice when the last dialog drains.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::activity::{Activity, ActivityKind, OutgoingActivity, Responder, welcome_card};
use crate::catalog::Catalog;
use crate::dialog::{
    ConfirmFlow, ConfirmOutcome, DialogFrame, DialogState, GreetingFlow, GreetingStep,
    SelectionKind, SelectionWaterfall, StepOutcome, TurnStatus,
};
use crate::recognizer::{IntentRecognizer, RecognizerError};
use crate::state::{SessionState, StateError};
use crate::value_objects::{Course, Intent, Invoice, RecognizerResult, UserProfile};

/// Errors escaping a turn
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),

    #[error(transparent)]
    State(#[from] StateError),
}

const CANCELLED_MESSAGE: &str = "Ok. I've cancelled our last activity.";
const NOTHING_TO_CANCEL_MESSAGE: &str = "I don't have anything to cancel.";
const HELP_MESSAGES: [&str; 2] = [
    "Let me try to provide some help.",
    "I understand greetings, being asked for help, or being asked to cancel what I am doing.",
];
const NOT_UNDERSTOOD_MESSAGE: &str = "I didn't understand what you just said to me.";

/// The per-turn driver. Construction requires every collaborator up
/// front; there is no partially configured router.
pub struct TurnRouter {
    recognizer: Arc<dyn IntentRecognizer>,
    catalog: Arc<Catalog>,
    session: SessionState,
}

impl TurnRouter {
    /// Build a router over a loaded catalog
    pub fn new(
        recognizer: Arc<dyn IntentRecognizer>,
        catalog: Arc<Catalog>,
        session: SessionState,
    ) -> Self {
        Self {
            recognizer,
            catalog,
            session,
        }
    }

    /// Process one inbound activity and return the turn's outbound
    /// activities. Session state is persisted before returning on every
    /// path.
    pub async fn on_turn(&self, activity: &Activity) -> Result<Vec<OutgoingActivity>, BotError> {
        let mut responder = Responder::new();
        let (mut profile, mut dialog) = self
            .session
            .load(&activity.from_id, &activity.conversation_id)
            .await?;

        match &activity.kind {
            ActivityKind::ConversationUpdate {
                members_added,
                recipient_id,
            } => {
                for member in members_added {
                    if member != recipient_id {
                        info!(member, "welcoming new conversation member");
                        responder.welcome(welcome_card());
                    }
                }
            }
            ActivityKind::Message { text } => {
                self.on_message(text, &mut profile, &mut dialog, &mut responder)
                    .await?;
            }
        }

        self.session
            .save(&activity.from_id, &activity.conversation_id, &profile, &dialog)
            .await?;
        Ok(responder.into_activities())
    }

    async fn on_message(
        &self,
        text: &str,
        profile: &mut UserProfile,
        dialog: &mut DialogState,
        responder: &mut Responder,
    ) -> Result<(), BotError> {
        let result = self.recognizer.recognize(text).await?;
        profile.merge_entities(&result);
        debug!(intent = ?result.top_intent, "turn classified");

        let status = if self.check_interruption(&result, dialog, responder) {
            if let Some(prompt) = dialog.reprompt(profile) {
                responder.say(prompt);
            }
            TurnStatus::Cancelled
        } else {
            self.continue_stack(text, profile, dialog, responder)
        };

        // Only branch on stack status when no dialog has responded yet.
        if !responder.responded() {
            match status {
                TurnStatus::Empty => self.dispatch_intent(&result, text, dialog, profile, responder),
                TurnStatus::Waiting => {}
                TurnStatus::Complete => self.checkout(dialog, responder),
                _ => {
                    warn!(?status, "unrecognized dialog status, clearing the stack");
                    dialog.cancel_all();
                }
            }
        }
        Ok(())
    }

    /// Handle Cancel/Help before normal continuation. Returns true when
    /// the turn was an interruption.
    fn check_interruption(
        &self,
        result: &RecognizerResult,
        dialog: &mut DialogState,
        responder: &mut Responder,
    ) -> bool {
        match result.top_intent {
            Intent::Cancel => {
                if dialog.has_active_dialog() {
                    dialog.cancel_all();
                    responder.say(CANCELLED_MESSAGE);
                } else {
                    responder.say(NOTHING_TO_CANCEL_MESSAGE);
                }
                true
            }
            Intent::Help => {
                for message in HELP_MESSAGES {
                    responder.say(message);
                }
                true
            }
            _ => false,
        }
    }

    /// Resume the active dialog stack one step, chaining completed flows
    /// into their successors.
    fn continue_stack(
        &self,
        input: &str,
        profile: &mut UserProfile,
        dialog: &mut DialogState,
        responder: &mut Responder,
    ) -> TurnStatus {
        let Some(frame) = dialog.frames.last_mut() else {
            return TurnStatus::Empty;
        };

        match frame {
            DialogFrame::Greeting(flow) => match flow.resume(input, profile) {
                GreetingStep::Prompt(text) | GreetingStep::Retry(text) => {
                    responder.say(text);
                    TurnStatus::Waiting
                }
                GreetingStep::Finished(text) => {
                    responder.say(text);
                    dialog.frames.pop();
                    self.status_after_pop(dialog)
                }
            },
            DialogFrame::BookSelection(waterfall) => match waterfall.resume(input) {
                StepOutcome::Prompt(prompt) => {
                    responder.say(prompt.render());
                    TurnStatus::Waiting
                }
                StepOutcome::Retry(prompt) => {
                    responder.say(prompt.render_retry());
                    TurnStatus::Waiting
                }
                StepOutcome::Complete(selected) => {
                    info!(books = selected.len(), "book selection finished");
                    dialog.cart.books.extend(selected);
                    dialog.frames.pop();
                    self.begin_supply_selection(dialog, responder)
                }
            },
            DialogFrame::SupplySelection(waterfall) => match waterfall.resume(input) {
                StepOutcome::Prompt(prompt) => {
                    responder.say(prompt.render());
                    TurnStatus::Waiting
                }
                StepOutcome::Retry(prompt) => {
                    responder.say(prompt.render_retry());
                    TurnStatus::Waiting
                }
                StepOutcome::Complete(selected) => {
                    info!(supplies = selected.len(), "supply selection finished");
                    dialog.cart.supplies.extend(selected);
                    dialog.frames.pop();
                    let flow = ConfirmFlow::new();
                    responder.say(flow.prompt().render());
                    dialog.frames.push(DialogFrame::AnotherCourse(flow));
                    TurnStatus::Waiting
                }
            },
            DialogFrame::AnotherCourse(flow) => match flow.resume(input) {
                ConfirmOutcome::Retry(prompt) => {
                    responder.say(prompt.render_retry());
                    TurnStatus::Waiting
                }
                ConfirmOutcome::Yes => {
                    dialog.frames.pop();
                    self.begin_greeting(dialog, profile, responder)
                }
                ConfirmOutcome::Done => {
                    // Drain silently; the checkout branch emits the summary.
                    dialog.frames.pop();
                    self.status_after_pop(dialog)
                }
            },
        }
    }

    fn status_after_pop(&self, dialog: &DialogState) -> TurnStatus {
        if dialog.has_active_dialog() {
            TurnStatus::Waiting
        } else {
            TurnStatus::Complete
        }
    }

    /// Push and prompt the supply waterfall after books complete
    fn begin_supply_selection(
        &self,
        dialog: &mut DialogState,
        responder: &mut Responder,
    ) -> TurnStatus {
        let waterfall = SelectionWaterfall::new(
            SelectionKind::Supplies,
            self.catalog.supplies().to_vec(),
        );
        responder.say(waterfall.prompt().render());
        dialog.frames.push(DialogFrame::SupplySelection(waterfall));
        TurnStatus::Waiting
    }

    /// Push and start the greeting flow
    fn begin_greeting(
        &self,
        dialog: &mut DialogState,
        profile: &mut UserProfile,
        responder: &mut Responder,
    ) -> TurnStatus {
        let (flow, step) = GreetingFlow::begin(profile);
        match step {
            GreetingStep::Prompt(text) | GreetingStep::Retry(text) => {
                responder.say(text);
                dialog.frames.push(DialogFrame::Greeting(flow));
                TurnStatus::Waiting
            }
            GreetingStep::Finished(text) => {
                responder.say(text);
                self.status_after_pop(dialog)
            }
        }
    }

    /// Fresh intent dispatch when no dialog was active
    fn dispatch_intent(
        &self,
        result: &RecognizerResult,
        text: &str,
        dialog: &mut DialogState,
        profile: &mut UserProfile,
        responder: &mut Responder,
    ) {
        match result.top_intent {
            Intent::Greeting => {
                self.begin_greeting(dialog, profile, responder);
            }
            Intent::Course => match Course::from_utterance(text.trim()) {
                Some(course) => self.begin_book_selection(course, dialog, responder),
                None => {
                    responder.say(
                        "I don't recognize that course. You can say `biology`, `math`, `psychology`, or `computer science`.",
                    );
                }
            },
            _ => responder.say(NOT_UNDERSTOOD_MESSAGE),
        }
    }

    /// Push and prompt the book waterfall for one course
    fn begin_book_selection(
        &self,
        course: Course,
        dialog: &mut DialogState,
        responder: &mut Responder,
    ) {
        let candidates = self.catalog.books(course);
        if candidates.is_empty() {
            warn!(%course, "selection refused, catalog category is empty");
            responder.say(format!(
                "Sorry, the {course} book list is currently unavailable. Please try another course."
            ));
            return;
        }
        info!(%course, books = candidates.len(), "starting book selection");
        let waterfall = SelectionWaterfall::new(SelectionKind::Books, candidates.to_vec());
        responder.say(waterfall.prompt().render());
        dialog.frames.push(DialogFrame::BookSelection(waterfall));
    }

    /// Emit the checkout summary and reset the cart
    fn checkout(&self, dialog: &mut DialogState, responder: &mut Responder) {
        let invoice = Invoice::from_cart(&dialog.cart);
        info!(total = invoice.total, "order complete");
        responder.say(invoice.summary());
        dialog.cart = Default::default();
    }
}

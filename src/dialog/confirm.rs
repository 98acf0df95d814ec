//! "Another course?" confirmation flow

use serde::{Deserialize, Serialize};

use crate::dialog::waterfall::{DONE_OPTION, Prompt, RETRY_PROMPT};

/// Sentinel choice that repeats the course round
pub const YES_OPTION: &str = "yes";

/// Confirmation flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum ConfirmState {
    AwaitingChoice,
    Done,
}

/// Outcome of one confirmation reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The reply matched neither option; re-issue the prompt
    Retry(Prompt),
    /// User wants another course round
    Yes,
    /// User is done; move to checkout
    Done,
}

/// Yes/done prompt asked after the supply waterfall finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmFlow {
    state: ConfirmState,
}

impl ConfirmFlow {
    /// Create a flow waiting on its first reply
    pub fn new() -> Self {
        Self {
            state: ConfirmState::AwaitingChoice,
        }
    }

    /// The yes/done prompt
    pub fn prompt(&self) -> Prompt {
        Prompt {
            text: format!(
                "Please select `{YES_OPTION}` if you'd like to select another course, or `{DONE_OPTION}` to complete your order."
            ),
            retry_text: RETRY_PROMPT.to_string(),
            choices: vec![YES_OPTION.to_string(), DONE_OPTION.to_string()],
        }
    }

    /// Feed the flow one user reply
    pub fn resume(&mut self, input: &str) -> ConfirmOutcome {
        let input = input.trim();
        if input.eq_ignore_ascii_case(YES_OPTION) {
            self.state = ConfirmState::Done;
            ConfirmOutcome::Yes
        } else if input.eq_ignore_ascii_case(DONE_OPTION) {
            self.state = ConfirmState::Done;
            ConfirmOutcome::Done
        } else {
            ConfirmOutcome::Retry(self.prompt())
        }
    }
}

impl Default for ConfirmFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_and_done_resolve() {
        assert_eq!(ConfirmFlow::new().resume(" YES "), ConfirmOutcome::Yes);
        assert_eq!(ConfirmFlow::new().resume("done"), ConfirmOutcome::Done);
    }

    #[test]
    fn anything_else_retries() {
        let mut flow = ConfirmFlow::new();
        let ConfirmOutcome::Retry(prompt) = flow.resume("maybe") else {
            panic!("expected a retry");
        };
        assert_eq!(prompt.choices, vec!["yes", "done"]);
    }
}

//! Greeting flow
//!
//! Collects the profile fields the classifier has not already filled in
//! (name, then city), then greets the user and invites a course choice.
//! Fields already present in the profile are skipped, so for a returning
//! user the whole flow completes in one step.

use serde::{Deserialize, Serialize};

use crate::value_objects::{UserProfile, capitalize};

/// Minimum accepted length for a name or city reply
const FIELD_LENGTH_MIN: usize = 3;

const NAME_PROMPT: &str = "What is your name?";
const NAME_RETRY: &str = "Names need to be at least 3 characters long. What is your name?";
const CITY_RETRY: &str = "City names need to be at least 3 characters long. What city do you live in?";

/// Greeting flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GreetingState {
    /// Waiting for the user's name
    AwaitingName,
    /// Waiting for the user's city
    AwaitingCity,
    /// Flow finished
    Done,
}

/// One step's result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreetingStep {
    /// Suspend on this question
    Prompt(String),
    /// The reply failed validation; ask again
    Retry(String),
    /// Flow finished with this closing message
    Finished(String),
}

/// The greeting state machine. Profile reads and writes go through the
/// reference the router passes in; the flow stores no profile data itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingFlow {
    state: GreetingState,
}

impl GreetingFlow {
    /// Start the flow: ask the first missing question, or finish
    /// immediately when the profile is already complete. There is no
    /// un-begun flow state.
    pub fn begin(profile: &UserProfile) -> (Self, GreetingStep) {
        if profile.name.is_none() {
            (
                Self {
                    state: GreetingState::AwaitingName,
                },
                GreetingStep::Prompt(NAME_PROMPT.to_string()),
            )
        } else if profile.city.is_none() {
            (
                Self {
                    state: GreetingState::AwaitingCity,
                },
                GreetingStep::Prompt(city_prompt(profile)),
            )
        } else {
            (
                Self {
                    state: GreetingState::Done,
                },
                GreetingStep::Finished(closing_message(profile)),
            )
        }
    }

    /// Feed the flow one user reply
    pub fn resume(&mut self, input: &str, profile: &mut UserProfile) -> GreetingStep {
        let input = input.trim();
        match self.state {
            GreetingState::AwaitingName => {
                if input.len() < FIELD_LENGTH_MIN {
                    return GreetingStep::Retry(NAME_RETRY.to_string());
                }
                profile.name = Some(capitalize(input));
                if profile.city.is_none() {
                    self.state = GreetingState::AwaitingCity;
                    GreetingStep::Prompt(city_prompt(profile))
                } else {
                    self.state = GreetingState::Done;
                    GreetingStep::Finished(closing_message(profile))
                }
            }
            GreetingState::AwaitingCity => {
                if input.len() < FIELD_LENGTH_MIN {
                    return GreetingStep::Retry(CITY_RETRY.to_string());
                }
                profile.city = Some(capitalize(input));
                self.state = GreetingState::Done;
                GreetingStep::Finished(closing_message(profile))
            }
            GreetingState::Done => GreetingStep::Finished(closing_message(profile)),
        }
    }

    /// The pending question, for interruption reprompts
    pub fn reprompt(&self, profile: &UserProfile) -> Option<String> {
        match self.state {
            GreetingState::AwaitingName => Some(NAME_PROMPT.to_string()),
            GreetingState::AwaitingCity => Some(city_prompt(profile)),
            GreetingState::Done => None,
        }
    }
}

fn city_prompt(profile: &UserProfile) -> String {
    match &profile.name {
        Some(name) => format!("Hello {name}, what city do you live in?"),
        None => "What city do you live in?".to_string(),
    }
}

fn closing_message(profile: &UserProfile) -> String {
    let greeting = match (&profile.name, &profile.city) {
        (Some(name), Some(city)) => format!("Hi {name}, from {city}!"),
        (Some(name), None) => format!("Hi {name}!"),
        _ => "Hi there!".to_string(),
    };
    format!(
        "{greeting} Which course are you shopping for? You can say `biology`, `math`, `psychology`, or `computer science`."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_name_then_city() {
        let mut profile = UserProfile::default();
        let (mut flow, step) = GreetingFlow::begin(&profile);

        assert_eq!(step, GreetingStep::Prompt(NAME_PROMPT.to_string()));
        assert_eq!(flow.reprompt(&profile), Some(NAME_PROMPT.to_string()));
        assert_eq!(
            flow.resume("alice", &mut profile),
            GreetingStep::Prompt("Hello Alice, what city do you live in?".to_string())
        );
        let step = flow.resume("boston", &mut profile);
        let GreetingStep::Finished(message) = step else {
            panic!("expected the closing message");
        };
        assert!(message.starts_with("Hi Alice, from Boston!"));
        assert_eq!(profile.city.as_deref(), Some("Boston"));
    }

    #[test]
    fn short_replies_are_retried() {
        let mut profile = UserProfile::default();
        let (mut flow, _) = GreetingFlow::begin(&profile);

        assert!(matches!(
            flow.resume("al", &mut profile),
            GreetingStep::Retry(_)
        ));
        assert_eq!(profile.name, None);
    }

    #[test]
    fn complete_profile_finishes_immediately() {
        let profile = UserProfile {
            name: Some("Alice".to_string()),
            city: Some("Boston".to_string()),
            ..UserProfile::default()
        };
        let (flow, step) = GreetingFlow::begin(&profile);
        let GreetingStep::Finished(message) = step else {
            panic!("expected an immediate finish");
        };
        assert!(message.contains("Hi Alice, from Boston!"));
        assert_eq!(flow.reprompt(&profile), None);
    }
}

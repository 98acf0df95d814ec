//! Value objects for the bookstore ordering domain

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Entity keys produced by the intent classifier. Each key also has a
/// `_patternAny` twin emitted by pattern-based recognition.
pub const USER_NAME_ENTITIES: [&str; 2] = ["userName", "userName_patternAny"];
pub const USER_LOCATION_ENTITIES: [&str; 2] = ["userLocation", "userLocation_patternAny"];
pub const USER_UNIVERSITY_ENTITIES: [&str; 2] = ["university", "university_patternAny"];
pub const USER_BIOLOGY_ENTITIES: [&str; 2] = ["biology", "biology_patternAny"];
pub const USER_PSYCHOLOGY_ENTITIES: [&str; 2] = ["psychology", "psychology_patternAny"];
pub const USER_MATH_ENTITIES: [&str; 2] = ["math", "math_patternAny"];
pub const USER_COMPUTERSCIENCE_ENTITIES: [&str; 2] =
    ["computerScience", "computerScience_patternAny"];

/// A single catalog entry: an item name paired with its price.
///
/// The name and the price travel together so that prompt rendering and
/// invoice math never have to re-parse a display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Canonical item name as stored in the catalog
    pub name: String,
    /// Unit price in dollars
    pub price: f64,
}

impl CatalogItem {
    /// Create a new catalog item
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// Display label offered in selection prompts, price included
    pub fn display_label(&self) -> String {
        format!("{} (Price: ${} )", self.name, self.price)
    }

    /// Whether a user reply refers to this item, matching either the bare
    /// name or the full display label, ignoring case and surrounding space
    pub fn matches(&self, input: &str) -> bool {
        let input = input.trim();
        input.eq_ignore_ascii_case(&self.name) || input.eq_ignore_ascii_case(&self.display_label())
    }
}

/// Courses with a book list in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Course {
    Biology,
    Math,
    Psychology,
    ComputerScience,
}

impl Course {
    /// All courses, in catalog load order
    pub const ALL: [Course; 4] = [
        Course::Biology,
        Course::Math,
        Course::Psychology,
        Course::ComputerScience,
    ];

    /// Canonical utterance for this course, as the classifier's course
    /// entities and the catalog category keys spell it
    pub fn utterance(&self) -> &'static str {
        match self {
            Course::Biology => "biology",
            Course::Math => "math",
            Course::Psychology => "psychology",
            Course::ComputerScience => "computer science",
        }
    }

    /// Resolve a course from the raw message text. Exact match against the
    /// fixed set of course utterances; anything else is not a course.
    pub fn from_utterance(text: &str) -> Option<Course> {
        Course::ALL
            .into_iter()
            .find(|course| course.utterance() == text)
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.utterance())
    }
}

/// Intents the turn router dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// User said hello
    Greeting,
    /// User wants to abandon the current activity
    Cancel,
    /// User asked what the bot can do
    Help,
    /// User named a course to shop for
    Course,
    /// Nothing recognized
    None,
}

/// Result of one classifier call: the winning intent plus every recognized
/// entity, keyed by entity name in recognition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerResult {
    /// Highest scoring intent
    pub top_intent: Intent,
    /// Recognized entity values by entity key
    pub entities: HashMap<String, Vec<String>>,
}

impl RecognizerResult {
    /// A result with the given intent and no entities
    pub fn intent(top_intent: Intent) -> Self {
        Self {
            top_intent,
            entities: HashMap::new(),
        }
    }

    /// First recognized value for the winning entity key. Later keys
    /// overwrite earlier ones, so a `_patternAny` twin wins over its base
    /// key when both were recognized.
    pub fn first_entity(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .rev()
            .filter_map(|key| self.entities.get(*key))
            .filter_map(|values| values.first())
            .map(String::as_str)
            .next()
    }
}

/// Per-user profile, filled in field by field as entities are recognized
/// across turns. Fields are overwritten, never cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub city: Option<String>,
    pub university: Option<String>,
    pub course: Option<String>,
}

impl UserProfile {
    /// Merge recognized entities into the profile, capitalizing the first
    /// letter of each value. Unrecognized entity keys are ignored.
    pub fn merge_entities(&mut self, result: &RecognizerResult) {
        if let Some(name) = result.first_entity(&USER_NAME_ENTITIES) {
            self.name = Some(capitalize(name));
        }
        if let Some(city) = result.first_entity(&USER_LOCATION_ENTITIES) {
            self.city = Some(capitalize(city));
        }
        if let Some(university) = result.first_entity(&USER_UNIVERSITY_ENTITIES) {
            self.university = Some(capitalize(university));
        }
        for keys in [
            &USER_BIOLOGY_ENTITIES,
            &USER_PSYCHOLOGY_ENTITIES,
            &USER_MATH_ENTITIES,
            &USER_COMPUTERSCIENCE_ENTITIES,
        ] {
            if let Some(course) = result.first_entity(keys) {
                self.course = Some(capitalize(course));
            }
        }
    }
}

/// Accumulated selections for one order, scoped to a single conversation.
/// Survives across course rounds until checkout or cancellation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCart {
    /// Books chosen across all course rounds, in selection order
    pub books: Vec<CatalogItem>,
    /// Supplies chosen across all rounds, in selection order
    pub supplies: Vec<CatalogItem>,
}

impl OrderCart {
    /// Whether anything has been selected yet
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.supplies.is_empty()
    }
}

/// Checkout summary derived from a cart. Computed once at final waterfall
/// completion and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub books: Vec<CatalogItem>,
    pub supplies: Vec<CatalogItem>,
    pub total: f64,
}

impl Invoice {
    /// Total up a cart
    pub fn from_cart(cart: &OrderCart) -> Self {
        let total = cart
            .books
            .iter()
            .chain(cart.supplies.iter())
            .map(|item| item.price)
            .sum();
        Self {
            books: cart.books.clone(),
            supplies: cart.supplies.clone(),
            total,
        }
    }

    /// The one-sentence checkout summary sent to the user
    pub fn summary(&self) -> String {
        format!(
            "You have selected {}. For supplies you have selected {}. Your total cost is: ${}.",
            join_names(&self.books),
            join_names(&self.supplies),
            self.total,
        )
    }
}

fn join_names(items: &[CatalogItem]) -> String {
    items
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Capitalize the first letter, leaving the rest of the string untouched
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

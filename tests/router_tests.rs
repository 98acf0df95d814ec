//! Tests for the turn router

use std::sync::Arc;

use async_trait::async_trait;
use bookstore_bot::{
    Activity, Catalog, Course, Intent, IntentRecognizer, KeywordRecognizer, MemoryCatalogSource,
    MemoryStateStore, OutgoingActivity, RecognizerError, RecognizerResult, SessionState,
    TurnRouter,
};

fn catalog_source() -> MemoryCatalogSource {
    MemoryCatalogSource::new()
        .with_books(
            Course::Biology,
            &[("Intro Bio", 50.0), ("Genetics", 80.0), ("Ecology", 40.0)],
        )
        .with_books(Course::Psychology, &[("Cognition", 60.0)])
        .with_supplies(&[("Notebook", 5.0), ("Calculator", 25.0)])
}

async fn test_router() -> TurnRouter {
    let catalog = Catalog::load(&catalog_source()).await.unwrap();
    TurnRouter::new(
        Arc::new(KeywordRecognizer::new()),
        Arc::new(catalog),
        SessionState::new(Arc::new(MemoryStateStore::new())),
    )
}

async fn send(router: &TurnRouter, text: &str) -> Vec<String> {
    router
        .on_turn(&Activity::message("conv-1", "user-1", text))
        .await
        .unwrap()
        .iter()
        .filter_map(|activity| activity.text().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn course_utterance_starts_book_waterfall() {
    // Scenario A: "biology" offers every biology book plus done
    let router = test_router().await;
    let replies = send(&router, "biology").await;

    assert_eq!(replies.len(), 1);
    let prompt = &replies[0];
    assert!(prompt.contains("Please select a textbook"));
    assert!(prompt.contains("Intro Bio (Price: $50 )"));
    assert!(prompt.contains("Genetics (Price: $80 )"));
    assert!(prompt.contains("Ecology (Price: $40 )"));
    assert!(prompt.contains("done"));
}

#[tokio::test]
async fn one_book_then_done_chains_to_supplies() {
    // Scenario B
    let router = test_router().await;
    send(&router, "biology").await;

    let replies = send(&router, "Intro Bio").await;
    assert!(replies[0].contains("You have selected **Intro Bio**"));
    assert!(!replies[0].contains("Intro Bio (Price"));

    let replies = send(&router, "done").await;
    assert!(replies[0].contains("Please select supplies"));
    assert!(replies[0].contains("Notebook (Price: $5 )"));
}

#[tokio::test]
async fn two_books_terminate_without_done() {
    // Scenario C: the two-item cap ends the loop on its own
    let router = test_router().await;
    send(&router, "biology").await;
    send(&router, "Intro Bio").await;

    let replies = send(&router, "Genetics").await;
    assert!(
        replies[0].contains("Please select supplies"),
        "second pick should chain straight to supplies, got: {}",
        replies[0]
    );
}

#[tokio::test]
async fn cancel_clears_active_waterfall() {
    // Scenario D
    let router = test_router().await;
    send(&router, "biology").await;

    let replies = send(&router, "cancel").await;
    assert_eq!(replies, vec!["Ok. I've cancelled our last activity."]);

    // nothing survives into the next turn: a book name no longer matches
    // anything, so the router falls through to fresh dispatch
    let replies = send(&router, "Intro Bio").await;
    assert_eq!(replies, vec!["I didn't understand what you just said to me."]);
}

#[tokio::test]
async fn cancel_without_active_dialog() {
    let router = test_router().await;
    let replies = send(&router, "cancel").await;
    assert_eq!(replies, vec!["I don't have anything to cancel."]);
}

#[tokio::test]
async fn checkout_totals_books_and_supplies() {
    // Scenario E
    let router = test_router().await;
    send(&router, "biology").await;
    send(&router, "Intro Bio").await;
    send(&router, "done").await; // books -> supplies
    send(&router, "Notebook").await;
    send(&router, "done").await; // supplies -> another course?

    let replies = send(&router, "done").await;
    assert_eq!(
        replies,
        vec![
            "You have selected Intro Bio. For supplies you have selected Notebook. Your total cost is: $55."
        ]
    );
}

#[tokio::test]
async fn help_reprompts_the_pending_prompt() {
    let router = test_router().await;
    send(&router, "biology").await;

    let replies = send(&router, "help").await;
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0], "Let me try to provide some help.");
    assert!(replies[2].contains("Please select a textbook"));

    // the waterfall is still live afterwards
    let replies = send(&router, "Intro Bio").await;
    assert!(replies[0].contains("You have selected **Intro Bio**"));
}

#[tokio::test]
async fn unmatched_choice_is_retried_unbounded() {
    let router = test_router().await;
    send(&router, "biology").await;

    for _ in 0..3 {
        let replies = send(&router, "underwater basket weaving").await;
        assert!(replies[0].starts_with("Please choose an option from the list."));
    }

    // still accepting a valid pick
    let replies = send(&router, "Ecology").await;
    assert!(replies[0].contains("You have selected **Ecology**"));
}

#[tokio::test]
async fn unclassified_text_is_not_understood() {
    let router = test_router().await;
    let replies = send(&router, "chemistry").await;
    assert_eq!(replies, vec!["I didn't understand what you just said to me."]);
}

/// Recognizer that classifies everything as a course request, the way the
/// hosted model can for text the keyword rules never would
struct AlwaysCourseRecognizer;

#[async_trait]
impl IntentRecognizer for AlwaysCourseRecognizer {
    async fn recognize(&self, _text: &str) -> Result<RecognizerResult, RecognizerError> {
        Ok(RecognizerResult::intent(Intent::Course))
    }
}

#[tokio::test]
async fn unknown_course_is_refused() {
    let catalog = Catalog::load(&catalog_source()).await.unwrap();
    let router = TurnRouter::new(
        Arc::new(AlwaysCourseRecognizer),
        Arc::new(catalog),
        SessionState::new(Arc::new(MemoryStateStore::new())),
    );

    let replies = send(&router, "chemistry").await;
    assert_eq!(
        replies,
        vec![
            "I don't recognize that course. You can say `biology`, `math`, `psychology`, or `computer science`."
        ]
    );

    // no waterfall was pushed for the unresolvable course
    let replies = send(&router, "biology").await;
    assert!(replies[0].contains("Please select a textbook"));
}

#[tokio::test]
async fn empty_category_is_refused_with_a_clear_message() {
    // math was never loaded into the test catalog
    let router = test_router().await;
    let replies = send(&router, "math").await;
    assert!(replies[0].contains("math book list is currently unavailable"));

    // and no waterfall was pushed
    let replies = send(&router, "Intro Bio").await;
    assert_eq!(replies, vec!["I didn't understand what you just said to me."]);
}

#[tokio::test]
async fn greeting_collects_profile_fields() {
    let router = test_router().await;

    let replies = send(&router, "hello").await;
    assert_eq!(replies, vec!["What is your name?"]);

    let replies = send(&router, "alice").await;
    assert_eq!(replies, vec!["Hello Alice, what city do you live in?"]);

    let replies = send(&router, "boston").await;
    assert!(replies[0].starts_with("Hi Alice, from Boston!"));

    // the profile is remembered: greeting again skips straight to the end
    let replies = send(&router, "hello").await;
    assert!(replies[0].starts_with("Hi Alice, from Boston!"));
}

#[tokio::test]
async fn welcome_card_goes_to_each_new_member_except_the_bot() {
    let router = test_router().await;
    let activity = Activity::members_added(
        "conv-1",
        vec!["user-1".to_string(), "bot".to_string(), "user-2".to_string()],
        "bot",
    );
    let outgoing = router.on_turn(&activity).await.unwrap();

    assert_eq!(outgoing.len(), 2);
    assert!(
        outgoing
            .iter()
            .all(|a| matches!(a, OutgoingActivity::Welcome { .. }))
    );
}

#[tokio::test]
async fn recognizer_result_later_entity_keys_overwrite_earlier() {
    let mut result = RecognizerResult::intent(Intent::Greeting);
    result
        .entities
        .insert("userName".to_string(), vec!["robert".to_string()]);
    result
        .entities
        .insert("userName_patternAny".to_string(), vec!["bob".to_string()]);
    assert_eq!(
        result.first_entity(&["userName", "userName_patternAny"]),
        Some("bob")
    );
}

//! Activity envelope for the messaging transport
//!
//! The connector itself is out of scope; this module defines the minimal
//! envelope the turn router consumes and produces. Inbound activities are
//! either a user message or a conversation-membership change; outbound
//! activities are plain text plus the one structured welcome attachment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One inbound activity delivered by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity id
    pub id: Uuid,
    /// Conversation this activity belongs to
    pub conversation_id: String,
    /// Sender (the user for messages, the channel for updates)
    pub from_id: String,
    /// When the transport delivered the activity
    pub timestamp: DateTime<Utc>,
    /// Payload
    pub kind: ActivityKind,
}

/// Payload of an inbound activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActivityKind {
    /// A user text message
    Message {
        /// Raw message text
        text: String,
    },
    /// Members joined the conversation
    ConversationUpdate {
        /// Ids of the newly added members
        members_added: Vec<String>,
        /// Id of the activity recipient (the bot, for channel events)
        recipient_id: String,
    },
}

impl Activity {
    /// Build a message activity
    pub fn message(
        conversation_id: impl Into<String>,
        from_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id: conversation_id.into(),
            from_id: from_id.into(),
            timestamp: Utc::now(),
            kind: ActivityKind::Message { text: text.into() },
        }
    }

    /// Build a conversation-update activity for newly added members
    pub fn members_added(
        conversation_id: impl Into<String>,
        members_added: Vec<String>,
        recipient_id: impl Into<String>,
    ) -> Self {
        let recipient_id = recipient_id.into();
        Self {
            id: Uuid::new_v4(),
            conversation_id: conversation_id.into(),
            from_id: recipient_id.clone(),
            timestamp: Utc::now(),
            kind: ActivityKind::ConversationUpdate {
                members_added,
                recipient_id,
            },
        }
    }
}

/// One outbound activity produced by the turn router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutgoingActivity {
    /// Plain text message
    Message(String),
    /// Welcome attachment sent when a user joins; the card body is opaque
    /// to the dialog logic and rendered by the channel
    Welcome {
        card: serde_json::Value,
    },
}

impl OutgoingActivity {
    /// Text content, if this is a plain message
    pub fn text(&self) -> Option<&str> {
        match self {
            OutgoingActivity::Message(text) => Some(text),
            OutgoingActivity::Welcome { .. } => None,
        }
    }
}

/// Collects the outbound activities of a single turn.
///
/// The router's fresh-dispatch and checkout branches only run when nothing
/// has responded yet, so the collector also tracks that fact.
#[derive(Debug, Default)]
pub struct Responder {
    outgoing: Vec<OutgoingActivity>,
}

impl Responder {
    /// Create an empty responder for a new turn
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain text message
    pub fn say(&mut self, text: impl Into<String>) {
        self.outgoing.push(OutgoingActivity::Message(text.into()));
    }

    /// Queue the welcome attachment
    pub fn welcome(&mut self, card: serde_json::Value) {
        self.outgoing.push(OutgoingActivity::Welcome { card });
    }

    /// Whether any outbound activity has been produced this turn
    pub fn responded(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Consume the responder, yielding the turn's outbound activities
    pub fn into_activities(self) -> Vec<OutgoingActivity> {
        self.outgoing
    }
}

/// The static welcome card shown once per joining member
pub fn welcome_card() -> serde_json::Value {
    serde_json::json!({
        "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
        "type": "AdaptiveCard",
        "version": "1.0",
        "body": [
            {
                "type": "TextBlock",
                "size": "Large",
                "weight": "Bolder",
                "text": "Welcome to the campus bookstore assistant!"
            },
            {
                "type": "TextBlock",
                "wrap": true,
                "text": "Tell me which course you are shopping for and I will walk you through textbooks and supplies."
            }
        ]
    })
}

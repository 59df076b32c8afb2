//! Conversation surface that hosts the responder.
//!
//! The matcher is stateless; the turn log and the open/closed panel flag live
//! here, one [`ChatSession`] per conversation.

pub mod session;

pub use session::{SessionKey, SessionManager};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::responder::ResponseMatcher;

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One entry in the turn log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// What a host needs to own around the matcher: an append-only turn log and
/// a visibility flag for the chat panel.
pub trait ConversationSurface {
    fn append_turn(&mut self, speaker: Speaker, text: &str);
    fn is_open(&self) -> bool;
    fn toggle_open(&mut self);
    fn turns(&self) -> &[Turn];
}

/// In-memory conversation: greeting first, then user/bot pairs.
#[derive(Debug, Clone)]
pub struct ChatSession {
    greeting: String,
    turns: Vec<Turn>,
    open: bool,
    last_active: DateTime<Utc>,
}

impl ChatSession {
    /// Start a closed session seeded with `greeting` as the first bot turn.
    pub fn new(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        let mut session = Self {
            greeting,
            turns: Vec::new(),
            open: false,
            last_active: Utc::now(),
        };
        session.seed();
        session
    }

    fn seed(&mut self) {
        let greeting = self.greeting.clone();
        self.append_turn(Speaker::Bot, &greeting);
    }

    /// Record a user message and its answer.
    ///
    /// Blank input (after trimming) is dropped without touching the log and
    /// returns `None`. Otherwise the user turn keeps the original text.
    pub fn submit(&mut self, matcher: &ResponseMatcher, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            return None;
        }

        let answer = matcher.respond(input).to_string();
        self.append_turn(Speaker::User, input);
        self.append_turn(Speaker::Bot, &answer);
        Some(answer)
    }

    /// Drop everything except a fresh greeting.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.seed();
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Render the log for plain-text channels, one block per turn.
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|t| {
                let who = match t.speaker {
                    Speaker::User => "You",
                    Speaker::Bot => "Support",
                };
                format!("{}: {}", who, t.text)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl ConversationSurface for ChatSession {
    fn append_turn(&mut self, speaker: Speaker, text: &str) {
        let now = Utc::now();
        self.turns.push(Turn {
            speaker,
            text: text.to_string(),
            at: now,
        });
        self.last_active = now;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn toggle_open(&mut self) {
        self.open = !self.open;
        self.last_active = Utc::now();
    }

    fn turns(&self) -> &[Turn] {
        &self.turns
    }
}

//! Support desk: the main message loop.
//!
//! Every inbound message flows through:
//! 1. `ChannelManager::start_all()`: merged stream from all channels
//! 2. `SubmissionParser::parse()`: slash command or question
//! 3. `SessionManager`: per-conversation turn log
//! 4. `ResponseMatcher`: canned answer for questions
//! 5. `ChannelManager::respond()`: back to the originating channel

pub mod submission;

use std::sync::Arc;

use futures::StreamExt;

use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse};
use crate::config::DeskConfig;
use crate::conversation::{ConversationSurface, SessionKey, SessionManager};
use crate::error::Error;
use crate::responder::ResponseMatcher;

use submission::{HELP_TEXT, Submission, SubmissionParser};

/// The one channel whose `/quit` stops the desk.
const CONSOLE_CHANNEL: &str = "cli";

/// What handling one message produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// Send this text back.
    Reply(String),
    /// Nothing to send (blank input).
    Silent,
    /// Stop the desk.
    Quit,
}

/// Routes channel messages through sessions and the matcher.
pub struct SupportDesk {
    config: DeskConfig,
    matcher: ResponseMatcher,
    sessions: Arc<SessionManager>,
    channels: Arc<ChannelManager>,
}

impl SupportDesk {
    pub fn new(config: DeskConfig, matcher: ResponseMatcher, channels: ChannelManager) -> Self {
        let sessions = Arc::new(SessionManager::new(config.greeting.clone()));
        Self {
            config,
            matcher,
            sessions,
            channels: Arc::new(channels),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Run until `/quit`, Ctrl+C, or every channel stream ends.
    pub async fn run(self) -> Result<(), Error> {
        let mut message_stream = self.channels.start_all().await?;

        for (name, result) in self.channels.health_check_all().await {
            if let Err(e) = result {
                tracing::warn!(channel = %name, "Channel unhealthy after start: {}", e);
            }
        }

        let session_mgr = Arc::clone(&self.sessions);
        let idle_timeout = self.config.session_idle_timeout;
        let prune_interval = self.config.prune_interval;
        let pruning_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(prune_interval);
            interval.tick().await; // Skip immediate first tick
            loop {
                interval.tick().await;
                session_mgr.prune_stale_sessions(idle_timeout).await;
            }
        });

        tracing::info!(
            desk = %self.config.name,
            rules = self.matcher.table().len(),
            "Support desk ready and listening"
        );

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            match self.handle_message(&message).await {
                Handled::Reply(text) => {
                    let response =
                        OutgoingResponse::text(text).in_thread(message.thread_id.as_deref());
                    if let Err(e) = self.channels.respond(&message, response).await {
                        tracing::error!(channel = %message.channel, "Failed to respond: {}", e);
                    }
                }
                Handled::Silent => {}
                Handled::Quit => {
                    tracing::info!("Quit command received, exiting...");
                    break;
                }
            }
        }

        tracing::info!("Support desk shutting down...");
        pruning_handle.abort();
        self.channels.shutdown_all().await?;

        Ok(())
    }

    /// Handle one inbound message against its session.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Handled {
        let key = SessionKey::new(
            &message.channel,
            &message.user_id,
            message.thread_id.as_deref(),
        );

        tracing::debug!(
            channel = %message.channel,
            user = %message.user_id,
            chars = message.content.chars().count(),
            "Received message"
        );

        let submission = match SubmissionParser::parse(&message.content) {
            // Only the local console owner may stop the desk.
            Submission::Quit if message.channel != CONSOLE_CHANNEL => Submission::Question {
                content: message.content.clone(),
            },
            other => other,
        };

        match submission {
            Submission::Question { content } => {
                let matcher = &self.matcher;
                self.sessions
                    .with_session(&key, |s| s.submit(matcher, &content))
                    .await
                    .map_or(Handled::Silent, Handled::Reply)
            }
            Submission::Help => Handled::Reply(HELP_TEXT.to_string()),
            Submission::History => {
                Handled::Reply(self.sessions.with_session(&key, |s| s.transcript()).await)
            }
            Submission::Clear => {
                self.sessions.with_session(&key, |s| s.clear()).await;
                Handled::Reply(self.config.greeting.clone())
            }
            Submission::TogglePanel => {
                let open = self
                    .sessions
                    .with_session(&key, |s| {
                        s.toggle_open();
                        s.is_open()
                    })
                    .await;
                let text = if open { "Chat panel opened." } else { "Chat panel closed." };
                Handled::Reply(text.to_string())
            }
            Submission::Quit => Handled::Quit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::faq;

    fn desk() -> SupportDesk {
        SupportDesk::new(
            DeskConfig::default(),
            ResponseMatcher::default(),
            ChannelManager::new(),
        )
    }

    fn msg(content: &str) -> IncomingMessage {
        IncomingMessage::new("cli", "local-user", content)
    }

    #[tokio::test]
    async fn question_gets_answer_and_is_logged() {
        let desk = desk();
        let handled = desk.handle_message(&msg("Any discount for bulk?")).await;
        assert_eq!(handled, Handled::Reply(faq::DISCOUNTS.to_string()));

        let key = SessionKey::new("cli", "local-user", None);
        let turns = desk.sessions().with_session(&key, |s| s.turns().len()).await;
        assert_eq!(turns, 3);
    }

    #[tokio::test]
    async fn blank_question_is_silent() {
        let desk = desk();
        assert_eq!(desk.handle_message(&msg("   ")).await, Handled::Silent);
    }

    #[tokio::test]
    async fn history_returns_transcript() {
        let desk = desk();
        desk.handle_message(&msg("refund policy?")).await;

        match desk.handle_message(&msg("/history")).await {
            Handled::Reply(text) => {
                assert!(text.contains("You: refund policy?"));
                assert!(text.contains(faq::RETURNS));
            }
            other => panic!("Expected Reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn clear_replies_with_greeting() {
        let desk = desk();
        desk.handle_message(&msg("hello")).await;
        assert_eq!(
            desk.handle_message(&msg("/clear")).await,
            Handled::Reply(faq::GREETING.to_string())
        );
    }

    #[tokio::test]
    async fn toggle_reports_panel_state() {
        let desk = desk();
        assert_eq!(
            desk.handle_message(&msg("/toggle")).await,
            Handled::Reply("Chat panel opened.".into())
        );
        assert_eq!(
            desk.handle_message(&msg("/toggle")).await,
            Handled::Reply("Chat panel closed.".into())
        );
    }

    #[tokio::test]
    async fn quit_stops() {
        assert_eq!(desk().handle_message(&msg("/quit")).await, Handled::Quit);
    }

    #[tokio::test]
    async fn quit_from_web_is_just_a_question() {
        let desk = desk();
        let web = IncomingMessage::new("web", "web-visitor", "/quit");

        assert_eq!(
            desk.handle_message(&web).await,
            Handled::Reply(faq::FALLBACK.to_string())
        );

        let key = SessionKey::new("web", "web-visitor", None);
        let last = desk
            .sessions()
            .with_session(&key, |s| s.turns()[1].text.clone())
            .await;
        assert_eq!(last, "/quit");
    }

    #[tokio::test]
    async fn question_keeps_untrimmed_text() {
        let desk = desk();
        desk.handle_message(&msg("  any discount?  ")).await;

        let key = SessionKey::new("cli", "local-user", None);
        let text = desk
            .sessions()
            .with_session(&key, |s| s.turns()[1].text.clone())
            .await;
        assert_eq!(text, "  any discount?  ");
    }

    #[tokio::test]
    async fn users_do_not_share_sessions() {
        let desk = desk();
        desk.handle_message(&IncomingMessage::new("web", "a", "price?")).await;
        desk.handle_message(&IncomingMessage::new("web", "b", "size?")).await;

        assert_eq!(desk.sessions().count().await, 2);
    }
}

//! Parses chat input into desk commands or plain questions.

/// Parses user input into [`Submission`]s.
pub struct SubmissionParser;

impl SubmissionParser {
    /// Slash commands are matched case-insensitively after trimming; anything
    /// else is a question and keeps its original text.
    pub fn parse(content: &str) -> Submission {
        let lower = content.trim().to_lowercase();

        match lower.as_str() {
            "/help" | "/?" => Submission::Help,
            "/history" => Submission::History,
            "/clear" | "/new" => Submission::Clear,
            "/toggle" => Submission::TogglePanel,
            "/quit" | "/exit" => Submission::Quit,
            _ => Submission::Question {
                content: content.to_string(),
            },
        }
    }
}

/// One parsed chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A question for the responder.
    Question { content: String },
    Help,
    /// Show the session transcript.
    History,
    /// Reset the session to the greeting.
    Clear,
    /// Show or hide the chat panel.
    TogglePanel,
    /// Stop the desk.
    Quit,
}

pub const HELP_TEXT: &str = "Ask a question about our products, prices, delivery or orders.\n\nCommands:\n/history  show this conversation\n/clear    start over\n/toggle   show or hide the chat panel\n/quit     leave";

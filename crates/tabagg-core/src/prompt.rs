//! Line-oriented user interaction seam.

#[cfg(any(test, feature = "test-util"))]
use std::collections::VecDeque;
use std::io;

/// Answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// A line of input, without its trailing newline.
    Line(String),
    /// The user cancelled (Ctrl-C or end of input).
    Interrupted,
}

/// Source of interactive answers.
pub trait Prompt {
    /// Shows `question` and blocks until an answer is available.
    fn ask(&mut self, question: &str) -> io::Result<PromptResponse>;

    /// Shows an informational or error message.
    fn show(&mut self, message: &str);
}

/// Prompt that replays canned answers and records everything shown.
///
/// Once the answers run out every further question is `Interrupted`.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<PromptResponse>,
    /// Questions asked so far.
    pub questions: Vec<String>,
    /// Messages shown so far.
    pub messages: Vec<String>,
}

#[cfg(any(test, feature = "test-util"))]
impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers
                .into_iter()
                .map(|answer| PromptResponse::Line(answer.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Appends an interruption after the scripted lines.
    #[must_use]
    pub fn then_interrupt(mut self) -> Self {
        self.answers.push_back(PromptResponse::Interrupted);
        self
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> io::Result<PromptResponse> {
        self.questions.push(question.to_string());
        Ok(self
            .answers
            .pop_front()
            .unwrap_or(PromptResponse::Interrupted))
    }

    fn show(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

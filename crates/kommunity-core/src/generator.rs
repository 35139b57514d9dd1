//! The text-generation boundary.
//!
//! The loop only ever sees [`TextGenerator`]: prompt in, text out. Network
//! backends live in the runner; [`CannedGenerator`] replays fixed responses
//! for offline runs and tests.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Errors surfaced by a text generator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The backend could not be reached.
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with a non-success status.
    #[error("generator returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The backend answered but the payload did not contain text.
    #[error("malformed generator response: {0}")]
    MalformedResponse(String),
}

/// Anything that turns a prompt into generated text.
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    fn generate(&self, prompt: &str)
    -> impl Future<Output = Result<String, GeneratorError>> + Send;
}

/// A generator that cycles through a fixed list of responses.
///
/// Every prompt it receives is recorded. An empty response list makes every
/// call fail with [`GeneratorError::Unavailable`].
#[derive(Debug, Default)]
pub struct CannedGenerator {
    responses: Vec<String>,
    cursor: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CannedGenerator {
    /// Build a generator that replays `responses` in order, wrapping around.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            cursor: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// All prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent prompt, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    fn next_response(&self, prompt: &str) -> Result<String, GeneratorError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_owned());

        let n = self.cursor.fetch_add(1, Ordering::Relaxed);
        n.checked_rem(self.responses.len())
            .and_then(|idx| self.responses.get(idx))
            .cloned()
            .ok_or_else(|| GeneratorError::Unavailable("no canned responses".to_owned()))
    }
}

impl TextGenerator for CannedGenerator {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GeneratorError>> + Send {
        std::future::ready(self.next_response(prompt))
    }
}

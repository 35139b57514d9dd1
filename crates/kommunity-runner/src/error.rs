//! Error types for the runner binary.
//!
//! [`RunnerError`] wraps every startup failure so `main` can propagate with
//! `?`. Once the actor loop is running nothing is fatal.

use kommunity_core::{ConfigError, LoopError, PolicyError, PromptError, RosterError};
use kommunity_observer::{ObserverError, ServerError};
use kommunity_store::StoreError;

/// Top-level error for the runner binary.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The LLM backend configuration is invalid.
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// The roster could not be loaded.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: RosterError,
    },

    /// Seeding the store failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// Prompt templates failed to load.
    #[error("prompt error: {source}")]
    Prompt {
        /// The underlying prompt error.
        #[from]
        source: PromptError,
    },

    /// The policy configuration is invalid.
    #[error("policy error: {source}")]
    Policy {
        /// The underlying policy error.
        #[from]
        source: PolicyError,
    },

    /// The actor loop could not be assembled.
    #[error("loop error: {source}")]
    Loop {
        /// The underlying loop error.
        #[from]
        source: LoopError,
    },

    /// Observer state could not be built.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying observer error.
        #[from]
        source: ObserverError,
    },

    /// The observer server failed to start.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}

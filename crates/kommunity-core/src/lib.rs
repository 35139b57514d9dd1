//! Behavior of the Kommunity simulator: configuration, the roster, the
//! action policy, prompt rendering, the text-generation boundary, and the
//! actor loop tying them to the record store.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`roster`] -- Loading and saving actor personas
//! - [`policy`] -- Originate-or-respond decision
//! - [`prompt`] -- `minijinja` prompt templates
//! - [`generator`] -- [`TextGenerator`] trait and a canned implementation
//! - [`simulation`] -- The actor loop

pub mod config;
pub mod generator;
pub mod policy;
pub mod prompt;
pub mod roster;
pub mod simulation;

pub use config::{ConfigError, SimulationConfig};
pub use generator::{CannedGenerator, GeneratorError, TextGenerator};
pub use policy::{Action, ActionPolicy, DEFAULT_ORIGINATE_PROBABILITY, PolicyError};
pub use prompt::{PromptEngine, PromptError};
pub use roster::{RosterError, load_roster, save_roster};
pub use simulation::{LoopError, LoopSettings, SimulationLoop, StepOutcome, derive_title};

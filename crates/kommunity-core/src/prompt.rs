//! Prompt rendering via `minijinja`.
//!
//! Two templates drive the loop: `originate` asks an actor for a new topic,
//! `respond` hands it a thread and asks for a reply. Both ship built in and
//! can be replaced by `originate.j2` / `respond.j2` in a templates directory
//! so the voice of the community can be tuned without recompiling.

use std::path::Path;

use kommunity_types::{Actor, Topic};
use minijinja::{Environment, context};

const ORIGINATE_TEMPLATE: &str = "You are {{ actor.name }}, {{ actor.style }}. \
Create an interesting discussion topic for our community. Keep it to 1-2 sentences.";

const RESPOND_TEMPLATE: &str = "You are {{ actor.name }}, {{ actor.style }}. \
Here is the ongoing discussion:\n\n\
Original Topic: {{ topic.title }}\n\n{{ topic.body }}\
{% if topic.replies %}\n\nPrevious Replies:\n\
{% for reply in topic.replies %}{{ loop.index }}. {{ reply.author }}: {{ reply.content }}\n{% endfor %}\
{% endif %}\n\n\
Please provide a thoughtful reply that adds value to this conversation. \
Keep your response to 1-2 sentences.";

const ORIGINATE: &str = "originate";
const RESPOND: &str = "respond";

/// Errors raised while loading or rendering prompt templates.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// A template override could not be read.
    #[error("failed to read template {path}: {source}")]
    Io {
        /// Path of the template file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A template failed to compile or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Renders originate and respond prompts for an actor.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl std::fmt::Debug for PromptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptEngine").finish_non_exhaustive()
    }
}

impl PromptEngine {
    /// Engine with the built-in templates.
    pub fn new() -> Result<Self, PromptError> {
        let mut env = Environment::new();
        env.add_template(ORIGINATE, ORIGINATE_TEMPLATE)?;
        env.add_template(RESPOND, RESPOND_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Engine with built-ins, overridden by `originate.j2` and `respond.j2`
    /// from `dir` when those files exist.
    pub fn from_dir(dir: &Path) -> Result<Self, PromptError> {
        let mut engine = Self::new()?;
        for name in [ORIGINATE, RESPOND] {
            let path = dir.join(format!("{name}.j2"));
            if !path.is_file() {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|source| PromptError::Io {
                path: path.display().to_string(),
                source,
            })?;
            tracing::debug!(template = name, path = %path.display(), "using template override");
            engine.env.add_template_owned(name, source)?;
        }
        Ok(engine)
    }

    /// Prompt asking `actor` to start a new topic.
    pub fn originate(&self, actor: &Actor) -> Result<String, PromptError> {
        let rendered = self
            .env
            .get_template(ORIGINATE)?
            .render(context! { actor => actor })?;
        Ok(rendered)
    }

    /// Prompt asking `actor` to reply to `topic`, with every prior reply numbered.
    pub fn respond(&self, actor: &Actor, topic: &Topic) -> Result<String, PromptError> {
        let rendered = self
            .env
            .get_template(RESPOND)?
            .render(context! { actor => actor, topic => topic })?;
        Ok(rendered)
    }
}

//! The actor loop.
//!
//! Each iteration picks one actor uniformly at random, shows it the most
//! recent topics, lets the [`ActionPolicy`] choose between originating and
//! responding, asks the [`TextGenerator`] for text, and persists the result
//! through the [`RecordStore`]. Failures are logged and the loop moves on to
//! the next iteration; nothing short of process shutdown stops it.
//!
//! Store calls are synchronous file I/O and run on the blocking pool, so
//! the loop never stalls the observer sharing its runtime.

use std::sync::Arc;
use std::time::Duration;

use kommunity_store::{RecordStore, StoreError};
use kommunity_types::{Actor, Location, Reply, Topic, ellipsize, timestamp_now};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::{PolicyConfig, ScheduleConfig};
use crate::generator::{GeneratorError, TextGenerator};
use crate::policy::{Action, ActionPolicy};
use crate::prompt::{PromptEngine, PromptError};

/// Longest title derived from generated text, in characters.
pub const MAX_TITLE_CHARS: usize = 120;

/// Errors from a single loop iteration.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// Reading or writing topics failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The generator failed.
    #[error("generation failed: {0}")]
    Generator(#[from] GeneratorError),

    /// A prompt template failed to render.
    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// The loop was built without any actors.
    #[error("roster has no actors")]
    EmptyRoster,

    /// The generator returned only whitespace.
    #[error("generator returned empty text")]
    EmptyGeneration,

    /// A store call on the blocking pool did not complete.
    #[error("store task failed: {0}")]
    Task(String),
}

/// What a successful iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A new topic was written.
    Originated {
        /// Where the new topic lives.
        location: Location,
        /// Title derived from the generated text.
        title: String,
    },
    /// A reply was appended to an existing topic.
    Replied {
        /// Location of the topic that received the reply.
        location: Option<Location>,
        /// Reply count after the append.
        reply_count: usize,
    },
}

/// Pacing and visibility for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// How many recent topics an actor sees. `0` means all of them.
    pub recent_limit: usize,
    /// Base pause between iterations.
    pub interval: Duration,
    /// Upper bound of the random extra pause added to `interval`.
    pub jitter: Duration,
}

impl LoopSettings {
    /// Settings from the policy and schedule config sections.
    pub const fn from_config(policy: &PolicyConfig, schedule: &ScheduleConfig) -> Self {
        Self {
            recent_limit: policy.recent_limit,
            interval: Duration::from_millis(schedule.interval_ms),
            jitter: Duration::from_millis(schedule.jitter_ms),
        }
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default(), &ScheduleConfig::default())
    }
}

/// Drives actors against the shared store.
pub struct SimulationLoop<G, R> {
    store: Arc<RecordStore>,
    roster: Vec<Actor>,
    policy: ActionPolicy,
    prompts: PromptEngine,
    generator: G,
    rng: R,
    settings: LoopSettings,
}

impl<G, R> std::fmt::Debug for SimulationLoop<G, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationLoop")
            .field("root", &self.store.root())
            .field("actors", &self.roster.len())
            .field("policy", &self.policy)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<G, R> SimulationLoop<G, R>
where
    G: TextGenerator,
    R: Rng + Send,
{
    /// Assemble a loop. Fails with [`LoopError::EmptyRoster`] if `roster`
    /// is empty.
    pub fn new(
        store: Arc<RecordStore>,
        roster: Vec<Actor>,
        policy: ActionPolicy,
        prompts: PromptEngine,
        generator: G,
        rng: R,
        settings: LoopSettings,
    ) -> Result<Self, LoopError> {
        if roster.is_empty() {
            return Err(LoopError::EmptyRoster);
        }
        Ok(Self {
            store,
            roster,
            policy,
            prompts,
            generator,
            rng,
            settings,
        })
    }

    /// The generator, for inspecting test doubles.
    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// Run one iteration: pick, observe, decide, act.
    pub async fn step(&mut self) -> Result<StepOutcome, LoopError> {
        let actor = self.pick_actor()?;
        let limit = self.settings.recent_limit;
        let recent = self.with_store(move |store| store.scan_recent(limit)).await?;
        let action = self.policy.decide(&actor, &recent, &mut self.rng);
        debug!(
            actor = %actor.id,
            visible = recent.len(),
            originate = matches!(action, Action::Originate),
            "action chosen"
        );
        self.execute(&actor, action).await
    }

    /// Carry out `action` on behalf of `actor`.
    pub async fn execute(&self, actor: &Actor, action: Action<'_>) -> Result<StepOutcome, LoopError> {
        match action {
            Action::Originate => self.originate(actor).await,
            Action::RespondTo(topic) => self.respond(actor, topic).await,
        }
    }

    /// Run `iterations` steps with the configured pause between them.
    ///
    /// Failed steps are logged and skipped. Returns the outcomes of the
    /// steps that succeeded.
    pub async fn run_iterations(&mut self, iterations: usize) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(iterations);
        for n in 0..iterations {
            if n > 0 {
                let delay = self.next_delay();
                tokio::time::sleep(delay).await;
            }
            if let Some(outcome) = self.step_logged().await {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Run until the task is dropped.
    pub async fn run(mut self) {
        info!(
            actors = self.roster.len(),
            interval_ms = self.settings.interval.as_millis(),
            "actor loop started"
        );
        loop {
            self.step_logged().await;
            let delay = self.next_delay();
            tokio::time::sleep(delay).await;
        }
    }

    /// Pause before the next iteration: the interval plus uniform jitter.
    pub fn next_delay(&mut self) -> Duration {
        if self.settings.jitter.is_zero() {
            return self.settings.interval;
        }
        let jitter_ms = u64::try_from(self.settings.jitter.as_millis()).unwrap_or(u64::MAX);
        let extra = self.rng.random_range(0..=jitter_ms);
        self.settings
            .interval
            .saturating_add(Duration::from_millis(extra))
    }

    async fn step_logged(&mut self) -> Option<StepOutcome> {
        match self.step().await {
            Ok(outcome) => {
                match &outcome {
                    StepOutcome::Originated { location, title } => {
                        info!(%location, title = %title, "topic created");
                    }
                    StepOutcome::Replied {
                        location,
                        reply_count,
                    } => {
                        info!(location = ?location, reply_count, "reply added");
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                warn!(error = %e, "iteration failed");
                None
            }
        }
    }

    fn pick_actor(&mut self) -> Result<Actor, LoopError> {
        let idx = self.rng.random_range(0..self.roster.len());
        self.roster.get(idx).cloned().ok_or(LoopError::EmptyRoster)
    }

    async fn originate(&self, actor: &Actor) -> Result<StepOutcome, LoopError> {
        let prompt = self.prompts.originate(actor)?;
        let text = self.generate(&prompt).await?;
        let title = derive_title(&text);

        let mut topic = Topic::new(title.clone(), text, actor.id.clone(), timestamp_now());
        let location = self.with_store(move |store| store.save(&mut topic)).await?;
        Ok(StepOutcome::Originated { location, title })
    }

    async fn respond(&self, actor: &Actor, topic: &Topic) -> Result<StepOutcome, LoopError> {
        let prompt = self.prompts.respond(actor, topic)?;
        let text = self.generate(&prompt).await?;
        let reply = Reply::now(actor.id.clone(), text);

        let location = topic.location().cloned();
        let title = topic.title.clone();
        let updated = self
            .with_store(move |store| match location {
                Some(location) => store.append_reply_at(&location, reply),
                None => store.append_reply(&title, reply),
            })
            .await?;
        Ok(StepOutcome::Replied {
            location: updated.location().cloned(),
            reply_count: updated.reply_count(),
        })
    }

    async fn with_store<T, F>(&self, f: F) -> Result<T, LoopError>
    where
        T: Send + 'static,
        F: FnOnce(&RecordStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| LoopError::Task(e.to_string()))?
            .map_err(LoopError::from)
    }

    async fn generate(&self, prompt: &str) -> Result<String, LoopError> {
        let raw = self.generator.generate(prompt).await?;
        let text = raw.trim();
        if text.is_empty() {
            return Err(LoopError::EmptyGeneration);
        }
        Ok(text.to_owned())
    }
}

/// Title for a generated topic: its first non-blank line, shortened.
pub fn derive_title(text: &str) -> String {
    let first = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    ellipsize(first, MAX_TITLE_CHARS)
}

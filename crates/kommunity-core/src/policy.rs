//! The action policy: originate a topic or respond to one.
//!
//! [`ActionPolicy::decide`] is a pure function of its inputs and the random
//! source it is handed. Passing a seeded RNG reproduces the same sequence of
//! decisions.

use kommunity_types::{Actor, Topic};
use rand::Rng;

/// Originate probability used when none is configured.
pub const DEFAULT_ORIGINATE_PROBABILITY: f64 = 0.15;

/// Errors raised when building a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The originate probability is NaN or outside `[0, 1]`.
    #[error("originate probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
}

/// What an actor does this iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action<'a> {
    /// Start a new topic.
    Originate,
    /// Reply to the given topic.
    RespondTo(&'a Topic),
}

/// Chooses between originating and responding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionPolicy {
    originate_probability: f64,
}

impl Default for ActionPolicy {
    fn default() -> Self {
        Self {
            originate_probability: DEFAULT_ORIGINATE_PROBABILITY,
        }
    }
}

impl ActionPolicy {
    /// Build a policy with the given originate probability.
    pub fn new(originate_probability: f64) -> Result<Self, PolicyError> {
        if !(0.0..=1.0).contains(&originate_probability) {
            return Err(PolicyError::InvalidProbability(originate_probability));
        }
        Ok(Self {
            originate_probability,
        })
    }

    /// The configured originate probability.
    pub const fn originate_probability(&self) -> f64 {
        self.originate_probability
    }

    /// Decide what `actor` does given the topics it can see.
    ///
    /// With nothing visible the actor always originates. Otherwise it
    /// originates with the configured probability and responds to a
    /// uniformly chosen topic the rest of the time. The actor does not
    /// influence the choice yet; it is taken so persona-aware policies fit
    /// the same call.
    pub fn decide<'a, R: Rng + ?Sized>(
        &self,
        _actor: &Actor,
        recent: &'a [Topic],
        rng: &mut R,
    ) -> Action<'a> {
        if recent.is_empty() {
            return Action::Originate;
        }

        let roll: f64 = rng.random();
        if roll < self.originate_probability {
            return Action::Originate;
        }

        let idx = rng.random_range(0..recent.len());
        recent.get(idx).map_or(Action::Originate, Action::RespondTo)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn actor() -> Actor {
        Actor {
            id: "agent_1".to_owned(),
            name: "Ada".to_owned(),
            style: "a terse reviewer".to_owned(),
            courage: 0.5,
            empathy: 0.5,
            elegance: 0.5,
        }
    }

    fn topics(n: usize) -> Vec<Topic> {
        (0..n)
            .map(|i| Topic::new(format!("T{i}"), "b", "x", "2024-01-01T00:00:00Z"))
            .collect()
    }

    #[test]
    fn probability_is_validated() {
        assert!(ActionPolicy::new(0.0).is_ok());
        assert!(ActionPolicy::new(1.0).is_ok());
        assert!(ActionPolicy::new(-0.1).is_err());
        assert!(ActionPolicy::new(1.5).is_err());
        assert!(ActionPolicy::new(f64::NAN).is_err());
    }

    #[test]
    fn empty_view_always_originates() {
        let policy = ActionPolicy::new(0.0).unwrap_or_default();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(policy.decide(&actor(), &[], &mut rng), Action::Originate);
        }
    }

    #[test]
    fn zero_probability_always_responds() {
        let policy = ActionPolicy::new(0.0).unwrap_or_default();
        let recent = topics(3);
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..50 {
            assert!(matches!(
                policy.decide(&actor(), &recent, &mut rng),
                Action::RespondTo(_)
            ));
        }
    }

    #[test]
    fn full_probability_always_originates() {
        let policy = ActionPolicy::new(1.0).unwrap_or_default();
        let recent = topics(3);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(policy.decide(&actor(), &recent, &mut rng), Action::Originate);
        }
    }

    #[test]
    fn seeded_rng_reproduces_sequence() {
        let policy = ActionPolicy::default();
        let recent = topics(5);
        let run = |seed: u64| {
            let mut rng = SmallRng::seed_from_u64(seed);
            (0..100)
                .map(|_| match policy.decide(&actor(), &recent, &mut rng) {
                    Action::Originate => None,
                    Action::RespondTo(t) => Some(t.title.clone()),
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn targets_cover_every_visible_topic() {
        let policy = ActionPolicy::new(0.0).unwrap_or_default();
        let recent = topics(4);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            if let Action::RespondTo(t) = policy.decide(&actor(), &recent, &mut rng) {
                seen.insert(t.title.clone());
            }
        }
        assert_eq!(seen.len(), 4);
    }
}

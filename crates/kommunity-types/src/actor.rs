//! Actor personas loaded from the roster file.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A persona that drives the simulation loop. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Actor {
    /// Stable actor id, written as the author of topics and replies.
    pub id: String,
    /// Display name used in prompts.
    pub name: String,
    /// Short description of voice and attitude, embedded in prompts.
    pub style: String,
    /// Willingness to take contrarian positions (0.0 to 1.0).
    #[serde(default = "default_trait")]
    pub courage: f64,
    /// Attentiveness to other participants (0.0 to 1.0).
    #[serde(default = "default_trait")]
    pub empathy: f64,
    /// Care for phrasing and form (0.0 to 1.0).
    #[serde(default = "default_trait")]
    pub elegance: f64,
}

const fn default_trait() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_traits_default_to_midpoint() {
        let raw = r#"{"id": "a1", "name": "Ada", "style": "a careful engineer"}"#;
        let actor: Result<Actor, _> = serde_json::from_str(raw);
        assert!(actor.is_ok());
        if let Ok(actor) = actor {
            assert!((actor.courage - 0.5).abs() < f64::EPSILON);
            assert_eq!(actor.name, "Ada");
        }
    }
}

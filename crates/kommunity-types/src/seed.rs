//! Declarative bootstrap input for an empty store.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::topic::SEED_AUTHOR;

/// The seed document: a domain label, community tags, and starter topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeedSpec {
    /// Community domain, e.g. `"software engineering"`.
    #[serde(default)]
    pub domain: String,
    /// Community-wide tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Topics materialized once into an empty store, in order.
    #[serde(default)]
    pub seed_topics: Vec<SeedTopic>,
}

/// One starter topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeedTopic {
    /// Topic title.
    pub title: String,
    /// Opening post.
    pub body: String,
    /// Author id; defaults to the seed marker.
    #[serde(default = "default_seed_author")]
    pub author: String,
    /// Topic tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_seed_author() -> String {
    SEED_AUTHOR.to_owned()
}

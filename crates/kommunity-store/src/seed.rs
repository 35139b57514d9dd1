//! One-shot bootstrap of an empty store from a seed document.
//!
//! Seeding is gated on the store root having no entries at all. Any file,
//! even one that is not a topic, blocks it. A failure partway through leaves
//! the topics saved so far in place; the next start sees a non-empty root and
//! does not retry.

use std::fs;
use std::path::Path;

use kommunity_types::{SeedSpec, Topic, timestamp_now};
use tracing::info;

use crate::error::StoreError;
use crate::record_store::{RecordStore, root_has_entries};

/// Read and parse a seed document.
pub fn load_seed_spec(path: &Path) -> Result<SeedSpec, StoreError> {
    let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Populate `store` from the seed document at `seed_spec_path` if the store
/// root is empty or missing.
///
/// Returns the number of topics written; `0` means the store already had
/// content and nothing was touched (the seed file is not even read).
pub fn seed_if_empty(store: &RecordStore, seed_spec_path: &Path) -> Result<usize, StoreError> {
    if root_has_entries(store.root())? {
        info!(root = %store.root().display(), "store not empty, skipping seed");
        return Ok(0);
    }

    let spec = load_seed_spec(seed_spec_path)?;
    info!(
        domain = spec.domain,
        topics = spec.seed_topics.len(),
        "seeding empty store"
    );

    let bootstrap_time = timestamp_now();
    let mut written: usize = 0;
    for entry in spec.seed_topics {
        let mut topic = Topic::new(entry.title, entry.body, entry.author, bootstrap_time.clone())
            .with_tags(entry.tags);
        store.save(&mut topic)?;
        written = written.saturating_add(1);
    }

    Ok(written)
}

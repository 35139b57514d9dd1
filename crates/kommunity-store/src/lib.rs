//! File-backed topic store for the Kommunity simulator.
//!
//! Topics live as individual JSON documents under a store root. This crate
//! supplies the database-like guarantees on top of raw files: atomic
//! replacement of a record, corruption-tolerant directory scans with a
//! stable newest-first order, collision-free identity for new records, and
//! path resolution that never leaves the root.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!     0190c3e2-....json     one topic per file (new records)
//!     legacy/old_title.json any depth is tolerated on read
//! ```
//!
//! # Modules
//!
//! - [`record_store`] -- [`RecordStore`]: scan, load, save, reply append
//! - [`path`] -- Store-scoped resolution of caller-supplied paths
//! - [`seed`] -- Bootstrap an empty store from a seed document
//! - [`atomic`] -- Temp-file-then-rename JSON writes
//! - [`error`] -- [`StoreError`]

pub mod atomic;
pub mod error;
pub mod path;
pub mod record_store;
pub mod seed;

// Re-export primary types for convenience.
pub use atomic::write_json_atomic;
pub use error::StoreError;
pub use path::{relative_location, resolve};
pub use record_store::{RECORD_SUFFIX, RecordStore, file_name_for};
pub use seed::{load_seed_spec, seed_if_empty};

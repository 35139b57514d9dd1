//! Shared type definitions for the Kommunity discussion simulator.
//!
//! Every crate in the workspace speaks these types. They also flow to
//! `TypeScript` via `ts-rs` for anything rendering the community outside
//! the observer's own pages.
//!
//! # Modules
//!
//! - [`ids`] -- Opaque topic identity
//! - [`topic`] -- Topics, replies, locations, listing summaries
//! - [`actor`] -- Actor personas from the roster
//! - [`seed`] -- Seed document for bootstrapping an empty store
//! - [`text`] -- Character-safe shortening for titles and snippets

pub mod actor;
pub mod ids;
pub mod seed;
pub mod text;
pub mod topic;

// Re-export all public types at crate root for convenience.
pub use actor::Actor;
pub use ids::TopicId;
pub use seed::{SeedSpec, SeedTopic};
pub use text::ellipsize;
pub use topic::{Location, Reply, SEED_AUTHOR, Topic, TopicSummary, timestamp_now};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::TopicId::export_all();
        let _ = crate::topic::Location::export_all();
        let _ = crate::topic::Reply::export_all();
        let _ = crate::topic::Topic::export_all();
        let _ = crate::topic::TopicSummary::export_all();
        let _ = crate::actor::Actor::export_all();
        let _ = crate::seed::SeedSpec::export_all();
        let _ = crate::seed::SeedTopic::export_all();
    }
}

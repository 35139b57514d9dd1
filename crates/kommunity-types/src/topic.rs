//! Discussion topics, replies, and their store-assigned locations.
//!
//! A [`Topic`] is the unit of persistence: one topic per JSON file. Its
//! [`Location`] is never serialized; the record store assigns it on save or
//! load and it is the only handle external callers use to address a topic
//! again.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::TopicId;

/// Author marker for topics materialized from the seed file.
pub const SEED_AUTHOR: &str = "seed";

/// Current UTC time as a fixed-width ISO-8601 string (`2024-01-01T00:00:00Z`).
///
/// Record timestamps are compared as plain strings, which only orders them
/// chronologically while every timestamp shares this exact shape.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Store-relative path of a topic's backing file, always `/`-separated.
///
/// Produced by the record store. Anything that turns a `Location` back into
/// a filesystem path must go through the store's path resolver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Location(String);

impl Location {
    /// Wrap a store-relative path.
    pub fn new(relative: impl Into<String>) -> Self {
        Self(relative.into())
    }

    /// The relative path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// A single contribution appended to a topic. Identified only by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Reply {
    /// Actor id of the author.
    pub author: String,
    /// Reply text.
    pub content: String,
    /// ISO-8601 UTC creation time.
    #[serde(alias = "timestamp", alias = "createdAt")]
    pub created_at: String,
}

impl Reply {
    /// Build a reply stamped with the current time.
    pub fn now(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            created_at: timestamp_now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// A persisted discussion thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Topic {
    /// Opaque identity. Files written before ids existed get a fresh one on load.
    #[serde(default)]
    pub id: TopicId,
    /// Display title.
    pub title: String,
    /// Opening post.
    pub body: String,
    /// Actor id, or [`SEED_AUTHOR`] for seeded topics.
    pub author: String,
    /// ISO-8601 UTC creation time.
    #[serde(alias = "timestamp", alias = "createdAt")]
    pub created_at: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Upvote count.
    #[serde(default)]
    pub upvotes: u32,
    /// Downvote count.
    #[serde(default)]
    pub downvotes: u32,
    /// Replies in append order. Only ever grows.
    #[serde(default)]
    pub replies: Vec<Reply>,
    #[serde(skip)]
    #[ts(skip)]
    location: Option<Location>,
}

impl Topic {
    /// Create an unsaved topic with a fresh id, no tags, votes, or replies.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        author: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: TopicId::new(),
            title: title.into(),
            body: body.into(),
            author: author.into(),
            created_at: created_at.into(),
            tags: Vec::new(),
            upvotes: 0,
            downvotes: 0,
            replies: Vec::new(),
            location: None,
        }
    }

    /// Replace the tag list.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Where this topic lives in the store, if it has been saved or loaded.
    pub const fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Record the store location. Only the record store calls this.
    pub fn assign_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    /// Number of replies so far.
    pub fn reply_count(&self) -> usize {
        self.replies.len()
    }
}

// ---------------------------------------------------------------------------
// TopicSummary
// ---------------------------------------------------------------------------

/// Listing projection of a topic served to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TopicSummary {
    /// Display title.
    pub title: String,
    /// Author id.
    pub author: String,
    /// Raw ISO-8601 creation time.
    pub created_at: String,
    /// Human-readable creation time.
    pub when: String,
    /// Shortened body.
    pub snippet: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Number of replies.
    pub reply_count: usize,
    /// Store-relative location, used to build links.
    pub location: Option<Location>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_fixed_width_utc() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), "2024-01-01T00:00:00Z".len());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn location_is_not_serialized() {
        let mut topic = Topic::new("T", "body", "a1", "2024-01-01T00:00:00Z");
        topic.assign_location(Location::new("x.json"));
        let json = serde_json::to_value(&topic).unwrap_or_default();
        assert!(json.get("location").is_none());
        assert_eq!(json["created_at"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn legacy_record_without_id_parses() {
        let raw = r#"{
            "title": "Old topic",
            "body": "Body",
            "author": "agent_1",
            "upvotes": 2,
            "downvotes": 0,
            "timestamp": "2024-05-01T10:00:00Z",
            "tags": ["rust"],
            "replies": [
                {"author": "agent_2", "content": "hi", "timestamp": "2024-05-01T11:00:00Z"}
            ]
        }"#;
        let topic: Result<Topic, _> = serde_json::from_str(raw);
        assert!(topic.is_ok());
        let topic = topic.unwrap_or_else(|_| Topic::new("", "", "", ""));
        assert_eq!(topic.created_at, "2024-05-01T10:00:00Z");
        assert_eq!(topic.upvotes, 2);
        assert_eq!(topic.reply_count(), 1);
        assert!(topic.location().is_none());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let raw = r#"{"title": "no body"}"#;
        assert!(serde_json::from_str::<Topic>(raw).is_err());
    }
}

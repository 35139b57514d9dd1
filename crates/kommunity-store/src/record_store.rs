//! The topic store: one JSON document per topic under a root directory.
//!
//! [`RecordStore`] provides scan, load, atomic save, and reply append on top
//! of plain files. There is no index: every scan walks the tree. Writes from
//! one process are serialized through an internal mutex, so two tasks
//! appending to the same topic cannot drop each other's reply. Writers in
//! separate processes are not coordinated.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use kommunity_types::{Location, Reply, Topic, TopicId};
use tracing::{debug, info};

use crate::atomic::write_json_atomic;
use crate::error::StoreError;
use crate::path::{relative_location, resolve};

/// File suffix of topic records (matched case-insensitively on scan).
pub const RECORD_SUFFIX: &str = ".json";

/// File name given to a newly created topic.
pub fn file_name_for(id: TopicId) -> String {
    format!("{id}{RECORD_SUFFIX}")
}

/// File-backed collection of [`Topic`] records rooted at one directory.
#[derive(Debug)]
pub struct RecordStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Open a store at `root`. The directory is created lazily on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self {
            root,
            write_lock: Mutex::new(()),
        }
    }

    /// The absolute store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Load every readable topic under the root, newest first.
    ///
    /// Files that cannot be read or parsed are skipped. Ordering compares
    /// `created_at` as strings, descending; ties keep directory-name order.
    /// A missing root yields an empty list.
    pub fn scan(&self) -> Result<Vec<Topic>, StoreError> {
        let mut topics = Vec::new();
        self.walk(&self.root, &mut topics)?;
        topics.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(topics)
    }

    /// The newest `limit` topics. A `limit` of zero means no limit.
    pub fn scan_recent(&self, limit: usize) -> Result<Vec<Topic>, StoreError> {
        let mut topics = self.scan()?;
        if limit > 0 {
            topics.truncate(limit);
        }
        Ok(topics)
    }

    /// Every topic, newest first. Read API for the presentation layer.
    pub fn list_all(&self) -> Result<Vec<Topic>, StoreError> {
        self.scan()
    }

    /// Load one topic from a caller-supplied relative path.
    ///
    /// The path goes through [`resolve`], so nothing outside the root is
    /// ever opened.
    pub fn load_by_relative_path(&self, relative: &str) -> Result<Topic, StoreError> {
        let path = resolve(&self.root, relative)?;
        let mut topic = load_file(&path).map_err(|e| match e {
            StoreError::Io { source, .. } if source.kind() == ErrorKind::NotFound => {
                StoreError::NotFound(relative.to_owned())
            }
            other => other,
        })?;
        if let Some(location) = relative_location(&self.root, &path) {
            topic.assign_location(location);
        }
        Ok(topic)
    }

    /// Load the topic at `location`. Read API for the presentation layer.
    pub fn get_by_location(&self, location: &str) -> Result<Topic, StoreError> {
        self.load_by_relative_path(location)
    }

    fn walk(&self, dir: &Path, out: &mut Vec<Topic>) -> Result<(), StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut entries: Vec<fs::DirEntry> = entries
            .collect::<Result<_, _>>()
            .map_err(|e| StoreError::io(dir, e))?;
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            if is_dir {
                self.walk(&path, out)?;
                continue;
            }
            if !has_record_suffix(&path) {
                continue;
            }
            match load_file(&path) {
                Ok(mut topic) => {
                    if let Some(location) = relative_location(&self.root, &path) {
                        topic.assign_location(location);
                    }
                    out.push(topic);
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping unreadable record");
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persist `topic` and return its location.
    ///
    /// A topic that already has a location is rewritten in place. A new topic
    /// is written to `<id>.json` directly under the root; if that file
    /// already exists the save fails with [`StoreError::Conflict`] rather
    /// than replacing another record.
    pub fn save(&self, topic: &mut Topic) -> Result<Location, StoreError> {
        let _guard = self.lock();
        self.save_locked(topic)
    }

    /// Append `reply` to the first topic (newest first) titled exactly `title`.
    ///
    /// Returns the updated topic, or [`StoreError::NotFound`] if no title
    /// matches.
    pub fn append_reply(&self, title: &str, reply: Reply) -> Result<Topic, StoreError> {
        let _guard = self.lock();
        let mut topic = self
            .scan()?
            .into_iter()
            .find(|t| t.title == title)
            .ok_or_else(|| StoreError::NotFound(title.to_owned()))?;
        topic.replies.push(reply);
        self.save_locked(&mut topic)?;
        Ok(topic)
    }

    /// Append `reply` to the topic stored at `location`.
    ///
    /// The topic is re-read under the write lock, so replies appended since
    /// the caller last looked are kept.
    pub fn append_reply_at(&self, location: &Location, reply: Reply) -> Result<Topic, StoreError> {
        let _guard = self.lock();
        let mut topic = self.load_by_relative_path(location.as_str())?;
        topic.replies.push(reply);
        self.save_locked(&mut topic)?;
        Ok(topic)
    }

    fn save_locked(&self, topic: &mut Topic) -> Result<Location, StoreError> {
        let path = match topic.location() {
            Some(location) => resolve(&self.root, location.as_str())?,
            None => {
                let path = self.root.join(file_name_for(topic.id));
                if path.exists() {
                    return Err(StoreError::Conflict(file_name_for(topic.id)));
                }
                path
            }
        };

        write_json_atomic(&path, topic)?;

        let location = relative_location(&self.root, &path)
            .ok_or_else(|| StoreError::InvalidPath(path.display().to_string()))?;
        debug!(location = %location, replies = topic.replies.len(), "topic saved");
        topic.assign_location(location.clone());
        Ok(location)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a panic in another writer leaves
        // nothing inconsistent behind.
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether the store root currently contains any entry at all.
///
/// Creates the root when it does not exist.
pub(crate) fn root_has_entries(root: &Path) -> Result<bool, StoreError> {
    match fs::read_dir(root) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(root).map_err(|e| StoreError::io(root, e))?;
            info!(root = %root.display(), "created store root");
            Ok(false)
        }
        Err(e) => Err(StoreError::io(root, e)),
    }
}

fn has_record_suffix(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|n| n.ends_with(RECORD_SUFFIX))
}

fn load_file(path: &Path) -> Result<Topic, StoreError> {
    let raw = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

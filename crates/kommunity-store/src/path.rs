//! Store-scoped path resolution for externally supplied identifiers.
//!
//! [`resolve`] is the only way a caller-provided relative path (a URL
//! segment, a [`Location`] read back from a topic) becomes a filesystem
//! path. Cleaning is purely lexical: symlinks inside the store root are not
//! followed or checked, so the deployment must not place links there.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use kommunity_types::Location;

use crate::error::StoreError;

/// Resolve `relative` against `root`, refusing anything that leaves `root`.
///
/// `.` segments are dropped and `..` cancels the preceding segment. A `..`
/// with nothing left to cancel, an absolute path, or a drive prefix is a
/// [`StoreError::PathEscape`]. A path that cleans down to nothing is a
/// [`StoreError::InvalidPath`].
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf, StoreError> {
    let mut cleaned: Vec<&OsStr> = Vec::new();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => cleaned.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if cleaned.pop().is_none() {
                    return Err(StoreError::PathEscape(relative.to_owned()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::PathEscape(relative.to_owned()));
            }
        }
    }

    if cleaned.is_empty() {
        return Err(StoreError::InvalidPath(relative.to_owned()));
    }

    let mut path = root.to_path_buf();
    path.extend(cleaned);
    Ok(path)
}

/// Express `path` relative to `root` as a `/`-separated [`Location`].
///
/// Returns `None` when `path` is not under `root`.
pub fn relative_location(root: &Path, path: &Path) -> Option<Location> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(Location::new(parts.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_relative_path_stays_under_root() {
        let root = Path::new("/srv/community");
        let resolved = resolve(root, "sub/a.json");
        assert!(matches!(resolved, Ok(ref p) if p == Path::new("/srv/community/sub/a.json")));
    }

    #[test]
    fn parent_escape_is_rejected() {
        let root = Path::new("/srv/community");
        assert!(matches!(
            resolve(root, "../../etc/passwd"),
            Err(StoreError::PathEscape(_))
        ));
        assert!(matches!(
            resolve(root, "sub/../../x.json"),
            Err(StoreError::PathEscape(_))
        ));
    }

    #[test]
    fn inner_parent_segments_are_cleaned() {
        let root = Path::new("/srv/community");
        let resolved = resolve(root, "./sub/../other/./b.json");
        assert!(matches!(resolved, Ok(ref p) if p == Path::new("/srv/community/other/b.json")));
    }

    #[test]
    fn absolute_path_is_rejected() {
        let root = Path::new("/srv/community");
        assert!(matches!(
            resolve(root, "/etc/passwd"),
            Err(StoreError::PathEscape(_))
        ));
    }

    #[test]
    fn empty_path_is_invalid() {
        let root = Path::new("/srv/community");
        assert!(matches!(resolve(root, ""), Err(StoreError::InvalidPath(_))));
        assert!(matches!(resolve(root, "a/.."), Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn relative_location_uses_forward_slashes() {
        let root = Path::new("/srv/community");
        let loc = relative_location(root, Path::new("/srv/community/2024/a.json"));
        assert_eq!(loc, Some(Location::new("2024/a.json")));
        assert_eq!(relative_location(root, Path::new("/elsewhere/a.json")), None);
    }
}

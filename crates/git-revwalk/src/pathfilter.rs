//! Path-scoped filtering of walk entries, with optional rename-following.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use bstr::{BString, ByteSlice};
use git_diff::{FileDiff, FileStatus};

use crate::entry::Changes;

const RENAME_CHANGE_TYPES: [FileStatus; 2] = [FileStatus::Renamed, FileStatus::Copied];

/// Shared, mutable set of paths currently being followed.
pub type FollowedPaths = Rc<RefCell<HashSet<BString>>>;

/// True if `changed` is exactly one of the followed paths, or a path inside
/// one of them (`followed/` is a directory prefix of `changed`).
pub fn path_matches(paths: &HashSet<BString>, changed: Option<&BString>) -> bool {
    let changed = match changed {
        Some(p) => p,
        None => return false,
    };
    for followed in paths {
        if changed == followed {
            return true;
        }
        if changed.starts_with(followed.as_slice()) && changed.get(followed.len()) == Some(&b'/') {
            return true;
        }
    }
    false
}

/// True if `change` touches a followed path. When `follow` is set and the
/// change is a rename/copy matched via its new path, the followed-path set
/// is updated in place to track the file's old name going forward.
pub fn change_matches(paths: &FollowedPaths, follow: bool, change: &FileDiff) -> bool {
    let new_matches = {
        let set = paths.borrow();
        path_matches(&set, change.new_path.as_ref())
    };
    if new_matches {
        if follow && RENAME_CHANGE_TYPES.contains(&change.status) {
            let mut set = paths.borrow_mut();
            if let Some(old) = change.old_path.as_ref() {
                set.insert(old.clone());
            }
            if let Some(new) = change.new_path.as_ref() {
                set.remove(new);
            }
        }
        return true;
    }
    let set = paths.borrow();
    path_matches(&set, change.old_path.as_ref())
}

/// True if any change in `changes` touches a followed path.
///
/// For merge commits this is deliberately a first-match-wins scan across
/// every parent's change list rather than requiring all parents to agree —
/// mirroring `dulwich.walk.Walker._should_return`'s merge-commit handling.
pub fn entry_matches(paths: &FollowedPaths, follow: bool, changes: &Changes) -> bool {
    match changes {
        Changes::Flat(changes) => changes.iter().any(|c| change_matches(paths, follow, c)),
        Changes::Merge(per_parent) => per_parent
            .iter()
            .any(|parent_changes| parent_changes.iter().any(|c| change_matches(paths, follow, c))),
    }
}

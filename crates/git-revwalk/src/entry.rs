//! A single result from a walk, with lazily-computed tree changes.

use std::cell::{Ref, RefCell};

use git_diff::rename::detect_renames;
use git_diff::tree::diff_trees;
use git_diff::{DiffOptions, FileDiff};
use git_hash::ObjectId;
use git_object::{Commit, Object};
use git_odb::ObjectDatabase;

use crate::walker::GetParents;
use crate::RevWalkError;

/// Tree changes for a [`WalkEntry`].
///
/// Commits with zero or one parent produce a flat change list, relative to
/// the empty tree for root commits. Merge commits produce one change list
/// per parent, following `dulwich`'s `tree_changes_for_merge` convention.
#[derive(Debug, Clone)]
pub enum Changes {
    Flat(Vec<FileDiff>),
    Merge(Vec<Vec<FileDiff>>),
}

/// A commit visited by a [`crate::walker::Walker`], together with its
/// (lazily computed, cached) tree changes.
pub struct WalkEntry {
    pub id: ObjectId,
    pub commit: Commit,
    changes: RefCell<Option<Changes>>,
}

impl WalkEntry {
    pub fn new(id: ObjectId, commit: Commit) -> Self {
        Self {
            id,
            commit,
            changes: RefCell::new(None),
        }
    }

    /// Compute (once) and return the tree changes for this entry.
    ///
    /// `rename_threshold` of `None` disables rename detection; `Some(t)`
    /// enables it at similarity threshold `t` (0-100). `get_parents` is
    /// consulted for the parent list (not `commit.parents` directly) so that
    /// a caller-supplied virtual history (e.g. grafts, first-parent
    /// simplification) is diffed the same way it's walked.
    pub fn changes(
        &self,
        odb: &ObjectDatabase,
        rename_threshold: Option<u8>,
        get_parents: &GetParents,
    ) -> Result<Ref<'_, Changes>, RevWalkError> {
        if self.changes.borrow().is_none() {
            let computed = self.compute_changes(odb, rename_threshold, get_parents)?;
            *self.changes.borrow_mut() = Some(computed);
        }
        Ok(Ref::map(self.changes.borrow(), |c| c.as_ref().unwrap()))
    }

    fn compute_changes(
        &self,
        odb: &ObjectDatabase,
        rename_threshold: Option<u8>,
        get_parents: &GetParents,
    ) -> Result<Changes, RevWalkError> {
        let mut options = DiffOptions::default();
        if let Some(threshold) = rename_threshold {
            options.detect_renames = true;
            options.rename_threshold = threshold;
        }

        match get_parents(&self.commit).as_slice() {
            [] => {
                let files = self.diff_against(odb, None, &options, rename_threshold)?;
                Ok(Changes::Flat(files))
            }
            [parent] => {
                let parent_tree = self.parent_tree(odb, parent)?;
                let files = self.diff_against(odb, Some(parent_tree), &options, rename_threshold)?;
                Ok(Changes::Flat(files))
            }
            parents => {
                let mut per_parent = Vec::with_capacity(parents.len());
                for parent in parents {
                    let parent_tree = self.parent_tree(odb, parent)?;
                    let files =
                        self.diff_against(odb, Some(parent_tree), &options, rename_threshold)?;
                    per_parent.push(files);
                }
                Ok(Changes::Merge(per_parent))
            }
        }
    }

    fn diff_against(
        &self,
        odb: &ObjectDatabase,
        parent_tree: Option<ObjectId>,
        options: &DiffOptions,
        rename_threshold: Option<u8>,
    ) -> Result<Vec<FileDiff>, RevWalkError> {
        let mut result = diff_trees(odb, parent_tree.as_ref(), Some(&self.commit.tree), options)?;
        if let Some(threshold) = rename_threshold {
            detect_renames(odb, &mut result, threshold)?;
        }
        Ok(result.files)
    }

    fn parent_tree(&self, odb: &ObjectDatabase, parent: &ObjectId) -> Result<ObjectId, RevWalkError> {
        match odb.read(parent)? {
            Some(Object::Commit(c)) => Ok(c.tree),
            Some(_) => Err(RevWalkError::NotACommit(*parent)),
            None => Err(RevWalkError::MissingCommit(*parent)),
        }
    }
}

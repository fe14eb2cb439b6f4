//! Topological reordering of an almost-date-ordered entry stream.

use std::collections::{HashMap, VecDeque};

use git_hash::ObjectId;

use crate::entry::WalkEntry;
use crate::walker::GetParents;
use crate::RevWalkError;

/// Reorders entries so that no parent is emitted before any of its children,
/// assuming the input is already close to topological (e.g. commit-time
/// order). Drains the entire input on the first pull, then emits in FIFO
/// order, parking entries with outstanding children in `pending`.
///
/// See `dulwich.walk._topo_reorder`.
pub struct TopoReorder<I> {
    inner: Option<I>,
    get_parents: GetParents,
    todo: VecDeque<WalkEntry>,
    pending: HashMap<ObjectId, WalkEntry>,
    num_children: HashMap<ObjectId, i64>,
    drained: bool,
}

impl<I> TopoReorder<I>
where
    I: Iterator<Item = Result<WalkEntry, RevWalkError>>,
{
    pub fn new(inner: I, get_parents: GetParents) -> Self {
        Self {
            inner: Some(inner),
            get_parents,
            todo: VecDeque::new(),
            pending: HashMap::new(),
            num_children: HashMap::new(),
            drained: false,
        }
    }

    fn drain(&mut self) -> Result<(), RevWalkError> {
        if self.drained {
            return Ok(());
        }
        self.drained = true;
        let inner = self.inner.take().expect("drain runs exactly once");
        for item in inner {
            let entry = item?;
            for parent in (self.get_parents)(&entry.commit) {
                *self.num_children.entry(parent).or_insert(0) += 1;
            }
            self.todo.push_back(entry);
        }
        Ok(())
    }
}

impl<I> Iterator for TopoReorder<I>
where
    I: Iterator<Item = Result<WalkEntry, RevWalkError>>,
{
    type Item = Result<WalkEntry, RevWalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.drain() {
            return Some(Err(e));
        }
        while let Some(entry) = self.todo.pop_front() {
            let commit_id = entry.id;
            if self.num_children.get(&commit_id).copied().unwrap_or(0) > 0 {
                self.pending.insert(commit_id, entry);
                continue;
            }
            for parent_id in (self.get_parents)(&entry.commit) {
                if let Some(count) = self.num_children.get_mut(&parent_id) {
                    *count -= 1;
                    if *count == 0 {
                        if let Some(parent_entry) = self.pending.remove(&parent_id) {
                            self.todo.push_front(parent_entry);
                        }
                    }
                }
            }
            return Some(Ok(entry));
        }
        None
    }
}

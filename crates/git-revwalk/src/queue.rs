//! Priority queue of commits ordered by commit time, with ancestry exclusion.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::rc::Rc;

use git_hash::ObjectId;
use git_object::{Commit, Object};
use git_odb::ObjectDatabase;

use crate::entry::WalkEntry;
use crate::walker::GetParents;
use crate::RevWalkError;

/// Number of commits to keep walking past a `since`/exclusion boundary,
/// to tolerate commit-time clock skew between parent and child.
pub const MAX_EXTRA_COMMITS: u32 = 5;

/// Anything that can hand back walk entries in some commit order, one at a
/// time, honoring an externally-supplied exclusion set.
pub trait CommitQueue {
    fn next(&mut self) -> Result<Option<WalkEntry>, RevWalkError>;
}

struct HeapItem {
    commit_time: i64,
    id: ObjectId,
    commit: Commit,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.commit_time == other.commit_time && self.id == other.id
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.commit_time.cmp(&other.commit_time).then_with(|| self.id.cmp(&other.id))
    }
}

/// Pops commits newest-first, pushing parents as each commit is visited, and
/// propagating exclusion down through ancestors of any excluded commit.
///
/// See `dulwich.walk._CommitTimeQueue` for the algorithm this mirrors.
pub struct CommitTimeQueue<'o> {
    odb: &'o ObjectDatabase,
    get_parents: GetParents,
    excluded: Rc<RefCell<HashSet<ObjectId>>>,
    heap: BinaryHeap<HeapItem>,
    queued: HashSet<ObjectId>,
    seen: HashSet<ObjectId>,
    done: HashSet<ObjectId>,
    min_time: Option<i64>,
    last: Option<(i64, ObjectId)>,
    extra_commits_left: u32,
    finished: bool,
}

impl<'o> CommitTimeQueue<'o> {
    pub fn new(
        odb: &'o ObjectDatabase,
        include: &[ObjectId],
        excluded: Rc<RefCell<HashSet<ObjectId>>>,
        since: Option<i64>,
        get_parents: GetParents,
    ) -> Result<Self, RevWalkError> {
        let mut queue = Self {
            odb,
            get_parents,
            excluded,
            heap: BinaryHeap::new(),
            queued: HashSet::new(),
            seen: HashSet::new(),
            done: HashSet::new(),
            min_time: since,
            last: None,
            extra_commits_left: MAX_EXTRA_COMMITS,
            finished: false,
        };
        let seeds: Vec<ObjectId> = include
            .iter()
            .copied()
            .chain(queue.excluded.borrow().iter().copied())
            .collect();
        for id in seeds {
            queue.push(id)?;
        }
        Ok(queue)
    }

    fn fetch_commit(&self, id: &ObjectId) -> Result<Commit, RevWalkError> {
        match self.odb.read(id)? {
            Some(Object::Commit(c)) => Ok(c),
            Some(_) => Err(RevWalkError::NotACommit(*id)),
            None => Err(RevWalkError::MissingCommit(*id)),
        }
    }

    fn push(&mut self, id: ObjectId) -> Result<(), RevWalkError> {
        if self.queued.contains(&id) || self.done.contains(&id) {
            return Ok(());
        }
        let commit = self.fetch_commit(&id)?;
        let commit_time = commit.committer.date.timestamp;
        self.heap.push(HeapItem { commit_time, id, commit });
        self.queued.insert(id);
        self.seen.insert(id);
        Ok(())
    }

    /// Walk up from `commit`'s parents, marking every reachable ancestor
    /// still in flight as excluded, giving the exclusion set a chance to
    /// "catch up" to commits already sitting in the output delay buffer.
    fn exclude_parents(&mut self, commit: &Commit) -> Result<(), RevWalkError> {
        let mut todo = vec![commit.clone()];
        while let Some(current) = todo.pop() {
            for parent in (self.get_parents)(&current) {
                let already_excluded = self.excluded.borrow().contains(&parent);
                if !already_excluded && self.seen.contains(&parent) {
                    todo.push(self.fetch_commit(&parent)?);
                }
                self.excluded.borrow_mut().insert(parent);
            }
        }
        Ok(())
    }
}

impl<'o> CommitQueue for CommitTimeQueue<'o> {
    fn next(&mut self) -> Result<Option<WalkEntry>, RevWalkError> {
        if self.finished {
            return Ok(None);
        }
        while let Some(HeapItem { commit_time, id, commit }) = self.heap.pop() {
            self.queued.remove(&id);
            if self.done.contains(&id) {
                continue;
            }
            self.done.insert(id);

            for parent_id in (self.get_parents)(&commit) {
                self.push(parent_id)?;
            }

            let mut reset_extra_commits = true;
            let is_excluded = self.excluded.borrow().contains(&id);
            if is_excluded {
                self.exclude_parents(&commit)?;
                let all_remaining_excluded = !self.heap.is_empty()
                    && self.heap.iter().all(|h| self.excluded.borrow().contains(&h.id));
                if all_remaining_excluded {
                    let next_commit_time = self.heap.peek().expect("non-empty checked above").commit_time;
                    reset_extra_commits = match self.last {
                        Some((last_time, _)) => next_commit_time >= last_time,
                        None => false,
                    };
                }
            }

            if let Some(min_time) = self.min_time {
                if commit_time < min_time {
                    // Commits may be out of order with their parents right at
                    // the `since` boundary, so walk a few more before giving up.
                    reset_extra_commits = false;
                }
            }

            if reset_extra_commits {
                self.extra_commits_left = MAX_EXTRA_COMMITS;
            } else {
                self.extra_commits_left -= 1;
                if self.extra_commits_left == 0 {
                    break;
                }
            }

            if !is_excluded {
                self.last = Some((commit_time, id));
                return Ok(Some(WalkEntry::new(id, commit)));
            }
        }
        self.finished = true;
        Ok(None)
    }
}

//! Top-level commit walker: ties the queue, path filter, and reordering
//! stages together into a single `Iterator` over [`WalkEntry`].

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::str::FromStr;

use bstr::BString;
use git_hash::ObjectId;
use git_object::Commit;
use git_odb::ObjectDatabase;

use crate::entry::WalkEntry;
use crate::pathfilter::{entry_matches, FollowedPaths};
use crate::queue::{CommitQueue, CommitTimeQueue, MAX_EXTRA_COMMITS};
use crate::topo::TopoReorder;
use crate::RevWalkError;

/// Function used to determine a commit's parents while walking.
///
/// Defaults to the commit's real parent list; overriding it lets a caller
/// walk a rewritten or simplified ancestry graph instead.
pub type GetParents = Rc<dyn Fn(&Commit) -> Vec<ObjectId>>;

pub fn default_get_parents() -> GetParents {
    Rc::new(|commit: &Commit| commit.parents.clone())
}

/// Output ordering for a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Strictly by commit time, newest first (the queue's native order).
    Date,
    /// Topologically: no parent before any of its children. O(n) memory.
    Topo,
}

impl FromStr for Order {
    type Err = RevWalkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Order::Date),
            "topo" => Ok(Order::Topo),
            other => Err(RevWalkError::InvalidOrder(other.to_string())),
        }
    }
}

/// Construction-time options for a [`Walker`].
pub struct WalkerOptions {
    pub exclude: Vec<ObjectId>,
    pub order: Order,
    pub reverse: bool,
    pub max_entries: Option<usize>,
    pub paths: Option<Vec<BString>>,
    pub rename_threshold: Option<u8>,
    pub follow: bool,
    pub since: Option<i64>,
    pub until: Option<i64>,
    pub get_parents: GetParents,
}

impl Default for WalkerOptions {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            order: Order::Date,
            reverse: false,
            max_entries: None,
            paths: None,
            rename_threshold: None,
            follow: false,
            since: None,
            until: None,
            get_parents: default_get_parents(),
        }
    }
}

/// Streams commits reachable from an include set, honoring exclusion
/// ancestry, date bounds, and path filters, in commit-time or topological
/// order.
///
/// `Walker` itself iterates in raw queue order (commit-time, newest first);
/// call [`Walker::walk`] to additionally apply topological reordering and/or
/// reversal as configured.
pub struct Walker<'o> {
    odb: &'o ObjectDatabase,
    excluded: Rc<RefCell<HashSet<ObjectId>>>,
    order: Order,
    reverse: bool,
    max_entries: Option<usize>,
    paths: Option<FollowedPaths>,
    rename_threshold: Option<u8>,
    follow: bool,
    since: Option<i64>,
    until: Option<i64>,
    get_parents: GetParents,
    num_entries: usize,
    queue: Box<dyn CommitQueue + 'o>,
    out_queue: VecDeque<WalkEntry>,
}

impl<'o> Walker<'o> {
    pub fn new(
        odb: &'o ObjectDatabase,
        include: Vec<ObjectId>,
        options: WalkerOptions,
    ) -> Result<Self, RevWalkError> {
        if include.is_empty() {
            return Err(RevWalkError::InvalidOption(
                "include must contain at least one commit".into(),
            ));
        }
        let excluded = Rc::new(RefCell::new(
            options.exclude.iter().copied().collect::<HashSet<_>>(),
        ));
        let queue = CommitTimeQueue::new(
            odb,
            &include,
            excluded.clone(),
            options.since,
            options.get_parents.clone(),
        )?;
        Self::with_queue_and_excluded(odb, Box::new(queue), excluded, options)
    }

    /// Construct a walker over a caller-supplied queue implementation,
    /// bypassing [`CommitTimeQueue`] entirely (the `queue_cls` hook).
    pub fn with_queue(
        odb: &'o ObjectDatabase,
        queue: Box<dyn CommitQueue + 'o>,
        options: WalkerOptions,
    ) -> Result<Self, RevWalkError> {
        let excluded = Rc::new(RefCell::new(
            options.exclude.iter().copied().collect::<HashSet<_>>(),
        ));
        Self::with_queue_and_excluded(odb, queue, excluded, options)
    }

    fn with_queue_and_excluded(
        odb: &'o ObjectDatabase,
        queue: Box<dyn CommitQueue + 'o>,
        excluded: Rc<RefCell<HashSet<ObjectId>>>,
        options: WalkerOptions,
    ) -> Result<Self, RevWalkError> {
        if options.max_entries == Some(0) {
            return Err(RevWalkError::InvalidOption(
                "max_entries must be greater than zero".into(),
            ));
        }
        let rename_threshold = if options.follow && options.rename_threshold.is_none() {
            Some(50)
        } else {
            options.rename_threshold
        };
        let paths = options
            .paths
            .map(|p| Rc::new(RefCell::new(p.into_iter().collect::<HashSet<_>>())));

        Ok(Self {
            odb,
            excluded,
            order: options.order,
            reverse: options.reverse,
            max_entries: options.max_entries,
            paths,
            rename_threshold,
            follow: options.follow,
            since: options.since,
            until: options.until,
            get_parents: options.get_parents,
            num_entries: 0,
            queue,
            out_queue: VecDeque::new(),
        })
    }

    fn should_return(&self, entry: &WalkEntry) -> Result<bool, RevWalkError> {
        let commit_time = entry.commit.committer.date.timestamp;
        if let Some(since) = self.since {
            if commit_time < since {
                return Ok(false);
            }
        }
        if let Some(until) = self.until {
            if commit_time > until {
                return Ok(false);
            }
        }
        if self.excluded.borrow().contains(&entry.id) {
            return Ok(false);
        }

        let paths = match &self.paths {
            Some(paths) => paths,
            None => return Ok(true),
        };
        let changes = entry.changes(self.odb, self.rename_threshold, &self.get_parents)?;
        Ok(entry_matches(paths, self.follow, &changes))
    }

    /// Pull and filter one entry from the queue, buffering `MAX_EXTRA_COMMITS`
    /// entries before emitting any of them so the exclusion set has a chance
    /// to catch up (see `dulwich.walk.Walker._next`).
    fn pull_next(&mut self) -> Result<Option<WalkEntry>, RevWalkError> {
        loop {
            if let Some(max) = self.max_entries {
                if self.num_entries >= max {
                    return Ok(None);
                }
            }

            let pulled = self.queue.next()?;
            let pulled_is_none = pulled.is_none();
            if let Some(entry) = pulled {
                self.out_queue.push_back(entry);
            }

            if pulled_is_none || self.out_queue.len() as u32 > MAX_EXTRA_COMMITS {
                let entry = match self.out_queue.pop_front() {
                    Some(e) => e,
                    None => return Ok(None),
                };
                if self.should_return(&entry)? {
                    self.num_entries += 1;
                    return Ok(Some(entry));
                }
            }
        }
    }

    /// Apply topological reordering (if configured) and reversal (if
    /// configured), in that order, consuming the walker.
    pub fn walk(self) -> Box<dyn Iterator<Item = Result<WalkEntry, RevWalkError>> + 'o> {
        let order = self.order;
        let reverse = self.reverse;
        let get_parents = self.get_parents.clone();
        let base: Box<dyn Iterator<Item = Result<WalkEntry, RevWalkError>> + 'o> = Box::new(self);
        let ordered: Box<dyn Iterator<Item = Result<WalkEntry, RevWalkError>> + 'o> = match order {
            Order::Topo => Box::new(TopoReorder::new(base, get_parents)),
            Order::Date => base,
        };
        if reverse {
            let mut collected: Vec<_> = ordered.collect();
            collected.reverse();
            Box::new(collected.into_iter())
        } else {
            ordered
        }
    }
}

impl<'o> Iterator for Walker<'o> {
    type Item = Result<WalkEntry, RevWalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.pull_next() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

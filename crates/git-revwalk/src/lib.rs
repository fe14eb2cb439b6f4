//! Commit-history walking: ordered traversal of a commit DAG with ancestry
//! exclusion, date bounds, path filters, rename following, and topological
//! reordering.
//!
//! The entry point is [`Walker`]; build one with [`WalkerOptions`] and an
//! include set of starting commit IDs, then either iterate it directly
//! (commit-time order) or call [`Walker::walk`] to additionally apply
//! topological reordering and/or reversal.

pub mod entry;
pub mod pathfilter;
pub mod queue;
pub mod topo;
pub mod walker;

pub use entry::{Changes, WalkEntry};
pub use pathfilter::{change_matches, entry_matches, path_matches, FollowedPaths};
pub use queue::{CommitQueue, CommitTimeQueue};
pub use topo::TopoReorder;
pub use walker::{default_get_parents, GetParents, Order, Walker, WalkerOptions};

use git_hash::ObjectId;

/// Errors produced while constructing or driving a [`Walker`].
#[derive(Debug, thiserror::Error)]
pub enum RevWalkError {
    #[error("missing commit: {0}")]
    MissingCommit(ObjectId),

    #[error("object {0} is not a commit")]
    NotACommit(ObjectId),

    #[error("unknown walk order: {0:?} (expected \"date\" or \"topo\")")]
    InvalidOrder(String),

    #[error("invalid walker option: {0}")]
    InvalidOption(String),

    #[error(transparent)]
    Odb(#[from] git_odb::OdbError),

    #[error(transparent)]
    Diff(#[from] git_diff::DiffError),
}

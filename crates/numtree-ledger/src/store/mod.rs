//! Store seam for the ledger.
//!
//! The ledger and its views are written against the primitives of
//! [`LedgerStore`]: id allocation, append, point lookup, ordered range scans
//! with a limit, and counting by foreign key. Two implementations ship:
//!
//! - [`RocksStore`] - persistent, RocksDB-backed
//! - [`MemoryStore`] - in-process, for tests and embedding

mod memory;
mod rocks;
mod sequence;

pub use memory::MemoryStore;
pub use rocks::RocksStore;

use crate::error::Result;
use crate::models::{Author, AuthorId, Node, NodeId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identity and creation time handed out together for a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub id: NodeId,
    pub created_at: DateTime<Utc>,
}

/// An ordered range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// Roots by `created_at` descending, strictly older than `before`.
    Roots {
        before: Option<DateTime<Utc>>,
        limit: usize,
    },
    /// Every node of a tree (root included) by id ascending, strictly after `after`.
    Tree {
        root_id: NodeId,
        after: Option<NodeId>,
        limit: usize,
    },
    /// Direct children of a node by id ascending, strictly after `after`.
    Children {
        parent_id: NodeId,
        after: Option<NodeId>,
        limit: usize,
    },
}

/// Foreign key to count nodes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKey {
    /// Nodes whose `root_id` matches, the root itself included.
    Root(NodeId),
    /// Nodes whose `parent_id` matches.
    Parent(NodeId),
}

/// Entity counts, for admin reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub nodes: u64,
    pub roots: u64,
    pub authors: u64,
}

/// Storage primitives the ledger is built on.
///
/// Implementations must keep each [`LedgerStore::insert`] atomic: a node and
/// all of its index entries become visible together or not at all.
pub trait LedgerStore: Send + Sync {
    /// Reserve the id and timestamp for the next node.
    ///
    /// Both strictly increase across calls, including across reopen.
    fn allocate(&self) -> Result<Stamp>;

    /// Append a node. Nodes are never updated after insertion.
    fn insert(&self, node: &Node) -> Result<()>;

    /// Allocate a stamp, build a node from it and insert it, as one step.
    ///
    /// Appends are serialized, so a node never becomes visible before one
    /// with a lower id. If `build` fails nothing is written and the stamp is
    /// not consumed.
    fn append(&self, build: &dyn Fn(Stamp) -> Result<Node>) -> Result<Node>;

    /// Look up a node by id.
    fn get(&self, id: NodeId) -> Result<Option<Node>>;

    /// Run an ordered range scan.
    fn scan(&self, scan: &Scan) -> Result<Vec<Node>>;

    /// Count nodes sharing a foreign key.
    fn count(&self, key: ForeignKey) -> Result<u64>;

    /// Store or replace an author directory entry.
    fn put_author(&self, author: &Author) -> Result<()>;

    /// Look up an author directory entry.
    fn get_author(&self, id: &AuthorId) -> Result<Option<Author>>;

    /// Entity counts.
    fn stats(&self) -> Result<StoreStats>;
}

/// Exclusive upper bound, in epoch millis, for roots strictly older than `before`.
///
/// Stored timestamps have millisecond resolution, so a cursor with
/// sub-millisecond precision still admits roots from its own millisecond.
pub(crate) fn roots_upper_millis(before: DateTime<Utc>) -> i64 {
    let millis = before.timestamp_millis();
    if before.timestamp_subsec_nanos() % 1_000_000 == 0 {
        millis
    } else {
        millis.saturating_add(1)
    }
}

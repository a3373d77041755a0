//! Numtree Ledger - append-only computation trees
//!
//! A forest of arithmetic nodes. A root holds a starting value; a reply
//! applies one of `+ - * /` to its parent's result. Nodes are appended once
//! and never mutated, so concurrent replies to the same parent simply become
//! independent siblings.
//!
//! # Architecture
//!
//! - **Arith**: the evaluator, the only source of computation errors
//! - **Models**: [`Node`] and its joined [`NodeView`]
//! - **Store**: the [`LedgerStore`] seam, with RocksDB and in-memory backends
//! - **Writer**: [`Ledger::create_root`] and [`Ledger::create_reply`]
//! - **Views**: root feed, full subtree and direct replies, each cursor-paginated
//!
//! # Example
//!
//! ```no_run
//! use numtree_ledger::{AuthorId, Ledger, NewRoot, RocksStore};
//! use std::sync::Arc;
//!
//! fn main() -> numtree_ledger::Result<()> {
//!     let store = Arc::new(RocksStore::open("./numtree-data")?);
//!     let ledger = Ledger::new(store);
//!     let root = ledger.create_root(NewRoot {
//!         author_id: AuthorId::new("alice")?,
//!         initial_value: 10.0,
//!     })?;
//!     let page = ledger.list_tree(&root.id.to_string(), None, 100)?;
//!     assert!(page.nodes.is_empty());
//!     Ok(())
//! }
//! ```

pub mod arith;
pub mod error;
pub mod models;
pub mod store;
pub mod views;

mod ledger;
mod writer;

pub use arith::{apply, Operation};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use models::{Author, AuthorId, AuthorSummary, Node, NodeId, NodeStatus, NodeView, RootSummary};
pub use store::{ForeignKey, LedgerStore, MemoryStore, RocksStore, Scan, Stamp, StoreStats};
pub use views::{RepliesPage, RootPage, RootPagination, TreePage};
pub use writer::{NewReply, NewRoot};

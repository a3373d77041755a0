//! Ledger data model.
//!
//! - [`Node`] - the single stored entity, a root value or a reply
//! - [`NodeView`] - a node with its author joined, as served to readers
//! - [`RootSummary`] - a feed entry with its tree's reply count
//! - [`Author`] - display name for an author id

mod author;
mod id;
mod node;

pub use author::Author;
pub use id::{AuthorId, NodeId};
pub use node::{AuthorSummary, Node, NodeStatus, NodeView, RootSummary};

//! Node model - a root value or a reply applying one operation to its parent.

use super::id::{AuthorId, NodeId};
use crate::arith::{self, Operation};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation status. Recorded on every node; nothing transitions it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Confirmed,
    Pending,
    Rejected,
}

/// A computation node in the ledger.
///
/// Nodes are only built through [`Node::root`] and [`Node::reply`], which
/// enforce the structural invariants:
///
/// - `parent_id`, `operation`, `left_value` and `right_value` are all `None`
///   exactly when `root_id == id`
/// - a reply's `left_value` is its parent's `result` at creation time
/// - a reply's `root_id` is its parent's `root_id`
/// - `result` is always derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub root_id: NodeId,
    pub parent_id: Option<NodeId>,
    pub author_id: AuthorId,
    pub left_value: Option<f64>,
    pub operation: Option<Operation>,
    pub right_value: Option<f64>,
    pub result: f64,
    #[serde(default)]
    pub status: NodeStatus,
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Build a root node. Its `root_id` is its own id from the start.
    pub fn root(
        id: NodeId,
        created_at: DateTime<Utc>,
        author_id: AuthorId,
        initial_value: f64,
    ) -> Result<Self> {
        arith::ensure_finite("initialValue", initial_value)?;
        Ok(Self {
            id,
            root_id: id,
            parent_id: None,
            author_id,
            left_value: None,
            operation: None,
            right_value: None,
            result: initial_value,
            status: NodeStatus::Confirmed,
            created_at,
        })
    }

    /// Build a reply to `parent`, snapshotting the parent's current result.
    pub fn reply(
        id: NodeId,
        created_at: DateTime<Utc>,
        author_id: AuthorId,
        parent: &Node,
        operation: Operation,
        right_value: f64,
    ) -> Result<Self> {
        let left_value = parent.result;
        let result = arith::apply(left_value, operation, right_value)?;
        Ok(Self {
            id,
            root_id: parent.root_id,
            parent_id: Some(parent.id),
            author_id,
            left_value: Some(left_value),
            operation: Some(operation),
            right_value: Some(right_value),
            result,
            status: NodeStatus::Confirmed,
            created_at,
        })
    }

    /// True if this node starts a tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check the structural invariants. Persisted records are checked on load.
    pub fn is_well_formed(&self) -> bool {
        let root_shape = self.parent_id.is_none()
            && self.root_id == self.id
            && self.operation.is_none()
            && self.left_value.is_none()
            && self.right_value.is_none();
        let reply_shape = self.parent_id.is_some_and(|p| p < self.id)
            && self.root_id < self.id
            && self.operation.is_some()
            && self.left_value.is_some()
            && self.right_value.is_some();
        root_shape || reply_shape
    }
}

/// Author identity joined onto a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: AuthorId,
    /// Display name, absent when the author has no directory entry.
    pub name: Option<String>,
}

/// A node as served to consumers: the stored record with its author joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: NodeId,
    pub root_id: NodeId,
    pub parent_id: Option<NodeId>,
    pub left_value: Option<f64>,
    pub operation: Option<Operation>,
    pub right_value: Option<f64>,
    pub result: f64,
    pub status: NodeStatus,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
}

impl NodeView {
    pub fn new(node: Node, author_name: Option<String>) -> Self {
        Self {
            id: node.id,
            root_id: node.root_id,
            parent_id: node.parent_id,
            left_value: node.left_value,
            operation: node.operation,
            right_value: node.right_value,
            result: node.result,
            status: node.status,
            created_at: node.created_at,
            author: AuthorSummary {
                id: node.author_id,
                name: author_name,
            },
        }
    }
}

/// A root in the feed, with the size of its tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootSummary {
    #[serde(flatten)]
    pub node: NodeView,
    /// Number of descendants at every depth, excluding the root itself.
    pub reply_count: u64,
}

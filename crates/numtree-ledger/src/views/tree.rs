//! Full-subtree view: every descendant of a root, oldest first.

use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::{Node, NodeId, NodeView};
use crate::store::Scan;
use serde::{Deserialize, Serialize};

/// Hard ceiling on nodes per page, whatever the caller asks for.
pub const MAX_TREE_LIMIT: usize = 2000;

/// One page of a tree scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePage {
    pub root_id: NodeId,
    /// The root itself, on the first page only.
    pub root_node: Option<NodeView>,
    /// Descendants in ascending id order. Never contains the root.
    pub nodes: Vec<NodeView>,
    pub count: usize,
    pub next_cursor: Option<NodeId>,
    pub has_more: bool,
}

impl TreePage {
    fn empty(root_id: NodeId) -> Self {
        Self {
            root_id,
            root_node: None,
            nodes: Vec::new(),
            count: 0,
            next_cursor: None,
            has_more: false,
        }
    }
}

impl Ledger {
    /// List descendants of `root_id` with ids strictly after `cursor`.
    ///
    /// A page that comes back exactly full carries a `next_cursor`; following
    /// cursors until `None` visits every descendant once, in id order. The
    /// final page of an exact multiple is empty.
    pub fn list_tree(&self, root_id: &str, cursor: Option<NodeId>, limit: usize) -> Result<TreePage> {
        let root_id: NodeId = root_id.parse()?;
        let query_limit = limit.clamp(1, MAX_TREE_LIMIT);

        // Descendants always have larger ids than their root.
        let after = cursor.map_or(root_id, |cursor| cursor.max(root_id));
        let rows = self.store().scan(&Scan::Tree {
            root_id,
            after: Some(after),
            limit: query_limit,
        })?;

        let root_node = match cursor {
            None => self
                .store()
                .get(root_id)?
                .filter(Node::is_root)
                .map(|root| self.view(root))
                .transpose()?,
            Some(_) => None,
        };

        if rows.is_empty() && root_node.is_none() {
            return Ok(TreePage::empty(root_id));
        }

        let next_cursor = if rows.len() == query_limit {
            rows.last().map(|node| node.id)
        } else {
            None
        };
        let nodes = self.join_all(rows)?;

        Ok(TreePage {
            root_id,
            root_node,
            count: nodes.len(),
            nodes,
            next_cursor,
            has_more: next_cursor.is_some(),
        })
    }
}

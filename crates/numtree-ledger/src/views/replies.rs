//! Direct-replies view: one level of children, oldest first.

use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::{NodeId, NodeView};
use crate::store::{ForeignKey, Scan};
use serde::{Deserialize, Serialize};

/// Upper bound on replies per page.
pub const MAX_REPLIES_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepliesPage {
    pub parent_id: NodeId,
    /// All direct children of the parent, regardless of cursor.
    pub total_replies: u64,
    pub replies: Vec<NodeView>,
    pub count: usize,
    pub next_cursor: Option<NodeId>,
    pub has_more: bool,
}

impl Ledger {
    /// List direct children of `parent_id` with ids strictly after `cursor`.
    ///
    /// Looks one row ahead, so `has_more` is exact and no trailing empty page
    /// is ever produced.
    pub fn list_replies(
        &self,
        parent_id: &str,
        cursor: Option<NodeId>,
        limit: usize,
    ) -> Result<RepliesPage> {
        let parent_id: NodeId = parent_id.parse()?;
        let limit = limit.clamp(1, MAX_REPLIES_LIMIT);

        let mut rows = self.store().scan(&Scan::Children {
            parent_id,
            after: cursor,
            limit: limit + 1,
        })?;
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(|node| node.id)
        } else {
            None
        };

        let total_replies = self.store().count(ForeignKey::Parent(parent_id))?;
        let replies = self.join_all(rows)?;

        Ok(RepliesPage {
            parent_id,
            total_replies,
            count: replies.len(),
            replies,
            next_cursor,
            has_more,
        })
    }
}

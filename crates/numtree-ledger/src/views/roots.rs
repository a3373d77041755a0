//! Root feed: newest roots first, each with its tree size.

use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::RootSummary;
use crate::store::{ForeignKey, Scan};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on roots per page.
pub const MAX_ROOTS_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootPagination {
    /// `created_at` of the last root on this page when more remain.
    pub next_cursor: Option<DateTime<Utc>>,
    pub has_next_page: bool,
    pub limit: usize,
}

/// One page of the root feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootPage {
    pub roots: Vec<RootSummary>,
    pub pagination: RootPagination,
}

impl Ledger {
    /// List roots created strictly before `cursor`, newest first.
    ///
    /// Fetches one row beyond `limit` to learn whether another page exists.
    pub fn list_roots(&self, cursor: Option<DateTime<Utc>>, limit: usize) -> Result<RootPage> {
        let limit = limit.clamp(1, MAX_ROOTS_LIMIT);
        let mut rows = self.store().scan(&Scan::Roots {
            before: cursor,
            limit: limit + 1,
        })?;

        let has_next_page = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_next_page {
            rows.last().map(|root| root.created_at)
        } else {
            None
        };

        let mut reply_counts = Vec::with_capacity(rows.len());
        for root in &rows {
            let tree_size = self.store().count(ForeignKey::Root(root.id))?;
            reply_counts.push(tree_size.saturating_sub(1));
        }

        let roots = self
            .join_all(rows)?
            .into_iter()
            .zip(reply_counts)
            .map(|(node, reply_count)| RootSummary { node, reply_count })
            .collect();

        Ok(RootPage {
            roots,
            pagination: RootPagination {
                next_cursor,
                has_next_page,
                limit,
            },
        })
    }
}

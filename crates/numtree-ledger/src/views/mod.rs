//! Cursor-paginated read views.
//!
//! | View | Selects | Order | Cursor |
//! |------|---------|-------|--------|
//! | [`RootPage`] | roots | `created_at` descending | `created_at`, strictly older |
//! | [`TreePage`] | all descendants of a root | id ascending | id, strictly after |
//! | [`RepliesPage`] | direct children of a node | id ascending | id, strictly after |
//!
//! The direct-replies view is oldest-first, matching the subtree view, so a
//! client can interleave both without reordering.

mod replies;
mod roots;
mod tree;

pub use replies::{RepliesPage, MAX_REPLIES_LIMIT};
pub use roots::{RootPage, RootPagination, MAX_ROOTS_LIMIT};
pub use tree::{TreePage, MAX_TREE_LIMIT};

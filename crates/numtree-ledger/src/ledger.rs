//! Ledger facade - the five operations over an injected store handle.

use crate::error::Result;
use crate::models::{AuthorId, Node, NodeId, NodeView};
use crate::store::LedgerStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Entry point for writing and reading the node ledger.
///
/// Holds no state beyond the store handle; every operation is independent
/// and may run concurrently with any other. Cloning is cheap.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
}

impl Ledger {
    /// Create a ledger over an opened store.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// The underlying store handle.
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Look up a single node with its author joined.
    pub fn node(&self, id: &str) -> Result<Option<NodeView>> {
        let id: NodeId = id.parse()?;
        match self.store.get(id)? {
            Some(node) => Ok(Some(self.view(node)?)),
            None => Ok(None),
        }
    }

    /// Join the author's display name onto a node.
    pub fn view(&self, node: Node) -> Result<NodeView> {
        let name = self.store.get_author(&node.author_id)?.map(|a| a.name);
        Ok(NodeView::new(node, name))
    }

    /// Join authors onto a page, looking each distinct author up once.
    pub(crate) fn join_all(&self, nodes: Vec<Node>) -> Result<Vec<NodeView>> {
        let mut names: HashMap<AuthorId, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(nodes.len());
        for node in nodes {
            let name = match names.get(&node.author_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.store.get_author(&node.author_id)?.map(|a| a.name);
                    names.insert(node.author_id.clone(), name.clone());
                    name
                }
            };
            views.push(NodeView::new(node, name));
        }
        Ok(views)
    }
}

//! In-process store with the same ordering semantics as [`super::RocksStore`].

use super::sequence::Sequencer;
use super::{roots_upper_millis, ForeignKey, LedgerStore, Scan, Stamp, StoreStats};
use crate::error::{Error, Result};
use crate::models::{Author, AuthorId, Node, NodeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    nodes: BTreeMap<NodeId, Node>,
    tree: BTreeSet<(NodeId, NodeId)>,
    children: BTreeSet<(NodeId, NodeId)>,
    roots: BTreeSet<(i64, NodeId)>,
    authors: HashMap<AuthorId, Author>,
}

/// Volatile ledger store. Contents are lost on drop.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    sequencer: Sequencer,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            sequencer: Sequencer::resume(None),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::Storage("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::Storage("memory store lock poisoned".into()))
    }
}

/// Ids of `(key, id)` entries with `id > after`, ascending.
fn ids_after(
    index: &BTreeSet<(NodeId, NodeId)>,
    key: NodeId,
    after: Option<NodeId>,
    limit: usize,
) -> Vec<NodeId> {
    let lower = match after {
        Some(after) => Bound::Excluded((key, after)),
        None => Bound::Included((key, NodeId::new(0))),
    };
    index
        .range((lower, Bound::Included((key, NodeId::new(u64::MAX)))))
        .take(limit)
        .map(|(_, id)| *id)
        .collect()
}

impl Tables {
    fn load_all(&self, ids: Vec<NodeId>) -> Result<Vec<Node>> {
        ids.into_iter()
            .map(|id| {
                self.nodes
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| Error::Storage(format!("dangling index entry for {}", id)))
            })
            .collect()
    }
}

impl LedgerStore for MemoryStore {
    fn allocate(&self) -> Result<Stamp> {
        self.sequencer.next()
    }

    fn insert(&self, node: &Node) -> Result<()> {
        let mut tables = self.write()?;
        tables.tree.insert((node.root_id, node.id));
        match node.parent_id {
            Some(parent_id) => {
                tables.children.insert((parent_id, node.id));
            }
            None => {
                tables.roots.insert((node.created_at.timestamp_millis(), node.id));
            }
        }
        tables.nodes.insert(node.id, node.clone());
        Ok(())
    }

    fn append(&self, build: &dyn Fn(Stamp) -> Result<Node>) -> Result<Node> {
        self.sequencer.append(|stamp| {
            let node = build(stamp)?;
            self.insert(&node)?;
            Ok(node)
        })
    }

    fn get(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.read()?.nodes.get(&id).cloned())
    }

    fn scan(&self, scan: &Scan) -> Result<Vec<Node>> {
        let tables = self.read()?;
        let ids: Vec<NodeId> = match scan {
            Scan::Roots { before, limit } => {
                let upper = match before {
                    Some(before) => Bound::Excluded((roots_upper_millis(*before), NodeId::new(0))),
                    None => Bound::Unbounded,
                };
                tables
                    .roots
                    .range((Bound::Unbounded, upper))
                    .rev()
                    .take(*limit)
                    .map(|(_, id)| *id)
                    .collect()
            }
            Scan::Tree {
                root_id,
                after,
                limit,
            } => ids_after(&tables.tree, *root_id, *after, *limit),
            Scan::Children {
                parent_id,
                after,
                limit,
            } => ids_after(&tables.children, *parent_id, *after, *limit),
        };
        tables.load_all(ids)
    }

    fn count(&self, key: ForeignKey) -> Result<u64> {
        let tables = self.read()?;
        let (index, key) = match key {
            ForeignKey::Root(id) => (&tables.tree, id),
            ForeignKey::Parent(id) => (&tables.children, id),
        };
        Ok(ids_after(index, key, None, usize::MAX).len() as u64)
    }

    fn put_author(&self, author: &Author) -> Result<()> {
        self.write()?
            .authors
            .insert(author.id.clone(), author.clone());
        Ok(())
    }

    fn get_author(&self, id: &AuthorId) -> Result<Option<Author>> {
        Ok(self.read()?.authors.get(id).cloned())
    }

    fn stats(&self) -> Result<StoreStats> {
        let tables = self.read()?;
        Ok(StoreStats {
            nodes: tables.nodes.len() as u64,
            roots: tables.roots.len() as u64,
            authors: tables.authors.len() as u64,
        })
    }
}

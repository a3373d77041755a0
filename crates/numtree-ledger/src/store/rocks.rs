//! Persistent storage using RocksDB.
//!
//! Key layout (ids are 16 hex digits, timestamps 16 hex digits of epoch
//! millis, so lexicographic order is numeric order):
//!
//! - `node:{id}` -> JSON [`Node`]
//! - `tree:{root_id}:{id}` -> empty, every node of a tree including its root
//! - `child:{parent_id}:{id}` -> empty, replies only
//! - `roots:{created_at}:{id}` -> empty, roots only
//! - `author:{author_id}` -> JSON [`Author`]

use super::sequence::Sequencer;
use super::{roots_upper_millis, ForeignKey, LedgerStore, Scan, Stamp, StoreStats};
use crate::error::{Error, Result};
use crate::models::{Author, AuthorId, Node, NodeId};
use chrono::{DateTime, Utc};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

/// RocksDB-backed ledger store.
pub struct RocksStore {
    db: DB,
    sequencer: Sequencer,
}

impl RocksStore {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path.as_ref())?;

        let last = last_node(&db)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            last_id = ?last.as_ref().map(|n| n.id),
            "opened ledger store"
        );

        let sequencer = Sequencer::resume(last.map(|n| (n.id, n.created_at)));
        Ok(Self { db, sequencer })
    }

    /// Forward scan of an index prefix, starting at `start`, returning node ids.
    fn index_forward(&self, prefix: &str, start: &str, limit: usize) -> Result<Vec<NodeId>> {
        let mut ids = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(start.as_bytes(), Direction::Forward));
        for item in iter {
            if ids.len() >= limit {
                break;
            }
            let (key, _) = item?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            ids.push(id_suffix(&key)?);
        }
        Ok(ids)
    }

    fn load_all(&self, ids: Vec<NodeId>) -> Result<Vec<Node>> {
        let mut nodes = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(id)? {
                Some(node) => nodes.push(node),
                None => return Err(Error::Storage(format!("dangling index entry for {}", id))),
            }
        }
        Ok(nodes)
    }

    fn count_prefix(&self, prefix: &str) -> Result<u64> {
        let mut count = 0;
        let iter = self
            .db
            .iterator(IteratorMode::From(prefix.as_bytes(), Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            count += 1;
        }
        Ok(count)
    }
}

impl LedgerStore for RocksStore {
    fn allocate(&self) -> Result<Stamp> {
        self.sequencer.next()
    }

    fn insert(&self, node: &Node) -> Result<()> {
        let mut batch = WriteBatch::default();
        batch.put(node_key(node.id), serde_json::to_vec(node)?);
        batch.put(format!("tree:{}:{}", node.root_id, node.id), b"");
        match node.parent_id {
            Some(parent_id) => batch.put(format!("child:{}:{}", parent_id, node.id), b""),
            None => batch.put(
                format!("roots:{}:{}", millis_hex(node.created_at)?, node.id),
                b"",
            ),
        }
        self.db.write(batch)?;
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
        match self.db.get(node_key(id).as_bytes())? {
            Some(data) => {
                let node: Node = serde_json::from_slice(&data)?;
                if !node.is_well_formed() {
                    return Err(Error::Storage(format!("malformed node record {}", id)));
                }
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    fn scan(&self, scan: &Scan) -> Result<Vec<Node>> {
        match scan {
            Scan::Roots { before, limit } => {
                // Reverse seek lands on the last key <= start. Every
                // `roots:{t}:{id}` sorts after `roots:{t}`, so rows at the
                // bound itself are excluded.
                let start = match before.map(roots_upper_millis) {
                    Some(upper) if upper <= 0 => return Ok(Vec::new()),
                    Some(upper) => format!("roots:{:016x}", upper),
                    None => "roots;".to_string(),
                };
                let mut ids = Vec::new();
                let iter = self
                    .db
                    .iterator(IteratorMode::From(start.as_bytes(), Direction::Reverse));
                for item in iter {
                    if ids.len() >= *limit {
                        break;
                    }
                    let (key, _) = item?;
                    if !key.starts_with(b"roots:") {
                        break;
                    }
                    ids.push(id_suffix(&key)?);
                }
                self.load_all(ids)
            }
            Scan::Tree {
                root_id,
                after,
                limit,
            } => {
                let prefix = format!("tree:{}:", root_id);
                let Some(start) = start_after(&prefix, *after) else {
                    return Ok(Vec::new());
                };
                let ids = self.index_forward(&prefix, &start, *limit)?;
                self.load_all(ids)
            }
            Scan::Children {
                parent_id,
                after,
                limit,
            } => {
                let prefix = format!("child:{}:", parent_id);
                let Some(start) = start_after(&prefix, *after) else {
                    return Ok(Vec::new());
                };
                let ids = self.index_forward(&prefix, &start, *limit)?;
                self.load_all(ids)
            }
        }
    }

    fn count(&self, key: ForeignKey) -> Result<u64> {
        match key {
            ForeignKey::Root(root_id) => self.count_prefix(&format!("tree:{}:", root_id)),
            ForeignKey::Parent(parent_id) => self.count_prefix(&format!("child:{}:", parent_id)),
        }
    }

    fn put_author(&self, author: &Author) -> Result<()> {
        let key = format!("author:{}", author.id);
        let value = serde_json::to_vec(author)?;
        self.db.put(key.as_bytes(), value)?;
        Ok(())
    }

    fn get_author(&self, id: &AuthorId) -> Result<Option<Author>> {
        let key = format!("author:{}", id);
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            nodes: self.count_prefix("node:")?,
            roots: self.count_prefix("roots:")?,
            authors: self.count_prefix("author:")?,
        })
    }
}

fn node_key(id: NodeId) -> String {
    format!("node:{}", id)
}

fn millis_hex(at: DateTime<Utc>) -> Result<String> {
    let millis = u64::try_from(at.timestamp_millis())
        .map_err(|_| Error::Storage(format!("timestamp before epoch: {}", at)))?;
    Ok(format!("{:016x}", millis))
}

/// First key of `prefix` strictly after `after`, or `None` if nothing can follow.
fn start_after(prefix: &str, after: Option<NodeId>) -> Option<String> {
    match after {
        None => Some(prefix.to_string()),
        Some(after) => after.successor().map(|next| format!("{}{}", prefix, next)),
    }
}

/// Parse the trailing node id of an index key.
fn id_suffix(key: &[u8]) -> Result<NodeId> {
    let tail = key
        .len()
        .checked_sub(NodeId::HEX_LEN)
        .map(|start| &key[start..])
        .ok_or_else(|| Error::Storage("truncated index key".into()))?;
    std::str::from_utf8(tail)
        .map_err(|_| Error::Storage("non-utf8 index key".into()))?
        .parse()
        .map_err(|_| Error::Storage("corrupt index key".into()))
}

fn last_node(db: &DB) -> Result<Option<Node>> {
    let mut iter = db.iterator(IteratorMode::From(b"node;", Direction::Reverse));
    match iter.next() {
        Some(item) => {
            let (key, value) = item?;
            if key.starts_with(b"node:") {
                Ok(Some(serde_json::from_slice(&value)?))
            } else {
                Ok(None)
            }
        }
        None => Ok(None),
    }
}

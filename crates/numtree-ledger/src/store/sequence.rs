//! Id and timestamp allocation.

use super::Stamp;
use crate::error::{Error, Result};
use crate::models::NodeId;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Hands out strictly increasing `(id, created_at)` pairs.
///
/// Timestamps have millisecond resolution. When the wall clock has not moved
/// past the previous stamp (same millisecond, or a clock step backwards), the
/// next stamp is the previous one plus 1ms, so the root feed's `created_at`
/// cursor never has to break ties.
pub(crate) struct Sequencer {
    last: Mutex<(u64, i64)>,
}

impl Sequencer {
    /// Continue after the newest persisted node, if any.
    pub fn resume(last: Option<(NodeId, DateTime<Utc>)>) -> Self {
        let state = last
            .map(|(id, at)| (id.get(), at.timestamp_millis()))
            .unwrap_or((0, i64::MIN));
        Self {
            last: Mutex::new(state),
        }
    }

    pub fn next(&self) -> Result<Stamp> {
        self.next_at(Utc::now().timestamp_millis())
    }

    pub fn next_at(&self, now_millis: i64) -> Result<Stamp> {
        self.append_at(now_millis, Ok)
    }

    /// Allocate a stamp and run `commit` with it while holding the sequence.
    ///
    /// No other stamp is handed out until `commit` returns, so appends become
    /// visible in id order. The stamp is only consumed if `commit` succeeds.
    pub fn append<T>(&self, commit: impl FnOnce(Stamp) -> Result<T>) -> Result<T> {
        self.append_at(Utc::now().timestamp_millis(), commit)
    }

    fn append_at<T>(&self, now_millis: i64, commit: impl FnOnce(Stamp) -> Result<T>) -> Result<T> {
        let mut last = self
            .last
            .lock()
            .map_err(|_| Error::Storage("sequencer lock poisoned".into()))?;

        let id = last
            .0
            .checked_add(1)
            .ok_or_else(|| Error::Storage("node id space exhausted".into()))?;
        let millis = now_millis.max(last.1.saturating_add(1));
        let created_at = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| Error::Storage(format!("timestamp out of range: {}", millis)))?;

        let out = commit(Stamp {
            id: NodeId::new(id),
            created_at,
        })?;
        *last = (id, millis);
        Ok(out)
    }
}

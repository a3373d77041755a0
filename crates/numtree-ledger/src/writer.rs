//! Ledger writer - appends root and reply nodes.

use crate::arith::Operation;
use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::{AuthorId, Node, NodeId};

/// Request to start a new tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoot {
    pub author_id: AuthorId,
    pub initial_value: f64,
}

/// Request to reply to an existing node.
///
/// Identifier and operation arrive as raw strings and are re-validated here,
/// since their well-formedness and existence need the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReply {
    pub author_id: AuthorId,
    pub parent_id: String,
    pub operation: Option<String>,
    pub right_value: Option<f64>,
}

impl Ledger {
    /// Append a root node holding `initial_value`.
    pub fn create_root(&self, req: NewRoot) -> Result<Node> {
        self.store().append(&|stamp| {
            Node::root(stamp.id, stamp.created_at, req.author_id.clone(), req.initial_value)
        })
    }

    /// Append a reply applying `operation right_value` to the parent's result.
    ///
    /// The parent's result is snapshotted into `left_value`. Concurrent replies
    /// to one parent never conflict: nothing is mutated, they simply become
    /// independent siblings.
    pub fn create_reply(&self, req: NewReply) -> Result<Node> {
        let parent_id: NodeId = req.parent_id.parse()?;
        let parent = self
            .store()
            .get(parent_id)?
            .ok_or_else(|| Error::ParentNotFound(parent_id.to_string()))?;

        let (symbol, right_value) = match (req.operation, req.right_value) {
            (Some(symbol), Some(right_value)) => (symbol, right_value),
            (None, _) => return Err(Error::InvalidInput("operation is required for a reply".into())),
            (_, None) => return Err(Error::InvalidInput("rightValue is required for a reply".into())),
        };
        let operation: Operation = symbol.parse()?;

        // Validate against the parent before consuming an id.
        operation.apply(parent.result, right_value)?;

        self.store().append(&|stamp| {
            Node::reply(
                stamp.id,
                stamp.created_at,
                req.author_id.clone(),
                &parent,
                operation,
                right_value,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LedgerStore, MemoryStore};
    use std::sync::Arc;

    fn ledger() -> Ledger {
        Ledger::new(Arc::new(MemoryStore::new()))
    }

    fn author(id: &str) -> AuthorId {
        AuthorId::new(id).unwrap()
    }

    fn reply(parent: NodeId, op: &str, right: f64) -> NewReply {
        NewReply {
            author_id: author("b"),
            parent_id: parent.to_string(),
            operation: Some(op.to_string()),
            right_value: Some(right),
        }
    }

    #[test]
    fn create_root_self_references() {
        let ledger = ledger();
        let root = ledger
            .create_root(NewRoot { author_id: author("a"), initial_value: 10.0 })
            .unwrap();
        assert_eq!(root.root_id, root.id);
        assert_eq!(root.result, 10.0);
        assert_eq!(ledger.store().get(root.id).unwrap().unwrap(), root);
    }

    #[test]
    fn siblings_snapshot_the_same_left_value() {
        let ledger = ledger();
        let root = ledger
            .create_root(NewRoot { author_id: author("a"), initial_value: 10.0 })
            .unwrap();

        let plus = ledger.create_reply(reply(root.id, "+", 5.0)).unwrap();
        let times = ledger.create_reply(reply(root.id, "*", 2.0)).unwrap();

        assert_eq!(plus.left_value, Some(10.0));
        assert_eq!(times.left_value, Some(10.0));
        assert_eq!(plus.result, 15.0);
        assert_eq!(times.result, 20.0);
        // The earlier sibling is untouched by the later write.
        assert_eq!(ledger.store().get(plus.id).unwrap().unwrap(), plus);
    }

    #[test]
    fn deep_descendants_carry_root_id() {
        let ledger = ledger();
        let root = ledger
            .create_root(NewRoot { author_id: author("a"), initial_value: 1.0 })
            .unwrap();

        let mut tip = root.clone();
        for _ in 0..5 {
            tip = ledger.create_reply(reply(tip.id, "+", 1.0)).unwrap();
            assert_eq!(tip.root_id, root.id);
        }
        assert_eq!(tip.result, 6.0);
    }

    #[test]
    fn missing_parent() {
        let ledger = ledger();
        let err = ledger.create_reply(reply(NodeId::new(77), "+", 1.0)).unwrap_err();
        assert!(matches!(err, Error::ParentNotFound(_)));
    }

    #[test]
    fn missing_parent_wins_over_bad_operation() {
        let ledger = ledger();
        let mut no_op = reply(NodeId::new(77), "+", 1.0);
        no_op.operation = None;
        assert!(matches!(ledger.create_reply(no_op), Err(Error::ParentNotFound(_))));

        let unknown_op = reply(NodeId::new(77), "%", 1.0);
        assert!(matches!(ledger.create_reply(unknown_op), Err(Error::ParentNotFound(_))));

        let mut no_value = reply(NodeId::new(77), "+", 1.0);
        no_value.right_value = None;
        assert!(matches!(ledger.create_reply(no_value), Err(Error::ParentNotFound(_))));
    }

    #[test]
    fn malformed_parent_id() {
        let ledger = ledger();
        let mut req = reply(NodeId::new(1), "+", 1.0);
        req.parent_id = "not-an-id".into();
        assert!(matches!(ledger.create_reply(req), Err(Error::InvalidId(_))));
    }

    #[test]
    fn missing_operation_or_value() {
        let ledger = ledger();
        let root = ledger
            .create_root(NewRoot { author_id: author("a"), initial_value: 1.0 })
            .unwrap();

        let mut no_op = reply(root.id, "+", 1.0);
        no_op.operation = None;
        assert!(matches!(ledger.create_reply(no_op), Err(Error::InvalidInput(_))));

        let mut no_value = reply(root.id, "+", 1.0);
        no_value.right_value = None;
        assert!(matches!(ledger.create_reply(no_value), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejected_replies_append_nothing() {
        let ledger = ledger();
        let root = ledger
            .create_root(NewRoot { author_id: author("a"), initial_value: 1.0 })
            .unwrap();

        assert!(matches!(
            ledger.create_reply(reply(root.id, "/", 0.0)),
            Err(Error::DivisionByZero)
        ));
        assert!(matches!(
            ledger.create_reply(reply(root.id, "^", 2.0)),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            ledger.create_root(NewRoot { author_id: author("a"), initial_value: f64::NAN }),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(ledger.store().stats().unwrap().nodes, 1);

        // Rejections do not burn ids.
        let next = ledger.create_reply(reply(root.id, "-", 1.0)).unwrap();
        assert_eq!(next.id, root.id.successor().unwrap());
    }
}

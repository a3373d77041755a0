//! Identifier types.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Node identity, assigned in strictly increasing creation order.
///
/// Rendered as exactly 16 lowercase hex digits. The textual order matches the
/// numeric order, which lets store keys embed ids directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Width of the textual form.
    pub const HEX_LEN: usize = 16;

    /// Wrap a raw sequence number.
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// The raw sequence number.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one, if any.
    pub fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let well_formed = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !well_formed {
            return Err(Error::InvalidId(s.to_string()));
        }
        u64::from_str_radix(s, 16)
            .map(NodeId)
            .map_err(|_| Error::InvalidId(s.to_string()))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque author identity supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    /// Wrap an authenticated author identifier. Empty identifiers are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("authorId is required".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_fixed_width() {
        assert_eq!(NodeId::new(1).to_string(), "0000000000000001");
        assert_eq!(NodeId::new(u64::MAX).to_string(), "ffffffffffffffff");
    }

    #[test]
    fn text_order_matches_numeric_order() {
        let a = NodeId::new(9);
        let b = NodeId::new(10);
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "1", "000000000000000g", "00000000000000001", "000000000000000A", " 000000000000001"] {
            assert!(matches!(bad.parse::<NodeId>(), Err(Error::InvalidId(_))), "{:?}", bad);
        }
        assert_eq!("00000000000000ff".parse::<NodeId>().unwrap(), NodeId::new(255));
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&NodeId::new(42)).unwrap();
        assert_eq!(json, "\"000000000000002a\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NodeId::new(42));
        assert!(serde_json::from_str::<NodeId>("\"nope\"").is_err());
    }

    #[test]
    fn empty_author_rejected() {
        assert!(AuthorId::new("").is_err());
        assert!(AuthorId::new("   ").is_err());
        assert_eq!(AuthorId::new("u1").unwrap().as_str(), "u1");
    }
}

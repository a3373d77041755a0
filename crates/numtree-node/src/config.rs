//! Daemon configuration.

use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Default page sizes used when a request omits `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub roots: usize,
    pub tree: usize,
    pub replies: usize,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            roots: 10,
            tree: 1000,
            replies: 10,
        }
    }
}

/// Configuration for a numtree node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory for storage
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Admin socket path (for numtree-admin CLI)
    pub admin_socket: PathBuf,

    /// Page sizes when the client sends none
    pub page_defaults: PageDefaults,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("./numtree-data");
        Self {
            admin_socket: data_dir.join("admin.sock"),
            data_dir,
            api_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            page_defaults: PageDefaults::default(),
        }
    }
}

impl NodeConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("NUMTREE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let api_addr = parse_var(&lookup, "NUMTREE_API_ADDR")?.unwrap_or(defaults.api_addr);

        let admin_socket = lookup("NUMTREE_ADMIN_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("admin.sock"));

        let page_defaults = PageDefaults {
            roots: parse_var(&lookup, "NUMTREE_ROOTS_LIMIT")?
                .unwrap_or(defaults.page_defaults.roots),
            tree: parse_var(&lookup, "NUMTREE_TREE_LIMIT")?.unwrap_or(defaults.page_defaults.tree),
            replies: parse_var(&lookup, "NUMTREE_REPLIES_LIMIT")?
                .unwrap_or(defaults.page_defaults.replies),
        };

        Ok(Self {
            data_dir,
            api_addr,
            admin_socket,
            page_defaults,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid {}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = NodeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./numtree-data"));
        assert_eq!(config.admin_socket, PathBuf::from("./numtree-data/admin.sock"));
        assert_eq!(config.api_addr.port(), 8080);
        assert_eq!(config.page_defaults, PageDefaults::default());
    }

    #[test]
    fn socket_follows_data_dir() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("NUMTREE_DATA_DIR", "/var/lib/numtree"),
            ("NUMTREE_API_ADDR", "127.0.0.1:9999"),
            ("NUMTREE_TREE_LIMIT", "500"),
        ]))
        .unwrap();
        assert_eq!(config.admin_socket, PathBuf::from("/var/lib/numtree/admin.sock"));
        assert_eq!(config.api_addr.port(), 9999);
        assert_eq!(config.page_defaults.tree, 500);
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = NodeConfig::from_lookup(lookup(&[("NUMTREE_API_ADDR", "nowhere")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(NodeConfig::from_lookup(lookup(&[("NUMTREE_ROOTS_LIMIT", "-1")])).is_err());
    }
}

//! Numtree Node - daemon around the computation ledger
//!
//! Serves the ledger over HTTP and exposes a local admin socket.
//!
//! # Architecture
//!
//! - **Config**: environment-driven [`NodeConfig`]
//! - **API**: HTTP endpoints for creating nodes and paging through trees
//! - **Admin Socket**: Unix socket for the author directory (numtree-admin CLI)
//!
//! # Example
//!
//! ```no_run
//! use numtree_node::{NodeConfig, NumtreeNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::from_env()?;
//!     let node = NumtreeNode::new(config)?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod admin_socket;
pub mod api;
pub mod config;
pub mod error;
pub mod node;

pub use config::{NodeConfig, PageDefaults};
pub use error::{Error, Result};
pub use node::{NodeState, NumtreeNode};

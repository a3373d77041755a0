//! Numtree node - the daemon entry point.
//!
//! Architecture:
//! - Single process with one RocksDB-backed ledger store, opened at startup
//!   and closed when the node is dropped
//! - HTTP API for clients (roots, trees, replies)
//! - Unix admin socket for local author-directory ops (numtree-admin CLI)

use crate::admin_socket::AdminSocket;
use crate::api;
use crate::config::NodeConfig;
use crate::error::Result;
use numtree_ledger::{Ledger, RocksStore};
use std::sync::Arc;

/// Shared state for the node - one ledger handle used by every component.
pub struct NodeState {
    pub ledger: Ledger,
    pub config: NodeConfig,
}

/// A numtree node instance.
pub struct NumtreeNode {
    state: Arc<NodeState>,
}

impl NumtreeNode {
    /// Open storage and prepare the node.
    pub fn new(config: NodeConfig) -> Result<Self> {
        // Ensure data directory exists
        std::fs::create_dir_all(&config.data_dir)?;

        let store = Arc::new(RocksStore::open(config.data_dir.join("ledger"))?);
        let state = Arc::new(NodeState {
            ledger: Ledger::new(store),
            config,
        });

        Ok(Self { state })
    }

    /// Get the shared state (for API handlers).
    pub fn state(&self) -> Arc<NodeState> {
        Arc::clone(&self.state)
    }

    /// Run the node (starts the admin socket and HTTP server).
    pub async fn run(self) -> Result<()> {
        let config = &self.state.config;
        tracing::info!("Numtree node starting");
        tracing::info!("  API: http://{}", config.api_addr);
        tracing::info!("  Admin: {:?}", config.admin_socket);
        tracing::info!("  Data: {:?}", config.data_dir);

        // Start admin socket server in background
        let admin_socket = AdminSocket::new(
            Arc::clone(self.state.ledger.store()),
            config.admin_socket.clone(),
        );
        tokio::spawn(async move {
            if let Err(e) = admin_socket.run().await {
                tracing::error!("Admin socket error: {}", e);
            }
        });

        let app = api::build_router(self.state());

        let listener = tokio::net::TcpListener::bind(config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", config.api_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Numtree node stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use numtree_ledger::{AuthorId, NewRoot};
    use tempfile::tempdir;

    #[test]
    fn reopen_keeps_ledger() {
        let dir = tempdir().unwrap();
        let config = NodeConfig {
            data_dir: dir.path().to_path_buf(),
            admin_socket: dir.path().join("admin.sock"),
            ..NodeConfig::default()
        };

        let root = {
            let node = NumtreeNode::new(config.clone()).unwrap();
            node.state()
                .ledger
                .create_root(NewRoot {
                    author_id: AuthorId::new("a").unwrap(),
                    initial_value: 4.0,
                })
                .unwrap()
        };

        let node = NumtreeNode::new(config).unwrap();
        let loaded = node.state().ledger.node(&root.id.to_string()).unwrap().unwrap();
        assert_eq!(loaded.result, 4.0);
    }
}

//! Unix socket server for admin commands.
//!
//! Provides a local IPC interface for the author directory and store stats.
//! One JSON command per line in, one JSON response per line out.

use crate::error::Result;
use numtree_ledger::{Author, AuthorId, LedgerStore, StoreStats};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Admin command sent over the socket.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    /// Register or rename an author
    PutAuthor { author_id: String, name: String },
    /// Look up an author's display name
    GetAuthor { author_id: String },
    /// Entity counts
    Stats,
    /// Ping (health check)
    Ping,
}

/// Response from admin command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdminResponse {
    Ok { message: String },
    Error { error: String },
    Author { author_id: String, name: Option<String> },
    Stats { nodes: u64, roots: u64, authors: u64 },
    Pong,
}

/// Admin socket server.
pub struct AdminSocket {
    store: Arc<dyn LedgerStore>,
    socket_path: PathBuf,
}

impl AdminSocket {
    /// Create a new admin socket server.
    pub fn new(store: Arc<dyn LedgerStore>, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            socket_path: socket_path.into(),
        }
    }

    /// Run the admin socket server.
    pub async fn run(&self) -> Result<()> {
        // Remove a stale socket left by a previous run
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!("Admin socket listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let store = Arc::clone(&self.store);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, store).await {
                            tracing::error!("Admin connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept admin connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, store: Arc<dyn LedgerStore>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        let response = match serde_json::from_str::<AdminCommand>(&line) {
            Ok(cmd) => execute_command(cmd, store.as_ref()),
            Err(e) => AdminResponse::Error {
                error: format!("Invalid command: {}", e),
            },
        };

        let response_json = serde_json::to_string(&response)? + "\n";
        writer.write_all(response_json.as_bytes()).await?;
        line.clear();
    }

    Ok(())
}

fn execute_command(cmd: AdminCommand, store: &dyn LedgerStore) -> AdminResponse {
    let outcome = match cmd {
        AdminCommand::PutAuthor { author_id, name } => AuthorId::new(author_id).and_then(|id| {
            store.put_author(&Author::new(id.clone(), name.clone()))?;
            tracing::info!("Registered author {} as {:?}", id, name);
            Ok(AdminResponse::Ok {
                message: format!("Registered author {} as {}", id, name),
            })
        }),

        AdminCommand::GetAuthor { author_id } => AuthorId::new(author_id).and_then(|id| {
            let name = store.get_author(&id)?.map(|a| a.name);
            Ok(AdminResponse::Author {
                author_id: id.to_string(),
                name,
            })
        }),

        AdminCommand::Stats => store.stats().map(|StoreStats { nodes, roots, authors }| {
            AdminResponse::Stats {
                nodes,
                roots,
                authors,
            }
        }),

        AdminCommand::Ping => Ok(AdminResponse::Pong),
    };

    outcome.unwrap_or_else(|e| AdminResponse::Error {
        error: e.to_string(),
    })
}

/// Default socket path.
pub fn default_socket_path() -> PathBuf {
    let data_dir = std::env::var("NUMTREE_DATA_DIR").unwrap_or_else(|_| "./numtree-data".to_string());
    PathBuf::from(data_dir).join("admin.sock")
}

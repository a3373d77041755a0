//! Numtree Node binary

use numtree_node::{NodeConfig, NumtreeNode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "numtree_node=info,numtree_ledger=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Numtree Node");

    let config = NodeConfig::from_env()?;

    let node = NumtreeNode::new(config)?;
    node.run().await?;

    Ok(())
}

//! Runs the Lockpick gateway.
//!
//! Environment:
//! - `PORT`: listen port (default 3001)
//! - `LOCKPICK_DATA_DIR`: room snapshot directory (default
//!   `saved-rooms`; set empty to disable persistence)
//! - `RUST_LOG`: log filter (default `info`)

use lockpick_rooms::StoreConfig;
use lockpick_server::{LockpickServer, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3001);
    let snapshot_dir = match std::env::var("LOCKPICK_DATA_DIR") {
        Ok(dir) if dir.is_empty() => None,
        Ok(dir) => Some(dir.into()),
        Err(_) => Some("saved-rooms".into()),
    };

    let server = LockpickServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .store_config(StoreConfig { snapshot_dir, ..StoreConfig::default() })
        .build()
        .await?;
    tracing::info!(addr = %server.local_addr()?, "listening");
    server.run().await
}

use crate::api;
use crate::api::handlers::auth::{AuthConfig, UserStore};
use anyhow::Result;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub users_file: PathBuf,
    pub public_base_url: String,
    pub session_ttl_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        "Starting with user snapshot {} and session TTL {}s",
        args.users_file.display(),
        args.session_ttl_seconds
    );

    let store = Arc::new(UserStore::new(args.users_file));
    let auth_config =
        AuthConfig::new(args.public_base_url).with_session_ttl_seconds(args.session_ttl_seconds);

    api::new(args.port, store, auth_config).await
}

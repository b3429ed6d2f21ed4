//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let users_file = matches
        .get_one::<String>("users-file")
        .cloned()
        .context("missing required argument: --users-file")?;

    let public_base_url = matches
        .get_one::<String>("public-base-url")
        .cloned()
        .context("missing required argument: --public-base-url")?;

    // Reject URLs the cookie layer could not reason about before the server starts
    Url::parse(&public_base_url)
        .with_context(|| format!("Invalid public base URL: {public_base_url}"))?;

    let session_ttl_seconds = matches
        .get_one::<u64>("session-ttl-seconds")
        .copied()
        .unwrap_or(1800);

    Ok(Action::Server(Args {
        port,
        users_file: PathBuf::from(users_file),
        public_base_url,
        session_ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_action_from_args() {
        temp_env::with_vars(
            [
                ("PRUVI_PORT", None::<&str>),
                ("PRUVI_PUBLIC_BASE_URL", None),
                ("PRUVI_SESSION_TTL_SECONDS", None),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "pruvi",
                    "--users-file",
                    "/tmp/pruvi-users.json",
                    "--port",
                    "9000",
                ]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 9000);
                    assert_eq!(args.users_file, PathBuf::from("/tmp/pruvi-users.json"));
                    assert_eq!(args.public_base_url, "http://localhost:8080");
                    assert_eq!(args.session_ttl_seconds, 1800);
                }
            },
        );
    }

    #[test]
    fn invalid_public_base_url_rejected() {
        temp_env::with_vars([("PRUVI_PUBLIC_BASE_URL", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "pruvi",
                "--users-file",
                "/tmp/pruvi-users.json",
                "--public-base-url",
                "not a url",
            ]);
            let result = handler(&matches);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err.to_string().contains("Invalid public base URL"));
            }
        });
    }
}

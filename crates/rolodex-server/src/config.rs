//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address for the HTTP (axum) API server.  The port comes from
    /// the `PORT` env var.
    /// Default: `0.0.0.0:8000`
    pub http_addr: SocketAddr,

    /// Filesystem path of the SQLite database.
    /// Env: `DATABASE_URL` (a `sqlite://` or `sqlite:` prefix is accepted
    /// and stripped)
    /// Default: `./rolodex.db`
    pub database_path: PathBuf,

    /// Public static-asset root.  Uploaded avatars live in its `avatars`
    /// subdirectory and are served under `/static`.
    /// Env: `STATIC_ROOT`
    /// Default: `./static`
    pub static_root: PathBuf,

    /// Maximum avatar upload size in bytes (5 MiB).
    pub max_avatar_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8000).into(),
            database_path: PathBuf::from("./rolodex.db"),
            static_root: PathBuf::from("./static"),
            max_avatar_size: 5 * 1024 * 1024, // 5 MiB
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                config.http_addr = ([0, 0, 0, 0], parsed).into();
            } else {
                tracing::warn!(value = %port, "Invalid PORT, using default");
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_path = database_path_from_url(&url);
        }

        if let Ok(path) = std::env::var("STATIC_ROOT") {
            config.static_root = PathBuf::from(path);
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

/// Turn a `DATABASE_URL` value into a filesystem path.
///
/// Plain paths pass through unchanged; `sqlite://contacts.db` and
/// `sqlite:contacts.db` strip to `contacts.db`.
fn database_path_from_url(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8000).into());
        assert_eq!(config.database_path, PathBuf::from("./rolodex.db"));
        assert_eq!(config.static_root, PathBuf::from("./static"));
    }

    #[test]
    fn test_database_path_from_url() {
        assert_eq!(
            database_path_from_url("sqlite:///data/contacts.db"),
            PathBuf::from("/data/contacts.db")
        );
        assert_eq!(
            database_path_from_url("sqlite:contacts.db"),
            PathBuf::from("contacts.db")
        );
        assert_eq!(
            database_path_from_url("./contacts.db"),
            PathBuf::from("./contacts.db")
        );
    }
}

//! Error types
//!
//! `ServeError` covers a single request, `StartupError` covers process start.
//! Request errors never escape to hyper; the router maps them to 404.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a file for a request path
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("file not found")]
    NotFound,

    /// The requested path resolves outside the document root
    #[error("path escapes document root: {0}")]
    Forbidden(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while bringing the server up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("document root '{path}' is not accessible: {source}")]
    DocumentRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//! Static asset server for Unity WebGL builds.
//!
//! Serves a build directory (`index.html`, `Build/`, `TemplateData/`) with
//! extension-driven `Content-Type`, `Cache-Control` and CORS headers.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{AppState, Config};
pub use error::{ServeError, StartupError};

// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Layout of the WebGL build on disk
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Document root; every served file must resolve inside it
    pub root: String,
    /// File served for `/`
    pub index_file: String,
    /// Top-level scripts pinned to `application/javascript` and `no-cache`
    pub root_scripts: Vec<String>,
    /// File served for `/favicon.ico`, relative to the root
    pub favicon: String,
    /// Subdirectories served under their own prefix (`/Build/...`)
    pub asset_dirs: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// gzip text responses when the client accepts it
    pub compression: bool,
    /// Bodies smaller than this are sent uncompressed
    pub compression_min_size: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            index_file: "index.html".to_string(),
            root_scripts: vec!["storage.js".to_string(), "sw.js".to_string()],
            favicon: "TemplateData/favicon.ico".to_string(),
            asset_dirs: vec!["Build".to_string(), "TemplateData".to_string()],
        }
    }
}

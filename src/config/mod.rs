// Configuration module entry point
// Loads layered configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig};

/// Environment variable prefix, e.g. `WEBGL_SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "WEBGL";

/// Values supplied on the command line; they win over file and environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub root: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// The file is optional; missing keys fall back to built-in defaults
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        Self::load_with(config_path, &Overrides::default())
    }

    /// Load configuration and apply command line overrides on top
    pub fn load_with(config_path: &str, overrides: &Overrides) -> Result<Self, StartupError> {
        let site = SiteConfig::default();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 80)?
            .set_default("site.root", site.root)?
            .set_default("site.index_file", site.index_file)?
            .set_default("site.root_scripts", site.root_scripts)?
            .set_default("site.favicon", site.favicon)?
            .set_default("site.asset_dirs", site.asset_dirs)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "webgl-host")?
            .set_default("http.compression", true)?
            .set_default("http.compression_min_size", 500)?
            .set_override_option("site.root", overrides.root.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::InvalidAddress { addr, source })
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, StartupError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

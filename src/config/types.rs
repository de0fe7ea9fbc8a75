// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub site: SiteConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
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
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Site configuration
///
/// Describes the site tree and the routing policy: which menus build the
/// path table, which layout applies when a menu entry names none, and
/// which query parameters a request may carry.
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Root directory holding content/, layouts/, modules/ and public/
    pub root: String,
    /// Layout used when a menu entry does not name one
    pub default_layout: String,
    /// Layout used for the error page
    pub error_page_layout: String,
    /// Named menu files under the content directory, merged in order;
    /// on duplicate paths the earlier menu wins
    pub menus: Vec<String>,
    /// Query parameter names accepted without forcing the error page
    pub allowed_url_params: Vec<String>,
}

impl SiteConfig {
    pub fn content_dir(&self) -> PathBuf {
        Path::new(&self.root).join("content")
    }

    pub fn layouts_dir(&self) -> PathBuf {
        Path::new(&self.root).join("layouts")
    }

    pub fn modules_dir(&self) -> PathBuf {
        Path::new(&self.root).join("modules")
    }

    pub fn public_dir(&self) -> PathBuf {
        Path::new(&self.root).join("public")
    }
}

//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::mcp::adapter::BindMode;
use crate::mcp::dispatcher::ServerInfo;
use crate::mcp::protocol::SERVER_NAME;

/// Log levels accepted in `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Identity reported by `initialize`.
    #[serde(default)]
    pub server: ServerConfig,

    /// Filesystem preset settings.
    #[serde(default)]
    pub filesystem: FilesystemConfig,

    /// Tool invocation settings.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "server.name must not be empty".to_string(),
            });
        }

        for pattern in &self.filesystem.patterns {
            if let Err(e) = glob::Pattern::new(&pattern.glob) {
                return Err(ConfigError::ValidationError {
                    message: format!("Invalid glob pattern '{}': {e}", pattern.glob),
                });
            }
            if pattern.mime_type.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: format!("Pattern '{}' has an empty mime_type", pattern.glob),
                });
            }
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }

    /// Server identity derived from the `server` section.
    #[must_use]
    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: self.server.name.clone(),
            version: self
                .server
                .version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
        }
    }

    /// Argument binding mode derived from the `tools` section.
    #[must_use]
    pub const fn bind_mode(&self) -> BindMode {
        if self.tools.strict_arguments {
            BindMode::Strict
        } else {
            BindMode::Permissive
        }
    }
}

/// Server identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Name reported in `serverInfo`.
    /// Default: "minimal-mcp"
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Version reported in `serverInfo`. Defaults to the crate version.
    #[serde(default)]
    pub version: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: None,
        }
    }
}

fn default_server_name() -> String {
    SERVER_NAME.to_string()
}

/// Maps files matching a glob to a MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcePattern {
    /// File name glob, matched recursively below the root.
    pub glob: String,
    /// MIME type given to matching resources.
    pub mime_type: String,
}

impl ResourcePattern {
    fn new(glob: &str, mime_type: &str) -> Self {
        Self {
            glob: glob.to_string(),
            mime_type: mime_type.to_string(),
        }
    }
}

/// Filesystem preset configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesystemConfig {
    /// Directory exposed by the filesystem preset.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Which files become resources, and with which MIME type.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<ResourcePattern>,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            patterns: default_patterns(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_patterns() -> Vec<ResourcePattern> {
    vec![
        ResourcePattern::new("*.txt", "text/plain"),
        ResourcePattern::new("*.md", "text/markdown"),
    ]
}

/// Tool invocation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Reject argument keys a tool did not declare.
    #[serde(default)]
    pub strict_arguments: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

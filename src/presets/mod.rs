//! Ready-made servers.
//!
//! - [`Preset::Filesystem`] exposes text files under a root directory
//! - [`Preset::Example`] serves a couple of static documents and demo tools

pub mod example;
pub mod filesystem;

use crate::config::Config;
use crate::error::RegistryError;
use crate::mcp::server::McpServer;

/// Which ready-made server to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Files under `filesystem.root`.
    #[default]
    Filesystem,
    /// Static documents plus `current_time` and `calculate`.
    Example,
}

/// Builds the server for `preset`.
///
/// # Errors
///
/// Returns an error if registration fails.
pub fn build(preset: Preset, config: &Config) -> Result<McpServer, RegistryError> {
    match preset {
        Preset::Filesystem => filesystem::filesystem_server(config),
        Preset::Example => example::example_server(config),
    }
}

//! Filesystem preset: exposes text files below a root directory.
//!
//! Every file matching one of the configured patterns becomes a resource
//! `file://<path>`. Three tools inspect the tree: `get_file_info`,
//! `list_directory` and `search_content`. Relative tool paths resolve
//! against the root.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde_json::{json, Value};

use crate::config::{Config, ResourcePattern};
use crate::error::{RegistryError, ToolError};
use crate::mcp::adapter::{Param, ToolHandler};
use crate::mcp::registry::Registry;
use crate::mcp::server::McpServer;

/// Builds a server exposing `config.filesystem`.
///
/// # Errors
///
/// Returns an error if registration fails.
pub fn filesystem_server(config: &Config) -> Result<McpServer, RegistryError> {
    let server = McpServer::with_registry(Registry::new(), config.server_info())
        .with_bind_mode(config.bind_mode());
    let root = &config.filesystem.root;

    let count = register_files(server.registry(), root, &config.filesystem.patterns)?;
    tracing::info!(root = %root.display(), resources = count, "Registered filesystem resources");

    register_tools(server.registry(), root)?;
    Ok(server)
}

/// Registers every readable file below `root` that matches a pattern.
///
/// Unreadable files are skipped. Returns the number of files registered.
///
/// # Errors
///
/// Returns an error if registration fails.
pub fn register_files(
    registry: &Registry,
    root: &Path,
    patterns: &[ResourcePattern],
) -> Result<usize, RegistryError> {
    let mut count = 0;

    for pattern in patterns {
        for path in find_files(root, &pattern.glob) {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    registry.register_resource(
                        format!("file://{}", path.display()),
                        content,
                        pattern.mime_type.clone(),
                    )?;
                    count += 1;
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable file");
                }
            }
        }
    }

    Ok(count)
}

/// Files below `root` (recursively) whose name matches `file_glob`.
fn find_files(root: &Path, file_glob: &str) -> Vec<PathBuf> {
    let base = glob::Pattern::escape(&root.to_string_lossy());
    let full = format!("{}/**/{file_glob}", base.trim_end_matches('/'));

    match glob::glob(&full) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect(),
        Err(e) => {
            tracing::warn!(pattern = %full, error = %e, "Invalid glob pattern");
            Vec::new()
        }
    }
}

/// Registers `get_file_info`, `list_directory` and `search_content`.
///
/// # Errors
///
/// Returns an error if registration fails.
pub fn register_tools(registry: &Registry, root: &Path) -> Result<(), RegistryError> {
    let base = root.to_path_buf();
    registry.register_tool(
        "get_file_info",
        "Get file metadata",
        ToolHandler::new(vec![Param::required("path")], move |args| {
            file_info(&base.join(args.str("path")?))
        }),
        Some(json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "required": ["path"]
        })),
    )?;

    let base = root.to_path_buf();
    registry.register_tool(
        "list_directory",
        "List files in directory",
        ToolHandler::new(vec![Param::optional("path", json!("."))], move |args| {
            list_directory(&base.join(args.str("path")?))
        }),
        Some(json!({
            "type": "object",
            "properties": {"path": {"type": "string", "default": "."}}
        })),
    )?;

    let base = root.to_path_buf();
    registry.register_tool(
        "search_content",
        "Search for text in files",
        ToolHandler::new(
            vec![
                Param::required("query"),
                Param::optional("pattern", json!("*.txt")),
            ],
            move |args| search_content(&base, args.str("query")?, args.str("pattern")?),
        ),
        Some(json!({
            "type": "object",
            "properties": {
                "query": {"type": "string"},
                "pattern": {"type": "string"}
            },
            "required": ["query"]
        })),
    )
}

fn io_failure(path: &Path, error: &std::io::Error) -> ToolError {
    ToolError::failed(format!("{error}: '{}'", path.display()))
}

fn file_info(path: &Path) -> Result<Value, ToolError> {
    let metadata = fs::metadata(path).map_err(|e| io_failure(path, &e))?;
    let modified = metadata
        .modified()
        .map_err(|e| io_failure(path, &e))
        .map(local_iso8601)?;

    Ok(json!({
        "size": metadata.len(),
        "modified": modified,
    }))
}

fn local_iso8601(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn list_directory(path: &Path) -> Result<Value, ToolError> {
    let entries = fs::read_dir(path).map_err(|e| io_failure(path, &e))?;

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path().display().to_string())
        .collect();
    names.sort();

    Ok(json!(names))
}

fn search_content(root: &Path, query: &str, pattern: &str) -> Result<Value, ToolError> {
    glob::Pattern::new(pattern)
        .map_err(|e| ToolError::failed(format!("invalid pattern '{pattern}': {e}")))?;

    let needle = query.to_lowercase();
    let matches: Vec<String> = find_files(root, pattern)
        .into_iter()
        .filter(|path| {
            fs::read_to_string(path)
                .map(|content| content.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .map(|path| path.display().to_string())
        .collect();

    Ok(json!(matches))
}

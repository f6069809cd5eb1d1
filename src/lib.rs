//! minimal-mcp: a minimal Model Context Protocol server.
//!
//! The server reads newline-delimited JSON requests, dispatches them to a
//! fixed set of methods, and writes newline-delimited JSON responses. Two
//! registries are exposed through the protocol: named resources (static text)
//! and named tools (functions with a declared argument contract).
//!
//! ```no_run
//! use minimal_mcp::mcp::{McpServer, Param, ServerInfo, ToolHandler};
//! use serde_json::json;
//!
//! # async fn run() -> std::io::Result<()> {
//! let server = McpServer::new(ServerInfo::default());
//! server.register_resource("doc://welcome", "Hello!", "text/plain").ok();
//! server
//!     .register_tool(
//!         "add",
//!         "Add two numbers",
//!         ToolHandler::new(vec![Param::required("a"), Param::required("b")], |args| {
//!             Ok(json!(args.f64("a")? + args.f64("b")?))
//!         }),
//!         None,
//!     )
//!     .ok();
//! server.run().await
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`mcp`]: Protocol, registry, dispatcher and transport loop
//! - [`presets`]: Ready-made filesystem and example servers

pub mod config;
pub mod error;
pub mod mcp;
pub mod presets;

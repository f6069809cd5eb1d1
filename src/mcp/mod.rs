//! Model Context Protocol (MCP) server implementation.
//!
//! The server exposes two registries, named resources and named tools, over
//! newline-delimited JSON-RPC on a byte stream (normally stdin/stdout).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          McpServer                           │
//! │                                                              │
//! │   ┌─────────────┐    ┌──────────────┐    ┌──────────────┐    │
//! │   │  Transport  │───▶│  Dispatcher  │───▶│   Registry   │    │
//! │   │   (lines)   │    │ (method map) │    │ (res, tools) │    │
//! │   └─────────────┘    └──────────────┘    └──────────────┘    │
//! │                             │                   │            │
//! │                             ▼                   ▼            │
//! │                      ┌──────────────────────────────┐        │
//! │                      │   Tool invocation adapter    │        │
//! │                      └──────────────────────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod adapter;
pub mod dispatcher;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod transport;

pub use adapter::{Arguments, BindMode, Param, ToolHandler};
pub use dispatcher::{Dispatcher, Method, ServerInfo, ToolCallResult};
pub use protocol::{Request, Response, MCP_PROTOCOL_VERSION};
pub use registry::{Registry, Resource, Tool};
pub use server::McpServer;
pub use transport::{LineTransport, StdioTransport};

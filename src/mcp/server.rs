//! MCP server instance and transport loop.
//!
//! The server owns its [`Registry`] and [`Dispatcher`]; nothing is global.
//! The loop reads one line, handles it to completion, writes one response
//! and flushes before reading the next line:
//!
//! ```text
//! Idle → ReadLine → Parse → Dispatch → Serialise → WriteLine → Idle
//!           │
//!           └── end of input → Closed
//! ```
//!
//! A bad line produces an error response and the loop carries on. The only
//! exits are end of input, a shutdown signal (stdio only), or an I/O error on
//! the underlying streams.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::error::{McpError, RegistryError};
use crate::mcp::adapter::{BindMode, ToolHandler};
use crate::mcp::dispatcher::{Dispatcher, ServerInfo};
use crate::mcp::protocol::{parse_request, Response};
use crate::mcp::registry::Registry;
use crate::mcp::transport::{Line, LineTransport, StdioTransport};

/// A minimal MCP server.
#[derive(Debug, Clone)]
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Creates a server with an empty registry.
    #[must_use]
    pub fn new(info: ServerInfo) -> Self {
        Self::with_registry(Registry::new(), info)
    }

    /// Creates a server over an existing registry handle.
    #[must_use]
    pub fn with_registry(registry: Registry, info: ServerInfo) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry, info),
        }
    }

    /// Sets how undeclared tool arguments are treated.
    #[must_use]
    pub fn with_bind_mode(mut self, mode: BindMode) -> Self {
        self.dispatcher = self.dispatcher.with_bind_mode(mode);
        self
    }

    /// Registry handle. Clones share state with the running server.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        self.dispatcher.registry()
    }

    /// Registers a resource. See [`Registry::register_resource`].
    ///
    /// # Errors
    ///
    /// Returns an error if `uri` is empty.
    pub fn register_resource(
        &self,
        uri: impl Into<String>,
        content: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.registry().register_resource(uri, content, mime_type)
    }

    /// Registers a tool. See [`Registry::register_tool`].
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is empty.
    pub fn register_tool(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: ToolHandler,
        schema: Option<Value>,
    ) -> Result<(), RegistryError> {
        self.registry()
            .register_tool(name, description, handler, schema)
    }

    /// Turns one input line into exactly one response.
    ///
    /// Every line is answered: a blank line is a parse failure and a request
    /// without `id` gets a response without `id`.
    #[must_use]
    pub fn process_line(&self, line: &Line) -> Response {
        let text = match line {
            Line::Text(text) => text,
            Line::Invalid(message) => {
                tracing::warn!(error = %message, "Rejected non UTF-8 input line");
                return Response::parse_failure(&McpError::ParseFailure {
                    message: message.clone(),
                });
            }
        };

        match parse_request(text.trim()) {
            Ok(request) => self.dispatcher.respond(&request),
            Err(error) => {
                tracing::warn!(error = %error, "Failed to parse request");
                Response::parse_failure(&error)
            }
        }
    }

    /// Runs the transport loop until the input stream ends.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading or writing the streams fails.
    pub async fn serve<R, W>(&self, transport: &mut LineTransport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(line) = transport.read_line().await? {
            self.serve_line(transport, &line).await?;
        }
        tracing::info!("Input closed");
        Ok(())
    }

    async fn serve_line<R, W>(
        &self,
        transport: &mut LineTransport<R, W>,
        line: &Line,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let response = self.process_line(line);
        transport.write_response(&response).await
    }

    /// Runs the server on stdin/stdout with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&self) -> std::io::Result<()> {
        let mut transport = StdioTransport::stdio();
        self.run_with_shutdown(&mut transport).await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&self, transport: &mut StdioTransport) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    return Ok(());
                }

                line = transport.read_line() => {
                    let Some(line) = line? else {
                        tracing::info!("Input closed");
                        return Ok(());
                    };
                    self.serve_line(transport, &line).await?;
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&self, transport: &mut StdioTransport) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    return Ok(());
                }

                line = transport.read_line() => {
                    let Some(line) = line? else {
                        tracing::info!("Input closed");
                        return Ok(());
                    };
                    self.serve_line(transport, &line).await?;
                }
            }
        }
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new(ServerInfo::default())
    }
}

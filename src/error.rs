//! Error types for minimal-mcp.
//!
//! Protocol-level failures ([`McpError`]) become JSON-RPC error responses.
//! Tool failures ([`ToolError`]) never do: they are rendered as tool results
//! flagged with `isError` so a caller can tell "the call reached the tool but
//! the tool failed" apart from "the call never reached a tool".

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised when registering entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A resource was registered with an empty URI.
    #[error("resource uri must not be empty")]
    EmptyUri,

    /// A tool was registered with an empty name.
    #[error("tool name must not be empty")]
    EmptyToolName,
}

/// Protocol-level failures surfaced as JSON-RPC error responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    /// The method name is not in the dispatch table.
    #[error("Unknown method: {method}")]
    UnknownMethod {
        /// The offending method name.
        method: String,
    },

    /// The requested resource is not registered.
    #[error("Resource not found: {uri}")]
    ResourceNotFound {
        /// URI that was requested.
        uri: String,
    },

    /// The inbound line was not a usable JSON object.
    #[error("{message}")]
    ParseFailure {
        /// Parser error text.
        message: String,
    },

    /// Something went wrong inside the server while producing a result.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl McpError {
    /// Returns the JSON-RPC error code for this error.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::UnknownMethod { .. } => -32601,
            Self::ResourceNotFound { .. } => -32002,
            // Parse failures reuse the internal error class.
            Self::ParseFailure { .. } | Self::Internal { .. } => -32603,
        }
    }
}

/// Failures of a `tools/call` request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// No tool with this name is registered.
    #[error("Tool '{name}' not found")]
    NotFound {
        /// Requested tool name.
        name: String,
    },

    /// The tool was reached but binding or execution failed.
    #[error("{message}")]
    ExecutionFailed {
        /// Underlying failure text.
        message: String,
    },
}

impl ToolError {
    /// Creates an execution failure from any displayable message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        assert!(error.to_string().contains("invalid setting"));
    }

    #[test]
    fn unknown_method_names_the_method() {
        let error = McpError::UnknownMethod {
            method: "resources/delete".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown method: resources/delete");
        assert_eq!(error.code(), -32601);
    }

    #[test]
    fn parse_failure_uses_internal_error_code() {
        let error = McpError::ParseFailure {
            message: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(error.code(), -32603);
        assert_eq!(error.to_string(), "expected value at line 1 column 1");
    }

    #[test]
    fn tool_not_found_names_the_tool() {
        let error = ToolError::NotFound {
            name: "missing".to_string(),
        };
        assert_eq!(error.to_string(), "Tool 'missing' not found");
    }
}

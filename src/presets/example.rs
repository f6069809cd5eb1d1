//! Example preset: two static documents and two small tools.

use chrono::Local;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{RegistryError, ToolError};
use crate::mcp::adapter::{Arguments, Param, ToolHandler};
use crate::mcp::registry::Registry;
use crate::mcp::server::McpServer;

/// Builds the example server.
///
/// # Errors
///
/// Returns an error if registration fails.
pub fn example_server(config: &Config) -> Result<McpServer, RegistryError> {
    let server = McpServer::with_registry(Registry::new(), config.server_info())
        .with_bind_mode(config.bind_mode());
    register(server.registry())?;
    Ok(server)
}

/// Registers the example resources and tools.
///
/// # Errors
///
/// Returns an error if registration fails.
pub fn register(registry: &Registry) -> Result<(), RegistryError> {
    registry.register_text(
        "doc://welcome",
        "Welcome! This server provides project information.",
    )?;
    registry.register_resource(
        "doc://readme",
        "# Project Guide\n\nThis is an example MCP server.",
        "text/markdown",
    )?;

    registry.register_tool(
        "current_time",
        "Get current server time",
        ToolHandler::new(vec![], |_| {
            Ok(json!(Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()))
        }),
        None,
    )?;

    registry.register_tool(
        "calculate",
        "Perform basic math operations",
        ToolHandler::new(
            vec![
                Param::required("operation"),
                Param::required("a"),
                Param::required("b"),
            ],
            calculate,
        ),
        Some(json!({
            "type": "object",
            "properties": {
                "operation": {"type": "string", "enum": ["+", "-", "*", "/"]},
                "a": {"type": "number"},
                "b": {"type": "number"}
            },
            "required": ["operation", "a", "b"]
        })),
    )
}

/// Applies `operation` to `a` and `b`.
///
/// Integer operands stay integers for `+`, `-` and `*`. Division always
/// yields a float; dividing by zero and unknown operations yield 0.
fn calculate(args: &Arguments) -> Result<Value, ToolError> {
    let operation = args.str("operation")?;
    let a = args.value("a")?;
    let b = args.value("b")?;

    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        let exact = match operation {
            "+" => x.checked_add(y),
            "-" => x.checked_sub(y),
            "*" => x.checked_mul(y),
            _ => None,
        };
        if let Some(value) = exact {
            return Ok(json!(value));
        }
    }

    let x = args.f64("a")?;
    let y = args.f64("b")?;
    let value = match operation {
        "+" => x + y,
        "-" => x - y,
        "*" => x * y,
        "/" if y != 0.0 => x / y,
        _ => return Ok(json!(0)),
    };
    Ok(json!(value))
}

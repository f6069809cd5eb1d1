//! Method dispatch.
//!
//! The dispatcher routes a request's method name through a fixed table to
//! one handler. It keeps no per-request state: identical requests produce
//! identical results for the same registry contents.
//!
//! | method           | result                                         |
//! |------------------|------------------------------------------------|
//! | `initialize`     | protocol version, server info, capabilities    |
//! | `resources/list` | `{resources: [{uri, mimeType, name}]}`         |
//! | `resources/read` | `{contents: [{uri, mimeType, text}]}`          |
//! | `tools/list`     | `{tools: [{name, description, inputSchema}]}`  |
//! | `tools/call`     | `{content: [{type: "text", text}]}`            |
//! | `ping`           | `{}`                                           |
//!
//! Any other name is [`McpError::UnknownMethod`]. Tool failures are not
//! protocol errors: `tools/call` always succeeds at the protocol level and
//! flags failed calls with `isError: true`.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{McpError, ToolError};
use crate::mcp::adapter::{render_text, BindMode};
use crate::mcp::protocol::{Request, Response, MCP_PROTOCOL_VERSION, SERVER_NAME};
use crate::mcp::registry::Registry;

/// The fixed set of supported methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `initialize`
    Initialize,
    /// `resources/list`
    ResourcesList,
    /// `resources/read`
    ResourcesRead,
    /// `tools/list`
    ToolsList,
    /// `tools/call`
    ToolsCall,
    /// `ping`
    Ping,
}

impl Method {
    /// Every supported method.
    pub const ALL: [Self; 6] = [
        Self::Initialize,
        Self::ResourcesList,
        Self::ResourcesRead,
        Self::ToolsList,
        Self::ToolsCall,
        Self::Ping,
    ];

    /// Wire name of the method.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::ResourcesList => "resources/list",
            Self::ResourcesRead => "resources/read",
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::Ping => "ping",
        }
    }
}

/// Server information for initialisation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Resource-related capabilities.
    pub resources: ListChanged,
    /// Tool-related capabilities.
    pub tools: ListChanged,
}

/// Whether a list can change during the session.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChanged {
    /// Always `true`: registries may be updated between requests.
    pub list_changed: bool,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            resources: ListChanged { list_changed: true },
            tools: ListChanged { list_changed: true },
        }
    }
}

/// Content item in a tool call response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Failure message, present only when `is_error` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            error: None,
            is_error: false,
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            content: vec![ToolContent::Text {
                text: message.clone(),
            }],
            error: Some(message),
            is_error: true,
        }
    }
}

impl From<Result<Value, ToolError>> for ToolCallResult {
    fn from(outcome: Result<Value, ToolError>) -> Self {
        match outcome {
            Ok(value) => Self::text(render_text(&value)),
            Err(error) => Self::error(error.to_string()),
        }
    }
}

/// Routes requests to method handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Registry,
    info: ServerInfo,
    bind_mode: BindMode,
    routes: HashMap<&'static str, Method>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: Registry, info: ServerInfo) -> Self {
        let routes: HashMap<&'static str, Method> =
            Method::ALL.iter().map(|m| (m.name(), *m)).collect();
        debug_assert_eq!(
            routes.len(),
            Method::ALL.len(),
            "method table contains duplicate names"
        );

        Self {
            registry,
            info,
            bind_mode: BindMode::default(),
            routes,
        }
    }

    /// Sets how undeclared tool arguments are treated.
    #[must_use]
    pub const fn with_bind_mode(mut self, mode: BindMode) -> Self {
        self.bind_mode = mode;
        self
    }

    /// The registry this dispatcher serves.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Looks up a method by wire name.
    #[must_use]
    pub fn route(&self, method: &str) -> Option<Method> {
        self.routes.get(method).copied()
    }

    /// Handles a request and builds its response envelope.
    #[must_use]
    pub fn respond(&self, request: &Request) -> Response {
        match self.handle(request) {
            Ok(result) => Response::success(request.id.clone(), result),
            Err(error) => {
                tracing::debug!(method = %request.method, error = %error, "Request failed");
                Response::failure(request.id.clone(), &error)
            }
        }
    }

    /// Handles a request and returns its result payload.
    ///
    /// # Errors
    ///
    /// Returns a protocol-level error for unknown methods and missing
    /// resources.
    pub fn handle(&self, request: &Request) -> Result<Value, McpError> {
        let method = self
            .route(&request.method)
            .ok_or_else(|| McpError::UnknownMethod {
                method: request.method.clone(),
            })?;

        tracing::debug!(method = method.name(), "Dispatching request");

        match method {
            Method::Initialize => Ok(self.initialize()),
            Method::ResourcesList => Ok(self.resources_list()),
            Method::ResourcesRead => self.resources_read(request),
            Method::ToolsList => Ok(self.tools_list()),
            Method::ToolsCall => self.tools_call(request),
            Method::Ping => Ok(json!({})),
        }
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "serverInfo": self.info,
            "capabilities": ServerCapabilities::default(),
        })
    }

    fn resources_list(&self) -> Value {
        json!({ "resources": self.registry.list_resources() })
    }

    fn resources_read(&self, request: &Request) -> Result<Value, McpError> {
        let resource = request
            .param_str("uri")
            .and_then(|uri| self.registry.get_resource(uri))
            .ok_or_else(|| McpError::ResourceNotFound {
                uri: request.param_text("uri"),
            })?;

        Ok(json!({ "contents": [resource] }))
    }

    fn tools_list(&self) -> Value {
        json!({ "tools": self.registry.list_tools() })
    }

    fn tools_call(&self, request: &Request) -> Result<Value, McpError> {
        let name = request.param_text("name");
        let arguments = request.param("arguments").cloned().unwrap_or(Value::Null);

        let outcome = request
            .param_str("name")
            .and_then(|name| self.registry.get_tool(name))
            .map_or_else(
                || Err(ToolError::NotFound { name: name.clone() }),
                |tool| tool.handler.invoke(&arguments, self.bind_mode),
            );

        if let Err(error) = &outcome {
            tracing::warn!(tool = %name, error = %error, "Tool call failed");
        }

        serde_json::to_value(ToolCallResult::from(outcome)).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            McpError::Internal {
                message: "failed to serialise result".to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::adapter::{Param, ToolHandler};

    fn dispatcher() -> Dispatcher {
        let registry = Registry::new();
        registry
            .register_resource("doc://welcome", "Welcome!", "text/plain")
            .unwrap();
        registry
            .register_tool(
                "echo",
                "Echo a message",
                ToolHandler::new(vec![Param::required("message")], |args| {
                    Ok(args.value("message")?.clone())
                }),
                None,
            )
            .unwrap();
        registry
            .register_tool(
                "fail",
                "Always fails",
                ToolHandler::new(vec![], |_| Err(ToolError::failed("nope"))),
                None,
            )
            .unwrap();
        Dispatcher::new(registry, ServerInfo::default())
    }

    fn request(method: &str, params: Value) -> Request {
        Request::new(Some(json!(1)), method, Some(params))
    }

    #[test]
    fn every_method_routes() {
        let d = dispatcher();
        assert_eq!(d.routes.len(), Method::ALL.len());
        for method in Method::ALL {
            assert_eq!(d.route(method.name()), Some(method));
        }
        assert_eq!(d.route("resources/delete"), None);
    }

    #[test]
    fn initialize_is_fixed() {
        let d = dispatcher();
        let first = d.handle(&request("initialize", json!({}))).unwrap();
        d.handle(&request("ping", json!({}))).unwrap();
        let second = d.handle(&request("initialize", Value::Null)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(first["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(first["capabilities"]["resources"]["listChanged"], true);
        assert_eq!(first["capabilities"]["tools"]["listChanged"], true);
    }

    #[test]
    fn ping_is_empty_object() {
        let result = dispatcher().handle(&request("ping", json!({}))).unwrap();
        assert_eq!(result, json!({}));
    }

    #[test]
    fn unknown_method_is_error() {
        let err = dispatcher()
            .handle(&request("resources/delete", json!({})))
            .unwrap_err();
        assert_eq!(
            err,
            McpError::UnknownMethod {
                method: "resources/delete".to_string()
            }
        );
    }

    #[test]
    fn read_registered_resource() {
        let result = dispatcher()
            .handle(&request("resources/read", json!({"uri": "doc://welcome"})))
            .unwrap();
        assert_eq!(
            result,
            json!({"contents": [{"uri": "doc://welcome", "mimeType": "text/plain", "text": "Welcome!"}]})
        );
    }

    #[test]
    fn read_missing_resource_is_not_found() {
        let response = dispatcher().respond(&request("resources/read", json!({"uri": "doc://nope"})));
        assert!(response.is_error());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], -32002);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn read_without_uri_is_not_found() {
        let d = dispatcher();
        let err = d.handle(&request("resources/read", json!({}))).unwrap_err();
        assert_eq!(
            err,
            McpError::ResourceNotFound {
                uri: "null".to_string()
            }
        );

        let err = d
            .handle(&request("resources/read", json!({"uri": 3})))
            .unwrap_err();
        assert_eq!(err.to_string(), "Resource not found: 3");
        assert_eq!(err.code(), -32002);
    }

    #[test]
    fn call_tool_returns_text() {
        let result = dispatcher()
            .handle(&request(
                "tools/call",
                json!({"name": "echo", "arguments": {"message": "hi"}}),
            ))
            .unwrap();
        assert_eq!(result, json!({"content": [{"type": "text", "text": "hi"}]}));
    }

    #[test]
    fn call_unknown_tool_is_flagged() {
        let result = dispatcher()
            .handle(&request("tools/call", json!({"name": "ghost", "arguments": {}})))
            .unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["error"].as_str().unwrap().contains("ghost"));
    }

    #[test]
    fn call_without_string_name_is_flagged() {
        let d = dispatcher();
        let result = d
            .handle(&request("tools/call", json!({"name": 5})))
            .unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["error"], "Tool '5' not found");

        let result = d.handle(&request("tools/call", json!({}))).unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["error"], "Tool 'null' not found");

        let result = d.handle(&request("tools/call", Value::Null)).unwrap();
        assert_eq!(result["isError"], true);
    }

    #[test]
    fn handler_can_register_during_call() {
        let d = dispatcher();
        let registry = d.registry().clone();
        d.registry()
            .register_tool(
                "publish",
                "Registers a resource",
                ToolHandler::new(vec![Param::required("uri")], move |args| {
                    let uri = args.str("uri")?;
                    registry
                        .register_resource(uri, "published", "text/plain")
                        .map_err(|e| ToolError::failed(e.to_string()))?;
                    Ok(json!(uri))
                }),
                None,
            )
            .unwrap();

        let result = d
            .handle(&request(
                "tools/call",
                json!({"name": "publish", "arguments": {"uri": "doc://fresh"}}),
            ))
            .unwrap();
        assert_eq!(result["content"][0]["text"], "doc://fresh");
        assert!(result.get("isError").is_none());

        let read = d
            .handle(&request("resources/read", json!({"uri": "doc://fresh"})))
            .unwrap();
        assert_eq!(read["contents"][0]["text"], "published");
    }

    #[test]
    fn failing_tool_is_flagged() {
        let result = dispatcher()
            .handle(&request("tools/call", json!({"name": "fail"})))
            .unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["error"], "nope");
        assert_eq!(result["content"][0]["text"], "nope");
    }

    #[test]
    fn strict_mode_rejects_extra_arguments() {
        let d = dispatcher().with_bind_mode(BindMode::Strict);
        let result = d
            .handle(&request(
                "tools/call",
                json!({"name": "echo", "arguments": {"message": "hi", "loud": true}}),
            ))
            .unwrap();
        assert_eq!(result["isError"], true);
    }

    #[test]
    fn lists_hide_handlers() {
        let d = dispatcher();
        let tools = d.handle(&request("tools/list", json!({}))).unwrap();
        assert_eq!(tools["tools"][0]["name"], "echo");
        assert!(tools["tools"][0].get("handler").is_none());

        let resources = d.handle(&request("resources/list", json!({}))).unwrap();
        assert_eq!(resources["resources"][0]["name"], "welcome");
    }

    #[test]
    fn tool_call_result_text() {
        let result = ToolCallResult::text("Hello, world!");
        assert!(!result.is_error);
        assert!(result.error.is_none());
        match &result.content[0] {
            ToolContent::Text { text } => assert_eq!(text, "Hello, world!"),
        }
    }

    #[test]
    fn tool_call_result_error() {
        let result = ToolCallResult::error("Something went wrong");
        assert!(result.is_error);
        assert_eq!(result.error.as_deref(), Some("Something went wrong"));
        assert_eq!(result.content.len(), 1);
    }
}

//! JSON-RPC 2.0 message types for MCP protocol.
//!
//! One request envelope and one response envelope. The response is a
//! discriminated union: it carries exactly one of `result` or `error`, which
//! lets the transport apply a single serialisation rule to every outcome.
//!
//! # Leniency
//!
//! Unlike strict JSON-RPC, the `jsonrpc` marker is not required on input and
//! `id` may be absent or any JSON value. The `id` is echoed back verbatim; the
//! server never assumes monotonic sequencing.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::McpError;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Default server name for capability negotiation.
pub const SERVER_NAME: &str = "minimal-mcp";

/// JSON-RPC version marker written on every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// An inbound request.
///
/// `id` is `None` only when the key is absent; a present `null` is kept as
/// `Some(Value::Null)` and echoed back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    /// Caller-chosen identifier, echoed in the response.
    pub id: Option<Value>,

    /// The method to invoke. Missing is the empty name; a non-string value
    /// is named by its JSON text.
    pub method: String,

    /// Optional parameters for the method.
    pub params: Option<Value>,
}

impl Request {
    /// Creates a request with the given id, method and params.
    #[must_use]
    pub fn new(id: Option<Value>, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }

    /// Builds a request from a decoded JSON object without rejecting any
    /// field for its type.
    #[must_use]
    pub fn from_object(mut object: Map<String, Value>) -> Self {
        let method = match object.remove("method") {
            None => String::new(),
            Some(value) => value_text(&value),
        };

        Self {
            id: object.remove("id"),
            method,
            params: object.remove("params"),
        }
    }

    /// Returns a string parameter by name, if present.
    #[must_use]
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.as_ref()?.get(name)?.as_str()
    }

    /// Returns a parameter by name, if present and not `null`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .as_ref()?
            .get(name)
            .filter(|value| !value.is_null())
    }

    /// Names a parameter for messages: strings verbatim, other values as
    /// JSON text, absent as `null`.
    #[must_use]
    pub fn param_text(&self, name: &str) -> String {
        self.params
            .as_ref()
            .and_then(|params| params.get(name))
            .map_or_else(|| "null".to_string(), value_text)
    }
}

/// Strings verbatim, every other value as compact JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,

    /// Additional information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&McpError> for ErrorObject {
    fn from(error: &McpError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            data: None,
        }
    }
}

/// Success or failure payload of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The method completed and produced this result.
    Result(Value),
    /// The request failed at the protocol level.
    Error(ErrorObject),
}

/// An outbound response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Exactly one of `result` or `error`.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// Creates a new error response.
    #[must_use]
    pub fn failure(id: Option<Value>, error: &McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(error.into()),
        }
    }

    /// Creates the response for a line that could not be parsed (no id).
    #[must_use]
    pub fn parse_failure(error: &McpError) -> Self {
        Self::failure(None, error)
    }

    /// Returns `true` if this response carries an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

/// Parses one line of input into a request.
///
/// # Errors
///
/// Returns [`McpError::ParseFailure`] if the line is not valid JSON or is
/// not a JSON object. Fields of unexpected type are not parse failures.
pub fn parse_request(line: &str) -> Result<Request, McpError> {
    let value: Value = serde_json::from_str(line).map_err(|e| McpError::ParseFailure {
        message: e.to_string(),
    })?;

    match value {
        Value::Object(object) => Ok(Request::from_object(object)),
        _ => Err(McpError::ParseFailure {
            message: "request must be a JSON object".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_valid_request() {
        let json = r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#;
        let req = parse_request(json).unwrap();
        assert_eq!(req.id, Some(json!(1)));
        assert_eq!(req.method, "initialize");
    }

    #[test]
    fn parse_without_id_or_jsonrpc() {
        let req = parse_request(r#"{"method": "ping"}"#).unwrap();
        assert!(req.id.is_none());
        assert_eq!(req.method, "ping");
    }

    #[test]
    fn parse_keeps_null_id() {
        let req = parse_request(r#"{"id": null, "method": "ping"}"#).unwrap();
        assert_eq!(req.id, Some(Value::Null));

        let value = serde_json::to_value(Response::success(req.id, json!({}))).unwrap();
        assert_eq!(value.get("id"), Some(&Value::Null));
    }

    #[test]
    fn parse_non_string_method_keeps_id() {
        let req = parse_request(r#"{"id": 4, "method": 7}"#).unwrap();
        assert_eq!(req.id, Some(json!(4)));
        assert_eq!(req.method, "7");
    }

    #[test]
    fn parse_missing_method_is_empty_name() {
        let req = parse_request(r#"{"id": "x"}"#).unwrap();
        assert_eq!(req.method, "");
    }

    #[test]
    fn parse_invalid_json() {
        let err = parse_request("not json").unwrap_err();
        assert_eq!(err.code(), -32603);
        assert!(matches!(err, McpError::ParseFailure { .. }));
    }

    #[test]
    fn parse_non_object() {
        let err = parse_request("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn param_lookup() {
        let req = Request::new(None, "resources/read", Some(json!({"uri": "doc://a", "n": null})));
        assert_eq!(req.param_str("uri"), Some("doc://a"));
        assert!(req.param("n").is_none());
        assert!(req.param("missing").is_none());
    }

    #[test]
    fn param_text_names_any_value() {
        let req = Request::new(None, "tools/call", Some(json!({"name": 5, "uri": "doc://a"})));
        assert_eq!(req.param_text("name"), "5");
        assert_eq!(req.param_text("uri"), "doc://a");
        assert_eq!(req.param_text("missing"), "null");

        let req = Request::new(None, "tools/call", Some(json!([1])));
        assert_eq!(req.param_text("name"), "null");
    }

    #[test]
    fn serialise_success_response() {
        let response = Response::success(Some(json!(1)), json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""jsonrpc":"2.0""#));
        assert!(json.contains(r#""id":1"#));
        assert!(json.contains(r#""result":{"ok":true}"#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn serialise_error_response() {
        let error = McpError::UnknownMethod {
            method: "unknown/method".to_string(),
        };
        let response = Response::failure(Some(json!("abc")), &error);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], json!("abc"));
        assert_eq!(value["error"]["code"], json!(-32601));
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("unknown/method"));
        assert!(value.get("result").is_none());
    }

    #[test]
    fn parse_failure_response_has_no_id() {
        let error = McpError::ParseFailure {
            message: "bad".to_string(),
        };
        let value = serde_json::to_value(Response::parse_failure(&error)).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["error"]["code"], json!(-32603));
        assert_eq!(value["error"]["message"], json!("bad"));
    }
}

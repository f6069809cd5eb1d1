//! Tool invocation adapter.
//!
//! A [`ToolHandler`] pairs a function with an ordered list of declared
//! parameters. Calling a tool binds the caller's `arguments` object to those
//! parameters by name and runs the function, turning every failure (a binding
//! error, an `Err` return, or a panic) into [`ToolError::ExecutionFailed`].
//!
//! # Binding contract
//!
//! - Declared parameters are looked up by name. A missing parameter takes its
//!   default if it has one; otherwise binding fails.
//! - Keys the handler did not declare are passed through untouched and are
//!   reachable via [`Arguments::extra`]. This permissive mode is the default.
//!   [`BindMode::Strict`] rejects undeclared keys instead.
//! - Binding is not validated ahead of the call: binding errors and runtime
//!   errors share the `ExecutionFailed` channel.

use std::panic::{catch_unwind, AssertUnwindSafe};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::ToolError;

/// A declared handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    default: Option<Value>,
}

impl Param {
    /// A parameter the caller must supply.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// A parameter that falls back to `default` when omitted.
    #[must_use]
    pub fn optional(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            default: Some(default),
        }
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the caller must supply this parameter.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// How undeclared argument keys are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindMode {
    /// Undeclared keys are passed through.
    #[default]
    Permissive,
    /// Undeclared keys fail binding.
    Strict,
}

/// Arguments bound to a handler's declared parameters.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    declared: IndexMap<String, Value>,
    extra: Map<String, Value>,
}

impl Arguments {
    /// Returns an argument by name, declared or passed through.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.declared.get(name).or_else(|| self.extra.get(name))
    }

    /// Returns an argument, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an execution failure naming the missing argument.
    pub fn value(&self, name: &str) -> Result<&Value, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::failed(format!("missing argument: '{name}'")))
    }

    /// Returns a string argument.
    ///
    /// # Errors
    ///
    /// Returns an execution failure if the argument is absent or not a string.
    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.value(name)?
            .as_str()
            .ok_or_else(|| ToolError::failed(format!("argument '{name}' must be a string")))
    }

    /// Returns a numeric argument as `f64`.
    ///
    /// # Errors
    ///
    /// Returns an execution failure if the argument is absent or not a number.
    pub fn f64(&self, name: &str) -> Result<f64, ToolError> {
        self.value(name)?
            .as_f64()
            .ok_or_else(|| ToolError::failed(format!("argument '{name}' must be a number")))
    }

    /// Declared arguments in declaration order.
    pub fn positional(&self) -> impl Iterator<Item = &Value> {
        self.declared.values()
    }

    /// Keys the handler did not declare.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Signature of a tool function.
pub type HandlerFn = dyn Fn(&Arguments) -> Result<Value, ToolError> + Send + Sync;

/// A tool function with its parameter-binding contract.
pub struct ToolHandler {
    params: Vec<Param>,
    mode: BindMode,
    func: Box<HandlerFn>,
}

impl std::fmt::Debug for ToolHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolHandler")
            .field("params", &self.params)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl ToolHandler {
    /// Creates a permissive handler with the given ordered parameters.
    pub fn new<F>(params: Vec<Param>, func: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        Self {
            params,
            mode: BindMode::Permissive,
            func: Box::new(func),
        }
    }

    /// Makes this handler reject undeclared argument keys.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.mode = BindMode::Strict;
        self
    }

    /// Declared parameters in order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Binds a caller-supplied `arguments` value to the declared parameters.
    ///
    /// `mode` is combined with the handler's own mode; either one being strict
    /// makes the binding strict.
    ///
    /// # Errors
    ///
    /// Returns an execution failure if `arguments` is not an object, a
    /// required parameter is missing, or (in strict mode) an undeclared key
    /// is present.
    pub fn bind(&self, arguments: &Value, mode: BindMode) -> Result<Arguments, ToolError> {
        let supplied = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => return Err(ToolError::failed("arguments must be an object")),
        };

        let strict = mode == BindMode::Strict || self.mode == BindMode::Strict;
        let mut remaining = supplied;
        let mut declared = IndexMap::with_capacity(self.params.len());
        let mut missing = Vec::new();

        for param in &self.params {
            match remaining.remove(&param.name) {
                Some(value) => {
                    declared.insert(param.name.clone(), value);
                }
                None => match &param.default {
                    Some(default) => {
                        declared.insert(param.name.clone(), default.clone());
                    }
                    None => missing.push(format!("'{}'", param.name)),
                },
            }
        }

        if !missing.is_empty() {
            return Err(ToolError::failed(format!(
                "missing {} required argument{}: {}",
                missing.len(),
                if missing.len() == 1 { "" } else { "s" },
                missing.join(", ")
            )));
        }

        if strict && !remaining.is_empty() {
            let unexpected: Vec<String> = remaining.keys().map(|k| format!("'{k}'")).collect();
            return Err(ToolError::failed(format!(
                "unexpected argument{}: {}",
                if unexpected.len() == 1 { "" } else { "s" },
                unexpected.join(", ")
            )));
        }

        Ok(Arguments {
            declared,
            extra: remaining,
        })
    }

    /// Binds `arguments` and runs the handler synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ExecutionFailed`] if binding fails, the handler
    /// returns an error, or the handler panics.
    pub fn invoke(&self, arguments: &Value, mode: BindMode) -> Result<Value, ToolError> {
        let bound = self.bind(arguments, mode)?;

        match catch_unwind(AssertUnwindSafe(|| (self.func)(&bound))) {
            Ok(result) => result,
            Err(payload) => Err(ToolError::failed(panic_message(payload.as_ref()))),
        }
    }
}

/// Extracts the message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "tool handler panicked".to_string())
}

/// Renders a handler's return value as tool result text.
///
/// Strings are used verbatim; everything else is compact JSON.
#[must_use]
pub fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! Named resources and tools exposed through the protocol.
//!
//! [`Registry`] is a cheap clonable handle: every clone sees the same
//! entries. External collaborators may register from another thread while
//! the transport loop runs. Entries are kept in registration order and a
//! re-registration under the same key replaces the old entry in place.
//!
//! Tool handlers are handed out as `Arc<Tool>` so no lock is held while a
//! handler runs; a handler may itself register entries.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::RegistryError;
use crate::mcp::adapter::ToolHandler;

/// Default MIME type for resources.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// A named, static piece of content exposed for read access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Unique, caller-assigned identifier.
    pub uri: String,
    /// Content type.
    pub mime_type: String,
    /// Text payload.
    pub text: String,
}

impl Resource {
    /// Display name: the final `/`-separated segment of the URI.
    #[must_use]
    pub fn name(&self) -> &str {
        resource_name(&self.uri)
    }
}

/// Derives a resource name from its URI.
#[must_use]
pub fn resource_name(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Listing entry for `resources/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    /// Resource URI.
    pub uri: String,
    /// Content type.
    pub mime_type: String,
    /// Name derived from the URI.
    pub name: String,
}

/// A named, invocable capability.
#[derive(Debug)]
pub struct Tool {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON-Schema-like description of accepted arguments.
    pub input_schema: Value,
    /// Bound function. Never leaves the process.
    pub handler: ToolHandler,
}

/// Listing entry for `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// The schema used when a tool is registered without one.
#[must_use]
pub fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

#[derive(Debug, Default)]
struct Entries {
    resources: IndexMap<String, Resource>,
    tools: IndexMap<String, Arc<Tool>>,
}

/// Shared registry of resources and tools.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Arc<RwLock<Entries>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        // Entries stay consistent even if a writer panicked mid-way: every
        // write is a single map insert.
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a resource, replacing any previous entry with the same URI.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyUri`] if `uri` is empty.
    pub fn register_resource(
        &self,
        uri: impl Into<String>,
        content: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let uri = uri.into();
        if uri.is_empty() {
            return Err(RegistryError::EmptyUri);
        }

        let resource = Resource {
            uri: uri.clone(),
            mime_type: mime_type.into(),
            text: content.into(),
        };
        tracing::debug!(uri = %uri, mime_type = %resource.mime_type, "Registered resource");
        self.write().resources.insert(uri, resource);
        Ok(())
    }

    /// Registers a [`DEFAULT_MIME_TYPE`] resource.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyUri`] if `uri` is empty.
    pub fn register_text(
        &self,
        uri: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.register_resource(uri, content, DEFAULT_MIME_TYPE)
    }

    /// Registers a tool, replacing any previous tool with the same name.
    ///
    /// A `None` schema defaults to [`empty_object_schema`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyToolName`] if `name` is empty.
    pub fn register_tool(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: ToolHandler,
        schema: Option<Value>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyToolName);
        }

        let tool = Tool {
            name: name.clone(),
            description: description.into(),
            input_schema: schema.unwrap_or_else(empty_object_schema),
            handler,
        };
        tracing::debug!(tool = %name, "Registered tool");
        self.write().tools.insert(name, Arc::new(tool));
        Ok(())
    }

    /// Lists resources in registration order.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceSummary> {
        self.read()
            .resources
            .values()
            .map(|r| ResourceSummary {
                uri: r.uri.clone(),
                mime_type: r.mime_type.clone(),
                name: r.name().to_string(),
            })
            .collect()
    }

    /// Returns a copy of the resource registered under `uri`.
    #[must_use]
    pub fn get_resource(&self, uri: &str) -> Option<Resource> {
        self.read().resources.get(uri).cloned()
    }

    /// Lists tools in registration order, without their handlers.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.read()
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.input_schema.clone(),
            })
            .collect()
    }

    /// Returns the tool registered under `name`.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<Arc<Tool>> {
        self.read().tools.get(name).cloned()
    }

    /// Number of registered resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.read().resources.len()
    }

    /// Number of registered tools.
    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.read().tools.len()
    }
}

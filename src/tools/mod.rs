//! Tool system
//!
//! Each tool takes typed, JSON-deserialisable parameters and returns a
//! [`ToolResult`]. Tools are registered by name in a [`ToolRegistry`] and run
//! against a [`ToolContext`] borrowing the browser session.

pub mod export;
pub mod inspect;
pub mod load;
pub mod utils;

pub use export::{ExportParams, ExportTool};
pub use inspect::{InspectParams, InspectTool};
pub use load::{LoadParams, LoadTool};

use crate::browser::{BrowserSession, TabSource};
use crate::error::{ExportError, Result};
use crate::storybook::StorybookExporter;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: serde_json::Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }

    /// Failure carrying structured details
    pub fn failure_with(error: impl Into<String>, data: serde_json::Value) -> Self {
        Self { success: false, data: Some(data), error: Some(error.into()) }
    }
}

/// State shared by tools during one execution
pub struct ToolContext<'a> {
    pub session: &'a BrowserSession,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session }
    }

    /// Read access to the session's source tab
    pub fn source(&self) -> Result<TabSource> {
        TabSource::new(self.session.tab())
    }
}

/// A named operation with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// JSON schema of [`Tool::Params`]
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;
}

/// Object-safe view of a [`Tool`], taking raw JSON parameters
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;

    fn parameters_schema(&self) -> serde_json::Value;

    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> serde_json::Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let typed = serde_json::from_value(params).map_err(|e| {
            ExportError::InvalidArgument(format!("Invalid parameters for '{}': {}", Tool::name(self), e))
        })?;
        self.execute_typed(typed, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the storybook tools using the default export settings
    pub fn with_defaults() -> Self {
        Self::with_exporter(StorybookExporter::default())
    }

    /// Registry with the storybook tools sharing `exporter`
    pub fn with_exporter(exporter: StorybookExporter) -> Self {
        let exporter = Arc::new(exporter);
        let mut registry = Self::new();
        registry.register(LoadTool);
        registry.register(InspectTool::new(exporter.clone()));
        registry.register(ExportTool::new(exporter));
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: DynTool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name with JSON parameters
    pub fn execute(&self, name: &str, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| ExportError::ToolNotFound(name.to_string()))?;
        log::debug!("Executing tool '{}'", name);
        tool.execute(params, context)
    }
}

use crate::error::{ExportError, Result};
use crate::storybook::{Inspection, StorybookExporter};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters for inspecting the source tab (no parameters needed)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InspectParams {}

/// Reports what an export of the source tab would contain, without exporting
pub struct InspectTool {
    exporter: Arc<StorybookExporter>,
}

impl InspectTool {
    pub fn new(exporter: Arc<StorybookExporter>) -> Self {
        Self { exporter }
    }
}

impl Tool for InspectTool {
    type Params = InspectParams;

    fn name(&self) -> &str {
        "inspect_storybook"
    }

    fn execute_typed(&self, _params: InspectParams, context: &mut ToolContext) -> Result<ToolResult> {
        let inspection = self.exporter.inspect(&context.source()?)?;
        let data = inspection_data(&inspection, context.session.tab().get_url())?;

        Ok(ToolResult::success_with(data))
    }
}

/// The inspection as JSON, tagged with the inspected page's URL
fn inspection_data(inspection: &Inspection, url: String) -> Result<serde_json::Value> {
    let mut data = serde_json::to_value(inspection).map_err(|e| ExportError::ToolExecutionFailed {
        tool: "inspect_storybook".to_string(),
        reason: e.to_string(),
    })?;
    data["url"] = serde_json::Value::String(url);
    Ok(data)
}

use crate::error::Result;
use crate::tools::utils::resolve_source;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for the load_storybook tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoadParams {
    /// URL or local file of the storybook page
    pub source: String,

    /// Milliseconds to wait after navigation for client-side rendering (default: 1000)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_settle_ms() -> u64 {
    1000
}

/// Tool for loading a storybook page into the source tab
#[derive(Default)]
pub struct LoadTool;

impl Tool for LoadTool {
    type Params = LoadParams;

    fn name(&self) -> &str {
        "load_storybook"
    }

    fn execute_typed(&self, params: LoadParams, context: &mut ToolContext) -> Result<ToolResult> {
        let url = resolve_source(&params.source);

        context.session.navigate(&url)?;
        context.session.wait_for_navigation()?;

        // Storybooks render their pages after the load event
        if params.settle_ms > 0 {
            std::thread::sleep(Duration::from_millis(params.settle_ms));
        }

        log::info!("Loaded storybook source {}", url);

        Ok(ToolResult::success_with(serde_json::json!({
            "source": params.source,
            "url": url,
            "settle_ms": params.settle_ms
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_params_default() {
        let json = serde_json::json!({ "source": "gemini.google.com/share/abc" });

        let params: LoadParams = serde_json::from_value(json).unwrap();
        assert_eq!(params.source, "gemini.google.com/share/abc");
        assert_eq!(params.settle_ms, 1000);
    }

    #[test]
    fn test_load_params_explicit_settle() {
        let json = serde_json::json!({ "source": "story.html", "settle_ms": 0 });

        let params: LoadParams = serde_json::from_value(json).unwrap();
        assert_eq!(params.settle_ms, 0);
    }

    #[test]
    fn test_load_params_require_source() {
        assert!(serde_json::from_value::<LoadParams>(serde_json::json!({})).is_err());
    }

    #[test]
    fn test_load_tool_metadata() {
        let tool = LoadTool;
        assert_eq!(tool.name(), "load_storybook");
        assert!(tool.parameters_schema().is_object());
    }
}

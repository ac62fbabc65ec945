use crate::error::{ExportError, Result};
use crate::storybook::{Assembly, OutputSurface, StorySource, StorybookExporter};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Parameters for the export_storybook tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExportParams {
    /// Write the generated HTML document to this file
    #[serde(default)]
    pub html_path: Option<String>,

    /// Print the generated document to this PDF file
    #[serde(default)]
    pub pdf_path: Option<String>,

    /// Keep the generated document open in a new tab (default: true)
    #[serde(default = "default_open_window")]
    pub open_window: bool,
}

fn default_open_window() -> bool {
    true
}

/// Summary returned by a successful export
#[derive(Debug, Clone, Serialize)]
struct ExportReport {
    title: String,
    discovered_pages: usize,
    content_pages: usize,
    skipped_pages: usize,
    used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pdf_path: Option<String>,
}

impl ExportReport {
    fn new(assembly: &Assembly) -> Self {
        Self {
            title: assembly.document.title.clone(),
            discovered_pages: assembly.discovered_pages,
            content_pages: assembly.document.content_sections().len(),
            skipped_pages: assembly.skipped_pages,
            used_fallback: assembly.used_fallback,
            output_url: None,
            html_path: None,
            pdf_path: None,
        }
    }
}

/// Tool that rebuilds the source tab's storybook as a print-ready document
pub struct ExportTool {
    exporter: Arc<StorybookExporter>,
}

impl ExportTool {
    pub fn new(exporter: Arc<StorybookExporter>) -> Self {
        Self { exporter }
    }

    fn refused(err: ExportError) -> Result<ToolResult> {
        match err {
            ExportError::InsufficientContent { found, minimum, message } => Ok(ToolResult::failure_with(
                message,
                serde_json::json!({ "found": found, "minimum": minimum }),
            )),
            other => Err(other),
        }
    }
}

impl ExportTool {
    /// Export from `source`, opening and printing through `surface` as `params` ask
    pub fn run<S: StorySource, O: OutputSurface>(&self, params: &ExportParams, source: &S, surface: &O) -> Result<ToolResult> {
        let (mut report, html) = if params.open_window || params.pdf_path.is_some() {
            let outcome = match self.exporter.export(source, surface) {
                Ok(outcome) => outcome,
                Err(err) => return Self::refused(err),
            };
            let mut report = ExportReport::new(&outcome.assembly);

            if let Some(pdf_path) = &params.pdf_path {
                let pdf = surface.print_to_pdf(&outcome.document)?;
                write_output(pdf_path, &pdf)?;
                log::info!("Wrote {} byte PDF to {}", pdf.len(), pdf_path);
                report.pdf_path = Some(pdf_path.clone());
            }

            if params.open_window {
                report.output_url = Some(surface.location(&outcome.document));
            } else if let Err(e) = surface.close(outcome.document) {
                log::debug!("Failed to close output document: {}", e);
            }

            (report, outcome.html)
        } else {
            // Nothing to show or print: assemble without opening anything
            let assembly = match self.exporter.assemble(source) {
                Ok(assembly) => assembly,
                Err(err) => return Self::refused(err),
            };
            let html = self.exporter.render(&assembly.document)?;
            (ExportReport::new(&assembly), html)
        };

        if let Some(html_path) = &params.html_path {
            write_output(html_path, html.as_bytes())?;
            log::info!("Wrote HTML to {}", html_path);
            report.html_path = Some(html_path.clone());
        }

        let data = serde_json::to_value(&report).map_err(|e| ExportError::ToolExecutionFailed {
            tool: "export_storybook".to_string(),
            reason: e.to_string(),
        })?;
        Ok(ToolResult::success_with(data))
    }
}

impl Tool for ExportTool {
    type Params = ExportParams;

    fn name(&self) -> &str {
        "export_storybook"
    }

    fn execute_typed(&self, params: ExportParams, context: &mut ToolContext) -> Result<ToolResult> {
        let source = context.source()?;
        self.run(&params, &source, context.session)
    }
}

fn write_output(path: &str, bytes: &[u8]) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

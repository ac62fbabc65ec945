use crate::{browser::config::{ConnectionOptions, DEFAULT_IDLE_TIMEOUT, LaunchOptions},
            error::{ExportError, Result},
            storybook::OutputSurface,
            tools::{ToolContext, ToolRegistry, ToolResult}};
use headless_chrome::{Browser, Tab, types::PrintToPdfOptions};
use std::{ffi::OsStr, sync::Arc};

/// Page setup used when printing the output document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfOptions {
    pub landscape: bool,
    pub print_background: bool,

    /// Honour the document's `@page` size instead of the printer default
    pub prefer_css_page_size: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self { landscape: true, print_background: true, prefer_css_page_size: true }
    }
}

impl From<PdfOptions> for PrintToPdfOptions {
    fn from(options: PdfOptions) -> Self {
        PrintToPdfOptions {
            landscape: Some(options.landscape),
            print_background: Some(options.print_background),
            prefer_css_page_size: Some(options.prefer_css_page_size),
            ..Default::default()
        }
    }
}

/// Browser session holding the tab the storybook is read from
pub struct BrowserSession {
    browser: Browser,

    /// Tab showing the storybook to export
    source: Arc<Tab>,

    tool_registry: ToolRegistry,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Storybook pages can take a while to generate; keep the browser alive past the 30s default
        launch_opts.idle_browser_timeout = DEFAULT_IDLE_TIMEOUT;

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.path = options.chrome_path;
        launch_opts.user_data_dir = options.user_data_dir;
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| ExportError::LaunchFailed(e.to_string()))?;

        let source = browser
            .new_tab()
            .map_err(|e| ExportError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, source, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Connect to a running browser; the focused tab becomes the source tab
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, options.idle_timeout)
            .map_err(|e| ExportError::ConnectionFailed(e.to_string()))?;
        let source = Self::find_active_tab(&browser)?;

        Ok(Self { browser, source, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    /// The source tab
    pub fn tab(&self) -> Arc<Tab> {
        self.source.clone()
    }

    /// Use another tab as the source tab
    pub fn set_source_tab(&mut self, tab: Arc<Tab>) {
        self.source = tab;
    }

    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Find the tab the user is looking at, by document visibility and focus
    fn find_active_tab(browser: &Browser) -> Result<Arc<Tab>> {
        let tabs = browser
            .get_tabs()
            .lock()
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        // Visible and focused is the strongest signal, visible alone the fallback
        for check in ["document.visibilityState === 'visible' && document.hasFocus()", "document.visibilityState === 'visible'"] {
            for tab in &tabs {
                match tab.evaluate(check, false) {
                    Ok(remote_object) => {
                        if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                            return Ok(tab.clone());
                        }
                    }
                    Err(e) => {
                        log::debug!("Failed to check tab status: {}", e);
                    }
                }
            }
        }

        Err(ExportError::TabOperationFailed("No active tab found".to_string()))
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate the source tab to a URL
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.source
            .navigate_to(url)
            .map_err(|e| ExportError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for the source tab's navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.source
            .wait_until_navigated()
            .map_err(|e| ExportError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Open a new tab and write `html` into it as its whole document
    pub fn open_document(&self, html: &str) -> Result<Arc<Tab>> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to create tab: {}", e)))?;

        let markup = serde_json::to_string(html).map_err(|e| ExportError::EvaluationFailed(e.to_string()))?;
        let write_js = format!(
            r#"
            (function() {{
                document.open();
                document.write({});
                document.close();
                return document.title;
            }})()
        "#,
            markup
        );

        tab.evaluate(&write_js, false)
            .map_err(|e| ExportError::EvaluationFailed(format!("Failed to write output document: {}", e)))?;

        tab.activate()
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to activate tab: {}", e)))?;

        Ok(tab)
    }

    /// Show `message` as an alert in `tab` without blocking the caller
    pub fn show_alert(&self, tab: &Arc<Tab>, message: &str) -> Result<()> {
        let text = serde_json::to_string(message).map_err(|e| ExportError::EvaluationFailed(e.to_string()))?;
        // Deferred so evaluation returns before the dialog blocks the page
        let alert_js = format!("setTimeout(function() {{ alert({}); }}, 0); true", text);

        tab.evaluate(&alert_js, false).map_err(|e| ExportError::EvaluationFailed(e.to_string()))?;

        Ok(())
    }

    /// Print a tab to PDF bytes
    pub fn print_to_pdf(&self, tab: &Arc<Tab>, options: PdfOptions) -> Result<Vec<u8>> {
        tab.print_to_pdf(Some(options.into())).map_err(|e| ExportError::PdfFailed(e.to_string()))
    }

    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    pub fn tool_registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tool_registry
    }

    /// Replace the tool registry, e.g. with one built for a custom export config
    pub fn set_tool_registry(&mut self, registry: ToolRegistry) {
        self.tool_registry = registry;
    }

    /// Execute a tool by name
    pub fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<ToolResult> {
        let mut context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &mut context)
    }

    /// Close every tab; the browser process exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        for tab in self.get_tabs()? {
            if let Err(e) = tab.close(false) {
                log::debug!("Failed to close tab {}: {}", tab.get_url(), e);
            }
        }
        Ok(())
    }
}

/// Alerts go to the source tab; documents open in new tabs
impl OutputSurface for BrowserSession {
    type Document = Arc<Tab>;

    fn alert(&self, message: &str) -> Result<()> {
        self.show_alert(&self.source, message)
    }

    fn open(&self, html: &str) -> Result<Arc<Tab>> {
        self.open_document(html)
    }

    fn print_to_pdf(&self, document: &Arc<Tab>) -> Result<Vec<u8>> {
        BrowserSession::print_to_pdf(self, document, PdfOptions::default())
    }

    fn location(&self, document: &Arc<Tab>) -> String {
        document.get_url()
    }

    fn close(&self, document: Arc<Tab>) -> Result<()> {
        document
            .close(false)
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to close tab: {}", e)))?;
        Ok(())
    }
}

//! storybook-export CLI
//!
//! Loads a storybook page (URL or saved HTML file) in Chrome/Chromium and
//! rebuilds it as a print-ready document, optionally saved as HTML or PDF.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use storybook_export::{
    BrowserSession, ConnectionOptions, CoverLayout, ExportConfig, LaunchOptions, StorybookExporter, ToolRegistry,
    ToolResult, ValidityPolicy,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Overlay,
    Stacked,
}

impl From<LayoutArg> for CoverLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Overlay => CoverLayout::Overlay,
            LayoutArg::Stacked => CoverLayout::Stacked,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "storybook-export", version, about = "Export a generated storybook page as a print-ready document")]
struct Cli {
    /// Storybook URL or saved HTML file; omit with --connect to export the focused tab as is
    source: Option<String>,

    /// Launch the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Connect to a running browser via its DevTools WebSocket URL instead of launching one
    #[arg(long, value_name = "WS_URL")]
    connect: Option<String>,

    /// Chrome/Chromium binary to launch
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,

    /// Browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// JSON export config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the generated HTML document to FILE
    #[arg(long, value_name = "FILE")]
    html: Option<String>,

    /// Print the generated document to a PDF FILE
    #[arg(long, value_name = "FILE")]
    pdf: Option<String>,

    /// Only report what would be exported
    #[arg(long)]
    inspect: bool,

    /// Keep pages that have only an image or only text
    #[arg(long)]
    lenient: bool,

    /// Don't enlarge the first letter of the first page
    #[arg(long)]
    no_drop_cap: bool,

    #[arg(long, value_enum)]
    cover_layout: Option<LayoutArg>,

    /// Refuse storybooks with fewer pages than this
    #[arg(long, value_name = "N", conflicts_with = "no_guard")]
    min_pages: Option<usize>,

    /// Export however few pages are found
    #[arg(long)]
    no_guard: bool,

    /// Milliseconds to let the page render after loading
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,
}

impl Cli {
    fn export_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_file(path).with_context(|| format!("Loading {}", path.display()))?,
            None => ExportConfig::default(),
        };

        if self.lenient {
            config = config.validity(ValidityPolicy::RequireAny);
        }
        if self.no_drop_cap {
            config = config.drop_cap(false);
        }
        if let Some(layout) = self.cover_layout {
            config = config.cover_layout(layout.into());
        }
        if self.no_guard {
            config = config.min_pages(None);
        } else if let Some(min_pages) = self.min_pages {
            config = config.min_pages(Some(min_pages));
        }
        // A headless browser has nobody to read the alert
        if self.connect.is_none() && !self.headed {
            config = config.show_alert(false);
        }

        Ok(config)
    }

    fn session(&self) -> Result<BrowserSession> {
        if let Some(ws_url) = &self.connect {
            return BrowserSession::connect(ConnectionOptions::new(ws_url.clone())).context("Connecting to browser");
        }

        let mut options = LaunchOptions::new().headless(!self.headed);
        if let Some(path) = &self.chrome {
            options = options.chrome_path(path.clone());
        }
        if let Some(dir) = &self.user_data_dir {
            options = options.user_data_dir(dir.clone());
        }
        BrowserSession::launch(options).context("Launching browser")
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("storybook_export=info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(result) if result.success => ExitCode::SUCCESS,
        Ok(result) => {
            eprintln!("{}", result.error.unwrap_or_else(|| "Export failed".to_string()));
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ToolResult> {
    if cli.source.is_none() && cli.connect.is_none() {
        anyhow::bail!("A SOURCE is required unless --connect is given");
    }

    let exporter = StorybookExporter::new(cli.export_config()?)?;
    let mut session = cli.session()?;
    session.set_tool_registry(ToolRegistry::with_exporter(exporter));

    if let Some(source) = &cli.source {
        let loaded = session.execute_tool("load_storybook", json!({ "source": source, "settle_ms": cli.settle_ms }))?;
        if !loaded.success {
            return Ok(loaded);
        }
    }

    let result = if cli.inspect {
        session.execute_tool("inspect_storybook", json!({}))?
    } else {
        // Nobody sees a tab in a headless browser; keep it only when headed or connected
        let open_window = cli.headed || cli.connect.is_some();
        session.execute_tool(
            "export_storybook",
            json!({ "html_path": cli.html, "pdf_path": cli.pdf, "open_window": open_window }),
        )?
    };

    if let Some(data) = &result.data {
        println!("{}", serde_json::to_string_pretty(data)?);
    }

    Ok(result)
}

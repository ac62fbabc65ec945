//! # storybook-export
//!
//! Turns a generated storybook page (an illustrated, multi-page story rendered as
//! HTML) into a print-ready document, driving Chrome/Chromium over the Chrome
//! DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Export**: read the cover title, cover image and each page's image and paragraph,
//!   then write a cover page plus one landscape page per story page into a new tab
//! - **PDF**: print the generated document with the browser's own PDF engine
//! - **Selector fallback**: a second page selector for storybooks laid out as spreads
//! - **Browser-native queries**: live pages are read through `querySelector` in the page itself
//! - **Offline testing**: the exporter reads any [`StorySource`] and writes to any
//!   [`OutputSurface`], including in-memory DOM trees
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use storybook_export::{BrowserSession, LaunchOptions};
//! use serde_json::json;
//!
//! # fn main() -> storybook_export::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//!
//! session.execute_tool("load_storybook", json!({"source": "https://example.com/story"}))?;
//! let result = session.execute_tool("export_storybook", json!({"pdf_path": "story.pdf"}))?;
//!
//! if !result.success {
//!     eprintln!("{}", result.error.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Exporting without a browser
//!
//! ```rust
//! use storybook_export::{DomTree, ElementNode, ExportConfig, StorybookExporter};
//!
//! # fn main() -> storybook_export::Result<()> {
//! let tree = DomTree::new(
//!     ElementNode::new("html").with_child(
//!         ElementNode::new("h1").with_class("cover-title").with_child(ElementNode::text("Space Tale")),
//!     ),
//! );
//!
//! let exporter = StorybookExporter::new(ExportConfig::new().min_pages(None))?;
//! let assembly = exporter.assemble(&tree)?;
//! assert_eq!(assembly.document.title, "Space Tale");
//!
//! let html = exporter.render(&assembly.document)?;
//! assert!(html.contains("<h2>Space Tale</h2>"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser sessions, the live-tab story source, output tabs, alerts and PDF printing
//! - [`dom`]: In-memory DOM trees and the CSS selector engine used to query them
//! - [`storybook`]: Content extraction, document assembly and HTML rendering
//! - [`tools`]: Named tools (load, inspect, export) run against a session
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod dom;
pub mod error;
pub mod storybook;
pub mod tools;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions, PdfOptions, TabSource};
pub use dom::{DomTree, ElementNode, Selector};
pub use error::{ExportError, Result};
pub use storybook::{
    CoverLayout, ExportConfig, OutputSurface, PageContent, Section, StorySource, StorybookDocument,
    StorybookExporter, ValidityPolicy,
};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

//! Storybook export
//!
//! Reads a storybook's cover and pages from a [`StorySource`] and rebuilds them
//! as a [`StorybookDocument`]: a cover followed by one landscape page per story
//! page, rendered to print-ready HTML and opened on an [`OutputSurface`].

pub mod config;
pub mod content;
pub mod document;
pub mod exporter;
pub mod render;
pub mod source;
pub mod surface;

pub use config::{DEFAULT_FALLBACK_THRESHOLD, DEFAULT_MIN_PAGES, ExportConfig, SelectorProfile};
pub use content::{PageContent, ValidityPolicy};
pub use document::{Section, StorybookDocument};
pub use exporter::{Assembly, ExportOutcome, Inspection, PageDiscovery, StorybookExporter};
pub use render::{CoverLayout, Stylesheet, render_html};
pub use source::StorySource;
pub use surface::OutputSurface;

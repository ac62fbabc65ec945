use crate::error::{ExportError, Result};
use crate::storybook::content::ValidityPolicy;
use crate::storybook::render::CoverLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Below this many primary page matches the fallback page selector is used instead
pub const DEFAULT_FALLBACK_THRESHOLD: usize = 10;

/// Exports with fewer discovered pages are refused
pub const DEFAULT_MIN_PAGES: usize = 4;

pub const DEFAULT_TITLE: &str = "Untitled";

/// Where users can find a storybook the exporter understands
pub const DEFAULT_EXAMPLE_URL: &str = "https://gemini.google.com/gem/storybook";

/// CSS selectors locating each piece of a storybook page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorProfile {
    /// Element whose text is the storybook title
    pub cover_title: String,

    /// First image on the cover
    pub cover_image: String,

    /// Content pages, excluding the cover
    pub primary_pages: String,

    /// Content pages for storybooks where the primary selector misfires
    pub fallback_pages: String,

    /// Image inside a content page
    pub page_image: String,

    /// Paragraph inside a content page
    pub page_text: String,
}

impl Default for SelectorProfile {
    fn default() -> Self {
        Self {
            cover_title: ".cover-title".to_string(),
            cover_image: "storybook-cover-page-content img".to_string(),
            primary_pages: r#".page:not([class*="cover"])"#.to_string(),
            fallback_pages: ".storybook .spread-container".to_string(),
            page_image: "div.main img".to_string(),
            page_text: "div.main p".to_string(),
        }
    }
}

/// Settings for a storybook export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub selectors: SelectorProfile,

    /// Primary page matches needed before the fallback selector is skipped
    pub fallback_threshold: usize,

    /// Minimum discovered pages; `None` disables the guard
    pub min_pages: Option<usize>,

    /// Which pages count as renderable
    pub validity: ValidityPolicy,

    /// Mark the first content page for an enlarged first letter
    pub drop_cap: bool,

    pub cover_layout: CoverLayout,

    /// Title used when the page has none
    pub default_title: String,

    /// Link shown to the user when a page is not a storybook
    pub example_url: String,

    /// Show an alert in the source tab when the export is refused
    pub show_alert: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            selectors: SelectorProfile::default(),
            fallback_threshold: DEFAULT_FALLBACK_THRESHOLD,
            min_pages: Some(DEFAULT_MIN_PAGES),
            validity: ValidityPolicy::default(),
            drop_cap: true,
            cover_layout: CoverLayout::default(),
            default_title: DEFAULT_TITLE.to_string(),
            example_url: DEFAULT_EXAMPLE_URL.to_string(),
            show_alert: true,
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).map_err(|e| ExportError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ExportError::Config(e.to_string()))
    }

    /// Builder method: set the page validity policy
    pub fn validity(mut self, validity: ValidityPolicy) -> Self {
        self.validity = validity;
        self
    }

    /// Builder method: set or disable the minimum page guard
    pub fn min_pages(mut self, min_pages: Option<usize>) -> Self {
        self.min_pages = min_pages;
        self
    }

    /// Builder method: set the fallback threshold
    pub fn fallback_threshold(mut self, threshold: usize) -> Self {
        self.fallback_threshold = threshold;
        self
    }

    /// Builder method: enable or disable drop-cap decoration
    pub fn drop_cap(mut self, enabled: bool) -> Self {
        self.drop_cap = enabled;
        self
    }

    /// Builder method: set the cover layout
    pub fn cover_layout(mut self, layout: CoverLayout) -> Self {
        self.cover_layout = layout;
        self
    }

    /// Builder method: enable or disable the refusal alert
    pub fn show_alert(mut self, enabled: bool) -> Self {
        self.show_alert = enabled;
        self
    }

    /// Builder method: replace the selector profile
    pub fn selectors(mut self, selectors: SelectorProfile) -> Self {
        self.selectors = selectors;
        self
    }

    /// The fixed message shown when too few pages were found
    pub fn insufficient_content_message(&self, found: usize, minimum: usize) -> String {
        format!(
            "Only {} story page(s) found, at least {} are needed. \
             This export only works on generated storybooks, for example: {}",
            found, minimum, self.example_url
        )
    }
}

use crate::dom::Selector;
use crate::error::{ExportError, Result};
use crate::storybook::config::ExportConfig;
use crate::storybook::content::PageContent;
use crate::storybook::document::StorybookDocument;
use crate::storybook::render::render_html;
use crate::storybook::source::StorySource;
use crate::storybook::surface::OutputSurface;
use serde::Serialize;

/// Compiled form of a [`crate::storybook::SelectorProfile`]
#[derive(Debug, Clone)]
struct Selectors {
    cover_title: Selector,
    cover_image: Selector,
    primary_pages: Selector,
    fallback_pages: Selector,
    page_image: Selector,
    page_text: Selector,
}

/// Page nodes found in a source document
#[derive(Debug)]
pub struct PageDiscovery<N> {
    pub pages: Vec<N>,

    /// How many nodes the primary selector matched
    pub primary_matches: usize,

    /// Whether `pages` came from the fallback selector
    pub used_fallback: bool,
}

/// An assembled document with the numbers behind it
#[derive(Debug, Clone, Serialize)]
pub struct Assembly {
    pub document: StorybookDocument,
    pub discovered_pages: usize,
    pub skipped_pages: usize,
    pub used_fallback: bool,
}

/// What an export would do, without doing it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub title: String,
    pub has_cover_image: bool,
    pub primary_matches: usize,
    pub used_fallback: bool,
    pub discovered_pages: usize,
    pub valid_pages: usize,
    pub would_abort: bool,
}

/// Result of an export that opened its document
#[derive(Debug)]
pub struct ExportOutcome<D> {
    pub assembly: Assembly,
    pub html: String,

    /// The opened output document
    pub document: D,
}

/// Rebuilds a storybook page as a print-ready document
#[derive(Debug, Clone)]
pub struct StorybookExporter {
    config: ExportConfig,
    selectors: Selectors,
}

impl StorybookExporter {
    /// Create an exporter, compiling the configured selectors
    pub fn new(config: ExportConfig) -> Result<Self> {
        let profile = &config.selectors;
        let selectors = Selectors {
            cover_title: Selector::parse(&profile.cover_title)?,
            cover_image: Selector::parse(&profile.cover_image)?,
            primary_pages: Selector::parse(&profile.primary_pages)?,
            fallback_pages: Selector::parse(&profile.fallback_pages)?,
            page_image: Selector::parse(&profile.page_image)?,
            page_text: Selector::parse(&profile.page_text)?,
        };
        Ok(Self { config, selectors })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Cover title text, or the default title when missing or empty
    pub fn extract_title<S: StorySource>(&self, source: &S) -> Result<String> {
        let title = match source.select_first(source.document(), &self.selectors.cover_title)? {
            Some(node) => source.text_of(node)?,
            None => String::new(),
        };
        if title.is_empty() {
            return Ok(self.config.default_title.clone());
        }
        Ok(title)
    }

    /// Source of the first cover image, if any
    pub fn extract_cover_image<S: StorySource>(&self, source: &S) -> Result<Option<String>> {
        let src = match source.select_first(source.document(), &self.selectors.cover_image)? {
            Some(node) => source.image_source_of(node)?,
            None => None,
        };
        Ok(src.filter(|src| !src.is_empty()))
    }

    /// Find content pages, switching to the fallback selector when the primary one finds too few
    pub fn discover_pages<'a, S: StorySource>(&self, source: &'a S) -> Result<PageDiscovery<S::Node<'a>>> {
        let root = source.document();
        let primary = source.select(root, &self.selectors.primary_pages)?;
        let primary_matches = primary.len();

        if primary_matches >= self.config.fallback_threshold {
            return Ok(PageDiscovery { pages: primary, primary_matches, used_fallback: false });
        }

        let pages = source.select(root, &self.selectors.fallback_pages)?;
        log::debug!(
            "Primary page selector matched {} (< {}), fallback '{}' matched {}",
            primary_matches,
            self.config.fallback_threshold,
            self.selectors.fallback_pages,
            pages.len()
        );
        Ok(PageDiscovery { pages, primary_matches, used_fallback: true })
    }

    /// Image and text of one page
    pub fn extract_page<'a, S: StorySource>(&self, source: &'a S, page: S::Node<'a>) -> Result<PageContent> {
        let image = match source.select_first(page, &self.selectors.page_image)? {
            Some(node) => source.image_source_of(node)?,
            None => None,
        };
        let text = match source.select_first(page, &self.selectors.page_text)? {
            Some(node) => Some(source.text_of(node)?),
            None => None,
        };
        Ok(PageContent::new(image, text))
    }

    /// Fail with [`ExportError::InsufficientContent`] when too few pages were discovered
    pub fn check_minimum(&self, discovered: usize) -> Result<()> {
        match self.config.min_pages {
            Some(minimum) if discovered < minimum => Err(ExportError::InsufficientContent {
                found: discovered,
                minimum,
                message: self.config.insufficient_content_message(discovered, minimum),
            }),
            _ => Ok(()),
        }
    }

    /// Build the output document from a source document
    pub fn assemble<S: StorySource>(&self, source: &S) -> Result<Assembly> {
        let title = self.extract_title(source)?;
        let discovery = self.discover_pages(source)?;
        self.check_minimum(discovery.pages.len())?;

        let mut document = StorybookDocument::new(title, self.extract_cover_image(source)?);
        let mut skipped_pages = 0;

        for (i, page) in discovery.pages.iter().enumerate() {
            let content = self.extract_page(source, *page)?;
            if self.config.validity.accepts(&content) {
                document.push_page(content);
            } else {
                log::debug!("Skipping page {}: {:?}", i + 1, content);
                skipped_pages += 1;
            }
        }

        if self.config.drop_cap {
            document.mark_drop_cap();
        }

        Ok(Assembly {
            document,
            discovered_pages: discovery.pages.len(),
            skipped_pages,
            used_fallback: discovery.used_fallback,
        })
    }

    /// Report what [`StorybookExporter::assemble`] would produce
    pub fn inspect<S: StorySource>(&self, source: &S) -> Result<Inspection> {
        let discovery = self.discover_pages(source)?;
        let mut valid_pages = 0;
        for page in &discovery.pages {
            if self.config.validity.accepts(&self.extract_page(source, *page)?) {
                valid_pages += 1;
            }
        }

        Ok(Inspection {
            title: self.extract_title(source)?,
            has_cover_image: self.extract_cover_image(source)?.is_some(),
            primary_matches: discovery.primary_matches,
            used_fallback: discovery.used_fallback,
            discovered_pages: discovery.pages.len(),
            valid_pages,
            would_abort: self.check_minimum(discovery.pages.len()).is_err(),
        })
    }

    pub fn render(&self, document: &StorybookDocument) -> Result<String> {
        render_html(document, self.config.cover_layout)
    }

    /// Export the storybook read from `source` into a new document on `surface`.
    ///
    /// When too few pages are found nothing is opened; the refusal is shown as an
    /// alert on the surface (if enabled) and returned as an error.
    pub fn export<S: StorySource, O: OutputSurface>(&self, source: &S, surface: &O) -> Result<ExportOutcome<O::Document>> {
        let assembly = match self.assemble(source) {
            Err(err) if err.is_insufficient_content() => {
                log::warn!("Export refused: {}", err);
                if self.config.show_alert {
                    if let Err(alert_err) = surface.alert(&err.to_string()) {
                        log::debug!("Failed to show alert: {}", alert_err);
                    }
                }
                return Err(err);
            }
            other => other?,
        };

        let html = self.render(&assembly.document)?;
        let document = surface.open(&html)?;

        log::info!(
            "Exported '{}': {} of {} pages{}",
            assembly.document.title,
            assembly.document.content_sections().len(),
            assembly.discovered_pages,
            if assembly.used_fallback { " (fallback selector)" } else { "" }
        );

        Ok(ExportOutcome { assembly, html, document })
    }
}

impl Default for StorybookExporter {
    fn default() -> Self {
        Self::new(ExportConfig::default()).expect("Default selectors must parse")
    }
}

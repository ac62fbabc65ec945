//! Print-ready HTML for a [`StorybookDocument`].

use crate::error::{ExportError, Result};
use crate::storybook::document::{Section, StorybookDocument};
use handlebars::Handlebars;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const TEMPLATE_NAME: &str = "storybook";

/// How the title sits on the cover page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverLayout {
    /// Title banner pulled up over the cover image
    #[default]
    Overlay,

    /// Title above the cover image
    Stacked,
}

/// Ordered CSS rules, keyed by selector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    rules: IndexMap<String, IndexMap<String, String>>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set declarations on a rule, creating it at the end if needed
    pub fn rule(mut self, selector: &str, declarations: &[(&str, &str)]) -> Self {
        let rule = self.rules.entry(selector.to_string()).or_default();
        for (property, value) in declarations {
            rule.insert(property.to_string(), value.to_string());
        }
        self
    }

    pub fn declaration(&self, selector: &str, property: &str) -> Option<&str> {
        self.rules.get(selector)?.get(property).map(String::as_str)
    }

    pub fn to_css(&self) -> String {
        let mut css = String::new();
        for (selector, declarations) in &self.rules {
            let _ = writeln!(css, "{} {{", selector);
            for (property, value) in declarations {
                let _ = writeln!(css, "  {}: {};", property, value);
            }
            css.push_str("}\n");
        }
        css
    }

    /// The landscape page layout, with the cover styled for `layout`
    pub fn storybook(layout: CoverLayout) -> Self {
        let sheet = Stylesheet::new()
            .rule("@page", &[("size", "A4 landscape"), ("margin", "0")])
            .rule(
                ".page-container",
                &[
                    ("display", "flex"),
                    ("border-radius", "20px"),
                    ("width", "29.7cm"),
                    ("height", "21cm"),
                    ("margin", "auto"),
                    ("border", "1px solid black"),
                    ("box-sizing", "border-box"),
                    ("overflow", "hidden"),
                    ("break-after", "page"),
                ],
            )
            .rule(
                ".page-container img",
                &[
                    ("margin", "auto"),
                    ("display", "block"),
                    ("height", "100%"),
                    ("border-radius", "20px 0px 0px 20px"),
                    ("padding", "0px"),
                ],
            )
            .rule(
                ".page-container p",
                &[
                    ("margin", "auto"),
                    ("max-width", "80%"),
                    ("display", "block"),
                    ("padding", "80px"),
                    ("border-radius", "0 20px 20px 0"),
                    ("font", "22pt serif"),
                ],
            )
            .rule(
                ".page-container.drop-case p:first-letter",
                &[
                    ("float", "inline-start"),
                    ("font-size", "3.75rem"),
                    ("line-height", "3.75rem"),
                    ("margin-inline-end", "12px"),
                    ("margin-block-start", "3px"),
                ],
            )
            .rule(".cover-container", &[("display", "block"), ("overflow", "hidden")]);

        match layout {
            CoverLayout::Overlay => sheet
                .rule(
                    ".cover-container h2",
                    &[
                        ("display", "block"),
                        ("position", "relative"),
                        ("margin", "auto"),
                        ("text-align", "center"),
                        ("transform", "translate(0, -1000px)"),
                        ("font-size", "50px"),
                        ("background-color", "wheat"),
                        ("padding", "20px"),
                        ("width", "100%"),
                    ],
                )
                .rule(
                    ".cover-container img",
                    &[
                        ("margin", "auto"),
                        ("display", "block"),
                        ("text-align", "center"),
                        ("width", "100%"),
                        ("height", "unset"),
                        ("position", "relative"),
                        ("top", "-200px"),
                        ("border-radius", "0"),
                    ],
                ),
            CoverLayout::Stacked => sheet
                .rule(
                    ".cover-container h2",
                    &[
                        ("display", "block"),
                        ("margin", "0"),
                        ("text-align", "center"),
                        ("font-size", "50px"),
                        ("background-color", "wheat"),
                        ("padding", "20px"),
                    ],
                )
                .rule(
                    ".cover-container img",
                    &[
                        ("margin", "auto"),
                        ("display", "block"),
                        ("width", "100%"),
                        ("height", "unset"),
                        ("border-radius", "0"),
                    ],
                ),
        }
    }
}

/// Template data for one section
#[derive(Serialize)]
struct SectionView<'a> {
    cover: bool,
    title: Option<&'a str>,
    image_source: Option<&'a str>,
    text: Option<&'a str>,
    drop_cap: bool,
}

impl<'a> From<&'a Section> for SectionView<'a> {
    fn from(section: &'a Section) -> Self {
        match section {
            Section::Cover { title, image_source } => Self {
                cover: true,
                title: Some(title),
                image_source: image_source.as_deref(),
                text: None,
                drop_cap: false,
            },
            Section::Content { image_source, text, drop_cap } => Self {
                cover: false,
                title: None,
                image_source: image_source.as_deref(),
                text: text.as_deref(),
                drop_cap: *drop_cap,
            },
        }
    }
}

#[derive(Serialize)]
struct DocumentView<'a> {
    title: &'a str,
    css: String,
    stacked: bool,
    sections: Vec<SectionView<'a>>,
}

/// Render a complete standalone HTML document; text and URLs are HTML-escaped by the template engine
pub fn render_html(document: &StorybookDocument, layout: CoverLayout) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string(TEMPLATE_NAME, include_str!("storybook.hbs"))
        .map_err(|e| ExportError::RenderFailed(e.to_string()))?;

    let view = DocumentView {
        title: &document.title,
        css: Stylesheet::storybook(layout).to_css(),
        stacked: layout == CoverLayout::Stacked,
        sections: document.sections().iter().map(SectionView::from).collect(),
    };

    handlebars
        .render(TEMPLATE_NAME, &view)
        .map_err(|e| ExportError::RenderFailed(e.to_string()))
}

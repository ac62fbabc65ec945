use crate::storybook::content::PageContent;
use serde::{Deserialize, Serialize};

/// One printed page of the output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Cover {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        image_source: Option<String>,
    },
    Content {
        #[serde(skip_serializing_if = "Option::is_none")]
        image_source: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// Render the paragraph with an enlarged first letter
        #[serde(default)]
        drop_cap: bool,
    },
}

impl Section {
    pub fn content(page: PageContent) -> Self {
        Section::Content { image_source: page.image_source, text: page.text, drop_cap: false }
    }

    pub fn is_cover(&self) -> bool {
        matches!(self, Section::Cover { .. })
    }

    pub fn has_drop_cap(&self) -> bool {
        matches!(self, Section::Content { drop_cap: true, .. })
    }
}

/// A cover followed by the story's content pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorybookDocument {
    pub title: String,
    sections: Vec<Section>,
}

impl StorybookDocument {
    /// Start a document with its cover section
    pub fn new(title: impl Into<String>, cover_image: Option<String>) -> Self {
        let title = title.into();
        let cover = Section::Cover { title: title.clone(), image_source: cover_image };
        Self { title, sections: vec![cover] }
    }

    pub fn push_page(&mut self, page: PageContent) {
        self.sections.push(Section::content(page));
    }

    /// Mark the first content section for drop-cap rendering; returns whether one existed
    pub fn mark_drop_cap(&mut self) -> bool {
        match self.sections.iter_mut().find(|s| !s.is_cover()) {
            Some(Section::Content { drop_cap, .. }) => {
                *drop_cap = true;
                true
            }
            _ => false,
        }
    }

    /// All sections, cover first
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn cover(&self) -> &Section {
        &self.sections[0]
    }

    pub fn content_sections(&self) -> &[Section] {
        &self.sections[1..]
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false: a document has at least its cover
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_page(n: usize) -> PageContent {
        PageContent::new(Some(format!("https://example.com/{}.png", n)), Some(format!("Page {}", n)))
    }

    #[test]
    fn test_new_document_has_cover_only() {
        let doc = StorybookDocument::new("Space Tale", None);

        assert_eq!(doc.len(), 1);
        assert!(doc.cover().is_cover());
        assert!(doc.content_sections().is_empty());
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_mark_drop_cap_marks_first_content_only() {
        let mut doc = StorybookDocument::new("Space Tale", Some("cover.png".to_string()));
        doc.push_page(full_page(1));
        doc.push_page(full_page(2));

        assert!(doc.mark_drop_cap());
        let marked: Vec<bool> = doc.sections().iter().map(Section::has_drop_cap).collect();
        assert_eq!(marked, vec![false, true, false]);
    }

    #[test]
    fn test_mark_drop_cap_without_content() {
        let mut doc = StorybookDocument::new("Space Tale", None);
        assert!(!doc.mark_drop_cap());
    }

    #[test]
    fn test_section_serialization() {
        let section = Section::content(PageContent::new(None, Some("Hi".to_string())));
        let json = serde_json::to_value(&section).unwrap();

        assert_eq!(json, serde_json::json!({ "kind": "content", "text": "Hi", "drop_cap": false }));
    }
}

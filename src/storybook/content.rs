use serde::{Deserialize, Serialize};

/// Image and text read from one storybook page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Source URL of the page's first content image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_source: Option<String>,

    /// Text of the page's first content paragraph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PageContent {
    /// Build page content; empty strings count as absent
    pub fn new(image_source: Option<String>, text: Option<String>) -> Self {
        Self { image_source: non_empty(image_source), text: non_empty(text) }
    }

    pub fn is_empty(&self) -> bool {
        self.image_source.is_none() && self.text.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.image_source.is_some() && self.text.is_some()
    }
}

/// Decides which pages are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityPolicy {
    /// A page needs both an image and text
    #[default]
    RequireBoth,

    /// A page needs an image or text
    RequireAny,
}

impl ValidityPolicy {
    pub fn accepts(self, content: &PageContent) -> bool {
        match self {
            ValidityPolicy::RequireBoth => content.is_complete(),
            ValidityPolicy::RequireAny => !content.is_empty(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

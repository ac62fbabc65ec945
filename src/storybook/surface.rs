//! Where an exported storybook is shown.

use crate::error::Result;

/// The user-facing side of an export: alerts, and new documents to view or print
pub trait OutputSurface {
    /// A document opened by [`OutputSurface::open`]
    type Document;

    /// Tell the user why nothing was exported
    fn alert(&self, message: &str) -> Result<()>;

    /// Open a new browsing surface showing `html`
    fn open(&self, html: &str) -> Result<Self::Document>;

    fn print_to_pdf(&self, document: &Self::Document) -> Result<Vec<u8>>;

    /// Where the user can find `document`
    fn location(&self, document: &Self::Document) -> String;

    fn close(&self, document: Self::Document) -> Result<()>;
}

//! Read access to a storybook document.
//!
//! The exporter only ever needs to select descendants of a node and read the
//! text or image source of what it found, so that is all a source exposes.
//! Sources backed by a live page answer with the browser's own selector
//! engine; [`DomTree`] answers from memory.

use crate::dom::{DomTree, ElementNode, Selector};
use crate::error::Result;

/// A document the exporter can read storybook content from
pub trait StorySource {
    /// Handle to one element of the document
    type Node<'a>: Copy
    where
        Self: 'a;

    /// The document itself; the scope for document-wide queries
    fn document(&self) -> Self::Node<'_>;

    /// Descendants of `scope` matching `selector`, in document order.
    ///
    /// Matching follows `querySelectorAll`: ancestors of `scope` may satisfy
    /// the leading part of the selector.
    fn select<'a>(&'a self, scope: Self::Node<'a>, selector: &Selector) -> Result<Vec<Self::Node<'a>>>;

    /// Text content of a node and its descendants
    fn text_of<'a>(&'a self, node: Self::Node<'a>) -> Result<String>;

    /// Image URL carried by a node
    fn image_source_of<'a>(&'a self, node: Self::Node<'a>) -> Result<Option<String>>;

    fn select_first<'a>(&'a self, scope: Self::Node<'a>, selector: &Selector) -> Result<Option<Self::Node<'a>>> {
        Ok(self.select(scope, selector)?.into_iter().next())
    }
}

impl StorySource for DomTree {
    type Node<'a> = &'a ElementNode;

    fn document(&self) -> &ElementNode {
        &self.root
    }

    fn select<'a>(&'a self, scope: &'a ElementNode, selector: &Selector) -> Result<Vec<&'a ElementNode>> {
        Ok(self.query_selector_all_in(scope, selector))
    }

    fn text_of<'a>(&'a self, node: &'a ElementNode) -> Result<String> {
        Ok(node.text_content())
    }

    fn image_source_of<'a>(&'a self, node: &'a ElementNode) -> Result<Option<String>> {
        Ok(node.get_attribute("src").cloned())
    }

    fn select_first<'a>(&'a self, scope: &'a ElementNode, selector: &Selector) -> Result<Option<&'a ElementNode>> {
        Ok(self.query_selector_in(scope, selector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_tree_source() {
        let tree = DomTree::new(
            ElementNode::new("html").with_child(
                ElementNode::new("div")
                    .with_class("main")
                    .with_child(ElementNode::new("img").with_attribute("src", "https://example.com/1.png"))
                    .with_child(ElementNode::new("p").with_child(ElementNode::text("Hello"))),
            ),
        );
        let image = Selector::parse("div.main img").unwrap();
        let text = Selector::parse("div.main p").unwrap();

        let root = tree.document();
        let img = tree.select_first(root, &image).unwrap().unwrap();
        let p = tree.select_first(root, &text).unwrap().unwrap();

        assert_eq!(tree.image_source_of(img).unwrap().as_deref(), Some("https://example.com/1.png"));
        assert_eq!(tree.text_of(p).unwrap(), "Hello");
        assert_eq!(tree.image_source_of(p).unwrap(), None);
    }

    #[test]
    fn test_scoped_select_excludes_outside_nodes() {
        let tree = DomTree::new(
            ElementNode::new("html")
                .with_child(ElementNode::new("p").with_child(ElementNode::text("outside")))
                .with_child(
                    ElementNode::new("section").with_child(ElementNode::new("p").with_child(ElementNode::text("inside"))),
                ),
        );
        let section = tree.select_first(tree.document(), &Selector::parse("section").unwrap()).unwrap().unwrap();

        let paragraphs = tree.select(section, &Selector::parse("p").unwrap()).unwrap();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(tree.text_of(paragraphs[0]).unwrap(), "inside");
    }

    #[test]
    fn test_scoped_select_matches_through_ancestors() {
        let tree = DomTree::new(ElementNode::new("html").with_child(
            ElementNode::new("div").with_class("main").with_child(
                ElementNode::new("section")
                    .with_child(ElementNode::new("p").with_child(ElementNode::text("nested"))),
            ),
        ));
        let section = tree.select_first(tree.document(), &Selector::parse("section").unwrap()).unwrap().unwrap();

        let paragraph = tree.select_first(section, &Selector::parse("div.main p").unwrap()).unwrap().unwrap();
        assert_eq!(tree.text_of(paragraph).unwrap(), "nested");
    }
}

use crate::dom::element::ElementNode;
use crate::dom::selector::Selector;
use crate::error::{ExportError, Result};
use serde::Deserialize;

/// An in-memory document, built in code or loaded from JSON
#[derive(Debug, Clone, PartialEq)]
pub struct DomTree {
    /// Root element of the document (usually `html`)
    pub root: ElementNode,
}

impl DomTree {
    pub fn new(root: ElementNode) -> Self {
        Self { root }
    }

    /// Parse a tree previously produced by [`DomTree::to_json`].
    ///
    /// Nesting depth is unbounded; each element level costs two JSON levels.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();

        let root = ElementNode::deserialize(&mut deserializer)
            .and_then(|root| deserializer.end().map(|_| root))
            .map_err(|e| ExportError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e)))?;
        Ok(Self::new(root))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root)
            .map_err(|e| ExportError::DomParseFailed(format!("Failed to serialize DOM to JSON: {}", e)))
    }

    /// All elements in the document matching `selector`, root included
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<&ElementNode> {
        let mut found = Vec::new();
        if selector.matches(&self.root, &[]) {
            found.push(&self.root);
        }
        found.extend(selector.select_all(&self.root));
        found
    }

    /// First element in the document matching `selector`
    pub fn query_selector(&self, selector: &Selector) -> Option<&ElementNode> {
        if selector.matches(&self.root, &[]) {
            return Some(&self.root);
        }
        selector.select_first(&self.root)
    }

    /// Descendants of `scope` matching `selector`, with `scope`'s ancestors in this
    /// tree taking part in matching the way they do for `Element.querySelectorAll`
    pub fn query_selector_all_in<'a>(&'a self, scope: &'a ElementNode, selector: &Selector) -> Vec<&'a ElementNode> {
        if std::ptr::eq(scope, &self.root) {
            return self.query_selector_all(selector);
        }
        let ancestors = self.ancestors_of(scope).unwrap_or_default();
        selector.select_all_within(scope, &ancestors)
    }

    pub fn query_selector_in<'a>(&'a self, scope: &'a ElementNode, selector: &Selector) -> Option<&'a ElementNode> {
        if std::ptr::eq(scope, &self.root) {
            return self.query_selector(selector);
        }
        let ancestors = self.ancestors_of(scope).unwrap_or_default();
        selector.select_first_within(scope, &ancestors)
    }

    /// Ancestors of `node` from the root down to its parent, or `None` if `node` is not in this tree
    pub fn ancestors_of<'a>(&'a self, node: &ElementNode) -> Option<Vec<&'a ElementNode>> {
        let mut path = Vec::new();
        Self::find_path(&self.root, node, &mut path).then_some(path)
    }

    fn find_path<'a>(current: &'a ElementNode, target: &ElementNode, path: &mut Vec<&'a ElementNode>) -> bool {
        if std::ptr::eq(current, target) {
            return true;
        }
        path.push(current);
        for child in current.element_children() {
            if Self::find_path(child, target, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Count all nodes, text nodes included
    pub fn count_elements(&self) -> usize {
        Self::count_recursive(&self.root)
    }

    fn count_recursive(node: &ElementNode) -> usize {
        1 + node.children.iter().map(Self::count_recursive).sum::<usize>()
    }
}

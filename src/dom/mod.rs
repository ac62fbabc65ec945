//! In-memory DOM
//!
//! Documents that can be read without a browser:
//! - ElementNode: element and text nodes
//! - DomTree: a whole document, built in code or loaded from JSON
//! - Selector: CSS selectors evaluated against these trees

pub mod element;
pub mod selector;
pub mod tree;

pub use element::ElementNode;
pub use selector::Selector;
pub use tree::DomTree;

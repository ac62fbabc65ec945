//! A small CSS selector engine evaluated against in-memory documents.
//!
//! Supported syntax: type and universal selectors, `.class`, `#id`, attribute
//! selectors (`[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`),
//! `:not(<compound>)`, descendant and child (`>`) combinators, and comma
//! separated selector lists.

use crate::dom::element::ElementNode;
use crate::error::{ExportError, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    /// Compounds left to right; the combinator links a compound to the one before it
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Class(String),
    Id(String),
    Attribute { name: String, op: AttrOp, value: String },
    Not(Box<Compound>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttrOp {
    Exists,
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = Parser { source, chars: source.char_indices().peekable() };
        let alternatives = parser.selector_list()?;
        Ok(Self { source: source.trim().to_string(), alternatives })
    }

    /// The selector text as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `node` matches, given its ancestors ordered from outermost to parent
    pub fn matches(&self, node: &ElementNode, ancestors: &[&ElementNode]) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(complex.parts.len() - 1, node, ancestors))
    }

    /// All descendants of `scope` matching this selector, in document order.
    ///
    /// The scope itself is never returned but takes part in combinator matching.
    pub fn select_all<'a>(&self, scope: &'a ElementNode) -> Vec<&'a ElementNode> {
        self.select_all_within(scope, &[])
    }

    /// First descendant of `scope` matching this selector
    pub fn select_first<'a>(&self, scope: &'a ElementNode) -> Option<&'a ElementNode> {
        self.select_first_within(scope, &[])
    }

    /// Like [`Selector::select_all`] for a scope nested in a larger document.
    ///
    /// `ancestors` are the scope's ancestors from outermost to parent; as with
    /// `Element.querySelectorAll`, they may satisfy the leading compounds.
    pub fn select_all_within<'a>(&self, scope: &'a ElementNode, ancestors: &[&'a ElementNode]) -> Vec<&'a ElementNode> {
        let mut found = Vec::new();
        let mut chain = ancestors.to_vec();
        chain.push(scope);
        self.walk(scope, &mut chain, &mut found, usize::MAX);
        found
    }

    pub fn select_first_within<'a>(
        &self,
        scope: &'a ElementNode,
        ancestors: &[&'a ElementNode],
    ) -> Option<&'a ElementNode> {
        let mut found = Vec::new();
        let mut chain = ancestors.to_vec();
        chain.push(scope);
        self.walk(scope, &mut chain, &mut found, 1);
        found.into_iter().next()
    }

    fn walk<'a>(
        &self,
        parent: &'a ElementNode,
        ancestors: &mut Vec<&'a ElementNode>,
        found: &mut Vec<&'a ElementNode>,
        limit: usize,
    ) {
        for child in parent.element_children() {
            if found.len() >= limit {
                return;
            }
            if self.matches(child, ancestors) {
                found.push(child);
            }
            ancestors.push(child);
            self.walk(child, ancestors, found, limit);
            ancestors.pop();
        }
    }
}

impl FromStr for Selector {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Complex {
    fn matches_at(&self, idx: usize, node: &ElementNode, ancestors: &[&ElementNode]) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(node) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match combinator {
            Combinator::Child => match ancestors.split_last() {
                Some((parent, rest)) => self.matches_at(idx - 1, parent, rest),
                None => false,
            },
            Combinator::Descendant => {
                (0..ancestors.len()).rev().any(|i| self.matches_at(idx - 1, ancestors[i], &ancestors[..i]))
            }
        }
    }
}

impl Compound {
    fn matches(&self, node: &ElementNode) -> bool {
        if node.is_text_node() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !node.is_tag(tag) {
                return false;
            }
        }
        self.conditions.iter().all(|condition| condition.matches(node))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.conditions.is_empty()
    }
}

impl Condition {
    fn matches(&self, node: &ElementNode) -> bool {
        match self {
            Condition::Class(class) => node.has_class(class),
            Condition::Id(id) => node.id().is_some_and(|v| v == id),
            Condition::Not(inner) => !inner.matches(node),
            Condition::Attribute { name, op, value } => {
                let Some(actual) = node.get_attribute(name) else {
                    return false;
                };
                match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals => actual == value,
                    AttrOp::Includes => actual.split_whitespace().any(|w| w == value.as_str()),
                    // Empty operands never match for the substring family
                    AttrOp::Prefix => !value.is_empty() && actual.starts_with(value.as_str()),
                    AttrOp::Suffix => !value.is_empty() && actual.ends_with(value.as_str()),
                    AttrOp::Substring => !value.is_empty() && actual.contains(value.as_str()),
                }
            }
        }
    }
}

struct Parser<'s> {
    source: &'s str,
    chars: std::iter::Peekable<std::str::CharIndices<'s>>,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> ExportError {
        ExportError::InvalidSelector { selector: self.source.to_string(), reason: reason.into() }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn selector_list(&mut self) -> Result<Vec<Complex>> {
        let mut alternatives = vec![self.complex()?];
        while self.peek() == Some(',') {
            self.chars.next();
            alternatives.push(self.complex()?);
        }
        if let Some(c) = self.peek() {
            return Err(self.error(format!("unexpected '{}'", c)));
        }
        Ok(alternatives)
    }

    fn complex(&mut self) -> Result<Complex> {
        self.skip_whitespace();
        let mut parts = vec![(Combinator::Descendant, self.compound()?)];

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(')') => return Err(self.error("unbalanced ')'")),
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            };
            parts.push((combinator, self.compound()?));
        }

        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut universal = false;

        match self.peek() {
            Some('*') => {
                self.chars.next();
                universal = true;
            }
            Some(c) if is_ident_char(c) => compound.tag = Some(self.identifier()?.to_ascii_lowercase()),
            _ => {}
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.chars.next();
                    compound.conditions.push(Condition::Class(self.identifier()?));
                }
                Some('#') => {
                    self.chars.next();
                    compound.conditions.push(Condition::Id(self.identifier()?));
                }
                Some('[') => {
                    self.chars.next();
                    compound.conditions.push(self.attribute()?);
                }
                Some(':') => {
                    self.chars.next();
                    compound.conditions.push(self.pseudo()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Condition> {
        self.skip_whitespace();
        let name = self.identifier()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.chars.next().map(|(_, c)| c) {
            Some(']') => return Ok(Condition::Attribute { name, op: AttrOp::Exists, value: String::new() }),
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '^' | '$' | '*')) => {
                if self.chars.next().map(|(_, c)| c) != Some('=') {
                    return Err(self.error(format!("expected '=' after '{}'", c)));
                }
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(self.error("malformed attribute selector")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut value = String::new();
                loop {
                    match self.chars.next().map(|(_, c)| c) {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
                value
            }
            _ => self.identifier()?,
        };
        self.skip_whitespace();

        if self.chars.next().map(|(_, c)| c) != Some(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(Condition::Attribute { name, op, value })
    }

    fn pseudo(&mut self) -> Result<Condition> {
        let name = self.identifier()?.to_ascii_lowercase();
        if name != "not" {
            return Err(self.error(format!("unsupported pseudo-class ':{}'", name)));
        }
        if self.chars.next().map(|(_, c)| c) != Some('(') {
            return Err(self.error("expected '(' after ':not'"));
        }
        self.skip_whitespace();
        let inner = self.compound()?;
        self.skip_whitespace();
        if self.chars.next().map(|(_, c)| c) != Some(')') {
            return Err(self.error(":not() takes a single compound selector"));
        }
        Ok(Condition::Not(Box::new(inner)))
    }

    fn identifier(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if !is_ident_char(c) {
                break;
            }
            ident.push(c);
            self.chars.next();
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

use crate::dom::Selector;
use crate::error::{ExportError, Result};
use crate::storybook::StorySource;
use headless_chrome::Tab;
use std::sync::Arc;

/// Page global holding the nodes handed out so far; index 0 is the document
const REGISTRY: &str = "window.__storybookExportNodes";

/// Element of a live page, by its slot in the page-side node registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(usize);

/// A storybook read from a live tab.
///
/// Queries run in the page through `querySelectorAll`, so selector semantics,
/// shadow DOM boundaries and nesting depth are exactly what the browser gives.
/// Creating a source resets the registry, so handles from an older source on
/// the same tab (or from before a navigation) must not be reused.
pub struct TabSource {
    tab: Arc<Tab>,
}

impl TabSource {
    pub fn new(tab: Arc<Tab>) -> Result<Self> {
        let source = Self { tab };
        source.evaluate(&format!("{} = [document]; true", REGISTRY))?;
        Ok(source)
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    fn evaluate(&self, js: &str) -> Result<Option<serde_json::Value>> {
        let remote_object = self
            .tab
            .evaluate(js, false)
            .map_err(|e| ExportError::EvaluationFailed(format!("Failed to query page: {}", e)))?;
        Ok(remote_object.value)
    }

    fn evaluate_string(&self, js: &str) -> Result<String> {
        match self.evaluate(js)? {
            Some(serde_json::Value::String(s)) => Ok(s),
            other => Err(ExportError::EvaluationFailed(format!("Expected a string from page query, got {:?}", other))),
        }
    }

    /// Register the matches of `selector` under `scope`; `first_only` stops at one
    fn query(&self, scope: NodeHandle, selector: &Selector, first_only: bool) -> Result<Vec<NodeHandle>> {
        let selector_literal = serde_json::to_string(selector.as_str())
            .map_err(|e| ExportError::EvaluationFailed(e.to_string()))?;
        let js = format!(
            r#"
            (function() {{
                const nodes = {registry};
                const scope = nodes[{scope}];
                const found = {first_only}
                    ? [scope.querySelector({selector})].filter(Boolean)
                    : Array.from(scope.querySelectorAll({selector}));
                const start = nodes.length;
                nodes.push(...found);
                return JSON.stringify([start, found.length]);
            }})()
        "#,
            registry = REGISTRY,
            scope = scope.0,
            first_only = first_only,
            selector = selector_literal,
        );

        let (start, count): (usize, usize) = serde_json::from_str(&self.evaluate_string(&js)?)
            .map_err(|e| ExportError::EvaluationFailed(format!("Malformed query result: {}", e)))?;
        Ok((start..start + count).map(NodeHandle).collect())
    }
}

impl StorySource for TabSource {
    type Node<'a> = NodeHandle;

    fn document(&self) -> NodeHandle {
        NodeHandle(0)
    }

    fn select<'a>(&'a self, scope: NodeHandle, selector: &Selector) -> Result<Vec<NodeHandle>> {
        self.query(scope, selector, false)
    }

    fn text_of<'a>(&'a self, node: NodeHandle) -> Result<String> {
        self.evaluate_string(&format!("{}[{}].textContent || ''", REGISTRY, node.0))
    }

    fn image_source_of<'a>(&'a self, node: NodeHandle) -> Result<Option<String>> {
        // The `src` property, so relative sources come back resolved
        let js = format!("(function(node) {{ return typeof node.src === 'string' ? node.src : ''; }})({}[{}])", REGISTRY, node.0);
        let src = self.evaluate_string(&js)?;
        Ok(Some(src).filter(|s| !s.is_empty()))
    }

    fn select_first<'a>(&'a self, scope: NodeHandle, selector: &Selector) -> Result<Option<NodeHandle>> {
        Ok(self.query(scope, selector, true)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserSession, LaunchOptions};

    fn data_url(html: &str) -> String {
        format!("data:text/html,{}", urlencoding::encode(html))
    }

    fn load(html: &str) -> (BrowserSession, TabSource) {
        let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
        session.navigate(&data_url(html)).expect("Failed to navigate");
        session.wait_for_navigation().expect("Navigation timeout");
        let source = TabSource::new(session.tab()).expect("Failed to create source");
        (session, source)
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_tab_source_queries_page() {
        let (_session, source) =
            load("<div class=\"main\"><section><img src=\"a.png\"><p>Hello <em>there</em></p></section></div>");

        let section = source.select_first(source.document(), &Selector::parse("section").unwrap()).unwrap().unwrap();
        let p = source.select_first(section, &Selector::parse("div.main p").unwrap()).unwrap().unwrap();
        let img = source.select_first(section, &Selector::parse("div.main img").unwrap()).unwrap().unwrap();

        assert_eq!(source.text_of(p).unwrap(), "Hello there");
        assert!(source.image_source_of(img).unwrap().unwrap().ends_with("a.png"));
        assert_eq!(source.image_source_of(p).unwrap(), None);
        assert!(source.select(section, &Selector::parse("video").unwrap()).unwrap().is_empty());
    }

    #[test]
    #[ignore]
    fn test_tab_source_handles_deep_pages() {
        let html = format!("{}<h1 class=\"cover-title\">Deep Tale</h1>{}", "<div>".repeat(300), "</div>".repeat(300));
        let (_session, source) = load(&html);

        let title = source.select_first(source.document(), &Selector::parse(".cover-title").unwrap()).unwrap().unwrap();
        assert_eq!(source.text_of(title).unwrap(), "Deep Tale");
    }

    #[test]
    #[ignore]
    fn test_tab_source_does_not_pierce_shadow_roots() {
        let html = "<div class=\"page\"><x-frame></x-frame><p>Light</p></div>\
                    <script>document.querySelector('x-frame').attachShadow({mode: 'open'}).innerHTML = \
                    '<p>Shadow</p><div class=\"page\"></div>';</script>";
        let (_session, source) = load(html);

        let pages = source.select(source.document(), &Selector::parse(".page").unwrap()).unwrap();
        assert_eq!(pages.len(), 1);
        let p = source.select_first(pages[0], &Selector::parse("p").unwrap()).unwrap().unwrap();
        assert_eq!(source.text_of(p).unwrap(), "Light");
    }
}

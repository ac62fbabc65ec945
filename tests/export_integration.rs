use serde_json::{Value, json};
use std::cell::RefCell;
use std::sync::Arc;
use storybook_export::tools::{ExportParams, ExportTool};
use storybook_export::{
    BrowserSession, DomTree, ExportConfig, ExportError, LaunchOptions, OutputSurface, StorybookExporter,
    ToolRegistry, ValidityPolicy,
};

/// A storybook document in the JSON shape `DomTree::from_json` reads
fn storybook_tree(title: Option<&str>, pages: &[(Option<&str>, Option<&str>)], page_class: &str) -> DomTree {
    let mut cover_children = vec![json!({
        "tag_name": "storybook-cover-page-content",
        "children": [{ "tag_name": "img", "attributes": { "src": "https://example.com/cover.png" } }]
    })];
    if let Some(title) = title {
        cover_children.insert(
            0,
            json!({
                "tag_name": "div",
                "attributes": { "class": "cover-title" },
                "children": [{ "tag_name": "#text", "text_content": title }]
            }),
        );
    }

    let page_nodes: Vec<Value> = pages
        .iter()
        .map(|(image, text)| {
            let mut main = Vec::new();
            if let Some(src) = image {
                main.push(json!({ "tag_name": "img", "attributes": { "src": src } }));
            }
            if let Some(text) = text {
                main.push(json!({ "tag_name": "p", "children": [{ "tag_name": "#text", "text_content": text }] }));
            }
            json!({
                "tag_name": "div",
                "attributes": { "class": page_class },
                "children": [{ "tag_name": "div", "attributes": { "class": "main" }, "children": main }]
            })
        })
        .collect();

    let root = json!({
        "tag_name": "html",
        "children": [{
            "tag_name": "body",
            "children": [
                { "tag_name": "div", "attributes": { "class": "page cover" }, "children": cover_children },
                { "tag_name": "div", "attributes": { "class": "storybook" }, "children": page_nodes }
            ]
        }]
    });

    DomTree::from_json(&root.to_string()).expect("Failed to parse tree")
}

fn full_pages(n: usize) -> Vec<(Option<&'static str>, Option<&'static str>)> {
    (0..n).map(|_| (Some("https://example.com/page.png"), Some("Once upon a time"))).collect()
}

#[test]
fn test_space_tale_renders_cover_and_five_pages() {
    let exporter = StorybookExporter::default();
    let tree = storybook_tree(Some("Space Tale"), &full_pages(5), "spread-container");

    let assembly = exporter.assemble(&tree).expect("Export refused");
    assert!(assembly.used_fallback);
    assert_eq!(assembly.document.len(), 6);

    let html = exporter.render(&assembly.document).expect("Failed to render");
    assert!(html.contains("<title>Space Tale</title>"));
    assert_eq!(html.matches("<div class=\"page-container").count(), 5);
    assert_eq!(html.matches("<div class=\"page-container drop-case\">").count(), 1);
    assert_eq!(html.matches("<p>Once upon a time</p>").count(), 5);
}

#[test]
fn test_primary_pages_used_for_long_storybooks() {
    let exporter = StorybookExporter::default();
    let tree = storybook_tree(Some("Long Tale"), &full_pages(12), "page");

    let assembly = exporter.assemble(&tree).expect("Export refused");
    assert!(!assembly.used_fallback);
    assert_eq!(assembly.document.content_sections().len(), 12);
}

#[test]
fn test_missing_title_defaults() {
    let exporter = StorybookExporter::default();
    let tree = storybook_tree(None, &full_pages(4), "spread-container");

    let assembly = exporter.assemble(&tree).expect("Export refused");
    assert_eq!(assembly.document.title, "Untitled");
}

#[test]
fn test_two_pages_are_refused() {
    let exporter = StorybookExporter::default();
    let tree = storybook_tree(Some("Short"), &full_pages(2), "spread-container");

    let err = exporter.assemble(&tree).unwrap_err();
    assert!(matches!(err, ExportError::InsufficientContent { found: 2, minimum: 4, .. }));
    assert!(err.to_string().contains(&exporter.config().example_url));
}

#[test]
fn test_lenient_policy_keeps_partial_pages() {
    let pages = [
        (Some("https://example.com/1.png"), None),
        (None, Some("Text only")),
        (None, None),
        (Some("https://example.com/4.png"), Some("Both")),
    ];
    let tree = storybook_tree(Some("Partial"), &pages, "spread-container");

    let strict = StorybookExporter::default().assemble(&tree).expect("Export refused");
    assert_eq!(strict.document.content_sections().len(), 1);

    let lenient = StorybookExporter::new(ExportConfig::new().validity(ValidityPolicy::RequireAny))
        .expect("Invalid config")
        .assemble(&tree)
        .expect("Export refused");
    assert_eq!(lenient.document.content_sections().len(), 3);
    assert_eq!(lenient.skipped_pages, 1);
}

#[test]
fn test_config_file_drives_exporter() {
    let path = std::env::temp_dir().join("storybook-export-config-test.json");
    std::fs::write(&path, r#"{ "min_pages": 1, "fallback_threshold": 1, "default_title": "Nameless" }"#)
        .expect("Failed to write config");

    let config = ExportConfig::from_file(&path).expect("Failed to load config");
    std::fs::remove_file(&path).expect("Failed to remove config");

    let tree = storybook_tree(None, &full_pages(1), "page");
    let assembly = StorybookExporter::new(config).expect("Invalid config").assemble(&tree).expect("Export refused");

    assert!(!assembly.used_fallback);
    assert_eq!(assembly.document.title, "Nameless");
    assert_eq!(assembly.document.len(), 2);
}

/// Keeps opened documents and alerts in memory
#[derive(Default)]
struct MemorySurface {
    documents: RefCell<Vec<String>>,
    alerts: RefCell<Vec<String>>,
}

impl OutputSurface for MemorySurface {
    type Document = usize;

    fn alert(&self, message: &str) -> storybook_export::Result<()> {
        self.alerts.borrow_mut().push(message.to_string());
        Ok(())
    }

    fn open(&self, html: &str) -> storybook_export::Result<usize> {
        self.documents.borrow_mut().push(html.to_string());
        Ok(self.documents.borrow().len() - 1)
    }

    fn print_to_pdf(&self, _document: &usize) -> storybook_export::Result<Vec<u8>> {
        Ok(b"%PDF-1.4".to_vec())
    }

    fn location(&self, document: &usize) -> String {
        format!("memory://{}", document)
    }

    fn close(&self, _document: usize) -> storybook_export::Result<()> {
        Ok(())
    }
}

#[test]
fn test_export_tool_opens_document_on_surface() {
    let tool = ExportTool::new(Arc::new(StorybookExporter::default()));
    let surface = MemorySurface::default();
    let tree = storybook_tree(Some("Space Tale"), &full_pages(5), "spread-container");

    let result = tool.run(&ExportParams { open_window: true, ..Default::default() }, &tree, &surface).expect("Export failed");

    assert!(result.success);
    assert_eq!(result.data.expect("No report")["output_url"], "memory://0");
    assert_eq!(surface.documents.borrow().len(), 1);
    assert!(surface.documents.borrow()[0].contains("<title>Space Tale</title>"));
}

#[test]
fn test_export_tool_refusal_alerts_and_opens_nothing() {
    let tool = ExportTool::new(Arc::new(StorybookExporter::default()));
    let surface = MemorySurface::default();
    let tree = storybook_tree(Some("Short"), &full_pages(2), "spread-container");

    let result = tool.run(&ExportParams { open_window: true, ..Default::default() }, &tree, &surface).expect("Export failed");

    assert!(!result.success);
    assert!(surface.documents.borrow().is_empty());
    assert_eq!(surface.alerts.borrow().len(), 1);
}

#[test]
fn test_pages_inside_main_container() {
    let spreads: Vec<Value> = (1..=4)
        .map(|i| {
            json!({
                "tag_name": "div",
                "attributes": { "class": "spread-container" },
                "children": [
                    { "tag_name": "img", "attributes": { "src": format!("https://example.com/{}.png", i) } },
                    { "tag_name": "p", "children": [{ "tag_name": "#text", "text_content": "Nested" }] }
                ]
            })
        })
        .collect();
    let root = json!({
        "tag_name": "html",
        "children": [{
            "tag_name": "div",
            "attributes": { "class": "main" },
            "children": [{ "tag_name": "div", "attributes": { "class": "storybook" }, "children": spreads }]
        }]
    });
    let tree = DomTree::from_json(&root.to_string()).expect("Failed to parse tree");

    let assembly = StorybookExporter::default().assemble(&tree).expect("Export refused");
    assert_eq!(assembly.document.content_sections().len(), 4);
}

#[test]
fn test_deeply_wrapped_storybook_from_json() {
    let mut node = json!({
        "tag_name": "div",
        "attributes": { "class": "cover-title" },
        "children": [{ "tag_name": "#text", "text_content": "Deep Tale" }]
    });
    for _ in 0..150 {
        node = json!({ "tag_name": "div", "children": [node] });
    }
    let root = json!({ "tag_name": "html", "children": [node] });

    let tree = DomTree::from_json(&root.to_string()).expect("Failed to parse deep tree");
    let exporter = StorybookExporter::new(ExportConfig::new().min_pages(None)).expect("Invalid config");
    assert_eq!(exporter.assemble(&tree).expect("Export refused").document.title, "Deep Tale");
}

fn storybook_html(pages: usize) -> String {
    let mut html = String::from(
        "<html><head><title>Source</title></head><body>\
         <div class=\"page cover\"><h1 class=\"cover-title\">Space Tale</h1>\
         <storybook-cover-page-content><img src=\"https://example.com/cover.png\"></storybook-cover-page-content></div>\
         <div class=\"storybook\">",
    );
    for i in 1..=pages {
        html.push_str(&format!(
            "<div class=\"spread-container\"><div class=\"main\"><img src=\"https://example.com/{}.png\"><p>Page {}</p></div></div>",
            i, i
        ));
    }
    html.push_str("</div></body></html>");
    html
}

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_live_export_opens_output_tab() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

    let loaded = session
        .execute_tool("load_storybook", json!({ "source": data_url(&storybook_html(5)), "settle_ms": 200 }))
        .expect("Failed to load");
    assert!(loaded.success);

    let tabs_before = session.get_tabs().expect("Failed to get tabs").len();
    let result = session.execute_tool("export_storybook", json!({})).expect("Failed to export");

    assert!(result.success, "export failed: {:?}", result.error);
    let data = result.data.expect("No report");
    assert_eq!(data["title"], "Space Tale");
    assert_eq!(data["content_pages"], 5);
    assert_eq!(data["used_fallback"], true);
    assert!(session.get_tabs().expect("Failed to get tabs").len() > tabs_before);
}

#[test]
#[ignore]
fn test_live_export_refuses_short_storybook() {
    let mut session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    let exporter = StorybookExporter::new(ExportConfig::new().show_alert(false)).expect("Invalid config");
    session.set_tool_registry(ToolRegistry::with_exporter(exporter));

    session
        .execute_tool("load_storybook", json!({ "source": data_url(&storybook_html(2)), "settle_ms": 200 }))
        .expect("Failed to load");

    let tabs_before = session.get_tabs().expect("Failed to get tabs").len();
    let result = session.execute_tool("export_storybook", json!({})).expect("Failed to export");

    assert!(!result.success);
    assert_eq!(result.data, Some(json!({ "found": 2, "minimum": 4 })));
    assert_eq!(session.get_tabs().expect("Failed to get tabs").len(), tabs_before);
}

#[test]
#[ignore]
fn test_live_export_writes_pdf_and_html() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    let dir = std::env::temp_dir().join("storybook-export-live-test");
    let pdf_path = dir.join("story.pdf");
    let html_path = dir.join("story.html");

    session
        .execute_tool("load_storybook", json!({ "source": data_url(&storybook_html(4)), "settle_ms": 200 }))
        .expect("Failed to load");
    let result = session
        .execute_tool(
            "export_storybook",
            json!({
                "pdf_path": pdf_path.to_str().unwrap(),
                "html_path": html_path.to_str().unwrap(),
                "open_window": false
            }),
        )
        .expect("Failed to export");

    assert!(result.success, "export failed: {:?}", result.error);
    let pdf = std::fs::read(&pdf_path).expect("No PDF written");
    assert!(pdf.starts_with(b"%PDF"));
    let html = std::fs::read_to_string(&html_path).expect("No HTML written");
    assert!(html.contains("<h2>Space Tale</h2>"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
#[ignore]
fn test_live_inspect() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

    session
        .execute_tool("load_storybook", json!({ "source": data_url(&storybook_html(3)), "settle_ms": 200 }))
        .expect("Failed to load");
    let result = session.execute_tool("inspect_storybook", json!({})).expect("Failed to inspect");

    let data = result.data.expect("No inspection");
    assert_eq!(data["discovered_pages"], 3);
    assert_eq!(data["would_abort"], true);
    assert_eq!(data["title"], "Space Tale");
}

#[test]
#[ignore]
fn test_live_export_deeply_nested_page() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    let page = storybook_html(4);
    let body_start = page.find("<body>").expect("No body") + "<body>".len();
    let body_end = page.find("</body>").expect("No body end");
    let deep = format!(
        "<html><body>{}{}{}</body></html>",
        "<div>".repeat(200),
        &page[body_start..body_end],
        "</div>".repeat(200)
    );

    session
        .execute_tool("load_storybook", json!({ "source": data_url(&deep), "settle_ms": 200 }))
        .expect("Failed to load");
    let result = session.execute_tool("inspect_storybook", json!({})).expect("Failed to inspect");

    let data = result.data.expect("No inspection");
    assert_eq!(data["title"], "Space Tale");
    assert_eq!(data["discovered_pages"], 4);
    assert_eq!(data["valid_pages"], 4);
}


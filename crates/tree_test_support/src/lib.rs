//! Fixtures and comparison helpers shared by the workspace's tests.

use core_types::Ident;
use doctree::{
    ClosedPart, ClosedWidget, Document, Node, Page, Part, PlaceHolder, Section, TextBlock, Widget,
    outline_lines, resolve,
};
use serde_json::json;

pub const PROJECT: &str = "demo";

/// A `div` holding one text node per entry.
pub fn text_div(texts: &[&str]) -> Node {
    Node::Part(Part::new("div").with_children(texts.iter().map(|t| Node::text(*t)).collect()))
}

/// Template page `demo_2` used across tests:
///
/// ```text
/// head-0        <meta charset>
/// body-0        <div> "a" "b" "c"
/// body-1        tabs (container 0: "tab one", container 1: empty)
/// body-2        link
/// body-3        nav -> section navigation
/// body-4        TextBlock site.intro
/// ```
pub fn sample_page() -> Page {
    let mut page = Page::template(Ident::new(PROJECT, 2), "index");
    page.brief = "home page".to_string();

    let mut meta = ClosedPart::new("meta");
    meta.attribs.insert("charset".to_string(), "utf-8".to_string());

    let mut tabs = Widget::new("tabs", "tabs.Tabs", 2);
    tabs.fields.insert("titles".to_string(), json!(["one", "two"]));
    tabs.containers[0].push(Node::text("tab one"));

    let mut link = ClosedWidget::new("link", "links.Link");
    link.fields.insert("link_ident".to_string(), json!(4));
    link.fields.insert("content".to_string(), json!("Home"));

    let children = [
        text_div(&["a", "b", "c"]),
        Node::Widget(tabs),
        Node::ClosedWidget(link),
        Node::SectionPlaceHolder(PlaceHolder::new("nav", "navigation")),
        Node::TextBlock(TextBlock::new("site.intro")),
    ];
    if let Some(head) = page.tree_mut("head").and_then(Node::children_mut) {
        head.push(Node::ClosedPart(meta));
    }
    if let Some(body) = page.tree_mut("body").and_then(Node::children_mut) {
        body.extend(children);
    }
    page.reindex();
    page
}

/// Section `footer`: a paragraph and a closed widget.
pub fn sample_section() -> Section {
    let root = Part::new("div")
        .with_attrib("class", "footer")
        .with_children(vec![
            Node::Part(Part::new("p").with_children(vec![Node::text("bye")])),
            Node::ClosedWidget(ClosedWidget::new("footlink", "links.Link")),
        ]);
    match Section::with_root("footer", root) {
        Ok(section) => section,
        Err(err) => panic!("fixture section rejected: {err}"),
    }
}

/// Briefs of the children at `loc` (a part or a widget container).
pub fn child_briefs<D: Document + ?Sized>(doc: &D, loc: &str) -> Vec<String> {
    let loc = doc
        .parse_location(loc)
        .unwrap_or_else(|err| panic!("bad location {loc:?}: {err}"));
    let scope = if loc.container.is_some() && loc.path.is_empty() {
        let owner = doc
            .widgets()
            .get(&loc.top_key)
            .unwrap_or_else(|| panic!("no widget {:?}", loc.top_key));
        let widget = resolve(doc, owner).unwrap_or_else(|err| panic!("{err}"));
        widget.container(loc.container.unwrap_or_default()).cloned()
    } else {
        let node = resolve(doc, &loc).unwrap_or_else(|err| panic!("{err}"));
        node.children().cloned()
    };
    scope
        .unwrap_or_default()
        .iter()
        .map(|n| n.brief().to_string())
        .collect()
}

/// Line diff for assertion messages: the first differing line with two
/// lines of context either side.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;
    const MISSING: &str = "<missing>";
    let line = |lines: &[String], i: usize| lines.get(i).map_or(MISSING, String::as_str).to_string();

    let max = expected.len().max(actual.len());
    let mut out = String::new();
    match (0..max).find(|&i| line(expected, i) != line(actual, i)) {
        Some(first) => {
            let _ = writeln!(&mut out, "first difference at line {}:", first + 1);
            for i in first.saturating_sub(2)..(first + 3).min(max) {
                let marker = if i == first { '>' } else { ' ' };
                let _ = writeln!(&mut out, "{marker} {:>4} - {}", i + 1, line(expected, i));
                let _ = writeln!(&mut out, "{marker} {:>4} + {}", i + 1, line(actual, i));
            }
        }
        None => {
            let _ = writeln!(&mut out, "no differing lines");
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

/// Panic with an outline diff unless the two subtrees are equal.
pub fn assert_same_tree(expected: &Node, actual: &Node) {
    if expected != actual {
        let expected = outline_lines(expected, usize::MAX);
        let actual = outline_lines(actual, usize::MAX);
        panic!("trees differ\n{}", diff_lines(&expected, &actual));
    }
}

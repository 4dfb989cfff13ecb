//! Flat listings of document trees for the admin tree view and for logs.

use crate::document::Document;
use crate::location::Location;
use crate::types::{Node, NodeKind};

const PREVIEW_CHARS: usize = 40;

/// One row of the editor's tree view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineRow {
    pub location: Location,
    pub depth: usize,
    /// `None` for the row standing for a widget container.
    pub kind: Option<NodeKind>,
    pub label: String,
}

/// Every node of `doc` in pre-order, tree roots first, widget containers
/// listed under their widget.
pub fn outline<D: Document + ?Sized>(doc: &D) -> Vec<OutlineRow> {
    fn walk(nodes: &[Node], scope: &Location, depth: usize, out: &mut Vec<OutlineRow>) {
        for (index, node) in nodes.iter().enumerate() {
            let location = scope.child(index);
            out.push(OutlineRow {
                location: location.clone(),
                depth,
                kind: Some(node.kind()),
                label: label(node),
            });
            match node {
                Node::Part(part) | Node::Section(part) => {
                    walk(&part.children, &location, depth + 1, out);
                }
                Node::Widget(widget) => {
                    for (container, contents) in widget.containers.iter().enumerate() {
                        let scope = Location::in_container(widget.name.as_str(), container, vec![]);
                        out.push(OutlineRow {
                            location: scope.clone(),
                            depth: depth + 1,
                            kind: None,
                            label: format!("container {container}"),
                        });
                        walk(contents, &scope, depth + 2, out);
                    }
                }
                _ => {}
            }
        }
    }

    let mut out = Vec::new();
    for top_key in doc.top_keys() {
        let Some(root) = doc.tree(top_key) else {
            continue;
        };
        let location = Location::in_tree(top_key, vec![]);
        out.push(OutlineRow {
            location: location.clone(),
            depth: 0,
            kind: Some(root.kind()),
            label: label(root),
        });
        if let Some(children) = root.children() {
            walk(children, &location, 1, &mut out);
        }
    }
    out
}

/// Indented text rendering of a subtree, at most `cap` lines.
pub fn outline_lines(root: &Node, cap: usize) -> Vec<String> {
    fn walk(node: &Node, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        out.push(format!("{indent}{}", label(node)));
        match node {
            Node::Part(part) | Node::Section(part) => {
                for c in &part.children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Widget(widget) => {
                for (container, contents) in widget.containers.iter().enumerate() {
                    if *left == 0 {
                        return;
                    }
                    *left -= 1;
                    out.push(format!("{indent}  [container {container}]"));
                    for c in contents {
                        walk(c, depth + 2, out, left);
                    }
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    let mut left = cap;
    walk(root, 0, &mut out, &mut left);
    out
}

/// Short human label for one node.
pub fn label(node: &Node) -> String {
    let with_brief = |head: String, brief: &str| {
        if brief.is_empty() {
            head
        } else {
            format!("{head}  {}", preview(brief))
        }
    };
    match node {
        Node::Part(part) => with_brief(format!("<{}>", part.tag_name), &part.brief),
        Node::Section(part) => with_brief(format!("section <{}>", part.tag_name), &part.brief),
        Node::ClosedPart(part) => with_brief(format!("<{} />", part.tag_name), &part.brief),
        Node::Widget(w) => with_brief(format!("{} ({})", w.name, w.widget_type), &w.brief),
        Node::ClosedWidget(w) => with_brief(format!("{} ({})", w.name, w.widget_type), &w.brief),
        Node::TextBlock(block) => format!("TextBlock {}", block.textref),
        Node::HtmlSymbol(symbol) => symbol.clone(),
        Node::Comment(text) => format!("<!-- {} -->", preview(text)),
        Node::SectionPlaceHolder(holder) => {
            format!("{} -> section {}", holder.alias, holder.section_name)
        }
        Node::Text(text) => format!("\"{}\"", preview(text)),
    }
}

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    match flat.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat.to_string(),
    }
}

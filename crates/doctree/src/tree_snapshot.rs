use crate::outline::label;
use crate::types::{Attribs, Node};
use std::fmt;
use std::sync::OnceLock;

/// Deterministic text rendering of a tree for test comparisons.
/// Not a stable format.
///
/// Equivalence rules:
/// - Kinds must match.
/// - All fields other than children must match; attributes compare by key.
/// - Children and widget containers compare position by position.
#[derive(Debug)]
pub struct TreeSnapshot {
    lines: Vec<String>,
}

impl TreeSnapshot {
    pub fn new(root: &Node) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn walk_snapshot(node: &Node, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}{}", label(node));
    let (show, attribs) = match node {
        Node::Part(part) | Node::Section(part) => (part.show, Some(&part.attribs)),
        Node::ClosedPart(part) => (part.show, Some(&part.attribs)),
        _ => (true, None),
    };
    if let Some(attribs) = attribs.filter(|a| !a.is_empty()) {
        line.push_str(&format!(" [{}]", render_attribs(attribs)));
    }
    if !show {
        line.push_str(" (hidden)");
    }
    out.push(line);
    match node {
        Node::Part(part) | Node::Section(part) => {
            for child in &part.children {
                walk_snapshot(child, depth + 1, out);
            }
        }
        Node::Widget(widget) => {
            for (index, contents) in widget.containers.iter().enumerate() {
                out.push(format!("{indent}  [container {index}]"));
                for child in contents {
                    walk_snapshot(child, depth + 2, out);
                }
            }
        }
        _ => {}
    }
}

fn render_attribs(attribs: &Attribs) -> String {
    attribs
        .iter()
        .map(|(k, v)| format!("{k}=\"{v}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug)]
pub struct TreeMismatch<'a> {
    location: String,
    detail: String,
    expected_node: &'a Node,
    actual_node: &'a Node,
    expected_subtree: OnceLock<String>,
    actual_subtree: OnceLock<String>,
}

impl TreeMismatch<'_> {
    /// Location-style path of the first differing item, relative to the root.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for TreeMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected_subtree = self
            .expected_subtree
            .get_or_init(|| TreeSnapshot::new(self.expected_node).render());
        let actual_subtree = self
            .actual_subtree
            .get_or_init(|| TreeSnapshot::new(self.actual_node).render());
        writeln!(f, "tree mismatch at {}: {}", self.location, self.detail)?;
        writeln!(f, "expected subtree:\n{expected_subtree}")?;
        writeln!(f, "actual subtree:\n{actual_subtree}")?;
        Ok(())
    }
}

impl std::error::Error for TreeMismatch<'_> {}

pub fn assert_tree_eq(expected: &Node, actual: &Node) {
    if let Err(mismatch) = compare_trees(expected, actual) {
        panic!("{mismatch}");
    }
}

pub fn compare_trees<'a>(
    expected: &'a Node,
    actual: &'a Node,
) -> Result<(), Box<TreeMismatch<'a>>> {
    compare_nodes(expected, actual, "root")
}

fn mismatch<'a>(
    location: &str,
    detail: impl Into<String>,
    expected: &'a Node,
    actual: &'a Node,
) -> Box<TreeMismatch<'a>> {
    Box::new(TreeMismatch {
        location: location.to_string(),
        detail: detail.into(),
        expected_node: expected,
        actual_node: actual,
        expected_subtree: OnceLock::new(),
        actual_subtree: OnceLock::new(),
    })
}

fn compare_nodes<'a>(
    expected: &'a Node,
    actual: &'a Node,
    location: &str,
) -> Result<(), Box<TreeMismatch<'a>>> {
    if expected.kind() != actual.kind() {
        return Err(mismatch(
            location,
            format!("kind ({} vs {})", expected.kind().tag(), actual.kind().tag()),
            expected,
            actual,
        ));
    }
    if without_children(expected) != without_children(actual) {
        return Err(mismatch(location, "fields", expected, actual));
    }
    match (expected, actual) {
        (Node::Part(e) | Node::Section(e), Node::Part(a) | Node::Section(a)) => {
            compare_scope(expected, actual, &e.children, &a.children, location)
        }
        (Node::Widget(e), Node::Widget(a)) => {
            if e.containers.len() != a.containers.len() {
                return Err(mismatch(location, "container count", expected, actual));
            }
            for (index, (ec, ac)) in e.containers.iter().zip(&a.containers).enumerate() {
                compare_scope(expected, actual, ec, ac, &format!("{location}.{index}"))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn compare_scope<'a>(
    expected_parent: &'a Node,
    actual_parent: &'a Node,
    expected: &'a [Node],
    actual: &'a [Node],
    location: &str,
) -> Result<(), Box<TreeMismatch<'a>>> {
    for (index, (exp, act)) in expected.iter().zip(actual).enumerate() {
        compare_nodes(exp, act, &format!("{location}-{index}"))?;
    }
    if expected.len() != actual.len() {
        return Err(mismatch(
            location,
            format!(
                "child count (expected {}, actual {})",
                expected.len(),
                actual.len()
            ),
            expected_parent,
            actual_parent,
        ));
    }
    Ok(())
}

fn without_children(node: &Node) -> Node {
    let mut shallow = node.clone();
    if let Some(children) = shallow.children_mut() {
        children.clear();
    }
    if let Node::Widget(widget) = &mut shallow {
        for contents in &mut widget.containers {
            contents.clear();
        }
    }
    shallow
}

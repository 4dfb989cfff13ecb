//! Flattened lookups over a document: widget names and placeholder aliases.
//!
//! Widgets found inside another widget's container are recorded relative to
//! that widget (`outer-0-2`), so resolving a nested widget walks the chain of
//! owners through this same index.

use crate::document::Document;
use crate::location::Location;
use crate::types::Node;
use std::collections::BTreeMap;

pub type WidgetIndex = BTreeMap<String, Location>;
pub type PlaceholderIndex = BTreeMap<String, PlaceholderInfo>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderInfo {
    pub section_name: String,
    pub location: Location,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Indexes {
    pub widgets: WidgetIndex,
    pub placeholders: PlaceholderIndex,
}

pub fn build_indexes<D: Document + ?Sized>(doc: &D) -> Indexes {
    let mut out = Indexes::default();
    for top_key in doc.top_keys() {
        let Some(children) = doc.tree(top_key).and_then(Node::children) else {
            continue;
        };
        visit(children, &Location::in_tree(top_key, vec![]), &mut out);
    }
    out
}

fn visit(nodes: &[Node], scope: &Location, out: &mut Indexes) {
    for (index, node) in nodes.iter().enumerate() {
        let loc = scope.child(index);
        match node {
            Node::Widget(widget) => {
                record_widget(&widget.name, &loc, out);
                for (container, contents) in widget.containers.iter().enumerate() {
                    visit(
                        contents,
                        &Location::in_container(widget.name.as_str(), container, vec![]),
                        out,
                    );
                }
            }
            Node::ClosedWidget(widget) => record_widget(&widget.name, &loc, out),
            Node::SectionPlaceHolder(holder) => {
                if out.placeholders.contains_key(&holder.alias) {
                    log::warn!(
                        target: "doctree.index",
                        "duplicate placeholder alias {:?} at {loc}; keeping first",
                        holder.alias
                    );
                    continue;
                }
                out.placeholders.insert(
                    holder.alias.clone(),
                    PlaceholderInfo {
                        section_name: holder.section_name.clone(),
                        location: loc,
                    },
                );
            }
            Node::Part(part) | Node::Section(part) => visit(&part.children, &loc, out),
            _ => {}
        }
    }
}

fn record_widget(name: &str, loc: &Location, out: &mut Indexes) {
    if out.widgets.contains_key(name) {
        log::warn!(
            target: "doctree.index",
            "duplicate widget name {name:?} at {loc}; keeping first"
        );
        return;
    }
    out.widgets.insert(name.to_string(), loc.clone());
}

/// Widget names and placeholder aliases carried by a subtree.
pub fn collect_names(node: &Node) -> (Vec<String>, Vec<String>) {
    let mut widgets = Vec::new();
    let mut aliases = Vec::new();
    node.for_each(&mut |n| match n {
        Node::Widget(w) => widgets.push(w.name.clone()),
        Node::ClosedWidget(w) => widgets.push(w.name.clone()),
        Node::SectionPlaceHolder(h) => aliases.push(h.alias.clone()),
        _ => {}
    });
    (widgets, aliases)
}

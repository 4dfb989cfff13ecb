//! Resolving locations to nodes.
//!
//! A location's first path index selects from its top scope: the children of
//! the named tree root, or the numbered container of the named widget. The
//! remaining indices walk down through parts.

use crate::document::Document;
use crate::error::EditError;
use crate::location::Location;
use crate::types::Node;

/// Bound on widget-in-widget container chains followed while resolving.
const MAX_WIDGET_NESTING: usize = 64;

fn not_found(loc: &Location) -> EditError {
    EditError::NotFound(loc.to_string())
}

/// The node at `loc`. An empty tree path yields the tree root itself.
pub fn resolve<'a, D: Document + ?Sized>(doc: &'a D, loc: &Location) -> Result<&'a Node, EditError> {
    resolve_nested(doc, loc, 0)
}

pub fn resolve_mut<'a, D: Document + ?Sized>(
    doc: &'a mut D,
    loc: &Location,
) -> Result<&'a mut Node, EditError> {
    resolve_nested_mut(doc, loc, 0)
}

/// The child list holding the node at `loc`, plus its index there.
///
/// The index is not range checked so that callers can address the append
/// position `len`.
pub fn resolve_parent<'a, D: Document + ?Sized>(
    doc: &'a D,
    loc: &Location,
) -> Result<(&'a Vec<Node>, usize), EditError> {
    let (&index, parent_path) = loc.path.split_last().ok_or_else(|| not_found(loc))?;
    let top = top_scope(doc, loc, 0)?;
    if parent_path.is_empty() {
        return Ok((top, index));
    }
    let parent = walk(top, parent_path, loc)?;
    let scope = parent.children().ok_or_else(|| not_found(loc))?;
    Ok((scope, index))
}

pub fn resolve_parent_mut<'a, D: Document + ?Sized>(
    doc: &'a mut D,
    loc: &Location,
) -> Result<(&'a mut Vec<Node>, usize), EditError> {
    let (&index, parent_path) = loc.path.split_last().ok_or_else(|| not_found(loc))?;
    let top = top_scope_mut(doc, loc, 0)?;
    if parent_path.is_empty() {
        return Ok((top, index));
    }
    let parent = walk_mut(top, parent_path, loc)?;
    let scope = parent.children_mut().ok_or_else(|| not_found(loc))?;
    Ok((scope, index))
}

/// The top scope of `loc`: the root's children or the widget container.
pub fn top_scope<'a, D: Document + ?Sized>(
    doc: &'a D,
    loc: &Location,
    depth: usize,
) -> Result<&'a Vec<Node>, EditError> {
    match loc.container {
        None => doc
            .tree(&loc.top_key)
            .and_then(Node::children)
            .ok_or_else(|| not_found(loc)),
        Some(container) => widget_node(doc, &loc.top_key, depth)?
            .container(container)
            .ok_or_else(|| not_found(loc)),
    }
}

fn top_scope_mut<'a, D: Document + ?Sized>(
    doc: &'a mut D,
    loc: &Location,
    depth: usize,
) -> Result<&'a mut Vec<Node>, EditError> {
    match loc.container {
        None => doc
            .tree_mut(&loc.top_key)
            .and_then(Node::children_mut)
            .ok_or_else(|| not_found(loc)),
        Some(container) => widget_node_mut(doc, &loc.top_key, depth)?
            .container_mut(container)
            .ok_or_else(|| not_found(loc)),
    }
}

/// Number of items in the scope holding `loc`, failing if `loc` is not in it.
pub fn scope_len<D: Document + ?Sized>(doc: &D, loc: &Location) -> Result<usize, EditError> {
    let (scope, index) = resolve_parent(doc, loc)?;
    if index >= scope.len() {
        return Err(not_found(loc));
    }
    Ok(scope.len())
}

fn resolve_nested<'a, D: Document + ?Sized>(
    doc: &'a D,
    loc: &Location,
    depth: usize,
) -> Result<&'a Node, EditError> {
    if loc.path.is_empty() {
        if loc.container.is_some() {
            // A bare container is a child list, not a node.
            return Err(not_found(loc));
        }
        return doc.tree(&loc.top_key).ok_or_else(|| not_found(loc));
    }
    let top = top_scope(doc, loc, depth)?;
    walk(top, &loc.path, loc)
}

fn resolve_nested_mut<'a, D: Document + ?Sized>(
    doc: &'a mut D,
    loc: &Location,
    depth: usize,
) -> Result<&'a mut Node, EditError> {
    if loc.path.is_empty() {
        if loc.container.is_some() {
            return Err(not_found(loc));
        }
        return doc.tree_mut(&loc.top_key).ok_or_else(|| not_found(loc));
    }
    let top = top_scope_mut(doc, loc, depth)?;
    walk_mut(top, &loc.path, loc)
}

fn widget_node<'a, D: Document + ?Sized>(
    doc: &'a D,
    name: &str,
    depth: usize,
) -> Result<&'a Node, EditError> {
    if depth >= MAX_WIDGET_NESTING {
        return Err(EditError::NotFound(name.to_string()));
    }
    let widget_loc = doc
        .widgets()
        .get(name)
        .ok_or_else(|| EditError::NotFound(name.to_string()))?;
    let node = resolve_nested(doc, widget_loc, depth + 1)?;
    if node.widget_name() != Some(name) {
        return Err(EditError::NotFound(name.to_string()));
    }
    Ok(node)
}

fn widget_node_mut<'a, D: Document + ?Sized>(
    doc: &'a mut D,
    name: &str,
    depth: usize,
) -> Result<&'a mut Node, EditError> {
    if depth >= MAX_WIDGET_NESTING {
        return Err(EditError::NotFound(name.to_string()));
    }
    let widget_loc = doc
        .widgets()
        .get(name)
        .cloned()
        .ok_or_else(|| EditError::NotFound(name.to_string()))?;
    let node = resolve_nested_mut(doc, &widget_loc, depth + 1)?;
    if node.widget_name() != Some(name) {
        return Err(EditError::NotFound(name.to_string()));
    }
    Ok(node)
}

fn walk<'a>(scope: &'a [Node], path: &[usize], loc: &Location) -> Result<&'a Node, EditError> {
    let (&first, rest) = path.split_first().ok_or_else(|| not_found(loc))?;
    let mut node = scope.get(first).ok_or_else(|| not_found(loc))?;
    for &index in rest {
        node = node
            .children()
            .and_then(|children| children.get(index))
            .ok_or_else(|| not_found(loc))?;
    }
    Ok(node)
}

fn walk_mut<'a>(
    scope: &'a mut [Node],
    path: &[usize],
    loc: &Location,
) -> Result<&'a mut Node, EditError> {
    let (&first, rest) = path.split_first().ok_or_else(|| not_found(loc))?;
    let mut node = scope.get_mut(first).ok_or_else(|| not_found(loc))?;
    for &index in rest {
        node = node
            .children_mut()
            .and_then(|children| children.get_mut(index))
            .ok_or_else(|| not_found(loc))?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Page, Section};
    use crate::types::{ClosedPart, Part, Widget};
    use core_types::Ident;

    fn page() -> Page {
        let mut tabs = Widget::new("tabs", "tabs.Tabs", 2);
        tabs.containers[0].push(Node::text("first tab"));
        let mut inner = Widget::new("inner", "tabs.Tabs", 1);
        inner.containers[0].push(Node::text("deep"));
        tabs.containers[1].push(Node::Widget(inner));

        let mut page = Page::template(Ident::new("demo", 1), "index");
        let body = page.tree_mut("body").unwrap();
        body.insert_child(
            0,
            Node::Part(Part::new("div").with_children(vec![
                Node::text("a"),
                Node::ClosedPart(ClosedPart::new("br")),
            ])),
        )
        .unwrap();
        body.insert_child(1, Node::Widget(tabs)).unwrap();
        page.reindex();
        page
    }

    fn loc(doc: &impl Document, text: &str) -> Location {
        doc.parse_location(text).unwrap()
    }

    #[test]
    fn resolves_tree_paths() {
        let page = page();
        assert_eq!(resolve(&page, &loc(&page, "body-0-0")), Ok(&Node::text("a")));
        assert_eq!(
            resolve(&page, &loc(&page, "body")).map(Node::kind),
            Ok(crate::NodeKind::Part)
        );
        assert_eq!(
            resolve(&page, &loc(&page, "body-0-5")),
            Err(EditError::NotFound("body-0-5".to_string()))
        );
        // Walking through a leaf is not possible.
        assert!(resolve(&page, &loc(&page, "body-0-1-0")).is_err());
        assert!(resolve(&page, &loc(&page, "svg-0")).is_err());
    }

    #[test]
    fn resolves_widget_containers() {
        let page = page();
        assert_eq!(
            resolve(&page, &loc(&page, "tabs-0-0")),
            Ok(&Node::text("first tab"))
        );
        assert_eq!(
            resolve(&page, &loc(&page, "inner-0-0")),
            Ok(&Node::text("deep"))
        );
        assert!(resolve(&page, &loc(&page, "tabs-0")).is_err());
        assert!(resolve(&page, &loc(&page, "tabs-2-0")).is_err());
        assert!(resolve(&page, &loc(&page, "missing-0-0")).is_err());
        // Widget children are only reachable through containers.
        assert!(resolve(&page, &loc(&page, "body-1-0")).is_err());
    }

    #[test]
    fn resolve_parent_stops_one_level_short() {
        let page = page();
        let (scope, index) = resolve_parent(&page, &loc(&page, "body-0-1")).unwrap();
        assert_eq!(scope.len(), 2);
        assert_eq!(index, 1);

        let (scope, index) = resolve_parent(&page, &loc(&page, "tabs-1-0")).unwrap();
        assert_eq!(scope.len(), 1);
        assert_eq!(index, 0);

        assert!(resolve_parent(&page, &loc(&page, "body")).is_err());
        assert_eq!(scope_len(&page, &loc(&page, "body-1")), Ok(2));
        assert!(scope_len(&page, &loc(&page, "body-2")).is_err());
    }

    #[test]
    fn resolve_mut_reaches_nested_containers() {
        let mut page = page();
        let target = loc(&page, "inner-0-0");
        *resolve_mut(&mut page, &target).unwrap() = Node::text("changed");
        assert_eq!(resolve(&page, &target), Ok(&Node::text("changed")));
    }

    #[test]
    fn section_root_resolves_by_section_name() {
        let mut section = Section::new("footer").unwrap();
        section
            .tree_mut("footer")
            .unwrap()
            .insert_child(0, Node::text("x"))
            .unwrap();
        assert_eq!(
            resolve(&section, &loc(&section, "footer-0")),
            Ok(&Node::text("x"))
        );
        assert!(resolve(&section, &loc(&section, "body-0")).is_err());
    }
}

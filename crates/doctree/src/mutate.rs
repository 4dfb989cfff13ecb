//! Structural edits addressed by location.
//!
//! Every public operation works on a caller-owned working copy and rebuilds
//! the document's indexes before returning. On error the copy may be partly
//! modified and must be discarded.

use crate::access::{resolve, resolve_mut, resolve_parent_mut, top_scope};
use crate::document::Document;
use crate::error::EditError;
use crate::index::collect_names;
use crate::location::{Location, validate_name};
use crate::types::{Node, scope_insert, scope_remove, scope_replace};

/// Insert `node` relative to the item selected at `loc`; returns where it landed.
///
/// - Selecting a part (or a tree root) inserts as its first child.
/// - Selecting a bare widget container, or position 0 of an empty one,
///   inserts at the start of that container.
/// - Anything else inserts as the sibling immediately after the selection.
pub fn insert_at<D: Document + ?Sized>(
    doc: &mut D,
    loc: &Location,
    node: Node,
) -> Result<Location, EditError> {
    check_insertable(doc, &node, None)?;
    let target = insertion_point(doc, loc)?;
    place_at(doc, &target, node)?;
    doc.reindex();
    Ok(target)
}

/// Where a node inserted at `loc` lands, per the rules of [`insert_at`].
pub fn insertion_point<D: Document + ?Sized>(
    doc: &D,
    loc: &Location,
) -> Result<Location, EditError> {
    if loc.path.is_empty() {
        // Tree root or bare container: both must exist and take children.
        top_scope(doc, loc, 0)?;
        return Ok(loc.child(0));
    }
    if loc.container.is_some() && loc.path == [0] && top_scope(doc, loc, 0)?.is_empty() {
        return Ok(loc.clone());
    }
    if matches!(resolve(doc, loc)?, Node::Part(_)) {
        return Ok(loc.child(0));
    }
    let last = loc.last_index().unwrap_or_default();
    loc.with_last_index(last + 1)
        .ok_or_else(|| EditError::NotFound(loc.to_string()))
}

/// Insert exactly at `loc`, shifting the item there (if any) down.
pub(crate) fn place_at<D: Document + ?Sized>(
    doc: &mut D,
    loc: &Location,
    node: Node,
) -> Result<(), EditError> {
    let (scope, index) = resolve_parent_mut(doc, loc)?;
    scope_insert(scope, index, node)?;
    log::trace!(target: "doctree.mutate", "inserted at {loc}");
    Ok(())
}

fn take_at<D: Document + ?Sized>(doc: &mut D, loc: &Location) -> Result<Node, EditError> {
    let (scope, index) = resolve_parent_mut(doc, loc)?;
    let node =
        scope_remove(scope, index).map_err(|_| EditError::NotFound(loc.to_string()))?;
    log::trace!(target: "doctree.mutate", "removed from {loc}");
    Ok(node)
}

/// Remove and return the item at `loc`. Tree roots and containers cannot be deleted.
pub fn delete_at<D: Document + ?Sized>(doc: &mut D, loc: &Location) -> Result<Node, EditError> {
    if loc.path.is_empty() {
        return Err(EditError::NotFound(loc.to_string()));
    }
    let node = take_at(doc, loc)?;
    doc.reindex();
    Ok(node)
}

/// Replace the item at `loc`, returning the old one.
///
/// A tree root may be replaced by a node of the same kind, which is how root
/// attributes are edited.
pub fn replace_at<D: Document + ?Sized>(
    doc: &mut D,
    loc: &Location,
    node: Node,
) -> Result<Node, EditError> {
    let old = if loc.is_tree_root() {
        let current = resolve(doc, loc)?;
        if current.kind() != node.kind() {
            return Err(EditError::NotAllowed("a tree root keeps its kind"));
        }
        check_insertable(doc, &node, Some(current))?;
        let root = resolve_mut(doc, loc)?;
        std::mem::replace(root, node)
    } else {
        let current = resolve(doc, loc)?;
        check_insertable(doc, &node, Some(current))?;
        let (scope, index) = resolve_parent_mut(doc, loc)?;
        scope_replace(scope, index, node)?
    };
    doc.reindex();
    Ok(old)
}

/// Move the item at `from` to `to`; returns its final location.
///
/// Both locations must share top key and container. `to` is expressed in
/// the coordinates of the tree before the move. An upward move removes first
/// and then inserts; a downward move inserts a copy first and then removes the
/// original, so in both cases no index in `to` is disturbed by the other step.
pub fn move_location<D: Document + ?Sized>(
    doc: &mut D,
    from: &Location,
    to: &Location,
) -> Result<Location, EditError> {
    if !from.same_scope(to) {
        return Err(EditError::CannotMove("locations are in different scopes"));
    }
    if from.path.is_empty() || to.path.is_empty() {
        return Err(EditError::CannotMove("a root cannot be moved"));
    }
    if from == to {
        resolve(doc, from)?;
        return Ok(from.clone());
    }
    if to.path.starts_with(&from.path) {
        return Err(EditError::CannotMove("an item cannot be moved inside itself"));
    }

    let landed = if to.path < from.path {
        let node = take_at(doc, from)?;
        place_at(doc, to, node)?;
        to.clone()
    } else {
        let node = resolve(doc, from)?.clone();
        place_at(doc, to, node)?;
        take_at(doc, from)?;
        shift_for_removal(to, from)
    };
    doc.reindex();
    log::debug!(target: "doctree.mutate", "moved {from} to {landed}");
    Ok(landed)
}

/// `loc` adjusted for the removal of the item at `removed`.
fn shift_for_removal(loc: &Location, removed: &Location) -> Location {
    let mut out = loc.clone();
    let depth = removed.path.len() - 1;
    if out.path.len() > depth
        && out.path[..depth] == removed.path[..depth]
        && out.path[depth] > removed.path[depth]
    {
        out.path[depth] -= 1;
    }
    out
}

/// In a section, the section's own name is a top key and cannot also name a
/// widget or placeholder.
pub(crate) fn check_section_name<'a, D: Document + ?Sized>(
    doc: &D,
    mut names: impl Iterator<Item = &'a String>,
) -> Result<(), EditError> {
    match doc.section_name() {
        Some(section) => match names.find(|name| name.as_str() == section) {
            Some(name) => Err(EditError::NameConflict(name.clone())),
            None => Ok(()),
        },
        None => Ok(()),
    }
}

/// Validate a subtree about to enter `doc`.
///
/// `replacing` is the node it displaces, whose names become free.
fn check_insertable<D: Document + ?Sized>(
    doc: &D,
    node: &Node,
    replacing: Option<&Node>,
) -> Result<(), EditError> {
    let mut sections = 0usize;
    let mut has_placeholder = false;
    node.for_each(&mut |n| match n {
        Node::Section(_) => sections += 1,
        Node::SectionPlaceHolder(_) => has_placeholder = true,
        _ => {}
    });
    // Only a section root may be swapped for another section root.
    let allowed = usize::from(
        matches!(replacing, Some(Node::Section(_))) && matches!(node, Node::Section(_)),
    );
    if sections > allowed {
        return Err(EditError::NotAllowed("sections cannot be nested"));
    }
    if has_placeholder && !doc.allows_placeholders() {
        return Err(EditError::NotAllowed(
            "section placeholders cannot be placed in a section",
        ));
    }

    let (freed_widgets, freed_aliases) = replacing.map(collect_names).unwrap_or_default();
    let (widgets, aliases) = collect_names(node);
    check_section_name(doc, widgets.iter().chain(&aliases))?;
    let mut seen = Vec::with_capacity(widgets.len());
    for name in &widgets {
        validate_name(name)?;
        if seen.contains(&name)
            || (doc.widgets().contains_key(name) && !freed_widgets.contains(name))
        {
            return Err(EditError::NameConflict(name.clone()));
        }
        seen.push(name);
    }
    let mut seen = Vec::with_capacity(aliases.len());
    for alias in &aliases {
        validate_name(alias)?;
        if seen.contains(&alias)
            || (doc.placeholders().contains_key(alias) && !freed_aliases.contains(alias))
        {
            return Err(EditError::NameConflict(alias.clone()));
        }
        seen.push(alias);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Page, Section};
    use crate::types::{ClosedWidget, Part, PlaceHolder, TextBlock, Widget};
    use core_types::Ident;

    fn div_abc_page() -> Page {
        let mut page = Page::template(Ident::new("demo", 1), "index");
        page.tree_mut("body")
            .unwrap()
            .insert_child(
                0,
                Node::Part(Part::new("div").with_children(vec![
                    Node::text("a"),
                    Node::text("b"),
                    Node::text("c"),
                ])),
            )
            .unwrap();
        page.reindex();
        page
    }

    fn loc(doc: &impl Document, text: &str) -> Location {
        doc.parse_location(text).unwrap()
    }

    fn texts(page: &Page, text: &str) -> Vec<String> {
        resolve(page, &loc(page, text))
            .unwrap()
            .children()
            .unwrap()
            .iter()
            .map(|n| n.brief().to_string())
            .collect()
    }

    #[test]
    fn inserting_at_a_part_makes_first_child() {
        let mut page = div_abc_page();
        let target = loc(&page, "body-0");
        let landed = insert_at(&mut page, &target, Node::text("new")).unwrap();
        assert_eq!(landed.to_string(), "body-0-0");
        assert_eq!(texts(&page, "body-0"), vec!["new", "a", "b", "c"]);
    }

    #[test]
    fn inserting_at_a_leaf_appends_after_it() {
        let mut page = div_abc_page();
        let target = loc(&page, "body-0-1");
        let landed = insert_at(
            &mut page,
            &target,
            Node::TextBlock(TextBlock::new("site.intro")),
        )
        .unwrap();
        assert_eq!(landed.to_string(), "body-0-2");
        assert_eq!(texts(&page, "body-0"), vec!["a", "b", "site.intro", "c"]);
    }

    #[test]
    fn inserting_at_the_tree_root_prepends() {
        let mut page = div_abc_page();
        let target = loc(&page, "body");
        let landed = insert_at(&mut page, &target, Node::text("top")).unwrap();
        assert_eq!(landed.to_string(), "body-0");
        assert_eq!(
            resolve(&page, &loc(&page, "body-0")),
            Ok(&Node::text("top"))
        );
    }

    #[test]
    fn inserting_at_a_widget_appends_after_it() {
        let mut page = div_abc_page();
        let target = loc(&page, "body-0");
        insert_at(
            &mut page,
            &target,
            Node::Widget(Widget::new("tabs", "tabs.Tabs", 2)),
        )
        .unwrap();
        let target = loc(&page, "body-0-0");
        let landed = insert_at(&mut page, &target, Node::text("after")).unwrap();
        assert_eq!(landed.to_string(), "body-0-1");
    }

    #[test]
    fn empty_container_gets_sole_occupant() {
        let mut page = div_abc_page();
        let target = loc(&page, "body");
        insert_at(
            &mut page,
            &target,
            Node::Widget(Widget::new("tabs", "tabs.Tabs", 2)),
        )
        .unwrap();
        let target = loc(&page, "tabs-1-0");
        let landed = insert_at(&mut page, &target, Node::text("one")).unwrap();
        assert_eq!(landed, Location::in_container("tabs", 1, vec![0]));
        let target = loc(&page, "tabs-1-0");
        let landed = insert_at(&mut page, &target, Node::text("two")).unwrap();
        assert_eq!(landed, Location::in_container("tabs", 1, vec![1]));
        let target = loc(&page, "tabs-1");
        let landed = insert_at(&mut page, &target, Node::text("zero")).unwrap();
        assert_eq!(landed, Location::in_container("tabs", 1, vec![0]));
        let names: Vec<_> = resolve(&page, &loc(&page, "body-0"))
            .unwrap()
            .container(1)
            .unwrap()
            .iter()
            .map(|n| n.brief().to_string())
            .collect();
        assert_eq!(names, vec!["zero", "one", "two"]);
    }

    #[test]
    fn insert_then_delete_restores_tree() {
        let original = div_abc_page();
        for (at, node) in [
            ("body-0", Node::text("x")),
            ("body-0-2", Node::Comment("c".to_string())),
            ("body", Node::HtmlSymbol("&nbsp;".to_string())),
        ] {
            let mut page = original.clone();
            let target = loc(&page, at);
            let landed = insert_at(&mut page, &target, node.clone()).unwrap();
            assert_eq!(delete_at(&mut page, &landed), Ok(node));
            assert_eq!(page, original);
        }
    }

    #[test]
    fn delete_rejects_roots_and_missing_items() {
        let mut page = div_abc_page();
        let target = loc(&page, "body");
        assert!(matches!(
            delete_at(&mut page, &target),
            Err(EditError::NotFound(_))
        ));
        let target = loc(&page, "body-0-3");
        assert!(matches!(
            delete_at(&mut page, &target),
            Err(EditError::NotFound(_))
        ));
        let target = loc(&page, "body-5-0");
        assert!(matches!(
            delete_at(&mut page, &target),
            Err(EditError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_widget_names_are_rejected() {
        let mut page = div_abc_page();
        let target = loc(&page, "body");
        insert_at(
            &mut page,
            &target,
            Node::ClosedWidget(ClosedWidget::new("link", "links.Link")),
        )
        .unwrap();
        let target = loc(&page, "body");
        let again = insert_at(
            &mut page,
            &target,
            Node::ClosedWidget(ClosedWidget::new("link", "links.Link")),
        );
        assert_eq!(again, Err(EditError::NameConflict("link".to_string())));
        let target = loc(&page, "body");
        let bad = insert_at(
            &mut page,
            &target,
            Node::ClosedWidget(ClosedWidget::new("my-link", "links.Link")),
        );
        assert_eq!(bad, Err(EditError::InvalidName("my-link".to_string())));
    }

    #[test]
    fn section_name_cannot_name_a_widget_inside_it() {
        let mut section = Section::new("footer").unwrap();
        let root = loc(&section, "footer");
        assert_eq!(
            insert_at(&mut section, &root, Node::Widget(Widget::new("footer", "tabs.Tabs", 1))),
            Err(EditError::NameConflict("footer".to_string()))
        );
        let nested = Node::Part(
            Part::new("div").with_children(vec![Node::ClosedWidget(ClosedWidget::new(
                "footer",
                "links.Link",
            ))]),
        );
        assert_eq!(
            insert_at(&mut section, &root, nested),
            Err(EditError::NameConflict("footer".to_string()))
        );
        assert_eq!(section.tree.child_count(), Ok(0));

        // Any other name keeps its containers addressable.
        insert_at(&mut section, &root, Node::Widget(Widget::new("tabs", "tabs.Tabs", 1))).unwrap();
        let inside = Location::in_container("tabs", 0, vec![0]);
        let parsed = section.parse_location(&inside.to_string()).unwrap();
        assert_eq!(parsed, inside);
        insert_at(&mut section, &parsed, Node::text("hi")).unwrap();
        assert_eq!(resolve(&section, &parsed).unwrap().brief(), "hi");

        // Pages have no such top key.
        let mut page = div_abc_page();
        let body = loc(&page, "body");
        insert_at(&mut page, &body, Node::Widget(Widget::new("footer", "tabs.Tabs", 1))).unwrap();
    }

    #[test]
    fn sections_refuse_placeholders_and_nesting() {
        let mut section = Section::new("footer").unwrap();
        let root = loc(&section, "footer");
        assert!(matches!(
            insert_at(
                &mut section,
                &root,
                Node::SectionPlaceHolder(PlaceHolder::new("nav", "navigation"))
            ),
            Err(EditError::NotAllowed(_))
        ));
        assert!(matches!(
            insert_at(&mut section, &root, Node::Section(Part::new("div"))),
            Err(EditError::NotAllowed(_))
        ));

        let mut page = div_abc_page();
        let target = loc(&page, "body");
        let landed = insert_at(
            &mut page,
            &target,
            Node::SectionPlaceHolder(PlaceHolder::new("nav", "navigation")),
        )
        .unwrap();
        assert_eq!(
            page.placeholders().get("nav").map(|info| &info.location),
            Some(&landed)
        );
    }

    #[test]
    fn replace_keeps_names_of_the_replaced_item() {
        let mut page = div_abc_page();
        let target = loc(&page, "body");
        insert_at(
            &mut page,
            &target,
            Node::ClosedWidget(ClosedWidget::new("link", "links.Link")),
        )
        .unwrap();
        let mut renamed = ClosedWidget::new("link", "links.Link");
        renamed.brief = "updated".to_string();
        let target = loc(&page, "body-0");
        let old = replace_at(&mut page, &target, Node::ClosedWidget(renamed)).unwrap();
        assert_eq!(old.brief(), "");
        assert_eq!(resolve(&page, &loc(&page, "body-0")).unwrap().brief(), "updated");
    }

    #[test]
    fn replace_root_requires_same_kind() {
        let mut page = div_abc_page();
        let body = loc(&page, "body");
        assert!(matches!(
            replace_at(&mut page, &body, Node::text("x")),
            Err(EditError::NotAllowed(_))
        ));
        let styled = Node::Part(Part::new("body").with_attrib("class", "w3-container"));
        replace_at(&mut page, &body, styled.clone()).unwrap();
        assert_eq!(resolve(&page, &body), Ok(&styled));
    }

    #[test]
    fn move_rejects_mismatched_scopes_and_self_nesting() {
        let mut page = div_abc_page();
        let from = loc(&page, "body-0-0");
        let to = loc(&page, "head-0");
        assert_eq!(
            move_location(&mut page, &from, &to),
            Err(EditError::CannotMove("locations are in different scopes"))
        );
        let from = loc(&page, "body-0");
        let to = loc(&page, "body-0-1");
        assert_eq!(
            move_location(&mut page, &from, &to),
            Err(EditError::CannotMove("an item cannot be moved inside itself"))
        );
    }

    #[test]
    fn move_to_arbitrary_location() {
        let mut page = div_abc_page();
        // Downward: c's slot is index 3 in pre-move coordinates.
        let from = loc(&page, "body-0-0");
        let to = loc(&page, "body-0-3");
        let landed =
            move_location(&mut page, &from, &to).unwrap();
        assert_eq!(landed.to_string(), "body-0-2");
        assert_eq!(texts(&page, "body-0"), vec!["b", "c", "a"]);
        // Upward: back to the front.
        let from = loc(&page, "body-0-2");
        let to = loc(&page, "body-0-0");
        let landed =
            move_location(&mut page, &from, &to).unwrap();
        assert_eq!(landed.to_string(), "body-0-0");
        assert_eq!(texts(&page, "body-0"), vec!["a", "b", "c"]);
        // Out of the div to the end of body.
        let from = loc(&page, "body-0-1");
        let to = loc(&page, "body-1");
        let landed =
            move_location(&mut page, &from, &to).unwrap();
        assert_eq!(landed.to_string(), "body-1");
        assert_eq!(texts(&page, "body-0"), vec!["a", "c"]);
    }

    #[test]
    fn shift_only_touches_later_siblings() {
        let removed = Location::in_tree("body", vec![1, 2]);
        assert_eq!(
            shift_for_removal(&Location::in_tree("body", vec![1, 4, 0]), &removed),
            Location::in_tree("body", vec![1, 3, 0])
        );
        assert_eq!(
            shift_for_removal(&Location::in_tree("body", vec![2]), &removed),
            Location::in_tree("body", vec![2])
        );
        assert_eq!(
            shift_for_removal(&Location::in_tree("body", vec![1, 1]), &removed),
            Location::in_tree("body", vec![1, 1])
        );
    }
}

//! Edits as the admin UI issues them: location strings in, new token out.

use crate::error::{EditTarget, ProjectError};
use crate::store::Project;
use core_types::ChangeToken;
use doctree::{
    Direction, Document, Location, Node, NodeKind, access::top_scope, delete_at, insert_at,
    move_in_direction, move_location, node_at_mut, replace_at, resolve,
};

/// What the editor shows about the item at a location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartInfo {
    pub project: String,
    pub page: Option<u32>,
    pub section: Option<String>,
    /// The widget at the location, or the widget owning the container.
    pub widget_name: Option<String>,
    pub location: Location,
    /// `None` when the location is a bare widget container.
    pub kind: Option<NodeKind>,
    pub brief: String,
}

impl Project {
    pub fn document(&self, target: &EditTarget) -> Result<&dyn Document, ProjectError> {
        match target {
            EditTarget::Page(num) => self
                .page(*num)
                .map(|page| page as &dyn Document)
                .ok_or(ProjectError::UnknownPage(*num)),
            EditTarget::Section(name) => self
                .section(name)
                .map(|section| section as &dyn Document)
                .ok_or_else(|| ProjectError::UnknownSection(name.clone())),
        }
    }

    pub fn part_info(&self, target: &EditTarget, location: &str) -> Result<PartInfo, ProjectError> {
        let doc = self.document(target)?;
        let location = doc.parse_location(location)?;
        let (widget_name, kind, brief) = match location.container {
            Some(container) if location.path.is_empty() => {
                top_scope(doc, &location, 0)?;
                (
                    Some(location.top_key.clone()),
                    None,
                    format!("container {container}"),
                )
            }
            _ => {
                let node = resolve(doc, &location)?;
                let widget_name = node
                    .widget_name()
                    .map(str::to_string)
                    .or_else(|| location.container.map(|_| location.top_key.clone()));
                (widget_name, Some(node.kind()), node.brief().to_string())
            }
        };
        let (page, section) = match target {
            EditTarget::Page(num) => (Some(*num), None),
            EditTarget::Section(name) => (None, Some(name.clone())),
        };
        Ok(PartInfo {
            project: self.name().to_string(),
            page,
            section,
            widget_name,
            location,
            kind,
            brief,
        })
    }

    /// Insert `node` relative to the selected item; returns where it landed.
    pub fn insert_node(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
        node: Node,
    ) -> Result<(Location, ChangeToken), ProjectError> {
        self.edit_document(target, held, |doc| {
            let loc = doc.parse_location(location)?;
            insert_at(doc, &loc, node)
        })
    }

    pub fn delete_node(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
    ) -> Result<(Node, ChangeToken), ProjectError> {
        self.edit_document(target, held, |doc| {
            let loc = doc.parse_location(location)?;
            delete_at(doc, &loc)
        })
    }

    pub fn replace_node(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
        node: Node,
    ) -> Result<(Node, ChangeToken), ProjectError> {
        self.edit_document(target, held, |doc| {
            let loc = doc.parse_location(location)?;
            replace_at(doc, &loc, node)
        })
    }

    /// Set the brief shown for the item in the tree view.
    pub fn set_brief(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
        brief: &str,
    ) -> Result<ChangeToken, ProjectError> {
        let ((), token) = self.edit_document(target, held, |doc| {
            let loc = doc.parse_location(location)?;
            match node_at_mut(doc, &loc)? {
                Node::Part(part) | Node::Section(part) => part.brief = brief.to_string(),
                Node::ClosedPart(part) => part.brief = brief.to_string(),
                Node::Widget(widget) => widget.brief = brief.to_string(),
                Node::ClosedWidget(widget) => widget.brief = brief.to_string(),
                Node::SectionPlaceHolder(holder) => holder.brief = brief.to_string(),
                _ => return Err(doctree::EditError::NotAllowed("item has no brief")),
            }
            Ok(())
        })?;
        Ok(token)
    }

    /// Drag and drop: move the item at `from` to `to`.
    pub fn move_node(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        from: &str,
        to: &str,
    ) -> Result<(Location, ChangeToken), ProjectError> {
        self.edit_document(target, held, |doc| {
            let from = doc.parse_location(from)?;
            let to = doc.parse_location(to)?;
            move_location(doc, &from, &to)
        })
    }

    /// One of the four arrow moves.
    pub fn move_item(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
        direction: Direction,
    ) -> Result<(Location, ChangeToken), ProjectError> {
        self.edit_document(target, held, |doc| {
            let loc = doc.parse_location(location)?;
            move_in_direction(doc, &loc, direction)
        })
    }

    pub fn move_up(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
    ) -> Result<(Location, ChangeToken), ProjectError> {
        self.move_item(target, held, location, Direction::Up)
    }

    pub fn move_down(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
    ) -> Result<(Location, ChangeToken), ProjectError> {
        self.move_item(target, held, location, Direction::Down)
    }

    pub fn move_up_right(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
    ) -> Result<(Location, ChangeToken), ProjectError> {
        self.move_item(target, held, location, Direction::UpRight)
    }

    pub fn move_down_right(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        location: &str,
    ) -> Result<(Location, ChangeToken), ProjectError> {
        self.move_item(target, held, location, Direction::DownRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::folder::ROOT_FOLDER;
    use core_types::Ident;
    use doctree::{ClosedWidget, Page, Part, Section, Widget};

    fn project() -> (Project, EditTarget, ChangeToken) {
        let mut proj = Project::new("demo", ProjectConfig::default()).unwrap();
        let num = proj.new_template_page(ROOT_FOLDER, "index").unwrap();
        let target = EditTarget::Page(num);
        let token = proj.token(&target).unwrap().clone();
        (proj, target, token)
    }

    #[test]
    fn each_edit_hands_out_the_next_token() {
        let (mut proj, page, token) = project();
        let (loc, token) = proj
            .insert_node(&page, &token, "body", Node::Part(Part::new("div")))
            .unwrap();
        assert_eq!(loc.to_string(), "body-0");
        let (loc, token) = proj.insert_node(&page, &token, "body-0", Node::text("a")).unwrap();
        assert_eq!(loc.to_string(), "body-0-0");
        let (_, token) = proj.insert_node(&page, &token, "body-0-0", Node::text("b")).unwrap();
        let (loc, token) = proj.move_up(&page, &token, "body-0-1").unwrap();
        assert_eq!(loc.to_string(), "body-0-0");
        assert_eq!(proj.part_info(&page, "body-0-0").unwrap().brief, "b");

        // The token from two edits ago no longer works.
        let (_, current) = proj.move_down(&page, &token, "body-0-0").unwrap();
        let err = proj.move_down(&page, &token, "body-0-0").unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(proj.token(&page).unwrap(), &current);
    }

    #[test]
    fn part_info_describes_widgets_and_containers() {
        let (mut proj, page, token) = project();
        let (_, token) = proj
            .insert_node(&page, &token, "body", Node::Widget(Widget::new("tabs", "tabs.Tabs", 2)))
            .unwrap();
        proj.insert_node(&page, &token, "tabs-1-0", Node::text("inside")).unwrap();

        let info = proj.part_info(&page, "body-0").unwrap();
        assert_eq!(info.widget_name.as_deref(), Some("tabs"));
        assert_eq!(info.kind, Some(NodeKind::Widget));
        assert_eq!(info.page, Some(1));

        let info = proj.part_info(&page, "tabs-1").unwrap();
        assert_eq!(info.kind, None);
        assert_eq!(info.brief, "container 1");

        let info = proj.part_info(&page, "tabs-1-0").unwrap();
        assert_eq!(info.widget_name.as_deref(), Some("tabs"));
        assert_eq!(info.kind, Some(NodeKind::Text));
        assert_eq!(info.brief, "inside");

        assert!(proj.part_info(&page, "tabs-5").is_err());
        assert!(matches!(
            proj.part_info(&page, "body-x"),
            Err(ProjectError::Edit(doctree::EditError::InvalidLocation { .. }))
        ));
    }

    #[test]
    fn section_edits_use_the_section_name_as_top_key() {
        let mut proj = Project::new("demo", ProjectConfig::default()).unwrap();
        proj.add_section(Section::new("footer").unwrap()).unwrap();
        let target = EditTarget::Section("footer".to_string());
        let token = proj.token(&target).unwrap().clone();
        let (loc, token) = proj
            .insert_node(&target, &token, "footer", Node::ClosedWidget(ClosedWidget::new("f", "links.Link")))
            .unwrap();
        assert_eq!(loc.to_string(), "footer-0");
        let token = proj.set_brief(&target, &token, "footer-0", "footer link").unwrap();
        let info = proj.part_info(&target, "footer-0").unwrap();
        assert_eq!(info.section.as_deref(), Some("footer"));
        assert_eq!(info.brief, "footer link");
        let (removed, _) = proj.delete_node(&target, &token, "footer-0").unwrap();
        assert_eq!(removed.widget_name(), Some("f"));
    }

    #[test]
    fn rejected_moves_keep_the_token() {
        let (mut proj, page, token) = project();
        let (_, token) = proj.insert_node(&page, &token, "body", Node::text("only")).unwrap();
        let err = proj.move_up_right(&page, &token, "body-0").unwrap_err();
        assert_eq!(err.user_message(), "Unable to move item");
        assert_eq!(proj.token(&page).unwrap(), &token);
        let err = proj.move_down_right(&page, &token, "body-0").unwrap_err();
        assert_eq!(err.user_message(), "Unable to move item");
    }

    #[test]
    fn replace_swaps_in_place() {
        let mut proj = Project::new("demo", ProjectConfig::default()).unwrap();
        let mut page = Page::template(Ident::new("demo", 3), "p");
        let body = page.parse_location("body").unwrap();
        insert_at(&mut page, &body, Node::text("old")).unwrap();
        proj.add_page(ROOT_FOLDER, page).unwrap();
        let target = EditTarget::Page(3);
        let token = proj.token(&target).unwrap().clone();
        let (old, _) = proj
            .replace_node(&target, &token, "body-0", Node::Comment("new".to_string()))
            .unwrap();
        assert_eq!(old, Node::text("old"));
        assert_eq!(proj.part_info(&target, "body-0").unwrap().kind, Some(NodeKind::Comment));
    }
}

//! Optimistic concurrency for tree edits.
//!
//! An edit starts from a deep copy of the stored page or section together
//! with the token it carried. Committing succeeds only while the stored token
//! is still the one the edit started from; the store then takes the copy and
//! a fresh token. A losing edit is discarded, never merged.

use crate::error::{EditTarget, ProjectError};
use crate::store::Project;
use core_types::ChangeToken;
use doctree::{Document, EditError, Page, Section};

impl Project {
    pub fn begin_page_edit(&self, num: u32) -> Result<(Page, ChangeToken), ProjectError> {
        let page = self.pages.get(&num).ok_or(ProjectError::UnknownPage(num))?;
        Ok((page.clone(), page.pchange.clone()))
    }

    pub fn begin_section_edit(&self, name: &str) -> Result<(Section, ChangeToken), ProjectError> {
        let section = self
            .sections
            .get(name)
            .ok_or_else(|| ProjectError::UnknownSection(name.to_string()))?;
        Ok((section.clone(), section.schange.clone()))
    }

    /// Store `page` if `held` is still the page's token; returns the new token.
    pub fn commit_page(
        &mut self,
        mut page: Page,
        held: &ChangeToken,
    ) -> Result<ChangeToken, ProjectError> {
        let num = page.ident.num;
        let target = EditTarget::Page(num);
        let stored = self.pages.get(&num).ok_or(ProjectError::UnknownPage(num))?;
        check_token(&target, &stored.pchange, held)?;
        if stored.name != page.name {
            self.folders.rename_page(num, &page.name)?;
        }
        page.reindex();
        page.pchange = ChangeToken::generate();
        let token = page.pchange.clone();
        log::debug!(
            target: "project.guard",
            "committed {target}: {} -> {}",
            held.short(),
            token.short()
        );
        self.pages.insert(num, page);
        Ok(token)
    }

    pub fn commit_section(
        &mut self,
        mut section: Section,
        held: &ChangeToken,
    ) -> Result<ChangeToken, ProjectError> {
        let target = EditTarget::Section(section.name.clone());
        let stored = self
            .sections
            .get(&section.name)
            .ok_or_else(|| ProjectError::UnknownSection(section.name.clone()))?;
        check_token(&target, &stored.schange, held)?;
        section.reindex();
        section.schange = ChangeToken::generate();
        let token = section.schange.clone();
        log::debug!(
            target: "project.guard",
            "committed {target}: {} -> {}",
            held.short(),
            token.short()
        );
        self.sections.insert(section.name.clone(), section);
        Ok(token)
    }

    /// Copy, apply `edit`, then commit under `held`.
    ///
    /// On any failure the copy is dropped and the store is unchanged.
    pub fn edit_page<T>(
        &mut self,
        num: u32,
        held: &ChangeToken,
        edit: impl FnOnce(&mut Page) -> Result<T, EditError>,
    ) -> Result<(T, ChangeToken), ProjectError> {
        let (mut page, _) = self.begin_page_edit(num)?;
        let out = edit(&mut page)?;
        let token = self.commit_page(page, held)?;
        Ok((out, token))
    }

    pub fn edit_section<T>(
        &mut self,
        name: &str,
        held: &ChangeToken,
        edit: impl FnOnce(&mut Section) -> Result<T, EditError>,
    ) -> Result<(T, ChangeToken), ProjectError> {
        let (mut section, _) = self.begin_section_edit(name)?;
        let out = edit(&mut section)?;
        let token = self.commit_section(section, held)?;
        Ok((out, token))
    }

    /// Apply `edit` to whichever document `target` names.
    pub fn edit_document<T>(
        &mut self,
        target: &EditTarget,
        held: &ChangeToken,
        edit: impl FnOnce(&mut dyn Document) -> Result<T, EditError>,
    ) -> Result<(T, ChangeToken), ProjectError> {
        match target {
            EditTarget::Page(num) => self.edit_page(*num, held, |page| edit(page)),
            EditTarget::Section(name) => self.edit_section(name, held, |section| edit(section)),
        }
    }

    /// Current token of `target`.
    pub fn token(&self, target: &EditTarget) -> Result<&ChangeToken, ProjectError> {
        match target {
            EditTarget::Page(num) => self
                .pages
                .get(num)
                .map(|page| &page.pchange)
                .ok_or(ProjectError::UnknownPage(*num)),
            EditTarget::Section(name) => self
                .sections
                .get(name)
                .map(|section| &section.schange)
                .ok_or_else(|| ProjectError::UnknownSection(name.clone())),
        }
    }
}

fn check_token(
    target: &EditTarget,
    stored: &ChangeToken,
    held: &ChangeToken,
) -> Result<(), ProjectError> {
    if stored == held {
        return Ok(());
    }
    log::warn!(
        target: "project.guard",
        "rejected edit of {target}: held token {} but stored {}",
        held.short(),
        stored.short()
    );
    Err(ProjectError::ConcurrentModification {
        target: target.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::folder::ROOT_FOLDER;
    use doctree::{Node, insert_at};

    fn project() -> (Project, u32) {
        let mut proj = Project::new("demo", ProjectConfig::default()).unwrap();
        let num = proj.new_template_page(ROOT_FOLDER, "index").unwrap();
        (proj, num)
    }

    #[test]
    fn commit_issues_a_fresh_token() {
        let (mut proj, num) = project();
        let (mut page, token) = proj.begin_page_edit(num).unwrap();
        let body = page.parse_location("body").unwrap();
        insert_at(&mut page, &body, Node::text("hi")).unwrap();
        let next = proj.commit_page(page, &token).unwrap();
        assert_ne!(next, token);
        assert_eq!(proj.page(num).unwrap().pchange, next);
        assert_eq!(next.as_str().len(), 32);
    }

    #[test]
    fn stale_token_is_rejected_and_store_kept() {
        let (mut proj, num) = project();
        let (first, token) = proj.begin_page_edit(num).unwrap();
        let (second, _) = proj.begin_page_edit(num).unwrap();
        proj.commit_page(second, &token).unwrap();
        let before = proj.page(num).unwrap().clone();
        let err = proj.commit_page(first, &token).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(proj.page(num).unwrap(), &before);
    }

    #[test]
    fn failed_edit_leaves_store_untouched() {
        let (mut proj, num) = project();
        let token = proj.page(num).unwrap().pchange.clone();
        let before = proj.page(num).unwrap().clone();
        let err = proj
            .edit_page(num, &token, |page| {
                let body = page.parse_location("body")?;
                insert_at(page, &body, Node::text("partial"))?;
                let missing = page.parse_location("body-9")?;
                doctree::delete_at(page, &missing)
            })
            .unwrap_err();
        assert!(matches!(err, ProjectError::Edit(EditError::NotFound(_))));
        assert_eq!(proj.page(num).unwrap(), &before);
    }

    #[test]
    fn renaming_a_page_updates_its_folder_entry() {
        let (mut proj, num) = project();
        let token = proj.page(num).unwrap().pchange.clone();
        proj.edit_page(num, &token, |page| {
            page.name = "home".to_string();
            Ok(())
        })
        .unwrap();
        assert_eq!(proj.page_path(num).as_deref(), Some("/home"));
    }
}

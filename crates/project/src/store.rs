//! The project store: every page and section of one project, plus folders.
//!
//! The store is only changed through its own methods; tree edits go through
//! the guard in [`crate::guard`].

use crate::config::ProjectConfig;
use crate::error::ProjectError;
use crate::folder::FolderTree;
use core_types::Ident;
use doctree::{EditError, Page, Section, validate_name};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct Project {
    name: String,
    config: ProjectConfig,
    pub(crate) folders: FolderTree,
    pub(crate) pages: BTreeMap<u32, Page>,
    pub(crate) sections: BTreeMap<String, Section>,
}

impl Project {
    pub fn new(name: impl Into<String>, config: ProjectConfig) -> Result<Self, ProjectError> {
        let name = name.into();
        if name.is_empty() || name.contains('/') || name.contains(char::is_whitespace) {
            return Err(EditError::InvalidName(name).into());
        }
        Ok(Self {
            name,
            config,
            folders: FolderTree::new(),
            pages: BTreeMap::new(),
            sections: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn folders(&self) -> &FolderTree {
        &self.folders
    }

    pub fn page(&self, num: u32) -> Option<&Page> {
        self.pages.get(&num)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn page_path(&self, num: u32) -> Option<String> {
        self.pages.get(&num).and(self.folders.path(num))
    }

    pub fn add_folder(
        &mut self,
        parent: u32,
        name: &str,
        number: Option<u32>,
    ) -> Result<u32, ProjectError> {
        let number = self.folders.add_folder(parent, name, number)?;
        log::debug!(target: "project.store", "added folder {number} {name:?}");
        Ok(number)
    }

    /// Add `page` to `folder`. Its ident must belong to this project and be
    /// unused; its name must be free within the folder.
    pub fn add_page(&mut self, folder: u32, page: Page) -> Result<u32, ProjectError> {
        if !page.ident.is_in(&self.name) {
            return Err(ProjectError::UnknownPage(page.ident.num));
        }
        let num = page.ident.num;
        self.folders.add_page(folder, &page.name, num)?;
        log::debug!(target: "project.store", "added page {} at {:?}", page.ident, self.folders.path(num));
        self.pages.insert(num, page);
        Ok(num)
    }

    /// A new empty template page with the next free number.
    pub fn new_template_page(&mut self, folder: u32, name: &str) -> Result<u32, ProjectError> {
        let page = Page::template(Ident::new(self.name.as_str(), self.folders.next_number()), name);
        self.add_page(folder, page)
    }

    pub fn delete_page(&mut self, num: u32) -> Result<Page, ProjectError> {
        let page = self.pages.remove(&num).ok_or(ProjectError::UnknownPage(num))?;
        self.folders.remove_page(num);
        log::debug!(target: "project.store", "deleted page {}", page.ident);
        Ok(page)
    }

    pub fn add_section(&mut self, section: Section) -> Result<(), ProjectError> {
        validate_name(&section.name)?;
        if self.sections.contains_key(&section.name) {
            return Err(ProjectError::DuplicateSection(section.name));
        }
        log::debug!(target: "project.store", "added section {}", section.name);
        self.sections.insert(section.name.clone(), section);
        Ok(())
    }

    pub fn delete_section(&mut self, name: &str) -> Result<Section, ProjectError> {
        let section = self
            .sections
            .remove(name)
            .ok_or_else(|| ProjectError::UnknownSection(name.to_string()))?;
        log::debug!(target: "project.store", "deleted section {name}");
        Ok(section)
    }

    /// Pages holding a placeholder for section `name`.
    pub fn pages_using_section(&self, name: &str) -> Vec<u32> {
        use doctree::Document;
        self.pages
            .iter()
            .filter(|(_, page)| page.placeholders().values().any(|p| p.section_name == name))
            .map(|(num, _)| *num)
            .collect()
    }
}

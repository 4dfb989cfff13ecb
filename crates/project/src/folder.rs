//! The folder hierarchy pages are served from.
//!
//! Folders and pages share one number space. Folder 0 is the root.

use crate::error::ProjectError;
use doctree::EditError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ROOT_FOLDER: u32 = 0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    /// `None` only for the root.
    pub parent: Option<u32>,
    #[serde(default)]
    pub brief: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub name: String,
    pub parent: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTree {
    folders: BTreeMap<u32, FolderEntry>,
    pages: BTreeMap<u32, PageEntry>,
}

impl Default for FolderTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderTree {
    pub fn new() -> Self {
        let mut folders = BTreeMap::new();
        folders.insert(
            ROOT_FOLDER,
            FolderEntry {
                name: String::new(),
                parent: None,
                brief: "root folder".to_string(),
            },
        );
        Self {
            folders,
            pages: BTreeMap::new(),
        }
    }

    pub fn folder(&self, number: u32) -> Option<&FolderEntry> {
        self.folders.get(&number)
    }

    pub fn page(&self, number: u32) -> Option<&PageEntry> {
        self.pages.get(&number)
    }

    pub fn is_used(&self, number: u32) -> bool {
        self.folders.contains_key(&number) || self.pages.contains_key(&number)
    }

    pub fn next_number(&self) -> u32 {
        let folders = self.folders.keys().next_back().copied().unwrap_or(ROOT_FOLDER);
        let pages = self.pages.keys().next_back().copied().unwrap_or(ROOT_FOLDER);
        folders.max(pages) + 1
    }

    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    /// Pages directly inside `folder`, by number.
    pub fn pages_in(&self, folder: u32) -> impl Iterator<Item = (u32, &PageEntry)> {
        self.pages
            .iter()
            .filter(move |(_, entry)| entry.parent == folder)
            .map(|(num, entry)| (*num, entry))
    }

    fn name_taken(&self, parent: u32, name: &str) -> bool {
        self.folders
            .values()
            .any(|f| f.parent == Some(parent) && f.name == name)
            || self.pages.values().any(|p| p.parent == parent && p.name == name)
    }

    fn check_new(&self, parent: u32, name: &str, number: u32) -> Result<(), ProjectError> {
        if !self.folders.contains_key(&parent) {
            return Err(ProjectError::UnknownFolder(parent));
        }
        if name.is_empty() || name.contains('/') {
            return Err(EditError::InvalidName(name.to_string()).into());
        }
        if self.is_used(number) {
            return Err(ProjectError::DuplicatePage(number.to_string()));
        }
        if self.name_taken(parent, name) {
            return Err(ProjectError::DuplicatePage(name.to_string()));
        }
        Ok(())
    }

    pub fn add_folder(
        &mut self,
        parent: u32,
        name: &str,
        number: Option<u32>,
    ) -> Result<u32, ProjectError> {
        let number = number.unwrap_or_else(|| self.next_number());
        self.check_new(parent, name, number)?;
        self.folders.insert(
            number,
            FolderEntry {
                name: name.to_string(),
                parent: Some(parent),
                brief: String::new(),
            },
        );
        Ok(number)
    }

    pub(crate) fn add_page(&mut self, parent: u32, name: &str, number: u32) -> Result<(), ProjectError> {
        self.check_new(parent, name, number)?;
        self.pages.insert(
            number,
            PageEntry {
                name: name.to_string(),
                parent,
            },
        );
        Ok(())
    }

    pub(crate) fn rename_page(&mut self, number: u32, name: &str) -> Result<(), ProjectError> {
        let entry = self.pages.get(&number).ok_or(ProjectError::UnknownPage(number))?;
        if entry.name == name {
            return Ok(());
        }
        let parent = entry.parent;
        if name.is_empty() || name.contains('/') {
            return Err(EditError::InvalidName(name.to_string()).into());
        }
        if self.name_taken(parent, name) {
            return Err(ProjectError::DuplicatePage(name.to_string()));
        }
        if let Some(entry) = self.pages.get_mut(&number) {
            entry.name = name.to_string();
        }
        Ok(())
    }

    pub(crate) fn remove_page(&mut self, number: u32) -> Option<PageEntry> {
        self.pages.remove(&number)
    }

    /// Served path of a page or folder; folders end with `/`.
    pub fn path(&self, number: u32) -> Option<String> {
        let (mut name, mut parent, is_folder) = match self.pages.get(&number) {
            Some(page) => (page.name.as_str(), Some(page.parent), false),
            None => {
                let folder = self.folders.get(&number)?;
                (folder.name.as_str(), folder.parent, true)
            }
        };
        let mut parts = Vec::new();
        // Bounded so a corrupt parent chain cannot loop.
        for _ in 0..=self.folders.len() {
            parts.push(name);
            let Some(up) = parent else {
                break;
            };
            let folder = self.folders.get(&up)?;
            name = folder.name.as_str();
            parent = folder.parent;
        }
        if parent.is_some() {
            return None;
        }
        parts.reverse();
        let mut path = parts.join("/");
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        if is_folder && !path.ends_with('/') {
            path.push('/');
        }
        Some(path)
    }

    /// Check a tree read from disk: a single root and every parent present.
    pub(crate) fn validate(&self) -> Result<(), ProjectError> {
        let root = self.folders.get(&ROOT_FOLDER).ok_or(ProjectError::UnknownFolder(ROOT_FOLDER))?;
        if root.parent.is_some() {
            return Err(ProjectError::UnknownFolder(ROOT_FOLDER));
        }
        for (num, folder) in &self.folders {
            if *num != ROOT_FOLDER && self.path(*num).is_none() {
                return Err(ProjectError::UnknownFolder(folder.parent.unwrap_or(*num)));
            }
        }
        for (num, page) in &self.pages {
            if self.folders.contains_key(num) {
                return Err(ProjectError::DuplicatePage(num.to_string()));
            }
            if !self.folders.contains_key(&page.parent) {
                return Err(ProjectError::UnknownFolder(page.parent));
            }
        }
        Ok(())
    }
}

//! Page and section files: download, upload, and whole-project save/load.
//!
//! A saved project directory holds `project.toml`, `folders.json`, one
//! `pages/<number>.json` per page and one `sections/<name>.json` per section.

use crate::config::ProjectConfig;
use crate::error::{EditTarget, ProjectError};
use crate::folder::ROOT_FOLDER;
use crate::store::Project;
use core_types::Ident;
use doctree::{
    FileHeader, SerializeError, page_from_value, page_to_value, section_from_value,
    section_to_value,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const FOLDERS_FILE: &str = "folders.json";
const PAGES_DIR: &str = "pages";
const SECTIONS_DIR: &str = "sections";

fn to_bytes(value: &Value) -> Result<Vec<u8>, ProjectError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(SerializeError::from)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn from_bytes(bytes: &[u8]) -> Result<Value, ProjectError> {
    Ok(serde_json::from_slice(bytes).map_err(SerializeError::from)?)
}

impl Project {
    /// The downloadable file for page `num`.
    pub fn dump_page(&self, num: u32) -> Result<Vec<u8>, ProjectError> {
        let page = self.page(num).ok_or(ProjectError::UnknownPage(num))?;
        to_bytes(&page_to_value(page, &self.config().header()))
    }

    pub fn dump_section(&self, name: &str) -> Result<Vec<u8>, ProjectError> {
        let section = self
            .section(name)
            .ok_or_else(|| ProjectError::UnknownSection(name.to_string()))?;
        to_bytes(&section_to_value(section, &self.config().header()))
    }

    fn check_header(&self, header: &FileHeader) -> Result<(), ProjectError> {
        if self.config().accepts(&header.skipole) {
            return Ok(());
        }
        log::warn!(
            target: "project.dump",
            "refused upload written by skipole {}",
            header.skipole
        );
        Err(ProjectError::HeaderMismatch {
            found: header.skipole.clone(),
            expected: self.config().skipole_version.clone(),
        })
    }

    /// Recreate a downloaded page as `name` in `folder`, numbered `number`
    /// or the next free number. Returns the page number.
    pub fn upload_page(
        &mut self,
        bytes: &[u8],
        folder: u32,
        name: &str,
        number: Option<u32>,
    ) -> Result<u32, ProjectError> {
        let (header, mut page) = page_from_value(&from_bytes(bytes)?, self.name())?;
        self.check_header(&header)?;
        let num = number.unwrap_or_else(|| self.folders().next_number());
        page.ident = Ident::new(self.name(), num);
        page.name = name.to_string();
        self.add_page(folder, page)?;
        log::debug!(target: "project.dump", "uploaded page {num} as {name:?}");
        Ok(num)
    }

    /// Recreate a downloaded section, optionally under a new name.
    pub fn upload_section(&mut self, bytes: &[u8], name: Option<&str>) -> Result<String, ProjectError> {
        let (header, section) = section_from_value(&from_bytes(bytes)?, name)?;
        self.check_header(&header)?;
        let name = section.name.clone();
        self.add_section(section)?;
        log::debug!(target: "project.dump", "uploaded section {name:?}");
        Ok(name)
    }

    /// Add a page or section file as it stands, keeping its number or name.
    ///
    /// Page files are told apart by their `ident` key.
    pub fn upload_document(&mut self, bytes: &[u8]) -> Result<EditTarget, ProjectError> {
        let value = from_bytes(bytes)?;
        if value.get("ident").is_none() {
            let name = self.upload_section(bytes, None)?;
            return Ok(EditTarget::Section(name));
        }
        let (header, mut page) = page_from_value(&value, self.name())?;
        self.check_header(&header)?;
        let num = page.ident.num;
        page.ident = Ident::new(self.name(), num);
        self.add_page(ROOT_FOLDER, page)?;
        Ok(EditTarget::Page(num))
    }

    pub fn dump_document(&self, target: &EditTarget) -> Result<Vec<u8>, ProjectError> {
        match target {
            EditTarget::Page(num) => self.dump_page(*num),
            EditTarget::Section(name) => self.dump_section(name),
        }
    }

    /// Write the whole project under `dir`, replacing earlier page and
    /// section files.
    ///
    /// Every file is first written beside its destination and only renamed
    /// into place once all of them were written, so a failed save leaves the
    /// previous one readable.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), ProjectError> {
        let pages_dir = dir.join(PAGES_DIR);
        let sections_dir = dir.join(SECTIONS_DIR);
        fs::create_dir_all(&pages_dir)?;
        fs::create_dir_all(&sections_dir)?;

        let folders = serde_json::to_value(self.folders()).map_err(SerializeError::from)?;
        let mut files = vec![
            (
                ProjectConfig::config_path(dir),
                self.config().to_toml_string()?.into_bytes(),
            ),
            (dir.join(FOLDERS_FILE), to_bytes(&folders)?),
        ];
        for num in self.page_numbers() {
            files.push((pages_dir.join(format!("{num}.json")), self.dump_page(num)?));
        }
        for name in self.section_names() {
            files.push((sections_dir.join(format!("{name}.json")), self.dump_section(name)?));
        }

        let mut staged = Vec::with_capacity(files.len());
        for (path, bytes) in &files {
            let tmp = staging_path(path);
            if let Err(err) = fs::write(&tmp, bytes) {
                discard(&staged);
                log::warn!(target: "project.dump", "save to {} failed: {err}", dir.display());
                return Err(err.into());
            }
            staged.push(tmp);
        }
        for (tmp, (path, _)) in staged.iter().zip(&files) {
            fs::rename(tmp, path)?;
        }

        for sub in [&pages_dir, &sections_dir] {
            for stale in json_files(sub)? {
                if !files.iter().any(|(path, _)| *path == stale) {
                    fs::remove_file(&stale)?;
                }
            }
        }
        log::debug!(target: "project.dump", "saved project {} to {}", self.name(), dir.display());
        Ok(())
    }

    /// Read a project written by [`Project::save_to_dir`].
    pub fn load_from_dir(dir: &Path, name: &str) -> Result<Project, ProjectError> {
        let config = ProjectConfig::load(dir)?;
        let mut project = Project::new(name, config)?;

        let folders_value = from_bytes(&fs::read(dir.join(FOLDERS_FILE))?)?;
        let folders: crate::folder::FolderTree =
            serde_json::from_value(folders_value).map_err(SerializeError::from)?;
        folders.validate()?;

        for path in json_files(&dir.join(SECTIONS_DIR))? {
            let (_, section) = section_from_value(&from_bytes(&fs::read(&path)?)?, None)?;
            project.add_section(section)?;
        }
        let mut pages = Vec::new();
        for path in json_files(&dir.join(PAGES_DIR))? {
            let (_, mut page) = page_from_value(&from_bytes(&fs::read(&path)?)?, name)?;
            let entry = folders
                .page(page.ident.num)
                .ok_or(ProjectError::UnknownPage(page.ident.num))?;
            // The folder tree is authoritative for served names.
            page.name.clone_from(&entry.name);
            pages.push(page);
        }
        project.folders = folders;
        for page in pages {
            if !page.ident.is_in(name) {
                return Err(ProjectError::UnknownPage(page.ident.num));
            }
            project.pages.insert(page.ident.num, page);
        }
        if let Some(num) = project
            .folders
            .page_numbers()
            .find(|num| !project.pages.contains_key(num))
        {
            return Err(ProjectError::UnknownPage(num));
        }
        log::debug!(
            target: "project.dump",
            "loaded project {name} with {} pages and {} sections",
            project.pages.len(),
            project.sections.len()
        );
        Ok(project)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    PathBuf::from(staged)
}

fn discard(staged: &[PathBuf]) {
    for tmp in staged {
        let _ = fs::remove_file(tmp);
    }
}

/// `*.json` files in `dir`, sorted by name; none if `dir` is missing.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

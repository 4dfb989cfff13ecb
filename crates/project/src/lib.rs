//! Project store for Skipole pages and sections.
//!
//! Edits copy a page or section out of the store, change the copy with the
//! `doctree` operations, and commit it back under the change token the copy
//! was taken with.

pub mod config;
pub mod folder;

mod dump;
mod edit;
mod error;
mod guard;
mod store;

pub use crate::config::ProjectConfig;
pub use crate::edit::PartInfo;
pub use crate::error::{EditTarget, ProjectError};
pub use crate::folder::{FolderTree, ROOT_FOLDER};
pub use crate::store::Project;

use doctree::{EditError, SerializeError};
use std::fmt;
use thiserror::Error;

/// What a change token guards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Page(u32),
    Section(String),
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::Page(num) => write!(f, "page {num}"),
            EditTarget::Section(name) => write!(f, "section {name}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error("{target} changed since this edit began")]
    ConcurrentModification { target: EditTarget },
    #[error("no page {0}")]
    UnknownPage(u32),
    #[error("no section {0:?}")]
    UnknownSection(String),
    #[error("no folder {0}")]
    UnknownFolder(u32),
    #[error("section {0:?} already exists")]
    DuplicateSection(String),
    #[error("page or folder {0} already exists")]
    DuplicatePage(String),
    #[error("file written by skipole {found}, this is {expected}")]
    HeaderMismatch { found: String, expected: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid project config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("cannot write project config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl ProjectError {
    /// Message for the person using the editor. Internal detail is withheld
    /// for invariant failures.
    pub fn user_message(&self) -> String {
        match self {
            ProjectError::Edit(err) => match err {
                EditError::InvalidLocation { .. } => "Invalid location".to_string(),
                EditError::NotFound(_) => "Item not found".to_string(),
                EditError::NotContainer | EditError::IndexOutOfRange { .. } => {
                    "Item not recognised".to_string()
                }
                EditError::CannotMove(_) => "Unable to move item".to_string(),
                EditError::NameConflict(name) => format!("The name {name} is already in use"),
                EditError::InvalidName(name) => format!("Invalid name {name}"),
                EditError::NotAllowed(reason) => format!("Not allowed: {reason}"),
            },
            ProjectError::ConcurrentModification { .. } => {
                "Someone else may be editing this project".to_string()
            }
            ProjectError::Serialize(_) => "Unable to read the uploaded file".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ProjectError::ConcurrentModification { .. })
    }
}

use thiserror::Error;

/// Failures raised while resolving or mutating a document tree.
///
/// Every variant is recoverable: callers discard their working copy and
/// report the failure, the stored tree is never touched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("invalid location {text:?}: {reason}")]
    InvalidLocation { text: String, reason: &'static str },
    #[error("no item at location {0}")]
    NotFound(String),
    #[error("item cannot contain children")]
    NotContainer,
    #[error("index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot move item: {0}")]
    CannotMove(&'static str),
    #[error("name {0:?} is already in use")]
    NameConflict(String),
    #[error("invalid name {0:?}")]
    InvalidName(String),
    #[error("not allowed: {0}")]
    NotAllowed(&'static str),
}

/// Failures raised while decoding the ordered JSON representation.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("malformed data at {path}: {detail}")]
    Malformed { path: String, detail: String },
    #[error("unknown item kind {tag:?} at {path}")]
    UnknownKind { tag: String, path: String },
    #[error(transparent)]
    Edit(#[from] EditError),
}

impl SerializeError {
    pub(crate) fn malformed(path: &str, detail: impl Into<String>) -> Self {
        SerializeError::Malformed {
            path: path.to_string(),
            detail: detail.into(),
        }
    }
}

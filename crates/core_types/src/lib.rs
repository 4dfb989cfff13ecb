//! Small identity types shared by the tree engine and the project store.

use std::fmt;

/// Identifies a page or folder: the owning project plus a project-unique number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident {
    pub project: String,
    pub num: u32,
}

impl Ident {
    pub fn new(project: impl Into<String>, num: u32) -> Self {
        Self {
            project: project.into(),
            num,
        }
    }

    /// Parse the `project_num` string form.
    ///
    /// The number is taken from the last `_`, so project names may themselves
    /// contain underscores.
    pub fn parse(text: &str) -> Option<Self> {
        let (project, num) = text.rsplit_once('_')?;
        if project.is_empty() || num.is_empty() || !num.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self::new(project, num.parse().ok()?))
    }

    pub fn is_in(&self, project: &str) -> bool {
        self.project == project
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.project, self.num)
    }
}

/// Opaque change token guarding a page (`pchange`) or section (`schange`).
///
/// Only ever compared for equality. Fresh tokens are 32 lowercase hex digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChangeToken(String);

impl ChangeToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Wrap a token received from a client.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(8);
        self.0.get(..end).unwrap_or(&self.0)
    }
}

impl fmt::Display for ChangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

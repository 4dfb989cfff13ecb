//! Location addressing for document trees.
//!
//! A location is `(top_key, container, path)`:
//! - `top_key` names a page tree (`head`, `body`, `svg`), the section being
//!   edited, or a widget whose containers are being addressed.
//! - `container` is only present for widget addressing.
//! - `path` is a sequence of zero-based child indices; empty means the root
//!   (or, with a container, the container itself).
//!
//! The string form joins the parts with `-`: `body-3-0-2`, `mywidget-0-1`,
//! `mysection-4`. Names therefore never contain `-`.
//!
//! Paths are positional and are not stable across mutations; callers must
//! re-resolve after every edit.

use crate::error::EditError;
use std::fmt;
use std::str::FromStr;

/// Top keys addressing the trees owned by a page.
pub const PAGE_TREES: [&str; 3] = ["head", "body", "svg"];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub top_key: String,
    pub container: Option<usize>,
    pub path: Vec<usize>,
}

impl Location {
    /// Location inside a page or section tree.
    pub fn in_tree(top_key: impl Into<String>, path: Vec<usize>) -> Self {
        Self {
            top_key: top_key.into(),
            container: None,
            path,
        }
    }

    /// Location inside one of a widget's containers.
    pub fn in_container(
        widget: impl Into<String>,
        container: usize,
        path: Vec<usize>,
    ) -> Self {
        Self {
            top_key: widget.into(),
            container: Some(container),
            path,
        }
    }

    /// Parse the hyphen-joined form.
    ///
    /// `section_name` is the name of the section being edited, if any. When
    /// the top key is a page tree or that section, every following segment
    /// belongs to the path; otherwise the top key is a widget name and the
    /// first following segment is the container number.
    pub fn parse(text: &str, section_name: Option<&str>) -> Result<Self, EditError> {
        let invalid = |reason| EditError::InvalidLocation {
            text: text.to_string(),
            reason,
        };
        let mut segments = text.split('-');
        let top_key = segments.next().unwrap_or_default();
        if top_key.is_empty() {
            return Err(invalid("missing top key"));
        }
        let mut numbers = Vec::new();
        for segment in segments {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("path segments must be non-negative integers"));
            }
            let number = segment
                .parse::<usize>()
                .map_err(|_| invalid("path segment too large"))?;
            numbers.push(number);
        }

        let is_tree = PAGE_TREES.contains(&top_key) || section_name == Some(top_key);
        if is_tree || numbers.is_empty() {
            return Ok(Self::in_tree(top_key, numbers));
        }
        let container = numbers.remove(0);
        Ok(Self::in_container(top_key, container, numbers))
    }

    /// True for the bare root of a page or section tree.
    pub fn is_tree_root(&self) -> bool {
        self.container.is_none() && self.path.is_empty()
    }

    /// Same top key and container, so only the paths can differ.
    pub fn same_scope(&self, other: &Location) -> bool {
        self.top_key == other.top_key && self.container == other.container
    }

    pub fn last_index(&self) -> Option<usize> {
        self.path.last().copied()
    }

    /// Location one level up, or `None` at a root.
    pub fn parent(&self) -> Option<Location> {
        let (_, parent_path) = self.path.split_last()?;
        Some(Location {
            top_key: self.top_key.clone(),
            container: self.container,
            path: parent_path.to_vec(),
        })
    }

    pub fn child(&self, index: usize) -> Location {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(index);
        Location {
            top_key: self.top_key.clone(),
            container: self.container,
            path,
        }
    }

    /// Same location with the last path index replaced.
    pub fn with_last_index(&self, index: usize) -> Option<Location> {
        let mut loc = self.clone();
        *loc.path.last_mut()? = index;
        Some(loc)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.top_key)?;
        if let Some(container) = self.container {
            write!(f, "-{container}")?;
        }
        for index in &self.path {
            write!(f, "-{index}")?;
        }
        Ok(())
    }
}

/// Parses in page context (no section name).
impl FromStr for Location {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::parse(s, None)
    }
}

/// Check a widget, placeholder or section name.
///
/// Names appear as location top keys, so they must be non-empty, free of
/// `-` and distinct from the page tree keys.
pub fn validate_name(name: &str) -> Result<(), EditError> {
    if name.is_empty()
        || name.contains('-')
        || name.chars().any(char::is_whitespace)
        || PAGE_TREES.contains(&name)
    {
        return Err(EditError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_tree_locations() {
        let loc = Location::parse("body-3-0-2", None).unwrap();
        assert_eq!(loc, Location::in_tree("body", vec![3, 0, 2]));
        assert_eq!(loc.to_string(), "body-3-0-2");

        assert_eq!(
            Location::parse("head", None).unwrap(),
            Location::in_tree("head", vec![])
        );
        assert_eq!(
            Location::parse("svg-0", None).unwrap(),
            Location::in_tree("svg", vec![0])
        );
    }

    #[test]
    fn section_name_suppresses_container() {
        let loc = Location::parse("mysection-4", Some("mysection")).unwrap();
        assert_eq!(loc, Location::in_tree("mysection", vec![4]));
        // The same text outside that section names a widget container.
        let loc = Location::parse("mysection-4", None).unwrap();
        assert_eq!(loc, Location::in_container("mysection", 4, vec![]));
    }

    #[test]
    fn widget_locations_take_a_container() {
        let loc = Location::parse("mywidget-0-1", None).unwrap();
        assert_eq!(loc, Location::in_container("mywidget", 0, vec![1]));
        assert_eq!(loc.to_string(), "mywidget-0-1");

        let loc = Location::parse("mywidget-2", Some("other")).unwrap();
        assert_eq!(loc, Location::in_container("mywidget", 2, vec![]));

        let loc = Location::parse("mywidget", None).unwrap();
        assert_eq!(loc, Location::in_tree("mywidget", vec![]));
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "-1", "body-", "body--1", "body-x", "body-+1", "body-1.5", "w-0--2"] {
            assert!(
                matches!(
                    Location::parse(text, None),
                    Err(EditError::InvalidLocation { .. })
                ),
                "{text:?} should be rejected"
            );
        }
        assert!(Location::parse("body-99999999999999999999999", None).is_err());
    }

    #[test]
    fn format_then_parse_is_identity() {
        let locations = [
            Location::in_tree("body", vec![]),
            Location::in_tree("head", vec![0]),
            Location::in_tree("svg", vec![1, 2, 3]),
            Location::in_tree("news", vec![0, 0]),
            Location::in_container("tabs", 0, vec![]),
            Location::in_container("tabs", 3, vec![2, 0]),
        ];
        for loc in locations {
            let text = loc.to_string();
            assert_eq!(Location::parse(&text, Some("news")).unwrap(), loc, "{text}");
        }
    }

    #[test]
    fn path_helpers() {
        let loc = Location::in_tree("body", vec![1, 2]);
        assert_eq!(loc.last_index(), Some(2));
        assert_eq!(loc.parent(), Some(Location::in_tree("body", vec![1])));
        assert_eq!(loc.child(0), Location::in_tree("body", vec![1, 2, 0]));
        assert_eq!(
            loc.with_last_index(5),
            Some(Location::in_tree("body", vec![1, 5]))
        );
        let root = Location::in_tree("body", vec![]);
        assert!(root.is_tree_root());
        assert_eq!(root.parent(), None);
        assert_eq!(root.with_last_index(1), None);
        assert!(!Location::in_container("w", 0, vec![]).is_tree_root());
    }

    #[test]
    fn validates_names() {
        assert!(validate_name("news_1").is_ok());
        for bad in ["", "a-b", "body", "head", "svg", "two words"] {
            assert_eq!(validate_name(bad), Err(EditError::InvalidName(bad.to_string())));
        }
    }
}

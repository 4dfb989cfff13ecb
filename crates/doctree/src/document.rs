//! Pages and sections: the documents whose trees are edited by location.

use crate::error::EditError;
use crate::index::{Indexes, PlaceholderIndex, WidgetIndex, build_indexes};
use crate::location::{Location, validate_name};
use crate::types::{Node, Part};
use core_types::{ChangeToken, Ident};

/// A set of addressable trees plus the indexes derived from them.
///
/// The accessor and mutator are written once against this trait; pages and
/// sections only differ in how a top key maps to a tree.
pub trait Document {
    /// Top keys of the trees this document owns, in serialization order.
    fn top_keys(&self) -> Vec<&str>;

    fn tree(&self, top_key: &str) -> Option<&Node>;

    fn tree_mut(&mut self, top_key: &str) -> Option<&mut Node>;

    /// Name of the section being edited; `None` for pages.
    fn section_name(&self) -> Option<&str> {
        None
    }

    fn widgets(&self) -> &WidgetIndex;

    fn placeholders(&self) -> &PlaceholderIndex;

    /// Whether section placeholders may be inserted.
    fn allows_placeholders(&self) -> bool;

    /// Rebuild the widget and placeholder indexes from the trees.
    fn reindex(&mut self);

    /// Parse a location string in the context of this document.
    fn parse_location(&self, text: &str) -> Result<Location, EditError> {
        Location::parse(text, self.section_name())
    }
}

/// A widget on another page or section, named by where it lives.
///
/// `ident` is the page holding the widget; `section` names the section when
/// the widget sits inside one placed on that page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetRef {
    pub ident: Option<Ident>,
    pub section: Option<String>,
    pub name: String,
}

impl WidgetRef {
    pub fn on_page(ident: Ident, name: impl Into<String>) -> Self {
        Self {
            ident: Some(ident),
            section: None,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateArgs {
    pub lang: String,
    pub backcol: String,
    pub show_backcol: bool,
    pub last_scroll: bool,
    pub default_error_widget: Option<WidgetRef>,
    pub interval: u32,
    pub interval_target: Option<Ident>,
}

impl Default for TemplateArgs {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            backcol: "#FFFFFF".to_string(),
            show_backcol: false,
            last_scroll: false,
            default_error_widget: None,
            interval: 0,
            interval_target: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SvgArgs {
    pub width: String,
    pub height: String,
}

impl Default for SvgArgs {
    fn default() -> Self {
        Self {
            width: "100".to_string(),
            height: "100".to_string(),
        }
    }
}

/// A template page owns `head` and `body`; an SVG page owns `svg`.
#[derive(Clone, Debug, PartialEq)]
pub enum PageKind {
    Template {
        head: Node,
        body: Node,
        args: TemplateArgs,
    },
    Svg {
        svg: Node,
        args: SvgArgs,
    },
}

impl PageKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PageKind::Template { .. } => "TemplatePage",
            PageKind::Svg { .. } => "SVG",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub ident: Ident,
    pub name: String,
    pub brief: String,
    pub kind: PageKind,
    pub pchange: ChangeToken,
    indexes: Indexes,
}

impl Page {
    pub fn new(ident: Ident, name: impl Into<String>, kind: PageKind) -> Self {
        let mut page = Self {
            ident,
            name: name.into(),
            brief: String::new(),
            kind,
            pchange: ChangeToken::generate(),
            indexes: Indexes::default(),
        };
        page.reindex();
        page
    }

    pub fn template(ident: Ident, name: impl Into<String>) -> Self {
        Self::new(
            ident,
            name,
            PageKind::Template {
                head: Node::Part(Part::new("head")),
                body: Node::Part(Part::new("body")),
                args: TemplateArgs::default(),
            },
        )
    }

    pub fn svg(ident: Ident, name: impl Into<String>) -> Self {
        Self::new(
            ident,
            name,
            PageKind::Svg {
                svg: Node::Part(
                    Part::new("svg")
                        .with_attrib("xmlns", "http://www.w3.org/2000/svg")
                        .with_attrib("version", "1.1"),
                ),
                args: SvgArgs::default(),
            },
        )
    }
}

impl Document for Page {
    fn top_keys(&self) -> Vec<&str> {
        match self.kind {
            PageKind::Template { .. } => vec!["head", "body"],
            PageKind::Svg { .. } => vec!["svg"],
        }
    }

    fn tree(&self, top_key: &str) -> Option<&Node> {
        match (&self.kind, top_key) {
            (PageKind::Template { head, .. }, "head") => Some(head),
            (PageKind::Template { body, .. }, "body") => Some(body),
            (PageKind::Svg { svg, .. }, "svg") => Some(svg),
            _ => None,
        }
    }

    fn tree_mut(&mut self, top_key: &str) -> Option<&mut Node> {
        match (&mut self.kind, top_key) {
            (PageKind::Template { head, .. }, "head") => Some(head),
            (PageKind::Template { body, .. }, "body") => Some(body),
            (PageKind::Svg { svg, .. }, "svg") => Some(svg),
            _ => None,
        }
    }

    fn widgets(&self) -> &WidgetIndex {
        &self.indexes.widgets
    }

    fn placeholders(&self) -> &PlaceholderIndex {
        &self.indexes.placeholders
    }

    fn allows_placeholders(&self) -> bool {
        true
    }

    fn reindex(&mut self) {
        self.indexes = build_indexes(&*self);
    }
}

/// A reusable fragment, inserted into pages through placeholders.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub name: String,
    /// Always a `Node::Section`.
    pub tree: Node,
    pub schange: ChangeToken,
    indexes: Indexes,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Result<Self, EditError> {
        Self::with_root(name, Part::new("div"))
    }

    pub fn with_root(name: impl Into<String>, root: Part) -> Result<Self, EditError> {
        let name = name.into();
        validate_name(&name)?;
        let mut section = Self {
            name,
            tree: Node::Section(root),
            schange: ChangeToken::generate(),
            indexes: Indexes::default(),
        };
        section.reindex();
        Ok(section)
    }

    pub fn root(&self) -> Option<&Part> {
        match &self.tree {
            Node::Section(part) => Some(part),
            _ => None,
        }
    }
}

impl Document for Section {
    fn top_keys(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }

    fn tree(&self, top_key: &str) -> Option<&Node> {
        (top_key == self.name).then_some(&self.tree)
    }

    fn tree_mut(&mut self, top_key: &str) -> Option<&mut Node> {
        if top_key == self.name {
            Some(&mut self.tree)
        } else {
            None
        }
    }

    fn section_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn widgets(&self) -> &WidgetIndex {
        &self.indexes.widgets
    }

    fn placeholders(&self) -> &PlaceholderIndex {
        &self.indexes.placeholders
    }

    fn allows_placeholders(&self) -> bool {
        false
    }

    fn reindex(&mut self) {
        self.indexes = build_indexes(&*self);
    }
}

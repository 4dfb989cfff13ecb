use crate::error::EditError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Element attributes. Kept key-sorted so serialized output is stable.
pub type Attribs = BTreeMap<String, String>;

/// Widget field values, opaque to the tree engine.
pub type Fields = BTreeMap<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Part,
    ClosedPart,
    Widget,
    ClosedWidget,
    TextBlock,
    HtmlSymbol,
    Comment,
    SectionPlaceHolder,
    Text,
    Section,
}

impl NodeKind {
    pub const ALL: [NodeKind; 10] = [
        NodeKind::Part,
        NodeKind::ClosedPart,
        NodeKind::Widget,
        NodeKind::ClosedWidget,
        NodeKind::TextBlock,
        NodeKind::HtmlSymbol,
        NodeKind::Comment,
        NodeKind::SectionPlaceHolder,
        NodeKind::Text,
        NodeKind::Section,
    ];

    /// Tag used in the persisted `[tag, fields]` pairs.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Part => "Part",
            Self::ClosedPart => "ClosedPart",
            Self::Widget => "Widget",
            Self::ClosedWidget => "ClosedWidget",
            Self::TextBlock => "TextBlock",
            Self::HtmlSymbol => "HTMLSymbol",
            Self::Comment => "Comment",
            Self::SectionPlaceHolder => "SectionPlaceHolder",
            Self::Text => "Text",
            Self::Section => "Section",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

/// Open element with ordered children. Also the shape of every tree root.
#[derive(Clone, Debug, PartialEq)]
pub struct Part {
    pub tag_name: String,
    pub brief: String,
    pub show: bool,
    pub hide_if_empty: bool,
    pub attribs: Attribs,
    pub children: Vec<Node>,
}

impl Part {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            brief: String::new(),
            show: true,
            hide_if_empty: false,
            attribs: Attribs::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attrib(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribs.insert(key.into(), value.into());
        self
    }
}

/// Self-closing element.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosedPart {
    pub tag_name: String,
    pub brief: String,
    pub show: bool,
    pub attribs: Attribs,
}

impl ClosedPart {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            brief: String::new(),
            show: true,
            attribs: Attribs::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Widget {
    pub name: String,
    pub brief: String,
    pub widget_type: String,
    pub fields: Fields,
    pub containers: Vec<Vec<Node>>,
}

impl Widget {
    pub fn new(name: impl Into<String>, widget_type: impl Into<String>, containers: usize) -> Self {
        Self {
            name: name.into(),
            brief: String::new(),
            widget_type: widget_type.into(),
            fields: Fields::new(),
            containers: vec![Vec::new(); containers],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClosedWidget {
    pub name: String,
    pub brief: String,
    pub widget_type: String,
    pub fields: Fields,
}

impl ClosedWidget {
    pub fn new(name: impl Into<String>, widget_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brief: String::new(),
            widget_type: widget_type.into(),
            fields: Fields::new(),
        }
    }
}

/// Reference to text held in an external text store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBlock {
    pub textref: String,
    pub failmessage: String,
    pub escape: bool,
    pub linebreaks: bool,
    pub decode: bool,
}

impl TextBlock {
    pub fn new(textref: impl Into<String>) -> Self {
        Self {
            textref: textref.into(),
            failmessage: String::new(),
            escape: true,
            linebreaks: true,
            decode: false,
        }
    }
}

/// Marks where a section is rendered. `alias` is unique within a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceHolder {
    pub alias: String,
    pub section_name: String,
    pub brief: String,
    pub multiplier: u32,
    pub mtag: String,
}

impl PlaceHolder {
    pub fn new(alias: impl Into<String>, section_name: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            section_name: section_name.into(),
            brief: String::new(),
            multiplier: 0,
            mtag: "div".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Part(Part),
    ClosedPart(ClosedPart),
    Widget(Widget),
    ClosedWidget(ClosedWidget),
    TextBlock(TextBlock),
    HtmlSymbol(String),
    Comment(String),
    SectionPlaceHolder(PlaceHolder),
    Text(String),
    /// Root of a section tree; never nested.
    Section(Part),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Part(_) => NodeKind::Part,
            Node::ClosedPart(_) => NodeKind::ClosedPart,
            Node::Widget(_) => NodeKind::Widget,
            Node::ClosedWidget(_) => NodeKind::ClosedWidget,
            Node::TextBlock(_) => NodeKind::TextBlock,
            Node::HtmlSymbol(_) => NodeKind::HtmlSymbol,
            Node::Comment(_) => NodeKind::Comment,
            Node::SectionPlaceHolder(_) => NodeKind::SectionPlaceHolder,
            Node::Text(_) => NodeKind::Text,
            Node::Section(_) => NodeKind::Section,
        }
    }

    /// Only parts and sections take positional children; widgets hold
    /// theirs in numbered containers.
    pub fn can_have_children(&self) -> bool {
        matches!(self, Node::Part(_) | Node::Section(_))
    }

    pub fn brief(&self) -> &str {
        match self {
            Node::Part(part) | Node::Section(part) => &part.brief,
            Node::ClosedPart(part) => &part.brief,
            Node::Widget(widget) => &widget.brief,
            Node::ClosedWidget(widget) => &widget.brief,
            Node::SectionPlaceHolder(holder) => &holder.brief,
            Node::TextBlock(block) => &block.textref,
            Node::HtmlSymbol(text) | Node::Comment(text) | Node::Text(text) => text,
        }
    }

    pub fn widget_name(&self) -> Option<&str> {
        match self {
            Node::Widget(widget) => Some(&widget.name),
            Node::ClosedWidget(widget) => Some(&widget.name),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Part(part) | Node::Section(part) => Some(&part.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Part(part) | Node::Section(part) => Some(&mut part.children),
            _ => None,
        }
    }

    pub fn child_count(&self) -> Result<usize, EditError> {
        self.children().map(Vec::len).ok_or(EditError::NotContainer)
    }

    pub fn child_at(&self, index: usize) -> Result<&Node, EditError> {
        let children = self.children().ok_or(EditError::NotContainer)?;
        scope_get(children, index)
    }

    pub fn insert_child(&mut self, index: usize, node: Node) -> Result<(), EditError> {
        let children = self.children_mut().ok_or(EditError::NotContainer)?;
        scope_insert(children, index, node)
    }

    pub fn remove_child(&mut self, index: usize) -> Result<Node, EditError> {
        let children = self.children_mut().ok_or(EditError::NotContainer)?;
        scope_remove(children, index)
    }

    pub fn replace_child(&mut self, index: usize, node: Node) -> Result<Node, EditError> {
        let children = self.children_mut().ok_or(EditError::NotContainer)?;
        scope_replace(children, index, node)
    }

    pub fn container_count(&self) -> usize {
        match self {
            Node::Widget(widget) => widget.containers.len(),
            _ => 0,
        }
    }

    pub fn container(&self, container: usize) -> Option<&Vec<Node>> {
        match self {
            Node::Widget(widget) => widget.containers.get(container),
            _ => None,
        }
    }

    pub fn container_mut(&mut self, container: usize) -> Option<&mut Vec<Node>> {
        match self {
            Node::Widget(widget) => widget.containers.get_mut(container),
            _ => None,
        }
    }

    pub fn container_child_count(&self, container: usize) -> Result<usize, EditError> {
        self.container(container)
            .map(Vec::len)
            .ok_or(EditError::NotContainer)
    }

    pub fn container_child_at(&self, container: usize, index: usize) -> Result<&Node, EditError> {
        let scope = self.container(container).ok_or(EditError::NotContainer)?;
        scope_get(scope, index)
    }

    pub fn insert_container_child(
        &mut self,
        container: usize,
        index: usize,
        node: Node,
    ) -> Result<(), EditError> {
        let scope = self
            .container_mut(container)
            .ok_or(EditError::NotContainer)?;
        scope_insert(scope, index, node)
    }

    pub fn remove_container_child(
        &mut self,
        container: usize,
        index: usize,
    ) -> Result<Node, EditError> {
        let scope = self
            .container_mut(container)
            .ok_or(EditError::NotContainer)?;
        scope_remove(scope, index)
    }

    pub fn replace_container_child(
        &mut self,
        container: usize,
        index: usize,
        node: Node,
    ) -> Result<Node, EditError> {
        let scope = self
            .container_mut(container)
            .ok_or(EditError::NotContainer)?;
        scope_replace(scope, index, node)
    }

    /// Visit this node and every descendant, containers included, in pre-order.
    pub fn for_each(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        match self {
            Node::Part(part) | Node::Section(part) => {
                for child in &part.children {
                    child.for_each(f);
                }
            }
            Node::Widget(widget) => {
                for child in widget.containers.iter().flatten() {
                    child.for_each(f);
                }
            }
            _ => {}
        }
    }
}

pub(crate) fn scope_get(scope: &[Node], index: usize) -> Result<&Node, EditError> {
    scope.get(index).ok_or(EditError::IndexOutOfRange {
        index,
        len: scope.len(),
    })
}

pub(crate) fn scope_insert(
    scope: &mut Vec<Node>,
    index: usize,
    node: Node,
) -> Result<(), EditError> {
    if index > scope.len() {
        return Err(EditError::IndexOutOfRange {
            index,
            len: scope.len(),
        });
    }
    scope.insert(index, node);
    Ok(())
}

pub(crate) fn scope_remove(scope: &mut Vec<Node>, index: usize) -> Result<Node, EditError> {
    if index >= scope.len() {
        return Err(EditError::IndexOutOfRange {
            index,
            len: scope.len(),
        });
    }
    Ok(scope.remove(index))
}

pub(crate) fn scope_replace(
    scope: &mut [Node],
    index: usize,
    node: Node,
) -> Result<Node, EditError> {
    let len = scope.len();
    let slot = scope
        .get_mut(index)
        .ok_or(EditError::IndexOutOfRange { index, len })?;
    Ok(std::mem::replace(slot, node))
}

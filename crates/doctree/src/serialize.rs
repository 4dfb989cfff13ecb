//! Ordered JSON form of nodes, pages and sections.
//!
//! Every node is a `[tag, mapping]` pair. Tree roots of pages and sections
//! are written as bare part mappings (`tag_name`, `brief`, `show`,
//! `hide_if_empty`, `attribs`, `parts`). Decoding is lenient about missing
//! keys and strict about wrong types.

use crate::document::{Document, Page, PageKind, Section, SvgArgs, TemplateArgs, WidgetRef};
use crate::error::{EditError, SerializeError};
use crate::index::collect_names;
use crate::location::validate_name;
use crate::mutate::check_section_name;
use crate::types::{
    Attribs, ClosedPart, ClosedWidget, Fields, Node, NodeKind, Part, PlaceHolder, TextBlock, Widget,
};
use core_types::Ident;
use serde_json::{Map, Value, json};

/// The two keys every page or section file starts with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHeader {
    /// Framework version that wrote the file.
    pub skipole: String,
    /// Version of the project the file was taken from.
    pub version: String,
}

impl FileHeader {
    pub fn new(skipole: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            skipole: skipole.into(),
            version: version.into(),
        }
    }

    fn write(&self, out: &mut Map<String, Value>) {
        out.insert("skipole".to_string(), json!(self.skipole));
        out.insert("version".to_string(), json!(self.version));
    }

    fn read(map: &Map<String, Value>) -> Result<Self, SerializeError> {
        Ok(Self {
            skipole: string_or(map, "skipole", "", "header")?,
            version: string_or(map, "version", "", "header")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

pub fn to_ordered_dict(node: &Node) -> Value {
    let mapping = match node {
        Node::Part(part) | Node::Section(part) => part_to_map(part),
        Node::ClosedPart(part) => {
            let mut m = Map::new();
            m.insert("tag_name".to_string(), json!(part.tag_name));
            m.insert("brief".to_string(), json!(part.brief));
            m.insert("show".to_string(), json!(part.show));
            m.insert("attribs".to_string(), attribs_to_value(&part.attribs));
            m
        }
        Node::Widget(widget) => {
            let mut m = widget_head(&widget.name, &widget.brief, &widget.widget_type, &widget.fields);
            for (index, contents) in widget.containers.iter().enumerate() {
                m.insert(format!("container_{index}"), nodes_to_value(contents));
            }
            m
        }
        Node::ClosedWidget(widget) => {
            widget_head(&widget.name, &widget.brief, &widget.widget_type, &widget.fields)
        }
        Node::TextBlock(block) => {
            let mut m = Map::new();
            m.insert("textref".to_string(), json!(block.textref));
            m.insert("failmessage".to_string(), json!(block.failmessage));
            m.insert("escape".to_string(), json!(block.escape));
            m.insert("linebreaks".to_string(), json!(block.linebreaks));
            m.insert("decode".to_string(), json!(block.decode));
            m
        }
        Node::SectionPlaceHolder(holder) => {
            let mut m = Map::new();
            m.insert("alias".to_string(), json!(holder.alias));
            m.insert("section_name".to_string(), json!(holder.section_name));
            m.insert("brief".to_string(), json!(holder.brief));
            m.insert("multiplier".to_string(), json!(holder.multiplier));
            m.insert("mtag".to_string(), json!(holder.mtag));
            m
        }
        Node::HtmlSymbol(text) | Node::Comment(text) | Node::Text(text) => {
            let mut m = Map::new();
            m.insert("text".to_string(), json!(text));
            m
        }
    };
    Value::Array(vec![json!(node.kind().tag()), Value::Object(mapping)])
}

pub fn from_ordered_dict(value: &Value) -> Result<Node, SerializeError> {
    node_from_value(value, "item")
}

fn node_from_value(value: &Value, path: &str) -> Result<Node, SerializeError> {
    let Some([tag, mapping]) = value.as_array().map(Vec::as_slice) else {
        return Err(SerializeError::malformed(path, "expected a [tag, mapping] pair"));
    };
    let tag = tag
        .as_str()
        .ok_or_else(|| SerializeError::malformed(path, "kind tag is not a string"))?;
    let kind = NodeKind::from_tag(tag).ok_or_else(|| SerializeError::UnknownKind {
        tag: tag.to_string(),
        path: path.to_string(),
    })?;
    let m = mapping
        .as_object()
        .ok_or_else(|| SerializeError::malformed(path, "fields are not a mapping"))?;

    let node = match kind {
        NodeKind::Part => Node::Part(part_from_map(m, path)?),
        NodeKind::Section => Node::Section(part_from_map(m, path)?),
        NodeKind::ClosedPart => Node::ClosedPart(ClosedPart {
            tag_name: string_or(m, "tag_name", "div", path)?,
            brief: string_or(m, "brief", "", path)?,
            show: bool_or(m, "show", true, path)?,
            attribs: attribs_from(m, path)?,
        }),
        NodeKind::Widget => {
            let (name, brief, widget_type, fields) = widget_head_from(m, path)?;
            let mut containers = Vec::new();
            while let Some(contents) = m.get(&format!("container_{}", containers.len())) {
                let scope = format!("{path}.container_{}", containers.len());
                containers.push(nodes_from_value(contents, &scope)?);
            }
            Node::Widget(Widget {
                name,
                brief,
                widget_type,
                fields,
                containers,
            })
        }
        NodeKind::ClosedWidget => {
            let (name, brief, widget_type, fields) = widget_head_from(m, path)?;
            Node::ClosedWidget(ClosedWidget {
                name,
                brief,
                widget_type,
                fields,
            })
        }
        NodeKind::TextBlock => Node::TextBlock(TextBlock {
            textref: string_or(m, "textref", "", path)?,
            failmessage: string_or(m, "failmessage", "", path)?,
            escape: bool_or(m, "escape", true, path)?,
            linebreaks: bool_or(m, "linebreaks", true, path)?,
            decode: bool_or(m, "decode", false, path)?,
        }),
        NodeKind::SectionPlaceHolder => {
            let alias = string_or(m, "alias", "", path)?;
            validate_name(&alias)?;
            Node::SectionPlaceHolder(PlaceHolder {
                alias,
                section_name: string_or(m, "section_name", "", path)?,
                brief: string_or(m, "brief", "", path)?,
                multiplier: u32_or(m, "multiplier", 0, path)?,
                mtag: string_or(m, "mtag", "div", path)?,
            })
        }
        NodeKind::HtmlSymbol => Node::HtmlSymbol(string_or(m, "text", "", path)?),
        NodeKind::Comment => Node::Comment(string_or(m, "text", "", path)?),
        NodeKind::Text => Node::Text(string_or(m, "text", "", path)?),
    };
    Ok(node)
}

fn part_to_map(part: &Part) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("tag_name".to_string(), json!(part.tag_name));
    m.insert("brief".to_string(), json!(part.brief));
    m.insert("show".to_string(), json!(part.show));
    m.insert("hide_if_empty".to_string(), json!(part.hide_if_empty));
    m.insert("attribs".to_string(), attribs_to_value(&part.attribs));
    m.insert("parts".to_string(), nodes_to_value(&part.children));
    m
}

fn part_from_map(m: &Map<String, Value>, path: &str) -> Result<Part, SerializeError> {
    let children = match m.get("parts") {
        None | Some(Value::Null) => Vec::new(),
        Some(parts) => nodes_from_value(parts, path)?,
    };
    Ok(Part {
        tag_name: string_or(m, "tag_name", "div", path)?,
        brief: string_or(m, "brief", "", path)?,
        show: bool_or(m, "show", true, path)?,
        hide_if_empty: bool_or(m, "hide_if_empty", false, path)?,
        attribs: attribs_from(m, path)?,
        children,
    })
}

fn nodes_to_value(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(to_ordered_dict).collect())
}

fn nodes_from_value(value: &Value, path: &str) -> Result<Vec<Node>, SerializeError> {
    let items = value
        .as_array()
        .ok_or_else(|| SerializeError::malformed(path, "children are not a list"))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| node_from_value(item, &format!("{path}-{index}")))
        .collect()
}

fn widget_head(name: &str, brief: &str, widget_type: &str, fields: &Fields) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("name".to_string(), json!(name));
    m.insert("brief".to_string(), json!(brief));
    m.insert("widget_type".to_string(), json!(widget_type));
    let fields: Map<String, Value> = fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    m.insert("fields".to_string(), Value::Object(fields));
    m
}

fn widget_head_from(
    m: &Map<String, Value>,
    path: &str,
) -> Result<(String, String, String, Fields), SerializeError> {
    let name = string_or(m, "name", "", path)?;
    validate_name(&name)?;
    let fields = match m.get("fields") {
        None | Some(Value::Null) => Fields::new(),
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(_) => return Err(SerializeError::malformed(path, "fields are not a mapping")),
    };
    Ok((
        name,
        string_or(m, "brief", "", path)?,
        string_or(m, "widget_type", "", path)?,
        fields,
    ))
}

fn attribs_to_value(attribs: &Attribs) -> Value {
    // BTreeMap iteration is key-sorted.
    Value::Object(
        attribs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn attribs_from(m: &Map<String, Value>, path: &str) -> Result<Attribs, SerializeError> {
    let Some(value) = m.get("attribs") else {
        return Ok(Attribs::new());
    };
    let Value::Object(map) = value else {
        if value.is_null() {
            return Ok(Attribs::new());
        }
        return Err(SerializeError::malformed(path, "attribs are not a mapping"));
    };
    map.iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k.clone(), s.clone())),
            Value::Number(n) => Ok((k.clone(), n.to_string())),
            _ => Err(SerializeError::malformed(
                path,
                format!("attribute {k:?} is not a string"),
            )),
        })
        .collect()
}

fn string_or(
    m: &Map<String, Value>,
    key: &str,
    default: &str,
    path: &str,
) -> Result<String, SerializeError> {
    match m.get(key) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SerializeError::malformed(path, format!("{key} is not a string"))),
    }
}

fn bool_or(
    m: &Map<String, Value>,
    key: &str,
    default: bool,
    path: &str,
) -> Result<bool, SerializeError> {
    match m.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(SerializeError::malformed(path, format!("{key} is not a boolean"))),
    }
}

fn u32_or(
    m: &Map<String, Value>,
    key: &str,
    default: u32,
    path: &str,
) -> Result<u32, SerializeError> {
    match m.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| SerializeError::malformed(path, format!("{key} is not a count"))),
    }
}

// ---------------------------------------------------------------------------
// Idents
// ---------------------------------------------------------------------------

/// Bare number when `ident` belongs to `project`, otherwise `[project, number]`.
pub fn ident_to_value(ident: &Ident, project: &str) -> Value {
    if ident.is_in(project) {
        json!(ident.num)
    } else {
        json!([ident.project, ident.num])
    }
}

pub fn ident_from_value(value: &Value, project: &str) -> Result<Ident, SerializeError> {
    let as_num = |v: &Value| v.as_u64().and_then(|n| u32::try_from(n).ok());
    match value {
        Value::Number(_) => as_num(value)
            .map(|num| Ident::new(project, num))
            .ok_or_else(|| SerializeError::malformed("ident", "not a page number")),
        Value::Array(pair) => match pair.as_slice() {
            [Value::String(proj), num] => as_num(num)
                .map(|num| Ident::new(proj.as_str(), num))
                .ok_or_else(|| SerializeError::malformed("ident", "not a page number")),
            _ => Err(SerializeError::malformed("ident", "expected [project, number]")),
        },
        _ => Err(SerializeError::malformed("ident", "expected a number or pair")),
    }
}

fn optional_ident(
    m: &Map<String, Value>,
    key: &str,
    project: &str,
) -> Result<Option<Ident>, SerializeError> {
    match m.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => ident_from_value(value, project).map(Some),
    }
}

/// `{"ident", "section", "name"}`; the ident follows [`ident_to_value`].
pub fn widget_ref_to_value(widget: &WidgetRef, project: &str) -> Value {
    let mut m = Map::new();
    m.insert(
        "ident".to_string(),
        widget
            .ident
            .as_ref()
            .map_or(Value::Null, |ident| ident_to_value(ident, project)),
    );
    m.insert("section".to_string(), json!(widget.section));
    m.insert("name".to_string(), json!(widget.name));
    Value::Object(m)
}

pub fn widget_ref_from_value(value: &Value, project: &str) -> Result<WidgetRef, SerializeError> {
    const PATH: &str = "default_error_widget";
    let m = value
        .as_object()
        .ok_or_else(|| SerializeError::malformed(PATH, "widget reference is not a mapping"))?;
    let section = match m.get("section") {
        None | Some(Value::Null) => None,
        Some(Value::String(section)) => Some(section.clone()),
        Some(_) => return Err(SerializeError::malformed(PATH, "section is not a string")),
    };
    let name = match m.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        _ => return Err(SerializeError::malformed(PATH, "missing widget name")),
    };
    Ok(WidgetRef {
        ident: optional_ident(m, "ident", project)?,
        section,
        name,
    })
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Page file contents: header, identity, arguments, then the trees.
pub fn page_to_value(page: &Page, header: &FileHeader) -> Value {
    let project = page.ident.project.as_str();
    let mut out = Map::new();
    header.write(&mut out);
    out.insert("name".to_string(), json!(page.name));
    out.insert("ident".to_string(), ident_to_value(&page.ident, project));
    out.insert("brief".to_string(), json!(page.brief));
    out.insert("page_type".to_string(), json!(page.kind.type_name()));
    match &page.kind {
        PageKind::Template { head, body, args } => {
            let mut a = Map::new();
            a.insert("lang".to_string(), json!(args.lang));
            a.insert("backcol".to_string(), json!(args.backcol));
            a.insert("show_backcol".to_string(), json!(args.show_backcol));
            a.insert("last_scroll".to_string(), json!(args.last_scroll));
            a.insert(
                "default_error_widget".to_string(),
                args.default_error_widget
                    .as_ref()
                    .map_or(Value::Null, |widget| widget_ref_to_value(widget, project)),
            );
            a.insert("interval".to_string(), json!(args.interval));
            a.insert(
                "interval_target".to_string(),
                args.interval_target
                    .as_ref()
                    .map_or(Value::Null, |ident| ident_to_value(ident, project)),
            );
            out.insert("args".to_string(), Value::Object(a));
            out.insert("head".to_string(), root_to_value(head));
            out.insert("body".to_string(), root_to_value(body));
        }
        PageKind::Svg { svg, args } => {
            let mut a = Map::new();
            a.insert("width".to_string(), json!(args.width));
            a.insert("height".to_string(), json!(args.height));
            out.insert("args".to_string(), Value::Object(a));
            out.insert("svg".to_string(), root_to_value(svg));
        }
    }
    Value::Object(out)
}

/// Decode a page file. Bare idents are read as belonging to `project`.
///
/// The page gets a fresh change token and rebuilt indexes.
pub fn page_from_value(value: &Value, project: &str) -> Result<(FileHeader, Page), SerializeError> {
    let m = value
        .as_object()
        .ok_or_else(|| SerializeError::malformed("page", "file is not a mapping"))?;
    let header = FileHeader::read(m)?;
    let ident = match m.get("ident") {
        Some(value) => ident_from_value(value, project)?,
        None => return Err(SerializeError::malformed("page", "missing ident")),
    };
    let empty = Map::new();
    let args = match m.get("args") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(args)) => args,
        Some(_) => return Err(SerializeError::malformed("args", "not a mapping")),
    };
    let page_type = string_or(m, "page_type", "TemplatePage", "page")?;
    let kind = match page_type.as_str() {
        "TemplatePage" => PageKind::Template {
            head: root_from_value(m, "head")?,
            body: root_from_value(m, "body")?,
            args: TemplateArgs {
                lang: string_or(args, "lang", "en", "args")?,
                backcol: string_or(args, "backcol", "#FFFFFF", "args")?,
                show_backcol: bool_or(args, "show_backcol", false, "args")?,
                last_scroll: bool_or(args, "last_scroll", false, "args")?,
                default_error_widget: match args.get("default_error_widget") {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(widget_ref_from_value(value, project)?),
                },
                interval: u32_or(args, "interval", 0, "args")?,
                interval_target: optional_ident(args, "interval_target", project)?,
            },
        },
        "SVG" => PageKind::Svg {
            svg: root_from_value(m, "svg")?,
            args: SvgArgs {
                width: string_or(args, "width", "100", "args")?,
                height: string_or(args, "height", "100", "args")?,
            },
        },
        other => {
            return Err(SerializeError::malformed(
                "page_type",
                format!("unknown page type {other:?}"),
            ));
        }
    };
    let mut page = Page::new(ident, string_or(m, "name", "", "page")?, kind);
    page.brief = string_or(m, "brief", "", "page")?;
    check_loaded(&page, 0)?;
    Ok((header, page))
}

/// Section file contents: header, name, then the root part's keys.
pub fn section_to_value(section: &Section, header: &FileHeader) -> Value {
    let mut out = Map::new();
    header.write(&mut out);
    out.insert("name".to_string(), json!(section.name));
    if let Some(root) = section.root() {
        out.extend(part_to_map(root));
    }
    Value::Object(out)
}

/// Decode a section file, optionally renaming the section.
pub fn section_from_value(
    value: &Value,
    rename: Option<&str>,
) -> Result<(FileHeader, Section), SerializeError> {
    let m = value
        .as_object()
        .ok_or_else(|| SerializeError::malformed("section", "file is not a mapping"))?;
    let header = FileHeader::read(m)?;
    let name = match rename {
        Some(name) => name.to_string(),
        None => string_or(m, "name", "", "section")?,
    };
    let root = part_from_map(m, &name)?;
    let section = Section::with_root(name, root)?;
    check_loaded(&section, 1)?;
    if !section.placeholders().is_empty() {
        return Err(EditError::NotAllowed("section placeholders cannot be placed in a section").into());
    }
    Ok((header, section))
}

fn root_to_value(root: &Node) -> Value {
    match root {
        Node::Part(part) | Node::Section(part) => Value::Object(part_to_map(part)),
        other => to_ordered_dict(other),
    }
}

fn root_from_value(m: &Map<String, Value>, key: &str) -> Result<Node, SerializeError> {
    match m.get(key) {
        None | Some(Value::Null) => Ok(Node::Part(Part::new(key))),
        Some(Value::Object(root)) => Ok(Node::Part(part_from_map(root, key)?)),
        Some(_) => Err(SerializeError::malformed(key, "tree root is not a mapping")),
    }
}

/// Reject documents that editing could never have produced.
fn check_loaded<D: Document + ?Sized>(doc: &D, sections_allowed: usize) -> Result<(), SerializeError> {
    let mut widgets = Vec::new();
    let mut aliases = Vec::new();
    let mut sections = 0usize;
    for top_key in doc.top_keys() {
        let Some(root) = doc.tree(top_key) else {
            continue;
        };
        root.for_each(&mut |n| {
            if matches!(n, Node::Section(_)) {
                sections += 1;
            }
        });
        let (w, a) = collect_names(root);
        widgets.extend(w);
        aliases.extend(a);
    }
    if sections > sections_allowed {
        return Err(EditError::NotAllowed("sections cannot be nested").into());
    }
    check_section_name(doc, widgets.iter().chain(&aliases))?;
    for names in [&mut widgets, &mut aliases] {
        names.sort();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(EditError::NameConflict(pair[0].clone()).into());
        }
    }
    Ok(())
}

//! Location-addressed editing of page and section trees.

pub mod access;
pub mod document;
pub mod index;
pub mod location;
pub mod moves;
pub mod mutate;
pub mod outline;
pub mod serialize;
#[cfg(any(test, feature = "tree-snapshot"))]
pub mod tree_snapshot;

mod error;
mod types;

pub use crate::access::{resolve, resolve_mut as node_at_mut, resolve_parent, scope_len};
pub use crate::document::{
    Document, Page, PageKind, Section, SvgArgs, TemplateArgs, WidgetRef,
};
pub use crate::error::{EditError, SerializeError};
pub use crate::index::{PlaceholderIndex, PlaceholderInfo, WidgetIndex};
pub use crate::location::{Location, PAGE_TREES, validate_name};
pub use crate::moves::{Direction, move_down, move_down_right, move_in_direction, move_up, move_up_right};
pub use crate::mutate::{delete_at, insert_at, insertion_point, move_location, replace_at};
pub use crate::outline::{OutlineRow, outline, outline_lines};
pub use crate::serialize::{
    FileHeader, from_ordered_dict, ident_from_value, ident_to_value, page_from_value, page_to_value,
    section_from_value, section_to_value, to_ordered_dict, widget_ref_from_value,
    widget_ref_to_value,
};
pub use crate::types::{
    Attribs, ClosedPart, ClosedWidget, Fields, Node, NodeKind, Part, PlaceHolder, TextBlock, Widget,
};

//! The four arrow moves offered per row of the tree editor.
//!
//! Each builds a target location from the source and delegates to
//! [`move_location`]; the returned location is where the item ends up.

use crate::access::{resolve, scope_len};
use crate::document::Document;
use crate::error::EditError;
use crate::location::Location;
use crate::mutate::move_location;
use crate::types::Node;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    UpRight,
    DownRight,
}

impl Direction {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "up-right" | "upright" => Some(Direction::UpRight),
            "down-right" | "downright" => Some(Direction::DownRight),
            _ => None,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::parse(s).ok_or_else(|| format!("unknown direction {s:?}"))
    }
}

pub fn move_in_direction<D: Document + ?Sized>(
    doc: &mut D,
    from: &Location,
    direction: Direction,
) -> Result<Location, EditError> {
    match direction {
        Direction::Up => move_up(doc, from),
        Direction::Down => move_down(doc, from),
        Direction::UpRight => move_up_right(doc, from),
        Direction::DownRight => move_down_right(doc, from),
    }
}

fn last_index(from: &Location) -> Result<usize, EditError> {
    from.last_index()
        .ok_or(EditError::CannotMove("a root cannot be moved"))
}

/// Swap with the previous sibling, or step out in front of the parent when
/// already first.
pub fn move_up<D: Document + ?Sized>(doc: &mut D, from: &Location) -> Result<Location, EditError> {
    let last = last_index(from)?;
    let to = if last > 0 {
        from.with_last_index(last - 1)
    } else if from.path.len() == 1 {
        return Err(EditError::CannotMove("already at the top"));
    } else {
        from.parent()
    };
    let to = to.ok_or(EditError::CannotMove("a root cannot be moved"))?;
    move_location(doc, from, &to)
}

/// Swap with the next sibling, or step out behind the parent when already last.
pub fn move_down<D: Document + ?Sized>(
    doc: &mut D,
    from: &Location,
) -> Result<Location, EditError> {
    let last = last_index(from)?;
    let items = scope_len(doc, from)?;
    let to = if last + 1 < items {
        // +2: the target is taken before the source is removed, so landing
        // after the next sibling means skipping past it.
        from.with_last_index(last + 2)
    } else if from.path.len() == 1 {
        return Err(EditError::CannotMove("already at the bottom"));
    } else {
        from.parent()
            .and_then(|parent| parent.with_last_index(parent.last_index()? + 1))
    };
    let to = to.ok_or(EditError::CannotMove("a root cannot be moved"))?;
    move_location(doc, from, &to)
}

/// Become the last child of the previous sibling, which must be a part.
pub fn move_up_right<D: Document + ?Sized>(
    doc: &mut D,
    from: &Location,
) -> Result<Location, EditError> {
    let last = last_index(from)?;
    if last == 0 {
        return Err(EditError::CannotMove("no previous item to move into"));
    }
    resolve(doc, from)?;
    let previous = from
        .with_last_index(last - 1)
        .ok_or(EditError::CannotMove("a root cannot be moved"))?;
    let Node::Part(part) = resolve(doc, &previous)? else {
        return Err(EditError::CannotMove("previous item cannot hold children"));
    };
    let to = previous.child(part.children.len());
    move_location(doc, from, &to)
}

/// Become the first child of the next sibling, which must be a part.
pub fn move_down_right<D: Document + ?Sized>(
    doc: &mut D,
    from: &Location,
) -> Result<Location, EditError> {
    let last = last_index(from)?;
    let items = scope_len(doc, from)?;
    if last + 1 >= items {
        return Err(EditError::CannotMove("no following item to move into"));
    }
    let next = from
        .with_last_index(last + 1)
        .ok_or(EditError::CannotMove("a root cannot be moved"))?;
    if !matches!(resolve(doc, &next)?, Node::Part(_) | Node::Section(_)) {
        return Err(EditError::CannotMove("following item cannot hold children"));
    }
    move_location(doc, from, &next.child(0))
}

//! Which children a listing shows, and in what order.

use std::cmp::Ordering;

use crate::reflect::{Child, EntityId, EntityKind, Member};

/// Leading character that marks a name as private by convention.
pub const PRIVATE_MARKER: char = '_';

pub fn is_private(name: &str) -> bool {
    name.starts_with(PRIVATE_MARKER)
}

/// Whether an entry survives the private filter.
pub fn is_visible(name: &str, hidden: bool, include_private: bool) -> bool {
    include_private || !(hidden || is_private(name))
}

/// Case-insensitive name order.
///
/// Private-marked names sort after every other name, so `Foo` precedes
/// `_Bar`. Names equal up to case fall back to byte order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    is_private(a)
        .cmp(&is_private(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Filters and orders the children of `parent`.
///
/// Buckets come out as submodules, classes, functions, constants, each
/// sorted with [`compare_names`]. Classes and functions declared in another
/// module are dropped, so a re-export does not list them a second time.
pub fn order_children(
    parent: EntityId,
    children: Vec<Child>,
    include_private: bool,
) -> Vec<Child> {
    let mut kept: Vec<Child> = children
        .into_iter()
        .filter(|child| is_visible(&child.name, child.hidden, include_private))
        .filter(|child| match child.kind {
            EntityKind::Class | EntityKind::Function => child.owner == Some(parent),
            EntityKind::Submodule | EntityKind::Constant => true,
        })
        .collect();

    kept.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| compare_names(&a.name, &b.name))
    });
    kept
}

pub fn order_members(members: Vec<Member>, include_private: bool) -> Vec<Member> {
    let mut kept: Vec<Member> = members
        .into_iter()
        .filter(|member| is_visible(&member.name, member.hidden, include_private))
        .collect();
    kept.sort_by(|a, b| compare_names(&a.name, &b.name));
    kept
}

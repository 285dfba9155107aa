
//! Resolution of (possibly dotted) source paths against a record view.
//!
//! A path is resolved in three steps, first hit wins:
//!
//! 1. a field whose name equals the path, ignoring case;
//! 2. for `head.tail`, the entry `tail` inside the entity or map held by the
//!    field named `head`;
//! 3. a scan of every entity/map field, in field order, for an entry named
//!    `path` or for a `"{field}.{key}"` spelling equal to `path`.
//!
//! Absence is not an error here; callers decide what a miss means.

use crate::record::{eq_ignore_case, RecordView};
use crate::value::Value;

/// Where a path landed inside a record's field set.
///
/// Locations depend only on a record's shape (field names, which fields hold
/// entities or maps, and their keys), which is what lets the mapper cache them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The top-level field at this index.
    Field(usize),
    /// Entry `key` of the entity or map held by top-level field `field`.
    Nested { field: usize, key: usize },
}

impl Location {
    /// Read the value at this location. `None` if the view has a different shape.
    pub fn get<'a>(&self, view: &RecordView<'a>) -> Option<&'a Value> {
        let fields = view.fields();
        match *self {
            Location::Field(i) => fields.get_index(i).map(|(_, v)| v),
            Location::Nested { field, key } => fields
                .get_index(field)
                .and_then(|(_, v)| v.properties())
                .and_then(|props| props.get_index(key))
                .map(|(_, v)| v),
        }
    }
}

/// Find where `path` lives in `view`'s own fields (no parent fallback).
pub fn locate(view: &RecordView<'_>, path: &str) -> Option<Location> {
    if let Some(i) = view.position_ignore_case(path) {
        return Some(Location::Field(i));
    }

    let fields = view.fields();

    if let Some((head, tail)) = path.split_once('.') {
        let hit = fields
            .iter()
            .enumerate()
            .filter(|(_, (name, _))| eq_ignore_case(name, head))
            .find_map(|(i, (_, v))| {
                let props = v.properties()?;
                let key = props
                    .get_index_of(tail)
                    .or_else(|| props.keys().position(|k| eq_ignore_case(k, tail)))?;
                Some(Location::Nested { field: i, key })
            });
        if hit.is_some() {
            return hit;
        }
    }

    for (i, (name, v)) in fields.iter().enumerate() {
        let Some(props) = v.properties() else { continue };
        for (j, key) in props.keys().enumerate() {
            if eq_ignore_case(key, path) || matches_dotted(path, name, key) {
                return Some(Location::Nested { field: i, key: j });
            }
        }
    }

    None
}

/// Resolve `path` against `view`'s own fields.
///
/// A located `null` counts as a miss.
pub fn resolve_local<'a>(view: &RecordView<'a>, path: &str) -> Option<&'a Value> {
    locate(view, path)
        .and_then(|loc| loc.get(view))
        .filter(|v| !v.is_null())
}

/// Resolve `path` against `view`, retrying once against the outer record if
/// `view` is a synthetic sub-record.
pub fn resolve<'a>(view: &RecordView<'a>, path: &str) -> Option<&'a Value> {
    resolve_local(view, path).or_else(|| view.parent().and_then(|p| resolve_local(p, path)))
}

/// Does `path` spell `"{field}.{key}"`, ignoring case?
fn matches_dotted(path: &str, field: &str, key: &str) -> bool {
    match path.split_once('.') {
        Some((head, tail)) if eq_ignore_case(head, field) && eq_ignore_case(tail, key) => true,
        // Field names may themselves contain dots.
        _ => path
            .rsplit_once('.')
            .is_some_and(|(head, tail)| eq_ignore_case(head, field) && eq_ignore_case(tail, key)),
    }
}

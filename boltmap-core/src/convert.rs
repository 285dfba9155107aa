
//! Value coercion into Rust types.
//!
//! This module contains all built-in [`FromValue`] implementations:
//!
//! | Value | Rust type |
//! |-------|-----------|
//! | Integer | `i64`, `i32`, `i16`, `i8`, `u64`, `u32`, `u16`, `u8` (range-checked), `f64`, `f32` |
//! | Float | `f64`, `f32` |
//! | String | `String`; also parsed into numbers, `bool` and `NaiveDate` |
//! | Boolean | `bool` |
//! | List | `Vec<T>`, `(A, B)`, `(A, B, C)`, or `String` (comma-joined) |
//! | Map / Node / Relationship | `HashMap<String, V>`, `IndexMap<String, V>`, or any `Mappable` type |
//! | Node | [`Node`] |
//! | Relationship | [`Relationship`] |
//! | Null | `Option<T>` |
//! | anything | [`Value`] |
//!
//! Scalars also format into `String`. Everything else is a type mismatch.

use std::collections::HashMap;
use std::hash::BuildHasher;
use indexmap::IndexMap;
use crate::context::MappingContext;
use crate::entity::{Node, Relationship};
use crate::error::MapError;
use crate::traits::FromValue;
use crate::value::{ByteArray, Point2D, Point3D, Value};

fn mismatch(expected: &str, got: &Value, target: &str) -> MapError {
    MapError::type_mismatch(expected, got.kind(), target)
}

// ---------------------------------------------------------------------------
// Pass-through
// ---------------------------------------------------------------------------

impl FromValue for Value {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        Ok(value.clone())
    }
}

impl FromValue for Node {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Node(n) => Ok(n.clone()),
            other => Err(mismatch("Node", other, "Node")),
        }
    }
}

impl FromValue for Relationship {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Relationship(r) => Ok(r.clone()),
            other => Err(mismatch("Relationship", other, "Relationship")),
        }
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Lists join their elements' string forms with `,`; scalars are formatted.
impl FromValue for String {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::List(xs) => Ok(xs.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")),
            Value::Integer(_)
            | Value::Float(_)
            | Value::Boolean(_)
            | Value::Date(_)
            | Value::LocalTime(_)
            | Value::LocalDateTime(_)
            | Value::DateTime(_) => Ok(value.to_string()),
            other => Err(mismatch("String", other, "String")),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(mismatch("Boolean", other, "bool")),
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric types
// ---------------------------------------------------------------------------

macro_rules! impl_from_val_int {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
                match value {
                    Value::Integer(v) => <$t>::try_from(*v).map_err(|_| {
                        MapError::type_mismatch(
                            concat!("Integer in range of ", stringify!($t)),
                            &v.to_string(),
                            stringify!($t),
                        )
                    }),
                    Value::String(s) => s.trim().parse::<$t>().map_err(|_| {
                        MapError::type_mismatch("Integer", &format!("String \"{s}\""), stringify!($t))
                    }),
                    other => Err(mismatch("Integer", other, stringify!($t))),
                }
            }
        })*
    };
}

macro_rules! impl_from_val_float {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
                match value {
                    Value::Float(v) => Ok(*v as $t),
                    Value::Integer(v) => Ok(*v as $t),
                    Value::String(s) => s.trim().parse::<$t>().map_err(|_| {
                        MapError::type_mismatch("Float", &format!("String \"{s}\""), stringify!($t))
                    }),
                    other => Err(mismatch("Float", other, stringify!($t))),
                }
            }
        })*
    };
}

impl_from_val_int!(i64, i32, i16, i8, u64, u32, u16, u8);
impl_from_val_float!(f64, f32);

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Each element is coerced on its own; entity and map elements recurse into
/// the engine when `T` is a mapped type.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value, ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::List(xs) => xs
                .iter()
                .enumerate()
                .map(|(i, x)| T::from_value(x, ctx).map_err(|e| e.with_context(format!("[{i}]"))))
                .collect(),
            other => Err(mismatch("List", other, "Vec<T>")),
        }
    }
}

/// - Present but `null` maps to `None`.
/// - Otherwise maps to `Some(T)`.
///
/// A missing path is handled by the mapper, which treats `Option` members as
/// optional.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Null => Ok(None),
            other => Ok(Some(T::from_value(other, ctx)?)),
        }
    }
}

/// Map entries, or an entity's properties, converted value by value.
impl<V: FromValue, S: BuildHasher + Default> FromValue for HashMap<String, V, S> {
    fn from_value(value: &Value, ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        let props = value
            .properties()
            .ok_or_else(|| mismatch("Map", value, "HashMap<String, V>"))?;
        let mut out = HashMap::with_capacity_and_hasher(props.len(), S::default());
        for (k, v) in props {
            out.insert(k.clone(), V::from_value(v, ctx).map_err(|e| e.with_context(format!("['{k}']")))?);
        }
        Ok(out)
    }
}

impl<V: FromValue> FromValue for IndexMap<String, V> {
    fn from_value(value: &Value, ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        let props = value
            .properties()
            .ok_or_else(|| mismatch("Map", value, "IndexMap<String, V>"))?;
        props
            .iter()
            .map(|(k, v)| {
                V::from_value(v, ctx)
                    .map(|v| (k.clone(), v))
                    .map_err(|e| e.with_context(format!("['{k}']")))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tuples — for common graph shapes (e.g. list unpacking)
// ---------------------------------------------------------------------------

impl<A: FromValue, B: FromValue> FromValue for (A, B) {
    fn from_value(value: &Value, ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::List(xs) if xs.len() == 2 => Ok((A::from_value(&xs[0], ctx)?, B::from_value(&xs[1], ctx)?)),
            other => Err(mismatch("List[2]", other, "tuple(A, B)")),
        }
    }
}

impl<A: FromValue, B: FromValue, C: FromValue> FromValue for (A, B, C) {
    fn from_value(value: &Value, ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::List(xs) if xs.len() == 3 => Ok((
                A::from_value(&xs[0], ctx)?,
                B::from_value(&xs[1], ctx)?,
                C::from_value(&xs[2], ctx)?,
            )),
            other => Err(mismatch("List[3]", other, "tuple(A, B, C)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Temporal types (chrono)
// ---------------------------------------------------------------------------

/// Also parses ISO-8601 (`YYYY-MM-DD`) strings.
impl FromValue for chrono::NaiveDate {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::LocalDateTime(dt) => Ok(dt.date()),
            Value::String(s) => s
                .parse()
                .map_err(|_| MapError::type_mismatch("Date", &format!("String \"{s}\""), "NaiveDate")),
            other => Err(mismatch("Date", other, "NaiveDate")),
        }
    }
}

impl FromValue for chrono::NaiveTime {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::LocalTime(t) => Ok(*t),
            other => Err(mismatch("LocalTime", other, "NaiveTime")),
        }
    }
}

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::LocalDateTime(dt) => Ok(*dt),
            other => Err(mismatch("LocalDateTime", other, "NaiveDateTime")),
        }
    }
}

impl FromValue for chrono::DateTime<chrono::FixedOffset> {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => chrono::DateTime::parse_from_rfc3339(s).map_err(|_| {
                MapError::type_mismatch("DateTime", &format!("String \"{s}\""), "DateTime<FixedOffset>")
            }),
            other => Err(mismatch("DateTime", other, "DateTime<FixedOffset>")),
        }
    }
}

impl FromValue for std::time::Duration {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Duration(d) => Ok(*d),
            other => Err(mismatch("Duration", other, "std::time::Duration")),
        }
    }
}

// ---------------------------------------------------------------------------
// Spatial and binary types
// ---------------------------------------------------------------------------

impl FromValue for Point2D {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Point2D(p) => Ok(p.clone()),
            other => Err(mismatch("Point2D", other, "Point2D")),
        }
    }
}

impl FromValue for Point3D {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Point3D(p) => Ok(p.clone()),
            other => Err(mismatch("Point3D", other, "Point3D")),
        }
    }
}

impl FromValue for ByteArray {
    fn from_value(value: &Value, _ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        match value {
            Value::Bytes(b) => Ok(ByteArray(b.clone())),
            other => Err(mismatch("Bytes", other, "ByteArray")),
        }
    }
}

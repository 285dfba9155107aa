
//! The closed value model that records are made of.
//!
//! Every field of a [`Record`](crate::Record) is a [`Value`]. The coercer
//! dispatches on these variants exhaustively, so adding a kind here means
//! deciding its coercion rules in [`convert`](crate::convert).

use std::fmt;
use indexmap::IndexMap;
use crate::entity::{Node, Relationship};

/// A single record value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Node(Node),
    Relationship(Relationship),
    Bytes(Vec<u8>),
    Date(chrono::NaiveDate),
    LocalTime(chrono::NaiveTime),
    LocalDateTime(chrono::NaiveDateTime),
    DateTime(chrono::DateTime<chrono::FixedOffset>),
    Duration(std::time::Duration),
    Point2D(Point2D),
    Point3D(Point3D),
}

impl Value {
    /// Returns a human-readable name for the variant.
    ///
    /// Used in error messages to describe the actual type received when a
    /// conversion fails.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Node(_) => "Node",
            Value::Relationship(_) => "Relationship",
            Value::Bytes(_) => "Bytes",
            Value::Date(_) => "Date",
            Value::LocalTime(_) => "LocalTime",
            Value::LocalDateTime(_) => "LocalDateTime",
            Value::DateTime(_) => "DateTime",
            Value::Duration(_) => "Duration",
            Value::Point2D(_) => "Point2D",
            Value::Point3D(_) => "Point3D",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The property set of an entity or the entries of a map.
    ///
    /// These are the values the path finder can drill into.
    pub fn properties(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            Value::Node(n) => Some(&n.properties),
            Value::Relationship(r) => Some(&r.properties),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// String form used when a list is joined into a string member.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::List(xs) => {
                f.write_str("[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{x}")?;
                }
                f.write_str("]")
            }
            Value::Map(m) => write_props(f, m),
            Value::Node(n) => {
                write!(f, "(:{} ", n.labels.join(":"))?;
                write_props(f, &n.properties)?;
                f.write_str(")")
            }
            Value::Relationship(r) => {
                write!(f, "[:{} ", r.rel_type)?;
                write_props(f, &r.properties)?;
                f.write_str("]")
            }
            Value::Bytes(b) => write!(f, "{b:?}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::LocalTime(t) => write!(f, "{t}"),
            Value::LocalDateTime(dt) => write!(f, "{dt}"),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Duration(d) => write!(f, "{d:?}"),
            Value::Point2D(p) => write!(f, "point({{srid: {}, x: {}, y: {}}})", p.sr_id, p.x, p.y),
            Value::Point3D(p) => write!(f, "point({{srid: {}, x: {}, y: {}, z: {}}})", p.sr_id, p.x, p.y, p.z),
        }
    }
}

fn write_props(f: &mut fmt::Formatter<'_>, props: &IndexMap<String, Value>) -> fmt::Result {
    f.write_str("{")?;
    for (i, (k, v)) in props.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{k}: {v}")?;
    }
    f.write_str("}")
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Integer(v as i64)
            }
        })*
    };
}

impl_from_int!(i64, i32, i16, i8, u32, u16, u8);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Node> for Value {
    fn from(v: Node) -> Self {
        Value::Node(v)
    }
}

impl From<Relationship> for Value {
    fn from(v: Relationship) -> Self {
        Value::Relationship(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    /// Collects key/value pairs into a [`Value::Map`].
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Spatial and binary types
// ---------------------------------------------------------------------------

/// A spatial point in two dimensions; `sr_id` names the coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub struct Point2D {
    pub sr_id: i64,
    pub x: f64,
    pub y: f64,
}

/// A spatial point in three dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Point3D {
    pub sr_id: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Newtype wrapper for raw bytes.
///
/// A dedicated type is used instead of `Vec<u8>` because a blanket
/// `FromValue` impl already exists for `Vec<T: FromValue>`, and Rust does not
/// support specialization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteArray(pub Vec<u8>);


//! Conversion from `neo4rs` driver values into [`Value`] and [`Record`].
//!
//! This module isolates the `neo4rs` value API to a single location so the
//! rest of the engine only deals with [`Value`].

use indexmap::IndexMap;
use neo4rs::{BoltMap, BoltType, Row};
use crate::entity::{Node, Relationship};
use crate::error::MapError;
use crate::record::Record;
use crate::value::{Point2D, Point3D, Value};

/// Returns a human-readable name for a [`neo4rs::BoltType`] variant.
pub fn bolt_type_name(v: &BoltType) -> &'static str {
    match v {
        BoltType::Null(_) => "Null",
        BoltType::Boolean(_) => "Boolean",
        BoltType::Integer(_) => "Integer",
        BoltType::Float(_) => "Float",
        BoltType::String(_) => "String",
        BoltType::Bytes(_) => "Bytes",
        BoltType::List(_) => "List",
        BoltType::Map(_) => "Map",
        BoltType::Node(_) => "Node",
        BoltType::Relation(_) => "Relationship",
        BoltType::UnboundedRelation(_) => "UnboundedRelationship",
        BoltType::Path(_) => "Path",
        BoltType::Point2D(_) => "Point2D",
        BoltType::Point3D(_) => "Point3D",
        BoltType::Duration(_) => "Duration",
        BoltType::Date(_) => "Date",
        BoltType::Time(_) => "Time",
        BoltType::LocalTime(_) => "LocalTime",
        BoltType::LocalDateTime(_) => "LocalDateTime",
        BoltType::DateTime(_) => "DateTime",
        BoltType::DateTimeZoneId(_) => "DateTimeZoneId",
    }
}

fn unsupported(other: &BoltType) -> MapError {
    MapError::type_mismatch("a mappable value", bolt_type_name(other), "Value")
}

// Sorted so that equal key sets always produce the same record shape.
fn convert_map(map: BoltMap) -> Result<IndexMap<String, Value>, MapError> {
    let mut out = map
        .value
        .into_iter()
        .map(|(k, v)| Ok((k.value, Value::try_from(v)?)))
        .collect::<Result<IndexMap<_, _>, MapError>>()?;
    out.sort_keys();
    Ok(out)
}

/// `Time` (time with offset), unbounded relationships and paths have no
/// [`Value`] counterpart and are rejected.
impl TryFrom<BoltType> for Value {
    type Error = MapError;

    fn try_from(value: BoltType) -> Result<Self, MapError> {
        Ok(match value {
            BoltType::Null(_) => Value::Null,
            BoltType::Boolean(b) => Value::Boolean(b.value),
            BoltType::Integer(i) => Value::Integer(i.value),
            BoltType::Float(f) => Value::Float(f.value),
            BoltType::String(s) => Value::String(s.value),
            BoltType::Bytes(b) => Value::Bytes(b.value.to_vec()),
            BoltType::List(xs) => Value::List(
                xs.value
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            BoltType::Map(m) => Value::Map(convert_map(m)?),
            BoltType::Node(n) => {
                let labels = n
                    .labels
                    .value
                    .into_iter()
                    .map(|l| match l {
                        BoltType::String(s) => Ok(s.value),
                        other => Err(MapError::type_mismatch("String", bolt_type_name(&other), "node label")),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Value::Node(Node {
                    id: n.id.value,
                    labels,
                    properties: convert_map(n.properties)?,
                })
            }
            BoltType::Relation(r) => Value::Relationship(Relationship {
                id: r.id.value,
                start_node_id: r.start_node_id.value,
                end_node_id: r.end_node_id.value,
                rel_type: r.typ.value,
                properties: convert_map(r.properties)?,
            }),
            BoltType::Point2D(p) => Value::Point2D(Point2D {
                sr_id: p.sr_id.value,
                x: p.x.value,
                y: p.y.value,
            }),
            BoltType::Point3D(p) => Value::Point3D(Point3D {
                sr_id: p.sr_id.value,
                x: p.x.value,
                y: p.y.value,
                z: p.z.value,
            }),
            BoltType::Duration(d) => Value::Duration(d.into()),
            BoltType::Date(d) => Value::Date(d.try_into().map_err(|e: neo4rs::Error| {
                MapError::Mapping(format!("BoltDate -> NaiveDate: {e}"))
            })?),
            BoltType::LocalTime(t) => Value::LocalTime(t.into()),
            BoltType::LocalDateTime(dt) => Value::LocalDateTime(dt.try_into().map_err(|e: neo4rs::Error| {
                MapError::Mapping(format!("BoltLocalDateTime -> NaiveDateTime: {e}"))
            })?),
            BoltType::DateTime(dt) => Value::DateTime(dt.try_into().map_err(|e: neo4rs::Error| {
                MapError::Mapping(format!("BoltDateTime -> DateTime<FixedOffset>: {e}"))
            })?),
            BoltType::DateTimeZoneId(dt) => Value::DateTime((&dt).try_into().map_err(|e: neo4rs::Error| {
                MapError::Mapping(format!("BoltDateTimeZoneId -> DateTime<FixedOffset>: {e}"))
            })?),
            other => return Err(unsupported(&other)),
        })
    }
}

/// Read every column of a driver row.
///
/// `neo4rs` keeps a row's columns in a hash map and does not expose the
/// query's column order, so fields come out sorted by column name.
impl TryFrom<&Row> for Record {
    type Error = MapError;

    fn try_from(row: &Row) -> Result<Self, MapError> {
        let columns: BoltMap = row
            .to_strict()
            .map_err(|e| MapError::Mapping(format!("reading row columns: {e}")))?;
        let mut columns: Vec<(String, BoltType)> =
            columns.value.into_iter().map(|(k, v)| (k.value, v)).collect();
        columns.sort_by(|a, b| a.0.cmp(&b.0));

        let mut record = Record::new();
        for (name, value) in columns {
            let value = Value::try_from(value)
                .map_err(|e| e.with_context(format!("column '{name}'")))?;
            record = record.with(name, value);
        }
        Ok(record)
    }
}

impl TryFrom<Row> for Record {
    type Error = MapError;

    fn try_from(row: Row) -> Result<Self, MapError> {
        Record::try_from(&row)
    }
}

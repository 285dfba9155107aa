
//! Graph entities carried inside record values.

use indexmap::IndexMap;
use crate::value::Value;

/// A node: identity, label set and property map.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: IndexMap<String, Value>,
}

impl Node {
    pub fn new<L, P, K>(id: i64, labels: L, properties: P) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        P: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Node {
            id,
            labels: labels.into_iter().map(Into::into).collect(),
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Whether the node carries `label` (exact match).
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// A relationship: identity, endpoint identities, type and property map.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: i64,
    pub start_node_id: i64,
    pub end_node_id: i64,
    pub rel_type: String,
    pub properties: IndexMap<String, Value>,
}

impl Relationship {
    pub fn new<P, K>(id: i64, start_node_id: i64, end_node_id: i64, rel_type: impl Into<String>, properties: P) -> Self
    where
        P: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Relationship {
            id,
            start_node_id,
            end_node_id,
            rel_type: rel_type.into(),
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

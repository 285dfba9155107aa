
//! Records and the read-only views the mapper walks.
//!
//! A [`Record`] owns one query-result row. A [`RecordView`] borrows either a
//! record or, while recursing into an entity or nested map, that inner
//! property set together with a back-reference to the view it came from.

use indexmap::IndexMap;
use crate::value::Value;

/// One row of a query result: an ordered mapping from column name to value.
///
/// Column order is preserved. Lookup by name through the mapping layer is
/// case-insensitive; [`get`](Record::get) itself is exact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, builder style. A repeated name replaces the earlier value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Read a value by exact column name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Read a value by column name, ignoring case.
    pub fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        self.view().get_ignore_case(key)
    }

    /// Check whether a column exists in the row.
    pub fn has_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// A top-level view of this record.
    pub fn view(&self) -> RecordView<'_> {
        RecordView { fields: &self.fields, parent: None }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A borrowed, record-shaped view over a field set.
///
/// Views created by [`nested`](RecordView::nested) are the synthetic
/// sub-records used when mapping into an entity's properties or a nested map:
/// a lookup that fails against the inner fields is retried against `parent`.
/// Views are never cached.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    fields: &'a IndexMap<String, Value>,
    parent: Option<&'a RecordView<'a>>,
}

impl<'a> RecordView<'a> {
    /// A view over a bare field set with no outer record.
    pub fn new(fields: &'a IndexMap<String, Value>) -> Self {
        RecordView { fields, parent: None }
    }

    /// A synthetic sub-record over `fields`, falling back to `parent`.
    pub fn nested(fields: &'a IndexMap<String, Value>, parent: &'a RecordView<'a>) -> Self {
        RecordView { fields, parent: Some(parent) }
    }

    pub fn fields(&self) -> &'a IndexMap<String, Value> {
        self.fields
    }

    pub fn parent(&self) -> Option<&'a RecordView<'a>> {
        self.parent
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key)
    }

    /// Exact match first, then the first field whose name matches ignoring case.
    pub fn get_ignore_case(&self, key: &str) -> Option<&'a Value> {
        self.position_ignore_case(key)
            .and_then(|i| self.fields.get_index(i))
            .map(|(_, v)| v)
    }

    pub(crate) fn position_ignore_case(&self, key: &str) -> Option<usize> {
        self.fields
            .get_index_of(key)
            .or_else(|| self.fields.keys().position(|k| eq_ignore_case(k, key)))
    }
}

/// Unicode-aware case-insensitive comparison without allocating.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

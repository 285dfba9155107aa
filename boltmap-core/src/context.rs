
//! The state threaded through one mapping call.

use crate::error::MapError;
use crate::path;
use crate::record::RecordView;
use crate::registry::MappingRegistry;
use crate::traits::Mappable;
use crate::value::Value;

/// The record being mapped and the registry that resolves nested types.
#[derive(Clone, Copy)]
pub struct MappingContext<'a> {
    registry: &'a MappingRegistry,
    record: RecordView<'a>,
}

impl<'a> MappingContext<'a> {
    pub fn new(registry: &'a MappingRegistry, record: RecordView<'a>) -> Self {
        MappingContext { registry, record }
    }

    pub fn registry(&self) -> &'a MappingRegistry {
        self.registry
    }

    pub fn record(&self) -> &RecordView<'a> {
        &self.record
    }

    /// Resolve a source path against the current record (with outer fallback).
    pub fn resolve(&self, source: &str) -> Option<&'a Value> {
        path::resolve(&self.record, source)
    }

    /// Read and convert a source path, e.g. inside a whole-object function.
    ///
    /// ```rust,ignore
    /// registry.register_mapping::<Age, _>(|b| {
    ///     b.map_whole_object(|ctx| Ok::<_, MapError>(Age(ctx.get::<i64>("active")? - ctx.get::<i64>("born")?)));
    /// })?;
    /// ```
    pub fn get<T: crate::FromValue>(&self, source: &str) -> Result<T, MapError> {
        let value = self
            .resolve(source)
            .ok_or_else(|| MapError::missing_field(source, "record"))?;
        T::from_value(value, self)
    }

    /// Map an entity or nested map into `T`.
    ///
    /// The entity's properties (or the map's entries) become a synthetic
    /// sub-record whose lookups fall back to the current record.
    pub fn map_nested<T: Mappable>(&self, value: &Value) -> Result<T, MapError> {
        let fields = value.properties().ok_or_else(|| {
            MapError::type_mismatch("Node, Relationship or Map", value.kind(), std::any::type_name::<T>())
        })?;
        let sub = RecordView::nested(fields, &self.record);
        let ctx = MappingContext::new(self.registry, sub);
        self.registry.mapper::<T>()?.map(&ctx)
    }
}

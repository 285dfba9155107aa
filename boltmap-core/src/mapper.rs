
//! The compiled mapper: executes a [`MappingDescriptor`] against records.
//!
//! Path locations depend only on a record's shape, so each mapper keeps a
//! bounded index from shape to pre-resolved [`Location`]s. Records of a
//! shape seen before skip path resolution entirely. The index is keyed by
//! a fingerprint hashed straight from the record, and a hit is confirmed
//! against the stored shape.

use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use dashmap::DashMap;
use tracing::trace;
use crate::context::MappingContext;
use crate::descriptor::{Aspect, MappingDescriptor, Param, Property};
use crate::error::{run_callback, BoxError, MapError};
use crate::path::{self, Location};
use crate::record::RecordView;
use crate::traits::{FromValue, Mappable, RecordMapper};
use crate::value::Value;

/// Upper bound on the number of distinct record shapes indexed per mapper.
///
/// Records of further shapes are still mapped, just without caching.
pub const MAX_CACHED_SHAPES: usize = 64;

#[derive(Debug)]
struct ShapeField {
    name: String,
    keys: Option<Vec<String>>,
}

/// Field names plus, for entity and map fields, their keys.
#[derive(Debug)]
struct Shape(Vec<ShapeField>);

impl Shape {
    fn of(view: &RecordView<'_>) -> Self {
        Shape(
            view.fields()
                .iter()
                .map(|(name, value)| ShapeField {
                    name: name.clone(),
                    keys: value.properties().map(|p| p.keys().cloned().collect()),
                })
                .collect(),
        )
    }

    fn matches(&self, view: &RecordView<'_>) -> bool {
        let fields = view.fields();
        self.0.len() == fields.len()
            && self.0.iter().zip(fields).all(|(field, (name, value))| {
                field.name == *name
                    && match (&field.keys, value.properties()) {
                        (None, None) => true,
                        (Some(keys), Some(props)) => keys.len() == props.len() && keys.iter().eq(props.keys()),
                        _ => false,
                    }
            })
    }

    /// Hash of `view`'s shape; equal shapes hash equally. Does not allocate.
    fn fingerprint(view: &RecordView<'_>) -> u64 {
        let mut hasher = DefaultHasher::new();
        view.fields().len().hash(&mut hasher);
        for (name, value) in view.fields() {
            name.hash(&mut hasher);
            match value.properties() {
                Some(props) => {
                    props.len().hash(&mut hasher);
                    props.keys().for_each(|k| k.hash(&mut hasher));
                }
                None => usize::MAX.hash(&mut hasher),
            }
        }
        hasher.finish()
    }
}

/// A cached shape and its resolved paths.
struct IndexedShape {
    shape: Shape,
    index: Arc<PathIndex>,
}

/// Source path to location, for one record shape.
#[derive(Debug, Default)]
struct PathIndex {
    locations: HashMap<String, Option<Location>>,
}

impl PathIndex {
    fn build(view: &RecordView<'_>, sources: &[String]) -> Self {
        PathIndex {
            locations: sources
                .iter()
                .map(|s| (s.clone(), path::locate(view, s)))
                .collect(),
        }
    }
}

/// Resolves source paths for one mapping call.
pub(crate) struct Resolver<'a> {
    ctx: &'a MappingContext<'a>,
    index: &'a PathIndex,
}

impl<'a> Resolver<'a> {
    fn resolve(&self, source: &str) -> Option<&'a Value> {
        let view = self.ctx.record();
        let local = match self.index.locations.get(source) {
            Some(loc) => loc.and_then(|l| l.get(view)).filter(|v| !v.is_null()),
            None => path::resolve_local(view, source),
        };
        local.or_else(|| view.parent().and_then(|p| path::resolve_local(p, source)))
    }
}

/// Select the aspect of a resolved value a binding captures.
///
/// `None` means the value does not carry the aspect (e.g. labels of a map).
fn capture<'v>(aspect: Aspect, value: &'v Value) -> Option<Cow<'v, Value>> {
    match (aspect, value) {
        (Aspect::Property, v) => Some(Cow::Borrowed(v)),
        (Aspect::NodeLabels, Value::Node(n)) => Some(Cow::Owned(Value::List(
            n.labels.iter().map(|l| Value::String(l.clone())).collect(),
        ))),
        (Aspect::RelationshipType, Value::Relationship(r)) => {
            Some(Cow::Owned(Value::String(r.rel_type.clone())))
        }
        _ => None,
    }
}

fn binding_context(type_name: &str, member: &str, source: &str) -> String {
    format!("{type_name}::{member} (source '{source}')")
}

/// Outcome of looking up one parameter.
enum Lookup<'a> {
    Found(Cow<'a, Value>),
    /// The path resolved, but to a value without the captured aspect.
    Uncaptured,
    Absent,
}

/// Outcome of binding one parameter.
enum Bound<P> {
    Value(P),
    Uncaptured,
    Absent,
}

impl<P> Bound<P> {
    fn or_default(self) -> P
    where
        P: Default,
    {
        match self {
            Bound::Value(v) => v,
            Bound::Uncaptured | Bound::Absent => P::default(),
        }
    }
}

/// Constructor arguments, handed out in declaration order.
///
/// Each `next*` call consumes one declared [`Param`]: its source path is
/// resolved, the declared aspect is captured, and the value is coerced. An
/// absent path falls back to the parameter's literal default.
///
/// A `node_labels` or `relationship_type` parameter whose path resolves to
/// something other than a node or relationship binds `P::default()`; read
/// such parameters with [`next_captured`](Self::next_captured) or one of
/// the `_or_default` variants. [`next`](Self::next) has no default to fall
/// back on and reports the parameter as missing.
pub struct ConstructorArgs<'a> {
    type_name: &'a str,
    params: &'a [Param],
    resolver: &'a Resolver<'a>,
    pos: usize,
}

impl<'a> ConstructorArgs<'a> {
    fn next_param(&mut self) -> Result<&'a Param, MapError> {
        let param = self.params.get(self.pos).ok_or_else(|| {
            MapError::Mapping(format!(
                "constructor of {} reads more arguments than it declares ({})",
                self.type_name,
                self.params.len()
            ))
        })?;
        self.pos += 1;
        Ok(param)
    }

    fn lookup(&self, param: &'a Param) -> Lookup<'a> {
        match self.resolver.resolve(&param.source) {
            Some(found) => match capture(param.aspect, found) {
                Some(value) => Lookup::Found(value),
                None => Lookup::Uncaptured,
            },
            None => match &param.default {
                Some(default) => Lookup::Found(Cow::Borrowed(default)),
                None => Lookup::Absent,
            },
        }
    }

    fn bind<P>(
        &self,
        param: &'a Param,
        convert: impl FnOnce(&Value, &MappingContext<'_>) -> Result<P, MapError>,
    ) -> Result<Bound<P>, MapError> {
        let value = match self.lookup(param) {
            Lookup::Found(value) => value,
            Lookup::Uncaptured => return Ok(Bound::Uncaptured),
            Lookup::Absent => return Ok(Bound::Absent),
        };
        convert(&*value, self.resolver.ctx)
            .map(Bound::Value)
            .map_err(|e| e.with_context(binding_context(self.type_name, &param.name, &param.source)))
    }

    fn missing(&self, param: &Param) -> MapError {
        MapError::missing_field(&param.source, self.type_name)
    }

    fn convert_with<P, E, C>(&self, param: &'a Param, convert: C) -> Result<Bound<P>, MapError>
    where
        E: Into<BoxError>,
        C: FnOnce(&Value) -> Result<P, E>,
    {
        self.bind(param, |v, _| run_callback(self.type_name, &param.name, || convert(v)))
    }

    /// The next required argument.
    pub fn next<P: FromValue>(&mut self) -> Result<P, MapError> {
        let param = self.next_param()?;
        match self.bind(param, P::from_value)? {
            Bound::Value(v) => Ok(v),
            Bound::Uncaptured | Bound::Absent => Err(self.missing(param)),
        }
    }

    /// The next optional argument; `P::default()` when absent.
    pub fn next_or_default<P: FromValue + Default>(&mut self) -> Result<P, MapError> {
        let param = self.next_param()?;
        Ok(self.bind(param, P::from_value)?.or_default())
    }

    /// The next required aspect-capturing argument.
    ///
    /// Missing when the path is absent; `P::default()` when the path holds
    /// a value that does not carry the aspect.
    pub fn next_captured<P: FromValue + Default>(&mut self) -> Result<P, MapError> {
        let param = self.next_param()?;
        match self.bind(param, P::from_value)? {
            Bound::Absent => Err(self.missing(param)),
            bound => Ok(bound.or_default()),
        }
    }

    /// The next required argument, converted by a user function.
    pub fn next_with<P, E, C>(&mut self, convert: C) -> Result<P, MapError>
    where
        E: Into<BoxError>,
        C: FnOnce(&Value) -> Result<P, E>,
    {
        let param = self.next_param()?;
        match self.convert_with(param, convert)? {
            Bound::Value(v) => Ok(v),
            Bound::Uncaptured | Bound::Absent => Err(self.missing(param)),
        }
    }

    /// The next optional argument, converted by a user function.
    pub fn next_with_or_default<P, E, C>(&mut self, convert: C) -> Result<P, MapError>
    where
        P: Default,
        E: Into<BoxError>,
        C: FnOnce(&Value) -> Result<P, E>,
    {
        let param = self.next_param()?;
        Ok(self.convert_with(param, convert)?.or_default())
    }

    /// [`next_captured`](Self::next_captured) with a user conversion.
    pub fn next_captured_with<P, E, C>(&mut self, convert: C) -> Result<P, MapError>
    where
        P: Default,
        E: Into<BoxError>,
        C: FnOnce(&Value) -> Result<P, E>,
    {
        let param = self.next_param()?;
        match self.convert_with(param, convert)? {
            Bound::Absent => Err(self.missing(param)),
            bound => Ok(bound.or_default()),
        }
    }

    /// Map the current record as a whole into `P`.
    pub fn flatten<P: Mappable>(&mut self) -> Result<P, MapError> {
        let param = self.next_param()?;
        let ctx = self.resolver.ctx;
        ctx.registry()
            .mapper::<P>()?
            .map(ctx)
            .map_err(|e| e.with_context(format!("{}::{} (flattened)", self.type_name, param.name)))
    }
}

/// A mapper executing an immutable [`MappingDescriptor`].
///
/// Safe to share across threads; the shape index is the only mutable state.
pub struct CompiledMapper<T> {
    descriptor: MappingDescriptor<T>,
    sources: Vec<String>,
    shapes: DashMap<u64, IndexedShape>,
}

impl<T> CompiledMapper<T> {
    pub fn new(descriptor: MappingDescriptor<T>) -> Self {
        let sources = descriptor.source_paths();
        CompiledMapper {
            descriptor,
            sources,
            shapes: DashMap::new(),
        }
    }

    pub fn descriptor(&self) -> &MappingDescriptor<T> {
        &self.descriptor
    }

    /// Number of record shapes currently indexed.
    pub fn cached_shapes(&self) -> usize {
        self.shapes.len()
    }

    fn index_for(&self, view: &RecordView<'_>) -> Arc<PathIndex> {
        let fingerprint = Shape::fingerprint(view);
        if let Some(cached) = self.shapes.get(&fingerprint) {
            if cached.shape.matches(view) {
                return Arc::clone(&cached.index);
            }
            // Fingerprint collision: resolve without caching.
            return Arc::new(PathIndex::build(view, &self.sources));
        }
        let index = Arc::new(PathIndex::build(view, &self.sources));
        if self.shapes.len() < MAX_CACHED_SHAPES {
            trace!(
                target_type = %self.descriptor.type_name,
                fields = view.fields().len(),
                "indexed new record shape"
            );
            self.shapes.entry(fingerprint).or_insert_with(|| IndexedShape {
                shape: Shape::of(view),
                index: Arc::clone(&index),
            });
        } else {
            trace!(target_type = %self.descriptor.type_name, "shape cache full, not indexing");
        }
        index
    }

    fn apply_property(
        &self,
        obj: &mut T,
        prop: &Property<T>,
        resolver: &Resolver<'_>,
    ) -> Result<(), MapError> {
        let type_name = &self.descriptor.type_name;
        let wrap = |e: MapError| e.with_context(binding_context(type_name, &prop.member, &prop.source));
        let found = resolver.resolve(&prop.source);
        match found.and_then(|v| capture(prop.aspect, v)) {
            Some(value) => (prop.apply)(obj, &*value, resolver.ctx).map_err(wrap),
            // Present but lacking the captured aspect: leave the member alone.
            None if found.is_some() => Ok(()),
            None => match &prop.default {
                Some(default) => (prop.apply)(obj, default, resolver.ctx).map_err(wrap),
                None if prop.optional => Ok(()),
                None => Err(MapError::missing_field(&prop.source, type_name)),
            },
        }
    }
}

impl<T: Send + 'static> RecordMapper<T> for CompiledMapper<T> {
    fn map(&self, ctx: &MappingContext<'_>) -> Result<T, MapError> {
        let index = self.index_for(ctx.record());
        let resolver = Resolver { ctx, index: &index };
        let d = &self.descriptor;

        let mut obj = match (&d.whole_object, &d.constructor) {
            (Some(whole), _) => whole(ctx)?,
            (None, Some(ctor)) => {
                let mut args = ConstructorArgs {
                    type_name: &d.type_name,
                    params: &ctor.params,
                    resolver: &resolver,
                    pos: 0,
                };
                (ctor.invoke)(&mut args)?
            }
            (None, None) => return Err(MapError::no_usable_constructor(&d.type_name)),
        };

        for prop in &d.properties {
            self.apply_property(&mut obj, prop, &resolver)?;
        }
        for computed in &d.computed {
            (computed.apply)(&mut obj, ctx)
                .map_err(|e| e.with_context(format!("{}::{} (computed)", d.type_name, computed.member)))?;
        }
        Ok(obj)
    }
}

impl<T> std::fmt::Debug for CompiledMapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledMapper")
            .field("type_name", &self.descriptor.type_name)
            .field("sources", &self.sources)
            .field("cached_shapes", &self.shapes.len())
            .finish()
    }
}

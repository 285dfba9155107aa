
//! The mapping registry: one mapper per destination type.
//!
//! Convention mappers are built lazily on first request and cached.
//! Registration replaces whatever mapper a type had, including a cached
//! convention mapper. Lookups take a read lock; building happens outside
//! any lock and the first mapper published for a type wins.

use std::any::{type_name, Any, TypeId};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use parking_lot::RwLock;
use tracing::debug;
use crate::builder::MappingBuilder;
use crate::context::MappingContext;
use crate::convention;
use crate::error::MapError;
use crate::mapper::CompiledMapper;
use crate::record::{Record, RecordView};
use crate::traits::{Mappable, MappingProvider, RecordMapper};

type ErasedMapFn =
    Arc<dyn Fn(&MappingContext<'_>) -> Result<Box<dyn Any + Send>, MapError> + Send + Sync>;

struct Entry {
    type_name: &'static str,
    /// An `Arc<dyn RecordMapper<T>>`, type-erased.
    mapper: Arc<dyn Any + Send + Sync>,
    erased: ErasedMapFn,
}

impl Entry {
    fn new<T: Send + 'static>(mapper: Arc<dyn RecordMapper<T>>) -> Self {
        let inner = Arc::clone(&mapper);
        Entry {
            type_name: type_name::<T>(),
            mapper: Arc::new(mapper),
            erased: Arc::new(move |ctx| {
                inner.map(ctx).map(|v| Box::new(v) as Box<dyn Any + Send>)
            }),
        }
    }

    fn typed<T: 'static>(&self) -> Option<Arc<dyn RecordMapper<T>>> {
        self.mapper.downcast_ref::<Arc<dyn RecordMapper<T>>>().cloned()
    }
}

/// Holds the mapper for every destination type.
///
/// Most applications use the process-wide [`global`](Self::global)
/// registry through the facade functions; tests usually create their own
/// with [`new`](Self::new).
#[derive(Default)]
pub struct MappingRegistry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

static GLOBAL: OnceLock<MappingRegistry> = OnceLock::new();

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static MappingRegistry {
        GLOBAL.get_or_init(MappingRegistry::new)
    }

    /// The mapper for `T`, building the convention mapper on first use.
    pub fn mapper<T: Mappable>(&self) -> Result<Arc<dyn RecordMapper<T>>, MapError> {
        if let Some(mapper) = self.lookup::<T>() {
            return Ok(mapper);
        }
        let descriptor = convention::describe::<T>()?;
        let mapper: Arc<dyn RecordMapper<T>> = Arc::new(CompiledMapper::new(descriptor));
        Ok(self.publish_if_absent(mapper))
    }

    fn lookup<T: 'static>(&self) -> Option<Arc<dyn RecordMapper<T>>> {
        self.entries.read().get(&TypeId::of::<T>()).and_then(Entry::typed::<T>)
    }

    fn publish_if_absent<T: Send + 'static>(
        &self,
        mapper: Arc<dyn RecordMapper<T>>,
    ) -> Arc<dyn RecordMapper<T>> {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Entry::new(Arc::clone(&mapper)));
        entry.typed::<T>().unwrap_or(mapper)
    }

    fn publish<T: Send + 'static>(&self, mapper: Arc<dyn RecordMapper<T>>) {
        self.entries.write().insert(TypeId::of::<T>(), Entry::new(mapper));
    }

    /// Install a custom mapper for `T`, replacing any existing one.
    ///
    /// `T` must be [`Mappable`] like every typed entry point; after
    /// [`reset`](Self::reset) the type falls back to its convention mapping.
    pub fn register<T, M>(&self, mapper: M) -> &Self
    where
        T: Mappable,
        M: RecordMapper<T> + 'static,
    {
        debug!(target_type = type_name::<T>(), "registered custom mapper");
        self.publish::<T>(Arc::new(mapper));
        self
    }

    /// Configure `T`'s mapping with a [`MappingBuilder`], replacing any
    /// existing mapper.
    ///
    /// ```rust,ignore
    /// registry.register_mapping::<Person, _>(|b| {
    ///     b.use_default_mapping()
    ///         .map(Property::new("name", |p: &mut Person, v: String| p.name = v).source("person.name"));
    /// })?;
    /// ```
    pub fn register_mapping<T, F>(&self, configure: F) -> Result<&Self, MapError>
    where
        T: Mappable,
        F: FnOnce(&mut MappingBuilder<T>),
    {
        let mut builder = MappingBuilder::new();
        configure(&mut builder);
        let descriptor = builder.build()?;
        debug!(target_type = type_name::<T>(), "registered explicit mapping");
        self.publish::<T>(Arc::new(CompiledMapper::new(descriptor)));
        Ok(self)
    }

    /// Let `provider` register its mappings; they override existing ones.
    pub fn register_provider(&self, provider: &dyn MappingProvider) -> Result<&Self, MapError> {
        provider.create_mappers(self)?;
        debug!(mappers = self.entries.read().len(), "applied mapping provider");
        Ok(self)
    }

    /// Forget every mapper, custom and cached alike.
    pub fn reset(&self) {
        let mut entries = self.entries.write();
        debug!(mappers = entries.len(), "resetting mapping registry");
        entries.clear();
    }

    /// Whether a mapper for `T` is currently held (registered or cached).
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.read().contains_key(&TypeId::of::<T>())
    }

    /// Type names of every mapper currently held.
    pub fn registered_types(&self) -> Vec<&'static str> {
        self.entries.read().values().map(|e| e.type_name).collect()
    }

    /// Map one record into `T`.
    pub fn map_record<T: Mappable>(&self, record: &Record) -> Result<T, MapError> {
        self.map_view(record.view())
    }

    /// Map a record view into `T`.
    pub fn map_view<T: Mappable>(&self, view: RecordView<'_>) -> Result<T, MapError> {
        let ctx = MappingContext::new(self, view);
        self.mapper::<T>()?.map(&ctx)
    }

    /// Map a record into the type identified by `type_id`.
    ///
    /// Only types that already have a mapper (registered, or cached by an
    /// earlier typed call) can be mapped this way.
    pub fn map_record_any(
        &self,
        record: &Record,
        type_id: TypeId,
    ) -> Result<Box<dyn Any + Send>, MapError> {
        let erased = self
            .entries
            .read()
            .get(&type_id)
            .map(|e| Arc::clone(&e.erased))
            .ok_or_else(|| MapError::Mapping(format!("no mapper registered for {type_id:?}")))?;
        let ctx = MappingContext::new(self, record.view());
        erased(&ctx)
    }

    /// Lazily map a sequence of records.
    pub fn map_all<'r, T, I>(&'r self, records: I) -> impl Iterator<Item = Result<T, MapError>> + 'r
    where
        T: Mappable,
        I: IntoIterator,
        I::Item: Borrow<Record>,
        I::IntoIter: 'r,
    {
        records.into_iter().map(move |r| self.map_record(r.borrow()))
    }
}

impl std::fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}


//! Core traits connecting user types to the mapping engine.

use crate::context::MappingContext;
use crate::descriptor::MappingInfo;
use crate::error::MapError;
use crate::registry::MappingRegistry;
use crate::value::Value;

/// A type the convention engine can build from a record.
///
/// Automatically implemented by `#[derive(Mappable)]`. The implementation
/// declares the type's constructors and settable properties once; the
/// registry turns that declaration into a compiled mapper on first use and
/// caches it.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Mappable)]
/// struct Person {
///     #[boltmap(source = "person.name")]
///     name: String,
///     born: Option<i64>,
/// }
/// ```
pub trait Mappable: Sized + Send + 'static {
    /// Describe the constructors and properties available for mapping.
    fn mapping_info() -> MappingInfo<Self>;
}

/// Converts a single [`Value`] into a Rust type.
///
/// This is the value coercer. Implementations exist for primitives,
/// collections, temporal types, spatial types and the entity types. See
/// [`convert`](crate::convert) for the rules.
///
/// `#[derive(Mappable)]` also implements this trait, recursing into the
/// engine when the value is an entity or map, so mapped types can be nested
/// inside each other and inside `Vec`s.
pub trait FromValue: Sized {
    /// Convert `value`, with `ctx` describing the record it was read from.
    fn from_value(value: &Value, ctx: &MappingContext<'_>) -> Result<Self, MapError>;
}

/// Maps a whole record into `T`.
///
/// [`CompiledMapper`](crate::mapper::CompiledMapper) implements this for
/// convention and builder mappings; implement it directly to take over
/// mapping of a type entirely and install it with
/// [`MappingRegistry::register`].
pub trait RecordMapper<T>: Send + Sync {
    fn map(&self, ctx: &MappingContext<'_>) -> Result<T, MapError>;
}

impl<T, F> RecordMapper<T> for F
where
    F: Fn(&MappingContext<'_>) -> Result<T, MapError> + Send + Sync,
{
    fn map(&self, ctx: &MappingContext<'_>) -> Result<T, MapError> {
        self(ctx)
    }
}

/// Registers many types' mappings in one call.
///
/// ```rust,ignore
/// struct AppMappings;
///
/// impl MappingProvider for AppMappings {
///     fn create_mappers(&self, registry: &MappingRegistry) -> Result<(), MapError> {
///         registry.register_mapping::<Movie, _>(|b| {
///             b.use_default_mapping()
///                 .map(Property::new("title", |m: &mut Movie, v: String| m.title = v).source("name"));
///         })?;
///         Ok(())
///     }
/// }
/// ```
pub trait MappingProvider {
    fn create_mappers(&self, registry: &MappingRegistry) -> Result<(), MapError>;
}

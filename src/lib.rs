#![doc = r#"
Record-to-object mapping for Neo4j query results.

`boltmap` turns result records (rows of named values: scalars, lists, maps,
nodes, relationships) into typed Rust values. Mappings are discovered by
convention, refined per type where needed, compiled once, and cached in a
registry. Built on [`neo4rs`] 0.8.

# Quick start

## Map by convention

```rust
use boltmap::prelude::*;

#[derive(Debug, Mappable)]
struct Person {
    name: String,
    born: Option<i64>,
}

let record = Record::new().with("name", "Alice").with("born", 1990);
let registry = MappingRegistry::new();
let person: Person = registry.map_record(&record)?;
assert_eq!(person.name, "Alice");
assert_eq!(person.born, Some(1990));
# Ok::<(), MapError>(())
```

Field names are matched against record fields ignoring case. A field that
holds a node, relationship or map is searched too, so `name` also finds
`p.name` when the record has a single column `p` holding a node.

## Nested values and dotted paths

```rust
use boltmap::prelude::*;

#[derive(Debug, Mappable)]
struct Movie {
    title: String,
    #[boltmap(source = "person.name")]
    director: String,
    #[boltmap(source = "m", node_labels)]
    labels: Vec<String>,
}
```

Lists map element by element, and entity or map elements recurse into the
engine, so `Vec<Movie>` fields work out of the box.

## Explicit configuration

```rust
use boltmap::prelude::*;

#[derive(Debug, Default, Mappable)]
#[boltmap(default)]
struct Book {
    title: String,
    pages: i64,
}

let registry = MappingRegistry::new();
registry.register_mapping::<Book, _>(|b| {
    b.use_default_mapping()
        .map(Property::new("title", |b: &mut Book, v: String| b.title = v).source("name"));
})?;
# Ok::<(), MapError>(())
```

Group many registrations in a [`MappingProvider`] and install it with
[`register_provider`].

## Delegates

```rust
use boltmap::prelude::*;

let record = Record::new().with("a", 69).with("b", "test");
let registry = MappingRegistry::new();
let line = boltmap::map_with!(registry => &record, |a: i64, b: String| format!("{b}:{a}"))?;
assert_eq!(line, "test:69");
# Ok::<(), MapError>(())
```

## Execute queries

```rust,no_run
use boltmap::prelude::*;
use boltmap::query;

# #[derive(Mappable)]
# struct Person { name: String }
# async fn example(graph: &neo4rs::Graph) -> Result<(), MapError> {
let people: Vec<Person> = query::query("MATCH (p:Person) RETURN p")
    .fetch_all(graph)
    .await?;

let mut stream = query::query("MATCH (p:Person) RETURN p")
    .fetch_stream::<Person>(graph)
    .await?;
while let Some(result) = stream.next().await {
    let person = result?;
}
# Ok(())
# }
```

# Error handling

All operations return [`MapError`]. The mapper wraps every binding failure
with the type, member and source path:

```text
Person::born (source 'born'): type mismatch: expected Integer, got String "unknown" (i64)
```

Use [`MapError::kind`] to classify an error through those layers.

[`neo4rs`]: https://docs.rs/neo4rs
[`register_provider`]: MappingRegistry::register_provider
"#]

pub mod prelude;
pub mod query;
pub mod stream;

pub use boltmap_core as core;
pub use boltmap_macros::Mappable;

pub use boltmap_core::traits::{FromValue, Mappable as MappableTrait, MappingProvider, RecordMapper};
pub use boltmap_core::{
    BoxError, ErrorKind, MapError, MappingBuilder, MappingContext, MappingRegistry, Node, Property, Record,
    Relationship, Value,
};

/// Map one record into `T` with the global registry.
pub fn map_record<T: MappableTrait>(record: &Record) -> Result<T, MapError> {
    MappingRegistry::global().map_record(record)
}

/// Lazily map a sequence of records into `T` with the global registry.
pub fn map_all<T, I>(records: I) -> impl Iterator<Item = Result<T, MapError>>
where
    T: MappableTrait,
    I: IntoIterator,
    I::Item: std::borrow::Borrow<Record>,
    I::IntoIter: 'static,
{
    MappingRegistry::global().map_all(records)
}

/// Map one record through a delegate with the global registry.
pub fn map_with<D, Args>(record: &Record, names: &[&str], delegate: D) -> Result<D::Output, MapError>
where
    D: boltmap_core::Delegate<Args>,
{
    MappingRegistry::global().map_with(record, names, delegate)
}

/// Install a custom mapper for `T` in the global registry.
pub fn register<T, M>(mapper: M)
where
    T: MappableTrait,
    M: RecordMapper<T> + 'static,
{
    MappingRegistry::global().register::<T, M>(mapper);
}

/// Configure `T`'s mapping in the global registry.
pub fn register_mapping<T, F>(configure: F) -> Result<(), MapError>
where
    T: MappableTrait,
    F: FnOnce(&mut MappingBuilder<T>),
{
    MappingRegistry::global().register_mapping(configure).map(|_| ())
}

/// Install a provider's mappings in the global registry.
pub fn register_provider(provider: &dyn MappingProvider) -> Result<(), MapError> {
    MappingRegistry::global().register_provider(provider).map(|_| ())
}

/// Clear the global registry.
pub fn reset() {
    MappingRegistry::global().reset();
}

/// Map a record through an inline closure, naming fields after its parameters.
///
/// The body's value is the result; field names come from the parameter
/// names, so they cannot drift apart.
///
/// ```rust
/// # use boltmap::prelude::*;
/// let record = Record::new().with("a", 69).with("b", "test");
/// // global registry
/// let sum = boltmap::map_with!(&record, |a: i64| a + 1)?;
/// // explicit registry
/// let registry = MappingRegistry::new();
/// let pair = boltmap::map_with!(registry => &record, |a: i64, b: String| (a, b))?;
/// assert_eq!(sum, 70);
/// assert_eq!(pair, (69, "test".to_owned()));
/// # Ok::<(), MapError>(())
/// ```
#[macro_export]
macro_rules! map_with {
    ($registry:expr => $record:expr, |$($name:ident : $ty:ty),+ $(,)?| $body:expr) => {
        $registry.map_with(
            $record,
            &[$(stringify!($name)),+],
            |$($name: $ty),+| ::core::result::Result::<_, ::core::convert::Infallible>::Ok($body),
        )
    };
    ($record:expr, |$($name:ident : $ty:ty),+ $(,)?| $body:expr) => {
        $crate::map_with!($crate::MappingRegistry::global() => $record, |$($name: $ty),+| $body)
    };
}


//! Running Cypher through `neo4rs` and mapping the result rows.

use neo4rs::{BoltType, Graph, Query, Txn};
use tracing::debug;
use boltmap_core::error::MapError;
use boltmap_core::record::Record;
use boltmap_core::registry::MappingRegistry;
use boltmap_core::traits::Mappable;
use crate::stream::RecordStream;

pub(crate) fn map_row<T: Mappable>(registry: &MappingRegistry, row: &neo4rs::Row) -> Result<T, MapError> {
    let record = Record::try_from(row)?;
    registry.map_record(&record)
}

fn no_rows(op: &str) -> MapError {
    MapError::missing_field("row", op)
}

/// A Cypher query whose results are mapped on the way out.
///
/// Rows go through the global [`MappingRegistry`] unless another registry
/// is chosen with [`using`](Self::using).
///
/// ```rust,no_run
/// # use boltmap::query::MappedQuery;
/// # #[derive(boltmap::Mappable)] struct Person { name: String }
/// # async fn example(graph: &neo4rs::Graph) -> Result<(), boltmap::MapError> {
/// let alice: Option<Person> = MappedQuery::new("MATCH (p:Person {name: $name}) RETURN p")
///     .param("name", "Alice")
///     .fetch_optional(graph)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct MappedQuery {
    cypher: String,
    inner: Query,
    registry: &'static MappingRegistry,
}

impl MappedQuery {
    pub fn new(cypher: impl Into<String>) -> Self {
        let cypher = cypher.into();
        let inner = neo4rs::query(&cypher);
        MappedQuery { cypher, inner, registry: MappingRegistry::global() }
    }

    pub fn param(mut self, key: &str, value: impl Into<BoltType>) -> Self {
        self.inner = self.inner.param(key, value.into());
        self
    }

    /// Map rows with `registry` instead of the global one.
    pub fn using(mut self, registry: &'static MappingRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The first row, or `None` for an empty result.
    pub async fn fetch_optional<T: Mappable>(self, graph: &Graph) -> Result<Option<T>, MapError> {
        debug!(cypher = %self.cypher, "fetching at most one row");
        let mut rows = graph.execute(self.inner).await?;
        rows.next().await?.map(|row| map_row(self.registry, &row)).transpose()
    }

    /// The first row; an empty result is [`MapError::MissingField`].
    pub async fn fetch_one<T: Mappable>(self, graph: &Graph) -> Result<T, MapError> {
        self.fetch_optional(graph).await?.ok_or_else(|| no_rows("fetch_one"))
    }

    /// Every row, failing on the first one that does not map.
    pub async fn fetch_all<T: Mappable>(self, graph: &Graph) -> Result<Vec<T>, MapError> {
        debug!(cypher = %self.cypher, "fetching all rows");
        let mut rows = graph.execute(self.inner).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(map_row(self.registry, &row)?);
        }
        Ok(out)
    }

    /// [`fetch_optional`](Self::fetch_optional) inside a transaction.
    pub async fn fetch_optional_in<T: Mappable>(self, txn: &mut Txn) -> Result<Option<T>, MapError> {
        debug!(cypher = %self.cypher, "fetching at most one row in transaction");
        let mut rows = txn.execute(self.inner).await?;
        rows.next(txn.handle()).await?.map(|row| map_row(self.registry, &row)).transpose()
    }

    /// [`fetch_one`](Self::fetch_one) inside a transaction.
    pub async fn fetch_one_in<T: Mappable>(self, txn: &mut Txn) -> Result<T, MapError> {
        self.fetch_optional_in(txn).await?.ok_or_else(|| no_rows("fetch_one_in"))
    }

    /// [`fetch_all`](Self::fetch_all) inside a transaction.
    pub async fn fetch_all_in<T: Mappable>(self, txn: &mut Txn) -> Result<Vec<T>, MapError> {
        debug!(cypher = %self.cypher, "fetching all rows in transaction");
        let mut rows = txn.execute(self.inner).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next(txn.handle()).await? {
            out.push(map_row(self.registry, &row)?);
        }
        Ok(out)
    }

    /// Rows mapped lazily as the server sends them.
    ///
    /// Graph connections only; inside a transaction use
    /// [`fetch_all_in`](Self::fetch_all_in).
    pub async fn fetch_stream<T: Mappable>(self, graph: &Graph) -> Result<RecordStream<T>, MapError> {
        use futures::TryStreamExt;
        debug!(cypher = %self.cypher, "streaming rows");
        let rows = graph.execute(self.inner).await?.into_stream().into_stream();
        Ok(RecordStream::new(self.registry, Box::pin(rows)))
    }
}

/// Shorthand for [`MappedQuery::new`].
pub fn query(cypher: impl Into<String>) -> MappedQuery {
    MappedQuery::new(cypher)
}

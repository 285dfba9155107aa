
//! Streaming record mapping.
//!
//! [`RecordStream`] maps rows of a running `neo4rs` query one at a time;
//! [`map_stream`] and [`map_stream_with`] adapt any [`Stream`] of
//! [`Record`]s.

use std::borrow::Borrow;
use std::marker::PhantomData;
use std::pin::Pin;
use futures::stream::{Stream, StreamExt};
use boltmap_core::delegate::Delegate;
use boltmap_core::error::MapError;
use boltmap_core::record::Record;
use boltmap_core::registry::MappingRegistry;
use boltmap_core::traits::Mappable;

type RowStream = Pin<Box<dyn Stream<Item = Result<neo4rs::Row, neo4rs::Error>> + Send>>;

/// Rows of a running query, mapped into `T` one at a time.
///
/// Returned by [`MappedQuery::fetch_stream`](crate::query::MappedQuery::fetch_stream).
///
/// ```rust,no_run
/// # use boltmap::query::MappedQuery;
/// # use boltmap::MapError;
/// # #[derive(boltmap::Mappable)] struct Title { title: String }
/// # async fn example(graph: &neo4rs::Graph) -> Result<(), MapError> {
/// let mut titles = MappedQuery::new("MATCH (m:Movie) RETURN m.title AS title")
///     .fetch_stream::<Title>(graph)
///     .await?;
/// while let Some(title) = titles.next().await {
///     println!("{}", title?.title);
/// }
/// # Ok(())
/// # }
/// ```
pub struct RecordStream<T> {
    registry: &'static MappingRegistry,
    rows: RowStream,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Mappable> RecordStream<T> {
    pub(crate) fn new(registry: &'static MappingRegistry, rows: RowStream) -> Self {
        RecordStream { registry, rows, _marker: PhantomData }
    }

    /// The next mapped row; `None` once the server has sent everything.
    ///
    /// A row that fails to map yields `Some(Err(_))` and the stream can
    /// still be polled for the rows after it.
    pub async fn next(&mut self) -> Option<Result<T, MapError>> {
        let row = self.rows.next().await?;
        Some(row.map_err(MapError::from).and_then(|row| crate::query::map_row(self.registry, &row)))
    }
}

/// Map every record of `records` into `T`, lazily.
///
/// A failed record yields an `Err` item; the stream itself keeps going.
pub fn map_stream<'r, T, S>(
    registry: &'r MappingRegistry,
    records: S,
) -> impl Stream<Item = Result<T, MapError>> + 'r
where
    T: Mappable,
    S: Stream + 'r,
    S::Item: Borrow<Record>,
{
    records.map(move |r| registry.map_record(r.borrow()))
}

/// Map every record of `records` through `delegate`, reading the fields
/// named in `names`.
pub fn map_stream_with<'r, D, Args, S>(
    registry: &'r MappingRegistry,
    records: S,
    names: &'r [&'r str],
    delegate: D,
) -> impl Stream<Item = Result<D::Output, MapError>> + 'r
where
    D: Delegate<Args> + 'r,
    Args: 'r,
    S: Stream + 'r,
    S::Item: Borrow<Record>,
{
    records.map(move |r| registry.map_with_ref(r.borrow(), names, &delegate))
}

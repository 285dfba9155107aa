
//! Core engine, value model, and error types for boltmap.
//!
//! This crate is not meant to be used directly; use the [`boltmap`] facade
//! crate instead, which re-exports everything you need.
//!
//! [`boltmap`]: https://docs.rs/boltmap

pub mod traits;
pub mod error;

pub mod value;
pub mod entity;
pub mod record;
pub mod path;
pub mod convert;
pub mod context;

pub mod descriptor;
pub mod convention;
pub mod builder;
pub mod mapper;
pub mod registry;
pub mod delegate;

pub mod bolt;

pub use error::{BoxError, ErrorKind, MapError};
pub use value::{ByteArray, Point2D, Point3D, Value};
pub use entity::{Node, Relationship};
pub use record::{Record, RecordView};
pub use context::MappingContext;
pub use traits::{FromValue, Mappable, MappingProvider, RecordMapper};
pub use descriptor::{Aspect, Binding, BindingTarget, Constructor, MappingDescriptor, MappingInfo, Param, Property};
pub use builder::MappingBuilder;
pub use mapper::{CompiledMapper, ConstructorArgs, MAX_CACHED_SHAPES};
pub use registry::MappingRegistry;
pub use delegate::{Delegate, DelegateArgs};

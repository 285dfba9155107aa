//! Convenience re-exports for common boltmap usage.
//!
//! ```rust
//! use boltmap::prelude::*;
//! ```
//!
//! This imports the `Mappable` derive, the core traits (`MappableTrait`,
//! `FromValue`, `RecordMapper`, `MappingProvider`), the registry and its
//! builder types, the value model, the error type, and [`RecordStream`].

pub use crate::Mappable;
pub use boltmap_core::traits::{FromValue, Mappable as MappableTrait, MappingProvider, RecordMapper};
pub use boltmap_core::{
    Aspect, ByteArray, Constructor, ErrorKind, MapError, MappingBuilder, MappingContext, MappingInfo,
    MappingRegistry, Node, Param, Point2D, Point3D, Property, Record, Relationship, Value,
};
pub use crate::stream::RecordStream;

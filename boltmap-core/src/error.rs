
//! Error types for record mapping.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Boxed error returned by user callbacks (converters, whole-object
/// functions, delegates).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for all boltmap operations.
///
/// The mapper wraps every binding failure with [`Context`](MapError::Context)
/// via [`with_context`](MapError::with_context), producing chained messages like:
///
/// ```text
/// Person::born (source 'person.born'): type mismatch: expected Integer, got String (i64)
/// ```
///
/// Use [`kind`](MapError::kind) to classify an error regardless of how many
/// context layers surround it.
#[derive(Error, Debug)]
pub enum MapError {
    /// A general mapping error with a freeform message.
    #[error("mapping error: {0}")]
    Mapping(String),

    /// A required source path resolved to nothing.
    #[error("missing field '{field}' on {struct_name}")]
    MissingField { field: String, struct_name: String },

    /// A value was present but could not be coerced to the destination type.
    #[error("type mismatch: expected {expected}, got {got} ({context})")]
    TypeMismatch {
        expected: String,
        got: String,
        context: String,
    },

    /// The target type declares no constructor the engine can select.
    #[error("cannot map to {type_name}: no usable constructor")]
    NoUsableConstructor { type_name: String },

    /// A user-supplied converter, whole-object function or delegate failed.
    #[error("callback for {target}::{member} failed: {source}")]
    CallbackFailed {
        target: String,
        member: String,
        source: BoxError,
    },

    /// Wraps an inner error with additional context (type, member, source path).
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<MapError>,
    },

    /// A `neo4rs::Error` from the underlying driver.
    #[error("neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),
}

/// The failure taxonomy of a [`MapError`], independent of context layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingField,
    TypeMismatch,
    NoUsableConstructor,
    CallbackFailed,
    Driver,
    Other,
}

impl MapError {
    /// Create a [`TypeMismatch`](MapError::TypeMismatch) error.
    pub fn type_mismatch(expected: &str, got: &str, context: &str) -> Self {
        MapError::TypeMismatch {
            expected: expected.to_owned(),
            got: got.to_owned(),
            context: context.to_owned(),
        }
    }

    /// Create a [`MissingField`](MapError::MissingField) error.
    pub fn missing_field(field: &str, struct_name: &str) -> Self {
        MapError::MissingField {
            field: field.to_owned(),
            struct_name: struct_name.to_owned(),
        }
    }

    /// Create a [`NoUsableConstructor`](MapError::NoUsableConstructor) error.
    pub fn no_usable_constructor(type_name: &str) -> Self {
        MapError::NoUsableConstructor {
            type_name: type_name.to_owned(),
        }
    }

    /// Create a [`CallbackFailed`](MapError::CallbackFailed) error, keeping the
    /// callback's own error as the source.
    pub fn callback_failed(target: &str, member: &str, source: impl Into<BoxError>) -> Self {
        MapError::CallbackFailed {
            target: target.to_owned(),
            member: member.to_owned(),
            source: source.into(),
        }
    }

    /// Wrap this error with additional context, producing a [`Context`](MapError::Context) variant.
    ///
    /// ```rust
    /// # use boltmap_core::MapError;
    /// let err = MapError::type_mismatch("Integer", "String", "i64");
    /// let wrapped = err.with_context("Person::born (source 'born')");
    /// assert!(wrapped.to_string().contains("Person::born"));
    /// ```
    pub fn with_context(self, ctx: impl Into<String>) -> Self {
        MapError::Context {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Classify this error, looking through any [`Context`](MapError::Context) layers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::Context { source, .. } => source.kind(),
            MapError::MissingField { .. } => ErrorKind::MissingField,
            MapError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            MapError::NoUsableConstructor { .. } => ErrorKind::NoUsableConstructor,
            MapError::CallbackFailed { .. } => ErrorKind::CallbackFailed,
            MapError::Neo4j(_) => ErrorKind::Driver,
            MapError::Mapping(_) => ErrorKind::Other,
        }
    }

    /// The innermost error, with all [`Context`](MapError::Context) layers removed.
    pub fn root(&self) -> &MapError {
        match self {
            MapError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Run a user callback, reporting both its error and a panic inside it as
/// [`CallbackFailed`](MapError::CallbackFailed) for `target::member`.
pub(crate) fn run_callback<R, E, F>(target: &str, member: &str, f: F) -> Result<R, MapError>
where
    E: Into<BoxError>,
    F: FnOnce() -> Result<R, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result.map_err(|e| MapError::callback_failed(target, member, e)),
        Err(payload) => Err(MapError::callback_failed(target, member, panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload");
    format!("callback panicked: {detail}")
}


//! Mapping a record through a plain function.
//!
//! A delegate is any `Fn(A1, .., An) -> Result<R, E>` with 1 to 10
//! parameters. Each parameter is read from the top-level field of the same
//! name (ignoring case) and coerced with [`FromValue`]; the function's result
//! is the mapped value.
//!
//! ```rust,ignore
//! let line = registry.map_with(&record, &["a", "b"], |a: i64, b: String| {
//!     Ok::<_, Infallible>(format!("{b}:{a}"))
//! })?;
//! ```

use crate::context::MappingContext;
use crate::error::{run_callback, BoxError, MapError};
use crate::record::Record;
use crate::registry::MappingRegistry;
use crate::traits::FromValue;

/// Delegate arguments, read field by field in parameter order.
pub struct DelegateArgs<'a> {
    names: &'a [&'a str],
    ctx: &'a MappingContext<'a>,
    pos: usize,
}

impl<'a> DelegateArgs<'a> {
    /// Read and coerce the next parameter's field.
    pub fn next<P: FromValue>(&mut self) -> Result<P, MapError> {
        let name = *self.names.get(self.pos).ok_or_else(|| {
            MapError::Mapping(format!("delegate reads more than {} parameters", self.names.len()))
        })?;
        self.pos += 1;
        let value = self
            .ctx
            .record()
            .get_ignore_case(name)
            .ok_or_else(|| MapError::missing_field(name, "delegate"))?;
        P::from_value(value, self.ctx).map_err(|e| e.with_context(format!("delegate parameter '{name}'")))
    }
}

/// A function usable with [`MappingRegistry::map_with`].
///
/// Implemented for closures and functions of up to ten parameters whose
/// types implement [`FromValue`]. `Args` only disambiguates the arity.
pub trait Delegate<Args> {
    type Output;

    /// Number of parameters, which must match the number of field names.
    const ARITY: usize;

    fn call(&self, args: &mut DelegateArgs<'_>) -> Result<Self::Output, MapError>;
}

macro_rules! impl_delegate {
    ($n:expr; $($arg:ident),+) => {
        impl<Func, R, E, $($arg),+> Delegate<($($arg,)+)> for Func
        where
            Func: Fn($($arg),+) -> Result<R, E>,
            E: Into<BoxError>,
            $($arg: FromValue,)+
        {
            type Output = R;
            const ARITY: usize = $n;

            #[allow(non_snake_case)]
            fn call(&self, args: &mut DelegateArgs<'_>) -> Result<R, MapError> {
                $(let $arg = args.next::<$arg>()?;)+
                run_callback("delegate", "result", || self($($arg),+))
            }
        }
    };
}

impl_delegate!(1; A1);
impl_delegate!(2; A1, A2);
impl_delegate!(3; A1, A2, A3);
impl_delegate!(4; A1, A2, A3, A4);
impl_delegate!(5; A1, A2, A3, A4, A5);
impl_delegate!(6; A1, A2, A3, A4, A5, A6);
impl_delegate!(7; A1, A2, A3, A4, A5, A6, A7);
impl_delegate!(8; A1, A2, A3, A4, A5, A6, A7, A8);
impl_delegate!(9; A1, A2, A3, A4, A5, A6, A7, A8, A9);
impl_delegate!(10; A1, A2, A3, A4, A5, A6, A7, A8, A9, A10);

impl MappingRegistry {
    /// Map `record` by calling `delegate` with the fields named in `names`.
    ///
    /// Every field is resolved before the delegate runs, so a missing field
    /// fails with [`MapError::MissingField`] without invoking it.
    pub fn map_with<D, Args>(&self, record: &Record, names: &[&str], delegate: D) -> Result<D::Output, MapError>
    where
        D: Delegate<Args>,
    {
        self.map_with_ref::<D, Args>(record, names, &delegate)
    }

    /// Like [`map_with`](Self::map_with), borrowing the delegate so it can be
    /// reused across records.
    pub fn map_with_ref<D, Args>(&self, record: &Record, names: &[&str], delegate: &D) -> Result<D::Output, MapError>
    where
        D: Delegate<Args>,
    {
        if names.len() != D::ARITY {
            return Err(MapError::Mapping(format!(
                "delegate takes {} parameters but {} field names were given",
                D::ARITY,
                names.len()
            )));
        }
        let ctx = MappingContext::new(self, record.view());
        let mut args = DelegateArgs { names, ctx: &ctx, pos: 0 };
        delegate.call(&mut args)
    }
}

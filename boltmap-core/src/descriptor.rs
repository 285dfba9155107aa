
//! Member declarations and the immutable per-type mapping plan.
//!
//! [`MappingInfo`] is what a type declares about itself (usually generated
//! by `#[derive(Mappable)]`): its constructors, their parameters, and its
//! settable properties. The convention engine or a [`MappingBuilder`]
//! turns that into a [`MappingDescriptor`], which the compiled mapper owns.
//!
//! [`MappingBuilder`]: crate::builder::MappingBuilder

use std::sync::Arc;
use crate::context::MappingContext;
use crate::error::{run_callback, BoxError, MapError};
use crate::mapper::ConstructorArgs;
use crate::traits::FromValue;
use crate::value::Value;

pub(crate) type ConstructFn<T> =
    Arc<dyn Fn(&mut ConstructorArgs<'_>) -> Result<T, MapError> + Send + Sync>;
pub(crate) type ApplyFn<T> =
    Arc<dyn Fn(&mut T, &Value, &MappingContext<'_>) -> Result<(), MapError> + Send + Sync>;
pub(crate) type ComputeFn<T> =
    Arc<dyn Fn(&mut T, &MappingContext<'_>) -> Result<(), MapError> + Send + Sync>;
pub(crate) type WholeObjectFn<T> =
    Arc<dyn Fn(&MappingContext<'_>) -> Result<T, MapError> + Send + Sync>;

/// Which aspect of the resolved value a member captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aspect {
    /// The value itself.
    #[default]
    Property,
    /// The label set of a node. Non-node values leave the member untouched.
    NodeLabels,
    /// The type of a relationship. Non-relationship values leave the member untouched.
    RelationshipType,
}

/// Last segment of a type path, for diagnostics.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// A constructor parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub(crate) name: String,
    pub(crate) source: String,
    pub(crate) aspect: Aspect,
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
    pub(crate) flatten: bool,
}

impl Param {
    /// A parameter read from the source path equal to its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Param {
            source: name.clone(),
            name,
            aspect: Aspect::Property,
            optional: false,
            default: None,
            flatten: false,
        }
    }

    /// Read from `path` instead of the parameter name.
    pub fn source(mut self, path: impl Into<String>) -> Self {
        self.source = path.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Value used when the source path is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn node_labels(mut self) -> Self {
        self.aspect = Aspect::NodeLabels;
        self
    }

    pub fn relationship_type(mut self) -> Self {
        self.aspect = Aspect::RelationshipType;
        self
    }

    /// Map the whole current record into the parameter's type instead of
    /// reading one path. Flattened parameters consume no source path.
    pub fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_path(&self) -> &str {
        &self.source
    }

    pub fn is_optional(&self) -> bool {
        self.optional || self.default.is_some()
    }
}

/// A way of constructing `T` from resolved parameters.
///
/// The closure pulls its arguments from [`ConstructorArgs`] in declaration
/// order:
///
/// ```rust,ignore
/// Constructor::new("Point::new", |args| Ok(Point::new(args.next()?, args.next()?)))
///     .param(Param::new("x"))
///     .param(Param::new("y"))
/// ```
pub struct Constructor<T> {
    pub(crate) name: String,
    pub(crate) designated: bool,
    pub(crate) params: Vec<Param>,
    pub(crate) invoke: ConstructFn<T>,
}

impl<T> Constructor<T> {
    pub fn new<F>(name: impl Into<String>, invoke: F) -> Self
    where
        F: Fn(&mut ConstructorArgs<'_>) -> Result<T, MapError> + Send + Sync + 'static,
    {
        Constructor {
            name: name.into(),
            designated: false,
            params: Vec::new(),
            invoke: Arc::new(invoke),
        }
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Mark this as the mapping constructor, overriding fewest-parameters selection.
    pub fn designated(mut self) -> Self {
        self.designated = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn is_designated(&self) -> bool {
        self.designated
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// A settable member of `T`, bound to a source path.
pub struct Property<T> {
    pub(crate) member: String,
    pub(crate) source: String,
    pub(crate) aspect: Aspect,
    pub(crate) optional: bool,
    pub(crate) ignored: bool,
    pub(crate) default: Option<Value>,
    pub(crate) apply: ApplyFn<T>,
}

impl<T: 'static> Property<T> {
    /// A property whose value is coerced with [`FromValue`] and handed to `set`.
    ///
    /// ```rust,ignore
    /// Property::new("name", |p: &mut Person, v: String| p.name = v)
    /// ```
    pub fn new<V, S>(member: impl Into<String>, set: S) -> Self
    where
        V: FromValue + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::with_apply(
            member.into(),
            Arc::new(move |obj: &mut T, value: &Value, ctx: &MappingContext<'_>| -> Result<(), MapError> {
                set(obj, V::from_value(value, ctx)?);
                Ok(())
            }),
        )
    }

    /// A property whose value goes through `convert` instead of [`FromValue`].
    ///
    /// Converter errors surface as [`MapError::CallbackFailed`].
    pub fn converted<V, E, C, S>(member: impl Into<String>, convert: C, set: S) -> Self
    where
        V: 'static,
        E: Into<BoxError>,
        C: Fn(&Value) -> Result<V, E> + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let member = member.into();
        let name = member.clone();
        Self::with_apply(
            member,
            Arc::new(move |obj: &mut T, value: &Value, _ctx: &MappingContext<'_>| -> Result<(), MapError> {
                let v = run_callback(short_type_name::<T>(), &name, || convert(value))?;
                set(obj, v);
                Ok(())
            }),
        )
    }

    fn with_apply(member: String, apply: ApplyFn<T>) -> Self {
        Property {
            source: member.clone(),
            member,
            aspect: Aspect::Property,
            optional: false,
            ignored: false,
            default: None,
            apply,
        }
    }
}

impl<T> Property<T> {
    /// Read from `path` instead of the member name.
    pub fn source(mut self, path: impl Into<String>) -> Self {
        self.source = path.into();
        self
    }

    /// Leave the member untouched when the path is absent.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Assign `value` when the path is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Exclude the member from convention mapping.
    pub fn ignore(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn node_labels(mut self) -> Self {
        self.aspect = Aspect::NodeLabels;
        self
    }

    pub fn relationship_type(mut self) -> Self {
        self.aspect = Aspect::RelationshipType;
        self
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn source_path(&self) -> &str {
        &self.source
    }

    pub fn aspect(&self) -> Aspect {
        self.aspect
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// A member computed from the whole record by a user function.
pub(crate) struct Computed<T> {
    pub(crate) member: String,
    pub(crate) apply: ComputeFn<T>,
}

// ---------------------------------------------------------------------------
// Declarations and plans
// ---------------------------------------------------------------------------

/// Everything a type declares about how it can be built.
pub struct MappingInfo<T> {
    pub(crate) type_name: String,
    pub(crate) constructors: Vec<Constructor<T>>,
    pub(crate) properties: Vec<Property<T>>,
}

impl<T> MappingInfo<T> {
    pub fn new(type_name: impl Into<String>) -> Self {
        MappingInfo {
            type_name: type_name.into(),
            constructors: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn property(mut self, property: Property<T>) -> Self {
        self.properties.push(property);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn constructors(&self) -> &[Constructor<T>] {
        &self.constructors
    }

    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }
}

/// Where a binding writes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingTarget {
    Parameter,
    Property,
    Computed,
}

/// A read-only summary of one member binding in a [`MappingDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub target: BindingTarget,
    pub member: String,
    pub source: Option<String>,
    pub aspect: Aspect,
    pub optional: bool,
    pub default: Option<Value>,
}

/// The immutable mapping plan for one type.
///
/// Either a constructor or a whole-object function produces the object;
/// property bindings and computed members are then applied in order.
pub struct MappingDescriptor<T> {
    pub(crate) type_name: String,
    pub(crate) constructor: Option<Constructor<T>>,
    pub(crate) whole_object: Option<WholeObjectFn<T>>,
    pub(crate) properties: Vec<Property<T>>,
    pub(crate) computed: Vec<Computed<T>>,
}

impl<T> MappingDescriptor<T> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Name of the selected constructor, if construction is not overridden.
    pub fn constructor_name(&self) -> Option<&str> {
        self.constructor.as_ref().map(|c| c.name.as_str())
    }

    pub fn has_whole_object_mapping(&self) -> bool {
        self.whole_object.is_some()
    }

    /// Every binding, in application order.
    pub fn bindings(&self) -> Vec<Binding> {
        let params = self.constructor.iter().flat_map(|c| &c.params).map(|p| Binding {
            target: BindingTarget::Parameter,
            member: p.name.clone(),
            source: (!p.flatten).then(|| p.source.clone()),
            aspect: p.aspect,
            optional: p.is_optional(),
            default: p.default.clone(),
        });
        let props = self.properties.iter().map(|p| Binding {
            target: BindingTarget::Property,
            member: p.member.clone(),
            source: Some(p.source.clone()),
            aspect: p.aspect,
            optional: p.optional,
            default: p.default.clone(),
        });
        let computed = self.computed.iter().map(|c| Binding {
            target: BindingTarget::Computed,
            member: c.member.clone(),
            source: None,
            aspect: Aspect::Property,
            optional: false,
            default: None,
        });
        params.chain(props).chain(computed).collect()
    }

    /// Every source path the plan reads, deduplicated, in binding order.
    pub(crate) fn source_paths(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let params = self
            .constructor
            .iter()
            .flat_map(|c| &c.params)
            .filter(|p| !p.flatten)
            .map(|p| &p.source);
        for source in params.chain(self.properties.iter().map(|p| &p.source)) {
            if !out.contains(source) {
                out.push(source.clone());
            }
        }
        out
    }
}

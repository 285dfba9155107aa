
//! Explicit, per-type mapping configuration.

use std::sync::Arc;
use tracing::debug;
use crate::context::MappingContext;
use crate::convention::{describe_info, select_constructor};
use crate::descriptor::{short_type_name, Computed, MappingDescriptor, Property, WholeObjectFn};
use crate::error::{run_callback, BoxError, MapError};
use crate::record::eq_ignore_case;
use crate::traits::Mappable;

/// Configures how one type is mapped.
///
/// Obtained through [`MappingRegistry::register_mapping`]. Without
/// [`use_default_mapping`](Self::use_default_mapping) only the members you
/// map explicitly are populated; everything else keeps the value the
/// selected constructor gave it.
///
/// [`MappingRegistry::register_mapping`]: crate::MappingRegistry::register_mapping
pub struct MappingBuilder<T> {
    use_default: bool,
    whole_object: Option<WholeObjectFn<T>>,
    properties: Vec<Property<T>>,
    computed: Vec<Computed<T>>,
}

impl<T: Mappable> MappingBuilder<T> {
    pub(crate) fn new() -> Self {
        MappingBuilder {
            use_default: false,
            whole_object: None,
            properties: Vec::new(),
            computed: Vec::new(),
        }
    }

    /// Start from the convention mapping; explicit members override it.
    pub fn use_default_mapping(&mut self) -> &mut Self {
        self.use_default = true;
        self
    }

    /// Produce the object with `f` instead of a constructor.
    ///
    /// Property mappings are still applied to the result.
    pub fn map_whole_object<F, E>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&MappingContext<'_>) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.whole_object = Some(Arc::new(move |ctx: &MappingContext<'_>| {
            run_callback(short_type_name::<T>(), "<whole object>", || f(ctx))
        }));
        self
    }

    /// Bind one member. Replaces any earlier binding of the same member.
    pub fn map(&mut self, property: Property<T>) -> &mut Self {
        self.properties.retain(|p| !eq_ignore_case(&p.member, &property.member));
        self.properties.push(property);
        self
    }

    /// Set `member` from a value computed over the whole record.
    pub fn map_computed<V, E, F, S>(&mut self, member: &str, compute: F, set: S) -> &mut Self
    where
        E: Into<BoxError>,
        F: Fn(&MappingContext<'_>) -> Result<V, E> + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let name = member.to_owned();
        self.computed.push(Computed {
            member: member.to_owned(),
            apply: Arc::new(move |obj: &mut T, ctx: &MappingContext<'_>| -> Result<(), MapError> {
                let v = run_callback(short_type_name::<T>(), &name, || compute(ctx))?;
                set(obj, v);
                Ok(())
            }),
        });
        self
    }

    pub(crate) fn build(self) -> Result<MappingDescriptor<T>, MapError> {
        let info = T::mapping_info();
        let explicit = |member: &str| {
            self.properties.iter().any(|p| eq_ignore_case(&p.member, member))
                || self.computed.iter().any(|c| eq_ignore_case(&c.member, member))
        };

        let mut descriptor = if self.whole_object.is_some() {
            MappingDescriptor {
                type_name: info.type_name,
                constructor: None,
                whole_object: None,
                properties: Vec::new(),
                computed: Vec::new(),
            }
        } else if self.use_default {
            let mut d = describe_info(info)?;
            d.properties.retain(|p| !explicit(&p.member));
            d
        } else {
            let constructor = select_constructor(&info.type_name, info.constructors)?;
            MappingDescriptor {
                type_name: info.type_name,
                constructor: Some(constructor),
                whole_object: None,
                properties: Vec::new(),
                computed: Vec::new(),
            }
        };

        descriptor.whole_object = self.whole_object;
        descriptor.properties.extend(self.properties);
        descriptor.computed = self.computed;

        debug!(
            target_type = %descriptor.type_name,
            default_mapping = self.use_default,
            whole_object = descriptor.whole_object.is_some(),
            bindings = descriptor.properties.len() + descriptor.computed.len(),
            "built explicit mapping"
        );
        Ok(descriptor)
    }
}


//! Convention-based descriptors.
//!
//! Given only a type's [`MappingInfo`], pick a constructor and bind every
//! remaining settable property by name:
//!
//! - a constructor marked [`designated`](crate::Constructor::designated) wins
//!   when it is the only one so marked;
//! - otherwise the constructor with the fewest parameters (first on ties);
//! - properties whose source path a constructor parameter already reads,
//!   and ignored properties, are dropped.

use tracing::debug;
use crate::descriptor::{Constructor, MappingDescriptor, MappingInfo};
use crate::error::MapError;
use crate::record::eq_ignore_case;
use crate::traits::Mappable;

/// Build the convention descriptor for `T`.
pub fn describe<T: Mappable>() -> Result<MappingDescriptor<T>, MapError> {
    describe_info(T::mapping_info())
}

pub(crate) fn describe_info<T>(info: MappingInfo<T>) -> Result<MappingDescriptor<T>, MapError> {
    let MappingInfo {
        type_name,
        constructors,
        properties,
    } = info;
    let constructor = select_constructor(&type_name, constructors)?;

    let consumed: Vec<&str> = constructor
        .params
        .iter()
        .filter(|p| !p.flatten)
        .map(|p| p.source.as_str())
        .collect();
    let properties: Vec<_> = properties
        .into_iter()
        .filter(|p| !p.ignored)
        .filter(|p| !consumed.iter().any(|s| eq_ignore_case(s, &p.source)))
        .collect();

    debug!(
        target_type = %type_name,
        constructor = %constructor.name,
        params = constructor.params.len(),
        properties = properties.len(),
        "built convention mapping"
    );

    Ok(MappingDescriptor {
        type_name,
        constructor: Some(constructor),
        whole_object: None,
        properties,
        computed: Vec::new(),
    })
}

/// Pick the constructor the engine will call.
pub(crate) fn select_constructor<T>(
    type_name: &str,
    mut constructors: Vec<Constructor<T>>,
) -> Result<Constructor<T>, MapError> {
    let mut designated = constructors.iter().enumerate().filter(|(_, c)| c.designated);
    let chosen = match (designated.next(), designated.next()) {
        (Some((i, _)), None) => Some(i),
        _ => constructors
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.params.len())
            .map(|(i, _)| i),
    };
    match chosen {
        Some(i) => Ok(constructors.swap_remove(i)),
        None => Err(MapError::no_usable_constructor(type_name)),
    }
}

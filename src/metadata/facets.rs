//! Facets: immutable typed attribute-value pairs attached to type usages.
//!
//! A [`FacetDescription`] declares the legal name, value kind, bounds, and
//! default for a facet slot; a [`Facet`] is an immutable (description, value)
//! pair. Facet instances for a given description are pooled: repeated
//! creation of the same value yields the same `Arc`, so graphs with millions
//! of `Nullable=false` usages share one facet object. Pooling is a deliberate
//! invariant, relied on by consumers that compare facets by reference.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::{
    metadata::{collection::NamedItem, kind::BuiltInTypeKind},
    Result,
};

/// An immutable facet value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FacetValue {
    /// Explicit null (facet present, value unspecified)
    Null,
    /// Unbounded length/precision
    Unbounded,
    /// Boolean value
    Boolean(bool),
    /// 32-bit integer value
    Int32(i32),
    /// Byte value (precision/scale)
    Byte(u8),
    /// String value (enumerated facets such as `ConcurrencyMode`)
    String(String),
}

impl std::fmt::Display for FacetValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetValue::Null => write!(f, "null"),
            FacetValue::Unbounded => write!(f, "Max"),
            FacetValue::Boolean(value) => write!(f, "{value}"),
            FacetValue::Int32(value) => write!(f, "{value}"),
            FacetValue::Byte(value) => write!(f, "{value}"),
            FacetValue::String(value) => write!(f, "{value}"),
        }
    }
}

/// The value kind a facet slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetValueKind {
    /// Boolean facet
    Boolean,
    /// Integer facet (may also accept `Unbounded`)
    Int32,
    /// Byte facet
    Byte,
    /// String facet
    String,
}

/// Declaration of a facet slot: name, value kind, bounds, default, and
/// whether the value is constant (fixed by the type, not settable per usage).
#[derive(Debug)]
pub struct FacetDescription {
    name: &'static str,
    kind: FacetValueKind,
    min: Option<i64>,
    max: Option<i64>,
    default: Option<FacetValue>,
    is_constant: bool,
    pool: DashMap<FacetValue, Arc<Facet>>,
}

impl FacetDescription {
    /// Declare a new facet slot.
    #[must_use]
    pub fn new(
        name: &'static str,
        kind: FacetValueKind,
        min: Option<i64>,
        max: Option<i64>,
        default: Option<FacetValue>,
        is_constant: bool,
    ) -> Self {
        FacetDescription {
            name,
            kind,
            min,
            max,
            default,
            is_constant,
            pool: DashMap::new(),
        }
    }

    /// The facet name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The accepted value kind.
    #[must_use]
    pub fn kind(&self) -> FacetValueKind {
        self.kind
    }

    /// Minimum accepted integer value, if bounded.
    #[must_use]
    pub fn min(&self) -> Option<i64> {
        self.min
    }

    /// Maximum accepted integer value, if bounded.
    #[must_use]
    pub fn max(&self) -> Option<i64> {
        self.max
    }

    /// The default value for this slot, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&FacetValue> {
        self.default.as_ref()
    }

    /// Whether the facet is fixed by the type rather than settable per usage.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.is_constant
    }

    /// Whether `value` lies within this slot's declared bounds.
    #[must_use]
    pub fn value_in_bounds(&self, value: &FacetValue) -> bool {
        let numeric = match value {
            FacetValue::Int32(v) => i64::from(*v),
            FacetValue::Byte(v) => i64::from(*v),
            _ => return true,
        };
        if let Some(min) = self.min {
            if numeric < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if numeric > max {
                return false;
            }
        }
        true
    }

    fn value_matches_kind(&self, value: &FacetValue) -> bool {
        match value {
            FacetValue::Null | FacetValue::Unbounded => true,
            FacetValue::Boolean(_) => self.kind == FacetValueKind::Boolean,
            FacetValue::Int32(_) => self.kind == FacetValueKind::Int32,
            FacetValue::Byte(_) => self.kind == FacetValueKind::Byte,
            FacetValue::String(_) => self.kind == FacetValueKind::String,
        }
    }

    /// Create (or fetch from the pool) the facet for `value`.
    ///
    /// Two calls with an equal value return the same `Arc<Facet>` instance.
    ///
    /// # Errors
    ///
    /// Fails when `value` does not match the declared value kind.
    pub fn facet(&'static self, value: FacetValue) -> Result<Arc<Facet>> {
        if !self.value_matches_kind(&value) {
            return Err(usage_error!(
                "facet '{}' does not accept value '{}'",
                self.name,
                value
            ));
        }
        let pooled = self
            .pool
            .entry(value.clone())
            .or_insert_with(|| {
                Arc::new(Facet {
                    description: self,
                    value,
                })
            })
            .clone();
        Ok(pooled)
    }

    /// The pooled facet carrying this slot's default value.
    ///
    /// # Errors
    ///
    /// Fails when the slot declares no default.
    pub fn default_facet(&'static self) -> Result<Arc<Facet>> {
        match &self.default {
            Some(value) => self.facet(value.clone()),
            None => Err(usage_error!("facet '{}' has no default value", self.name)),
        }
    }
}

/// An immutable facet: a description paired with one of its legal values.
///
/// Facets are value objects; equality is by description name and value, and
/// common instances are shared through the description's pool.
#[derive(Debug)]
pub struct Facet {
    description: &'static FacetDescription,
    value: FacetValue,
}

impl Facet {
    /// The slot this facet fills.
    #[must_use]
    pub fn description(&self) -> &'static FacetDescription {
        self.description
    }

    /// The facet name (same as its description's name).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.description.name
    }

    /// The carried value.
    #[must_use]
    pub fn value(&self) -> &FacetValue {
        &self.value
    }

    /// Whether this facet carries its description's default value.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.description.default.as_ref() == Some(&self.value)
    }

    /// The node kind of a facet.
    #[must_use]
    pub fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::Facet
    }
}

impl NamedItem for Arc<Facet> {
    fn identity(&self) -> String {
        self.description.name.to_string()
    }
}

impl PartialEq for Facet {
    fn eq(&self, other: &Self) -> bool {
        self.description.name == other.description.name && self.value == other.value
    }
}

impl Eq for Facet {}

macro_rules! well_known_facet {
    ($(#[$doc:meta])* $fn_name:ident, $name:literal, $kind:expr, $min:expr, $max:expr, $default:expr, $constant:expr) => {
        $(#[$doc])*
        #[must_use]
        pub fn $fn_name() -> &'static FacetDescription {
            static SLOT: OnceLock<FacetDescription> = OnceLock::new();
            SLOT.get_or_init(|| {
                FacetDescription::new($name, $kind, $min, $max, $default, $constant)
            })
        }
    };
}

well_known_facet!(
    /// `Nullable` - whether a usage admits null; defaults to `true`.
    nullable, "Nullable", FacetValueKind::Boolean, None, None,
    Some(FacetValue::Boolean(true)), false
);

well_known_facet!(
    /// `MaxLength` - maximum length of a string/binary usage.
    max_length, "MaxLength", FacetValueKind::Int32, Some(1), Some(i32::MAX as i64),
    None, false
);

well_known_facet!(
    /// `Precision` - total digits of a decimal/temporal usage.
    precision, "Precision", FacetValueKind::Byte, Some(1), Some(38), None, false
);

well_known_facet!(
    /// `Scale` - fractional digits of a decimal usage.
    scale, "Scale", FacetValueKind::Byte, Some(0), Some(38), None, false
);

well_known_facet!(
    /// `Unicode` - whether a string usage is Unicode; defaults to `true`.
    unicode, "Unicode", FacetValueKind::Boolean, None, None,
    Some(FacetValue::Boolean(true)), false
);

well_known_facet!(
    /// `FixedLength` - whether a string/binary usage is fixed-length.
    fixed_length, "FixedLength", FacetValueKind::Boolean, None, None,
    Some(FacetValue::Boolean(false)), false
);

well_known_facet!(
    /// `DefaultValue` - the declared default of a property usage.
    default_value, "DefaultValue", FacetValueKind::String, None, None,
    Some(FacetValue::Null), false
);

well_known_facet!(
    /// `ConcurrencyMode` - `None` or `Fixed`.
    concurrency_mode, "ConcurrencyMode", FacetValueKind::String, None, None,
    Some(FacetValue::String(String::new())), false
);

well_known_facet!(
    /// `StoreGeneratedPattern` - `None`, `Identity`, or `Computed`.
    store_generated_pattern, "StoreGeneratedPattern", FacetValueKind::String, None, None,
    Some(FacetValue::String(String::new())), false
);

well_known_facet!(
    /// `CollectionKind` - `None`, `Bag`, or `List`.
    collection_kind, "CollectionKind", FacetValueKind::String, None, None,
    Some(FacetValue::String(String::new())), false
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pooled_facets_are_reference_equal() {
        let first = nullable().facet(FacetValue::Boolean(false)).unwrap();
        let second = nullable().facet(FacetValue::Boolean(false)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_values_are_distinct_instances() {
        let yes = nullable().facet(FacetValue::Boolean(true)).unwrap();
        let no = nullable().facet(FacetValue::Boolean(false)).unwrap();
        assert!(!Arc::ptr_eq(&yes, &no));
        assert_ne!(*yes, *no);
    }

    #[test]
    fn test_default_facet_is_pooled() {
        let default = nullable().default_facet().unwrap();
        let explicit = nullable().facet(FacetValue::Boolean(true)).unwrap();
        assert!(Arc::ptr_eq(&default, &explicit));
        assert!(default.is_default());
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        assert!(nullable().facet(FacetValue::Int32(1)).is_err());
        assert!(max_length().facet(FacetValue::Boolean(true)).is_err());
    }

    #[test]
    fn test_bounds() {
        assert!(max_length().value_in_bounds(&FacetValue::Int32(200)));
        assert!(!max_length().value_in_bounds(&FacetValue::Int32(0)));
        assert!(!precision().value_in_bounds(&FacetValue::Byte(39)));
        // Unbounded always passes numeric bounds.
        assert!(max_length().value_in_bounds(&FacetValue::Unbounded));
    }
}

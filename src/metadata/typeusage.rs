//! Type usages: a reference to a type plus the facet values that configure
//! that particular use of it.
//!
//! A property of type `Edm.String` says *what* it holds; the usage's facets
//! (`Nullable`, `MaxLength`, `Unicode`, ...) say *how*. Usages are immutable
//! after freeze and their identities embed the non-default facet values, so
//! two usages of the same type with the same effective configuration are
//! `edm_equals`.

use std::sync::Arc;

use crate::{
    metadata::{
        collection::{MetadataCollection, NamedItem, ReadOnlyMetadataCollection},
        facets::{self, Facet, FacetValue},
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        types::{EdmTypeRef, PrimitiveType, PrimitiveTypeKind},
    },
    Result,
};

/// A configured reference to an EDM type.
#[derive(Debug)]
pub struct TypeUsage {
    base: ItemBase,
    edm_type: EdmTypeRef,
    facets: Arc<MetadataCollection<Arc<Facet>>>,
}

impl TypeUsage {
    /// Create a usage of `edm_type` carrying the given facets.
    ///
    /// # Errors
    ///
    /// Fails on duplicate facet names or a facet value outside its slot's
    /// declared bounds.
    pub fn create(edm_type: EdmTypeRef, facet_values: Vec<Arc<Facet>>) -> Result<Arc<Self>> {
        for facet in &facet_values {
            if !facet.description().value_in_bounds(facet.value()) {
                return Err(usage_error!(
                    "facet '{}' value '{}' is out of bounds",
                    facet.name(),
                    facet.value()
                ));
            }
        }
        let collection = MetadataCollection::from_items(facet_values)?;
        Ok(Arc::new(TypeUsage {
            base: ItemBase::new(),
            edm_type,
            facets: Arc::new(collection),
        }))
    }

    /// The default usage of `edm_type`: every applicable facet slot that
    /// declares a default is filled with it; other kinds get no facets.
    ///
    /// # Errors
    ///
    /// Propagates facet construction failures.
    pub fn default_of(edm_type: EdmTypeRef) -> Result<Arc<Self>> {
        let mut defaults = Vec::new();
        if let EdmTypeRef::Primitive(primitive) = &edm_type {
            for slot in primitive.applicable_facets() {
                if slot.default_value().is_some() {
                    defaults.push(slot.default_facet()?);
                }
            }
        }
        TypeUsage::create(edm_type, defaults)
    }

    /// A string usage with explicit length configuration.
    ///
    /// `max_length: None` means unbounded.
    ///
    /// # Errors
    ///
    /// Fails when `max_length` is out of bounds.
    pub fn string(
        nullable: bool,
        max_length: Option<i32>,
        unicode: bool,
        fixed_length: bool,
    ) -> Result<Arc<Self>> {
        let length = match max_length {
            Some(value) => FacetValue::Int32(value),
            None => FacetValue::Unbounded,
        };
        TypeUsage::create(
            EdmTypeRef::Primitive(PrimitiveType::canonical(PrimitiveTypeKind::String)),
            vec![
                facets::nullable().facet(FacetValue::Boolean(nullable))?,
                facets::max_length().facet(length)?,
                facets::unicode().facet(FacetValue::Boolean(unicode))?,
                facets::fixed_length().facet(FacetValue::Boolean(fixed_length))?,
            ],
        )
    }

    /// A decimal usage with explicit precision and scale.
    ///
    /// # Errors
    ///
    /// Fails when precision or scale is out of bounds.
    pub fn decimal(nullable: bool, precision: u8, scale: u8) -> Result<Arc<Self>> {
        TypeUsage::create(
            EdmTypeRef::Primitive(PrimitiveType::canonical(PrimitiveTypeKind::Decimal)),
            vec![
                facets::nullable().facet(FacetValue::Boolean(nullable))?,
                facets::precision().facet(FacetValue::Byte(precision))?,
                facets::scale().facet(FacetValue::Byte(scale))?,
            ],
        )
    }

    /// The referenced type.
    #[must_use]
    pub fn edm_type(&self) -> &EdmTypeRef {
        &self.edm_type
    }

    /// The facets configuring this usage.
    #[must_use]
    pub fn facets(&self) -> ReadOnlyMetadataCollection<Arc<Facet>> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.facets))
    }

    /// The value of the facet named `name`, if present.
    #[must_use]
    pub fn facet_value(&self, name: &str) -> Option<FacetValue> {
        self.facets
            .try_get_value(name, false)
            .map(|facet| facet.value().clone())
    }

    /// Whether this usage admits null. Absent `Nullable` facet means `true`.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self.facet_value("Nullable") {
            Some(FacetValue::Boolean(value)) => value,
            _ => true,
        }
    }

    /// Structural equality: same referenced type, same facet configuration.
    #[must_use]
    pub fn edm_equals(&self, other: &TypeUsage) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.identity() == other.identity()
    }
}

impl MetadataItem for TypeUsage {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::TypeUsage
    }

    /// The referenced type's identity with the facet configuration appended.
    /// Facets are sorted by name and default-valued facets are omitted, so
    /// the rendering is canonical: a usage that only spells out the defaults
    /// is identical to one that carries no facets at all.
    fn identity(&self) -> String {
        let mut parts: Vec<String> = self
            .facets
            .to_vec()
            .iter()
            .filter(|facet| !facet.is_default())
            .map(|facet| format!("{0}={1}", facet.name(), facet.value()))
            .collect();
        parts.sort();
        format!("{0}({1})", self.edm_type.identity(), parts.join(","))
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    /// Freezes the facet collection and any *transient* referenced type.
    /// Named types are reachable from their declaring model, which freezes
    /// them itself; freezing them here would let a stray usage freeze a type
    /// still under construction elsewhere.
    fn freeze_children(&self) {
        self.facets.set_readonly();
        match &self.edm_type {
            EdmTypeRef::Collection(_) | EdmTypeRef::Row(_) | EdmTypeRef::Ref(_) => {
                self.edm_type.set_readonly();
            }
            _ => {}
        }
    }
}

impl NamedItem for Arc<TypeUsage> {
    fn identity(&self) -> String {
        MetadataItem::identity(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_usage_of_string_carries_defaults() {
        let usage = TypeUsage::default_of(EdmTypeRef::Primitive(PrimitiveType::canonical(
            PrimitiveTypeKind::String,
        )))
        .unwrap();
        assert!(usage.is_nullable());
        assert_eq!(
            usage.facet_value("Unicode"),
            Some(FacetValue::Boolean(true))
        );
        // MaxLength has no default, so the slot stays empty.
        assert_eq!(usage.facet_value("MaxLength"), None);
    }

    #[test]
    fn test_identity_is_canonical_over_facet_order() {
        let left = TypeUsage::create(
            EdmTypeRef::Primitive(PrimitiveType::canonical(PrimitiveTypeKind::String)),
            vec![
                facets::nullable().facet(FacetValue::Boolean(false)).unwrap(),
                facets::max_length().facet(FacetValue::Int32(40)).unwrap(),
            ],
        )
        .unwrap();
        let right = TypeUsage::create(
            EdmTypeRef::Primitive(PrimitiveType::canonical(PrimitiveTypeKind::String)),
            vec![
                facets::max_length().facet(FacetValue::Int32(40)).unwrap(),
                facets::nullable().facet(FacetValue::Boolean(false)).unwrap(),
            ],
        )
        .unwrap();
        assert!(left.edm_equals(&right));
        assert_eq!(
            MetadataItem::identity(left.as_ref()),
            "Edm.String(MaxLength=40,Nullable=false)"
        );
    }

    #[test]
    fn test_spelled_out_defaults_equal_bare_usage() {
        let spelled = TypeUsage::default_of(EdmTypeRef::Primitive(PrimitiveType::canonical(
            PrimitiveTypeKind::String,
        )))
        .unwrap();
        let bare = TypeUsage::create(
            EdmTypeRef::Primitive(PrimitiveType::canonical(PrimitiveTypeKind::String)),
            Vec::new(),
        )
        .unwrap();
        assert!(spelled.edm_equals(&bare));
        assert_eq!(MetadataItem::identity(spelled.as_ref()), "Edm.String()");
        assert_eq!(
            MetadataItem::identity(spelled.as_ref()),
            MetadataItem::identity(bare.as_ref())
        );
    }

    #[test]
    fn test_out_of_bounds_facet_rejected() {
        assert!(TypeUsage::decimal(true, 40, 2).is_err());
        assert!(TypeUsage::string(true, Some(0), true, false).is_err());
    }

    #[test]
    fn test_unbounded_string() {
        let usage = TypeUsage::string(false, None, true, false).unwrap();
        assert!(!usage.is_nullable());
        assert_eq!(usage.facet_value("MaxLength"), Some(FacetValue::Unbounded));
    }

    #[test]
    fn test_freeze_locks_facets() {
        let usage = TypeUsage::decimal(true, 18, 2).unwrap();
        usage.as_ref().set_readonly();
        assert!(usage.facets().source().is_readonly());
    }
}

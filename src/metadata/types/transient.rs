//! Transient wrapper types: collections and entity references.
//!
//! Neither kind is declared in a schema; both are composed on demand around
//! another type and derive their identity from it, so equivalent wrappers
//! built at different call sites compare `edm_equals`.

use std::sync::Arc;

use crate::metadata::{
    item::{ItemBase, MetadataItem},
    kind::BuiltInTypeKind,
    typeusage::TypeUsage,
    types::EntityType,
};

/// A multiset of some element usage, used for query results and the many
/// side of navigations. Untagged by default; collections may span data
/// spaces.
#[derive(Debug)]
pub struct CollectionType {
    base: ItemBase,
    element: Arc<TypeUsage>,
    identity: String,
}

impl CollectionType {
    /// Wrap `element` in a collection.
    #[must_use]
    pub fn new(element: Arc<TypeUsage>) -> Arc<Self> {
        let identity = format!("collection[{0}]", MetadataItem::identity(element.as_ref()));
        Arc::new(CollectionType {
            base: ItemBase::new(),
            element,
            identity,
        })
    }

    /// The wrapped element usage.
    #[must_use]
    pub fn element_usage(&self) -> &Arc<TypeUsage> {
        &self.element
    }

    /// Collections have no declared name; the identity stands in.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity
    }
}

impl MetadataItem for CollectionType {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::CollectionType
    }

    fn identity(&self) -> String {
        self.identity.clone()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.element.as_ref().set_readonly();
    }
}

/// A reference to an entity: the identity of an instance without its data.
///
/// Holds the entity strongly; entities never point back at the references
/// wrapping them, so no cycle can form here.
#[derive(Debug)]
pub struct RefType {
    base: ItemBase,
    element: Arc<EntityType>,
    identity: String,
}

impl RefType {
    /// Wrap `entity` in a reference type.
    #[must_use]
    pub fn new(entity: &Arc<EntityType>) -> Arc<Self> {
        let identity = format!("reference[{0}]", entity.full_name());
        Arc::new(RefType {
            base: ItemBase::new(),
            element: Arc::clone(entity),
            identity,
        })
    }

    /// The referenced entity type.
    #[must_use]
    pub fn element_type(&self) -> &Arc<EntityType> {
        &self.element
    }

    /// References have no declared name; the identity stands in.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity
    }
}

impl MetadataItem for RefType {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::RefType
    }

    fn identity(&self) -> String {
        self.identity.clone()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    // The referenced entity is not owned; the declaring model freezes it.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::flags::DataSpace;
    use crate::metadata::types::{EdmTypeRef, PrimitiveType, PrimitiveTypeKind};

    #[test]
    fn test_collection_identity_composes_element() {
        let element = TypeUsage::default_of(EdmTypeRef::Primitive(PrimitiveType::canonical(
            PrimitiveTypeKind::Int32,
        )))
        .unwrap();
        let first = CollectionType::new(Arc::clone(&element));
        let second = CollectionType::new(element);
        assert!(EdmTypeRef::Collection(first).edm_equals(&EdmTypeRef::Collection(second)));
    }

    #[test]
    fn test_ref_identity_composes_entity_full_name() {
        let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace).unwrap();
        let reference = RefType::new(&customer);
        assert_eq!(
            MetadataItem::identity(reference.as_ref()),
            "reference[Shop.Customer]"
        );
        assert!(Arc::ptr_eq(reference.element_type(), &customer));
    }

    #[test]
    fn test_collection_freeze_reaches_element_usage() {
        let element = TypeUsage::default_of(EdmTypeRef::Primitive(PrimitiveType::canonical(
            PrimitiveTypeKind::String,
        )))
        .unwrap();
        let collection = CollectionType::new(Arc::clone(&element));
        collection.as_ref().set_readonly();
        assert!(element.as_ref().is_readonly());
    }
}

//! The EDM type hierarchy.
//!
//! This module provides every concrete `EdmType` node kind - entity, complex,
//! row, enum, primitive, association, collection, and reference types - plus
//! the member kinds structural types own.
//!
//! # Key Components
//!
//! - [`EdmTypeRef`]: Polymorphic reference to any type node, the handle used
//!   for all cross-references in the graph
//! - [`EntityType`] / [`ComplexType`] / [`AssociationType`] / [`RowType`]:
//!   Structural types owning ordered, name-keyed member collections
//! - [`CollectionType`] / [`RefType`]: Transient wrappers with identities
//!   composed deterministically from what they wrap
//! - [`EdmMemberRef`]: Polymorphic reference to a member node
//!
//! # Identity
//!
//! Named types use `Namespace.Name` full-name identity. Transient types
//! derive their identity from their structure, so two row types built
//! independently from the same ordered property list are `edm_equals` and
//! share one identity string - the property enabling structural
//! deduplication across call sites.

mod association;
mod complex;
mod entity;
mod members;
mod primitive;
mod row;
mod transient;

use std::sync::{Arc, Weak};

pub use association::{AssociationType, ReferentialConstraint};
pub use complex::ComplexType;
pub use entity::EntityType;
pub use members::{
    AssociationEndMember, EdmMemberRef, EdmProperty, NavigationProperty, OperationAction,
    RelationshipMultiplicity,
};
pub use primitive::{EnumMember, EnumType, PrimitiveType, PrimitiveTypeKind};
pub use row::RowType;
pub use transient::{CollectionType, RefType};

use crate::metadata::{
    collection::NamedItem, flags::DataSpace, item::MetadataItem, kind::BuiltInTypeKind,
};

/// A polymorphic reference to any `EdmType` node.
///
/// All cross-references between types in the graph travel through this enum;
/// it is the resolved counterpart of a type name in a schema document.
#[derive(Debug, Clone)]
pub enum EdmTypeRef {
    /// A primitive scalar type
    Primitive(Arc<PrimitiveType>),
    /// An enumeration type
    Enum(Arc<EnumType>),
    /// An entity type
    Entity(Arc<EntityType>),
    /// A complex type
    Complex(Arc<ComplexType>),
    /// An anonymous row type
    Row(Arc<RowType>),
    /// An association type
    Association(Arc<AssociationType>),
    /// A collection type
    Collection(Arc<CollectionType>),
    /// A reference type
    Ref(Arc<RefType>),
}

impl EdmTypeRef {
    /// The concrete kind of the referenced type.
    #[must_use]
    pub fn item_kind(&self) -> BuiltInTypeKind {
        match self {
            EdmTypeRef::Primitive(_) => BuiltInTypeKind::PrimitiveType,
            EdmTypeRef::Enum(_) => BuiltInTypeKind::EnumType,
            EdmTypeRef::Entity(_) => BuiltInTypeKind::EntityType,
            EdmTypeRef::Complex(_) => BuiltInTypeKind::ComplexType,
            EdmTypeRef::Row(_) => BuiltInTypeKind::RowType,
            EdmTypeRef::Association(_) => BuiltInTypeKind::AssociationType,
            EdmTypeRef::Collection(_) => BuiltInTypeKind::CollectionType,
            EdmTypeRef::Ref(_) => BuiltInTypeKind::RefType,
        }
    }

    /// The simple name of the referenced type.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            EdmTypeRef::Primitive(t) => t.name().to_string(),
            EdmTypeRef::Enum(t) => t.name().to_string(),
            EdmTypeRef::Entity(t) => t.name().to_string(),
            EdmTypeRef::Complex(t) => t.name().to_string(),
            EdmTypeRef::Row(t) => t.name().to_string(),
            EdmTypeRef::Association(t) => t.name().to_string(),
            EdmTypeRef::Collection(t) => t.name().to_string(),
            EdmTypeRef::Ref(t) => t.name().to_string(),
        }
    }

    /// The namespace of the referenced type (empty for transient types).
    #[must_use]
    pub fn namespace_name(&self) -> String {
        match self {
            EdmTypeRef::Primitive(t) => t.namespace_name().to_string(),
            EdmTypeRef::Enum(t) => t.namespace_name().to_string(),
            EdmTypeRef::Entity(t) => t.namespace_name().to_string(),
            EdmTypeRef::Complex(t) => t.namespace_name().to_string(),
            EdmTypeRef::Association(t) => t.namespace_name().to_string(),
            EdmTypeRef::Row(_) | EdmTypeRef::Collection(_) | EdmTypeRef::Ref(_) => String::new(),
        }
    }

    /// Returns the full name (`Namespace.Name`) of the referenced type.
    #[must_use]
    pub fn full_name(&self) -> String {
        let namespace = self.namespace_name();
        if namespace.is_empty() {
            self.name()
        } else {
            format!("{0}.{1}", namespace, self.name())
        }
    }

    /// The identity string: the full name for named types, the composed
    /// structural identity for transient types.
    #[must_use]
    pub fn identity(&self) -> String {
        match self {
            EdmTypeRef::Row(t) => t.identity(),
            EdmTypeRef::Collection(t) => t.identity(),
            EdmTypeRef::Ref(t) => t.identity(),
            _ => self.full_name(),
        }
    }

    /// The data space tag of the referenced type, if assigned.
    #[must_use]
    pub fn data_space(&self) -> Option<DataSpace> {
        match self {
            EdmTypeRef::Primitive(t) => t.item_base().state().data_space(),
            EdmTypeRef::Enum(t) => t.item_base().state().data_space(),
            EdmTypeRef::Entity(t) => t.item_base().state().data_space(),
            EdmTypeRef::Complex(t) => t.item_base().state().data_space(),
            EdmTypeRef::Row(t) => t.item_base().state().data_space(),
            EdmTypeRef::Association(t) => t.item_base().state().data_space(),
            EdmTypeRef::Collection(t) => t.item_base().state().data_space(),
            EdmTypeRef::Ref(t) => t.item_base().state().data_space(),
        }
    }

    /// Freeze the referenced type (idempotent cascade).
    pub fn set_readonly(&self) {
        match self {
            EdmTypeRef::Primitive(t) => t.as_ref().set_readonly(),
            EdmTypeRef::Enum(t) => t.as_ref().set_readonly(),
            EdmTypeRef::Entity(t) => t.as_ref().set_readonly(),
            EdmTypeRef::Complex(t) => t.as_ref().set_readonly(),
            EdmTypeRef::Row(t) => t.as_ref().set_readonly(),
            EdmTypeRef::Association(t) => t.as_ref().set_readonly(),
            EdmTypeRef::Collection(t) => t.as_ref().set_readonly(),
            EdmTypeRef::Ref(t) => t.as_ref().set_readonly(),
        }
    }

    /// Whether the referenced type is frozen.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        match self {
            EdmTypeRef::Primitive(t) => t.as_ref().is_readonly(),
            EdmTypeRef::Enum(t) => t.as_ref().is_readonly(),
            EdmTypeRef::Entity(t) => t.as_ref().is_readonly(),
            EdmTypeRef::Complex(t) => t.as_ref().is_readonly(),
            EdmTypeRef::Row(t) => t.as_ref().is_readonly(),
            EdmTypeRef::Association(t) => t.as_ref().is_readonly(),
            EdmTypeRef::Collection(t) => t.as_ref().is_readonly(),
            EdmTypeRef::Ref(t) => t.as_ref().is_readonly(),
        }
    }

    /// A stable address usable as a visited-set key.
    #[must_use]
    pub fn ptr_key(&self) -> usize {
        match self {
            EdmTypeRef::Primitive(t) => Arc::as_ptr(t) as usize,
            EdmTypeRef::Enum(t) => Arc::as_ptr(t) as usize,
            EdmTypeRef::Entity(t) => Arc::as_ptr(t) as usize,
            EdmTypeRef::Complex(t) => Arc::as_ptr(t) as usize,
            EdmTypeRef::Row(t) => Arc::as_ptr(t) as usize,
            EdmTypeRef::Association(t) => Arc::as_ptr(t) as usize,
            EdmTypeRef::Collection(t) => Arc::as_ptr(t) as usize,
            EdmTypeRef::Ref(t) => Arc::as_ptr(t) as usize,
        }
    }

    /// Structural (value-based) equality, distinct from reference equality.
    ///
    /// Two references are `edm_equals` when they point at the same node, or
    /// at nodes of the same kind with equal identities. For transient types
    /// the identity is composed from the wrapped structure, so independently
    /// built equivalents compare equal.
    #[must_use]
    pub fn edm_equals(&self, other: &EdmTypeRef) -> bool {
        if self.ptr_key() == other.ptr_key() {
            return true;
        }
        self.item_kind() == other.item_kind() && self.identity() == other.identity()
    }

    /// Whether a value of type `other` can be treated as a value of `self`.
    ///
    /// For entity types this walks `other`'s base-type chain; for every other
    /// kind it degenerates to `edm_equals`.
    #[must_use]
    pub fn is_assignable_from(&self, other: &EdmTypeRef) -> bool {
        match (self, other) {
            (EdmTypeRef::Entity(target), EdmTypeRef::Entity(source)) => {
                let mut current = Some(Arc::clone(source));
                while let Some(entity) = current {
                    if Arc::ptr_eq(&entity, target) {
                        return true;
                    }
                    current = entity.base_type();
                }
                false
            }
            _ => self.edm_equals(other),
        }
    }

    /// The base type, for kinds that support inheritance.
    #[must_use]
    pub fn base_type(&self) -> Option<EdmTypeRef> {
        match self {
            EdmTypeRef::Entity(t) => t.base_type().map(EdmTypeRef::Entity),
            _ => None,
        }
    }
}

impl NamedItem for EdmTypeRef {
    fn identity(&self) -> String {
        EdmTypeRef::identity(self)
    }
}

/// Explicit non-owning back-link from a member to the structural type that
/// declares it.
///
/// Set by the declaring type's add/remove fix-up, independently of the
/// member collection's invariants; never keeps the declaring type alive.
#[derive(Debug, Clone, Default)]
pub enum DeclaringTypeRef {
    /// Not declared by any type yet
    #[default]
    None,
    /// Declared by an entity type
    Entity(Weak<EntityType>),
    /// Declared by a complex type
    Complex(Weak<ComplexType>),
    /// Declared by a row type
    Row(Weak<RowType>),
    /// Declared by an association type
    Association(Weak<AssociationType>),
}

impl DeclaringTypeRef {
    /// Get a strong reference to the declaring type, if set and alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<EdmTypeRef> {
        match self {
            DeclaringTypeRef::None => None,
            DeclaringTypeRef::Entity(weak) => weak.upgrade().map(EdmTypeRef::Entity),
            DeclaringTypeRef::Complex(weak) => weak.upgrade().map(EdmTypeRef::Complex),
            DeclaringTypeRef::Row(weak) => weak.upgrade().map(EdmTypeRef::Row),
            DeclaringTypeRef::Association(weak) => weak.upgrade().map(EdmTypeRef::Association),
        }
    }

    /// Drop the declaring type's member name index after a member rename.
    pub(crate) fn invalidate_member_index(&self) {
        match self {
            DeclaringTypeRef::None => {}
            DeclaringTypeRef::Entity(weak) => {
                if let Some(declared) = weak.upgrade() {
                    declared.members_collection().invalidate_index();
                }
            }
            DeclaringTypeRef::Complex(weak) => {
                if let Some(declared) = weak.upgrade() {
                    declared.members_collection().invalidate_index();
                }
            }
            DeclaringTypeRef::Row(weak) => {
                if let Some(declared) = weak.upgrade() {
                    declared.members_collection().invalidate_index();
                }
            }
            DeclaringTypeRef::Association(weak) => {
                if let Some(declared) = weak.upgrade() {
                    declared.members_collection().invalidate_index();
                }
            }
        }
    }
}

//! The closed enumeration of metadata node kinds.

use strum::{Display, EnumCount, EnumIter};

/// Discriminant identifying the concrete kind of a metadata item.
///
/// This is a closed enumeration: every node in the graph reports exactly one
/// kind, and the static system-property table in
/// [`crate::metadata::properties`] is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum BuiltInTypeKind {
    /// An association end member
    AssociationEndMember,
    /// An association set
    AssociationSet,
    /// One end of an association set
    AssociationSetEnd,
    /// An association type
    AssociationType,
    /// A collection type wrapping an element type usage
    CollectionType,
    /// A complex (structured, keyless) type
    ComplexType,
    /// A documentation record
    Documentation,
    /// A function or function import
    EdmFunction,
    /// The model root
    EdmModel,
    /// A scalar or structured property
    EdmProperty,
    /// An entity container
    EntityContainer,
    /// An entity set
    EntitySet,
    /// An entity type
    EntityType,
    /// A named enumeration member
    EnumMember,
    /// An enumeration type
    EnumType,
    /// A facet value attached to a type usage
    Facet,
    /// A function parameter
    FunctionParameter,
    /// A metadata property (system property or annotation)
    MetadataProperty,
    /// A navigation property
    NavigationProperty,
    /// A primitive scalar type
    PrimitiveType,
    /// A referential constraint between two association ends
    ReferentialConstraint,
    /// A reference type wrapping an entity type
    RefType,
    /// An anonymous row type
    RowType,
    /// A type usage pairing a type with facets
    TypeUsage,
}

impl BuiltInTypeKind {
    /// Whether this kind is a structural type (owns a member collection).
    #[must_use]
    pub fn is_structural_type(&self) -> bool {
        matches!(
            self,
            BuiltInTypeKind::EntityType
                | BuiltInTypeKind::ComplexType
                | BuiltInTypeKind::RowType
                | BuiltInTypeKind::AssociationType
        )
    }

    /// Whether this kind is a transient type with a composed identity.
    #[must_use]
    pub fn is_transient_type(&self) -> bool {
        matches!(
            self,
            BuiltInTypeKind::RowType | BuiltInTypeKind::CollectionType | BuiltInTypeKind::RefType
        )
    }

    /// Whether this kind is an `EdmType` node.
    #[must_use]
    pub fn is_edm_type(&self) -> bool {
        matches!(
            self,
            BuiltInTypeKind::EntityType
                | BuiltInTypeKind::ComplexType
                | BuiltInTypeKind::RowType
                | BuiltInTypeKind::AssociationType
                | BuiltInTypeKind::CollectionType
                | BuiltInTypeKind::RefType
                | BuiltInTypeKind::PrimitiveType
                | BuiltInTypeKind::EnumType
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(BuiltInTypeKind::RowType.is_transient_type());
        assert!(BuiltInTypeKind::CollectionType.is_transient_type());
        assert!(BuiltInTypeKind::RefType.is_transient_type());
        assert!(!BuiltInTypeKind::EntityType.is_transient_type());
    }

    #[test]
    fn test_structural_kinds_are_edm_types() {
        use strum::IntoEnumIterator;
        for kind in BuiltInTypeKind::iter() {
            if kind.is_structural_type() {
                assert!(kind.is_edm_type(), "{kind} should be an EdmType");
            }
        }
    }
}

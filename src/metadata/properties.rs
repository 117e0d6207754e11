//! Static system-property descriptors.
//!
//! Each node kind statically declares the list of
//! `(name, value kind, is-collection)` descriptors for its own typed fields;
//! resolving the system properties of an item is a table lookup by
//! [`BuiltInTypeKind`], with no runtime reflection anywhere.

use crate::metadata::kind::BuiltInTypeKind;

/// The shape of a system property's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValueKind {
    /// A string-valued field
    String,
    /// A boolean-valued field
    Boolean,
    /// An integer-valued field
    Int32,
    /// A single referenced metadata item
    Item,
    /// A collection of metadata items
    ItemCollection,
}

/// Declaration of one system property slot on a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: &'static str,
    /// Value shape
    pub kind: PropertyValueKind,
    /// Whether the property is a collection
    pub is_collection: bool,
}

const fn scalar(name: &'static str, kind: PropertyValueKind) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        kind,
        is_collection: false,
    }
}

const fn many(name: &'static str) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        kind: PropertyValueKind::ItemCollection,
        is_collection: true,
    }
}

const NAMED_TYPE: [PropertyDescriptor; 2] = [
    scalar("Name", PropertyValueKind::String),
    scalar("NamespaceName", PropertyValueKind::String),
];

const ENTITY_TYPE: [PropertyDescriptor; 6] = [
    scalar("Name", PropertyValueKind::String),
    scalar("NamespaceName", PropertyValueKind::String),
    scalar("Abstract", PropertyValueKind::Boolean),
    scalar("BaseType", PropertyValueKind::Item),
    many("Members"),
    many("KeyMembers"),
];

const COMPLEX_TYPE: [PropertyDescriptor; 3] = [
    scalar("Name", PropertyValueKind::String),
    scalar("NamespaceName", PropertyValueKind::String),
    many("Members"),
];

const ROW_TYPE: [PropertyDescriptor; 1] = [many("Members")];

const ASSOCIATION_TYPE: [PropertyDescriptor; 5] = [
    scalar("Name", PropertyValueKind::String),
    scalar("NamespaceName", PropertyValueKind::String),
    scalar("IsForeignKey", PropertyValueKind::Boolean),
    many("Members"),
    scalar("ReferentialConstraint", PropertyValueKind::Item),
];

const COLLECTION_TYPE: [PropertyDescriptor; 1] = [scalar("TypeUsage", PropertyValueKind::Item)];

const REF_TYPE: [PropertyDescriptor; 1] = [scalar("ElementType", PropertyValueKind::Item)];

const ENUM_TYPE: [PropertyDescriptor; 4] = [
    scalar("Name", PropertyValueKind::String),
    scalar("NamespaceName", PropertyValueKind::String),
    scalar("UnderlyingType", PropertyValueKind::Item),
    many("Members"),
];

const EDM_PROPERTY: [PropertyDescriptor; 4] = [
    scalar("Name", PropertyValueKind::String),
    scalar("TypeUsage", PropertyValueKind::Item),
    scalar("Nullable", PropertyValueKind::Boolean),
    scalar("DeclaringType", PropertyValueKind::Item),
];

const NAVIGATION_PROPERTY: [PropertyDescriptor; 5] = [
    scalar("Name", PropertyValueKind::String),
    scalar("TypeUsage", PropertyValueKind::Item),
    scalar("RelationshipType", PropertyValueKind::Item),
    scalar("FromEndMember", PropertyValueKind::Item),
    scalar("ToEndMember", PropertyValueKind::Item),
];

const ASSOCIATION_END: [PropertyDescriptor; 4] = [
    scalar("Name", PropertyValueKind::String),
    scalar("TypeUsage", PropertyValueKind::Item),
    scalar("RelationshipMultiplicity", PropertyValueKind::String),
    scalar("DeleteBehavior", PropertyValueKind::String),
];

const ENTITY_CONTAINER: [PropertyDescriptor; 3] = [
    scalar("Name", PropertyValueKind::String),
    many("BaseEntitySets"),
    many("FunctionImports"),
];

const ENTITY_SET: [PropertyDescriptor; 5] = [
    scalar("Name", PropertyValueKind::String),
    scalar("ElementType", PropertyValueKind::Item),
    scalar("Table", PropertyValueKind::String),
    scalar("Schema", PropertyValueKind::String),
    scalar("EntityContainer", PropertyValueKind::Item),
];

const ASSOCIATION_SET: [PropertyDescriptor; 4] = [
    scalar("Name", PropertyValueKind::String),
    scalar("ElementType", PropertyValueKind::Item),
    many("AssociationSetEnds"),
    scalar("EntityContainer", PropertyValueKind::Item),
];

const ASSOCIATION_SET_END: [PropertyDescriptor; 3] = [
    scalar("Name", PropertyValueKind::String),
    scalar("EntitySet", PropertyValueKind::Item),
    scalar("CorrespondingAssociationEndMember", PropertyValueKind::Item),
];

const REFERENTIAL_CONSTRAINT: [PropertyDescriptor; 4] = [
    scalar("FromRole", PropertyValueKind::Item),
    scalar("ToRole", PropertyValueKind::Item),
    many("FromProperties"),
    many("ToProperties"),
];

const EDM_FUNCTION: [PropertyDescriptor; 4] = [
    scalar("Name", PropertyValueKind::String),
    scalar("NamespaceName", PropertyValueKind::String),
    many("Parameters"),
    scalar("ReturnType", PropertyValueKind::Item),
];

const FUNCTION_PARAMETER: [PropertyDescriptor; 3] = [
    scalar("Name", PropertyValueKind::String),
    scalar("TypeUsage", PropertyValueKind::Item),
    scalar("Mode", PropertyValueKind::String),
];

const FACET: [PropertyDescriptor; 2] = [
    scalar("Name", PropertyValueKind::String),
    scalar("Value", PropertyValueKind::String),
];

const METADATA_PROPERTY: [PropertyDescriptor; 2] = [
    scalar("Name", PropertyValueKind::String),
    scalar("Value", PropertyValueKind::String),
];

const DOCUMENTATION: [PropertyDescriptor; 2] = [
    scalar("Summary", PropertyValueKind::String),
    scalar("LongDescription", PropertyValueKind::String),
];

const EDM_MODEL: [PropertyDescriptor; 2] = [
    scalar("SchemaVersion", PropertyValueKind::String),
    many("Containers"),
];

const ENUM_MEMBER: [PropertyDescriptor; 2] = [
    scalar("Name", PropertyValueKind::String),
    scalar("Value", PropertyValueKind::Int32),
];

const TYPE_USAGE: [PropertyDescriptor; 2] = [
    scalar("EdmType", PropertyValueKind::Item),
    many("Facets"),
];

/// The system-property descriptors for `kind`.
///
/// The table is total over the closed [`BuiltInTypeKind`] enumeration.
#[must_use]
pub fn system_descriptors(kind: BuiltInTypeKind) -> &'static [PropertyDescriptor] {
    match kind {
        BuiltInTypeKind::AssociationEndMember => &ASSOCIATION_END,
        BuiltInTypeKind::AssociationSet => &ASSOCIATION_SET,
        BuiltInTypeKind::AssociationSetEnd => &ASSOCIATION_SET_END,
        BuiltInTypeKind::AssociationType => &ASSOCIATION_TYPE,
        BuiltInTypeKind::CollectionType => &COLLECTION_TYPE,
        BuiltInTypeKind::ComplexType => &COMPLEX_TYPE,
        BuiltInTypeKind::Documentation => &DOCUMENTATION,
        BuiltInTypeKind::EdmFunction => &EDM_FUNCTION,
        BuiltInTypeKind::EdmModel => &EDM_MODEL,
        BuiltInTypeKind::EdmProperty => &EDM_PROPERTY,
        BuiltInTypeKind::EntityContainer => &ENTITY_CONTAINER,
        BuiltInTypeKind::EntitySet => &ENTITY_SET,
        BuiltInTypeKind::EntityType => &ENTITY_TYPE,
        BuiltInTypeKind::EnumMember => &ENUM_MEMBER,
        BuiltInTypeKind::EnumType => &ENUM_TYPE,
        BuiltInTypeKind::Facet => &FACET,
        BuiltInTypeKind::FunctionParameter => &FUNCTION_PARAMETER,
        BuiltInTypeKind::MetadataProperty => &METADATA_PROPERTY,
        BuiltInTypeKind::NavigationProperty => &NAVIGATION_PROPERTY,
        BuiltInTypeKind::PrimitiveType => &NAMED_TYPE,
        BuiltInTypeKind::ReferentialConstraint => &REFERENTIAL_CONSTRAINT,
        BuiltInTypeKind::RefType => &REF_TYPE,
        BuiltInTypeKind::RowType => &ROW_TYPE,
        BuiltInTypeKind::TypeUsage => &TYPE_USAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_table_is_total_and_nonempty() {
        for kind in BuiltInTypeKind::iter() {
            assert!(
                !system_descriptors(kind).is_empty(),
                "{kind} has no system properties"
            );
        }
    }

    #[test]
    fn test_collection_descriptors_marked() {
        let members = system_descriptors(BuiltInTypeKind::EntityType)
            .iter()
            .find(|d| d.name == "Members")
            .unwrap();
        assert!(members.is_collection);
        assert_eq!(members.kind, PropertyValueKind::ItemCollection);
    }

    #[test]
    fn test_entity_type_declares_keys() {
        let names: Vec<&str> = system_descriptors(BuiltInTypeKind::EntityType)
            .iter()
            .map(|d| d.name)
            .collect();
        assert!(names.contains(&"KeyMembers"));
        assert!(names.contains(&"BaseType"));
    }
}

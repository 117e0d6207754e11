//! Convenient re-exports for common usage patterns.
//!
//! The prelude brings the types most programs touch into scope with one
//! import:
//!
//! ```rust
//! use edmgraph::prelude::*;
//!
//! let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace)?;
//! customer.set_readonly();
//! # Ok::<(), edmgraph::Error>(())
//! ```

pub use crate::error::{Error, Result};

pub use crate::metadata::{
    cache::MetadataCache,
    collection::{MetadataCollection, NamedItem, ReadOnlyMetadataCollection},
    container::{
        AssociationSet, AssociationSetEnd, EntityContainer, EntitySet, EntitySetBaseRef,
        ForeignKeySnapshot,
    },
    digest::StructuralDigest,
    facets::{Facet, FacetDescription, FacetValue, FacetValueKind},
    flags::{DataSpace, ItemState, ParameterMode},
    function::{EdmFunction, FunctionParameter},
    item::{Documentation, MetadataItem, MetadataProperty, MetadataValue},
    kind::BuiltInTypeKind,
    model::{EdmModel, EdmVersion},
    typeusage::TypeUsage,
    types::{
        AssociationEndMember, AssociationType, CollectionType, ComplexType, EdmMemberRef,
        EdmProperty, EdmTypeRef, EntityType, EnumMember, EnumType, NavigationProperty,
        OperationAction, PrimitiveType, PrimitiveTypeKind, RefType, ReferentialConstraint,
        RelationshipMultiplicity, RowType,
    },
    validation::{
        DataModelError, DataModelValidator, ModelItem, RuleTarget, Severity, ValidationContext,
        ValidationRule,
    },
};

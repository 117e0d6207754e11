//! Association types and referential constraints.

use std::sync::{Arc, RwLock, Weak};

use crate::{
    metadata::{
        collection::{MetadataCollection, ReadOnlyMetadataCollection},
        flags::DataSpace,
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        types::{AssociationEndMember, DeclaringTypeRef, EdmMemberRef, EdmProperty},
    },
    Result,
};

/// A named two-ended relationship between entity types.
///
/// An association becomes a foreign-key association once a referential
/// constraint binds dependent properties to the principal end's key.
#[derive(Debug)]
pub struct AssociationType {
    base: ItemBase,
    name: String,
    namespace: String,
    members: Arc<MetadataCollection<EdmMemberRef>>,
    constraint: RwLock<Option<Arc<ReferentialConstraint>>>,
    weak_self: Weak<AssociationType>,
}

impl AssociationType {
    /// Declare an association in `namespace` tagged with `space`.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, namespace: &str, space: DataSpace) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("association name must not be empty"));
        }
        let association = Arc::new_cyclic(|weak| AssociationType {
            base: ItemBase::new(),
            name: name.to_string(),
            namespace: namespace.to_string(),
            members: Arc::new(MetadataCollection::new()),
            constraint: RwLock::new(None),
            weak_self: weak.clone(),
        });
        association
            .base
            .state()
            .set_data_space(space, &association.identity())?;
        Ok(association)
    }

    /// The simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declaring namespace.
    #[must_use]
    pub fn namespace_name(&self) -> &str {
        &self.namespace
    }

    /// `Namespace.Name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// The declared ends, in declaration order.
    #[must_use]
    pub fn members(&self) -> ReadOnlyMetadataCollection<EdmMemberRef> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.members))
    }

    /// The two ends as typed handles, in declaration order.
    #[must_use]
    pub fn ends(&self) -> Vec<Arc<AssociationEndMember>> {
        self.members
            .to_vec()
            .into_iter()
            .filter_map(|member| match member {
                EdmMemberRef::End(end) => Some(end),
                _ => None,
            })
            .collect()
    }

    /// The end with role name `role`, if declared.
    #[must_use]
    pub fn end(&self, role: &str) -> Option<Arc<AssociationEndMember>> {
        match self.members.try_get_value(role, false) {
            Some(EdmMemberRef::End(end)) => Some(end),
            _ => None,
        }
    }

    /// Declare an end. Associations hold exactly two.
    ///
    /// # Errors
    ///
    /// Fails when frozen, on a duplicate role name, or when two ends are
    /// already declared.
    pub fn add_end(&self, end: Arc<AssociationEndMember>) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        if self.members.len() >= 2 {
            return Err(usage_error!(
                "association '{}' already declares two ends",
                self.full_name()
            ));
        }
        let member = EdmMemberRef::End(end);
        self.members.add(member.clone())?;
        member.set_declaring(DeclaringTypeRef::Association(self.weak_self.clone()));
        Ok(())
    }

    /// The referential constraint, if one has been attached.
    #[must_use]
    pub fn referential_constraint(&self) -> Option<Arc<ReferentialConstraint>> {
        read_lock!(self.constraint).clone()
    }

    /// Attach the referential constraint making this a foreign-key
    /// association.
    ///
    /// # Errors
    ///
    /// Fails when frozen or when a constraint is already attached.
    pub fn set_referential_constraint(&self, constraint: Arc<ReferentialConstraint>) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        let mut slot = write_lock!(self.constraint);
        if slot.is_some() {
            return Err(usage_error!(
                "association '{}' already has a referential constraint",
                self.full_name()
            ));
        }
        *slot = Some(constraint);
        Ok(())
    }

    /// Whether a referential constraint binds this association.
    #[must_use]
    pub fn is_foreign_key(&self) -> bool {
        read_lock!(self.constraint).is_some()
    }

    pub(crate) fn members_collection(&self) -> &MetadataCollection<EdmMemberRef> {
        &self.members
    }
}

impl MetadataItem for AssociationType {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::AssociationType
    }

    fn identity(&self) -> String {
        self.full_name()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.members.set_readonly();
        for member in self.members.to_vec() {
            member.set_readonly();
        }
        if let Some(constraint) = self.referential_constraint() {
            constraint.as_ref().set_readonly();
        }
    }
}

/// Binds dependent-end properties to the principal end's key, pairwise in
/// order.
#[derive(Debug)]
pub struct ReferentialConstraint {
    base: ItemBase,
    from_role: Arc<AssociationEndMember>,
    to_role: Arc<AssociationEndMember>,
    from_properties: Vec<Arc<EdmProperty>>,
    to_properties: Vec<Arc<EdmProperty>>,
}

impl ReferentialConstraint {
    /// Build a constraint from the principal role (`from_role`, its key
    /// properties) to the dependent role (`to_role`, its foreign-key
    /// properties).
    ///
    /// # Errors
    ///
    /// Fails when the property lists are empty or differ in length.
    pub fn new(
        from_role: Arc<AssociationEndMember>,
        to_role: Arc<AssociationEndMember>,
        from_properties: Vec<Arc<EdmProperty>>,
        to_properties: Vec<Arc<EdmProperty>>,
    ) -> Result<Arc<Self>> {
        if from_properties.is_empty() {
            return Err(usage_error!("referential constraint needs at least one property pair"));
        }
        if from_properties.len() != to_properties.len() {
            return Err(usage_error!(
                "referential constraint pairs {} principal properties with {} dependent properties",
                from_properties.len(),
                to_properties.len()
            ));
        }
        Ok(Arc::new(ReferentialConstraint {
            base: ItemBase::new(),
            from_role,
            to_role,
            from_properties,
            to_properties,
        }))
    }

    /// The principal role.
    #[must_use]
    pub fn from_role(&self) -> &Arc<AssociationEndMember> {
        &self.from_role
    }

    /// The dependent role.
    #[must_use]
    pub fn to_role(&self) -> &Arc<AssociationEndMember> {
        &self.to_role
    }

    /// The principal-side (key) properties, in pairing order.
    #[must_use]
    pub fn from_properties(&self) -> &[Arc<EdmProperty>] {
        &self.from_properties
    }

    /// The dependent-side (foreign-key) properties, in pairing order.
    #[must_use]
    pub fn to_properties(&self) -> &[Arc<EdmProperty>] {
        &self.to_properties
    }
}

impl MetadataItem for ReferentialConstraint {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::ReferentialConstraint
    }

    fn identity(&self) -> String {
        format!("{0}->{1}", self.from_role.name(), self.to_role.name())
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::{EntityType, PrimitiveTypeKind, RelationshipMultiplicity};
    use crate::Error;

    fn end(role: &str, multiplicity: RelationshipMultiplicity) -> Arc<AssociationEndMember> {
        let entity = EntityType::new(role, "Shop", DataSpace::CSpace).unwrap();
        AssociationEndMember::new(role, &entity, multiplicity).unwrap()
    }

    #[test]
    fn test_two_ends_max() {
        let association =
            AssociationType::new("CustomerOrder", "Shop", DataSpace::CSpace).unwrap();
        association
            .add_end(end("Customer", RelationshipMultiplicity::One))
            .unwrap();
        association
            .add_end(end("Order", RelationshipMultiplicity::Many))
            .unwrap();
        assert!(association
            .add_end(end("Extra", RelationshipMultiplicity::One))
            .is_err());
        assert_eq!(association.ends().len(), 2);
        assert!(association.end("Customer").is_some());
        assert!(association.end("Missing").is_none());
    }

    #[test]
    fn test_constraint_makes_foreign_key() {
        let association =
            AssociationType::new("CustomerOrder", "Shop", DataSpace::CSpace).unwrap();
        let principal = end("Customer", RelationshipMultiplicity::One);
        let dependent = end("Order", RelationshipMultiplicity::Many);
        association.add_end(Arc::clone(&principal)).unwrap();
        association.add_end(Arc::clone(&dependent)).unwrap();
        assert!(!association.is_foreign_key());

        let key = crate::metadata::types::EdmProperty::primitive(
            "Id",
            PrimitiveTypeKind::Int32,
            false,
        )
        .unwrap();
        let foreign = crate::metadata::types::EdmProperty::primitive(
            "CustomerId",
            PrimitiveTypeKind::Int32,
            false,
        )
        .unwrap();
        let constraint =
            ReferentialConstraint::new(principal, dependent, vec![key], vec![foreign]).unwrap();
        association
            .set_referential_constraint(Arc::clone(&constraint))
            .unwrap();
        assert!(association.is_foreign_key());

        // Only one constraint per association.
        assert!(association.set_referential_constraint(constraint).is_err());
    }

    #[test]
    fn test_constraint_arity_checked() {
        let principal = end("Customer", RelationshipMultiplicity::One);
        let dependent = end("Order", RelationshipMultiplicity::Many);
        let key = crate::metadata::types::EdmProperty::primitive(
            "Id",
            PrimitiveTypeKind::Int32,
            false,
        )
        .unwrap();
        assert!(ReferentialConstraint::new(
            Arc::clone(&principal),
            Arc::clone(&dependent),
            vec![key],
            vec![]
        )
        .is_err());
        assert!(
            ReferentialConstraint::new(principal, dependent, vec![], vec![]).is_err()
        );
    }

    #[test]
    fn test_freeze_cascades_to_ends_and_constraint() {
        let association =
            AssociationType::new("CustomerOrder", "Shop", DataSpace::CSpace).unwrap();
        let principal = end("Customer", RelationshipMultiplicity::One);
        association.add_end(Arc::clone(&principal)).unwrap();
        association.as_ref().set_readonly();
        assert!(principal.as_ref().is_readonly());
        assert!(matches!(
            association.add_end(end("Order", RelationshipMultiplicity::Many)),
            Err(Error::ReadOnly { .. })
        ));
    }
}

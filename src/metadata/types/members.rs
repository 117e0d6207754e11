//! Members declared by structural types: scalar/complex properties,
//! navigation properties, and association ends.

use std::sync::{Arc, RwLock};

use crate::{
    metadata::{
        backref::BackRef,
        collection::NamedItem,
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        typeusage::TypeUsage,
        types::{
            AssociationType, DeclaringTypeRef, EdmTypeRef, EntityType, PrimitiveType,
            PrimitiveTypeKind, RefType,
        },
    },
    Error, Result,
};

/// How many instances may participate on one end of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipMultiplicity {
    /// Zero or one
    ZeroOrOne,
    /// Exactly one
    One,
    /// Any number
    Many,
}

impl std::fmt::Display for RelationshipMultiplicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipMultiplicity::ZeroOrOne => write!(f, "0..1"),
            RelationshipMultiplicity::One => write!(f, "1"),
            RelationshipMultiplicity::Many => write!(f, "*"),
        }
    }
}

/// What happens to dependents when the principal on an end is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationAction {
    /// No action
    #[default]
    None,
    /// Delete cascades across the association
    Cascade,
    /// Deletion is blocked while dependents exist
    Restrict,
}

/// A scalar, enum, or complex-typed property of a structural type.
#[derive(Debug)]
pub struct EdmProperty {
    base: ItemBase,
    name: RwLock<String>,
    type_usage: Arc<TypeUsage>,
    declaring: RwLock<DeclaringTypeRef>,
}

impl EdmProperty {
    /// Declare a property with an explicit type usage.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty or the usage references a kind that cannot
    /// be a property type (entity, association, collection of entities).
    pub fn new(name: &str, type_usage: Arc<TypeUsage>) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("property name must not be empty"));
        }
        match type_usage.edm_type() {
            EdmTypeRef::Primitive(_)
            | EdmTypeRef::Enum(_)
            | EdmTypeRef::Complex(_)
            | EdmTypeRef::Row(_) => {}
            other => {
                return Err(Error::InvalidMemberKind {
                    member: name.to_string(),
                    kind: other.item_kind().to_string(),
                    type_name: other.identity(),
                })
            }
        }
        Ok(Arc::new(EdmProperty {
            base: ItemBase::new(),
            name: RwLock::new(name.to_string()),
            type_usage,
            declaring: RwLock::new(DeclaringTypeRef::None),
        }))
    }

    /// Declare a primitive-typed property with only the nullability facet
    /// configured; every other applicable slot keeps its default.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn primitive(name: &str, kind: PrimitiveTypeKind, nullable: bool) -> Result<Arc<Self>> {
        let canonical = EdmTypeRef::Primitive(PrimitiveType::canonical(kind));
        let usage = TypeUsage::create(
            canonical,
            vec![crate::metadata::facets::nullable()
                .facet(crate::metadata::facets::FacetValue::Boolean(nullable))?],
        )?;
        EdmProperty::new(name, usage)
    }

    /// The property name.
    #[must_use]
    pub fn name(&self) -> String {
        read_lock!(self.name).clone()
    }

    /// Rename the property. The declaring type's member index is dropped so
    /// lookups never resolve through the old name.
    ///
    /// # Errors
    ///
    /// Fails when the property is frozen or `name` is empty.
    pub fn set_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(usage_error!("property name must not be empty"));
        }
        self.base.state().assert_mutable(&self.name())?;
        *write_lock!(self.name) = name.to_string();
        read_lock!(self.declaring).invalidate_member_index();
        Ok(())
    }

    /// The configured type of this property.
    #[must_use]
    pub fn type_usage(&self) -> &Arc<TypeUsage> {
        &self.type_usage
    }

    /// Whether the property admits null.
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.type_usage.is_nullable()
    }

    /// The structural type declaring this property, if any.
    #[must_use]
    pub fn declaring_type(&self) -> Option<EdmTypeRef> {
        read_lock!(self.declaring).upgrade()
    }

    pub(crate) fn set_declaring(&self, declaring: DeclaringTypeRef) {
        *write_lock!(self.declaring) = declaring;
    }
}

impl MetadataItem for EdmProperty {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::EdmProperty
    }

    fn identity(&self) -> String {
        self.name()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.type_usage.as_ref().set_readonly();
    }
}

/// A property that traverses an association to a related entity or a
/// collection of them.
///
/// The links to the association and its ends are non-owning; the entity
/// graph's cycles (entity to navigation to association to end and back to
/// the entity) are broken here.
#[derive(Debug)]
pub struct NavigationProperty {
    base: ItemBase,
    name: RwLock<String>,
    type_usage: Arc<TypeUsage>,
    relationship: BackRef<AssociationType>,
    from_end: BackRef<AssociationEndMember>,
    to_end: BackRef<AssociationEndMember>,
    declaring: RwLock<DeclaringTypeRef>,
}

impl NavigationProperty {
    /// Declare a navigation property whose value shape is `type_usage`
    /// (an entity, or a collection of entities for the many side).
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, type_usage: Arc<TypeUsage>) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("navigation property name must not be empty"));
        }
        Ok(Arc::new(NavigationProperty {
            base: ItemBase::new(),
            name: RwLock::new(name.to_string()),
            type_usage,
            relationship: BackRef::unset(),
            from_end: BackRef::unset(),
            to_end: BackRef::unset(),
            declaring: RwLock::new(DeclaringTypeRef::None),
        }))
    }

    /// The property name.
    #[must_use]
    pub fn name(&self) -> String {
        read_lock!(self.name).clone()
    }

    /// Rename the property; drops the declaring type's member index.
    ///
    /// # Errors
    ///
    /// Fails when frozen or `name` is empty.
    pub fn set_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(usage_error!("navigation property name must not be empty"));
        }
        self.base.state().assert_mutable(&self.name())?;
        *write_lock!(self.name) = name.to_string();
        read_lock!(self.declaring).invalidate_member_index();
        Ok(())
    }

    /// The value shape of this navigation.
    #[must_use]
    pub fn type_usage(&self) -> &Arc<TypeUsage> {
        &self.type_usage
    }

    /// Wire the association this navigation traverses and its two ends.
    ///
    /// # Errors
    ///
    /// Fails when the property is frozen.
    pub fn set_relationship(
        &self,
        association: &Arc<AssociationType>,
        from: &Arc<AssociationEndMember>,
        to: &Arc<AssociationEndMember>,
    ) -> Result<()> {
        self.base.state().assert_mutable(&self.name())?;
        self.relationship.set(association);
        self.from_end.set(from);
        self.to_end.set(to);
        Ok(())
    }

    /// The traversed association.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] when the association was dropped.
    pub fn relationship(&self) -> Result<Arc<AssociationType>> {
        self.relationship
            .upgrade()
            .ok_or_else(|| Error::DanglingReference(self.dangling_message("relationship")))
    }

    /// The end this navigation starts from (the declaring entity's side).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] when the end was dropped.
    pub fn from_end(&self) -> Result<Arc<AssociationEndMember>> {
        self.from_end
            .upgrade()
            .ok_or_else(|| Error::DanglingReference(self.dangling_message("from end")))
    }

    /// The end this navigation leads to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] when the end was dropped.
    pub fn to_end(&self) -> Result<Arc<AssociationEndMember>> {
        self.to_end
            .upgrade()
            .ok_or_else(|| Error::DanglingReference(self.dangling_message("to end")))
    }

    fn dangling_message(&self, link: &str) -> String {
        format!("navigation property '{0}' has a dropped {link}", self.name())
    }

    /// The structural type declaring this property, if any.
    #[must_use]
    pub fn declaring_type(&self) -> Option<EdmTypeRef> {
        read_lock!(self.declaring).upgrade()
    }

    pub(crate) fn set_declaring(&self, declaring: DeclaringTypeRef) {
        *write_lock!(self.declaring) = declaring;
    }
}

impl MetadataItem for NavigationProperty {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::NavigationProperty
    }

    fn identity(&self) -> String {
        self.name()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    // The relationship links are not owned and must not be frozen from here.
    fn freeze_children(&self) {
        self.type_usage.as_ref().set_readonly();
    }
}

/// One end of an association: a role name, the participating entity, a
/// multiplicity, and a delete behavior.
#[derive(Debug)]
pub struct AssociationEndMember {
    base: ItemBase,
    name: RwLock<String>,
    type_usage: Arc<TypeUsage>,
    multiplicity: RwLock<RelationshipMultiplicity>,
    delete_behavior: RwLock<OperationAction>,
    declaring: RwLock<DeclaringTypeRef>,
}

impl AssociationEndMember {
    /// Declare an association end over `entity` with role name `name`.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(
        name: &str,
        entity: &Arc<EntityType>,
        multiplicity: RelationshipMultiplicity,
    ) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("association end role name must not be empty"));
        }
        let reference = RefType::new(entity);
        let usage = TypeUsage::create(EdmTypeRef::Ref(reference), Vec::new())?;
        Ok(Arc::new(AssociationEndMember {
            base: ItemBase::new(),
            name: RwLock::new(name.to_string()),
            type_usage: usage,
            multiplicity: RwLock::new(multiplicity),
            delete_behavior: RwLock::new(OperationAction::None),
            declaring: RwLock::new(DeclaringTypeRef::None),
        }))
    }

    /// The role name.
    #[must_use]
    pub fn name(&self) -> String {
        read_lock!(self.name).clone()
    }

    /// The reference usage wrapping the participating entity.
    #[must_use]
    pub fn type_usage(&self) -> &Arc<TypeUsage> {
        &self.type_usage
    }

    /// The entity participating on this end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] if the usage does not wrap a
    /// reference type (cannot happen for ends built through
    /// [`AssociationEndMember::new`]).
    pub fn entity_type(&self) -> Result<Arc<EntityType>> {
        match self.type_usage.edm_type() {
            EdmTypeRef::Ref(reference) => Ok(Arc::clone(reference.element_type())),
            other => Err(Error::DanglingReference(format!(
                "association end '{0}' wraps '{1}' instead of an entity reference",
                self.name(),
                other.identity()
            ))),
        }
    }

    /// This end's multiplicity.
    #[must_use]
    pub fn multiplicity(&self) -> RelationshipMultiplicity {
        *read_lock!(self.multiplicity)
    }

    /// Change the multiplicity.
    ///
    /// # Errors
    ///
    /// Fails when the end is frozen.
    pub fn set_multiplicity(&self, multiplicity: RelationshipMultiplicity) -> Result<()> {
        self.base.state().assert_mutable(&self.name())?;
        *write_lock!(self.multiplicity) = multiplicity;
        Ok(())
    }

    /// The delete behavior on this end.
    #[must_use]
    pub fn delete_behavior(&self) -> OperationAction {
        *read_lock!(self.delete_behavior)
    }

    /// Change the delete behavior.
    ///
    /// # Errors
    ///
    /// Fails when the end is frozen.
    pub fn set_delete_behavior(&self, action: OperationAction) -> Result<()> {
        self.base.state().assert_mutable(&self.name())?;
        *write_lock!(self.delete_behavior) = action;
        Ok(())
    }

    /// The association declaring this end, if wired.
    #[must_use]
    pub fn declaring_type(&self) -> Option<EdmTypeRef> {
        read_lock!(self.declaring).upgrade()
    }

    pub(crate) fn set_declaring(&self, declaring: DeclaringTypeRef) {
        *write_lock!(self.declaring) = declaring;
    }
}

impl MetadataItem for AssociationEndMember {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::AssociationEndMember
    }

    fn identity(&self) -> String {
        self.name()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.type_usage.as_ref().set_readonly();
    }
}

/// A polymorphic reference to a member node.
#[derive(Debug, Clone)]
pub enum EdmMemberRef {
    /// A scalar/enum/complex property
    Property(Arc<EdmProperty>),
    /// A navigation property
    Navigation(Arc<NavigationProperty>),
    /// An association end
    End(Arc<AssociationEndMember>),
}

impl EdmMemberRef {
    /// The member's name (its identity within the declaring type).
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            EdmMemberRef::Property(member) => member.name(),
            EdmMemberRef::Navigation(member) => member.name(),
            EdmMemberRef::End(member) => member.name(),
        }
    }

    /// The concrete member kind.
    #[must_use]
    pub fn item_kind(&self) -> BuiltInTypeKind {
        match self {
            EdmMemberRef::Property(_) => BuiltInTypeKind::EdmProperty,
            EdmMemberRef::Navigation(_) => BuiltInTypeKind::NavigationProperty,
            EdmMemberRef::End(_) => BuiltInTypeKind::AssociationEndMember,
        }
    }

    /// The member's type usage.
    #[must_use]
    pub fn type_usage(&self) -> &Arc<TypeUsage> {
        match self {
            EdmMemberRef::Property(member) => member.type_usage(),
            EdmMemberRef::Navigation(member) => member.type_usage(),
            EdmMemberRef::End(member) => member.type_usage(),
        }
    }

    /// The structural type declaring this member, if any.
    #[must_use]
    pub fn declaring_type(&self) -> Option<EdmTypeRef> {
        match self {
            EdmMemberRef::Property(member) => member.declaring_type(),
            EdmMemberRef::Navigation(member) => member.declaring_type(),
            EdmMemberRef::End(member) => member.declaring_type(),
        }
    }

    /// Freeze the referenced member.
    pub fn set_readonly(&self) {
        match self {
            EdmMemberRef::Property(member) => member.as_ref().set_readonly(),
            EdmMemberRef::Navigation(member) => member.as_ref().set_readonly(),
            EdmMemberRef::End(member) => member.as_ref().set_readonly(),
        }
    }

    /// Whether the referenced member is frozen.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        match self {
            EdmMemberRef::Property(member) => member.as_ref().is_readonly(),
            EdmMemberRef::Navigation(member) => member.as_ref().is_readonly(),
            EdmMemberRef::End(member) => member.as_ref().is_readonly(),
        }
    }

    /// A stable address usable as a visited-set key.
    #[must_use]
    pub fn ptr_key(&self) -> usize {
        match self {
            EdmMemberRef::Property(member) => Arc::as_ptr(member) as usize,
            EdmMemberRef::Navigation(member) => Arc::as_ptr(member) as usize,
            EdmMemberRef::End(member) => Arc::as_ptr(member) as usize,
        }
    }

    pub(crate) fn set_declaring(&self, declaring: DeclaringTypeRef) {
        match self {
            EdmMemberRef::Property(member) => member.set_declaring(declaring),
            EdmMemberRef::Navigation(member) => member.set_declaring(declaring),
            EdmMemberRef::End(member) => member.set_declaring(declaring),
        }
    }
}

impl NamedItem for EdmMemberRef {
    fn identity(&self) -> String {
        self.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::flags::DataSpace;

    #[test]
    fn test_primitive_property_shape() {
        let id = EdmProperty::primitive("Id", PrimitiveTypeKind::Int32, false).unwrap();
        assert_eq!(id.name(), "Id");
        assert!(!id.nullable());
        assert!(matches!(id.type_usage().edm_type(), EdmTypeRef::Primitive(_)));
        assert!(id.declaring_type().is_none());
    }

    #[test]
    fn test_property_rejects_entity_type() {
        let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace).unwrap();
        let usage = TypeUsage::create(EdmTypeRef::Entity(customer), Vec::new()).unwrap();
        let err = EdmProperty::new("Owner", usage).unwrap_err();
        assert!(matches!(err, Error::InvalidMemberKind { .. }));
    }

    #[test]
    fn test_rename_guarded_by_freeze() {
        let name = EdmProperty::primitive("Name", PrimitiveTypeKind::String, true).unwrap();
        name.set_name("DisplayName").unwrap();
        assert_eq!(name.name(), "DisplayName");
        name.as_ref().set_readonly();
        assert!(name.set_name("Again").is_err());
    }

    #[test]
    fn test_end_member_entity_round_trip() {
        let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace).unwrap();
        let end =
            AssociationEndMember::new("Customer", &customer, RelationshipMultiplicity::One)
                .unwrap();
        assert!(Arc::ptr_eq(&end.entity_type().unwrap(), &customer));
        assert_eq!(end.multiplicity(), RelationshipMultiplicity::One);

        end.set_delete_behavior(OperationAction::Cascade).unwrap();
        end.as_ref().set_readonly();
        assert!(end.set_multiplicity(RelationshipMultiplicity::Many).is_err());
        assert_eq!(end.delete_behavior(), OperationAction::Cascade);
    }

    #[test]
    fn test_navigation_reports_dropped_relationship() {
        let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace).unwrap();
        let usage = TypeUsage::create(EdmTypeRef::Entity(customer), Vec::new()).unwrap();
        let navigation = NavigationProperty::new("Orders", usage).unwrap();
        assert!(matches!(
            navigation.relationship(),
            Err(Error::DanglingReference(_))
        ));
    }
}

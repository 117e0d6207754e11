//! Entity containers and the sets they hold.
//!
//! A container is the deployment scope of a model: entity sets and
//! association sets, name-unique within the container, plus function imports.
//! Sets link back to their container through explicit non-owning references,
//! and entity sets expose a frozen-only foreign-key summary derived once from
//! the sibling association sets.

use std::sync::{Arc, RwLock, Weak};

use crate::{
    metadata::{
        backref::BackRef,
        collection::{MetadataCollection, NamedItem, ReadOnlyMetadataCollection},
        function::EdmFunction,
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        lazy::DerivedCell,
        types::{AssociationEndMember, AssociationType, EntityType, ReferentialConstraint},
    },
    Error, Result,
};

/// A set of instances of one entity type (and its derived types), optionally
/// mapped to a store table.
#[derive(Debug)]
pub struct EntitySet {
    base: ItemBase,
    name: String,
    element_type: Arc<EntityType>,
    table: RwLock<Option<String>>,
    schema: RwLock<Option<String>>,
    container: BackRef<EntityContainer>,
    foreign_keys: DerivedCell<ForeignKeySnapshot>,
}

impl EntitySet {
    /// Declare a set of `element_type` instances.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, element_type: &Arc<EntityType>) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("entity set name must not be empty"));
        }
        Ok(Arc::new(EntitySet {
            base: ItemBase::new(),
            name: name.to_string(),
            element_type: Arc::clone(element_type),
            table: RwLock::new(None),
            schema: RwLock::new(None),
            container: BackRef::unset(),
            foreign_keys: DerivedCell::new(),
        }))
    }

    /// The set name, unique within its container.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entity type whose instances this set holds.
    #[must_use]
    pub fn element_type(&self) -> &Arc<EntityType> {
        &self.element_type
    }

    /// The mapped store table, if set.
    #[must_use]
    pub fn table(&self) -> Option<String> {
        read_lock!(self.table).clone()
    }

    /// The mapped store schema, if set.
    #[must_use]
    pub fn schema(&self) -> Option<String> {
        read_lock!(self.schema).clone()
    }

    /// Record the store mapping of this set.
    ///
    /// # Errors
    ///
    /// Fails when frozen.
    pub fn set_table(&self, schema: Option<&str>, table: Option<&str>) -> Result<()> {
        self.base.state().assert_mutable(&self.name)?;
        *write_lock!(self.schema) = schema.map(str::to_string);
        *write_lock!(self.table) = table.map(str::to_string);
        Ok(())
    }

    /// The container this set was added to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] when the set was never added or
    /// the container was dropped.
    pub fn entity_container(&self) -> Result<Arc<EntityContainer>> {
        self.container.upgrade().ok_or_else(|| {
            Error::DanglingReference(format!("entity set '{0}' has no container", self.name))
        })
    }

    /// The frozen-only foreign-key summary of this set.
    ///
    /// Computed once from the sibling association sets on first access and
    /// published as a whole; readers never observe a partial summary.
    #[must_use]
    pub fn foreign_key_snapshot(&self) -> &ForeignKeySnapshot {
        self.foreign_keys.get_or_init(self.base.state(), || {
            ForeignKeySnapshot::collect(self, self.container.upgrade().as_ref())
        })
    }

    /// The association sets and constraints where this set is the dependent.
    #[must_use]
    pub fn foreign_key_dependents(&self) -> &[(Arc<AssociationSet>, Arc<ReferentialConstraint>)] {
        &self.foreign_key_snapshot().dependents
    }

    /// The association sets and constraints where this set is the principal.
    #[must_use]
    pub fn foreign_key_principals(&self) -> &[(Arc<AssociationSet>, Arc<ReferentialConstraint>)] {
        &self.foreign_key_snapshot().principals
    }

    /// Whether any foreign-key constraint touches this set, on either role.
    #[must_use]
    pub fn has_foreign_key_relationships(&self) -> bool {
        self.foreign_key_snapshot().has_foreign_key_relationships
    }

    /// Whether any constraint-free association set touches this set.
    #[must_use]
    pub fn has_independent_relationships(&self) -> bool {
        self.foreign_key_snapshot().has_independent_relationships
    }
}

impl MetadataItem for EntitySet {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::EntitySet
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    // The element type is referenced, not owned; the model freezes it.
}

/// The foreign-key view of one entity set, derived once after freeze.
#[derive(Debug, Default)]
pub struct ForeignKeySnapshot {
    dependents: Vec<(Arc<AssociationSet>, Arc<ReferentialConstraint>)>,
    principals: Vec<(Arc<AssociationSet>, Arc<ReferentialConstraint>)>,
    has_foreign_key_relationships: bool,
    has_independent_relationships: bool,
}

impl ForeignKeySnapshot {
    fn collect(set: &EntitySet, container: Option<&Arc<EntityContainer>>) -> ForeignKeySnapshot {
        let mut snapshot = ForeignKeySnapshot::default();
        let Some(container) = container else {
            return snapshot;
        };
        for association_set in container.association_sets() {
            let mut touches = false;
            for end in association_set.ends().to_vec() {
                let Ok(end_set) = end.entity_set() else {
                    continue;
                };
                if !std::ptr::eq(Arc::as_ptr(&end_set), set) {
                    continue;
                }
                touches = true;
                let Some(constraint) = association_set.element_type().referential_constraint()
                else {
                    continue;
                };
                if end.end_member().name() == constraint.to_role().name() {
                    snapshot
                        .dependents
                        .push((Arc::clone(&association_set), Arc::clone(&constraint)));
                    snapshot.has_foreign_key_relationships = true;
                }
                if end.end_member().name() == constraint.from_role().name() {
                    snapshot
                        .principals
                        .push((Arc::clone(&association_set), Arc::clone(&constraint)));
                    snapshot.has_foreign_key_relationships = true;
                }
            }
            if touches && association_set.element_type().referential_constraint().is_none() {
                snapshot.has_independent_relationships = true;
            }
        }
        snapshot
    }
}

/// One side of an association set: a declared end bound to the entity set
/// participating on that side.
#[derive(Debug)]
pub struct AssociationSetEnd {
    base: ItemBase,
    parent: BackRef<AssociationSet>,
    end_member: Arc<AssociationEndMember>,
    entity_set: BackRef<EntitySet>,
}

impl AssociationSetEnd {
    /// The declared end this set end corresponds to.
    #[must_use]
    pub fn end_member(&self) -> &Arc<AssociationEndMember> {
        &self.end_member
    }

    /// The role name, inherited from the end member.
    #[must_use]
    pub fn name(&self) -> String {
        self.end_member.name()
    }

    /// The entity set participating on this side.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] when the entity set was dropped.
    pub fn entity_set(&self) -> Result<Arc<EntitySet>> {
        self.entity_set.upgrade().ok_or_else(|| {
            Error::DanglingReference(format!(
                "association set end '{0}' has a dropped entity set",
                self.name()
            ))
        })
    }

    /// The association set declaring this end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] when the parent was dropped.
    pub fn parent(&self) -> Result<Arc<AssociationSet>> {
        self.parent.upgrade().ok_or_else(|| {
            Error::DanglingReference(format!(
                "association set end '{0}' has a dropped parent set",
                self.name()
            ))
        })
    }
}

impl MetadataItem for AssociationSetEnd {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::AssociationSetEnd
    }

    fn identity(&self) -> String {
        self.name()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }
}

impl NamedItem for Arc<AssociationSetEnd> {
    fn identity(&self) -> String {
        self.name()
    }
}

/// A set of links of one association type, binding each declared end to an
/// entity set.
#[derive(Debug)]
pub struct AssociationSet {
    base: ItemBase,
    name: String,
    element_type: Arc<AssociationType>,
    ends: Arc<MetadataCollection<Arc<AssociationSetEnd>>>,
    container: BackRef<EntityContainer>,
    weak_self: Weak<AssociationSet>,
}

impl AssociationSet {
    /// Declare a set of `element_type` links.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, element_type: &Arc<AssociationType>) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("association set name must not be empty"));
        }
        Ok(Arc::new_cyclic(|weak| AssociationSet {
            base: ItemBase::new(),
            name: name.to_string(),
            element_type: Arc::clone(element_type),
            ends: Arc::new(MetadataCollection::new()),
            container: BackRef::unset(),
            weak_self: weak.clone(),
        }))
    }

    /// The set name, unique within its container.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The association type whose links this set holds.
    #[must_use]
    pub fn element_type(&self) -> &Arc<AssociationType> {
        &self.element_type
    }

    /// The bound set ends, in binding order.
    #[must_use]
    pub fn ends(&self) -> ReadOnlyMetadataCollection<Arc<AssociationSetEnd>> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.ends))
    }

    /// The set end with role name `role`, if bound.
    #[must_use]
    pub fn end(&self, role: &str) -> Option<Arc<AssociationSetEnd>> {
        self.ends.try_get_value(role, false)
    }

    /// Bind the declared end with `end_member`'s role to `entity_set`.
    ///
    /// # Errors
    ///
    /// Fails when frozen, when the role is not declared by the element
    /// association, when the entity set's element type cannot participate on
    /// that end, or when the role is already bound.
    pub fn add_end(
        &self,
        end_member: &Arc<AssociationEndMember>,
        entity_set: &Arc<EntitySet>,
    ) -> Result<()> {
        self.base.state().assert_mutable(&self.name)?;
        if self.element_type.end(&end_member.name()).is_none() {
            return Err(usage_error!(
                "association '{}' declares no end named '{}'",
                self.element_type.full_name(),
                end_member.name()
            ));
        }
        let participant = end_member.entity_type()?;
        let mut assignable = false;
        let mut current = Some(Arc::clone(entity_set.element_type()));
        while let Some(candidate) = current {
            if Arc::ptr_eq(&candidate, &participant) {
                assignable = true;
                break;
            }
            current = candidate.base_type();
        }
        if !assignable {
            return Err(usage_error!(
                "entity set '{}' of type '{}' cannot participate on end '{}' of type '{}'",
                entity_set.name(),
                entity_set.element_type().full_name(),
                end_member.name(),
                participant.full_name()
            ));
        }
        let end = Arc::new(AssociationSetEnd {
            base: ItemBase::new(),
            parent: BackRef::unset(),
            end_member: Arc::clone(end_member),
            entity_set: BackRef::unset(),
        });
        end.entity_set.set(entity_set);
        if let Some(parent) = self.weak_self.upgrade() {
            end.parent.set(&parent);
        }
        self.ends.add(end)
    }

    /// The container this set was added to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingReference`] when the set was never added or
    /// the container was dropped.
    pub fn entity_container(&self) -> Result<Arc<EntityContainer>> {
        self.container.upgrade().ok_or_else(|| {
            Error::DanglingReference(format!(
                "association set '{0}' has no container",
                self.name
            ))
        })
    }
}

impl MetadataItem for AssociationSet {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::AssociationSet
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.ends.set_readonly();
        for end in self.ends.to_vec() {
            end.as_ref().set_readonly();
        }
    }
}

/// A polymorphic reference to a set held by a container.
#[derive(Debug, Clone)]
pub enum EntitySetBaseRef {
    /// An entity set
    Entity(Arc<EntitySet>),
    /// An association set
    Association(Arc<AssociationSet>),
}

impl EntitySetBaseRef {
    /// The set name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            EntitySetBaseRef::Entity(set) => set.name().to_string(),
            EntitySetBaseRef::Association(set) => set.name().to_string(),
        }
    }

    /// The concrete set kind.
    #[must_use]
    pub fn item_kind(&self) -> BuiltInTypeKind {
        match self {
            EntitySetBaseRef::Entity(_) => BuiltInTypeKind::EntitySet,
            EntitySetBaseRef::Association(_) => BuiltInTypeKind::AssociationSet,
        }
    }

    /// Freeze the referenced set.
    pub fn set_readonly(&self) {
        match self {
            EntitySetBaseRef::Entity(set) => set.as_ref().set_readonly(),
            EntitySetBaseRef::Association(set) => set.as_ref().set_readonly(),
        }
    }
}

impl NamedItem for EntitySetBaseRef {
    fn identity(&self) -> String {
        self.name()
    }
}

/// The deployment scope of a model: entity sets, association sets, and
/// function imports, each name-unique within the container.
#[derive(Debug)]
pub struct EntityContainer {
    base: ItemBase,
    name: String,
    base_entity_sets: Arc<MetadataCollection<EntitySetBaseRef>>,
    function_imports: Arc<MetadataCollection<Arc<EdmFunction>>>,
    weak_self: Weak<EntityContainer>,
}

impl EntityContainer {
    /// Declare an empty container.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("entity container name must not be empty"));
        }
        Ok(Arc::new_cyclic(|weak| EntityContainer {
            base: ItemBase::new(),
            name: name.to_string(),
            base_entity_sets: Arc::new(MetadataCollection::new()),
            function_imports: Arc::new(MetadataCollection::new()),
            weak_self: weak.clone(),
        }))
    }

    /// The container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All sets held by the container, in addition order.
    #[must_use]
    pub fn base_entity_sets(&self) -> ReadOnlyMetadataCollection<EntitySetBaseRef> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.base_entity_sets))
    }

    /// The entity sets, in addition order.
    #[must_use]
    pub fn entity_sets(&self) -> Vec<Arc<EntitySet>> {
        self.base_entity_sets
            .to_vec()
            .into_iter()
            .filter_map(|set| match set {
                EntitySetBaseRef::Entity(set) => Some(set),
                EntitySetBaseRef::Association(_) => None,
            })
            .collect()
    }

    /// The association sets, in addition order.
    #[must_use]
    pub fn association_sets(&self) -> Vec<Arc<AssociationSet>> {
        self.base_entity_sets
            .to_vec()
            .into_iter()
            .filter_map(|set| match set {
                EntitySetBaseRef::Association(set) => Some(set),
                EntitySetBaseRef::Entity(_) => None,
            })
            .collect()
    }

    /// Look up the entity set named `name`.
    ///
    /// # Errors
    ///
    /// Same contract as [`MetadataCollection::get_value`], plus
    /// [`Error::ItemNotFound`] when the name resolves to an association set.
    pub fn entity_set(&self, name: &str, ignore_case: bool) -> Result<Arc<EntitySet>> {
        match self.base_entity_sets.get_value(name, ignore_case)? {
            EntitySetBaseRef::Entity(set) => Ok(set),
            EntitySetBaseRef::Association(_) => Err(Error::ItemNotFound {
                identity: name.to_string(),
            }),
        }
    }

    /// Add an entity set. The set's container back-link is wired here.
    ///
    /// # Errors
    ///
    /// Fails when frozen or on a duplicate set name.
    pub fn add_entity_set(&self, set: Arc<EntitySet>) -> Result<()> {
        self.base.state().assert_mutable(&self.name)?;
        self.base_entity_sets
            .add(EntitySetBaseRef::Entity(Arc::clone(&set)))?;
        if let Some(container) = self.weak_self.upgrade() {
            set.container.set(&container);
        }
        Ok(())
    }

    /// Add an association set. The set's container back-link is wired here.
    ///
    /// # Errors
    ///
    /// Fails when frozen or on a duplicate set name.
    pub fn add_association_set(&self, set: Arc<AssociationSet>) -> Result<()> {
        self.base.state().assert_mutable(&self.name)?;
        self.base_entity_sets
            .add(EntitySetBaseRef::Association(Arc::clone(&set)))?;
        if let Some(container) = self.weak_self.upgrade() {
            set.container.set(&container);
        }
        Ok(())
    }

    /// The function imports, in addition order.
    #[must_use]
    pub fn function_imports(&self) -> ReadOnlyMetadataCollection<Arc<EdmFunction>> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.function_imports))
    }

    /// Add a function import.
    ///
    /// # Errors
    ///
    /// Fails when frozen or on a duplicate function name.
    pub fn add_function_import(&self, function: Arc<EdmFunction>) -> Result<()> {
        self.base.state().assert_mutable(&self.name)?;
        self.function_imports.add(function)
    }
}

impl NamedItem for Arc<EntityContainer> {
    fn identity(&self) -> String {
        self.name.clone()
    }
}

impl MetadataItem for EntityContainer {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::EntityContainer
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.base_entity_sets.set_readonly();
        for set in self.base_entity_sets.to_vec() {
            set.set_readonly();
        }
        self.function_imports.set_readonly();
        for function in self.function_imports.to_vec() {
            function.as_ref().set_readonly();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::flags::DataSpace;
    use crate::metadata::types::{
        EdmMemberRef, EdmProperty, PrimitiveTypeKind, RelationshipMultiplicity,
    };

    fn entity(name: &str) -> Arc<EntityType> {
        let entity = EntityType::new(name, "Shop", DataSpace::CSpace).unwrap();
        let id = EdmMemberRef::Property(
            EdmProperty::primitive("Id", PrimitiveTypeKind::Int32, false).unwrap(),
        );
        entity.add_member(id.clone()).unwrap();
        entity.add_key_member(&id).unwrap();
        entity
    }

    fn wired_container() -> (Arc<EntityContainer>, Arc<EntitySet>, Arc<EntitySet>) {
        let customer = entity("Customer");
        let order = entity("Order");

        let association = AssociationType::new("CustomerOrder", "Shop", DataSpace::CSpace).unwrap();
        let principal =
            AssociationEndMember::new("Customer", &customer, RelationshipMultiplicity::One)
                .unwrap();
        let dependent =
            AssociationEndMember::new("Order", &order, RelationshipMultiplicity::Many).unwrap();
        association.add_end(Arc::clone(&principal)).unwrap();
        association.add_end(Arc::clone(&dependent)).unwrap();

        let key = match customer.key_members().first().unwrap() {
            EdmMemberRef::Property(property) => Arc::clone(property),
            _ => unreachable!(),
        };
        let foreign =
            EdmProperty::primitive("CustomerId", PrimitiveTypeKind::Int32, false).unwrap();
        order
            .add_member(EdmMemberRef::Property(Arc::clone(&foreign)))
            .unwrap();
        let constraint = ReferentialConstraint::new(
            Arc::clone(&principal),
            Arc::clone(&dependent),
            vec![key],
            vec![foreign],
        )
        .unwrap();
        association.set_referential_constraint(constraint).unwrap();

        let container = EntityContainer::new("ShopContainer").unwrap();
        let customers = EntitySet::new("Customers", &customer).unwrap();
        let orders = EntitySet::new("Orders", &order).unwrap();
        container.add_entity_set(Arc::clone(&customers)).unwrap();
        container.add_entity_set(Arc::clone(&orders)).unwrap();

        let links = AssociationSet::new("CustomerOrders", &association).unwrap();
        links.add_end(&principal, &customers).unwrap();
        links.add_end(&dependent, &orders).unwrap();
        container.add_association_set(links).unwrap();

        (container, customers, orders)
    }

    #[test]
    fn test_container_wires_back_links() {
        let (container, customers, _) = wired_container();
        assert!(Arc::ptr_eq(
            &customers.entity_container().unwrap(),
            &container
        ));
        assert_eq!(container.entity_sets().len(), 2);
        assert_eq!(container.association_sets().len(), 1);
    }

    #[test]
    fn test_set_names_unique_within_container() {
        let (container, _, _) = wired_container();
        let extra = EntitySet::new("Customers", &entity("Customer2")).unwrap();
        assert!(matches!(
            container.add_entity_set(extra),
            Err(Error::DuplicateIdentity { .. })
        ));
    }

    #[test]
    fn test_entity_set_lookup_is_kind_aware() {
        let (container, _, _) = wired_container();
        assert!(container.entity_set("Customers", false).is_ok());
        // The association set shares the namespace but not the kind.
        assert!(container.entity_set("CustomerOrders", false).is_err());
    }

    #[test]
    fn test_foreign_key_snapshot_after_freeze() {
        let (container, customers, orders) = wired_container();
        container.as_ref().set_readonly();

        let dependents = orders.foreign_key_dependents();
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].0.name(), "CustomerOrders");
        assert!(orders.foreign_key_principals().is_empty());

        let principals = customers.foreign_key_principals();
        assert_eq!(principals.len(), 1);
        assert!(customers.foreign_key_dependents().is_empty());
        assert!(customers.has_foreign_key_relationships());
        assert!(orders.has_foreign_key_relationships());
        assert!(!customers.has_independent_relationships());
    }

    #[test]
    fn test_constraint_free_association_is_independent() {
        let customer = entity("Customer");
        let order = entity("Order");
        let association = AssociationType::new("Touches", "Shop", DataSpace::CSpace).unwrap();
        let left =
            AssociationEndMember::new("Customer", &customer, RelationshipMultiplicity::One)
                .unwrap();
        let right =
            AssociationEndMember::new("Order", &order, RelationshipMultiplicity::Many).unwrap();
        association.add_end(Arc::clone(&left)).unwrap();
        association.add_end(Arc::clone(&right)).unwrap();

        let container = EntityContainer::new("C").unwrap();
        let customers = EntitySet::new("Customers", &customer).unwrap();
        let orders = EntitySet::new("Orders", &order).unwrap();
        container.add_entity_set(Arc::clone(&customers)).unwrap();
        container.add_entity_set(Arc::clone(&orders)).unwrap();
        let links = AssociationSet::new("Links", &association).unwrap();
        links.add_end(&left, &customers).unwrap();
        links.add_end(&right, &orders).unwrap();
        container.add_association_set(links).unwrap();
        container.as_ref().set_readonly();

        assert!(customers.has_independent_relationships());
        assert!(!customers.has_foreign_key_relationships());
        assert!(customers.foreign_key_dependents().is_empty());
    }

    #[test]
    fn test_association_set_rejects_foreign_roles_and_sets() {
        let customer = entity("Customer");
        let other = entity("Supplier");
        let association = AssociationType::new("Link", "Shop", DataSpace::CSpace).unwrap();
        let end = AssociationEndMember::new("Customer", &customer, RelationshipMultiplicity::One)
            .unwrap();
        association.add_end(Arc::clone(&end)).unwrap();

        let links = AssociationSet::new("Links", &association).unwrap();
        let suppliers = EntitySet::new("Suppliers", &other).unwrap();
        // Wrong participating type for the role.
        assert!(links.add_end(&end, &suppliers).is_err());

        let stray =
            AssociationEndMember::new("Stray", &customer, RelationshipMultiplicity::One).unwrap();
        let customers = EntitySet::new("Customers", &customer).unwrap();
        // Role not declared by the association.
        assert!(links.add_end(&stray, &customers).is_err());
    }

    #[test]
    fn test_container_freeze_cascades_to_sets() {
        let (container, customers, _) = wired_container();
        container.as_ref().set_readonly();
        assert!(customers.as_ref().is_readonly());
        assert!(customers.set_table(Some("dbo"), Some("Customers")).is_err());
    }
}

//! Entity types: named structural types with identity keys and single
//! inheritance.

use std::sync::{Arc, RwLock, Weak};

use crate::{
    metadata::{
        collection::{MetadataCollection, ReadOnlyMetadataCollection},
        digest,
        flags::DataSpace,
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        lazy::DerivedCell,
        types::{DeclaringTypeRef, EdmMemberRef, NavigationProperty},
    },
    Error, Result,
};

/// A named type whose instances have identity, carry properties and
/// navigations, and may derive from a single base entity type.
///
/// Key members may only be declared on a root type; derived types inherit
/// the root's key.
#[derive(Debug)]
pub struct EntityType {
    base: ItemBase,
    name: String,
    namespace: String,
    members: Arc<MetadataCollection<EdmMemberRef>>,
    keys: Arc<MetadataCollection<EdmMemberRef>>,
    base_type: RwLock<Option<Arc<EntityType>>>,
    structural_digest: DerivedCell<String>,
    weak_self: Weak<EntityType>,
}

impl EntityType {
    /// Declare an entity type in `namespace` tagged with `space`.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, namespace: &str, space: DataSpace) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("entity type name must not be empty"));
        }
        let entity = Arc::new_cyclic(|weak| EntityType {
            base: ItemBase::new(),
            name: name.to_string(),
            namespace: namespace.to_string(),
            members: Arc::new(MetadataCollection::new()),
            keys: Arc::new(MetadataCollection::new()),
            base_type: RwLock::new(None),
            structural_digest: DerivedCell::new(),
            weak_self: weak.clone(),
        });
        entity
            .base
            .state()
            .set_data_space(space, &entity.identity())?;
        Ok(entity)
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

    /// Whether this type cannot be instantiated directly.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.base.state().is_abstract()
    }

    /// Mark the type abstract (or concrete again) before freeze.
    ///
    /// # Errors
    ///
    /// Fails when frozen.
    pub fn set_abstract(&self, value: bool) -> Result<()> {
        self.base.state().set_abstract(value, &self.identity())
    }

    /// The base entity type, if this type derives from one.
    #[must_use]
    pub fn base_type(&self) -> Option<Arc<EntityType>> {
        read_lock!(self.base_type).clone()
    }

    /// Derive this type from `base_type`.
    ///
    /// # Errors
    ///
    /// Fails when frozen, when the assignment would create an inheritance
    /// cycle, or when this type already declares its own key members
    /// ([`Error::KeyOnDerivedType`]).
    pub fn set_base_type(&self, base_type: &Arc<EntityType>) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        if !self.keys.is_empty() {
            return Err(Error::KeyOnDerivedType {
                type_name: self.full_name(),
            });
        }
        let mut current = Some(Arc::clone(base_type));
        while let Some(ancestor) = current {
            if std::ptr::eq(Arc::as_ptr(&ancestor), self) {
                return Err(usage_error!(
                    "setting base type of '{}' to '{}' creates an inheritance cycle",
                    self.full_name(),
                    base_type.full_name()
                ));
            }
            current = ancestor.base_type();
        }
        *write_lock!(self.base_type) = Some(Arc::clone(base_type));
        Ok(())
    }

    /// The members declared directly on this type, in declaration order.
    #[must_use]
    pub fn members(&self) -> ReadOnlyMetadataCollection<EdmMemberRef> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.members))
    }

    /// All members visible on this type: base-chain members first, then the
    /// ones declared here.
    #[must_use]
    pub fn all_members(&self) -> Vec<EdmMemberRef> {
        let mut members = match self.base_type() {
            Some(base_type) => base_type.all_members(),
            None => Vec::new(),
        };
        members.extend(self.members.to_vec());
        members
    }

    /// Declare a member on this type.
    ///
    /// Association ends cannot be declared by entity types.
    ///
    /// # Errors
    ///
    /// Fails when frozen, on a duplicate member name, or for an
    /// [`EdmMemberRef::End`] ([`Error::InvalidMemberKind`]).
    pub fn add_member(&self, member: EdmMemberRef) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        if matches!(member, EdmMemberRef::End(_)) {
            return Err(Error::InvalidMemberKind {
                member: member.name(),
                kind: member.item_kind().to_string(),
                type_name: self.full_name(),
            });
        }
        self.members.add(member.clone())?;
        member.set_declaring(DeclaringTypeRef::Entity(self.weak_self.clone()));
        Ok(())
    }

    /// Remove a declared member. Key members must be removed from the key
    /// first.
    ///
    /// # Errors
    ///
    /// Fails when frozen, when the member is absent, or when it is part of
    /// the key.
    pub fn remove_member(&self, member: &EdmMemberRef) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        if self.keys.contains_identity(&member.name()) {
            return Err(usage_error!(
                "member '{}' is part of the key of '{}'",
                member.name(),
                self.full_name()
            ));
        }
        self.members.remove(member)?;
        member.set_declaring(DeclaringTypeRef::None);
        Ok(())
    }

    /// Promote a declared scalar property to the identity key.
    ///
    /// # Errors
    ///
    /// Fails when frozen, when this is a derived type
    /// ([`Error::KeyOnDerivedType`]), when the member is not declared here,
    /// or when it is not a scalar property ([`Error::InvalidMemberKind`]).
    pub fn add_key_member(&self, member: &EdmMemberRef) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        if self.base_type().is_some() {
            return Err(Error::KeyOnDerivedType {
                type_name: self.full_name(),
            });
        }
        if !matches!(member, EdmMemberRef::Property(_)) {
            return Err(Error::InvalidMemberKind {
                member: member.name(),
                kind: member.item_kind().to_string(),
                type_name: self.full_name(),
            });
        }
        if !self.members.contains_identity(&member.name()) {
            return Err(Error::ItemNotFound {
                identity: member.name(),
            });
        }
        self.keys.add(member.clone())
    }

    /// The key members, resolved through the base chain to the root type.
    #[must_use]
    pub fn key_members(&self) -> Vec<EdmMemberRef> {
        match self.base_type() {
            Some(base_type) => base_type.key_members(),
            None => self.keys.to_vec(),
        }
    }

    /// The navigation properties declared directly on this type.
    #[must_use]
    pub fn navigation_properties(&self) -> Vec<Arc<NavigationProperty>> {
        self.members
            .to_vec()
            .into_iter()
            .filter_map(|member| match member {
                EdmMemberRef::Navigation(navigation) => Some(navigation),
                _ => None,
            })
            .collect()
    }

    /// Canonical SHA-1 digest of this type's visible structure, computed
    /// once after freeze.
    ///
    /// Sorted member sections make the digest independent of declaration
    /// order: two structurally identical types share one digest.
    #[must_use]
    pub fn structural_digest(&self) -> &str {
        self.structural_digest
            .get_or_init(self.base.state(), || digest::compute_entity_digest(self))
    }

    pub(crate) fn members_collection(&self) -> &MetadataCollection<EdmMemberRef> {
        &self.members
    }
}

impl MetadataItem for EntityType {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::EntityType
    }

    fn identity(&self) -> String {
        self.full_name()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    // The base type is referenced, not owned; the declaring model freezes it.
    fn freeze_children(&self) {
        self.members.set_readonly();
        self.keys.set_readonly();
        for member in self.members.to_vec() {
            member.set_readonly();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::{EdmProperty, PrimitiveTypeKind};

    fn entity(name: &str) -> Arc<EntityType> {
        EntityType::new(name, "Shop", DataSpace::CSpace).unwrap()
    }

    fn property(name: &str) -> EdmMemberRef {
        EdmMemberRef::Property(
            EdmProperty::primitive(name, PrimitiveTypeKind::Int32, false).unwrap(),
        )
    }

    #[test]
    fn test_members_and_key() {
        let customer = entity("Customer");
        let id = property("Id");
        customer.add_member(id.clone()).unwrap();
        customer.add_member(property("Age")).unwrap();
        customer.add_key_member(&id).unwrap();

        assert_eq!(customer.members().len(), 2);
        let keys: Vec<String> = customer.key_members().iter().map(EdmMemberRef::name).collect();
        assert_eq!(keys, vec!["Id"]);
        assert!(Arc::ptr_eq(
            &customer,
            &match id.declaring_type().unwrap() {
                crate::metadata::types::EdmTypeRef::Entity(declared) => declared,
                _ => panic!("expected entity declarer"),
            }
        ));
    }

    #[test]
    fn test_key_requires_declared_scalar() {
        let customer = entity("Customer");
        let stray = property("Id");
        assert!(matches!(
            customer.add_key_member(&stray),
            Err(Error::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_key_members_resolve_through_base_chain() {
        let root = entity("Party");
        let id = property("Id");
        root.add_member(id.clone()).unwrap();
        root.add_key_member(&id).unwrap();

        let derived = entity("Customer");
        derived.set_base_type(&root).unwrap();
        let keys: Vec<String> = derived.key_members().iter().map(EdmMemberRef::name).collect();
        assert_eq!(keys, vec!["Id"]);

        // A derived type cannot declare its own key.
        let extra = property("AltId");
        derived.add_member(extra.clone()).unwrap();
        assert!(matches!(
            derived.add_key_member(&extra),
            Err(Error::KeyOnDerivedType { .. })
        ));
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let first = entity("A");
        let second = entity("B");
        second.set_base_type(&first).unwrap();
        assert!(first.set_base_type(&second).is_err());
        assert!(first.set_base_type(&first).is_err());
    }

    #[test]
    fn test_key_member_cannot_be_removed() {
        let customer = entity("Customer");
        let id = property("Id");
        customer.add_member(id.clone()).unwrap();
        customer.add_key_member(&id).unwrap();
        assert!(customer.remove_member(&id).is_err());
    }

    #[test]
    fn test_freeze_cascades_to_members() {
        let customer = entity("Customer");
        let id = property("Id");
        customer.add_member(id.clone()).unwrap();
        customer.as_ref().set_readonly();
        assert!(id.is_readonly());
        assert!(customer.add_member(property("Late")).is_err());
        assert!(customer.set_abstract(true).is_err());
    }

    #[test]
    fn test_all_members_order_base_first() {
        let root = entity("Party");
        root.add_member(property("Id")).unwrap();
        let derived = entity("Customer");
        derived.set_base_type(&root).unwrap();
        derived.add_member(property("Segment")).unwrap();
        let names: Vec<String> = derived.all_members().iter().map(EdmMemberRef::name).collect();
        assert_eq!(names, vec!["Id", "Segment"]);
    }
}

//! Complex types: named structural types without identity.

use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        collection::{MetadataCollection, ReadOnlyMetadataCollection},
        flags::DataSpace,
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        types::{DeclaringTypeRef, EdmMemberRef},
    },
    Error, Result,
};

/// A named bag of scalar/enum/complex properties, embedded by value inside
/// entities or other complex types; no keys, no navigations.
#[derive(Debug)]
pub struct ComplexType {
    base: ItemBase,
    name: String,
    namespace: String,
    members: Arc<MetadataCollection<EdmMemberRef>>,
    weak_self: Weak<ComplexType>,
}

impl ComplexType {
    /// Declare a complex type in `namespace` tagged with `space`.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, namespace: &str, space: DataSpace) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("complex type name must not be empty"));
        }
        let complex = Arc::new_cyclic(|weak| ComplexType {
            base: ItemBase::new(),
            name: name.to_string(),
            namespace: namespace.to_string(),
            members: Arc::new(MetadataCollection::new()),
            weak_self: weak.clone(),
        });
        complex
            .base
            .state()
            .set_data_space(space, &complex.identity())?;
        Ok(complex)
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

    /// The declared properties, in declaration order.
    #[must_use]
    pub fn members(&self) -> ReadOnlyMetadataCollection<EdmMemberRef> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.members))
    }

    /// Declare a property. Only scalar/enum/complex properties are legal.
    ///
    /// # Errors
    ///
    /// Fails when frozen, on a duplicate name, or for a navigation property
    /// or association end ([`Error::InvalidMemberKind`]).
    pub fn add_member(&self, member: EdmMemberRef) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        if !matches!(member, EdmMemberRef::Property(_)) {
            return Err(Error::InvalidMemberKind {
                member: member.name(),
                kind: member.item_kind().to_string(),
                type_name: self.full_name(),
            });
        }
        self.members.add(member.clone())?;
        member.set_declaring(DeclaringTypeRef::Complex(self.weak_self.clone()));
        Ok(())
    }

    /// Remove a declared property.
    ///
    /// # Errors
    ///
    /// Fails when frozen or when the member is absent.
    pub fn remove_member(&self, member: &EdmMemberRef) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        self.members.remove(member)?;
        member.set_declaring(DeclaringTypeRef::None);
        Ok(())
    }

    pub(crate) fn members_collection(&self) -> &MetadataCollection<EdmMemberRef> {
        &self.members
    }
}

impl MetadataItem for ComplexType {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::ComplexType
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::{EdmProperty, NavigationProperty, PrimitiveTypeKind};
    use crate::metadata::typeusage::TypeUsage;
    use crate::metadata::types::{EdmTypeRef, EntityType};

    #[test]
    fn test_complex_type_holds_scalar_properties() {
        let address = ComplexType::new("Address", "Shop", DataSpace::CSpace).unwrap();
        let street = EdmMemberRef::Property(
            EdmProperty::primitive("Street", PrimitiveTypeKind::String, true).unwrap(),
        );
        address.add_member(street.clone()).unwrap();
        assert_eq!(address.members().len(), 1);
        assert!(street.declaring_type().is_some());

        address.remove_member(&street).unwrap();
        assert!(street.declaring_type().is_none());
    }

    #[test]
    fn test_complex_type_rejects_navigation() {
        let address = ComplexType::new("Address", "Shop", DataSpace::CSpace).unwrap();
        let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace).unwrap();
        let usage = TypeUsage::create(EdmTypeRef::Entity(customer), Vec::new()).unwrap();
        let navigation =
            EdmMemberRef::Navigation(NavigationProperty::new("Owner", usage).unwrap());
        assert!(matches!(
            address.add_member(navigation),
            Err(Error::InvalidMemberKind { .. })
        ));
    }
}

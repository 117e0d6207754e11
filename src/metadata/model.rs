//! The model root.
//!
//! An [`EdmModel`] owns the declared namespace items (entity, complex, enum,
//! and association types), the functions, and the containers. Freezing the
//! model freezes everything reachable through ownership edges, after which
//! the whole graph is safe for unsynchronized concurrent readers.

use std::sync::Arc;

use crate::{
    metadata::{
        collection::{MetadataCollection, ReadOnlyMetadataCollection},
        container::EntityContainer,
        function::EdmFunction,
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        types::EdmTypeRef,
    },
    Result,
};

/// The schema version a model targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmVersion {
    /// Version 1.0
    V1,
    /// Version 2.0
    V2,
    /// Version 3.0
    V3,
}

impl EdmVersion {
    /// The numeric schema version.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            EdmVersion::V1 => 1.0,
            EdmVersion::V2 => 2.0,
            EdmVersion::V3 => 3.0,
        }
    }
}

impl std::fmt::Display for EdmVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.as_f64())
    }
}

/// The root of a metadata graph.
#[derive(Debug)]
pub struct EdmModel {
    base: ItemBase,
    version: EdmVersion,
    items: Arc<MetadataCollection<EdmTypeRef>>,
    functions: Arc<MetadataCollection<Arc<EdmFunction>>>,
    containers: Arc<MetadataCollection<Arc<EntityContainer>>>,
}

impl EdmModel {
    /// Create an empty model targeting `version`.
    #[must_use]
    pub fn new(version: EdmVersion) -> Arc<Self> {
        Arc::new(EdmModel {
            base: ItemBase::new(),
            version,
            items: Arc::new(MetadataCollection::new()),
            functions: Arc::new(MetadataCollection::new()),
            containers: Arc::new(MetadataCollection::new()),
        })
    }

    /// The targeted schema version.
    #[must_use]
    pub fn version(&self) -> EdmVersion {
        self.version
    }

    /// The declared namespace items, in declaration order.
    #[must_use]
    pub fn items(&self) -> ReadOnlyMetadataCollection<EdmTypeRef> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.items))
    }

    /// Declare a named type in this model.
    ///
    /// Only entity, complex, enum, and association types may be declared;
    /// primitives are canonical and transient types are composed, never
    /// declared.
    ///
    /// # Errors
    ///
    /// Fails when frozen, on a duplicate full name, or for a non-declarable
    /// kind.
    pub fn add_item(&self, item: EdmTypeRef) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        match &item {
            EdmTypeRef::Entity(_)
            | EdmTypeRef::Complex(_)
            | EdmTypeRef::Enum(_)
            | EdmTypeRef::Association(_) => {}
            other => {
                return Err(usage_error!(
                    "a {} cannot be declared in a model",
                    other.item_kind()
                ))
            }
        }
        self.items.add(item)
    }

    /// Look up a declared type by full name.
    ///
    /// # Errors
    ///
    /// Same contract as the underlying collection lookup.
    pub fn find_type(&self, full_name: &str, ignore_case: bool) -> Result<EdmTypeRef> {
        self.items.get_value(full_name, ignore_case)
    }

    /// The declared functions, overload-unique by signature.
    #[must_use]
    pub fn functions(&self) -> ReadOnlyMetadataCollection<Arc<EdmFunction>> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.functions))
    }

    /// Declare a function.
    ///
    /// # Errors
    ///
    /// Fails when frozen or when an overload with the same signature exists.
    pub fn add_function(&self, function: Arc<EdmFunction>) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        self.functions.add(function)
    }

    /// The containers, in addition order.
    #[must_use]
    pub fn containers(&self) -> ReadOnlyMetadataCollection<Arc<EntityContainer>> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.containers))
    }

    /// Add a container.
    ///
    /// # Errors
    ///
    /// Fails when frozen or on a duplicate container name.
    pub fn add_container(&self, container: Arc<EntityContainer>) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        self.containers.add(container)
    }

    /// Look up a container by name.
    ///
    /// # Errors
    ///
    /// Same contract as the underlying collection lookup.
    pub fn find_container(&self, name: &str, ignore_case: bool) -> Result<Arc<EntityContainer>> {
        self.containers.get_value(name, ignore_case)
    }
}

impl MetadataItem for EdmModel {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::EdmModel
    }

    fn identity(&self) -> String {
        format!("EdmModel[{0}]", self.version)
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.items.set_readonly();
        for item in self.items.to_vec() {
            item.set_readonly();
        }
        self.functions.set_readonly();
        for function in self.functions.to_vec() {
            function.as_ref().set_readonly();
        }
        self.containers.set_readonly();
        for container in self.containers.to_vec() {
            container.as_ref().set_readonly();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::flags::DataSpace;
    use crate::metadata::types::{EntityType, PrimitiveType, PrimitiveTypeKind};
    use crate::Error;

    #[test]
    fn test_declared_types_are_name_unique() {
        let model = EdmModel::new(EdmVersion::V3);
        let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace).unwrap();
        model.add_item(EdmTypeRef::Entity(customer)).unwrap();

        let twin = EntityType::new("Customer", "Shop", DataSpace::CSpace).unwrap();
        assert!(matches!(
            model.add_item(EdmTypeRef::Entity(twin)),
            Err(Error::DuplicateIdentity { .. })
        ));
        assert!(model.find_type("Shop.Customer", false).is_ok());
    }

    #[test]
    fn test_primitives_cannot_be_declared() {
        let model = EdmModel::new(EdmVersion::V3);
        let int32 = EdmTypeRef::Primitive(PrimitiveType::canonical(PrimitiveTypeKind::Int32));
        assert!(model.add_item(int32).is_err());
    }

    #[test]
    fn test_model_freeze_reaches_declared_types() {
        let model = EdmModel::new(EdmVersion::V3);
        let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace).unwrap();
        model
            .add_item(EdmTypeRef::Entity(Arc::clone(&customer)))
            .unwrap();
        let container = EntityContainer::new("ShopContainer").unwrap();
        model.add_container(Arc::clone(&container)).unwrap();

        model.set_readonly();
        assert!(customer.as_ref().is_readonly());
        assert!(container.as_ref().is_readonly());
        assert!(model
            .add_container(EntityContainer::new("Late").unwrap())
            .is_err());
    }

    #[test]
    fn test_version_rendering() {
        assert_eq!(EdmVersion::V3.to_string(), "3.0");
        assert_eq!(EdmVersion::V1.as_f64(), 1.0);
    }
}

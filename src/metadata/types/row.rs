//! Anonymous row types.

use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        collection::{MetadataCollection, ReadOnlyMetadataCollection},
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
        types::{DeclaringTypeRef, EdmMemberRef, EdmProperty},
    },
    Result,
};

/// A transient, unnamed record type: an ordered list of properties fixed at
/// construction.
///
/// Two row types with the same ordered property names and usages share one
/// identity and compare `edm_equals`. Rows carry no data space tag by
/// default; projections may legitimately span spaces.
#[derive(Debug)]
pub struct RowType {
    base: ItemBase,
    members: Arc<MetadataCollection<EdmMemberRef>>,
    identity: String,
}

impl RowType {
    /// Build a row type over `properties`, in the given order.
    ///
    /// # Errors
    ///
    /// Fails on duplicate property names.
    pub fn new(properties: Vec<Arc<EdmProperty>>) -> Result<Arc<Self>> {
        let identity = RowType::compose_identity(&properties);
        let members: Vec<EdmMemberRef> = properties
            .into_iter()
            .map(EdmMemberRef::Property)
            .collect();
        let collection = MetadataCollection::from_items(members)?;
        let row = Arc::new_cyclic(|weak: &Weak<RowType>| {
            for member in collection.to_vec() {
                member.set_declaring(DeclaringTypeRef::Row(weak.clone()));
            }
            RowType {
                base: ItemBase::new(),
                members: Arc::new(collection),
                identity,
            }
        });
        Ok(row)
    }

    fn compose_identity(properties: &[Arc<EdmProperty>]) -> String {
        let parts: Vec<String> = properties
            .iter()
            .map(|property| {
                format!(
                    "{0}:{1}",
                    property.name(),
                    MetadataItem::identity(property.type_usage().as_ref())
                )
            })
            .collect();
        format!("rowtype[{0}]", parts.join(","))
    }

    /// Row types have no declared name; the structural identity stands in.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity
    }

    /// The row's properties, in construction order.
    #[must_use]
    pub fn members(&self) -> ReadOnlyMetadataCollection<EdmMemberRef> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.members))
    }

    pub(crate) fn members_collection(&self) -> &MetadataCollection<EdmMemberRef> {
        &self.members
    }
}

impl MetadataItem for RowType {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::RowType
    }

    fn identity(&self) -> String {
        self.identity.clone()
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

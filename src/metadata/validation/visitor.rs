//! The model traversal: every reachable item, visited exactly once.
//!
//! The graph is cyclic (entities reach associations which reach back), so
//! the walk deduplicates by node address, not by identity - two anonymous
//! row types may share an identity yet both deserve a visit.

use std::collections::HashSet;
use std::sync::Arc;

use crate::metadata::{
    container::{AssociationSet, AssociationSetEnd, EntityContainer, EntitySet},
    function::{EdmFunction, FunctionParameter},
    item::MetadataItem,
    kind::BuiltInTypeKind,
    model::EdmModel,
    typeusage::TypeUsage,
    types::{EdmMemberRef, EdmTypeRef, ReferentialConstraint},
};

/// A polymorphic handle over every node kind the validator visits.
#[derive(Debug, Clone)]
pub enum ModelItem {
    /// The model root
    Model(Arc<EdmModel>),
    /// Any type node
    Type(EdmTypeRef),
    /// Any member node
    Member(EdmMemberRef),
    /// A referential constraint
    Constraint(Arc<ReferentialConstraint>),
    /// An entity container
    Container(Arc<EntityContainer>),
    /// An entity set
    EntitySet(Arc<EntitySet>),
    /// An association set
    AssociationSet(Arc<AssociationSet>),
    /// An association set end
    AssociationSetEnd(Arc<AssociationSetEnd>),
    /// A function
    Function(Arc<EdmFunction>),
    /// A function parameter
    Parameter(Arc<FunctionParameter>),
}

impl ModelItem {
    /// The concrete kind of the referenced node.
    #[must_use]
    pub fn item_kind(&self) -> BuiltInTypeKind {
        match self {
            ModelItem::Model(_) => BuiltInTypeKind::EdmModel,
            ModelItem::Type(item) => item.item_kind(),
            ModelItem::Member(item) => item.item_kind(),
            ModelItem::Constraint(_) => BuiltInTypeKind::ReferentialConstraint,
            ModelItem::Container(_) => BuiltInTypeKind::EntityContainer,
            ModelItem::EntitySet(_) => BuiltInTypeKind::EntitySet,
            ModelItem::AssociationSet(_) => BuiltInTypeKind::AssociationSet,
            ModelItem::AssociationSetEnd(_) => BuiltInTypeKind::AssociationSetEnd,
            ModelItem::Function(_) => BuiltInTypeKind::EdmFunction,
            ModelItem::Parameter(_) => BuiltInTypeKind::FunctionParameter,
        }
    }

    /// The identity of the referenced node.
    #[must_use]
    pub fn identity(&self) -> String {
        match self {
            ModelItem::Model(item) => MetadataItem::identity(item.as_ref()),
            ModelItem::Type(item) => item.identity(),
            ModelItem::Member(item) => item.identity_string(),
            ModelItem::Constraint(item) => MetadataItem::identity(item.as_ref()),
            ModelItem::Container(item) => MetadataItem::identity(item.as_ref()),
            ModelItem::EntitySet(item) => MetadataItem::identity(item.as_ref()),
            ModelItem::AssociationSet(item) => MetadataItem::identity(item.as_ref()),
            ModelItem::AssociationSetEnd(item) => MetadataItem::identity(item.as_ref()),
            ModelItem::Function(item) => MetadataItem::identity(item.as_ref()),
            ModelItem::Parameter(item) => MetadataItem::identity(item.as_ref()),
        }
    }

    /// Node address, the visited-set key.
    #[must_use]
    pub fn ptr_key(&self) -> usize {
        match self {
            ModelItem::Model(item) => Arc::as_ptr(item) as usize,
            ModelItem::Type(item) => item.ptr_key(),
            ModelItem::Member(item) => item.ptr_key(),
            ModelItem::Constraint(item) => Arc::as_ptr(item) as usize,
            ModelItem::Container(item) => Arc::as_ptr(item) as usize,
            ModelItem::EntitySet(item) => Arc::as_ptr(item) as usize,
            ModelItem::AssociationSet(item) => Arc::as_ptr(item) as usize,
            ModelItem::AssociationSetEnd(item) => Arc::as_ptr(item) as usize,
            ModelItem::Function(item) => Arc::as_ptr(item) as usize,
            ModelItem::Parameter(item) => Arc::as_ptr(item) as usize,
        }
    }
}

trait MemberIdentity {
    fn identity_string(&self) -> String;
}

impl MemberIdentity for EdmMemberRef {
    fn identity_string(&self) -> String {
        match self.declaring_type() {
            Some(declaring) => format!("{0}.{1}", declaring.identity(), self.name()),
            None => self.name(),
        }
    }
}

struct Walk {
    visited: HashSet<usize>,
    pending: Vec<ModelItem>,
    collected: Vec<ModelItem>,
}

impl Walk {
    fn push(&mut self, item: ModelItem) {
        if self.visited.insert(item.ptr_key()) {
            self.pending.push(item);
        }
    }

    fn push_usage_type(&mut self, usage: &Arc<TypeUsage>) {
        self.push(ModelItem::Type(usage.edm_type().clone()));
    }

    fn expand(&mut self, item: &ModelItem) {
        match item {
            ModelItem::Model(model) => {
                for declared in model.items().to_vec() {
                    self.push(ModelItem::Type(declared));
                }
                for function in model.functions().to_vec() {
                    self.push(ModelItem::Function(function));
                }
                for container in model.containers().to_vec() {
                    self.push(ModelItem::Container(container));
                }
            }
            ModelItem::Type(type_ref) => self.expand_type(type_ref),
            ModelItem::Member(member) => {
                self.push_usage_type(member.type_usage());
                if let EdmMemberRef::Navigation(navigation) = member {
                    if let Ok(relationship) = navigation.relationship() {
                        self.push(ModelItem::Type(EdmTypeRef::Association(relationship)));
                    }
                }
            }
            ModelItem::Constraint(constraint) => {
                for property in constraint.from_properties() {
                    self.push(ModelItem::Member(EdmMemberRef::Property(Arc::clone(
                        property,
                    ))));
                }
                for property in constraint.to_properties() {
                    self.push(ModelItem::Member(EdmMemberRef::Property(Arc::clone(
                        property,
                    ))));
                }
            }
            ModelItem::Container(container) => {
                for set in container.entity_sets() {
                    self.push(ModelItem::EntitySet(set));
                }
                for set in container.association_sets() {
                    self.push(ModelItem::AssociationSet(set));
                }
                for function in container.function_imports().to_vec() {
                    self.push(ModelItem::Function(function));
                }
            }
            ModelItem::EntitySet(set) => {
                self.push(ModelItem::Type(EdmTypeRef::Entity(Arc::clone(
                    set.element_type(),
                ))));
            }
            ModelItem::AssociationSet(set) => {
                self.push(ModelItem::Type(EdmTypeRef::Association(Arc::clone(
                    set.element_type(),
                ))));
                for end in set.ends().to_vec() {
                    self.push(ModelItem::AssociationSetEnd(end));
                }
            }
            ModelItem::AssociationSetEnd(end) => {
                self.push(ModelItem::Member(EdmMemberRef::End(Arc::clone(
                    end.end_member(),
                ))));
                if let Ok(set) = end.entity_set() {
                    self.push(ModelItem::EntitySet(set));
                }
            }
            ModelItem::Function(function) => {
                for parameter in function.parameters().to_vec() {
                    self.push(ModelItem::Parameter(parameter));
                }
                if let Some(usage) = function.return_usage() {
                    self.push_usage_type(&usage);
                }
            }
            ModelItem::Parameter(parameter) => {
                self.push_usage_type(parameter.type_usage());
            }
        }
    }

    fn expand_type(&mut self, type_ref: &EdmTypeRef) {
        match type_ref {
            EdmTypeRef::Entity(entity) => {
                if let Some(base_type) = entity.base_type() {
                    self.push(ModelItem::Type(EdmTypeRef::Entity(base_type)));
                }
                for member in entity.members().to_vec() {
                    self.push(ModelItem::Member(member));
                }
            }
            EdmTypeRef::Complex(complex) => {
                for member in complex.members().to_vec() {
                    self.push(ModelItem::Member(member));
                }
            }
            EdmTypeRef::Row(row) => {
                for member in row.members().to_vec() {
                    self.push(ModelItem::Member(member));
                }
            }
            EdmTypeRef::Association(association) => {
                for member in association.members().to_vec() {
                    self.push(ModelItem::Member(member));
                }
                if let Some(constraint) = association.referential_constraint() {
                    self.push(ModelItem::Constraint(constraint));
                }
            }
            EdmTypeRef::Collection(collection) => {
                self.push(ModelItem::Type(collection.element_usage().edm_type().clone()));
            }
            EdmTypeRef::Ref(reference) => {
                self.push(ModelItem::Type(EdmTypeRef::Entity(Arc::clone(
                    reference.element_type(),
                ))));
            }
            EdmTypeRef::Primitive(_) | EdmTypeRef::Enum(_) => {}
        }
    }
}

/// Collect every item reachable from `model`, each exactly once, in a
/// deterministic breadth-like order.
#[must_use]
pub fn collect_model_items(model: &Arc<EdmModel>) -> Vec<ModelItem> {
    let mut walk = Walk {
        visited: HashSet::new(),
        pending: Vec::new(),
        collected: Vec::new(),
    };
    walk.push(ModelItem::Model(Arc::clone(model)));
    while let Some(item) = walk.pending.pop() {
        walk.expand(&item);
        walk.collected.push(item);
    }
    walk.collected
}

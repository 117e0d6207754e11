//! The built-in rule sets.
//!
//! Each rule is a named function bound to the item kind it applies to.
//! Rules must be pure over the graph and report only through the context;
//! they run concurrently over distinct items.

use std::collections::HashSet;

use std::sync::Arc;

use crate::metadata::{
    kind::BuiltInTypeKind,
    typeusage::TypeUsage,
    validation::{context::ValidationContext, visitor::ModelItem},
    types::{EdmMemberRef, EdmTypeRef, EntityType, RelationshipMultiplicity},
};

/// Which items a rule is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget {
    /// Every visited item
    Any,
    /// Items of one concrete kind
    Kind(BuiltInTypeKind),
}

impl RuleTarget {
    /// Whether `item` is in this target.
    #[must_use]
    pub fn matches(&self, item: &ModelItem) -> bool {
        match self {
            RuleTarget::Any => true,
            RuleTarget::Kind(kind) => item.item_kind() == *kind,
        }
    }
}

/// One named validation check.
#[derive(Debug, Clone)]
pub struct ValidationRule {
    /// Stable rule name, part of every finding it reports
    pub name: &'static str,
    /// The items the rule applies to
    pub target: RuleTarget,
    /// The check itself
    pub check: fn(&ValidationContext, &ModelItem),
}

impl ValidationRule {
    /// Define a rule.
    #[must_use]
    pub fn new(
        name: &'static str,
        target: RuleTarget,
        check: fn(&ValidationContext, &ModelItem),
    ) -> Self {
        ValidationRule {
            name,
            target,
            check,
        }
    }
}

pub(crate) fn semantic_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule::new(
            "EntityTypeMustHaveKey",
            RuleTarget::Kind(BuiltInTypeKind::EntityType),
            check_entity_has_key,
        ),
        ValidationRule::new(
            "KeyMembersMustNotBeNullable",
            RuleTarget::Kind(BuiltInTypeKind::EntityType),
            check_key_members_not_nullable,
        ),
        ValidationRule::new(
            "MemberNameMustDifferFromDeclaringType",
            RuleTarget::Kind(BuiltInTypeKind::EntityType),
            check_member_shadowing,
        ),
        ValidationRule::new(
            "MemberNameMustDifferFromDeclaringType",
            RuleTarget::Kind(BuiltInTypeKind::ComplexType),
            check_member_shadowing,
        ),
        ValidationRule::new(
            "ComplexTypeMustHaveMembers",
            RuleTarget::Kind(BuiltInTypeKind::ComplexType),
            check_complex_has_members,
        ),
        ValidationRule::new(
            "AssociationMustHaveTwoEnds",
            RuleTarget::Kind(BuiltInTypeKind::AssociationType),
            check_association_two_ends,
        ),
        ValidationRule::new(
            "ConstraintRolesMustBeDeclaredEnds",
            RuleTarget::Kind(BuiltInTypeKind::AssociationType),
            check_constraint_roles,
        ),
        ValidationRule::new(
            "ConstraintPrincipalPropertiesMustBeKey",
            RuleTarget::Kind(BuiltInTypeKind::AssociationType),
            check_constraint_principal_keys,
        ),
        ValidationRule::new(
            "ConstraintPrincipalEndMustNotBeMany",
            RuleTarget::Kind(BuiltInTypeKind::AssociationType),
            check_constraint_principal_multiplicity,
        ),
        ValidationRule::new(
            "ConstraintDependentPropertiesMustBeDeclared",
            RuleTarget::Kind(BuiltInTypeKind::AssociationType),
            check_constraint_dependent_declared,
        ),
        ValidationRule::new(
            "NavigationPropertyMustBeWired",
            RuleTarget::Kind(BuiltInTypeKind::NavigationProperty),
            check_navigation_wired,
        ),
        ValidationRule::new(
            "NavigationValueMustBeEntityShaped",
            RuleTarget::Kind(BuiltInTypeKind::NavigationProperty),
            check_navigation_value_shape,
        ),
        ValidationRule::new(
            "EnumMemberValuesMustBeUnique",
            RuleTarget::Kind(BuiltInTypeKind::EnumType),
            check_enum_member_values,
        ),
        ValidationRule::new(
            "EntitySetTypeMustBeDeclared",
            RuleTarget::Kind(BuiltInTypeKind::EntitySet),
            check_entity_set_type_declared,
        ),
        ValidationRule::new(
            "AssociationSetMustBindAllEnds",
            RuleTarget::Kind(BuiltInTypeKind::AssociationSet),
            check_association_set_bound,
        ),
        ValidationRule::new(
            "ModelShouldDeclareContainer",
            RuleTarget::Kind(BuiltInTypeKind::EdmModel),
            check_model_has_container,
        ),
        ValidationRule::new(
            "EntityTypeShouldHaveEntitySet",
            RuleTarget::Kind(BuiltInTypeKind::EntityType),
            check_entity_has_set,
        ),
    ]
}

pub(crate) fn syntactic_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule::new("NamesMustBeValidIdentifiers", RuleTarget::Any, check_names),
        ValidationRule::new(
            "NamespaceMustBeWellFormed",
            RuleTarget::Any,
            check_namespaces,
        ),
        ValidationRule::new(
            "ParameterModeMustBeAssigned",
            RuleTarget::Kind(BuiltInTypeKind::FunctionParameter),
            check_parameter_mode,
        ),
        ValidationRule::new(
            "FacetValuesMustRespectBounds",
            RuleTarget::Any,
            check_facet_bounds,
        ),
    ]
}

fn check_entity_has_key(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Entity(entity)) = item else {
        return;
    };
    // Derived types inherit the root key; abstract roots may leave the key
    // to their concrete descendants. Flag only a concrete root without one.
    if entity.base_type().is_none() && !entity.is_abstract() && entity.key_members().is_empty() {
        context.error(
            "EntityTypeMustHaveKey",
            item,
            format!("entity type '{0}' declares no key members", entity.full_name()),
        );
    }
}

fn check_key_members_not_nullable(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Entity(entity)) = item else {
        return;
    };
    for key in entity.key_members() {
        if let EdmMemberRef::Property(property) = &key {
            if property.nullable() {
                context.error_on(
                    "KeyMembersMustNotBeNullable",
                    item,
                    &property.name(),
                    format!("key member '{0}' is nullable", property.name()),
                );
            }
        }
    }
}

fn check_member_shadowing(context: &ValidationContext, item: &ModelItem) {
    let (members, type_name) = match item {
        ModelItem::Type(EdmTypeRef::Entity(entity)) => {
            (entity.members().to_vec(), entity.name().to_string())
        }
        ModelItem::Type(EdmTypeRef::Complex(complex)) => {
            (complex.members().to_vec(), complex.name().to_string())
        }
        _ => return,
    };
    for member in members {
        if member.name() == type_name {
            context.error_on(
                "MemberNameMustDifferFromDeclaringType",
                item,
                &member.name(),
                format!("member '{0}' shadows its declaring type's name", member.name()),
            );
        }
    }
}

fn check_complex_has_members(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Complex(complex)) = item else {
        return;
    };
    if complex.members().is_empty() {
        context.error(
            "ComplexTypeMustHaveMembers",
            item,
            format!("complex type '{0}' declares no members", complex.full_name()),
        );
    }
}

fn check_association_two_ends(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Association(association)) = item else {
        return;
    };
    let ends = association.ends().len();
    if ends != 2 {
        context.error(
            "AssociationMustHaveTwoEnds",
            item,
            format!(
                "association '{0}' declares {ends} end(s), expected 2",
                association.full_name()
            ),
        );
    }
}

fn check_constraint_roles(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Association(association)) = item else {
        return;
    };
    let Some(constraint) = association.referential_constraint() else {
        return;
    };
    for role in [constraint.from_role(), constraint.to_role()] {
        if association.end(&role.name()).is_none() {
            context.error(
                "ConstraintRolesMustBeDeclaredEnds",
                item,
                format!(
                    "constraint role '{0}' is not an end of '{1}'",
                    role.name(),
                    association.full_name()
                ),
            );
        }
    }
}

fn check_constraint_principal_keys(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Association(association)) = item else {
        return;
    };
    let Some(constraint) = association.referential_constraint() else {
        return;
    };
    let Ok(principal) = constraint.from_role().entity_type() else {
        return;
    };
    let key_names: HashSet<String> = principal
        .key_members()
        .iter()
        .map(EdmMemberRef::name)
        .collect();
    for property in constraint.from_properties() {
        if !key_names.contains(&property.name()) {
            context.error_on(
                "ConstraintPrincipalPropertiesMustBeKey",
                item,
                &property.name(),
                format!(
                    "principal property '{0}' is not a key member of '{1}'",
                    property.name(),
                    principal.full_name()
                ),
            );
        }
    }
}

fn check_constraint_principal_multiplicity(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Association(association)) = item else {
        return;
    };
    let Some(constraint) = association.referential_constraint() else {
        return;
    };
    if constraint.from_role().multiplicity() == RelationshipMultiplicity::Many {
        context.error(
            "ConstraintPrincipalEndMustNotBeMany",
            item,
            format!(
                "principal end '{0}' of '{1}' has multiplicity '*'",
                constraint.from_role().name(),
                association.full_name()
            ),
        );
    }
}

fn check_constraint_dependent_declared(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Association(association)) = item else {
        return;
    };
    let Some(constraint) = association.referential_constraint() else {
        return;
    };
    let Ok(dependent) = constraint.to_role().entity_type() else {
        return;
    };
    let declared: HashSet<String> = dependent
        .all_members()
        .iter()
        .map(EdmMemberRef::name)
        .collect();
    for property in constraint.to_properties() {
        if !declared.contains(&property.name()) {
            context.error_on(
                "ConstraintDependentPropertiesMustBeDeclared",
                item,
                &property.name(),
                format!(
                    "dependent property '{0}' is not declared by '{1}'",
                    property.name(),
                    dependent.full_name()
                ),
            );
        }
    }
}

fn check_navigation_wired(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Member(EdmMemberRef::Navigation(navigation)) = item else {
        return;
    };
    let Ok(association) = navigation.relationship() else {
        context.error(
            "NavigationPropertyMustBeWired",
            item,
            format!(
                "navigation property '{0}' is not bound to an association",
                navigation.name()
            ),
        );
        return;
    };
    for end in [navigation.from_end(), navigation.to_end()] {
        match end {
            Ok(end) if association.end(&end.name()).is_some() => {}
            Ok(end) => context.error(
                "NavigationPropertyMustBeWired",
                item,
                format!(
                    "end '{0}' is not declared by association '{1}'",
                    end.name(),
                    association.full_name()
                ),
            ),
            Err(_) => context.error(
                "NavigationPropertyMustBeWired",
                item,
                format!("navigation property '{0}' has an unbound end", navigation.name()),
            ),
        }
    }
}

fn check_navigation_value_shape(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Member(EdmMemberRef::Navigation(navigation)) = item else {
        return;
    };
    if !is_entity_shaped(navigation.type_usage()) {
        context.error(
            "NavigationValueMustBeEntityShaped",
            item,
            format!(
                "navigation property '{0}' must yield an entity or a collection of entities, got '{1}'",
                navigation.name(),
                navigation.type_usage().edm_type().identity()
            ),
        );
    }
}

fn is_entity_shaped(usage: &TypeUsage) -> bool {
    match usage.edm_type() {
        EdmTypeRef::Entity(_) | EdmTypeRef::Ref(_) => true,
        EdmTypeRef::Collection(collection) => matches!(
            collection.element_usage().edm_type(),
            EdmTypeRef::Entity(_) | EdmTypeRef::Ref(_)
        ),
        _ => false,
    }
}

fn check_enum_member_values(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Enum(enum_type)) = item else {
        return;
    };
    let mut seen: HashSet<i64> = HashSet::new();
    for member in enum_type.members().to_vec() {
        if !seen.insert(member.value()) {
            context.error_on(
                "EnumMemberValuesMustBeUnique",
                item,
                member.name(),
                format!(
                    "enum member '{0}' repeats value {1}",
                    member.name(),
                    member.value()
                ),
            );
        }
    }
}

fn check_entity_set_type_declared(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::EntitySet(set) = item else {
        return;
    };
    let full_name = set.element_type().full_name();
    if context.model().find_type(&full_name, false).is_err() {
        context.error(
            "EntitySetTypeMustBeDeclared",
            item,
            format!(
                "entity set '{0}' holds '{full_name}', which the model does not declare",
                set.name()
            ),
        );
    }
}

fn check_association_set_bound(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::AssociationSet(set) = item else {
        return;
    };
    let declared = set.element_type().ends().len();
    let bound = set.ends().len();
    if bound != declared {
        context.error(
            "AssociationSetMustBindAllEnds",
            item,
            format!(
                "association set '{0}' binds {bound} of {declared} declared end(s)",
                set.name()
            ),
        );
    }
}

fn check_model_has_container(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Model(model) = item else {
        return;
    };
    if model.containers().is_empty() {
        context.warning(
            "ModelShouldDeclareContainer",
            item,
            "the model declares no entity container".to_string(),
        );
    }
}

fn check_entity_has_set(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Type(EdmTypeRef::Entity(entity)) = item else {
        return;
    };
    // Meaningful only once the model declares storage at all.
    if context.model().containers().is_empty() || entity.is_abstract() {
        return;
    }
    for container in context.model().containers().to_vec() {
        for set in container.entity_sets() {
            if covers_entity(set.element_type(), entity) {
                return;
            }
        }
    }
    context.warning(
        "EntityTypeShouldHaveEntitySet",
        item,
        format!(
            "entity type '{0}' is not reachable from any entity set",
            entity.full_name()
        ),
    );
}

/// Whether a set declared over `element` stores instances of `entity`,
/// directly or through the base-type chain.
fn covers_entity(element: &Arc<EntityType>, entity: &Arc<EntityType>) -> bool {
    let mut current = Some(Arc::clone(entity));
    while let Some(candidate) = current {
        if Arc::ptr_eq(&candidate, element) {
            return true;
        }
        current = candidate.base_type();
    }
    false
}

fn check_facet_bounds(context: &ValidationContext, item: &ModelItem) {
    let usage = match item {
        ModelItem::Member(member) => member.type_usage(),
        ModelItem::Parameter(parameter) => parameter.type_usage(),
        _ => return,
    };
    for facet in usage.facets().to_vec() {
        if !facet.description().value_in_bounds(facet.value()) {
            context.error(
                "FacetValuesMustRespectBounds",
                item,
                format!(
                    "facet '{0}' value '{1}' is outside its declared bounds",
                    facet.name(),
                    facet.value()
                ),
            );
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn declared_name(item: &ModelItem) -> Option<String> {
    match item {
        ModelItem::Type(type_ref) => match type_ref {
            EdmTypeRef::Entity(_)
            | EdmTypeRef::Complex(_)
            | EdmTypeRef::Enum(_)
            | EdmTypeRef::Association(_) => Some(type_ref.name()),
            // Transient and primitive names are composed, not declared.
            _ => None,
        },
        ModelItem::Member(member) => Some(member.name()),
        ModelItem::Container(container) => Some(container.name().to_string()),
        ModelItem::EntitySet(set) => Some(set.name().to_string()),
        ModelItem::AssociationSet(set) => Some(set.name().to_string()),
        ModelItem::AssociationSetEnd(end) => Some(end.name()),
        ModelItem::Function(function) => Some(function.name().to_string()),
        ModelItem::Parameter(parameter) => Some(parameter.name().to_string()),
        ModelItem::Model(_) | ModelItem::Constraint(_) => None,
    }
}

fn check_names(context: &ValidationContext, item: &ModelItem) {
    let Some(name) = declared_name(item) else {
        return;
    };
    if !is_identifier(&name) {
        context.error(
            "NamesMustBeValidIdentifiers",
            item,
            format!("'{name}' is not a valid identifier"),
        );
    }
}

fn check_namespaces(context: &ValidationContext, item: &ModelItem) {
    let namespace = match item {
        ModelItem::Type(type_ref) => match type_ref {
            EdmTypeRef::Entity(_)
            | EdmTypeRef::Complex(_)
            | EdmTypeRef::Enum(_)
            | EdmTypeRef::Association(_) => type_ref.namespace_name(),
            _ => return,
        },
        ModelItem::Function(function) => function.namespace_name().to_string(),
        _ => return,
    };
    if namespace.is_empty() || !namespace.split('.').all(is_identifier) {
        context.error(
            "NamespaceMustBeWellFormed",
            item,
            format!("namespace '{namespace}' is not a dotted identifier path"),
        );
    }
}

fn check_parameter_mode(context: &ValidationContext, item: &ModelItem) {
    let ModelItem::Parameter(parameter) = item else {
        return;
    };
    if parameter.mode().is_none() {
        context.error(
            "ParameterModeMustBeAssigned",
            item,
            format!("parameter '{0}' has no direction", parameter.name()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_shape() {
        assert!(is_identifier("Customer"));
        assert!(is_identifier("_private1"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_target_matching() {
        let target = RuleTarget::Kind(BuiltInTypeKind::EntityType);
        let model = crate::metadata::model::EdmModel::new(crate::metadata::model::EdmVersion::V3);
        let root = ModelItem::Model(model);
        assert!(!target.matches(&root));
        assert!(RuleTarget::Any.matches(&root));
    }
}

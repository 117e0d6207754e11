//! End-to-end exercise of a small commerce schema: build, wire, freeze,
//! validate, and read the graph from multiple threads.

use std::sync::Arc;

use edmgraph::prelude::*;

struct Schema {
    model: Arc<EdmModel>,
    customer: Arc<EntityType>,
    order: Arc<EntityType>,
    customers: Arc<EntitySet>,
    orders: Arc<EntitySet>,
}

fn build_schema() -> Result<Schema> {
    let model = EdmModel::new(EdmVersion::V3);

    // Customer with a scalar key and a configured string property.
    let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace)?;
    let customer_id = EdmMemberRef::Property(EdmProperty::primitive(
        "Id",
        PrimitiveTypeKind::Int32,
        false,
    )?);
    customer.add_member(customer_id.clone())?;
    customer.add_key_member(&customer_id)?;
    customer.add_member(EdmMemberRef::Property(EdmProperty::new(
        "Name",
        TypeUsage::string(false, Some(200), true, false)?,
    )?))?;

    // Address is embedded by value.
    let address = ComplexType::new("Address", "Shop", DataSpace::CSpace)?;
    address.add_member(EdmMemberRef::Property(EdmProperty::primitive(
        "Street",
        PrimitiveTypeKind::String,
        true,
    )?))?;
    customer.add_member(EdmMemberRef::Property(EdmProperty::new(
        "Billing",
        TypeUsage::create(EdmTypeRef::Complex(Arc::clone(&address)), Vec::new())?,
    )?))?;

    // Order with its key and a foreign key column.
    let order = EntityType::new("Order", "Shop", DataSpace::CSpace)?;
    let order_id = EdmMemberRef::Property(EdmProperty::primitive(
        "Id",
        PrimitiveTypeKind::Int32,
        false,
    )?);
    order.add_member(order_id.clone())?;
    order.add_key_member(&order_id)?;
    let foreign_key = EdmProperty::primitive("CustomerId", PrimitiveTypeKind::Int32, false)?;
    order.add_member(EdmMemberRef::Property(Arc::clone(&foreign_key)))?;
    order.add_member(EdmMemberRef::Property(EdmProperty::new(
        "Total",
        TypeUsage::decimal(false, 18, 2)?,
    )?))?;

    // The association, its ends, and the foreign-key constraint.
    let association = AssociationType::new("CustomerOrder", "Shop", DataSpace::CSpace)?;
    let principal =
        AssociationEndMember::new("Customer", &customer, RelationshipMultiplicity::One)?;
    principal.set_delete_behavior(OperationAction::Cascade)?;
    let dependent = AssociationEndMember::new("Order", &order, RelationshipMultiplicity::Many)?;
    association.add_end(Arc::clone(&principal))?;
    association.add_end(Arc::clone(&dependent))?;
    let key_property = match &customer_id {
        EdmMemberRef::Property(property) => Arc::clone(property),
        _ => unreachable!(),
    };
    association.set_referential_constraint(ReferentialConstraint::new(
        Arc::clone(&principal),
        Arc::clone(&dependent),
        vec![key_property],
        vec![Arc::clone(&foreign_key)],
    )?)?;

    // Navigations on both sides.
    let orders_navigation = NavigationProperty::new(
        "Orders",
        TypeUsage::create(
            EdmTypeRef::Collection(CollectionType::new(TypeUsage::create(
                EdmTypeRef::Entity(Arc::clone(&order)),
                Vec::new(),
            )?)),
            Vec::new(),
        )?,
    )?;
    orders_navigation.set_relationship(&association, &principal, &dependent)?;
    customer.add_member(EdmMemberRef::Navigation(orders_navigation))?;

    let customer_navigation = NavigationProperty::new(
        "Customer",
        TypeUsage::create(EdmTypeRef::Entity(Arc::clone(&customer)), Vec::new())?,
    )?;
    customer_navigation.set_relationship(&association, &dependent, &principal)?;
    order.add_member(EdmMemberRef::Navigation(customer_navigation))?;

    // Status enum.
    let status = EnumType::new(
        "OrderStatus",
        "Shop",
        PrimitiveTypeKind::Int32,
        false,
        DataSpace::CSpace,
    )?;
    status.add_member(EnumMember::new("Open", 0)?)?;
    status.add_member(EnumMember::new("Shipped", 1)?)?;

    model.add_item(EdmTypeRef::Entity(Arc::clone(&customer)))?;
    model.add_item(EdmTypeRef::Entity(Arc::clone(&order)))?;
    model.add_item(EdmTypeRef::Complex(address))?;
    model.add_item(EdmTypeRef::Enum(status))?;
    model.add_item(EdmTypeRef::Association(Arc::clone(&association)))?;

    // Container, sets, and the link set.
    let container = EntityContainer::new("ShopContainer")?;
    let customers = EntitySet::new("Customers", &customer)?;
    customers.set_table(Some("dbo"), Some("Customers"))?;
    let orders = EntitySet::new("Orders", &order)?;
    container.add_entity_set(Arc::clone(&customers))?;
    container.add_entity_set(Arc::clone(&orders))?;
    let links = AssociationSet::new("CustomerOrders", &association)?;
    links.add_end(&principal, &customers)?;
    links.add_end(&dependent, &orders)?;
    container.add_association_set(links)?;
    model.add_container(container)?;

    // A model function.
    let total = EdmFunction::new("OrderTotal", "Shop", DataSpace::CSpace)?;
    total.add_parameter(FunctionParameter::new(
        "orderId",
        TypeUsage::default_of(EdmTypeRef::Primitive(PrimitiveType::canonical(
            PrimitiveTypeKind::Int32,
        )))?,
        ParameterMode::In,
    )?)?;
    total.set_return_usage(TypeUsage::decimal(false, 18, 2)?)?;
    model.add_function(total)?;

    Ok(Schema {
        model,
        customer,
        order,
        customers,
        orders,
    })
}

#[test]
fn builds_and_validates_cleanly() {
    let schema = build_schema().unwrap();
    schema.model.set_readonly();

    let findings = DataModelValidator::new().validate(&schema.model, true);
    assert!(
        findings.is_empty(),
        "unexpected findings: {findings:?}"
    );
    DataModelValidator::new()
        .validate_or_fail(&schema.model, true)
        .unwrap();
}

#[test]
fn freeze_cascades_through_the_whole_graph() {
    let schema = build_schema().unwrap();
    schema.model.set_readonly();

    assert!(schema.model.is_readonly());
    assert!(schema.customer.as_ref().is_readonly());
    assert!(schema.order.as_ref().is_readonly());
    assert!(schema.customers.as_ref().is_readonly());

    // Every mutation path is closed.
    assert!(schema
        .customer
        .add_member(EdmMemberRef::Property(
            EdmProperty::primitive("Late", PrimitiveTypeKind::Int32, true).unwrap()
        ))
        .is_err());
    assert!(schema.customers.set_table(None, None).is_err());
    assert!(schema
        .model
        .add_container(EntityContainer::new("Other").unwrap())
        .is_err());
}

#[test]
fn lookups_resolve_types_sets_and_members() {
    let schema = build_schema().unwrap();
    schema.model.set_readonly();

    let found = schema.model.find_type("Shop.Customer", false).unwrap();
    assert!(found.edm_equals(&EdmTypeRef::Entity(Arc::clone(&schema.customer))));

    let container = schema.model.find_container("ShopContainer", false).unwrap();
    assert!(container.entity_set("Customers", false).is_ok());
    // Case-insensitive fallback resolves an unambiguous name.
    assert!(container.entity_set("customers", true).is_ok());

    let name = schema.customer.members().get_value("Name", false).unwrap();
    assert_eq!(name.type_usage().facet_value("MaxLength"), Some(FacetValue::Int32(200)));
}

#[test]
fn foreign_key_snapshot_reflects_the_constraint() {
    let schema = build_schema().unwrap();
    schema.model.set_readonly();

    let dependents = schema.orders.foreign_key_dependents();
    assert_eq!(dependents.len(), 1);
    let (link_set, constraint) = &dependents[0];
    assert_eq!(link_set.name(), "CustomerOrders");
    assert_eq!(constraint.to_properties()[0].name(), "CustomerId");

    assert_eq!(schema.customers.foreign_key_principals().len(), 1);
    assert!(schema.orders.has_foreign_key_relationships());
    assert!(!schema.orders.has_independent_relationships());
}

#[test]
fn navigation_links_traverse_to_the_other_side() {
    let schema = build_schema().unwrap();
    schema.model.set_readonly();

    let navigations = schema.customer.navigation_properties();
    assert_eq!(navigations.len(), 1);
    let orders = &navigations[0];
    assert_eq!(orders.relationship().unwrap().full_name(), "Shop.CustomerOrder");
    assert_eq!(
        orders.to_end().unwrap().entity_type().unwrap().full_name(),
        "Shop.Order"
    );
}

#[test]
fn frozen_graph_supports_concurrent_readers() {
    let schema = build_schema().unwrap();
    schema.model.set_readonly();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let model = Arc::clone(&schema.model);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let customer = model.find_type("Shop.Customer", false).unwrap();
                    assert_eq!(customer.name(), "Customer");
                    let container = model.find_container("ShopContainer", false).unwrap();
                    let orders = container.entity_set("Orders", false).unwrap();
                    assert_eq!(orders.foreign_key_dependents().len(), 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn structural_digest_is_stable_across_builds() {
    let first = build_schema().unwrap();
    let second = build_schema().unwrap();
    first.model.set_readonly();
    second.model.set_readonly();
    assert_eq!(
        first.customer.structural_digest(),
        second.customer.structural_digest()
    );
    assert_ne!(
        first.customer.structural_digest(),
        first.order.structural_digest()
    );
}

#[test]
fn cache_shares_one_frozen_model_per_key() {
    let cache = MetadataCache::new();
    let first = cache
        .model_or_build("shop", || Ok(build_schema()?.model))
        .unwrap();
    let second = cache
        .model_or_build("shop", || panic!("cache hit expected"))
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.is_readonly());
}

#[test]
fn validator_reports_a_broken_schema_in_full() {
    let model = EdmModel::new(EdmVersion::V3);

    // Keyless entity.
    let bare = EntityType::new("Bare", "Shop", DataSpace::CSpace).unwrap();
    model
        .add_item(EdmTypeRef::Entity(Arc::clone(&bare)))
        .unwrap();

    // One-ended association.
    let lonely = AssociationType::new("Lonely", "Shop", DataSpace::CSpace).unwrap();
    lonely
        .add_end(
            AssociationEndMember::new("Only", &bare, RelationshipMultiplicity::One).unwrap(),
        )
        .unwrap();
    model.add_item(EdmTypeRef::Association(lonely)).unwrap();

    // Entity set over an undeclared type.
    let stray = EntityType::new("Stray", "Shop", DataSpace::CSpace).unwrap();
    let container = EntityContainer::new("C").unwrap();
    container
        .add_entity_set(EntitySet::new("Strays", &stray).unwrap())
        .unwrap();
    model.add_container(container).unwrap();

    let findings = DataModelValidator::new().validate(&model, false);
    let fired: Vec<&str> = findings.iter().map(|finding| finding.rule_name).collect();
    assert!(fired.contains(&"EntityTypeMustHaveKey"));
    assert!(fired.contains(&"AssociationMustHaveTwoEnds"));
    assert!(fired.contains(&"EntitySetTypeMustBeDeclared"));

    let err = DataModelValidator::new()
        .validate_or_fail(&model, false)
        .unwrap_err();
    assert!(matches!(err, Error::ValidationFailed { .. }));
}

//! End-to-end tests: schema + object graph -> builder -> resolver -> plain objects

use transformer::{
    EntityDef, Mappable, Mapping, MappingDataBuilder, MappingError, MappingType, ObjectGraph, ObjectId,
    RawRepresentable, Resolver, ScalarKind, Schema, Source, Transformer, TypeTag, Value,
};

#[derive(Debug, PartialEq)]
struct PersonPlainObject {
    name: String,
    age: i64,
    tags: Vec<String>,
}

impl Mappable for PersonPlainObject {
    const NAME: &'static str = "PersonPlainObject";

    fn from_resolver(resolver: &Resolver) -> Result<Self, MappingError> {
        Ok(Self {
            name: resolver.value("name")?,
            age: resolver.value("age")?,
            tags: resolver.value("tags")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Pending = 1,
    Paid = 2,
    Refunded = 3,
}

impl RawRepresentable for Status {
    type Raw = i64;

    fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(Status::Pending),
            2 => Some(Status::Paid),
            3 => Some(Status::Refunded),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
struct OrderPlainObject {
    number: i64,
    status: Status,
}

impl Mappable for OrderPlainObject {
    const NAME: &'static str = "OrderPlainObject";

    fn from_resolver(resolver: &Resolver) -> Result<Self, MappingError> {
        Ok(Self {
            number: resolver.value("number")?,
            status: resolver.raw("status")?,
        })
    }
}

#[derive(Debug, PartialEq)]
struct AddressPlainObject {
    city: String,
}

impl Mappable for AddressPlainObject {
    const NAME: &'static str = "AddressPlainObject";

    fn from_resolver(resolver: &Resolver) -> Result<Self, MappingError> {
        Ok(Self {
            city: resolver.value("city")?,
        })
    }
}

#[derive(Debug, PartialEq)]
struct CustomerPlainObject {
    name: String,
    address: Option<AddressPlainObject>,
    orders: Vec<OrderPlainObject>,
}

impl Mappable for CustomerPlainObject {
    const NAME: &'static str = "CustomerPlainObject";

    fn from_resolver(resolver: &Resolver) -> Result<Self, MappingError> {
        Ok(Self {
            name: resolver.value("name")?,
            address: resolver.nested_optional("address")?,
            orders: resolver.nested_list("orders")?,
        })
    }
}

fn schema() -> Schema {
    Schema::from_entities(vec![
        EntityDef::new("PersonModelObject")
            .attribute("name", ScalarKind::String)
            .attribute("age", ScalarKind::Int)
            .attribute("tags", TypeTag::collection(ScalarKind::String.into())),
        EntityDef::new("CustomerModelObject")
            .attribute("name", ScalarKind::String)
            .to_one("address", "AddressModelObject", Some("customer"))
            .to_many("orders", "OrderModelObject", Some("customer")),
        EntityDef::new("AddressModelObject")
            .attribute("city", ScalarKind::String)
            .to_one("customer", "CustomerModelObject", Some("address")),
        EntityDef::new("OrderModelObject")
            .attribute("number", ScalarKind::Int)
            .attribute("status", ScalarKind::Int)
            .to_one("customer", "CustomerModelObject", Some("orders")),
    ])
    .unwrap()
}

fn add_person(graph: &mut ObjectGraph, name: &str, age: i64, tags: Vec<&str>) -> ObjectId {
    let id = graph.insert("PersonModelObject").unwrap();
    graph.set_attribute(id, "name", name).unwrap();
    graph.set_attribute(id, "age", age).unwrap();
    graph.set_attribute(id, "tags", tags).unwrap();
    id
}

fn add_order(graph: &mut ObjectGraph, customer: ObjectId, number: i64, status: i64) -> ObjectId {
    let id = graph.insert("OrderModelObject").unwrap();
    graph.set_attribute(id, "number", number).unwrap();
    graph.set_attribute(id, "status", status).unwrap();
    graph.relate(id, "customer", customer).unwrap();
    id
}

#[test]
fn test_person_end_to_end() {
    let mut graph = ObjectGraph::new(schema());
    let alice = add_person(&mut graph, "Alice", 30, vec!["a", "b"]);

    let person: PersonPlainObject = Transformer::default()
        .transform(&graph.object(alice).unwrap().into())
        .unwrap();

    assert_eq!(
        person,
        PersonPlainObject {
            name: "Alice".to_string(),
            age: 30,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    );
}

#[test]
fn test_customer_with_relationships() {
    let mut graph = ObjectGraph::new(schema());
    let customer = graph.insert("CustomerModelObject").unwrap();
    graph.set_attribute(customer, "name", "Acme").unwrap();
    let address = graph.insert("AddressModelObject").unwrap();
    graph.set_attribute(address, "city", "Oslo").unwrap();
    graph.relate(address, "customer", customer).unwrap();
    add_order(&mut graph, customer, 7, 2);
    add_order(&mut graph, customer, 8, 3);

    let result: CustomerPlainObject = transformer::transformer::transform(
        MappingType::ManagedObject,
        &graph.object(customer).unwrap().into(),
    )
    .unwrap();

    assert_eq!(result.name, "Acme");
    assert_eq!(
        result.address,
        Some(AddressPlainObject {
            city: "Oslo".to_string()
        })
    );
    assert_eq!(
        result.orders,
        vec![
            OrderPlainObject {
                number: 7,
                status: Status::Paid
            },
            OrderPlainObject {
                number: 8,
                status: Status::Refunded
            },
        ]
    );
}

#[test]
fn test_nested_error_propagates_unchanged() {
    let mut graph = ObjectGraph::new(schema());
    let customer = graph.insert("CustomerModelObject").unwrap();
    graph.set_attribute(customer, "name", "Acme").unwrap();
    add_order(&mut graph, customer, 1, 1);
    add_order(&mut graph, customer, 2, 99);

    let err = Transformer::default()
        .transform::<CustomerPlainObject>(&graph.object(customer).unwrap().into())
        .unwrap_err();

    assert_eq!(
        err,
        MappingError::TypeMismatch {
            key: "status".to_string(),
            expected: ScalarKind::Int.into(),
        }
    );
}

#[test]
fn test_bidirectional_to_one_terminates() {
    let mut graph = ObjectGraph::new(schema());
    let customer = graph.insert("CustomerModelObject").unwrap();
    graph.set_attribute(customer, "name", "Acme").unwrap();
    let address = graph.insert("AddressModelObject").unwrap();
    graph.set_attribute(address, "city", "Oslo").unwrap();
    graph.relate(customer, "address", address).unwrap();

    let transformer = Transformer::default();
    let mapping = transformer
        .builder()
        .flatten(&graph.object(customer).unwrap().into())
        .unwrap();

    let nested = mapping.get("address").and_then(Value::as_map).unwrap();
    assert!(nested.contains_key("city"));
    assert!(!nested.contains_key("customer"));

    // And from the other side, the customer omits its address.
    let mapping = transformer
        .builder()
        .flatten(&graph.object(address).unwrap().into())
        .unwrap();
    assert_eq!(
        mapping,
        Mapping::new()
            .with("city", "Oslo")
            .with("customer", Mapping::new().with("name", "Acme"))
    );
}

#[test]
fn test_collection_fails_at_third_of_five() {
    let mut graph = ObjectGraph::new(schema());
    let mut sources: Vec<Source> = Vec::new();
    let mut ids = Vec::new();
    for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
        if i == 2 {
            let customer = graph.insert("CustomerModelObject").unwrap();
            graph.set_attribute(customer, "name", *name).unwrap();
            ids.push(customer);
        } else {
            ids.push(add_person(&mut graph, name, i as i64, vec![]));
        }
    }
    for id in &ids {
        sources.push(graph.object(*id).unwrap().into());
    }

    let result = Transformer::default().transform_all::<PersonPlainObject>(&sources);

    assert_eq!(
        result,
        Err(MappingError::SourceDestinationTypeMismatch {
            source: "Customer".to_string(),
            destination: "Person".to_string(),
        })
    );
}

#[test]
fn test_empty_collection_transforms_to_empty() {
    let transformer = Transformer::default();

    let people: Vec<PersonPlainObject> = transformer.transform_all(&[]).unwrap();
    assert!(people.is_empty());

    let people: Vec<PersonPlainObject> = transformer
        .transform_collection(&Source::Collection(Vec::new()))
        .unwrap();
    assert!(people.is_empty());
}

#[test]
fn test_plain_value_is_unsupported() {
    let err = Transformer::default()
        .transform::<PersonPlainObject>(&Source::Value(Value::from("PersonModelObject")))
        .unwrap_err();

    // Validation compares names first; a plain string is named "String".
    assert!(matches!(err, MappingError::SourceDestinationTypeMismatch { .. }));

    let err = Transformer::default()
        .builder()
        .flatten(&Source::Value(Value::Int(1)))
        .unwrap_err();
    assert_eq!(
        err,
        MappingError::UnsupportedSourceType {
            type_name: "Int".to_string()
        }
    );
}

fn shop_graph() -> ObjectGraph {
    let schema = Schema::from_entities(vec![
        EntityDef::new("UserModelObject")
            .attribute("name", ScalarKind::String)
            .to_many("orders", "OrderModelObject", Some("user"))
            .to_one("favorite", "ProductModelObject", None),
        EntityDef::new("OrderModelObject")
            .attribute("number", ScalarKind::Int)
            .to_one("user", "UserModelObject", Some("orders"))
            .to_one("product", "ProductModelObject", Some("orders")),
        EntityDef::new("ProductModelObject")
            .attribute("name", ScalarKind::String)
            .to_many("orders", "OrderModelObject", Some("product")),
    ])
    .unwrap();
    ObjectGraph::new(schema)
}

fn add_shop_order(graph: &mut ObjectGraph, user: ObjectId, product: ObjectId, number: i64) {
    let order = graph.insert("OrderModelObject").unwrap();
    graph.set_attribute(order, "number", number).unwrap();
    graph.relate(user, "orders", order).unwrap();
    graph.relate(order, "product", product).unwrap();
}

#[test]
fn test_sibling_branch_reaching_same_object_keeps_its_relationships() {
    let mut graph = shop_graph();
    let alice = graph.insert("UserModelObject").unwrap();
    graph.set_attribute(alice, "name", "Alice").unwrap();
    let lamp = graph.insert("ProductModelObject").unwrap();
    graph.set_attribute(lamp, "name", "Lamp").unwrap();
    add_shop_order(&mut graph, alice, lamp, 1);
    graph.relate(alice, "favorite", lamp).unwrap();

    let mapping = Transformer::default()
        .builder()
        .flatten(&graph.object(alice).unwrap().into())
        .unwrap();

    // Through the order the product omits its orders; reached directly it
    // lists them, each without its user or product.
    assert_eq!(
        mapping,
        Mapping::new()
            .with("name", "Alice")
            .with(
                "orders",
                vec![Mapping::new()
                    .with("number", 1)
                    .with("product", Mapping::new().with("name", "Lamp"))]
            )
            .with(
                "favorite",
                Mapping::new()
                    .with("name", "Lamp")
                    .with("orders", vec![Mapping::new().with("number", 1)])
            )
    );
}

#[test]
fn test_to_many_siblings_share_a_related_object() {
    let mut graph = shop_graph();
    let alice = graph.insert("UserModelObject").unwrap();
    graph.set_attribute(alice, "name", "Alice").unwrap();
    let lamp = graph.insert("ProductModelObject").unwrap();
    graph.set_attribute(lamp, "name", "Lamp").unwrap();
    add_shop_order(&mut graph, alice, lamp, 1);
    add_shop_order(&mut graph, alice, lamp, 2);

    let mapping = Transformer::default()
        .builder()
        .flatten(&graph.object(alice).unwrap().into())
        .unwrap();

    let lamp = Mapping::new().with("name", "Lamp");
    assert_eq!(
        mapping,
        Mapping::new().with("name", "Alice").with(
            "orders",
            vec![
                Mapping::new().with("number", 1).with("product", lamp.clone()),
                Mapping::new().with("number", 2).with("product", lamp),
            ]
        )
    );
}

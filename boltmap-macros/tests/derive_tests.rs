use boltmap_core::convention::describe;
use boltmap_core::traits::Mappable as MappableTrait;
use boltmap_core::{BindingTarget, ErrorKind, MapError, MappingRegistry, Node, Record, Relationship, Value};
use boltmap_macros::Mappable;

#[derive(Debug, PartialEq, Mappable)]
struct Person {
    name: String,
    born: Option<i64>,
}

#[derive(Debug, Default, PartialEq, Mappable)]
#[boltmap(default)]
struct Settings {
    theme: String,
    #[boltmap(default = 12)]
    font_size: i64,
    #[boltmap(default = -1)]
    offset: i64,
    nickname: Option<String>,
    #[boltmap(ignore)]
    cache: Vec<String>,
}

#[derive(Debug, PartialEq, Mappable)]
#[boltmap(name = "Film")]
struct Movie {
    #[boltmap(source = "m.title")]
    title: String,
    #[boltmap(source = "m", node_labels)]
    labels: Vec<String>,
    #[boltmap(converter = "parse_year")]
    released: i64,
    #[boltmap(default = 5.5)]
    rating: f64,
    #[boltmap(ignore)]
    cached: bool,
}

fn parse_year(value: &Value) -> Result<i64, std::num::ParseIntError> {
    value.to_string().trim_start_matches("year ").parse()
}

#[derive(Debug, PartialEq, Mappable)]
struct Role {
    #[boltmap(source = "p.name")]
    actor: String,
    #[boltmap(source = "r", relationship_type)]
    kind: String,
    #[boltmap(source = "r.roles")]
    roles: Vec<String>,
    #[boltmap(source = "p", node_labels)]
    actor_labels: String,
}

#[derive(Debug, PartialEq, Mappable)]
struct Contact {
    name: String,
}

#[derive(Debug, PartialEq, Mappable)]
struct Account {
    age: i64,
    #[boltmap(flatten)]
    contact: Contact,
}

#[derive(Debug, PartialEq, Mappable)]
struct Phenomenon {
    name: String,
    components: Vec<String>,
}

#[derive(Debug, PartialEq, Mappable)]
struct Observation {
    place: String,
    phenomena: Vec<Phenomenon>,
}

#[derive(Debug, PartialEq, Mappable)]
struct Edge {
    #[boltmap(source = "r", relationship_type)]
    kind: String,
}

#[derive(Debug, PartialEq, Mappable)]
struct Tagged {
    #[boltmap(source = "n", node_labels)]
    labels: Vec<String>,
    #[boltmap(source = "n", node_labels, converter = "first_label")]
    primary: String,
}

fn first_label(value: &Value) -> Result<String, MapError> {
    match value {
        Value::List(labels) => Ok(labels.first().map(|l| l.to_string()).unwrap_or_default()),
        other => Err(MapError::type_mismatch("List", other.kind(), "String")),
    }
}

fn person_node(name: &str) -> Node {
    Node::new(1, ["Person", "Actor"], [("name", Value::from(name)), ("born", Value::from(1964))])
}

#[test]
fn test_constructor_mode_designates_struct_literal() {
    let info = Person::mapping_info();
    assert_eq!(info.type_name(), "Person");
    assert_eq!(info.constructors().len(), 1);
    assert!(info.constructors()[0].is_designated());

    let names: Vec<&str> = info.constructors()[0].params().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["name", "born"]);
    assert!(!info.constructors()[0].params()[0].is_optional());
    assert!(info.constructors()[0].params()[1].is_optional());
}

#[test]
fn test_constructor_mode_maps_fields() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("name", "Keanu").with("born", 1964);
    let person: Person = registry.map_record(&record).unwrap();
    assert_eq!(person, Person { name: "Keanu".into(), born: Some(1964) });

    let record = Record::new().with("NAME", "Carrie-Anne");
    let person: Person = registry.map_record(&record).unwrap();
    assert_eq!(person, Person { name: "Carrie-Anne".into(), born: None });
}

#[test]
fn test_fields_found_inside_entity() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("p", person_node("Keanu"));
    let person: Person = registry.map_record(&record).unwrap();
    assert_eq!(person, Person { name: "Keanu".into(), born: Some(1964) });
}

#[test]
fn test_missing_required_field() {
    let registry = MappingRegistry::new();
    let err = registry.map_record::<Person>(&Record::new().with("born", 1)).unwrap_err();
    match &err {
        MapError::MissingField { field, struct_name } => {
            assert_eq!(field, "name");
            assert_eq!(struct_name, "Person");
        }
        other => panic!("expected MissingField, got: {other}"),
    }
}

#[test]
fn test_property_mode() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("theme", "dark").with("nickname", Value::Null).with("cache", vec!["x"]);
    let settings: Settings = registry.map_record(&record).unwrap();
    assert_eq!(
        settings,
        Settings {
            theme: "dark".into(),
            font_size: 12,
            offset: -1,
            nickname: None,
            cache: Vec::new(),
        }
    );

    let info = Settings::mapping_info();
    assert!(info.constructors()[0].params().is_empty());
    let members: Vec<&str> = info.properties().iter().map(|p| p.member()).collect();
    assert_eq!(members, vec!["theme", "font_size", "offset", "nickname"]);
}

#[test]
fn test_property_mode_missing_required() {
    let registry = MappingRegistry::new();
    let err = registry.map_record::<Settings>(&Record::new().with("font_size", 14)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
}

#[test]
fn test_source_labels_converter_and_default() {
    let registry = MappingRegistry::new();
    let record = Record::new()
        .with("m", Node::new(9, ["Movie"], [("title", Value::from("The Matrix"))]))
        .with("released", "year 1999");
    let movie: Movie = registry.map_record(&record).unwrap();
    assert_eq!(
        movie,
        Movie {
            title: "The Matrix".into(),
            labels: vec!["Movie".into()],
            released: 1999,
            rating: 5.5,
            cached: false,
        }
    );
}

#[test]
fn test_renamed_struct_and_converter_failure() {
    let registry = MappingRegistry::new();
    let record = Record::new()
        .with("m", Node::new(9, ["Movie"], [("title", Value::from("Heat"))]))
        .with("released", "soon");
    let err = registry.map_record::<Movie>(&record).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CallbackFailed);
    match err.root() {
        MapError::CallbackFailed { target, member, .. } => {
            assert_eq!(target, "Film");
            assert_eq!(member, "released");
        }
        other => panic!("expected CallbackFailed, got: {other}"),
    }
}

#[test]
fn test_relationship_type_and_label_string() {
    let registry = MappingRegistry::new();
    let rel = Relationship::new(
        3,
        1,
        2,
        "ACTED_IN",
        [("roles", Value::from(vec!["Neo", "Thomas Anderson"]))],
    );
    let record = Record::new().with("p", person_node("Keanu")).with("r", rel);
    let role: Role = registry.map_record(&record).unwrap();
    assert_eq!(
        role,
        Role {
            actor: "Keanu".into(),
            kind: "ACTED_IN".into(),
            roles: vec!["Neo".into(), "Thomas Anderson".into()],
            actor_labels: "Person,Actor".into(),
        }
    );
}

#[test]
fn test_flatten_reads_same_record() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("name", "Alice").with("age", 30);
    let account: Account = registry.map_record(&record).unwrap();
    assert_eq!(account, Account { age: 30, contact: Contact { name: "Alice".into() } });

    let descriptor = describe::<Account>().unwrap();
    let flattened = descriptor
        .bindings()
        .into_iter()
        .find(|b| b.member == "contact")
        .unwrap();
    assert_eq!(flattened.target, BindingTarget::Parameter);
    assert_eq!(flattened.source, None);
}

#[test]
fn test_nested_list_of_nodes() {
    let registry = MappingRegistry::new();
    let phenomena: Vec<Value> = [
        ("Rain", vec!["water", "cloud"]),
        ("Snow", vec!["ice"]),
        ("Fog", vec!["water", "air"]),
    ]
    .into_iter()
    .map(|(name, components)| {
        Value::Node(Node::new(
            0,
            ["Phenomenon"],
            [("name", Value::from(name)), ("components", Value::from(components))],
        ))
    })
    .collect();
    let record = Record::new().with("place", "Lisbon").with("phenomena", Value::List(phenomena));

    let observation: Observation = registry.map_record(&record).unwrap();
    assert_eq!(observation.place, "Lisbon");
    assert_eq!(observation.phenomena.len(), 3);
    assert_eq!(
        observation.phenomena[0],
        Phenomenon { name: "Rain".into(), components: vec!["water".into(), "cloud".into()] }
    );
    assert_eq!(observation.phenomena[1].components, vec!["ice"]);
    assert_eq!(observation.phenomena[2].name, "Fog");
}

#[test]
fn test_nested_element_error_has_context() {
    let registry = MappingRegistry::new();
    let broken = Value::Node(Node::new(0, ["Phenomenon"], [("name", Value::from("Hail"))]));
    let record = Record::new().with("place", "Oslo").with("phenomena", Value::List(vec![broken]));
    let err = registry.map_record::<Observation>(&record).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert!(err.to_string().contains("Observation::phenomena"), "{err}");
}

#[test]
fn test_constructor_aspect_on_wrong_kind_uses_default() {
    let registry = MappingRegistry::new();
    let since: Value = [("since", 1999)].into_iter().collect();
    let edge: Edge = registry.map_record(&Record::new().with("r", since)).unwrap();
    assert_eq!(edge, Edge { kind: String::new() });

    let tagged: Tagged = registry.map_record(&Record::new().with("n", "plain string")).unwrap();
    assert_eq!(tagged, Tagged { labels: Vec::new(), primary: String::new() });

    let tagged: Tagged = registry.map_record(&Record::new().with("n", person_node("Keanu"))).unwrap();
    assert_eq!(tagged.labels, vec!["Person", "Actor"]);
    assert_eq!(tagged.primary, "Person");
}

#[test]
fn test_constructor_aspect_absent_is_missing() {
    let registry = MappingRegistry::new();
    let err = registry.map_record::<Edge>(&Record::new().with("other", 1)).unwrap_err();
    match err.root() {
        MapError::MissingField { field, struct_name } => {
            assert_eq!(field, "r");
            assert_eq!(struct_name, "Edge");
        }
        other => panic!("expected MissingField, got: {other}"),
    }
}

use boltmap_core::convention::describe;
use boltmap_core::{
    BindingTarget, Constructor, ErrorKind, FromValue, MapError, Mappable, MappingContext, MappingInfo,
    MappingRegistry, Node, Param, Property, Record, Relationship, Value,
};

// --- Types with hand-written declarations ---

#[derive(Debug, PartialEq)]
struct Person {
    name: String,
    born: Option<i64>,
}

impl Mappable for Person {
    fn mapping_info() -> MappingInfo<Self> {
        MappingInfo::new("Person").constructor(
            Constructor::new("Person::new", |args| {
                Ok(Person { name: args.next()?, born: args.next_or_default()? })
            })
            .param(Param::new("name"))
            .param(Param::new("born").optional()),
        )
    }
}

impl FromValue for Person {
    fn from_value(value: &Value, ctx: &MappingContext<'_>) -> Result<Self, MapError> {
        ctx.map_nested::<Self>(value)
    }
}

/// Two constructors; the convention picks the one with fewer parameters.
#[derive(Debug, Default, PartialEq)]
struct Account {
    id: i64,
    owner: String,
    note: String,
}

impl Mappable for Account {
    fn mapping_info() -> MappingInfo<Self> {
        MappingInfo::new("Account")
            .constructor(
                Constructor::new("Account::full", |args| {
                    Ok(Account { id: args.next()?, owner: args.next()?, note: String::new() })
                })
                .param(Param::new("id"))
                .param(Param::new("owner")),
            )
            .constructor(
                Constructor::new("Account::with_id", |args| Ok(Account { id: args.next()?, ..Default::default() }))
                    .param(Param::new("id")),
            )
            .property(Property::new("id", |a: &mut Account, v: i64| a.id = v))
            .property(Property::new("owner", |a: &mut Account, v: String| a.owner = v))
            .property(Property::new("note", |a: &mut Account, v: String| a.note = v).ignore())
    }
}

/// Same constructors as `Account`, but the larger one is designated.
#[derive(Debug, Default, PartialEq)]
struct Ledger {
    id: i64,
    owner: String,
}

impl Mappable for Ledger {
    fn mapping_info() -> MappingInfo<Self> {
        MappingInfo::new("Ledger")
            .constructor(
                Constructor::new("Ledger::with_id", |args| Ok(Ledger { id: args.next()?, ..Default::default() }))
                    .param(Param::new("id")),
            )
            .constructor(
                Constructor::new("Ledger::full", |args| Ok(Ledger { id: args.next()?, owner: args.next()? }))
                    .designated()
                    .param(Param::new("id").source("ledger_id"))
                    .param(Param::new("owner")),
            )
    }
}

struct Abstract;

impl Mappable for Abstract {
    fn mapping_info() -> MappingInfo<Self> {
        MappingInfo::new("Abstract")
    }
}

/// Property mode with aspects, defaults and optional members.
#[derive(Debug, Default, PartialEq)]
struct Casting {
    labels: String,
    label_list: Vec<String>,
    rel_type: String,
    role: String,
    rating: i64,
    year: i64,
}

impl Mappable for Casting {
    fn mapping_info() -> MappingInfo<Self> {
        MappingInfo::new("Casting")
            .constructor(Constructor::new("Casting::default", |_args| Ok(Casting::default())))
            .property(Property::new("labels", |c: &mut Casting, v: String| c.labels = v).source("actor").node_labels())
            .property(
                Property::new("label_list", |c: &mut Casting, v: Vec<String>| c.label_list = v)
                    .source("actor")
                    .node_labels(),
            )
            .property(
                Property::new("rel_type", |c: &mut Casting, v: String| c.rel_type = v)
                    .source("r")
                    .relationship_type(),
            )
            .property(Property::new("role", |c: &mut Casting, v: String| c.role = v).source("r.role"))
            .property(Property::new("rating", |c: &mut Casting, v: i64| c.rating = v).default(5))
            .property(Property::new("year", |c: &mut Casting, v: i64| c.year = v).optional())
    }
}

fn actor() -> Value {
    Value::Node(Node::new(1, ["Person", "Actor"], [("name", Value::from("Keanu"))]))
}

fn acted_in() -> Value {
    Value::Relationship(Relationship::new(9, 1, 2, "ACTED_IN", [("role", Value::from("Neo"))]))
}

// --- Convention engine ---

#[test]
fn test_fewest_parameters_constructor_selected() {
    let d = describe::<Account>().unwrap();
    assert_eq!(d.constructor_name(), Some("Account::with_id"));

    // `id` is consumed by the constructor and `note` is ignored.
    let props: Vec<_> = d
        .bindings()
        .into_iter()
        .filter(|b| b.target == BindingTarget::Property)
        .map(|b| b.member)
        .collect();
    assert_eq!(props, vec!["owner"]);
}

#[test]
fn test_designated_constructor_selected() {
    let d = describe::<Ledger>().unwrap();
    assert_eq!(d.constructor_name(), Some("Ledger::full"));
    let sources: Vec<_> = d.bindings().into_iter().filter_map(|b| b.source).collect();
    assert_eq!(sources, vec!["ledger_id", "owner"]);
}

#[test]
fn test_no_constructor_is_configuration_error() {
    let err = describe::<Abstract>().err().unwrap();
    match &err {
        MapError::NoUsableConstructor { type_name } => assert_eq!(type_name, "Abstract"),
        other => panic!("expected NoUsableConstructor, got: {other}"),
    }

    let registry = MappingRegistry::new();
    let err = registry.map_record::<Abstract>(&Record::new()).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NoUsableConstructor);
}

// --- Compiled mapper ---

#[test]
fn test_map_by_convention() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("NAME", "Alice").with("born", 1990);
    let person: Person = registry.map_record(&record).unwrap();
    assert_eq!(person, Person { name: "Alice".into(), born: Some(1990) });
}

#[test]
fn test_optional_parameter_keeps_default() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("name", "Alice");
    let person: Person = registry.map_record(&record).unwrap();
    assert_eq!(person.born, None);

    let record = Record::new().with("name", "Alice").with("born", Value::Null);
    let person: Person = registry.map_record(&record).unwrap();
    assert_eq!(person.born, None);
}

#[test]
fn test_missing_required_field() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("born", 1990);
    let err = registry.map_record::<Person>(&record).unwrap_err();
    match &err {
        MapError::MissingField { field, struct_name } => {
            assert_eq!(field, "name");
            assert_eq!(struct_name, "Person");
        }
        other => panic!("expected MissingField, got: {other}"),
    }
}

#[test]
fn test_type_mismatch_carries_member_and_source() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("name", "Alice").with("born", "nineteen-ninety");
    let err = registry.map_record::<Person>(&record).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(err.to_string().starts_with("Person::born (source 'born'): "), "{err}");
}

#[test]
fn test_nested_entity_maps_through_sub_record() {
    #[derive(Debug)]
    struct Credit {
        movie: String,
        person: Person,
    }

    impl Mappable for Credit {
        fn mapping_info() -> MappingInfo<Self> {
            MappingInfo::new("Credit").constructor(
                Constructor::new("Credit::new", |args| Ok(Credit { movie: args.next()?, person: args.next()? }))
                    .param(Param::new("movie"))
                    .param(Param::new("person")),
            )
        }
    }

    let registry = MappingRegistry::new();
    let person = Node::new(4, ["Person"], [("name", Value::from("Dani")), ("born", Value::from(1977))]);
    let record = Record::new().with("movie", "Heat").with("person", person);
    let credit: Credit = registry.map_record(&record).unwrap();
    assert_eq!(credit.movie, "Heat");
    assert_eq!(credit.person, Person { name: "Dani".into(), born: Some(1977) });
}

#[test]
fn test_sub_record_falls_back_to_outer_record() {
    // `born` is not a property of the node, so it is found in the outer record.
    #[derive(Debug)]
    struct Wrapper {
        p: Person,
    }

    impl Mappable for Wrapper {
        fn mapping_info() -> MappingInfo<Self> {
            MappingInfo::new("Wrapper").constructor(
                Constructor::new("Wrapper::new", |args| Ok(Wrapper { p: args.next()? })).param(Param::new("p")),
            )
        }
    }

    let registry = MappingRegistry::new();
    let node = Node::new(1, ["Person"], [("name", Value::from("Ann"))]);
    let record = Record::new().with("p", node).with("born", 1985);
    let w: Wrapper = registry.map_record(&record).unwrap();
    assert_eq!(w.p, Person { name: "Ann".into(), born: Some(1985) });
}

#[test]
fn test_property_bindings_with_aspects() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("actor", actor()).with("r", acted_in()).with("year", 1999);
    let casting: Casting = registry.map_record(&record).unwrap();
    assert_eq!(casting.labels, "Person,Actor");
    assert_eq!(casting.label_list, vec!["Person", "Actor"]);
    assert_eq!(casting.rel_type, "ACTED_IN");
    assert_eq!(casting.role, "Neo");
    assert_eq!(casting.rating, 5);
    assert_eq!(casting.year, 1999);
}

#[test]
fn test_aspect_on_wrong_entity_kind_leaves_default() {
    let registry = MappingRegistry::new();
    // `actor` holds a plain string and `r` a node: neither carries the captured aspect.
    let record = Record::new()
        .with("actor", "nobody")
        .with("r", Node::new(2, ["Role"], [("role", Value::from("Trinity"))]))
        .with("rating", 3);
    let casting: Casting = registry.map_record(&record).unwrap();
    assert_eq!(casting.labels, "");
    assert!(casting.label_list.is_empty());
    assert_eq!(casting.rel_type, "");
    assert_eq!(casting.role, "Trinity");
    assert_eq!(casting.rating, 3);
    assert_eq!(casting.year, 0);
}

#[test]
fn test_missing_required_property() {
    let registry = MappingRegistry::new();
    let record = Record::new().with("actor", actor());
    let err = registry.map_record::<Casting>(&record).unwrap_err();
    match err.root() {
        MapError::MissingField { field, .. } => assert_eq!(field, "r"),
        other => panic!("expected MissingField, got: {other}"),
    }
}

#[test]
fn test_shape_index_reused_per_shape() {
    let registry = MappingRegistry::new();
    let mapper = boltmap_core::CompiledMapper::new(describe::<Person>().unwrap());
    let a = Record::new().with("name", "A").with("born", 1);
    let b = Record::new().with("name", "B").with("born", 2);
    let c = Record::new().with("born", 3).with("name", "C");

    use boltmap_core::RecordMapper;
    for record in [&a, &b, &c] {
        let ctx = MappingContext::new(&registry, record.view());
        mapper.map(&ctx).unwrap();
    }
    assert_eq!(mapper.cached_shapes(), 2);
}

#[test]
fn test_shape_includes_entity_keys() {
    let registry = MappingRegistry::new();
    let mapper = boltmap_core::CompiledMapper::new(describe::<Person>().unwrap());
    let full = Record::new().with("p", Node::new(1, ["Person"], [("name", Value::from("A")), ("born", Value::from(1))]));
    let named = Record::new().with("p", Node::new(2, ["Person"], [("name", Value::from("B"))]));
    let swapped = Record::new().with("p", Node::new(3, ["Person"], [("born", Value::from(3)), ("name", Value::from("C"))]));

    use boltmap_core::RecordMapper;
    let mut mapped = Vec::new();
    for record in [&full, &named, &swapped, &full, &named] {
        let ctx = MappingContext::new(&registry, record.view());
        mapped.push(mapper.map(&ctx).unwrap());
    }
    assert_eq!(mapper.cached_shapes(), 3);
    let born: Vec<Option<i64>> = mapped.iter().map(|p| p.born).collect();
    assert_eq!(born, vec![Some(1), None, Some(3), Some(1), None]);
    assert_eq!(mapped[4].name, "B");
}

#[test]
fn test_shape_cache_is_bounded() {
    let registry = MappingRegistry::new();
    let mapper = boltmap_core::CompiledMapper::new(describe::<Person>().unwrap());

    use boltmap_core::RecordMapper;
    for i in 0..(boltmap_core::MAX_CACHED_SHAPES + 10) {
        let record = Record::new().with("name", "X").with(format!("extra{i}"), i as i64);
        let ctx = MappingContext::new(&registry, record.view());
        assert_eq!(mapper.map(&ctx).unwrap().name, "X");
    }
    assert_eq!(mapper.cached_shapes(), boltmap_core::MAX_CACHED_SHAPES);
}

#[test]
fn test_concurrent_mapping_of_one_type() {
    let registry = MappingRegistry::new();
    std::thread::scope(|s| {
        for t in 0..8_i64 {
            let registry = &registry;
            s.spawn(move || {
                for i in 0..50_i64 {
                    let record = if i % 2 == 0 {
                        Record::new().with("name", format!("t{t}")).with("born", i)
                    } else {
                        Record::new().with("born", i).with("name", format!("t{t}"))
                    };
                    let p: Person = registry.map_record(&record).unwrap();
                    assert_eq!(p.born, Some(i));
                }
            });
        }
    });
}

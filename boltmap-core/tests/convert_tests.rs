use std::collections::HashMap;
use indexmap::IndexMap;
use boltmap_core::{ByteArray, ErrorKind, FromValue, MapError, MappingContext, MappingRegistry, Node, Point2D, Record, Relationship, Value};

fn convert<T: FromValue>(value: Value) -> Result<T, MapError> {
    let registry = MappingRegistry::new();
    let record = Record::new();
    let ctx = MappingContext::new(&registry, record.view());
    T::from_value(&value, &ctx)
}

#[test]
fn test_from_value_integer() {
    assert_eq!(convert::<i64>(Value::Integer(42)).unwrap(), 42);
    assert_eq!(convert::<u8>(Value::Integer(200)).unwrap(), 200);
}

#[test]
fn test_integer_out_of_range() {
    let err = convert::<u8>(Value::Integer(300)).unwrap_err();
    match &err {
        MapError::TypeMismatch { got, context, .. } => {
            assert_eq!(got, "300");
            assert_eq!(context, "u8");
        }
        other => panic!("expected TypeMismatch, got: {other}"),
    }

    let err = convert::<u32>(Value::Integer(-1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_float_widening_and_parsing() {
    assert_eq!(convert::<f64>(Value::Integer(3)).unwrap(), 3.0);
    assert_eq!(convert::<f64>(Value::Float(1.5)).unwrap(), 1.5);
    assert_eq!(convert::<f32>(Value::from("2.25")).unwrap(), 2.25);
}

#[test]
fn test_string_parses_into_numbers_and_bool() {
    assert_eq!(convert::<i32>(Value::from(" 17 ")).unwrap(), 17);
    assert!(convert::<bool>(Value::from("TRUE")).unwrap());
    assert!(!convert::<bool>(Value::from("false")).unwrap());

    let err = convert::<i64>(Value::from("oops")).unwrap_err();
    match &err {
        MapError::TypeMismatch { expected, got, .. } => {
            assert_eq!(expected, "Integer");
            assert_eq!(got, "String \"oops\"");
        }
        other => panic!("expected TypeMismatch, got: {other}"),
    }
}

#[test]
fn test_type_mismatch_error() {
    let err = convert::<bool>(Value::Integer(1)).unwrap_err();
    match &err {
        MapError::TypeMismatch { expected, got, .. } => {
            assert_eq!(expected, "Boolean");
            assert_eq!(got, "Integer");
        }
        other => panic!("expected TypeMismatch, got: {other}"),
    }
}

#[test]
fn test_scalars_format_into_string() {
    assert_eq!(convert::<String>(Value::Integer(7)).unwrap(), "7");
    assert_eq!(convert::<String>(Value::Boolean(true)).unwrap(), "true");
    assert_eq!(convert::<String>(Value::from("hello")).unwrap(), "hello");
}

#[test]
fn test_list_joins_into_string() {
    let labels = Value::from(vec!["Person", "Actor"]);
    assert_eq!(convert::<String>(labels).unwrap(), "Person,Actor");

    let mixed = Value::List(vec![Value::Integer(1), Value::from("two")]);
    assert_eq!(convert::<String>(mixed).unwrap(), "1,two");
}

#[test]
fn test_null_is_not_a_string() {
    let err = convert::<String>(Value::Null).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_from_value_list() {
    let val = Value::from(vec![1, 2, 3]);
    assert_eq!(convert::<Vec<i64>>(val).unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_list_element_error_names_index() {
    let val = Value::List(vec![Value::Integer(1), Value::from("x")]);
    let err = convert::<Vec<i64>>(val).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(err.to_string().starts_with("[1]: "), "{err}");
}

#[test]
fn test_from_value_option() {
    assert_eq!(convert::<Option<i64>>(Value::Null).unwrap(), None);
    assert_eq!(convert::<Option<i64>>(Value::Integer(42)).unwrap(), Some(42));
}

#[test]
fn test_from_value_hashmap() {
    let val: Value = vec![("a", 1), ("b", 2)].into_iter().collect();
    let map = convert::<HashMap<String, i64>>(val).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 1);
    assert_eq!(map["b"], 2);
}

#[test]
fn test_node_properties_into_indexmap() {
    let node = Node::new(1, ["Person"], [("name", Value::from("Alice")), ("city", Value::from("Paris"))]);
    let map = convert::<IndexMap<String, String>>(Value::Node(node)).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name", "city"]);
}

#[test]
fn test_from_value_tuple() {
    let val = Value::List(vec![Value::from("Alice"), Value::Integer(30)]);
    let (name, age) = convert::<(String, i64)>(val).unwrap();
    assert_eq!(name, "Alice");
    assert_eq!(age, 30);

    let err = convert::<(String, i64)>(Value::from(vec![1])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_entities_pass_through() {
    let node = Node::new(7, ["Movie"], [("title", Value::from("Heat"))]);
    assert_eq!(convert::<Node>(Value::Node(node.clone())).unwrap(), node);

    let rel = Relationship::new(3, 1, 2, "ACTED_IN", Vec::<(&str, Value)>::new());
    assert_eq!(convert::<Relationship>(Value::Relationship(rel.clone())).unwrap(), rel);

    assert_eq!(convert::<Value>(Value::Integer(5)).unwrap(), Value::Integer(5));
}

#[test]
fn test_temporal_values() {
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(convert::<chrono::NaiveDate>(Value::Date(date)).unwrap(), date);
    assert_eq!(convert::<chrono::NaiveDate>(Value::from("2024-03-01")).unwrap(), date);

    let dt = chrono::DateTime::parse_from_rfc3339("2024-03-01T10:00:00+02:00").unwrap();
    assert_eq!(convert::<chrono::DateTime<chrono::FixedOffset>>(Value::DateTime(dt)).unwrap(), dt);

    let d = std::time::Duration::from_secs(90);
    assert_eq!(convert::<std::time::Duration>(Value::Duration(d)).unwrap(), d);
}

#[test]
fn test_spatial_and_bytes() {
    let p = Point2D { sr_id: 7203, x: 1.0, y: 2.0 };
    assert_eq!(convert::<Point2D>(Value::Point2D(p.clone())).unwrap(), p);

    let bytes = convert::<ByteArray>(Value::Bytes(vec![1, 2, 3])).unwrap();
    assert_eq!(bytes.0, vec![1, 2, 3]);
}

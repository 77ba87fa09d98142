use pretty_assertions::assert_eq;

use super::*;

fn int(value: &Value) -> i64 {
    value
        .as_int()
        .unwrap_or_else(|| panic!("expected Int, got {}", value))
}

#[test]
fn test_prototype_write_through() {
    let a = Construct::object();
    a.set("x", Value::int(1), false);
    let b = Construct::with_prototype(ConstructKind::Object, Some(a.clone()));

    b.set("x", Value::int(2), true);
    assert_eq!(int(&a.get("x", false)), 2);
    assert_eq!(b.count(), 0);
    assert_eq!(int(&b.get("x", true)), 2);

    b.set("y", Value::int(3), false);
    assert!(b.has("y", false));
    assert!(!a.has("y", true));
}

#[test]
fn test_set_without_owner_writes_locally() {
    let a = Construct::object();
    let b = Construct::with_prototype(ConstructKind::Object, Some(a.clone()));
    b.set("z", Value::int(9), true);
    assert_eq!(b.keys(), vec!["z".to_string()]);
    assert_eq!(a.count(), 0);
}

#[test]
fn test_get_walks_chain_only_when_asked() {
    let a = Construct::object();
    a.set("x", Value::int(1), false);
    let b = Construct::with_prototype(ConstructKind::Object, Some(a));
    assert_eq!(int(&b.get("x", true)), 1);
    assert!(b.get("x", false).is_undefined());
    assert!(b.get("missing", true).is_undefined());
    assert!(b.has("x", true));
    assert!(!b.has("x", false));
}

#[test]
fn test_remove_is_local() {
    let a = Construct::object();
    a.set("x", Value::int(1), false);
    let b = Construct::with_prototype(ConstructKind::Object, Some(a.clone()));
    assert!(b.remove("x").is_none());
    assert!(a.remove("x").is_some());
    assert!(b.get("x", true).is_undefined());
}

#[test]
fn test_merge() {
    let target = Construct::object();
    target.set("a", Value::int(1), false);
    let source = Construct::object();
    source.set("a", Value::int(10), false);
    source.set("b", Value::int(20), false);

    target.merge(&source, false);
    assert_eq!(int(&target.get("a", false)), 1);
    assert_eq!(int(&target.get("b", false)), 20);

    target.merge(&source, true);
    assert_eq!(int(&target.get("a", false)), 10);
    assert!(target.prototype().is_none());
}

#[test]
fn test_prototype_cycles_are_rejected() {
    let a = Construct::object();
    let b = Construct::with_prototype(ConstructKind::Object, Some(a.clone()));
    assert_eq!(a.set_prototype(Some(b.clone())), Err(ValueError::PrototypeCycle));
    assert_eq!(a.set_prototype(Some(a.clone())), Err(ValueError::PrototypeCycle));
    assert!(a.prototype().is_none());
    assert_eq!(b.set_prototype(None), Ok(()));
}

#[test]
fn test_undefined_is_identity_compared() {
    assert_eq!(Value::UNDEFINED, Value::Undefined);
    assert_ne!(Value::int(1), Value::int(1));
    let one = Value::int(1);
    assert_eq!(one.clone(), one);
    assert_ne!(one, Value::UNDEFINED);
}

#[test]
fn test_stringification() {
    assert_eq!(Value::UNDEFINED.to_string(), "undefined");
    assert_eq!(Value::int(-42).to_string(), "-42");
    assert_eq!(Value::float(2.0).to_string(), "2.0");
    assert_eq!(Value::float(0.5).to_string(), "0.5");
    assert_eq!(Value::bool(true).to_string(), "true");
    assert_eq!(Value::string("it's").to_string(), r"'it\'s'");
    assert_eq!(
        Value::tuple(vec![Value::int(1), Value::string("a")]).to_string(),
        "(1,'a')"
    );
    assert_eq!(
        Value::list(vec![Value::int(1), Value::list(vec![])]).to_string(),
        "[1,[]]"
    );
    assert_eq!(
        Value::array(vec![Value::int(1), Value::int(2)]).to_string(),
        "[|1,2|]"
    );

    let object = Construct::object();
    object.set("b", Value::int(2), false);
    object.set("a", Value::int(1), false);
    assert_eq!(object.to_string(), "{a:1,b:2}");
}

#[test]
fn test_keyed_tuple_stringification() {
    let tuple = Value::tuple(vec![Value::int(1)]);
    let construct = tuple.construct().unwrap();
    construct.set("k", Value::int(2), false);
    assert_eq!(tuple.to_string(), "(1,k:2)");
}

#[test]
fn test_self_containing_list_renders() {
    let list = Value::list(vec![Value::int(1)]);
    let construct = list.construct().unwrap();
    construct.push(list.clone()).unwrap();
    assert_eq!(list.to_string(), "[1,...]");
    // Break the cycle so the test does not leak.
    construct.set_index(1, Value::UNDEFINED).unwrap();
}

#[test]
fn test_element_access() {
    let list = Value::list(vec![Value::int(1), Value::int(2)]);
    let construct = list.construct().unwrap();
    assert_eq!(construct.len(), Some(2));
    assert_eq!(int(&construct.index(0)), 1);
    assert_eq!(int(&construct.index(-1)), 2);
    assert!(construct.index(5).is_undefined());

    construct.set_index(0, Value::int(7)).unwrap();
    construct.push(Value::int(3)).unwrap();
    assert_eq!(list.to_string(), "[7,2,3]");
    assert_eq!(
        construct.set_index(9, Value::int(0)),
        Err(ValueError::IndexOutOfBounds { index: 9, len: 3 })
    );
}

#[test]
fn test_fixed_sequences() {
    let tuple = Value::tuple(vec![Value::int(1)]);
    let array = Value::array(vec![Value::int(1)]);
    assert_eq!(
        tuple.construct().unwrap().set_index(0, Value::int(2)),
        Err(ValueError::Immutable { type_name: "Tuple" })
    );
    assert_eq!(
        array.construct().unwrap().push(Value::int(2)),
        Err(ValueError::Immutable { type_name: "Array" })
    );
    assert!(array.construct().unwrap().set_index(0, Value::int(2)).is_ok());
    assert_eq!(
        Value::int(1).construct().unwrap().push(Value::int(2)),
        Err(ValueError::NotIndexable { type_name: "Int" })
    );
}

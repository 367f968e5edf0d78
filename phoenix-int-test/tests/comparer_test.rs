use chrono::{DateTime, FixedOffset, Utc};
use phoenix::comparer::{compare, descriptor_of, CompareResult, Inspect, Value, ValueKind};
use phoenix_derive::Comparable;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[derive(Clone, Copy, Debug, PartialEq, Comparable)]
pub enum TestEnum {
    Val1,
    Val2,
}

#[derive(Clone, Debug, Comparable)]
pub struct TestClass2 {
    guid: Uuid,
    date_offset: DateTime<FixedOffset>,
}

#[derive(Clone, Debug, Comparable)]
pub struct TestClass1 {
    date: DateTime<Utc>,
    int: i32,
    char: char,
    string: String,
    my_enum: TestEnum,
    guid: Uuid,
    test2: Option<TestClass2>,
    array: Vec<TestClass2>,
    list: VecDeque<TestClass2>,
    dictionary: HashMap<String, TestClass2>,
    collection: Option<Vec<TestClass2>>,
}

fn test_class2() -> TestClass2 {
    TestClass2 {
        guid: Uuid::nil(),
        date_offset: DateTime::<Utc>::MIN_UTC.fixed_offset(),
    }
}

fn create_instance() -> TestClass1 {
    TestClass1 {
        date: DateTime::<Utc>::MIN_UTC,
        int: 1,
        char: 'a',
        string: "String1".to_string(),
        my_enum: TestEnum::Val1,
        guid: Uuid::nil(),
        test2: Some(test_class2()),
        array: vec![test_class2()],
        list: VecDeque::from(vec![test_class2()]),
        dictionary: HashMap::from([("Test".to_string(), test_class2())]),
        collection: Some(vec![test_class2()]),
    }
}

fn single(results: Vec<CompareResult>) -> CompareResult {
    assert_eq!(results.len(), 1, "expected a single entry, got {:?}", results);
    results.into_iter().next().unwrap()
}

#[test]
fn test_no_difference() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    assert!(compare(Some(&obj1), Some(&obj2)).is_empty());

    obj2.char = 'z';
    assert_eq!(compare(Some(&obj1), Some(&obj2)).len(), 1);
}

#[test]
fn test_same_instance() {
    let obj1 = create_instance();
    assert!(compare(Some(&obj1), Some(&obj1)).is_empty());
}

#[test]
fn test_char_difference() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.char = 'z';

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "char");
    assert_eq!(result.old_value(), &Value::Char('a'));
    assert_eq!(result.new_value(), &Value::Char('z'));
}

#[test]
fn test_string_difference() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.string = "Test New Value".to_string();

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "string");
    assert_eq!(result.old_value(), &Value::from("String1"));
    assert_eq!(result.new_value(), &Value::from("Test New Value"));
}

#[test]
fn test_enum_difference() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.my_enum = TestEnum::Val2;

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "my_enum");
    assert_eq!(result.old_value(), &Value::Enum("Val1".to_string()));
    assert_eq!(result.new_value(), &Value::Enum("Val2".to_string()));
}

#[test]
fn test_array_difference() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.array = vec![];

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "array");
    assert_eq!(result.old_value(), &obj1.array.to_value());
    assert_eq!(result.new_value(), &Value::Array(vec![]));
}

#[test]
fn test_list_difference() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.list = VecDeque::new();

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "list");
    assert_eq!(result.old_value(), &obj1.list.to_value());
    assert_eq!(result.new_value(), &obj2.list.to_value());
}

#[test]
fn test_dictionary_difference() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.dictionary = HashMap::new();

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "dictionary");
    assert_eq!(result.old_value(), &obj1.dictionary.to_value());
    assert_eq!(result.new_value(), &Value::Map(vec![]));
}

#[test]
fn test_collection_difference() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.collection = Some(vec![]);

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "collection");

    obj2.collection = None;
    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "collection");
    assert!(result.new_value().is_null());
}

#[test]
fn test_change_inside_collection_is_reported_on_collection() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.list[0].guid = Uuid::new_v4();

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "list");
}

#[test]
fn test_collection_order_is_significant() {
    let mut obj1 = create_instance();
    let mut second = test_class2();
    second.guid = Uuid::new_v4();
    obj1.array.push(second);

    let mut obj2 = obj1.clone();
    obj2.array.reverse();

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "array");
}

#[test]
fn test_dictionary_insertion_order_is_not_significant() {
    let mut obj1 = create_instance();
    let mut obj2 = create_instance();
    for i in 0..16 {
        obj1.dictionary.insert(format!("key{}", i), test_class2());
    }
    for i in (0..16).rev() {
        obj2.dictionary.insert(format!("key{}", i), test_class2());
    }
    assert!(compare(Some(&obj1), Some(&obj2)).is_empty());
}

#[test]
fn test_sub_object() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    let guid = Uuid::new_v4();
    if let Some(test2) = obj2.test2.as_mut() {
        test2.guid = guid;
    }

    let result = single(compare(Some(&obj1), Some(&obj2)));
    assert_eq!(result.property_name(), "test2.guid");
    assert_eq!(result.old_value(), &Value::Uuid(Uuid::nil()));
    assert_eq!(result.new_value(), &Value::Uuid(guid));
}

#[test]
fn test_sub_object_with_null() {
    let obj1 = create_instance();
    let mut obj2 = create_instance();
    obj2.test2 = None;

    let results = compare(Some(&obj1), Some(&obj2));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].property_name(), "test2.guid");
    assert_eq!(results[0].old_value(), &Value::Uuid(Uuid::nil()));
    assert!(results[0].new_value().is_null());
    assert_eq!(results[1].property_name(), "test2.date_offset");

    let reversed = compare(Some(&obj2), Some(&obj1));
    assert_eq!(reversed.len(), 2);
    assert_eq!(reversed[0].property_name(), "test2.guid");
    assert_eq!(reversed[0].new_value(), &Value::Uuid(Uuid::nil()));
    assert!(reversed[0].old_value().is_null());
}

#[test]
fn test_null_root() {
    let obj1 = create_instance();
    let results = compare(None, Some(&obj1));
    let names: Vec<&str> = results.iter().map(|it| it.property_name()).collect();
    assert_eq!(
        names,
        vec![
            "date",
            "int",
            "char",
            "string",
            "my_enum",
            "guid",
            "test2.guid",
            "test2.date_offset",
            "array",
            "list",
            "dictionary",
            "collection",
        ]
    );
    assert!(results.iter().all(|it| it.old_value().is_null()));
    assert!(compare::<TestClass1>(None, None).is_empty());
}

#[derive(Clone, Comparable)]
pub struct AuditedRecord {
    name: String,
    #[compare(ignore)]
    modified_at: DateTime<Utc>,
    #[compare(rename = "Owner")]
    owner: Option<Owner>,
}

#[derive(Clone, Comparable)]
pub struct Owner {
    #[compare(rename = "DisplayName")]
    display_name: String,
    #[compare(ignore)]
    session: Uuid,
}

fn audited_record() -> AuditedRecord {
    AuditedRecord {
        name: "report".to_string(),
        modified_at: DateTime::<Utc>::MIN_UTC,
        owner: Some(Owner {
            display_name: "Ann".to_string(),
            session: Uuid::nil(),
        }),
    }
}

#[test]
fn test_ignored_properties() {
    let record1 = audited_record();
    let mut record2 = audited_record();
    record2.modified_at = Utc::now();
    if let Some(owner) = record2.owner.as_mut() {
        owner.session = Uuid::new_v4();
    }
    assert!(compare(Some(&record1), Some(&record2)).is_empty());

    let descriptor = descriptor_of::<AuditedRecord>();
    let modified_at = descriptor.property("modified_at").unwrap();
    assert!(modified_at.is_ignored());
    assert_eq!(modified_at.kind(), ValueKind::Opaque);
}

#[test]
fn test_ignored_properties_skipped_against_null() {
    let record = audited_record();
    let results = compare(Some(&record), None);
    let names: Vec<&str> = results.iter().map(|it| it.property_name()).collect();
    assert_eq!(names, vec!["name", "Owner.DisplayName"]);
}

#[test]
fn test_renamed_properties() {
    let record1 = audited_record();
    let mut record2 = audited_record();
    if let Some(owner) = record2.owner.as_mut() {
        owner.display_name = "Bob".to_string();
    }
    let result = single(compare(Some(&record1), Some(&record2)));
    assert_eq!(result.property_name(), "Owner.DisplayName");
    assert_eq!(result.to_string(), "Owner.DisplayName: Ann -> Bob");
}

#[test]
fn test_enum_value_kind() {
    assert_eq!(TestEnum::value_kind(), ValueKind::Enum);
    assert_eq!(TestClass1::value_kind(), ValueKind::ComplexObject);
    assert_eq!(TestEnum::Val2.to_value(), Value::Enum("Val2".to_string()));
}

#[test]
fn test_descriptor_lists_properties_in_declaration_order() {
    let descriptor = descriptor_of::<TestClass2>();
    let names: Vec<&str> = descriptor.properties().iter().map(|it| it.name()).collect();
    assert_eq!(names, vec!["guid", "date_offset"]);
    assert!(std::ptr::eq(descriptor, descriptor_of::<TestClass2>()));

    let test2 = descriptor_of::<TestClass1>().property("test2").unwrap();
    assert_eq!(test2.kind(), ValueKind::ComplexObject);
    assert!(test2
        .nested_descriptor()
        .is_some_and(|nested| std::ptr::eq(nested, descriptor)));
}

#[derive(Clone, Comparable)]
pub struct Envelope<T> {
    label: String,
    payload: T,
}

#[test]
fn test_generic_struct() {
    let a = Envelope {
        label: "x".to_string(),
        payload: test_class2(),
    };
    let mut b = a.clone();
    b.payload.guid = Uuid::new_v4();

    let result = single(compare(Some(&a), Some(&b)));
    assert_eq!(result.property_name(), "payload.guid");

    let numbers = Envelope {
        label: "n".to_string(),
        payload: vec![1, 2],
    };
    let mut reordered = numbers.clone();
    reordered.payload.reverse();
    assert_eq!(single(compare(Some(&numbers), Some(&reordered))).property_name(), "payload");
}

#[derive(Clone, Comparable)]
pub struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

#[test]
fn test_recursive_type() {
    let short = Node {
        value: 1,
        next: None,
    };
    let long = Node {
        value: 1,
        next: Some(Box::new(Node {
            value: 2,
            next: Some(Box::new(Node {
                value: 3,
                next: None,
            })),
        })),
    };

    let results = compare(Some(&short), Some(&long));
    let names: Vec<&str> = results.iter().map(|it| it.property_name()).collect();
    assert_eq!(names, vec!["next.value", "next.next.value"]);
}

use hashstores::{ChainingStore, KeyValueStore, ProbingStore, StoreError};
use std::sync::Once;

static INIT: Once = Once::new();

fn init_test_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().filter_level(log::LevelFilter::Trace).is_test(true).try_init();
    });
}

/// Exercises the shared contract the same way for any store
fn exercise_contract<S>(store: &mut S) -> Result<(), StoreError>
where
    S: KeyValueStore<String, i32>,
{
    assert!(store.is_empty());
    assert_eq!(store.insert("apple".to_string(), 99)?, None);
    assert_eq!(store.insert("apple".to_string(), 1)?, Some(99));
    assert_eq!(store.get("apple"), Some(&1));
    assert_eq!(store.len(), 1);

    assert_eq!(store.remove("pear"), None);
    assert_eq!(store.len(), 1);

    assert_eq!(*store.get_or_insert_default("berry".to_string())?, 0);
    *store.get_or_insert_default("berry".to_string())? += 3;
    assert_eq!(store.get("berry"), Some(&3));
    assert_eq!(store.len(), 2);

    assert_eq!(store.remove("apple"), Some(1));
    assert!(!store.contains_key("apple"));
    assert!(store.contains_key("berry"));
    Ok(())
}

#[test]
fn chaining_store_honors_contract() -> Result<(), StoreError> {
    init_test_logger();
    let mut store: ChainingStore<String, i32> = ChainingStore::with_buckets(53)?;
    exercise_contract(&mut store)
}

#[test]
fn probing_store_honors_contract() -> Result<(), StoreError> {
    init_test_logger();
    let mut store: ProbingStore<String, i32> = ProbingStore::with_capacity(10)?;
    exercise_contract(&mut store)
}

#[test]
fn fruit_table_replaces_value() -> Result<(), StoreError> {
    init_test_logger();
    let mut fruit = ChainingStore::with_buckets(53)?;
    fruit.insert("apple", 99);
    assert_eq!(fruit.get(&"apple"), Some(&99));

    fruit.insert("apple", 1);
    assert_eq!(fruit.get(&"apple"), Some(&1));
    assert_eq!(fruit.len(), 1);

    fruit.insert("banana", 2);
    fruit.insert("orange", 3);
    assert_eq!(fruit.get(&"berry"), None);
    assert_eq!(*fruit.get_or_insert_default("berry"), 0);
    assert_eq!(fruit.len(), 4);
    Ok(())
}

#[test]
fn grades_survive_neighbour_removal() -> Result<(), StoreError> {
    init_test_logger();
    let mut grades: ProbingStore<String, i32> = ProbingStore::with_capacity(10)?;
    grades.insert("Alice".to_string(), 90)?;
    grades.insert("Bob".to_string(), 85)?;

    assert!(grades.contains_key("Bob"));
    assert_eq!(grades.remove("Bob"), Some(85));
    assert!(!grades.contains_key("Bob"));
    assert_eq!(grades.get("Alice"), Some(&90));
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Person {
    name: String,
    age: u32,
}

#[test]
fn records_keyed_by_id() -> Result<(), StoreError> {
    init_test_logger();
    let mut people: ProbingStore<u32, Person> = ProbingStore::new();
    people.insert(1, Person { name: "Alice".to_string(), age: 30 })?;
    people.insert(2, Person { name: "Bob".to_string(), age: 25 })?;
    *people.get_or_insert_default(3)? = Person { name: "Charlie".to_string(), age: 22 };

    assert_eq!(people.get(&2).map(|person| person.age), Some(25));
    assert_eq!(people.get(&3).map(|person| person.name.as_str()), Some("Charlie"));
    assert!(people.contains_key(&1));

    let mut labels: ChainingStore<u32, String> = ChainingStore::with_buckets(8)?;
    labels.insert(1, "first".to_string());
    assert_eq!(labels.get(&1).map(String::as_str), Some("first"));
    assert_eq!(labels.get_or_insert_default(2).as_str(), "");
    Ok(())
}

#[test]
fn deleted_slot_keeps_collided_key_reachable() -> Result<(), StoreError> {
    init_test_logger();
    let mut store: ProbingStore<u16, &str> = ProbingStore::with_capacity(7)?;
    let home = store.home_index(&5_u16);
    // Find a second key sharing the home slot of 5.
    let other = (6..u16::MAX).find(|key| store.home_index(key) == home).unwrap_or_default();
    assert_ne!(other, 0, "some key must share the home slot of 5");

    store.insert(5, "a")?;
    store.insert(other, "b")?;
    assert_eq!(store.probe_length(&other), Some(2));

    store.remove(&5);
    assert_eq!(store.get(&other), Some(&"b"));
    assert_eq!(store.tombstones(), 1);
    Ok(())
}

#[test]
fn full_probing_store_terminates() -> Result<(), StoreError> {
    init_test_logger();
    let mut store = ProbingStore::with_capacity(2)?;
    store.insert("x".to_string(), 1)?;
    store.insert("y".to_string(), 2)?;

    let error = store.insert("z".to_string(), 3).err();
    assert_eq!(error, Some(StoreError::TableFull { capacity: 2 }));
    assert!(error.is_some_and(|error| error.is_recoverable()));
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("z"), None);
    Ok(())
}

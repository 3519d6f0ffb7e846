use kvstash::{persisted, MemoryStore, Numeric, Observable, Store, Value};

use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

#[persisted]
struct Counters {
    #[default(0)]
    hits: i64,

    #[default(0)]
    misses: i64,
}

fn sink() -> (Arc<Mutex<Vec<String>>>, impl FnOnce(&str) + Send + 'static) {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let observed = fired.clone();
    (fired, move |key: &str| {
        observed.lock().unwrap().push(key.to_string())
    })
}

#[test]
fn tracked_reads_fire_once_on_the_next_set() {
    let store = Arc::new(MemoryStore::new());
    let counters = Counters::with_store(store.clone());
    let (fired, on_change) = sink();

    counters.registrar().tracking(|| counters.hits(), on_change);

    counters.set_hits(1);
    counters.set_hits(2);

    assert_eq!(*fired.lock().unwrap(), vec!["hits".to_string()]);
}

#[test]
fn mutating_an_untracked_field_does_not_fire() {
    let store = Arc::new(MemoryStore::new());
    let counters = Counters::with_store(store.clone());
    let (fired, on_change) = sink();

    counters.registrar().tracking(|| counters.hits(), on_change);
    counters.set_misses(1);

    assert!(fired.lock().unwrap().is_empty());
}

#[test]
fn external_changes_count_as_mutations() {
    let store = Arc::new(MemoryStore::new());
    let counters = Counters::with_store(store.clone());
    let (fired, on_change) = sink();

    counters.registrar().tracking(|| counters.hits(), on_change);

    store.write("hits", Value::Numeric(Numeric::Int(5)));
    store.notify_external_change(&["hits".to_string()]);

    assert_eq!(*fired.lock().unwrap(), vec!["hits".to_string()]);
    assert_eq!(counters.hits(), 5);
}

#[test]
fn tracking_covers_every_field_read_in_the_scope() {
    let store = Arc::new(MemoryStore::new());
    let counters = Counters::with_store(store.clone());
    let (fired, on_change) = sink();

    counters.registrar().tracking(
        || {
            counters.hits();
            counters.misses();
        },
        on_change,
    );

    counters.set_misses(1);
    assert_eq!(*fired.lock().unwrap(), vec!["misses".to_string()]);
}

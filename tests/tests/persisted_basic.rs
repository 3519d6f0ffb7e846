use kvstash::store::ExternalChangeObserver;
use kvstash::{persisted, MemoryStore, Numeric, Store, Subscription, Value};

use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

#[persisted]
struct Settings {
    #[default(String::from("eel"))]
    name: String,

    #[default(0)]
    count: i64,

    #[default(0.0)]
    score: f64,

    #[default(Some(Vec::new()))]
    blob: Option<Vec<u8>>,

    #[ignored]
    session_flag: bool,
}

#[test]
fn defaults_load_from_an_empty_store() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::with_store(store.clone());

    assert_eq!(settings.name(), "eel");
    assert_eq!(settings.count(), 0);
    assert_eq!(settings.score(), 0.0);
    assert_eq!(settings.blob(), Some(vec![]));
    assert!(!settings.session_flag);

    // Defaults are in-memory only until a setter runs.
    assert_eq!(store.value("name"), None);
    assert_eq!(store.value("count"), None);
}

#[test]
fn setters_write_through_to_the_store() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::with_store(store.clone());

    settings.set_name("moray".to_string());
    settings.set_count(7);
    settings.set_score(1.5);

    assert_eq!(settings.name(), "moray");
    assert_eq!(store.value("name"), Some(Value::Text("moray".into())));
    assert_eq!(store.value("count"), Some(Value::Numeric(Numeric::Int(7))));
    assert_eq!(store.value("score"), Some(Value::Numeric(Numeric::Float(1.5))));
}

#[test]
fn persisted_values_survive_into_a_fresh_instance() {
    let store = Arc::new(MemoryStore::new());

    let first = Settings::with_store(store.clone());
    first.set_name("moray".to_string());
    first.set_count(7);
    drop(first);

    let second = Settings::with_store(store.clone());
    assert_eq!(second.name(), "moray");
    assert_eq!(second.count(), 7);
    assert_eq!(second.score(), 0.0);
}

#[test]
fn external_changes_reload_known_keys() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::with_store(store.clone());

    store.write("count", Value::Numeric(Numeric::Int(42)));
    assert_eq!(settings.count(), 0);

    store.notify_external_change(&["count".to_string()]);
    assert_eq!(settings.count(), 42);
}

#[test]
fn unknown_keys_in_an_external_change_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::with_store(store.clone());

    settings.set_count(7);
    store.notify_external_change(&["bogus".to_string(), "session_flag".to_string()]);

    assert_eq!(settings.count(), 7);
}

#[test]
fn external_change_with_a_missing_value_resets_to_the_default() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::with_store(store.clone());

    settings.set_name("moray".to_string());
    store.remove("name");
    store.notify_external_change(&["name".to_string()]);

    assert_eq!(settings.name(), "eel");
}

#[test]
fn external_change_with_a_mismatched_kind_resets_to_the_default() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::with_store(store.clone());

    settings.set_count(7);
    store.write("count", Value::Text("not a number".into()));
    store.notify_external_change(&["count".to_string()]);

    assert_eq!(settings.count(), 0);
}

/// Store wrapper logging every typed read, so a test can count reloads per
/// key and observe their order.
struct RecordingStore {
    inner: MemoryStore,
    reads: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            reads: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, key: &str) {
        self.reads.lock().unwrap().push(key.to_string());
    }

    fn take_reads(&self) -> Vec<String> {
        std::mem::take(&mut *self.reads.lock().unwrap())
    }
}

impl Store for RecordingStore {
    fn string(&self, key: &str) -> Option<String> {
        self.record(key);
        self.inner.string(key)
    }

    fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.record(key);
        self.inner.bytes(key)
    }

    fn numeric(&self, key: &str) -> Option<Numeric> {
        self.record(key);
        self.inner.numeric(key)
    }

    fn write(&self, key: &str, value: Value) {
        self.inner.write(key, value);
    }

    fn remove(&self, key: &str) {
        self.inner.remove(key);
    }

    fn subscribe(&self, observer: ExternalChangeObserver) -> Subscription {
        self.inner.subscribe(observer)
    }
}

#[test]
fn multi_key_notifications_reload_each_key_once_in_order() {
    let store = Arc::new(RecordingStore::new());
    let settings = Settings::with_store(store.clone());
    store.take_reads();

    store.write("count", Value::Numeric(Numeric::Int(42)));
    store.write("name", Value::Text("moray".into()));

    store
        .inner
        .notify_external_change(&["name".to_string(), "count".to_string()]);

    assert_eq!(store.take_reads(), vec!["name".to_string(), "count".to_string()]);
    assert_eq!(settings.name(), "moray");
    assert_eq!(settings.count(), 42);

    // Delivering the same key list again reloads once per key and changes
    // nothing.
    store
        .inner
        .notify_external_change(&["name".to_string(), "count".to_string()]);

    assert_eq!(store.take_reads(), vec!["name".to_string(), "count".to_string()]);
    assert_eq!(settings.name(), "moray");
    assert_eq!(settings.count(), 42);
}

#[test]
fn notifications_after_the_instance_is_dropped_are_inert() {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::with_store(store.clone());
    drop(settings);

    store.write("count", Value::Numeric(Numeric::Int(42)));
    store.notify_external_change(&["count".to_string()]);
}

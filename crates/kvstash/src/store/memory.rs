use super::{ExternalChangeObserver, Numeric, Store, Subscription, Value};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// In-process [`Store`] backed by a hash map.
///
/// Doubles as the fallback default store and as the test double for the
/// out-of-process store the generated code normally runs against:
/// [`MemoryStore::notify_external_change`] simulates the external-change
/// channel. Local `write`s never fire that channel; external changes are its
/// only event source, matching the store this models.
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, Value>,
    observers: HashMap<u64, Arc<ExternalChangeObserver>>,
    next_observer_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// The raw stored value under `key`, regardless of kind.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.inner.lock().unwrap().values.get(key).cloned()
    }

    /// Delivers an external-change notification for `keys` to every
    /// subscriber. The inner lock is released before observers run, so
    /// observers may freely read and write the store.
    pub fn notify_external_change(&self, keys: &[String]) {
        let observers: Vec<_> = {
            let inner = self.inner.lock().unwrap();
            inner.observers.values().cloned().collect()
        };

        for observer in observers {
            observer(keys);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn string(&self, key: &str) -> Option<String> {
        match self.inner.lock().unwrap().values.get(key) {
            Some(Value::Text(v)) => Some(v.clone()),
            _ => None,
        }
    }

    fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.inner.lock().unwrap().values.get(key) {
            Some(Value::Bytes(v)) => Some(v.clone()),
            _ => None,
        }
    }

    fn numeric(&self, key: &str) -> Option<Numeric> {
        match self.inner.lock().unwrap().values.get(key) {
            Some(Value::Numeric(v)) => Some(*v),
            _ => None,
        }
    }

    fn write(&self, key: &str, value: Value) {
        self.inner.lock().unwrap().values.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.inner.lock().unwrap().values.remove(key);
    }

    fn subscribe(&self, observer: ExternalChangeObserver) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.next_observer_id;
            inner.next_observer_id += 1;
            inner.observers.insert(id, Arc::new(observer));
            id
        };

        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().unwrap().observers.remove(&id);
            }
        })
    }
}

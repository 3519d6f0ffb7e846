mod memory;
pub use memory::MemoryStore;

use std::fmt;

/// A value as the persistence layer stores it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
    Numeric(Numeric),
}

/// The numeric-object representation shared by integer, floating-point, and
/// boolean values. Narrowing is lenient across the three representations;
/// only non-numeric stored values read back as absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Numeric {
    pub fn as_int(self) -> i64 {
        match self {
            Numeric::Int(v) => v,
            Numeric::Float(v) => v as i64,
            Numeric::Bool(v) => v as i64,
        }
    }

    pub fn as_float(self) -> f64 {
        match self {
            Numeric::Int(v) => v as f64,
            Numeric::Float(v) => v,
            Numeric::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn as_bool(self) -> bool {
        match self {
            Numeric::Int(v) => v != 0,
            Numeric::Float(v) => v != 0.0,
            Numeric::Bool(v) => v,
        }
    }
}

/// Callback fired when keys change in the backing store from outside the
/// current process. Receives the changed keys; may run on any thread.
pub type ExternalChangeObserver = Box<dyn Fn(&[String]) + Send + Sync>;

/// The key-value persistence layer generated settings types read and write
/// through. Implementations serialize their own access internally; callers
/// perform no additional locking.
pub trait Store: Send + Sync {
    /// Text value under `key`, absent if unset or stored as another kind.
    fn string(&self, key: &str) -> Option<String>;

    /// Byte-buffer value under `key`, absent if unset or another kind.
    fn bytes(&self, key: &str) -> Option<Vec<u8>>;

    /// Numeric value under `key`, absent if unset or non-numeric.
    fn numeric(&self, key: &str) -> Option<Numeric>;

    fn write(&self, key: &str, value: Value);

    fn remove(&self, key: &str);

    /// Registers `observer` on the external-change channel. The returned
    /// subscription cancels on drop.
    fn subscribe(&self, observer: ExternalChangeObserver) -> Subscription;
}

/// Handle for a registered external-change observer. Dropping it (or calling
/// [`Subscription::cancel`]) unregisters the observer.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

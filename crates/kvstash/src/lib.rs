mod observe;
pub use observe::{Observable, ObservationRegistrar};

mod raw;
pub use raw::RawRepr;

pub mod store;
pub use store::{MemoryStore, Numeric, Store, Subscription, Value};

pub use kvstash_macros::persisted;

pub use anyhow::{Error, Result};

use std::sync::{Arc, OnceLock};

/// Reserved text value stored under a key to represent "explicitly nil" for
/// optional fields whose declared default is non-nil. The store has no
/// first-class nil, so this stands in for it.
///
/// A legitimate string value equal to the sentinel is indistinguishable from
/// an explicit nil. Callers that cannot rule such values out should not rely
/// on optional text fields with non-nil defaults.
pub const NIL_SENTINEL: &str = "$__kvstash_nil";

static DEFAULT_STORE: OnceLock<Arc<dyn Store>> = OnceLock::new();

/// Installs the process-wide store that `shared()` instances are built
/// against. Must be called before the first `shared()` access; fails if a
/// default store is already in place.
pub fn set_default_store(store: Arc<dyn Store>) -> Result<()> {
    DEFAULT_STORE
        .set(store)
        .map_err(|_| anyhow::anyhow!("default store is already initialized"))
}

/// The process-wide store. Falls back to an in-memory store when none has
/// been installed.
pub fn default_store() -> Arc<dyn Store> {
    DEFAULT_STORE
        .get_or_init(|| Arc::new(MemoryStore::new()))
        .clone()
}

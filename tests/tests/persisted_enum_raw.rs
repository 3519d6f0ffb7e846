use kvstash::{persisted, MemoryStore, Numeric, Store, Value};
use tests::Theme;

use pretty_assertions::assert_eq;
use std::sync::Arc;

#[persisted]
struct Appearance {
    #[tracked(enum_with_raw_value = i64)]
    #[default(Theme::System)]
    theme: Theme,

    #[tracked(enum_with_raw_value = i64)]
    #[default(None)]
    accent: Option<Theme>,
}

#[test]
fn enums_persist_by_raw_value() {
    let store = Arc::new(MemoryStore::new());
    let appearance = Appearance::with_store(store.clone());
    assert_eq!(appearance.theme(), Theme::System);

    appearance.set_theme(Theme::Dark);
    assert_eq!(appearance.theme(), Theme::Dark);
    assert_eq!(store.value("theme"), Some(Value::Numeric(Numeric::Int(2))));

    drop(appearance);
    let appearance = Appearance::with_store(store.clone());
    assert_eq!(appearance.theme(), Theme::Dark);
}

#[test]
fn unknown_raw_values_read_as_the_default() {
    let store = Arc::new(MemoryStore::new());
    store.write("theme", Value::Numeric(Numeric::Int(99)));

    let appearance = Appearance::with_store(store.clone());
    assert_eq!(appearance.theme(), Theme::System);
}

#[test]
fn optional_enums_round_trip_and_remove_on_nil() {
    let store = Arc::new(MemoryStore::new());
    let appearance = Appearance::with_store(store.clone());
    assert_eq!(appearance.accent(), None);

    appearance.set_accent(Some(Theme::Light));
    assert_eq!(appearance.accent(), Some(Theme::Light));
    assert_eq!(store.value("accent"), Some(Value::Numeric(Numeric::Int(1))));

    appearance.set_accent(None);
    assert_eq!(appearance.accent(), None);
    assert_eq!(store.value("accent"), None);
}

#[test]
fn unknown_raw_values_in_an_optional_read_as_nil() {
    let store = Arc::new(MemoryStore::new());
    store.write("accent", Value::Numeric(Numeric::Int(99)));

    let appearance = Appearance::with_store(store.clone());
    assert_eq!(appearance.accent(), None);
}

#[test]
fn external_changes_reload_mapped_fields() {
    let store = Arc::new(MemoryStore::new());
    let appearance = Appearance::with_store(store.clone());

    store.write("theme", Value::Numeric(Numeric::Int(1)));
    store.notify_external_change(&["theme".to_string()]);

    assert_eq!(appearance.theme(), Theme::Light);
}

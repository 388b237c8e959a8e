#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use serde_json::json;

use super::*;
use crate::models::Category;
use crate::storage::testing::{MemoryKv, MemoryTable};
use crate::storage::{LocalBackend, RemoteBackend};

fn form(title: &str, amount: &str, category: &str, date: &str) -> ExpenseForm {
    ExpenseForm::parse(title, amount, category, date, "").unwrap()
}

fn local_store(kv: &MemoryKv) -> ExpenseStore {
    let mut store = ExpenseStore::new(Box::new(LocalBackend::new(kv.clone())));
    assert!(store.load());
    store
}

fn remote_store(table: &MemoryTable, owner: &str) -> ExpenseStore {
    let mut store = ExpenseStore::new(Box::new(RemoteBackend::new(table.clone(), owner)));
    assert!(store.load());
    store
}

fn reload_local(kv: &MemoryKv) -> Vec<Expense> {
    let mut backend = LocalBackend::new(kv.clone());
    backend.load().unwrap()
}

fn levels(store: &mut ExpenseStore) -> Vec<(NoticeLevel, MessageKey)> {
    store
        .take_notices()
        .into_iter()
        .map(|n| (n.level, n.message))
        .collect()
}

// ── Loading ──────────────────────────────────────────────────

#[test]
fn test_new_store_is_loading_until_first_load() {
    let store = ExpenseStore::new(Box::new(LocalBackend::new(MemoryKv::default())));
    assert!(store.is_loading());
    assert!(store.expenses().is_empty());

    let store = local_store(&MemoryKv::default());
    assert!(!store.is_loading());
}

#[test]
fn test_load_failure_keeps_list_and_raises_error() {
    let table = MemoryTable::default();
    let mut store = remote_store(&table, "u1");
    store.add(form("Lunch", "12", "food", "2024-02-01")).unwrap();
    store.take_notices();

    table.fail(true);
    assert!(!store.load());
    assert_eq!(store.expenses().len(), 1);
    assert!(!store.is_loading());
    assert_eq!(levels(&mut store), vec![(NoticeLevel::Error, MessageKey::Error)]);
}

#[test]
fn test_malformed_local_blob_loads_empty() {
    let kv = MemoryKv::with_entry("expense-tracker-expenses", "{not json");
    let mut store = local_store(&kv);
    assert!(store.expenses().is_empty());
    assert!(store.take_notices().is_empty());
}

// ── Add ──────────────────────────────────────────────────────

#[test]
fn test_add_then_load_yields_one_matching_record() {
    let kv = MemoryKv::default();
    let mut store = local_store(&kv);
    let input = form("Groceries", "42.50", "food", "2024-03-05");

    let added = store.add(input.clone()).unwrap().clone();
    assert!(!added.id.is_empty());
    assert_eq!(added.created_at, added.updated_at);

    let stored = reload_local(&kv);
    assert_eq!(stored.len(), 1);
    assert_eq!(ExpenseForm::from(&stored[0]), input);
    assert_eq!(stored[0].id, added.id);
    assert_eq!(stored[0].amount, dec!(42.50));
}

#[test]
fn test_add_then_load_keeps_large_amounts_exact() {
    let kv = MemoryKv::default();
    let mut store = local_store(&kv);
    for amount in ["999999999999.99", "1234567890.12", "0.01", "19.99"] {
        let input = form("Big", amount, "bills", "2024-03-05");
        let id = store.add(input.clone()).unwrap().id.clone();

        let stored = reload_local(&kv);
        let loaded = stored.iter().find(|e| e.id == id).unwrap();
        assert_eq!(ExpenseForm::from(loaded), input, "amount {amount}");
        assert_eq!(store.get(&id).unwrap().amount, loaded.amount);
    }
}

#[test]
fn test_aggregates_over_stored_amounts_do_not_panic() {
    let kv = MemoryKv::default();
    let mut store = local_store(&kv);
    for _ in 0..3 {
        store.add(form("Big", "999999999999.99", "food", "2024-03-05"));
    }
    let mut reloaded = local_store(&kv);
    assert!(reloaded.load());
    let totals = crate::stats::category_totals(reloaded.expenses());
    assert_eq!(totals[0].amount, dec!(2999999999999.97));
}

#[test]
fn test_add_prepends_and_notifies() {
    let mut store = local_store(&MemoryKv::default());
    store.add(form("First", "1", "food", "2024-01-01")).unwrap();
    store.add(form("Second", "2", "bills", "2023-01-01")).unwrap();

    let titles: Vec<&str> = store.expenses().iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);
    assert_eq!(
        levels(&mut store),
        vec![
            (NoticeLevel::Success, MessageKey::ExpenseAdded),
            (NoticeLevel::Success, MessageKey::ExpenseAdded),
        ]
    );
}

#[test]
fn test_add_assigns_distinct_ids() {
    let mut store = local_store(&MemoryKv::default());
    let a = store.add(form("A", "1", "food", "2024-01-01")).unwrap().id.clone();
    let b = store.add(form("A", "1", "food", "2024-01-01")).unwrap().id.clone();
    assert_ne!(a, b);
}

#[test]
fn test_add_failure_leaves_list_untouched() {
    let kv = MemoryKv::default();
    let mut store = local_store(&kv);
    store.add(form("Kept", "5", "other", "2024-01-01")).unwrap();
    store.take_notices();

    kv.fail_writes(true);
    assert!(store.add(form("Lost", "6", "other", "2024-01-02")).is_none());
    assert_eq!(store.expenses().len(), 1);
    assert_eq!(store.expenses()[0].title, "Kept");
    assert_eq!(levels(&mut store), vec![(NoticeLevel::Error, MessageKey::Error)]);
}

#[test]
fn test_remote_add_writes_owner_scoped_row() {
    let table = MemoryTable::default();
    let mut store = remote_store(&table, "user-7");
    let id = store
        .add(form("Taxi", "18", "transport", "2024-04-02"))
        .unwrap()
        .id
        .clone();

    let rows = table.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(id));
    assert_eq!(rows[0]["user_id"], json!("user-7"));
    assert_eq!(store.backend_kind(), BackendKind::Remote);
}

#[test]
fn test_remote_add_failure_leaves_list_untouched() {
    let table = MemoryTable::default();
    let mut store = remote_store(&table, "u1");
    table.fail(true);
    assert!(store.add(form("Taxi", "18", "transport", "2024-04-02")).is_none());
    assert!(store.expenses().is_empty());
    table.fail(false);
    assert!(table.rows().is_empty());
}

// ── Update ───────────────────────────────────────────────────

#[test]
fn test_update_merges_form_and_keeps_identity() {
    let kv = MemoryKv::default();
    let mut store = local_store(&kv);
    let original = store
        .add(form("Coffee", "3", "food", "2024-01-10"))
        .unwrap()
        .clone();

    let change = form("Coffee beans", "14.99", "shopping", "2024-01-11");
    assert!(store.update(&original.id, &change));

    let updated = store.get(&original.id).unwrap();
    assert_eq!(updated.title, "Coffee beans");
    assert_eq!(updated.category, Category::Shopping);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at >= original.updated_at);
    assert_eq!(reload_local(&kv)[0].title, "Coffee beans");
}

#[test]
fn test_update_failure_leaves_record_unchanged() {
    let table = MemoryTable::default();
    let mut store = remote_store(&table, "u1");
    let before = store
        .add(form("Rent", "900", "bills", "2024-02-01"))
        .unwrap()
        .clone();
    store.take_notices();

    table.fail(true);
    let change = form("Rent (fixed)", "950", "bills", "2024-02-01");
    assert!(!store.update(&before.id, &change));

    assert_eq!(store.get(&before.id).unwrap(), &before);
    assert_eq!(
        serde_json::to_string(store.get(&before.id).unwrap()).unwrap(),
        serde_json::to_string(&before).unwrap()
    );
    assert_eq!(levels(&mut store), vec![(NoticeLevel::Error, MessageKey::Error)]);
}

#[test]
fn test_update_unknown_id_makes_no_backend_call() {
    let table = MemoryTable::default();
    let mut store = remote_store(&table, "u1");
    let requests = table.requests();

    assert!(!store.update("missing", &form("X", "1", "food", "2024-01-01")));
    assert_eq!(table.requests(), requests);
    assert_eq!(levels(&mut store), vec![(NoticeLevel::Error, MessageKey::Error)]);
}

#[test]
fn test_remote_update_touches_only_owned_row() {
    let table = MemoryTable::default();
    let mut store = remote_store(&table, "u1");
    let id = store
        .add(form("Mine", "1", "food", "2024-01-01"))
        .unwrap()
        .id
        .clone();
    table.push_row(json!({
        "id": id.clone(),
        "user_id": "someone-else",
        "title": "Theirs",
    }));

    assert!(store.update(&id, &form("Mine v2", "2", "food", "2024-01-01")));
    let rows = table.rows();
    assert_eq!(rows[0]["title"], json!("Mine v2"));
    assert_eq!(rows[1]["title"], json!("Theirs"));
}

// ── Delete ───────────────────────────────────────────────────

#[test]
fn test_delete_then_load_never_returns_id() {
    let kv = MemoryKv::default();
    let mut store = local_store(&kv);
    let gone = store.add(form("A", "1", "food", "2024-01-01")).unwrap().id.clone();
    store.add(form("B", "2", "food", "2024-01-02")).unwrap();

    assert!(store.delete(&gone));
    assert!(store.get(&gone).is_none());
    assert!(store.load());
    assert!(store.expenses().iter().all(|e| e.id != gone));
    assert_eq!(store.expenses().len(), 1);
}

#[test]
fn test_remote_delete_then_load_never_returns_id() {
    let table = MemoryTable::default();
    let mut store = remote_store(&table, "u1");
    let gone = store.add(form("A", "1", "food", "2024-01-01")).unwrap().id.clone();
    store.add(form("B", "2", "food", "2024-01-02")).unwrap();

    assert!(store.delete(&gone));
    assert!(store.load());
    assert!(store.expenses().iter().all(|e| e.id != gone));
    assert_eq!(store.expenses().len(), 1);
}

#[test]
fn test_delete_failure_keeps_record() {
    let kv = MemoryKv::default();
    let mut store = local_store(&kv);
    let id = store.add(form("A", "1", "food", "2024-01-01")).unwrap().id.clone();
    store.take_notices();

    kv.fail_writes(true);
    assert!(!store.delete(&id));
    assert!(store.get(&id).is_some());
    assert_eq!(reload_local(&kv).len(), 1);
    assert_eq!(levels(&mut store), vec![(NoticeLevel::Error, MessageKey::Error)]);
}

#[test]
fn test_delete_unknown_id_writes_nothing() {
    let kv = MemoryKv::default();
    let mut store = local_store(&kv);
    let writes = kv.writes();
    assert!(!store.delete("missing"));
    assert_eq!(kv.writes(), writes);
}

#[test]
fn test_delete_notifies() {
    let mut store = local_store(&MemoryKv::default());
    let id = store.add(form("A", "1", "food", "2024-01-01")).unwrap().id.clone();
    store.take_notices();
    store.delete(&id);
    assert_eq!(
        levels(&mut store),
        vec![(NoticeLevel::Success, MessageKey::ExpenseDeleted)]
    );
}

// ── Backend switching ────────────────────────────────────────

#[test]
fn test_switching_backend_does_not_migrate_records() {
    let kv = MemoryKv::default();
    let table = MemoryTable::default();
    let mut store = local_store(&kv);
    store.add(form("Guest lunch", "9", "food", "2024-05-01")).unwrap();

    assert!(store.switch_backend(Box::new(RemoteBackend::new(table.clone(), "u1"))));
    assert_eq!(store.backend_kind(), BackendKind::Remote);
    assert!(store.expenses().is_empty());
    assert!(table.rows().is_empty());

    store.add(form("Signed-in lunch", "11", "food", "2024-05-02")).unwrap();
    assert_eq!(reload_local(&kv).len(), 1);
    assert_eq!(reload_local(&kv)[0].title, "Guest lunch");

    // Signing out brings the guest records back, untouched.
    assert!(store.switch_backend(Box::new(LocalBackend::new(kv.clone()))));
    let titles: Vec<&str> = store.expenses().iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Guest lunch"]);
}

#[test]
fn test_switch_to_failing_backend_leaves_empty_list() {
    let table = MemoryTable::default();
    table.fail(true);
    let mut store = local_store(&MemoryKv::default());
    store.add(form("A", "1", "food", "2024-01-01")).unwrap();

    assert!(!store.switch_backend(Box::new(RemoteBackend::new(table, "u1"))));
    assert!(store.expenses().is_empty());
}

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::json;
use std::time::Duration;

use super::local::{decode_expenses, EXPENSES_KEY};
use super::remote::{Filter, Order, EXPENSES_TABLE};
use super::testing::{MemoryKv, MemoryTable};
use super::*;
use crate::config::RemoteConfig;
use crate::models::{Category, ExpenseForm};

fn form(title: &str, amount: &str, category: &str, date: &str) -> ExpenseForm {
    ExpenseForm::parse(title, amount, category, date, "").unwrap()
}

fn expense(title: &str, amount: &str, category: &str, date: &str) -> Expense {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    Expense::from_form(form(title, amount, category, date), now)
}

fn identity(user_id: &str) -> Identity {
    Identity {
        user_id: user_id.into(),
        email: format!("{user_id}@example.com"),
        access_token: "token".into(),
    }
}

// ── SqliteKv ──────────────────────────────────────────────────

#[test]
fn test_kv_get_missing() {
    let kv = SqliteKv::open_in_memory().unwrap();
    assert_eq!(kv.get("nope").unwrap(), None);
}

#[test]
fn test_kv_set_overwrites() {
    let mut kv = SqliteKv::open_in_memory().unwrap();
    kv.set("k", "one").unwrap();
    kv.set("k", "two").unwrap();
    assert_eq!(kv.get("k").unwrap().as_deref(), Some("two"));
}

#[test]
fn test_kv_remove() {
    let mut kv = SqliteKv::open_in_memory().unwrap();
    kv.set("k", "v").unwrap();
    kv.remove("k").unwrap();
    assert_eq!(kv.get("k").unwrap(), None);
    // Removing a missing key is not an error
    kv.remove("k").unwrap();
}

#[test]
fn test_kv_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    {
        let mut kv = SqliteKv::open(&path).unwrap();
        kv.set(EXPENSES_KEY, "[]").unwrap();
    }
    let kv = SqliteKv::open(&path).unwrap();
    assert_eq!(kv.get(EXPENSES_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_kv_two_connections_share_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    let mut writer = SqliteKv::open(&path).unwrap();
    let reader = SqliteKv::open(&path).unwrap();
    writer.set("lang", "ar").unwrap();
    assert_eq!(reader.get("lang").unwrap().as_deref(), Some("ar"));
}

#[test]
fn test_kv_open_reports_unreadable_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_version (version TEXT NOT NULL);
             INSERT INTO schema_version (version) VALUES ('not a number');",
        )
        .unwrap();
    }
    let err = SqliteKv::open(&path).err().unwrap();
    assert!(format!("{err:#}").contains("Failed to read schema version"));
}

#[test]
fn test_kv_open_initialises_empty_version_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE schema_version (version INTEGER NOT NULL);")
            .unwrap();
    }
    let mut kv = SqliteKv::open(&path).unwrap();
    kv.set("k", "v").unwrap();
    assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
}

// ── Local blob decoding ───────────────────────────────────────

#[test]
fn test_decode_garbage_is_empty() {
    assert!(decode_expenses("not json at all").is_empty());
    assert!(decode_expenses("").is_empty());
}

#[test]
fn test_decode_non_array_is_empty() {
    assert!(decode_expenses(r#"{"id": "x"}"#).is_empty());
    assert!(decode_expenses("42").is_empty());
}

#[test]
fn test_decode_skips_malformed_elements() {
    let good = serde_json::to_value(expense("Coffee", "3.5", "food", "2024-01-02")).unwrap();
    let text = json!([good, {"id": "broken"}, 7]).to_string();
    let decoded = decode_expenses(&text);
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].title, "Coffee");
}

// ── LocalBackend ──────────────────────────────────────────────

#[test]
fn test_local_load_absent_key_is_empty() {
    let mut backend = LocalBackend::new(MemoryKv::default());
    assert!(backend.load().unwrap().is_empty());
    assert_eq!(backend.kind(), BackendKind::Local);
}

#[test]
fn test_local_load_malformed_is_empty() {
    let mut backend = LocalBackend::new(MemoryKv::with_entry(EXPENSES_KEY, "{oops"));
    assert!(backend.load().unwrap().is_empty());
}

#[test]
fn test_local_load_sorts_newest_first() {
    let list = vec![
        expense("Old", "1", "food", "2024-01-01"),
        expense("New", "1", "food", "2024-03-01"),
        expense("Mid", "1", "food", "2024-02-01"),
    ];
    let kv = MemoryKv::with_entry(EXPENSES_KEY, &serde_json::to_string(&list).unwrap());
    let mut backend = LocalBackend::new(kv);
    let titles: Vec<String> = backend.load().unwrap().into_iter().map(|e| e.title).collect();
    assert_eq!(titles, ["New", "Mid", "Old"]);
}

#[test]
fn test_local_apply_writes_whole_snapshot() {
    let kv = MemoryKv::default();
    let mut backend = LocalBackend::new(kv.clone());
    let a = expense("A", "1", "food", "2024-01-01");
    let b = expense("B", "2", "travel", "2024-01-02");
    let next = vec![b.clone(), a.clone()];

    backend.apply(&Mutation::Insert(&b), &next).unwrap();

    let stored: Vec<Expense> = serde_json::from_str(&kv.raw(EXPENSES_KEY).unwrap()).unwrap();
    assert_eq!(stored, next);
}

#[test]
fn test_local_apply_uses_camel_case_keys() {
    let kv = MemoryKv::default();
    let mut backend = LocalBackend::new(kv.clone());
    let a = expense("A", "1", "food", "2024-01-01");
    backend.apply(&Mutation::Insert(&a), &[a.clone()]).unwrap();

    let raw = kv.raw(EXPENSES_KEY).unwrap();
    assert!(raw.contains("\"createdAt\""));
    assert!(raw.contains("\"updatedAt\""));
    assert!(!raw.contains("created_at"));
}

#[test]
fn test_local_apply_failure_propagates() {
    let kv = MemoryKv::default();
    kv.fail_writes(true);
    let mut backend = LocalBackend::new(kv.clone());
    let a = expense("A", "1", "food", "2024-01-01");
    assert!(backend.apply(&Mutation::Insert(&a), &[a.clone()]).is_err());
    assert!(kv.raw(EXPENSES_KEY).is_none());
}

#[test]
fn test_local_over_sqlite() {
    let mut backend = LocalBackend::new(SqliteKv::open_in_memory().unwrap());
    let a = expense("Books", "25", "education", "2024-05-05");
    backend.apply(&Mutation::Insert(&a), &[a.clone()]).unwrap();
    assert_eq!(backend.load().unwrap(), vec![a]);
}

// ── RemoteBackend ─────────────────────────────────────────────

#[test]
fn test_remote_insert_writes_owned_row() {
    let table = MemoryTable::default();
    let mut backend = RemoteBackend::new(table.clone(), "user-1");
    let a = expense("Cinema", "12", "entertainment", "2024-04-01");

    backend.apply(&Mutation::Insert(&a), &[]).unwrap();

    let rows = table.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"], "user-1");
    assert_eq!(rows[0]["id"], a.id.as_str());
    assert_eq!(rows[0]["amount"], 12.0);
    assert_eq!(rows[0]["category"], "entertainment");
    assert_eq!(rows[0]["date"], "2024-04-01");
    assert!(rows[0]["description"].is_null());
}

#[test]
fn test_remote_load_scoped_and_ordered() {
    let table = MemoryTable::default();
    let mut mine = RemoteBackend::new(table.clone(), "me");
    let mut theirs = RemoteBackend::new(table.clone(), "them");

    let jan = expense("Jan", "1", "food", "2024-01-10");
    let mar = expense("Mar", "3", "food", "2024-03-10");
    let other = expense("Other", "9", "food", "2024-02-10");
    mine.apply(&Mutation::Insert(&jan), &[]).unwrap();
    mine.apply(&Mutation::Insert(&mar), &[]).unwrap();
    theirs.apply(&Mutation::Insert(&other), &[]).unwrap();

    let loaded = mine.load().unwrap();
    let titles: Vec<&str> = loaded.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Mar", "Jan"]);
    assert_eq!(loaded[0], mar);
}

#[test]
fn test_remote_update_only_touches_owned_row() {
    let table = MemoryTable::default();
    let mut mine = RemoteBackend::new(table.clone(), "me");
    let a = expense("Taxi", "10", "transport", "2024-01-10");
    mine.apply(&Mutation::Insert(&a), &[]).unwrap();

    // Same id, different owner: must not change anything
    let mut intruder = RemoteBackend::new(table.clone(), "intruder");
    let hijack = form("Hijacked", "999", "other", "2024-01-10");
    intruder
        .apply(
            &Mutation::Update {
                id: &a.id,
                form: &hijack,
                updated_at: Utc::now(),
            },
            &[],
        )
        .unwrap();
    assert_eq!(mine.load().unwrap()[0].title, "Taxi");

    let fix = form("Taxi home", "12.40", "transport", "2024-01-11");
    let stamp = Utc.with_ymd_and_hms(2024, 1, 12, 8, 0, 0).unwrap();
    mine.apply(
        &Mutation::Update {
            id: &a.id,
            form: &fix,
            updated_at: stamp,
        },
        &[],
    )
    .unwrap();
    let reloaded = &mine.load().unwrap()[0];
    assert_eq!(reloaded.title, "Taxi home");
    assert_eq!(reloaded.amount, dec!(12.40));
    assert_eq!(reloaded.updated_at, stamp);
    assert_eq!(reloaded.created_at, a.created_at);
}

#[test]
fn test_remote_delete_scoped_by_owner() {
    let table = MemoryTable::default();
    let mut mine = RemoteBackend::new(table.clone(), "me");
    let a = expense("Gym", "30", "health", "2024-01-10");
    mine.apply(&Mutation::Insert(&a), &[]).unwrap();

    let mut other = RemoteBackend::new(table.clone(), "other");
    other.apply(&Mutation::Delete { id: &a.id }, &[]).unwrap();
    assert_eq!(table.rows().len(), 1);

    mine.apply(&Mutation::Delete { id: &a.id }, &[]).unwrap();
    assert!(table.rows().is_empty());
}

#[test]
fn test_remote_load_rejects_malformed_row() {
    let table = MemoryTable::default();
    table.push_row(json!({"id": "x", "user_id": "me", "title": "no amount"}));
    let mut backend = RemoteBackend::new(table, "me");
    assert!(matches!(backend.load(), Err(BackendError::Decode { .. })));
}

#[test]
fn test_remote_request_failure_propagates() {
    let table = MemoryTable::default();
    table.fail(true);
    let mut backend = RemoteBackend::new(table.clone(), "me");
    assert!(matches!(backend.load(), Err(BackendError::Api { status: 503, .. })));
    let a = expense("X", "1", "other", "2024-01-01");
    assert!(backend.apply(&Mutation::Insert(&a), &[]).is_err());
    assert_eq!(table.requests(), 2);
}

#[test]
fn test_remote_reads_numeric_amount_from_row() {
    let table = MemoryTable::default();
    table.push_row(json!({
        "id": "r1",
        "user_id": "me",
        "title": "Groceries",
        "amount": 54.3,
        "category": "shopping",
        "date": "2024-06-01",
        "description": "weekly",
        "created_at": "2024-06-01T09:00:00+00:00",
        "updated_at": "2024-06-01T09:00:00+00:00"
    }));
    let mut backend = RemoteBackend::new(table, "me");
    let loaded = backend.load().unwrap();
    assert_eq!(loaded[0].amount, dec!(54.3));
    assert_eq!(loaded[0].category, Category::Shopping);
    assert_eq!(loaded[0].description.as_deref(), Some("weekly"));
}

// ── Strategy ──────────────────────────────────────────────────

#[test]
fn test_strategy_guest_without_identity() {
    assert_eq!(Strategy::resolve(None, true), Strategy::Local);
    assert_eq!(Strategy::resolve(None, false), Strategy::Local);
}

#[test]
fn test_strategy_local_without_remote_client() {
    let id = identity("u1");
    assert_eq!(Strategy::resolve(Some(&id), false), Strategy::Local);
}

#[test]
fn test_strategy_remote_needs_both() {
    let id = identity("u1");
    let strategy = Strategy::resolve(Some(&id), true);
    assert_eq!(
        strategy,
        Strategy::Remote {
            owner: "u1".into()
        }
    );
    assert_eq!(strategy.kind(), BackendKind::Remote);
}

// ── RestClient request building ───────────────────────────────

fn rest_client() -> RestClient {
    RestClient::new(&RemoteConfig {
        url: reqwest::Url::parse("https://demo.supabase.co/").unwrap(),
        anon_key: "anon".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[test]
fn test_table_url_with_filters_and_order() {
    let url = rest_client()
        .table_url(
            EXPENSES_TABLE,
            &[Filter::eq("id", "abc"), Filter::eq("user_id", "u 1")],
            Some(&Order::desc("date")),
        )
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://demo.supabase.co/rest/v1/expenses?id=eq.abc&user_id=eq.u+1&order=date.desc"
    );
}

#[test]
fn test_table_url_plain() {
    let url = rest_client().table_url(EXPENSES_TABLE, &[], None).unwrap();
    assert_eq!(url.as_str(), "https://demo.supabase.co/rest/v1/expenses");
}

#[test]
fn test_auth_url() {
    let url = rest_client().auth_url("signup").unwrap();
    assert_eq!(url.as_str(), "https://demo.supabase.co/auth/v1/signup");
}

#[test]
fn test_rest_client_rejects_bad_key() {
    let err = RestClient::new(&RemoteConfig {
        url: reqwest::Url::parse("https://demo.supabase.co/").unwrap(),
        anon_key: "bad\nkey".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap_err();
    assert!(matches!(err, BackendError::Config(_)));
}

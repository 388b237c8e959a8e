#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::time::Duration;

use super::*;
use crate::config::RemoteConfig;
use crate::models::ExpenseForm;
use crate::storage::BackendKind;
use crate::store::ExpenseStore;

fn config(dir: &Path, remote: bool) -> Config {
    Config {
        data_dir: dir.to_path_buf(),
        remote: remote.then(|| RemoteConfig {
            url: "https://demo.supabase.co/".parse().unwrap(),
            anon_key: "anon".into(),
            timeout: Duration::from_secs(5),
        }),
    }
}

fn identity() -> Identity {
    Identity {
        user_id: "user-1".into(),
        email: "a@example.com".into(),
        access_token: "jwt".into(),
    }
}

#[test]
fn test_fresh_session_is_guest() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::open(config(dir.path(), true)).unwrap();
    assert!(session.identity().is_none());
    assert_eq!(session.strategy(), Strategy::Local);
    assert_eq!(session.backend().unwrap().kind(), BackendKind::Local);
}

#[test]
fn test_stored_identity_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = Session::open(config(dir.path(), true)).unwrap();
        session.persist_identity(identity()).unwrap();
    }
    let session = Session::open(config(dir.path(), true)).unwrap();
    assert_eq!(session.identity(), Some(&identity()));
    assert_eq!(
        session.strategy(),
        Strategy::Remote {
            owner: "user-1".into()
        }
    );
    assert_eq!(session.backend().unwrap().kind(), BackendKind::Remote);
}

#[test]
fn test_identity_without_remote_config_stays_local() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(config(dir.path(), false)).unwrap();
    session.persist_identity(identity()).unwrap();
    assert_eq!(session.strategy(), Strategy::Local);
    assert_eq!(session.backend().unwrap().kind(), BackendKind::Local);
}

#[test]
fn test_sign_out_clears_stored_identity() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(config(dir.path(), true)).unwrap();
    session.persist_identity(identity()).unwrap();

    assert!(session.sign_out().unwrap());
    assert!(!session.sign_out().unwrap());
    assert_eq!(session.strategy(), Strategy::Local);

    let reopened = Session::open(config(dir.path(), true)).unwrap();
    assert!(reopened.identity().is_none());
}

#[test]
fn test_unreadable_session_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut kv = SqliteKv::open(&config(dir.path(), false).db_path()).unwrap();
        kv.set(SESSION_KEY, "not json").unwrap();
    }
    let session = Session::open(config(dir.path(), true)).unwrap();
    assert!(session.identity().is_none());
}

#[test]
fn test_sign_in_without_remote_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(config(dir.path(), false)).unwrap();
    let creds = Credentials::sign_in("a@example.com", "pw").unwrap();
    let err = session.sign_in(&creds).unwrap_err();
    assert!(err.to_string().contains("not configured"));
    assert!(session.identity().is_none());
}

#[test]
fn test_language_defaults_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(config(dir.path(), false)).unwrap();
    assert_eq!(session.language(), Language::En);

    session.set_language(Language::Ar).unwrap();
    assert_eq!(session.language(), Language::Ar);

    let reopened = Session::open(config(dir.path(), false)).unwrap();
    assert_eq!(reopened.language(), Language::Ar);
}

#[test]
fn test_guest_expenses_persist_in_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let session = Session::open(config(dir.path(), false)).unwrap();
    let form = ExpenseForm::parse("Bus", "2.75", "transport", "2024-06-01", "").unwrap();
    {
        let mut store = ExpenseStore::new(session.backend().unwrap());
        assert!(store.load());
        store.add(form.clone()).unwrap();
    }

    let mut store = ExpenseStore::new(session.backend().unwrap());
    assert!(store.load());
    assert_eq!(store.expenses().len(), 1);
    assert_eq!(ExpenseForm::from(&store.expenses()[0]), form);
}

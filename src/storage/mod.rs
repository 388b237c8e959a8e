//! Persistence for expenses: a hosted table scoped by user, or a device-local
//! key/value blob for guest mode.

mod local;
mod remote;
mod rest;
mod schema;
mod sqlite;

#[cfg(test)]
pub(crate) mod testing;

pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use rest::RestClient;
pub use sqlite::SqliteKv;

use chrono::{DateTime, Utc};

use crate::models::{Expense, ExpenseForm, Identity};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport failure, including timeouts.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("malformed row in {table}: {source}")]
    Decode {
        table: String,
        source: serde_json::Error,
    },
    #[error("failed to encode expenses: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("local storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("remote client configuration error: {0}")]
    Config(String),
}

/// Text storage addressed by key, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError>;
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// One store operation, as handed to the backend.
#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    Insert(&'a Expense),
    Update {
        id: &'a str,
        form: &'a ExpenseForm,
        updated_at: DateTime<Utc>,
    },
    Delete {
        id: &'a str,
    },
}

pub trait ExpenseBackend {
    fn kind(&self) -> BackendKind;

    /// All expenses of the current identity, newest date first.
    fn load(&mut self) -> Result<Vec<Expense>, BackendError>;

    /// Persist `mutation`. `next` is the complete list the caller will hold
    /// once this returns `Ok`; backends that store whole snapshots write it.
    fn apply(&mut self, mutation: &Mutation<'_>, next: &[Expense]) -> Result<(), BackendError>;
}

/// Which backend a session uses. Resolved once per session or identity
/// change, never per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Remote { owner: String },
    Local,
}

impl Strategy {
    /// Remote only when there is both a signed-in identity and a configured
    /// remote client; guest mode otherwise.
    pub fn resolve(identity: Option<&Identity>, remote_configured: bool) -> Self {
        match identity {
            Some(identity) if remote_configured => Self::Remote {
                owner: identity.user_id.clone(),
            },
            _ => Self::Local,
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Remote { .. } => BackendKind::Remote,
            Self::Local => BackendKind::Local,
        }
    }
}

#[cfg(test)]
mod tests;

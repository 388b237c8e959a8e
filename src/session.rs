//! Who is using the app and which backend that implies.
//!
//! The signed-in identity and the language choice live in the same local
//! key/value store as guest-mode expenses.

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::i18n::{Language, LANGUAGE_KEY};
use crate::models::{Credentials, Identity};
use crate::storage::{
    ExpenseBackend, KeyValueStore, LocalBackend, RemoteBackend, RestClient, SqliteKv, Strategy,
};

pub const SESSION_KEY: &str = "expense-tracker-session";

pub struct Session {
    config: Config,
    settings: SqliteKv,
    identity: Option<Identity>,
}

impl Session {
    pub fn open(config: Config) -> Result<Self> {
        let settings = SqliteKv::open(&config.db_path())?;
        let identity = match settings.get(SESSION_KEY)? {
            Some(text) => match serde_json::from_str::<Identity>(&text) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unreadable stored session");
                    None
                }
            },
            None => None,
        };
        Ok(Self {
            config,
            settings,
            identity,
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn remote_configured(&self) -> bool {
        self.config.remote.is_some()
    }

    pub fn strategy(&self) -> Strategy {
        Strategy::resolve(self.identity.as_ref(), self.remote_configured())
    }

    /// Build the backend for the current strategy. Call again after any
    /// identity change and hand the result to the store.
    pub fn backend(&self) -> Result<Box<dyn ExpenseBackend>> {
        match (self.strategy(), &self.config.remote, &self.identity) {
            (Strategy::Remote { owner }, Some(remote), Some(identity)) => {
                let client = RestClient::new(remote)
                    .context("Failed to create remote client")?
                    .with_token(&identity.access_token);
                tracing::debug!(owner = %owner, "using remote storage");
                Ok(Box::new(RemoteBackend::new(client, owner)))
            }
            _ => {
                let kv = SqliteKv::open(&self.config.db_path())?;
                tracing::debug!("using local storage");
                Ok(Box::new(LocalBackend::new(kv)))
            }
        }
    }

    fn client(&self) -> Result<RestClient> {
        let Some(remote) = &self.config.remote else {
            bail!("Remote storage is not configured; set EXPENSES_REMOTE_URL and EXPENSES_REMOTE_KEY");
        };
        RestClient::new(remote).context("Failed to create remote client")
    }

    pub fn sign_in(&mut self, creds: &Credentials) -> Result<&Identity> {
        let identity = self
            .client()?
            .sign_in(creds)
            .with_context(|| format!("Sign-in failed for {}", creds.email))?;
        tracing::info!(user = %identity.user_id, "signed in");
        self.persist_identity(identity)
    }

    /// `Ok(None)` when the account was created but must be confirmed before
    /// signing in.
    pub fn register(&mut self, creds: &Credentials) -> Result<Option<&Identity>> {
        let created = self
            .client()?
            .sign_up(creds)
            .with_context(|| format!("Registration failed for {}", creds.email))?;
        match created {
            Some(identity) => {
                tracing::info!(user = %identity.user_id, "registered and signed in");
                Ok(Some(self.persist_identity(identity)?))
            }
            None => {
                tracing::info!(email = %creds.email, "registered; confirmation pending");
                Ok(None)
            }
        }
    }

    /// Forget the stored identity. Returns whether anyone was signed in.
    pub fn sign_out(&mut self) -> Result<bool> {
        self.settings
            .remove(SESSION_KEY)
            .context("Failed to clear stored session")?;
        let was_signed_in = self.identity.take().is_some();
        if was_signed_in {
            tracing::info!("signed out");
        }
        Ok(was_signed_in)
    }

    pub(crate) fn persist_identity(&mut self, identity: Identity) -> Result<&Identity> {
        let text = serde_json::to_string(&identity).context("Failed to encode session")?;
        self.settings
            .set(SESSION_KEY, &text)
            .context("Failed to store session")?;
        Ok(self.identity.insert(identity))
    }

    /// Stored language, English when unset or unrecognised.
    pub fn language(&self) -> Language {
        match self.settings.get(LANGUAGE_KEY) {
            Ok(Some(code)) => Language::parse(&code).unwrap_or_default(),
            Ok(None) => Language::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read language setting");
                Language::default()
            }
        }
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.settings
            .set(LANGUAGE_KEY, language.code())
            .context("Failed to store language")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;

//! Hosted storage over a PostgREST-style HTTP API (Supabase-compatible).
//!
//! Table requests go to `{base}/rest/v1/{table}` with equality filters encoded
//! as `column=eq.value`. Authentication uses the password grant at
//! `{base}/auth/v1/token`.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use super::remote::{Filter, Order, TableClient};
use super::BackendError;
use crate::config::RemoteConfig;
use crate::models::{Credentials, Identity};

#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: Url,
    api_key: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// Sign-up answers with a session when confirmation is disabled, otherwise
/// with just the pending user.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
}

impl RestClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.anon_key)
                .map_err(|_| BackendError::Config("API key is not a valid header value".into()))?,
        );
        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.url.clone(),
            api_key: config.anon_key.clone(),
            access_token: None,
        })
    }

    /// Act on behalf of a signed-in user so row-level policies apply.
    pub fn with_token(mut self, access_token: &str) -> Self {
        self.access_token = Some(access_token.to_string());
        self
    }

    fn bearer(&self) -> String {
        format!(
            "Bearer {}",
            self.access_token.as_deref().unwrap_or(&self.api_key)
        )
    }

    pub(crate) fn table_url(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Url, BackendError> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| BackendError::Config(e.to_string()))?;
        if !filters.is_empty() || order.is_some() {
            let mut query = url.query_pairs_mut();
            for filter in filters {
                query.append_pair(filter.column, &format!("eq.{}", filter.value));
            }
            if let Some(order) = order {
                let dir = if order.ascending { "asc" } else { "desc" };
                query.append_pair("order", &format!("{}.{dir}", order.column));
            }
        }
        Ok(url)
    }

    pub(crate) fn auth_url(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(&format!("auth/v1/{path}"))
            .map_err(|e| BackendError::Config(e.to_string()))
    }

    fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, BackendError> {
        let resp = request
            .header(AUTHORIZATION, self.bearer())
            .send()
            .map_err(|e| BackendError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_default();
            return Err(BackendError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }
        Ok(resp)
    }

    pub fn sign_in(&self, creds: &Credentials) -> Result<Identity, BackendError> {
        let endpoint = "POST /auth/v1/token";
        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let resp = self.send(
            endpoint,
            self.http.post(url).json(&serde_json::json!({
                "email": creds.email,
                "password": creds.password,
            })),
        )?;
        let token: TokenResponse = resp.json().map_err(|e| BackendError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })?;

        Ok(Identity {
            user_id: token.user.id,
            email: token.user.email.unwrap_or_else(|| creds.email.clone()),
            access_token: token.access_token,
        })
    }

    /// Returns the new identity when the server starts a session right away,
    /// `None` when the account still has to be confirmed.
    pub fn sign_up(&self, creds: &Credentials) -> Result<Option<Identity>, BackendError> {
        let endpoint = "POST /auth/v1/signup";
        let resp = self.send(
            endpoint,
            self.http.post(self.auth_url("signup")?).json(&serde_json::json!({
                "email": creds.email,
                "password": creds.password,
            })),
        )?;
        let body: SignUpResponse = resp.json().map_err(|e| BackendError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })?;

        Ok(match (body.access_token, body.user) {
            (Some(access_token), Some(user)) => Some(Identity {
                user_id: user.id,
                email: user.email.unwrap_or_else(|| creds.email.clone()),
                access_token,
            }),
            _ => None,
        })
    }
}

impl TableClient for RestClient {
    fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, BackendError> {
        let endpoint = format!("GET /rest/v1/{table}");
        let mut url = self.table_url(table, filters, order)?;
        url.query_pairs_mut().append_pair("select", "*");

        let resp = self.send(&endpoint, self.http.get(url))?;
        resp.json().map_err(|e| BackendError::Deserialization {
            endpoint,
            source: e,
        })
    }

    fn insert(&self, table: &str, row: &Value) -> Result<(), BackendError> {
        let endpoint = format!("POST /rest/v1/{table}");
        let url = self.table_url(table, &[], None)?;
        self.send(
            &endpoint,
            self.http
                .post(url)
                .header("Prefer", "return=minimal")
                .json(&[row]),
        )?;
        Ok(())
    }

    fn update(&self, table: &str, values: &Value, filters: &[Filter]) -> Result<(), BackendError> {
        let endpoint = format!("PATCH /rest/v1/{table}");
        let url = self.table_url(table, filters, None)?;
        self.send(
            &endpoint,
            self.http
                .patch(url)
                .header("Prefer", "return=minimal")
                .json(values),
        )?;
        Ok(())
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), BackendError> {
        let endpoint = format!("DELETE /rest/v1/{table}");
        let url = self.table_url(table, filters, None)?;
        self.send(
            &endpoint,
            self.http.delete(url).header("Prefer", "return=minimal"),
        )?;
        Ok(())
    }
}

//! REST API client for the CRISP backend.
//!
//! One client replaces the three copy-pasted `fetch` wrappers of the original
//! dashboards: bearer-token auth from the injected [`SessionContext`], error
//! envelope normalization, a 204/empty-DELETE success sentinel, a short-TTL
//! response cache for idempotent GETs, and typed resource operations over the
//! backend's path conventions.

mod cache;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{ClientConfig, EnvelopeShape};
use crate::error::{Error, Result};
use crate::models::ResourceKind;
use crate::session::{Session, SessionContext, TokenStore};
use crate::sync::UpdateReport;
use crate::util::{compact_text, encode_query};

pub use cache::ResponseCache;

/// Client-side list query forwarded to the server on the initial fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListQuery {
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        for (key, value) in &self.filters {
            params.push((key.as_str(), value.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size", page_size.to_string()));
        }
        encode_query(&params)
    }
}

#[derive(Clone)]
pub struct ApiClient<S: TokenStore> {
    base_url: String,
    envelope: EnvelopeShape,
    client: reqwest::Client,
    session: SessionContext<S>,
    cache: Arc<Mutex<ResponseCache>>,
}

impl<S: TokenStore> ApiClient<S> {
    pub fn new(config: &ClientConfig, session: SessionContext<S>) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            envelope: config.envelope,
            client: reqwest::Client::builder().build()?,
            session,
            cache: Arc::new(Mutex::new(ResponseCache::new(config.cache_ttl()))),
        })
    }

    /// Issue one request and normalize the response.
    ///
    /// Cached GETs are answered without a network call while fresh. A 401
    /// tears the session down and is fatal to the session, never retried.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let is_get = method == Method::GET;
        if is_get {
            if let Some(hit) = self.cached(path)? {
                tracing::debug!(path, "response cache hit");
                return Ok(hit);
            }
        }

        let session = self
            .session
            .current()?
            .ok_or(Error::NotAuthenticated)?;

        let mut request = self
            .client
            .request(method.clone(), format!("{}{path}", self.base_url))
            .header("Accept", "application/json")
            .bearer_auth(&session.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session.teardown()?;
            self.clear_cache()?;
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(parse_api_error(status, &body)));
        }

        let text = response.text().await.unwrap_or_default();
        let value = interpret_success(status, &method, &text)?;

        if is_get {
            self.store_cached(path, value.clone())?;
        }
        Ok(value)
    }

    /// Sign in and establish the session context.
    ///
    /// The only call issued without a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let response = self
            .client
            .post(format!("{}/api/auth/login/", self.base_url))
            .header("Accept", "application/json")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(parse_api_error(status, &body)));
        }

        let payload = response.json::<LoginResponse>().await?;
        let session = payload.into_session()?;
        self.session.establish(session.clone())?;
        Ok(session)
    }

    /// Sign out: best-effort server call, then local teardown.
    pub async fn logout(&self) -> Result<()> {
        if let Some(session) = self.session.current()? {
            let result = self
                .client
                .post(format!("{}/api/auth/logout/", self.base_url))
                .bearer_auth(&session.token)
                .send()
                .await;
            if let Err(error) = result {
                tracing::warn!("logout request failed: {error}");
            }
        }
        self.session.teardown()?;
        self.clear_cache()
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        query: &ListQuery,
    ) -> Result<Vec<T>> {
        let path = format!("{}{}", collection_path(kind), query.query_string());
        let raw = self.request(Method::GET, &path, None).await?;
        let unwrapped = unwrap_envelope(self.envelope, raw, kind.path_segment());
        let rows = into_rows(unwrapped);
        Ok(serde_json::from_value(rows)?)
    }

    pub async fn get_one<T: DeserializeOwned>(&self, kind: ResourceKind, id: &str) -> Result<T> {
        let raw = self
            .request(Method::GET, &item_path(kind, id, None), None)
            .await?;
        let unwrapped = unwrap_envelope(self.envelope, raw, kind.singular());
        Ok(serde_json::from_value(unwrapped)?)
    }

    pub async fn create<T: DeserializeOwned>(&self, kind: ResourceKind, payload: &Value) -> Result<T> {
        let path = format!("{}create/", collection_path(kind));
        let raw = self.request(Method::POST, &path, Some(payload)).await?;
        self.invalidate_cached(kind)?;
        let unwrapped = unwrap_envelope(self.envelope, raw, kind.singular());
        Ok(serde_json::from_value(unwrapped)?)
    }

    pub async fn update<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: &str,
        payload: &Value,
    ) -> Result<T> {
        let raw = self
            .request(Method::PUT, &item_path(kind, id, Some("update")), Some(payload))
            .await?;
        self.invalidate_cached(kind)?;
        let unwrapped = unwrap_envelope(self.envelope, raw, kind.singular());
        Ok(serde_json::from_value(unwrapped)?)
    }

    /// POST an item action endpoint, e.g. `accept` on a trust relationship.
    pub async fn perform_action(
        &self,
        kind: ResourceKind,
        id: &str,
        action: &str,
    ) -> Result<Value> {
        let raw = self
            .request(Method::POST, &item_path(kind, id, Some(action)), None)
            .await?;
        self.invalidate_cached(kind)?;
        Ok(raw)
    }

    pub async fn deactivate(&self, kind: ResourceKind, id: &str) -> Result<Value> {
        self.perform_action(kind, id, "deactivate").await
    }

    pub async fn reactivate(&self, kind: ResourceKind, id: &str) -> Result<Value> {
        self.perform_action(kind, id, "reactivate").await
    }

    /// Hard delete. A 204 or empty body yields `{"success": true}`.
    pub async fn delete_permanently(&self, kind: ResourceKind, id: &str) -> Result<Value> {
        let raw = self
            .request(
                Method::DELETE,
                &item_path(kind, id, Some("delete-permanently")),
                None,
            )
            .await?;
        self.invalidate_cached(kind)?;
        Ok(raw)
    }

    /// Lightweight "what changed and when" report for the sync engine.
    pub async fn fetch_updates(&self) -> Result<UpdateReport> {
        let raw = self.request(Method::GET, "/api/updates/", None).await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Acknowledge an update timestamp so concurrent pollers skip it.
    pub async fn mark_seen(&self, kind: ResourceKind, seen: DateTime<Utc>) -> Result<()> {
        let payload = json!({
            "resource": kind.path_segment(),
            "seen": seen.to_rfc3339(),
        });
        self.request(Method::POST, "/api/updates/seen/", Some(&payload))
            .await?;
        Ok(())
    }

    fn cached(&self, path: &str) -> Result<Option<Value>> {
        let cache = self
            .cache
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        Ok(cache.get(path))
    }

    fn store_cached(&self, path: &str, value: Value) -> Result<()> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        cache.insert(path, value);
        Ok(())
    }

    /// Drop cached responses under a resource's collection prefix.
    ///
    /// Mutations call this after they land; refresh paths that must observe
    /// the latest server state call it before listing, so a fresh-by-TTL
    /// entry cannot shadow a change the update report already announced.
    pub fn invalidate_cached(&self, kind: ResourceKind) -> Result<()> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        cache.invalidate_prefix(&collection_path(kind));
        Ok(())
    }

    fn clear_cache(&self) -> Result<()> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        cache.clear();
        Ok(())
    }
}

/// Collection path for a resource kind, e.g. `/api/indicators/`.
#[must_use]
pub fn collection_path(kind: ResourceKind) -> String {
    format!("/api/{}/", kind.path_segment())
}

/// Item path with an optional trailing action segment.
#[must_use]
pub fn item_path(kind: ResourceKind, id: &str, action: Option<&str>) -> String {
    match action {
        Some(action) => format!("/api/{}/{id}/{action}/", kind.path_segment()),
        None => format!("/api/{}/{id}/", kind.path_segment()),
    }
}

/// Extract a human-readable message from a non-2xx response body.
///
/// Priority order: `detail`, then `message`, then `error`; falls back to the
/// HTTP status line when the body is unparseable or carries none of them.
/// Oversized server messages are truncated to keep errors displayable.
#[must_use]
pub fn parse_api_error(status: StatusCode, body: &str) -> String {
    #[derive(Debug, Deserialize)]
    struct ApiErrorBody {
        detail: Option<String>,
        message: Option<String>,
        error: Option<String>,
    }

    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.detail.or(payload.message).or(payload.error) {
            let message = compact_text(&message);
            if !message.is_empty() {
                return message;
            }
        }
    }

    format!("HTTP {status}")
}

/// Interpret a successful response body.
///
/// A 204, or an empty body on a DELETE, yields `{"success": true}` instead of
/// attempting a JSON parse, since no body is guaranteed there.
pub fn interpret_success(status: StatusCode, method: &Method, body: &str) -> Result<Value> {
    if status == StatusCode::NO_CONTENT || (*method == Method::DELETE && body.trim().is_empty()) {
        return Ok(json!({ "success": true }));
    }
    Ok(serde_json::from_str(body)?)
}

/// Unwrap a configured response envelope shape around a payload.
#[must_use]
pub fn unwrap_envelope(shape: EnvelopeShape, mut value: Value, key: &str) -> Value {
    match shape {
        EnvelopeShape::Bare => value,
        EnvelopeShape::Data => {
            let Some(data) = value.get_mut("data") else {
                return value;
            };
            let mut data = data.take();
            match data.get_mut(key) {
                Some(keyed) => keyed.take(),
                None => data,
            }
        }
        EnvelopeShape::Keyed => match value.get_mut(key) {
            Some(keyed) => keyed.take(),
            None => value,
        },
    }
}

/// Reduce a list payload to its row array, tolerating DRF-style pagination
/// objects (`{count, results: [...]}`) after envelope unwrapping.
fn into_rows(mut value: Value) -> Value {
    if value.is_array() {
        return value;
    }
    match value.get_mut("results") {
        Some(results) => results.take(),
        None => value,
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    access_token: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl LoginResponse {
    fn into_session(self) -> Result<Session> {
        let token = self
            .token
            .or(self.access_token)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Api("Login response did not include a token".to_string()))?;

        Ok(Session {
            token,
            user_id: self.user_id,
            email: self.email,
        })
    }
}

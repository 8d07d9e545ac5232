use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Serialize;

use crate::{ClientError, RequestOptions, Result};

/// Header carrying the per-operation deduplication key.
pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

/// Returns `true` for methods that get an idempotency key.
pub fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// One logical API operation.
///
/// Retries and the post-refresh replay reuse the same descriptor, so every
/// attempt carries the same headers, including the idempotency key.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    /// Path relative to the client's base URL, e.g. `/loads/42`.
    pub endpoint: String,
    pub method: Method,
    /// JSON payload, sent with `Content-Type: application/json`.
    pub body: Option<serde_json::Value>,
    /// Caller headers; the client adds its own on top.
    pub headers: HeaderMap,
    pub options: RequestOptions,
}

impl RequestDescriptor {
    /// Creates a request for `endpoint` relative to the base URL.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            body: None,
            headers: HeaderMap::new(),
            options: RequestOptions::default(),
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    /// Shorthand for a `POST` request.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    /// Shorthand for a `PUT` request.
    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    /// Shorthand for a `PATCH` request.
    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PATCH, endpoint)
    }

    /// Shorthand for a `DELETE` request.
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Sets a prebuilt JSON payload.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `body` as the JSON payload.
    pub fn with_json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|err| ClientError::InvalidRequest(format!("unserializable body: {err}")))?;
        Ok(self.with_body(value))
    }

    /// Adds a caller header. Invalid names or values are rejected.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_ref().as_bytes()).map_err(|err| {
            ClientError::InvalidRequest(format!("invalid header name '{}': {err}", name.as_ref()))
        })?;
        let value = HeaderValue::from_str(value.as_ref()).map_err(|err| {
            ClientError::InvalidRequest(format!("invalid value for header '{name}': {err}"))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Supplies the idempotency key instead of letting the client generate one.
    pub fn with_idempotency_key(self, key: impl AsRef<str>) -> Result<Self> {
        self.with_header(IDEMPOTENCY_KEY, key)
    }

    /// Replaces all per-request overrides.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Overrides the per-attempt timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = Some(timeout_ms);
        self
    }

    /// Overrides the number of retries after the initial attempt.
    pub fn with_retries(mut self, max_retries: usize) -> Self {
        self.options.max_retries = Some(max_retries);
        self
    }

    /// Overrides the base backoff delay.
    pub fn with_retry_backoff_ms(mut self, retry_backoff_ms: u64) -> Self {
        self.options.retry_backoff_ms = Some(retry_backoff_ms);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "endpoint must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Auth endpoints never trigger a session refresh.
    pub(crate) fn is_auth_endpoint(&self) -> bool {
        self.endpoint.contains("/auth/")
    }

    /// Attaches a fresh idempotency key to mutating requests lacking one.
    pub(crate) fn ensure_idempotency_key(&mut self) {
        if !is_mutating(&self.method) || self.headers.contains_key(IDEMPOTENCY_KEY) {
            return;
        }
        let key = uuid::Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&key) {
            self.headers.insert(IDEMPOTENCY_KEY, value);
        }
    }
}

/// Ordered query-string builder.
///
/// Empty values are skipped and list values repeat their key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key=value`, skipping empty values.
    pub fn push(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.into(), value));
        }
        self
    }

    /// Appends the value when present.
    pub fn push_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    /// Appends one pair per value under the same key.
    pub fn push_all<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let key = key.into();
        for value in values {
            self = self.push(key.clone(), value);
        }
        self
    }

    /// Returns `true` when no pair was kept.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Renders `?k=v&...`, or an empty string when there are no pairs.
    pub fn to_query_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish();
        format!("?{encoded}")
    }

    /// Appends the query string to `path`.
    pub fn apply(&self, path: &str) -> String {
        format!("{path}{}", self.to_query_string())
    }
}

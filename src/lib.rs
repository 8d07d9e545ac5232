//! `tms-api-client` is a resilient async HTTP client for the TMS REST API.
//!
//! Every call goes through [`ApiClient::execute`] (or [`ApiClient::send`]
//! for unwrapped payloads), which adds:
//! - a per-attempt timeout,
//! - bounded retry with jittered exponential backoff on status 0, 429 and 503,
//! - an `Idempotency-Key` shared by all attempts of a mutating request,
//! - a single de-duplicated session refresh when a request gets a 401.
//!
//! Typed helpers for loads, customers, orders and the dashboard live on
//! [`ApiClient`] as well.

mod auth;
mod client;
mod envelope;
mod error;
mod options;
mod request;
mod resources;
mod retry;

pub mod models;

pub use auth::{CredentialStore, MemoryCredentialStore};
pub use client::{ApiClient, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use envelope::{ApiResponse, FieldError, PageMeta};
pub use error::{ClientError, ErrorBody};
pub use options::{ClientOptions, RequestOptions};
pub use request::{is_mutating, QueryParams, RequestDescriptor, IDEMPOTENCY_KEY};
pub use retry::{exponential_backoff_ms, is_retryable_status, RetryBudget};

pub use reqwest::Method;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

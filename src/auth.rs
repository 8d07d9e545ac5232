//! Session credentials and refresh de-duplication.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};

use futures_util::future::{BoxFuture, FutureExt, Shared};

/// Client-side storage for the session.
///
/// The access token is sent as `Authorization: Bearer <token>`; the redirect
/// slot remembers where to go back to after an expired session is
/// re-established.
pub trait CredentialStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn store_access_token(&self, token: Option<String>);
    fn remember_redirect(&self, destination: &str);
    fn take_redirect(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct Session {
    access_token: Option<String>,
    redirect: Option<String>,
}

/// In-process [`CredentialStore`].
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: Mutex<Session>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`.
    pub fn with_access_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        store.store_access_token(Some(token.into()));
        store
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        lock(&self.session)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn access_token(&self) -> Option<String> {
        self.session().access_token.clone()
    }

    fn store_access_token(&self, token: Option<String>) {
        self.session().access_token = token.filter(|t| !t.trim().is_empty());
    }

    fn remember_redirect(&self, destination: &str) {
        self.session().redirect = Some(destination.to_owned());
    }

    fn take_redirect(&self) -> Option<String> {
        self.session().redirect.take()
    }
}

/// Outcome of a refresh, shared by every caller that joined it.
pub(crate) type RefreshOutcome = std::result::Result<(), String>;

type InFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Holds at most one in-flight session refresh.
///
/// The first caller spawns the refresh onto the runtime; callers arriving
/// while it runs await the same future and observe the same outcome. The
/// spawned task empties the slot when it settles, so a caller that is
/// cancelled mid-refresh never leaves a stale refresh behind.
#[derive(Default)]
pub(crate) struct RefreshGuard {
    in_flight: Arc<Mutex<Option<InFlight>>>,
}

impl RefreshGuard {
    pub(crate) async fn run<F, Fut>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome> + Send + 'static,
    {
        let refresh = {
            let mut slot = lock(&self.in_flight);
            match slot.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let refresh = self.spawn_refresh(start());
                    *slot = Some(refresh.clone());
                    refresh
                }
            }
        };
        refresh.await
    }

    /// Must be called with the slot locked: the task clears the slot on
    /// completion and may only do so after the caller has filled it.
    fn spawn_refresh<Fut>(&self, refresh: Fut) -> InFlight
    where
        Fut: Future<Output = RefreshOutcome> + Send + 'static,
    {
        let slot = Arc::clone(&self.in_flight);
        let task = tokio::spawn(async move {
            let outcome = refresh.await;
            *lock(&slot) = None;
            outcome
        });
        task.map(|joined| {
            joined.unwrap_or_else(|err| Err(format!("refresh task did not complete: {err}")))
        })
        .boxed()
        .shared()
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        lock(&self.in_flight).is_none()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

//! Snapshot cache with optional expiry
//!
//! The state lock is held across check, refresh and commit, so concurrent
//! invocations that find the cache stale trigger exactly one refresh; the
//! rest wait and then observe the committed snapshot.

use crate::merge::ParameterSnapshot;
use chrono::{DateTime, Utc};
use ssmenv_core::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Callback fired after a refresh is committed to an enabled cache
pub type OnChange = Arc<dyn Fn(&ParameterSnapshot) + Send + Sync>;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// When cached values may be reused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    pub enabled: bool,
    /// `None` means cached values never expire
    pub expiry: Option<Duration>,
}

impl CachePolicy {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled(expiry: Option<Duration>) -> Self {
        Self {
            enabled: true,
            expiry,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheState {
    pub loaded: bool,
    pub last_loaded_at: Option<DateTime<Utc>>,
    pub snapshot: Arc<ParameterSnapshot>,
}

impl CacheState {
    /// A refresh is due when caching is off, nothing has loaded yet, or the
    /// expiry window has elapsed since the last load.
    pub fn needs_refresh(&self, policy: &CachePolicy, now: DateTime<Utc>) -> bool {
        if !policy.enabled || !self.loaded {
            return true;
        }
        match (policy.expiry, self.last_loaded_at) {
            (Some(expiry), Some(last)) => {
                let elapsed = (now - last).num_milliseconds();
                let window = i64::try_from(expiry.as_millis()).unwrap_or(i64::MAX);
                elapsed >= window
            }
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// Guards the resolved snapshot
pub struct CacheManager {
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
    on_change: Option<OnChange>,
    state: Mutex<CacheState>,
}

impl CacheManager {
    pub fn new(policy: CachePolicy, clock: Arc<dyn Clock>, on_change: Option<OnChange>) -> Self {
        Self {
            policy,
            clock,
            on_change,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Return the cached snapshot, or run `refresh` and commit its result.
    ///
    /// A failed refresh leaves the previous state untouched.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<Arc<ParameterSnapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ParameterSnapshot>>,
    {
        let mut state = self.state.lock().await;

        if !state.needs_refresh(&self.policy, self.clock.now()) {
            debug!("Using cached parameters ({} entries)", state.snapshot.len());
            return Ok(Arc::clone(&state.snapshot));
        }

        let snapshot = Arc::new(refresh().await?);
        let loaded_at = self.clock.now();

        state.loaded = true;
        state.last_loaded_at = Some(loaded_at);
        state.snapshot = Arc::clone(&snapshot);

        if self.policy.enabled {
            debug!("Cache refreshed at {}", loaded_at.to_rfc3339());
            if let Some(on_change) = &self.on_change {
                on_change(&snapshot);
            }
        }

        Ok(snapshot)
    }

    /// Last committed snapshot, if any load has succeeded
    pub async fn snapshot(&self) -> Option<Arc<ParameterSnapshot>> {
        let state = self.state.lock().await;
        state.loaded.then(|| Arc::clone(&state.snapshot))
    }

    /// Force the next access to refresh
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.loaded = false;
        state.last_loaded_at = None;
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

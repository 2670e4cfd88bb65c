//! Resolution engine
//!
//! Wires planning, elevation, fetching, caching and injection together.
//! The store client is built on first use, with elevation (when configured)
//! running just before it. A failed attempt leaves the slot empty so the
//! next invocation retries. A client built from assumed-role credentials is
//! kept until those credentials are within `CREDENTIAL_REFRESH_MARGIN_SECS`
//! of expiring; the next access then assumes the role again.
//!
//! Elevation does not depend on there being anything to fetch: with a role
//! configured and no parameters, the role is still assumed once and no
//! fetch call is made.

use crate::cache::{CacheManager, CachePolicy, Clock, OnChange, SystemClock};
use crate::elevation::{CredentialElevator, CredentialIssuer, StsCredentialIssuer};
use crate::merge::{merge, ParameterSnapshot};
use crate::planner::{plan, FetchPlan};
use crate::store::{ParameterFetcher, ParameterStore, SsmConnector, StoreConnector};
use crate::target::{EnvironmentSink, InvocationContext, ProcessEnvironment, TargetWriter};
use chrono::{DateTime, Duration, Utc};
use ssmenv_core::{ParameterOptions, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Seconds before expiry at which assumed-role credentials are replaced
pub const CREDENTIAL_REFRESH_MARGIN_SECS: i64 = 60;

/// A connected store and the expiry of the credentials it was built with
struct Connection {
    store: Arc<dyn ParameterStore>,
    expires_at: Option<DateTime<Utc>>,
}

impl Connection {
    fn is_usable(&self, now: DateTime<Utc>) -> bool {
        let margin = Duration::seconds(CREDENTIAL_REFRESH_MARGIN_SECS);
        self.expires_at
            .map_or(true, |expires_at| now < expires_at - margin)
    }
}

/// Builder for [`Engine`]
///
/// Defaults: SSM store, STS issuer, process environment, wall clock.
pub struct EngineBuilder {
    options: ParameterOptions,
    connector: Arc<dyn StoreConnector>,
    issuer: Arc<dyn CredentialIssuer>,
    environment: Arc<dyn EnvironmentSink>,
    clock: Arc<dyn Clock>,
    on_change: Option<OnChange>,
}

impl EngineBuilder {
    pub fn store_connector(mut self, connector: Arc<dyn StoreConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn credential_issuer(mut self, issuer: Arc<dyn CredentialIssuer>) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn environment(mut self, environment: Arc<dyn EnvironmentSink>) -> Self {
        self.environment = environment;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Called with the new snapshot after each refresh of an enabled cache
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ParameterSnapshot) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    /// Validate options and compute the fetch plan
    pub fn build(self) -> Result<Engine> {
        let plan = plan(&self.options)?;

        let policy = if self.options.cache {
            CachePolicy::enabled(self.options.cache_expiry())
        } else {
            CachePolicy::disabled()
        };

        debug!(
            "Planned {} fetch(es), cache {:?}",
            plan.descriptors.len(),
            policy
        );

        Ok(Engine {
            writer: TargetWriter::new(self.options.set_to_context),
            cache: CacheManager::new(policy, Arc::clone(&self.clock), self.on_change),
            elevator: CredentialElevator::new(self.issuer),
            connector: self.connector,
            environment: self.environment,
            clock: self.clock,
            connection: Mutex::new(None),
            options: self.options,
            plan,
        })
    }
}

/// Resolves configured parameters and injects them into each invocation
pub struct Engine {
    options: ParameterOptions,
    plan: FetchPlan,
    connector: Arc<dyn StoreConnector>,
    elevator: CredentialElevator,
    environment: Arc<dyn EnvironmentSink>,
    clock: Arc<dyn Clock>,
    cache: CacheManager,
    writer: TargetWriter,
    connection: Mutex<Option<Connection>>,
}

impl Engine {
    pub fn builder(options: ParameterOptions) -> EngineBuilder {
        EngineBuilder {
            options,
            connector: Arc::new(SsmConnector),
            issuer: Arc::new(StsCredentialIssuer),
            environment: Arc::new(ProcessEnvironment),
            clock: Arc::new(SystemClock),
            on_change: None,
        }
    }

    /// Engine with every default collaborator
    pub fn new(options: ParameterOptions) -> Result<Self> {
        Self::builder(options).build()
    }

    pub fn options(&self) -> &ParameterOptions {
        &self.options
    }

    pub fn plan(&self) -> &FetchPlan {
        &self.plan
    }

    /// Resolve parameters and write them to the configured targets.
    ///
    /// On error nothing is written and the context is dropped.
    pub async fn invoke(&self, mut context: InvocationContext) -> Result<InvocationContext> {
        let snapshot = self.resolve().await?;
        self.writer
            .apply(&snapshot, self.environment.as_ref(), &mut context);
        Ok(context)
    }

    /// Resolve parameters without writing them anywhere
    pub async fn resolve(&self) -> Result<Arc<ParameterSnapshot>> {
        if self.plan.is_empty() {
            debug!("No parameters configured");
            if self.elevation_configured() {
                self.store().await?;
            }
            return Ok(Arc::default());
        }
        self.cache.get_or_refresh(|| self.fetch()).await
    }

    /// Last committed snapshot
    pub async fn snapshot(&self) -> Option<Arc<ParameterSnapshot>> {
        self.cache.snapshot().await
    }

    /// Force the next invocation to fetch again
    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    async fn fetch(&self) -> Result<ParameterSnapshot> {
        let store = self.store().await?;
        let outcomes = ParameterFetcher::new(store)
            .fetch_all(&self.plan.descriptors)
            .await?;
        let snapshot = merge(&self.plan, outcomes)?;
        info!("Resolved {} parameter(s)", snapshot.len());
        Ok(snapshot)
    }

    fn elevation_configured(&self) -> bool {
        self.options
            .sts_options
            .as_ref()
            .and_then(|sts| sts.elevation())
            .is_some()
    }

    async fn store(&self) -> Result<Arc<dyn ParameterStore>> {
        let mut slot = self.connection.lock().await;
        let now = self.clock.now();

        if let Some(connection) = slot.as_ref() {
            if connection.is_usable(now) {
                return Ok(Arc::clone(&connection.store));
            }
            info!("Assumed-role credentials are expiring; assuming the role again");
        }

        let sdk_options = self
            .elevator
            .ensure_elevated(
                self.options.sts_options.as_ref(),
                &self.options.aws_sdk_options,
                now,
            )
            .await?;
        let expires_at = sdk_options
            .credentials
            .as_ref()
            .and_then(|credentials| credentials.expiration);
        let store = self.connector.connect(&sdk_options).await?;

        *slot = Some(Connection {
            store: Arc::clone(&store),
            expires_at,
        });
        Ok(store)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("plan", &self.plan)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

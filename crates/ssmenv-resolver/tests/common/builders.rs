//! Engine harness with recording fakes

use super::fakes::*;
use ssmenv_core::ParameterOptions;
use ssmenv_resolver::{Engine, EnvironmentSink, MemoryEnvironment, ParameterSnapshot};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Everything a test needs to drive and observe one engine
pub struct Harness {
    pub engine: Engine,
    pub store: Arc<FakeStore>,
    pub connector: Arc<FakeConnector>,
    pub issuer: Arc<FakeIssuer>,
    pub env: Arc<MemoryEnvironment>,
    pub clock: Arc<ManualClock>,
    pub changes: Arc<AtomicUsize>,
}

impl Harness {
    pub fn change_count(&self) -> usize {
        self.changes.load(Ordering::SeqCst)
    }

    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key)
    }
}

/// Fluent builder for [`Harness`]
pub struct HarnessBuilder {
    options: ParameterOptions,
    store: FakeStore,
    issuer: FakeIssuer,
    connector_failures: usize,
}

impl HarnessBuilder {
    pub fn new(options: ParameterOptions) -> Self {
        Self {
            options,
            store: FakeStore::new(),
            issuer: FakeIssuer::new(),
            connector_failures: 0,
        }
    }

    pub fn store(mut self, store: FakeStore) -> Self {
        self.store = store;
        self
    }

    pub fn issuer(mut self, issuer: FakeIssuer) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn connector_failures(mut self, count: usize) -> Self {
        self.connector_failures = count;
        self
    }

    pub fn build(self) -> Harness {
        let store = Arc::new(self.store);
        let connector = Arc::new(FakeConnector::new(store.clone()).failing(self.connector_failures));
        let issuer = Arc::new(self.issuer);
        let env = Arc::new(MemoryEnvironment::new());
        let clock = Arc::new(ManualClock::new());
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = changes.clone();

        let engine = Engine::builder(self.options)
            .store_connector(connector.clone())
            .credential_issuer(issuer.clone())
            .environment(env.clone())
            .clock(clock.clone())
            .on_change(move |_: &ParameterSnapshot| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .expect("options should plan");

        Harness {
            engine,
            store,
            connector,
            issuer,
            env,
            clock,
            changes,
        }
    }
}

/// Store preloaded with the service layout used across tests
pub fn service_store() -> FakeStore {
    FakeStore::new()
        .with_parameter("/dev/service_name/key_name", "key-value")
        .with_parameter("/dev/service_name/key_name2", "key-value2")
        .with_parameter("/dev/other/key_name3", "key-value3")
}

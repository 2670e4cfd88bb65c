//! Injection targets
//!
//! Resolved values always go to the environment. With `setToContext` they
//! are also copied into the per-invocation context under their context key.

use crate::merge::ParameterSnapshot;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Destination for environment variables
pub trait EnvironmentSink: Send + Sync {
    fn set(&self, key: &str, value: &str);

    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl EnvironmentSink for ProcessEnvironment {
    fn set(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    vars: Mutex<HashMap<String, String>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every variable set so far
    pub fn vars(&self) -> HashMap<String, String> {
        self.vars
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EnvironmentSink for MemoryEnvironment {
    fn set(&self, key: &str, value: &str) {
        self.vars
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

/// Per-invocation context handed to the wrapped handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    values: IndexMap<String, String>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Writes a snapshot to its targets
#[derive(Debug, Clone, Copy)]
pub struct TargetWriter {
    set_to_context: bool,
}

impl TargetWriter {
    pub fn new(set_to_context: bool) -> Self {
        Self { set_to_context }
    }

    /// Apply every entry; existing keys are overwritten
    pub fn apply(
        &self,
        snapshot: &ParameterSnapshot,
        env: &dyn EnvironmentSink,
        context: &mut InvocationContext,
    ) {
        for parameter in snapshot {
            env.set(&parameter.env_key, parameter.value.expose());
            if self.set_to_context {
                context.insert(parameter.context_key.clone(), parameter.value.expose());
            }
        }
        debug!(
            "Injected {} parameter(s){}",
            snapshot.len(),
            if self.set_to_context { " into env and context" } else { " into env" }
        );
    }
}

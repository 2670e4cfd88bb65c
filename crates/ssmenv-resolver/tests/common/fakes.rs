//! In-memory collaborators that record every call

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ssmenv_core::{AwsCredentials, Error, Result, SdkOptions};
use ssmenv_resolver::{
    AssumeRoleRequest, Clock, CredentialIssuer, ParameterRecord, ParameterStore, ParametersPage,
    PathPage, StoreConnector,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Parameter store backed by an ordered list of records
pub struct FakeStore {
    parameters: Mutex<Vec<(String, String)>>,
    page_size: usize,
    latency: Option<Duration>,
    fail_with: Mutex<Option<String>>,
    omitted: Vec<String>,
    pub name_calls: Mutex<Vec<Vec<String>>>,
    pub path_calls: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            parameters: Mutex::new(Vec::new()),
            page_size: 10,
            latency: None,
            fail_with: Mutex::new(None),
            omitted: Vec::new(),
            name_calls: Mutex::new(Vec::new()),
            path_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_parameter(self, name: &str, value: &str) -> Self {
        self.put(name, value);
        self
    }

    /// Records returned per by-path page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Leave `name` out of by-name responses without reporting it invalid
    pub fn omitting(mut self, name: &str) -> Self {
        self.omitted.push(name.to_string());
        self
    }

    /// Delay applied to every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert or replace a parameter value
    pub fn put(&self, name: &str, value: &str) {
        let mut parameters = self.parameters.lock().unwrap();
        match parameters.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => parameters.push((name.to_string(), value.to_string())),
        }
    }

    /// Make every subsequent call fail until cleared
    pub fn fail_with(&self, message: Option<&str>) {
        *self.fail_with.lock().unwrap() = message.map(str::to_string);
    }

    pub fn call_count(&self) -> usize {
        self.name_calls.lock().unwrap().len() + self.path_calls.lock().unwrap().len()
    }

    async fn before_call(&self, operation: &str) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(Error::transport_message(operation, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ParameterStore for FakeStore {
    async fn get_parameters(&self, names: &[String]) -> Result<ParametersPage> {
        self.name_calls.lock().unwrap().push(names.to_vec());
        self.before_call("GetParameters").await?;

        let parameters = self.parameters.lock().unwrap();
        let mut page = ParametersPage::default();
        for name in names.iter().filter(|n| !self.omitted.contains(*n)) {
            match parameters.iter().find(|(n, _)| n == name) {
                Some((n, v)) => page.parameters.push(ParameterRecord::new(n.clone(), v.clone())),
                None => page.invalid_parameters.push(name.clone()),
            }
        }
        Ok(page)
    }

    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<PathPage> {
        self.path_calls
            .lock()
            .unwrap()
            .push((path.to_string(), next_token.map(str::to_string)));
        self.before_call("GetParametersByPath").await?;

        let base = format!("{}/", path.trim_end_matches('/'));
        let matching: Vec<ParameterRecord> = self
            .parameters
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n.starts_with(&base))
            .map(|(n, v)| ParameterRecord::new(n.clone(), v.clone()))
            .collect();

        let start: usize = next_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + self.page_size).min(matching.len());
        Ok(PathPage {
            parameters: matching[start.min(end)..end].to_vec(),
            next_token: (end < matching.len()).then(|| end.to_string()),
        })
    }
}

/// Connector that hands out a shared `FakeStore`
pub struct FakeConnector {
    pub store: Arc<FakeStore>,
    pub connections: Mutex<Vec<SdkOptions>>,
    failures_left: AtomicUsize,
}

impl FakeConnector {
    pub fn new(store: Arc<FakeStore>) -> Self {
        Self {
            store,
            connections: Mutex::new(Vec::new()),
            failures_left: AtomicUsize::new(0),
        }
    }

    /// Fail the next `count` connection attempts
    pub fn failing(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    pub fn last_options(&self) -> Option<SdkOptions> {
        self.connections.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StoreConnector for FakeConnector {
    async fn connect(&self, options: &SdkOptions) -> Result<Arc<dyn ParameterStore>> {
        self.connections.lock().unwrap().push(options.clone());
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(Error::transport_message("connect", "endpoint unreachable"));
        }
        Ok(self.store.clone())
    }
}

/// Credential issuer that records requests
pub struct FakeIssuer {
    pub requests: Mutex<Vec<(SdkOptions, AssumeRoleRequest)>>,
    fail_with: Option<String>,
    expires_after: Option<chrono::Duration>,
}

impl FakeIssuer {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_with: None,
            expires_after: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// Issue credentials that expire this long after `MANUAL_CLOCK_START`
    pub fn expiring_after(lifetime: chrono::Duration) -> Self {
        Self {
            expires_after: Some(lifetime),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<AssumeRoleRequest> {
        self.requests.lock().unwrap().last().map(|(_, r)| r.clone())
    }
}

#[async_trait]
impl CredentialIssuer for FakeIssuer {
    async fn assume_role(
        &self,
        sdk_options: &SdkOptions,
        request: &AssumeRoleRequest,
    ) -> Result<AwsCredentials> {
        self.requests
            .lock()
            .unwrap()
            .push((sdk_options.clone(), request.clone()));
        match &self.fail_with {
            Some(message) => Err(Error::elevation_message(request.role_arn.clone(), message.clone())),
            None => {
                let issued = AwsCredentials::new(TEMP_ACCESS_KEY, "temp-secret")
                    .with_session_token("temp-token");
                Ok(match self.expires_after {
                    Some(lifetime) => issued.with_expiration(manual_clock_start() + lifetime),
                    None => issued,
                })
            }
        }
    }
}

pub const TEMP_ACCESS_KEY: &str = "ASIATEMPORARY";

/// Epoch millis every `ManualClock` starts at
pub const MANUAL_CLOCK_START: i64 = 1_700_000_000_000;

pub fn manual_clock_start() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(MANUAL_CLOCK_START).unwrap()
}

/// Clock advanced by hand
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(manual_clock_start()),
        }
    }

    pub fn advance_millis(&self, millis: i64) {
        *self.now.lock().unwrap() += chrono::Duration::milliseconds(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

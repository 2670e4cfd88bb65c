//! Parameter store access
//!
//! `ParameterStore` is the raw client contract (one call per method).
//! `ParameterFetcher` layers the fetch policy on top of it: name batching,
//! pagination continuation and ordered collection of every outcome.

pub mod ssm;

pub use ssm::{SsmConnector, SsmParameterStore};

use crate::planner::{FetchDescriptor, MAX_NAMES_PER_CALL};
use crate::secure::SecureString;
use async_trait::async_trait;
use futures::future::try_join_all;
use ssmenv_core::{Error, Result, SdkOptions};
use std::sync::Arc;
use tracing::debug;

/// A parameter as returned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRecord {
    /// Fully qualified remote name
    pub name: String,
    pub value: SecureString,
}

impl ParameterRecord {
    pub fn new(name: impl Into<String>, value: impl Into<SecureString>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Response to a by-name request
#[derive(Debug, Clone, Default)]
pub struct ParametersPage {
    pub parameters: Vec<ParameterRecord>,
    /// Requested names the store does not know
    pub invalid_parameters: Vec<String>,
}

/// One page of a by-path listing
#[derive(Debug, Clone, Default)]
pub struct PathPage {
    pub parameters: Vec<ParameterRecord>,
    pub next_token: Option<String>,
}

/// Trait for remote parameter stores
///
/// Implementations always request decrypted values.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetch a batch of named parameters
    async fn get_parameters(&self, names: &[String]) -> Result<ParametersPage>;

    /// Fetch one page of parameters under `path`, recursively
    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<PathPage>;
}

/// Builds a store client from provider-level options
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, options: &SdkOptions) -> Result<Arc<dyn ParameterStore>>;
}

/// Raw result of executing one fetch descriptor
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Names {
        records: Vec<ParameterRecord>,
        invalid: Vec<String>,
    },
    Path {
        local_prefix: String,
        path: String,
        /// All pages, concatenated in page order
        records: Vec<ParameterRecord>,
    },
}

/// Executes fetch descriptors against a store
#[derive(Clone)]
pub struct ParameterFetcher {
    store: Arc<dyn ParameterStore>,
}

impl ParameterFetcher {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self { store }
    }

    /// Fetch named parameters, at most `MAX_NAMES_PER_CALL` per call.
    ///
    /// Invalid names are returned in call order.
    pub async fn fetch_by_names(
        &self,
        names: &[String],
    ) -> Result<(Vec<ParameterRecord>, Vec<String>)> {
        let mut records = Vec::new();
        let mut invalid = Vec::new();

        for batch in names.chunks(MAX_NAMES_PER_CALL) {
            debug!("Fetching {} parameters by name", batch.len());
            let page = self.store.get_parameters(batch).await?;
            records.extend(page.parameters);
            invalid.extend(page.invalid_parameters);
        }

        Ok((records, invalid))
    }

    /// Fetch every parameter under `path`, following continuation tokens
    pub async fn fetch_by_path(
        &self,
        path: &str,
        start_token: Option<&str>,
    ) -> Result<Vec<ParameterRecord>> {
        let mut records = Vec::new();
        let mut token = start_token.map(str::to_string);
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .get_parameters_by_path(path, token.as_deref())
                .await?;
            pages += 1;
            records.extend(page.parameters);

            match page.next_token {
                Some(next) if token.as_deref() == Some(next.as_str()) => {
                    return Err(Error::transport_message(
                        "GetParametersByPath",
                        format!("pagination for {} returned the same token twice", path),
                    ));
                }
                Some(next) => token = Some(next),
                None => break,
            }
        }

        debug!(
            "Fetched {} parameters under {} in {} page(s)",
            records.len(),
            path,
            pages
        );
        Ok(records)
    }

    /// Execute one descriptor
    pub async fn fetch(&self, descriptor: &FetchDescriptor) -> Result<FetchOutcome> {
        match descriptor {
            FetchDescriptor::ByNames { names } => {
                let (records, invalid) = self.fetch_by_names(names).await?;
                Ok(FetchOutcome::Names { records, invalid })
            }
            FetchDescriptor::ByPath {
                local_prefix,
                path,
                next_token,
            } => {
                let records = self.fetch_by_path(path, next_token.as_deref()).await?;
                Ok(FetchOutcome::Path {
                    local_prefix: local_prefix.clone(),
                    path: path.clone(),
                    records,
                })
            }
        }
    }

    /// Execute all descriptors concurrently; outcomes keep submission order
    pub async fn fetch_all(&self, descriptors: &[FetchDescriptor]) -> Result<Vec<FetchOutcome>> {
        try_join_all(descriptors.iter().map(|d| self.fetch(d))).await
    }
}

impl std::fmt::Debug for ParameterFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterFetcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Store that replays scripted path pages and echoes named lookups
    #[derive(Default)]
    struct ScriptedStore {
        pages: Mutex<VecDeque<PathPage>>,
        name_calls: Mutex<Vec<Vec<String>>>,
        path_calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedStore {
        fn with_pages(pages: Vec<PathPage>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl ParameterStore for ScriptedStore {
        async fn get_parameters(&self, names: &[String]) -> Result<ParametersPage> {
            self.name_calls.lock().unwrap().push(names.to_vec());
            let (invalid, valid): (Vec<String>, Vec<String>) =
                names.iter().cloned().partition(|n| n.starts_with("invalid"));
            Ok(ParametersPage {
                parameters: valid
                    .into_iter()
                    .map(|n| ParameterRecord::new(n.clone(), format!("value-of-{}", n)))
                    .collect(),
                invalid_parameters: invalid,
            })
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
            Ok(self.pages.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_fetch_by_path_follows_tokens() {
        let store = Arc::new(ScriptedStore::with_pages(vec![
            PathPage {
                parameters: vec![
                    ParameterRecord::new("/dev/service_name/key_name1", "key-value1"),
                    ParameterRecord::new("/dev/service_name/key_name2", "key-value2"),
                ],
                next_token: Some("token".to_string()),
            },
            PathPage {
                parameters: vec![ParameterRecord::new("/dev/service_name/key_name3", "key-value3")],
                next_token: None,
            },
        ]));
        let fetcher = ParameterFetcher::new(store.clone());

        let records = fetcher.fetch_by_path("/dev/service_name", None).await.unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "/dev/service_name/key_name1",
                "/dev/service_name/key_name2",
                "/dev/service_name/key_name3"
            ]
        );
        assert_eq!(
            *store.path_calls.lock().unwrap(),
            vec![
                ("/dev/service_name".to_string(), None),
                ("/dev/service_name".to_string(), Some("token".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_by_path_rejects_stuck_pagination() {
        let stuck = PathPage {
            parameters: vec![],
            next_token: Some("same".to_string()),
        };
        let store = Arc::new(ScriptedStore::with_pages(vec![stuck.clone(), stuck]));
        let fetcher = ParameterFetcher::new(store);

        let err = fetcher.fetch_by_path("/dev", None).await.unwrap_err();
        assert!(err.to_string().contains("same token twice"));
    }

    #[tokio::test]
    async fn test_fetch_by_names_chunks_and_orders_invalid() {
        let store = Arc::new(ScriptedStore::default());
        let fetcher = ParameterFetcher::new(store.clone());

        let mut names: Vec<String> = (0..12).map(|i| format!("/dev/param_{}", i)).collect();
        names.insert(3, "invalid-a".to_string());
        names.push("invalid-b".to_string());

        let (records, invalid) = fetcher.fetch_by_names(&names).await.unwrap();

        assert_eq!(records.len(), 12);
        assert_eq!(invalid, vec!["invalid-a", "invalid-b"]);
        let sizes: Vec<usize> = store.name_calls.lock().unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 4]);
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_submission_order() {
        let store = Arc::new(ScriptedStore::with_pages(vec![PathPage {
            parameters: vec![ParameterRecord::new("/dev/a/x", "1")],
            next_token: None,
        }]));
        let fetcher = ParameterFetcher::new(store);

        let outcomes = fetcher
            .fetch_all(&[
                FetchDescriptor::ByPath {
                    local_prefix: String::new(),
                    path: "/dev/a".to_string(),
                    next_token: None,
                },
                FetchDescriptor::ByNames {
                    names: vec!["/dev/b".to_string()],
                },
            ])
            .await
            .unwrap();

        assert!(matches!(&outcomes[0], FetchOutcome::Path { path, .. } if path == "/dev/a"));
        assert!(matches!(&outcomes[1], FetchOutcome::Names { records, .. } if records.len() == 1));
    }
}

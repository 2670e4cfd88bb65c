//! AWS Systems Manager Parameter Store client

use super::{ParameterRecord, ParameterStore, ParametersPage, PathPage, StoreConnector};
use crate::aws::load_sdk_config;
use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::types::Parameter;
use aws_sdk_ssm::Client;
use ssmenv_core::{Error, Result, SdkOptions};
use std::sync::Arc;
use tracing::{debug, warn};

/// Parameter Store backed by `aws-sdk-ssm`
///
/// Every call requests decryption, and path listings are recursive.
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a client from provider-level options
    pub async fn from_options(options: &SdkOptions) -> Self {
        let sdk_config = load_sdk_config(options).await;
        Self::new(Client::new(&sdk_config))
    }

    fn records(parameters: &[Parameter]) -> Vec<ParameterRecord> {
        parameters
            .iter()
            .filter_map(|p| match (p.name(), p.value()) {
                (Some(name), Some(value)) => Some(ParameterRecord::new(name, value)),
                (name, _) => {
                    warn!("Skipping parameter without name or value: {:?}", name);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameters(&self, names: &[String]) -> Result<ParametersPage> {
        debug!("GetParameters for {} names", names.len());

        let output = self
            .client
            .get_parameters()
            .set_names(Some(names.to_vec()))
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                Error::transport("GetParameters", message, e)
            })?;

        Ok(ParametersPage {
            parameters: Self::records(output.parameters()),
            invalid_parameters: output.invalid_parameters().to_vec(),
        })
    }

    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<PathPage> {
        debug!("GetParametersByPath for {}", path);

        let output = self
            .client
            .get_parameters_by_path()
            .path(path)
            .recursive(true)
            .with_decryption(true)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                Error::transport("GetParametersByPath", message, e)
            })?;

        Ok(PathPage {
            parameters: Self::records(output.parameters()),
            next_token: output.next_token().map(str::to_string),
        })
    }
}

impl std::fmt::Debug for SsmParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsmParameterStore").finish_non_exhaustive()
    }
}

/// Connects `SsmParameterStore` clients
#[derive(Debug, Clone, Copy, Default)]
pub struct SsmConnector;

#[async_trait]
impl StoreConnector for SsmConnector {
    async fn connect(&self, options: &SdkOptions) -> Result<Arc<dyn ParameterStore>> {
        Ok(Arc::new(SsmParameterStore::from_options(options).await))
    }
}

//! Parameter Store resolution for ssmenv
//!
//! This crate resolves configured AWS SSM parameters and injects them into
//! each invocation:
//! - **Planning**: explicit names and path prefixes become batched fetches
//! - **Elevation**: optional STS AssumeRole before the store client is built
//! - **Caching**: snapshot reuse with optional expiry and change callbacks
//! - **Targets**: environment variables, plus the invocation context on request

// Core modules
pub mod aws;
pub mod cache;
pub mod elevation;
pub mod engine;
pub mod merge;
pub mod planner;
pub mod secure;
pub mod store;
pub mod target;

// Re-export commonly used items
pub use cache::{CachePolicy, Clock, OnChange, SystemClock};
pub use elevation::{AssumeRoleRequest, CredentialElevator, CredentialIssuer, StsCredentialIssuer};
pub use engine::{Engine, EngineBuilder};
pub use merge::{ParameterSnapshot, ResolvedParameter};
pub use planner::{FetchDescriptor, FetchPlan};
pub use secure::SecureString;
pub use store::{
    ParameterRecord, ParameterStore, ParametersPage, PathPage, SsmConnector, SsmParameterStore,
    StoreConnector,
};
pub use target::{EnvironmentSink, InvocationContext, MemoryEnvironment, ProcessEnvironment};

use ssmenv_core::{ParameterOptions, Result};
use std::sync::Arc;

/// Convenience function to resolve options once, without injecting anything
pub async fn resolve_parameters(options: ParameterOptions) -> Result<Arc<ParameterSnapshot>> {
    Engine::new(options)?.resolve().await
}

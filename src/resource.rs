//! Resource and data-source traits.
//!
//! Each managed resource type implements [`ManagedResource`]; each data source
//! implements [`DataSource`]. The provider dispatches host calls to them by
//! type name. Implementations receive the API client and the cancellation
//! token of the current host call and must race every remote call against it
//! with [`cancellable`].

use std::future::Future;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::NexusApi;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, Schema};
use crate::validation;

/// A resource type whose lifecycle the provider manages.
#[async_trait::async_trait]
pub trait ManagedResource: Send + Sync {
    /// Resource type name, e.g. `sonatyperepo_routing_rule`.
    fn type_name(&self) -> String;

    /// Schema of the resource.
    fn schema(&self) -> Schema;

    /// Validate a configuration. Runs before any remote call.
    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        validation::validate(&self.schema(), config)
    }

    /// Create the remote object from the planned state and return the new state.
    async fn create(
        &self,
        api: &dyn NexusApi,
        planned: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError>;

    /// Refresh state. `Ok(None)` means the object no longer exists.
    async fn read(
        &self,
        api: &dyn NexusApi,
        current: &Value,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, ProviderError>;

    /// Apply an in-place update and return the new state.
    async fn update(
        &self,
        api: &dyn NexusApi,
        prior: &Value,
        planned: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError>;

    /// Delete the remote object. Returns `false` when it was already gone.
    async fn delete(
        &self,
        api: &dyn NexusApi,
        current: &Value,
        cancel: &CancellationToken,
    ) -> Result<bool, ProviderError>;

    /// Adopt an existing object by its identifier.
    async fn import(
        &self,
        api: &dyn NexusApi,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError>;
}

/// A read-only data source.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Data source type name, e.g. `sonatyperepo_repositories`.
    fn type_name(&self) -> &'static str;

    /// Schema of the data source.
    fn schema(&self) -> Schema;

    /// Validate a configuration.
    fn validate(&self, config: &Value) -> Vec<Diagnostic> {
        validation::validate(&self.schema(), config)
    }

    /// Read the data source.
    async fn read(
        &self,
        api: &dyn NexusApi,
        config: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError>;
}

/// Run `fut` unless `cancel` fires first.
///
/// On cancellation the future is dropped, which aborts any in-flight request.
pub async fn cancellable<T, F>(
    cancel: &CancellationToken,
    operation: &str,
    fut: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(operation, "cancelled");
            Err(ProviderError::Cancelled(operation.to_string()))
        },
        result = fut => result,
    }
}

/// Deserialize state or configuration into a typed model.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ProviderError> {
    Ok(T::deserialize(value)?)
}

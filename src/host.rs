//! The plugin host boundary.
//!
//! [`ProviderService`] is the contract between the provider and whatever
//! speaks the host's wire protocol. [`ProviderHost`] sits on the host side of
//! that contract: it traces every callback and folds results and errors into
//! [`HostResponse`] values carrying diagnostics, so nothing the provider
//! returns is lost between the two.
//!
//! # Example
//!
//! ```ignore
//! use sonatyperepo_provider::{ProviderHost, SonatypeRepoProvider};
//! use serde_json::json;
//!
//! let host = ProviderHost::new(SonatypeRepoProvider::new());
//! let response = host
//!     .configure(json!({"url": "http://localhost:8081", "username": "admin", "password": "admin123"}))
//!     .await;
//! assert!(!response.has_errors());
//! ```

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{HostResponse, ImportedResource, PlanResult, ProviderMetadata};

/// Callbacks a provider exposes to the host.
///
/// Every resource and data-source callback takes the host's cancellation
/// token; implementations abort in-flight remote calls when it fires.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata. By default, this is derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        ProviderMetadata {
            resources: schema.resources.keys().cloned().collect(),
            data_sources: schema.data_sources.keys().cloned().collect(),
            capabilities: Default::default(),
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = config;
        Ok(vec![])
    }

    /// Configure the provider with credentials and settings.
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Stop the provider, cancelling in-flight work.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration before planning.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (resource_type, config);
        Ok(vec![])
    }

    /// Plan changes for a resource. A null `config` plans destruction.
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError>;

    /// Create a new resource.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
        cancel: CancellationToken,
    ) -> Result<Value, ProviderError>;

    /// Refresh a resource. `None` means it no longer exists.
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
        cancel: CancellationToken,
    ) -> Result<Option<Value>, ProviderError>;

    /// Update an existing resource in place.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
        cancel: CancellationToken,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource. Deleting an absent resource succeeds.
    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
        cancel: CancellationToken,
    ) -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
        cancel: CancellationToken,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let _ = (id, cancel);
        Err(ProviderError::UnknownResource(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let _ = (data_source_type, config);
        Ok(vec![])
    }

    /// Read a data source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
        cancel: CancellationToken,
    ) -> Result<Value, ProviderError> {
        let _ = (config, cancel);
        Err(ProviderError::UnknownResource(format!(
            "Unknown data source type: {}",
            data_source_type
        )))
    }
}

/// Host-side driver for a [`ProviderService`].
pub struct ProviderHost<P: ProviderService> {
    provider: Arc<P>,
}

impl<P: ProviderService> Clone for ProviderHost<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: ProviderService> ProviderHost<P> {
    /// Wrap a provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resource and data source names.
    #[instrument(skip(self), name = "host.get_metadata")]
    pub fn get_metadata(&self) -> ProviderMetadata {
        let metadata = self.provider.metadata();
        info!(
            resources = metadata.resources.len(),
            data_sources = metadata.data_sources.len(),
            "GetMetadata completed"
        );
        metadata
    }

    /// Full provider schema.
    #[instrument(skip(self), name = "host.get_schema")]
    pub fn get_schema(&self) -> ProviderSchema {
        let schema = self.provider.schema();
        info!(
            resources = schema.resources.len(),
            data_sources = schema.data_sources.len(),
            "GetSchema completed"
        );
        schema
    }

    /// Validate the provider block.
    #[instrument(skip(self, config), name = "host.validate_provider_config")]
    pub async fn validate_provider_config(&self, config: Value) -> HostResponse<()> {
        debug!("ValidateProviderConfig called");
        let result = self.provider.validate_provider_config(config).await;
        diagnostics_response("ValidateProviderConfig", result)
    }

    /// Configure the provider.
    #[instrument(skip(self, config), name = "host.configure")]
    pub async fn configure(&self, config: Value) -> HostResponse<()> {
        debug!("Configure called");
        let result = self.provider.configure(config).await;
        diagnostics_response("Configure", result)
    }

    /// Stop the provider.
    #[instrument(skip(self), name = "host.stop")]
    pub async fn stop(&self) -> HostResponse<()> {
        info!("Stop called");
        match self.provider.stop().await {
            Ok(()) => {
                info!("Stop completed successfully");
                HostResponse::ok(())
            },
            Err(e) => {
                error!(error = %e, "Stop failed");
                HostResponse::failed(e.into_diagnostics())
            },
        }
    }

    /// Validate a resource configuration.
    #[instrument(skip(self, config), name = "host.validate_resource_config")]
    pub async fn validate_resource_config(&self, resource_type: &str, config: Value) -> HostResponse<()> {
        debug!("ValidateResourceConfig called");
        let result = self
            .provider
            .validate_resource_config(resource_type, config)
            .await;
        diagnostics_response("ValidateResourceConfig", result)
    }

    /// Plan a resource change.
    #[instrument(skip(self, prior_state, proposed_state, config), name = "host.plan")]
    pub async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        config: Value,
    ) -> HostResponse<PlanResult> {
        debug!(is_create = prior_state.is_none(), "Plan called");
        match self
            .provider
            .plan(resource_type, prior_state, proposed_state, config)
            .await
        {
            Ok(result) => {
                info!(
                    changes = result.changes.len(),
                    requires_replace = result.requires_replace,
                    "Plan completed"
                );
                HostResponse::ok(result)
            },
            Err(e) => failure("Plan", e),
        }
    }

    /// Create a resource.
    ///
    /// When the object was created but could not be read back, the response
    /// carries both the known state and the error so the host can taint it.
    #[instrument(skip(self, planned_state, cancel), name = "host.create")]
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
        cancel: CancellationToken,
    ) -> HostResponse<Value> {
        info!("Create called");
        match self.provider.create(resource_type, planned_state, cancel).await {
            Ok(state) => {
                info!("Create completed successfully");
                HostResponse::ok(state)
            },
            Err(ProviderError::PartialCreate { name, state, source }) => {
                warn!(name = %name, error = %source, "Create completed partially");
                let known = (*state).clone();
                let diagnostics = ProviderError::PartialCreate { name, state, source }.into_diagnostics();
                HostResponse {
                    value: Some(known),
                    diagnostics,
                }
            },
            Err(e) => failure("Create", e),
        }
    }

    /// Refresh a resource. A `None` value tells the host to drop it from state.
    #[instrument(skip(self, current_state, cancel), name = "host.read")]
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
        cancel: CancellationToken,
    ) -> HostResponse<Option<Value>> {
        debug!("Read called");
        match self.provider.read(resource_type, current_state, cancel).await {
            Ok(Some(state)) => {
                debug!("Read completed successfully");
                HostResponse::ok(Some(state))
            },
            Ok(None) => {
                info!("Read found no remote object; removing from state");
                HostResponse::ok(None)
            },
            Err(e) => failure("Read", e),
        }
    }

    /// Update a resource in place.
    #[instrument(skip(self, prior_state, planned_state, cancel), name = "host.update")]
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
        cancel: CancellationToken,
    ) -> HostResponse<Value> {
        info!("Update called");
        match self
            .provider
            .update(resource_type, prior_state, planned_state, cancel)
            .await
        {
            Ok(state) => {
                info!("Update completed successfully");
                HostResponse::ok(state)
            },
            Err(e) => failure("Update", e),
        }
    }

    /// Delete a resource.
    #[instrument(skip(self, current_state, cancel), name = "host.delete")]
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
        cancel: CancellationToken,
    ) -> HostResponse<()> {
        info!("Delete called");
        match self.provider.delete(resource_type, current_state, cancel).await {
            Ok(()) => {
                info!("Delete completed successfully");
                HostResponse::ok(())
            },
            Err(e) => failure("Delete", e),
        }
    }

    /// Import a resource by id.
    #[instrument(skip(self, cancel), name = "host.import_resource_state")]
    pub async fn import_resource_state(
        &self,
        resource_type: &str,
        id: &str,
        cancel: CancellationToken,
    ) -> HostResponse<Vec<ImportedResource>> {
        info!("ImportResourceState called");
        match self.provider.import_resource(resource_type, id, cancel).await {
            Ok(imported) => {
                info!(imported_count = imported.len(), "ImportResourceState completed");
                HostResponse::ok(imported)
            },
            Err(e) => failure("ImportResourceState", e),
        }
    }

    /// Validate a data source configuration.
    #[instrument(skip(self, config), name = "host.validate_data_source_config")]
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> HostResponse<()> {
        debug!("ValidateDataSourceConfig called");
        let result = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await;
        diagnostics_response("ValidateDataSourceConfig", result)
    }

    /// Read a data source.
    #[instrument(skip(self, config, cancel), name = "host.read_data_source")]
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
        cancel: CancellationToken,
    ) -> HostResponse<Value> {
        debug!("ReadDataSource called");
        match self
            .provider
            .read_data_source(data_source_type, config, cancel)
            .await
        {
            Ok(state) => {
                info!("ReadDataSource completed successfully");
                HostResponse::ok(state)
            },
            Err(e) => failure("ReadDataSource", e),
        }
    }
}

fn diagnostics_response(
    operation: &str,
    result: Result<Vec<Diagnostic>, ProviderError>,
) -> HostResponse<()> {
    match result {
        Ok(diagnostics) => {
            if diagnostics.iter().any(Diagnostic::is_error) {
                warn!(diagnostics = diagnostics.len(), "{} completed with errors", operation);
                HostResponse::failed(diagnostics)
            } else {
                info!("{} completed successfully", operation);
                HostResponse {
                    value: Some(()),
                    diagnostics,
                }
            }
        },
        Err(e) => failure(operation, e),
    }
}

fn failure<T>(operation: &str, err: ProviderError) -> HostResponse<T> {
    if err.is_transient() {
        warn!(error = %err, "{} failed (transient)", operation);
    } else {
        error!(error = %err, "{} failed", operation);
    }
    HostResponse::failed(err.into_diagnostics())
}

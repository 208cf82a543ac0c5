//! The Sonatype Nexus Repository provider.
//!
//! [`SonatypeRepoProvider`] registers every repository resource type, the
//! routing rule resource and the data sources, and dispatches host calls to
//! them once [`ProviderService::configure`] has connected it to a server.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info};

use crate::client::{NexusApi, NexusClient};
use crate::config::ProviderConfig;
use crate::data_source::{RepositoriesDataSource, RoutingRuleDataSource, RoutingRulesDataSource};
use crate::error::ProviderError;
use crate::host::ProviderService;
use crate::plan::plan_resource;
use crate::repository::{RepositoryDescriptor, RepositoryResource};
use crate::resource::{DataSource, ManagedResource};
use crate::routing_rule::RoutingRuleResource;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{ImportedResource, PlanResult};
use crate::validation;

/// Provider for Sonatype Nexus Repository.
pub struct SonatypeRepoProvider {
    api: OnceLock<Arc<dyn NexusApi>>,
    resources: BTreeMap<String, Arc<dyn ManagedResource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for SonatypeRepoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonatypeRepoProvider")
            .field("configured", &self.api.get().is_some())
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for SonatypeRepoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SonatypeRepoProvider {
    /// An unconfigured provider.
    pub fn new() -> Self {
        let mut resources: BTreeMap<String, Arc<dyn ManagedResource>> = BTreeMap::new();
        for descriptor in RepositoryDescriptor::all() {
            resources.insert(descriptor.type_name(), Arc::new(RepositoryResource::new(descriptor)));
        }
        let routing_rule = RoutingRuleResource::new();
        resources.insert(routing_rule.type_name(), Arc::new(routing_rule));

        let mut data_sources: BTreeMap<&'static str, Arc<dyn DataSource>> = BTreeMap::new();
        let all: [Arc<dyn DataSource>; 3] = [
            Arc::new(RepositoriesDataSource),
            Arc::new(RoutingRuleDataSource),
            Arc::new(RoutingRulesDataSource),
        ];
        for data_source in all {
            data_sources.insert(data_source.type_name(), data_source);
        }

        Self {
            api: OnceLock::new(),
            resources,
            data_sources,
            shutdown: CancellationToken::new(),
        }
    }

    /// A provider already connected to `api`.
    ///
    /// Skips [`ProviderService::configure`]; used with in-memory servers.
    pub fn with_client(api: Arc<dyn NexusApi>) -> Self {
        let provider = Self::new();
        let _ = provider.api.set(api);
        provider
    }

    /// Whether the provider has a server connection.
    pub fn is_configured(&self) -> bool {
        self.api.get().is_some()
    }

    fn api(&self) -> Result<&dyn NexusApi, ProviderError> {
        self.api
            .get()
            .map(|api| api.as_ref())
            .ok_or_else(|| ProviderError::Configuration("Provider has not been configured".to_string()))
    }

    fn resource(&self, resource_type: &str) -> Result<&Arc<dyn ManagedResource>, ProviderError> {
        self.resources
            .get(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(format!("Unknown resource type: {}", resource_type)))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&Arc<dyn DataSource>, ProviderError> {
        self.data_sources.get(data_source_type).ok_or_else(|| {
            ProviderError::UnknownResource(format!("Unknown data source type: {}", data_source_type))
        })
    }

    /// A token cancelled by either the host or [`ProviderService::stop`].
    ///
    /// The watcher task ends when the guard drops.
    fn link(&self, cancel: CancellationToken) -> (CancellationToken, DropGuard) {
        let linked = self.shutdown.child_token();
        if cancel.is_cancelled() {
            linked.cancel();
        }
        let watched = linked.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => watched.cancel(),
                _ = watched.cancelled() => {},
            }
        });
        (linked.clone(), linked.drop_guard())
    }
}

fn errors_only(diagnostics: Vec<Diagnostic>) -> Result<(), ProviderError> {
    if diagnostics.iter().any(Diagnostic::is_error) {
        Err(ProviderError::Diagnostics(diagnostics))
    } else {
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProviderService for SonatypeRepoProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = self
            .resources
            .iter()
            .fold(schema, |schema, (name, resource)| schema.with_resource(name.clone(), resource.schema()));
        self.data_sources
            .iter()
            .fold(schema, |schema, (name, data_source)| {
                schema.with_data_source(*name, data_source.schema())
            })
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&ProviderConfig::schema(), &config))
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        errors_only(validation::validate(&ProviderConfig::schema(), &config))?;

        let config = ProviderConfig::from_value(&config)?;
        let connection = config.resolve_from_env().map_err(ProviderError::Diagnostics)?;
        let client = NexusClient::new(&connection)?;

        self.api
            .set(Arc::new(client))
            .map_err(|_| ProviderError::Configuration("Provider is already configured".to_string()))?;

        info!(
            url = %connection.base_url,
            username = %connection.username,
            "provider configured"
        );
        Ok(vec![])
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        self.shutdown.cancel();
        info!("provider stopped, in-flight operations cancelled");
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(self.resource(resource_type)?.validate(&config))
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        _proposed_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        if !config.is_null() {
            errors_only(resource.validate(&config))?;
        }

        let plan = plan_resource(&resource.schema(), prior_state.as_ref(), &config);
        debug!(
            resource_type,
            changes = plan.changes.len(),
            requires_replace = plan.requires_replace,
            "planned"
        );
        Ok(plan)
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
        cancel: CancellationToken,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let api = self.api()?;
        let (cancel, _guard) = self.link(cancel);
        resource.create(api, &planned_state, &cancel).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
        cancel: CancellationToken,
    ) -> Result<Option<Value>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let api = self.api()?;
        let (cancel, _guard) = self.link(cancel);
        resource.read(api, &current_state, &cancel).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
        cancel: CancellationToken,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let api = self.api()?;
        let (cancel, _guard) = self.link(cancel);
        resource.update(api, &prior_state, &planned_state, &cancel).await
    }

    async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
        cancel: CancellationToken,
    ) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        let api = self.api()?;
        let (cancel, _guard) = self.link(cancel);
        resource.delete(api, &current_state, &cancel).await.map(|_| ())
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
        cancel: CancellationToken,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let api = self.api()?;
        let (cancel, _guard) = self.link(cancel);
        let state = resource.import(api, id, &cancel).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(self.data_source(data_source_type)?.validate(&config))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
        cancel: CancellationToken,
    ) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        errors_only(data_source.validate(&config))?;
        let api = self.api()?;
        let (cancel, _guard) = self.link(cancel);
        data_source.read(api, &config, &cancel).await
    }
}

//! Testing utilities.
//!
//! [`ProviderTester`] drives a [`ProviderService`] the way the host would,
//! without a wire protocol. [`FakeNexus`] is an in-memory [`NexusApi`] that
//! enforces the server-side rules the provider relies on (unique names,
//! existing blob stores and group members, routing rule references) and,
//! like the real server, never returns stored passwords.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sonatyperepo_provider::testing::{FakeNexus, ProviderTester};
//! use sonatyperepo_provider::SonatypeRepoProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_repository() {
//!     let fake = FakeNexus::new();
//!     let tester = ProviderTester::new(SonatypeRepoProvider::with_client(Arc::new(fake.clone())));
//!
//!     let state = tester
//!         .lifecycle_create("sonatyperepo_repository_npm_hosted", json!({
//!             "name": "npm-internal",
//!             "storage": {"blob_store_name": "default"}
//!         }))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["url"], "http://localhost:8081/repository/npm-internal");
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::NexusApi;
use crate::constants::ContentDisposition;
use crate::error::ProviderError;
use crate::host::ProviderService;
use crate::repository::model::{ApiPypi, ApiRaw, ApiRepository, RepositorySummary};
use crate::repository::{RepositoryDescriptor, RepositoryFormat, RepositoryKind};
use crate::routing_rule::ApiRoutingRule;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::{ImportedResource, PlanResult};

/// A test harness for provider implementations.
///
/// Every call gets a fresh cancellation token; use the provider directly
/// to exercise cancellation.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan a resource creation (no prior state).
    pub async fn plan_create(&self, resource_type: &str, config: Value) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, config.clone(), config)
            .await
    }

    /// Plan against existing state.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), config.clone(), config)
            .await
    }

    /// Plan a resource deletion.
    pub async fn plan_delete(&self, resource_type: &str, prior_state: Value) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Create a new resource.
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.provider
            .create(resource_type, planned_state, CancellationToken::new())
            .await
    }

    /// Read the current state of a resource.
    pub async fn read(&self, resource_type: &str, current_state: Value) -> Result<Option<Value>, ProviderError> {
        self.provider
            .read(resource_type, current_state, CancellationToken::new())
            .await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state, CancellationToken::new())
            .await
    }

    /// Delete a resource.
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.provider
            .delete(resource_type, current_state, CancellationToken::new())
            .await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider
            .import_resource(resource_type, id, CancellationToken::new())
            .await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source configuration.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read data from a data source.
    pub async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config, CancellationToken::new())
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run a full create lifecycle: plan → create → read.
    ///
    /// Returns the final state after read.
    pub async fn lifecycle_create(&self, resource_type: &str, config: Value) -> Result<Value, ProviderError> {
        let plan_result = self.plan_create(resource_type, config).await?;
        let created_state = self.create(resource_type, plan_result.planned_state).await?;
        self.read_existing(resource_type, created_state).await
    }

    /// Run a full update lifecycle: plan → update → read.
    ///
    /// Returns the final state after read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let plan_result = self
            .plan_update(resource_type, prior_state.clone(), config)
            .await?;
        let updated_state = self
            .update(resource_type, prior_state, plan_result.planned_state)
            .await?;
        self.read_existing(resource_type, updated_state).await
    }

    /// Run a full delete lifecycle: plan → delete.
    pub async fn lifecycle_delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let _ = self
            .plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }

    /// Run a full CRUD lifecycle: create → read → update → read → delete.
    ///
    /// Returns the state after the update (before delete).
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created_state = self.lifecycle_create(resource_type, initial_config).await?;
        let updated_state = self
            .lifecycle_update(resource_type, created_state, updated_config)
            .await?;
        self.lifecycle_delete(resource_type, updated_state.clone())
            .await?;
        Ok(updated_state)
    }

    async fn read_existing(&self, resource_type: &str, state: Value) -> Result<Value, ProviderError> {
        let name = state["name"].as_str().unwrap_or_default().to_string();
        self.read(resource_type, state)
            .await?
            .ok_or(ProviderError::NotFound(name))
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// In-memory server
// =========================================================================

/// In-memory stand-in for the server.
///
/// Clones share state, so a test can keep one handle for assertions and hand
/// another to the provider.
#[derive(Clone)]
pub struct FakeNexus {
    inner: Arc<Mutex<FakeState>>,
}

struct FakeState {
    base_url: String,
    blob_stores: Vec<String>,
    repositories: Vec<(RepositoryDescriptor, ApiRepository)>,
    routing_rules: Vec<ApiRoutingRule>,
    calls: Vec<String>,
    fail_next_read: Option<ProviderError>,
    unavailable: bool,
}

impl Default for FakeNexus {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeNexus {
    /// An empty server at `http://localhost:8081` with the `default` blob store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                base_url: "http://localhost:8081".to_string(),
                blob_stores: vec![crate::constants::DEFAULT_BLOB_STORE_NAME.to_string()],
                repositories: Vec::new(),
                routing_rules: Vec::new(),
                calls: Vec::new(),
                fail_next_read: None,
                unavailable: false,
            })),
        }
    }

    /// Add a blob store.
    pub fn with_blob_store(self, name: &str) -> Self {
        self.state().blob_stores.push(name.to_string());
        self
    }

    /// Make the next single-object read fail with `err`.
    pub fn fail_next_get(&self, err: ProviderError) {
        self.state().fail_next_read = Some(err);
    }

    /// Answer every call with a 5xx-style error while `unavailable` is set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// Every call made so far, e.g. `POST /repositories/maven/hosted`.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Whether a repository exists.
    pub fn has_repository(&self, name: &str) -> bool {
        self.state().repository(name).is_some()
    }

    /// The stored repository, as the server would return it.
    pub fn repository(&self, name: &str) -> Option<ApiRepository> {
        self.state().repository(name).map(|(_, repo)| repo.clone())
    }

    /// Delete a repository behind the provider's back.
    pub fn remove_repository(&self, name: &str) -> bool {
        let mut state = self.state();
        let before = state.repositories.len();
        state.repositories.retain(|(_, repo)| repo.name != name);
        state.repositories.len() != before
    }

    /// Whether a routing rule exists.
    pub fn has_routing_rule(&self, name: &str) -> bool {
        self.state().routing_rules.iter().any(|r| r.name == name)
    }

    /// Delete a routing rule behind the provider's back.
    pub fn remove_routing_rule(&self, name: &str) -> bool {
        let mut state = self.state();
        let before = state.routing_rules.len();
        state.routing_rules.retain(|r| r.name != name);
        state.routing_rules.len() != before
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a call and fail it when the server is marked unavailable.
    fn call(&self, call: String) -> Result<MutexGuard<'_, FakeState>, ProviderError> {
        let mut state = self.state();
        state.calls.push(call.clone());
        if state.unavailable {
            return Err(ProviderError::Unavailable(format!("HTTP 503 on {}", call)));
        }
        Ok(state)
    }
}

impl FakeState {
    fn repository(&self, name: &str) -> Option<&(RepositoryDescriptor, ApiRepository)> {
        self.repositories
            .iter()
            .find(|(_, repo)| repo.name.eq_ignore_ascii_case(name))
    }

    /// Reject what the real server rejects on create and update.
    fn check_references(&self, body: &ApiRepository) -> Result<(), ProviderError> {
        let resource = format!("repository {}", body.name);
        let rejected = |message: String| ProviderError::Remote {
            status: 400,
            resource: resource.clone(),
            message,
        };

        if let Some(blob_store) = body.storage.as_ref().and_then(|s| s.blob_store_name.as_ref()) {
            if !self.blob_stores.contains(blob_store) {
                return Err(rejected(format!("Blob store '{}' not found", blob_store)));
            }
        }
        if let Some(group) = &body.group {
            if let Some(missing) = group
                .member_names
                .iter()
                .find(|member| self.repository(member).is_none())
            {
                return Err(rejected(format!("Repository '{}' does not exist", missing)));
            }
        }
        if let Some(rule) = &body.routing_rule {
            if !self.routing_rules.iter().any(|r| &r.name == rule) {
                return Err(rejected(format!("Routing rule '{}' does not exist", rule)));
            }
        }
        Ok(())
    }

    /// What the server stores and returns for a request body.
    fn stored(&self, descriptor: RepositoryDescriptor, body: &ApiRepository) -> ApiRepository {
        let mut stored = body.clone();
        stored.format = Some(descriptor.format.api_name().to_string());
        stored.kind = Some(descriptor.kind.as_str().to_string());
        stored.url = Some(format!("{}/repository/{}", self.base_url, body.name));

        if let Some(auth) = stored
            .http_client
            .as_mut()
            .and_then(|client| client.authentication.as_mut())
        {
            auth.password = None;
        }
        if descriptor.format == RepositoryFormat::Raw && stored.raw.is_none() {
            stored.raw = Some(ApiRaw {
                content_disposition: Some(ContentDisposition::Attachment),
            });
        }
        if descriptor.format == RepositoryFormat::Pypi
            && descriptor.kind == RepositoryKind::Proxy
            && stored.pypi.is_none()
        {
            stored.pypi = Some(ApiPypi {
                remove_quarantined: Some(false),
            });
        }
        stored
    }
}

#[async_trait::async_trait]
impl NexusApi for FakeNexus {
    async fn create_repository(
        &self,
        descriptor: RepositoryDescriptor,
        body: &ApiRepository,
    ) -> Result<(), ProviderError> {
        let mut state = self.call(format!(
            "POST /repositories/{}/{}",
            descriptor.format, descriptor.kind
        ))?;

        if state.repository(&body.name).is_some() {
            return Err(ProviderError::AlreadyExists(format!(
                "repository {}: Name is already used, must be unique (ignoring case)",
                body.name
            )));
        }
        state.check_references(body)?;

        let stored = state.stored(descriptor, body);
        state.repositories.push((descriptor, stored));
        Ok(())
    }

    async fn get_repository(
        &self,
        descriptor: RepositoryDescriptor,
        name: &str,
    ) -> Result<Option<ApiRepository>, ProviderError> {
        let mut state = self.call(format!(
            "GET /repositories/{}/{}/{}",
            descriptor.format, descriptor.kind, name
        ))?;
        if let Some(err) = state.fail_next_read.take() {
            return Err(err);
        }
        Ok(state
            .repository(name)
            .filter(|(d, _)| *d == descriptor)
            .map(|(_, repo)| repo.clone()))
    }

    async fn get_repository_summary(
        &self,
        name: &str,
    ) -> Result<Option<RepositorySummary>, ProviderError> {
        let state = self.call(format!("GET /repositories/{}", name))?;
        Ok(state.repository(name).map(|(_, repo)| summary(repo)))
    }

    async fn update_repository(
        &self,
        descriptor: RepositoryDescriptor,
        name: &str,
        body: &ApiRepository,
    ) -> Result<(), ProviderError> {
        let mut state = self.call(format!(
            "PUT /repositories/{}/{}/{}",
            descriptor.format, descriptor.kind, name
        ))?;
        state.check_references(body)?;

        let stored = state.stored(descriptor, body);
        match state
            .repositories
            .iter_mut()
            .find(|(d, repo)| *d == descriptor && repo.name == name)
        {
            Some((_, repo)) => {
                *repo = stored;
                Ok(())
            },
            None => Err(ProviderError::NotFound(format!("repository {}", name))),
        }
    }

    async fn delete_repository(&self, name: &str) -> Result<bool, ProviderError> {
        let mut state = self.call(format!("DELETE /repositories/{}", name))?;
        let before = state.repositories.len();
        state.repositories.retain(|(_, repo)| repo.name != name);
        Ok(state.repositories.len() != before)
    }

    async fn list_repositories(&self) -> Result<Vec<RepositorySummary>, ProviderError> {
        let state = self.call("GET /repositories".to_string())?;
        Ok(state.repositories.iter().map(|(_, repo)| summary(repo)).collect())
    }

    async fn create_routing_rule(&self, rule: &ApiRoutingRule) -> Result<(), ProviderError> {
        let mut state = self.call("POST /routing-rules".to_string())?;
        if state.routing_rules.iter().any(|r| r.name == rule.name) {
            return Err(ProviderError::AlreadyExists(format!(
                "routing rule {}: A routing rule with the same name already exists",
                rule.name
            )));
        }

        let mut stored = rule.clone();
        stored.description.get_or_insert_with(String::new);
        state.routing_rules.push(stored);
        Ok(())
    }

    async fn get_routing_rule(&self, name: &str) -> Result<Option<ApiRoutingRule>, ProviderError> {
        let mut state = self.call(format!("GET /routing-rules/{}", name))?;
        if let Some(err) = state.fail_next_read.take() {
            return Err(err);
        }
        Ok(state.routing_rules.iter().find(|r| r.name == name).cloned())
    }

    async fn update_routing_rule(
        &self,
        name: &str,
        rule: &ApiRoutingRule,
    ) -> Result<(), ProviderError> {
        let mut state = self.call(format!("PUT /routing-rules/{}", name))?;
        let mut stored = rule.clone();
        stored.description.get_or_insert_with(String::new);
        match state.routing_rules.iter_mut().find(|r| r.name == name) {
            Some(existing) => {
                *existing = stored;
                Ok(())
            },
            None => Err(ProviderError::NotFound(format!("routing rule {}", name))),
        }
    }

    async fn delete_routing_rule(&self, name: &str) -> Result<bool, ProviderError> {
        let mut state = self.call(format!("DELETE /routing-rules/{}", name))?;

        let users = state
            .repositories
            .iter()
            .filter(|(_, repo)| repo.routing_rule.as_deref() == Some(name))
            .count();
        if users > 0 {
            return Err(ProviderError::Remote {
                status: 400,
                resource: format!("routing rule {}", name),
                message: format!("Routing rule is still in use by {} repositories.", users),
            });
        }

        let before = state.routing_rules.len();
        state.routing_rules.retain(|r| r.name != name);
        Ok(state.routing_rules.len() != before)
    }

    async fn list_routing_rules(&self) -> Result<Vec<ApiRoutingRule>, ProviderError> {
        let state = self.call("GET /routing-rules".to_string())?;
        Ok(state.routing_rules.clone())
    }
}

fn summary(repo: &ApiRepository) -> RepositorySummary {
    RepositorySummary {
        name: repo.name.clone(),
        format: repo.format.clone().unwrap_or_default(),
        kind: repo.kind.clone().unwrap_or_default(),
        url: repo.url.clone(),
        online: repo.online,
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that a plan result indicates the resource will be created.
///
/// # Panics
///
/// Panics if the plan has no changes or requires replacement.
pub fn assert_plan_creates(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes for create, but got no changes"
    );
    assert!(!plan.requires_replace, "Expected plan to create, not replace");
}

/// Assert that a plan result indicates no changes.
///
/// # Panics
///
/// Panics if the plan has any changes.
pub fn assert_plan_no_changes(plan: &PlanResult) {
    assert!(
        plan.is_empty(),
        "Expected no changes, but got {} change(s): {:?}",
        plan.changes.len(),
        plan.changed_paths()
    );
}

/// Assert that a plan result indicates changes are needed.
///
/// # Panics
///
/// Panics if the plan has no changes.
pub fn assert_plan_has_changes(plan: &PlanResult) {
    assert!(
        !plan.changes.is_empty(),
        "Expected plan to have changes, but got no changes"
    );
}

/// Assert that a plan requires resource replacement.
///
/// # Panics
///
/// Panics if the plan does not require replacement.
pub fn assert_plan_replaces(plan: &PlanResult) {
    assert!(
        plan.requires_replace,
        "Expected plan to require replacement, but it does not"
    );
}

/// Assert that a plan does not require resource replacement.
///
/// # Panics
///
/// Panics if the plan requires replacement.
pub fn assert_plan_updates_in_place(plan: &PlanResult) {
    assert!(
        !plan.requires_replace,
        "Expected plan to update in place, but it requires replacement"
    );
}

/// Assert that a plan has a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan does not have a change for the given path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.changes.iter().any(|c| c.path == path),
        "Expected plan to change attribute '{}', but it was not changed. Changed attributes: {:?}",
        path,
        plan.changed_paths()
    );
}

/// Assert that a plan does not have a change for a specific attribute path.
///
/// # Panics
///
/// Panics if the plan has a change for the given path.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    assert!(
        !plan.changes.iter().any(|c| c.path == path),
        "Expected plan to not change attribute '{}', but it was changed",
        path
    );
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics
            .iter()
            .any(|d| matches!(d.severity, DiagnosticSeverity::Error)),
        "Expected at least one error, but got none"
    );
}

/// Assert that an error diagnostic mentions `substring` in its summary or detail.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        diagnostics.iter().any(|d| d.is_error() && d.mentions(substring)),
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| (&d.summary, &d.detail))
            .collect::<Vec<_>>()
    );
}

/// Assert that an error diagnostic is scoped to `attribute`.
///
/// # Panics
///
/// Panics if no error diagnostic carries that attribute path.
pub fn assert_error_at(diagnostics: &[Diagnostic], attribute: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.attribute.as_deref() == Some(attribute)),
        "Expected an error at '{}', but got errors at {:?}",
        attribute,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.attribute)
            .collect::<Vec<_>>()
    );
}

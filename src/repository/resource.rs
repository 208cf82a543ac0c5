//! Repository lifecycle.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::NexusApi;
use crate::error::ProviderError;
use crate::resource::{cancellable, decode, ManagedResource};
use crate::schema::{Diagnostic, Schema};

use super::model::{ApiRepository, RepositoryModel};
use super::{RepositoryCodec, RepositoryDescriptor};

/// One repository resource type, e.g. `sonatyperepo_repository_npm_proxy`.
#[derive(Debug, Clone)]
pub struct RepositoryResource {
    descriptor: RepositoryDescriptor,
    codec: RepositoryCodec,
    schema: Schema,
}

impl RepositoryResource {
    /// Create the resource type for a descriptor.
    pub fn new(descriptor: RepositoryDescriptor) -> Self {
        Self {
            descriptor,
            codec: RepositoryCodec::new(descriptor),
            schema: descriptor.schema(),
        }
    }

    /// The `(format, kind)` this resource manages.
    pub fn descriptor(&self) -> RepositoryDescriptor {
        self.descriptor
    }

    /// State written for a server response, projected onto the schema.
    fn state(&self, response: ApiRepository, prior: &RepositoryModel) -> Result<Value, ProviderError> {
        let model = self.codec.from_response(response, prior);
        Ok(self.schema.project(&serde_json::to_value(&model)?))
    }

    async fn fetch(
        &self,
        api: &dyn NexusApi,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ApiRepository>, ProviderError> {
        cancellable(
            cancel,
            &format!("read repository {}", name),
            api.get_repository(self.descriptor, name),
        )
        .await
    }
}

#[async_trait::async_trait]
impl ManagedResource for RepositoryResource {
    fn type_name(&self) -> String {
        self.descriptor.type_name()
    }

    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    async fn create(
        &self,
        api: &dyn NexusApi,
        planned: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let model: RepositoryModel = decode(planned)?;
        let payload = self.codec.to_payload(&model);
        info!(repository = %model.name, kind = %self.descriptor, "creating repository");

        cancellable(
            cancel,
            &format!("create repository {}", model.name),
            api.create_repository(self.descriptor, &payload),
        )
        .await?;

        let source = match self.fetch(api, &model.name, cancel).await {
            Ok(Some(response)) => return self.state(response, &model),
            Ok(None) => ProviderError::NotFound(format!("repository {}", model.name)),
            Err(err) => err,
        };

        warn!(repository = %model.name, error = %source, "repository created but not read back");
        Err(ProviderError::PartialCreate {
            name: model.name,
            state: Box::new(self.schema.project(planned)),
            source: Box::new(source),
        })
    }

    async fn read(
        &self,
        api: &dyn NexusApi,
        current: &Value,
        cancel: &CancellationToken,
    ) -> Result<Option<Value>, ProviderError> {
        let model: RepositoryModel = decode(current)?;
        match self.fetch(api, &model.name, cancel).await? {
            Some(response) => Ok(Some(self.state(response, &model)?)),
            None => {
                info!(repository = %model.name, "repository no longer exists, removing from state");
                Ok(None)
            },
        }
    }

    async fn update(
        &self,
        api: &dyn NexusApi,
        _prior: &Value,
        planned: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let model: RepositoryModel = decode(planned)?;
        let payload = self.codec.to_payload(&model);
        info!(repository = %model.name, kind = %self.descriptor, "updating repository");

        cancellable(
            cancel,
            &format!("update repository {}", model.name),
            api.update_repository(self.descriptor, &model.name, &payload),
        )
        .await?;

        let response = self
            .fetch(api, &model.name, cancel)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("repository {}", model.name)))?;
        self.state(response, &model)
    }

    async fn delete(
        &self,
        api: &dyn NexusApi,
        current: &Value,
        cancel: &CancellationToken,
    ) -> Result<bool, ProviderError> {
        let model: RepositoryModel = decode(current)?;
        let deleted = cancellable(
            cancel,
            &format!("delete repository {}", model.name),
            api.delete_repository(&model.name),
        )
        .await?;

        if !deleted {
            debug!(repository = %model.name, "repository already absent");
        }
        Ok(deleted)
    }

    async fn import(
        &self,
        api: &dyn NexusApi,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let summary = cancellable(
            cancel,
            &format!("read repository {}", id),
            api.get_repository_summary(id),
        )
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("repository {}", id)))?;

        let d = self.descriptor;
        if !d.format.matches(&summary.format) || summary.kind != d.kind.as_str() {
            return Err(ProviderError::Diagnostics(vec![Diagnostic::error(
                "Unexpected repository type",
            )
            .with_detail(format!(
                "Repository {} is a {} {} repository and cannot be imported as {}",
                id,
                summary.format,
                summary.kind,
                d.type_name()
            ))]));
        }

        let prior = RepositoryModel {
            name: id.to_string(),
            ..Default::default()
        };
        let response = self
            .fetch(api, id, cancel)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("repository {}", id)))?;
        self.state(response, &prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{RepositoryFormat, RepositoryKind};
    use crate::testing::FakeNexus;
    use serde_json::json;

    fn resource(format: RepositoryFormat, kind: RepositoryKind) -> RepositoryResource {
        RepositoryResource::new(RepositoryDescriptor::new(format, kind))
    }

    fn raw_hosted_config() -> Value {
        json!({
            "name": "raw-internal",
            "online": true,
            "storage": {
                "blob_store_name": "default",
                "strict_content_type_validation": true,
                "write_policy": "ALLOW"
            }
        })
    }

    #[tokio::test]
    async fn test_create_populates_url_and_projects_state() {
        let fake = FakeNexus::new();
        let res = resource(RepositoryFormat::Raw, RepositoryKind::Hosted);
        let cancel = CancellationToken::new();

        let state = res.create(&fake, &raw_hosted_config(), &cancel).await.unwrap();

        assert_eq!(state["url"], json!("http://localhost:8081/repository/raw-internal"));
        assert_eq!(state["cleanup"], Value::Null);
        assert!(state.get("proxy").is_none());
        assert!(state.get("maven").is_none());
    }

    #[tokio::test]
    async fn test_partial_create_when_read_back_fails() {
        let fake = FakeNexus::new();
        fake.fail_next_get(ProviderError::Unavailable("HTTP 503".into()));
        let res = resource(RepositoryFormat::Raw, RepositoryKind::Hosted);

        let err = res
            .create(&fake, &raw_hosted_config(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ProviderError::PartialCreate { name, state, source } => {
                assert_eq!(name, "raw-internal");
                assert_eq!(state["name"], json!("raw-internal"));
                assert!(source.is_transient());
            },
            other => panic!("expected partial create, got {:?}", other),
        }
        assert!(fake.has_repository("raw-internal"));
    }

    #[tokio::test]
    async fn test_read_missing_repository_is_none() {
        let fake = FakeNexus::new();
        let res = resource(RepositoryFormat::Raw, RepositoryKind::Hosted);
        let state = res
            .read(&fake, &raw_hosted_config(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let fake = FakeNexus::new();
        let res = resource(RepositoryFormat::Raw, RepositoryKind::Hosted);
        let cancel = CancellationToken::new();
        let state = res.create(&fake, &raw_hosted_config(), &cancel).await.unwrap();

        assert!(res.delete(&fake, &state, &cancel).await.unwrap());
        assert!(!res.delete(&fake, &state, &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_import_checks_format_and_kind() {
        let fake = FakeNexus::new();
        let cancel = CancellationToken::new();
        resource(RepositoryFormat::Raw, RepositoryKind::Hosted)
            .create(&fake, &raw_hosted_config(), &cancel)
            .await
            .unwrap();

        let imported = resource(RepositoryFormat::Raw, RepositoryKind::Hosted)
            .import(&fake, "raw-internal", &cancel)
            .await
            .unwrap();
        assert_eq!(imported["name"], json!("raw-internal"));
        assert_eq!(imported["storage"]["write_policy"], json!("ALLOW"));

        let err = resource(RepositoryFormat::Npm, RepositoryKind::Hosted)
            .import(&fake, "raw-internal", &cancel)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("raw hosted repository"));

        let err = resource(RepositoryFormat::Raw, RepositoryKind::Hosted)
            .import(&fake, "missing", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancelled_create_makes_no_call() {
        let fake = FakeNexus::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resource(RepositoryFormat::Raw, RepositoryKind::Hosted)
            .create(&fake, &raw_hosted_config(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled(_)));
        assert!(!fake.has_repository("raw-internal"));
    }

    #[tokio::test]
    async fn test_update_changes_online() {
        let fake = FakeNexus::new();
        let res = resource(RepositoryFormat::Raw, RepositoryKind::Hosted);
        let cancel = CancellationToken::new();
        let state = res.create(&fake, &raw_hosted_config(), &cancel).await.unwrap();

        let mut planned = state.clone();
        planned["online"] = json!(false);
        let updated = res.update(&fake, &state, &planned, &cancel).await.unwrap();
        assert_eq!(updated["online"], json!(false));
        assert_eq!(updated["url"], state["url"]);
    }
}

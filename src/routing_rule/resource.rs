//! Routing rule lifecycle.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::NexusApi;
use crate::error::ProviderError;
use crate::resource::{cancellable, decode, ManagedResource};
use crate::schema::Schema;

use super::{from_response, to_payload, ApiRoutingRule, RoutingRuleModel, TYPE_NAME};

/// The `sonatyperepo_routing_rule` resource.
#[derive(Debug, Clone)]
pub struct RoutingRuleResource {
    schema: Schema,
}

impl Default for RoutingRuleResource {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutingRuleResource {
    /// Create the resource type.
    pub fn new() -> Self {
        Self {
            schema: super::schema(),
        }
    }

    fn state(&self, response: ApiRoutingRule, prior: &RoutingRuleModel) -> Result<Value, ProviderError> {
        let model = from_response(response, prior);
        Ok(self.schema.project(&serde_json::to_value(&model)?))
    }

    async fn fetch(
        &self,
        api: &dyn NexusApi,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ApiRoutingRule>, ProviderError> {
        cancellable(
            cancel,
            &format!("read routing rule {}", name),
            api.get_routing_rule(name),
        )
        .await
    }
}

#[async_trait::async_trait]
impl ManagedResource for RoutingRuleResource {
    fn type_name(&self) -> String {
        TYPE_NAME.to_string()
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
        let model: RoutingRuleModel = decode(planned)?;
        info!(routing_rule = %model.name, "creating routing rule");

        cancellable(
            cancel,
            &format!("create routing rule {}", model.name),
            api.create_routing_rule(&to_payload(&model)),
        )
        .await?;

        let source = match self.fetch(api, &model.name, cancel).await {
            Ok(Some(response)) => return self.state(response, &model),
            Ok(None) => ProviderError::NotFound(format!("routing rule {}", model.name)),
            Err(err) => err,
        };

        warn!(routing_rule = %model.name, error = %source, "routing rule created but not read back");
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
        let model: RoutingRuleModel = decode(current)?;
        match self.fetch(api, &model.name, cancel).await? {
            Some(response) => Ok(Some(self.state(response, &model)?)),
            None => {
                info!(routing_rule = %model.name, "routing rule no longer exists, removing from state");
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
        let model: RoutingRuleModel = decode(planned)?;
        info!(routing_rule = %model.name, "updating routing rule");

        cancellable(
            cancel,
            &format!("update routing rule {}", model.name),
            api.update_routing_rule(&model.name, &to_payload(&model)),
        )
        .await?;

        let response = self
            .fetch(api, &model.name, cancel)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("routing rule {}", model.name)))?;
        self.state(response, &model)
    }

    async fn delete(
        &self,
        api: &dyn NexusApi,
        current: &Value,
        cancel: &CancellationToken,
    ) -> Result<bool, ProviderError> {
        let model: RoutingRuleModel = decode(current)?;
        let deleted = cancellable(
            cancel,
            &format!("delete routing rule {}", model.name),
            api.delete_routing_rule(&model.name),
        )
        .await?;

        if !deleted {
            debug!(routing_rule = %model.name, "routing rule already absent");
        }
        Ok(deleted)
    }

    async fn import(
        &self,
        api: &dyn NexusApi,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let prior = RoutingRuleModel {
            name: id.to_string(),
            ..Default::default()
        };
        let response = self
            .fetch(api, id, cancel)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("routing rule {}", id)))?;
        self.state(response, &prior)
    }
}

//! Read-only data sources.

use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::NexusApi;
use crate::error::ProviderError;
use crate::resource::{cancellable, DataSource};
use crate::routing_rule::{self, RoutingRuleModel};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

/// `sonatyperepo_repositories`: every repository on the server.
#[derive(Debug, Default, Clone, Copy)]
pub struct RepositoriesDataSource;

/// `sonatyperepo_routing_rule`: one routing rule by name.
///
/// There is no prior state to compare against, so an empty description on
/// the server reads as unset. A managed rule configured with `""` keeps
/// `""` in its own state.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoutingRuleDataSource;

/// `sonatyperepo_routing_rules`: every routing rule on the server.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoutingRulesDataSource;

#[derive(Serialize)]
struct RepositoryEntry {
    name: String,
    format: String,
    #[serde(rename = "type")]
    kind: String,
    url: Option<String>,
    online: Option<bool>,
}

fn routing_rule_object() -> AttributeType {
    AttributeType::object([
        ("name", AttributeType::String),
        ("description", AttributeType::String),
        ("mode", AttributeType::String),
        ("matchers", AttributeType::list(AttributeType::String)),
    ])
}

#[async_trait::async_trait]
impl DataSource for RepositoriesDataSource {
    fn type_name(&self) -> &'static str {
        "sonatyperepo_repositories"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("List all repositories")
            .with_attribute(
                "repositories",
                Attribute::new(
                    AttributeType::list(AttributeType::object([
                        ("name", AttributeType::String),
                        ("format", AttributeType::String),
                        ("type", AttributeType::String),
                        ("url", AttributeType::String),
                        ("online", AttributeType::Bool),
                    ])),
                    AttributeFlags::computed(),
                )
                .with_description("Repositories in server order"),
            )
    }

    async fn read(
        &self,
        api: &dyn NexusApi,
        _config: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let repositories: Vec<RepositoryEntry> =
            cancellable(cancel, "list repositories", api.list_repositories())
                .await?
                .into_iter()
                .map(|summary| RepositoryEntry {
                    name: summary.name,
                    format: summary.format,
                    kind: summary.kind,
                    url: summary.url,
                    online: summary.online,
                })
                .collect();
        debug!(count = repositories.len(), "listed repositories");
        Ok(json!({ "repositories": repositories }))
    }
}

#[async_trait::async_trait]
impl DataSource for RoutingRuleDataSource {
    fn type_name(&self) -> &'static str {
        routing_rule::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        routing_rule::attributes(true).into_iter().fold(
            Schema::v0().with_description("Look up a routing rule by name"),
            |schema, (name, attr)| schema.with_attribute(name, attr),
        )
    }

    async fn read(
        &self,
        api: &dyn NexusApi,
        config: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let name = config
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let response = cancellable(
            cancel,
            &format!("read routing rule {}", name),
            api.get_routing_rule(name),
        )
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("routing rule {}", name)))?;

        let model = routing_rule::from_response(response, &RoutingRuleModel::default());
        Ok(self.schema().project(&serde_json::to_value(&model)?))
    }
}

#[async_trait::async_trait]
impl DataSource for RoutingRulesDataSource {
    fn type_name(&self) -> &'static str {
        "sonatyperepo_routing_rules"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("List all routing rules")
            .with_attribute(
                "routing_rules",
                Attribute::new(
                    AttributeType::list(routing_rule_object()),
                    AttributeFlags::computed(),
                )
                .with_description("Routing rules in server order"),
            )
    }

    async fn read(
        &self,
        api: &dyn NexusApi,
        _config: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value, ProviderError> {
        let rules: Vec<RoutingRuleModel> =
            cancellable(cancel, "list routing rules", api.list_routing_rules())
                .await?
                .into_iter()
                .map(|rule| routing_rule::from_response(rule, &RoutingRuleModel::default()))
                .collect();
        debug!(count = rules.len(), "listed routing rules");
        Ok(json!({ "routing_rules": rules }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing_rule::RoutingRuleResource;
    use crate::resource::ManagedResource;
    use crate::testing::FakeNexus;

    #[tokio::test]
    async fn test_routing_rule_matches_resource_state() {
        let fake = FakeNexus::new();
        let cancel = CancellationToken::new();
        let state = RoutingRuleResource::new()
            .create(
                &fake,
                &json!({
                    "name": "test-routing-rule-ds",
                    "mode": "BLOCK",
                    "matchers": ["^/com/example/.*", "^/org/example/.*"]
                }),
                &cancel,
            )
            .await
            .unwrap();

        let data = RoutingRuleDataSource
            .read(&fake, &json!({"name": "test-routing-rule-ds"}), &cancel)
            .await
            .unwrap();
        assert_eq!(data, state);
    }

    #[tokio::test]
    async fn test_empty_description_reads_as_unset() {
        let fake = FakeNexus::new();
        let cancel = CancellationToken::new();
        let state = RoutingRuleResource::new()
            .create(
                &fake,
                &json!({
                    "name": "blank-description",
                    "description": "",
                    "mode": "ALLOW",
                    "matchers": ["^/com/example/.*"]
                }),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(state["description"], json!(""));

        let data = RoutingRuleDataSource
            .read(&fake, &json!({"name": "blank-description"}), &cancel)
            .await
            .unwrap();
        assert_eq!(data["description"], Value::Null);
        for key in ["name", "mode", "matchers"] {
            assert_eq!(data[key], state[key]);
        }
    }

    #[tokio::test]
    async fn test_missing_routing_rule_is_an_error() {
        let fake = FakeNexus::new();
        let err = RoutingRuleDataSource
            .read(&fake, &json!({"name": "nope"}), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_routing_rules() {
        let fake = FakeNexus::new();
        let cancel = CancellationToken::new();
        for name in ["b-rule", "a-rule"] {
            RoutingRuleResource::new()
                .create(
                    &fake,
                    &json!({"name": name, "mode": "ALLOW", "matchers": ["^/x/.*"]}),
                    &cancel,
                )
                .await
                .unwrap();
        }

        let data = RoutingRulesDataSource
            .read(&fake, &Value::Null, &cancel)
            .await
            .unwrap();
        let names: Vec<_> = data["routing_rules"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["b-rule", "a-rule"]);
        assert_eq!(data["routing_rules"][0]["mode"], json!("ALLOW"));
    }

    #[tokio::test]
    async fn test_list_repositories() {
        let fake = FakeNexus::new();
        let cancel = CancellationToken::new();
        crate::repository::RepositoryResource::new(crate::repository::RepositoryDescriptor::new(
            crate::repository::RepositoryFormat::Maven,
            crate::repository::RepositoryKind::Hosted,
        ))
        .create(
            &fake,
            &json!({"name": "maven-releases", "storage": {"blob_store_name": "default"}}),
            &cancel,
        )
        .await
        .unwrap();

        let data = RepositoriesDataSource
            .read(&fake, &Value::Null, &cancel)
            .await
            .unwrap();
        assert_eq!(
            data["repositories"],
            json!([{
                "name": "maven-releases",
                "format": "maven2",
                "type": "hosted",
                "url": "http://localhost:8081/repository/maven-releases",
                "online": true
            }])
        );
    }

    #[test]
    fn test_routing_rule_schema_requires_name() {
        let schema = RoutingRuleDataSource.schema();
        assert!(schema.block.attributes["name"].flags.required);
        assert!(schema.block.attributes["matchers"].flags.computed);
    }
}

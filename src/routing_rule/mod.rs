//! Routing rules.
//!
//! A routing rule is a named list of path regular expressions that a proxy
//! repository evaluates before fetching from its remote. Repositories refer
//! to rules by name through their `routing_rule` attribute.

pub mod resource;

pub use resource::RoutingRuleResource;

use serde::{Deserialize, Serialize};

use crate::constants::RoutingRuleMode;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema, Validator};

/// Resource type name of a routing rule.
pub const TYPE_NAME: &str = "sonatyperepo_routing_rule";

/// A routing rule as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingRuleModel {
    /// Unique name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Whether matching requests are blocked or allowed.
    pub mode: Option<RoutingRuleMode>,
    /// Regular expressions evaluated in order.
    pub matchers: Option<Vec<String>>,
}

/// A routing rule as exchanged with the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiRoutingRule {
    /// Unique name.
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Evaluation mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RoutingRuleMode>,
    /// Regular expressions evaluated in order.
    pub matchers: Vec<String>,
}

/// Attributes of a routing rule; shared with the single-rule data source.
pub fn attributes(computed: bool) -> Vec<(&'static str, Attribute)> {
    let matchers_type = AttributeType::list(AttributeType::String);
    if computed {
        return vec![
            ("name", Attribute::required_string().with_description("Name of the routing rule")),
            ("description", Attribute::computed_string().with_description("Description of the routing rule")),
            ("mode", Attribute::computed_string().with_description("BLOCK or ALLOW")),
            (
                "matchers",
                Attribute::new(matchers_type, AttributeFlags::computed())
                    .with_description("Regular expressions evaluated against request paths"),
            ),
        ];
    }

    vec![
        (
            "name",
            Attribute::required_string()
                .with_description("Name of the routing rule")
                .with_validator(Validator::LengthAtLeast { min: 1 })
                .requires_replace(),
        ),
        (
            "description",
            Attribute::optional_string().with_description("Description of the routing rule"),
        ),
        (
            "mode",
            Attribute::required_string()
                .with_description("BLOCK denies matching requests; ALLOW permits only matching requests")
                .with_validator(Validator::one_of(RoutingRuleMode::values())),
        ),
        (
            "matchers",
            Attribute::new(matchers_type, AttributeFlags::required())
                .with_description("Regular expressions evaluated against request paths, in order")
                .with_validator(Validator::SizeAtLeast { min: 1 })
                .with_validator(Validator::ElementsAreRegex),
        ),
    ]
}

/// Schema of the routing rule resource.
pub fn schema() -> Schema {
    attributes(false)
        .into_iter()
        .fold(
            Schema::v0().with_description("Manage routing rules"),
            |schema, (name, attr)| schema.with_attribute(name, attr),
        )
}

/// Request body for a routing rule.
pub fn to_payload(model: &RoutingRuleModel) -> ApiRoutingRule {
    ApiRoutingRule {
        name: model.name.clone(),
        description: model.description.clone(),
        mode: model.mode,
        matchers: model.matchers.clone().unwrap_or_default(),
    }
}

/// State for a routing rule returned by the server.
///
/// The server reports a missing description as `""`; that maps back to
/// unset unless state already held a description.
pub fn from_response(response: ApiRoutingRule, prior: &RoutingRuleModel) -> RoutingRuleModel {
    let description = match response.description {
        Some(d) if d.is_empty() && prior.description.is_none() => None,
        other => other,
    };

    RoutingRuleModel {
        name: response.name,
        description,
        mode: response.mode,
        matchers: Some(response.matchers),
    }
}

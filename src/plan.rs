//! Schema-driven planning.
//!
//! Planning turns configuration plus prior state into the state the host
//! should expect after apply. The rules, applied recursively through nested
//! blocks:
//!
//! - a value set in configuration is planned as-is;
//! - otherwise the attribute's default is planned;
//! - otherwise a computed attribute marked `UseStateForUnknown` keeps the
//!   prior state's value;
//! - otherwise the value is null.
//!
//! The diff compares the prior and planned states leaf by leaf. A change to
//! an attribute marked `RequiresReplace` turns an update into a replacement.

use serde_json::{Map, Value};

use crate::schema::{Attribute, Block, NestedBlock, PlanModifier, Schema};
use crate::types::{AttributeChange, PlanResult};

/// Plan a resource. `config` null means destroy.
pub fn plan_resource(schema: &Schema, prior: Option<&Value>, config: &Value) -> PlanResult {
    let prior = prior.filter(|p| !p.is_null());

    if config.is_null() {
        return match prior {
            Some(prior) => plan_destroy(schema, prior),
            None => PlanResult::no_change(Value::Null),
        };
    }

    let planned = planned_block(&schema.block, prior, config);
    let mut changes = Vec::new();
    let mut requires_replace = false;
    diff_block(
        &schema.block,
        "",
        prior,
        &planned,
        &mut changes,
        &mut requires_replace,
    );

    PlanResult::with_changes(planned, changes, requires_replace && prior.is_some())
}

fn plan_destroy(schema: &Schema, prior: &Value) -> PlanResult {
    let changes = schema
        .project(prior)
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| AttributeChange::removed(k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default();
    PlanResult::with_changes(Value::Null, changes, false)
}

/// Compute the planned value of `block` from configuration and prior state.
pub fn planned_block(block: &Block, prior: Option<&Value>, config: &Value) -> Value {
    let mut out = Map::new();

    for (name, attr) in &block.attributes {
        let configured = config.get(name).filter(|v| !v.is_null());
        let prior_value = prior.and_then(|p| p.get(name)).filter(|v| !v.is_null());
        out.insert(name.clone(), planned_attribute(attr, configured, prior_value));
    }

    for (name, nested) in &block.blocks {
        let configured = config.get(name).filter(|v| !v.is_null());
        let prior_value = prior.and_then(|p| p.get(name)).filter(|v| !v.is_null());
        out.insert(name.clone(), planned_nested(nested, configured, prior_value));
    }

    Value::Object(out)
}

fn planned_attribute(attr: &Attribute, configured: Option<&Value>, prior: Option<&Value>) -> Value {
    if let Some(v) = configured {
        return v.clone();
    }
    if let Some(default) = &attr.default {
        return default.clone();
    }
    if (attr.flags.computed || attr.flags.write_only)
        && attr.has_modifier(PlanModifier::UseStateForUnknown)
    {
        if let Some(v) = prior {
            return v.clone();
        }
    }
    Value::Null
}

fn planned_nested(nested: &NestedBlock, configured: Option<&Value>, prior: Option<&Value>) -> Value {
    match configured {
        Some(config) => planned_block(&nested.block, prior, config),
        None if nested.computed && nested.has_modifier(PlanModifier::UseStateForUnknown) => {
            match prior {
                Some(prior) => nested.block.project(prior),
                None => Value::Null,
            }
        },
        None => Value::Null,
    }
}

fn diff_block(
    block: &Block,
    path: &str,
    prior: Option<&Value>,
    planned: &Value,
    changes: &mut Vec<AttributeChange>,
    requires_replace: &mut bool,
) {
    for (name, attr) in &block.attributes {
        let attr_path = join(path, name);
        let before = prior.and_then(|p| p.get(name)).filter(|v| !v.is_null());
        let after = planned.get(name).filter(|v| !v.is_null());
        if before == after {
            continue;
        }
        if attr.has_modifier(PlanModifier::RequiresReplace) {
            *requires_replace = true;
        }
        changes.push(AttributeChange::new(attr_path, before.cloned(), after.cloned()));
    }

    for (name, nested) in &block.blocks {
        let block_path = join(path, name);
        let before = prior.and_then(|p| p.get(name)).filter(|v| !v.is_null());
        let after = planned.get(name).filter(|v| !v.is_null());
        match (before, after) {
            (None, None) => {},
            (Some(before), None) => {
                changes.push(AttributeChange::removed(block_path, before.clone()));
            },
            (before, Some(after)) => {
                if nested.has_modifier(PlanModifier::RequiresReplace) && before != Some(after) {
                    *requires_replace = true;
                }
                diff_block(
                    &nested.block,
                    &block_path,
                    before,
                    after,
                    changes,
                    requires_replace,
                );
            },
        }
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, Block, NestedBlock, Schema};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute("name", Attribute::required_string().requires_replace())
            .with_attribute("online", Attribute::optional_bool().with_default(json!(true)))
            .with_attribute("url", Attribute::computed_string().use_state_for_unknown())
            .with_block(
                "storage",
                NestedBlock::required(
                    Block::new()
                        .with_attribute(
                            "blob_store_name",
                            Attribute::optional_string().with_default(json!("default")),
                        )
                        .with_attribute(
                            "strict_content_type_validation",
                            Attribute::optional_bool().computed().use_state_for_unknown(),
                        ),
                ),
            )
            .with_block(
                "negative_cache",
                NestedBlock::optional_computed(
                    Block::new().with_attribute(
                        "time_to_live",
                        Attribute::optional_int64().with_default(json!(1440)),
                    ),
                ),
            )
            .with_block(
                "cleanup",
                NestedBlock::optional(
                    Block::new().with_attribute("policy_names", Attribute::optional_string_list()),
                ),
            )
    }

    #[test]
    fn test_create_fills_defaults() {
        let plan = plan_resource(&schema(), None, &json!({"name": "raw-hosted", "storage": {}}));

        assert_eq!(
            plan.planned_state,
            json!({
                "name": "raw-hosted",
                "online": true,
                "url": null,
                "storage": {"blob_store_name": "default", "strict_content_type_validation": null},
                "negative_cache": null,
                "cleanup": null
            })
        );
        assert!(!plan.requires_replace);
        assert!(plan.changed_paths().contains(&"name"));
        assert!(plan.changed_paths().contains(&"storage.blob_store_name"));
        assert!(!plan.changed_paths().contains(&"url"));
    }

    #[test]
    fn test_second_plan_is_empty() {
        let config = json!({"name": "raw-hosted", "storage": {"blob_store_name": "default"}});
        let state = json!({
            "name": "raw-hosted",
            "online": true,
            "url": "http://nexus/repository/raw-hosted",
            "storage": {"blob_store_name": "default", "strict_content_type_validation": true},
            "negative_cache": {"time_to_live": 1440},
            "cleanup": null
        });

        let plan = plan_resource(&schema(), Some(&state), &config);
        assert!(plan.is_empty(), "unexpected changes: {:?}", plan.changes);
        assert_eq!(plan.planned_state, state);
    }

    #[test]
    fn test_name_change_requires_replace() {
        let state = json!({"name": "old", "online": true, "storage": {"blob_store_name": "default"}});
        let plan = plan_resource(
            &schema(),
            Some(&state),
            &json!({"name": "new", "storage": {}}),
        );

        assert!(plan.requires_replace);
        assert_eq!(
            plan.changes[0],
            AttributeChange::modified("name", json!("old"), json!("new"))
        );
    }

    #[test]
    fn test_in_place_update() {
        let state = json!({"name": "raw", "online": true, "storage": {"blob_store_name": "default"}});
        let plan = plan_resource(
            &schema(),
            Some(&state),
            &json!({"name": "raw", "online": false, "storage": {}}),
        );

        assert!(!plan.requires_replace);
        assert_eq!(plan.changed_paths(), vec!["online"]);
    }

    #[test]
    fn test_removing_optional_block() {
        let state = json!({
            "name": "raw",
            "online": true,
            "storage": {"blob_store_name": "default"},
            "cleanup": {"policy_names": ["weekly"]}
        });
        let plan = plan_resource(&schema(), Some(&state), &json!({"name": "raw", "storage": {}}));

        assert_eq!(plan.changed_paths(), vec!["cleanup"]);
        assert!(plan.planned_state["cleanup"].is_null());
    }

    #[test]
    fn test_destroy_plan() {
        let state = json!({"name": "raw", "online": true, "url": null});
        let plan = plan_resource(&schema(), Some(&state), &Value::Null);

        assert!(plan.planned_state.is_null());
        assert!(plan.changes.iter().all(|c| c.after.is_none()));
        assert!(plan.changed_paths().contains(&"name"));
        assert!(!plan.changed_paths().contains(&"url"));
    }

    #[test]
    fn test_destroy_without_prior_is_noop() {
        let plan = plan_resource(&schema(), None, &Value::Null);
        assert!(plan.is_empty());
    }
}

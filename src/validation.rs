//! Plan-time validation of configuration against a [`Schema`].
//!
//! Validation runs before any remote call. It checks structure (required
//! attributes and blocks, read-only attributes, unexpected arguments, value
//! types), then the per-attribute [`Validator`]s, then the schema's
//! cross-field [`ConfigValidator`]s. Every diagnostic carries the dotted
//! attribute path it refers to.
//!
//! The detail strings produced here are a stable contract: callers and tests
//! match on them.
//!
//! # Example
//!
//! ```
//! use sonatyperepo_provider::schema::{Attribute, Schema, Validator};
//! use sonatyperepo_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0().with_attribute(
//!     "retries",
//!     Attribute::optional_int64().with_validator(Validator::Int64Between { min: 0, max: 10 }),
//! );
//!
//! assert!(validate(&schema, &json!({"retries": 3})).is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"retries": 11}));
//! assert_eq!(
//!     diagnostics[0].detail.as_deref(),
//!     Some("Attribute retries value must be between 0 and 10, got: 11")
//! );
//! ```

use crate::schema::{
    Attribute, AttributeType, Block, ConfigValidator, Diagnostic, NestedBlock, Schema, Validator,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Validate a configuration value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes and blocks must be present and non-null
/// - Computed-only attributes must not be configured
/// - Arguments not declared in the schema are rejected
/// - Attribute types must match the schema
/// - Attribute validators run on present, well-typed values
/// - Cross-field validators run last, on the whole configuration
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    if value.is_object() {
        for validator in &schema.validators {
            validate_config(validator, value, &mut diagnostics);
        }
    }
    diagnostics
}

/// Validate a configuration value, returning Ok if valid or Err with diagnostics.
///
/// This is a convenience wrapper around [`validate`] that returns a Result.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.iter().any(Diagnostic::is_error) {
        Err(diagnostics)
    } else {
        Ok(())
    }
}

/// Check if a configuration value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate_result(schema, value).is_ok()
}

/// Look up a non-null value at a dotted path.
pub fn value_at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let found = path
        .split('.')
        .try_fold(value, |current, segment| current.get(segment))?;
    if found.is_null() {
        None
    } else {
        Some(found)
    }
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => {
            // Null is valid for optional blocks, but we can't validate further
            return;
        },
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value)))
                    .with_attribute_if_not_empty(path),
            );
            return;
        },
    };

    for key in obj.keys() {
        if !block.attributes.contains_key(key) && !block.blocks.contains_key(key) {
            diagnostics.push(
                Diagnostic::error("Unsupported argument")
                    .with_detail(format!("An argument named \"{}\" is not expected here.", key))
                    .with_attribute(join_path(path, key)),
            );
        }
    }

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested_block) in &block.blocks {
        let block_path = join_path(path, name);
        validate_nested_block(nested_block, obj.get(name), &block_path, diagnostics);
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(missing_argument(path));
            }
        },
        Some(_) if attr.flags.is_computed_only() => {
            diagnostics.push(
                Diagnostic::error("Invalid Configuration for Read-Only Attribute")
                    .with_detail(format!(
                        "Cannot set value for attribute {} as the provider has marked it as read-only. \
                         Remove the configuration line setting the value.",
                        path
                    ))
                    .with_attribute(path),
            );
        },
        Some(v) => {
            let before = diagnostics.len();
            validate_attribute_type(&attr.attr_type, v, path, diagnostics);
            if diagnostics.len() == before {
                for validator in &attr.validators {
                    run_validator(validator, v, path, diagnostics);
                }
            }
        },
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if !is_int64(value) {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        },
        AttributeType::List(element_type) => {
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "list", value));
            }
        },
        AttributeType::Object(attrs) => {
            if let Some(obj) = value.as_object() {
                validate_object_type(attrs, obj, path, diagnostics);
            } else {
                diagnostics.push(type_error(path, "object", value));
            }
        },
    }
}

fn validate_object_type(
    attrs: &BTreeMap<String, AttributeType>,
    obj: &serde_json::Map<String, Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, attr_type) in attrs {
        let attr_path = join_path(path, name);
        if let Some(value) = obj.get(name).filter(|v| !v.is_null()) {
            validate_attribute_type(attr_type, value, &attr_path, diagnostics);
        }
        // Object attributes within a type don't have required/optional flags,
        // so we don't enforce presence
    }
}

fn validate_nested_block(
    nested: &NestedBlock,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if nested.required {
                diagnostics.push(missing_argument(path));
            }
        },
        Some(v) => validate_block(&nested.block, v, path, diagnostics),
    }
}

fn run_validator(validator: &Validator, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    match validator {
        Validator::Int64Between { min, max } => {
            if let Some(n) = as_i64(value) {
                if n < *min || n > *max {
                    diagnostics.push(invalid_value(
                        "Invalid Attribute Value",
                        path,
                        format!(
                            "Attribute {} value must be between {} and {}, got: {}",
                            path, min, max, n
                        ),
                    ));
                }
            }
        },
        Validator::Int64AtLeast { min } => {
            if let Some(n) = as_i64(value) {
                if n < *min {
                    diagnostics.push(invalid_value(
                        "Invalid Attribute Value",
                        path,
                        format!("Attribute {} value must be at least {}, got: {}", path, min, n),
                    ));
                }
            }
        },
        Validator::OneOf { values } => {
            if let Some(s) = value.as_str() {
                if !values.iter().any(|v| v == s) {
                    let quoted = values
                        .iter()
                        .map(|v| format!("{:?}", v))
                        .collect::<Vec<_>>()
                        .join(" ");
                    diagnostics.push(invalid_value(
                        "Invalid Attribute Value Match",
                        path,
                        format!(
                            "Attribute {} value must be one of: [{}], got: {:?}",
                            path, quoted, s
                        ),
                    ));
                }
            }
        },
        Validator::HttpUrl => {
            if let Some(s) = value.as_str() {
                if !is_http_url(s) {
                    diagnostics.push(invalid_value(
                        "Invalid Attribute Value Match",
                        path,
                        format!("Attribute {} must be a valid HTTP URL, got: {}", path, s),
                    ));
                }
            }
        },
        Validator::LengthAtLeast { min } => {
            if let Some(s) = value.as_str() {
                let len = s.chars().count();
                if len < *min {
                    diagnostics.push(invalid_value(
                        "Invalid Attribute Value Length",
                        path,
                        format!(
                            "Attribute {} string length must be at least {}, got: {}",
                            path, min, len
                        ),
                    ));
                }
            }
        },
        Validator::SizeAtLeast { min } => {
            if let Some(arr) = value.as_array() {
                if arr.len() < *min {
                    diagnostics.push(invalid_value(
                        "Invalid Attribute Value",
                        path,
                        format!(
                            "Attribute {} list must contain at least {} elements, got: {}",
                            path,
                            min,
                            arr.len()
                        ),
                    ));
                }
            }
        },
        Validator::ElementsAreRegex => {
            for (i, elem) in value.as_array().into_iter().flatten().enumerate() {
                let Some(pattern) = elem.as_str() else {
                    continue;
                };
                if let Some(err) = regex_error(pattern) {
                    let elem_path = format!("{}.{}", path, i);
                    diagnostics.push(
                        invalid_value(
                            "Invalid Attribute Value",
                            &elem_path,
                            format!(
                                "Attribute {} value must be a valid regular expression, got: {}",
                                elem_path, pattern
                            ),
                        )
                        .with_detail_suffix(&err),
                    );
                }
            }
        },
    }
}

fn validate_config(validator: &ConfigValidator, config: &Value, diagnostics: &mut Vec<Diagnostic>) {
    match validator {
        ConfigValidator::MemberOf { attribute, list } => {
            let Some(member) = value_at(config, attribute).and_then(Value::as_str) else {
                return;
            };
            let members = value_at(config, list)
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(Value::as_str).collect::<Vec<_>>())
                .unwrap_or_default();
            if !members.contains(&member) {
                diagnostics.push(invalid_value(
                    "Invalid Attribute Combination",
                    attribute,
                    format!(
                        "Attribute {} value must be one of the values of {}, got: {:?}",
                        attribute, list, member
                    ),
                ));
            }
        },
        ConfigValidator::RequiredWhen {
            attribute,
            when,
            equals,
        } => {
            let triggered = value_at(config, when).and_then(Value::as_str) == Some(equals.as_str());
            if triggered && value_at(config, attribute).is_none() {
                diagnostics.push(invalid_value(
                    "Missing Attribute Configuration",
                    attribute,
                    format!(
                        "Attribute {} must be specified when {} is {:?}",
                        attribute, when, equals
                    ),
                ));
            }
        },
    }
}

// Helper functions

/// Whether `s` is an absolute `http`/`https` URL with a host.
pub fn is_http_url(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|h| !h.is_empty())
        },
        Err(_) => false,
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    as_i64(value).is_some()
}

// Floats are rejected even when whole; state decodes into i64.
fn as_i64(value: &Value) -> Option<i64> {
    value.as_i64()
}

/// Compile error of a matcher, if any.
///
/// Matchers run on the server as Java patterns, so look-around and
/// backreferences are legal; those fall through to `fancy_regex`.
fn regex_error(pattern: &str) -> Option<String> {
    match regex::Regex::new(pattern) {
        Ok(_) => None,
        Err(_) => fancy_regex::Regex::new(pattern).err().map(|err| err.to_string()),
    }
}

fn missing_argument(path: &str) -> Diagnostic {
    Diagnostic::error("Missing required argument")
        .with_detail(format!(
            "The argument \"{}\" is required, but no definition was found.",
            path
        ))
        .with_attribute(path)
}

fn invalid_value(summary: &str, path: &str, detail: String) -> Diagnostic {
    Diagnostic::error(summary)
        .with_detail(detail)
        .with_attribute(path)
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", path))
        .with_detail(format!(
            "Expected {}, got {}",
            expected,
            value_type_name(got)
        ))
        .with_attribute(path)
}

trait DiagnosticExt {
    fn with_attribute_if_not_empty(self, path: &str) -> Self;
    fn with_detail_suffix(self, suffix: &str) -> Self;
}

impl DiagnosticExt for Diagnostic {
    fn with_attribute_if_not_empty(self, path: &str) -> Self {
        if path.is_empty() {
            self
        } else {
            self.with_attribute(path)
        }
    }

    fn with_detail_suffix(mut self, suffix: &str) -> Self {
        if let Some(detail) = self.detail.as_mut() {
            detail.push_str(" (");
            detail.push_str(suffix);
            detail.push(')');
        }
        self
    }
}

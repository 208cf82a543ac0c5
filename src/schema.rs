//! Schema types for describing provider, resource and data source structure.
//!
//! A schema is a tree of attribute descriptors. Besides type and
//! required/optional/computed flags, each attribute carries its default value,
//! the validators evaluated at plan time and the plan modifiers that control
//! replacement and state carry-over. All maps are ordered so that schema
//! output, validation and plan diffs are deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The type of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A string value.
    String,
    /// A 64-bit integer.
    Int64,
    /// A boolean value.
    Bool,
    /// An ordered list of values of a single type.
    List(Box<AttributeType>),
    /// An object with a fixed set of attributes.
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    /// Create a list type.
    pub fn list(element_type: AttributeType) -> Self {
        Self::List(Box::new(element_type))
    }

    /// Create an object type from `(name, type)` pairs.
    pub fn object<'a>(attributes: impl IntoIterator<Item = (&'a str, AttributeType)>) -> Self {
        Self::Object(
            attributes
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        )
    }
}

/// Describes how an attribute can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    /// The attribute is required in configuration.
    pub required: bool,
    /// The attribute is optional in configuration.
    pub optional: bool,
    /// The attribute is computed by the provider (read-only).
    pub computed: bool,
    /// The attribute is sensitive and should be hidden in logs/UI.
    pub sensitive: bool,
    /// The server never returns this value; state keeps the configured one.
    pub write_only: bool,
}

impl AttributeFlags {
    /// Create flags for a required attribute.
    pub fn required() -> Self {
        Self {
            required: true,
            ..Default::default()
        }
    }

    /// Create flags for an optional attribute.
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Default::default()
        }
    }

    /// Create flags for a computed attribute (read-only, set by provider).
    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Default::default()
        }
    }

    /// Create flags for an optional+computed attribute (can be set, but has default from provider).
    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Default::default()
        }
    }

    /// Mark the attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Whether configuration can never set this attribute.
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// Plan-time rule attached to an attribute.
///
/// Messages produced by these validators are part of the provider's public
/// contract; see [`crate::validation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Validator {
    /// Integer within `[min, max]`.
    Int64Between {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// Integer at least `min`.
    Int64AtLeast {
        /// Inclusive lower bound.
        min: i64,
    },
    /// String equal to one of the listed values.
    OneOf {
        /// Accepted values.
        values: Vec<String>,
    },
    /// String that parses as an absolute `http` or `https` URL.
    HttpUrl,
    /// String with at least `min` characters.
    LengthAtLeast {
        /// Minimum length.
        min: usize,
    },
    /// List with at least `min` elements.
    SizeAtLeast {
        /// Minimum number of elements.
        min: usize,
    },
    /// List whose string elements each compile as a regular expression.
    ElementsAreRegex,
}

impl Validator {
    /// Shorthand for [`Validator::OneOf`].
    pub fn one_of<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        Self::OneOf {
            values: values.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Controls how an attribute behaves when a plan is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// A change to this attribute destroys and recreates the resource.
    RequiresReplace,
    /// When configuration leaves the value unset, plan keeps the prior state
    /// instead of marking it unknown.
    UseStateForUnknown,
}

/// Describes a single attribute in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The type of the attribute.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Flags describing how the attribute can be used.
    #[serde(flatten)]
    pub flags: AttributeFlags,
    /// Human-readable description of the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value for the attribute (JSON-encoded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Validators evaluated at plan time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    /// Plan modifiers applied when diffing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
}

impl Attribute {
    /// Create a new attribute with the given type and flags.
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            default: None,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
        }
    }

    /// Create a required string attribute.
    pub fn required_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::required())
    }

    /// Create an optional string attribute.
    pub fn optional_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::optional())
    }

    /// Create a computed string attribute.
    pub fn computed_string() -> Self {
        Self::new(AttributeType::String, AttributeFlags::computed())
    }

    /// Create an optional int64 attribute.
    pub fn optional_int64() -> Self {
        Self::new(AttributeType::Int64, AttributeFlags::optional())
    }

    /// Create an optional bool attribute.
    pub fn optional_bool() -> Self {
        Self::new(AttributeType::Bool, AttributeFlags::optional())
    }

    /// Create an optional list-of-strings attribute.
    pub fn optional_string_list() -> Self {
        Self::new(
            AttributeType::list(AttributeType::String),
            AttributeFlags::optional(),
        )
    }

    /// Set the description for this attribute.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a default value for this attribute.
    ///
    /// An attribute with a default is optional+computed: it can be omitted and
    /// the planned value is then the default.
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.flags.optional = true;
        self.flags.computed = true;
        self.flags.required = false;
        self.default = Some(default);
        self
    }

    /// Attach a validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Changing this attribute forces resource replacement.
    pub fn requires_replace(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::RequiresReplace);
        self
    }

    /// Keep the prior state value when configuration leaves this unset.
    pub fn use_state_for_unknown(mut self) -> Self {
        self.plan_modifiers.push(PlanModifier::UseStateForUnknown);
        self
    }

    /// Make an optional attribute optional+computed (server-side default).
    pub fn computed(mut self) -> Self {
        self.flags.computed = true;
        self
    }

    /// Mark this attribute as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.flags.sensitive = true;
        self
    }

    /// Mark this attribute as sensitive and never returned by the server.
    pub fn write_only(mut self) -> Self {
        self.flags.sensitive = true;
        self.flags.write_only = true;
        self
    }

    /// Whether the attribute has the given plan modifier.
    pub fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }
}

/// A set of attributes and nested blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Block {
    /// The attributes within this block.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Attribute>,
    /// Nested blocks within this block.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<String, NestedBlock>,
    /// Human-readable description of the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Block {
    /// Create a new empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute to this block.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Add a nested block to this block.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Set the description for this block.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Find the attribute at a dotted path such as `group.member_names`.
    pub fn attribute_at(&self, path: &str) -> Option<&Attribute> {
        match path.split_once('.') {
            None => self.attributes.get(path),
            Some((head, rest)) => self.blocks.get(head)?.block.attribute_at(rest),
        }
    }

    /// Shape `value` so it holds exactly this block's attributes and blocks.
    ///
    /// Keys not declared here are dropped, declared keys that are missing
    /// become `null`, and nested blocks are projected recursively.
    pub fn project(&self, value: &serde_json::Value) -> serde_json::Value {
        let source = match value.as_object() {
            Some(obj) => obj,
            None => return serde_json::Value::Null,
        };
        let mut out = serde_json::Map::new();
        for name in self.attributes.keys() {
            let v = source.get(name).cloned().unwrap_or(serde_json::Value::Null);
            out.insert(name.clone(), v);
        }
        for (name, nested) in &self.blocks {
            let v = source
                .get(name)
                .map(|v| nested.block.project(v))
                .unwrap_or(serde_json::Value::Null);
            out.insert(name.clone(), v);
        }
        serde_json::Value::Object(out)
    }
}

/// A single nested object block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    /// The block definition.
    #[serde(flatten)]
    pub block: Block,
    /// The block must be present in configuration.
    #[serde(default)]
    pub required: bool,
    /// The provider fills the block when configuration omits it.
    #[serde(default)]
    pub computed: bool,
    /// Plan modifiers applied to the block as a whole.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan_modifiers: Vec<PlanModifier>,
}

impl NestedBlock {
    /// An optional block (absent means null in state).
    pub fn optional(block: Block) -> Self {
        Self {
            block,
            required: false,
            computed: false,
            plan_modifiers: Vec::new(),
        }
    }

    /// A block that must be configured.
    pub fn required(block: Block) -> Self {
        Self {
            required: true,
            ..Self::optional(block)
        }
    }

    /// An optional block that the server fills in when omitted.
    ///
    /// The prior state is kept on plan when configuration leaves it out.
    pub fn optional_computed(block: Block) -> Self {
        Self {
            computed: true,
            plan_modifiers: vec![PlanModifier::UseStateForUnknown],
            ..Self::optional(block)
        }
    }

    /// Whether the block has the given plan modifier.
    pub fn has_modifier(&self, modifier: PlanModifier) -> bool {
        self.plan_modifiers.contains(&modifier)
    }
}

/// A rule that inspects several attributes of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConfigValidator {
    /// When `attribute` is set, it must be one of the elements of `list`.
    MemberOf {
        /// Path of the string attribute.
        attribute: String,
        /// Path of the list attribute.
        list: String,
    },
    /// `attribute` must be set whenever `when` equals `equals`.
    RequiredWhen {
        /// Path of the attribute that becomes required.
        attribute: String,
        /// Path of the attribute whose value is checked.
        when: String,
        /// Value that triggers the requirement.
        equals: String,
    },
}

/// Schema for a resource or data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    /// The version of this schema (for state upgrades).
    #[serde(default)]
    pub version: u64,
    /// The root block containing all attributes and nested blocks.
    #[serde(flatten)]
    pub block: Block,
    /// Cross-field validators evaluated after attribute validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ConfigValidator>,
}

impl Schema {
    /// Create a new schema with the given version.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            block: Block::new(),
            validators: Vec::new(),
        }
    }

    /// Create a schema at version 0.
    pub fn v0() -> Self {
        Self::new(0)
    }

    /// Add an attribute to the schema.
    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block.attributes.insert(name.into(), attr);
        self
    }

    /// Add a nested block to the schema.
    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block.blocks.insert(name.into(), block);
        self
    }

    /// Set the description of the root block.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.block.description = Some(description.into());
        self
    }

    /// Add a cross-field validator.
    pub fn with_validator(mut self, validator: ConfigValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Shape a state value onto this schema; see [`Block::project`].
    pub fn project(&self, value: &serde_json::Value) -> serde_json::Value {
        self.block.project(value)
    }
}

/// Schema for the provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    /// Schema for provider configuration.
    #[serde(default)]
    pub provider: Schema,
    /// Schemas for each resource type.
    #[serde(default)]
    pub resources: BTreeMap<String, Schema>,
    /// Schemas for each data source type.
    #[serde(default)]
    pub data_sources: BTreeMap<String, Schema>,
}

impl ProviderSchema {
    /// Create a new empty provider schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provider configuration schema.
    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    /// Add a resource schema.
    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    /// Add a data source schema.
    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents the operation from completing.
    Error,
    /// A warning that doesn't prevent the operation but should be addressed.
    Warning,
}

/// A diagnostic message from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Error)
    }

    /// Whether the summary or detail mentions `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.summary.contains(needle)
            || self
                .detail
                .as_deref()
                .is_some_and(|detail| detail.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_type_constructors() {
        let list = AttributeType::list(AttributeType::String);
        assert!(matches!(list, AttributeType::List(_)));

        let object = AttributeType::object([("name", AttributeType::String)]);
        match object {
            AttributeType::Object(attrs) => assert!(attrs.contains_key("name")),
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_attribute_flags() {
        let required = AttributeFlags::required();
        assert!(required.required);
        assert!(!required.optional);
        assert!(!required.computed);

        let computed = AttributeFlags::computed();
        assert!(computed.is_computed_only());

        let optional_computed = AttributeFlags::optional_computed();
        assert!(optional_computed.optional);
        assert!(optional_computed.computed);
        assert!(!optional_computed.is_computed_only());

        let sensitive = AttributeFlags::required().sensitive();
        assert!(sensitive.sensitive);
    }

    #[test]
    fn test_attribute_builders() {
        let attr = Attribute::required_string()
            .with_description("Repository name")
            .requires_replace();

        assert_eq!(attr.attr_type, AttributeType::String);
        assert!(attr.flags.required);
        assert_eq!(attr.description, Some("Repository name".to_string()));
        assert!(attr.has_modifier(PlanModifier::RequiresReplace));
        assert!(!attr.has_modifier(PlanModifier::UseStateForUnknown));
    }

    #[test]
    fn test_default_makes_attribute_optional_computed() {
        let attr = Attribute::optional_int64().with_default(json!(1440));
        assert!(attr.flags.optional);
        assert!(attr.flags.computed);
        assert_eq!(attr.default, Some(json!(1440)));
    }

    #[test]
    fn test_write_only_implies_sensitive() {
        let attr = Attribute::optional_string().write_only();
        assert!(attr.flags.sensitive);
        assert!(attr.flags.write_only);
    }

    #[test]
    fn test_schema_builder_and_lookup() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("url", Attribute::computed_string())
            .with_block(
                "group",
                NestedBlock::required(
                    Block::new().with_attribute("member_names", Attribute::optional_string_list()),
                ),
            );

        assert_eq!(schema.version, 0);
        assert!(schema.block.attribute_at("name").is_some());
        assert!(schema.block.attribute_at("group.member_names").is_some());
        assert!(schema.block.attribute_at("group.missing").is_none());
        assert!(schema.block.blocks["group"].required);
    }

    #[test]
    fn test_optional_computed_block_keeps_state() {
        let nested = NestedBlock::optional_computed(Block::new());
        assert!(nested.computed);
        assert!(!nested.required);
        assert!(nested.has_modifier(PlanModifier::UseStateForUnknown));
    }

    #[test]
    fn test_project_drops_unknown_and_fills_missing() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("online", Attribute::optional_bool())
            .with_block(
                "storage",
                NestedBlock::required(
                    Block::new().with_attribute("blob_store_name", Attribute::optional_string()),
                ),
            )
            .with_block("cleanup", NestedBlock::optional(Block::new()));

        let projected = schema.project(&json!({
            "name": "raw-hosted",
            "extra": true,
            "storage": {"blob_store_name": "default", "write_policy": "ALLOW"}
        }));

        assert_eq!(
            projected,
            json!({
                "name": "raw-hosted",
                "online": null,
                "storage": {"blob_store_name": "default"},
                "cleanup": null
            })
        );
    }

    #[test]
    fn test_schema_serializes_validators() {
        let schema = Schema::v0().with_attribute(
            "mode",
            Attribute::required_string().with_validator(Validator::one_of(["BLOCK", "ALLOW"])),
        );
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["attributes"]["mode"]["validators"][0]["kind"], "one_of");
    }

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Invalid Attribute Value")
            .with_detail("Attribute proxy.remote_url must be a valid HTTP URL, got: ftp://x")
            .with_attribute("proxy.remote_url");

        assert!(err.is_error());
        assert_eq!(err.summary, "Invalid Attribute Value");
        assert!(err.mentions("must be a valid HTTP URL"));
        assert!(!err.mentions("not present"));
        assert_eq!(err.attribute, Some("proxy.remote_url".to_string()));
    }
}

//! Attribute-block factories shared by every repository resource.
//!
//! Attributes whose value the server chooses when configuration leaves them
//! out are optional+computed and keep the prior state on plan.

use serde_json::json;

use crate::constants::{
    AuthenticationType, ContentDisposition, DockerIndexType, LayoutPolicy, NugetVersion,
    VersionPolicy, WritePolicy, DEFAULT_BLOB_STORE_NAME, DEFAULT_NEGATIVE_CACHE_TTL,
    DEFAULT_NUGET_QUERY_CACHE_MAX_AGE, DEFAULT_PROXY_MAX_AGE, HTTP_CLIENT_RETRIES_MAX,
    HTTP_CLIENT_RETRIES_MIN, HTTP_CLIENT_TIMEOUT_MAX, HTTP_CLIENT_TIMEOUT_MIN, PORT_MAX, PORT_MIN,
};
use crate::schema::{
    Attribute, AttributeFlags, AttributeType, Block, ConfigValidator, NestedBlock, Validator,
};

/// `storage`: blob store binding and content validation.
///
/// `write_policy` only exists on hosted repositories.
pub fn storage_block(is_hosted: bool) -> NestedBlock {
    let mut block = Block::new()
        .with_description("Storage configuration")
        .with_attribute(
            "blob_store_name",
            Attribute::optional_string()
                .with_description("Blob store used to store repository contents")
                .with_default(json!(DEFAULT_BLOB_STORE_NAME))
                .requires_replace(),
        )
        .with_attribute(
            "strict_content_type_validation",
            Attribute::optional_bool()
                .with_description("Whether to validate uploaded content's MIME type")
                .computed()
                .use_state_for_unknown(),
        );

    if is_hosted {
        block = block.with_attribute(
            "write_policy",
            Attribute::optional_string()
                .with_description("Controls if deployments of and updates to assets are allowed")
                .with_default(json!(WritePolicy::Allow.as_str()))
                .with_validator(Validator::one_of(WritePolicy::values())),
        );
    }

    NestedBlock::required(block)
}

/// `cleanup`: cleanup policies applied to the repository.
pub fn cleanup_block() -> NestedBlock {
    NestedBlock::optional(
        Block::new()
            .with_description("Repository cleanup configuration")
            .with_attribute(
                "policy_names",
                Attribute::optional_string_list()
                    .with_description("Names of the cleanup policies to apply"),
            ),
    )
}

/// `component`: hosted component settings.
pub fn component_block() -> NestedBlock {
    NestedBlock::optional_computed(
        Block::new()
            .with_description("Component configuration for the hosted repository")
            .with_attribute(
                "proprietary_components",
                Attribute::optional_bool()
                    .with_description("Components in this repository count as proprietary")
                    .computed()
                    .use_state_for_unknown(),
            ),
    )
}

/// `proxy`: the remote this repository caches.
pub fn proxy_block() -> NestedBlock {
    NestedBlock::required(
        Block::new()
            .with_description("Proxy specific configuration for this repository")
            .with_attribute(
                "remote_url",
                Attribute::required_string()
                    .with_description("Location of the remote repository being proxied")
                    .with_validator(Validator::HttpUrl),
            )
            .with_attribute(
                "content_max_age",
                Attribute::optional_int64()
                    .with_description("How long to cache artifacts before rechecking the remote (minutes)")
                    .with_default(json!(DEFAULT_PROXY_MAX_AGE)),
            )
            .with_attribute(
                "metadata_max_age",
                Attribute::optional_int64()
                    .with_description("How long to cache metadata before rechecking the remote (minutes)")
                    .with_default(json!(DEFAULT_PROXY_MAX_AGE)),
            ),
    )
}

/// `negative_cache`: caching of not-found responses from the remote.
pub fn negative_cache_block() -> NestedBlock {
    NestedBlock::optional_computed(
        Block::new()
            .with_description("Negative cache configuration")
            .with_attribute(
                "enabled",
                Attribute::optional_bool()
                    .with_description("Whether to cache responses for content not present in the remote")
                    .with_default(json!(true)),
            )
            .with_attribute(
                "time_to_live",
                Attribute::optional_int64()
                    .with_description("How long to cache the fact that a file was not found (minutes)")
                    .with_default(json!(DEFAULT_NEGATIVE_CACHE_TTL))
                    .with_validator(Validator::Int64AtLeast { min: 0 }),
            ),
    )
}

/// `http_client`: outbound connection settings towards the remote.
pub fn http_client_block() -> NestedBlock {
    NestedBlock::optional_computed(
        Block::new()
            .with_description("HTTP client configuration for proxy repositories")
            .with_attribute(
                "blocked",
                Attribute::optional_bool()
                    .with_description("Whether to block outbound connections")
                    .with_default(json!(false)),
            )
            .with_attribute(
                "auto_block",
                Attribute::optional_bool()
                    .with_description("Whether to auto-block outbound connections if the remote is unreachable")
                    .with_default(json!(true)),
            )
            .with_block("connection", connection_block())
            .with_block("authentication", authentication_block()),
    )
}

fn connection_block() -> NestedBlock {
    NestedBlock::optional_computed(
        Block::new()
            .with_description("HTTP connection settings")
            .with_attribute(
                "retries",
                Attribute::optional_int64()
                    .with_description("Total retries if the initial connection attempt suffers a timeout")
                    .with_validator(Validator::Int64Between {
                        min: HTTP_CLIENT_RETRIES_MIN,
                        max: HTTP_CLIENT_RETRIES_MAX,
                    }),
            )
            .with_attribute(
                "user_agent_suffix",
                Attribute::optional_string()
                    .with_description("Custom fragment to append to the User-Agent header"),
            )
            .with_attribute(
                "timeout",
                Attribute::optional_int64()
                    .with_description("Seconds to wait for activity before stopping and retrying")
                    .with_validator(Validator::Int64Between {
                        min: HTTP_CLIENT_TIMEOUT_MIN,
                        max: HTTP_CLIENT_TIMEOUT_MAX,
                    }),
            )
            .with_attribute(
                "enable_circular_redirects",
                Attribute::optional_bool()
                    .with_description("Whether to enable redirects to the same location")
                    .with_default(json!(false)),
            )
            .with_attribute(
                "enable_cookies",
                Attribute::optional_bool()
                    .with_description("Whether to allow cookies to be stored and used")
                    .with_default(json!(false)),
            )
            .with_attribute(
                "use_trust_store",
                Attribute::optional_bool()
                    .with_description("Use certificates stored in the server truststore")
                    .with_default(json!(false)),
            ),
    )
}

fn authentication_block() -> NestedBlock {
    NestedBlock::optional(
        Block::new()
            .with_description("Authentication against the remote")
            .with_attribute(
                "type",
                Attribute::required_string()
                    .with_description("Authentication type")
                    .with_validator(Validator::one_of(AuthenticationType::values())),
            )
            .with_attribute("username", Attribute::optional_string())
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .with_description("Password; never returned by the server")
                    .write_only(),
            )
            .with_attribute("ntlm_host", Attribute::optional_string())
            .with_attribute("ntlm_domain", Attribute::optional_string())
            .with_attribute(
                "preemptive",
                Attribute::optional_bool()
                    .with_description("Whether to send credentials before the remote asks for them")
                    .with_default(json!(false)),
            ),
    )
}

/// Cross-field rules of the `http_client.authentication` block.
pub fn authentication_validators() -> Vec<ConfigValidator> {
    let required_when = |attribute: &str, equals: AuthenticationType| ConfigValidator::RequiredWhen {
        attribute: format!("http_client.authentication.{}", attribute),
        when: "http_client.authentication.type".into(),
        equals: equals.as_str().into(),
    };
    vec![
        required_when("username", AuthenticationType::Username),
        required_when("ntlm_host", AuthenticationType::Ntlm),
        required_when("ntlm_domain", AuthenticationType::Ntlm),
    ]
}

/// `replication`: pre-emptive pull settings.
pub fn replication_block() -> NestedBlock {
    NestedBlock::optional_computed(
        Block::new()
            .with_description("Replication configuration")
            .with_attribute(
                "preemptive_pull_enabled",
                Attribute::optional_bool()
                    .with_description("Whether pre-emptive pull is enabled")
                    .with_default(json!(false)),
            )
            .with_attribute(
                "asset_path_regex",
                Attribute::optional_string()
                    .with_description("Regular expression of asset paths to pull pre-emptively"),
            ),
    )
}

/// `group`: member repositories of a group.
pub fn group_block(allow_writable_member: bool) -> NestedBlock {
    let mut block = Block::new()
        .with_description("Repository group configuration")
        .with_attribute(
            "member_names",
            Attribute::new(
                AttributeType::list(AttributeType::String),
                AttributeFlags::required(),
            )
            .with_description("Member repositories' names, in lookup order")
            .with_validator(Validator::SizeAtLeast { min: 1 }),
        );

    if allow_writable_member {
        block = block.with_attribute(
            "writable_member",
            Attribute::optional_string()
                .with_description("Member repository that receives writes to the group"),
        );
    }

    NestedBlock::required(block)
}

/// `maven`: Maven layout and version policies.
pub fn maven_block() -> NestedBlock {
    NestedBlock::required(
        Block::new()
            .with_description("Maven specific configuration")
            .with_attribute(
                "version_policy",
                Attribute::optional_string()
                    .with_description("What type of artifacts this repository stores")
                    .with_default(json!(VersionPolicy::Release.as_str()))
                    .with_validator(Validator::one_of(VersionPolicy::values())),
            )
            .with_attribute(
                "layout_policy",
                Attribute::optional_string()
                    .with_description("Validate that all paths are maven artifact or metadata paths")
                    .with_default(json!(LayoutPolicy::Strict.as_str()))
                    .with_validator(Validator::one_of(LayoutPolicy::values())),
            )
            .with_attribute(
                "content_disposition",
                content_disposition(ContentDisposition::Inline),
            ),
    )
}

/// `docker`: registry connector settings.
pub fn docker_block() -> NestedBlock {
    let port = |description: &str| {
        Attribute::optional_int64()
            .with_description(description)
            .with_validator(Validator::Int64Between {
                min: PORT_MIN,
                max: PORT_MAX,
            })
    };

    NestedBlock::required(
        Block::new()
            .with_description("Docker specific configuration")
            .with_attribute(
                "force_basic_auth",
                Attribute::optional_bool()
                    .with_description("Whether to force authentication (Docker Bearer Token Realm required if false)")
                    .with_default(json!(true)),
            )
            .with_attribute(
                "v1_enabled",
                Attribute::optional_bool()
                    .with_description("Whether to allow clients to use the V1 API")
                    .with_default(json!(false)),
            )
            .with_attribute("http_port", port("HTTP connector port"))
            .with_attribute("https_port", port("HTTPS connector port"))
            .with_attribute(
                "subdomain",
                Attribute::optional_string()
                    .with_description("Subdomain used by the subdomain connector"),
            ),
    )
}

/// `docker_proxy`: where a docker proxy looks up its index.
pub fn docker_proxy_block() -> NestedBlock {
    NestedBlock::optional_computed(
        Block::new()
            .with_description("Docker proxy index configuration")
            .with_attribute(
                "index_type",
                Attribute::optional_string()
                    .with_description("Type of Docker Index")
                    .with_default(json!(DockerIndexType::Registry.as_str()))
                    .with_validator(Validator::one_of(DockerIndexType::values())),
            )
            .with_attribute(
                "index_url",
                Attribute::optional_string()
                    .with_description("URL of the Docker Index; required when index_type is CUSTOM")
                    .with_validator(Validator::HttpUrl),
            ),
    )
}

/// `raw`: content disposition of raw assets.
pub fn raw_block() -> NestedBlock {
    NestedBlock::optional(
        Block::new()
            .with_description("Raw specific configuration")
            .with_attribute(
                "content_disposition",
                content_disposition(ContentDisposition::Attachment),
            ),
    )
}

/// `pypi`: PyPI proxy settings.
pub fn pypi_block() -> NestedBlock {
    NestedBlock::optional(
        Block::new()
            .with_description("PyPI specific configuration")
            .with_attribute(
                "remove_quarrantined",
                Attribute::optional_bool()
                    .with_description("Remove quarantined versions from metadata")
                    .with_default(json!(false)),
            ),
    )
}

/// `nuget_proxy`: NuGet proxy protocol settings.
pub fn nuget_proxy_block() -> NestedBlock {
    NestedBlock::optional_computed(
        Block::new()
            .with_description("NuGet proxy configuration")
            .with_attribute(
                "query_cache_item_max_age",
                Attribute::optional_int64()
                    .with_description("How long to cache query results from the proxied repository (seconds)")
                    .with_default(json!(DEFAULT_NUGET_QUERY_CACHE_MAX_AGE))
                    .with_validator(Validator::Int64AtLeast { min: 0 }),
            )
            .with_attribute(
                "nuget_version",
                Attribute::optional_string()
                    .with_description("NuGet protocol version")
                    .with_default(json!(NugetVersion::V3.as_str()))
                    .with_validator(Validator::one_of(NugetVersion::values())),
            ),
    )
}

fn content_disposition(default: ContentDisposition) -> Attribute {
    Attribute::optional_string()
        .with_description("Content-Disposition header value sent with downloaded assets")
        .with_default(json!(default.as_str()))
        .with_validator(Validator::one_of(ContentDisposition::values()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PlanModifier, Schema};
    use crate::validation::validate;

    fn proxy_schema() -> Schema {
        Schema::v0()
            .with_block("proxy", proxy_block())
            .with_block("negative_cache", negative_cache_block())
            .with_block("http_client", http_client_block())
    }

    #[test]
    fn test_storage_block_write_policy_only_on_hosted() {
        let hosted = storage_block(true);
        let proxy = storage_block(false);

        assert!(hosted.required);
        assert!(hosted.block.attributes.contains_key("write_policy"));
        assert!(!proxy.block.attributes.contains_key("write_policy"));
        assert_eq!(
            hosted.block.attributes["blob_store_name"].default,
            Some(json!("default"))
        );
        assert!(hosted.block.attributes["strict_content_type_validation"]
            .has_modifier(PlanModifier::UseStateForUnknown));
    }

    #[test]
    fn test_write_policy_values() {
        let schema = Schema::v0().with_block("storage", storage_block(true));
        let diagnostics = validate(&schema, &json!({"storage": {"write_policy": "SOMETIMES"}}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].detail.as_deref(),
            Some(r#"Attribute storage.write_policy value must be one of: ["ALLOW" "ALLOW_ONCE" "DENY" "REPLICATION_ONLY"], got: "SOMETIMES""#)
        );
    }

    #[test]
    fn test_http_client_bounds() {
        let schema = proxy_schema();
        let config = |retries: i64, timeout: i64| {
            json!({
                "proxy": {"remote_url": "https://repo1.maven.org/maven2/"},
                "http_client": {"connection": {"retries": retries, "timeout": timeout}}
            })
        };

        assert!(validate(&schema, &config(10, 3600)).is_empty());

        let diagnostics = validate(&schema, &config(11, 60));
        assert!(diagnostics[0].mentions(
            "Attribute http_client.connection.retries value must be between 0 and 10, got: 11"
        ));

        let diagnostics = validate(&schema, &config(3, 0));
        assert!(diagnostics[0].mentions(
            "Attribute http_client.connection.timeout value must be between 1 and 3600, got: 0"
        ));
    }

    #[test]
    fn test_negative_cache_ttl() {
        let diagnostics = validate(
            &proxy_schema(),
            &json!({
                "proxy": {"remote_url": "https://registry.npmjs.org"},
                "negative_cache": {"time_to_live": -5}
            }),
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0]
            .mentions("Attribute negative_cache.time_to_live value must be at least 0, got: -5"));
    }

    #[test]
    fn test_remote_url_must_be_http() {
        let diagnostics = validate(&proxy_schema(), &json!({"proxy": {"remote_url": "pypi.org"}}));
        assert!(diagnostics[0].mentions("Attribute proxy.remote_url must be a valid HTTP URL"));
    }

    #[test]
    fn test_password_is_write_only() {
        let block = http_client_block();
        let auth = &block.block.blocks["authentication"].block;
        assert!(auth.attributes["password"].flags.write_only);
        assert!(auth.attributes["password"].flags.sensitive);
        assert!(auth.attributes["type"].flags.required);
    }

    #[test]
    fn test_group_members_required_and_non_empty() {
        let schema = Schema::v0().with_block("group", group_block(false));

        let diagnostics = validate(&schema, &json!({"group": {"member_names": []}}));
        assert!(diagnostics[0]
            .mentions("Attribute group.member_names list must contain at least 1 elements, got: 0"));

        let diagnostics = validate(&schema, &json!({"group": {}}));
        assert!(diagnostics[0].mentions("The argument \"group.member_names\" is required"));

        let diagnostics = validate(
            &schema,
            &json!({"group": {"member_names": ["a"], "writable_member": "a"}}),
        );
        assert!(diagnostics[0].mentions("An argument named \"writable_member\" is not expected here."));
    }

    #[test]
    fn test_docker_ports() {
        let schema = Schema::v0().with_block("docker", docker_block());
        assert!(validate(&schema, &json!({"docker": {"http_port": 8082}})).is_empty());

        let diagnostics = validate(&schema, &json!({"docker": {"https_port": 70000}}));
        assert!(diagnostics[0]
            .mentions("Attribute docker.https_port value must be between 1 and 65535, got: 70000"));
    }

    #[test]
    fn test_leaf_defaults() {
        assert_eq!(
            maven_block().block.attributes["layout_policy"].default,
            Some(json!("STRICT"))
        );
        assert_eq!(
            raw_block().block.attributes["content_disposition"].default,
            Some(json!("ATTACHMENT"))
        );
        assert_eq!(
            nuget_proxy_block().block.attributes["nuget_version"].default,
            Some(json!("V3"))
        );
        assert_eq!(
            pypi_block().block.attributes["remove_quarrantined"].default,
            Some(json!(false))
        );
    }

    #[test]
    fn test_authentication_validators() {
        let schema = proxy_schema();
        let schema = authentication_validators()
            .into_iter()
            .fold(schema, |s, v| s.with_validator(v));

        let ntlm = json!({
            "proxy": {"remote_url": "https://nuget.example.com"},
            "http_client": {"authentication": {"type": "ntlm", "username": "u", "ntlm_host": "h"}}
        });
        let diagnostics = validate(&schema, &ntlm);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("http_client.authentication.ntlm_domain")
        );
    }
}

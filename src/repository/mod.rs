//! Repository resources.
//!
//! Every `(format, kind)` pair is an independent resource type named
//! `sonatyperepo_repository_<format>_<kind>`. They share the attribute blocks
//! in [`blocks`], the state/API shapes in [`model`], the bidirectional mapping
//! in [`codec`] and the lifecycle in [`resource`]. A small
//! [`RepositoryDescriptor`] selects which blocks and format leaves apply.

pub mod blocks;
pub mod codec;
pub mod model;
pub mod resource;

pub use codec::RepositoryCodec;
pub use resource::RepositoryResource;

use serde_json::json;
use std::fmt;

use crate::schema::{Attribute, ConfigValidator, NestedBlock, Schema, Validator};

/// Prefix shared by every repository resource type name.
pub const TYPE_PREFIX: &str = "sonatyperepo_repository";

/// Package format of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RepositoryFormat {
    /// Maven 2 artifacts.
    Maven,
    /// npm packages.
    Npm,
    /// NuGet packages.
    Nuget,
    /// Python packages.
    Pypi,
    /// Arbitrary files.
    Raw,
    /// Container images.
    Docker,
    /// Hugging Face models and datasets.
    Huggingface,
}

impl RepositoryFormat {
    /// Segment used in resource type names and REST paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Nuget => "nuget",
            Self::Pypi => "pypi",
            Self::Raw => "raw",
            Self::Docker => "docker",
            Self::Huggingface => "huggingface",
        }
    }

    /// Format name the server reports in repository listings.
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Maven => "maven2",
            other => other.as_str(),
        }
    }

    /// Whether a format name reported by the server denotes this format.
    pub fn matches(&self, reported: &str) -> bool {
        reported == self.api_name() || reported == self.as_str()
    }
}

impl fmt::Display for RepositoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a repository obtains its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RepositoryKind {
    /// Stores uploaded artifacts.
    Hosted,
    /// Caches artifacts fetched from a remote.
    Proxy,
    /// Merges the content of member repositories.
    Group,
}

impl RepositoryKind {
    /// Segment used in resource type names and REST paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hosted => "hosted",
            Self::Proxy => "proxy",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A format-specific attribute block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatLeaf {
    /// `maven { version_policy, layout_policy, content_disposition }`
    Maven,
    /// `docker { force_basic_auth, v1_enabled, http_port, https_port, subdomain }`
    Docker,
    /// `docker_proxy { index_type, index_url }`
    DockerProxy,
    /// `raw { content_disposition }`
    Raw,
    /// `pypi { remove_quarrantined }`
    Pypi,
    /// `nuget_proxy { query_cache_item_max_age, nuget_version }`
    NugetProxy,
}

impl FormatLeaf {
    /// Attribute name of the block in configuration and state.
    pub fn block_name(&self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Docker => "docker",
            Self::DockerProxy => "docker_proxy",
            Self::Raw => "raw",
            Self::Pypi => "pypi",
            Self::NugetProxy => "nuget_proxy",
        }
    }

    fn nested_block(&self) -> NestedBlock {
        match self {
            Self::Maven => blocks::maven_block(),
            Self::Docker => blocks::docker_block(),
            Self::DockerProxy => blocks::docker_proxy_block(),
            Self::Raw => blocks::raw_block(),
            Self::Pypi => blocks::pypi_block(),
            Self::NugetProxy => blocks::nuget_proxy_block(),
        }
    }
}

/// Identifies one repository resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryDescriptor {
    /// Package format.
    pub format: RepositoryFormat,
    /// Repository kind.
    pub kind: RepositoryKind,
}

impl RepositoryDescriptor {
    /// Create a descriptor.
    pub const fn new(format: RepositoryFormat, kind: RepositoryKind) -> Self {
        Self { format, kind }
    }

    /// Every supported `(format, kind)` pair.
    pub fn all() -> Vec<Self> {
        use RepositoryFormat::*;
        use RepositoryKind::*;

        let mut out = Vec::new();
        for format in [Maven, Npm, Nuget, Pypi, Raw, Docker] {
            for kind in [Hosted, Proxy, Group] {
                out.push(Self::new(format, kind));
            }
        }
        out.push(Self::new(Huggingface, Proxy));
        out
    }

    /// Resource type name, e.g. `sonatyperepo_repository_maven_hosted`.
    pub fn type_name(&self) -> String {
        format!("{}_{}_{}", TYPE_PREFIX, self.format, self.kind)
    }

    /// Resolve a resource type name back to its descriptor.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::all().into_iter().find(|d| d.type_name() == type_name)
    }

    /// Whether this is a hosted repository.
    pub fn is_hosted(&self) -> bool {
        self.kind == RepositoryKind::Hosted
    }

    /// Whether this is a proxy repository.
    pub fn is_proxy(&self) -> bool {
        self.kind == RepositoryKind::Proxy
    }

    /// Whether this is a group repository.
    pub fn is_group(&self) -> bool {
        self.kind == RepositoryKind::Group
    }

    /// Whether the group block accepts `writable_member`.
    pub fn allows_writable_member(&self) -> bool {
        self.is_group() && matches!(self.format, RepositoryFormat::Docker | RepositoryFormat::Npm)
    }

    /// Format leaves that apply to this resource type.
    pub fn leaves(&self) -> Vec<FormatLeaf> {
        use RepositoryFormat as F;
        use RepositoryKind as K;

        match (self.format, self.kind) {
            (F::Maven, K::Hosted | K::Proxy) => vec![FormatLeaf::Maven],
            (F::Docker, K::Proxy) => vec![FormatLeaf::Docker, FormatLeaf::DockerProxy],
            (F::Docker, _) => vec![FormatLeaf::Docker],
            (F::Raw, _) => vec![FormatLeaf::Raw],
            (F::Pypi, K::Proxy) => vec![FormatLeaf::Pypi],
            (F::Nuget, K::Proxy) => vec![FormatLeaf::NugetProxy],
            _ => Vec::new(),
        }
    }

    /// Whether `leaf` applies to this resource type.
    pub fn has_leaf(&self, leaf: FormatLeaf) -> bool {
        self.leaves().contains(&leaf)
    }

    /// Assemble the resource schema from the shared block factories.
    pub fn schema(&self) -> Schema {
        let mut schema = Schema::v0()
            .with_description(format!(
                "Manage {} {} repositories",
                self.format, self.kind
            ))
            .with_attribute(
                "name",
                Attribute::required_string()
                    .with_description("Name of the repository")
                    .with_validator(Validator::LengthAtLeast { min: 1 })
                    .requires_replace(),
            )
            .with_attribute(
                "online",
                Attribute::optional_bool()
                    .with_description("Whether this repository accepts incoming requests")
                    .with_default(json!(true)),
            )
            .with_attribute(
                "url",
                Attribute::computed_string()
                    .with_description("URL to access the repository")
                    .use_state_for_unknown(),
            )
            .with_block("storage", blocks::storage_block(self.is_hosted()));

        match self.kind {
            RepositoryKind::Hosted => {
                schema = schema
                    .with_block("cleanup", blocks::cleanup_block())
                    .with_block("component", blocks::component_block());
            },
            RepositoryKind::Proxy => {
                schema = schema
                    .with_block("cleanup", blocks::cleanup_block())
                    .with_block("proxy", blocks::proxy_block())
                    .with_block("negative_cache", blocks::negative_cache_block())
                    .with_block("http_client", blocks::http_client_block())
                    .with_block("replication", blocks::replication_block())
                    .with_attribute(
                        "routing_rule",
                        Attribute::optional_string()
                            .with_description("Name of the routing rule applied to this repository"),
                    );
                for validator in blocks::authentication_validators() {
                    schema = schema.with_validator(validator);
                }
            },
            RepositoryKind::Group => {
                schema = schema.with_block(
                    "group",
                    blocks::group_block(self.allows_writable_member()),
                );
                if self.allows_writable_member() {
                    schema = schema.with_validator(ConfigValidator::MemberOf {
                        attribute: "group.writable_member".into(),
                        list: "group.member_names".into(),
                    });
                }
            },
        }

        for leaf in self.leaves() {
            schema = schema.with_block(leaf.block_name(), leaf.nested_block());
        }
        if self.has_leaf(FormatLeaf::DockerProxy) {
            schema = schema.with_validator(ConfigValidator::RequiredWhen {
                attribute: "docker_proxy.index_url".into(),
                when: "docker_proxy.index_type".into(),
                equals: "CUSTOM".into(),
            });
        }

        schema
    }
}

impl fmt::Display for RepositoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format, self.kind)
    }
}

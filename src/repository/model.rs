//! State and API shapes of a repository.
//!
//! [`RepositoryModel`] mirrors the Terraform state: snake_case keys, every
//! value optional, one struct covering all formats and kinds. Blocks that do
//! not apply to a resource type are simply `None` and are dropped when the
//! state is projected onto the schema.
//!
//! [`ApiRepository`] mirrors the REST payloads: camelCase keys, absent values
//! omitted on the wire.

use serde::{Deserialize, Serialize};

use crate::constants::{
    AuthenticationType, ContentDisposition, DockerIndexType, LayoutPolicy, NugetVersion,
    VersionPolicy, WritePolicy,
};

/// A repository as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryModel {
    /// Unique repository name.
    pub name: String,
    /// Whether the repository accepts requests.
    pub online: Option<bool>,
    /// Public URL of the repository.
    pub url: Option<String>,
    /// Storage settings.
    pub storage: Option<StorageModel>,
    /// Cleanup policies.
    pub cleanup: Option<CleanupModel>,
    /// Component settings of hosted repositories.
    pub component: Option<ComponentModel>,
    /// Remote being proxied.
    pub proxy: Option<ProxyModel>,
    /// Caching of not-found responses.
    pub negative_cache: Option<NegativeCacheModel>,
    /// Outbound HTTP client settings.
    pub http_client: Option<HttpClientModel>,
    /// Name of the routing rule applied.
    pub routing_rule: Option<String>,
    /// Replication settings.
    pub replication: Option<ReplicationModel>,
    /// Group members.
    pub group: Option<GroupModel>,
    /// Maven settings.
    pub maven: Option<MavenModel>,
    /// Docker connector settings.
    pub docker: Option<DockerModel>,
    /// Docker index of proxy repositories.
    pub docker_proxy: Option<DockerProxyModel>,
    /// Raw settings.
    pub raw: Option<RawModel>,
    /// PyPI proxy settings.
    pub pypi: Option<PypiModel>,
    /// NuGet proxy settings.
    pub nuget_proxy: Option<NugetProxyModel>,
}

/// `storage` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageModel {
    /// Blob store holding the content.
    pub blob_store_name: Option<String>,
    /// Validate uploaded MIME types.
    pub strict_content_type_validation: Option<bool>,
    /// Whether assets may be redeployed.
    pub write_policy: Option<WritePolicy>,
}

/// `cleanup` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupModel {
    /// Cleanup policy names.
    pub policy_names: Option<Vec<String>>,
}

/// `component` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentModel {
    /// Components count as proprietary.
    pub proprietary_components: Option<bool>,
}

/// `proxy` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyModel {
    /// URL of the remote.
    pub remote_url: Option<String>,
    /// Minutes to cache artifacts.
    pub content_max_age: Option<i64>,
    /// Minutes to cache metadata.
    pub metadata_max_age: Option<i64>,
}

/// `negative_cache` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeCacheModel {
    /// Whether not-found responses are cached.
    pub enabled: Option<bool>,
    /// Minutes to cache not-found responses.
    pub time_to_live: Option<i64>,
}

/// `http_client` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientModel {
    /// Block outbound connections.
    pub blocked: Option<bool>,
    /// Block outbound connections while the remote is unreachable.
    pub auto_block: Option<bool>,
    /// Connection tuning.
    pub connection: Option<ConnectionModel>,
    /// Credentials for the remote.
    pub authentication: Option<AuthenticationModel>,
}

/// `connection` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionModel {
    /// Retries after a connection timeout.
    pub retries: Option<i64>,
    /// Suffix appended to the User-Agent header.
    pub user_agent_suffix: Option<String>,
    /// Seconds to wait for activity.
    pub timeout: Option<i64>,
    /// Follow circular redirects.
    pub enable_circular_redirects: Option<bool>,
    /// Accept cookies from the remote.
    pub enable_cookies: Option<bool>,
    /// Use the server trust store for the remote certificate.
    pub use_trust_store: Option<bool>,
}

/// `authentication` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationModel {
    /// Authentication type.
    #[serde(rename = "type")]
    pub auth_type: Option<AuthenticationType>,
    /// Username.
    pub username: Option<String>,
    /// Password; never returned by the server.
    pub password: Option<String>,
    /// NTLM host.
    pub ntlm_host: Option<String>,
    /// NTLM domain.
    pub ntlm_domain: Option<String>,
    /// Send credentials before being challenged.
    pub preemptive: Option<bool>,
}

/// `replication` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationModel {
    /// Whether pre-emptive pull is enabled.
    pub preemptive_pull_enabled: Option<bool>,
    /// Regular expression of asset paths to pull pre-emptively.
    pub asset_path_regex: Option<String>,
}

/// `group` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupModel {
    /// Member repositories, in lookup order.
    pub member_names: Option<Vec<String>>,
    /// Member receiving writes to the group.
    pub writable_member: Option<String>,
}

/// `maven` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenModel {
    /// Release, snapshot or mixed artifacts.
    pub version_policy: Option<VersionPolicy>,
    /// Maven path validation.
    pub layout_policy: Option<LayoutPolicy>,
    /// `Content-Disposition` sent with downloads.
    pub content_disposition: Option<ContentDisposition>,
}

/// `docker` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerModel {
    /// Require basic authentication.
    pub force_basic_auth: Option<bool>,
    pub v1_enabled: Option<bool>,
    /// Dedicated HTTP connector port.
    pub http_port: Option<i64>,
    /// Dedicated HTTPS connector port.
    pub https_port: Option<i64>,
    /// Subdomain routing prefix.
    pub subdomain: Option<String>,
}

/// `docker_proxy` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerProxyModel {
    /// Docker index used for searches.
    pub index_type: Option<DockerIndexType>,
    /// Custom index URL.
    pub index_url: Option<String>,
}

/// `raw` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawModel {
    /// `Content-Disposition` sent with downloads.
    pub content_disposition: Option<ContentDisposition>,
}

/// `pypi` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PypiModel {
    /// Remove quarantined versions from metadata.
    pub remove_quarrantined: Option<bool>,
}

/// `nuget_proxy` block as recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NugetProxyModel {
    /// Seconds to cache query results.
    pub query_cache_item_max_age: Option<i64>,
    /// NuGet protocol version.
    pub nuget_version: Option<NugetVersion>,
}

/// A repository as exchanged with the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiRepository {
    /// Unique repository name.
    pub name: String,
    /// Format as reported by the server, e.g. `maven2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Kind as reported by the server (`type`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Public URL of the repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Whether the repository accepts requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    /// Storage settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<ApiStorage>,
    /// Cleanup policies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<ApiCleanup>,
    /// Component settings of hosted repositories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ApiComponent>,
    /// Remote being proxied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ApiProxy>,
    /// Caching of not-found responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_cache: Option<ApiNegativeCache>,
    /// Outbound HTTP client settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_client: Option<ApiHttpClient>,
    /// Sent as `routingRule`; reads return `routingRuleName`.
    #[serde(alias = "routingRuleName", skip_serializing_if = "Option::is_none")]
    pub routing_rule: Option<String>,
    /// Replication settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication: Option<ApiReplication>,
    /// Group members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<ApiGroup>,
    /// Maven settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maven: Option<ApiMaven>,
    /// Docker connector settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker: Option<ApiDocker>,
    /// Docker index of proxy repositories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_proxy: Option<ApiDockerProxy>,
    /// Raw settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<ApiRaw>,
    /// PyPI proxy settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pypi: Option<ApiPypi>,
    /// NuGet proxy settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuget_proxy: Option<ApiNugetProxy>,
}

/// `storage` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiStorage {
    /// Blob store holding the content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_store_name: Option<String>,
    /// Validate uploaded MIME types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_content_type_validation: Option<bool>,
    /// Whether assets may be redeployed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_policy: Option<WritePolicy>,
}

/// `cleanup` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiCleanup {
    /// Cleanup policy names.
    pub policy_names: Vec<String>,
}

/// `component` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiComponent {
    /// Components count as proprietary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proprietary_components: Option<bool>,
}

/// `proxy` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiProxy {
    /// URL of the remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Minutes to cache artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_max_age: Option<i64>,
    /// Minutes to cache metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_max_age: Option<i64>,
}

/// `negative_cache` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiNegativeCache {
    /// Whether not-found responses are cached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Minutes to cache not-found responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<i64>,
}

/// `http_client` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiHttpClient {
    /// Block outbound connections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    /// Block outbound connections while the remote is unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_block: Option<bool>,
    /// Connection tuning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ApiConnection>,
    /// Credentials for the remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<ApiAuthentication>,
}

/// `connection` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiConnection {
    /// Retries after a connection timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,
    /// Suffix appended to the User-Agent header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent_suffix: Option<String>,
    /// Seconds to wait for activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    /// Follow circular redirects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_circular_redirects: Option<bool>,
    /// Accept cookies from the remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_cookies: Option<bool>,
    /// Use the server trust store for the remote certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_trust_store: Option<bool>,
}

/// `authentication` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiAuthentication {
    /// Authentication type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthenticationType>,
    /// Username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password; never returned by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// NTLM host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntlm_host: Option<String>,
    /// NTLM domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntlm_domain: Option<String>,
    /// Send credentials before being challenged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preemptive: Option<bool>,
}

/// `replication` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiReplication {
    /// Whether pre-emptive pull is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preemptive_pull_enabled: Option<bool>,
    /// Regular expression of asset paths to pull pre-emptively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_path_regex: Option<String>,
}

/// `group` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGroup {
    /// Member repositories, in lookup order.
    pub member_names: Vec<String>,
    /// Member receiving writes to the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writable_member: Option<String>,
}

/// `maven` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiMaven {
    /// Release, snapshot or mixed artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_policy: Option<VersionPolicy>,
    /// Maven path validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_policy: Option<LayoutPolicy>,
    /// `Content-Disposition` sent with downloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<ContentDisposition>,
}

/// `docker` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiDocker {
    /// Require basic authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_basic_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v1_enabled: Option<bool>,
    /// Dedicated HTTP connector port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<i64>,
    /// Dedicated HTTPS connector port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_port: Option<i64>,
    /// Subdomain routing prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
}

/// `docker_proxy` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiDockerProxy {
    /// Docker index used for searches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_type: Option<DockerIndexType>,
    /// Custom index URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,
}

/// `raw` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiRaw {
    /// `Content-Disposition` sent with downloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<ContentDisposition>,
}

/// `pypi` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiPypi {
    /// Remove quarantined versions from metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_quarantined: Option<bool>,
}

/// `nuget_proxy` block of a REST body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiNugetProxy {
    /// Seconds to cache query results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_cache_item_max_age: Option<i64>,
    /// NuGet protocol version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuget_version: Option<NugetVersion>,
}

/// Entry of `GET /repositories` and body of `GET /repositories/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySummary {
    /// Unique repository name.
    pub name: String,
    /// Format as reported by the server, e.g. `maven2`.
    pub format: String,
    /// Kind as reported by the server (`type`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Public URL of the repository.
    pub url: Option<String>,
    /// Whether the repository accepts requests.
    pub online: Option<bool>,
}

// Field-for-field conversions between the two shapes. Defaults and
// presence rules live in the codec.

impl From<&StorageModel> for ApiStorage {
    fn from(m: &StorageModel) -> Self {
        Self {
            blob_store_name: m.blob_store_name.clone(),
            strict_content_type_validation: m.strict_content_type_validation,
            write_policy: m.write_policy,
        }
    }
}

impl From<ApiStorage> for StorageModel {
    fn from(a: ApiStorage) -> Self {
        Self {
            blob_store_name: a.blob_store_name,
            strict_content_type_validation: a.strict_content_type_validation,
            write_policy: a.write_policy,
        }
    }
}

impl From<&CleanupModel> for ApiCleanup {
    fn from(m: &CleanupModel) -> Self {
        Self {
            policy_names: m.policy_names.clone().unwrap_or_default(),
        }
    }
}

impl From<&ComponentModel> for ApiComponent {
    fn from(m: &ComponentModel) -> Self {
        Self {
            proprietary_components: m.proprietary_components,
        }
    }
}

impl From<ApiComponent> for ComponentModel {
    fn from(a: ApiComponent) -> Self {
        Self {
            proprietary_components: a.proprietary_components,
        }
    }
}

impl From<&ProxyModel> for ApiProxy {
    fn from(m: &ProxyModel) -> Self {
        Self {
            remote_url: m.remote_url.clone(),
            content_max_age: m.content_max_age,
            metadata_max_age: m.metadata_max_age,
        }
    }
}

impl From<ApiProxy> for ProxyModel {
    fn from(a: ApiProxy) -> Self {
        Self {
            remote_url: a.remote_url,
            content_max_age: a.content_max_age,
            metadata_max_age: a.metadata_max_age,
        }
    }
}

impl From<&NegativeCacheModel> for ApiNegativeCache {
    fn from(m: &NegativeCacheModel) -> Self {
        Self {
            enabled: m.enabled,
            time_to_live: m.time_to_live,
        }
    }
}

impl From<ApiNegativeCache> for NegativeCacheModel {
    fn from(a: ApiNegativeCache) -> Self {
        Self {
            enabled: a.enabled,
            time_to_live: a.time_to_live,
        }
    }
}

impl From<&HttpClientModel> for ApiHttpClient {
    fn from(m: &HttpClientModel) -> Self {
        Self {
            blocked: m.blocked,
            auto_block: m.auto_block,
            connection: m.connection.as_ref().map(Into::into),
            authentication: m.authentication.as_ref().map(Into::into),
        }
    }
}

impl From<ApiHttpClient> for HttpClientModel {
    fn from(a: ApiHttpClient) -> Self {
        Self {
            blocked: a.blocked,
            auto_block: a.auto_block,
            connection: a.connection.map(Into::into),
            authentication: a.authentication.map(Into::into),
        }
    }
}

impl From<&ConnectionModel> for ApiConnection {
    fn from(m: &ConnectionModel) -> Self {
        Self {
            retries: m.retries,
            user_agent_suffix: m.user_agent_suffix.clone(),
            timeout: m.timeout,
            enable_circular_redirects: m.enable_circular_redirects,
            enable_cookies: m.enable_cookies,
            use_trust_store: m.use_trust_store,
        }
    }
}

impl From<ApiConnection> for ConnectionModel {
    fn from(a: ApiConnection) -> Self {
        Self {
            retries: a.retries,
            user_agent_suffix: a.user_agent_suffix,
            timeout: a.timeout,
            enable_circular_redirects: a.enable_circular_redirects,
            enable_cookies: a.enable_cookies,
            use_trust_store: a.use_trust_store,
        }
    }
}

impl From<&AuthenticationModel> for ApiAuthentication {
    fn from(m: &AuthenticationModel) -> Self {
        Self {
            auth_type: m.auth_type,
            username: m.username.clone(),
            password: m.password.clone(),
            ntlm_host: m.ntlm_host.clone(),
            ntlm_domain: m.ntlm_domain.clone(),
            preemptive: m.preemptive,
        }
    }
}

impl From<ApiAuthentication> for AuthenticationModel {
    fn from(a: ApiAuthentication) -> Self {
        Self {
            auth_type: a.auth_type,
            username: a.username,
            password: a.password,
            ntlm_host: a.ntlm_host,
            ntlm_domain: a.ntlm_domain,
            preemptive: a.preemptive,
        }
    }
}

impl From<&ReplicationModel> for ApiReplication {
    fn from(m: &ReplicationModel) -> Self {
        Self {
            preemptive_pull_enabled: m.preemptive_pull_enabled,
            asset_path_regex: m.asset_path_regex.clone(),
        }
    }
}

impl From<ApiReplication> for ReplicationModel {
    fn from(a: ApiReplication) -> Self {
        Self {
            preemptive_pull_enabled: a.preemptive_pull_enabled,
            asset_path_regex: a.asset_path_regex,
        }
    }
}

impl From<&GroupModel> for ApiGroup {
    fn from(m: &GroupModel) -> Self {
        Self {
            member_names: m.member_names.clone().unwrap_or_default(),
            writable_member: m.writable_member.clone(),
        }
    }
}

impl From<ApiGroup> for GroupModel {
    fn from(a: ApiGroup) -> Self {
        Self {
            member_names: Some(a.member_names),
            writable_member: a.writable_member,
        }
    }
}

impl From<&MavenModel> for ApiMaven {
    fn from(m: &MavenModel) -> Self {
        Self {
            version_policy: m.version_policy,
            layout_policy: m.layout_policy,
            content_disposition: m.content_disposition,
        }
    }
}

impl From<ApiMaven> for MavenModel {
    fn from(a: ApiMaven) -> Self {
        Self {
            version_policy: a.version_policy,
            layout_policy: a.layout_policy,
            content_disposition: a.content_disposition,
        }
    }
}

impl From<&DockerModel> for ApiDocker {
    fn from(m: &DockerModel) -> Self {
        Self {
            force_basic_auth: m.force_basic_auth,
            v1_enabled: m.v1_enabled,
            http_port: m.http_port,
            https_port: m.https_port,
            subdomain: m.subdomain.clone(),
        }
    }
}

impl From<ApiDocker> for DockerModel {
    fn from(a: ApiDocker) -> Self {
        Self {
            force_basic_auth: a.force_basic_auth,
            v1_enabled: a.v1_enabled,
            http_port: a.http_port,
            https_port: a.https_port,
            subdomain: a.subdomain,
        }
    }
}

impl From<&DockerProxyModel> for ApiDockerProxy {
    fn from(m: &DockerProxyModel) -> Self {
        Self {
            index_type: m.index_type,
            index_url: m.index_url.clone(),
        }
    }
}

impl From<ApiDockerProxy> for DockerProxyModel {
    fn from(a: ApiDockerProxy) -> Self {
        Self {
            index_type: a.index_type,
            index_url: a.index_url,
        }
    }
}

impl From<&RawModel> for ApiRaw {
    fn from(m: &RawModel) -> Self {
        Self {
            content_disposition: m.content_disposition,
        }
    }
}

impl From<ApiRaw> for RawModel {
    fn from(a: ApiRaw) -> Self {
        Self {
            content_disposition: a.content_disposition,
        }
    }
}

impl From<&PypiModel> for ApiPypi {
    fn from(m: &PypiModel) -> Self {
        Self {
            remove_quarantined: m.remove_quarrantined,
        }
    }
}

impl From<ApiPypi> for PypiModel {
    fn from(a: ApiPypi) -> Self {
        Self {
            remove_quarrantined: a.remove_quarantined,
        }
    }
}

impl From<&NugetProxyModel> for ApiNugetProxy {
    fn from(m: &NugetProxyModel) -> Self {
        Self {
            query_cache_item_max_age: m.query_cache_item_max_age,
            nuget_version: m.nuget_version,
        }
    }
}

impl From<ApiNugetProxy> for NugetProxyModel {
    fn from(a: ApiNugetProxy) -> Self {
        Self {
            query_cache_item_max_age: a.query_cache_item_max_age,
            nuget_version: a.nuget_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_keys_are_snake_case() {
        let model = RepositoryModel {
            name: "pypi-proxy".into(),
            pypi: Some(PypiModel {
                remove_quarrantined: Some(true),
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["pypi"]["remove_quarrantined"], json!(true));
    }

    #[test]
    fn test_api_keys_are_camel_case_and_skip_nulls() {
        let api = ApiRepository {
            name: "docker-hosted".into(),
            online: Some(true),
            docker: Some(ApiDocker {
                force_basic_auth: Some(true),
                v1_enabled: Some(false),
                ..Default::default()
            }),
            pypi: Some(ApiPypi {
                remove_quarantined: Some(true),
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&api).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "docker-hosted",
                "online": true,
                "docker": {"forceBasicAuth": true, "v1Enabled": false},
                "pypi": {"removeQuarantined": true}
            })
        );
    }

    #[test]
    fn test_routing_rule_name_alias_on_read() {
        let api: ApiRepository = serde_json::from_value(json!({
            "name": "npm-proxy",
            "routingRuleName": "block-internal",
            "unknownField": 1
        }))
        .unwrap();
        assert_eq!(api.routing_rule.as_deref(), Some("block-internal"));

        let sent = serde_json::to_value(&api).unwrap();
        assert_eq!(sent["routingRule"], json!("block-internal"));
    }

    #[test]
    fn test_state_with_nulls_deserializes() {
        let model: RepositoryModel = serde_json::from_value(json!({
            "name": "maven-hosted",
            "online": null,
            "storage": {"blob_store_name": "default", "write_policy": "ALLOW_ONCE"},
            "cleanup": null
        }))
        .unwrap();
        assert_eq!(
            model.storage.unwrap().write_policy,
            Some(WritePolicy::AllowOnce)
        );
        assert!(model.cleanup.is_none());
    }

    #[test]
    fn test_summary_type_field() {
        let summary: RepositorySummary = serde_json::from_value(json!({
            "name": "maven-central",
            "format": "maven2",
            "type": "proxy",
            "url": "http://localhost:8081/repository/maven-central",
            "attributes": {}
        }))
        .unwrap();
        assert_eq!(summary.kind, "proxy");
        assert_eq!(summary.online, None);
    }
}

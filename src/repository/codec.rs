//! Bidirectional mapping between repository state and REST payloads.
//!
//! [`RepositoryCodec::to_payload`] builds the request body from planned
//! state and [`RepositoryCodec::from_response`] rebuilds state from what the
//! server returned. Both are pure; all I/O lives in the resource.

use crate::constants::{
    ContentDisposition, DockerIndexType, LayoutPolicy, NugetVersion, VersionPolicy, WritePolicy,
    DEFAULT_BLOB_STORE_NAME, DEFAULT_NEGATIVE_CACHE_TTL, DEFAULT_NUGET_QUERY_CACHE_MAX_AGE,
    DEFAULT_PROXY_MAX_AGE,
};

use super::model::{
    ApiCleanup, ApiComponent, ApiDocker, ApiDockerProxy, ApiGroup, ApiHttpClient, ApiMaven,
    ApiNegativeCache, ApiNugetProxy, ApiProxy, ApiPypi, ApiRaw, ApiReplication, ApiRepository,
    ApiStorage, CleanupModel, HttpClientModel, PypiModel, RawModel, RepositoryModel, StorageModel,
};
use super::{FormatLeaf, RepositoryDescriptor};

/// Mapping for one repository resource type.
#[derive(Debug, Clone, Copy)]
pub struct RepositoryCodec {
    descriptor: RepositoryDescriptor,
}

impl RepositoryCodec {
    /// Create the codec for a resource type.
    pub fn new(descriptor: RepositoryDescriptor) -> Self {
        Self { descriptor }
    }

    /// The resource type this codec maps.
    pub fn descriptor(&self) -> RepositoryDescriptor {
        self.descriptor
    }

    /// Build the create/update body.
    ///
    /// Unset attributes are omitted. Blocks the server insists on are sent
    /// with their defaults even when state leaves them null.
    pub fn to_payload(&self, model: &RepositoryModel) -> ApiRepository {
        let d = self.descriptor;
        let mut api = ApiRepository {
            name: model.name.clone(),
            online: Some(model.online.unwrap_or(true)),
            ..Default::default()
        };

        let storage = model.storage.clone().unwrap_or_default();
        api.storage = Some(ApiStorage {
            blob_store_name: Some(
                storage
                    .blob_store_name
                    .unwrap_or_else(|| DEFAULT_BLOB_STORE_NAME.to_string()),
            ),
            strict_content_type_validation: Some(
                storage.strict_content_type_validation.unwrap_or(true),
            ),
            write_policy: d
                .is_hosted()
                .then(|| storage.write_policy.unwrap_or(WritePolicy::Allow)),
        });

        if !d.is_group() {
            api.cleanup = model.cleanup.as_ref().map(ApiCleanup::from);
        }
        if d.is_hosted() {
            api.component = model.component.as_ref().map(ApiComponent::from);
        }

        if d.is_proxy() {
            let proxy = model.proxy.clone().unwrap_or_default();
            api.proxy = Some(ApiProxy {
                remote_url: proxy.remote_url,
                content_max_age: Some(proxy.content_max_age.unwrap_or(DEFAULT_PROXY_MAX_AGE)),
                metadata_max_age: Some(proxy.metadata_max_age.unwrap_or(DEFAULT_PROXY_MAX_AGE)),
            });

            let negative_cache = model.negative_cache.clone().unwrap_or_default();
            api.negative_cache = Some(ApiNegativeCache {
                enabled: Some(negative_cache.enabled.unwrap_or(true)),
                time_to_live: Some(
                    negative_cache
                        .time_to_live
                        .unwrap_or(DEFAULT_NEGATIVE_CACHE_TTL),
                ),
            });

            let http_client = model
                .http_client
                .as_ref()
                .map(ApiHttpClient::from)
                .unwrap_or_default();
            api.http_client = Some(ApiHttpClient {
                blocked: Some(http_client.blocked.unwrap_or(false)),
                auto_block: Some(http_client.auto_block.unwrap_or(true)),
                ..http_client
            });

            api.routing_rule = model.routing_rule.clone();

            let replication = model.replication.clone().unwrap_or_default();
            api.replication = Some(ApiReplication {
                preemptive_pull_enabled: Some(replication.preemptive_pull_enabled.unwrap_or(false)),
                asset_path_regex: replication.asset_path_regex,
            });
        }

        if d.is_group() {
            api.group = Some(model.group.as_ref().map(ApiGroup::from).unwrap_or_default());
        }

        for leaf in d.leaves() {
            match leaf {
                FormatLeaf::Maven => {
                    let maven = model.maven.clone().unwrap_or_default();
                    api.maven = Some(ApiMaven {
                        version_policy: Some(maven.version_policy.unwrap_or(VersionPolicy::Release)),
                        layout_policy: Some(maven.layout_policy.unwrap_or(LayoutPolicy::Strict)),
                        content_disposition: Some(
                            maven
                                .content_disposition
                                .unwrap_or(ContentDisposition::Inline),
                        ),
                    });
                },
                FormatLeaf::Docker => {
                    let docker = model.docker.clone().unwrap_or_default();
                    api.docker = Some(ApiDocker {
                        force_basic_auth: Some(docker.force_basic_auth.unwrap_or(true)),
                        v1_enabled: Some(docker.v1_enabled.unwrap_or(false)),
                        http_port: docker.http_port,
                        https_port: docker.https_port,
                        subdomain: docker.subdomain,
                    });
                },
                FormatLeaf::DockerProxy => {
                    let docker_proxy = model.docker_proxy.clone().unwrap_or_default();
                    api.docker_proxy = Some(ApiDockerProxy {
                        index_type: Some(
                            docker_proxy
                                .index_type
                                .unwrap_or(DockerIndexType::Registry),
                        ),
                        index_url: docker_proxy.index_url,
                    });
                },
                FormatLeaf::Raw => {
                    api.raw = model.raw.as_ref().map(ApiRaw::from);
                },
                FormatLeaf::Pypi => {
                    api.pypi = model.pypi.as_ref().map(ApiPypi::from);
                },
                FormatLeaf::NugetProxy => {
                    let nuget = model.nuget_proxy.clone().unwrap_or_default();
                    api.nuget_proxy = Some(ApiNugetProxy {
                        query_cache_item_max_age: Some(
                            nuget
                                .query_cache_item_max_age
                                .unwrap_or(DEFAULT_NUGET_QUERY_CACHE_MAX_AGE),
                        ),
                        nuget_version: Some(nuget.nuget_version.unwrap_or(NugetVersion::V3)),
                    });
                },
            }
        }

        api
    }

    /// Rebuild state from a server response.
    ///
    /// `prior` is the state (or plan) the request was made from; it supplies
    /// write-only secrets and decides whether optional blocks the server
    /// always reports stay absent. Pass a default model when importing.
    pub fn from_response(&self, response: ApiRepository, prior: &RepositoryModel) -> RepositoryModel {
        let d = self.descriptor;
        let name = if response.name.is_empty() {
            prior.name.clone()
        } else {
            response.name
        };

        let mut model = RepositoryModel {
            name,
            online: response.online.or(prior.online),
            url: response.url.or_else(|| prior.url.clone()),
            ..Default::default()
        };

        model.storage = response
            .storage
            .map(|storage| StorageModel {
                write_policy: storage.write_policy.filter(|_| d.is_hosted()),
                ..StorageModel::from(storage)
            })
            .or_else(|| prior.storage.clone());

        if !d.is_group() {
            model.cleanup = match response.cleanup.filter(|c| !c.policy_names.is_empty()) {
                Some(cleanup) => Some(CleanupModel {
                    policy_names: Some(cleanup.policy_names),
                }),
                None => prior.cleanup.as_ref().map(|c| CleanupModel {
                    policy_names: c.policy_names.as_ref().map(|_| Vec::new()),
                }),
            };
        }
        if d.is_hosted() {
            model.component = response
                .component
                .map(Into::into)
                .or_else(|| prior.component.clone());
        }

        if d.is_proxy() {
            model.proxy = response.proxy.map(Into::into).or_else(|| prior.proxy.clone());
            model.negative_cache = response
                .negative_cache
                .map(Into::into)
                .or_else(|| prior.negative_cache.clone());
            model.http_client = http_client_state(response.http_client, prior.http_client.as_ref());
            model.routing_rule = response.routing_rule.filter(|r| !r.is_empty());
            model.replication = response
                .replication
                .map(Into::into)
                .or_else(|| prior.replication.clone());
        }

        if d.is_group() {
            model.group = response.group.map(Into::into).or_else(|| prior.group.clone());
        }

        for leaf in d.leaves() {
            match leaf {
                FormatLeaf::Maven => {
                    model.maven = response.maven.clone().map(Into::into).or_else(|| prior.maven.clone());
                },
                FormatLeaf::Docker => {
                    model.docker = response
                        .docker
                        .clone()
                        .map(Into::into)
                        .or_else(|| prior.docker.clone());
                },
                FormatLeaf::DockerProxy => {
                    model.docker_proxy = response
                        .docker_proxy
                        .clone()
                        .map(Into::into)
                        .or_else(|| prior.docker_proxy.clone());
                },
                FormatLeaf::NugetProxy => {
                    model.nuget_proxy = response
                        .nuget_proxy
                        .clone()
                        .map(Into::into)
                        .or_else(|| prior.nuget_proxy.clone());
                },
                FormatLeaf::Raw => {
                    model.raw = keep_optional(
                        response.raw.clone().map(RawModel::from),
                        prior.raw.is_some(),
                        |raw| {
                            raw.content_disposition
                                .map_or(true, |c| c == ContentDisposition::Attachment)
                        },
                    );
                },
                FormatLeaf::Pypi => {
                    model.pypi = keep_optional(
                        response.pypi.clone().map(PypiModel::from),
                        prior.pypi.is_some(),
                        |pypi| pypi.remove_quarrantined != Some(true),
                    );
                },
            }
        }

        model
    }
}

/// State of an optional block the server reports even when unconfigured.
///
/// The block stays absent unless state already had it or the server holds a
/// non-default value.
fn keep_optional<T>(server: Option<T>, prior_present: bool, is_default: impl Fn(&T) -> bool) -> Option<T> {
    server.filter(|value| prior_present || !is_default(value))
}

fn http_client_state(
    server: Option<ApiHttpClient>,
    prior: Option<&HttpClientModel>,
) -> Option<HttpClientModel> {
    let Some(server) = server else {
        return prior.cloned();
    };
    let mut state = HttpClientModel::from(server);

    if state.connection.is_none() {
        state.connection = prior.and_then(|p| p.connection.clone());
    }
    if let Some(auth) = state.authentication.as_mut() {
        // The server never returns the password
        auth.password = prior
            .and_then(|p| p.authentication.as_ref())
            .and_then(|a| a.password.clone());
    }

    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AuthenticationType;
    use crate::repository::model::{
        ApiAuthentication, ApiConnection, AuthenticationModel, ConnectionModel, DockerModel,
        GroupModel, ProxyModel,
    };
    use crate::repository::{RepositoryFormat, RepositoryKind};
    use serde_json::json;

    fn codec(format: RepositoryFormat, kind: RepositoryKind) -> RepositoryCodec {
        RepositoryCodec::new(RepositoryDescriptor::new(format, kind))
    }

    #[test]
    fn test_hosted_payload_omits_unset_values() {
        let model = RepositoryModel {
            name: "docker-hosted".into(),
            online: Some(false),
            storage: Some(StorageModel {
                blob_store_name: Some("default".into()),
                strict_content_type_validation: Some(true),
                write_policy: Some(WritePolicy::AllowOnce),
            }),
            docker: Some(DockerModel {
                force_basic_auth: Some(true),
                v1_enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let payload = codec(RepositoryFormat::Docker, RepositoryKind::Hosted).to_payload(&model);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "name": "docker-hosted",
                "online": false,
                "storage": {
                    "blobStoreName": "default",
                    "strictContentTypeValidation": true,
                    "writePolicy": "ALLOW_ONCE"
                },
                "docker": {"forceBasicAuth": true, "v1Enabled": false}
            })
        );
    }

    #[test]
    fn test_proxy_payload_materialises_defaults() {
        let model = RepositoryModel {
            name: "npm-proxy".into(),
            proxy: Some(ProxyModel {
                remote_url: Some("https://registry.npmjs.org".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let payload = codec(RepositoryFormat::Npm, RepositoryKind::Proxy).to_payload(&model);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["negativeCache"], json!({"enabled": true, "timeToLive": 1440}));
        assert_eq!(value["httpClient"], json!({"blocked": false, "autoBlock": true}));
        assert_eq!(value["replication"], json!({"preemptivePullEnabled": false}));
        assert_eq!(value["proxy"]["contentMaxAge"], json!(1440));
        assert!(value["storage"].get("writePolicy").is_none());
        assert!(value.get("routingRule").is_none());
        assert!(value.get("cleanup").is_none());
    }

    #[test]
    fn test_group_payload() {
        let model = RepositoryModel {
            name: "maven-public".into(),
            group: Some(GroupModel {
                member_names: Some(vec!["maven-releases".into(), "maven-central".into()]),
                writable_member: None,
            }),
            ..Default::default()
        };

        let payload = codec(RepositoryFormat::Maven, RepositoryKind::Group).to_payload(&model);
        let group = payload.group.unwrap();
        assert_eq!(group.member_names, vec!["maven-releases", "maven-central"]);
        assert!(payload.maven.is_none());
        assert!(payload.storage.unwrap().write_policy.is_none());
    }

    #[test]
    fn test_password_copied_from_prior() {
        let prior = RepositoryModel {
            name: "pypi-proxy".into(),
            http_client: Some(HttpClientModel {
                authentication: Some(AuthenticationModel {
                    auth_type: Some(AuthenticationType::Username),
                    username: Some("user".into()),
                    password: Some("pass".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let response = ApiRepository {
            name: "pypi-proxy".into(),
            http_client: Some(ApiHttpClient {
                blocked: Some(false),
                auto_block: Some(true),
                connection: Some(ApiConnection {
                    retries: Some(9),
                    ..Default::default()
                }),
                authentication: Some(ApiAuthentication {
                    auth_type: Some(AuthenticationType::Username),
                    username: Some("user".into()),
                    preemptive: Some(true),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };

        let state = codec(RepositoryFormat::Pypi, RepositoryKind::Proxy).from_response(response, &prior);
        let http_client = state.http_client.unwrap();
        assert_eq!(
            http_client.authentication.unwrap().password.as_deref(),
            Some("pass")
        );
        assert_eq!(http_client.connection.unwrap().retries, Some(9));
    }

    #[test]
    fn test_connection_kept_when_server_omits_it() {
        let prior = HttpClientModel {
            connection: Some(ConnectionModel {
                timeout: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        };
        let state = http_client_state(Some(ApiHttpClient::default()), Some(&prior)).unwrap();
        assert_eq!(state.connection.unwrap().timeout, Some(30));
    }

    #[test]
    fn test_cleanup_follows_prior_presence() {
        let c = codec(RepositoryFormat::Raw, RepositoryKind::Hosted);
        let empty_cleanup = ApiRepository {
            name: "raw".into(),
            cleanup: Some(ApiCleanup {
                policy_names: vec![],
            }),
            ..Default::default()
        };

        let state = c.from_response(empty_cleanup.clone(), &RepositoryModel::default());
        assert!(state.cleanup.is_none());

        let prior = RepositoryModel {
            cleanup: Some(CleanupModel {
                policy_names: Some(vec!["weekly".into()]),
            }),
            ..Default::default()
        };
        let state = c.from_response(empty_cleanup, &prior);
        assert_eq!(state.cleanup.unwrap().policy_names, Some(vec![]));

        let with_policy = ApiRepository {
            name: "raw".into(),
            cleanup: Some(ApiCleanup {
                policy_names: vec!["weekly".into()],
            }),
            ..Default::default()
        };
        let state = c.from_response(with_policy, &RepositoryModel::default());
        assert_eq!(
            state.cleanup.unwrap().policy_names,
            Some(vec!["weekly".to_string()])
        );
    }

    #[test]
    fn test_raw_leaf_appears_only_when_non_default() {
        let c = codec(RepositoryFormat::Raw, RepositoryKind::Hosted);
        let response = |disposition| ApiRepository {
            name: "raw".into(),
            raw: Some(ApiRaw {
                content_disposition: Some(disposition),
            }),
            ..Default::default()
        };

        let state = c.from_response(response(ContentDisposition::Attachment), &RepositoryModel::default());
        assert!(state.raw.is_none());

        let state = c.from_response(response(ContentDisposition::Inline), &RepositoryModel::default());
        assert_eq!(
            state.raw.unwrap().content_disposition,
            Some(ContentDisposition::Inline)
        );

        let prior = RepositoryModel {
            raw: Some(RawModel::default()),
            ..Default::default()
        };
        let state = c.from_response(response(ContentDisposition::Attachment), &prior);
        assert!(state.raw.is_some());
    }

    #[test]
    fn test_proxy_storage_drops_write_policy() {
        let response = ApiRepository {
            name: "maven-central".into(),
            storage: Some(ApiStorage {
                blob_store_name: Some("default".into()),
                strict_content_type_validation: Some(false),
                write_policy: Some(WritePolicy::Allow),
            }),
            ..Default::default()
        };
        let state = codec(RepositoryFormat::Maven, RepositoryKind::Proxy)
            .from_response(response, &RepositoryModel::default());
        let storage = state.storage.unwrap();
        assert_eq!(storage.write_policy, None);
        assert_eq!(storage.strict_content_type_validation, Some(false));
    }

    #[test]
    fn test_member_order_preserved() {
        let response = ApiRepository {
            name: "npm-group".into(),
            group: Some(ApiGroup {
                member_names: vec!["z-first".into(), "a-second".into()],
                writable_member: Some("z-first".into()),
            }),
            ..Default::default()
        };
        let state = codec(RepositoryFormat::Npm, RepositoryKind::Group)
            .from_response(response, &RepositoryModel::default());
        let group = state.group.unwrap();
        assert_eq!(
            group.member_names,
            Some(vec!["z-first".to_string(), "a-second".to_string()])
        );
        assert_eq!(group.writable_member.as_deref(), Some("z-first"));
    }
}

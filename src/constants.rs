//! Closed enumerations and numeric bounds shared by the repository schemas.
//!
//! Every enumeration serializes to the exact upper-case token the Nexus REST
//! API expects, and exposes its accepted values so the schema layer can attach
//! a one-of validator.

use serde::{Deserialize, Serialize};

/// Name of the blob store every fresh Nexus installation provides.
pub const DEFAULT_BLOB_STORE_NAME: &str = "default";

/// Lower bound for `http_client.connection.retries`.
pub const HTTP_CLIENT_RETRIES_MIN: i64 = 0;
/// Upper bound for `http_client.connection.retries`.
pub const HTTP_CLIENT_RETRIES_MAX: i64 = 10;

/// Lower bound for `http_client.connection.timeout` (seconds).
pub const HTTP_CLIENT_TIMEOUT_MIN: i64 = 1;
/// Upper bound for `http_client.connection.timeout` (seconds).
pub const HTTP_CLIENT_TIMEOUT_MAX: i64 = 3600;

/// Default for `proxy.content_max_age` and `proxy.metadata_max_age` (minutes).
pub const DEFAULT_PROXY_MAX_AGE: i64 = 1440;
/// Default for `negative_cache.time_to_live` (minutes).
pub const DEFAULT_NEGATIVE_CACHE_TTL: i64 = 1440;
/// Default for `nuget_proxy.query_cache_item_max_age` (seconds).
pub const DEFAULT_NUGET_QUERY_CACHE_MAX_AGE: i64 = 3600;

/// Valid range for connector ports on docker repositories.
pub const PORT_MIN: i64 = 1;
/// Valid range for connector ports on docker repositories.
pub const PORT_MAX: i64 = 65535;

macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire token for this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }

            /// Accepted wire tokens, for one-of validators.
            pub fn values() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }

            /// Parse a wire token.
            pub fn parse(value: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.as_str() == value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

api_enum! {
    /// Governs whether and how artifacts may be written to a hosted repository.
    WritePolicy {
        /// Artifacts may be deployed and redeployed.
        Allow => "ALLOW",
        /// Artifacts may be deployed once.
        AllowOnce => "ALLOW_ONCE",
        /// The repository is read-only.
        Deny => "DENY",
        /// Only replication may write.
        ReplicationOnly => "REPLICATION_ONLY",
    }
}

api_enum! {
    /// Maven path layout enforcement.
    LayoutPolicy {
        /// Reject paths that do not follow the Maven layout.
        Strict => "STRICT",
        /// Accept any path.
        Permissive => "PERMISSIVE",
    }
}

api_enum! {
    /// Which Maven versions a repository accepts.
    VersionPolicy {
        /// Release versions only.
        Release => "RELEASE",
        /// Snapshot versions only.
        Snapshot => "SNAPSHOT",
        /// Both.
        Mixed => "MIXED",
    }
}

api_enum! {
    /// `Content-Disposition` header sent with downloaded assets.
    ContentDisposition {
        /// Browsers download the asset.
        Attachment => "ATTACHMENT",
        /// Browsers may render the asset.
        Inline => "INLINE",
    }
}

api_enum! {
    /// Routing rule evaluation mode.
    RoutingRuleMode {
        /// Requests matching any matcher are blocked.
        Block => "BLOCK",
        /// Only requests matching a matcher are allowed.
        Allow => "ALLOW",
    }
}

api_enum! {
    /// Where a docker proxy looks up its index.
    DockerIndexType {
        /// Use the remote registry itself.
        Registry => "REGISTRY",
        /// Use Docker Hub.
        Hub => "HUB",
        /// Use `docker_proxy.index_url`.
        Custom => "CUSTOM",
    }
}

api_enum! {
    /// NuGet protocol version a proxy speaks upstream.
    NugetVersion {
        /// NuGet v2 (OData).
        V2 => "V2",
        /// NuGet v3.
        V3 => "V3",
    }
}

api_enum! {
    /// Authentication scheme a proxy uses against its remote.
    AuthenticationType {
        /// HTTP Basic with username and password.
        Username => "username",
        /// NTLM with host and domain.
        Ntlm => "ntlm",
    }
}

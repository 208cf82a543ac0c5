//! Remote API adapter.
//!
//! [`NexusApi`] is the typed surface the resources talk to. [`NexusClient`]
//! implements it over the server's REST API (`<url>/service/rest/v1`) with
//! `reqwest` and HTTP Basic authentication.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::NexusConnection;
use crate::error::ProviderError;
use crate::repository::model::{ApiRepository, RepositorySummary};
use crate::repository::RepositoryDescriptor;
use crate::routing_rule::ApiRoutingRule;

/// Timeout applied to every request unless overridden.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed operations against the server.
///
/// Lookups return `Ok(None)` on 404 and deletes return `Ok(false)`, so
/// callers never have to match on [`ProviderError::NotFound`].
#[async_trait::async_trait]
pub trait NexusApi: Send + Sync {
    /// `POST /repositories/{format}/{kind}`
    async fn create_repository(
        &self,
        descriptor: RepositoryDescriptor,
        body: &ApiRepository,
    ) -> Result<(), ProviderError>;

    /// `GET /repositories/{format}/{kind}/{name}`
    async fn get_repository(
        &self,
        descriptor: RepositoryDescriptor,
        name: &str,
    ) -> Result<Option<ApiRepository>, ProviderError>;

    /// `GET /repositories/{name}`
    async fn get_repository_summary(
        &self,
        name: &str,
    ) -> Result<Option<RepositorySummary>, ProviderError>;

    /// `PUT /repositories/{format}/{kind}/{name}`
    async fn update_repository(
        &self,
        descriptor: RepositoryDescriptor,
        name: &str,
        body: &ApiRepository,
    ) -> Result<(), ProviderError>;

    /// `DELETE /repositories/{name}`
    async fn delete_repository(&self, name: &str) -> Result<bool, ProviderError>;

    /// `GET /repositories`
    async fn list_repositories(&self) -> Result<Vec<RepositorySummary>, ProviderError>;

    /// `POST /routing-rules`
    async fn create_routing_rule(&self, rule: &ApiRoutingRule) -> Result<(), ProviderError>;

    /// `GET /routing-rules/{name}`
    async fn get_routing_rule(&self, name: &str) -> Result<Option<ApiRoutingRule>, ProviderError>;

    /// `PUT /routing-rules/{name}`
    async fn update_routing_rule(
        &self,
        name: &str,
        rule: &ApiRoutingRule,
    ) -> Result<(), ProviderError>;

    /// `DELETE /routing-rules/{name}`
    async fn delete_routing_rule(&self, name: &str) -> Result<bool, ProviderError>;

    /// `GET /routing-rules`
    async fn list_routing_rules(&self) -> Result<Vec<ApiRoutingRule>, ProviderError>;
}

/// `reqwest` implementation of [`NexusApi`].
pub struct NexusClient {
    http: reqwest::Client,
    api_base: Url,
    username: String,
    password: String,
}

impl std::fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusClient")
            .field("api_base", &self.api_base.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl NexusClient {
    /// Build a client with the default request timeout.
    pub fn new(connection: &NexusConnection) -> Result<Self, ProviderError> {
        Self::with_timeout(connection, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build a client with a custom request timeout.
    pub fn with_timeout(
        connection: &NexusConnection,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        let mut api_base = connection.base_url.clone();
        api_base
            .path_segments_mut()
            .map_err(|_| {
                ProviderError::Configuration(format!(
                    "server URL cannot be used as a base: {}",
                    connection.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["service", "rest", "v1"]);

        Ok(Self {
            http,
            api_base,
            username: connection.username.clone(),
            password: connection.password.clone(),
        })
    }

    /// Base URL of the REST API.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn execute(&self, request: RequestBuilder, resource: &str) -> Result<Response, ProviderError> {
        let request = request
            .build()
            .map_err(|e| ProviderError::Transport(format!("{}: {}", resource, e)))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| transport_error(e, resource))?;

        let status = response.status();
        debug!(%method, path = %path, status = status.as_u16(), "request completed");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, resource, &body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        resource: &str,
    ) -> Result<Option<T>, ProviderError> {
        match self.execute(self.request(Method::GET, url), resource).await {
            Ok(response) => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| transport_error(e, resource))?;
                Ok(Some(serde_json::from_str(&text)?))
            },
            Err(ProviderError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, url: Url, resource: &str) -> Result<bool, ProviderError> {
        match self.execute(self.request(Method::DELETE, url), resource).await {
            Ok(_) => Ok(true),
            Err(ProviderError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl NexusApi for NexusClient {
    async fn create_repository(
        &self,
        descriptor: RepositoryDescriptor,
        body: &ApiRepository,
    ) -> Result<(), ProviderError> {
        let url = self.endpoint(&["repositories", descriptor.format.as_str(), descriptor.kind.as_str()]);
        let resource = repository_resource(&body.name);
        self.execute(self.request(Method::POST, url).json(body), &resource)
            .await?;
        Ok(())
    }

    async fn get_repository(
        &self,
        descriptor: RepositoryDescriptor,
        name: &str,
    ) -> Result<Option<ApiRepository>, ProviderError> {
        let url = self.endpoint(&[
            "repositories",
            descriptor.format.as_str(),
            descriptor.kind.as_str(),
            name,
        ]);
        self.get_json(url, &repository_resource(name)).await
    }

    async fn get_repository_summary(
        &self,
        name: &str,
    ) -> Result<Option<RepositorySummary>, ProviderError> {
        let url = self.endpoint(&["repositories", name]);
        self.get_json(url, &repository_resource(name)).await
    }

    async fn update_repository(
        &self,
        descriptor: RepositoryDescriptor,
        name: &str,
        body: &ApiRepository,
    ) -> Result<(), ProviderError> {
        let url = self.endpoint(&[
            "repositories",
            descriptor.format.as_str(),
            descriptor.kind.as_str(),
            name,
        ]);
        self.execute(self.request(Method::PUT, url).json(body), &repository_resource(name))
            .await?;
        Ok(())
    }

    async fn delete_repository(&self, name: &str) -> Result<bool, ProviderError> {
        let url = self.endpoint(&["repositories", name]);
        self.delete(url, &repository_resource(name)).await
    }

    async fn list_repositories(&self) -> Result<Vec<RepositorySummary>, ProviderError> {
        let url = self.endpoint(&["repositories"]);
        Ok(self.get_json(url, "repositories").await?.unwrap_or_default())
    }

    async fn create_routing_rule(&self, rule: &ApiRoutingRule) -> Result<(), ProviderError> {
        let url = self.endpoint(&["routing-rules"]);
        self.execute(self.request(Method::POST, url).json(rule), &routing_rule_resource(&rule.name))
            .await?;
        Ok(())
    }

    async fn get_routing_rule(&self, name: &str) -> Result<Option<ApiRoutingRule>, ProviderError> {
        let url = self.endpoint(&["routing-rules", name]);
        self.get_json(url, &routing_rule_resource(name)).await
    }

    async fn update_routing_rule(
        &self,
        name: &str,
        rule: &ApiRoutingRule,
    ) -> Result<(), ProviderError> {
        let url = self.endpoint(&["routing-rules", name]);
        self.execute(self.request(Method::PUT, url).json(rule), &routing_rule_resource(name))
            .await?;
        Ok(())
    }

    async fn delete_routing_rule(&self, name: &str) -> Result<bool, ProviderError> {
        let url = self.endpoint(&["routing-rules", name]);
        self.delete(url, &routing_rule_resource(name)).await
    }

    async fn list_routing_rules(&self) -> Result<Vec<ApiRoutingRule>, ProviderError> {
        let url = self.endpoint(&["routing-rules"]);
        Ok(self.get_json(url, "routing rules").await?.unwrap_or_default())
    }
}

fn repository_resource(name: &str) -> String {
    format!("repository {}", name)
}

fn routing_rule_resource(name: &str) -> String {
    format!("routing rule {}", name)
}

fn transport_error(err: reqwest::Error, resource: &str) -> ProviderError {
    if err.is_timeout() {
        ProviderError::DeadlineExceeded(format!("{}: {}", resource, err))
    } else {
        ProviderError::Transport(format!("{}: {}", resource, err))
    }
}

/// Map a non-success response to an error, keeping the server's wording.
fn status_error(status: StatusCode, resource: &str, body: &str) -> ProviderError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    });

    match status.as_u16() {
        404 => ProviderError::NotFound(resource.to_string()),
        401 | 403 => ProviderError::PermissionDenied(format!("{}: {}", resource, message)),
        409 => ProviderError::AlreadyExists(format!("{}: {}", resource, message)),
        400..=499 if is_duplicate(&message) => {
            ProviderError::AlreadyExists(format!("{}: {}", resource, message))
        },
        400..=499 => ProviderError::Remote {
            status: status.as_u16(),
            resource: resource.to_string(),
            message,
        },
        code => ProviderError::Unavailable(format!("HTTP {} on {}: {}", code, resource, message)),
    }
}

fn is_duplicate(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("already exists") || lower.contains("already used")
}

/// Extract the human-readable message from an error body.
///
/// Validation failures arrive as `[{"id": ..., "message": ...}]`; other
/// failures as `{"message": ...}` or plain text.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(items) = json.as_array() {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("message").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        if let Some(message) = json.get("message").and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }

    Some(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RoutingRuleMode;
    use crate::repository::{RepositoryFormat, RepositoryKind};
    use mockito::Matcher;
    use serde_json::json;

    // base64("admin:admin123")
    const BASIC_AUTH: &str = "Basic YWRtaW46YWRtaW4xMjM=";

    fn client_for(base: &str) -> NexusClient {
        let connection = NexusConnection {
            base_url: Url::parse(base).unwrap(),
            username: "admin".into(),
            password: "admin123".into(),
        };
        NexusClient::new(&connection).unwrap()
    }

    fn maven_hosted() -> RepositoryDescriptor {
        RepositoryDescriptor::new(RepositoryFormat::Maven, RepositoryKind::Hosted)
    }

    #[test]
    fn test_api_base_keeps_context_path() {
        let client = client_for("http://localhost:8081");
        assert_eq!(client.api_base().as_str(), "http://localhost:8081/service/rest/v1");

        let client = client_for("https://example.com/nexus");
        assert_eq!(client.api_base().as_str(), "https://example.com/nexus/service/rest/v1");
    }

    #[test]
    fn test_endpoint_encodes_names() {
        let client = client_for("http://localhost:8081");
        let url = client.endpoint(&["repositories", "my repo"]);
        assert_eq!(url.path(), "/service/rest/v1/repositories/my%20repo");
    }

    #[test]
    fn test_error_message_formats() {
        assert_eq!(
            error_message(r#"[{"id":"PARAMETER name","message":"Name is already used, must be unique (ignoring case)"}]"#)
                .as_deref(),
            Some("Name is already used, must be unique (ignoring case)")
        );
        assert_eq!(
            error_message(r#"{"message":"Blob store missing"}"#).as_deref(),
            Some("Blob store missing")
        );
        assert_eq!(error_message("plain text").as_deref(), Some("plain text"));
        assert_eq!(error_message("   "), None);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "repository x", ""),
            ProviderError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "repository x", ""),
            ProviderError::PermissionDenied(_)
        ));
        assert!(matches!(
            status_error(StatusCode::CONFLICT, "repository x", ""),
            ProviderError::AlreadyExists(_)
        ));

        let err = status_error(StatusCode::SERVICE_UNAVAILABLE, "repository x", "");
        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert!(err.is_transient());

        match status_error(StatusCode::BAD_REQUEST, "repository x", "Blob store 'nope' not found") {
            ProviderError::Remote {
                status,
                resource,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(resource, "repository x");
                assert_eq!(message, "Blob store 'nope' not found");
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_repository_sends_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/service/rest/v1/repositories/maven/hosted/maven-releases")
            .match_header("authorization", BASIC_AUTH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "name": "maven-releases",
                    "format": "maven2",
                    "type": "hosted",
                    "url": "http://localhost:8081/repository/maven-releases",
                    "online": true,
                    "storage": {
                        "blobStoreName": "default",
                        "strictContentTypeValidation": true,
                        "writePolicy": "ALLOW_ONCE"
                    },
                    "maven": {
                        "versionPolicy": "RELEASE",
                        "layoutPolicy": "STRICT",
                        "contentDisposition": "INLINE"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server.url());
        let repo = client
            .get_repository(maven_hosted(), "maven-releases")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(repo.name, "maven-releases");
        assert_eq!(repo.format.as_deref(), Some("maven2"));
        assert_eq!(
            repo.storage.unwrap().write_policy,
            Some(crate::constants::WritePolicy::AllowOnce)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_repository_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/service/rest/v1/repositories/gone")
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(client.get_repository_summary("gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_repository_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/service/rest/v1/repositories/maven/hosted")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "name": "maven-releases",
                "online": true
            })))
            .with_status(201)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let body = ApiRepository {
            name: "maven-releases".into(),
            online: Some(true),
            ..Default::default()
        };
        client.create_repository(maven_hosted(), &body).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_duplicate_create_is_already_exists() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/service/rest/v1/repositories/maven/hosted")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"PARAMETER name","message":"Name is already used, must be unique (ignoring case)"}]"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let body = ApiRepository {
            name: "maven-releases".into(),
            ..Default::default()
        };
        let err = client.create_repository(maven_hosted(), &body).await.unwrap_err();
        assert!(matches!(err, ProviderError::AlreadyExists(_)));
        assert!(err.to_string().contains("already used"));
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/service/rest/v1/repositories")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.list_repositories().await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/service/rest/v1/routing-rules")
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.list_routing_rules().await.unwrap_err();
        assert!(matches!(err, ProviderError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _gone = server
            .mock("DELETE", "/service/rest/v1/repositories/gone")
            .with_status(404)
            .create_async()
            .await;
        let _present = server
            .mock("DELETE", "/service/rest/v1/repositories/present")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(!client.delete_repository("gone").await.unwrap());
        assert!(client.delete_repository("present").await.unwrap());
    }

    #[tokio::test]
    async fn test_routing_rule_round_trip_keeps_matcher_order() {
        let mut server = mockito::Server::new_async().await;
        let rule = json!({
            "name": "block-internal",
            "description": "",
            "mode": "BLOCK",
            "matchers": ["^/com/example/.*", "^/org/example/.*"]
        });
        let _get = server
            .mock("GET", "/service/rest/v1/routing-rules/block-internal")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(rule.to_string())
            .create_async()
            .await;

        let client = client_for(&server.url());
        let fetched = client.get_routing_rule("block-internal").await.unwrap().unwrap();
        assert_eq!(fetched.mode, Some(RoutingRuleMode::Block));
        assert_eq!(fetched.matchers, vec!["^/com/example/.*", "^/org/example/.*"]);
    }

    #[tokio::test]
    async fn test_referenced_routing_rule_delete_propagates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/service/rest/v1/routing-rules/in-use")
            .with_status(400)
            .with_body(r#"{"message":"Routing rule is still in use by 1 repositories."}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.delete_routing_rule("in-use").await.unwrap_err();
        assert!(matches!(err, ProviderError::Remote { status: 400, .. }));
        assert!(err.to_string().contains("still in use"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr));
        let err = client.list_repositories().await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_timeout_is_deadline_exceeded() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _accept = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let connection = NexusConnection {
            base_url: Url::parse(&format!("http://{}", addr)).unwrap(),
            username: "admin".into(),
            password: "admin123".into(),
        };
        let client = NexusClient::with_timeout(&connection, Duration::from_millis(100)).unwrap();
        let err = client.list_repositories().await.unwrap_err();
        assert!(matches!(err, ProviderError::DeadlineExceeded(_)));
        assert!(err.is_transient());
    }
}

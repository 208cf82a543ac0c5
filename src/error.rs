//! Error types for the provider.

use serde_json::Value;
use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors surfaced by provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration was rejected before any remote call.
    #[error("{}", render_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),

    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource already exists (create conflict).
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// The server rejected the request; `message` is its own wording.
    #[error("{message} (HTTP {status} on {resource})")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Resource identity the request targeted.
        resource: String,
        /// Message returned by the server.
        message: String,
    },

    /// Permission denied (authentication/authorization failure).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The server answered with a 5xx status.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The request never completed (connection refused, reset, DNS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Operation timed out.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// The host cancelled the operation.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// The object was created remotely but could not be read back.
    #[error("Resource {name} was created but could not be read back: {source}")]
    PartialCreate {
        /// Name of the created object.
        name: String,
        /// Best known state of the created object.
        state: Box<Value>,
        /// What went wrong after creation.
        #[source]
        source: Box<ProviderError>,
    },

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("{0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> String {
        match self {
            Self::Diagnostics(diags) => render_diagnostics(diags),
            Self::NotFound(msg)
            | Self::AlreadyExists(msg)
            | Self::PermissionDenied(msg)
            | Self::Unavailable(msg)
            | Self::Transport(msg)
            | Self::DeadlineExceeded(msg)
            | Self::Cancelled(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg) => msg.clone(),
            Self::Remote { message, .. } => message.clone(),
            Self::PartialCreate { source, .. } => source.message(),
            Self::Serialization(err) => err.to_string(),
        }
    }

    /// Whether re-running the operation may succeed without changing configuration.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Transport(_) | Self::DeadlineExceeded(_) => true,
            Self::PartialCreate { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Convert the error into host diagnostics.
    ///
    /// Validation errors keep their attribute-scoped diagnostics; everything else
    /// becomes a single error diagnostic whose summary names the failure class.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        match self {
            Self::Diagnostics(diags) => diags,
            other => vec![Diagnostic::error(other.summary()).with_detail(other.to_string())],
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Self::Diagnostics(_) => "Invalid configuration",
            Self::NotFound(_) => "Resource not found",
            Self::AlreadyExists(_) => "Resource already exists",
            Self::Remote { .. } => "Request rejected by server",
            Self::PermissionDenied(_) => "Permission denied",
            Self::Unavailable(_) => "Server unavailable (retryable)",
            Self::Transport(_) => "Transport failure (transient)",
            Self::DeadlineExceeded(_) => "Request timed out (transient)",
            Self::Cancelled(_) => "Operation cancelled",
            Self::PartialCreate { .. } => "Resource created but not read back",
            Self::Configuration(_) => "Provider configuration error",
            Self::UnknownResource(_) => "Unknown resource type",
            Self::Serialization(_) => "Invalid state encoding",
        }
    }
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| match &d.detail {
            Some(detail) => format!("{}: {}", d.summary, detail),
            None => d.summary.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("resource-123".to_string());
        assert_eq!(format!("{}", err), "Resource not found: resource-123");

        let err = ProviderError::UnknownResource("custom_resource".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: custom_resource");

        let err = ProviderError::AlreadyExists("maven-releases".to_string());
        assert_eq!(format!("{}", err), "Resource already exists: maven-releases");
    }

    #[test]
    fn test_remote_error_keeps_server_message() {
        let err = ProviderError::Remote {
            status: 400,
            resource: "repository maven-releases".to_string(),
            message: "Blob store 'missing' not found".to_string(),
        };
        assert_eq!(err.message(), "Blob store 'missing' not found");
        assert!(err.to_string().contains("Blob store 'missing' not found"));
        assert!(err.to_string().contains("HTTP 400"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_diagnostics_display_contains_details() {
        let err = ProviderError::Diagnostics(vec![
            Diagnostic::error("Invalid Attribute Value")
                .with_detail("Attribute negative_cache.time_to_live value must be at least 0, got: -1"),
            Diagnostic::error("Missing required argument"),
        ]);
        let display = err.to_string();
        assert!(display.contains("must be at least 0"));
        assert!(display.contains("Missing required argument"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Unavailable("502".into()).is_transient());
        assert!(ProviderError::Transport("reset".into()).is_transient());
        assert!(ProviderError::DeadlineExceeded("30s".into()).is_transient());
        assert!(!ProviderError::Cancelled("stop".into()).is_transient());
        assert!(!ProviderError::NotFound("x".into()).is_transient());

        let partial = ProviderError::PartialCreate {
            name: "npm-proxy".into(),
            state: Box::new(serde_json::json!({"name": "npm-proxy"})),
            source: Box::new(ProviderError::Transport("reset".into())),
        };
        assert!(partial.is_transient());
        assert_eq!(partial.message(), "reset");
    }

    #[test]
    fn test_into_diagnostics() {
        let diag = Diagnostic::error("Invalid Attribute Value").with_attribute("proxy.remote_url");
        let diags = ProviderError::Diagnostics(vec![diag.clone()]).into_diagnostics();
        assert_eq!(diags, vec![diag]);

        let diags = ProviderError::Unavailable("HTTP 503".into()).into_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Server unavailable (retryable)");
        assert_eq!(
            diags[0].detail.as_deref(),
            Some("Service unavailable: HTTP 503")
        );
    }
}

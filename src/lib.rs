//! Sonatype Nexus Repository provider
//!
//! A declarative-infrastructure provider that manages repositories and
//! routing rules on a Sonatype Nexus Repository server through its REST API.
//!
//! # Overview
//!
//! - **Resources**: one resource type per supported `(format, kind)` pair,
//!   e.g. `sonatyperepo_repository_maven_proxy`, plus
//!   `sonatyperepo_routing_rule`
//! - **Data sources**: `sonatyperepo_repositories`, `sonatyperepo_routing_rule`
//!   and `sonatyperepo_routing_rules`
//! - **Schema & validation**: every attribute is validated before any remote
//!   call is made
//! - **Planning**: defaults, computed values and replacement are resolved
//!   against prior state
//! - **Host boundary**: [`ProviderService`] and [`ProviderHost`]
//!
//! # Quick Start
//!
//! ```ignore
//! use sonatyperepo_provider::{init_logging, ProviderHost, SonatypeRepoProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     init_logging();
//!
//!     let host = ProviderHost::new(SonatypeRepoProvider::new());
//!     host.configure(json!({
//!         "url": "http://localhost:8081",
//!         "username": "admin",
//!         "password": "admin123"
//!     }))
//!     .await;
//!
//!     let config = json!({
//!         "name": "npm-internal",
//!         "storage": {"blob_store_name": "default"}
//!     });
//!     let plan = host
//!         .plan("sonatyperepo_repository_npm_hosted", None, config.clone(), config)
//!         .await;
//!     if let Some(plan) = plan.value {
//!         let created = host
//!             .create("sonatyperepo_repository_npm_hosted", plan.planned_state, Default::default())
//!             .await;
//!         println!("{:?}", created.value);
//!     }
//! }
//! ```
//!
//! # Configuration
//!
//! The provider block takes `url`, `username` and `password`. Unset values
//! fall back to `NXRM_SERVER_URL`, `NXRM_SERVER_USERNAME` and
//! `NXRM_SERVER_PASSWORD`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod constants;
pub mod data_source;
pub mod error;
pub mod host;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod repository;
pub mod resource;
pub mod routing_rule;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::{NexusApi, NexusClient};
pub use config::{NexusConnection, ProviderConfig};
pub use error::ProviderError;
pub use host::{ProviderHost, ProviderService};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::SonatypeRepoProvider;
pub use repository::{RepositoryDescriptor, RepositoryFormat, RepositoryKind, RepositoryResource};
pub use resource::{DataSource, ManagedResource};
pub use routing_rule::RoutingRuleResource;
pub use schema::{Diagnostic, ProviderSchema};
pub use types::{
    AttributeChange, HostResponse, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tokio_util::sync::CancellationToken;
pub use tracing;

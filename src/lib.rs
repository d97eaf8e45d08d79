//! # xMatters Integration Library
//!
//! An async client for the xMatters REST API (`/api/xm/1`) with:
//! - Basic or bearer authentication on every request
//! - A shared rate limiter (burst of one, default 4 requests per second)
//! - Retries with exponential backoff on 429 and 5xx answers
//! - Automatic walking of paginated collections
//! - Group roster reconciliation
//! - Deadlines and cancellation through [`RequestContext`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_xmatters::{AuthMethod, XMattersClient, XMattersConfig};
//! use integrations_xmatters::services::PeopleListParams;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = XMattersConfig::builder()
//!         .hostname("acme.xmatters.com")
//!         .auth(AuthMethod::basic("api-user", "secret"))
//!         .build()?;
//!
//!     let client = XMattersClient::new(config)?;
//!
//!     let params = PeopleListParams {
//!         terms: Some("ops".into()),
//!         ..Default::default()
//!     };
//!     for person in client.people().list(&params).await? {
//!         println!("{}", person.id);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// Authentication
pub mod auth;

// HTTP client and transport
pub mod client;
pub mod transport;

// Pagination handling
pub mod pagination;

// API Services
pub mod services;

// Resilience patterns
pub mod resilience;

// Observability
pub mod observability;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use auth::{AuthManager, AuthMethod};
pub use client::context::RequestContext;
pub use client::executor::{RequestBody, RequestExecutor};
pub use client::{XMattersClient, XMattersClientBuilder};
pub use config::{RateLimitConfig, RetryConfig, XMattersConfig, XMattersConfigBuilder};
pub use errors::{ApiErrorBody, TransportErrorKind, XMattersError, XMattersResult};
pub use pagination::{PageEnvelope, PageIterator, PaginationLinks};
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::*;

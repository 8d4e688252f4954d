//! HTTP client for the Wayfarer marketplace backend.
//!
//! [`ApiClient`] sends requests with the stored session token and turns
//! HTTP failures into [`wayfarer_core::ServiceError`]s. The services in
//! [`services`] implement the `wayfarer-core` service traits on top of it,
//! and [`FileTokenStore`] persists the session token between runs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use wayfarer_client::{ApiClient, ApiClientConfig, FileTokenStore, HttpListingService};
//! use wayfarer_core::{Hotel, ListParams, ListingService, RecordingNavigator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiClientConfig::new("http://localhost:5000/api")
//!     .with_timeout(Duration::from_secs(10));
//! let tokens = Arc::new(FileTokenStore::new("session.json"));
//! let client = Arc::new(ApiClient::with_config(
//!     config,
//!     tokens,
//!     Arc::new(RecordingNavigator::default()),
//! )?);
//! let hotels: Vec<Hotel> = HttpListingService::new(client).list(&ListParams::new()).await?;
//! # let _ = hotels;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod api;
mod config;
mod multipart;
pub mod services;
mod token_store;

pub use api::{ApiClient, ApiRequest, RequestBody};
pub use config::{ApiClientConfig, ClientBuildError, DEFAULT_API_URL, DEFAULT_USER_AGENT};
pub use services::{HttpAuthService, HttpListingService, HttpTripPlanService};
pub use token_store::{FileTokenStore, TOKEN_KEY};

//! Facade crate for the Wayfarer tourism marketplace client.
//!
//! This crate re-exports the core domain types and exposes the HTTP client
//! and the document exporter behind feature flags.

#![forbid(unsafe_code)]

pub use wayfarer_core::{
    AuthService, BuilderError, CabSearchService, EntityForm, EntityId, EntityKind, Itinerary,
    ListParams, Listing, ListingService, ListingView, Navigator, Notice, ServiceError, Session,
    TokenStore, TripPlan, TripPlanBuilder, TripPlanService, TripPlanWizard, User,
};

#[cfg(feature = "test-support")]
pub use wayfarer_core::test_support;

#[cfg(feature = "client")]
pub use wayfarer_client::{
    ApiClient, ApiClientConfig, FileTokenStore, HttpAuthService, HttpListingService,
    HttpTripPlanService,
};

#[cfg(feature = "export")]
pub use wayfarer_export::{ExportError, ExportedDocument, export_trip_plan};

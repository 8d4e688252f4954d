//! Core domain for the Wayfarer tourism marketplace client.
//!
//! The crate models the marketplace's listings (hotels, restaurants, cab
//! services, guides) and trip plans, and holds every piece of client logic
//! that does not depend on a transport: listing filters, owner-side entity
//! forms with image staging, the six-step trip plan builder, itinerary
//! derivation and the signed-in session. Backend access goes through the
//! async traits in [`service`]; `wayfarer-client` implements them over
//! HTTP.
//!
//! Front ends observe outcomes through returned values plus [`Notice`]s and
//! [`Navigator`] redirects, so no UI framework is assumed.

#![forbid(unsafe_code)]

pub mod builder;
pub mod dates;
pub mod entity;
pub mod error;
pub mod filter;
pub mod form;
pub mod itinerary;
pub mod navigation;
pub mod notice;
pub mod payload;
pub mod service;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod trip_plan;
pub mod user;

pub use builder::{
    BuilderError, BuilderMode, CatalogueEntry, CatalogueSource, DateBounds, DateField,
    ListingCatalogue, SelectOutcome, Selected, TripPlanBuilder, TripPlanWizard, WizardStep,
};
pub use entity::{
    Cab, ContactInfo, Coordinates, EntityId, EntityKind, Guide, Hotel, Listing, Location,
    Restaurant, Review,
};
pub use error::{GENERIC_FAILURE, ServiceError};
pub use filter::{EmptyState, ListingFilter, ListingView, TripPlanQuery, TripPlanSort};
pub use form::{EntityForm, FormError, FormFields, FormMode, FormState, SubmitOutcome, TagSet};
pub use itinerary::{Itinerary, ItineraryDay, ItineraryEvent};
pub use navigation::{Navigator, RecordingNavigator};
pub use notice::{Notice, NoticeLevel};
pub use payload::{FormPayload, ImageUpload, PayloadField, PayloadValue};
pub use service::{
    AuthService, CabSearchService, ListParams, ListingService, TokenStore, TripPlanService,
};
pub use session::{Session, SessionError};
pub use trip_plan::{BasicDetails, BasicDetailsError, EntityRef, TripPlan, TripPlanDocument};
pub use user::{Credentials, Registration, Role, User, UserId};


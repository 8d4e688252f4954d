//! Backend-facing service traits.
//!
//! The HTTP implementations live in `wayfarer-client`; in-memory doubles
//! live in `test_support` behind the `test-support` feature.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::entity::{Cab, EntityId, Listing};
use crate::error::ServiceError;
use crate::payload::ImageUpload;
use crate::trip_plan::{TripPlan, TripPlanDocument};
use crate::user::{AuthGrant, Credentials, Registration, User};

/// Query parameters forwarded to a collection `GET`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pairs: Vec<(String, String)>,
}

impl ListParams {
    /// No parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Parameters in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Whether no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// CRUD over one listing kind.
#[async_trait(?Send)]
pub trait ListingService<L: Listing> {
    /// Fetch the collection.
    async fn list(&self, params: &ListParams) -> Result<Vec<L>, ServiceError>;

    /// Fetch one record.
    async fn get_by_id(&self, id: &EntityId) -> Result<L, ServiceError>;

    /// Create a record from form state plus new images.
    async fn create(&self, form: &L::Form, images: &[ImageUpload]) -> Result<L, ServiceError>;

    /// Update a record from form state plus new images.
    async fn update(
        &self,
        id: &EntityId,
        form: &L::Form,
        images: &[ImageUpload],
    ) -> Result<L, ServiceError>;

    /// Update a record, discarding every stored image in favour of
    /// `images`.
    async fn replace_images(
        &self,
        id: &EntityId,
        form: &L::Form,
        images: &[ImageUpload],
    ) -> Result<L, ServiceError>;

    /// Delete a record.
    async fn remove(&self, id: &EntityId) -> Result<(), ServiceError>;

    /// Delete one persisted image by position.
    async fn remove_image(&self, id: &EntityId, index: usize) -> Result<(), ServiceError>;
}

/// Cab services operating in a named area.
#[async_trait(?Send)]
pub trait CabSearchService {
    /// Cabs whose operating areas include `area`.
    async fn search_by_area(&self, area: &str) -> Result<Vec<Cab>, ServiceError>;
}

/// CRUD over the signed-in tourist's trip plans.
#[async_trait(?Send)]
pub trait TripPlanService {
    /// Fetch every plan of the signed-in user.
    async fn list(&self) -> Result<Vec<TripPlan>, ServiceError>;

    /// Fetch one plan with populated references.
    async fn get_by_id(&self, id: &EntityId) -> Result<TripPlan, ServiceError>;

    /// Create a plan.
    async fn create(&self, document: &TripPlanDocument) -> Result<TripPlan, ServiceError>;

    /// Replace a plan.
    async fn update(
        &self,
        id: &EntityId,
        document: &TripPlanDocument,
    ) -> Result<TripPlan, ServiceError>;

    /// Delete a plan.
    async fn remove(&self, id: &EntityId) -> Result<(), ServiceError>;
}

/// Authentication endpoints.
#[async_trait(?Send)]
pub trait AuthService {
    /// Exchange credentials for a token.
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ServiceError>;

    /// Create an account and return its token.
    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ServiceError>;

    /// User owning the stored token.
    async fn current_user(&self) -> Result<User, ServiceError>;
}

/// Failure to persist or clear the session token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to persist session token: {message}")]
pub struct TokenStoreError {
    /// Underlying failure.
    pub message: String,
}

/// Storage for the single session token.
pub trait TokenStore: Send + Sync {
    /// Stored token, if any.
    fn token(&self) -> Option<String>;

    /// Replace the stored token.
    fn store(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Forget the stored token. Never fails; problems are logged.
    fn clear(&self);
}

#[async_trait(?Send)]
impl<L: Listing, S: ListingService<L> + ?Sized> ListingService<L> for &S {
    async fn list(&self, params: &ListParams) -> Result<Vec<L>, ServiceError> {
        (**self).list(params).await
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<L, ServiceError> {
        (**self).get_by_id(id).await
    }

    async fn create(&self, form: &L::Form, images: &[ImageUpload]) -> Result<L, ServiceError> {
        (**self).create(form, images).await
    }

    async fn update(
        &self,
        id: &EntityId,
        form: &L::Form,
        images: &[ImageUpload],
    ) -> Result<L, ServiceError> {
        (**self).update(id, form, images).await
    }

    async fn replace_images(
        &self,
        id: &EntityId,
        form: &L::Form,
        images: &[ImageUpload],
    ) -> Result<L, ServiceError> {
        (**self).replace_images(id, form, images).await
    }

    async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        (**self).remove(id).await
    }

    async fn remove_image(&self, id: &EntityId, index: usize) -> Result<(), ServiceError> {
        (**self).remove_image(id, index).await
    }
}

#[async_trait(?Send)]
impl<S: CabSearchService + ?Sized> CabSearchService for &S {
    async fn search_by_area(&self, area: &str) -> Result<Vec<Cab>, ServiceError> {
        (**self).search_by_area(area).await
    }
}

#[async_trait(?Send)]
impl<S: TripPlanService + ?Sized> TripPlanService for &S {
    async fn list(&self) -> Result<Vec<TripPlan>, ServiceError> {
        (**self).list().await
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<TripPlan, ServiceError> {
        (**self).get_by_id(id).await
    }

    async fn create(&self, document: &TripPlanDocument) -> Result<TripPlan, ServiceError> {
        (**self).create(document).await
    }

    async fn update(
        &self,
        id: &EntityId,
        document: &TripPlanDocument,
    ) -> Result<TripPlan, ServiceError> {
        (**self).update(id, document).await
    }

    async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        (**self).remove(id).await
    }
}

#[async_trait(?Send)]
impl<S: AuthService + ?Sized> AuthService for &S {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ServiceError> {
        (**self).login(credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ServiceError> {
        (**self).register(registration).await
    }

    async fn current_user(&self) -> Result<User, ServiceError> {
        (**self).current_user().await
    }
}

#[async_trait(?Send)]
impl<S: AuthService + ?Sized> AuthService for Arc<S> {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ServiceError> {
        (**self).login(credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ServiceError> {
        (**self).register(registration).await
    }

    async fn current_user(&self) -> Result<User, ServiceError> {
        (**self).current_user().await
    }
}

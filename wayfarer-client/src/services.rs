//! HTTP implementations of the `wayfarer-core` service traits.
//!
//! Listing records travel as multipart forms so images can ride along;
//! trip plans and authentication use JSON.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use wayfarer_core::payload::REPLACE_IMAGES_FIELD;
use wayfarer_core::user::AuthGrant;
use wayfarer_core::{
    AuthService, Cab, CabSearchService, Credentials, EntityId, FormPayload, ImageUpload,
    ListParams, Listing, ListingService, Registration, ServiceError, TripPlan, TripPlanDocument,
    TripPlanService, User,
};

use crate::api::{ApiClient, ApiRequest};

const TRIP_PLANS_PATH: &str = "trip-plans";

/// [`ListingService`] for one listing kind over HTTP.
#[derive(Debug)]
pub struct HttpListingService<L> {
    client: Arc<ApiClient>,
    kind: PhantomData<fn() -> L>,
}

impl<L> Clone for HttpListingService<L> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            kind: PhantomData,
        }
    }
}

impl<L: Listing> HttpListingService<L> {
    /// Service sharing `client`.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            kind: PhantomData,
        }
    }

    fn collection() -> &'static str {
        L::KIND.collection_path()
    }

    fn record_path(id: &EntityId) -> String {
        format!("{}/{id}", Self::collection())
    }

    async fn put_form(&self, id: &EntityId, payload: FormPayload) -> Result<L, ServiceError> {
        self.client
            .send(ApiRequest::put(Self::record_path(id)).with_multipart(payload))
            .await
    }
}

#[async_trait(?Send)]
impl CabSearchService for HttpListingService<Cab> {
    async fn search_by_area(&self, area: &str) -> Result<Vec<Cab>, ServiceError> {
        let query = ListParams::new().with("area", area.trim());
        self.client
            .send(ApiRequest::get(format!("{}/search", Self::collection())).with_query(&query))
            .await
    }
}

#[async_trait(?Send)]
impl<L: Listing> ListingService<L> for HttpListingService<L> {
    async fn list(&self, params: &ListParams) -> Result<Vec<L>, ServiceError> {
        self.client
            .send(ApiRequest::get(Self::collection()).with_query(params))
            .await
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<L, ServiceError> {
        self.client.send(ApiRequest::get(Self::record_path(id))).await
    }

    async fn create(&self, form: &L::Form, images: &[ImageUpload]) -> Result<L, ServiceError> {
        let payload = FormPayload::from_form(form, images);
        log::debug!(
            "creating {} with {} part(s)",
            L::KIND.label(),
            payload.fields().len()
        );
        self.client
            .send(ApiRequest::post(Self::collection()).with_multipart(payload))
            .await
    }

    async fn update(
        &self,
        id: &EntityId,
        form: &L::Form,
        images: &[ImageUpload],
    ) -> Result<L, ServiceError> {
        self.put_form(id, FormPayload::from_form(form, images)).await
    }

    async fn replace_images(
        &self,
        id: &EntityId,
        form: &L::Form,
        images: &[ImageUpload],
    ) -> Result<L, ServiceError> {
        let mut payload = FormPayload::from_form(form, images);
        payload.push_text(REPLACE_IMAGES_FIELD, "true");
        self.put_form(id, payload).await
    }

    async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        self.client
            .send_empty(ApiRequest::delete(Self::record_path(id)))
            .await
    }

    async fn remove_image(&self, id: &EntityId, index: usize) -> Result<(), ServiceError> {
        let path = format!("{}/images/{index}", Self::record_path(id));
        self.client.send_empty(ApiRequest::delete(path)).await
    }
}

/// [`TripPlanService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTripPlanService {
    client: Arc<ApiClient>,
}

impl HttpTripPlanService {
    /// Service sharing `client`.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

fn trip_plan_path(id: &EntityId) -> String {
    format!("{TRIP_PLANS_PATH}/{id}")
}

#[async_trait(?Send)]
impl TripPlanService for HttpTripPlanService {
    async fn list(&self) -> Result<Vec<TripPlan>, ServiceError> {
        self.client.send(ApiRequest::get(TRIP_PLANS_PATH)).await
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<TripPlan, ServiceError> {
        self.client.send(ApiRequest::get(trip_plan_path(id))).await
    }

    async fn create(&self, document: &TripPlanDocument) -> Result<TripPlan, ServiceError> {
        let request = ApiRequest::post(TRIP_PLANS_PATH).with_json(document)?;
        self.client.send(request).await
    }

    async fn update(
        &self,
        id: &EntityId,
        document: &TripPlanDocument,
    ) -> Result<TripPlan, ServiceError> {
        let request = ApiRequest::put(trip_plan_path(id)).with_json(document)?;
        self.client.send(request).await
    }

    async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        self.client
            .send_empty(ApiRequest::delete(trip_plan_path(id)))
            .await
    }
}

/// [`AuthService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    client: Arc<ApiClient>,
}

impl HttpAuthService {
    /// Service sharing `client`.
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl AuthService for HttpAuthService {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ServiceError> {
        let request = ApiRequest::post("auth/login").with_json(credentials)?;
        self.client.send(request).await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ServiceError> {
        let request = ApiRequest::post("auth/register").with_json(registration)?;
        self.client.send(request).await
    }

    async fn current_user(&self) -> Result<User, ServiceError> {
        self.client.send(ApiRequest::get("auth/user")).await
    }
}

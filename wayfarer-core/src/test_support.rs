//! In-memory service doubles used by unit and behaviour tests.
//!
//! Each double answers from local state, counts the calls it receives and
//! can be told to fail its next call with a given [`ServiceError`].

use std::cell::{Cell, RefCell};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::entity::{Cab, EntityId, Listing};
use crate::error::ServiceError;
use crate::filter::contains_ci;
use crate::payload::{FormPayload, ImageUpload, REPLACE_IMAGES_FIELD};
use crate::service::{
    AuthService, CabSearchService, ListParams, ListingService, TokenStore, TokenStoreError,
};
use crate::trip_plan::{
    CabBooking, EntityRef, GuideBooking, HotelBooking, RestaurantBooking, TripPlan,
    TripPlanDocument,
};
use crate::user::{AuthGrant, Credentials, Registration, User, UserId};

fn not_found(what: &str, id: &EntityId) -> ServiceError {
    ServiceError::NotFound {
        message: Some(format!("{what} {id} not found")),
    }
}

/// In-memory [`ListingService`].
///
/// `create` and `update` record the multipart payload they would have sent
/// and answer with the next record queued by [`Self::queue_saved`].
#[derive(Debug)]
pub struct MemoryListingService<L> {
    records: RefCell<Vec<L>>,
    saved: RefCell<Vec<L>>,
    submissions: RefCell<Vec<FormPayload>>,
    removed_images: RefCell<Vec<(EntityId, usize)>>,
    failure: RefCell<Option<ServiceError>>,
    list_calls: Cell<usize>,
}

impl<L> Default for MemoryListingService<L> {
    fn default() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
            saved: RefCell::new(Vec::new()),
            submissions: RefCell::new(Vec::new()),
            removed_images: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
            list_calls: Cell::new(0),
        }
    }
}

impl<L: Listing> MemoryListingService<L> {
    /// Service holding `records`.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = L>,
    {
        let service = Self::default();
        service.records.replace(records.into_iter().collect());
        service
    }

    /// Answer the next `create` or `update` with `record`.
    pub fn queue_saved(&self, record: L) {
        self.saved.borrow_mut().push(record);
    }

    /// Fail the next call with `err`.
    pub fn fail_next(&self, err: ServiceError) {
        self.failure.replace(Some(err));
    }

    /// Records currently held.
    pub fn records(&self) -> Vec<L> {
        self.records.borrow().clone()
    }

    /// Payloads received by `create` and `update`, oldest first.
    pub fn submissions(&self) -> Vec<FormPayload> {
        self.submissions.borrow().clone()
    }

    /// `(record, index)` pairs passed to `remove_image`.
    pub fn removed_images(&self) -> Vec<(EntityId, usize)> {
        self.removed_images.borrow().clone()
    }

    /// Number of `list` calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    fn take_failure(&self) -> Result<(), ServiceError> {
        self.failure.take().map_or(Ok(()), Err)
    }

    fn save(&self, payload: FormPayload) -> Result<L, ServiceError> {
        self.take_failure()?;
        self.submissions.borrow_mut().push(payload);
        let mut saved = self.saved.borrow_mut();
        if saved.is_empty() {
            return Err(ServiceError::Server {
                status: 500,
                message: None,
            });
        }
        let record = saved.remove(0);
        let mut records = self.records.borrow_mut();
        records.retain(|existing| existing.id() != record.id());
        records.push(record.clone());
        Ok(record)
    }
}

#[async_trait(?Send)]
impl<L: Listing> ListingService<L> for MemoryListingService<L> {
    async fn list(&self, _params: &ListParams) -> Result<Vec<L>, ServiceError> {
        self.list_calls.set(self.list_calls.get() + 1);
        self.take_failure()?;
        Ok(self.records())
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<L, ServiceError> {
        self.take_failure()?;
        self.records
            .borrow()
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| not_found(L::KIND.label(), id))
    }

    async fn create(&self, form: &L::Form, images: &[ImageUpload]) -> Result<L, ServiceError> {
        self.save(FormPayload::from_form(form, images))
    }

    async fn update(
        &self,
        _id: &EntityId,
        form: &L::Form,
        images: &[ImageUpload],
    ) -> Result<L, ServiceError> {
        self.save(FormPayload::from_form(form, images))
    }

    async fn replace_images(
        &self,
        _id: &EntityId,
        form: &L::Form,
        images: &[ImageUpload],
    ) -> Result<L, ServiceError> {
        let mut payload = FormPayload::from_form(form, images);
        payload.push_text(REPLACE_IMAGES_FIELD, "true");
        self.save(payload)
    }

    async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        self.take_failure()?;
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            return Err(not_found(L::KIND.label(), id));
        }
        Ok(())
    }

    async fn remove_image(&self, id: &EntityId, index: usize) -> Result<(), ServiceError> {
        self.take_failure()?;
        self.removed_images.borrow_mut().push((id.clone(), index));
        Ok(())
    }
}

#[async_trait(?Send)]
impl CabSearchService for MemoryListingService<Cab> {
    async fn search_by_area(&self, area: &str) -> Result<Vec<Cab>, ServiceError> {
        self.take_failure()?;
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|cab| cab.operating_areas.iter().any(|op| contains_ci(op, area)))
            .cloned()
            .collect())
    }
}

/// In-memory [`crate::TripPlanService`] assigning ids `trip-1`, `trip-2`, …
#[derive(Debug, Default)]
pub struct MemoryTripPlanService {
    plans: RefCell<Vec<TripPlan>>,
    documents: RefCell<Vec<TripPlanDocument>>,
    failure: RefCell<Option<ServiceError>>,
    next_id: Cell<usize>,
}

impl MemoryTripPlanService {
    /// Service holding `plans`.
    pub fn with_plans<I>(plans: I) -> Self
    where
        I: IntoIterator<Item = TripPlan>,
    {
        let service = Self::default();
        service.plans.replace(plans.into_iter().collect());
        service
    }

    /// Fail the next call with `err`.
    pub fn fail_next(&self, err: ServiceError) {
        self.failure.replace(Some(err));
    }

    /// Plans currently held.
    pub fn plans(&self) -> Vec<TripPlan> {
        self.plans.borrow().clone()
    }

    /// Documents received by `create` and `update`, oldest first.
    pub fn documents(&self) -> Vec<TripPlanDocument> {
        self.documents.borrow().clone()
    }

    fn take_failure(&self) -> Result<(), ServiceError> {
        self.failure.take().map_or(Ok(()), Err)
    }

    fn store(&self, id: EntityId, document: &TripPlanDocument) -> TripPlan {
        self.documents.borrow_mut().push(document.clone());
        let plan = plan_from_document(id, document);
        let mut plans = self.plans.borrow_mut();
        plans.retain(|existing| existing.id != plan.id);
        plans.push(plan.clone());
        plan
    }
}

/// Persisted form of `document`, with bare-id references.
pub fn plan_from_document(id: EntityId, document: &TripPlanDocument) -> TripPlan {
    TripPlan {
        id,
        user: None,
        name: document.name.clone(),
        start_date: document.start_date,
        end_date: document.end_date,
        hotels: document
            .hotels
            .iter()
            .map(|stay| HotelBooking {
                hotel: EntityRef::Id(stay.hotel.clone()),
                check_in: stay.check_in,
                check_out: stay.check_out,
            })
            .collect(),
        restaurants: document
            .restaurants
            .iter()
            .map(|meal| RestaurantBooking {
                restaurant: EntityRef::Id(meal.restaurant.clone()),
                date: meal.date,
                time: meal.time,
            })
            .collect(),
        cab_services: document
            .cab_services
            .iter()
            .map(|ride| CabBooking {
                cab: EntityRef::Id(ride.cab.clone()),
                date: ride.date,
                pickup: ride.pickup.clone(),
                dropoff: ride.dropoff.clone(),
            })
            .collect(),
        guides: document
            .guides
            .iter()
            .map(|engagement| GuideBooking {
                guide: EntityRef::Id(engagement.guide.clone()),
                start_date: engagement.start_date,
                end_date: engagement.end_date,
            })
            .collect(),
        created_at: None,
    }
}

#[async_trait(?Send)]
impl crate::service::TripPlanService for MemoryTripPlanService {
    async fn list(&self) -> Result<Vec<TripPlan>, ServiceError> {
        self.take_failure()?;
        Ok(self.plans())
    }

    async fn get_by_id(&self, id: &EntityId) -> Result<TripPlan, ServiceError> {
        self.take_failure()?;
        self.plans
            .borrow()
            .iter()
            .find(|plan| &plan.id == id)
            .cloned()
            .ok_or_else(|| not_found("trip plan", id))
    }

    async fn create(&self, document: &TripPlanDocument) -> Result<TripPlan, ServiceError> {
        self.take_failure()?;
        let next = self.next_id.get() + 1;
        self.next_id.set(next);
        Ok(self.store(EntityId::new(format!("trip-{next}")), document))
    }

    async fn update(
        &self,
        id: &EntityId,
        document: &TripPlanDocument,
    ) -> Result<TripPlan, ServiceError> {
        self.take_failure()?;
        if !self.plans.borrow().iter().any(|plan| &plan.id == id) {
            return Err(not_found("trip plan", id));
        }
        Ok(self.store(id.clone(), document))
    }

    async fn remove(&self, id: &EntityId) -> Result<(), ServiceError> {
        self.take_failure()?;
        let mut plans = self.plans.borrow_mut();
        let before = plans.len();
        plans.retain(|plan| &plan.id != id);
        if plans.len() == before {
            return Err(not_found("trip plan", id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

/// In-memory [`AuthService`] with registered accounts.
///
/// Tokens are `token-{user id}`; `current_user` answers for the account
/// that last signed in.
#[derive(Debug, Default)]
pub struct MemoryAuthService {
    accounts: RefCell<Vec<Account>>,
    current: RefCell<Option<User>>,
    failure: RefCell<Option<ServiceError>>,
    user_failure: RefCell<Option<ServiceError>>,
    current_user_calls: Cell<usize>,
}

impl MemoryAuthService {
    /// Service knowing `user` with `password`.
    pub fn with_account(user: User, password: &str) -> Self {
        let service = Self::default();
        service.accounts.borrow_mut().push(Account {
            user,
            password: password.to_owned(),
        });
        service
    }

    /// Treat `user` as the owner of any presented token.
    pub fn signed_in_as(self, user: User) -> Self {
        self.current.replace(Some(user));
        self
    }

    /// Fail the next call with `err`.
    pub fn fail_next(&self, err: ServiceError) {
        self.failure.replace(Some(err));
    }

    /// Fail the next `current_user` call with `err`, leaving sign-in alone.
    pub fn fail_current_user(&self, err: ServiceError) {
        self.user_failure.replace(Some(err));
    }

    /// Number of `current_user` calls so far.
    pub fn current_user_calls(&self) -> usize {
        self.current_user_calls.get()
    }

    fn take_failure(&self) -> Result<(), ServiceError> {
        self.failure.take().map_or(Ok(()), Err)
    }

    fn grant(&self, user: User) -> AuthGrant {
        let token = format!("token-{}", user.id);
        self.current.replace(Some(user.clone()));
        AuthGrant {
            token,
            user: Some(user),
        }
    }
}

#[async_trait(?Send)]
impl AuthService for MemoryAuthService {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ServiceError> {
        self.take_failure()?;
        let account = self
            .accounts
            .borrow()
            .iter()
            .find(|account| {
                account.user.email == credentials.email && account.password == credentials.password
            })
            .cloned()
            .ok_or(ServiceError::Rejected {
                status: 400,
                message: Some("Invalid credentials".to_owned()),
            })?;
        Ok(self.grant(account.user))
    }

    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ServiceError> {
        self.take_failure()?;
        if self
            .accounts
            .borrow()
            .iter()
            .any(|account| account.user.email == registration.email)
        {
            return Err(ServiceError::Rejected {
                status: 400,
                message: Some("User already exists".to_owned()),
            });
        }
        let count = self.accounts.borrow().len();
        let user = User {
            id: UserId::new(format!("user-{}", count + 1)),
            name: registration.name.clone(),
            email: registration.email.clone(),
            role: Some(registration.role),
        };
        self.accounts.borrow_mut().push(Account {
            user: user.clone(),
            password: registration.password.clone(),
        });
        Ok(self.grant(user))
    }

    async fn current_user(&self) -> Result<User, ServiceError> {
        self.current_user_calls.set(self.current_user_calls.get() + 1);
        if let Some(err) = self.user_failure.take() {
            return Err(err);
        }
        self.take_failure()?;
        self.current.borrow().clone().ok_or(ServiceError::Unauthorized)
    }
}

/// [`TokenStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Store already holding `token`.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_owned())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

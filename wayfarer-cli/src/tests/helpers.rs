//! Test helpers wiring the CLI to in-memory services.

use super::*;
use serde_json::{Value, json};
use std::sync::Arc;
use wayfarer_core::test_support::{
    MemoryAuthService, MemoryListingService, MemoryTokenStore, MemoryTripPlanService,
};
use wayfarer_core::{Cab, Guide, Hotel, RecordingNavigator, Restaurant, TokenStore, TripPlan, User};

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("fixture decodes")
}

pub(super) fn user(id: &str, role: &str) -> User {
    decode(json!({
        "_id": id,
        "name": format!("User {id}"),
        "email": format!("{id}@example.com"),
        "userType": role
    }))
}

pub(super) fn hotel(id: &str, name: &str, owner: &str, images: usize) -> Hotel {
    let images: Vec<String> = (0..images).map(|i| format!("uploads/{id}-{i}.jpg")).collect();
    decode(json!({
        "_id": id,
        "ownerId": owner,
        "name": name,
        "location": { "address": "1 Beach Rd", "city": "Galle" },
        "rooms": [{ "type": "Double", "pricePerNight": 80.0, "capacity": 2 }],
        "starRating": 4,
        "images": images
    }))
}

pub(super) fn restaurant(id: &str, name: &str, cuisine: &[&str]) -> Restaurant {
    decode(json!({
        "_id": id,
        "ownerId": "chef",
        "name": name,
        "location": { "address": "", "city": "Colombo" },
        "cuisine": cuisine,
        "priceRange": "$$",
        "reviews": [{ "rating": 4, "comment": "Lovely" }, { "rating": 5, "comment": "Superb" }]
    }))
}

pub(super) fn cab(id: &str, vehicle_type: &str, areas: &[&str]) -> Cab {
    decode(json!({
        "_id": id,
        "ownerId": "driver",
        "name": format!("Cab {id}"),
        "vehicleType": vehicle_type,
        "vehicleModel": "Prius",
        "operatingAreas": areas
    }))
}

pub(super) fn trip_plan(id: &str, name: &str) -> TripPlan {
    decode(json!({
        "_id": id,
        "name": name,
        "startDate": "2024-03-01",
        "endDate": "2024-03-04",
        "hotels": [{
            "hotelId": { "_id": "h1", "name": "Lagoon" },
            "checkIn": "2024-03-01",
            "checkOut": "2024-03-03"
        }],
        "restaurants": [{
            "restaurantId": { "_id": "r1", "name": "Spice Garden" },
            "date": "2024-03-02",
            "time": "19:30"
        }]
    }))
}

/// In-memory backend plus the output of the last command.
pub(super) struct Harness {
    pub(super) hotels: MemoryListingService<Hotel>,
    pub(super) restaurants: MemoryListingService<Restaurant>,
    pub(super) cabs: MemoryListingService<Cab>,
    pub(super) guides: MemoryListingService<Guide>,
    pub(super) plans: MemoryTripPlanService,
    pub(super) auth: MemoryAuthService,
    pub(super) tokens: Arc<MemoryTokenStore>,
    pub(super) navigator: Arc<RecordingNavigator>,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            hotels: MemoryListingService::default(),
            restaurants: MemoryListingService::default(),
            cabs: MemoryListingService::default(),
            guides: MemoryListingService::default(),
            plans: MemoryTripPlanService::default(),
            auth: MemoryAuthService::default(),
            tokens: Arc::new(MemoryTokenStore::default()),
            navigator: Arc::new(RecordingNavigator::at(HOME_ROUTE)),
        }
    }
}

impl Harness {
    /// Harness whose stored token belongs to `user`.
    pub(super) fn signed_in(user: User) -> Self {
        Self {
            tokens: Arc::new(MemoryTokenStore::with_token(&format!("token-{}", user.id))),
            auth: MemoryAuthService::with_account(user.clone(), "secret").signed_in_as(user),
            ..Self::default()
        }
    }

    pub(super) fn backend(&self) -> Backend<'_> {
        let tokens: Arc<dyn TokenStore> = self.tokens.clone();
        Backend {
            hotels: Box::new(&self.hotels),
            restaurants: Box::new(&self.restaurants),
            cabs: Box::new(&self.cabs),
            cab_search: Box::new(&self.cabs),
            guides: Box::new(&self.guides),
            plans: Box::new(&self.plans),
            auth: Box::new(&self.auth),
            tokens,
            navigator: Arc::clone(&self.navigator),
            api_origin: "http://localhost:5000".to_owned(),
        }
    }

    /// Parse `argv` after the binary name and run it.
    pub(super) fn run(&self, argv: &[&str]) -> (Result<(), CliError>, String) {
        let mut out = Vec::new();
        let result = Cli::try_parse_from(std::iter::once("wayfarer").chain(argv.iter().copied()))
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| run_with(cli.command, &self.backend(), &mut out));
        (result, String::from_utf8_lossy(&out).into_owned())
    }
}

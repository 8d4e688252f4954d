//! Helpers shared by the behaviour tests.

#![allow(dead_code, reason = "each behaviour test uses a subset of the helpers")]

use std::future::Future;

use chrono::NaiveDate;
use serde_json::{Value, json};
use wayfarer_core::{Cab, Hotel, Restaurant, User, dates::parse_date};

/// Drive `future` to completion on a single-threaded runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime.block_on(future),
        Err(err) => panic!("failed to build test runtime: {err}"),
    }
}

pub fn day(text: &str) -> NaiveDate {
    match parse_date(text) {
        Ok(date) => date,
        Err(err) => panic!("invalid test date: {err}"),
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> T {
    match serde_json::from_value(value) {
        Ok(decoded) => decoded,
        Err(err) => panic!("fixture does not decode: {err}"),
    }
}

pub fn user(id: &str, role: &str) -> User {
    decode(json!({ "_id": id, "name": format!("User {id}"), "email": format!("{id}@example.com"), "userType": role }))
}

pub fn hotel(id: &str, name: &str, owner: &str, images: usize) -> Hotel {
    let images: Vec<String> = (0..images).map(|i| format!("uploads/{id}-{i}.jpg")).collect();
    decode(json!({
        "_id": id,
        "ownerId": owner,
        "name": name,
        "location": { "address": "1 Beach Rd", "city": "Galle" },
        "rooms": [{ "type": "Double", "pricePerNight": 80.0, "capacity": 2 }],
        "images": images
    }))
}

pub fn cab(id: &str, vehicle_type: &str, areas: &[&str]) -> Cab {
    decode(json!({
        "_id": id,
        "ownerId": "driver",
        "name": format!("Cab {id}"),
        "vehicleType": vehicle_type,
        "operatingAreas": areas
    }))
}

pub fn restaurant(id: &str, name: &str, city: &str, cuisine: &[&str]) -> Restaurant {
    decode(json!({
        "_id": id,
        "ownerId": "chef",
        "name": name,
        "location": { "address": "", "city": city },
        "cuisine": cuisine,
        "priceRange": "$$"
    }))
}

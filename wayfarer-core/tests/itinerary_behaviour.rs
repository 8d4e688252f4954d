//! Behavioural tests for itinerary derivation.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;
use wayfarer_core::{Itinerary, TripPlan};

#[fixture]
fn plan() -> RefCell<Option<TripPlan>> {
    RefCell::new(None)
}

#[fixture]
fn itinerary() -> RefCell<Option<Itinerary>> {
    RefCell::new(None)
}

fn decode(value: serde_json::Value) -> TripPlan {
    match serde_json::from_value(value) {
        Ok(plan) => plan,
        Err(err) => panic!("plan fixture does not decode: {err}"),
    }
}

#[given("a trip plan with one hotel stay from {start} to {end}")]
fn hotel_stay(#[from(plan)] plan: &RefCell<Option<TripPlan>>, start: String, end: String) {
    plan.replace(Some(decode(json!({
        "_id": "t1",
        "name": "Tea country",
        "startDate": start,
        "endDate": end,
        "hotels": [{
            "hotelId": { "_id": "h1", "name": "Tea Lodge", "location": { "city": "Nuwara Eliya" } },
            "checkIn": start,
            "checkOut": end
        }]
    }))));
}

#[given("a trip plan with a guide from {start} to {end}")]
fn guided(#[from(plan)] plan: &RefCell<Option<TripPlan>>, start: String, end: String) {
    plan.replace(Some(decode(json!({
        "_id": "t2",
        "name": "Temples",
        "startDate": start,
        "endDate": end,
        "guides": [{ "guideId": "g1", "startDate": start, "endDate": end }]
    }))));
}

#[when("the itinerary is derived")]
fn derive(
    #[from(plan)] plan: &RefCell<Option<TripPlan>>,
    #[from(itinerary)] itinerary: &RefCell<Option<Itinerary>>,
) {
    let derived = plan.borrow().as_ref().map(Itinerary::from_plan);
    itinerary.replace(derived);
}

fn with_itinerary<T>(cell: &RefCell<Option<Itinerary>>, check: impl FnOnce(&Itinerary) -> T) -> T {
    match cell.borrow().as_ref() {
        Some(itinerary) => check(itinerary),
        None => panic!("itinerary should be derived"),
    }
}

#[then("there are {count} events")]
fn event_count(#[from(itinerary)] itinerary: &RefCell<Option<Itinerary>>, count: usize) {
    with_itinerary(itinerary, |it| assert_eq!(it.events().len(), count));
}

#[then("the first event is {title} on day {number}")]
fn first_event(
    #[from(itinerary)] itinerary: &RefCell<Option<Itinerary>>,
    title: String,
    number: i64,
) {
    with_itinerary(itinerary, |it| {
        let days = it.days();
        let first = days.first().unwrap_or_else(|| panic!("a day expected"));
        assert_eq!(first.number, number);
        let event = first.events.first().unwrap_or_else(|| panic!("an event expected"));
        assert_eq!(event.title, title.trim_matches('"'));
        assert_eq!(event.style.icon, "fas fa-door-open");
    });
}

#[then("the last event is {title} on day {number}")]
fn last_event(
    #[from(itinerary)] itinerary: &RefCell<Option<Itinerary>>,
    title: String,
    number: i64,
) {
    with_itinerary(itinerary, |it| {
        let days = it.days();
        let last = days.last().unwrap_or_else(|| panic!("a day expected"));
        assert_eq!(last.number, number);
        let event = last.events.last().unwrap_or_else(|| panic!("an event expected"));
        assert_eq!(event.title, title.trim_matches('"'));
    });
}

#[then("the days are numbered 1, 2, 3")]
fn numbered_days(#[from(itinerary)] itinerary: &RefCell<Option<Itinerary>>) {
    with_itinerary(itinerary, |it| {
        let numbers: Vec<i64> = it.days().iter().map(|day| day.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(it.events().iter().all(|event| event.title == "Guide: Tour Guide"));
    });
}

#[scenario(path = "tests/features/itinerary.feature", index = 0)]
fn hotel_stay_yields_two_events(
    plan: RefCell<Option<TripPlan>>,
    itinerary: RefCell<Option<Itinerary>>,
) {
    let _ = (plan, itinerary);
}

#[scenario(path = "tests/features/itinerary.feature", index = 1)]
fn three_day_guide_yields_three_events(
    plan: RefCell<Option<TripPlan>>,
    itinerary: RefCell<Option<Itinerary>>,
) {
    let _ = (plan, itinerary);
}

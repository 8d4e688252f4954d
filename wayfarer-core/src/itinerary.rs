//! Day-by-day itinerary derived from a trip plan.
//!
//! Events are never persisted. Hotel stays yield a check-in and a
//! check-out event, guide engagements one event per day inclusive, and
//! restaurant and cab bookings one event each. Events are stably sorted by
//! date, so same-day events keep their category order.

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::entity::{EntityKind, Location};
use crate::trip_plan::{EntityRef, TripPlan};

/// Short display date, e.g. `Mar 1, 2025`.
pub const SHORT_DATE_FORMAT: &str = "%b %-d, %Y";
/// Long display date, e.g. `March 1, 2025`.
pub const LONG_DATE_FORMAT: &str = "%B %-d, %Y";

/// Visual treatment of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventStyle {
    /// Icon class.
    pub icon: &'static str,
    /// Hex colour.
    pub colour: &'static str,
}

const CHECK_IN: EventStyle = EventStyle {
    icon: "fas fa-door-open",
    colour: "#319795",
};
const CHECK_OUT: EventStyle = EventStyle {
    icon: "fas fa-door-closed",
    colour: "#319795",
};
const MEAL: EventStyle = EventStyle {
    icon: "fas fa-utensils",
    colour: "#C05621",
};
const RIDE: EventStyle = EventStyle {
    icon: "fas fa-car",
    colour: "#6B46C1",
};
const GUIDED: EventStyle = EventStyle {
    icon: "fas fa-user-tie",
    colour: "#D69E2E",
};

/// One entry of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryEvent {
    /// Display title.
    pub title: String,
    /// Calendar day.
    pub date: NaiveDate,
    /// Time of day, restaurants only.
    pub time: Option<NaiveTime>,
    /// Category.
    pub kind: EntityKind,
    /// Icon and colour.
    pub style: EventStyle,
}

/// Events of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryDay {
    /// `date - trip start + 1`; may be zero or negative for bookings that
    /// precede the trip.
    pub number: i64,
    /// Calendar day.
    pub date: NaiveDate,
    /// Events in timeline order.
    pub events: Vec<ItineraryEvent>,
}

/// Sorted events of a trip plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    start: NaiveDate,
    events: Vec<ItineraryEvent>,
}

fn name_or<'a>(reference: &'a EntityRef, fallback: &'a str) -> &'a str {
    reference.name().unwrap_or(fallback)
}

fn location_suffix(reference: &EntityRef) -> String {
    reference
        .location()
        .and_then(Location::describe)
        .map(|text| format!(" ({text})"))
        .unwrap_or_default()
}

impl Itinerary {
    /// Derive and sort the events of `plan`.
    #[must_use]
    pub fn from_plan(plan: &TripPlan) -> Self {
        let mut events = Vec::new();
        for stay in &plan.hotels {
            let label = format!(
                "{}{}",
                name_or(&stay.hotel, "Hotel"),
                location_suffix(&stay.hotel)
            );
            events.push(ItineraryEvent {
                title: format!("Check-in: {label}"),
                date: stay.check_in,
                time: None,
                kind: EntityKind::Hotel,
                style: CHECK_IN,
            });
            events.push(ItineraryEvent {
                title: format!("Check-out: {label}"),
                date: stay.check_out,
                time: None,
                kind: EntityKind::Hotel,
                style: CHECK_OUT,
            });
        }
        for meal in &plan.restaurants {
            events.push(ItineraryEvent {
                title: format!(
                    "Meal at {}{}",
                    name_or(&meal.restaurant, "Restaurant"),
                    location_suffix(&meal.restaurant)
                ),
                date: meal.date,
                time: meal.time,
                kind: EntityKind::Restaurant,
                style: MEAL,
            });
        }
        for ride in &plan.cab_services {
            events.push(ItineraryEvent {
                title: format!(
                    "{}: {} to {}",
                    name_or(&ride.cab, "Cab Service"),
                    ride.pickup,
                    ride.dropoff
                ),
                date: ride.date,
                time: None,
                kind: EntityKind::Cab,
                style: RIDE,
            });
        }
        for engagement in &plan.guides {
            let title = format!("Guide: {}", name_or(&engagement.guide, "Tour Guide"));
            let days = engagement
                .start_date
                .iter_days()
                .take_while(|day| *day <= engagement.end_date);
            events.extend(days.map(|date| ItineraryEvent {
                title: title.clone(),
                date,
                time: None,
                kind: EntityKind::Guide,
                style: GUIDED,
            }));
        }
        events.sort_by_key(|event| event.date);
        Self {
            start: plan.start_date,
            events,
        }
    }

    /// Events in timeline order.
    #[must_use]
    pub fn events(&self) -> &[ItineraryEvent] {
        &self.events
    }

    /// Whether the plan has no bookings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events grouped by calendar day, earliest first.
    #[must_use]
    pub fn days(&self) -> Vec<ItineraryDay> {
        let mut days: Vec<ItineraryDay> = Vec::new();
        for event in &self.events {
            match days.last_mut() {
                Some(day) if day.date == event.date => day.events.push(event.clone()),
                _ => days.push(ItineraryDay {
                    number: day_number(self.start, event.date),
                    date: event.date,
                    events: vec![event.clone()],
                }),
            }
        }
        days
    }
}

/// One-based day of `date` within a trip starting on `start`.
#[must_use]
pub fn day_number(start: NaiveDate, date: NaiveDate) -> i64 {
    (date - start).num_days() + 1
}

/// Twelve-hour clock rendering, e.g. `7:00 PM`.
#[must_use]
pub fn format_time_12h(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {suffix}", time.minute())
}

/// `Mar 1, 2025`.
#[must_use]
pub fn format_short_date(date: NaiveDate) -> String {
    date.format(SHORT_DATE_FORMAT).to_string()
}

/// `March 1, 2025`.
#[must_use]
pub fn format_long_date(date: NaiveDate) -> String {
    date.format(LONG_DATE_FORMAT).to_string()
}

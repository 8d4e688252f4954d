//! Trip plans as stored by the backend and as submitted by the builder.
//!
//! Bookings are generic over their entity reference: a loaded
//! [`TripPlan`] carries [`EntityRef`]s, which the backend may populate with
//! the referenced record's name and location, while a submitted
//! [`TripPlanDocument`] carries bare [`EntityId`]s.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates;
use crate::entity::{EntityId, EntityKind, Location, deserialize_owner};
use crate::user::UserId;

/// Summary of a referenced entity embedded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefSummary {
    /// Referenced record.
    #[serde(rename = "_id", alias = "id")]
    pub id: EntityId,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Postal location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Spoken languages; guides only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

/// Reference to a hotel, restaurant, cab service or guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    /// Populated object.
    Populated(RefSummary),
    /// Bare identifier.
    Id(EntityId),
}

impl EntityRef {
    /// Identifier of the referenced record.
    #[must_use]
    pub const fn id(&self) -> &EntityId {
        match self {
            Self::Populated(summary) => &summary.id,
            Self::Id(id) => id,
        }
    }

    /// Name, when populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated(summary) => summary.name.as_deref(),
            Self::Id(_) => None,
        }
    }

    /// Location, when populated.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        match self {
            Self::Populated(summary) => summary.location.as_ref(),
            Self::Id(_) => None,
        }
    }

    /// Languages, when populated.
    #[must_use]
    pub fn languages(&self) -> &[String] {
        match self {
            Self::Populated(summary) => &summary.languages,
            Self::Id(_) => &[],
        }
    }
}

impl From<EntityId> for EntityRef {
    fn from(id: EntityId) -> Self {
        Self::Id(id)
    }
}

/// A hotel stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelBooking<R> {
    /// Booked hotel.
    #[serde(rename = "hotelId")]
    pub hotel: R,
    /// Arrival day.
    #[serde(with = "dates::date")]
    pub check_in: NaiveDate,
    /// Departure day.
    #[serde(with = "dates::date")]
    pub check_out: NaiveDate,
}

/// A restaurant reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantBooking<R> {
    /// Booked restaurant.
    #[serde(rename = "restaurantId")]
    pub restaurant: R,
    /// Day of the meal.
    #[serde(with = "dates::date")]
    pub date: NaiveDate,
    /// Time of the meal.
    #[serde(default, with = "dates::option_time")]
    pub time: Option<NaiveTime>,
}

/// A cab ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CabBooking<R> {
    /// Booked cab service.
    #[serde(rename = "cabServiceId")]
    pub cab: R,
    /// Day of the ride.
    #[serde(with = "dates::date")]
    pub date: NaiveDate,
    /// Pick-up point; may be empty.
    #[serde(default)]
    pub pickup: String,
    /// Drop-off point; may be empty.
    #[serde(default)]
    pub dropoff: String,
}

impl<R> CabBooking<R> {
    /// `pickup to dropoff` when both ends are known.
    #[must_use]
    pub fn route(&self) -> Option<String> {
        let (pickup, dropoff) = (self.pickup.trim(), self.dropoff.trim());
        (!pickup.is_empty() && !dropoff.is_empty()).then(|| format!("{pickup} to {dropoff}"))
    }
}

/// A guide engagement spanning one or more days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideBooking<R> {
    /// Booked guide.
    #[serde(rename = "guideId")]
    pub guide: R,
    /// First day.
    #[serde(with = "dates::date")]
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    #[serde(with = "dates::date")]
    pub end_date: NaiveDate,
}

/// A persisted trip plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Owning tourist.
    #[serde(
        default,
        alias = "userId",
        deserialize_with = "deserialize_owner",
        skip_serializing_if = "Option::is_none"
    )]
    pub user: Option<UserId>,
    /// Display name.
    pub name: String,
    /// First day of the trip.
    #[serde(with = "dates::date")]
    pub start_date: NaiveDate,
    /// Last day of the trip.
    #[serde(with = "dates::date")]
    pub end_date: NaiveDate,
    /// Hotel stays.
    #[serde(default)]
    pub hotels: Vec<HotelBooking<EntityRef>>,
    /// Restaurant reservations.
    #[serde(default)]
    pub restaurants: Vec<RestaurantBooking<EntityRef>>,
    /// Cab rides.
    #[serde(default)]
    pub cab_services: Vec<CabBooking<EntityRef>>,
    /// Guide engagements.
    #[serde(default)]
    pub guides: Vec<GuideBooking<EntityRef>>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TripPlan {
    /// Whole days between start and end.
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        duration_days(self.start_date, self.end_date)
    }

    /// Number of bookings across all categories.
    #[must_use]
    pub fn booking_count(&self) -> usize {
        self.hotels.len() + self.restaurants.len() + self.cab_services.len() + self.guides.len()
    }
}

/// Whole days between two dates, as shown next to a trip's date range.
#[must_use]
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Body sent when creating or replacing a trip plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanDocument {
    /// Display name.
    pub name: String,
    /// First day of the trip.
    #[serde(with = "dates::date")]
    pub start_date: NaiveDate,
    /// Last day of the trip.
    #[serde(with = "dates::date")]
    pub end_date: NaiveDate,
    /// Hotel stays.
    pub hotels: Vec<HotelBooking<EntityId>>,
    /// Restaurant reservations.
    pub restaurants: Vec<RestaurantBooking<EntityId>>,
    /// Cab rides.
    pub cab_services: Vec<CabBooking<EntityId>>,
    /// Guide engagements.
    pub guides: Vec<GuideBooking<EntityId>>,
}

/// A booking date that falls outside the trip's range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutOfRangeBooking {
    /// Category of the booking.
    pub kind: EntityKind,
    /// Position within its category.
    pub index: usize,
    /// The offending date.
    pub date: NaiveDate,
}

impl TripPlanDocument {
    /// Every booking date that lies before the start or after the end.
    ///
    /// A hotel check-out before its check-in is reported too.
    #[must_use]
    pub fn out_of_range_bookings(&self) -> Vec<OutOfRangeBooking> {
        let inside = |date: NaiveDate| (self.start_date..=self.end_date).contains(&date);
        let mut found = Vec::new();
        let mut check = |kind, index, date: NaiveDate, ok: bool| {
            if !ok {
                found.push(OutOfRangeBooking { kind, index, date });
            }
        };
        for (index, hotel) in self.hotels.iter().enumerate() {
            check(EntityKind::Hotel, index, hotel.check_in, inside(hotel.check_in));
            check(
                EntityKind::Hotel,
                index,
                hotel.check_out,
                inside(hotel.check_out) && hotel.check_out >= hotel.check_in,
            );
        }
        for (index, meal) in self.restaurants.iter().enumerate() {
            check(EntityKind::Restaurant, index, meal.date, inside(meal.date));
        }
        for (index, ride) in self.cab_services.iter().enumerate() {
            check(EntityKind::Cab, index, ride.date, inside(ride.date));
        }
        for (index, guide) in self.guides.iter().enumerate() {
            check(EntityKind::Guide, index, guide.start_date, inside(guide.start_date));
            check(
                EntityKind::Guide,
                index,
                guide.end_date,
                inside(guide.end_date) && guide.end_date >= guide.start_date,
            );
        }
        found
    }
}

/// Step-one fields of the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicDetails {
    /// Trip name.
    pub name: String,
    /// First day.
    pub start_date: Option<NaiveDate>,
    /// Last day.
    pub end_date: Option<NaiveDate>,
}

/// Why the basic details cannot be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BasicDetailsError {
    /// Name is blank.
    #[error("Please enter a name for your trip plan")]
    MissingName,
    /// No start date.
    #[error("Please select a start date")]
    MissingStartDate,
    /// No end date.
    #[error("Please select an end date")]
    MissingEndDate,
    /// End precedes start.
    #[error("End date cannot be before start date")]
    EndBeforeStart,
}

/// Accepted basic details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDates {
    /// Trimmed trip name.
    pub name: String,
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

impl BasicDetails {
    /// Check the fields in display order and return the first problem.
    pub fn validate(&self) -> Result<TripDates, BasicDetailsError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(BasicDetailsError::MissingName);
        }
        let start = self.start_date.ok_or(BasicDetailsError::MissingStartDate)?;
        let end = self.end_date.ok_or(BasicDetailsError::MissingEndDate)?;
        if end < start {
            return Err(BasicDetailsError::EndBeforeStart);
        }
        Ok(TripDates {
            name: name.to_owned(),
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn day(text: &str) -> NaiveDate {
        dates::parse_date(text).expect("valid date")
    }

    #[rstest]
    fn decodes_populated_and_bare_references() {
        let plan: TripPlan = serde_json::from_value(json!({
            "_id": "t1",
            "user": { "_id": "u1" },
            "name": "Hill country",
            "startDate": "2025-03-01T00:00:00.000Z",
            "endDate": "2025-03-04",
            "hotels": [{
                "hotelId": { "_id": "h1", "name": "Tea Lodge", "location": { "city": "Nuwara Eliya" } },
                "checkIn": "2025-03-01",
                "checkOut": "2025-03-03T00:00:00.000Z"
            }],
            "restaurants": [{ "restaurantId": "r1", "date": "2025-03-02", "time": "19:30" }],
            "cabServices": [{ "cabServiceId": "c1", "date": "2025-03-01" }],
            "guides": [],
            "createdAt": "2025-02-01T10:00:00Z"
        }))
        .expect("plan decodes");

        assert_eq!(plan.user, Some(UserId::from("u1")));
        assert_eq!(plan.duration_days(), 3);
        assert_eq!(plan.booking_count(), 3);
        let hotel = plan.hotels.first().expect("hotel");
        assert_eq!(hotel.hotel.name(), Some("Tea Lodge"));
        assert_eq!(hotel.check_out, day("2025-03-03"));
        let meal = plan.restaurants.first().expect("meal");
        assert_eq!(meal.restaurant, EntityRef::Id(EntityId::from("r1")));
        assert_eq!(meal.time, NaiveTime::from_hms_opt(19, 30, 0));
        let ride = plan.cab_services.first().expect("ride");
        assert_eq!(ride.route(), None);
    }

    #[rstest]
    fn document_uses_wire_names_and_plain_dates() {
        let document = TripPlanDocument {
            name: "Coast".into(),
            start_date: day("2025-05-01"),
            end_date: day("2025-05-03"),
            hotels: vec![],
            restaurants: vec![RestaurantBooking {
                restaurant: EntityId::from("r1"),
                date: day("2025-05-02"),
                time: NaiveTime::from_hms_opt(19, 0, 0),
            }],
            cab_services: vec![CabBooking {
                cab: EntityId::from("c1"),
                date: day("2025-05-01"),
                pickup: "Airport".into(),
                dropoff: "Galle".into(),
            }],
            guides: vec![],
        };
        let value = serde_json::to_value(&document).expect("encodes");
        assert_eq!(
            value,
            json!({
                "name": "Coast",
                "startDate": "2025-05-01",
                "endDate": "2025-05-03",
                "hotels": [],
                "restaurants": [{ "restaurantId": "r1", "date": "2025-05-02", "time": "19:00" }],
                "cabServices": [{ "cabServiceId": "c1", "date": "2025-05-01", "pickup": "Airport", "dropoff": "Galle" }],
                "guides": []
            })
        );
    }

    #[rstest]
    fn reports_bookings_outside_the_trip() {
        let document = TripPlanDocument {
            name: "Short".into(),
            start_date: day("2025-05-01"),
            end_date: day("2025-05-02"),
            hotels: vec![HotelBooking {
                hotel: EntityId::from("h1"),
                check_in: day("2025-05-01"),
                check_out: day("2025-05-05"),
            }],
            restaurants: vec![],
            cab_services: vec![],
            guides: vec![GuideBooking {
                guide: EntityId::from("g1"),
                start_date: day("2025-05-01"),
                end_date: day("2025-05-02"),
            }],
        };
        assert_eq!(
            document.out_of_range_bookings(),
            vec![OutOfRangeBooking {
                kind: EntityKind::Hotel,
                index: 0,
                date: day("2025-05-05"),
            }]
        );
    }

    #[rstest]
    #[case("", Some("2025-01-01"), Some("2025-01-02"), BasicDetailsError::MissingName)]
    #[case("Trip", None, Some("2025-01-02"), BasicDetailsError::MissingStartDate)]
    #[case("Trip", Some("2025-01-01"), None, BasicDetailsError::MissingEndDate)]
    #[case("Trip", Some("2025-01-03"), Some("2025-01-02"), BasicDetailsError::EndBeforeStart)]
    fn rejects_incomplete_details(
        #[case] name: &str,
        #[case] start: Option<&str>,
        #[case] end: Option<&str>,
        #[case] expected: BasicDetailsError,
    ) {
        let details = BasicDetails {
            name: name.into(),
            start_date: start.map(day),
            end_date: end.map(day),
        };
        assert_eq!(details.validate(), Err(expected));
    }

    #[rstest]
    fn single_day_trip_is_valid() {
        let details = BasicDetails {
            name: "  Day out ".into(),
            start_date: Some(day("2025-01-01")),
            end_date: Some(day("2025-01-01")),
        };
        let dates = details.validate().expect("valid");
        assert_eq!(dates.name, "Day out");
        assert_eq!(duration_days(dates.start, dates.end), 0);
    }
}

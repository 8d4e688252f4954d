//! Restaurants: cuisines, price range and weekly opening hours.

use serde::{Deserialize, Serialize};

use super::{ContactInfo, EntityId, EntityKind, Listing, Location, Review, deserialize_owner};
use crate::filter::{ListingFilter, facet_contains, facet_equals, search_matches};
use crate::form::{FormFields, TagSet, write_contact, write_location};
use crate::payload::FormPayload;
use crate::user::UserId;

/// Cuisines offered on the restaurant form and listing filter.
pub const CUISINE_SUGGESTIONS: [&str; 10] = [
    "Sri Lankan",
    "Indian",
    "Chinese",
    "Italian",
    "Japanese",
    "Thai",
    "Mexican",
    "French",
    "American",
    "Other",
];

/// Price range buckets, cheapest first.
pub const PRICE_RANGES: [&str; 4] = ["$", "$$", "$$$", "$$$$"];

/// Opening and closing time for one day, as `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyHours {
    /// Opening time.
    pub open: String,
    /// Closing time.
    pub close: String,
}

impl Default for DailyHours {
    fn default() -> Self {
        Self {
            open: "09:00".to_owned(),
            close: "22:00".to_owned(),
        }
    }
}

/// One [`DailyHours`] pair per weekday.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningHours {
    /// Monday.
    pub monday: DailyHours,
    /// Tuesday.
    pub tuesday: DailyHours,
    /// Wednesday.
    pub wednesday: DailyHours,
    /// Thursday.
    pub thursday: DailyHours,
    /// Friday.
    pub friday: DailyHours,
    /// Saturday.
    pub saturday: DailyHours,
    /// Sunday.
    pub sunday: DailyHours,
}

impl OpeningHours {
    /// Weekday names paired with their hours, Monday first.
    #[must_use]
    pub fn days(&self) -> [(&'static str, &DailyHours); 7] {
        [
            ("monday", &self.monday),
            ("tuesday", &self.tuesday),
            ("wednesday", &self.wednesday),
            ("thursday", &self.thursday),
            ("friday", &self.friday),
            ("saturday", &self.saturday),
            ("sunday", &self.sunday),
        ]
    }
}

/// A restaurant listing as returned by `/restaurants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Backend id.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Owning user.
    #[serde(default, deserialize_with = "deserialize_owner")]
    pub owner_id: Option<UserId>,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Postal location.
    #[serde(default)]
    pub location: Location,
    /// Contact details.
    #[serde(default)]
    pub contact_info: ContactInfo,
    /// Cuisines served.
    #[serde(default)]
    pub cuisine: Vec<String>,
    /// One of [`PRICE_RANGES`].
    #[serde(default)]
    pub price_range: String,
    /// Weekly hours.
    #[serde(default)]
    pub opening_hours: OpeningHours,
    /// Stored image paths.
    #[serde(default)]
    pub images: Vec<String>,
    /// Visitor reviews.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Listing for Restaurant {
    const KIND: EntityKind = EntityKind::Restaurant;
    type Form = RestaurantForm;
    type Filter = RestaurantFilter;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn owner_id(&self) -> Option<&UserId> {
        self.owner_id.as_ref()
    }

    fn images(&self) -> &[String] {
        &self.images
    }

    fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    fn location(&self) -> Option<&Location> {
        Some(&self.location)
    }
}

/// Editable restaurant fields.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RestaurantForm {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Postal location.
    pub location: Location,
    /// Contact details.
    pub contact_info: ContactInfo,
    /// Cuisines served.
    pub cuisine: TagSet,
    /// One of [`PRICE_RANGES`].
    pub price_range: String,
    /// Weekly hours; every day defaults to 09:00 to 22:00.
    pub opening_hours: OpeningHours,
}

impl FormFields for RestaurantForm {
    type Record = Restaurant;

    fn from_record(record: &Restaurant) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            location: record.location.clone(),
            contact_info: record.contact_info.clone(),
            cuisine: TagSet::from(record.cuisine.clone()),
            price_range: record.price_range.clone(),
            opening_hours: record.opening_hours.clone(),
        }
    }

    fn missing_values(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("Please enter a name");
        }
        if self.cuisine.is_empty() {
            missing.push("Please select at least one cuisine");
        }
        if self.price_range.trim().is_empty() {
            missing.push("Please select a price range");
        }
        missing
    }

    fn write_payload(&self, payload: &mut FormPayload) {
        payload.push_text("name", self.name.clone());
        payload.push_text("description", self.description.clone());
        write_location(payload, &self.location);
        write_contact(payload, &self.contact_info);
        payload.push_list("cuisine", self.cuisine.as_slice());
        payload.push_text("priceRange", self.price_range.clone());
        for (day, hours) in self.opening_hours.days() {
            payload.push_text(format!("openingHours.{day}.open"), hours.open.clone());
            payload.push_text(format!("openingHours.{day}.close"), hours.close.clone());
        }
    }
}

/// Restaurant listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantFilter {
    /// Matches name, description, city, address and cuisines.
    pub search: String,
    /// Required cuisine.
    pub cuisine: Option<String>,
    /// Required price range.
    pub price_range: Option<String>,
}

impl ListingFilter<Restaurant> for RestaurantFilter {
    fn matches(&self, restaurant: &Restaurant) -> bool {
        let fields = [
            restaurant.name.as_str(),
            restaurant.description.as_str(),
            restaurant.location.city.as_str(),
            restaurant.location.address.as_str(),
        ];
        search_matches(
            &self.search,
            fields
                .into_iter()
                .chain(restaurant.cuisine.iter().map(String::as_str)),
        ) && facet_contains(self.cuisine.as_deref(), &restaurant.cuisine)
            && facet_equals(self.price_range.as_deref(), &restaurant.price_range)
    }

    fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.cuisine.is_some() || self.price_range.is_some()
    }
}

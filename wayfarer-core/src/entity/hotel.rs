//! Hotels: rooms, amenities and star rating.

use serde::{Deserialize, Serialize};

use super::{ContactInfo, EntityId, EntityKind, Listing, Location, Review, deserialize_owner};
use crate::filter::{ListingFilter, search_matches};
use crate::form::{FormFields, TagSet, write_contact, write_location};
use crate::payload::FormPayload;
use crate::user::UserId;

/// Amenities offered as checkboxes on the hotel form.
pub const AMENITY_SUGGESTIONS: [&str; 13] = [
    "Free WiFi",
    "Swimming Pool",
    "Restaurant",
    "Bar",
    "Fitness Center",
    "Spa",
    "Free Parking",
    "Room Service",
    "Air Conditioning",
    "TV",
    "Laundry Service",
    "Airport Shuttle",
    "Breakfast Included",
];

/// A bookable room type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Room type, e.g. "Deluxe Double".
    #[serde(rename = "type", default)]
    pub room_type: String,
    /// Nightly price.
    #[serde(default)]
    pub price_per_night: f64,
    /// Guests per room.
    #[serde(default)]
    pub capacity: u32,
    /// Whether the room can currently be booked.
    #[serde(default = "available_by_default")]
    pub available: bool,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            room_type: String::new(),
            price_per_night: 0.0,
            capacity: 0,
            available: true,
        }
    }
}

const fn available_by_default() -> bool {
    true
}

/// A hotel listing as returned by `/hotels`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
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
    /// Amenities offered.
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Room types.
    #[serde(default)]
    pub rooms: Vec<Room>,
    /// Star rating, 1 to 5.
    #[serde(default)]
    pub star_rating: Option<u8>,
    /// Stored image paths.
    #[serde(default)]
    pub images: Vec<String>,
    /// Visitor reviews.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Listing for Hotel {
    const KIND: EntityKind = EntityKind::Hotel;
    type Form = HotelForm;
    type Filter = HotelFilter;

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

/// Editable hotel fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelForm {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Postal location.
    pub location: Location,
    /// Contact details.
    pub contact_info: ContactInfo,
    /// Selected amenities.
    pub amenities: TagSet,
    /// Room types; the form starts with one blank room.
    pub rooms: Vec<Room>,
    /// Star rating, 1 to 5.
    pub star_rating: u8,
}

impl Default for HotelForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            location: Location::default(),
            contact_info: ContactInfo::default(),
            amenities: TagSet::default(),
            rooms: vec![Room::default()],
            star_rating: 1,
        }
    }
}

impl HotelForm {
    /// Append a blank room.
    pub fn add_room(&mut self) {
        self.rooms.push(Room::default());
    }

    /// Remove the room at `index`; the last remaining room is kept.
    pub fn remove_room(&mut self, index: usize) -> Option<Room> {
        (self.rooms.len() > 1 && index < self.rooms.len()).then(|| self.rooms.remove(index))
    }
}

impl FormFields for HotelForm {
    type Record = Hotel;

    fn from_record(record: &Hotel) -> Self {
        let rooms = if record.rooms.is_empty() {
            vec![Room::default()]
        } else {
            record.rooms.clone()
        };
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            location: record.location.clone(),
            contact_info: record.contact_info.clone(),
            amenities: TagSet::from(record.amenities.clone()),
            rooms,
            star_rating: record.star_rating.unwrap_or(1).clamp(1, 5),
        }
    }

    fn missing_values(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("Please enter a name");
        }
        if self.rooms.iter().any(|room| room.room_type.trim().is_empty()) {
            missing.push("Please enter a type for every room");
        }
        missing
    }

    fn write_payload(&self, payload: &mut FormPayload) {
        payload.push_text("name", self.name.clone());
        payload.push_text("description", self.description.clone());
        payload.push_text("starRating", self.star_rating.to_string());
        write_location(payload, &self.location);
        write_contact(payload, &self.contact_info);
        payload.push_list("amenities", self.amenities.as_slice());
        for (index, room) in self.rooms.iter().enumerate() {
            payload.push_text(format!("rooms[{index}][type]"), room.room_type.clone());
            payload.push_text(
                format!("rooms[{index}][pricePerNight]"),
                room.price_per_night.to_string(),
            );
            payload.push_text(format!("rooms[{index}][capacity]"), room.capacity.to_string());
            payload.push_text(format!("rooms[{index}][available]"), room.available.to_string());
        }
    }
}

/// Hotel listing filter: free-text search only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotelFilter {
    /// Matches name, description, address, city and amenities.
    pub search: String,
}

impl ListingFilter<Hotel> for HotelFilter {
    fn matches(&self, hotel: &Hotel) -> bool {
        let fields = [
            hotel.name.as_str(),
            hotel.description.as_str(),
            hotel.location.address.as_str(),
            hotel.location.city.as_str(),
        ];
        search_matches(
            &self.search,
            fields
                .into_iter()
                .chain(hotel.amenities.iter().map(String::as_str)),
        )
    }

    fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
    }
}

//! Listing entities: hotels, restaurants, cab services and guides.
//!
//! Every entity is an owner-scoped record with a backend id, a display
//! name, ordered image references and optional reviews. The per-kind
//! modules add domain attributes, the editable form shape and the listing
//! filter; [`Listing`] ties the three together so that generic machinery
//! ([`crate::ListingView`], [`crate::EntityForm`], [`crate::ListingService`])
//! works for every kind.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::filter::ListingFilter;
use crate::form::FormFields;
use crate::user::{Role, UserId};

pub mod cab;
pub mod guide;
pub mod hotel;
pub mod restaurant;

pub use cab::{Cab, CabFilter, CabForm};
pub use guide::{Guide, GuideFilter, GuideForm};
pub use hotel::{Hotel, HotelFilter, HotelForm, Room};
pub use restaurant::{DailyHours, OpeningHours, Restaurant, RestaurantFilter, RestaurantForm};

/// Backend identifier of a listing or trip plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The four listing kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Accommodation.
    Hotel,
    /// Dining.
    Restaurant,
    /// Transport.
    Cab,
    /// Tour guiding.
    Guide,
}

impl EntityKind {
    /// Every kind, in trip-builder step order.
    pub const ALL: [Self; 4] = [Self::Hotel, Self::Restaurant, Self::Cab, Self::Guide];

    /// Collection segment under the API base URL.
    #[must_use]
    pub const fn collection_path(self) -> &'static str {
        match self {
            Self::Hotel => "hotels",
            Self::Restaurant => "restaurants",
            Self::Cab => "cabs",
            Self::Guide => "guides",
        }
    }

    /// Lower-case noun used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hotel => "hotel",
            Self::Restaurant => "restaurant",
            Self::Cab => "cab service",
            Self::Guide => "guide",
        }
    }

    /// Plural noun used in listing summaries.
    #[must_use]
    pub const fn plural_label(self) -> &'static str {
        match self {
            Self::Hotel => "hotels",
            Self::Restaurant => "restaurants",
            Self::Cab => "cab services",
            Self::Guide => "guides",
        }
    }

    /// Role allowed to create entities of this kind.
    #[must_use]
    pub const fn owner_role(self) -> Role {
        match self {
            Self::Hotel => Role::HotelOwner,
            Self::Restaurant => Role::RestaurantOwner,
            Self::Cab => Role::CabDriver,
            Self::Guide => Role::Guide,
        }
    }

    /// Route of the public listing page.
    #[must_use]
    pub fn listing_route(self) -> String {
        format!("/{}", self.collection_path())
    }

    /// Route of one entity's detail page.
    #[must_use]
    pub fn detail_route(self, id: &EntityId) -> String {
        format!("/{}/{id}", self.collection_path())
    }

    /// Image shown when an entity has no usable image.
    #[must_use]
    pub const fn placeholder_image(self) -> &'static str {
        match self {
            Self::Hotel => "/images/hotel-placeholder.jpg",
            Self::Restaurant => "/images/restaurant-placeholder.jpg",
            Self::Cab => "/images/cab-placeholder.jpg",
            Self::Guide => "/images/guide-placeholder.jpg",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity kind '{0}': expected hotel, restaurant, cab or guide")]
pub struct UnknownKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hotel" | "hotels" => Ok(Self::Hotel),
            "restaurant" | "restaurants" => Ok(Self::Restaurant),
            "cab" | "cabs" | "cab-service" | "cab-services" => Ok(Self::Cab),
            "guide" | "guides" => Ok(Self::Guide),
            _ => Err(UnknownKind(s.to_owned())),
        }
    }
}

/// Geographic position in either of the shapes the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    /// `{ "lat": .., "lng": .. }`
    LatLng {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },
    /// `[a, b]` in whatever order the backend stored it.
    Pair([f64; 2]),
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatLng { lat, lng } => write!(f, "{lat}, {lng}"),
            Self::Pair([a, b]) => write!(f, "{a}, {b}"),
        }
    }
}

/// Postal location of an entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "LocationWire")]
pub struct Location {
    /// Street address; may be empty.
    pub address: String,
    /// City; may be empty.
    pub city: String,
    /// Optional position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Location {
    /// Location with an address and city.
    pub fn new(address: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            city: city.into(),
            coordinates: None,
        }
    }

    /// Best-effort single-line description: address, else city, else
    /// coordinates.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        if !self.address.trim().is_empty() {
            return Some(self.address.clone());
        }
        if !self.city.trim().is_empty() {
            return Some(self.city.clone());
        }
        self.coordinates.map(|coords| coords.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocationWire {
    Text(String),
    Structured {
        #[serde(default)]
        address: Option<String>,
        #[serde(default)]
        city: Option<String>,
        #[serde(default)]
        coordinates: Option<Coordinates>,
    },
}

impl From<LocationWire> for Location {
    fn from(wire: LocationWire) -> Self {
        match wire {
            LocationWire::Text(address) => Self {
                address,
                ..Self::default()
            },
            LocationWire::Structured {
                address,
                city,
                coordinates,
            } => Self {
                address: address.unwrap_or_default(),
                city: city.unwrap_or_default(),
                coordinates,
            },
        }
    }
}

/// Contact details published with an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    /// Phone number.
    pub phone: String,
    /// E-mail address.
    pub email: String,
    /// Web site; hotels and restaurants only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Author of a review, either a bare user id or a populated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewAuthor {
    /// Populated user object.
    Named {
        /// Display name.
        name: String,
    },
    /// Unpopulated user id.
    Id(UserId),
}

impl ReviewAuthor {
    /// Display name when the author was populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name } => Some(name),
            Self::Id(_) => None,
        }
    }
}

/// A visitor's review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Star rating, 1 to 5.
    pub rating: u8,
    /// Free-text comment.
    #[serde(default)]
    pub comment: String,
    /// Author reference.
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ReviewAuthor>,
    /// Date written.
    #[serde(default, with = "crate::dates::option_date")]
    pub date: Option<chrono::NaiveDate>,
}

/// Mean rating of `reviews`, `None` when there are none.
///
/// # Examples
///
/// ```
/// use wayfarer_core::entity::{Review, average_rating};
///
/// let reviews = [4, 5].map(|rating| Review {
///     rating,
///     comment: String::new(),
///     author: None,
///     date: None,
/// });
/// assert_eq!(average_rating(&reviews), Some(4.5));
/// assert_eq!(average_rating(&[]), None);
/// ```
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    let count = u32::try_from(reviews.len()).ok().filter(|n| *n > 0)?;
    let total: u32 = reviews.iter().map(|review| u32::from(review.rating)).sum();
    Some(f64::from(total) / f64::from(count))
}

/// Resolve a stored image reference against the API origin.
///
/// Absolute `http(s)` URLs pass through; relative paths are joined to
/// `api_origin`; a missing or blank path yields the kind's placeholder.
#[must_use]
pub fn resolve_image_url(path: Option<&str>, api_origin: &str, kind: EntityKind) -> String {
    let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
        return kind.placeholder_image().to_owned();
    };
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }
    let origin = api_origin.trim_end_matches('/');
    let relative = path.trim_start_matches('/');
    format!("{origin}/{relative}")
}

/// Behaviour shared by the four entity records.
pub trait Listing: Clone + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Kind of this record.
    const KIND: EntityKind;
    /// Editable form shape.
    type Form: FormFields<Record = Self>;
    /// Listing filter state.
    type Filter: ListingFilter<Self>;

    /// Backend identifier.
    fn id(&self) -> &EntityId;
    /// Display name.
    fn name(&self) -> &str;
    /// Owning user, if the backend reported one.
    fn owner_id(&self) -> Option<&UserId>;
    /// Stored image references, in display order.
    fn images(&self) -> &[String];
    /// Reviews, possibly empty.
    fn reviews(&self) -> &[Review];
    /// Postal location, for kinds that have one.
    fn location(&self) -> Option<&Location> {
        None
    }

    /// Whether `user` owns this record.
    fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_id() == Some(user)
    }
}

/// Accept an owner reference as a bare id or a populated `{ _id }` object.
pub(crate) fn deserialize_owner<'de, D>(deserializer: D) -> Result<Option<UserId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OwnerWire {
        Id(UserId),
        Populated {
            #[serde(rename = "_id", alias = "id")]
            id: UserId,
        },
    }

    Ok(
        Option::<OwnerWire>::deserialize(deserializer)?.map(|owner| match owner {
            OwnerWire::Id(id) | OwnerWire::Populated { id } => id,
        }),
    )
}

//! Tour guides: languages, specializations and areas of operation.

use serde::{Deserialize, Serialize};

use super::{ContactInfo, EntityId, EntityKind, Listing, Review, deserialize_owner};
use crate::filter::{ListingFilter, facet_contains, search_matches};
use crate::form::{FormFields, TagSet, write_contact};
use crate::payload::FormPayload;
use crate::user::UserId;

/// Languages suggested on the guide form.
pub const LANGUAGE_SUGGESTIONS: [&str; 12] = [
    "English", "Sinhala", "Tamil", "Hindi", "French", "German", "Spanish", "Chinese", "Japanese",
    "Russian", "Italian", "Arabic",
];

/// Specializations suggested on the guide form.
pub const SPECIALIZATION_SUGGESTIONS: [&str; 11] = [
    "Cultural Heritage",
    "Wildlife & Nature",
    "Adventure",
    "Historical Sites",
    "Culinary Tours",
    "Photography Tours",
    "Hiking & Trekking",
    "Religious Sites",
    "City Tours",
    "Beach & Coastal Tours",
    "Ayurveda & Wellness",
];

/// Areas suggested for guide operation.
pub const AREA_SUGGESTIONS: [&str; 18] = [
    "Colombo",
    "Kandy",
    "Galle",
    "Negombo",
    "Nuwara Eliya",
    "Anuradhapura",
    "Jaffna",
    "Trincomalee",
    "Batticaloa",
    "Matara",
    "Ella",
    "Dambulla",
    "Sigiriya",
    "Polonnaruwa",
    "Yala",
    "Udawalawe",
    "Bentota",
    "Mirissa",
];

/// A guide profile as returned by `/guides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    /// Backend id.
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Owning user.
    #[serde(default, deserialize_with = "deserialize_owner")]
    pub owner_id: Option<UserId>,
    /// Display name.
    pub name: String,
    /// Biography; serves as the description.
    #[serde(default)]
    pub bio: String,
    /// Years of experience.
    #[serde(default)]
    pub experience: u32,
    /// Spoken languages.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Tour specializations.
    #[serde(default)]
    pub specializations: Vec<String>,
    /// Areas covered.
    #[serde(default)]
    pub areas_of_operation: Vec<String>,
    /// Contact details.
    #[serde(default)]
    pub contact_info: ContactInfo,
    /// Daily rate.
    #[serde(default)]
    pub price_per_day: f64,
    /// Whether the guide currently takes bookings.
    #[serde(default)]
    pub availability: bool,
    /// Stored image paths.
    #[serde(default)]
    pub images: Vec<String>,
    /// Visitor reviews.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Listing for Guide {
    const KIND: EntityKind = EntityKind::Guide;
    type Form = GuideForm;
    type Filter = GuideFilter;

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
}

/// Editable guide profile fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuideForm {
    /// Display name.
    pub name: String,
    /// Biography.
    pub bio: String,
    /// Years of experience.
    pub experience: u32,
    /// Spoken languages; at least one is required.
    pub languages: TagSet,
    /// Specializations; at least one is required.
    pub specializations: TagSet,
    /// Areas covered; at least one is required.
    pub areas_of_operation: TagSet,
    /// Contact details.
    pub contact_info: ContactInfo,
    /// Daily rate.
    pub price_per_day: f64,
    /// Whether the guide currently takes bookings.
    pub availability: bool,
}

impl Default for GuideForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            bio: String::new(),
            experience: 0,
            languages: TagSet::default(),
            specializations: TagSet::default(),
            areas_of_operation: TagSet::default(),
            contact_info: ContactInfo::default(),
            price_per_day: 0.0,
            availability: true,
        }
    }
}

impl FormFields for GuideForm {
    type Record = Guide;

    fn from_record(record: &Guide) -> Self {
        Self {
            name: record.name.clone(),
            bio: record.bio.clone(),
            experience: record.experience,
            languages: TagSet::from(record.languages.clone()),
            specializations: TagSet::from(record.specializations.clone()),
            areas_of_operation: TagSet::from(record.areas_of_operation.clone()),
            contact_info: ContactInfo {
                website: None,
                ..record.contact_info.clone()
            },
            price_per_day: record.price_per_day,
            availability: record.availability,
        }
    }

    fn missing_values(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("Please enter a name");
        }
        if self.languages.is_empty() {
            missing.push("Please add at least one language");
        }
        if self.specializations.is_empty() {
            missing.push("Please add at least one specialization");
        }
        if self.areas_of_operation.is_empty() {
            missing.push("Please add at least one area of operation");
        }
        missing
    }

    fn write_payload(&self, payload: &mut FormPayload) {
        payload.push_text("name", self.name.clone());
        payload.push_text("bio", self.bio.clone());
        payload.push_text("experience", self.experience.to_string());
        payload.push_text("pricePerDay", self.price_per_day.to_string());
        payload.push_text("availability", self.availability.to_string());
        write_contact(payload, &self.contact_info);
        payload.push_list("languages", self.languages.as_slice());
        payload.push_list("specializations", self.specializations.as_slice());
        payload.push_list("areasOfOperation", self.areas_of_operation.as_slice());
    }
}

/// Guide listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuideFilter {
    /// Matches name, bio, languages, specializations and areas.
    pub search: String,
    /// Required language.
    pub language: Option<String>,
    /// Required specialization.
    pub specialization: Option<String>,
    /// Required area of operation.
    pub area: Option<String>,
}

impl ListingFilter<Guide> for GuideFilter {
    fn matches(&self, guide: &Guide) -> bool {
        let lists = guide
            .languages
            .iter()
            .chain(&guide.specializations)
            .chain(&guide.areas_of_operation)
            .map(String::as_str);
        search_matches(
            &self.search,
            [guide.name.as_str(), guide.bio.as_str()].into_iter().chain(lists),
        ) && facet_contains(self.language.as_deref(), &guide.languages)
            && facet_contains(self.specialization.as_deref(), &guide.specializations)
            && facet_contains(self.area.as_deref(), &guide.areas_of_operation)
    }

    fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
            || self.language.is_some()
            || self.specialization.is_some()
            || self.area.is_some()
    }
}

//! Cab services: vehicle details and operating areas.

use serde::{Deserialize, Serialize};

use super::{ContactInfo, EntityId, EntityKind, Listing, Review, deserialize_owner};
use crate::filter::{ListingFilter, facet_contains, facet_equals, search_matches};
use crate::form::{FormFields, TagSet, write_contact};
use crate::payload::FormPayload;
use crate::user::UserId;

/// Areas suggested for cab operating areas.
pub const AREA_SUGGESTIONS: [&str; 12] = [
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
];

/// Vehicle types offered on the cab form.
pub const VEHICLE_TYPES: [&str; 7] = [
    "Sedan",
    "SUV",
    "Van",
    "Mini-Bus",
    "Luxury Car",
    "Tuk-Tuk",
    "Motorcycle",
];

/// A cab service listing as returned by `/cabs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cab {
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
    /// One of [`VEHICLE_TYPES`] or free text.
    #[serde(default)]
    pub vehicle_type: String,
    /// Make and model.
    #[serde(default)]
    pub vehicle_model: String,
    /// Registration plate.
    #[serde(default)]
    pub license_plate: String,
    /// Passenger seats.
    #[serde(default)]
    pub capacity: u32,
    /// Fare per kilometre.
    #[serde(default)]
    pub price_per_km: f64,
    /// Areas served.
    #[serde(default)]
    pub operating_areas: Vec<String>,
    /// Contact details.
    #[serde(default)]
    pub contact_info: ContactInfo,
    /// Whether the service currently takes bookings.
    #[serde(default)]
    pub availability: bool,
    /// Stored image paths.
    #[serde(default)]
    pub images: Vec<String>,
    /// Visitor reviews.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Listing for Cab {
    const KIND: EntityKind = EntityKind::Cab;
    type Form = CabForm;
    type Filter = CabFilter;

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

/// Editable cab service fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CabForm {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Vehicle type.
    pub vehicle_type: String,
    /// Make and model.
    pub vehicle_model: String,
    /// Registration plate.
    pub license_plate: String,
    /// Passenger seats.
    pub capacity: u32,
    /// Fare per kilometre.
    pub price_per_km: f64,
    /// Areas served; at least one is required.
    pub operating_areas: TagSet,
    /// Contact details.
    pub contact_info: ContactInfo,
    /// Whether the service currently takes bookings.
    pub availability: bool,
}

impl Default for CabForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            vehicle_type: String::new(),
            vehicle_model: String::new(),
            license_plate: String::new(),
            capacity: 0,
            price_per_km: 0.0,
            operating_areas: TagSet::default(),
            contact_info: ContactInfo::default(),
            availability: true,
        }
    }
}

impl FormFields for CabForm {
    type Record = Cab;

    fn from_record(record: &Cab) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            vehicle_type: record.vehicle_type.clone(),
            vehicle_model: record.vehicle_model.clone(),
            license_plate: record.license_plate.clone(),
            capacity: record.capacity,
            price_per_km: record.price_per_km,
            operating_areas: TagSet::from(record.operating_areas.clone()),
            contact_info: ContactInfo {
                website: None,
                ..record.contact_info.clone()
            },
            availability: record.availability,
        }
    }

    fn missing_values(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("Please enter a name");
        }
        if self.operating_areas.is_empty() {
            missing.push("Please add at least one operating area");
        }
        missing
    }

    fn write_payload(&self, payload: &mut FormPayload) {
        payload.push_text("name", self.name.clone());
        payload.push_text("description", self.description.clone());
        payload.push_text("vehicleType", self.vehicle_type.clone());
        payload.push_text("vehicleModel", self.vehicle_model.clone());
        payload.push_text("licensePlate", self.license_plate.clone());
        payload.push_text("capacity", self.capacity.to_string());
        payload.push_text("pricePerKm", self.price_per_km.to_string());
        payload.push_text("availability", self.availability.to_string());
        write_contact(payload, &self.contact_info);
        payload.push_list("operatingAreas", self.operating_areas.as_slice());
    }
}

/// Cab listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CabFilter {
    /// Matches name, description, vehicle model, vehicle type and areas.
    pub search: String,
    /// Required operating area.
    pub area: Option<String>,
    /// Required vehicle type.
    pub vehicle_type: Option<String>,
}

impl ListingFilter<Cab> for CabFilter {
    fn matches(&self, cab: &Cab) -> bool {
        let fields = [
            cab.name.as_str(),
            cab.description.as_str(),
            cab.vehicle_model.as_str(),
            cab.vehicle_type.as_str(),
        ];
        search_matches(
            &self.search,
            fields
                .into_iter()
                .chain(cab.operating_areas.iter().map(String::as_str)),
        ) && facet_contains(self.area.as_deref(), &cab.operating_areas)
            && facet_equals(self.vehicle_type.as_deref(), &cab.vehicle_type)
    }

    fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || self.area.is_some() || self.vehicle_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn cab() -> Cab {
        serde_json::from_value(json!({
            "_id": "c1",
            "ownerId": "u7",
            "name": "Island Rides",
            "vehicleType": "SUV",
            "vehicleModel": "Toyota Prado",
            "licensePlate": "WP-1234",
            "capacity": 6,
            "pricePerKm": 120,
            "operatingAreas": ["Colombo", "Kandy"],
            "contactInfo": {"phone": "077", "email": "c@x"},
            "availability": true
        }))
        .expect("decodes")
    }

    #[rstest]
    fn requires_an_operating_area() {
        let mut form = CabForm::from_record(&cab());
        assert!(form.missing_values().is_empty());
        form.operating_areas = TagSet::default();
        assert_eq!(
            form.missing_values(),
            vec!["Please add at least one operating area"]
        );
    }

    #[rstest]
    fn repeats_operating_areas() {
        let mut payload = FormPayload::new();
        CabForm::from_record(&cab()).write_payload(&mut payload);
        assert_eq!(payload.texts("operatingAreas"), vec!["Colombo", "Kandy"]);
        assert_eq!(payload.text("contactInfo.phone"), Some("077"));
        assert_eq!(payload.text("contactInfo.website"), None);
        assert_eq!(payload.text("pricePerKm"), Some("120"));
    }

    #[rstest]
    #[case(CabFilter { vehicle_type: Some("SUV".into()), ..CabFilter::default() }, true)]
    #[case(CabFilter { vehicle_type: Some("suv".into()), ..CabFilter::default() }, false)]
    #[case(CabFilter { area: Some("Kandy".into()), ..CabFilter::default() }, true)]
    #[case(CabFilter { search: "prado".into(), ..CabFilter::default() }, true)]
    #[case(CabFilter { search: "van".into(), ..CabFilter::default() }, false)]
    fn applies_search_and_facets(#[case] filter: CabFilter, #[case] expected: bool) {
        assert_eq!(filter.matches(&cab()), expected);
    }
}

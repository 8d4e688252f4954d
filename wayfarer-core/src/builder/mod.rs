//! Six-step trip plan builder.
//!
//! [`TripPlanBuilder`] holds the wizard state and enforces its transition
//! guard synchronously; [`TripPlanWizard`] drives it against the backend,
//! loading each step's catalogue when the step becomes active and
//! submitting the finished plan.
//!
//! ```text
//! BasicDetails ─▶ Hotels ─▶ Restaurants ─▶ Cabs ─▶ Guides ─▶ Review
//!      │ leaving forward requires valid basic details
//! ```

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::entity::{EntityId, EntityKind, Location};
use crate::error::ServiceError;
use crate::notice::{Notice, Notices};
use crate::trip_plan::{
    BasicDetails, BasicDetailsError, CabBooking, EntityRef, GuideBooking, HotelBooking,
    RestaurantBooking, TripDates, TripPlan, TripPlanDocument,
};

mod catalogue;
mod wizard;

pub use catalogue::{CatalogueSource, ListingCatalogue};
pub use wizard::{SAVE_FAILURE, TripPlanWizard};

/// Default reservation time for a newly selected restaurant.
pub const DEFAULT_MEAL_TIME: (u32, u32) = (19, 0);

/// Wizard steps in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum WizardStep {
    /// Name and date range.
    #[default]
    BasicDetails,
    /// Hotel selection.
    Hotels,
    /// Restaurant selection.
    Restaurants,
    /// Cab selection.
    Cabs,
    /// Guide selection.
    Guides,
    /// Summary before submission.
    Review,
}

impl WizardStep {
    /// Every step in order.
    pub const ALL: [Self; 6] = [
        Self::BasicDetails,
        Self::Hotels,
        Self::Restaurants,
        Self::Cabs,
        Self::Guides,
        Self::Review,
    ];

    /// One-based position.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            Self::BasicDetails => 1,
            Self::Hotels => 2,
            Self::Restaurants => 3,
            Self::Cabs => 4,
            Self::Guides => 5,
            Self::Review => 6,
        }
    }

    /// Step heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::BasicDetails => "Basic Details",
            Self::Hotels => "Hotels",
            Self::Restaurants => "Restaurants",
            Self::Cabs => "Cab Services",
            Self::Guides => "Guides",
            Self::Review => "Review",
        }
    }

    /// Following step, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::BasicDetails => Some(Self::Hotels),
            Self::Hotels => Some(Self::Restaurants),
            Self::Restaurants => Some(Self::Cabs),
            Self::Cabs => Some(Self::Guides),
            Self::Guides => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// Preceding step, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::BasicDetails => None,
            Self::Hotels => Some(Self::BasicDetails),
            Self::Restaurants => Some(Self::Hotels),
            Self::Cabs => Some(Self::Restaurants),
            Self::Guides => Some(Self::Cabs),
            Self::Review => Some(Self::Guides),
        }
    }

    /// Entity kind offered for selection on this step.
    #[must_use]
    pub const fn catalogue_kind(self) -> Option<EntityKind> {
        match self {
            Self::Hotels => Some(EntityKind::Hotel),
            Self::Restaurants => Some(EntityKind::Restaurant),
            Self::Cabs => Some(EntityKind::Cab),
            Self::Guides => Some(EntityKind::Guide),
            Self::BasicDetails | Self::Review => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.title())
    }
}

/// An entity offered for selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueEntry {
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Backend identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Postal location, when known.
    pub location: Option<Location>,
}

/// A booking together with the name shown for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Selected<B> {
    /// Display name of the booked entity.
    pub name: String,
    /// Editable booking fields.
    pub booking: B,
}

/// Result of selecting a catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A booking was appended at this position.
    Added {
        /// Position within its category.
        index: usize,
    },
    /// The entity was already booked; nothing changed.
    AlreadySelected,
}

/// Whether the builder creates a plan or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BuilderMode {
    /// A new plan.
    #[default]
    Create,
    /// The plan with this id.
    Edit(EntityId),
}

/// Date inputs whose permitted range [`TripPlanBuilder::bounds`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    /// Hotel arrival.
    CheckIn,
    /// Hotel departure.
    CheckOut,
    /// Restaurant reservation day.
    MealDate,
    /// Cab ride day.
    RideDate,
    /// First guided day.
    GuideStart,
    /// Last guided day.
    GuideEnd,
}

impl DateField {
    const fn kind(self) -> EntityKind {
        match self {
            Self::CheckIn | Self::CheckOut => EntityKind::Hotel,
            Self::MealDate => EntityKind::Restaurant,
            Self::RideDate => EntityKind::Cab,
            Self::GuideStart | Self::GuideEnd => EntityKind::Guide,
        }
    }
}

/// Inclusive permitted range for a date input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    /// Earliest permitted day.
    pub min: NaiveDate,
    /// Latest permitted day.
    pub max: NaiveDate,
}

impl DateBounds {
    /// Whether `date` lies in the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.min..=self.max).contains(&date)
    }
}

/// Errors raised by builder operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// Basic details are incomplete or inconsistent.
    #[error(transparent)]
    Details(#[from] BasicDetailsError),
    /// No booking exists at the given position.
    #[error("no {} booking at position {index}", .kind.label())]
    NoSuchBooking {
        /// Category of the booking.
        kind: EntityKind,
        /// Requested position.
        index: usize,
    },
    /// The entity is not in the loaded catalogue.
    #[error("{} {id} is not available on this step", .kind.label())]
    NotInCatalogue {
        /// Kind offered on the current step.
        kind: EntityKind,
        /// Requested entity.
        id: EntityId,
    },
    /// The current step offers no catalogue.
    #[error("{step} has nothing to select")]
    NoCatalogue {
        /// Current step.
        step: WizardStep,
    },
    /// The backend call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Wizard state: current step, basic details and the four booking lists.
#[derive(Debug, Clone, Default)]
pub struct TripPlanBuilder {
    mode: BuilderMode,
    step: WizardStep,
    details: BasicDetails,
    hotels: Vec<Selected<HotelBooking<EntityId>>>,
    restaurants: Vec<Selected<RestaurantBooking<EntityId>>>,
    cabs: Vec<Selected<CabBooking<EntityId>>>,
    guides: Vec<Selected<GuideBooking<EntityId>>>,
    notices: Notices,
}

fn ref_name(reference: &EntityRef, kind: EntityKind) -> String {
    reference.name().map_or_else(
        || match kind {
            EntityKind::Hotel => "Unknown Hotel".to_owned(),
            EntityKind::Restaurant => "Unknown Restaurant".to_owned(),
            EntityKind::Cab => "Unknown Cab Service".to_owned(),
            EntityKind::Guide => "Unknown Guide".to_owned(),
        },
        str::to_owned,
    )
}

impl TripPlanBuilder {
    /// Empty builder for a new plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder prefilled from a loaded plan.
    ///
    /// Populated references contribute their name; bare ids are shown as
    /// "Unknown Hotel" and so on.
    #[must_use]
    pub fn for_edit(plan: &TripPlan) -> Self {
        let hotels = plan
            .hotels
            .iter()
            .map(|stay| Selected {
                name: ref_name(&stay.hotel, EntityKind::Hotel),
                booking: HotelBooking {
                    hotel: stay.hotel.id().clone(),
                    check_in: stay.check_in,
                    check_out: stay.check_out,
                },
            })
            .collect();
        let restaurants = plan
            .restaurants
            .iter()
            .map(|meal| Selected {
                name: ref_name(&meal.restaurant, EntityKind::Restaurant),
                booking: RestaurantBooking {
                    restaurant: meal.restaurant.id().clone(),
                    date: meal.date,
                    time: meal.time,
                },
            })
            .collect();
        let cabs = plan
            .cab_services
            .iter()
            .map(|ride| Selected {
                name: ref_name(&ride.cab, EntityKind::Cab),
                booking: CabBooking {
                    cab: ride.cab.id().clone(),
                    date: ride.date,
                    pickup: ride.pickup.clone(),
                    dropoff: ride.dropoff.clone(),
                },
            })
            .collect();
        let guides = plan
            .guides
            .iter()
            .map(|engagement| Selected {
                name: ref_name(&engagement.guide, EntityKind::Guide),
                booking: GuideBooking {
                    guide: engagement.guide.id().clone(),
                    start_date: engagement.start_date,
                    end_date: engagement.end_date,
                },
            })
            .collect();
        Self {
            mode: BuilderMode::Edit(plan.id.clone()),
            step: WizardStep::BasicDetails,
            details: BasicDetails {
                name: plan.name.clone(),
                start_date: Some(plan.start_date),
                end_date: Some(plan.end_date),
            },
            hotels,
            restaurants,
            cabs,
            guides,
            notices: Notices::default(),
        }
    }

    /// Create or edit.
    #[must_use]
    pub const fn mode(&self) -> &BuilderMode {
        &self.mode
    }

    /// Active step.
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// Step-one fields.
    #[must_use]
    pub const fn details(&self) -> &BasicDetails {
        &self.details
    }

    /// Mutable step-one fields.
    pub fn details_mut(&mut self) -> &mut BasicDetails {
        &mut self.details
    }

    /// Selected hotels.
    #[must_use]
    pub fn hotels(&self) -> &[Selected<HotelBooking<EntityId>>] {
        &self.hotels
    }

    /// Selected restaurants.
    #[must_use]
    pub fn restaurants(&self) -> &[Selected<RestaurantBooking<EntityId>>] {
        &self.restaurants
    }

    /// Selected cab services.
    #[must_use]
    pub fn cabs(&self) -> &[Selected<CabBooking<EntityId>>] {
        &self.cabs
    }

    /// Selected guides.
    #[must_use]
    pub fn guides(&self) -> &[Selected<GuideBooking<EntityId>>] {
        &self.guides
    }

    /// Number of bookings of `kind`.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Hotel => self.hotels.len(),
            EntityKind::Restaurant => self.restaurants.len(),
            EntityKind::Cab => self.cabs.len(),
            EntityKind::Guide => self.guides.len(),
        }
    }

    /// Whether `id` is already booked under `kind`.
    #[must_use]
    pub fn is_selected(&self, kind: EntityKind, id: &EntityId) -> bool {
        match kind {
            EntityKind::Hotel => self.hotels.iter().any(|s| &s.booking.hotel == id),
            EntityKind::Restaurant => self.restaurants.iter().any(|s| &s.booking.restaurant == id),
            EntityKind::Cab => self.cabs.iter().any(|s| &s.booking.cab == id),
            EntityKind::Guide => self.guides.iter().any(|s| &s.booking.guide == id),
        }
    }

    /// Pending notices.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        self.notices.pending()
    }

    /// Remove and return pending notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn trip_dates(&self) -> Result<TripDates, BasicDetailsError> {
        self.details.validate()
    }

    fn guard_leaving_details(&mut self, target: WizardStep) -> Result<(), BuilderError> {
        if self.step != WizardStep::BasicDetails || target <= WizardStep::BasicDetails {
            return Ok(());
        }
        self.trip_dates().map(drop).map_err(|err| {
            self.notices.push(Notice::error(err.to_string()));
            BuilderError::Details(err)
        })
    }

    /// Move to the next step; stays put on the last one.
    ///
    /// Leaving step one requires valid basic details; the first problem is
    /// raised as an error notice and the step does not change.
    pub fn advance(&mut self) -> Result<WizardStep, BuilderError> {
        let Some(next) = self.step.next() else {
            return Ok(self.step);
        };
        self.go_to(next)
    }

    /// Move to the previous step; stays put on the first one.
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Jump to `step`, subject to the same guard as [`Self::advance`].
    pub fn go_to(&mut self, step: WizardStep) -> Result<WizardStep, BuilderError> {
        self.guard_leaving_details(step)?;
        log::debug!("trip builder moving from {} to {step}", self.step);
        self.step = step;
        Ok(step)
    }

    /// Book `entry` with default dates derived from the trip range.
    ///
    /// Selecting an entity that is already booked changes nothing and
    /// raises an info notice.
    pub fn select(&mut self, entry: &CatalogueEntry) -> Result<SelectOutcome, BuilderError> {
        if self.is_selected(entry.kind, &entry.id) {
            self.notices.push(Notice::info(format!(
                "This {} is already in your plan",
                entry.kind.label()
            )));
            return Ok(SelectOutcome::AlreadySelected);
        }
        let TripDates { start, end, .. } = self.trip_dates()?;
        let name = entry.name.clone();
        let id = entry.id.clone();
        let index = match entry.kind {
            EntityKind::Hotel => push(
                &mut self.hotels,
                name,
                HotelBooking {
                    hotel: id,
                    check_in: start,
                    check_out: end,
                },
            ),
            EntityKind::Restaurant => push(
                &mut self.restaurants,
                name,
                RestaurantBooking {
                    restaurant: id,
                    date: start,
                    time: NaiveTime::from_hms_opt(DEFAULT_MEAL_TIME.0, DEFAULT_MEAL_TIME.1, 0),
                },
            ),
            EntityKind::Cab => push(
                &mut self.cabs,
                name,
                CabBooking {
                    cab: id,
                    date: start,
                    pickup: String::new(),
                    dropoff: String::new(),
                },
            ),
            EntityKind::Guide => push(
                &mut self.guides,
                name,
                GuideBooking {
                    guide: id,
                    start_date: start,
                    end_date: end,
                },
            ),
        };
        Ok(SelectOutcome::Added { index })
    }

    /// Editable hotel booking.
    pub fn hotel_mut(&mut self, index: usize) -> Result<&mut HotelBooking<EntityId>, BuilderError> {
        booking_mut(&mut self.hotels, EntityKind::Hotel, index)
    }

    /// Editable restaurant booking.
    pub fn restaurant_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut RestaurantBooking<EntityId>, BuilderError> {
        booking_mut(&mut self.restaurants, EntityKind::Restaurant, index)
    }

    /// Editable cab booking.
    pub fn cab_mut(&mut self, index: usize) -> Result<&mut CabBooking<EntityId>, BuilderError> {
        booking_mut(&mut self.cabs, EntityKind::Cab, index)
    }

    /// Editable guide booking.
    pub fn guide_mut(&mut self, index: usize) -> Result<&mut GuideBooking<EntityId>, BuilderError> {
        booking_mut(&mut self.guides, EntityKind::Guide, index)
    }

    /// Permitted range for a date input of the booking at `index`.
    ///
    /// Every input is limited to the trip range; a hotel check-out starts
    /// at its check-in and a guide's last day at its first. `None` while
    /// the trip dates are unset or the booking does not exist.
    #[must_use]
    pub fn bounds(&self, field: DateField, index: usize) -> Option<DateBounds> {
        let TripDates { start, end, .. } = self.trip_dates().ok()?;
        let exists = index < self.count(field.kind());
        let min = match field {
            DateField::CheckOut => self.hotels.get(index)?.booking.check_in,
            DateField::GuideEnd => self.guides.get(index)?.booking.start_date,
            DateField::CheckIn | DateField::MealDate | DateField::RideDate | DateField::GuideStart => {
                start
            }
        };
        exists.then_some(DateBounds { min, max: end })
    }

    /// Drop the booking of `kind` at `index`.
    pub fn remove(&mut self, kind: EntityKind, index: usize) -> Result<(), BuilderError> {
        if index >= self.count(kind) {
            return Err(BuilderError::NoSuchBooking { kind, index });
        }
        match kind {
            EntityKind::Hotel => {
                self.hotels.remove(index);
            }
            EntityKind::Restaurant => {
                self.restaurants.remove(index);
            }
            EntityKind::Cab => {
                self.cabs.remove(index);
            }
            EntityKind::Guide => {
                self.guides.remove(index);
            }
        }
        Ok(())
    }

    /// Assemble the submission body: ids plus date and text fields only.
    pub fn document(&self) -> Result<TripPlanDocument, BuilderError> {
        let TripDates { name, start, end } = self.trip_dates()?;
        Ok(TripPlanDocument {
            name,
            start_date: start,
            end_date: end,
            hotels: bookings(&self.hotels),
            restaurants: bookings(&self.restaurants),
            cab_services: bookings(&self.cabs),
            guides: bookings(&self.guides),
        })
    }
}

fn push<B>(list: &mut Vec<Selected<B>>, name: String, booking: B) -> usize {
    list.push(Selected { name, booking });
    list.len() - 1
}

fn booking_mut<B>(
    list: &mut [Selected<B>],
    kind: EntityKind,
    index: usize,
) -> Result<&mut B, BuilderError> {
    list.get_mut(index)
        .map(|selected| &mut selected.booking)
        .ok_or(BuilderError::NoSuchBooking { kind, index })
}

fn bookings<B: Clone>(list: &[Selected<B>]) -> Vec<B> {
    list.iter().map(|selected| selected.booking.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;
    use rstest::{fixture, rstest};

    fn day(text: &str) -> NaiveDate {
        parse_date(text).expect("valid date")
    }

    fn entry(kind: EntityKind, id: &str, name: &str) -> CatalogueEntry {
        CatalogueEntry {
            kind,
            id: EntityId::from(id),
            name: name.into(),
            location: None,
        }
    }

    #[fixture]
    fn ready() -> TripPlanBuilder {
        let mut builder = TripPlanBuilder::new();
        *builder.details_mut() = BasicDetails {
            name: "South coast".into(),
            start_date: Some(day("2025-06-01")),
            end_date: Some(day("2025-06-05")),
        };
        builder
    }

    #[rstest]
    fn steps_are_ordered() {
        let numbers: Vec<usize> = WizardStep::ALL.iter().map(|step| step.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::BasicDetails.previous(), None);
        assert_eq!(WizardStep::Cabs.to_string(), "Step 4: Cab Services");
    }

    #[rstest]
    fn blank_name_blocks_leaving_step_one() {
        let mut builder = TripPlanBuilder::new();
        let err = builder.advance().expect_err("guarded");
        assert_eq!(err, BuilderError::Details(BasicDetailsError::MissingName));
        assert_eq!(builder.step(), WizardStep::BasicDetails);
        assert_eq!(
            builder.drain_notices(),
            vec![Notice::error("Please enter a name for your trip plan")]
        );
    }

    #[rstest]
    fn later_steps_move_freely(mut ready: TripPlanBuilder) {
        assert_eq!(ready.go_to(WizardStep::Review), Ok(WizardStep::Review));
        ready.details_mut().name.clear();
        assert_eq!(ready.go_to(WizardStep::Hotels), Ok(WizardStep::Hotels));
        assert_eq!(ready.back(), WizardStep::BasicDetails);
        assert_eq!(ready.back(), WizardStep::BasicDetails);
    }

    #[rstest]
    fn selection_uses_trip_defaults(mut ready: TripPlanBuilder) {
        ready
            .select(&entry(EntityKind::Restaurant, "r1", "Curry Leaf"))
            .expect("selects");
        ready
            .select(&entry(EntityKind::Guide, "g1", "Nimal"))
            .expect("selects");
        let meal = &ready.restaurants().first().expect("meal").booking;
        assert_eq!(meal.date, day("2025-06-01"));
        assert_eq!(meal.time, NaiveTime::from_hms_opt(19, 0, 0));
        let guide = &ready.guides().first().expect("guide").booking;
        assert_eq!((guide.start_date, guide.end_date), (day("2025-06-01"), day("2025-06-05")));
    }

    #[rstest]
    fn reselecting_is_a_no_op(mut ready: TripPlanBuilder) {
        let cab = entry(EntityKind::Cab, "c1", "Tuk Tours");
        assert_eq!(ready.select(&cab), Ok(SelectOutcome::Added { index: 0 }));
        assert_eq!(ready.select(&cab), Ok(SelectOutcome::AlreadySelected));
        assert_eq!(ready.count(EntityKind::Cab), 1);
        assert_eq!(
            ready.drain_notices(),
            vec![Notice::info("This cab service is already in your plan")]
        );
    }

    #[rstest]
    fn check_out_bounds_follow_check_in(mut ready: TripPlanBuilder) {
        ready
            .select(&entry(EntityKind::Hotel, "h1", "Lagoon"))
            .expect("selects");
        ready.hotel_mut(0).expect("hotel").check_in = day("2025-06-03");
        assert_eq!(
            ready.bounds(DateField::CheckOut, 0),
            Some(DateBounds {
                min: day("2025-06-03"),
                max: day("2025-06-05"),
            })
        );
        assert_eq!(
            ready.bounds(DateField::CheckIn, 0),
            Some(DateBounds {
                min: day("2025-06-01"),
                max: day("2025-06-05"),
            })
        );
        assert_eq!(ready.bounds(DateField::MealDate, 0), None);
    }

    #[rstest]
    fn remove_checks_index(mut ready: TripPlanBuilder) {
        ready
            .select(&entry(EntityKind::Hotel, "h1", "Lagoon"))
            .expect("selects");
        assert_eq!(
            ready.remove(EntityKind::Hotel, 3),
            Err(BuilderError::NoSuchBooking {
                kind: EntityKind::Hotel,
                index: 3,
            })
        );
        assert_eq!(ready.remove(EntityKind::Hotel, 0), Ok(()));
        assert!(ready.hotels().is_empty());
    }

    #[rstest]
    fn document_keeps_ids_and_dates(mut ready: TripPlanBuilder) {
        ready
            .select(&entry(EntityKind::Cab, "c1", "Tuk Tours"))
            .expect("selects");
        let ride = ready.cab_mut(0).expect("ride");
        ride.pickup = "Colombo".into();
        ride.dropoff = "Galle".into();
        let document = ready.document().expect("valid");
        assert_eq!(document.name, "South coast");
        let ride = document.cab_services.first().expect("ride");
        assert_eq!(ride.cab, EntityId::from("c1"));
        assert_eq!(ride.route().as_deref(), Some("Colombo to Galle"));
    }
}

use super::{
    BuilderError, BuilderMode, CatalogueEntry, CatalogueSource, SelectOutcome, TripPlanBuilder,
    WizardStep,
};
use crate::entity::{EntityId, EntityKind};
use crate::form::InFlight;
use crate::navigation::{Navigator, trip_plan_route};
use crate::notice::Notice;
use crate::service::TripPlanService;
use crate::trip_plan::TripPlan;

/// Fallback shown when saving a plan fails without a backend message.
pub const SAVE_FAILURE: &str = "Failed to save trip plan. Please try again.";

/// Drives a [`TripPlanBuilder`] against the backend.
///
/// Entering a selection step fetches that step's catalogue every time; no
/// catalogue is fetched before its step is reached.
#[derive(Debug)]
pub struct TripPlanWizard<C, P> {
    builder: TripPlanBuilder,
    catalogue: C,
    plans: P,
    entries: Vec<CatalogueEntry>,
    submitting: bool,
}

impl<C, P> TripPlanWizard<C, P>
where
    C: CatalogueSource,
    P: TripPlanService,
{
    /// Wizard for a new plan.
    pub fn new(catalogue: C, plans: P) -> Self {
        Self::with_builder(TripPlanBuilder::new(), catalogue, plans)
    }

    /// Wizard resuming `builder`.
    pub fn with_builder(builder: TripPlanBuilder, catalogue: C, plans: P) -> Self {
        Self {
            builder,
            catalogue,
            plans,
            entries: Vec::new(),
            submitting: false,
        }
    }

    /// Switch to editing the stored plan `id`.
    ///
    /// On failure an error notice is raised and the current state is kept.
    pub async fn load_plan(&mut self, id: &EntityId) -> Result<(), BuilderError> {
        match self.plans.get_by_id(id).await {
            Ok(plan) => {
                self.builder = TripPlanBuilder::for_edit(&plan);
                self.entries.clear();
                Ok(())
            }
            Err(err) => {
                log::warn!("failed to load trip plan {id}: {err}");
                self.builder
                    .notify(Notice::error("Error loading trip plan data"));
                Err(BuilderError::Service(err))
            }
        }
    }

    /// Wizard state.
    pub const fn builder(&self) -> &TripPlanBuilder {
        &self.builder
    }

    /// Mutable wizard state for field edits.
    ///
    /// Step changes made through this handle do not load catalogues; use
    /// [`Self::advance`], [`Self::back`] or [`Self::go_to`] for that.
    pub fn builder_mut(&mut self) -> &mut TripPlanBuilder {
        &mut self.builder
    }

    /// Consume the wizard, keeping its state.
    pub fn into_builder(self) -> TripPlanBuilder {
        self.builder
    }

    /// Catalogue of the active step; empty on steps without one or after a
    /// failed load.
    pub fn catalogue(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    /// Whether a submission is in flight.
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Remove and return pending notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.builder.drain_notices()
    }

    /// Move forward one step, loading the new step's catalogue.
    pub async fn advance(&mut self) -> Result<WizardStep, BuilderError> {
        let before = self.builder.step();
        let step = self.builder.advance()?;
        if step != before {
            self.enter(step).await;
        }
        Ok(step)
    }

    /// Move back one step, loading the new step's catalogue.
    pub async fn back(&mut self) -> WizardStep {
        let before = self.builder.step();
        let step = self.builder.back();
        if step != before {
            self.enter(step).await;
        }
        step
    }

    /// Jump to `step`, loading its catalogue.
    pub async fn go_to(&mut self, step: WizardStep) -> Result<WizardStep, BuilderError> {
        let target = self.builder.go_to(step)?;
        self.enter(target).await;
        Ok(target)
    }

    async fn enter(&mut self, step: WizardStep) {
        self.entries.clear();
        let Some(kind) = step.catalogue_kind() else {
            return;
        };
        match self.catalogue.catalogue(kind).await {
            Ok(entries) => {
                log::debug!("loaded {} {}", entries.len(), kind.plural_label());
                self.entries = entries;
            }
            Err(err) => {
                log::warn!("failed to load {}: {err}", kind.plural_label());
                self.builder.notify(Notice::error(format!(
                    "Failed to load {}",
                    kind.plural_label()
                )));
            }
        }
    }

    /// Book the catalogue entry `id` of the active step.
    pub fn select(&mut self, id: &EntityId) -> Result<SelectOutcome, BuilderError> {
        let step = self.builder.step();
        let kind: EntityKind = step
            .catalogue_kind()
            .ok_or(BuilderError::NoCatalogue { step })?;
        let entry = self
            .entries
            .iter()
            .find(|entry| &entry.id == id)
            .cloned()
            .ok_or_else(|| BuilderError::NotInCatalogue {
                kind,
                id: id.clone(),
            })?;
        self.builder.select(&entry)
    }

    /// Validate, save and redirect to the saved plan.
    ///
    /// Bookings outside the trip range are reported as a warning but do
    /// not block saving.
    pub async fn submit(&mut self, navigator: &dyn Navigator) -> Result<TripPlan, BuilderError> {
        let document = match self.builder.document() {
            Ok(document) => document,
            Err(err) => {
                if let BuilderError::Details(details) = &err {
                    self.builder.notify(Notice::error(details.to_string()));
                }
                return Err(err);
            }
        };
        let outside = document.out_of_range_bookings();
        if !outside.is_empty() {
            log::warn!(
                "{} booking date(s) fall outside {} to {}",
                outside.len(),
                document.start_date,
                document.end_date
            );
            self.builder.notify(Notice::warning(
                "Some bookings fall outside the trip dates",
            ));
        }

        let in_flight = InFlight::enter(&mut self.submitting);
        let (result, verb) = match self.builder.mode().clone() {
            BuilderMode::Create => (self.plans.create(&document).await, "created"),
            BuilderMode::Edit(id) => (self.plans.update(&id, &document).await, "updated"),
        };
        drop(in_flight);

        match result {
            Ok(plan) => {
                log::info!("trip plan {} {verb}", plan.id);
                self.builder
                    .notify(Notice::success(format!("Trip plan {verb} successfully!")));
                navigator.redirect(&trip_plan_route(&plan.id));
                Ok(plan)
            }
            Err(err) => {
                log::warn!("failed to save trip plan: {err}");
                self.builder
                    .notify(Notice::error(err.message_or(SAVE_FAILURE)));
                Err(BuilderError::Service(err))
            }
        }
    }
}

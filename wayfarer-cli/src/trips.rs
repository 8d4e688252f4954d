//! Trip plan commands: browse, build through the wizard and export.

use std::cmp::Reverse;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use wayfarer_core::dates::parse_date;
use wayfarer_core::{
    Cab, EntityId, EntityKind, Guide, Hotel, ListingCatalogue, ListingService, Restaurant,
    SelectOutcome, TripPlan, TripPlanQuery, TripPlanService, TripPlanSort, TripPlanWizard,
    WizardStep,
};
use wayfarer_export::{export_trip_plan, save_to_dir};

use crate::CliError;
use crate::backend::Backend;
use crate::output::{itinerary, line, notices, trip_line};

/// `trips` subcommands.
#[derive(Debug, Clone, Subcommand)]
pub(crate) enum TripsCommand {
    /// List your trip plans.
    List {
        /// Case-insensitive search over plan names.
        #[arg(long, value_name = "text", default_value = "")]
        search: String,
        /// Ordering as `<name|startDate|endDate|duration|created>-<asc|desc>`.
        #[arg(long, value_name = "order", default_value = "startDate-desc")]
        sort: TripPlanSort,
    },
    /// Show a plan's day-by-day itinerary.
    Show {
        /// Trip plan id.
        id: String,
    },
    /// Create a plan by walking the builder's steps.
    Plan(PlanArgs),
    /// Change a stored plan.
    Edit {
        /// Trip plan id.
        id: String,
        #[command(flatten)]
        plan: PlanArgs,
        /// Drop a booking, as `<kind>:<position>`; positions start at 0.
        #[arg(long = "remove", value_name = "kind:position", value_parser = parse_slot)]
        remove: Vec<(EntityKind, usize)>,
    },
    /// Save a plan as a PDF.
    Export {
        /// Trip plan id.
        id: String,
        /// Directory receiving the PDF.
        #[arg(long, value_name = "dir", default_value = ".")]
        output_dir: Utf8PathBuf,
    },
    /// Delete a plan.
    Delete {
        /// Trip plan id.
        id: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

/// Basic details and bookings applied while walking the wizard.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct PlanArgs {
    /// Trip name.
    #[arg(long, value_name = "name")]
    pub(crate) name: Option<String>,
    /// First day, YYYY-MM-DD.
    #[arg(long, value_name = "date", value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Last day, YYYY-MM-DD.
    #[arg(long, value_name = "date", value_parser = parse_date)]
    pub(crate) end: Option<NaiveDate>,
    /// Hotel to book; repeat for more.
    #[arg(long = "hotel", value_name = "id")]
    pub(crate) hotels: Vec<String>,
    /// Restaurant to book; repeat for more.
    #[arg(long = "restaurant", value_name = "id")]
    pub(crate) restaurants: Vec<String>,
    /// Cab service to book; repeat for more.
    #[arg(long = "cab", value_name = "id")]
    pub(crate) cabs: Vec<String>,
    /// Guide to book; repeat for more.
    #[arg(long = "guide", value_name = "id")]
    pub(crate) guides: Vec<String>,
}

impl PlanArgs {
    fn ids(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Hotel => &self.hotels,
            EntityKind::Restaurant => &self.restaurants,
            EntityKind::Cab => &self.cabs,
            EntityKind::Guide => &self.guides,
        }
    }
}

pub(crate) fn parse_slot(raw: &str) -> Result<(EntityKind, usize), String> {
    let (kind, index) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected <kind>:<position>, got '{raw}'"))?;
    let kind = kind.parse::<EntityKind>().map_err(|err| err.to_string())?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid position '{index}': {err}"))?;
    Ok((kind, index))
}

type CliCatalogue<'b> = ListingCatalogue<
    &'b dyn ListingService<Hotel>,
    &'b dyn ListingService<Restaurant>,
    &'b dyn ListingService<Cab>,
    &'b dyn ListingService<Guide>,
>;

type CliWizard<'b> = TripPlanWizard<CliCatalogue<'b>, &'b dyn TripPlanService>;

fn wizard<'b>(backend: &'b Backend<'_>) -> CliWizard<'b> {
    let catalogue = ListingCatalogue {
        hotels: &*backend.hotels as &dyn ListingService<Hotel>,
        restaurants: &*backend.restaurants as &dyn ListingService<Restaurant>,
        cabs: &*backend.cabs as &dyn ListingService<Cab>,
        guides: &*backend.guides as &dyn ListingService<Guide>,
    };
    TripPlanWizard::new(catalogue, &*backend.plans)
}

pub(crate) async fn run(
    command: TripsCommand,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        TripsCommand::List { search, sort } => {
            list(TripPlanQuery { search, sort }, backend, out).await
        }
        TripsCommand::Show { id } => show(&EntityId::new(id), backend, out).await,
        TripsCommand::Plan(plan) => {
            let mut wizard = wizard(backend);
            build(&mut wizard, &plan, backend, out).await
        }
        TripsCommand::Edit {
            id,
            plan,
            mut remove,
        } => {
            let mut wizard = wizard(backend);
            let loaded = wizard.load_plan(&EntityId::new(id)).await;
            notices(out, &wizard.drain_notices())?;
            loaded?;
            remove.sort_by_key(|&(_, index)| Reverse(index));
            for (kind, index) in remove {
                wizard.builder_mut().remove(kind, index)?;
            }
            build(&mut wizard, &plan, backend, out).await
        }
        TripsCommand::Export { id, output_dir } => {
            export(&EntityId::new(id), &output_dir, backend, out).await
        }
        TripsCommand::Delete { id, yes } => delete(&EntityId::new(id), yes, backend, out).await,
    }
}

async fn fetch(id: &EntityId, backend: &Backend<'_>) -> Result<TripPlan, CliError> {
    backend
        .plans
        .get_by_id(id)
        .await
        .map_err(CliError::service(format!("load trip plan {id}")))
}

async fn list(
    query: TripPlanQuery,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let plans = backend
        .plans
        .list()
        .await
        .map_err(CliError::service("load trip plans"))?;
    if plans.is_empty() {
        return line(out, "No trip plans yet. Start one with `wayfarer trips plan`.");
    }
    let shown = query.apply(&plans);
    line(out, TripPlanQuery::summary(shown.len()))?;
    shown.into_iter().try_for_each(|plan| line(out, trip_line(plan)))
}

async fn show(id: &EntityId, backend: &Backend<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let plan = fetch(id, backend).await?;
    itinerary(out, &plan)
}

/// Apply `plan` on each wizard step in turn, then submit from the review.
async fn build(
    wizard: &mut CliWizard<'_>,
    plan: &PlanArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let walked = walk(wizard, plan).await;
    notices(out, &wizard.drain_notices())?;
    walked?;
    let submitted = wizard.submit(backend.navigator.as_ref()).await;
    notices(out, &wizard.drain_notices())?;
    let saved = submitted?;
    line(out, trip_line(&saved))
}

async fn walk(wizard: &mut CliWizard<'_>, plan: &PlanArgs) -> Result<(), CliError> {
    let details = wizard.builder_mut().details_mut();
    if let Some(name) = &plan.name {
        details.name.clone_from(name);
    }
    if plan.start.is_some() {
        details.start_date = plan.start;
    }
    if plan.end.is_some() {
        details.end_date = plan.end;
    }
    loop {
        let step = wizard.advance().await?;
        if let Some(kind) = step.catalogue_kind() {
            for id in plan.ids(kind) {
                let id = EntityId::new(id.as_str());
                if wizard.select(&id)? == SelectOutcome::AlreadySelected {
                    log::info!("{} {id} is already booked", kind.label());
                }
            }
        }
        if step == WizardStep::Review {
            return Ok(());
        }
    }
}

async fn export(
    id: &EntityId,
    output_dir: &Utf8Path,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let plan = fetch(id, backend).await?;
    let document = export_trip_plan(&plan, Local::now().naive_local())?;
    let path = save_to_dir(output_dir, &document)?;
    line(out, format!("Saved {path}"))
}

async fn delete(
    id: &EntityId,
    confirmed: bool,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::ConfirmationRequired {
            what: format!("trip plan {id}"),
        });
    }
    backend
        .plans
        .remove(id)
        .await
        .map_err(CliError::service(format!("delete trip plan {id}")))?;
    line(out, format!("Deleted trip plan {id}."))
}

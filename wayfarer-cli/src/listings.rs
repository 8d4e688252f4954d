//! Listing commands: browse, inspect and manage owned records.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use serde::de::DeserializeOwned;
use wayfarer_core::entity::{
    CabFilter, GuideFilter, HotelFilter, RestaurantFilter, resolve_image_url,
};
use wayfarer_core::{
    Cab, EmptyState, EntityForm, EntityId, EntityKind, FormError, Guide, Hotel, ImageUpload,
    ListParams, Listing, ListingService, ListingView, Location, Restaurant, ServiceError,
};

use crate::CliError;
use crate::account::{current_user, require_user};
use crate::backend::Backend;
use crate::output::{line, notices, rating};

/// Run the generic function `$func` for the listing type behind `$kind`.
macro_rules! for_kind {
    ($kind:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $kind {
            EntityKind::Hotel => $func::<Hotel>($($arg),*).await,
            EntityKind::Restaurant => $func::<Restaurant>($($arg),*).await,
            EntityKind::Cab => $func::<Cab>($($arg),*).await,
            EntityKind::Guide => $func::<Guide>($($arg),*).await,
        }
    };
}

const FLAG_SEARCH: &str = "search";
const FLAG_CUISINE: &str = "cuisine";
const FLAG_PRICE_RANGE: &str = "price-range";
const FLAG_AREA: &str = "area";
const FLAG_VEHICLE_TYPE: &str = "vehicle-type";
const FLAG_LANGUAGE: &str = "language";
const FLAG_SPECIALIZATION: &str = "specialization";

/// Listing filter flags; each kind accepts a subset.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct FilterArgs {
    /// Case-insensitive text search.
    #[arg(long = FLAG_SEARCH, value_name = "text")]
    pub(crate) search: Option<String>,
    /// Restaurants serving this cuisine.
    #[arg(long = FLAG_CUISINE, value_name = "cuisine")]
    pub(crate) cuisine: Option<String>,
    /// Restaurants in this price range, e.g. "$$".
    #[arg(long = FLAG_PRICE_RANGE, value_name = "range")]
    pub(crate) price_range: Option<String>,
    /// Cab services or guides operating in this area.
    #[arg(long = FLAG_AREA, value_name = "area")]
    pub(crate) area: Option<String>,
    /// Cab services with this vehicle type.
    #[arg(long = FLAG_VEHICLE_TYPE, value_name = "type")]
    pub(crate) vehicle_type: Option<String>,
    /// Guides speaking this language.
    #[arg(long = FLAG_LANGUAGE, value_name = "language")]
    pub(crate) language: Option<String>,
    /// Guides with this specialization.
    #[arg(long = FLAG_SPECIALIZATION, value_name = "specialization")]
    pub(crate) specialization: Option<String>,
}

impl FilterArgs {
    /// Fail on the first set flag that `kind` does not accept.
    fn ensure_only(&self, kind: EntityKind, accepted: &[&'static str]) -> Result<(), CliError> {
        let set = [
            (FLAG_SEARCH, self.search.is_some()),
            (FLAG_CUISINE, self.cuisine.is_some()),
            (FLAG_PRICE_RANGE, self.price_range.is_some()),
            (FLAG_AREA, self.area.is_some()),
            (FLAG_VEHICLE_TYPE, self.vehicle_type.is_some()),
            (FLAG_LANGUAGE, self.language.is_some()),
            (FLAG_SPECIALIZATION, self.specialization.is_some()),
        ];
        match set
            .into_iter()
            .find(|(flag, present)| *present && !accepted.contains(flag))
        {
            Some((flag, _)) => Err(CliError::UnsupportedFilter { flag, kind }),
            None => Ok(()),
        }
    }

    fn search(&self) -> String {
        self.search.clone().unwrap_or_default()
    }
}

/// Per-kind glue between the CLI and a listing type.
pub(crate) trait CliListing: Listing<Form: DeserializeOwned> {
    /// Service backing this kind.
    fn service<'b>(backend: &'b Backend<'_>) -> &'b dyn ListingService<Self>;

    /// Filter built from `flags`.
    fn filter(flags: &FilterArgs) -> Result<Self::Filter, CliError>;

    /// Kind-specific summary shown in listing lines.
    fn detail(&self) -> Option<String>;
}

impl CliListing for Hotel {
    fn service<'b>(backend: &'b Backend<'_>) -> &'b dyn ListingService<Self> {
        &*backend.hotels
    }

    fn filter(flags: &FilterArgs) -> Result<HotelFilter, CliError> {
        flags.ensure_only(Self::KIND, &[FLAG_SEARCH])?;
        Ok(HotelFilter {
            search: flags.search(),
        })
    }

    fn detail(&self) -> Option<String> {
        self.star_rating.map(|stars| format!("{stars}-star"))
    }
}

impl CliListing for Restaurant {
    fn service<'b>(backend: &'b Backend<'_>) -> &'b dyn ListingService<Self> {
        &*backend.restaurants
    }

    fn filter(flags: &FilterArgs) -> Result<RestaurantFilter, CliError> {
        flags.ensure_only(Self::KIND, &[FLAG_SEARCH, FLAG_CUISINE, FLAG_PRICE_RANGE])?;
        Ok(RestaurantFilter {
            search: flags.search(),
            cuisine: flags.cuisine.clone(),
            price_range: flags.price_range.clone(),
        })
    }

    fn detail(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.cuisine.is_empty() {
            parts.push(self.cuisine.join(", "));
        }
        if !self.price_range.is_empty() {
            parts.push(self.price_range.clone());
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

impl CliListing for Cab {
    fn service<'b>(backend: &'b Backend<'_>) -> &'b dyn ListingService<Self> {
        &*backend.cabs
    }

    fn filter(flags: &FilterArgs) -> Result<CabFilter, CliError> {
        flags.ensure_only(Self::KIND, &[FLAG_SEARCH, FLAG_AREA, FLAG_VEHICLE_TYPE])?;
        Ok(CabFilter {
            search: flags.search(),
            area: flags.area.clone(),
            vehicle_type: flags.vehicle_type.clone(),
        })
    }

    fn detail(&self) -> Option<String> {
        let vehicle = format!("{} {}", self.vehicle_type, self.vehicle_model);
        let vehicle = vehicle.trim();
        match (vehicle.is_empty(), self.operating_areas.is_empty()) {
            (true, true) => None,
            (false, true) => Some(vehicle.to_owned()),
            (true, false) => Some(self.operating_areas.join(", ")),
            (false, false) => Some(format!("{vehicle} in {}", self.operating_areas.join(", "))),
        }
    }
}

impl CliListing for Guide {
    fn service<'b>(backend: &'b Backend<'_>) -> &'b dyn ListingService<Self> {
        &*backend.guides
    }

    fn filter(flags: &FilterArgs) -> Result<GuideFilter, CliError> {
        flags.ensure_only(
            Self::KIND,
            &[FLAG_SEARCH, FLAG_LANGUAGE, FLAG_SPECIALIZATION, FLAG_AREA],
        )?;
        Ok(GuideFilter {
            search: flags.search(),
            language: flags.language.clone(),
            specialization: flags.specialization.clone(),
            area: flags.area.clone(),
        })
    }

    fn detail(&self) -> Option<String> {
        (!self.languages.is_empty()).then(|| self.languages.join(", "))
    }
}

fn record_line<L: CliListing>(record: &L) -> String {
    let mut parts = vec![format!("{}  {}", record.id(), record.name())];
    parts.extend(record.location().and_then(Location::describe));
    parts.extend(record.detail());
    parts.push(rating(record.reviews()));
    parts.join(" | ")
}

/// CLI arguments for the `list` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct ListArgs {
    /// hotel, restaurant, cab or guide.
    pub(crate) kind: EntityKind,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
}

pub(crate) async fn list(
    args: ListArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    for_kind!(args.kind, list_kind(&args.filters, backend, out))
}

async fn list_kind<L: CliListing>(
    flags: &FilterArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let criteria = L::filter(flags)?;
    let plural = L::KIND.plural_label();
    let mut view = ListingView::<L>::new();
    view.load(L::service(backend), &ListParams::new()).await;
    if let Some(err) = view.error() {
        return Err(CliError::service(format!("load {plural}"))(err.clone()));
    }
    view.update_filter(|filter| *filter = criteria);
    match view.empty_state(None) {
        None => {
            line(out, view.summary())?;
            view.visible().try_for_each(|record| line(out, record_line(record)))
        }
        Some(EmptyState::NoMatches) => line(out, format!("No {plural} match your filters.")),
        Some(EmptyState::NoEntities { .. }) => {
            line(out, format!("No {plural} found."))?;
            let role = current_user(backend).await.and_then(|user| user.role);
            if let Some(EmptyState::NoEntities { can_create: true }) = view.empty_state(role) {
                line(
                    out,
                    format!(
                        "Add the first one with `wayfarer create {}`.",
                        L::KIND.collection_path()
                    ),
                )?;
            }
            Ok(())
        }
    }
}

/// CLI arguments for the `show` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct ShowArgs {
    /// hotel, restaurant, cab or guide.
    pub(crate) kind: EntityKind,
    /// Listing id.
    pub(crate) id: String,
}

pub(crate) async fn show(
    args: ShowArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let id = EntityId::new(args.id);
    for_kind!(args.kind, show_kind(&id, backend, out))
}

async fn show_kind<L: CliListing>(
    id: &EntityId,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let record = L::service(backend)
        .get_by_id(id)
        .await
        .map_err(CliError::service(format!("load {} {id}", L::KIND.label())))?;
    let json = serde_json::to_string_pretty(&record).map_err(CliError::SerializeRecord)?;
    line(out, json)?;
    line(out, rating(record.reviews()))?;
    if record.images().is_empty() {
        return line(
            out,
            format!("image: {}", resolve_image_url(None, &backend.api_origin, L::KIND)),
        );
    }
    record.images().iter().try_for_each(|path| {
        line(
            out,
            format!(
                "image: {}",
                resolve_image_url(Some(path), &backend.api_origin, L::KIND)
            ),
        )
    })
}

fn read_form<L: CliListing>(path: &Utf8Path) -> Result<L::Form, CliError> {
    let text = wayfarer_fs::read_to_string(path).map_err(|source| CliError::ReadForm {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseForm {
        path: path.to_path_buf(),
        source,
    })
}

fn read_images(paths: &[Utf8PathBuf]) -> Result<Vec<ImageUpload>, CliError> {
    paths
        .iter()
        .map(|path| {
            let bytes = wayfarer_fs::read_bytes(path).map_err(|source| CliError::ReadImage {
                path: path.clone(),
                source,
            })?;
            let name = path.file_name().unwrap_or(path.as_str());
            Ok(ImageUpload::new(name, bytes))
        })
        .collect()
}

/// Print the form's pending notices, then surface `result`.
fn settle<L: Listing, T>(
    form: &mut EntityForm<L>,
    out: &mut dyn Write,
    result: Result<T, FormError>,
) -> Result<T, CliError> {
    notices(out, &form.drain_notices())?;
    result.map_err(CliError::from)
}

fn fill_fields<L: CliListing>(form: &mut EntityForm<L>, fields: L::Form) {
    if let Some(slot) = form.fields_mut() {
        *slot = fields;
    }
}

/// CLI arguments for the `create` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct CreateArgs {
    /// hotel, restaurant, cab or guide.
    pub(crate) kind: EntityKind,
    /// JSON file with the form fields.
    #[arg(long, value_name = "path")]
    pub(crate) form: Utf8PathBuf,
    /// Image file to upload; repeat for more.
    #[arg(long = "image", value_name = "path")]
    pub(crate) images: Vec<Utf8PathBuf>,
}

pub(crate) async fn create(
    args: CreateArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    for_kind!(args.kind, create_kind(&args, backend, out))
}

async fn create_kind<L: CliListing>(
    args: &CreateArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let fields = read_form::<L>(&args.form)?;
    let uploads = read_images(&args.images)?;
    require_user(backend).await?;

    let mut form = EntityForm::<L>::default();
    form.open_create();
    fill_fields(&mut form, fields);
    let attached = form.attach_images(uploads);
    settle(&mut form, out, attached)?;
    let submitted = form.submit(L::service(backend)).await;
    let record = settle(&mut form, out, submitted)?.into_record();
    line(out, format!("{}  {}", record.id(), record.name()))
}

/// CLI arguments for the `update` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct UpdateArgs {
    /// hotel, restaurant, cab or guide.
    pub(crate) kind: EntityKind,
    /// Listing id.
    pub(crate) id: String,
    /// JSON file with the complete form fields; omitted fields are reset.
    #[arg(long, value_name = "path")]
    pub(crate) form: Option<Utf8PathBuf>,
    /// Image file to upload; repeat for more.
    #[arg(long = "image", value_name = "path")]
    pub(crate) images: Vec<Utf8PathBuf>,
    /// Drop the stored images so only the uploaded ones remain.
    #[arg(long)]
    pub(crate) replace_images: bool,
}

pub(crate) async fn update(
    args: UpdateArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    for_kind!(args.kind, update_kind(&args, backend, out))
}

async fn update_kind<L: CliListing>(
    args: &UpdateArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let fields = args.form.as_deref().map(read_form::<L>).transpose()?;
    let uploads = read_images(&args.images)?;
    let user = require_user(backend).await?;
    let service = L::service(backend);
    let id = EntityId::new(args.id.as_str());

    let mut form = EntityForm::<L>::default();
    let opened = form
        .open_edit_by_id(service, &id, Some(&user), backend.navigator.as_ref())
        .await;
    settle(&mut form, out, opened)?;
    if let Some(fields) = fields {
        fill_fields(&mut form, fields);
    }
    if args.replace_images {
        form.replace_existing_images()?;
    }
    let attached = form.attach_images(uploads);
    settle(&mut form, out, attached)?;
    let submitted = form.submit(service).await;
    let record = settle(&mut form, out, submitted)?.into_record();
    line(out, format!("{}  {}", record.id(), record.name()))
}

/// CLI arguments for the `remove-image` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct RemoveImageArgs {
    /// hotel, restaurant, cab or guide.
    pub(crate) kind: EntityKind,
    /// Listing id.
    pub(crate) id: String,
    /// Position of the stored image, starting at 0.
    pub(crate) index: usize,
}

pub(crate) async fn remove_image(
    args: RemoveImageArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    for_kind!(args.kind, remove_image_kind(&args, backend, out))
}

async fn remove_image_kind<L: CliListing>(
    args: &RemoveImageArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let user = require_user(backend).await?;
    let service = L::service(backend);
    let id = EntityId::new(args.id.as_str());

    let mut form = EntityForm::<L>::default();
    let opened = form
        .open_edit_by_id(service, &id, Some(&user), backend.navigator.as_ref())
        .await;
    settle(&mut form, out, opened)?;
    let removed = form.remove_existing_image(service, args.index).await;
    settle(&mut form, out, removed)?;
    line(
        out,
        format!("{} images remain.", form.images().existing().len()),
    )
}

/// CLI arguments for the `delete` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct DeleteArgs {
    /// hotel, restaurant, cab or guide.
    pub(crate) kind: EntityKind,
    /// Listing id.
    pub(crate) id: String,
    /// Confirm the deletion.
    #[arg(long)]
    pub(crate) yes: bool,
}

pub(crate) async fn delete(
    args: DeleteArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let what = format!("{} {}", args.kind.label(), args.id);
    if !args.yes {
        return Err(CliError::ConfirmationRequired { what });
    }
    let id = EntityId::new(args.id);
    let removed: Result<(), ServiceError> = for_kind!(args.kind, delete_kind(&id, backend));
    removed.map_err(CliError::service(format!("delete {what}")))?;
    line(out, format!("Deleted {what}."))
}

async fn delete_kind<L: CliListing>(
    id: &EntityId,
    backend: &Backend<'_>,
) -> Result<(), ServiceError> {
    L::service(backend).remove(id).await
}

/// CLI arguments for the `search-cabs` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct SearchCabsArgs {
    /// Area to search, matched case-insensitively.
    pub(crate) area: String,
}

pub(crate) async fn search_cabs(
    args: SearchCabsArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let area = args.area.trim();
    let cabs = backend
        .cab_search
        .search_by_area(area)
        .await
        .map_err(CliError::service("search cab services"))?;
    if cabs.is_empty() {
        return line(out, format!("No cab services operate in {area}."));
    }
    let view = ListingView::with_items(cabs);
    line(out, view.summary())?;
    view.visible().try_for_each(|cab| line(out, record_line(cab)))
}

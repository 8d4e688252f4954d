//! Owner-side create/edit forms for listing entities.
//!
//! [`EntityForm`] is a small state machine:
//!
//! ```text
//! Collapsed ──open_create──▶ Editing(Create)
//! Collapsed ──open_edit────▶ Editing(Update(id))   (owner only)
//! Editing ──submit ok / reset / close──▶ Collapsed
//! ```
//!
//! Field values are only reachable while editing, so a record that fails
//! the ownership check is never exposed through the form.

use std::fmt;

use thiserror::Error;

use crate::entity::{ContactInfo, Coordinates, EntityId, EntityKind, Listing, Location};
use crate::error::ServiceError;
use crate::navigation::Navigator;
use crate::notice::{Notice, Notices};
use crate::payload::{FormPayload, ImageUpload};
use crate::service::ListingService;
use crate::user::User;

mod images;
mod tags;

pub use images::{
    ImageLimitExceeded, ImageStaging, MAX_IMAGES, PreviewRegistry, PreviewUrl, StagedImage,
};
pub use tags::TagSet;

/// Editable field set of one entity kind.
pub trait FormFields: Clone + Default + fmt::Debug {
    /// Record type the form edits.
    type Record: Listing<Form = Self>;

    /// Prefill from a persisted record.
    fn from_record(record: &Self::Record) -> Self;

    /// User-facing messages for every required value that is missing.
    fn missing_values(&self) -> Vec<&'static str>;

    /// Flatten into multipart text parts.
    fn write_payload(&self, payload: &mut FormPayload);
}

/// Write `location.*` parts.
pub(crate) fn write_location(payload: &mut FormPayload, location: &Location) {
    payload.push_text("location.address", location.address.clone());
    payload.push_text("location.city", location.city.clone());
    let (lat, lng) = match location.coordinates {
        Some(Coordinates::LatLng { lat, lng }) => (lat, lng),
        Some(Coordinates::Pair([a, b])) => (a, b),
        None => return,
    };
    payload.push_text("location.coordinates.lat", lat.to_string());
    payload.push_text("location.coordinates.lng", lng.to_string());
}

/// Write `contactInfo.*` parts.
pub(crate) fn write_contact(payload: &mut FormPayload, contact: &ContactInfo) {
    payload.push_text("contactInfo.phone", contact.phone.clone());
    payload.push_text("contactInfo.email", contact.email.clone());
    payload.push_optional(
        "contactInfo.website",
        contact.website.as_deref().filter(|site| !site.trim().is_empty()),
    );
}

/// Whether the form creates a new record or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// A new record.
    Create,
    /// The record with this id.
    Update(EntityId),
}

/// Form lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    /// No fields are shown.
    #[default]
    Collapsed,
    /// Fields are shown and editable.
    Editing(FormMode),
}

/// Errors raised by [`EntityForm`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The operation needs an open form.
    #[error("the form is not open")]
    NotEditing,
    /// The operation needs a persisted record.
    #[error("the form is not editing an existing record")]
    NotPersisted,
    /// The signed-in user does not own the record.
    #[error("you do not own this {kind}")]
    NotOwner {
        /// Kind of the record.
        kind: EntityKind,
    },
    /// Required values are missing; nothing was sent.
    #[error("{}", .messages.join("; "))]
    MissingValues {
        /// One message per missing value.
        messages: Vec<&'static str>,
    },
    /// Attaching would exceed [`MAX_IMAGES`]; nothing was staged.
    #[error("at most {limit} images are allowed, {attempted} were requested")]
    TooManyImages {
        /// Images that would have been held.
        attempted: usize,
        /// The cap.
        limit: usize,
    },
    /// No image exists at the given position.
    #[error("no image at position {index}")]
    NoSuchImage {
        /// Requested position.
        index: usize,
    },
    /// The backend call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<L> {
    /// A record was created.
    Created(L),
    /// A record was updated.
    Updated(L),
}

impl<L> SubmitOutcome<L> {
    /// The saved record.
    pub fn into_record(self) -> L {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }
}

/// Noun used in form messages, e.g. "cab service" or "guide profile".
const fn form_noun(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Guide => "guide profile",
        other => other.label(),
    }
}

fn capitalised(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Holds a submission flag raised until dropped, including when the
/// submitting future is cancelled mid-request.
pub(crate) struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    pub(crate) fn enter(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Create/edit form for one entity kind.
#[derive(Debug)]
pub struct EntityForm<L: Listing> {
    state: FormState,
    fields: L::Form,
    images: ImageStaging,
    notices: Notices,
    submitting: bool,
    replacing_images: bool,
}

impl<L: Listing> Default for EntityForm<L> {
    fn default() -> Self {
        Self::new(PreviewRegistry::default())
    }
}

impl<L: Listing> EntityForm<L> {
    /// Collapsed form whose previews are tracked by `registry`.
    #[must_use]
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            state: FormState::Collapsed,
            fields: L::Form::default(),
            images: ImageStaging::new(registry),
            notices: Notices::default(),
            submitting: false,
            replacing_images: false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &FormState {
        &self.state
    }

    /// Mode while editing.
    #[must_use]
    pub const fn mode(&self) -> Option<&FormMode> {
        match &self.state {
            FormState::Editing(mode) => Some(mode),
            FormState::Collapsed => None,
        }
    }

    /// Field values; `None` while collapsed.
    #[must_use]
    pub const fn fields(&self) -> Option<&L::Form> {
        match self.state {
            FormState::Editing(_) => Some(&self.fields),
            FormState::Collapsed => None,
        }
    }

    /// Mutable field values; `None` while collapsed.
    pub fn fields_mut(&mut self) -> Option<&mut L::Form> {
        match self.state {
            FormState::Editing(_) => Some(&mut self.fields),
            FormState::Collapsed => None,
        }
    }

    /// Existing and staged images.
    #[must_use]
    pub const fn images(&self) -> &ImageStaging {
        &self.images
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Remove and return pending notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Open an empty form for a new record.
    pub fn open_create(&mut self) {
        self.reset();
        self.state = FormState::Editing(FormMode::Create);
    }

    /// Open the form prefilled with `record`.
    ///
    /// When `viewer` does not own the record, an error notice is raised,
    /// `navigator` is sent to the kind's listing and the form stays
    /// collapsed.
    pub fn open_edit(
        &mut self,
        record: &L,
        viewer: Option<&User>,
        navigator: &dyn Navigator,
    ) -> Result<(), FormError> {
        let owns = viewer.is_some_and(|user| record.is_owned_by(&user.id));
        if !owns {
            log::warn!(
                "refusing to edit {} {} for a non-owner",
                L::KIND.label(),
                record.id()
            );
            self.reset();
            self.notices.push(Notice::error(format!(
                "You don't have permission to edit this {}",
                form_noun(L::KIND)
            )));
            navigator.redirect(&L::KIND.listing_route());
            return Err(FormError::NotOwner { kind: L::KIND });
        }
        self.reset();
        self.fields = L::Form::from_record(record);
        self.images.set_existing(record.images().to_vec());
        self.state = FormState::Editing(FormMode::Update(record.id().clone()));
        Ok(())
    }

    /// Fetch the record by id, then behave as [`Self::open_edit`].
    pub async fn open_edit_by_id<S>(
        &mut self,
        service: &S,
        id: &EntityId,
        viewer: Option<&User>,
        navigator: &dyn Navigator,
    ) -> Result<(), FormError>
    where
        S: ListingService<L> + ?Sized,
    {
        match service.get_by_id(id).await {
            Ok(record) => self.open_edit(&record, viewer, navigator),
            Err(err) => {
                self.notices.push(Notice::error(format!(
                    "Error loading {} data",
                    form_noun(L::KIND)
                )));
                Err(FormError::Service(err))
            }
        }
    }

    /// Stage new image files, all or nothing.
    pub fn attach_images(&mut self, uploads: Vec<ImageUpload>) -> Result<usize, FormError> {
        if self.mode().is_none() {
            return Err(FormError::NotEditing);
        }
        self.images.attach(uploads).map_err(|exceeded| {
            self.notices.push(Notice::warning(format!(
                "You can only upload up to {MAX_IMAGES} images in total"
            )));
            FormError::TooManyImages {
                attempted: exceeded.attempted,
                limit: MAX_IMAGES,
            }
        })
    }

    /// Drop a staged image, releasing its preview.
    pub fn discard_staged(&mut self, index: usize) -> Result<ImageUpload, FormError> {
        self.images
            .discard_staged(index)
            .ok_or(FormError::NoSuchImage { index })
    }

    /// Delete a persisted image immediately through `service`.
    pub async fn remove_existing_image<S>(
        &mut self,
        service: &S,
        index: usize,
    ) -> Result<(), FormError>
    where
        S: ListingService<L> + ?Sized,
    {
        let Some(FormMode::Update(id)) = self.mode().cloned() else {
            return Err(FormError::NotPersisted);
        };
        if index >= self.images.existing().len() {
            return Err(FormError::NoSuchImage { index });
        }
        match service.remove_image(&id, index).await {
            Ok(()) => {
                self.images.forget_existing(index);
                self.notices.push(Notice::success("Image removed successfully"));
                Ok(())
            }
            Err(err) => {
                log::warn!("failed to remove image {index} of {}: {err}", id);
                self.notices.push(Notice::error("Failed to remove image"));
                Err(FormError::Service(err))
            }
        }
    }

    /// Drop every persisted image on the next update so only staged images
    /// remain.
    ///
    /// The persisted images leave the image total immediately, freeing room
    /// under [`MAX_IMAGES`].
    pub fn replace_existing_images(&mut self) -> Result<(), FormError> {
        if !matches!(self.mode(), Some(FormMode::Update(_))) {
            return Err(FormError::NotPersisted);
        }
        self.images.set_existing(Vec::new());
        self.replacing_images = true;
        Ok(())
    }

    /// Whether the next update replaces the persisted images.
    #[must_use]
    pub const fn is_replacing_images(&self) -> bool {
        self.replacing_images
    }

    /// Validate, then create or update through `service`.
    ///
    /// On success the form resets and the saved record is returned. On
    /// failure the fields stay populated and the backend message (or a
    /// generic fallback) is raised as an error notice.
    pub async fn submit<S>(&mut self, service: &S) -> Result<SubmitOutcome<L>, FormError>
    where
        S: ListingService<L> + ?Sized,
    {
        let mode = self.mode().cloned().ok_or(FormError::NotEditing)?;
        let missing = self.fields.missing_values();
        if !missing.is_empty() {
            for message in &missing {
                self.notices.push(Notice::error(*message));
            }
            return Err(FormError::MissingValues { messages: missing });
        }

        let uploads = self.images.uploads();
        let in_flight = InFlight::enter(&mut self.submitting);
        let result = match &mode {
            FormMode::Create => service
                .create(&self.fields, &uploads)
                .await
                .map(SubmitOutcome::Created),
            FormMode::Update(id) if self.replacing_images => service
                .replace_images(id, &self.fields, &uploads)
                .await
                .map(SubmitOutcome::Updated),
            FormMode::Update(id) => service
                .update(id, &self.fields, &uploads)
                .await
                .map(SubmitOutcome::Updated),
        };
        drop(in_flight);

        let noun = form_noun(L::KIND);
        match result {
            Ok(outcome) => {
                let verb = match outcome {
                    SubmitOutcome::Created(_) => "added",
                    SubmitOutcome::Updated(_) => "updated",
                };
                self.reset();
                self.notices.push(Notice::success(format!(
                    "{} {verb} successfully!",
                    capitalised(noun)
                )));
                Ok(outcome)
            }
            Err(err) => {
                let action = match mode {
                    FormMode::Create => "adding",
                    FormMode::Update(_) => "updating",
                };
                let fallback = format!("Error {action} {noun}");
                self.notices.push(Notice::error(err.message_or(&fallback)));
                Err(FormError::Service(err))
            }
        }
    }

    /// Collapse, clear fields and release every preview.
    pub fn reset(&mut self) {
        self.state = FormState::Collapsed;
        self.fields = L::Form::default();
        self.images.clear();
        self.submitting = false;
        self.replacing_images = false;
    }

    /// Alias of [`Self::reset`] for cancel buttons.
    pub fn close(&mut self) {
        self.reset();
    }
}

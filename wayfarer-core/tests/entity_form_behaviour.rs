//! Behavioural tests for owner-side entity forms.

mod support;

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wayfarer_core::form::{MAX_IMAGES, PreviewRegistry};
use wayfarer_core::test_support::MemoryListingService;
use wayfarer_core::{
    Cab, EntityForm, FormError, FormState, Hotel, ImageUpload, Notice, NoticeLevel,
    RecordingNavigator, SubmitOutcome, User,
};

use support::{block_on, cab, hotel, user};

struct HotelFormWorld {
    registry: PreviewRegistry,
    form: RefCell<EntityForm<Hotel>>,
    navigator: RecordingNavigator,
    service: MemoryListingService<Hotel>,
    outcome: RefCell<Option<Result<usize, FormError>>>,
}

#[fixture]
fn hotel_world() -> HotelFormWorld {
    let registry = PreviewRegistry::default();
    HotelFormWorld {
        form: RefCell::new(EntityForm::new(registry.clone())),
        registry,
        navigator: RecordingNavigator::at("/hotels/h1/edit"),
        service: MemoryListingService::default(),
        outcome: RefCell::new(None),
    }
}

struct CabFormWorld {
    registry: PreviewRegistry,
    form: RefCell<EntityForm<Cab>>,
    service: MemoryListingService<Cab>,
    result: RefCell<Option<Result<SubmitOutcome<Cab>, FormError>>>,
}

#[fixture]
fn cab_world() -> CabFormWorld {
    let registry = PreviewRegistry::default();
    CabFormWorld {
        form: RefCell::new(EntityForm::new(registry.clone())),
        registry,
        service: MemoryListingService::default(),
        result: RefCell::new(None),
    }
}

fn owner() -> User {
    user("owner-1", "hotel_owner")
}

fn image(name: &str) -> ImageUpload {
    ImageUpload::new(name, vec![0xFF, 0xD8, 0xFF])
}

#[given("an owner editing a hotel with 3 stored images")]
fn editing_hotel(#[from(hotel_world)] world: &HotelFormWorld) {
    let record = hotel("h1", "Lagoon", "owner-1", 3);
    let result = world
        .form
        .borrow_mut()
        .open_edit(&record, Some(&owner()), &world.navigator);
    assert!(result.is_ok());
}

#[given("2 new images are staged")]
fn two_staged(#[from(hotel_world)] world: &HotelFormWorld) {
    let staged = world
        .form
        .borrow_mut()
        .attach_images(vec![image("a.jpg"), image("b.png")]);
    assert_eq!(staged, Ok(2));
}

#[when("the owner attaches one more image")]
fn attach_sixth(#[from(hotel_world)] world: &HotelFormWorld) {
    let result = world.form.borrow_mut().attach_images(vec![image("c.jpg")]);
    world.outcome.replace(Some(result));
}

#[then("the form still holds 5 images")]
fn still_five(#[from(hotel_world)] world: &HotelFormWorld) {
    assert_eq!(
        world.outcome.borrow().clone(),
        Some(Err(FormError::TooManyImages {
            attempted: 6,
            limit: MAX_IMAGES,
        }))
    );
    let form = world.form.borrow();
    assert_eq!(form.images().total(), 5);
    assert_eq!(form.images().staged().len(), 2);
    assert_eq!(world.registry.live_count(), 2);
}

#[then("a warning about the image limit is raised")]
fn limit_warning(#[from(hotel_world)] world: &HotelFormWorld) {
    let notices = world.form.borrow_mut().drain_notices();
    assert_eq!(
        notices,
        vec![Notice::warning("You can only upload up to 5 images in total")]
    );
}

#[given("a hotel owned by someone else")]
fn foreign_hotel(#[from(hotel_world)] world: &HotelFormWorld) {
    assert!(world.form.borrow().fields().is_none());
}

#[when("a different user opens it for editing")]
fn open_foreign(#[from(hotel_world)] world: &HotelFormWorld) {
    let record = hotel("h2", "Not Yours", "owner-2", 1);
    let result = world
        .form
        .borrow_mut()
        .open_edit(&record, Some(&owner()), &world.navigator);
    assert!(matches!(result, Err(FormError::NotOwner { .. })));
}

#[then("the form stays collapsed without fields")]
fn stays_collapsed(#[from(hotel_world)] world: &HotelFormWorld) {
    let mut form = world.form.borrow_mut();
    assert_eq!(form.state(), &FormState::Collapsed);
    assert!(form.fields().is_none());
    assert!(form.fields_mut().is_none());
    let levels: Vec<NoticeLevel> = form.drain_notices().iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Error]);
}

#[then("the user is sent to the hotel listing")]
fn sent_to_listing(#[from(hotel_world)] world: &HotelFormWorld) {
    assert_eq!(world.navigator.redirects(), vec!["/hotels".to_owned()]);
}

#[given("a new cab form without operating areas")]
fn cab_without_areas(#[from(cab_world)] world: &CabFormWorld) {
    let mut form = world.form.borrow_mut();
    form.open_create();
    if let Some(fields) = form.fields_mut() {
        fields.name = "Hill Rides".to_owned();
        fields.vehicle_type = "Van".to_owned();
    }
}

#[given("a new cab form serving Kandy")]
fn cab_serving_kandy(#[from(cab_world)] world: &CabFormWorld) {
    let mut form = world.form.borrow_mut();
    form.open_create();
    if let Some(fields) = form.fields_mut() {
        fields.name = "Hill Rides".to_owned();
        fields.vehicle_type = "Van".to_owned();
        fields.operating_areas.add("Kandy");
    }
    let staged = form.attach_images(vec![image("van.jpg")]);
    assert_eq!(staged, Ok(1));
    world.service.queue_saved(cab("c9", "Van", &["Kandy"]));
}

#[when("the form is submitted")]
fn submit(#[from(cab_world)] world: &CabFormWorld) {
    let mut form = world.form.borrow_mut();
    let result = block_on(form.submit(&world.service));
    world.result.replace(Some(result));
}

#[then("the submission is rejected before reaching the backend")]
fn rejected_locally(#[from(cab_world)] world: &CabFormWorld) {
    let result = world.result.borrow();
    assert!(matches!(
        result.as_ref(),
        Some(Err(FormError::MissingValues { messages })) if messages.contains(&"Please add at least one operating area")
    ));
    assert!(world.service.submissions().is_empty());
    assert!(world.form.borrow().fields().is_some());
}

#[then("the cab service is created")]
fn cab_created(#[from(cab_world)] world: &CabFormWorld) {
    let result = world.result.borrow();
    assert!(matches!(result.as_ref(), Some(Ok(SubmitOutcome::Created(_)))));
    let submissions = world.service.submissions();
    let payload = submissions.first().map(Clone::clone);
    let payload = payload.unwrap_or_else(|| panic!("payload should be recorded"));
    assert_eq!(payload.texts("operatingAreas"), vec!["Kandy"]);
    assert_eq!(payload.file_count(), 1);
    assert_eq!(
        world.form.borrow_mut().drain_notices(),
        vec![Notice::success("Cab service added successfully!")]
    );
}

#[then("the form is collapsed and its previews are released")]
fn collapsed_and_released(#[from(cab_world)] world: &CabFormWorld) {
    assert_eq!(world.form.borrow().state(), &FormState::Collapsed);
    assert_eq!(world.registry.live_count(), 0);
}

#[when("the owner replaces the stored images with 5 new ones")]
fn replace_with_five(#[from(hotel_world)] world: &HotelFormWorld) {
    let mut form = world.form.borrow_mut();
    assert_eq!(form.replace_existing_images(), Ok(()));
    let uploads = (0..5).map(|i| image(&format!("new-{i}.jpg"))).collect();
    let result = form.attach_images(uploads);
    world.outcome.replace(Some(result));
}

#[when("the hotel form is submitted")]
fn submit_hotel(#[from(hotel_world)] world: &HotelFormWorld) {
    world.service.queue_saved(hotel("h1", "Lagoon", "owner-1", 5));
    let mut form = world.form.borrow_mut();
    let result = block_on(form.submit(&world.service));
    assert!(matches!(result, Ok(SubmitOutcome::Updated(_))));
}

#[then("the update asks the backend to replace images")]
fn replace_requested(#[from(hotel_world)] world: &HotelFormWorld) {
    assert_eq!(world.outcome.borrow().clone(), Some(Ok(5)));
    let submissions = world.service.submissions();
    let Some(payload) = submissions.first() else {
        panic!("payload should be recorded");
    };
    assert_eq!(payload.text("replace_images"), Some("true"));
    assert_eq!(payload.file_count(), 5);
    assert!(!world.form.borrow().is_replacing_images());
}

#[scenario(path = "tests/features/entity_forms.feature", index = 0)]
fn sixth_image_is_rejected(hotel_world: HotelFormWorld) {
    let _ = (hotel_world,);
}

#[scenario(path = "tests/features/entity_forms.feature", index = 1)]
fn non_owner_cannot_edit(hotel_world: HotelFormWorld) {
    let _ = (hotel_world,);
}

#[scenario(path = "tests/features/entity_forms.feature", index = 2)]
fn cab_without_areas_is_not_submitted(cab_world: CabFormWorld) {
    let _ = (cab_world,);
}

#[scenario(path = "tests/features/entity_forms.feature", index = 3)]
fn successful_create_resets(cab_world: CabFormWorld) {
    let _ = (cab_world,);
}

#[scenario(path = "tests/features/entity_forms.feature", index = 4)]
fn replacing_images_frees_budget(hotel_world: HotelFormWorld) {
    let _ = (hotel_world,);
}

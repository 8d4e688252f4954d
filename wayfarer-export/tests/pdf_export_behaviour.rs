//! Behavioural tests for trip plan export.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use chrono::{NaiveDate, NaiveDateTime};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tempfile::TempDir;
use wayfarer_core::TripPlan;
use wayfarer_export::{DocumentLayout, export_trip_plan, layout_trip_plan, save_to_dir};

#[derive(Default)]
struct ExportWorld {
    plan: RefCell<Option<Value>>,
    folder: RefCell<Option<TempDir>>,
    layout: RefCell<Option<DocumentLayout>>,
}

impl ExportWorld {
    fn plan(&self) -> TripPlan {
        let value = self.plan.borrow().clone().expect("plan should be defined");
        serde_json::from_value(value).expect("plan decodes")
    }

    fn folder(&self) -> Utf8PathBuf {
        let folder = self.folder.borrow();
        let dir = folder.as_ref().expect("folder should exist");
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 path")
    }

    fn texts(&self) -> Vec<String> {
        let layout = self.layout.borrow();
        let layout = layout.as_ref().expect("layout should exist");
        layout
            .pages
            .iter()
            .flat_map(|page| page.lines.iter().map(|line| line.text.clone()))
            .collect()
    }
}

fn generated() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 1)
        .and_then(|day| day.and_hms_opt(8, 0, 0))
        .expect("valid timestamp")
}

#[fixture]
fn world() -> ExportWorld {
    ExportWorld::default()
}

#[given("a trip plan named {name}")]
fn named_plan(#[from(world)] world: &ExportWorld, name: String) {
    world.plan.replace(Some(json!({
        "_id": "t1",
        "name": name.trim_matches('"'),
        "startDate": "2025-07-10",
        "endDate": "2025-07-13",
        "hotels": [],
        "restaurants": [],
        "cabServices": [],
        "guides": []
    })));
}

#[given("a dinner booked on {date} at {time}")]
fn dinner(#[from(world)] world: &ExportWorld, date: String, time: String) {
    let mut plan = world.plan.borrow_mut();
    let restaurants = plan
        .as_mut()
        .and_then(|plan| plan.get_mut("restaurants"))
        .and_then(Value::as_array_mut)
        .expect("plan should have restaurants");
    restaurants.push(json!({
        "restaurantId": { "_id": "r1", "name": "Hill Spice", "location": { "address": "", "city": "Kandy" } },
        "date": date,
        "time": time
    }));
}

#[when("the plan is exported to a folder")]
fn exported(#[from(world)] world: &ExportWorld) {
    world
        .folder
        .replace(Some(tempfile::tempdir().expect("temp dir")));
    let document = export_trip_plan(&world.plan(), generated()).expect("export succeeds");
    save_to_dir(&world.folder(), &document).expect("save succeeds");
}

#[when("the plan is laid out")]
fn laid_out(#[from(world)] world: &ExportWorld) {
    world
        .layout
        .replace(Some(layout_trip_plan(&world.plan(), generated())));
}

#[then("the folder holds {file}")]
fn folder_holds(#[from(world)] world: &ExportWorld, file: String) {
    let path = world.folder().join(file.trim_matches('"'));
    assert!(wayfarer_fs::file_is_file(&path).expect("metadata"));
}

#[then("the file is a PDF document")]
fn is_pdf(#[from(world)] world: &ExportWorld) {
    let bytes =
        wayfarer_fs::read_bytes(&world.folder().join("tea-country-trip-plan.pdf")).expect("read");
    assert!(bytes.starts_with(b"%PDF"));
}

#[then("the document reads {text}")]
fn document_reads(#[from(world)] world: &ExportWorld, text: String) {
    let expected = text.trim_matches('"');
    assert!(world.texts().iter().any(|line| line == expected));
    assert!(world.texts().iter().any(|line| line == "Location: Kandy"));
}

#[then("the document has no {section} section")]
fn no_section(#[from(world)] world: &ExportWorld, section: String) {
    let heading = section.trim_matches('"');
    assert!(!world.texts().iter().any(|line| line == heading));
}

#[scenario(path = "tests/features/pdf_export.feature", index = 0)]
fn exporting_writes_pdf(world: ExportWorld) {
    let _ = (world,);
}

#[scenario(path = "tests/features/pdf_export.feature", index = 1)]
fn restaurant_time_is_twelve_hour(world: ExportWorld) {
    let _ = (world,);
}

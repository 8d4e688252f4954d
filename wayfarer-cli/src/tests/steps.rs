//! Behaviour-driven step definitions driving whole CLI invocations.

use super::helpers::{Harness, hotel, restaurant, trip_plan, user};
use super::*;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;
use wayfarer_core::test_support::{MemoryAuthService, MemoryListingService, MemoryTripPlanService};
use wayfarer_core::TokenStore;

/// Scenario state: the in-memory backend plus the last command's outcome.
struct CliWorld {
    harness: RefCell<Harness>,
    result: RefCell<Option<Result<(), CliError>>>,
    output: RefCell<String>,
    export_dir: TempDir,
}

impl CliWorld {
    fn export_root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.export_dir.path().to_path_buf()).expect("utf-8 tempdir")
    }

    fn run(&self, argv: &[&str]) {
        let (result, output) = self.harness.borrow().run(argv);
        self.result.replace(Some(result));
        self.output.replace(output);
    }
}

#[fixture]
fn world() -> CliWorld {
    CliWorld {
        harness: RefCell::new(Harness::default()),
        result: RefCell::new(None),
        output: RefCell::new(String::new()),
        export_dir: TempDir::new().expect("tempdir"),
    }
}

#[given("restaurants serving Thai and Sri Lankan food")]
fn restaurants_exist(#[from(world)] world: &CliWorld) {
    world.harness.replace(Harness {
        restaurants: MemoryListingService::with_records([
            restaurant("r1", "Spice Garden", &["Sri Lankan"]),
            restaurant("r2", "Bangkok Street", &["Thai"]),
        ]),
        ..Harness::default()
    });
}

#[given("a hotel called Lagoon with id h1")]
fn hotel_exists(#[from(world)] world: &CliWorld) {
    world.harness.replace(Harness {
        hotels: MemoryListingService::with_records([hotel("h1", "Lagoon", "owner-1", 0)]),
        ..Harness::default()
    });
}

#[given("a stored trip plan called Coast with id t1")]
fn plan_exists(#[from(world)] world: &CliWorld) {
    world.harness.replace(Harness {
        plans: MemoryTripPlanService::with_plans([trip_plan("t1", "Coast")]),
        ..Harness::default()
    });
}

#[given("an account for ana with password secret")]
fn account_exists(#[from(world)] world: &CliWorld) {
    world.harness.replace(Harness {
        auth: MemoryAuthService::with_account(user("ana", "tourist"), "secret"),
        ..Harness::default()
    });
}

#[when("I run {argv}")]
fn run_command(#[from(world)] world: &CliWorld, argv: String) {
    let argv: Vec<&str> = argv.trim_matches('"').split_whitespace().collect();
    world.run(&argv);
}

#[when("I export trip t1 to a temporary directory")]
fn export_trip(#[from(world)] world: &CliWorld) {
    let root = world.export_root();
    world.run(&["trips", "export", "t1", "--output-dir", root.as_str()]);
}

#[then("the command succeeds")]
fn command_succeeds(#[from(world)] world: &CliWorld) {
    match world.result.borrow().as_ref() {
        Some(Ok(())) => {}
        other => panic!("expected success, found {other:?}"),
    }
}

#[then("the command fails")]
fn command_fails(#[from(world)] world: &CliWorld) {
    match world.result.borrow().as_ref() {
        Some(Err(_)) => {}
        other => panic!("expected failure, found {other:?}"),
    }
}

#[then("the output mentions {text}")]
fn output_mentions(#[from(world)] world: &CliWorld, text: String) {
    let output = world.output.borrow();
    assert!(
        output.contains(text.trim_matches('"')),
        "expected {text} in output:\n{output}"
    );
}

#[then("the output does not mention {text}")]
fn output_omits(#[from(world)] world: &CliWorld, text: String) {
    let output = world.output.borrow();
    assert!(
        !output.contains(text.trim_matches('"')),
        "did not expect {text} in output:\n{output}"
    );
}

#[then("the CLI was redirected to {route}")]
fn redirected(#[from(world)] world: &CliWorld, route: String) {
    let redirects = world.harness.borrow().navigator.redirects();
    assert_eq!(redirects, [route.trim_matches('"')]);
}

#[then("no trip plan was saved")]
fn nothing_saved(#[from(world)] world: &CliWorld) {
    assert!(world.harness.borrow().plans.documents().is_empty());
}

#[then("the file {name} holds a PDF")]
fn pdf_written(#[from(world)] world: &CliWorld, name: String) {
    let path = world.export_root().join(name.trim_matches('"'));
    let bytes = std::fs::read(&path).expect("export written");
    assert!(bytes.starts_with(b"%PDF"), "{path} is not a PDF");
    assert!(world.output.borrow().contains(&format!("Saved {path}")));
}

#[then("the session token is {token}")]
fn token_stored(#[from(world)] world: &CliWorld, token: String) {
    let stored = world.harness.borrow().tokens.token();
    assert_eq!(stored.as_deref(), Some(token.trim_matches('"')));
}

#[then("no session token is stored")]
fn no_token(#[from(world)] world: &CliWorld) {
    assert_eq!(world.harness.borrow().tokens.token(), None);
}

macro_rules! register_cli_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/cli.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_cli_scenario!(filtering_restaurants, "filtering restaurants by cuisine");
register_cli_scenario!(planning_trip, "planning a trip with a hotel");
register_cli_scenario!(planning_without_dates, "planning a trip without dates");
register_cli_scenario!(exporting_trip, "exporting a trip plan");
register_cli_scenario!(signing_in, "signing in keeps the token");
register_cli_scenario!(rejected_sign_in, "a rejected sign-in keeps no token");

//! Focused unit tests for argument parsing, configuration and commands.

use super::helpers::{Harness, cab, hotel, restaurant, trip_plan, user};
use super::*;
use crate::config::{
    ENV_API_URL, ENV_TIMEOUT_SECS, LoginConfig, environment_layer, settings_from_layers,
};
use crate::trips::parse_slot;
use camino::Utf8PathBuf;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use wayfarer_client::DEFAULT_API_URL;
use wayfarer_core::test_support::{MemoryListingService, MemoryTripPlanService};
use wayfarer_core::{EntityKind, FormError, TokenStore};

fn parse(argv: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("wayfarer").chain(argv.iter().copied()))
        .expect("arguments parse")
}

#[rstest]
fn list_parses_kind_and_facets() {
    let cli = parse(&["list", "restaurants", "--cuisine", "Thai", "--search", "curry"]);
    match cli.command {
        Command::List(args) => {
            assert_eq!(args.kind, EntityKind::Restaurant);
            assert_eq!(args.filters.cuisine.as_deref(), Some("Thai"));
            assert_eq!(args.filters.search.as_deref(), Some("curry"));
        }
        other => panic!("expected List, found {other:?}"),
    }
}

#[rstest]
fn global_flags_precede_the_subcommand() {
    let cli = parse(&["--api-url", "http://api.test/api", "--timeout-secs", "5", "whoami"]);
    assert_eq!(cli.global.api_url.as_deref(), Some("http://api.test/api"));
    assert_eq!(cli.global.timeout_secs, Some(5));
    assert!(matches!(cli.command, Command::Whoami));
}

#[rstest]
fn unknown_kind_is_rejected() {
    let err = Cli::try_parse_from(["wayfarer", "list", "boats"]).expect_err("kind is invalid");
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[rstest]
#[case("hotel:1", Some((EntityKind::Hotel, 1)))]
#[case("cabs:0", Some((EntityKind::Cab, 0)))]
#[case("guide", None)]
#[case("guide:first", None)]
#[case("boat:2", None)]
fn booking_slots_parse(#[case] raw: &str, #[case] expected: Option<(EntityKind, usize)>) {
    assert_eq!(parse_slot(raw).ok(), expected);
}

#[rstest]
fn settings_fall_back_to_defaults() {
    let settings = ClientSettings::from(config::GlobalArgs::default());
    assert_eq!(settings.api_url, DEFAULT_API_URL);
    assert_eq!(settings.session_file, Utf8PathBuf::from(DEFAULT_SESSION_FILE));
    assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
}

#[rstest]
fn cli_layer_overrides_environment() {
    let env = environment_layer(|name| match name {
        ENV_API_URL => Some("http://from-env/api".to_owned()),
        ENV_TIMEOUT_SECS => Some("12".to_owned()),
        _ => None,
    });
    let mut composer = MergeComposer::new();
    composer.push_environment(env);
    composer.push_cli(json!({ "api_url": "http://from-cli/api" }));

    let settings = settings_from_layers(composer.layers()).expect("settings merge");
    assert_eq!(settings.api_url, "http://from-cli/api");
    assert_eq!(settings.timeout, Duration::from_secs(12));
}

#[rstest]
fn unparsable_timeout_is_ignored() {
    let env = environment_layer(|name| (name == ENV_TIMEOUT_SECS).then(|| "soon".to_owned()));
    assert_eq!(env, json!({}));
}

#[rstest]
#[case(None, Some("pw"), config::ARG_EMAIL)]
#[case(Some("   "), Some("pw"), config::ARG_EMAIL)]
#[case(Some("a@example.com"), None, config::ARG_PASSWORD)]
fn login_requires_email_and_password(
    #[case] email: Option<&str>,
    #[case] password: Option<&str>,
    #[case] missing: &'static str,
) {
    let args = LoginArgs {
        email: email.map(str::to_owned),
        password: password.map(str::to_owned),
    };
    match LoginConfig::try_from(args) {
        Err(CliError::MissingArgument { field, .. }) => assert_eq!(field, missing),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn facet_flags_are_checked_against_the_kind() {
    let harness = Harness::default();
    let (result, _) = harness.run(&["list", "hotels", "--cuisine", "Thai"]);
    match result {
        Err(CliError::UnsupportedFilter { flag, kind }) => {
            assert_eq!(flag, "cuisine");
            assert_eq!(kind, EntityKind::Hotel);
        }
        other => panic!("expected UnsupportedFilter, found {other:?}"),
    }
    assert_eq!(harness.hotels.list_calls(), 0);
}

#[rstest]
fn list_prints_summary_and_rating() {
    let harness = Harness {
        restaurants: MemoryListingService::with_records([
            restaurant("r1", "Spice Garden", &["Sri Lankan"]),
            restaurant("r2", "Bangkok Street", &["Thai"]),
        ]),
        ..Harness::default()
    };
    let (result, out) = harness.run(&["list", "restaurant", "--cuisine", "Thai"]);
    result.expect("listing succeeds");
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        [
            "Showing 1 restaurant",
            "r2  Bangkok Street | Colombo | Thai $$ | 4.5/5 (2 reviews)",
        ]
    );
}

#[rstest]
fn empty_listing_invites_the_owner_to_create() {
    let harness = Harness::signed_in(user("owner-1", "hotel_owner"));
    let (result, out) = harness.run(&["list", "hotels"]);
    result.expect("listing succeeds");
    assert!(out.contains("No hotels found."));
    assert!(out.contains("wayfarer create hotels"));
}

#[rstest]
fn empty_listing_has_no_invite_for_tourists() {
    let harness = Harness::signed_in(user("t1", "tourist"));
    let (result, out) = harness.run(&["list", "hotels"]);
    result.expect("listing succeeds");
    assert_eq!(out.trim(), "No hotels found.");
}

#[rstest]
fn search_cabs_matches_areas() {
    let harness = Harness {
        cabs: MemoryListingService::with_records([
            cab("c1", "Sedan", &["Colombo", "Negombo"]),
            cab("c2", "Van", &["Kandy"]),
        ]),
        ..Harness::default()
    };
    let (result, out) = harness.run(&["search-cabs", "  colombo "]);
    result.expect("search succeeds");
    assert!(out.starts_with("Showing 1 cab service\n"));
    assert!(out.contains("c1  Cab c1 | Sedan Prius in Colombo, Negombo"));

    let (result, out) = harness.run(&["search-cabs", "Jaffna"]);
    result.expect("search succeeds");
    assert_eq!(out.trim(), "No cab services operate in Jaffna.");
}

#[rstest]
fn delete_requires_confirmation() {
    let harness = Harness {
        hotels: MemoryListingService::with_records([hotel(
            "h1", "Lagoon", "owner-1", 0,
        )]),
        ..Harness::default()
    };
    let (result, _) = harness.run(&["delete", "hotel", "h1"]);
    match result {
        Err(CliError::ConfirmationRequired { what }) => assert_eq!(what, "hotel h1"),
        other => panic!("expected ConfirmationRequired, found {other:?}"),
    }
    assert_eq!(harness.hotels.records().len(), 1);

    let (result, out) = harness.run(&["delete", "hotel", "h1", "--yes"]);
    result.expect("delete succeeds");
    assert_eq!(out.trim(), "Deleted hotel h1.");
    assert!(harness.hotels.records().is_empty());
}

#[rstest]
fn create_reads_form_and_images() {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let form = root.join("hotel.json");
    std::fs::write(
        &form,
        r#"{"name": "Lake Lodge", "rooms": [{"type": "Double", "pricePerNight": 90, "capacity": 2}]}"#,
    )
    .expect("write form");
    let image = root.join("front.png");
    std::fs::write(&image, b"png").expect("write image");

    let harness = Harness::signed_in(user("owner-1", "hotel_owner"));
    harness.hotels.queue_saved(hotel("h9", "Lake Lodge", "owner-1", 1));
    let (result, out) = harness.run(&[
        "create",
        "hotel",
        "--form",
        form.as_str(),
        "--image",
        image.as_str(),
    ]);
    result.expect("create succeeds");
    assert!(out.contains("[success] Hotel added successfully!"));
    assert!(out.ends_with("h9  Lake Lodge\n"));

    let submissions = harness.hotels.submissions();
    let payload = submissions.first().expect("payload recorded");
    assert_eq!(payload.text("name"), Some("Lake Lodge"));
    assert_eq!(payload.file_count(), 1);
}

#[rstest]
fn create_requires_a_session() {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let form = root.join("hotel.json");
    std::fs::write(&form, r#"{"name": "Lake Lodge"}"#).expect("write form");

    let harness = Harness::default();
    let (result, _) = harness.run(&["create", "hotel", "--form", form.as_str()]);
    assert!(matches!(result, Err(CliError::NotSignedIn)));
    assert!(harness.hotels.submissions().is_empty());
}

#[rstest]
fn update_can_replace_stored_images() {
    let owner = user("owner-1", "hotel_owner");
    let harness = Harness {
        hotels: MemoryListingService::with_records([hotel(
            "h1", "Lagoon", "owner-1", 5,
        )]),
        ..Harness::signed_in(owner)
    };
    harness.hotels.queue_saved(hotel("h1", "Lagoon", "owner-1", 1));
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let image = root.join("new.jpg");
    std::fs::write(&image, b"jpg").expect("write image");

    let (result, _) = harness.run(&["update", "hotel", "h1", "--image", image.as_str()]);
    assert!(matches!(
        result,
        Err(CliError::Form(FormError::TooManyImages { attempted: 6, .. }))
    ));

    let (result, out) = harness.run(&[
        "update",
        "hotel",
        "h1",
        "--replace-images",
        "--image",
        image.as_str(),
    ]);
    result.expect("update succeeds");
    assert!(out.contains("[success] Hotel updated successfully!"));
    let submissions = harness.hotels.submissions();
    let payload = submissions.last().expect("payload recorded");
    assert_eq!(payload.text("replace_images"), Some("true"));
    assert_eq!(payload.file_count(), 1);
}

#[rstest]
fn only_owners_may_remove_images() {
    let harness = Harness {
        hotels: MemoryListingService::with_records([hotel(
            "h1", "Lagoon", "owner-1", 2,
        )]),
        ..Harness::signed_in(user("intruder", "hotel_owner"))
    };
    let (result, out) = harness.run(&["remove-image", "hotel", "h1", "0"]);
    assert!(matches!(
        result,
        Err(CliError::Form(FormError::NotOwner { kind: EntityKind::Hotel }))
    ));
    assert!(out.contains("[error] You don't have permission to edit this hotel"));
    assert!(harness.hotels.removed_images().is_empty());
    assert_eq!(harness.navigator.redirects(), ["/hotels"]);
}

#[rstest]
fn trips_show_prints_the_itinerary() {
    let harness = Harness {
        plans: MemoryTripPlanService::with_plans([trip_plan(
            "t1", "Coast",
        )]),
        ..Harness::default()
    };
    let (result, out) = harness.run(&["trips", "show", "t1"]);
    result.expect("show succeeds");
    assert!(out.starts_with("Coast\nTrip Duration: March 1, 2024 to March 4, 2024 (3 days)\n"));
    assert!(out.contains("Day 2 - Mar 2, 2024"));
    assert!(out.contains("  7:30 PM  "));
}

#[rstest]
fn logout_clears_the_token() {
    let harness = Harness::signed_in(user("t1", "tourist"));
    let (result, out) = harness.run(&["logout"]);
    result.expect("logout succeeds");
    assert_eq!(out.trim(), "Signed out.");
    assert_eq!(harness.tokens.token(), None);
}

#[rstest]
fn whoami_reports_signed_out() {
    let harness = Harness::default();
    let (result, out) = harness.run(&["whoami"]);
    result.expect("whoami succeeds");
    assert_eq!(out.trim(), "Not signed in.");
}

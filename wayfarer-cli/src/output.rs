//! Plain-text rendering shared by the commands.

use std::fmt::Display;
use std::io::Write;

use wayfarer_core::entity::average_rating;
use wayfarer_core::itinerary::{format_long_date, format_short_date, format_time_12h};
use wayfarer_core::{Itinerary, Notice, Review, TripPlan};

use crate::CliError;

pub(crate) fn line(out: &mut dyn Write, text: impl Display) -> Result<(), CliError> {
    writeln!(out, "{text}").map_err(CliError::WriteOutput)
}

pub(crate) fn notices(out: &mut dyn Write, pending: &[Notice]) -> Result<(), CliError> {
    pending.iter().try_for_each(|notice| line(out, notice))
}

/// `4.5/5 (2 reviews)`, or `no reviews`.
pub(crate) fn rating(reviews: &[Review]) -> String {
    match average_rating(reviews) {
        Some(average) => {
            let noun = if reviews.len() == 1 { "review" } else { "reviews" };
            format!("{average:.1}/5 ({} {noun})", reviews.len())
        }
        None => "no reviews".to_owned(),
    }
}

pub(crate) fn trip_range(plan: &TripPlan) -> String {
    format!(
        "{} to {} ({} days)",
        format_short_date(plan.start_date),
        format_short_date(plan.end_date),
        plan.duration_days()
    )
}

pub(crate) fn trip_line(plan: &TripPlan) -> String {
    let count = plan.booking_count();
    let noun = if count == 1 { "booking" } else { "bookings" };
    format!("{}  {} | {} | {count} {noun}", plan.id, plan.name, trip_range(plan))
}

/// Header plus the day-by-day timeline of `plan`.
pub(crate) fn itinerary(out: &mut dyn Write, plan: &TripPlan) -> Result<(), CliError> {
    line(out, &plan.name)?;
    line(
        out,
        format!(
            "Trip Duration: {} to {} ({} days)",
            format_long_date(plan.start_date),
            format_long_date(plan.end_date),
            plan.duration_days()
        ),
    )?;
    let timeline = Itinerary::from_plan(plan);
    if timeline.is_empty() {
        return line(out, "No bookings yet.");
    }
    for day in timeline.days() {
        line(out, "")?;
        line(out, format!("Day {} - {}", day.number, format_short_date(day.date)))?;
        for event in &day.events {
            match event.time {
                Some(time) => line(out, format!("  {}  {}", format_time_12h(time), event.title))?,
                None => line(out, format!("  {}", event.title))?,
            }
        }
    }
    Ok(())
}

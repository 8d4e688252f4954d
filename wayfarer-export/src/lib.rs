//! Printable export of Wayfarer trip plans.
//!
//! [`layout`] turns a trip plan into positioned lines on A4 pages without
//! touching any output; [`pdf`] draws those pages with `printpdf`.
//! [`export_trip_plan`] does both and names the file after the plan.

#![forbid(unsafe_code)]

pub mod error;
pub mod layout;
pub mod pdf;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDateTime;
use wayfarer_core::TripPlan;

pub use error::ExportError;
pub use layout::{DocumentLayout, Page, PlacedText, Section, TextStyle, layout_trip_plan};
pub use pdf::render_pdf;

/// Suffix appended to every exported file name.
pub const FILE_SUFFIX: &str = "-trip-plan.pdf";

/// A rendered document ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    /// Suggested file name.
    pub file_name: String,
    /// PDF contents.
    pub bytes: Vec<u8>,
}

/// File name for a plan called `name`.
///
/// Every character other than an ASCII letter or digit becomes `-` and the
/// result is lower-cased, e.g. `Hill Country!` gives
/// `hill-country--trip-plan.pdf`.
#[must_use]
pub fn file_name_for(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{slug}{FILE_SUFFIX}")
}

/// Lay out and render `plan`.
///
/// # Errors
///
/// Returns [`ExportError::Render`] when the PDF writer fails.
pub fn export_trip_plan(
    plan: &TripPlan,
    generated_at: NaiveDateTime,
) -> Result<ExportedDocument, ExportError> {
    let layout = layout_trip_plan(plan, generated_at);
    Ok(ExportedDocument {
        file_name: file_name_for(&plan.name),
        bytes: render_pdf(&layout)?,
    })
}

/// Save `document` under `dir`, returning the written path.
///
/// # Errors
///
/// Returns [`ExportError::Write`] when the file cannot be written.
pub fn save_to_dir(dir: &Utf8Path, document: &ExportedDocument) -> Result<Utf8PathBuf, ExportError> {
    let path = dir.join(&document.file_name);
    wayfarer_fs::write_bytes(&path, &document.bytes).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    log::info!("exported trip plan to {path}");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hill Country", "hill-country-trip-plan.pdf")]
    #[case("Hill Country!", "hill-country--trip-plan.pdf")]
    #[case("Galle 2025", "galle-2025-trip-plan.pdf")]
    #[case("Café tour", "caf--tour-trip-plan.pdf")]
    fn slugs_plan_names(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(file_name_for(name), expected);
    }
}

//! Page layout of the trip plan document.
//!
//! Layout is pure: it turns a [`TripPlan`] into pages of positioned text
//! lines and separator rules, measured in whole millimetres from the top
//! left corner of an A4 page. [`crate::pdf`] draws the result.

use chrono::NaiveDateTime;
use wayfarer_core::itinerary::{format_long_date, format_short_date, format_time_12h};
use wayfarer_core::trip_plan::EntityRef;
use wayfarer_core::{Location, TripPlan};

/// A4 width.
pub const PAGE_WIDTH_MM: u16 = 210;
/// A4 height.
pub const PAGE_HEIGHT_MM: u16 = 297;
/// Left, right and top margin.
pub const MARGIN_MM: u16 = 20;
/// Advance per wrapped line.
pub const LINE_HEIGHT_MM: u16 = 7;
/// Content below this line continues on a new page.
pub const BREAK_AFTER_MM: u16 = PAGE_HEIGHT_MM - 50;
/// Baseline of the footer line.
pub const FOOTER_Y_MM: u16 = PAGE_HEIGHT_MM - 10;
/// Right-hand footer text.
pub const FOOTER_BRAND: &str = "Sri Lanka Tourism Trip Planner";

const DETAIL_INDENT_MM: u16 = 5;
const LOCATION_FALLBACK: &str = "Location not available";

/// Typographic role of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Plan name.
    Title,
    /// Date range under the title.
    Summary,
    /// Section heading.
    Heading(Section),
    /// Booked entity name.
    ItemName,
    /// Indented booking detail.
    Detail,
    /// Page footer.
    Footer,
}

impl TextStyle {
    /// Font size in points.
    #[must_use]
    pub const fn size_pt(self) -> f32 {
        match self {
            Self::Title => 22.0,
            Self::Summary => 12.0,
            Self::Heading(_) => 16.0,
            Self::ItemName => 13.0,
            Self::Detail => 11.0,
            Self::Footer => 8.0,
        }
    }

    /// Whether the bold face is used.
    #[must_use]
    pub const fn is_bold(self) -> bool {
        matches!(self, Self::Title | Self::Heading(_) | Self::ItemName)
    }

    /// Text colour as RGB components in `0.0..=1.0`.
    #[must_use]
    pub const fn colour(self) -> [f32; 3] {
        match self {
            Self::Title => [0.098, 0.098, 0.439],
            Self::Summary => [0.275, 0.275, 0.275],
            Self::Heading(section) => section.colour(),
            Self::ItemName => [0.0, 0.0, 0.0],
            Self::Detail => [0.353, 0.353, 0.353],
            Self::Footer => [0.588, 0.588, 0.588],
        }
    }

    /// Approximate average glyph advance, in tenths of a millimetre.
    const fn glyph_tenths_mm(self) -> u16 {
        match self {
            Self::Title => 43,
            Self::Summary => 23,
            Self::Heading(_) => 31,
            Self::ItemName => 26,
            Self::Detail => 21,
            Self::Footer => 16,
        }
    }

    /// Estimated rendered width of `text`.
    #[must_use]
    pub fn estimated_width_mm(self, text: &str) -> u16 {
        let chars = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        chars
            .saturating_mul(self.glyph_tenths_mm())
            .div_ceil(10)
    }

    /// Characters that fit in `width_mm`.
    fn columns(self, width_mm: u16) -> usize {
        usize::from(
            width_mm
                .saturating_mul(10)
                .div_euclid(self.glyph_tenths_mm())
                .max(1),
        )
    }
}

/// Booking section of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Hotel stays.
    Hotels,
    /// Restaurant reservations.
    Restaurants,
    /// Cab rides.
    Transportation,
    /// Guide engagements.
    TourGuides,
}

impl Section {
    /// Heading text.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Hotels => "Hotels",
            Self::Restaurants => "Restaurants",
            Self::Transportation => "Transportation",
            Self::TourGuides => "Tour Guides",
        }
    }

    const fn colour(self) -> [f32; 3] {
        match self {
            Self::Hotels => [0.157, 0.310, 0.302],
            Self::Restaurants => [0.753, 0.337, 0.129],
            Self::Transportation => [0.420, 0.275, 0.757],
            Self::TourGuides => [0.839, 0.620, 0.180],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Centre,
}

/// One line of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    /// Line content.
    pub text: String,
    /// Left edge, already adjusted for alignment.
    pub x_mm: u16,
    /// Baseline, measured from the top of the page.
    pub y_mm: u16,
    /// Typography.
    pub style: TextStyle,
}

/// Content of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Text lines in drawing order.
    pub lines: Vec<PlacedText>,
    /// Horizontal separator rules, by distance from the top.
    pub rules_mm: Vec<u16>,
}

impl Page {
    /// Texts of every line, in drawing order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }
}

/// Paginated trip plan document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    /// Document title, the plan name.
    pub title: String,
    /// Pages in order; never empty.
    pub pages: Vec<Page>,
}

struct Writer {
    pages: Vec<Page>,
    current: Page,
    y: u16,
}

impl Writer {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: MARGIN_MM,
        }
    }

    fn place(&mut self, text: impl Into<String>, x_mm: u16, style: TextStyle, align: Align) {
        let text = text.into();
        let x_mm = match align {
            Align::Left => x_mm,
            Align::Centre => PAGE_WIDTH_MM
                .saturating_sub(style.estimated_width_mm(&text))
                .div_euclid(2),
        };
        let y_mm = self.y;
        self.current.lines.push(PlacedText {
            text,
            x_mm,
            y_mm,
            style,
        });
    }

    fn centred(&mut self, text: impl Into<String>, style: TextStyle) {
        self.place(text, 0, style, Align::Centre);
    }

    /// Wrap `text` to the printable width right of `x_mm`, one line height
    /// per wrapped line.
    fn wrapped(&mut self, text: &str, x_mm: u16, style: TextStyle) {
        let width = PAGE_WIDTH_MM.saturating_sub(MARGIN_MM).saturating_sub(x_mm);
        for line in wrap_text(text, style.columns(width)) {
            self.ensure_room(LINE_HEIGHT_MM);
            self.place(line, x_mm, style, Align::Left);
            self.advance(LINE_HEIGHT_MM);
        }
    }

    const fn advance(&mut self, mm: u16) {
        self.y = self.y.saturating_add(mm);
    }

    /// Start a new page unless `mm` more fits above the break line.
    fn ensure_room(&mut self, mm: u16) {
        if self.y.saturating_add(mm) > BREAK_AFTER_MM {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = MARGIN_MM;
        }
    }

    fn item(&mut self, name: &str, details: &[String]) {
        self.wrapped(name, MARGIN_MM, TextStyle::ItemName);
        for detail in details {
            self.advance(2);
            self.wrapped(detail, MARGIN_MM + DETAIL_INDENT_MM, TextStyle::Detail);
        }
        self.advance(8);
    }

    fn section(&mut self, section: Section, items: &[(String, Vec<String>)]) {
        if items.is_empty() {
            return;
        }
        // Keep the heading together with the first line of its first item.
        self.ensure_room(8 + LINE_HEIGHT_MM);
        self.place(section.title(), MARGIN_MM, TextStyle::Heading(section), Align::Left);
        self.advance(8);
        for (name, details) in items {
            self.item(name, details);
        }
        self.advance(5);
    }

    fn finish(mut self, footer: &str) -> Vec<Page> {
        self.pages.push(self.current);
        for page in &mut self.pages {
            page.lines.push(PlacedText {
                text: footer.to_owned(),
                x_mm: MARGIN_MM,
                y_mm: FOOTER_Y_MM,
                style: TextStyle::Footer,
            });
            page.lines.push(PlacedText {
                text: FOOTER_BRAND.to_owned(),
                x_mm: (PAGE_WIDTH_MM - MARGIN_MM)
                    .saturating_sub(TextStyle::Footer.estimated_width_mm(FOOTER_BRAND)),
                y_mm: FOOTER_Y_MM,
                style: TextStyle::Footer,
            });
        }
        self.pages
    }
}

/// Greedy word wrap to `columns` characters; overlong words are split.
#[must_use]
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut rest: Vec<char> = word.chars().collect();
        while rest.len() > columns {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let tail = rest.split_off(columns);
            lines.push(rest.into_iter().collect());
            rest = tail;
        }
        let word: String = rest.into_iter().collect();
        let needed = line.chars().count() + usize::from(!line.is_empty()) + word.chars().count();
        if needed > columns && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn location_line(reference: &EntityRef) -> String {
    let location = reference.location().and_then(Location::describe);
    format!(
        "Location: {}",
        location.as_deref().unwrap_or(LOCATION_FALLBACK)
    )
}

fn name_or(reference: &EntityRef, fallback: &str) -> String {
    reference.name().unwrap_or(fallback).to_owned()
}

fn hotel_items(plan: &TripPlan) -> Vec<(String, Vec<String>)> {
    plan.hotels
        .iter()
        .map(|stay| {
            (
                name_or(&stay.hotel, "Hotel"),
                vec![
                    location_line(&stay.hotel),
                    format!(
                        "Check-in: {} | Check-out: {}",
                        format_short_date(stay.check_in),
                        format_short_date(stay.check_out)
                    ),
                ],
            )
        })
        .collect()
}

fn restaurant_items(plan: &TripPlan) -> Vec<(String, Vec<String>)> {
    plan.restaurants
        .iter()
        .map(|meal| {
            let date = format_short_date(meal.date);
            let when = match meal.time {
                Some(time) => format!("Date: {date} at {}", format_time_12h(time)),
                None => format!("Date: {date}"),
            };
            (
                name_or(&meal.restaurant, "Restaurant"),
                vec![location_line(&meal.restaurant), when],
            )
        })
        .collect()
}

fn cab_items(plan: &TripPlan) -> Vec<(String, Vec<String>)> {
    plan.cab_services
        .iter()
        .map(|ride| {
            let mut details = vec![format!("Date: {}", format_short_date(ride.date))];
            if let Some(route) = ride.route() {
                details.push(format!("Route: {route}"));
            }
            (name_or(&ride.cab, "Cab Service"), details)
        })
        .collect()
}

fn guide_items(plan: &TripPlan) -> Vec<(String, Vec<String>)> {
    plan.guides
        .iter()
        .map(|engagement| {
            let mut details = vec![format!(
                "Duration: {} to {}",
                format_short_date(engagement.start_date),
                format_short_date(engagement.end_date)
            )];
            let languages = engagement.guide.languages();
            if !languages.is_empty() {
                details.push(format!("Languages: {}", languages.join(", ")));
            }
            (name_or(&engagement.guide, "Tour Guide"), details)
        })
        .collect()
}

/// Lay out `plan`, stamping the footer with `generated_at`.
#[must_use]
pub fn layout_trip_plan(plan: &TripPlan, generated_at: NaiveDateTime) -> DocumentLayout {
    let mut writer = Writer::new();
    writer.centred(plan.name.clone(), TextStyle::Title);
    writer.advance(15);
    writer.centred(
        format!(
            "Trip Duration: {} to {} ({} days)",
            format_long_date(plan.start_date),
            format_long_date(plan.end_date),
            plan.duration_days()
        ),
        TextStyle::Summary,
    );
    writer.advance(15);
    writer.current.rules_mm.push(writer.y);
    writer.advance(10);

    writer.section(Section::Hotels, &hotel_items(plan));
    writer.section(Section::Restaurants, &restaurant_items(plan));
    writer.section(Section::Transportation, &cab_items(plan));
    writer.section(Section::TourGuides, &guide_items(plan));

    let footer = format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    DocumentLayout {
        title: plan.name.clone(),
        pages: writer.finish(&footer),
    }
}

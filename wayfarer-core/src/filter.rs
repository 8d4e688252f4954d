//! Client-side search and facet filtering over fetched collections.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::entity::Listing;
use crate::error::ServiceError;
use crate::service::{ListParams, ListingService};
use crate::trip_plan::TripPlan;
use crate::user::Role;

/// Filter state for one entity kind.
///
/// `Default` is the cleared state: every record matches.
pub trait ListingFilter<L>: Clone + Default + fmt::Debug {
    /// Whether `item` passes every active criterion.
    fn matches(&self, item: &L) -> bool;

    /// Whether any criterion is set.
    fn is_active(&self) -> bool;
}

/// Case-insensitive substring test.
#[must_use]
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Whether a trimmed, non-empty `term` occurs in any of `fields`.
///
/// A blank term matches everything.
pub fn search_matches<'a, I>(term: &str, fields: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let term = term.trim();
    term.is_empty() || fields.into_iter().any(|field| contains_ci(field, term))
}

/// Exact containment of an optional facet value in a list field.
#[must_use]
pub fn facet_contains(facet: Option<&str>, values: &[String]) -> bool {
    facet.is_none_or(|wanted| values.iter().any(|value| value == wanted))
}

/// Exact equality of an optional facet value with a scalar field.
#[must_use]
pub fn facet_equals(facet: Option<&str>, value: &str) -> bool {
    facet.is_none_or(|wanted| wanted == value)
}

/// Why a listing shows nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// The backend returned no records at all.
    NoEntities {
        /// Whether the viewer holds the role that may create one.
        can_create: bool,
    },
    /// Records exist but the current filter hides them all.
    NoMatches,
}

#[derive(Debug, Clone)]
enum Source<L> {
    Loading,
    Failed(ServiceError),
    Loaded(Vec<L>),
}

/// A fetched collection plus its filter and derived visible subset.
///
/// The visible subset is recomputed synchronously whenever the source or
/// the filter changes.
#[derive(Debug, Clone)]
pub struct ListingView<L: Listing> {
    source: Source<L>,
    filter: L::Filter,
    visible: Vec<usize>,
}

impl<L: Listing> Default for ListingView<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Listing> ListingView<L> {
    /// A view waiting for its first load.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: Source::Loading,
            filter: L::Filter::default(),
            visible: Vec::new(),
        }
    }

    /// A view over an already fetched collection.
    #[must_use]
    pub fn with_items(items: Vec<L>) -> Self {
        let mut view = Self::new();
        view.set_items(items);
        view
    }

    /// Fetch the collection from `service`, replacing the current source.
    pub async fn load<S>(&mut self, service: &S, params: &ListParams)
    where
        S: ListingService<L> + ?Sized,
    {
        self.source = Source::Loading;
        self.visible.clear();
        match service.list(params).await {
            Ok(items) => self.set_items(items),
            Err(err) => {
                log::warn!("failed to load {}: {err}", L::KIND.plural_label());
                self.source = Source::Failed(err);
            }
        }
    }

    /// Replace the source collection.
    pub fn set_items(&mut self, items: Vec<L>) {
        self.source = Source::Loaded(items);
        self.recompute();
    }

    /// Whether a load is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.source, Source::Loading)
    }

    /// Failure of the last load, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ServiceError> {
        match &self.source {
            Source::Failed(err) => Some(err),
            Source::Loading | Source::Loaded(_) => None,
        }
    }

    /// Current filter.
    #[must_use]
    pub const fn filter(&self) -> &L::Filter {
        &self.filter
    }

    /// Edit the filter in place and recompute the visible subset.
    pub fn update_filter(&mut self, edit: impl FnOnce(&mut L::Filter)) {
        edit(&mut self.filter);
        self.recompute();
    }

    /// Reset every criterion.
    pub fn clear_filters(&mut self) {
        self.filter = L::Filter::default();
        self.recompute();
    }

    /// Every loaded record.
    #[must_use]
    pub fn items(&self) -> &[L] {
        match &self.source {
            Source::Loaded(items) => items,
            Source::Loading | Source::Failed(_) => &[],
        }
    }

    /// Records passing the filter, in source order.
    pub fn visible(&self) -> impl Iterator<Item = &L> + '_ {
        let items = self.items();
        self.visible.iter().filter_map(move |index| items.get(*index))
    }

    /// Number of records passing the filter.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Empty-state classification for `viewer`, `None` when something is
    /// visible or the collection has not loaded.
    #[must_use]
    pub fn empty_state(&self, viewer: Option<Role>) -> Option<EmptyState> {
        let Source::Loaded(items) = &self.source else {
            return None;
        };
        if items.is_empty() {
            return Some(EmptyState::NoEntities {
                can_create: viewer == Some(L::KIND.owner_role()),
            });
        }
        self.visible.is_empty().then_some(EmptyState::NoMatches)
    }

    /// "Showing N things" line for the visible subset.
    #[must_use]
    pub fn summary(&self) -> String {
        showing(self.visible.len(), L::KIND.label(), L::KIND.plural_label())
    }

    fn recompute(&mut self) {
        let filter = &self.filter;
        self.visible = match &self.source {
            Source::Loaded(items) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| filter.matches(item))
                .map(|(index, _)| index)
                .collect(),
            Source::Loading | Source::Failed(_) => Vec::new(),
        };
    }
}

fn showing(count: usize, singular: &str, plural: &str) -> String {
    let noun = if count == 1 { singular } else { plural };
    format!("Showing {count} {noun}")
}

/// Trip plan attribute to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripPlanSortKey {
    /// Plan name, case-insensitive.
    Name,
    /// First day.
    #[default]
    StartDate,
    /// Last day.
    EndDate,
    /// Days between start and end.
    Duration,
    /// Creation time; plans without one sort first.
    Created,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    #[default]
    Descending,
}

/// Sort order for the trip plan list; defaults to newest start first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TripPlanSort {
    /// Attribute.
    pub key: TripPlanSortKey,
    /// Direction.
    pub direction: SortDirection,
}

/// Error returned for an unrecognised sort option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort option '{0}': expected <name|startDate|endDate|duration|created>-<asc|desc>")]
pub struct UnknownSort(pub String);

impl FromStr for TripPlanSort {
    type Err = UnknownSort;

    /// Parses `field-direction`, e.g. `startDate-desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownSort(s.to_owned());
        let (field, direction) = s.trim().split_once('-').ok_or_else(unknown)?;
        let key = match field {
            "name" => TripPlanSortKey::Name,
            "startDate" => TripPlanSortKey::StartDate,
            "endDate" => TripPlanSortKey::EndDate,
            "duration" => TripPlanSortKey::Duration,
            "created" => TripPlanSortKey::Created,
            _ => return Err(unknown()),
        };
        let direction = match direction {
            "asc" => SortDirection::Ascending,
            "desc" => SortDirection::Descending,
            _ => return Err(unknown()),
        };
        Ok(Self { key, direction })
    }
}

impl TripPlanSort {
    fn compare(self, a: &TripPlan, b: &TripPlan) -> Ordering {
        let ordering = match self.key {
            TripPlanSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            TripPlanSortKey::StartDate => a.start_date.cmp(&b.start_date),
            TripPlanSortKey::EndDate => a.end_date.cmp(&b.end_date),
            TripPlanSortKey::Duration => a.duration_days().cmp(&b.duration_days()),
            TripPlanSortKey::Created => a.created_at.cmp(&b.created_at),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Name search plus ordering for the trip plan list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripPlanQuery {
    /// Case-insensitive name search.
    pub search: String,
    /// Ordering of the result.
    pub sort: TripPlanSort,
}

impl TripPlanQuery {
    /// Matching plans in the requested order.
    #[must_use]
    pub fn apply<'a>(&self, plans: &'a [TripPlan]) -> Vec<&'a TripPlan> {
        let mut matching: Vec<&TripPlan> = plans
            .iter()
            .filter(|plan| search_matches(&self.search, [plan.name.as_str()]))
            .collect();
        matching.sort_by(|a, b| self.sort.compare(a, b));
        matching
    }

    /// "Showing N trip plans" line.
    #[must_use]
    pub fn summary(count: usize) -> String {
        showing(count, "trip plan", "trip plans")
    }
}

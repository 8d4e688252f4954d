//! Route changes requested by the client layer.
//!
//! Front ends own routing; the client only asks for a redirect through the
//! [`Navigator`] seam and reads the current route to avoid redundant ones.

use std::sync::{Mutex, PoisonError};

use crate::entity::EntityId;

/// Route of the login page.
pub const LOGIN_ROUTE: &str = "/login";
/// Route of the trip plan list.
pub const TRIP_PLANS_ROUTE: &str = "/trip-plans";

/// Route of one trip plan's detail view.
#[must_use]
pub fn trip_plan_route(id: &EntityId) -> String {
    format!("{TRIP_PLANS_ROUTE}/{id}")
}

/// Routing seam implemented by the front end.
pub trait Navigator: Send + Sync {
    /// Route currently displayed.
    fn current_route(&self) -> String;

    /// Move to `route`.
    fn redirect(&self, route: &str);
}

/// Navigator that records every redirect.
///
/// Suitable for front ends without routing (the CLI) and for tests.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Navigator positioned at `route`.
    #[must_use]
    pub fn at(route: &str) -> Self {
        Self {
            history: Mutex::new(vec![route.to_owned()]),
        }
    }

    /// Every route visited, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Redirects performed since construction.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.history().into_iter().skip(1).collect()
    }
}

impl Navigator for RecordingNavigator {
    fn current_route(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_owned())
    }

    fn redirect(&self, route: &str) {
        log::debug!("redirecting to {route}");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_owned());
    }
}

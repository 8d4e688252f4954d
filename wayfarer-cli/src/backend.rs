//! Services a command runs against.

use std::sync::Arc;

use wayfarer_client::{
    ApiClient, FileTokenStore, HttpAuthService, HttpListingService, HttpTripPlanService,
};
use wayfarer_core::{
    AuthService, Cab, CabSearchService, Guide, Hotel, ListingService, RecordingNavigator,
    Restaurant, TokenStore, TripPlanService,
};

use crate::CliError;
use crate::config::ClientSettings;

/// Route the CLI reports as current; nothing is ever displayed there.
pub const HOME_ROUTE: &str = "/";

/// Every backend seam a command may touch.
///
/// Commands only see the traits, so tests substitute the in-memory doubles
/// for the HTTP services.
pub struct Backend<'a> {
    /// Hotel listings.
    pub hotels: Box<dyn ListingService<Hotel> + 'a>,
    /// Restaurant listings.
    pub restaurants: Box<dyn ListingService<Restaurant> + 'a>,
    /// Cab service listings.
    pub cabs: Box<dyn ListingService<Cab> + 'a>,
    /// Area search over cab services.
    pub cab_search: Box<dyn CabSearchService + 'a>,
    /// Guide listings.
    pub guides: Box<dyn ListingService<Guide> + 'a>,
    /// Trip plans of the signed-in user.
    pub plans: Box<dyn TripPlanService + 'a>,
    /// Authentication endpoints.
    pub auth: Box<dyn AuthService + 'a>,
    /// Session token storage.
    pub tokens: Arc<dyn TokenStore>,
    /// Redirects requested while the command ran.
    pub navigator: Arc<RecordingNavigator>,
    /// Origin that relative image paths resolve against.
    pub api_origin: String,
}

impl std::fmt::Debug for Backend<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("api_origin", &self.api_origin)
            .finish_non_exhaustive()
    }
}

impl Backend<'static> {
    /// HTTP services for `settings`, sharing one client.
    pub fn http(settings: &ClientSettings) -> Result<Self, CliError> {
        let tokens: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::new(settings.session_file.clone()));
        let navigator = Arc::new(RecordingNavigator::at(HOME_ROUTE));
        let client = Arc::new(ApiClient::with_config(
            settings.client_config(),
            Arc::clone(&tokens),
            navigator.clone(),
        )?);
        log::debug!("using API at {}", settings.api_url);
        Ok(Self {
            hotels: Box::new(HttpListingService::<Hotel>::new(Arc::clone(&client))),
            restaurants: Box::new(HttpListingService::<Restaurant>::new(Arc::clone(&client))),
            cabs: Box::new(HttpListingService::<Cab>::new(Arc::clone(&client))),
            cab_search: Box::new(HttpListingService::<Cab>::new(Arc::clone(&client))),
            guides: Box::new(HttpListingService::<Guide>::new(Arc::clone(&client))),
            plans: Box::new(HttpTripPlanService::new(Arc::clone(&client))),
            auth: Box::new(HttpAuthService::new(Arc::clone(&client))),
            api_origin: client.config().api_origin().to_owned(),
            tokens,
            navigator,
        })
    }
}

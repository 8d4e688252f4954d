use async_trait::async_trait;

use super::CatalogueEntry;
use crate::entity::{Cab, EntityKind, Guide, Hotel, Listing, Restaurant};
use crate::error::ServiceError;
use crate::service::{ListParams, ListingService};

/// Source of the entities offered on the builder's selection steps.
#[async_trait(?Send)]
pub trait CatalogueSource {
    /// Every entity of `kind` available for booking.
    async fn catalogue(&self, kind: EntityKind) -> Result<Vec<CatalogueEntry>, ServiceError>;
}

/// [`CatalogueSource`] backed by the four listing services.
#[derive(Debug, Clone)]
pub struct ListingCatalogue<H, R, C, G> {
    /// Hotel service.
    pub hotels: H,
    /// Restaurant service.
    pub restaurants: R,
    /// Cab service.
    pub cabs: C,
    /// Guide service.
    pub guides: G,
}

async fn entries<L, S>(service: &S) -> Result<Vec<CatalogueEntry>, ServiceError>
where
    L: Listing,
    S: ListingService<L> + ?Sized,
{
    let records = service.list(&ListParams::new()).await?;
    Ok(records
        .iter()
        .map(|record| CatalogueEntry {
            kind: L::KIND,
            id: record.id().clone(),
            name: record.name().to_owned(),
            location: record.location().cloned(),
        })
        .collect())
}

#[async_trait(?Send)]
impl<H, R, C, G> CatalogueSource for ListingCatalogue<H, R, C, G>
where
    H: ListingService<Hotel>,
    R: ListingService<Restaurant>,
    C: ListingService<Cab>,
    G: ListingService<Guide>,
{
    async fn catalogue(&self, kind: EntityKind) -> Result<Vec<CatalogueEntry>, ServiceError> {
        match kind {
            EntityKind::Hotel => entries::<Hotel, _>(&self.hotels).await,
            EntityKind::Restaurant => entries::<Restaurant, _>(&self.restaurants).await,
            EntityKind::Cab => entries::<Cab, _>(&self.cabs).await,
            EntityKind::Guide => entries::<Guide, _>(&self.guides).await,
        }
    }
}

//! One cache per Aaraazi resource, built once at startup.

use std::sync::Arc;

use crate::api::types::{Contact, Deal, Location, PurchaseCycle, RentCycle, Requirement, SellCycle};
use crate::api::{ApiClient, HttpService};
use crate::cache::ResourceCache;

pub type Store<R> = Arc<ResourceCache<HttpService<R>>>;

/// Every resource cache the dashboard uses.
///
/// Constructed once and handed to whatever renders; cloning shares the same
/// caches.
#[derive(Clone)]
pub struct Stores {
  pub deals: Store<Deal>,
  pub sell_cycles: Store<SellCycle>,
  pub purchase_cycles: Store<PurchaseCycle>,
  pub rent_cycles: Store<RentCycle>,
  pub requirements: Store<Requirement>,
  pub locations: Store<Location>,
  pub contacts: Store<Contact>,
}

fn store<R: crate::api::Resource>(client: &ApiClient) -> Store<R> {
  Arc::new(ResourceCache::new(HttpService::new(client.clone())))
}

impl Stores {
  pub fn new(client: ApiClient) -> Self {
    Self {
      deals: store(&client),
      sell_cycles: store(&client),
      purchase_cycles: store(&client),
      rent_cycles: store(&client),
      requirements: store(&client),
      locations: store(&client),
      contacts: store(&client),
    }
  }
}

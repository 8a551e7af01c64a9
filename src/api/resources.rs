//! Resource descriptions for Aaraazi records.

use super::service::{Creatable, Resource, Updatable};
use super::types::{
  Contact, CreateDeal, CreateLocation, CreatePurchaseCycle, CreateRentCycle, CreateRequirement,
  CreateSellCycle, Deal, Location, PurchaseCycle, RentCycle, Requirement, SellCycle, UpdateDeal,
  UpdatePurchaseCycle, UpdateRentCycle, UpdateRequirement, UpdateSellCycle,
};

// ============================================================================
// Resource implementations
// ============================================================================

impl Resource for Deal {
  const SEGMENT: &'static str = "deals";
  const FILTER_PARAM: &'static str = "agentId";
  const LIST_FALLBACK: &'static str = "Failed to fetch deals";
  const DETAIL_FALLBACK: &'static str = "Failed to fetch deal";

  fn id(&self) -> &str {
    &self.id
  }
}

impl Resource for SellCycle {
  const SEGMENT: &'static str = "sell-cycles";
  const FILTER_PARAM: &'static str = "propertyId";
  const LIST_FALLBACK: &'static str = "Failed to fetch sell cycles";
  const DETAIL_FALLBACK: &'static str = "Failed to fetch sell cycle";

  fn id(&self) -> &str {
    &self.id
  }
}

impl Resource for PurchaseCycle {
  const SEGMENT: &'static str = "purchase-cycles";
  const FILTER_PARAM: &'static str = "propertyId";
  const LIST_FALLBACK: &'static str = "Failed to fetch purchase cycles";
  const DETAIL_FALLBACK: &'static str = "Failed to fetch purchase cycle";

  fn id(&self) -> &str {
    &self.id
  }
}

impl Resource for RentCycle {
  const SEGMENT: &'static str = "rent-cycles";
  const FILTER_PARAM: &'static str = "propertyId";
  const LIST_FALLBACK: &'static str = "Failed to fetch rent cycles";
  const DETAIL_FALLBACK: &'static str = "Failed to fetch rent cycle";

  fn id(&self) -> &str {
    &self.id
  }
}

impl Resource for Requirement {
  const SEGMENT: &'static str = "requirements";
  const FILTER_PARAM: &'static str = "contactId";
  const LIST_FALLBACK: &'static str = "Failed to fetch requirements";
  const DETAIL_FALLBACK: &'static str = "Failed to fetch requirement";

  fn id(&self) -> &str {
    &self.id
  }
}

impl Resource for Location {
  const SEGMENT: &'static str = "locations";
  const FILTER_PARAM: &'static str = "parentId";
  const LIST_FALLBACK: &'static str = "Failed to fetch locations";
  const DETAIL_FALLBACK: &'static str = "Failed to fetch location";

  fn id(&self) -> &str {
    &self.id
  }
}

impl Resource for Contact {
  const SEGMENT: &'static str = "contacts";
  // The contacts list is a search endpoint
  const FILTER_PARAM: &'static str = "search";
  const LIST_FALLBACK: &'static str = "Failed to search contacts";
  const DETAIL_FALLBACK: &'static str = "Failed to fetch contact";

  fn id(&self) -> &str {
    &self.id
  }
}

// ============================================================================
// Mutation capabilities
// ============================================================================

impl Creatable for Deal {
  type Create = CreateDeal;
}

impl Updatable for Deal {
  type Update = UpdateDeal;
}

impl Creatable for SellCycle {
  type Create = CreateSellCycle;
}

impl Updatable for SellCycle {
  type Update = UpdateSellCycle;
}

impl Creatable for PurchaseCycle {
  type Create = CreatePurchaseCycle;
}

impl Updatable for PurchaseCycle {
  type Update = UpdatePurchaseCycle;
}

impl Creatable for RentCycle {
  type Create = CreateRentCycle;
}

impl Updatable for RentCycle {
  type Update = UpdateRentCycle;
}

impl Creatable for Requirement {
  type Create = CreateRequirement;
}

impl Updatable for Requirement {
  type Update = UpdateRequirement;
}

impl Creatable for Location {
  type Create = CreateLocation;
}

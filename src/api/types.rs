//! Records and request bodies exchanged with the Aaraazi API.
//!
//! Unknown fields are kept in `extra` so records round-trip to the CLI
//! output without losing whatever the backend added.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

type Extra = BTreeMap<String, Value>;

/// Allowed rounding slack when percentages must total 100.
const SPLIT_TOLERANCE: f64 = 0.01;

// ============================================================================
// Shared pieces
// ============================================================================

/// A party's share of a commission or an investment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSplit {
  pub party_id: String,
  pub percentage: f64,
}

/// Check that a set of shares divides the whole.
///
/// An empty set is fine (nothing is split yet). Otherwise every share must be
/// in (0, 100], each party may appear once, and the total must be 100.
pub fn validate_splits(splits: &[ShareSplit]) -> Result<(), String> {
  if splits.is_empty() {
    return Ok(());
  }

  let mut seen = HashSet::new();
  for split in splits {
    if !(split.percentage > 0.0 && split.percentage <= 100.0) {
      return Err(format!(
        "Share for {} must be between 0 and 100, got {}",
        split.party_id, split.percentage
      ));
    }
    if !seen.insert(split.party_id.as_str()) {
      return Err(format!("{} appears more than once in the split", split.party_id));
    }
  }

  let total: f64 = splits.iter().map(|s| s.percentage).sum();
  if (total - 100.0).abs() > SPLIT_TOLERANCE {
    return Err(format!("Shares must total 100%, got {:.2}%", total));
  }

  Ok(())
}

// ============================================================================
// Deals
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
  pub id: String,
  #[serde(default)]
  pub title: String,
  pub stage: Option<String>,
  pub value: Option<f64>,
  pub property_id: Option<String>,
  pub contact_id: Option<String>,
  pub agent_id: Option<String>,
  #[serde(default)]
  pub commission_splits: Vec<ShareSplit>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeal {
  pub title: String,
  pub property_id: Option<String>,
  pub contact_id: Option<String>,
  pub agent_id: Option<String>,
  pub value: Option<f64>,
  #[serde(default)]
  pub commission_splits: Vec<ShareSplit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeal {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stage: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub value: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub commission_splits: Option<Vec<ShareSplit>>,
}

// ============================================================================
// Sell / purchase / rent cycles
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellCycle {
  pub id: String,
  pub property_id: String,
  pub seller_id: Option<String>,
  pub asking_price: Option<f64>,
  pub status: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSellCycle {
  pub property_id: String,
  pub seller_id: Option<String>,
  pub asking_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSellCycle {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub asking_price: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCycle {
  pub id: String,
  pub property_id: String,
  pub buyer_id: Option<String>,
  pub requirement_id: Option<String>,
  pub offer_amount: Option<f64>,
  pub status: Option<String>,
  #[serde(default)]
  pub investors: Vec<ShareSplit>,
  pub created_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseCycle {
  pub property_id: String,
  pub buyer_id: Option<String>,
  pub requirement_id: Option<String>,
  pub offer_amount: Option<f64>,
  #[serde(default)]
  pub investors: Vec<ShareSplit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchaseCycle {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub offer_amount: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub investors: Option<Vec<ShareSplit>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentCycle {
  pub id: String,
  pub property_id: String,
  pub tenant_id: Option<String>,
  pub monthly_rent: Option<f64>,
  pub status: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRentCycle {
  pub property_id: String,
  pub tenant_id: Option<String>,
  pub monthly_rent: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRentCycle {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tenant_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub monthly_rent: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
}

// ============================================================================
// Requirements, locations, contacts
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
  pub id: String,
  pub contact_id: String,
  /// "buy" or "rent"
  pub kind: Option<String>,
  pub min_budget: Option<f64>,
  pub max_budget: Option<f64>,
  #[serde(default)]
  pub location_ids: Vec<String>,
  #[serde(flatten)]
  pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequirement {
  pub contact_id: String,
  pub kind: Option<String>,
  pub min_budget: Option<f64>,
  pub max_budget: Option<f64>,
  #[serde(default)]
  pub location_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequirement {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min_budget: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_budget: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location_ids: Option<Vec<String>>,
}

fn check_budget(min: Option<f64>, max: Option<f64>) -> Result<(), String> {
  match (min, max) {
    (Some(min), Some(max)) if min > max => Err(format!(
      "Minimum budget {} is above maximum budget {}",
      min, max
    )),
    _ => Ok(()),
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
  pub id: String,
  pub name: String,
  pub parent_id: Option<String>,
  /// city, area, block...
  pub kind: Option<String>,
  #[serde(flatten)]
  pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocation {
  pub name: String,
  pub parent_id: Option<String>,
  pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id: String,
  pub name: String,
  pub phone: Option<String>,
  pub email: Option<String>,
  pub kind: Option<String>,
  #[serde(flatten)]
  pub extra: Extra,
}

// ============================================================================
// Payload checks
// ============================================================================

impl crate::api::service::Payload for CreateDeal {
  fn validate(&self) -> Result<(), String> {
    if self.title.trim().is_empty() {
      return Err("Deal title is required".to_string());
    }
    validate_splits(&self.commission_splits)
  }
}

impl crate::api::service::Payload for UpdateDeal {
  fn validate(&self) -> Result<(), String> {
    match &self.commission_splits {
      Some(splits) => validate_splits(splits),
      None => Ok(()),
    }
  }
}

impl crate::api::service::Payload for CreateSellCycle {}
impl crate::api::service::Payload for UpdateSellCycle {}

impl crate::api::service::Payload for CreatePurchaseCycle {
  fn validate(&self) -> Result<(), String> {
    validate_splits(&self.investors)
  }
}

impl crate::api::service::Payload for UpdatePurchaseCycle {
  fn validate(&self) -> Result<(), String> {
    match &self.investors {
      Some(investors) => validate_splits(investors),
      None => Ok(()),
    }
  }
}

impl crate::api::service::Payload for CreateRentCycle {}
impl crate::api::service::Payload for UpdateRentCycle {}

impl crate::api::service::Payload for CreateRequirement {
  fn validate(&self) -> Result<(), String> {
    check_budget(self.min_budget, self.max_budget)
  }
}

impl crate::api::service::Payload for UpdateRequirement {
  fn validate(&self) -> Result<(), String> {
    check_budget(self.min_budget, self.max_budget)
  }
}

impl crate::api::service::Payload for CreateLocation {
  fn validate(&self) -> Result<(), String> {
    if self.name.trim().is_empty() {
      return Err("Location name is required".to_string());
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::service::Payload;

  fn split(party: &str, percentage: f64) -> ShareSplit {
    ShareSplit {
      party_id: party.to_string(),
      percentage,
    }
  }

  #[test]
  fn test_empty_split_is_valid() {
    assert!(validate_splits(&[]).is_ok());
  }

  #[test]
  fn test_split_must_total_hundred() {
    assert!(validate_splits(&[split("a", 60.0), split("b", 40.0)]).is_ok());
    assert!(validate_splits(&[split("a", 33.33), split("b", 33.33), split("c", 33.34)]).is_ok());

    let err = validate_splits(&[split("a", 60.0), split("b", 30.0)]).unwrap_err();
    assert!(err.contains("90.00"));
  }

  #[test]
  fn test_split_rejects_out_of_range_and_duplicates() {
    assert!(validate_splits(&[split("a", 0.0), split("b", 100.0)]).is_err());
    assert!(validate_splits(&[split("a", 150.0), split("b", -50.0)]).is_err());
    assert!(validate_splits(&[split("a", 50.0), split("a", 50.0)]).is_err());
  }

  #[test]
  fn test_create_deal_requires_title() {
    let deal = CreateDeal {
      title: "  ".to_string(),
      property_id: None,
      contact_id: None,
      agent_id: None,
      value: None,
      commission_splits: Vec::new(),
    };
    assert!(deal.validate().is_err());
  }

  #[test]
  fn test_requirement_budget_order() {
    let update = UpdateRequirement {
      min_budget: Some(5_000_000.0),
      max_budget: Some(1_000_000.0),
      ..UpdateRequirement::default()
    };
    assert!(update.validate().is_err());
  }

  #[test]
  fn test_deal_keeps_unknown_fields() {
    let json = r#"{"id":"deal-42","title":"Corner plot","stage":"negotiation","propertyId":"p-1","pipeline":"residential"}"#;
    let deal: Deal = serde_json::from_str(json).unwrap();

    assert_eq!(deal.id, "deal-42");
    assert_eq!(deal.property_id.as_deref(), Some("p-1"));
    assert_eq!(deal.extra.get("pipeline"), Some(&Value::from("residential")));

    let back = serde_json::to_value(&deal).unwrap();
    assert_eq!(back["pipeline"], "residential");
  }

  #[test]
  fn test_update_omits_unset_fields() {
    let update = UpdateDeal {
      stage: Some("closed".to_string()),
      ..UpdateDeal::default()
    };
    let json = serde_json::to_value(&update).unwrap();
    assert_eq!(json, serde_json::json!({ "stage": "closed" }));
  }
}

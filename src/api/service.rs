//! Resource service traits and their HTTP implementation.
//!
//! A resource service is the thin per-entity layer the cache talks to. The
//! cache is written against the traits so tests can swap in scripted services.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use tracing::debug;

use super::client::ApiClient;
use super::failure::Failure;

/// Trait for records served by the Aaraazi API.
///
/// Implementors describe where the collection lives and how to word a
/// failure that arrives without a reason.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
  /// Collection path segment (e.g., "deals")
  const SEGMENT: &'static str;

  /// Query parameter carrying the list filter (e.g., "agentId")
  const FILTER_PARAM: &'static str;

  /// Shown when a list fetch fails without a reason
  const LIST_FALLBACK: &'static str;

  /// Shown when a detail fetch fails without a reason
  const DETAIL_FALLBACK: &'static str;

  /// Unique identifier of this record
  fn id(&self) -> &str;
}

/// Request body checked before it leaves the client.
pub trait Payload: Serialize + Send + Sync {
  fn validate(&self) -> Result<(), String> {
    Ok(())
  }
}

/// Resources the backend lets the dashboard create.
pub trait Creatable: Resource {
  type Create: Payload;
}

/// Resources the backend lets the dashboard update.
pub trait Updatable: Resource {
  type Update: Payload;
}

/// Read side of a resource service.
#[async_trait]
pub trait ResourceService: Send + Sync + 'static {
  type Item: Clone + Send + Sync + 'static;

  fn list_fallback(&self) -> &str;

  fn detail_fallback(&self) -> &str;

  /// Fetch the collection, optionally narrowed by a filter value
  async fn find_all(&self, filter: Option<&str>) -> Result<Vec<Self::Item>, Failure>;

  /// Fetch one record by id
  async fn find_one(&self, id: &str) -> Result<Self::Item, Failure>;
}

#[async_trait]
pub trait CreateService: ResourceService {
  type CreateDto: Send + Sync;

  async fn create(&self, payload: &Self::CreateDto) -> Result<Self::Item, Failure>;
}

#[async_trait]
pub trait UpdateService: ResourceService {
  type UpdateDto: Send + Sync;

  async fn update(&self, id: &str, payload: &Self::UpdateDto) -> Result<Self::Item, Failure>;
}

/// Resource service backed by the HTTP API.
pub struct HttpService<R> {
  client: ApiClient,
  _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpService<R> {
  pub fn new(client: ApiClient) -> Self {
    Self {
      client,
      _resource: PhantomData,
    }
  }

  /// Query pairs for a list request; no filter means no parameter at all.
  fn list_params(filter: Option<&str>) -> Vec<(&'static str, &str)> {
    filter.map(|f| (R::FILTER_PARAM, f)).into_iter().collect()
  }
}

impl<R> Clone for HttpService<R> {
  fn clone(&self) -> Self {
    Self {
      client: self.client.clone(),
      _resource: PhantomData,
    }
  }
}

#[async_trait]
impl<R: Resource> ResourceService for HttpService<R> {
  type Item = R;

  fn list_fallback(&self) -> &str {
    R::LIST_FALLBACK
  }

  fn detail_fallback(&self) -> &str {
    R::DETAIL_FALLBACK
  }

  async fn find_all(&self, filter: Option<&str>) -> Result<Vec<R>, Failure> {
    self.client.get_json(&[R::SEGMENT], &Self::list_params(filter)).await
  }

  async fn find_one(&self, id: &str) -> Result<R, Failure> {
    self.client.get_json(&[R::SEGMENT, id], &[]).await
  }
}

#[async_trait]
impl<R: Creatable> CreateService for HttpService<R> {
  type CreateDto = R::Create;

  async fn create(&self, payload: &R::Create) -> Result<R, Failure> {
    payload.validate().map_err(Failure::invalid)?;
    let created: R = self.client.post_json(&[R::SEGMENT], payload).await?;
    debug!(resource = R::SEGMENT, id = created.id(), "created");
    Ok(created)
  }
}

#[async_trait]
impl<R: Updatable> UpdateService for HttpService<R> {
  type UpdateDto = R::Update;

  async fn update(&self, id: &str, payload: &R::Update) -> Result<R, Failure> {
    payload.validate().map_err(Failure::invalid)?;
    let updated: R = self.client.patch_json(&[R::SEGMENT, id], payload).await?;
    debug!(resource = R::SEGMENT, id = updated.id(), "updated");
    Ok(updated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::{Contact, CreateDeal, Deal, ShareSplit, UpdateDeal};
  use crate::config::{ApiConfig, Config};

  // Nothing listens on the discard port, so a request that did go out would
  // come back as a transport failure instead of an invalid payload.
  fn unreachable_service<R: Resource>() -> HttpService<R> {
    let config = Config {
      api: ApiConfig {
        url: "http://127.0.0.1:9/api/v1".to_string(),
        timeout_secs: 2,
        ..ApiConfig::default()
      },
      ..Config::default()
    };
    HttpService::new(ApiClient::new(&config).unwrap())
  }

  fn deal_payload(title: &str, splits: Vec<ShareSplit>) -> CreateDeal {
    CreateDeal {
      title: title.to_string(),
      property_id: None,
      contact_id: None,
      agent_id: Some("agent-7".to_string()),
      value: Some(12_500_000.0),
      commission_splits: splits,
    }
  }

  #[test]
  fn test_list_params_use_resource_filter() {
    assert_eq!(
      HttpService::<Deal>::list_params(Some("agent-7")),
      vec![("agentId", "agent-7")]
    );
    assert_eq!(
      HttpService::<Contact>::list_params(Some("ali")),
      vec![("search", "ali")]
    );
    assert!(HttpService::<Deal>::list_params(None).is_empty());
  }

  #[tokio::test]
  async fn test_create_rejects_blank_title_before_sending() {
    let service = unreachable_service::<Deal>();

    let err = service.create(&deal_payload("  ", Vec::new())).await.unwrap_err();

    assert!(matches!(err, Failure::Invalid { .. }), "got {:?}", err);
  }

  #[tokio::test]
  async fn test_create_rejects_bad_split_before_sending() {
    let service = unreachable_service::<Deal>();
    let splits = vec![
      ShareSplit {
        party_id: "agent-1".to_string(),
        percentage: 60.0,
      },
      ShareSplit {
        party_id: "agent-2".to_string(),
        percentage: 30.0,
      },
    ];

    let err = service.create(&deal_payload("Corner plot", splits)).await.unwrap_err();

    assert!(matches!(err, Failure::Invalid { .. }), "got {:?}", err);
    assert!(err.message().is_some_and(|m| m.contains("100")));
  }

  #[tokio::test]
  async fn test_update_rejects_bad_split_before_sending() {
    let service = unreachable_service::<Deal>();
    let payload = UpdateDeal {
      commission_splits: Some(vec![ShareSplit {
        party_id: "agent-1".to_string(),
        percentage: 0.0,
      }]),
      ..UpdateDeal::default()
    };

    let err = service.update("deal-42", &payload).await.unwrap_err();

    assert!(matches!(err, Failure::Invalid { .. }), "got {:?}", err);
  }
}

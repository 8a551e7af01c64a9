use crate::api::failure::Failure;
use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("aaraazi/", env!("CARGO_PKG_VERSION"));

/// Aaraazi API client wrapper
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Url,
  agency_id: Option<String>,
  token: Option<String>,
}

/// Payloads may come back bare or wrapped in a `data` envelope.
///
/// The bare shape is tried first: records keep unknown fields, so one that
/// carries its own `data` field must not be mistaken for an envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
  Bare(T),
  Wrapped { data: T },
}

impl<T> Envelope<T> {
  fn into_inner(self) -> T {
    match self {
      Envelope::Bare(data) => data,
      Envelope::Wrapped { data } => data,
    }
  }
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let mut base = Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid API url {}: {}", config.api.url, e))?;
    if base.cannot_be_a_base() {
      return Err(eyre!("API url {} cannot be used as a base", config.api.url));
    }
    // Drop a trailing slash so segments append cleanly
    if base.path().ends_with('/') {
      let trimmed = base.path().trim_end_matches('/').to_string();
      base.set_path(&trimmed);
    }

    let http = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      agency_id: config.api.agency_id.clone(),
      token: Config::get_api_token(),
    })
  }

  /// GET a JSON payload
  pub async fn get_json<T: DeserializeOwned>(
    &self,
    segments: &[&str],
    query: &[(&str, &str)],
  ) -> Result<T, Failure> {
    let url = self.endpoint(segments, query);
    self.send(self.request(Method::GET, url)).await
  }

  /// POST a JSON body and decode the JSON answer
  pub async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, Failure>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let url = self.endpoint(segments, &[]);
    self.send(self.request(Method::POST, url).json(body)).await
  }

  /// PATCH a JSON body and decode the JSON answer
  pub async fn patch_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, Failure>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let url = self.endpoint(segments, &[]);
    self.send(self.request(Method::PATCH, url).json(body)).await
  }

  /// Build the URL for a path below the base, percent-encoding each segment.
  pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query);
    }
    url
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    debug!(%method, %url, "api request");
    let mut builder = self.http.request(method, url);
    if let Some(agency) = &self.agency_id {
      builder = builder.header("X-Agency-Id", agency);
    }
    if let Some(token) = &self.token {
      builder = builder.bearer_auth(token);
    }
    builder
  }

  async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, Failure> {
    let response = builder.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(rejection(status, &body));
    }

    decode(&body)
  }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Failure> {
  serde_json::from_str::<Envelope<T>>(body)
    .map(Envelope::into_inner)
    .map_err(|e| Failure::Decode {
      reason: format!("Unexpected response from server: {}", e),
    })
}

/// Turn an error response into a failure, keeping the backend's own message.
///
/// Validation errors arrive with `message` as an array; the first entry is used.
fn rejection(status: StatusCode, body: &str) -> Failure {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Message {
    One(String),
    Many(Vec<String>),
  }

  #[derive(Deserialize)]
  struct ErrorBody {
    message: Option<Message>,
  }

  let message = serde_json::from_str::<ErrorBody>(body)
    .ok()
    .and_then(|b| b.message)
    .and_then(|m| match m {
      Message::One(s) => Some(s),
      Message::Many(v) => v.into_iter().next(),
    });

  Failure::Rejected {
    status: status.as_u16(),
    message,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::Deal;
  use crate::config::ApiConfig;

  fn client(url: &str) -> ApiClient {
    let config = Config {
      api: ApiConfig {
        url: url.to_string(),
        ..ApiConfig::default()
      },
      ..Config::default()
    };
    ApiClient::new(&config).unwrap()
  }

  #[test]
  fn test_endpoint_appends_segments() {
    let api = client("https://api.aaraazi.test/api/v1/");
    let url = api.endpoint(&["deals", "deal-42"], &[]);
    assert_eq!(url.as_str(), "https://api.aaraazi.test/api/v1/deals/deal-42");
  }

  #[test]
  fn test_endpoint_encodes_ids_and_query() {
    let api = client("https://api.aaraazi.test/api/v1");
    let url = api.endpoint(&["contacts"], &[("search", "ali & sons")]);
    assert_eq!(
      url.as_str(),
      "https://api.aaraazi.test/api/v1/contacts?search=ali+%26+sons"
    );

    let url = api.endpoint(&["deals", "a/b"], &[]);
    assert_eq!(url.as_str(), "https://api.aaraazi.test/api/v1/deals/a%2Fb");
  }

  #[test]
  fn test_invalid_base_url_rejected() {
    let config = Config {
      api: ApiConfig {
        url: "not a url".to_string(),
        ..ApiConfig::default()
      },
      ..Config::default()
    };
    assert!(ApiClient::new(&config).is_err());
  }

  #[test]
  fn test_decode_bare_and_wrapped() {
    let bare: Vec<u32> = decode("[1, 2]").unwrap();
    assert_eq!(bare, vec![1, 2]);

    let wrapped: Vec<u32> = decode(r#"{"data": [3]}"#).unwrap();
    assert_eq!(wrapped, vec![3]);

    let err = decode::<Vec<u32>>(r#"{"nope": true}"#).unwrap_err();
    assert!(matches!(err, Failure::Decode { .. }));
  }

  #[test]
  fn test_decode_keeps_record_with_own_data_field() {
    let deal: Deal =
      decode(r#"{"id":"deal-42","title":"Corner plot","data":{"id":"x"}}"#).unwrap();
    assert_eq!(deal.id, "deal-42");
    assert_eq!(deal.title, "Corner plot");
    assert_eq!(deal.extra.get("data"), Some(&serde_json::json!({"id": "x"})));

    let wrapped: Deal = decode(r#"{"data":{"id":"deal-7","title":"Shop"}}"#).unwrap();
    assert_eq!(wrapped.id, "deal-7");
    assert!(wrapped.extra.is_empty());
  }

  #[test]
  fn test_rejection_extracts_message() {
    let failure = rejection(
      StatusCode::NOT_FOUND,
      r#"{"statusCode":404,"message":"Deal not found"}"#,
    );
    assert_eq!(failure.status(), Some(404));
    assert_eq!(failure.message(), Some("Deal not found"));
  }

  #[test]
  fn test_rejection_takes_first_validation_message() {
    let failure = rejection(
      StatusCode::BAD_REQUEST,
      r#"{"message":["title should not be empty","value must be positive"]}"#,
    );
    assert_eq!(failure.message(), Some("title should not be empty"));
  }

  #[test]
  fn test_rejection_without_body_has_no_message() {
    let failure = rejection(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
    assert_eq!(failure.status(), Some(502));
    assert_eq!(failure.message(), None);
  }
}

//! Failure type produced at the HTTP boundary.

use thiserror::Error;

/// Why a request to the Aaraazi API did not produce a payload.
///
/// Every variant carries an optional human-readable reason. The cache only
/// ever asks for [`Failure::message`] and substitutes its own fallback text
/// when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
  /// The request never completed (offline, timeout, connection reset)
  #[error("{reason}")]
  Transport { reason: String },
  /// The backend answered with a non-success status
  #[error("request rejected with status {status}{}", detail(.message))]
  Rejected {
    status: u16,
    message: Option<String>,
  },
  /// The response body did not match the expected payload
  #[error("{reason}")]
  Decode { reason: String },
  /// The payload was refused before being sent
  #[error("{reason}")]
  Invalid { reason: String },
}

fn detail(message: &Option<String>) -> String {
  message
    .as_deref()
    .map(|m| format!(": {}", m))
    .unwrap_or_default()
}

impl Failure {
  pub fn transport(reason: impl Into<String>) -> Self {
    Self::Transport {
      reason: reason.into(),
    }
  }

  pub fn invalid(reason: impl Into<String>) -> Self {
    Self::Invalid {
      reason: reason.into(),
    }
  }

  /// The reason to show a user, if the failure carries one.
  pub fn message(&self) -> Option<&str> {
    let reason = match self {
      Self::Transport { reason } | Self::Decode { reason } | Self::Invalid { reason } => {
        Some(reason.as_str())
      }
      Self::Rejected { message, .. } => message.as_deref(),
    };
    reason.filter(|r| !r.trim().is_empty())
  }

  /// HTTP status for rejected requests.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Rejected { status, .. } => Some(*status),
      _ => None,
    }
  }
}

impl From<reqwest::Error> for Failure {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      Self::Decode {
        reason: e.to_string(),
      }
    } else if e.is_timeout() {
      Self::transport("Request timed out")
    } else {
      Self::transport(e.to_string())
    }
  }
}

//! List cache keys.

/// Key of a list entry: the whole collection, or the collection narrowed by
/// one filter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListKey {
  Unfiltered,
  FilteredBy(String),
}

impl ListKey {
  /// `None` is the unfiltered list. An empty string is still a filter value.
  pub fn from_filter(filter: Option<&str>) -> Self {
    match filter {
      Some(param) => Self::FilteredBy(param.to_string()),
      None => Self::Unfiltered,
    }
  }

  /// Stable string form used as the map key.
  ///
  /// Filtered keys are always prefixed, so no filter value can encode to
  /// the unfiltered key.
  pub fn encode(&self) -> String {
    match self {
      Self::Unfiltered => "all".to_string(),
      Self::FilteredBy(param) => format!("by:{}", param),
    }
  }

  pub fn param(&self) -> Option<&str> {
    match self {
      Self::Unfiltered => None,
      Self::FilteredBy(param) => Some(param),
    }
  }
}

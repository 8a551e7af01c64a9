/// Resource names accepted on the command line, with aliases and matching

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
  Deals,
  SellCycles,
  PurchaseCycles,
  RentCycles,
  Requirements,
  Locations,
  Contacts,
}

#[derive(Debug, Clone)]
pub struct ResourceCommand {
  pub kind: ResourceKind,
  pub name: &'static str,
  pub aliases: &'static [&'static str],
}

/// All resources the CLI can address
pub const RESOURCES: &[ResourceCommand] = &[
  ResourceCommand {
    kind: ResourceKind::Deals,
    name: "deals",
    aliases: &["d", "deal"],
  },
  ResourceCommand {
    kind: ResourceKind::SellCycles,
    name: "sell-cycles",
    aliases: &["sc", "sell", "sell-cycle"],
  },
  ResourceCommand {
    kind: ResourceKind::PurchaseCycles,
    name: "purchase-cycles",
    aliases: &["pc", "purchase", "purchase-cycle"],
  },
  ResourceCommand {
    kind: ResourceKind::RentCycles,
    name: "rent-cycles",
    aliases: &["rc", "rent", "rent-cycle"],
  },
  ResourceCommand {
    kind: ResourceKind::Requirements,
    name: "requirements",
    aliases: &["r", "req", "requirement"],
  },
  ResourceCommand {
    kind: ResourceKind::Locations,
    name: "locations",
    aliases: &["l", "loc", "location"],
  },
  ResourceCommand {
    kind: ResourceKind::Contacts,
    name: "contacts",
    aliases: &["c", "contact"],
  },
];

impl ResourceKind {
  pub fn name(self) -> &'static str {
    RESOURCES
      .iter()
      .find(|r| r.kind == self)
      .map(|r| r.name)
      .unwrap_or("unknown")
  }
}

impl ResourceCommand {
  /// How well `input` (already lowercased) names this resource; lower is
  /// better, `None` is no match.
  fn rank(&self, input: &str) -> Option<u8> {
    let aliases = || self.aliases.iter();
    if self.name == input {
      Some(0)
    } else if aliases().any(|a| *a == input) {
      Some(1)
    } else if self.name.starts_with(input) {
      Some(2)
    } else if aliases().any(|a| a.starts_with(input)) {
      Some(3)
    } else if self.name.contains(input) {
      Some(4)
    } else {
      None
    }
  }
}

/// Resources matching `input`, best first. Blank input matches everything.
pub fn candidates(input: &str) -> Vec<(&'static ResourceCommand, u8)> {
  let input = input.trim().to_lowercase();
  let mut ranked: Vec<_> = RESOURCES
    .iter()
    .filter_map(|cmd| cmd.rank(&input).map(|rank| (cmd, rank)))
    .collect();
  ranked.sort_by_key(|(_, rank)| *rank);
  ranked
}

/// Resolve user input to a resource.
///
/// Exact names and aliases always win. Anything looser must be unambiguous;
/// otherwise the candidates are listed in the error.
pub fn resolve(input: &str) -> Result<ResourceKind, String> {
  match candidates(input).as_slice() {
    [] => Err(format!(
      "Unknown resource '{}'. Available: {}",
      input,
      names(RESOURCES.iter())
    )),
    [(best, rank), ..] if *rank <= 1 => Ok(best.kind),
    [(only, _)] => Ok(only.kind),
    many => Err(format!(
      "Ambiguous resource '{}'. Did you mean: {}",
      input,
      names(many.iter().map(|(cmd, _)| *cmd))
    )),
  }
}

fn names<'a>(commands: impl Iterator<Item = &'a ResourceCommand>) -> String {
  commands.map(|c| c.name).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_blank_input_matches_everything() {
    assert_eq!(candidates("  ").len(), RESOURCES.len());
  }

  #[test]
  fn test_exact_name_ranks_first() {
    let ranked = candidates("deals");
    assert_eq!(ranked[0].0.name, "deals");
    assert_eq!(ranked[0].1, 0);
  }

  #[test]
  fn test_exact_alias_beats_prefixes() {
    // "r" is an alias of requirements and a prefix of rent-cycles
    assert_eq!(resolve("r"), Ok(ResourceKind::Requirements));
  }

  #[test]
  fn test_alias_match() {
    assert_eq!(resolve("sc"), Ok(ResourceKind::SellCycles));
    assert_eq!(resolve("Rent"), Ok(ResourceKind::RentCycles));
  }

  #[test]
  fn test_unique_prefix_resolves() {
    assert_eq!(resolve("purch"), Ok(ResourceKind::PurchaseCycles));
    assert_eq!(resolve("loca"), Ok(ResourceKind::Locations));
  }

  #[test]
  fn test_ambiguous_input_lists_candidates() {
    // "re" prefixes requirements and rent-cycles
    let err = resolve("re").unwrap_err();
    assert!(err.contains("requirements"));
    assert!(err.contains("rent-cycles"));
  }

  #[test]
  fn test_unknown_resource() {
    let err = resolve("properties").unwrap_err();
    assert!(err.starts_with("Unknown resource"));
  }

  #[test]
  fn test_kind_name() {
    assert_eq!(ResourceKind::PurchaseCycles.name(), "purchase-cycles");
  }
}

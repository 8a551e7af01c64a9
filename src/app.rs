use crate::api::{ApiClient, CreateService, ResourceService, UpdateService};
use crate::cache::{CacheEntry, EntryStatus, ResourceCache};
use crate::commands::{self, ResourceKind};
use crate::config::Config;
use crate::stores::Stores;
use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use futures::future::{join_all, BoxFuture, FutureExt};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// What to do against the API
#[derive(Debug, Clone, Subcommand)]
pub enum Action {
  /// List records, optionally narrowed by the resource's filter
  List {
    /// Resource name or alias (deals, sc, rent, ...)
    resource: String,
    /// Filter value (agent id for deals, property id for cycles, search text for contacts)
    #[arg(short, long)]
    filter: Option<String>,
  },
  /// Show one record
  Show { resource: String, id: String },
  /// Create a record from a JSON file
  Create {
    resource: String,
    #[arg(short = 'F', long)]
    file: PathBuf,
  },
  /// Update a record from a JSON file
  Update {
    resource: String,
    id: String,
    #[arg(short = 'F', long)]
    file: PathBuf,
  },
  /// Count every resource's unfiltered list
  Summary,
}

/// Main application state
pub struct App {
  stores: Stores,
}

impl App {
  pub fn new(config: &Config) -> Result<Self> {
    let client = ApiClient::new(config)?;
    Ok(Self {
      stores: Stores::new(client),
    })
  }

  /// Run one action and return the text to print.
  pub async fn run(&self, action: Action) -> Result<String> {
    match action {
      Action::List { resource, filter } => {
        let filter = filter.as_deref();
        match resolve(&resource)? {
          ResourceKind::Deals => list(&self.stores.deals, filter).await,
          ResourceKind::SellCycles => list(&self.stores.sell_cycles, filter).await,
          ResourceKind::PurchaseCycles => list(&self.stores.purchase_cycles, filter).await,
          ResourceKind::RentCycles => list(&self.stores.rent_cycles, filter).await,
          ResourceKind::Requirements => list(&self.stores.requirements, filter).await,
          ResourceKind::Locations => list(&self.stores.locations, filter).await,
          ResourceKind::Contacts => list(&self.stores.contacts, filter).await,
        }
      }
      Action::Show { resource, id } => match resolve(&resource)? {
        ResourceKind::Deals => show(&self.stores.deals, &id).await,
        ResourceKind::SellCycles => show(&self.stores.sell_cycles, &id).await,
        ResourceKind::PurchaseCycles => show(&self.stores.purchase_cycles, &id).await,
        ResourceKind::RentCycles => show(&self.stores.rent_cycles, &id).await,
        ResourceKind::Requirements => show(&self.stores.requirements, &id).await,
        ResourceKind::Locations => show(&self.stores.locations, &id).await,
        ResourceKind::Contacts => show(&self.stores.contacts, &id).await,
      },
      Action::Create { resource, file } => match resolve(&resource)? {
        ResourceKind::Deals => create(&self.stores.deals, &file).await,
        ResourceKind::SellCycles => create(&self.stores.sell_cycles, &file).await,
        ResourceKind::PurchaseCycles => create(&self.stores.purchase_cycles, &file).await,
        ResourceKind::RentCycles => create(&self.stores.rent_cycles, &file).await,
        ResourceKind::Requirements => create(&self.stores.requirements, &file).await,
        ResourceKind::Locations => create(&self.stores.locations, &file).await,
        kind @ ResourceKind::Contacts => Err(unsupported(kind, "create")),
      },
      Action::Update { resource, id, file } => match resolve(&resource)? {
        ResourceKind::Deals => update(&self.stores.deals, &id, &file).await,
        ResourceKind::SellCycles => update(&self.stores.sell_cycles, &id, &file).await,
        ResourceKind::PurchaseCycles => update(&self.stores.purchase_cycles, &id, &file).await,
        ResourceKind::RentCycles => update(&self.stores.rent_cycles, &id, &file).await,
        ResourceKind::Requirements => update(&self.stores.requirements, &id, &file).await,
        kind @ (ResourceKind::Locations | ResourceKind::Contacts) => {
          Err(unsupported(kind, "update"))
        }
      },
      Action::Summary => Ok(self.summary().await),
    }
  }

  /// Load every unfiltered list at once and report one line per resource.
  async fn summary(&self) -> String {
    let s = &self.stores;
    let tasks: Vec<BoxFuture<'_, (ResourceKind, CacheEntry<usize>)>> = vec![
      count(ResourceKind::Deals, &s.deals).boxed(),
      count(ResourceKind::SellCycles, &s.sell_cycles).boxed(),
      count(ResourceKind::PurchaseCycles, &s.purchase_cycles).boxed(),
      count(ResourceKind::RentCycles, &s.rent_cycles).boxed(),
      count(ResourceKind::Requirements, &s.requirements).boxed(),
      count(ResourceKind::Locations, &s.locations).boxed(),
      count(ResourceKind::Contacts, &s.contacts).boxed(),
    ];

    join_all(tasks)
      .await
      .iter()
      .map(|(kind, entry)| summary_line(*kind, entry))
      .collect::<Vec<_>>()
      .join("\n")
  }
}

fn resolve(input: &str) -> Result<ResourceKind> {
  commands::resolve(input).map_err(|e| eyre!(e))
}

fn unsupported(kind: ResourceKind, action: &str) -> color_eyre::Report {
  eyre!("{} does not support {}", kind.name(), action)
}

fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
  serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to render output: {}", e))
}

fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let contents = std::fs::read_to_string(path)
    .map_err(|e| eyre!("Failed to read payload {}: {}", path.display(), e))?;
  serde_json::from_str(&contents)
    .map_err(|e| eyre!("Failed to parse payload {}: {}", path.display(), e))
}

async fn list<S>(cache: &Arc<ResourceCache<S>>, filter: Option<&str>) -> Result<String>
where
  S: ResourceService,
  S::Item: Serialize,
{
  let mut query = cache.list_query(filter, true);
  let entry = query.settled().await;
  match entry.error {
    Some(error) => Err(eyre!(error)),
    None => render(&entry.data),
  }
}

async fn show<S>(cache: &Arc<ResourceCache<S>>, id: &str) -> Result<String>
where
  S: ResourceService,
  S::Item: Serialize,
{
  let mut query = cache.detail_query(id, true);
  if !query.is_enabled() {
    return Err(eyre!("An id is required"));
  }
  let entry = query.settled().await;
  match (entry.error, entry.data) {
    (Some(error), _) => Err(eyre!(error)),
    (None, Some(item)) => render(&item),
    (None, None) => Err(eyre!("{} not found", id)),
  }
}

async fn create<S>(cache: &Arc<ResourceCache<S>>, file: &Path) -> Result<String>
where
  S: CreateService,
  S::Item: Serialize,
  S::CreateDto: DeserializeOwned,
{
  let payload: S::CreateDto = read_payload(file)?;
  let created = cache.create(&payload).await?;
  if let Some(list) = cache.list_entry(None) {
    info!(count = list.data.len(), "list reconciled after create");
  }
  render(&created)
}

async fn update<S>(cache: &Arc<ResourceCache<S>>, id: &str, file: &Path) -> Result<String>
where
  S: UpdateService,
  S::Item: Serialize,
  S::UpdateDto: DeserializeOwned,
{
  let payload: S::UpdateDto = read_payload(file)?;
  let updated = cache.update(id, &payload).await?;
  render(&updated)
}

async fn count<S: ResourceService>(
  kind: ResourceKind,
  cache: &Arc<ResourceCache<S>>,
) -> (ResourceKind, CacheEntry<usize>) {
  let mut query = cache.list_query(None, true);
  let entry = query.settled().await;
  let counted = CacheEntry {
    data: entry.data.len(),
    is_loading: entry.is_loading,
    error: entry.error,
  };
  (kind, counted)
}

fn summary_line(kind: ResourceKind, entry: &CacheEntry<usize>) -> String {
  let status = match entry.status() {
    EntryStatus::Ready => entry.data.to_string(),
    EntryStatus::Failed => format!("error: {}", entry.error.as_deref().unwrap_or("unknown")),
    EntryStatus::Loading => "loading".to_string(),
    EntryStatus::Idle => "-".to_string(),
  };
  format!("{:<16} {}", kind.name(), status)
}

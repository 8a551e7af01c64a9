use aaraazi::{app, config, logging};
use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aaraazi")]
#[command(about = "Command-line dashboard for the Aaraazi agency API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/aaraazi/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// API base URL, overriding the config file
  #[arg(long)]
  api_url: Option<String>,

  /// Agency (tenant) id to act for
  #[arg(short, long)]
  agency: Option<String>,

  #[command(subcommand)]
  action: app::Action,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command line wins over the file
  if let Some(url) = args.api_url {
    config.api.url = url;
  }
  if let Some(agency) = args.agency {
    config.api.agency_id = Some(agency);
  }

  let _log_guard = logging::init(&config.log)?;

  let app = app::App::new(&config)?;
  let output = app.run(args.action).await?;
  println!("{}", output);

  Ok(())
}

mod app;
mod config;
mod event;
mod github;
mod logging;
mod project;
mod state;
mod store;
mod sync;
mod ui;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, SourceKind};
use crate::github::{BuiltinSource, GithubClient, ProjectSource};
use crate::logging::LogTarget;
use crate::project::Project;
use crate::sync::SyncCoordinator;

#[derive(Parser, Debug)]
#[command(name = "cardfolio")]
#[command(about = "A terminal business card with a cached list of your GitHub projects")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/cardfolio/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// GitHub account whose repositories are listed
  #[arg(short, long)]
  account: Option<String>,

  /// Use the built-in catalog instead of GitHub
  #[arg(long)]
  builtin: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch the account's repositories once and update the cache
  Sync,
  /// Print cached projects
  List,
  /// Print one cached project
  Show {
    /// Project id
    id: i64,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let target = match args.command {
    Some(_) => LogTarget::Stderr,
    None => LogTarget::File,
  };
  let _log_guard = logging::init(target)?;

  let mut config = Config::load(args.config.as_deref())?;

  if let Some(account) = args.account {
    config.source.account = account;
  }
  if args.builtin {
    config.source.kind = SourceKind::Builtin;
  }

  let account = config.source.effective_account().to_string();
  if account.is_empty() {
    return Err(eyre!("No account configured; set source.account or pass --account"));
  }

  let store = config.open_store()?;

  let source: Arc<dyn ProjectSource> = match config.source.kind {
    SourceKind::Github => Arc::new(GithubClient::new(
      &config.source.api_url,
      config.source.timeout(),
    )?),
    SourceKind::Builtin => Arc::new(BuiltinSource),
  };

  info!(account = %account, source = source.label(), "Starting");
  let coordinator = Arc::new(SyncCoordinator::new(source, store, account));

  // The built-in catalog is not persisted, so headless reads load it first
  if config.source.kind == SourceKind::Builtin
    && matches!(args.command, Some(Command::List | Command::Show { .. }))
  {
    coordinator.sync().await?;
  }

  match args.command {
    Some(Command::Sync) => {
      let report = coordinator.sync().await?;
      println!(
        "Synced {} projects for {} from {}",
        report.stamp.count,
        report.stamp.account,
        report.source
      );
    }
    Some(Command::List) => {
      let projects = coordinator.store().list_all()?;
      if projects.is_empty() {
        println!("No cached projects; run `cardfolio sync` first.");
      }
      for project in &projects {
        print_project_line(project);
      }
    }
    Some(Command::Show { id }) => {
      let project = coordinator
        .store()
        .get_by_id(id)?
        .ok_or_else(|| eyre!("Project {} is not in the cache", id))?;
      println!("{}", project.name);
      println!("  id:          {}", project.id);
      println!(
        "  description: {}",
        project.description.as_deref().unwrap_or("-")
      );
    }
    None => {
      let mut app = app::App::new(config.profile, coordinator);
      app.run().await?;
    }
  }

  Ok(())
}

fn print_project_line(project: &Project) {
  println!(
    "{:>12}  {:<32}  {}",
    project.id,
    project.name,
    project.description.as_deref().unwrap_or("")
  );
}

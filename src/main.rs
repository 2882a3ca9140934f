mod output;

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use specs_browser::config::Config;
use specs_browser::filter::{KNOWN_STATUSES, KNOWN_TYPES};
use specs_browser::logging;
use specs_browser::specs::{LookupKind, SpecsClient};
use specs_browser::view_state::DEFAULT_LIMIT;
use specs_browser::{
  MemoryNavigation, OrderBy, SpecsSession, UrlCodec, UrlStateStore, ViewStatePatch,
};

#[derive(Parser, Debug)]
#[command(name = "specs")]
#[command(about = "Browse a specification catalog with shareable, URL-backed filters")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/specs-browser/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Base URL of the specs service (overrides config and SPECS_API_URL)
  #[arg(long)]
  api_url: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Fetch and print matching specs
  List {
    /// Query string of a shared view, e.g. "team=Server&status=Active"
    query: Option<String>,

    #[command(flatten)]
    filters: FilterArgs,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: usize,
  },
  /// Print the canonical query string for a view without fetching
  Url {
    query: Option<String>,

    #[command(flatten)]
    filters: FilterArgs,
  },
  /// Print the author, team and reviewer lists
  Lookups,
  /// Print the known statuses, types and sort orders
  Choices,
}

#[derive(ClapArgs, Debug, Default)]
struct FilterArgs {
  #[arg(long)]
  team: Option<String>,
  /// May be repeated
  #[arg(long = "status")]
  statuses: Vec<String>,
  /// May be repeated
  #[arg(long = "type")]
  types: Vec<String>,
  #[arg(long)]
  author: Option<String>,
  #[arg(long)]
  reviewer: Option<String>,
  #[arg(long)]
  order_by: Option<OrderBy>,
  #[arg(long)]
  search: Option<String>,
}

impl FilterArgs {
  /// Only the flags that were given; everything else keeps the decoded value.
  fn to_patch(&self) -> ViewStatePatch {
    let mut patch = ViewStatePatch::new();
    if let Some(team) = &self.team {
      patch = patch.team(Some(team.as_str()));
    }
    if !self.statuses.is_empty() {
      patch = patch.statuses(self.statuses.iter().map(String::as_str));
    }
    if !self.types.is_empty() {
      patch = patch.types(self.types.iter().map(String::as_str));
    }
    if let Some(author) = &self.author {
      patch = patch.author(Some(author.as_str()));
    }
    if let Some(reviewer) = &self.reviewer {
      patch = patch.reviewer(Some(reviewer.as_str()));
    }
    if let Some(order_by) = self.order_by {
      patch = patch.order_by(order_by);
    }
    if let Some(search) = &self.search {
      patch = patch.search(Some(search.as_str()));
    }
    patch
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  match args.command {
    Commands::List {
      ref query,
      ref filters,
      pages,
    } => {
      let config = Config::load(args.config.as_deref())?.with_api_url(args.api_url.clone())?;
      let _guard = logging::init(&config.log)?;
      list(&config, query.as_deref().unwrap_or(""), filters, pages).await
    }
    Commands::Url {
      ref query,
      ref filters,
    } => {
      let page_size = Config::load(args.config.as_deref())
        .map(|c| c.page_size)
        .unwrap_or(DEFAULT_LIMIT);
      let mut store = UrlStateStore::initialize(
        MemoryNavigation::new(query.as_deref().unwrap_or("")),
        UrlCodec::new(page_size),
      );
      store.update(&filters.to_patch());
      println!("{}", store.query_string());
      Ok(())
    }
    Commands::Lookups => {
      let config = Config::load(args.config.as_deref())?.with_api_url(args.api_url.clone())?;
      let _guard = logging::init(&config.log)?;
      lookups(&config).await
    }
    Commands::Choices => {
      print_choices();
      Ok(())
    }
  }
}

async fn list(config: &Config, query: &str, filters: &FilterArgs, pages: usize) -> Result<()> {
  let api = Arc::new(SpecsClient::new(config)?);
  let mut session = SpecsSession::start(api, MemoryNavigation::new(query), config.page_size);

  let patch = filters.to_patch();
  if !patch.is_empty() {
    session.update(&patch);
  }
  session.settle().await;

  let mut loaded = 1;
  while loaded < pages && session.engine().has_more() && session.engine().error().is_none() {
    if !session.fetch_next_page() {
      break;
    }
    session.settle().await;
    loaded += 1;
  }
  info!(pages = loaded, "listing finished");

  let engine = session.engine();
  println!("{} specs", engine.total());
  for spec in engine.specs() {
    println!("{}", output::format_spec_line(spec));
  }
  if let Some(e) = engine.error() {
    println!("Error loading specs: {}", e);
  }
  if engine.has_more() && engine.error().is_none() {
    println!("(more available, use --pages to load further)");
  }
  println!();
  println!(
    "{}",
    output::view_footer(config.web_url.as_deref(), &session.store().query_string())
  );
  Ok(())
}

async fn lookups(config: &Config) -> Result<()> {
  let api = Arc::new(SpecsClient::new(config)?);
  let mut session = SpecsSession::start(api, MemoryNavigation::new(""), config.page_size);
  session.load_lookups();
  session.settle().await;

  for kind in LookupKind::all_variants() {
    let list = session.lookups().get(*kind);
    println!("{} ({})", kind.path(), list.len());
    for value in list {
      println!("  {}", value);
    }
  }
  Ok(())
}

fn print_choices() {
  println!("status:");
  for status in KNOWN_STATUSES {
    println!("  {}", status);
  }
  println!("type:");
  for spec_type in KNOWN_TYPES {
    println!("  {}", spec_type);
  }
  println!("orderBy:");
  for order in OrderBy::all_variants() {
    println!("  {}", order);
  }
}

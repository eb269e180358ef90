use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use noi_feed::config::Config;
use noi_feed::content::{Article, ContentClient, Event, RoomMapping};
use noi_feed::feed::{FeedController, FeedSource, FeedState, FetchOutcome};
use noi_feed::filter::{FacetOption, FilterFacet};
use noi_feed::{logging, transport};

#[derive(Parser, Debug)]
#[command(name = "noi-feed")]
#[command(about = "Browse NOI Techpark events and news from the Open Data Hub")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/noi-feed/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Content language, overrides the config file
  #[arg(short, long)]
  language: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List upcoming events, highlighted ones first
  Events(FeedArgs),
  /// List news articles, highlighted ones first
  News(FeedArgs),
  /// List the facets available to --filter
  Filters {
    #[arg(value_enum)]
    feed: FeedKind,
  },
  /// Show a single event
  Event { id: String },
  /// Show a single article
  Article { id: String },
}

#[derive(clap::Args, Debug)]
struct FeedArgs {
  /// Facet to filter on as Category=key, repeatable
  #[arg(short, long = "filter")]
  filters: Vec<FilterFacet>,

  /// Number of pages to load
  #[arg(short, long, default_value_t = 1)]
  pages: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FeedKind {
  Events,
  News,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Override language if specified on command line
  let config = if let Some(language) = args.language {
    Config { language, ..config }
  } else {
    config
  };

  let _log_guard = logging::init(&config.logging)?;

  let token = Config::get_api_token();
  let transport = transport::standard(&config.http, token.as_deref())?;
  let client = ContentClient::new(transport, &config)?;

  match args.command {
    Command::Events(feed_args) => {
      let feed = client.event_feed()?;
      load_pages(&feed, &feed_args).await?;
      let rooms = room_mapping(&client).await;
      print_events(&feed.snapshot(), &rooms, client.language());
    }
    Command::News(feed_args) => {
      let feed = client.news_feed()?;
      load_pages(&feed, &feed_args).await?;
      print_articles(&feed.snapshot(), client.language());
    }
    Command::Filters { feed } => {
      let options = match feed {
        FeedKind::Events => client.event_filters().await?,
        FeedKind::News => client.news_tags().await?,
      };
      print_facets(&options);
    }
    Command::Event { id } => {
      let event = client.event(&id).await?;
      let rooms = room_mapping(&client).await;
      print_event_detail(&event, &rooms, client.language());
    }
    Command::Article { id } => {
      let article = client.article(&id).await?;
      print_article_detail(&article, client.language());
    }
  }

  Ok(())
}

/// Refresh the feed, then keep fetching until `pages` pages are in.
async fn load_pages<S: FeedSource>(feed: &FeedController<S>, args: &FeedArgs) -> Result<()> {
  feed.set_active_filters(args.filters.iter().cloned());

  let mut outcome = feed.refresh().await;
  for _ in 1..args.pages {
    if outcome != FetchOutcome::Applied || !feed.has_next_page() {
      break;
    }
    outcome = feed.fetch().await;
  }

  match (outcome, feed.error()) {
    (FetchOutcome::Failed, Some(err)) if feed.items().is_empty() => {
      Err(eyre!("Failed to load feed: {}", err))
    }
    (_, Some(err)) => {
      warn!(error = %err, "feed stopped early");
      Ok(())
    }
    _ => Ok(()),
  }
}

// Room names are cosmetic, fall back to raw codes
async fn room_mapping(client: &ContentClient) -> Arc<RoomMapping> {
  match client.room_mapping().await {
    Ok(rooms) => rooms,
    Err(err) => {
      warn!(error = %err, "room mapping unavailable");
      Arc::new(RoomMapping::default())
    }
  }
}

fn marker(highlighted: bool) -> &'static str {
  if highlighted {
    "*"
  } else {
    " "
  }
}

fn print_footer<T>(state: &FeedState<T>) {
  match state.total_result_count {
    Some(total) => println!("\n{} of {} shown", state.items.len(), total),
    None => println!("\n{} shown, more available", state.items.len()),
  }
}

fn print_events(state: &FeedState<Event>, rooms: &RoomMapping, language: &str) {
  for event in &state.items {
    let start = event
      .start
      .map(|s| s.format("%Y-%m-%d %H:%M").to_string())
      .unwrap_or_else(|| "-".repeat(16));
    let place = event
      .room_names(rooms)
      .first()
      .cloned()
      .or_else(|| event.venue.clone())
      .unwrap_or_default();
    println!(
      "{} {}  {:<40}  {}  [{}]",
      marker(event.highlighted),
      start,
      event.title.get(language).unwrap_or("(untitled)"),
      place,
      event.id
    );
  }
  print_footer(state);
}

fn print_articles(state: &FeedState<Article>, language: &str) {
  for article in &state.items {
    let published = article
      .published
      .map(|p| p.format("%Y-%m-%d").to_string())
      .unwrap_or_else(|| "-".repeat(10));
    println!(
      "{} {}  {}  [{}]",
      marker(article.highlighted),
      published,
      article.title.get(language).unwrap_or("(untitled)"),
      article.id
    );
  }
  print_footer(state);
}

fn print_facets(options: &[FacetOption]) {
  for option in options {
    println!("{}={}  ({})", option.facet.category, option.facet.key, option.label);
  }
}

fn print_event_detail(event: &Event, rooms: &RoomMapping, language: &str) {
  println!("{}", event.title.get(language).unwrap_or("(untitled)"));
  if let Some(start) = event.start {
    let end = event
      .end
      .map(|e| format!(" - {}", e.format("%Y-%m-%d %H:%M")))
      .unwrap_or_default();
    println!("When:      {}{}", start.format("%Y-%m-%d %H:%M"), end);
  }
  let room_names = event.room_names(rooms);
  if !room_names.is_empty() {
    println!("Rooms:     {}", room_names.join(", "));
  } else if let Some(venue) = &event.venue {
    println!("Where:     {}", venue);
  }
  if let Some(organizer) = &event.organizer {
    println!("Organizer: {}", organizer);
  }
  if let Some(web) = &event.web_address {
    println!("Web:       {}", web);
  }
  let tags: Vec<&str> = event
    .custom_tags
    .iter()
    .chain(&event.technology_fields)
    .map(String::as_str)
    .collect();
  if !tags.is_empty() {
    println!("Tags:      {}", tags.join(", "));
  }
  if let Some(text) = event.text.get(language) {
    println!("\n{}", text);
  }
}

fn print_article_detail(article: &Article, language: &str) {
  println!("{}", article.title.get(language).unwrap_or("(untitled)"));
  if let Some(published) = article.published {
    println!("Published: {}", published.format("%Y-%m-%d"));
  }
  if let Some(author) = article.author.get(language) {
    println!("Author:    {}", author);
  }
  if let Some(email) = &article.contact_email {
    println!("Contact:   {}", email);
  }
  if let Some(summary) = article.summary.get(language) {
    println!("\n{}", summary);
  }
  if let Some(body) = article.body.get(language) {
    println!("\n{}", body);
  }
  for url in &article.image_urls {
    println!("Image:     {}", url);
  }
}

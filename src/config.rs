use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_BASE_URL: &str = "https://tourism.api.opendatahub.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub events: EventsConfig,
  #[serde(default)]
  pub news: NewsConfig,
  #[serde(default)]
  pub http: HttpConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
  /// Preferred content language (falls back to English, then any)
  #[serde(default = "default_language")]
  pub language: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      events: EventsConfig::default(),
      news: NewsConfig::default(),
      http: HttpConfig::default(),
      logging: LoggingConfig::default(),
      language: default_language(),
    }
  }
}

fn default_language() -> String {
  "en".to_string()
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_event_page_size")]
  pub page_size: u32,
  /// Value of the `eventlocation` parameter
  #[serde(default = "default_location")]
  pub location: Option<String>,
  /// Restrict returned fields (comma separated on the wire)
  #[serde(default)]
  pub fields: Vec<String>,
}

fn default_event_page_size() -> u32 {
  25
}

fn default_location() -> Option<String> {
  Some("NOI".to_string())
}

impl Default for EventsConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      page_size: default_event_page_size(),
      location: default_location(),
      fields: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_news_page_size")]
  pub page_size: u32,
  /// Value of the `articletype` parameter
  #[serde(default = "default_article_type")]
  pub article_type: Option<String>,
  /// Value of the `publishedon` parameter
  #[serde(default = "default_published_on")]
  pub published_on: Option<String>,
  #[serde(default)]
  pub fields: Vec<String>,
}

fn default_news_page_size() -> u32 {
  10
}

fn default_article_type() -> Option<String> {
  Some("newsfeednoi".to_string())
}

fn default_published_on() -> Option<String> {
  Some("noi-communityapp".to_string())
}

impl Default for NewsConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      page_size: default_news_page_size(),
      article_type: default_article_type(),
      published_on: default_published_on(),
      fields: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
  pub connect_timeout_secs: u64,
  pub request_timeout_secs: u64,
  pub user_agent: String,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      connect_timeout_secs: 10,
      request_timeout_secs: 30,
      user_agent: concat!("noi-feed/", env!("CARGO_PKG_VERSION")).to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Default filter directive when RUST_LOG is unset
  pub level: String,
  /// Directory for daily rolling log files; stderr only when unset
  pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "warn".to_string(),
      directory: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./noi-feed.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/noi-feed/config.yaml
  ///
  /// Without any file the built-in defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("noi-feed.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("noi-feed").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not to an empty mapping
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Get the API bearer token from the environment, if any.
  ///
  /// Checks NOI_FEED_TOKEN.
  pub fn get_api_token() -> Option<String> {
    std::env::var("NOI_FEED_TOKEN")
      .ok()
      .filter(|t| !t.trim().is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.language, "en");
    assert_eq!(config.events.page_size, 25);
    assert_eq!(config.news.page_size, 10);
    assert_eq!(config.events.base_url, "https://tourism.api.opendatahub.com");
    assert_eq!(config.http.request_timeout_secs, 30);
  }

  #[test]
  fn test_partial_config() {
    let yaml = r#"
language: de
events:
  base_url: https://events.example.com/api/
  page_size: 5
news:
  article_type: press
http:
  request_timeout_secs: 5
logging:
  level: debug
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.language, "de");
    assert_eq!(config.events.base_url, "https://events.example.com/api/");
    assert_eq!(config.events.page_size, 5);
    assert_eq!(config.events.location.as_deref(), Some("NOI"));
    assert_eq!(config.news.published_on.as_deref(), Some("noi-communityapp"));
    assert_eq!(config.news.article_type.as_deref(), Some("press"));
    assert_eq!(config.news.page_size, 10);
    assert_eq!(config.http.request_timeout_secs, 5);
    assert_eq!(config.http.connect_timeout_secs, 10);
    assert_eq!(config.logging.level, "debug");
  }

  #[test]
  fn test_explicit_null_drops_parameter() {
    let config = Config::parse("events:\n  location: null\n").unwrap();
    assert_eq!(config.events.location, None);
  }

  #[test]
  fn test_unknown_shape_is_rejected() {
    let yaml = "events:\n  page_size: many\n";
    assert!(Config::parse(yaml).is_err());
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let err = Config::load(Some(Path::new("/nonexistent/noi-feed.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}

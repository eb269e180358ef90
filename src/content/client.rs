//! Content API client with transparent in-memory caching.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

use super::api_types::{ApiEventFilterType, ApiListing, ApiTag};
use super::events::{EventFeed, EVENTS_PATH};
use super::news::{NewsFeed, ARTICLES_PATH};
use super::types::{event_filter_option, tag_option, Article, Event, RoomMapping};
use crate::cache::{self, Cache, SessionEvent};
use crate::config::{Config, EventsConfig, NewsConfig};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::feed::{FacetSource, FeedController};
use crate::filter::{FacetCategory, FacetOption, RawFilter};
use crate::transport::Transport;

const EVENT_FILTER_TYPES_PATH: &str = "/v1/EventShortTypes";
const TAGS_PATH: &str = "/v1/Tag";
const ROOM_MAPPING_PATH: &str = "/v1/EventShort/RoomMapping";

/// Identifies one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKey {
  EventFilters { language: String },
  NewsTags { language: String },
  RoomMapping { language: String },
  Event { id: String },
  Article { id: String },
}

/// Client for everything outside the paginated feeds.
///
/// Facet lists, the room mapping and detail lookups are memoized for the
/// lifetime of the client, or until the session ends when wired up with
/// [`ContentClient::invalidate_on_logout`].
#[derive(Clone)]
pub struct ContentClient {
  transport: Arc<dyn Transport>,
  events: EventsConfig,
  news: NewsConfig,
  events_base: Url,
  news_base: Url,
  language: String,
  facet_cache: Arc<Cache<ContentKey, Arc<Vec<FacetOption>>>>,
  room_cache: Arc<Cache<ContentKey, Arc<RoomMapping>>>,
  event_cache: Arc<Cache<ContentKey, Event>>,
  article_cache: Arc<Cache<ContentKey, Article>>,
}

impl ContentClient {
  pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Result<Self> {
    Ok(Self {
      transport,
      events_base: Url::parse(&config.events.base_url)?,
      news_base: Url::parse(&config.news.base_url)?,
      events: config.events.clone(),
      news: config.news.clone(),
      language: config.language.clone(),
      facet_cache: Arc::new(Cache::new()),
      room_cache: Arc::new(Cache::new()),
      event_cache: Arc::new(Cache::new()),
      article_cache: Arc::new(Cache::new()),
    })
  }

  pub fn language(&self) -> &str {
    &self.language
  }

  async fn get_json<T: DeserializeOwned>(&self, base: &Url, endpoint: Endpoint) -> Result<T> {
    let request = endpoint.get(base)?;
    let response = self.transport.send(request).await?;
    Ok(serde_json::from_slice(&response.body)?)
  }

  /// Feed of upcoming events with the event filter types as facets.
  pub fn event_feed(&self) -> Result<FeedController<EventFeed>> {
    let source = EventFeed::new(&self.events)?;
    Ok(
      FeedController::new(self.transport.clone(), source)
        .with_facet_source(Arc::new(EventFilterSource::new(self.clone()))),
    )
  }

  /// Feed of news articles with the news tags as facets.
  pub fn news_feed(&self) -> Result<FeedController<NewsFeed>> {
    let source = NewsFeed::new(&self.news)?;
    Ok(
      FeedController::new(self.transport.clone(), source)
        .with_facet_source(Arc::new(NewsTagSource::new(self.clone()))),
    )
  }

  /// Get a single event by id with caching.
  pub async fn event(&self, id: &str) -> Result<Event> {
    let key = ContentKey::Event { id: id.to_string() };
    self
      .event_cache
      .get_or_try_insert_with(key, || {
        debug!(id, "fetching event");
        let endpoint =
          Endpoint::new(format!("{}/{}", EVENTS_PATH, id)).param("removenullvalues", true);
        self.get_json(&self.events_base, endpoint)
      })
      .await
  }

  /// Get a single article by id with caching.
  pub async fn article(&self, id: &str) -> Result<Article> {
    let key = ContentKey::Article { id: id.to_string() };
    self
      .article_cache
      .get_or_try_insert_with(key, || {
        debug!(id, "fetching article");
        let endpoint =
          Endpoint::new(format!("{}/{}", ARTICLES_PATH, id)).param("removenullvalues", true);
        self.get_json(&self.news_base, endpoint)
      })
      .await
  }

  /// Selectable event facets: custom tags and technology fields.
  pub async fn event_filters(&self) -> Result<Arc<Vec<FacetOption>>> {
    let key = ContentKey::EventFilters {
      language: self.language.clone(),
    };
    self
      .facet_cache
      .get_or_try_insert_with(key, || self.fetch_event_filters())
      .await
  }

  /// Selectable news tags for the configured article type.
  pub async fn news_tags(&self) -> Result<Arc<Vec<FacetOption>>> {
    let key = ContentKey::NewsTags {
      language: self.language.clone(),
    };
    self
      .facet_cache
      .get_or_try_insert_with(key, || self.fetch_news_tags())
      .await
  }

  /// Room code to display name mapping for event locations.
  pub async fn room_mapping(&self) -> Result<Arc<RoomMapping>> {
    let key = ContentKey::RoomMapping {
      language: self.language.clone(),
    };
    self
      .room_cache
      .get_or_try_insert_with(key, || self.fetch_room_mapping())
      .await
  }

  async fn fetch_event_filters(&self) -> Result<Arc<Vec<FacetOption>>> {
    let types = RawFilter::any(
      [FacetCategory::CustomTagging, FacetCategory::TechnologyFields]
        .iter()
        .map(|category| RawFilter::eq_str("Type", category.field())),
    );
    let endpoint = Endpoint::new(EVENT_FILTER_TYPES_PATH).param_opt("rawfilter", types);
    let listing: ApiListing<ApiEventFilterType> = self.get_json(&self.events_base, endpoint).await?;

    let options: Vec<FacetOption> = listing
      .into_items()
      .into_iter()
      .filter_map(|api| event_filter_option(api, &self.language))
      .collect();
    debug!(count = options.len(), "loaded event filters");
    Ok(Arc::new(options))
  }

  async fn fetch_news_tags(&self) -> Result<Arc<Vec<FacetOption>>> {
    let types = self
      .news
      .article_type
      .as_deref()
      .map(|article_type| RawFilter::contains("Types", article_type));
    let endpoint = Endpoint::new(TAGS_PATH).param_opt("rawfilter", types);
    let listing: ApiListing<ApiTag> = self.get_json(&self.news_base, endpoint).await?;

    let options: Vec<FacetOption> = listing
      .into_items()
      .into_iter()
      .map(|api| tag_option(api, &self.language))
      .collect();
    debug!(count = options.len(), "loaded news tags");
    Ok(Arc::new(options))
  }

  async fn fetch_room_mapping(&self) -> Result<Arc<RoomMapping>> {
    let endpoint = Endpoint::new(ROOM_MAPPING_PATH).param("language", &self.language);
    let rooms: HashMap<String, String> = self.get_json(&self.events_base, endpoint).await?;
    Ok(Arc::new(RoomMapping::new(rooms)))
  }

  /// Load facets and the room mapping concurrently.
  pub async fn warm_up(&self) -> Result<()> {
    let (filters, tags, rooms) =
      futures::try_join!(self.event_filters(), self.news_tags(), self.room_mapping())?;
    info!(
      event_filters = filters.len(),
      news_tags = tags.len(),
      rooms = rooms.len(),
      "content caches warmed up"
    );
    Ok(())
  }

  /// Drop every cached response when the session ends.
  pub fn invalidate_on_logout(&self, events: &broadcast::Receiver<SessionEvent>) -> Vec<JoinHandle<()>> {
    vec![
      cache::invalidate_on_logout(self.facet_cache.clone(), events.resubscribe()),
      cache::invalidate_on_logout(self.room_cache.clone(), events.resubscribe()),
      cache::invalidate_on_logout(self.event_cache.clone(), events.resubscribe()),
      cache::invalidate_on_logout(self.article_cache.clone(), events.resubscribe()),
    ]
  }
}

/// Event filter types as feed facets.
pub struct EventFilterSource {
  client: ContentClient,
}

impl EventFilterSource {
  pub fn new(client: ContentClient) -> Self {
    Self { client }
  }
}

#[async_trait]
impl FacetSource for EventFilterSource {
  async fn facets(&self) -> Result<Vec<FacetOption>> {
    Ok(self.client.event_filters().await?.as_ref().clone())
  }
}

/// News tags as feed facets.
pub struct NewsTagSource {
  client: ContentClient,
}

impl NewsTagSource {
  pub fn new(client: ContentClient) -> Self {
    Self { client }
  }
}

#[async_trait]
impl FacetSource for NewsTagSource {
  async fn facets(&self) -> Result<Vec<FacetOption>> {
    Ok(self.client.news_tags().await?.as_ref().clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;
  use crate::filter::FilterFacet;
  use crate::transport::{Request, Response, TransportExt};
  use reqwest::header::HeaderMap;
  use reqwest::StatusCode;
  use serde_json::{json, Value};
  use std::sync::Mutex;

  /// Answers by request path and records every request.
  struct Routed {
    routes: Vec<(&'static str, Value)>,
    requests: Mutex<Vec<Request>>,
  }

  impl Routed {
    fn new(routes: Vec<(&'static str, Value)>) -> Arc<Self> {
      Arc::new(Self {
        routes,
        requests: Mutex::new(Vec::new()),
      })
    }

    fn hits(&self, path: &str) -> usize {
      self
        .requests
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == path)
        .count()
    }

    fn last(&self, path: &str) -> Request {
      self
        .requests
        .lock()
        .unwrap()
        .iter()
        .rev()
        .find(|r| r.url.path() == path)
        .cloned()
        .unwrap()
    }
  }

  #[async_trait]
  impl Transport for Routed {
    async fn send(&self, request: Request) -> Result<Response> {
      let path = request.url.path().to_string();
      self.requests.lock().unwrap().push(request);
      match self.routes.iter().find(|(p, _)| *p == path) {
        Some((_, body)) => Ok(Response {
          status: StatusCode::OK,
          headers: HeaderMap::new(),
          body: body.to_string().into_bytes(),
        }),
        None => Ok(Response {
          status: StatusCode::NOT_FOUND,
          headers: HeaderMap::new(),
          body: Vec::new(),
        }),
      }
    }
  }

  fn client(transport: Arc<Routed>) -> ContentClient {
    let transport: Arc<dyn Transport> = Arc::new(transport.checking_status());
    ContentClient::new(transport, &Config::default()).unwrap()
  }

  fn query(request: &Request, name: &str) -> Option<String> {
    request
      .url
      .query_pairs()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v.into_owned())
  }

  #[tokio::test]
  async fn test_event_detail_is_cached() {
    let routed = Routed::new(vec![(
      "/v1/EventShort/e1",
      json!({"Id": "e1", "EventTitle": {"en": "Hackathon"}}),
    )]);
    let client = client(routed.clone());

    let first = client.event("e1").await.unwrap();
    let second = client.event("e1").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.title.get("en"), Some("Hackathon"));
    assert_eq!(routed.hits("/v1/EventShort/e1"), 1);
  }

  #[tokio::test]
  async fn test_failed_detail_is_not_cached() {
    let routed = Routed::new(vec![]);
    let client = client(routed.clone());

    let err = client.article("missing").await.unwrap_err();
    assert!(matches!(err, Error::Status { code } if code == StatusCode::NOT_FOUND));
    assert!(client.article("missing").await.is_err());
    assert_eq!(routed.hits("/v1/Article/missing"), 2);
  }

  #[tokio::test]
  async fn test_event_filters_request_and_mapping() {
    let routed = Routed::new(vec![(
      "/v1/EventShortTypes",
      json!([
        {"Key": "NOI Community", "Type": "CustomTagging", "TypeDesc": {"en": "NOI Community"}},
        {"Key": "Alpine", "Type": "TechnologyFields", "TypeDesc": {"en": "Alpine Technologies"}},
        {"Key": "Other", "Type": "EventType"}
      ]),
    )]);
    let client = client(routed.clone());

    let filters = client.event_filters().await.unwrap();
    assert_eq!(filters.len(), 2);
    assert_eq!(
      filters[1].facet,
      FilterFacet::new(FacetCategory::TechnologyFields, "Alpine")
    );
    assert_eq!(filters[1].label, "Alpine Technologies");

    let request = routed.last("/v1/EventShortTypes");
    assert_eq!(
      query(&request, "rawfilter").as_deref(),
      Some("or(eq(Type,\"CustomTagging\"),eq(Type,\"TechnologyFields\"))")
    );
  }

  #[tokio::test]
  async fn test_news_tags_filtered_by_article_type() {
    let routed = Routed::new(vec![(
      "/v1/Tag",
      json!({"TotalResults": 1, "Items": [{"Id": "startup", "TagName": {"en": "Startups"}}]}),
    )]);
    let client = client(routed.clone());

    let tags = NewsTagSource::new(client.clone()).facets().await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].facet.category, FacetCategory::TagIds);

    let request = routed.last("/v1/Tag");
    assert_eq!(
      query(&request, "rawfilter").as_deref(),
      Some("in(Types.[],\"newsfeednoi\")")
    );
  }

  #[tokio::test]
  async fn test_warm_up_loads_everything_once() {
    let routed = Routed::new(vec![
      ("/v1/EventShortTypes", json!([])),
      ("/v1/Tag", json!([])),
      ("/v1/EventShort/RoomMapping", json!({"NOI-A1": "Seminar Room A1"})),
    ]);
    let client = client(routed.clone());

    client.warm_up().await.unwrap();
    client.warm_up().await.unwrap();

    let rooms = client.room_mapping().await.unwrap();
    assert_eq!(rooms.display_name("NOI-A1"), "Seminar Room A1");
    assert_eq!(routed.hits("/v1/EventShortTypes"), 1);
    assert_eq!(routed.hits("/v1/Tag"), 1);
    assert_eq!(routed.hits("/v1/EventShort/RoomMapping"), 1);
    assert_eq!(
      query(&routed.last("/v1/EventShort/RoomMapping"), "language").as_deref(),
      Some("en")
    );
  }

  #[tokio::test]
  async fn test_warm_up_fails_when_any_part_fails() {
    let routed = Routed::new(vec![("/v1/EventShortTypes", json!([])), ("/v1/Tag", json!([]))]);
    let client = client(routed);
    assert!(client.warm_up().await.is_err());
  }

  #[tokio::test]
  async fn test_logout_clears_caches() {
    let routed = Routed::new(vec![(
      "/v1/EventShort/RoomMapping",
      json!({"NOI-A1": "Seminar Room A1"}),
    )]);
    let client = client(routed.clone());
    let (tx, rx) = broadcast::channel(4);
    let handles = client.invalidate_on_logout(&rx);

    client.room_mapping().await.unwrap();
    tx.send(SessionEvent::LoggedOut).unwrap();
    drop(tx);
    for handle in handles {
      handle.await.unwrap();
    }

    client.room_mapping().await.unwrap();
    assert_eq!(routed.hits("/v1/EventShort/RoomMapping"), 2);
  }

  #[tokio::test]
  async fn test_event_feed_exposes_facets() {
    let routed = Routed::new(vec![(
      "/v1/EventShortTypes",
      json!([{"Key": "NOI Community", "Type": "CustomTagging"}]),
    )]);
    let feed = client(routed).event_feed().unwrap();
    let facets = feed.available_facets().await.unwrap();
    assert_eq!(facets.len(), 1);
    assert_eq!(facets[0].label, "NOI Community");
  }
}

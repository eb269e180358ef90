use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use super::api_types::{ApiArticle, ApiEvent, ApiEventFilterType, ApiImage, ApiLocalized, ApiTag};
use crate::feed::FeedItem;
use crate::filter::{FacetCategory, FacetOption, FilterFacet};

const FALLBACK_LANGUAGE: &str = "en";

/// Text available in several languages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
  /// Text in `language`, else English, else whatever is there.
  pub fn get(&self, language: &str) -> Option<&str> {
    self
      .0
      .get(language)
      .or_else(|| self.0.get(FALLBACK_LANGUAGE))
      .or_else(|| self.0.values().next())
      .map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl From<ApiLocalized> for LocalizedText {
  fn from(map: ApiLocalized) -> Self {
    LocalizedText(
      map
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .collect(),
    )
  }
}

fn parse_timestamp(value: Option<&str>) -> Option<NaiveDateTime> {
  let value = value?;
  NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
    .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
    .ok()
    .or_else(|| {
      chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_local())
    })
}

fn image_urls(gallery: Option<Vec<ApiImage>>) -> Vec<String> {
  gallery
    .unwrap_or_default()
    .into_iter()
    .filter_map(|image| image.image_url)
    .collect()
}

/// An event as shown in lists and detail views.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ApiEvent")]
pub struct Event {
  pub id: String,
  pub title: LocalizedText,
  pub text: LocalizedText,
  pub start: Option<NaiveDateTime>,
  pub end: Option<NaiveDateTime>,
  pub venue: Option<String>,
  pub location: Option<String>,
  pub organizer: Option<String>,
  pub web_address: Option<String>,
  pub technology_fields: Vec<String>,
  pub custom_tags: Vec<String>,
  pub image_urls: Vec<String>,
  /// Room codes as booked; see [`RoomMapping`] for display names
  pub rooms: Vec<String>,
  pub highlighted: bool,
}

impl From<ApiEvent> for Event {
  fn from(api: ApiEvent) -> Self {
    let mut text = LocalizedText::from(api.text);
    if text.is_empty() {
      if let Some(description) = api.description.filter(|d| !d.trim().is_empty()) {
        text = LocalizedText::from(BTreeMap::from([(FALLBACK_LANGUAGE.to_string(), description)]));
      }
    }

    Event {
      id: api.id,
      title: api.title.into(),
      text,
      start: parse_timestamp(api.start_date.as_deref()),
      end: parse_timestamp(api.end_date.as_deref()),
      venue: api.anchor_venue,
      location: api.event_location,
      organizer: api.company_name,
      web_address: api.web_address,
      technology_fields: api.technology_fields.unwrap_or_default(),
      custom_tags: api.custom_tagging.unwrap_or_default(),
      image_urls: image_urls(api.image_gallery),
      rooms: api
        .room_booked
        .unwrap_or_default()
        .into_iter()
        .filter_map(|room| room.space.or(room.space_desc))
        .collect(),
      highlighted: api.highlighted.unwrap_or(false),
    }
  }
}

impl Event {
  /// Display names for the booked rooms, falling back to the raw code.
  pub fn room_names(&self, mapping: &RoomMapping) -> Vec<String> {
    self
      .rooms
      .iter()
      .map(|room| mapping.display_name(room).to_string())
      .collect()
  }
}

impl FeedItem for Event {
  fn id(&self) -> &str {
    &self.id
  }
}

/// A news article.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ApiArticle")]
pub struct Article {
  pub id: String,
  pub title: LocalizedText,
  pub body: LocalizedText,
  pub summary: LocalizedText,
  pub published: Option<NaiveDateTime>,
  pub author: LocalizedText,
  pub contact_email: Option<String>,
  pub tag_ids: Vec<String>,
  pub image_urls: Vec<String>,
  pub highlighted: bool,
}

impl From<ApiArticle> for Article {
  fn from(api: ApiArticle) -> Self {
    let mut title = BTreeMap::new();
    let mut body = BTreeMap::new();
    let mut summary = BTreeMap::new();
    for (language, detail) in api.detail {
      if let Some(t) = detail.title {
        title.insert(language.clone(), t);
      }
      if let Some(b) = detail.base_text {
        body.insert(language.clone(), b);
      }
      if let Some(s) = detail.additional_text {
        summary.insert(language, s);
      }
    }

    let mut author = BTreeMap::new();
    let mut contact_email = None;
    for (language, contact) in api.contact_infos {
      if contact_email.is_none() {
        contact_email = contact.email;
      }
      if let Some(name) = contact.company_name {
        author.insert(language, name);
      }
    }

    Article {
      id: api.id,
      title: title.into(),
      body: body.into(),
      summary: summary.into(),
      published: parse_timestamp(api.article_date.as_deref()),
      author: author.into(),
      contact_email,
      tag_ids: api.tag_ids.unwrap_or_default(),
      image_urls: image_urls(api.image_gallery),
      highlighted: api.highlighted.unwrap_or(false),
    }
  }
}

impl FeedItem for Article {
  fn id(&self) -> &str {
    &self.id
  }
}

/// Room code -> human-readable room name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomMapping(HashMap<String, String>);

impl RoomMapping {
  pub fn new(rooms: HashMap<String, String>) -> Self {
    RoomMapping(rooms)
  }

  pub fn display_name<'a>(&'a self, room: &'a str) -> &'a str {
    self.0.get(room).map(String::as_str).unwrap_or(room)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Event filter types of a category we cannot filter on are skipped.
pub(crate) fn event_filter_option(api: ApiEventFilterType, language: &str) -> Option<FacetOption> {
  let category = api.kind.parse::<FacetCategory>().ok()?;
  let label = LocalizedText::from(api.type_desc)
    .get(language)
    .map(str::to_string)
    .unwrap_or_else(|| api.key.clone());
  Some(FacetOption {
    facet: FilterFacet::new(category, api.key),
    label,
  })
}

pub(crate) fn tag_option(api: ApiTag, language: &str) -> FacetOption {
  let label = LocalizedText::from(api.tag_name)
    .get(language)
    .map(str::to_string)
    .unwrap_or_else(|| api.id.clone());
  FacetOption {
    facet: FilterFacet::new(FacetCategory::TagIds, api.id),
    label,
  }
}

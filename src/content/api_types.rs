//! Serde-deserializable types matching the content API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::feed::PageEnvelope;

/// Language code -> text.
pub type ApiLocalized = BTreeMap<String, String>;

/// List endpoints answer with an envelope when paginated and with a bare
/// array otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiListing<T> {
  Page(PageEnvelope<T>),
  Plain(Vec<T>),
}

impl<T> ApiListing<T> {
  pub fn into_items(self) -> Vec<T> {
    match self {
      ApiListing::Page(page) => page.items,
      ApiListing::Plain(items) => items,
    }
  }
}

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiImage {
  #[serde(rename = "ImageUrl")]
  pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRoomBooked {
  #[serde(rename = "Space")]
  pub space: Option<String>,
  #[serde(rename = "SpaceDesc")]
  pub space_desc: Option<String>,
}

// ============================================================================
// Events (EventShort)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiEvent {
  #[serde(rename = "Id")]
  pub id: String,
  #[serde(rename = "EventTitle", default)]
  pub title: ApiLocalized,
  #[serde(rename = "EventText", default)]
  pub text: ApiLocalized,
  #[serde(rename = "EventDescription")]
  pub description: Option<String>,
  #[serde(rename = "StartDate")]
  pub start_date: Option<String>,
  #[serde(rename = "EndDate")]
  pub end_date: Option<String>,
  #[serde(rename = "AnchorVenue")]
  pub anchor_venue: Option<String>,
  #[serde(rename = "EventLocation")]
  pub event_location: Option<String>,
  #[serde(rename = "CompanyName")]
  pub company_name: Option<String>,
  #[serde(rename = "WebAddress")]
  pub web_address: Option<String>,
  // Null-valued lists are dropped server side with removenullvalues, but
  // not every deployment honours it
  #[serde(rename = "TechnologyFields")]
  pub technology_fields: Option<Vec<String>>,
  #[serde(rename = "CustomTagging")]
  pub custom_tagging: Option<Vec<String>>,
  #[serde(rename = "ImageGallery")]
  pub image_gallery: Option<Vec<ApiImage>>,
  #[serde(rename = "RoomBooked")]
  pub room_booked: Option<Vec<ApiRoomBooked>>,
  #[serde(rename = "Highlighted")]
  pub highlighted: Option<bool>,
}

/// Entry of the event filter type list.
#[derive(Debug, Deserialize)]
pub struct ApiEventFilterType {
  #[serde(rename = "Key")]
  pub key: String,
  #[serde(rename = "Type")]
  pub kind: String,
  #[serde(rename = "TypeDesc", default)]
  pub type_desc: ApiLocalized,
}

// ============================================================================
// News (Article)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiArticleDetail {
  #[serde(rename = "Title")]
  pub title: Option<String>,
  #[serde(rename = "BaseText")]
  pub base_text: Option<String>,
  #[serde(rename = "AdditionalText")]
  pub additional_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiContactInfo {
  #[serde(rename = "CompanyName")]
  pub company_name: Option<String>,
  #[serde(rename = "Email")]
  pub email: Option<String>,
  #[serde(rename = "Url")]
  pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiArticle {
  #[serde(rename = "Id")]
  pub id: String,
  #[serde(rename = "Detail", default)]
  pub detail: BTreeMap<String, ApiArticleDetail>,
  #[serde(rename = "ContactInfos", default)]
  pub contact_infos: BTreeMap<String, ApiContactInfo>,
  #[serde(rename = "ArticleDate")]
  pub article_date: Option<String>,
  #[serde(rename = "ImageGallery")]
  pub image_gallery: Option<Vec<ApiImage>>,
  #[serde(rename = "TagIds")]
  pub tag_ids: Option<Vec<String>>,
  #[serde(rename = "Highlighted", alias = "Highlight")]
  pub highlighted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTag {
  #[serde(rename = "Id")]
  pub id: String,
  #[serde(rename = "TagName", default)]
  pub tag_name: ApiLocalized,
}

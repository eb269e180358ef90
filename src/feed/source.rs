//! What a feed needs to know about the endpoint it pages through.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::state::{FeedItem, FeedPage};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::filter::FacetOption;

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
  pub page_number: u32,
  pub page_size: u32,
  /// Rendered raw filter, omitted from the request when `None`
  pub raw_filter: Option<String>,
}

/// A paginated list endpoint.
pub trait FeedSource: Send + Sync + 'static {
  type Item: FeedItem + DeserializeOwned;

  fn base_url(&self) -> &Url;

  fn page_size(&self) -> u32;

  fn list_endpoint(&self, query: &ListQuery) -> Endpoint;

  fn decode_page(&self, body: &[u8]) -> Result<FeedPage<Self::Item>> {
    let envelope: PageEnvelope<Self::Item> = serde_json::from_slice(body)?;
    Ok(envelope.into_page())
  }

  fn decode_total(&self, body: &[u8]) -> Result<u64> {
    let envelope: PageEnvelope<serde_json::Value> = serde_json::from_slice(body)?;
    Ok(envelope.total_results)
  }
}

/// Lists the facets a user can pick from.
#[async_trait]
pub trait FacetSource: Send + Sync {
  async fn facets(&self) -> Result<Vec<FacetOption>>;
}

/// Envelope shared by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope<T> {
  #[serde(rename = "TotalResults", default)]
  pub total_results: u64,
  #[serde(rename = "TotalPages", default)]
  pub total_pages: u32,
  #[serde(rename = "CurrentPage", default)]
  pub current_page: u32,
  /// Either a page number or a link to the next page
  #[serde(rename = "NextPage", default)]
  pub next_page: Option<serde_json::Value>,
  #[serde(rename = "Items", default = "Vec::new")]
  pub items: Vec<T>,
}

impl<T> PageEnvelope<T> {
  pub fn into_page(self) -> FeedPage<T> {
    let current_page = self.current_page.max(1);
    let next_page = self
      .next_page
      .as_ref()
      .and_then(|next| next_page_number(next, current_page))
      // A next page that does not move forward would loop forever
      .filter(|&next| next > current_page);

    FeedPage {
      items: self.items,
      current_page,
      next_page,
      total_results: self.total_results,
    }
  }
}

fn next_page_number(next: &serde_json::Value, current_page: u32) -> Option<u32> {
  match next {
    serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
    serde_json::Value::String(link) if link.is_empty() => None,
    serde_json::Value::String(link) => Url::parse(link)
      .ok()
      .and_then(|url| {
        url
          .query_pairs()
          .find(|(name, _)| name.eq_ignore_ascii_case("pagenumber"))
          .and_then(|(_, value)| value.parse().ok())
      })
      .or_else(|| current_page.checked_add(1)),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn decode(value: serde_json::Value) -> FeedPage<serde_json::Value> {
    serde_json::from_value::<PageEnvelope<serde_json::Value>>(value)
      .unwrap()
      .into_page()
  }

  #[test]
  fn test_numeric_next_page() {
    let page = decode(json!({
      "TotalResults": 3, "TotalPages": 2, "CurrentPage": 1, "NextPage": 2,
      "Items": [{"Id": "a"}, {"Id": "b"}]
    }));
    assert_eq!(page.next_page, Some(2));
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_results, 3);
  }

  #[test]
  fn test_link_next_page() {
    let page = decode(json!({
      "TotalResults": 30, "CurrentPage": 2,
      "NextPage": "https://tourism.api.opendatahub.com/v1/Article?pagenumber=3&pagesize=10",
      "Items": []
    }));
    assert_eq!(page.next_page, Some(3));
  }

  #[test]
  fn test_link_without_page_number_advances_by_one() {
    let page = decode(json!({"CurrentPage": 4, "NextPage": "next", "Items": []}));
    assert_eq!(page.next_page, Some(5));
  }

  #[test]
  fn test_last_page() {
    let page = decode(json!({"TotalResults": 1, "CurrentPage": 1, "NextPage": null, "Items": [{}]}));
    assert_eq!(page.next_page, None);

    let page = decode(json!({"CurrentPage": 1, "Items": []}));
    assert_eq!(page.next_page, None);
  }

  #[test]
  fn test_link_on_last_representable_page_ends_feed() {
    let page = decode(json!({"CurrentPage": u32::MAX, "NextPage": "next", "Items": []}));
    assert_eq!(page.current_page, u32::MAX);
    assert_eq!(page.next_page, None);

    let page = decode(json!({"CurrentPage": 1, "NextPage": u64::MAX, "Items": []}));
    assert_eq!(page.next_page, None);
  }

  #[test]
  fn test_non_advancing_next_page_is_ignored() {
    let page = decode(json!({"CurrentPage": 2, "NextPage": 2, "Items": []}));
    assert_eq!(page.next_page, None);
  }
}

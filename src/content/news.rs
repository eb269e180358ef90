//! Paginated news listing.

use url::Url;

use super::types::Article;
use crate::config::NewsConfig;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::feed::{FeedSource, ListQuery};

pub(crate) const ARTICLES_PATH: &str = "/v1/Article";

/// News articles, newest first.
#[derive(Debug, Clone)]
pub struct NewsFeed {
  base_url: Url,
  page_size: u32,
  article_type: Option<String>,
  published_on: Option<String>,
  fields: Vec<String>,
}

impl NewsFeed {
  pub fn new(config: &NewsConfig) -> Result<Self> {
    Ok(Self {
      base_url: Url::parse(&config.base_url)?,
      page_size: config.page_size.max(1),
      article_type: config.article_type.clone(),
      published_on: config.published_on.clone(),
      fields: config.fields.clone(),
    })
  }
}

impl FeedSource for NewsFeed {
  type Item = Article;

  fn base_url(&self) -> &Url {
    &self.base_url
  }

  fn page_size(&self) -> u32 {
    self.page_size
  }

  fn list_endpoint(&self, query: &ListQuery) -> Endpoint {
    let fields = (!self.fields.is_empty()).then(|| self.fields.join(","));

    Endpoint::new(ARTICLES_PATH)
      .param_opt("articletype", self.article_type.as_deref())
      .param_opt("publishedon", self.published_on.as_deref())
      .param("pagesize", query.page_size)
      .param("pagenumber", query.page_number)
      .param_opt("rawfilter", query.raw_filter.as_deref())
      .param("rawsort", "-ArticleDate")
      .param_opt("fields", fields)
      .param("removenullvalues", true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_list_endpoint_parameters() {
    let feed = NewsFeed::new(&NewsConfig::default()).unwrap();
    let endpoint = feed.list_endpoint(&ListQuery {
      page_number: 2,
      page_size: 10,
      raw_filter: Some("and(in(TagIds.[],\"startup\"),eq(Highlighted,true))".to_string()),
    });

    assert_eq!(endpoint.path(), "/v1/Article");
    assert_eq!(endpoint.query_value("articletype"), Some("newsfeednoi"));
    assert_eq!(endpoint.query_value("publishedon"), Some("noi-communityapp"));
    assert_eq!(endpoint.query_value("pagenumber"), Some("2"));
    assert_eq!(endpoint.query_value("pagesize"), Some("10"));
    assert_eq!(endpoint.query_value("rawsort"), Some("-ArticleDate"));
    assert_eq!(
      endpoint.query_value("rawfilter"),
      Some("and(in(TagIds.[],\"startup\"),eq(Highlighted,true))")
    );
  }

  #[test]
  fn test_url_keeps_base_prefix() {
    let config = NewsConfig {
      base_url: "https://proxy.example.com/odh/".to_string(),
      published_on: None,
      ..NewsConfig::default()
    };
    let feed = NewsFeed::new(&config).unwrap();
    let url = feed
      .list_endpoint(&ListQuery {
        page_number: 1,
        page_size: 10,
        raw_filter: None,
      })
      .url(feed.base_url())
      .unwrap();

    assert_eq!(url.path(), "/odh/v1/Article");
    assert!(!url.query().unwrap_or_default().contains("publishedon"));
  }

  #[test]
  fn test_zero_page_size_is_clamped() {
    let config = NewsConfig {
      page_size: 0,
      ..NewsConfig::default()
    };
    assert_eq!(NewsFeed::new(&config).unwrap().page_size(), 1);
  }
}

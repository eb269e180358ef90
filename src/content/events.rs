//! Paginated event listing.

use chrono::{Local, NaiveDate};
use url::Url;

use super::types::Event;
use crate::config::EventsConfig;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::feed::{FeedSource, ListQuery};

pub(crate) const EVENTS_PATH: &str = "/v1/EventShort";

/// Upcoming events, oldest start date first.
#[derive(Debug, Clone)]
pub struct EventFeed {
  base_url: Url,
  page_size: u32,
  location: Option<String>,
  fields: Vec<String>,
  start_date: NaiveDate,
}

impl EventFeed {
  /// Events starting today or later.
  pub fn new(config: &EventsConfig) -> Result<Self> {
    Ok(Self {
      base_url: Url::parse(&config.base_url)?,
      page_size: config.page_size.max(1),
      location: config.location.clone(),
      fields: config.fields.clone(),
      start_date: Local::now().date_naive(),
    })
  }

  pub fn starting_on(mut self, date: NaiveDate) -> Self {
    self.start_date = date;
    self
  }
}

impl FeedSource for EventFeed {
  type Item = Event;

  fn base_url(&self) -> &Url {
    &self.base_url
  }

  fn page_size(&self) -> u32 {
    self.page_size
  }

  fn list_endpoint(&self, query: &ListQuery) -> Endpoint {
    let fields = (!self.fields.is_empty()).then(|| self.fields.join(","));

    Endpoint::new(EVENTS_PATH)
      .param("startdate", self.start_date.format("%Y-%m-%d"))
      .param_opt("eventlocation", self.location.as_deref())
      .param("pagesize", query.page_size)
      .param("pagenumber", query.page_number)
      .param_opt("rawfilter", query.raw_filter.as_deref())
      .param("rawsort", "StartDate")
      .param_opt("fields", fields)
      .param("removenullvalues", true)
  }
}

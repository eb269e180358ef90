//! Paginated feeds that merge highlighted and regular content.

mod controller;
mod source;
mod state;

pub use controller::{FeedController, FetchOutcome};
pub use source::{FacetSource, FeedSource, ListQuery, PageEnvelope};
pub use state::{FeedItem, FeedPage, FeedState, Phase, FIRST_PAGE};

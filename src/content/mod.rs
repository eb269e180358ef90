//! Open Data Hub content: events and news.

pub mod api_types;
mod client;
mod events;
mod news;
mod types;

pub use client::{ContentClient, ContentKey, EventFilterSource, NewsTagSource};
pub use events::EventFeed;
pub use news::NewsFeed;
pub use types::{Article, Event, LocalizedText, RoomMapping};

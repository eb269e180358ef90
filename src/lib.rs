pub mod cache;
pub mod config;
pub mod content;
pub mod endpoint;
pub mod error;
pub mod feed;
pub mod filter;
pub mod logging;
pub mod transport;

//! Composable HTTP transport pipeline.
//!
//! A [`Transport`] sends a [`Request`] and hands back the raw body together
//! with the response metadata. Cross-cutting behavior is layered on with
//! decorators that wrap an inner transport and implement the same trait:
//!
//! - [`StatusCodeChecking`] rejects statuses outside `[200, 300)`
//! - [`HeaderAdding`] merges a fixed header map into every request
//! - [`RequestInspectable`] remembers the last request (tests)
//!
//! ```ignore
//! let transport = HttpTransport::new(&config.http)?
//!   .checking_status()
//!   .with_json_headers()
//!   .with_bearer(&token)?;
//! let response = transport.send(endpoint.get(&base)?).await?;
//! ```
//!
//! Nothing in this layer retries, queues or rate limits.

mod headers;
mod http;
mod inspect;
mod mock;
mod status;

pub use headers::HeaderAdding;
pub use http::HttpTransport;
pub use inspect::RequestInspectable;
pub use mock::MockTransport;
pub use status::StatusCodeChecking;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use url::Url;

use crate::config::HttpConfig;
use crate::error::Result;

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct Request {
  pub method: Method,
  pub url: Url,
  pub headers: HeaderMap,
  pub body: Option<Vec<u8>>,
}

/// Raw response body plus metadata.
#[derive(Debug, Clone)]
pub struct Response {
  pub status: StatusCode,
  pub headers: HeaderMap,
  pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
  async fn send(&self, request: Request) -> Result<Response> {
    (**self).send(request).await
  }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
  async fn send(&self, request: Request) -> Result<Response> {
    (**self).send(request).await
  }
}

/// Builder-style composition of the decorators.
pub trait TransportExt: Transport + Sized {
  fn checking_status(self) -> StatusCodeChecking<Self> {
    StatusCodeChecking::new(self)
  }

  fn with_headers(self, headers: HeaderMap) -> HeaderAdding<Self> {
    HeaderAdding::new(self, headers)
  }

  fn with_json_headers(self) -> HeaderAdding<Self> {
    HeaderAdding::json(self)
  }

  fn with_bearer(self, token: &str) -> Result<HeaderAdding<Self>> {
    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(HeaderAdding::new(self, headers))
  }

  fn inspectable(self) -> RequestInspectable<Self> {
    RequestInspectable::new(self)
  }
}

impl<T: Transport + Sized> TransportExt for T {}

/// The production stack: reqwest, status checking, JSON headers and an
/// optional bearer token.
pub fn standard(http: &HttpConfig, token: Option<&str>) -> Result<Arc<dyn Transport>> {
  let base = HttpTransport::new(http)?.checking_status().with_json_headers();
  match token {
    Some(token) => Ok(Arc::new(base.with_bearer(token)?)),
    None => Ok(Arc::new(base)),
  }
}

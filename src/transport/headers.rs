use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use super::{Request, Response, Transport};
use crate::error::Result;

/// Merges a fixed set of headers into every outgoing request.
///
/// Fixed headers replace any value the caller already set under the same name.
pub struct HeaderAdding<T> {
  inner: T,
  headers: HeaderMap,
}

impl<T: Transport> HeaderAdding<T> {
  pub fn new(inner: T, headers: HeaderMap) -> Self {
    Self { inner, headers }
  }

  /// `Content-Type` and `Accept` set to JSON.
  pub fn json(inner: T) -> Self {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Self::new(inner, headers)
  }
}

#[async_trait]
impl<T: Transport> Transport for HeaderAdding<T> {
  async fn send(&self, mut request: Request) -> Result<Response> {
    for (name, value) in &self.headers {
      request.headers.insert(name.clone(), value.clone());
    }
    self.inner.send(request).await
  }
}

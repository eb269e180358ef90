use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use super::{Request, Response, Transport};
use crate::error::Result;

/// Remembers the last request it forwarded so tests can assert on it.
pub struct RequestInspectable<T> {
  inner: T,
  last: Mutex<Option<Request>>,
}

impl<T: Transport> RequestInspectable<T> {
  pub fn new(inner: T) -> Self {
    Self {
      inner,
      last: Mutex::new(None),
    }
  }

  pub fn last_request(&self) -> Option<Request> {
    self
      .last
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }
}

#[async_trait]
impl<T: Transport> Transport for RequestInspectable<T> {
  async fn send(&self, request: Request) -> Result<Response> {
    *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(request.clone());
    self.inner.send(request).await
  }
}

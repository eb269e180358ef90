use async_trait::async_trait;
use tracing::warn;

use super::{Request, Response, Transport};
use crate::error::{Error, Result};

/// Rejects responses whose status is outside `[200, 300)`.
pub struct StatusCodeChecking<T> {
  inner: T,
}

impl<T: Transport> StatusCodeChecking<T> {
  pub fn new(inner: T) -> Self {
    Self { inner }
  }
}

#[async_trait]
impl<T: Transport> Transport for StatusCodeChecking<T> {
  async fn send(&self, request: Request) -> Result<Response> {
    let url = request.url.clone();
    let response = self.inner.send(request).await?;

    if !response.status.is_success() {
      warn!(status = %response.status, %url, "request rejected");
      return Err(Error::Status {
        code: response.status,
      });
    }

    Ok(response)
  }
}

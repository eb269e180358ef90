use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use super::{Request, Response, Transport};
use crate::error::Result;

/// Terminal transport answering every request with the same status and body.
#[derive(Debug, Clone)]
pub struct MockTransport {
  status: StatusCode,
  body: Vec<u8>,
}

impl MockTransport {
  pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
    Self { status, body }
  }

  pub fn json(body: &serde_json::Value) -> Self {
    Self::new(StatusCode::OK, body.to_string().into_bytes())
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn send(&self, _request: Request) -> Result<Response> {
    Ok(Response {
      status: self.status,
      headers: HeaderMap::new(),
      body: self.body.clone(),
    })
  }
}

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{Request, Response, Transport};
use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Base transport backed by a pooled reqwest client.
///
/// Returns every response as-is, whatever its status. Wrap it in
/// [`super::StatusCodeChecking`] to turn non-2xx answers into errors.
#[derive(Clone)]
pub struct HttpTransport {
  client: Client,
}

impl HttpTransport {
  pub fn new(config: &HttpConfig) -> Result<Self> {
    let client = Client::builder()
      .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .user_agent(config.user_agent.as_str())
      .pool_max_idle_per_host(4)
      .build()
      .map_err(Error::transport)?;

    Ok(Self { client })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: Request) -> Result<Response> {
    debug!(method = %request.method, url = %request.url, "sending request");

    let mut builder = self
      .client
      .request(request.method, request.url)
      .headers(request.headers);
    if let Some(body) = request.body {
      builder = builder.body(body);
    }

    let response = builder.send().await.map_err(Error::transport)?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await.map_err(Error::transport)?.to_vec();

    debug!(%status, bytes = body.len(), "received response");

    Ok(Response {
      status,
      headers,
      body,
    })
  }
}

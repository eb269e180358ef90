use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while talking to the content API.
#[derive(Debug, Error)]
pub enum Error {
  /// Connectivity failure (DNS, TLS, timeout, connection reset).
  #[error("request failed: {0}")]
  Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The server answered with a status outside `[200, 300)`.
  #[error("unexpected status code {code}")]
  Status { code: StatusCode },

  /// The payload could not be decoded into the expected shape.
  #[error("failed to decode response: {0}")]
  Decoding(#[from] serde_json::Error),

  /// The request was superseded by a newer one.
  #[error("request was superseded")]
  Cancelled,

  #[error("invalid url: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("invalid header value: {0}")]
  InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl Error {
  pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Error::Transport(err.into())
  }

  /// Whether calling the operation again may succeed.
  pub fn is_retryable(&self) -> bool {
    match self {
      Error::Transport(_) => true,
      Error::Status { code } => code.is_server_error() || *code == StatusCode::TOO_MANY_REQUESTS,
      _ => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_retryable_classification() {
    assert!(Error::transport("connection reset").is_retryable());
    assert!(Error::Status {
      code: StatusCode::BAD_GATEWAY
    }
    .is_retryable());
    assert!(!Error::Status {
      code: StatusCode::NOT_FOUND
    }
    .is_retryable());
    assert!(!Error::Cancelled.is_retryable());
  }

  #[test]
  fn test_status_message() {
    let err = Error::Status {
      code: StatusCode::NOT_FOUND,
    };
    assert_eq!(err.to_string(), "unexpected status code 404 Not Found");
  }
}

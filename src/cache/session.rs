use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::Cache;

/// Session lifecycle signals published by the authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
  LoggedIn,
  LoggedOut,
}

/// Clear `cache` every time a [`SessionEvent::LoggedOut`] arrives.
///
/// The task ends when the sender side is dropped.
pub fn invalidate_on_logout<K, V>(
  cache: Arc<Cache<K, V>>,
  mut events: broadcast::Receiver<SessionEvent>,
) -> JoinHandle<()>
where
  K: Hash + Eq + Send + Sync + 'static,
  V: Clone + Send + Sync + 'static,
{
  tokio::spawn(async move {
    loop {
      match events.recv().await {
        Ok(SessionEvent::LoggedOut) => {
          debug!("session ended, invalidating cache");
          cache.clear();
        }
        Ok(SessionEvent::LoggedIn) => {}
        Err(broadcast::error::RecvError::Lagged(skipped)) => {
          // A logout may be among the skipped events.
          warn!(skipped, "session events lagged, invalidating cache");
          cache.clear();
        }
        Err(broadcast::error::RecvError::Closed) => break,
      }
    }
  })
}

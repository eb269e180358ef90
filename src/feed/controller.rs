//! Two-phase paginated feed.
//!
//! The backend cannot rank pinned and regular results in one list, so the
//! controller pages through the highlighted results first and then through
//! everything else, presenting both as a single feed with one cursor and one
//! item list.
//!
//! ```text
//!            refresh()
//!               |
//!   Idle -> FetchingHighlighted --(no next page)--> FetchingNormal -> Exhausted
//!               ^      |  (empty page: fetch again)       |
//!               |      v                                  v
//!               +---- Error <-----------------------------+
//! ```

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::source::{FacetSource, FeedSource, ListQuery};
use super::state::{FeedPage, FeedState, Phase, FIRST_PAGE};
use crate::error::{Error, Result};
use crate::filter::{compose_facets, FacetOption, FilterFacet, RawFilter};
use crate::transport::Transport;

/// What a call to [`FeedController::fetch`] or [`FeedController::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
  /// At least one page was applied to the state
  Applied,
  /// Nothing left to fetch, no request was made
  Exhausted,
  /// The request failed; the error is in the state
  Failed,
  /// A newer request superseded this one and its response was dropped
  Discarded,
}

/// Bookkeeping that is never published.
#[derive(Debug, Default)]
struct Control {
  active_filters: BTreeSet<FilterFacet>,
  /// Bumped for every request; only the latest may touch the state
  generation: u64,
  /// A refresh has started but no page has replaced the items yet
  pending_refresh: bool,
  /// Bumped by every refresh
  cycle: u64,
  /// Exhaustion cycle and filter the total count was last requested for
  counted: Option<(u64, Option<String>)>,
}

/// Everything needed to issue one page request and apply its response.
#[derive(Debug, Clone)]
struct Ticket {
  generation: u64,
  page: u32,
  phase: Phase,
  replace: bool,
  raw_filter: Option<String>,
}

enum Step {
  /// Highlighted page came back empty, go straight for the next one
  Continue,
  Done(FetchOutcome),
}

/// One feed presenting highlighted items first, then everything else.
pub struct FeedController<S: FeedSource> {
  transport: Arc<dyn Transport>,
  source: S,
  facets: Option<Arc<dyn FacetSource>>,
  control: Mutex<Control>,
  state: watch::Sender<FeedState<S::Item>>,
}

impl<S: FeedSource> FeedController<S> {
  pub fn new(transport: Arc<dyn Transport>, source: S) -> Self {
    let (state, _) = watch::channel(FeedState::default());
    Self {
      transport,
      source,
      facets: None,
      control: Mutex::new(Control::default()),
      state,
    }
  }

  /// Attach the source used by [`Self::available_facets`].
  pub fn with_facet_source(mut self, facets: Arc<dyn FacetSource>) -> Self {
    self.facets = Some(facets);
    self
  }

  // Never held across an await.
  fn control(&self) -> MutexGuard<'_, Control> {
    self.control.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Observe state changes. Dropping the receiver unsubscribes.
  pub fn subscribe(&self) -> watch::Receiver<FeedState<S::Item>> {
    self.state.subscribe()
  }

  pub fn snapshot(&self) -> FeedState<S::Item> {
    self.state.borrow().clone()
  }

  pub fn items(&self) -> Vec<S::Item> {
    self.state.borrow().items.clone()
  }

  pub fn is_loading(&self) -> bool {
    self.state.borrow().is_loading
  }

  pub fn error(&self) -> Option<Arc<Error>> {
    self.state.borrow().last_error.clone()
  }

  pub fn has_next_page(&self) -> bool {
    self.state.borrow().has_next_page()
  }

  pub fn total_result_count(&self) -> Option<u64> {
    self.state.borrow().total_result_count
  }

  /// Replace the selected facets. Takes effect on the next [`Self::refresh`].
  pub fn set_active_filters(&self, facets: impl IntoIterator<Item = FilterFacet>) {
    self.control().active_filters = facets.into_iter().collect();
  }

  pub fn active_filters(&self) -> BTreeSet<FilterFacet> {
    self.control().active_filters.clone()
  }

  /// Facets the user can choose from, if a facet source is attached.
  pub async fn available_facets(&self) -> Result<Vec<FacetOption>> {
    match &self.facets {
      Some(source) => source.facets().await,
      None => Ok(Vec::new()),
    }
  }

  /// Load the next page.
  ///
  /// A no-op once both phases are exhausted. On failure the error is
  /// published and cursor, phase and items stay as they were, so calling
  /// again retries the same page.
  pub async fn fetch(&self) -> FetchOutcome {
    self.run(false).await
  }

  /// Start over from the first highlighted page.
  ///
  /// Items loaded so far stay visible until the first page of the new cycle
  /// replaces them. Any request still in flight is superseded.
  pub async fn refresh(&self) -> FetchOutcome {
    self.run(true).await
  }

  async fn run(&self, refresh: bool) -> FetchOutcome {
    let mut restart = refresh;
    loop {
      let Some(ticket) = self.begin(restart) else {
        return FetchOutcome::Exhausted;
      };
      restart = false;

      let result = self.request_page(&ticket).await;
      match self.apply(&ticket, result) {
        Step::Continue => continue,
        Step::Done(outcome) => {
          // Only a plain fetch running into the end asks for the total
          if outcome == FetchOutcome::Applied && !refresh {
            self.count_if_exhausted().await;
          }
          return outcome;
        }
      }
    }
  }

  /// Claim a generation for the next request, or `None` when exhausted.
  fn begin(&self, refresh: bool) -> Option<Ticket> {
    let mut control = self.control();

    if refresh {
      control.pending_refresh = true;
      control.cycle += 1;
      self.state.send_modify(|state| {
        state.cursor = Some(FIRST_PAGE);
        state.phase = Phase::Highlighted;
      });
    }

    let (cursor, phase) = {
      let state = self.state.borrow();
      (state.cursor, state.phase)
    };
    // A pending refresh always has a cursor, so this only stops a finished feed
    let page = cursor?;

    control.generation += 1;
    let ticket = Ticket {
      generation: control.generation,
      page,
      phase,
      replace: control.pending_refresh,
      raw_filter: RawFilter::all(
        compose_facets(&control.active_filters)
          .into_iter()
          .chain(Some(phase.filter())),
      )
      .map(|f| f.to_string()),
    };

    self.state.send_modify(|state| {
      state.is_loading = true;
      state.last_error = None;
    });

    debug!(
      generation = ticket.generation,
      page = ticket.page,
      phase = ?ticket.phase,
      "requesting page"
    );
    Some(ticket)
  }

  async fn request_page(&self, ticket: &Ticket) -> Result<FeedPage<S::Item>> {
    let query = ListQuery {
      page_number: ticket.page,
      page_size: self.source.page_size(),
      raw_filter: ticket.raw_filter.clone(),
    };
    let request = self
      .source
      .list_endpoint(&query)
      .get(self.source.base_url())?;
    let response = self.transport.send(request).await?;
    self.source.decode_page(&response.body)
  }

  fn apply(&self, ticket: &Ticket, result: Result<FeedPage<S::Item>>) -> Step {
    let mut control = self.control();

    if ticket.generation != control.generation {
      debug!(
        generation = ticket.generation,
        current = control.generation,
        "{}",
        Error::Cancelled
      );
      return Step::Done(FetchOutcome::Discarded);
    }

    let page = match result {
      Ok(page) => page,
      Err(err) => {
        warn!(page = ticket.page, phase = ?ticket.phase, error = %err, "page request failed");
        self.state.send_modify(|state| {
          state.is_loading = false;
          state.last_error = Some(Arc::new(err));
        });
        return Step::Done(FetchOutcome::Failed);
      }
    };

    let was_highlighted = ticket.phase == Phase::Highlighted;
    let skip = was_highlighted && page.items.is_empty();
    // An empty highlighted page has nothing to replace the old items with yet
    let replace = ticket.replace && !skip;
    if replace {
      control.pending_refresh = false;
    }
    let next_page = page.next_page.filter(|&next| next > ticket.page);

    self.state.send_modify(|state| {
      if was_highlighted && next_page.is_none() {
        state.phase = Phase::Normal;
        state.cursor = Some(FIRST_PAGE);
      } else {
        state.cursor = next_page;
      }

      if replace {
        state.items.clear();
        state.total_result_count = None;
      }
      state.append_unique(page.items);

      if !skip {
        state.is_loading = false;
      }
    });

    if skip {
      debug!(page = ticket.page, "highlighted page empty, fetching on");
      Step::Continue
    } else {
      Step::Done(FetchOutcome::Applied)
    }
  }

  /// Once a fetch runs the normal phase out, fetch the total count for the
  /// active filter. At most once per refresh cycle and filter.
  async fn count_if_exhausted(&self) {
    let (cycle, raw_filter) = {
      let mut control = self.control();
      if self.state.borrow().cursor.is_some() {
        return;
      }
      let raw_filter = compose_facets(&control.active_filters).map(|f| f.to_string());
      let key = (control.cycle, raw_filter.clone());
      if control.counted.as_ref() == Some(&key) {
        return;
      }
      control.counted = Some(key);
      (control.cycle, raw_filter)
    };

    match self.request_total(raw_filter.clone()).await {
      Ok(total) => {
        let control = self.control();
        let current = (control.cycle, compose_facets(&control.active_filters).map(|f| f.to_string()));
        if current != (cycle, raw_filter) {
          debug!("dropping total count for a superseded cycle");
          return;
        }
        info!(total, "feed exhausted");
        self.state.send_modify(|state| state.total_result_count = Some(total));
      }
      Err(err) => warn!(error = %err, "total count request failed"),
    }
  }

  async fn request_total(&self, raw_filter: Option<String>) -> Result<u64> {
    let query = ListQuery {
      page_number: FIRST_PAGE,
      page_size: 1,
      raw_filter,
    };
    let request = self
      .source
      .list_endpoint(&query)
      .get(self.source.base_url())?;
    let response = self.transport.send(request).await?;
    self.source.decode_total(&response.body)
  }
}

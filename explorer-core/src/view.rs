//! Screen state and stale-request tracking for the presentation layer.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::ApiResponse;
use crate::error::ApiError;

/// What a screen shows for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Error(ApiError),
    Empty,
    Ready(T),
}

impl<T> ViewState<T> {
    /// Resolve a response into a screen state. `is_empty` decides when data
    /// should show the empty state instead.
    pub fn from_response(response: ApiResponse<T>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match response.into_result() {
            Ok(data) if is_empty(&data) => ViewState::Empty,
            Ok(data) => ViewState::Ready(data),
            Err(error) => ViewState::Error(error),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// Proof that a request was started. Compare with [`RequestTracker::is_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Last-request-wins guard.
///
/// Starting a request supersedes every earlier one; results for a superseded
/// ticket should be dropped. `cancel` supersedes everything, for teardown.
#[derive(Debug, Default)]
pub struct RequestTracker {
    generation: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Keep `value` only if `ticket` is still current.
    pub fn accept<T>(&self, ticket: &RequestTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(ticket = ticket.0, "discarding stale result");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Latency, RecipeService, RecipesApi};
    use crate::query::RecipeFilter;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_view_state_from_response() {
        let ready: ViewState<Vec<u8>> = ViewState::from_response(ApiResponse::ok(vec![1]), Vec::is_empty);
        assert_eq!(ready, ViewState::Ready(vec![1]));

        let empty: ViewState<Vec<u8>> = ViewState::from_response(ApiResponse::ok(vec![]), Vec::is_empty);
        assert_eq!(empty, ViewState::Empty);

        let error: ViewState<Vec<u8>> = ViewState::from_response(
            ApiResponse::fail(ApiError::not_found("Recipe not found.")),
            Vec::is_empty,
        );
        assert!(matches!(error, ViewState::Error(e) if e.is_not_found()));
    }

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let tracker = RequestTracker::new();
        let first = tracker.begin();
        assert!(tracker.is_current(&first));

        let second = tracker.begin();
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert_eq!(tracker.accept(&first, "stale"), None);
        assert_eq!(tracker.accept(&second, "fresh"), Some("fresh"));
    }

    #[test]
    fn test_cancel_supersedes_everything() {
        let tracker = RequestTracker::new();
        let ticket = tracker.begin();
        tracker.cancel();
        assert!(!tracker.is_current(&ticket));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_request_is_discarded() {
        let tracker = Arc::new(RequestTracker::new());
        let slow = RecipesApi::new().with_latency(Latency {
            list: Duration::from_millis(500),
            lookup: Duration::ZERO,
        });
        let fast = RecipesApi::new().with_latency(Latency::none());

        let stale_ticket = tracker.begin();
        let stale = {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                let response = slow.list_recipes(&RecipeFilter::default()).await;
                tracker.accept(&stale_ticket, response)
            })
        };

        let fresh_ticket = tracker.begin();
        let response = fast.get_recipe_by_id(Some("r-001")).await;
        assert!(tracker.accept(&fresh_ticket, response).is_some());

        assert!(stale.await.unwrap().is_none());
    }
}

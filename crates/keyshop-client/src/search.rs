//! # Debounced Search
//!
//! Search-as-you-type for the header search box and the search modal.
//!
//! ```text
//!  keystroke ─► on_input("ke")  gen=1 ─► sleep 300ms ─► gen still 1? ─► GET
//!  keystroke ─► on_input("key") gen=2 ─► sleep 300ms ─► gen still 2? ─► GET
//!                                │                            │
//!                                └─ gen=1 timer wakes, sees 2, exits
//!
//!  response for gen=N is dropped if another keystroke arrived meanwhile
//! ```
//!
//! Only the latest timer fires. Every keystroke bumps the generation, so
//! a response that arrives after a newer keystroke is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keyshop_core::highlight::highlight;
use keyshop_core::validation::validate_search_query;
use keyshop_core::ValidationError;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::{HighlightedHit, SearchEvent, EVENT_CHANNEL_CAPACITY};
use crate::source::ProductSource;

pub struct SearchController {
    source: Arc<dyn ProductSource>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    events: broadcast::Sender<SearchEvent>,
}

impl SearchController {
    pub fn new(source: Arc<dyn ProductSource>, debounce: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        SearchController {
            source,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.events.subscribe()
    }

    /// Handles the current contents of the search input.
    ///
    /// Empty or one-character input clears the results at once. Anything
    /// longer arms the debounce timer; the returned handle resolves when
    /// that timer has either fired its request or been superseded.
    pub fn on_input(&self, input: &str) -> Option<JoinHandle<()>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = match validate_search_query(input) {
            Ok(query) => query.to_string(),
            Err(ValidationError::TooLong { max, .. }) => {
                let _ = self.events.send(SearchEvent::Failed {
                    query: input.trim().to_string(),
                    message: format!("Search is limited to {max} characters"),
                });
                return None;
            }
            Err(_) => {
                let _ = self.events.send(SearchEvent::Cleared);
                return None;
            }
        };

        let source = Arc::clone(&self.source);
        let latest = Arc::clone(&self.generation);
        let events = self.events.clone();
        let debounce = self.debounce;

        Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }

            debug!(query = %query, "Searching");
            let result = source.search(&query).await;

            if latest.load(Ordering::SeqCst) != generation {
                debug!(query = %query, "Dropping stale search response");
                return;
            }

            let event = match result {
                Ok(hits) if hits.is_empty() => SearchEvent::NoResults { query },
                Ok(hits) => {
                    let hits = hits
                        .into_iter()
                        .map(|hit| HighlightedHit {
                            name_html: highlight(&hit.name, &query),
                            hit,
                        })
                        .collect();
                    SearchEvent::Results { query, hits }
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "Search failed");
                    SearchEvent::Failed {
                        query,
                        message: e.to_string(),
                    }
                }
            };
            let _ = events.send(event);
        }))
    }

    /// Abandons any pending timer or in-flight response, e.g. when the
    /// search modal closes.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::{MockProductSource, SourceCall};
    use keyshop_core::{Money, ProductId, SearchHit};

    fn hit(id: &str, name: &str) -> SearchHit {
        SearchHit {
            id: ProductId::from(id),
            name: name.to_string(),
            price: Money::from_cents(2499),
            category: Some("Keycaps".into()),
            image: None,
        }
    }

    fn controller(source: MockProductSource) -> (Arc<MockProductSource>, SearchController) {
        let source = Arc::new(source);
        let controller = SearchController::new(source.clone(), Duration::from_millis(300));
        (source, controller)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_keystroke_searches() {
        let (source, search) = controller(
            MockProductSource::new().with_hits("key", vec![hit("7", "Keycap Set")]),
        );
        let mut rx = search.subscribe();

        let first = search.on_input("ke").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = search.on_input("key ").unwrap();
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(source.calls(), vec![SourceCall::Search("key".into())]);
        match rx.recv().await.unwrap() {
            SearchEvent::Results { query, hits } => {
                assert_eq!(query, "key");
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].name_html, "<strong>Key</strong>cap Set");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_debounce() {
        let (source, search) = controller(MockProductSource::new());
        let handle = search.on_input("switch").unwrap();

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(source.calls().is_empty());

        handle.await.unwrap();
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_and_empty_input_clear_without_request() {
        let (source, search) = controller(MockProductSource::new());
        let mut rx = search.subscribe();

        assert!(search.on_input("   ").is_none());
        assert!(search.on_input("k").is_none());
        assert_eq!(rx.recv().await.unwrap(), SearchEvent::Cleared);
        assert_eq!(rx.recv().await.unwrap(), SearchEvent::Cleared);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_input_cancels_pending_search() {
        let (source, search) = controller(MockProductSource::new());
        let pending = search.on_input("keycap").unwrap();
        assert!(search.on_input("").is_none());
        pending.await.unwrap();
        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_dropped() {
        let (source, search) = controller(
            MockProductSource::new()
                .with_hits("cable", vec![hit("3", "Coiled Cable")])
                .with_delay(Duration::from_millis(500)),
        );
        let mut rx = search.subscribe();

        let in_flight = search.on_input("cable").unwrap();
        // Past the debounce, request now in flight.
        tokio::time::sleep(Duration::from_millis(350)).await;
        search.cancel();
        in_flight.await.unwrap();

        assert_eq!(source.calls().len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_results_and_failure() {
        let (source, search) = controller(MockProductSource::new());
        let mut rx = search.subscribe();

        search.on_input("zzz").unwrap().await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            SearchEvent::NoResults { query: "zzz".into() }
        );

        source.fail_next(1);
        search.on_input("zzz").unwrap().await.unwrap();
        assert!(matches!(rx.recv().await.unwrap(), SearchEvent::Failed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_highlight_escapes_markup() {
        let (_, search) = controller(
            MockProductSource::new().with_hits("<b", vec![hit("1", "<b>Bold</b> keys")]),
        );
        let mut rx = search.subscribe();

        search.on_input("<b").unwrap().await.unwrap();
        match rx.recv().await.unwrap() {
            SearchEvent::Results { hits, .. } => {
                assert_eq!(
                    hits[0].name_html,
                    "<strong>&lt;b</strong>&gt;Bold&lt;/b&gt; keys"
                );
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_too_long_query_reports_failure() {
        let source = Arc::new(MockProductSource::new());
        let search = SearchController::new(source, Duration::from_millis(300));
        let mut rx = search.subscribe();

        assert!(search.on_input(&"k".repeat(150)).is_none());
        assert!(matches!(rx.try_recv().unwrap(), SearchEvent::Failed { .. }));
    }
}

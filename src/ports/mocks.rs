use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::market_data::{FeedError, PriceFeed};
use crate::domain::Quote;

/// Mock price feed that replays scripted responses and counts calls.
/// Returns `FeedError::Exhausted` once the script runs out.
#[derive(Debug)]
pub struct ScriptedFeed<Q> {
    responses: Mutex<VecDeque<Result<Q, FeedError>>>,
    calls: AtomicUsize,
}

impl<Q> Default for ScriptedFeed<Q> {
    fn default() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<Q: Quote> ScriptedFeed<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to queue a successful quote
    pub fn with_quote(self, quote: Q) -> Self {
        self.push(Ok(quote));
        self
    }

    /// Builder method to queue a failure
    pub fn with_error(self, error: FeedError) -> Self {
        self.push(Err(error));
        self
    }

    /// Builder method to queue several quotes
    pub fn with_quotes<I: IntoIterator<Item = Q>>(self, quotes: I) -> Self {
        for quote in quotes {
            self.push(Ok(quote));
        }
        self
    }

    /// Number of `fetch` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn push(&self, response: Result<Q, FeedError>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }
}

#[async_trait]
impl<Q> PriceFeed for ScriptedFeed<Q>
where
    Q: Quote + Send + Sync + 'static,
{
    type Quote = Q;

    async fn fetch(&self) -> Result<Q, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(FeedError::Exhausted))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

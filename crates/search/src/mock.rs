//! Scripted transport mock for exercising the client layer in tests

use crate::error::SearchError;
use crate::query::SearchParams;
use crate::transport::{SearchTransport, TransportResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One recorded request the mock has served
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub collection: String,
    pub params: SearchParams,
    pub timeout: Duration,
}

/// A transport that replays scripted outcomes and records every request.
///
/// Responses are consumed in order; once the script is exhausted the
/// last scripted outcome repeats, so a single enqueued response serves
/// any number of calls.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<TransportResponse, SearchError>>>,
    last: Mutex<Option<Result<TransportResponse, SearchError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a response with the given status and JSON body
    pub fn enqueue_json(&self, status: u16, body: &str) {
        lock(&self.script).push_back(Ok(TransportResponse {
            status,
            body: body.to_string(),
        }));
    }

    /// Enqueue a transport-level failure
    pub fn enqueue_error(&self, error: SearchError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Number of search calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All requests served so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    fn clone_outcome(
        outcome: &Result<TransportResponse, SearchError>,
    ) -> Result<TransportResponse, SearchError> {
        match outcome {
            Ok(response) => Ok(response.clone()),
            Err(SearchError::Transport(m)) => Err(SearchError::Transport(m.clone())),
            Err(SearchError::Timeout(m)) => Err(SearchError::Timeout(m.clone())),
            Err(SearchError::Status { status, body }) => Err(SearchError::Status {
                status: *status,
                body: body.clone(),
            }),
            Err(SearchError::Parse(m)) => Err(SearchError::Parse(m.clone())),
            Err(SearchError::Config(m)) => Err(SearchError::Config(m.clone())),
            Err(SearchError::Other(m)) => Err(SearchError::Other(m.clone())),
        }
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
        timeout: Duration,
    ) -> Result<TransportResponse, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push(RecordedRequest {
            collection: collection.to_string(),
            params: params.clone(),
            timeout,
        });

        let next = lock(&self.script).pop_front();
        match next {
            Some(outcome) => {
                let result = Self::clone_outcome(&outcome);
                *lock(&self.last) = Some(outcome);
                result
            }
            None => match lock(&self.last).as_ref() {
                Some(outcome) => Self::clone_outcome(outcome),
                None => Err(SearchError::Other("mock script is empty".to_string())),
            },
        }
    }
}

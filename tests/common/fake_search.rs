//! Scripted fake of the logging search service.
//!
//! Responses are queued up front and consumed one per call, so pagination
//! and per-interval request sequences are fully deterministic. The fake
//! records every request it receives; harnesses assert on those to pin the
//! exact ranges, tokens, and call counts a shaper issued.
//!
//! # Example
//!
//! ```rust,no_run
//! use common::fake_search::FakeSearch;
//!
//! let fake = FakeSearch::new()
//!     .page(vec![/* rows */], Some("page-2"))
//!     .page(vec![/* rows */], None);
//!
//! // Hand `fake.clone()` to the code under test, then inspect `fake.calls()`.
//! ```

use ocilogs_search::{SearchError, SearchLogs, SearchPage, SearchRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum Script {
    /// Pop responses front to back; an exhausted queue serves empty final
    /// pages rather than panicking.
    Queue(VecDeque<Result<SearchPage, SearchError>>),
    /// Serve the same rows on every call, always with a continuation token.
    Endless(Vec<serde_json::Value>),
    /// Never resolve; the caller is expected to be cancelled.
    Hang,
}

struct Inner {
    script: Mutex<Script>,
    calls: Mutex<Vec<SearchRequest>>,
}

/// Handle to the scripted fake. Clones share the same script and call log,
/// so a harness can keep one handle for assertions after moving another
/// into a `Datasource`.
#[derive(Clone)]
pub struct FakeSearch {
    inner: Arc<Inner>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::with_script(Script::Queue(VecDeque::new()))
    }

    /// A fake that serves `rows` with a continuation token on every call,
    /// for exercising pagination caps.
    pub fn endless(rows: Vec<serde_json::Value>) -> Self {
        Self::with_script(Script::Endless(rows))
    }

    /// A fake whose calls never resolve, for exercising cancellation.
    pub fn hanging() -> Self {
        Self::with_script(Script::Hang)
    }

    fn with_script(script: Script) -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Queue a successful page. `next` is the continuation token handed to
    /// the caller; `None` marks the last page.
    pub fn page(self, rows: Vec<serde_json::Value>, next: Option<&str>) -> Self {
        self.push(Ok(SearchPage::new(rows, next.map(str::to_string))));
        self
    }

    /// Queue a failure.
    pub fn error(self, error: SearchError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, response: Result<SearchPage, SearchError>) {
        match &mut *self.inner.script.lock().unwrap() {
            Script::Queue(queue) => queue.push_back(response),
            _ => panic!("FakeSearch: cannot queue responses onto an endless or hanging script"),
        }
    }

    /// Every request this fake has received, in order.
    pub fn calls(&self) -> Vec<SearchRequest> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().unwrap().len()
    }
}

impl Default for FakeSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchLogs for FakeSearch {
    async fn search_logs(&self, request: &SearchRequest) -> Result<SearchPage, SearchError> {
        self.inner.calls.lock().unwrap().push(request.clone());
        let response = {
            let mut script = self.inner.script.lock().unwrap();
            match &mut *script {
                Script::Queue(queue) => {
                    Some(queue.pop_front().unwrap_or_else(|| Ok(SearchPage::default())))
                }
                Script::Endless(rows) => {
                    let mut page = SearchPage::new(rows.clone(), None);
                    page.next_page = Some("more".to_string());
                    Some(Ok(page))
                }
                Script::Hang => None,
            }
        };
        match response {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

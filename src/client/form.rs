use std::fmt;

use clap::ValueEnum;

use crate::api::models::SearchRequest;
use crate::data_models::SearchHit;

use super::{FailureKind, SearchOutcome};

/// Which completions may touch the form when submissions overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OrderingPolicy {
    /// Every completion is applied as it arrives, so whichever resolves last
    /// decides the final state.
    #[default]
    LastResponse,
    /// Only the newest submission's completion is applied; earlier ones are
    /// dropped and loading lasts until the newest one completes.
    LatestRequest,
}

/// A submission that has been accepted and must be sent exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub seq: u64,
    pub request: SearchRequest,
}

/// Error notification shown to the user when a submission fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

/// State of the search form. Fields change only through the setters and
/// the transition methods below.
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    url: String,
    query: String,
    results: Vec<SearchHit>,
    loading: bool,
    policy: OrderingPolicy,
    next_seq: u64,
    latest_seq: Option<u64>,
}

impl SearchForm {
    pub fn new(policy: OrderingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Both fields are required; an empty one blocks submission.
    pub fn can_submit(&self) -> bool {
        !self.url.is_empty() && !self.query.is_empty()
    }

    /// Enters loading, clears results and hands out the request to send.
    /// Returns `None` (and changes nothing) when a field is empty.
    pub fn start_submit(&mut self) -> Option<Submission> {
        if !self.can_submit() {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        self.loading = true;
        self.results.clear();
        Some(Submission {
            seq,
            request: SearchRequest {
                url: self.url.clone(),
                query: self.query.clone(),
            },
        })
    }

    fn accepts(&self, seq: u64) -> bool {
        if seq >= self.next_seq {
            return false;
        }
        match self.policy {
            OrderingPolicy::LatestRequest => self.latest_seq == Some(seq),
            OrderingPolicy::LastResponse => true,
        }
    }

    /// Applies a successful completion. Returns whether it was applied.
    pub fn receive_success(&mut self, seq: u64, results: Vec<SearchHit>) -> bool {
        if !self.accepts(seq) {
            log::debug!("dropping stale results for submission {seq}");
            return false;
        }
        self.results = results;
        self.loading = false;
        true
    }

    /// Applies a failed completion and returns the alert to show, if the
    /// completion was applied. Results are left as they are.
    pub fn receive_failure(
        &mut self,
        seq: u64,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Option<Alert> {
        if !self.accepts(seq) {
            log::debug!("dropping stale failure for submission {seq}");
            return None;
        }
        self.loading = false;
        Some(Alert {
            kind,
            message: message.into(),
        })
    }

    pub fn apply(&mut self, seq: u64, outcome: SearchOutcome) -> Option<Alert> {
        match outcome {
            SearchOutcome::Success { results } => {
                self.receive_success(seq, results);
                None
            }
            SearchOutcome::Failure { kind, message } => self.receive_failure(seq, kind, message),
        }
    }
}

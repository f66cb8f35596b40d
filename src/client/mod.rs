//! Terminal search form: state, transitions, rendering and the HTTP client
//! that backs a submission.

use std::fmt;

use crate::data_models::SearchHit;

pub mod form;
pub mod http;
pub mod render;
pub mod session;

pub use form::{Alert, OrderingPolicy, SearchForm, Submission};
pub use http::{ClientError, SearchClient};
pub use render::{FormView, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced a readable response.
    Network,
    /// The response body could not be turned into results.
    Parse,
    /// Non-success status with a body that is not usable JSON.
    Server,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Network => "network",
            FailureKind::Parse => "parse",
            FailureKind::Server => "server",
        };
        f.write_str(name)
    }
}

/// What a single submission ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Success { results: Vec<SearchHit> },
    Failure { kind: FailureKind, message: String },
}

impl SearchOutcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        SearchOutcome::Failure {
            kind,
            message: message.into(),
        }
    }
}

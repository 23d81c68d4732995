use serde::{Deserialize, Serialize};

use crate::{
    models::GameRecord,
    query::{FilterRequest, ResultPage},
};

/// Lifecycle of the most recently issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// Nothing has been requested yet.
    Idle,
    /// A query is in flight.
    Loading,
    /// The latest query completed, possibly with zero matches.
    Ready,
    /// The catalog could not be loaded.
    Failed,
}

/// Snapshot published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Lifecycle of the latest issued query.
    pub status: QueryStatus,
    /// Page of the latest completed query. Kept while loading and after a
    /// failure so the previous grid can stay on screen.
    pub result: Option<ResultPage>,
    /// User-facing description of the latest failure.
    pub error: Option<String>,
    /// Request the current status refers to.
    pub request: FilterRequest,
    /// Generation of the latest issued query; 0 before the first one.
    pub generation: u64,
}

impl SessionState {
    pub(crate) fn idle(request: FilterRequest) -> Self {
        Self {
            status: QueryStatus::Idle,
            result: None,
            error: None,
            request,
            generation: 0,
        }
    }

    /// Whether the latest issued query has completed, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, QueryStatus::Ready | QueryStatus::Failed)
    }

    /// Ready with zero matches. Not an error.
    pub fn is_empty(&self) -> bool {
        self.status == QueryStatus::Ready
            && self.result.as_ref().map(ResultPage::is_empty).unwrap_or(true)
    }

    /// Records to render, possibly stale while loading or failed.
    pub fn visible_items(&self) -> &[GameRecord] {
        self.result
            .as_ref()
            .map(|page| page.items.as_slice())
            .unwrap_or(&[])
    }
}

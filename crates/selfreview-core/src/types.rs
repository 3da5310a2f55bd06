//! Common types shared by the resolver, the API clients and the tool layer.

use serde::{Deserialize, Serialize};

// =============================================================================
// Tool results
// =============================================================================

/// One entry in the "my open pull requests" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub url: String,
    /// Base branch ref (merge target)
    pub base: String,
    /// Head branch ref (source)
    pub head: String,
    pub repo_owner: String,
    pub repo_name: String,
}

/// A file changed by a pull request, as reported by the files listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestFile {
    pub filename: String,
    /// added, removed, modified, renamed, copied, changed, unchanged
    pub status: String,
    pub additions: u32,
    pub deletions: u32,
    pub changes: u32,
    /// Unified diff hunk; absent for binary or very large files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    pub blob_url: String,
    pub contents_url: String,
}

/// Full content of a pull request: summary, changed files and description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestContent {
    pub pr: PullRequestSummary,
    pub files: Vec<PullRequestFile>,
    pub description: String,
}

/// A plain (non-diff) comment posted on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub url: String,
    pub body: String,
    pub user: String,
}

/// A submitted pull request review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Listing of open pull requests together with the number of search hits
/// that were dropped while resolving them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestListing {
    pub pull_requests: Vec<PullRequestSummary>,
    pub skipped: usize,
}

// =============================================================================
// Remote API records
// =============================================================================

/// The account the API credential belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
}

/// One result of an issue/PR search. Carries no branch refs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub number: u64,
    pub title: String,
    pub html_url: String,
}

/// Pull request details as returned by the single-PR endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetails {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub base_ref: String,
    pub head_ref: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// Review event sent with a new review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    Approve,
    RequestChanges,
    Comment,
}

impl ReviewEvent {
    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewEvent::Approve => "APPROVE",
            ReviewEvent::RequestChanges => "REQUEST_CHANGES",
            ReviewEvent::Comment => "COMMENT",
        }
    }
}

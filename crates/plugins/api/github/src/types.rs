//! Raw GitHub REST payloads.
//!
//! Only the fields the client maps into core types are declared; serde
//! ignores the rest of each response.

use serde::{Deserialize, Serialize};

/// `GET /user`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// `GET /search/issues`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSearchResult {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<GitHubSearchItem>,
}

/// One search hit. PRs come back from the issue search as issues.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSearchItem {
    pub number: u64,
    pub title: String,
    pub html_url: String,
}

/// `GET /repos/{owner}/{repo}/pulls/{number}`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub head: GitHubBranchRef,
    pub base: GitHubBranchRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubBranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// Entry of `GET /repos/{owner}/{repo}/pulls/{number}/files`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubFile {
    pub filename: String,
    pub status: String,
    pub additions: u32,
    pub deletions: u32,
    pub changes: u32,
    /// Absent for binary files and very large diffs
    #[serde(default)]
    pub patch: Option<String>,
    pub blob_url: String,
    pub contents_url: String,
}

/// Issue comment, the kind shown in a PR conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubComment {
    #[serde(default)]
    pub body: String,
    pub html_url: String,
    #[serde(default)]
    pub user: Option<GitHubUser>,
}

/// Pull request review.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubReview {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Body of `POST .../issues/{number}/comments`
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommentRequest<'a> {
    pub body: &'a str,
}

/// Body of `POST .../pulls/{number}/reviews`
#[derive(Debug, Clone, Serialize)]
pub struct CreateReviewRequest<'a> {
    pub body: &'a str,
    pub event: &'static str,
}

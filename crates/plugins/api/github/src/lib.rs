//! GitHub provider implementation for selfreview.
//!
//! This crate implements [`selfreview_core::PullRequestApi`] against the
//! GitHub REST API (github.com or GitHub Enterprise).

mod client;
mod types;

pub use client::GitHubClient;
pub use types::*;

/// Default GitHub API URL.
pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";

/// Default User-Agent header (GitHub rejects requests without one).
pub const DEFAULT_USER_AGENT: &str = "selfreview";

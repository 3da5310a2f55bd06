//! Core traits, types, and pull request resolution for selfreview.
//!
//! This crate owns everything between the tool dispatcher and the remote API:
//! the shared PR URL parser, the [`PullRequestApi`] seam, and the
//! [`PullRequestResolver`] that aggregates several API calls into one result.

pub mod config;
pub mod error;
pub mod provider;
pub mod reference;
pub mod resolver;
pub mod types;

pub use error::{Error, Result};
pub use provider::PullRequestApi;
pub use reference::{parse_pr_reference, PullRequestRef};
pub use resolver::PullRequestResolver;
pub use types::*;

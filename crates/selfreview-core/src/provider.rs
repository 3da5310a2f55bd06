//! Remote API seam used by the resolver.

use async_trait::async_trait;

use crate::error::Result;
use crate::reference::PullRequestRef;
use crate::types::{
    AuthenticatedUser, Comment, PullRequestDetails, PullRequestFile, Review, ReviewEvent,
    SearchHit,
};

/// Calls the resolver needs from a git hosting API.
///
/// Each method maps to a single remote request; aggregation and partial
/// failure handling live in [`crate::PullRequestResolver`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestApi: Send + Sync {
    /// Short name of the hosting service behind this seam, used in logs
    fn provider_name(&self) -> &'static str;

    /// Get the account the credential belongs to
    async fn current_user(&self) -> Result<AuthenticatedUser>;

    /// Run an issue/PR search and return the first page of hits
    async fn search_pull_requests(&self, query: &str, per_page: u32) -> Result<Vec<SearchHit>>;

    /// Get details (title, refs, body) of a single pull request
    async fn get_pull_request(&self, pr: &PullRequestRef) -> Result<PullRequestDetails>;

    /// Get the first page of files changed by a pull request
    async fn list_files(&self, pr: &PullRequestRef, per_page: u32) -> Result<Vec<PullRequestFile>>;

    /// Post a plain comment on the pull request conversation
    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<Comment>;

    /// Submit a review with the given event
    async fn create_review(
        &self,
        pr: &PullRequestRef,
        body: &str,
        event: ReviewEvent,
    ) -> Result<Review>;
}

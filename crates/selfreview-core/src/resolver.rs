//! Pull request resolution and aggregation.
//!
//! The remote API has no "get everything" endpoint, so each operation here
//! combines several [`PullRequestApi`] calls. Listing tolerates per-item
//! failures; every other operation is all-or-nothing.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::provider::PullRequestApi;
use crate::reference::{parse_pr_reference, PullRequestRef};
use crate::types::{
    Comment, PullRequestContent, PullRequestDetails, PullRequestListing, PullRequestSummary,
    Review, ReviewEvent,
};

/// Largest page the search endpoint returns. Only the first page is read.
pub const SEARCH_PAGE_SIZE: u32 = 100;

/// Largest page the PR files endpoint returns. Only the first page is read.
pub const FILES_PAGE_SIZE: u32 = 100;

/// Resolves pull request URLs and aggregates remote state into tool results.
#[derive(Clone)]
pub struct PullRequestResolver {
    api: Arc<dyn PullRequestApi>,
}

impl PullRequestResolver {
    /// Create a resolver over an authenticated API handle.
    pub fn new(api: Arc<dyn PullRequestApi>) -> Self {
        Self { api }
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &'static str {
        self.api.provider_name()
    }

    /// List open pull requests authored by the authenticated user.
    ///
    /// Search hits whose URL cannot be resolved, or whose detail fetch fails,
    /// are left out. Search order is preserved.
    pub async fn list_my_open_pull_requests(&self) -> Result<Vec<PullRequestSummary>> {
        Ok(self.list_my_open_pull_requests_report().await?.pull_requests)
    }

    /// Same as [`Self::list_my_open_pull_requests`], also reporting how many
    /// search hits were skipped.
    pub async fn list_my_open_pull_requests_report(&self) -> Result<PullRequestListing> {
        let user = self.api.current_user().await?;

        let query = format!("is:pr is:open author:{}", user.login);
        let hits = self
            .api
            .search_pull_requests(&query, SEARCH_PAGE_SIZE)
            .await?;

        debug!(login = %user.login, hits = hits.len(), "Searched open pull requests");

        let mut listing = PullRequestListing::default();

        for hit in hits {
            let Ok(resolved) = parse_pr_reference(&hit.html_url) else {
                debug!(url = %hit.html_url, "Skipping search hit with unresolvable URL");
                listing.skipped += 1;
                continue;
            };

            let pr = PullRequestRef {
                number: hit.number,
                ..resolved
            };

            let details = match self.api.get_pull_request(&pr).await {
                Ok(details) => details,
                Err(e) => {
                    warn!(pr = %pr, error = %e, "Failed to get PR details, skipping");
                    listing.skipped += 1;
                    continue;
                }
            };

            listing.pull_requests.push(PullRequestSummary {
                number: hit.number,
                title: hit.title,
                url: hit.html_url,
                base: details.base_ref,
                head: details.head_ref,
                repo_owner: pr.owner,
                repo_name: pr.repo,
            });
        }

        info!(
            count = listing.pull_requests.len(),
            skipped = listing.skipped,
            "Listed open pull requests"
        );

        Ok(listing)
    }

    /// Get details, changed files and description of a pull request.
    pub async fn get_pull_request_content(&self, url: &str) -> Result<PullRequestContent> {
        let pr = parse_pr_reference(url)?;

        let details = self.api.get_pull_request(&pr).await?;
        let files = self.api.list_files(&pr, FILES_PAGE_SIZE).await?;

        debug!(pr = %pr, files = files.len(), "Fetched pull request content");

        let description = details.body.clone().unwrap_or_default();
        Ok(PullRequestContent {
            pr: summary_from_details(&pr, details),
            files,
            description,
        })
    }

    /// Post a plain comment on a pull request.
    pub async fn comment_on_pull_request(&self, url: &str, body: &str) -> Result<Comment> {
        let pr = parse_pr_reference(url)?;
        let comment = self.api.create_comment(&pr, body).await?;

        info!(pr = %pr, url = %comment.url, "Commented on pull request");
        Ok(comment)
    }

    /// Submit a review on a pull request.
    ///
    /// The event is always [`ReviewEvent::Comment`]: reviews can annotate a
    /// pull request but never approve it or request changes.
    pub async fn submit_pull_request_review(&self, url: &str, review_body: &str) -> Result<Review> {
        let pr = parse_pr_reference(url)?;
        let review = self
            .api
            .create_review(&pr, review_body, ReviewEvent::Comment)
            .await?;

        info!(pr = %pr, "Submitted review");
        Ok(review)
    }
}

fn summary_from_details(pr: &PullRequestRef, details: PullRequestDetails) -> PullRequestSummary {
    PullRequestSummary {
        number: details.number,
        title: details.title,
        url: details.html_url,
        base: details.base_ref,
        head: details.head_ref,
        repo_owner: pr.owner.clone(),
        repo_name: pr.repo.clone(),
    }
}

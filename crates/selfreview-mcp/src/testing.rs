//! In-memory pull request API shared by the handler and server tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use selfreview_core::{
    AuthenticatedUser, Comment, Error, PullRequestApi, PullRequestDetails, PullRequestFile,
    PullRequestRef, Result, Review, ReviewEvent, SearchHit,
};

/// Fake API that records how many remote calls were made.
///
/// The search always returns PRs #1 to #3 of `acme/widgets`.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub calls: AtomicUsize,
    /// Detail fetch for this PR number fails with NotFound.
    pub failing_number: Option<u64>,
    /// Looking up the current user never completes.
    pub hang: bool,
}

impl FakeApi {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PullRequestApi for FakeApi {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn current_user(&self) -> Result<AuthenticatedUser> {
        self.record();
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(AuthenticatedUser {
            login: "octocat".to_string(),
        })
    }

    async fn search_pull_requests(
        &self,
        _query: &str,
        _per_page: u32,
    ) -> Result<Vec<SearchHit>> {
        self.record();
        Ok((1..=3)
            .map(|n| SearchHit {
                number: n,
                title: format!("PR {}", n),
                html_url: format!("https://github.com/acme/widgets/pull/{}", n),
            })
            .collect())
    }

    async fn get_pull_request(&self, pr: &PullRequestRef) -> Result<PullRequestDetails> {
        self.record();
        if Some(pr.number) == self.failing_number {
            return Err(Error::NotFound("Not Found".to_string()));
        }
        Ok(PullRequestDetails {
            number: pr.number,
            title: format!("PR {}", pr.number),
            html_url: format!("https://github.com/acme/widgets/pull/{}", pr.number),
            base_ref: "main".to_string(),
            head_ref: "feature".to_string(),
            body: Some("Description".to_string()),
        })
    }

    async fn list_files(
        &self,
        _pr: &PullRequestRef,
        _per_page: u32,
    ) -> Result<Vec<PullRequestFile>> {
        self.record();
        Ok(vec![PullRequestFile {
            filename: "src/lib.rs".to_string(),
            status: "modified".to_string(),
            additions: 1,
            deletions: 1,
            changes: 2,
            patch: Some("@@ -1 +1 @@".to_string()),
            blob_url: "https://github.com/acme/widgets/blob/abc/src/lib.rs".to_string(),
            contents_url: "https://api.github.com/repos/acme/widgets/contents/src/lib.rs"
                .to_string(),
        }])
    }

    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<Comment> {
        self.record();
        Ok(Comment {
            url: format!(
                "https://github.com/{}/{}/pull/{}#issuecomment-1",
                pr.owner, pr.repo, pr.number
            ),
            body: body.to_string(),
            user: "octocat".to_string(),
        })
    }

    async fn create_review(
        &self,
        _pr: &PullRequestRef,
        body: &str,
        event: ReviewEvent,
    ) -> Result<Review> {
        self.record();
        assert_eq!(event, ReviewEvent::Comment);
        Ok(Review {
            body: body.to_string(),
            url: None,
        })
    }
}

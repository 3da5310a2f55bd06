//! GitHub API client implementation.

use async_trait::async_trait;
use selfreview_core::{
    AuthenticatedUser, Comment, Error, PullRequestApi, PullRequestDetails, PullRequestFile,
    PullRequestRef, Result, Review, ReviewEvent, SearchHit,
};
use tracing::{debug, warn};

use crate::types::{
    CreateCommentRequest, CreateReviewRequest, GitHubComment, GitHubFile, GitHubPullRequest,
    GitHubReview, GitHubSearchItem, GitHubSearchResult, GitHubUser,
};
use crate::{DEFAULT_GITHUB_URL, DEFAULT_USER_AGENT};

/// GitHub API client.
///
/// Holds an immutable credential and a pooled HTTP client, so one instance
/// can serve every tool call for the lifetime of the process.
pub struct GitHubClient {
    base_url: String,
    token: String,
    user_agent: String,
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new GitHub client.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_GITHUB_URL, token)
    }

    /// Create a new GitHub client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// API base URL in use.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build request with common headers.
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", &self.user_agent)
    }

    /// Get the repository-scoped API URL for a pull request endpoint.
    fn repo_url(&self, pr: &PullRequestRef, endpoint: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url, pr.owner, pr.repo, endpoint
        )
    }

    /// Make an authenticated GET request with typed deserialization.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(url = url, "GitHub GET request");

        let response = self
            .request(reqwest::Method::GET, url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Make an authenticated POST request.
    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        debug!(url = url, "GitHub POST request");

        let response = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle response and map errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                message = message,
                "GitHub API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }
}

// =============================================================================
// Mapping functions: GitHub types -> core types
// =============================================================================

fn map_search_hit(item: GitHubSearchItem) -> SearchHit {
    SearchHit {
        number: item.number,
        title: item.title,
        html_url: item.html_url,
    }
}

fn map_pull_request(pr: GitHubPullRequest) -> PullRequestDetails {
    PullRequestDetails {
        number: pr.number,
        title: pr.title,
        html_url: pr.html_url,
        base_ref: pr.base.ref_name,
        head_ref: pr.head.ref_name,
        body: pr.body,
    }
}

fn map_file(file: GitHubFile) -> PullRequestFile {
    PullRequestFile {
        filename: file.filename,
        status: file.status,
        additions: file.additions,
        deletions: file.deletions,
        changes: file.changes,
        patch: file.patch,
        blob_url: file.blob_url,
        contents_url: file.contents_url,
    }
}

fn map_comment(comment: GitHubComment) -> Comment {
    Comment {
        url: comment.html_url,
        body: comment.body,
        user: comment.user.map(|u| u.login).unwrap_or_default(),
    }
}

fn map_review(review: GitHubReview) -> Review {
    Review {
        body: review.body.unwrap_or_default(),
        url: review.html_url,
    }
}

#[async_trait]
impl PullRequestApi for GitHubClient {
    fn provider_name(&self) -> &'static str {
        "github"
    }

    async fn current_user(&self) -> Result<AuthenticatedUser> {
        let url = format!("{}/user", self.base_url);
        let user: GitHubUser = self.get(&url, &[]).await?;
        Ok(AuthenticatedUser { login: user.login })
    }

    async fn search_pull_requests(&self, query: &str, per_page: u32) -> Result<Vec<SearchHit>> {
        let url = format!("{}/search/issues", self.base_url);
        let result: GitHubSearchResult = self
            .get(
                &url,
                &[("q", query.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;

        if result.incomplete_results {
            warn!(query = query, "GitHub search returned incomplete results");
        }
        debug!(
            total = result.total_count,
            returned = result.items.len(),
            "GitHub search completed"
        );

        Ok(result.items.into_iter().map(map_search_hit).collect())
    }

    async fn get_pull_request(&self, pr: &PullRequestRef) -> Result<PullRequestDetails> {
        let url = self.repo_url(pr, &format!("/pulls/{}", pr.number));
        let gh_pr: GitHubPullRequest = self.get(&url, &[]).await?;
        Ok(map_pull_request(gh_pr))
    }

    async fn list_files(&self, pr: &PullRequestRef, per_page: u32) -> Result<Vec<PullRequestFile>> {
        let url = self.repo_url(pr, &format!("/pulls/{}/files", pr.number));
        let files: Vec<GitHubFile> = self
            .get(&url, &[("per_page", per_page.to_string())])
            .await?;
        Ok(files.into_iter().map(map_file).collect())
    }

    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<Comment> {
        // PR conversation comments live on the issues endpoint
        let url = self.repo_url(pr, &format!("/issues/{}/comments", pr.number));
        let comment: GitHubComment = self.post(&url, &CreateCommentRequest { body }).await?;
        Ok(map_comment(comment))
    }

    async fn create_review(
        &self,
        pr: &PullRequestRef,
        body: &str,
        event: ReviewEvent,
    ) -> Result<Review> {
        let url = self.repo_url(pr, &format!("/pulls/{}/reviews", pr.number));
        let request = CreateReviewRequest {
            body,
            event: event.as_str(),
        };
        let review: GitHubReview = self.post(&url, &request).await?;
        Ok(map_review(review))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = GitHubClient::with_base_url("https://github.example.com/api/v3/", "t");
        assert_eq!(client.base_url(), "https://github.example.com/api/v3");
    }

    #[test]
    fn test_map_comment_without_user() {
        let comment = map_comment(GitHubComment {
            body: "hi".to_string(),
            html_url: "https://github.com/acme/widgets/pull/1#issuecomment-1".to_string(),
            user: None,
        });
        assert_eq!(comment.user, "");
        assert_eq!(comment.body, "hi");
    }

    #[test]
    fn test_map_review_without_body() {
        let review = map_review(GitHubReview {
            body: None,
            html_url: None,
        });
        assert_eq!(review.body, "");
        assert!(review.url.is_none());
    }

    // =========================================================================
    // Integration tests with httpmock
    // =========================================================================

    mod integration {
        use super::*;
        use httpmock::prelude::*;

        fn create_test_client(server: &MockServer) -> GitHubClient {
            GitHubClient::with_base_url(server.base_url(), "test-token")
        }

        fn acme_42() -> PullRequestRef {
            PullRequestRef {
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
                number: 42,
            }
        }

        fn pull_request_json(number: u64) -> serde_json::Value {
            serde_json::json!({
                "id": 1000 + number,
                "number": number,
                "title": "Add widget frobnicator",
                "body": "Frobnicates widgets.",
                "state": "open",
                "html_url": format!("https://github.com/acme/widgets/pull/{}", number),
                "draft": false,
                "user": {"id": 1, "login": "octocat"},
                "head": {"ref": "feature/frob", "sha": "abc123"},
                "base": {"ref": "main", "sha": "def456"}
            })
        }

        #[tokio::test]
        async fn test_current_user() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/user")
                    .header("Authorization", "Bearer test-token")
                    .header("Accept", "application/vnd.github+json")
                    .header("X-GitHub-Api-Version", "2022-11-28")
                    .header("User-Agent", DEFAULT_USER_AGENT);
                then.status(200)
                    .json_body(serde_json::json!({"id": 1, "login": "octocat", "name": "The Octocat"}));
            });

            let client = create_test_client(&server);
            let user = client.current_user().await.unwrap();

            mock.assert();
            assert_eq!(user.login, "octocat");
        }

        #[tokio::test]
        async fn test_custom_user_agent() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET).path("/user").header("User-Agent", "review-bot");
                then.status(200)
                    .json_body(serde_json::json!({"id": 1, "login": "octocat"}));
            });

            let client = create_test_client(&server).with_user_agent("review-bot");
            client.current_user().await.unwrap();

            mock.assert();
        }

        #[tokio::test]
        async fn test_search_pull_requests() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/search/issues")
                    .query_param("q", "is:pr is:open author:octocat")
                    .query_param("per_page", "100");
                then.status(200).json_body(serde_json::json!({
                    "total_count": 2,
                    "incomplete_results": false,
                    "items": [
                        {
                            "id": 11,
                            "number": 7,
                            "title": "First",
                            "html_url": "https://github.com/acme/widgets/pull/7",
                            "state": "open",
                            "pull_request": {"url": "https://api.github.com/repos/acme/widgets/pulls/7"}
                        },
                        {
                            "id": 12,
                            "number": 3,
                            "title": "Second",
                            "html_url": "https://github.com/other/tools/pull/3",
                            "state": "open"
                        }
                    ]
                }));
            });

            let client = create_test_client(&server);
            let hits = client
                .search_pull_requests("is:pr is:open author:octocat", 100)
                .await
                .unwrap();

            mock.assert();
            assert_eq!(hits.len(), 2);
            assert_eq!(hits[0].number, 7);
            assert_eq!(hits[0].title, "First");
            assert_eq!(hits[1].html_url, "https://github.com/other/tools/pull/3");
        }

        #[tokio::test]
        async fn test_get_pull_request() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/repos/acme/widgets/pulls/42");
                then.status(200).json_body(pull_request_json(42));
            });

            let client = create_test_client(&server);
            let details = client.get_pull_request(&acme_42()).await.unwrap();

            assert_eq!(details.number, 42);
            assert_eq!(details.base_ref, "main");
            assert_eq!(details.head_ref, "feature/frob");
            assert_eq!(details.body.as_deref(), Some("Frobnicates widgets."));
        }

        #[tokio::test]
        async fn test_get_pull_request_not_found() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/repos/acme/widgets/pulls/42");
                then.status(404)
                    .json_body(serde_json::json!({"message": "Not Found"}));
            });

            let client = create_test_client(&server);
            let err = client.get_pull_request(&acme_42()).await.unwrap_err();

            assert!(matches!(err, Error::NotFound(_)));
        }

        #[tokio::test]
        async fn test_rate_limited() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/user");
                then.status(403).json_body(
                    serde_json::json!({"message": "API rate limit exceeded for user ID 1."}),
                );
            });

            let client = create_test_client(&server);
            let err = client.current_user().await.unwrap_err();

            assert!(matches!(err, Error::RateLimited(_)));
        }

        #[tokio::test]
        async fn test_invalid_json_response() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/repos/acme/widgets/pulls/42");
                then.status(200).body("<html>not json</html>");
            });

            let client = create_test_client(&server);
            let err = client.get_pull_request(&acme_42()).await.unwrap_err();

            assert!(matches!(err, Error::InvalidData(_)));
        }

        #[tokio::test]
        async fn test_list_files() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/repos/acme/widgets/pulls/42/files")
                    .query_param("per_page", "100");
                then.status(200).json_body(serde_json::json!([
                    {
                        "sha": "aaa",
                        "filename": "src/frob.rs",
                        "status": "added",
                        "additions": 10,
                        "deletions": 0,
                        "changes": 10,
                        "patch": "@@ -0,0 +1,10 @@\n+fn frob() {}",
                        "blob_url": "https://github.com/acme/widgets/blob/abc123/src/frob.rs",
                        "contents_url": "https://api.github.com/repos/acme/widgets/contents/src/frob.rs?ref=abc123"
                    },
                    {
                        "sha": "bbb",
                        "filename": "assets/logo.png",
                        "status": "modified",
                        "additions": 0,
                        "deletions": 0,
                        "changes": 0,
                        "blob_url": "https://github.com/acme/widgets/blob/abc123/assets/logo.png",
                        "contents_url": "https://api.github.com/repos/acme/widgets/contents/assets/logo.png?ref=abc123"
                    }
                ]));
            });

            let client = create_test_client(&server);
            let files = client.list_files(&acme_42(), 100).await.unwrap();

            mock.assert();
            assert_eq!(files.len(), 2);
            assert_eq!(files[0].filename, "src/frob.rs");
            assert_eq!(files[0].additions, 10);
            assert!(files[0].patch.as_deref().unwrap().contains("fn frob"));
            assert!(files[1].patch.is_none());
        }

        #[tokio::test]
        async fn test_create_comment() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/repos/acme/widgets/issues/42/comments")
                    .header("Authorization", "Bearer test-token")
                    .json_body(serde_json::json!({"body": "Looks good"}));
                then.status(201).json_body(serde_json::json!({
                    "id": 99,
                    "body": "Looks good",
                    "html_url": "https://github.com/acme/widgets/pull/42#issuecomment-99",
                    "user": {"id": 1, "login": "octocat"}
                }));
            });

            let client = create_test_client(&server);
            let comment = client
                .create_comment(&acme_42(), "Looks good")
                .await
                .unwrap();

            mock.assert();
            assert_eq!(
                comment.url,
                "https://github.com/acme/widgets/pull/42#issuecomment-99"
            );
            assert_eq!(comment.body, "Looks good");
            assert_eq!(comment.user, "octocat");
        }

        #[tokio::test]
        async fn test_create_comment_forbidden() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(POST).path("/repos/acme/widgets/issues/42/comments");
                then.status(403)
                    .json_body(serde_json::json!({"message": "Resource not accessible by integration"}));
            });

            let client = create_test_client(&server);
            let err = client.create_comment(&acme_42(), "hi").await.unwrap_err();

            assert!(matches!(err, Error::Forbidden(_)));
        }

        #[tokio::test]
        async fn test_create_review_sends_event() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/repos/acme/widgets/pulls/42/reviews")
                    .json_body(serde_json::json!({"body": "A few notes", "event": "COMMENT"}));
                then.status(200).json_body(serde_json::json!({
                    "id": 5,
                    "user": {"id": 1, "login": "octocat"},
                    "body": "A few notes",
                    "state": "COMMENTED",
                    "html_url": "https://github.com/acme/widgets/pull/42#pullrequestreview-5"
                }));
            });

            let client = create_test_client(&server);
            let review = client
                .create_review(&acme_42(), "A few notes", ReviewEvent::Comment)
                .await
                .unwrap();

            mock.assert();
            assert_eq!(review.body, "A few notes");
            assert_eq!(
                review.url.as_deref(),
                Some("https://github.com/acme/widgets/pull/42#pullrequestreview-5")
            );
        }

        #[tokio::test]
        async fn test_connection_error() {
            let client = GitHubClient::with_base_url("http://127.0.0.1:1", "test-token");
            let err = client.current_user().await.unwrap_err();

            assert!(matches!(err, Error::Http(_)));
        }
    }
}

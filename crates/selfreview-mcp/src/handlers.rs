//! Tool handlers for MCP server.
//!
//! This module maps tool names to resolver operations, validates arguments
//! and turns results into JSON text content. Every tool reports failures the
//! same way: an error result whose text names the operation and carries the
//! underlying error message.

use std::collections::HashMap;

use selfreview_core::{Error, PullRequestResolver, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{ToolCallResult, ToolDefinition};

/// Tools exposed by the server. Names are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ListMyPullRequests,
    GetPullRequestContent,
    CommentOnPr,
    SubmitPrReview,
}

impl Tool {
    /// All tools, in the order they are listed.
    pub const ALL: [Tool; 4] = [
        Tool::ListMyPullRequests,
        Tool::GetPullRequestContent,
        Tool::CommentOnPr,
        Tool::SubmitPrReview,
    ];

    /// Wire name of the tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::ListMyPullRequests => "list_my_pull_requests",
            Tool::GetPullRequestContent => "get_pull_request_content",
            Tool::CommentOnPr => "comment_on_pr",
            Tool::SubmitPrReview => "submit_pr_review",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Tool::ListMyPullRequests => {
                "List my open pull requests across all repositories, with base and head branches"
            }
            Tool::GetPullRequestContent => {
                "Get a pull request's details, description and changed files with their diffs"
            }
            Tool::CommentOnPr => "Comment on a pull request",
            Tool::SubmitPrReview => {
                "Submit a comment-only review on a pull request (never approves or blocks it)"
            }
        }
    }

    /// JSON schema of the tool arguments.
    pub fn input_schema(&self) -> Value {
        match self {
            Tool::ListMyPullRequests => serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            Tool::GetPullRequestContent => serde_json::json!({
                "type": "object",
                "properties": {
                    "pr_url": {
                        "type": "string",
                        "description": "URL of the pull request to fetch"
                    }
                },
                "required": ["pr_url"]
            }),
            Tool::CommentOnPr => serde_json::json!({
                "type": "object",
                "properties": {
                    "pr_url": {
                        "type": "string",
                        "description": "URL of the pull request to comment on"
                    },
                    "body": {
                        "type": "string",
                        "description": "Content of the comment to post"
                    }
                },
                "required": ["pr_url", "body"]
            }),
            Tool::SubmitPrReview => serde_json::json!({
                "type": "object",
                "properties": {
                    "pr_url": {
                        "type": "string",
                        "description": "URL of the pull request to review"
                    },
                    "body": {
                        "type": "string",
                        "description": "Review text"
                    }
                },
                "required": ["pr_url", "body"]
            }),
        }
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool handler that executes tools through the resolver.
pub struct ToolHandler {
    resolver: PullRequestResolver,
    registry: HashMap<&'static str, Tool>,
}

impl ToolHandler {
    /// Create a new tool handler. The tool registry is fixed from here on.
    pub fn new(resolver: PullRequestResolver) -> Self {
        let registry = Tool::ALL.iter().map(|tool| (tool.name(), *tool)).collect();
        Self { resolver, registry }
    }

    /// Get available tool definitions.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        Tool::ALL.iter().map(Tool::definition).collect()
    }

    /// Execute a tool by name with arguments.
    pub async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        match self.dispatch(name, arguments).await {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                if e.is_remote() {
                    tracing::warn!(tool = name, error = %e, "Tool call failed");
                } else {
                    tracing::info!(tool = name, error = %e, "Tool call rejected");
                }
                ToolCallResult::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Option<Value>) -> Result<String> {
        let tool = self
            .registry
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        match tool {
            Tool::ListMyPullRequests => {
                let _: ListMyPullRequestsParams = parse_arguments(tool, arguments)?;
                let prs = self
                    .resolver
                    .list_my_open_pull_requests()
                    .await
                    .map_err(|e| e.context("could not list open PRs"))?;
                to_json(&prs)
            }
            Tool::GetPullRequestContent => {
                let params: GetPullRequestContentParams = parse_arguments(tool, arguments)?;
                let content = self
                    .resolver
                    .get_pull_request_content(&params.pr_url)
                    .await
                    .map_err(|e| {
                        e.context(format!("could not get content of PR {}", params.pr_url))
                    })?;
                to_json(&content)
            }
            Tool::CommentOnPr => {
                let params: CommentOnPrParams = parse_arguments(tool, arguments)?;
                require_text(tool, "body", &params.body)?;
                let comment = self
                    .resolver
                    .comment_on_pull_request(&params.pr_url, &params.body)
                    .await
                    .map_err(|e| e.context(format!("could not comment on PR {}", params.pr_url)))?;
                to_json(&comment)
            }
            Tool::SubmitPrReview => {
                let params: SubmitPrReviewParams = parse_arguments(tool, arguments)?;
                require_text(tool, "body", &params.body)?;
                let review = self
                    .resolver
                    .submit_pull_request_review(&params.pr_url, &params.body)
                    .await
                    .map_err(|e| {
                        e.context(format!("could not submit review on PR {}", params.pr_url))
                    })?;
                to_json(&review)
            }
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: Tool, arguments: Option<Value>) -> Result<T> {
    let value = match arguments {
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(value) => value,
    };

    serde_json::from_value(value)
        .map_err(|e| Error::InvalidArguments(format!("{}: {}", tool.name(), e)))
}

/// Blank text arguments are rejected before any remote call.
fn require_text(tool: Tool, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArguments(format!(
            "{}: {} must not be empty",
            tool.name(),
            field
        )));
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Parameters for list_my_pull_requests tool (none).
#[derive(Debug, Default, Deserialize)]
struct ListMyPullRequestsParams {}

/// Parameters for get_pull_request_content tool.
#[derive(Debug, Deserialize)]
struct GetPullRequestContentParams {
    pr_url: String,
}

/// Parameters for comment_on_pr tool.
#[derive(Debug, Deserialize)]
struct CommentOnPrParams {
    pr_url: String,
    body: String,
}

/// Parameters for submit_pr_review tool.
#[derive(Debug, Deserialize)]
struct SubmitPrReviewParams {
    pr_url: String,
    body: String,
}

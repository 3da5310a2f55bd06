//! Pull request URL resolution.
//!
//! Every operation that accepts a PR URL goes through [`parse_pr_reference`].
//! The listing operation uses it as well to decompose search hit URLs, so
//! there is exactly one definition of what a PR URL looks like.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Path segment that marks a pull request in a web URL.
const PULL_SEGMENT: &str = "pull";

/// The minimal addressable identity of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

impl std::str::FromStr for PullRequestRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_pr_reference(s)
    }
}

/// Resolve a pull request web URL of the form `.../<owner>/<repo>/pull/<number>[...]`.
///
/// Empty path segments are ignored, so trailing and doubled slashes are fine.
/// Query strings and fragments never take part in the match. Input without a
/// scheme (`github.com/acme/widgets/pull/1`) is read as `https://`.
pub fn parse_pr_reference(input: &str) -> Result<PullRequestRef> {
    let invalid = |reason: String| Error::InvalidPrUrl {
        url: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("URL is empty".to_string()));
    }

    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{}", trimmed))
    }
    .map_err(|e| invalid(format!("not a valid URL: {}", e)))?;

    let segments: Vec<&str> = url
        .path_segments()
        .ok_or_else(|| invalid("URL has no path".to_string()))?
        .filter(|segment| !segment.is_empty())
        .collect();

    let pull_index = segments
        .iter()
        .position(|segment| *segment == PULL_SEGMENT)
        .ok_or_else(|| invalid(format!("missing '{}' segment", PULL_SEGMENT)))?;

    if pull_index < 2 {
        return Err(invalid(format!(
            "expected owner and repository before '{}'",
            PULL_SEGMENT
        )));
    }

    let raw_number = segments
        .get(pull_index + 1)
        .ok_or_else(|| invalid("missing pull request number".to_string()))?;

    let number = raw_number
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| invalid(format!("'{}' is not a valid pull request number", raw_number)))?;

    Ok(PullRequestRef {
        owner: segments[pull_index - 2].to_string(),
        repo: segments[pull_index - 1].to_string(),
        number,
    })
}

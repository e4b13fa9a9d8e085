//! Name-to-handler dispatch for the GitHub tool set.

use envelope::{Args, Category, ErrorKind, Outcome, ToolError, ToolInfo};
use mcp::{Tool, ToolSet};
use serde_json::{Value, json};

use crate::tool::GitHubTool;

const REPO_STATES: &[&str] = &["open", "closed", "all"];
const LIST_TYPES: &[&str] = &["all", "owner", "member"];
const MY_TYPES: &[&str] = &["all", "owner", "member", "private", "public"];
const SEARCH_SORTS: &[&str] = &["stars", "forks", "updated"];
const SEARCH_ORDERS: &[&str] = &["asc", "desc"];
const REVIEW_EVENTS: &[&str] = &["APPROVE", "REQUEST_CHANGES", "COMMENT"];
const COMMENT_SIDES: &[&str] = &["LEFT", "RIGHT"];
const TRENDING_PERIODS: &[&str] = &["daily", "weekly", "monthly"];

/// Static registration table: name, category, description.
const TOOLS: &[(&str, Category, &str)] = &[
    (
        "github_get_repository_info",
        Category::Repository,
        "Get detailed information about a GitHub repository",
    ),
    (
        "github_list_repositories",
        Category::Repository,
        "List repositories for a user or organization",
    ),
    (
        "github_get_repository_contents",
        Category::Repository,
        "Get contents of a repository directory or file",
    ),
    (
        "github_get_repository_branches",
        Category::Repository,
        "List all branches for a repository",
    ),
    (
        "github_analyze_repository",
        Category::Repository,
        "Combined repository analysis: info, branches, recent issues and pull requests",
    ),
    (
        "github_list_issues",
        Category::Issues,
        "List issues for a repository",
    ),
    (
        "github_create_issue",
        Category::Issues,
        "Create a new issue in a repository (requires token)",
    ),
    (
        "github_list_pull_requests",
        Category::PullRequests,
        "List pull requests for a repository",
    ),
    (
        "github_get_pull_request_files",
        Category::PullRequests,
        "List files changed by a pull request",
    ),
    (
        "github_get_pull_request_reviews",
        Category::PullRequests,
        "List reviews on a pull request",
    ),
    (
        "github_create_pull_request_review",
        Category::PullRequests,
        "Create a review on a pull request (requires token)",
    ),
    (
        "github_get_pull_request_review_comments",
        Category::PullRequests,
        "List review comments on a pull request",
    ),
    (
        "github_create_pull_request_review_comment",
        Category::PullRequests,
        "Create a review comment on a pull request (requires token)",
    ),
    (
        "github_update_pull_request_review_comment",
        Category::PullRequests,
        "Update a pull request review comment (requires token)",
    ),
    (
        "github_delete_pull_request_review_comment",
        Category::PullRequests,
        "Delete a pull request review comment (requires token)",
    ),
    (
        "github_search_repositories",
        Category::Search,
        "Search for repositories on GitHub",
    ),
    (
        "github_get_trending_repositories",
        Category::Search,
        "Approximate trending repositories via a recent-creation search",
    ),
    (
        "github_get_user_info",
        Category::Users,
        "Get information about a GitHub user",
    ),
    (
        "github_get_my_repositories",
        Category::Users,
        "List the authenticated user's repositories (requires token)",
    ),
    (
        "github_get_my_user_info",
        Category::Users,
        "Get the authenticated user's profile (requires token)",
    ),
];

pub struct GithubRouter {
    tool: GitHubTool,
}

impl GithubRouter {
    pub fn new(tool: GitHubTool) -> Self {
        Self { tool }
    }

    async fn dispatch(&self, name: &str, args: &Args) -> Outcome {
        match name {
            "github_get_repository_info" => {
                self.tool
                    .get_repository_info(args.req_str("owner")?, args.req_str("repo")?)
                    .await
            }
            "github_list_repositories" => {
                let owner = args.req_str("owner")?;
                let repo_type = args.enumerated("type", "all", LIST_TYPES)?;
                self.tool
                    .list_repositories(owner, repo_type, args.per_page()?)
                    .await
            }
            "github_get_repository_contents" => {
                let owner = args.req_str("owner")?;
                let repo = args.req_str("repo")?;
                let path = args.str_or("path", "")?;
                self.tool
                    .get_repository_contents(owner, repo, path, args.opt_str("ref")?)
                    .await
            }
            "github_get_repository_branches" => {
                let owner = args.req_str("owner")?;
                let repo = args.req_str("repo")?;
                self.tool
                    .get_repository_branches(owner, repo, args.per_page()?)
                    .await
            }
            "github_analyze_repository" => {
                self.tool
                    .analyze_repository(args.req_str("owner")?, args.req_str("repo")?)
                    .await
            }
            "github_list_issues" => {
                let owner = args.req_str("owner")?;
                let repo = args.req_str("repo")?;
                let state = args.enumerated("state", "open", REPO_STATES)?;
                let per_page = args.per_page()?;
                self.tool
                    .list_issues(owner, repo, state, args.opt_str("labels")?, per_page)
                    .await
            }
            "github_create_issue" => {
                let owner = args.req_str("owner")?;
                let repo = args.req_str("repo")?;
                let title = args.req_str("title")?;
                self.tool
                    .create_issue(
                        owner,
                        repo,
                        title,
                        args.opt_str("body")?,
                        args.opt_array("labels")?,
                        args.opt_array("assignees")?,
                    )
                    .await
            }
            "github_list_pull_requests" => {
                let owner = args.req_str("owner")?;
                let repo = args.req_str("repo")?;
                let state = args.enumerated("state", "open", REPO_STATES)?;
                self.tool
                    .list_pull_requests(owner, repo, state, args.per_page()?)
                    .await
            }
            "github_get_pull_request_files" => {
                self.tool
                    .get_pull_request_files(
                        args.req_str("owner")?,
                        args.req_str("repo")?,
                        args.req_i64("pull_number")?,
                    )
                    .await
            }
            "github_get_pull_request_reviews" => {
                self.tool
                    .get_pull_request_reviews(
                        args.req_str("owner")?,
                        args.req_str("repo")?,
                        args.req_i64("pull_number")?,
                    )
                    .await
            }
            "github_create_pull_request_review" => {
                let owner = args.req_str("owner")?;
                let repo = args.req_str("repo")?;
                let pull_number = args.req_i64("pull_number")?;
                let event = args.enumerated("event", "COMMENT", REVIEW_EVENTS)?;
                self.tool
                    .create_pull_request_review(
                        owner,
                        repo,
                        pull_number,
                        event,
                        args.opt_str("body")?,
                        args.opt_array("comments")?,
                    )
                    .await
            }
            "github_get_pull_request_review_comments" => {
                self.tool
                    .get_pull_request_review_comments(
                        args.req_str("owner")?,
                        args.req_str("repo")?,
                        args.req_i64("pull_number")?,
                    )
                    .await
            }
            "github_create_pull_request_review_comment" => {
                let owner = args.req_str("owner")?;
                let repo = args.req_str("repo")?;
                let pull_number = args.req_i64("pull_number")?;
                let body = args.req_str("body")?;
                let commit_id = args.req_str("commit_id")?;
                let path = args.req_str("path")?;
                let side = args.enumerated("side", "RIGHT", COMMENT_SIDES)?;
                self.tool
                    .create_pull_request_review_comment(
                        owner,
                        repo,
                        pull_number,
                        body,
                        commit_id,
                        path,
                        args.opt_i64("line")?,
                        side,
                    )
                    .await
            }
            "github_update_pull_request_review_comment" => {
                self.tool
                    .update_pull_request_review_comment(
                        args.req_str("owner")?,
                        args.req_str("repo")?,
                        args.req_i64("comment_id")?,
                        args.req_str("body")?,
                    )
                    .await
            }
            "github_delete_pull_request_review_comment" => {
                self.tool
                    .delete_pull_request_review_comment(
                        args.req_str("owner")?,
                        args.req_str("repo")?,
                        args.req_i64("comment_id")?,
                    )
                    .await
            }
            "github_search_repositories" => {
                let query = args.req_str("query")?;
                let sort = args.enumerated("sort", "stars", SEARCH_SORTS)?;
                let order = args.enumerated("order", "desc", SEARCH_ORDERS)?;
                self.tool
                    .search_repositories(query, sort, order, args.per_page()?)
                    .await
            }
            "github_get_trending_repositories" => {
                let since = args.enumerated("since", "daily", TRENDING_PERIODS)?;
                let language = args.opt_str("language")?;
                self.tool
                    .get_trending_repositories(language, since, args.per_page()?)
                    .await
            }
            "github_get_user_info" => {
                self.tool.get_user_info(args.req_str("username")?).await
            }
            "github_get_my_repositories" => {
                let repo_type = args.enumerated("type", "all", MY_TYPES)?;
                self.tool
                    .get_my_repositories(repo_type, args.per_page()?)
                    .await
            }
            "github_get_my_user_info" => self.tool.get_my_user_info().await,
            other => Err(unknown_tool(other)),
        }
    }
}

/// Tool names and categories, available without a configured token.
pub fn catalog() -> Vec<ToolInfo> {
    TOOLS
        .iter()
        .map(|&(name, category, _)| ToolInfo::new(name, category))
        .collect()
}

fn unknown_tool(name: &str) -> ToolError {
    let available: Vec<&str> = TOOLS.iter().map(|(name, _, _)| *name).collect();
    ToolError::new(ErrorKind::UnknownTool, format!("Unknown GitHub tool: {name}"))
        .with_context("available_tools", json!(available))
}

impl ToolSet for GithubRouter {
    fn name(&self) -> &'static str {
        "stevedore-github"
    }

    fn tools(&self) -> Vec<Tool> {
        TOOLS
            .iter()
            .map(|&(name, _, description)| Tool {
                name,
                description,
                input_schema: input_schema(name),
            })
            .collect()
    }

    fn catalog(&self) -> Vec<ToolInfo> {
        catalog()
    }

    async fn call(&self, name: &str, args: Args) -> Outcome {
        self.dispatch(name, &args).await
    }
}

fn string_prop(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

fn enum_prop(allowed: &[&str], default: &str) -> Value {
    json!({"type": "string", "enum": allowed, "default": default})
}

fn per_page_prop() -> Value {
    json!({"type": "integer", "minimum": 1, "maximum": 100, "default": 30})
}

fn schema(required: &[&str], properties: Value) -> Value {
    json!({"type": "object", "properties": properties, "required": required})
}

fn owner_repo() -> (Value, Value) {
    (
        string_prop("Repository owner username or organization"),
        string_prop("Repository name"),
    )
}

fn input_schema(tool: &str) -> Value {
    let (owner, repo) = owner_repo();
    match tool {
        "github_get_repository_info" | "github_analyze_repository" => {
            schema(&["owner", "repo"], json!({"owner": owner, "repo": repo}))
        }
        "github_list_repositories" => schema(
            &["owner"],
            json!({
                "owner": string_prop("Username or organization name"),
                "type": enum_prop(LIST_TYPES, "all"),
                "per_page": per_page_prop(),
            }),
        ),
        "github_get_repository_contents" => schema(
            &["owner", "repo"],
            json!({
                "owner": owner,
                "repo": repo,
                "path": string_prop("Path to directory or file (empty for root)"),
                "ref": string_prop("Branch, tag, or commit SHA"),
            }),
        ),
        "github_get_repository_branches" => schema(
            &["owner", "repo"],
            json!({"owner": owner, "repo": repo, "per_page": per_page_prop()}),
        ),
        "github_list_issues" => schema(
            &["owner", "repo"],
            json!({
                "owner": owner,
                "repo": repo,
                "state": enum_prop(REPO_STATES, "open"),
                "labels": string_prop("Comma-separated list of label names"),
                "per_page": per_page_prop(),
            }),
        ),
        "github_create_issue" => schema(
            &["owner", "repo", "title"],
            json!({
                "owner": owner,
                "repo": repo,
                "title": string_prop("Issue title"),
                "body": string_prop("Issue description"),
                "labels": {"type": "array", "items": {"type": "string"}},
                "assignees": {"type": "array", "items": {"type": "string"}},
            }),
        ),
        "github_list_pull_requests" => schema(
            &["owner", "repo"],
            json!({
                "owner": owner,
                "repo": repo,
                "state": enum_prop(REPO_STATES, "open"),
                "per_page": per_page_prop(),
            }),
        ),
        "github_get_pull_request_files"
        | "github_get_pull_request_reviews"
        | "github_get_pull_request_review_comments" => schema(
            &["owner", "repo", "pull_number"],
            json!({
                "owner": owner,
                "repo": repo,
                "pull_number": {"type": "integer", "description": "Pull request number"},
            }),
        ),
        "github_create_pull_request_review" => schema(
            &["owner", "repo", "pull_number"],
            json!({
                "owner": owner,
                "repo": repo,
                "pull_number": {"type": "integer"},
                "event": enum_prop(REVIEW_EVENTS, "COMMENT"),
                "body": string_prop("Review summary text"),
                "comments": {"type": "array", "items": {"type": "object"}},
            }),
        ),
        "github_create_pull_request_review_comment" => schema(
            &["owner", "repo", "pull_number", "body", "commit_id", "path"],
            json!({
                "owner": owner,
                "repo": repo,
                "pull_number": {"type": "integer"},
                "body": string_prop("Comment text"),
                "commit_id": string_prop("SHA of the commit to comment on"),
                "path": string_prop("File path within the diff"),
                "line": {"type": "integer", "description": "Line in the diff to anchor to"},
                "side": enum_prop(COMMENT_SIDES, "RIGHT"),
            }),
        ),
        "github_update_pull_request_review_comment" => schema(
            &["owner", "repo", "comment_id", "body"],
            json!({
                "owner": owner,
                "repo": repo,
                "comment_id": {"type": "integer"},
                "body": string_prop("Replacement comment text"),
            }),
        ),
        "github_delete_pull_request_review_comment" => schema(
            &["owner", "repo", "comment_id"],
            json!({"owner": owner, "repo": repo, "comment_id": {"type": "integer"}}),
        ),
        "github_search_repositories" => schema(
            &["query"],
            json!({
                "query": string_prop("Search query, may include qualifiers like language:rust"),
                "sort": enum_prop(SEARCH_SORTS, "stars"),
                "order": enum_prop(SEARCH_ORDERS, "desc"),
                "per_page": per_page_prop(),
            }),
        ),
        "github_get_trending_repositories" => schema(
            &[],
            json!({
                "language": string_prop("Programming language filter"),
                "since": enum_prop(TRENDING_PERIODS, "daily"),
                "per_page": per_page_prop(),
            }),
        ),
        "github_get_user_info" => schema(
            &["username"],
            json!({"username": string_prop("GitHub username")}),
        ),
        "github_get_my_repositories" => schema(
            &[],
            json!({"type": enum_prop(MY_TYPES, "all"), "per_page": per_page_prop()}),
        ),
        _ => schema(&[], json!({})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitHubConfig;
    use serde_json::json;

    fn router() -> GithubRouter {
        GithubRouter::new(GitHubTool::new(GitHubConfig::default()).unwrap())
    }

    fn args(v: Value) -> Args {
        Args::new(Some(v))
    }

    #[tokio::test]
    async fn unknown_tool_lists_available_names() {
        let err = router()
            .call("github_frobnicate", Args::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownTool);
        let names = err.to_value()["available_tools"].clone();
        assert!(names.as_array().unwrap().len() >= 20);
        assert!(names.as_array().unwrap().contains(&json!("github_list_issues")));
    }

    #[tokio::test]
    async fn missing_required_argument_short_circuits() {
        let err = router()
            .call("github_get_repository_info", args(json!({"owner": "octocat"})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingArgument);
        assert_eq!(err.message, "Missing required parameter: repo");
    }

    #[tokio::test]
    async fn invalid_state_rejected_before_any_call() {
        let err = router()
            .call(
                "github_list_issues",
                args(json!({"owner": "o", "repo": "r", "state": "merged"})),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("open, closed, all"));
    }

    #[tokio::test]
    async fn out_of_range_per_page_rejected_for_paginated_tools() {
        for tool in [
            "github_list_repositories",
            "github_get_repository_branches",
            "github_list_issues",
            "github_list_pull_requests",
            "github_search_repositories",
            "github_get_trending_repositories",
        ] {
            let err = router()
                .call(
                    tool,
                    args(json!({
                        "owner": "o", "repo": "r", "query": "q", "per_page": 101
                    })),
                )
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidArgument, "{tool}");
        }
    }

    #[tokio::test]
    async fn pull_number_must_be_an_integer() {
        let err = router()
            .call(
                "github_get_pull_request_reviews",
                args(json!({"owner": "o", "repo": "r", "pull_number": "12"})),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("pull_number"));
    }

    #[test]
    fn every_tool_has_a_schema_and_category() {
        let router = router();
        let tools = router.tools();
        assert_eq!(tools.len(), TOOLS.len());
        for tool in &tools {
            assert_eq!(tool.input_schema["type"], "object");
        }
        let catalog = router.catalog();
        assert_eq!(catalog.len(), TOOLS.len());
        assert!(catalog.iter().any(|t| {
            t.name == "github_search_repositories" && t.category == Category::Search
        }));
    }
}

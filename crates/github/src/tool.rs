//! GitHub tool operations.
//!
//! Every method is one upstream call (composites excepted) followed by
//! projection into the response envelope. Parameters arrive already
//! validated by the router.

use chrono::{DateTime, TimeDelta, Utc};
use envelope::{ErrorKind, Outcome, ToolError};
use serde_json::{Map, Value, json};

use crate::client::GitHubClient;
use crate::config::GitHubConfig;
use crate::project;

pub struct GitHubTool {
    client: GitHubClient,
    username: Option<String>,
}

impl GitHubTool {
    pub fn new(config: GitHubConfig) -> Result<Self, ToolError> {
        let client = GitHubClient::new(config.token.as_deref())?;
        Ok(Self {
            client,
            username: config.username,
        })
    }

    // --- Repository operations ---

    pub async fn get_repository_info(&self, owner: &str, repo: &str) -> Outcome {
        let raw = self.client.get(&format!("repos/{owner}/{repo}"), &[]).await?;
        Ok(json!({
            "operation": "get_repository_info",
            "repository": format!("{owner}/{repo}"),
            "data": project::repo_info(&raw),
        }))
    }

    pub async fn list_repositories(&self, owner: &str, repo_type: &str, per_page: u32) -> Outcome {
        let query = [
            ("type", repo_type.to_string()),
            ("per_page", per_page.to_string()),
            ("sort", "updated".to_string()),
        ];
        let raw = self.client.get(&format!("users/{owner}/repos"), &query).await?;
        let repositories = project_each(&raw, project::repo_summary)?;
        Ok(json!({
            "operation": "list_repositories",
            "owner": owner,
            "type": repo_type,
            "count": repositories.len(),
            "repositories": repositories,
        }))
    }

    pub async fn get_repository_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Outcome {
        let mut query = Vec::new();
        if let Some(reference) = reference {
            query.push(("ref", reference.to_string()));
        }
        let raw = self
            .client
            .get(&format!("repos/{owner}/{repo}/contents/{path}"), &query)
            .await?;

        let mut result = project::contents(&raw);
        result["operation"] = json!("get_repository_contents");
        result["repository"] = json!(format!("{owner}/{repo}"));
        result["path"] = if result["type"] == "directory" && path.is_empty() {
            json!("/")
        } else {
            json!(path)
        };
        Ok(result)
    }

    pub async fn get_repository_branches(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Outcome {
        let query = [("per_page", per_page.to_string())];
        let raw = self
            .client
            .get(&format!("repos/{owner}/{repo}/branches"), &query)
            .await?;
        let branches = project_each(&raw, project::branch_summary)?;
        Ok(json!({
            "operation": "get_repository_branches",
            "repository": format!("{owner}/{repo}"),
            "count": branches.len(),
            "branches": branches,
        }))
    }

    // --- Issue operations ---

    pub async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        state: &str,
        labels: Option<&str>,
        per_page: u32,
    ) -> Outcome {
        let mut query = vec![
            ("state", state.to_string()),
            ("per_page", per_page.to_string()),
            ("sort", "updated".to_string()),
        ];
        if let Some(labels) = labels {
            query.push(("labels", labels.to_string()));
        }
        let raw = self
            .client
            .get(&format!("repos/{owner}/{repo}/issues"), &query)
            .await?;

        let issues = project::issue_list(as_list(&raw)?);
        Ok(json!({
            "operation": "list_issues",
            "repository": format!("{owner}/{repo}"),
            "state": state,
            "count": issues.len(),
            "issues": issues,
        }))
    }

    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: Option<&str>,
        labels: Option<&Vec<Value>>,
        assignees: Option<&Vec<Value>>,
    ) -> Outcome {
        self.client.require_token("for creating issues")?;

        let mut payload = Map::new();
        payload.insert("title".to_string(), json!(title));
        if let Some(body) = body {
            payload.insert("body".to_string(), json!(body));
        }
        if let Some(labels) = labels {
            payload.insert("labels".to_string(), json!(labels));
        }
        if let Some(assignees) = assignees {
            payload.insert("assignees".to_string(), json!(assignees));
        }

        let raw = self
            .client
            .post(&format!("repos/{owner}/{repo}/issues"), Value::Object(payload))
            .await?;
        Ok(json!({
            "operation": "create_issue",
            "repository": format!("{owner}/{repo}"),
            "success": true,
            "issue": project::created_issue(&raw),
        }))
    }

    // --- Pull request operations ---

    pub async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        state: &str,
        per_page: u32,
    ) -> Outcome {
        let query = [
            ("state", state.to_string()),
            ("per_page", per_page.to_string()),
            ("sort", "updated".to_string()),
        ];
        let raw = self
            .client
            .get(&format!("repos/{owner}/{repo}/pulls"), &query)
            .await?;
        let pulls = project_each(&raw, project::pull_summary)?;
        Ok(json!({
            "operation": "list_pull_requests",
            "repository": format!("{owner}/{repo}"),
            "state": state,
            "count": pulls.len(),
            "pull_requests": pulls,
        }))
    }

    pub async fn get_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        pull_number: i64,
    ) -> Outcome {
        let raw = self
            .client
            .get(&format!("repos/{owner}/{repo}/pulls/{pull_number}/files"), &[])
            .await?;
        let files = project_each(&raw, project::pr_file_summary)?;
        Ok(json!({
            "operation": "get_pull_request_files",
            "repository": format!("{owner}/{repo}"),
            "pull_number": pull_number,
            "count": files.len(),
            "files": files,
        }))
    }

    pub async fn get_pull_request_reviews(
        &self,
        owner: &str,
        repo: &str,
        pull_number: i64,
    ) -> Outcome {
        let raw = self
            .client
            .get(&format!("repos/{owner}/{repo}/pulls/{pull_number}/reviews"), &[])
            .await?;
        let reviews = project_each(&raw, project::review_summary)?;
        Ok(json!({
            "operation": "get_pull_request_reviews",
            "repository": format!("{owner}/{repo}"),
            "pull_number": pull_number,
            "count": reviews.len(),
            "reviews": reviews,
        }))
    }

    pub async fn create_pull_request_review(
        &self,
        owner: &str,
        repo: &str,
        pull_number: i64,
        event: &str,
        body: Option<&str>,
        comments: Option<&Vec<Value>>,
    ) -> Outcome {
        self.client.require_token("for creating reviews")?;

        let mut payload = Map::new();
        payload.insert("event".to_string(), json!(event));
        if let Some(body) = body {
            payload.insert("body".to_string(), json!(body));
        }
        if let Some(comments) = comments {
            payload.insert("comments".to_string(), json!(comments));
        }

        let raw = self
            .client
            .post(
                &format!("repos/{owner}/{repo}/pulls/{pull_number}/reviews"),
                Value::Object(payload),
            )
            .await?;
        Ok(json!({
            "operation": "create_pull_request_review",
            "repository": format!("{owner}/{repo}"),
            "pull_number": pull_number,
            "success": true,
            "review": project::review_summary(&raw),
        }))
    }

    pub async fn get_pull_request_review_comments(
        &self,
        owner: &str,
        repo: &str,
        pull_number: i64,
    ) -> Outcome {
        let raw = self
            .client
            .get(&format!("repos/{owner}/{repo}/pulls/{pull_number}/comments"), &[])
            .await?;
        let comments = project_each(&raw, project::review_comment_summary)?;
        Ok(json!({
            "operation": "get_pull_request_review_comments",
            "repository": format!("{owner}/{repo}"),
            "pull_number": pull_number,
            "count": comments.len(),
            "comments": comments,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_pull_request_review_comment(
        &self,
        owner: &str,
        repo: &str,
        pull_number: i64,
        body: &str,
        commit_id: &str,
        path: &str,
        line: Option<i64>,
        side: &str,
    ) -> Outcome {
        self.client.require_token("for managing review comments")?;

        let mut payload = Map::new();
        payload.insert("body".to_string(), json!(body));
        payload.insert("commit_id".to_string(), json!(commit_id));
        payload.insert("path".to_string(), json!(path));
        payload.insert("side".to_string(), json!(side));
        if let Some(line) = line {
            payload.insert("line".to_string(), json!(line));
        }

        let raw = self
            .client
            .post(
                &format!("repos/{owner}/{repo}/pulls/{pull_number}/comments"),
                Value::Object(payload),
            )
            .await?;
        Ok(json!({
            "operation": "create_pull_request_review_comment",
            "repository": format!("{owner}/{repo}"),
            "pull_number": pull_number,
            "success": true,
            "comment": project::review_comment_summary(&raw),
        }))
    }

    pub async fn update_pull_request_review_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: i64,
        body: &str,
    ) -> Outcome {
        self.client.require_token("for managing review comments")?;

        let raw = self
            .client
            .patch(
                &format!("repos/{owner}/{repo}/pulls/comments/{comment_id}"),
                json!({"body": body}),
            )
            .await?;
        Ok(json!({
            "operation": "update_pull_request_review_comment",
            "repository": format!("{owner}/{repo}"),
            "comment_id": comment_id,
            "success": true,
            "comment": project::review_comment_summary(&raw),
        }))
    }

    pub async fn delete_pull_request_review_comment(
        &self,
        owner: &str,
        repo: &str,
        comment_id: i64,
    ) -> Outcome {
        self.client.require_token("for managing review comments")?;

        // Upstream answers 204 with no body.
        self.client
            .delete(&format!("repos/{owner}/{repo}/pulls/comments/{comment_id}"))
            .await?;
        Ok(json!({
            "operation": "delete_pull_request_review_comment",
            "repository": format!("{owner}/{repo}"),
            "comment_id": comment_id,
            "success": true,
        }))
    }

    // --- Search operations ---

    pub async fn search_repositories(
        &self,
        query: &str,
        sort: &str,
        order: &str,
        per_page: u32,
    ) -> Outcome {
        let params = [
            ("q", query.to_string()),
            ("sort", sort.to_string()),
            ("order", order.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let raw = self.client.get("search/repositories", &params).await?;
        let repositories: Vec<Value> = raw["items"]
            .as_array()
            .map(|items| items.iter().map(project::search_repo).collect())
            .unwrap_or_default();
        Ok(json!({
            "operation": "search_repositories",
            "query": query,
            "total_count": raw["total_count"],
            "count": repositories.len(),
            "repositories": repositories,
        }))
    }

    pub async fn get_trending_repositories(
        &self,
        language: Option<&str>,
        since: &str,
        per_page: u32,
    ) -> Outcome {
        let query = trending_query(Utc::now(), language, since);
        self.search_repositories(&query, "stars", "desc", per_page)
            .await
            .map_err(|e| {
                ToolError::new(
                    e.kind,
                    format!("Failed to get trending repositories: {}", e.message),
                )
            })
    }

    // --- User operations ---

    pub async fn get_user_info(&self, username: &str) -> Outcome {
        let raw = self.client.get(&format!("users/{username}"), &[]).await?;
        Ok(json!({
            "operation": "get_user_info",
            "username": username,
            "user": project::user_info(&raw),
        }))
    }

    pub async fn get_my_repositories(&self, repo_type: &str, per_page: u32) -> Outcome {
        self.client.require_token("to get your repositories")?;
        let Some(username) = self.username.as_deref() else {
            return Err(ToolError::new(
                ErrorKind::AuthRequired,
                "GitHub username not configured. Please set GITHUB_USERNAME in environment",
            ));
        };

        let query = [
            ("type", repo_type.to_string()),
            ("per_page", per_page.to_string()),
            ("sort", "updated".to_string()),
        ];
        let raw = self.client.get("user/repos", &query).await?;
        let repositories = project_each(&raw, project::my_repo_summary)?;
        Ok(json!({
            "operation": "get_my_repositories",
            "username": username,
            "type": repo_type,
            "count": repositories.len(),
            "repositories": repositories,
        }))
    }

    pub async fn get_my_user_info(&self) -> Outcome {
        self.client.require_token("to get your user info")?;
        let raw = self.client.get("user", &[]).await?;
        Ok(json!({
            "operation": "get_authenticated_user_info",
            "user": project::my_user_info(&raw),
        }))
    }

    // --- Composite operations ---

    /// Four sequential reads merged into one envelope. The first
    /// failing step aborts the whole analysis.
    pub async fn analyze_repository(&self, owner: &str, repo: &str) -> Outcome {
        let result: Outcome = async {
            let info = self.get_repository_info(owner, repo).await?;
            let branches = self.get_repository_branches(owner, repo, 10).await?;
            let issues = self.list_issues(owner, repo, "all", None, 10).await?;
            let pulls = self.list_pull_requests(owner, repo, "all", 10).await?;
            Ok(json!({
                "operation": "analyze_repository",
                "repository": format!("{owner}/{repo}"),
                "repository_info": info,
                "branches": branches,
                "recent_issues": issues,
                "recent_pull_requests": pulls,
            }))
        }
        .await;

        result.map_err(|e| {
            ToolError::new(e.kind, format!("Failed to analyze repository: {}", e.message))
                .with_context("repository", format!("{owner}/{repo}"))
        })
    }
}

/// Synthesize the search query approximating "trending".
fn trending_query(now: DateTime<Utc>, language: Option<&str>, since: &str) -> String {
    let days_back = match since {
        "weekly" => 7,
        "monthly" => 30,
        _ => 1,
    };
    let start = (now - TimeDelta::days(days_back)).format("%Y-%m-%d");
    match language {
        Some(language) => format!("created:>={start} language:{language}"),
        None => format!("created:>={start}"),
    }
}

fn as_list(raw: &Value) -> Result<&Vec<Value>, ToolError> {
    raw.as_array().ok_or_else(|| {
        ToolError::new(
            ErrorKind::Upstream,
            "GitHub API returned an unexpected non-list response",
        )
    })
}

fn project_each(raw: &Value, f: fn(&Value) -> Value) -> Result<Vec<Value>, ToolError> {
    Ok(as_list(raw)?.iter().map(f).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anonymous() -> GitHubTool {
        GitHubTool::new(GitHubConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn write_ops_without_token_never_reach_the_network() {
        let tool = anonymous();

        // A transport error would mean a request was attempted; these
        // must all fail with the auth kind instead.
        let cases = [
            tool.create_issue("o", "r", "t", None, None, None).await,
            tool.create_pull_request_review("o", "r", 1, "COMMENT", None, None)
                .await,
            tool.create_pull_request_review_comment("o", "r", 1, "b", "sha", "f.rs", None, "RIGHT")
                .await,
            tool.update_pull_request_review_comment("o", "r", 9, "b").await,
            tool.delete_pull_request_review_comment("o", "r", 9).await,
            tool.get_my_repositories("all", 30).await,
            tool.get_my_user_info().await,
        ];
        for outcome in cases {
            assert_eq!(outcome.unwrap_err().kind, ErrorKind::AuthRequired);
        }
    }

    #[tokio::test]
    async fn my_repositories_needs_username_too() {
        let tool = GitHubTool::new(GitHubConfig {
            token: Some("ghp_test".to_string()),
            username: None,
        })
        .unwrap();
        let err = tool.get_my_repositories("all", 30).await.unwrap_err();
        assert!(err.message.contains("GITHUB_USERNAME"));
    }

    #[test]
    fn trending_query_windows() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(trending_query(now, None, "daily"), "created:>=2026-03-14");
        assert_eq!(trending_query(now, None, "weekly"), "created:>=2026-03-08");
        assert_eq!(trending_query(now, None, "monthly"), "created:>=2026-02-13");
        assert_eq!(
            trending_query(now, Some("rust"), "daily"),
            "created:>=2026-03-14 language:rust"
        );
    }

    #[test]
    fn unexpected_scalar_list_response_is_upstream_error() {
        let err = as_list(&json!({"message": "oops"})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Upstream);
    }
}

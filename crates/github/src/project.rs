//! Projection of raw GitHub payloads onto the smaller records the
//! tools return.
//!
//! Each function selects a fixed field subset and flattens the nested
//! owner/user/license objects. Nothing here touches the network.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};

/// Long text bodies are cut at this many characters.
const BODY_LIMIT: usize = 500;

/// Files above this size are not decoded inline.
pub const MAX_DECODE_SIZE: u64 = 1024 * 1024;

/// Truncate an issue/PR/comment body, tolerating a null field.
pub fn truncated_body(raw: &Value) -> Value {
    let body = raw["body"].as_str().unwrap_or("");
    if body.chars().count() > BODY_LIMIT {
        let cut: String = body.chars().take(BODY_LIMIT).collect();
        Value::String(format!("{cut}..."))
    } else {
        Value::String(body.to_string())
    }
}

fn login(raw: &Value) -> Value {
    raw["login"].clone()
}

pub fn repo_info(raw: &Value) -> Value {
    json!({
        "name": raw["name"],
        "full_name": raw["full_name"],
        "description": raw["description"],
        "url": raw["html_url"],
        "clone_url": raw["clone_url"],
        "ssh_url": raw["ssh_url"],
        "language": raw["language"],
        "stars": raw["stargazers_count"],
        "forks": raw["forks_count"],
        "watchers": raw["watchers_count"],
        "open_issues": raw["open_issues_count"],
        "size": raw["size"],
        "default_branch": raw["default_branch"],
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "pushed_at": raw["pushed_at"],
        "private": raw["private"],
        "archived": raw["archived"],
        "disabled": raw["disabled"],
        "topics": raw.get("topics").cloned().unwrap_or_else(|| json!([])),
        "license": raw["license"]["name"],
        "owner": {
            "login": raw["owner"]["login"],
            "type": raw["owner"]["type"],
            "url": raw["owner"]["html_url"],
        },
    })
}

pub fn repo_summary(raw: &Value) -> Value {
    json!({
        "name": raw["name"],
        "full_name": raw["full_name"],
        "description": raw["description"],
        "url": raw["html_url"],
        "language": raw["language"],
        "stars": raw["stargazers_count"],
        "forks": raw["forks_count"],
        "updated_at": raw["updated_at"],
        "private": raw["private"],
    })
}

/// Richer record for the authenticated user's own repositories.
pub fn my_repo_summary(raw: &Value) -> Value {
    json!({
        "name": raw["name"],
        "full_name": raw["full_name"],
        "description": raw["description"],
        "url": raw["html_url"],
        "clone_url": raw["clone_url"],
        "ssh_url": raw["ssh_url"],
        "language": raw["language"],
        "stars": raw["stargazers_count"],
        "forks": raw["forks_count"],
        "updated_at": raw["updated_at"],
        "private": raw["private"],
        "fork": raw["fork"],
        "archived": raw["archived"],
        "default_branch": raw["default_branch"],
    })
}

pub fn search_repo(raw: &Value) -> Value {
    json!({
        "name": raw["name"],
        "full_name": raw["full_name"],
        "description": raw["description"],
        "url": raw["html_url"],
        "language": raw["language"],
        "stars": raw["stargazers_count"],
        "forks": raw["forks_count"],
        "updated_at": raw["updated_at"],
        "owner": login(&raw["owner"]),
    })
}

/// Contents API payload: an array is a directory listing, a single
/// object is one file.
pub fn contents(raw: &Value) -> Value {
    match raw.as_array() {
        Some(items) => {
            let entries: Vec<Value> = items.iter().map(dir_entry).collect();
            json!({"type": "directory", "contents": entries})
        }
        None => json!({"type": "file", "file": file_info(raw)}),
    }
}

pub fn dir_entry(raw: &Value) -> Value {
    json!({
        "name": raw["name"],
        "path": raw["path"],
        "type": raw["type"],
        "size": raw["size"],
        "url": raw["html_url"],
        "download_url": raw["download_url"],
    })
}

/// Single-file record, with the content decoded when it is base64
/// and under [`MAX_DECODE_SIZE`].
pub fn file_info(raw: &Value) -> Value {
    let mut file = json!({
        "name": raw["name"],
        "path": raw["path"],
        "type": raw["type"],
        "size": raw["size"],
        "encoding": raw["encoding"],
        "url": raw["html_url"],
        "download_url": raw["download_url"],
    });

    let size = raw["size"].as_u64().unwrap_or(0);
    if raw["encoding"] == "base64" {
        if size < MAX_DECODE_SIZE {
            file["content"] = decode_content(raw["content"].as_str().unwrap_or(""));
        } else {
            file["content"] = Value::String("File too large to decode inline".to_string());
        }
    }
    file
}

fn decode_content(encoded: &str) -> Value {
    // The contents API wraps base64 at 60 columns; strip the newlines
    // before decoding.
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    match BASE64.decode(compact.as_bytes()) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Value::String(text),
            Err(_) => Value::String("Binary file or encoding error".to_string()),
        },
        Err(_) => Value::String("Binary file or encoding error".to_string()),
    }
}

/// Issues API items projected, excluding pull requests.
///
/// The upstream issues endpoint mixes in pull requests, marked by a
/// `pull_request` key; they are dropped before counting.
pub fn issue_list(items: &[Value]) -> Vec<Value> {
    items
        .iter()
        .filter(|item| item.get("pull_request").is_none())
        .map(issue_summary)
        .collect()
}

pub fn issue_summary(raw: &Value) -> Value {
    let assignees: Vec<Value> = raw["assignees"]
        .as_array()
        .map(|a| a.iter().map(login).collect())
        .unwrap_or_default();
    let labels: Vec<Value> = raw["labels"]
        .as_array()
        .map(|l| l.iter().map(|label| label["name"].clone()).collect())
        .unwrap_or_default();

    json!({
        "number": raw["number"],
        "title": raw["title"],
        "body": truncated_body(raw),
        "state": raw["state"],
        "user": login(&raw["user"]),
        "assignees": assignees,
        "labels": labels,
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "url": raw["html_url"],
        "comments": raw["comments"],
    })
}

pub fn created_issue(raw: &Value) -> Value {
    json!({
        "number": raw["number"],
        "title": raw["title"],
        "body": raw["body"],
        "state": raw["state"],
        "user": login(&raw["user"]),
        "url": raw["html_url"],
        "created_at": raw["created_at"],
    })
}

pub fn pull_summary(raw: &Value) -> Value {
    json!({
        "number": raw["number"],
        "title": raw["title"],
        "body": truncated_body(raw),
        "state": raw["state"],
        "user": login(&raw["user"]),
        "head": {
            "ref": raw["head"]["ref"],
            "sha": raw["head"]["sha"],
        },
        "base": {
            "ref": raw["base"]["ref"],
            "sha": raw["base"]["sha"],
        },
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "url": raw["html_url"],
        "mergeable": raw["mergeable"],
        "merged": raw["merged"],
    })
}

pub fn branch_summary(raw: &Value) -> Value {
    json!({
        "name": raw["name"],
        "sha": raw["commit"]["sha"],
        "protected": raw["protected"],
        "url": raw["commit"]["url"],
    })
}

pub fn user_info(raw: &Value) -> Value {
    json!({
        "login": raw["login"],
        "name": raw["name"],
        "bio": raw["bio"],
        "company": raw["company"],
        "location": raw["location"],
        "email": raw["email"],
        "blog": raw["blog"],
        "twitter_username": raw["twitter_username"],
        "public_repos": raw["public_repos"],
        "public_gists": raw["public_gists"],
        "followers": raw["followers"],
        "following": raw["following"],
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "url": raw["html_url"],
        "avatar_url": raw["avatar_url"],
        "type": raw["type"],
    })
}

/// The authenticated user additionally sees the plan name.
pub fn my_user_info(raw: &Value) -> Value {
    let mut info = user_info(raw);
    info["plan"] = raw["plan"]["name"].clone();
    info
}

pub fn review_summary(raw: &Value) -> Value {
    json!({
        "id": raw["id"],
        "user": login(&raw["user"]),
        "state": raw["state"],
        "body": truncated_body(raw),
        "commit_id": raw["commit_id"],
        "submitted_at": raw["submitted_at"],
        "url": raw["html_url"],
    })
}

pub fn review_comment_summary(raw: &Value) -> Value {
    json!({
        "id": raw["id"],
        "user": login(&raw["user"]),
        "body": truncated_body(raw),
        "path": raw["path"],
        "line": raw["line"],
        "side": raw["side"],
        "commit_id": raw["commit_id"],
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "url": raw["html_url"],
    })
}

pub fn pr_file_summary(raw: &Value) -> Value {
    json!({
        "sha": raw["sha"],
        "filename": raw["filename"],
        "status": raw["status"],
        "additions": raw["additions"],
        "deletions": raw["deletions"],
        "changes": raw["changes"],
        "blob_url": raw["blob_url"],
    })
}

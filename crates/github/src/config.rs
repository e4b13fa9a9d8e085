//! GitHub configuration from the environment.

/// Read once at startup. A missing token is not a startup failure;
/// authenticated operations degrade to explicit errors instead.
#[derive(Debug, Clone, Default)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub username: Option<String>,
}

impl GitHubConfig {
    pub fn from_env() -> Self {
        Self {
            token: non_empty_var("GITHUB_TOKEN"),
            username: non_empty_var("GITHUB_USERNAME"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

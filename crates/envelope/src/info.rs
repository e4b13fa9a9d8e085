//! Static tool metadata for the introspection surface.

use serde::Serialize;

/// Coarse grouping of a tool, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Repository,
    Issues,
    PullRequests,
    Search,
    Users,
    Database,
    General,
}

/// One entry of a router's tool catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub category: Category,
}

impl ToolInfo {
    pub const fn new(name: &'static str, category: Category) -> Self {
        Self { name, category }
    }
}

//! Name-to-handler dispatch for the MongoDB tool set.

use envelope::{Args, Category, ErrorKind, Outcome, ToolError, ToolInfo};
use mcp::{Tool, ToolSet};
use serde_json::{Value, json};

use crate::tool::MongoTool;

/// Static registration table: name, description.
const TOOLS: &[(&str, &str)] = &[
    ("mongodb_find", "Query documents from a MongoDB collection"),
    ("mongodb_insert", "Insert documents into a MongoDB collection"),
    ("mongodb_update", "Update documents in a MongoDB collection"),
    ("mongodb_delete", "Delete documents from a MongoDB collection"),
    (
        "mongodb_aggregate",
        "Run an aggregation pipeline on a MongoDB collection",
    ),
    (
        "mongodb_get_collections",
        "List all collections in the database",
    ),
    (
        "mongodb_get_collection_stats",
        "Get statistics about a collection",
    ),
];

pub struct MongoRouter {
    tool: MongoTool,
}

impl MongoRouter {
    pub fn new(tool: MongoTool) -> Self {
        Self { tool }
    }

    /// The collection argument falls back to the configured default;
    /// an explicit empty string is rejected before any round trip.
    fn collection<'a>(&'a self, args: &'a Args) -> Result<&'a str, ToolError> {
        match args.opt_str("collection")? {
            Some("") => Err(ToolError::invalid("collection must be a non-empty string")),
            Some(name) => Ok(name),
            None => Ok(self.tool.default_collection()),
        }
    }

    async fn dispatch(&self, name: &str, args: &Args) -> Outcome {
        match name {
            "mongodb_find" => {
                let collection = self.collection(args)?;
                let limit = match args.opt_i64("limit")? {
                    Some(limit) if limit < 0 => {
                        return Err(ToolError::invalid(
                            "Limit must be a non-negative integer",
                        ));
                    }
                    other => other,
                };
                self.tool
                    .find(
                        collection,
                        args.opt_object("query")?,
                        limit,
                        args.opt_object("sort")?,
                    )
                    .await
            }
            "mongodb_insert" => {
                let collection = self.collection(args)?;
                let documents = args
                    .get("documents")
                    .ok_or_else(|| ToolError::missing("documents"))?;
                self.tool.insert(collection, documents).await
            }
            "mongodb_update" => {
                let collection = self.collection(args)?;
                self.tool
                    .update(
                        collection,
                        args.req_object("filter")?,
                        args.req_object("update")?,
                        args.bool_or("upsert", false)?,
                    )
                    .await
            }
            "mongodb_delete" => {
                let collection = self.collection(args)?;
                self.tool.delete(collection, args.req_object("filter")?).await
            }
            "mongodb_aggregate" => {
                let collection = self.collection(args)?;
                let pipeline = args
                    .opt_array("pipeline")?
                    .ok_or_else(|| ToolError::missing("pipeline"))?;
                self.tool.aggregate(collection, pipeline).await
            }
            "mongodb_get_collections" => self.tool.get_collections().await,
            "mongodb_get_collection_stats" => {
                let collection = self.collection(args)?;
                self.tool.get_collection_stats(collection).await
            }
            other => Err(unknown_tool(other)),
        }
    }
}

/// Tool names and categories, available without a database connection.
pub fn catalog() -> Vec<ToolInfo> {
    TOOLS
        .iter()
        .map(|&(name, _)| ToolInfo::new(name, Category::Database))
        .collect()
}

fn unknown_tool(name: &str) -> ToolError {
    let available: Vec<&str> = TOOLS.iter().map(|(name, _)| *name).collect();
    ToolError::new(ErrorKind::UnknownTool, format!("Unknown MongoDB tool: {name}"))
        .with_context("available_tools", json!(available))
}

impl ToolSet for MongoRouter {
    fn name(&self) -> &'static str {
        "stevedore-mongo"
    }

    fn tools(&self) -> Vec<Tool> {
        TOOLS
            .iter()
            .map(|&(name, description)| Tool {
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

fn collection_prop() -> Value {
    json!({
        "type": "string",
        "description": "Collection name (defaults to the configured collection)",
    })
}

fn schema(required: &[&str], properties: Value) -> Value {
    json!({"type": "object", "properties": properties, "required": required})
}

fn input_schema(tool: &str) -> Value {
    match tool {
        "mongodb_find" => schema(
            &[],
            json!({
                "collection": collection_prop(),
                "query": {"type": "object", "description": "Filter document; empty matches all"},
                "limit": {"type": "integer", "minimum": 0},
                "sort": {"type": "object", "description": "Field to direction (1 or -1)"},
            }),
        ),
        "mongodb_insert" => schema(
            &["documents"],
            json!({
                "collection": collection_prop(),
                "documents": {
                    "description": "One document or a non-empty array of documents",
                    "anyOf": [
                        {"type": "object"},
                        {"type": "array", "items": {"type": "object"}},
                    ],
                },
            }),
        ),
        "mongodb_update" => schema(
            &["filter", "update"],
            json!({
                "collection": collection_prop(),
                "filter": {"type": "object"},
                "update": {"type": "object", "description": "Update operators, e.g. {\"$set\": {...}}"},
                "upsert": {"type": "boolean", "default": false},
            }),
        ),
        "mongodb_delete" => schema(
            &["filter"],
            json!({
                "collection": collection_prop(),
                "filter": {"type": "object"},
            }),
        ),
        "mongodb_aggregate" => schema(
            &["pipeline"],
            json!({
                "collection": collection_prop(),
                "pipeline": {"type": "array", "items": {"type": "object"}},
            }),
        ),
        "mongodb_get_collection_stats" => schema(
            &[],
            json!({"collection": collection_prop()}),
        ),
        _ => schema(&[], json!({})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MongoConfig;

    // Validation failures short-circuit before any server round trip,
    // so these run against a handle that never connects.
    async fn router() -> MongoRouter {
        MongoRouter::new(MongoTool::unpinged(MongoConfig::default()).await)
    }

    fn args(v: Value) -> Args {
        Args::new(Some(v))
    }

    #[test]
    fn every_tool_is_cataloged_as_database() {
        let entries = catalog();
        assert_eq!(entries.len(), 7);
        assert!(entries.iter().all(|t| t.category == Category::Database));
        assert!(entries.iter().any(|t| t.name == "mongodb_aggregate"));
    }

    #[test]
    fn unknown_tool_error_lists_names() {
        let err = unknown_tool("mongodb_drop_everything");
        assert_eq!(err.kind, ErrorKind::UnknownTool);
        let v = err.to_value();
        assert_eq!(v["available_tools"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn negative_limit_rejected() {
        let err = router()
            .await
            .call("mongodb_find", args(json!({"limit": -1})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, "Limit must be a non-negative integer");
    }

    #[tokio::test]
    async fn update_requires_filter_and_update() {
        let err = router()
            .await
            .call("mongodb_update", args(json!({"update": {"$set": {"a": 1}}})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingArgument);
        assert_eq!(err.message, "Missing required parameter: filter");

        let err = router()
            .await
            .call("mongodb_update", args(json!({"filter": {}, "update": {"a": 1}})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn empty_collection_name_rejected() {
        let err = router()
            .await
            .call("mongodb_find", args(json!({"collection": ""})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, "collection must be a non-empty string");
    }

    #[tokio::test]
    async fn omitted_collection_uses_configured_default() {
        let r = router().await;
        assert_eq!(r.collection(&args(json!({}))).unwrap(), "embeddings");
        assert_eq!(
            r.collection(&args(json!({"collection": "notes"}))).unwrap(),
            "notes"
        );
    }

    #[tokio::test]
    async fn insert_rejects_empty_document_list() {
        let err = router()
            .await
            .call("mongodb_insert", args(json!({"documents": []})))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Documents cannot be empty");
    }

    #[tokio::test]
    async fn aggregate_requires_a_pipeline() {
        let err = router()
            .await
            .call("mongodb_aggregate", args(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingArgument);
        assert_eq!(err.message, "Missing required parameter: pipeline");
    }

    #[test]
    fn schemas_are_objects_with_required_lists() {
        for (name, _) in TOOLS {
            let schema = input_schema(name);
            assert_eq!(schema["type"], "object", "{name}");
            assert!(schema["required"].is_array(), "{name}");
        }
        assert_eq!(input_schema("mongodb_update")["required"], json!(["filter", "update"]));
    }
}

//! MongoDB tool operations.

use envelope::{ErrorKind, Outcome, ToolError};
use futures::TryStreamExt;
use mongodb::bson::{Bson, DateTime, Document, doc};
use mongodb::{Client, Database};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::codec;
use crate::config::MongoConfig;

pub struct MongoTool {
    db: Database,
    database_name: String,
    default_collection: String,
}

impl MongoTool {
    /// Connect and verify the deployment answers a ping.
    pub async fn connect(config: MongoConfig) -> Result<Self, ToolError> {
        let client = Client::with_uri_str(&config.uri).await.map_err(db_err)?;
        client
            .database("admin")
            .run_command(doc! {"ping": 1})
            .await
            .map_err(db_err)?;
        info!(database = %config.database, "connected to MongoDB");

        Ok(Self {
            db: client.database(&config.database),
            database_name: config.database,
            default_collection: config.default_collection,
        })
    }

    /// Collection used when a call omits the `collection` argument.
    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }

    /// Handle without the startup ping; the driver connects lazily, so
    /// argument validation can be tested without a running server.
    #[cfg(test)]
    pub(crate) async fn unpinged(config: MongoConfig) -> MongoTool {
        let client = Client::with_uri_str(&config.uri).await.unwrap();
        MongoTool {
            db: client.database(&config.database),
            database_name: config.database,
            default_collection: config.default_collection,
        }
    }

    pub async fn find(
        &self,
        collection: &str,
        query: Option<&Map<String, Value>>,
        limit: Option<i64>,
        sort: Option<&Map<String, Value>>,
    ) -> Outcome {
        // An absent filter matches all documents.
        let filter = match query {
            Some(map) => codec::to_document(map, "query")?,
            None => Document::new(),
        };

        let coll = self.db.collection::<Document>(collection);
        let mut find = coll.find(filter);
        if let Some(sort) = sort {
            find = find.sort(codec::to_document(sort, "sort")?);
        }
        if let Some(limit) = limit.filter(|l| *l > 0) {
            find = find.limit(limit);
        }

        let mut cursor = find.await.map_err(db_err)?;
        let mut results = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(db_err)? {
            results.push(codec::doc_to_json(&document));
        }

        Ok(json!({
            "collection": collection,
            "query": query.cloned().map(Value::Object).unwrap_or_else(|| json!({})),
            "count": results.len(),
            "results": results,
        }))
    }

    pub async fn insert(&self, collection: &str, documents: &Value) -> Outcome {
        let mut docs = normalize_documents(documents)?;
        stamp_timestamps(&mut docs, DateTime::now());

        let coll = self.db.collection::<Document>(collection);
        let inserted_ids: Vec<String> = if docs.len() == 1 {
            let result = coll
                .insert_one(docs.into_iter().next().unwrap_or_default())
                .await
                .map_err(db_err)?;
            vec![codec::id_string(&result.inserted_id)]
        } else {
            let result = coll.insert_many(docs).await.map_err(db_err)?;
            let mut by_index: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
            by_index.sort_by_key(|(index, _)| *index);
            by_index
                .into_iter()
                .map(|(_, id)| codec::id_string(&id))
                .collect()
        };

        Ok(json!({
            "collection": collection,
            "operation": "insert",
            "inserted_count": inserted_ids.len(),
            "inserted_ids": inserted_ids,
            "acknowledged": true,
        }))
    }

    pub async fn update(
        &self,
        collection: &str,
        filter: &Map<String, Value>,
        update: &Map<String, Value>,
        upsert: bool,
    ) -> Outcome {
        let filter = codec::to_document(filter, "filter")?;
        let mut update = codec::to_document(update, "update")?;

        // Every update touches updated_at, whatever the caller sent.
        let mut set = match update.remove("$set") {
            Some(Bson::Document(set)) => set,
            None => Document::new(),
            Some(_) => return Err(ToolError::invalid("update $set must be an object")),
        };
        set.insert("updated_at", DateTime::now());
        update.insert("$set", set);

        let result = self
            .db
            .collection::<Document>(collection)
            .update_many(filter, update)
            .upsert(upsert)
            .await
            .map_err(db_err)?;

        Ok(json!({
            "collection": collection,
            "operation": "update",
            "matched_count": result.matched_count,
            "modified_count": result.modified_count,
            "upserted_count": if result.upserted_id.is_some() { 1 } else { 0 },
            "acknowledged": true,
        }))
    }

    pub async fn delete(&self, collection: &str, filter: &Map<String, Value>) -> Outcome {
        let filter = codec::to_document(filter, "filter")?;
        let result = self
            .db
            .collection::<Document>(collection)
            .delete_many(filter)
            .await
            .map_err(db_err)?;

        Ok(json!({
            "collection": collection,
            "operation": "delete",
            "deleted_count": result.deleted_count,
            "acknowledged": true,
        }))
    }

    pub async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> Outcome {
        let stages = normalize_pipeline(pipeline)?;

        let mut cursor = self
            .db
            .collection::<Document>(collection)
            .aggregate(stages)
            .await
            .map_err(db_err)?;
        let mut results = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(db_err)? {
            results.push(codec::doc_to_json(&document));
        }

        Ok(json!({
            "collection": collection,
            "operation": "aggregate",
            "pipeline": pipeline,
            "count": results.len(),
            "results": results,
        }))
    }

    pub async fn get_collections(&self) -> Outcome {
        let collections = self.db.list_collection_names().await.map_err(db_err)?;
        Ok(json!({
            "database": self.database_name,
            "count": collections.len(),
            "collections": collections,
        }))
    }

    pub async fn get_collection_stats(&self, collection: &str) -> Outcome {
        let stats = self
            .db
            .run_command(doc! {"collStats": collection})
            .await
            .map_err(db_err)?;
        // collStats counts are estimates; report the exact one.
        let count = self
            .db
            .collection::<Document>(collection)
            .count_documents(Document::new())
            .await
            .map_err(db_err)?;

        let stats = codec::doc_to_json(&stats);
        Ok(json!({
            "collection": collection,
            "count": count,
            "size": stats.get("size").cloned().unwrap_or(json!(0)),
            "storageSize": stats.get("storageSize").cloned().unwrap_or(json!(0)),
            "avgObjSize": stats.get("avgObjSize").cloned().unwrap_or(json!(0)),
            "indexes": stats.get("nindexes").cloned().unwrap_or(json!(0)),
            "indexSizes": stats.get("indexSizes").cloned().unwrap_or_else(|| json!({})),
        }))
    }
}

/// Accept one document or a non-empty array of documents.
fn normalize_documents(documents: &Value) -> Result<Vec<Document>, ToolError> {
    match documents {
        Value::Object(map) if map.is_empty() => {
            Err(ToolError::invalid("Documents cannot be empty"))
        }
        Value::Object(map) => Ok(vec![codec::to_document(map, "document")?]),
        Value::Array(items) if items.is_empty() => {
            Err(ToolError::invalid("Documents cannot be empty"))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => codec::to_document(map, "document"),
                _ => Err(ToolError::invalid(format!(
                    "Document at index {index} is not an object"
                ))),
            })
            .collect(),
        _ => Err(ToolError::invalid(
            "Documents must be an object or a list of objects",
        )),
    }
}

fn normalize_pipeline(pipeline: &[Value]) -> Result<Vec<Document>, ToolError> {
    pipeline
        .iter()
        .enumerate()
        .map(|(index, stage)| match stage {
            Value::Object(map) => codec::to_document(map, "pipeline stage"),
            _ => Err(ToolError::invalid(format!(
                "Pipeline stage at index {index} is not an object"
            ))),
        })
        .collect()
}

/// Stamp creation and update times, equal on insert.
fn stamp_timestamps(docs: &mut [Document], now: DateTime) {
    for doc in docs {
        doc.insert("created_at", now);
        doc.insert("updated_at", now);
    }
}

fn db_err(e: mongodb::error::Error) -> ToolError {
    ToolError::new(ErrorKind::Database, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_document_and_one_element_array_normalize_identically() {
        let single = normalize_documents(&json!({"name": "a"})).unwrap();
        let listed = normalize_documents(&json!([{"name": "a"}])).unwrap();
        assert_eq!(single, listed);
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn empty_and_malformed_documents_rejected() {
        assert!(
            normalize_documents(&json!([]))
                .unwrap_err()
                .message
                .contains("cannot be empty")
        );
        // An empty object would insert nothing but the stamped
        // timestamps; it is rejected like an empty list.
        assert!(
            normalize_documents(&json!({}))
                .unwrap_err()
                .message
                .contains("cannot be empty")
        );
        assert!(
            normalize_documents(&json!("nope"))
                .unwrap_err()
                .message
                .contains("must be an object")
        );
        let err = normalize_documents(&json!([{"ok": 1}, 42])).unwrap_err();
        assert_eq!(err.message, "Document at index 1 is not an object");
    }

    #[test]
    fn timestamps_are_stamped_equal() {
        let mut docs = normalize_documents(&json!([{"a": 1}, {"b": 2}])).unwrap();
        let now = DateTime::now();
        stamp_timestamps(&mut docs, now);
        for doc in &docs {
            assert_eq!(doc.get_datetime("created_at").unwrap(), &now);
            assert_eq!(
                doc.get_datetime("created_at").unwrap(),
                doc.get_datetime("updated_at").unwrap()
            );
        }
    }

    #[test]
    fn stamping_overwrites_caller_supplied_timestamps() {
        let mut docs =
            normalize_documents(&json!({"created_at": "forged", "x": 1})).unwrap();
        let now = DateTime::now();
        stamp_timestamps(&mut docs, now);
        assert_eq!(docs[0].get_datetime("created_at").unwrap(), &now);
    }

    #[test]
    fn pipeline_stages_must_be_objects() {
        let ok = normalize_pipeline(&[json!({"$match": {"active": true}})]).unwrap();
        assert_eq!(ok.len(), 1);
        let err = normalize_pipeline(&[json!({"$match": {}}), json!(5)]).unwrap_err();
        assert_eq!(err.message, "Pipeline stage at index 1 is not an object");
    }
}

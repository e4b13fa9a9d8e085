//! BSON ↔ JSON conversion.
//!
//! Driver results carry ObjectIds and datetimes that are not natively
//! JSON-representable; [`doc_to_json`] converts them (recursively,
//! through nested documents and arrays) into plain strings. The
//! conversion is total and idempotent: strings come out as strings,
//! so a second pass is a no-op.

use envelope::ToolError;
use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

pub fn doc_to_json(doc: &Document) -> Value {
    let mut map = Map::new();
    for (key, value) in doc {
        map.insert(key.clone(), bson_to_json(value));
    }
    Value::Object(map)
}

pub fn bson_to_json(bson: &Bson) -> Value {
    match bson {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(
            dt.try_to_rfc3339_string()
                .unwrap_or_else(|_| dt.timestamp_millis().to_string()),
        ),
        Bson::Document(doc) => doc_to_json(doc),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        Bson::Double(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::Null => Value::Null,
        Bson::Decimal128(d) => Value::String(d.to_string()),
        // Binary, regex, timestamps and the rest are rare in tool
        // traffic; extended JSON keeps them representable.
        other => other.clone().into_relaxed_extjson(),
    }
}

/// Convert a JSON object (filter, sort, update, pipeline stage) into
/// a driver document.
pub fn to_document(map: &Map<String, Value>, what: &str) -> Result<Document, ToolError> {
    mongodb::bson::to_document(map)
        .map_err(|e| ToolError::invalid(format!("{what} is not a valid document: {e}")))
}

/// The string form of a driver-generated identifier.
pub fn id_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => Bson::clone(other).into_relaxed_extjson().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::json;

    #[test]
    fn object_ids_become_hex_strings_at_any_depth() {
        let id = ObjectId::new();
        let nested = ObjectId::new();
        let raw = doc! {
            "_id": id,
            "refs": [{"other_id": nested}, "plain"],
            "meta": {"inner": {"deep_id": nested}},
        };
        let v = doc_to_json(&raw);
        assert_eq!(v["_id"], id.to_hex());
        assert_eq!(v["refs"][0]["other_id"], nested.to_hex());
        assert_eq!(v["meta"]["inner"]["deep_id"], nested.to_hex());
        assert_eq!(v["refs"][1], "plain");
    }

    #[test]
    fn conversion_is_idempotent() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "when": mongodb::bson::DateTime::now(),
            "n": 3_i64,
            "tags": ["a", "b"],
        };
        let once = doc_to_json(&raw);
        // A second pass over the stringified output changes nothing.
        let reparsed = to_document(once.as_object().unwrap(), "doc").unwrap();
        assert_eq!(doc_to_json(&reparsed), once);
    }

    #[test]
    fn datetimes_become_rfc3339_strings() {
        let dt = mongodb::bson::DateTime::from_millis(1_700_000_000_000);
        let v = bson_to_json(&Bson::DateTime(dt));
        assert!(v.as_str().unwrap().starts_with("2023-11-14T"));
    }

    #[test]
    fn numbers_survive_untouched() {
        let v = doc_to_json(&doc! {"i32": 5_i32, "i64": 6_i64, "f": 2.5});
        assert_eq!(v, json!({"i32": 5, "i64": 6, "f": 2.5}));
    }

    #[test]
    fn to_document_rejects_invalid_keys() {
        // serde_json maps can't produce this, but a valid map converts.
        let map = json!({"active": true});
        let doc = to_document(map.as_object().unwrap(), "filter").unwrap();
        assert_eq!(doc.get_bool("active").unwrap(), true);
    }

    #[test]
    fn id_string_handles_non_oid_ids() {
        assert_eq!(id_string(&Bson::String("custom".into())), "custom");
        let oid = ObjectId::new();
        assert_eq!(id_string(&Bson::ObjectId(oid)), oid.to_hex());
        assert_eq!(id_string(&Bson::Int64(9)), "9");
    }
}

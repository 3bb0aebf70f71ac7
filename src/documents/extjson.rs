use crate::utils::{CatalogError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use mongodb::bson::{Bson, Document};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// `{"$oid": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ObjectIdRef {
    #[serde(rename = "$oid")]
    pub oid: String,
}

impl ObjectIdRef {
    pub fn new(oid: impl Into<String>) -> Self {
        Self { oid: oid.into() }
    }
}

/// `{"$date": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRef {
    #[serde(rename = "$date")]
    pub date: String,
}

impl DateRef {
    pub fn new(date: impl Into<String>) -> Self {
        Self { date: date.into() }
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self::new(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Extended JSON (with `$oid` / `$date` wrappers) to a BSON document the
/// driver can insert.
pub fn to_bson_document(value: JsonValue) -> Result<Document> {
    match Bson::try_from(value).map_err(|e| CatalogError::ExtJsonError(e.to_string()))? {
        Bson::Document(doc) => Ok(doc),
        other => Err(CatalogError::ExtJsonError(format!(
            "expected a document, got {:?}",
            other.element_type()
        ))),
    }
}

pub fn to_bson_documents<T: Serialize>(items: &[T]) -> Result<Vec<Document>> {
    items
        .iter()
        .map(|item| to_bson_document(serde_json::to_value(item)?))
        .collect()
}

/// Replace `$oid` / `$date` wrappers by their plain string, for tools that
/// take ordinary JSON.
pub fn flatten_extjson(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            if map.len() == 1 {
                if let Some(JsonValue::String(s)) = map.get("$oid").or_else(|| map.get("$date")) {
                    return JsonValue::String(s.clone());
                }
            }
            JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, flatten_extjson(v)))
                    .collect(),
            )
        }
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(flatten_extjson).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    #[test]
    fn converts_wrappers_to_bson_types() {
        let doc = to_bson_document(json!({
            "product_id": {"$oid": "68bf0a207596a1f78d625214"},
            "timestamp": {"$date": "2025-01-31T00:00:00Z"},
            "price": 5.9,
        }))
        .unwrap();

        assert_eq!(
            doc.get_object_id("product_id").unwrap(),
            ObjectId::parse_str("68bf0a207596a1f78d625214").unwrap()
        );
        assert!(doc.get_datetime("timestamp").is_ok());
        assert_eq!(doc.get_f64("price").unwrap(), 5.9);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(to_bson_document(json!([1, 2])).is_err());
    }

    #[test]
    fn flattens_nested_wrappers() {
        let flat = flatten_extjson(json!({
            "merchant_id": {"$oid": "68bf06365371c586220eb9f7"},
            "promotions": [{"until": {"$date": "2025-01-31T00:00:00Z"}}],
            "price": 3,
        }));

        assert_eq!(
            flat,
            json!({
                "merchant_id": "68bf06365371c586220eb9f7",
                "promotions": [{"until": "2025-01-31T00:00:00Z"}],
                "price": 3,
            })
        );
    }

    #[test]
    fn date_ref_uses_utc_millis() {
        let at = DateTime::parse_from_rfc3339("2025-09-08T10:11:12.345678Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(DateRef::from_datetime(at).date, "2025-09-08T10:11:12.345Z");
    }
}

use crate::translation::{Language, ProductTranslation};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub const SHUFERSAL_ID_PATH: &str = "metadata.shufersal_id";

/// One `update_many` call: `{filter, update: {$set: {...}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UpdateCommand {
    pub filter: Map<String, JsonValue>,
    pub update: UpdateOperation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UpdateOperation {
    #[serde(rename = "$set")]
    pub set: Map<String, JsonValue>,
}

impl UpdateCommand {
    pub fn by_shufersal_id(shufersal_id: &str) -> Self {
        let mut filter = Map::new();
        filter.insert(
            SHUFERSAL_ID_PATH.to_string(),
            JsonValue::String(shufersal_id.to_string()),
        );
        Self {
            filter,
            update: UpdateOperation::default(),
        }
    }

    pub fn set(mut self, path: impl Into<String>, value: JsonValue) -> Self {
        self.update.set.insert(path.into(), value);
        self
    }

    pub fn shufersal_id(&self) -> Option<&str> {
        self.filter.get(SHUFERSAL_ID_PATH).and_then(|v| v.as_str())
    }

    /// Sets `name_<lang>` and `aliases.<lang>`, plus `brand_<lang>` when the
    /// translated brand says something the source brand does not. Records
    /// without a product id yield nothing.
    pub fn from_translation(record: &ProductTranslation, clear_other_aliases: bool) -> Option<Self> {
        let shufersal_id = record.shufersal_id.as_deref()?;
        let code = record.language.code();

        let mut command = Self::by_shufersal_id(shufersal_id)
            .set(format!("name_{}", code), JsonValue::from(record.name.clone()))
            .set(
                format!("aliases.{}", code),
                JsonValue::from(vec![record.name.clone()]),
            );

        if clear_other_aliases {
            for other in Language::ALL.iter().filter(|l| **l != record.language) {
                command = command.set(
                    format!("aliases.{}", other.code()),
                    JsonValue::Array(Vec::new()),
                );
            }
        }

        if let Some(brand) = record.brand.as_deref().filter(|b| !b.is_empty()) {
            if record.brand_he.as_deref() != Some(brand) {
                command = command.set(format!("brand_{}", code), JsonValue::from(brand));
            }
        }

        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(language: Language, brand_he: Option<&str>, brand: Option<&str>) -> ProductTranslation {
        ProductTranslation {
            shufersal_id: Some("P_42015".to_string()),
            language,
            name_he: "חלב מפוסטר 3%".to_string(),
            name: "Pasteurized Milk 3% Fat".to_string(),
            brand_he: brand_he.map(String::from),
            brand: brand.map(String::from),
            size: Some("1 ל".to_string()),
        }
    }

    #[test]
    fn english_update_shape() {
        let cmd = UpdateCommand::from_translation(
            &record(Language::English, Some("שטראוס בע\"מ"), Some("Strauss")),
            false,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "filter": {"metadata.shufersal_id": "P_42015"},
                "update": {"$set": {
                    "name_en": "Pasteurized Milk 3% Fat",
                    "aliases.en": ["Pasteurized Milk 3% Fat"],
                    "brand_en": "Strauss",
                }}
            })
        );
        assert_eq!(cmd.shufersal_id(), Some("P_42015"));
    }

    #[test]
    fn unchanged_or_empty_brand_is_not_set() {
        let same = UpdateCommand::from_translation(
            &record(Language::English, Some("Tnuva"), Some("Tnuva")),
            false,
        )
        .unwrap();
        assert!(!same.update.set.contains_key("brand_en"));

        let empty = UpdateCommand::from_translation(
            &record(Language::Arabic, Some("קקק"), Some("")),
            false,
        )
        .unwrap();
        assert!(!empty.update.set.contains_key("brand_ar"));
        assert!(empty.update.set.contains_key("name_ar"));
    }

    #[test]
    fn clears_other_language_aliases_when_asked() {
        let cmd = UpdateCommand::from_translation(&record(Language::English, None, None), true)
            .unwrap();
        assert_eq!(cmd.update.set["aliases.ar"], json!([]));
        assert!(!cmd.update.set.contains_key("aliases.he"));
    }

    #[test]
    fn no_id_no_command() {
        let mut r = record(Language::Arabic, None, None);
        r.shufersal_id = None;
        assert!(UpdateCommand::from_translation(&r, false).is_none());
    }
}

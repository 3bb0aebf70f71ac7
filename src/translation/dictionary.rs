use crate::utils::{CatalogError, Result};
use serde_json::Value as JsonValue;
use std::cmp::Reverse;
use std::path::Path;

/// Source → target substitution table applied longest key first.
///
/// Keys are ranked by length in characters; keys of equal length keep the
/// order they were inserted in. Re-inserting a key replaces its target but
/// not its rank.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<(String, String)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut dictionary = Self::new();
        for (source, target) in pairs {
            dictionary.push(source.into(), target.into());
        }
        dictionary.rank();
        dictionary
    }

    /// JSON object of `{"source": "target"}` pairs.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            CatalogError::ConfigError("dictionary must be a JSON object".to_string())
        })?;

        let mut pairs = Vec::with_capacity(object.len());
        for (source, target) in object {
            let target = target.as_str().ok_or_else(|| {
                CatalogError::ConfigError(format!("target for {:?} is not a string", source))
            })?;
            pairs.push((source.clone(), target.to_string()));
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.display().to_string()));
        }
        let value: JsonValue = serde_json::from_slice(&std::fs::read(path)?)?;
        Self::from_json(&value)
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.push(source.into(), target.into());
        self.rank();
    }

    /// Overlay `other`: its targets win for shared keys, new keys are added.
    pub fn merge(&mut self, other: &Dictionary) {
        for (source, target) in &other.entries {
            self.push(source.clone(), target.clone());
        }
        self.rank();
    }

    fn push(&mut self, source: String, target: String) {
        match self.entries.iter_mut().find(|(s, _)| *s == source) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((source, target)),
        }
    }

    fn rank(&mut self) {
        self.entries
            .sort_by_key(|(source, _)| Reverse(source.chars().count()));
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, t)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in application order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Replace every occurrence of every key, in rank order. Entries with an
    /// empty target are skipped.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (source, target) in &self.entries {
            if target.is_empty() || source.is_empty() {
                continue;
            }
            if out.contains(source.as_str()) {
                out = out.replace(source.as_str(), target);
            }
        }
        out
    }
}

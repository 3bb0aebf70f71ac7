//! Dictionary translation of Hebrew product text into English and Arabic.

pub mod dictionary;
pub mod lexicon;
pub mod records;
pub mod translator;

pub use dictionary::Dictionary;
pub use lexicon::{builtin_dictionary, LEXICON};
pub use records::{translate_products, ProductTranslation};
pub use translator::{Language, Translator};

use crate::utils::{CatalogError, Result};
use serde_json::Value as JsonValue;
use std::path::Path;

/// Built-in lexicon, overlaid with the `<language code>` section of the extra
/// terms file when one is given.
pub fn dictionary_for(language: Language, extra_terms_file: Option<&Path>) -> Result<Dictionary> {
    let mut dictionary = builtin_dictionary(language);

    if let Some(path) = extra_terms_file {
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.display().to_string()));
        }
        let value: JsonValue = serde_json::from_slice(&std::fs::read(path)?)?;
        if let Some(section) = value.get(language.code()) {
            let extra = Dictionary::from_json(section)?;
            tracing::debug!(language = %language, terms = extra.len(), "Extra terms loaded");
            dictionary.merge(&extra);
        }
    }

    Ok(dictionary)
}

pub fn translator_for(language: Language, extra_terms_file: Option<&Path>) -> Result<Translator> {
    Ok(Translator::new(language, dictionary_for(language, extra_terms_file)?))
}

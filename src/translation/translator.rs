use crate::translation::dictionary::Dictionary;
use regex::{Captures, Regex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Target languages. Hebrew is always the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Arabic];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
        }
    }

    pub fn fat_word(&self) -> &'static str {
        match self {
            Language::English => "Fat",
            Language::Arabic => "دسم",
        }
    }

    /// Runs of characters the output must not contain.
    fn residual(&self) -> &'static Regex {
        static ENGLISH: OnceLock<Regex> = OnceLock::new();
        static ARABIC: OnceLock<Regex> = OnceLock::new();
        match self {
            Language::English => ENGLISH.get_or_init(|| Regex::new(r"[^\x00-\x7F]+").unwrap()),
            Language::Arabic => ARABIC.get_or_init(|| {
                Regex::new(r"[^\x00-\x7F\x{0600}-\x{06FF}\x{0750}-\x{077F}]+").unwrap()
            }),
        }
    }

    /// File the translation records of this language are saved to.
    pub fn translations_file(&self) -> &'static str {
        match self {
            Language::English => "product_translations.json",
            Language::Arabic => "product_translations_arabic.json",
        }
    }

    /// Prefix of the update batch files.
    pub fn update_batch_prefix(&self) -> &'static str {
        match self {
            Language::English => "update_batch",
            Language::Arabic => "arabic_update_batch",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "ar" | "arabic" => Ok(Language::Arabic),
            other => Err(format!("unsupported language: {:?} (expected en or ar)", other)),
        }
    }
}

fn percent_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)%").unwrap())
}

#[derive(Debug, Clone)]
pub struct Translator {
    language: Language,
    dictionary: Dictionary,
}

impl Translator {
    pub fn new(language: Language, dictionary: Dictionary) -> Self {
        Self {
            language,
            dictionary,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Dictionary substitution, then anything outside the language's
    /// character set becomes a space and whitespace is collapsed.
    pub fn translate(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let substituted = self.dictionary.apply(text);
        let stripped = self.language.residual().replace_all(&substituted, " ");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// `translate` plus `N%` → `N% <fat word>` unless the word already follows.
    pub fn translate_name(&self, text: &str) -> String {
        self.mark_fat(&self.translate(text))
    }

    fn mark_fat(&self, text: &str) -> String {
        let fat = self.language.fat_word();
        percent_regex()
            .replace_all(text, |caps: &Captures<'_>| {
                let whole = &caps[0];
                let end = caps.get(0).map(|m| m.end()).unwrap_or(text.len());
                if text[end..].trim_start().starts_with(fat) {
                    whole.to_string()
                } else {
                    format!("{} {}", whole, fat)
                }
            })
            .into_owned()
    }
}

use crate::catalog::clean_text;
use regex::Regex;
use std::sync::OnceLock;

/// Tried in order; the first match wins.
const SIZE_PATTERNS: &[&str] = &[
    r#"(\d+\.?\d*)\s*(מ"ל|מל|ml|ML)"#,
    r"(\d+\.?\d*)\s*(ל|ליטר|L|l)",
    r"(\d+\.?\d*)\s*(ג|גרם|g|G)",
    r#"(\d+\.?\d*)\s*(ק"ג|קג|kg|KG)"#,
    r"(\d+)\s*(יח|יחידות)",
    r"(\d+X\d+)",
];

fn size_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SIZE_PATTERNS
            .iter()
            .map(|p| Regex::new(p).unwrap())
            .collect()
    })
}

/// The size/quantity fragment of `text`, e.g. `1 ל` out of `1 ליטר`.
pub fn find_size(text: &str) -> Option<&str> {
    size_patterns()
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str())
}

/// Size column value: the recognised fragment, or the cleaned text when no
/// pattern matches.
pub fn extract_size(text: Option<&str>) -> Option<String> {
    let cleaned = clean_text(text)?;
    match find_size(&cleaned) {
        Some(size) => Some(size.to_string()),
        None => Some(cleaned),
    }
}

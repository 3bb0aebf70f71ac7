use crate::catalog::reader::format_number;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Parsed form of a shelf label such as `0.64 ש"ח ל- 100 מ"ל`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UnitPrice {
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
}

impl UnitPrice {
    pub fn per(&self) -> String {
        format!("{} {}", format_number(self.quantity), self.unit)
    }
}

pub fn parse_unit_price(text: &str) -> Option<UnitPrice> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r#"^([\d.]+)\s*ש"ח\s*ל-?\s*([\d.]+)\s*(.+)"#).unwrap());

    let caps = re.captures(text.trim())?;
    let price = caps.get(1)?.as_str().parse().ok()?;
    let quantity = caps.get(2)?.as_str().parse().ok()?;
    let unit = caps.get(3)?.as_str().trim().to_string();

    Some(UnitPrice {
        price,
        quantity,
        unit,
    })
}

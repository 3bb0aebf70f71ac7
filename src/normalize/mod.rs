//! Field normalisation for catalog rows: sizes, brands, labels, unit prices.

pub mod brand;
pub mod size;
pub mod unit_price;

pub use brand::{normalize_brand, BRAND_TABLE};
pub use size::{extract_size, find_size};
pub use unit_price::{parse_unit_price, UnitPrice};

/// Split a health-label cell on ASCII and Arabic commas.
pub fn split_health_labels(labels: Option<&str>) -> Vec<String> {
    labels
        .map(|text| {
            text.split([',', '،'])
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_both_commas() {
        assert_eq!(
            split_health_labels(Some("דל שומן, ללא גלוטן،עשיר בחלבון ,")),
            vec!["דל שומן", "ללא גלוטן", "עשיר בחלבון"]
        );
        assert!(split_health_labels(None).is_empty());
        assert!(split_health_labels(Some(" , ")).is_empty());
    }
}

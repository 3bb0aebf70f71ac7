use crate::catalog::clean_text;

/// Known brands, Hebrew → English. Order matters for partial matches.
pub const BRAND_TABLE: &[(&str, &str)] = &[
    ("תנובה", "Tnuva"),
    ("יטבתה", "Yotvata"),
    ("שטראוס", "Strauss"),
    ("טרה", "Tara"),
    ("מילקו", "Milco"),
    ("גד", "Gad"),
    ("משק צוריאל", "Meshek Tzuriel"),
    ("פיראוס", "Piraeus"),
    ("גל", "Gal"),
    ("נועם", "Noam"),
    ("מחלבות גד", "Gad Dairy"),
    ("משק שטראוס", "Strauss Farm"),
    ("עוף טוב", "Of Tov"),
    ("יש", "Yesh"),
    ("מאיר", "Meir"),
    ("פרי הדר", "Pri Hadar"),
    ("רמת הגולן", "Ramat HaGolan"),
    ("החקלאית", "HaHakla'it"),
    ("טעם הטבע", "Taam HaTeva"),
    ("בייבי ביס", "Baby Bis"),
    ("גבינת העמק", "Gvinat HaEmek"),
    ("שופרסל", "Shufersal"),
    ("מעדני צפת", "Maadanei Tzfat"),
];

/// Exact table hit first, then the first table entry contained in the brand,
/// otherwise the cleaned brand as given.
pub fn normalize_brand(brand: Option<&str>) -> Option<String> {
    let brand = clean_text(brand)?;

    if let Some((_, english)) = BRAND_TABLE.iter().find(|(hebrew, _)| *hebrew == brand) {
        return Some(english.to_string());
    }

    if let Some((_, english)) = BRAND_TABLE.iter().find(|(hebrew, _)| brand.contains(hebrew)) {
        return Some(english.to_string());
    }

    Some(brand)
}

use crate::translation::dictionary::Dictionary;
use crate::translation::translator::Language;

/// Hebrew catalog vocabulary: `(hebrew, english, arabic)`.
///
/// Order matters only among terms of equal length; the dictionary sorts the
/// rest longest first.
pub const LEXICON: &[(&str, &str, &str)] = &[
    // milk
    ("חלב מפוסטר", "Pasteurized Milk", "حليب مبستر"),
    ("חלב טרי", "Fresh Milk", "حليب طازج"),
    ("חלב הומוגני", "Homogenized Milk", "حليب متجانس"),
    ("חלב", "Milk", "حليب"),
    ("שקית", "Bag", "كيس"),
    ("בקבוק", "Bottle", "زجاجة"),
    ("קרטון", "Carton", "كرتون"),
    ("בקרטון", "in Carton", "في كرتون"),
    ("מהדרין", "Mehadrin", "مهدرين"),
    ("שומן", "Fat", "دسم"),
    // cheese
    ("גבינה לבנה", "White Cheese", "جبنة بيضاء"),
    ("גבינה צהובה", "Yellow Cheese", "جبنة صفراء"),
    ("גבינת", "Cheese", "جبنة"),
    ("גבינה", "Cheese", "جبنة"),
    ("מגורדת", "Shredded", "مبشورة"),
    ("מגורד", "Shredded", "مبشور"),
    ("פרוס", "Sliced", "شرائح"),
    ("פרוסה", "Sliced", "شريحة"),
    ("ארוז", "Packaged", "معبأ"),
    ("חריץ", "Block", "قالب"),
    // yogurt and cream
    ("יוגורט", "Yogurt", "لبن"),
    ("אשל", "Eshel", "إيشل"),
    ("גיל", "Gil", "جيل"),
    ("שמנת", "Cream", "قشطة"),
    ("להקצפה", "Whipping", "للخفق"),
    ("קציפת", "Whipped", "مخفوق"),
    // eggs
    ("ביצים", "Eggs", "بيض"),
    ("ארוזות", "Packaged", "معبأ"),
    // brands
    ("תנובה", "Tnuva", "تنوفا"),
    ("יטבתה", "Yotvata", "يوطفاتا"),
    ("שטראוס", "Strauss", "شتراوس"),
    ("טרה", "Tara", "تارا"),
    ("מילקו", "Milco", "ميلكو"),
    ("גד", "Gad", "جاد"),
    ("מחלבות גד", "Gad Dairy", "ألبان جاد"),
    ("משק צוריאל", "Meshek Tzuriel", "مزرعة تسوريئيل"),
    ("פיראוס", "Piraeus", "بيريوس"),
    ("רמת הגולן", "Ramat HaGolan", "رامات هجولان"),
    ("מחלבות רמת הגולן", "Ramat HaGolan Dairy", "ألبان رامات هجولان"),
    ("נעם", "Noam", "نوعام"),
    ("עמק", "Emek", "عيمك"),
    ("גלבוע", "Gilboa", "جلبوع"),
    ("סקי", "Ski", "سكي"),
    ("מולר", "Muller", "مولر"),
    ("דנונה", "Danone", "دانون"),
    ("יופלה", "Yoplait", "يوبليه"),
    ("השף הלבן", "The White Chef", "الشيف الأبيض"),
    ("שופרסל", "Shufersal", "شوبرسال"),
    // flavours
    ("תות", "Strawberry", "فراولة"),
    ("תות שדה", "Wild Strawberry", "فراولة برية"),
    ("אפרסק", "Peach", "دراق"),
    ("לימון", "Lemon", "ليمون"),
    ("פירות יער", "Forest Fruits", "توت الغابة"),
    ("קוקוס", "Coconut", "جوز الهند"),
    ("אננס", "Pineapple", "أناناس"),
    ("מנגו", "Mango", "مانجو"),
    ("קיווי", "Kiwi", "كيوي"),
    ("אשכולית", "Grapefruit", "جريب فروت"),
    ("וניל", "Vanilla", "فانيليا"),
    // units
    ("ליטר", "Liter", "لتر"),
    ("מ\"ל", "ml", "مل"),
    ("גרם", "g", "غرام"),
    ("ק\"ג", "kg", "كغ"),
    ("יחידה", "unit", "وحدة"),
    ("יחידות", "units", "وحدات"),
    ("יח", "units", "وحدات"),
    // qualifiers
    ("ללא", "Without", "بدون"),
    ("גלוטן", "Gluten", "جلوتين"),
    ("לקטוז", "Lactose", "لاكتوز"),
    ("כשר", "Kosher", "كوشر"),
    ("אורגני", "Organic", "عضوي"),
    ("במשק", "Farm", "مزرعة"),
    ("עמיד", "Long Life", "طويل الأمد"),
    ("עמידה", "Long Life", "طويلة الأمد"),
    ("פרוביוטי", "Probiotic", "بروبيوتيك"),
    ("דל", "Low", "قليل"),
    ("עשיר", "Rich", "غني"),
    ("מועשר", "Enriched", "مدعم"),
    ("טבעי", "Natural", "طبيعي"),
    ("ביו", "Bio", "حيوي"),
    ("פלוס", "Plus", "بلس"),
    ("לייט", "Light", "لايت"),
    ("זיתים", "Olives", "زيتون"),
    ("בצל", "Onion", "بصل"),
    ("עגבניות", "Tomatoes", "طماطم"),
];

pub fn builtin_dictionary(language: Language) -> Dictionary {
    Dictionary::from_pairs(LEXICON.iter().map(|(he, en, ar)| match language {
        Language::English => (*he, *en),
        Language::Arabic => (*he, *ar),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_term_has_both_targets() {
        for (he, en, ar) in LEXICON {
            assert!(!he.is_empty() && !en.is_empty() && !ar.is_empty(), "{}", he);
        }
    }

    #[test]
    fn builtin_dictionaries_cover_the_lexicon() {
        let en = builtin_dictionary(Language::English);
        let ar = builtin_dictionary(Language::Arabic);
        assert_eq!(en.len(), LEXICON.len());
        assert_eq!(ar.get("חלב"), Some("حليب"));
        assert_eq!(en.get("מ\"ל"), Some("ml"));
    }
}

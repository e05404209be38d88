//! Name-based inference of brand and product category
//!
//! Case-insensitive substring rules, evaluated in table order; first match wins.

/// Vendor keyword sets, in priority order
pub static BRAND_RULES: &[(&str, &[&str])] = &[
    ("Apple", &["iphone", "ipad", "macbook", "imac", "apple watch", "airpods"]),
    ("Samsung", &["samsung", "galaxy"]),
    ("Xiaomi", &["xiaomi", "redmi", "poco"]),
    ("Huawei", &["huawei", "honor"]),
    ("Google", &["google pixel", "pixel"]),
    ("OnePlus", &["oneplus"]),
    ("OPPO", &["oppo"]),
    ("Sony", &["sony", "xperia"]),
    ("Nokia", &["nokia"]),
    ("LG", &["lg"]),
];

/// Category keyword sets, in priority order
pub static CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("smartphone", &["iphone", "galaxy s", "pixel", "redmi note", "poco"]),
    ("tablet", &["ipad", "galaxy tab"]),
    ("laptop", &["macbook", "thinkpad"]),
    ("desktop", &["imac", "mac mini", "mac pro", "mac studio"]),
    ("watch", &["apple watch"]),
    ("audio", &["airpods"]),
];

fn first_match(rules: &'static [(&'static str, &'static [&'static str])], name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    rules
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(value, _)| *value)
}

pub fn infer_brand(name: &str) -> Option<&'static str> {
    first_match(BRAND_RULES, name)
}

pub fn infer_category(name: &str) -> Option<&'static str> {
    first_match(CATEGORY_RULES, name)
}

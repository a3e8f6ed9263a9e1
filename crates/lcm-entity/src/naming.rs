//! Naming heuristics for generated entities and navigation properties

use convert_case::{Case, Casing};

/// Suffixes stripped from a foreign key to name its reference property
const KEY_SUFFIXES: &[&str] = &["ID", "CODE"];

/// PascalCase name for a legacy table or column
#[must_use]
pub fn pascal_case(name: &str) -> String {
    name.trim().to_case(Case::Pascal)
}

/// Strip a trailing `ID`/`CODE` (any case) from a foreign key property name
///
/// Returns `None` when no suffix is present or nothing would be left.
#[must_use]
pub fn strip_key_suffix(name: &str) -> Option<&str> {
    let upper = name.to_ascii_uppercase();
    KEY_SUFFIXES.iter().find_map(|suffix| {
        if upper.len() > suffix.len() && upper.ends_with(suffix) {
            let stem = name[..name.len() - suffix.len()].trim_end_matches('_');
            (!stem.is_empty()).then_some(stem)
        } else {
            None
        }
    })
}

/// English plural for a collection property
///
/// `y` becomes `ies`; names already ending in `s` are kept.
#[must_use]
pub fn pluralize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix('y') {
        format!("{stem}ies")
    } else if let Some(stem) = name.strip_suffix('Y') {
        format!("{stem}IES")
    } else if name.ends_with(['s', 'S']) {
        name.to_string()
    } else {
        format!("{name}s")
    }
}

/// Textual similarity between a key field and its table name
///
/// The key field loses a trailing `ID` first. Scores:
/// 4 exact, 3 table starts with it, 2 table ends with it, 1 contains, 0 otherwise.
#[must_use]
pub fn similarity_score(key_field: &str, table: &str) -> u8 {
    let key = key_field.trim().to_ascii_uppercase();
    let stem = key.strip_suffix("ID").unwrap_or(&key);
    let table = table.trim().to_ascii_uppercase();

    if stem.is_empty() {
        0
    } else if table == stem {
        4
    } else if table.starts_with(stem) {
        3
    } else if table.ends_with(stem) {
        2
    } else if table.contains(stem) {
        1
    } else {
        0
    }
}

/// First of `base`, `base2`, `base3`, ... not rejected by `taken`
#[must_use]
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

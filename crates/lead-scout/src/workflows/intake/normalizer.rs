/// Header key used for alias lookups: BOM and zero-width characters removed,
/// `-`/`_` treated as spaces, whitespace collapsed, lowercase.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value
        .replace(['\u{feff}', '\u{200b}'], "")
        .replace(['-', '_'], " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Field name for a header with no alias: the normalized key in snake case.
pub(crate) fn fallback_field(normalized: &str) -> String {
    normalized.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization_ignores_bom_case_and_separators() {
        assert_eq!(normalize_header("\u{feff}Full  Name"), "full name");
        assert_eq!(normalize_header("person_location"), "person location");
        assert_eq!(normalize_header(" LinkedIn-URL "), "linkedin url");
    }

    #[test]
    fn fallback_field_is_snake_case() {
        assert_eq!(fallback_field("favourite color"), "favourite_color");
    }
}

/// Alias table for country codes the results feed reports outside ISO-2.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("UK", "GB"),
    ("EN", "GB"),
    ("SCO", "GB"),
    ("WAL", "GB"),
    ("EL", "GR"),
];

/// Canonicalizes a feed country code to ISO-2. Unknown codes pass through
/// uppercased; blank input yields `None`.
pub fn normalize_country_code(input: Option<&str>) -> Option<String> {
    let code = input?.trim().to_uppercase();
    if code.is_empty() {
        return None;
    }

    let canonical = COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == code)
        .map(|(_, iso)| (*iso).to_string())
        .unwrap_or(code);

    Some(canonical)
}

/// Player ids from the game platform are hex strings, usually 24 chars but
/// the length varies. Loose shape check before we touch the store.
pub fn is_likely_geo_id(s: &str) -> bool {
    let v = s.trim();
    (20..=40).contains(&v.len()) && v.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_map_to_iso2() {
        assert_eq!(normalize_country_code(Some("UK")), Some("GB".to_string()));
        assert_eq!(normalize_country_code(Some("sco")), Some("GB".to_string()));
        assert_eq!(normalize_country_code(Some("EL")), Some("GR".to_string()));
    }

    #[test]
    fn test_unknown_codes_pass_through_uppercased() {
        assert_eq!(normalize_country_code(Some(" es ")), Some("ES".to_string()));
        assert_eq!(normalize_country_code(Some("DE")), Some("DE".to_string()));
    }

    #[test]
    fn test_blank_input_is_none() {
        assert_eq!(normalize_country_code(None), None);
        assert_eq!(normalize_country_code(Some("   ")), None);
    }

    #[test]
    fn test_geo_id_shape() {
        assert!(is_likely_geo_id("5f2b3c4d5e6f708192a3b4c5"));
        assert!(!is_likely_geo_id("short"));
        assert!(!is_likely_geo_id("not-hex-not-hex-not-hex-!"));
    }
}

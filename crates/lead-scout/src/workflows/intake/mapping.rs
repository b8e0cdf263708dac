use super::normalizer::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;

static FIELD_ALIAS_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

/// Canonical record field for an already-normalized header.
pub(crate) fn field_for_normalized(normalized_header: &str) -> Option<&'static str> {
    field_alias_map().get(normalized_header).copied()
}

fn field_alias_map() -> &'static HashMap<String, &'static str> {
    FIELD_ALIAS_MAP.get_or_init(|| {
        const HEADER_TO_FIELD: &[(&str, &str)] = &[
            // Identity
            ("name", "name"),
            ("full name", "name"),
            ("contact name", "name"),
            ("person name", "name"),
            ("first name", "first_name"),
            ("given name", "first_name"),
            ("last name", "last_name"),
            ("surname", "last_name"),
            ("family name", "last_name"),
            // Role
            ("title", "title"),
            ("job title", "title"),
            ("position", "title"),
            ("role", "title"),
            ("headline", "title"),
            // Organization
            ("company", "company"),
            ("company name", "company"),
            ("organization", "company"),
            ("organisation", "company"),
            ("employer", "company"),
            ("company type", "company_type"),
            ("organization type", "company_type"),
            ("company domain", "company_domain"),
            ("domain", "company_domain"),
            ("website", "company_domain"),
            ("company hq", "company_hq"),
            ("headquarters", "company_hq"),
            ("hq", "company_hq"),
            ("company location", "company_hq"),
            // Person
            ("person location", "person_location"),
            ("location", "person_location"),
            ("city", "person_location"),
            ("work mode", "work_mode"),
            ("work arrangement", "work_mode"),
            ("work mode confidence", "work_mode_confidence"),
            ("email", "email"),
            ("email address", "email"),
            ("business email", "email"),
            ("work email", "email"),
            ("email confidence", "email_confidence"),
            ("profile url", "profile_url"),
            ("linkedin", "profile_url"),
            ("linkedin url", "profile_url"),
            ("linkedin profile", "profile_url"),
            ("profile", "profile_url"),
            // Free text
            ("about", "about"),
            ("summary", "about"),
            ("bio", "about"),
            ("affiliation", "about"),
            ("description", "about"),
            ("publications", "publications"),
            ("papers", "publications"),
        ];

        let mut map = HashMap::with_capacity(HEADER_TO_FIELD.len());
        for (header, field) in HEADER_TO_FIELD {
            map.insert(normalize_header(header), *field);
        }
        map
    })
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(header: &str) -> Option<&'static str> {
    field_for_normalized(&normalize_header(header))
}

/// Lowercase, turn every non-alphanumeric character into a space and
/// collapse runs of whitespace.
///
/// Keywords and haystacks go through the same normalization, so `In-Vitro`
/// matches `in vitro` and phrase boundaries line up with word boundaries.
pub(crate) fn normalize_text(value: &str) -> String {
    let mut mapped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            mapped.extend(ch.to_lowercase());
        } else {
            mapped.push(' ');
        }
    }
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pre-normalized keyword phrases matched on whole-word boundaries.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeywordSet {
    phrases: Vec<String>,
}

impl KeywordSet {
    pub(crate) fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let phrases = keywords
            .iter()
            .map(|keyword| normalize_text(keyword.as_ref()))
            .filter(|phrase| !phrase.is_empty())
            .collect();
        Self { phrases }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// First configured phrase found in `text`, in configuration order.
    pub(crate) fn find(&self, text: &str) -> Option<&str> {
        let haystack = format!(" {} ", normalize_text(text));
        self.phrases
            .iter()
            .find(|phrase| haystack.contains(&format!(" {phrase} ")))
            .map(String::as_str)
    }

    pub(crate) fn matches(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_text("  In-Vitro / 3D  Models! "), "in vitro 3d models");
        assert_eq!(normalize_text("---"), "");
    }

    #[test]
    fn phrases_match_on_word_boundaries() {
        let set = KeywordSet::new(&["nam", "in vitro", "head"]);
        assert_eq!(set.find("Champion of NAM adoption"), Some("nam"));
        assert_eq!(set.find("Uses in-vitro assays"), Some("in vitro"));
        assert!(!set.matches("Her name is on the masthead"));
        assert!(!set.matches("company headquarters"));
    }

    #[test]
    fn non_ascii_capitals_fold_to_lowercase() {
        assert_eq!(normalize_text("ZÜRICH, Schweiz"), "zürich schweiz");
        let hubs = KeywordSet::new(&["zürich", "malmö"]);
        assert_eq!(hubs.find("Head office: ZÜRICH"), Some("zürich"));
        assert_eq!(hubs.find("MALMÖ, Sweden"), Some("malmö"));
    }

    #[test]
    fn returns_first_configured_phrase() {
        let set = KeywordSet::new(&["director", "safety"]);
        assert_eq!(set.find("Safety Director"), Some("director"));
    }

    #[test]
    fn empty_set_never_matches() {
        let set = KeywordSet::new::<&str>(&[]);
        assert!(set.is_empty());
        assert!(!set.matches("anything at all"));
    }
}

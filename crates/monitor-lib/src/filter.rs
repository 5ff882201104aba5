//! Exclusion of administratively uninteresting pages

/// Path fragments excluded by default
const DEFAULT_EXCLUDED_FRAGMENTS: [&str; 3] =
    ["/online-threats/", "/security_response/", "/support/"];

/// Substring blacklist over page URLs
///
/// A page is excluded when any fragment appears anywhere in its URL,
/// including mid-segment. Matching is plain substring containment, not
/// path-segment or prefix matching.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    fragments: Vec<String>,
}

impl UrlFilter {
    /// Filter over a custom fragment set
    pub fn new(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    /// Whether `url` contains any excluded fragment
    pub fn is_excluded(&self, url: &str) -> bool {
        self.fragments.iter().any(|fragment| url.contains(fragment))
    }

    /// Fragments currently in force
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXCLUDED_FRAGMENTS
                .iter()
                .map(|fragment| fragment.to_string())
                .collect(),
        )
    }
}

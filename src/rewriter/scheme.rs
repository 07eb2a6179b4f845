//! Scheme classification shared by both transcoding directions.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// `javascript:` addresses; the body is script, not an address.
    JavaScript,
    /// `blob:` addresses, embedded verbatim under the proxy prefix.
    Blob,
    /// `data:` addresses, embedded verbatim under the proxy prefix.
    Data,
    MailTo,
    About,
    /// Anything else: resolved, then codec-encoded.
    Network,
}

/// Literal prefixes in match order. No prefix is a prefix of another.
pub const SCHEME_TABLE: [(&str, Scheme); 5] = [
    ("javascript:", Scheme::JavaScript),
    ("blob:", Scheme::Blob),
    ("data:", Scheme::Data),
    ("mailto:", Scheme::MailTo),
    ("about:", Scheme::About),
];

/// Classifies `url` by its literal leading characters. Case and surrounding
/// whitespace are not normalized.
pub fn classify(url: &str) -> Scheme {
    SCHEME_TABLE
        .iter()
        .find(|(prefix, _)| url.starts_with(prefix))
        .map(|(_, scheme)| *scheme)
        .unwrap_or(Scheme::Network)
}

impl Scheme {
    pub fn prefix(&self) -> Option<&'static str> {
        SCHEME_TABLE
            .iter()
            .find(|(_, scheme)| scheme == self)
            .map(|(prefix, _)| *prefix)
    }

    /// Schemes that are embedded verbatim rather than encoded.
    pub fn is_passthrough_embedded(&self) -> bool {
        matches!(self, Scheme::Blob | Scheme::Data)
    }

    /// Schemes returned unchanged in both directions.
    pub fn is_identity(&self) -> bool {
        matches!(self, Scheme::MailTo | Scheme::About)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix() {
            Some(prefix) => write!(f, "{}", prefix),
            None => write!(f, "network"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_literal_prefix() {
        assert_eq!(classify("javascript:alert(1)"), Scheme::JavaScript);
        assert_eq!(classify("blob:https://a.test/uuid"), Scheme::Blob);
        assert_eq!(classify("data:text/plain,hi"), Scheme::Data);
        assert_eq!(classify("mailto:a@b.com"), Scheme::MailTo);
        assert_eq!(classify("about:blank"), Scheme::About);
        assert_eq!(classify("https://a.test/"), Scheme::Network);
        assert_eq!(classify("/relative/path"), Scheme::Network);
        assert_eq!(classify(""), Scheme::Network);
    }

    #[test]
    fn test_classification_is_case_sensitive() {
        assert_eq!(classify("JavaScript:void(0)"), Scheme::Network);
        assert_eq!(classify(" about:blank"), Scheme::Network);
    }

    #[test]
    fn test_scheme_policies() {
        assert!(Scheme::MailTo.is_identity() && Scheme::About.is_identity());
        assert!(Scheme::Blob.is_passthrough_embedded() && Scheme::Data.is_passthrough_embedded());
        assert!(!Scheme::Network.is_identity() && !Scheme::JavaScript.is_passthrough_embedded());
        assert_eq!(Scheme::Blob.to_string(), "blob:");
        assert_eq!(Scheme::Network.prefix(), None);
    }

    #[test]
    fn test_prefixes_are_mutually_exclusive() {
        for (a, _) in SCHEME_TABLE.iter() {
            for (b, _) in SCHEME_TABLE.iter() {
                if a != b {
                    assert!(!a.starts_with(b));
                }
            }
        }
    }
}

//! Small shared value types.

/// The structurally-valid decomposition of a signed URL.
///
/// Produced by URL parsing only; carrying one of these proves nothing about
/// authenticity. A caller must always run the components through signature
/// verification before trusting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlComponents {
    /// The bucket name (first path segment).
    pub bucket: String,
    /// The object path (remaining path segments, joined).
    pub path: String,
    /// Expiry as unix seconds.
    pub expires: i64,
    /// The hex-encoded signature from the query string.
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_compare_components_by_value() {
        let a = UrlComponents {
            bucket: "photos".to_owned(),
            path: "vacation/img.jpg".to_owned(),
            expires: 1_700_000_000,
            signature: "abcd".to_owned(),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}

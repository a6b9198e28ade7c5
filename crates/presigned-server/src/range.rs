//! Byte-range header parsing.

/// A validated, inclusive byte range within an object of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive), already clamped to `size - 1`.
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the range covers.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse a `Range` header value against an object of `size` bytes.
///
/// Accepts `bytes={start}-{end}` with either side omissible: an empty
/// start means 0, an empty end means `size - 1`, and a given end is
/// clamped to `size - 1`. Returns `None` for anything malformed, for
/// `start > end`, and for `start >= size`; the caller treats `None` as
/// "no range requested" and serves the full object rather than
/// rejecting.
///
/// Note the empty-start form is NOT the RFC 9110 suffix range:
/// `bytes=-5` means bytes 0 through 5 here.
#[must_use]
pub fn parse_range(value: &str, size: u64) -> Option<ByteRange> {
    let spec = value.strip_prefix("bytes=")?;

    let (start_raw, end_raw) = spec.split_once('-')?;
    // A second '-' makes it a multi-range or garbage; ignore it.
    if end_raw.contains('-') {
        return None;
    }

    if size == 0 {
        return None;
    }

    let start: u64 = if start_raw.is_empty() {
        0
    } else {
        start_raw.parse().ok()?
    };
    let end: u64 = if end_raw.is_empty() {
        size - 1
    } else {
        end_raw.parse().ok()?
    };

    if start > end || start >= size {
        return None;
    }

    Some(ByteRange {
        start,
        end: end.min(size - 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_bounded_range() {
        let range = parse_range("bytes=0-4", 11).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 4 });
        assert_eq!(range.length(), 5);
    }

    #[test]
    fn test_should_default_open_end_to_last_byte() {
        let range = parse_range("bytes=5-", 11).unwrap();
        assert_eq!(range, ByteRange { start: 5, end: 10 });
        assert_eq!(range.length(), 6);
    }

    #[test]
    fn test_should_treat_empty_start_as_zero() {
        // Not an RFC suffix range: "-5" is 0..=5.
        let range = parse_range("bytes=-5", 11).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 5 });
    }

    #[test]
    fn test_should_clamp_end_to_size() {
        let range = parse_range("bytes=5-9999", 11).unwrap();
        assert_eq!(range, ByteRange { start: 5, end: 10 });
    }

    #[test]
    fn test_should_accept_single_byte_range() {
        let range = parse_range("bytes=10-10", 11).unwrap();
        assert_eq!(range.length(), 1);
    }

    #[test]
    fn test_should_ignore_inverted_range() {
        assert!(parse_range("bytes=7-3", 11).is_none());
    }

    #[test]
    fn test_should_ignore_start_beyond_size() {
        assert!(parse_range("bytes=11-", 11).is_none());
        assert!(parse_range("bytes=999-1000", 11).is_none());
    }

    #[test]
    fn test_should_ignore_malformed_values() {
        for value in [
            "bytes=",
            "bytes=abc-def",
            "bytes=1.5-3",
            "bytes=0-4,6-8",
            "bytes=0-4-6",
            "bites=0-4",
            "0-4",
            "bytes=--",
        ] {
            assert!(parse_range(value, 11).is_none(), "expected ignore: {value}");
        }
    }

    #[test]
    fn test_should_ignore_any_range_on_empty_object() {
        assert!(parse_range("bytes=0-", 0).is_none());
        assert!(parse_range("bytes=-", 0).is_none());
    }
}

//! Gzip body compression.

use std::io::Write;

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;

/// Gzip-compress a body at the given level (0-9).
///
/// Returns `None` when compression fails; the caller falls back to the
/// uncompressed bytes.
#[must_use]
pub fn gzip(data: &[u8], level: u32) -> Option<Bytes> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(data).ok()?;
    let compressed = encoder.finish().ok()?;
    Some(Bytes::from(compressed))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    #[test]
    fn test_should_roundtrip_through_gzip() {
        let body = "Hello World ".repeat(200);
        let compressed = gzip(body.as_bytes(), 6).unwrap();
        assert!(compressed.len() < body.len());

        let mut decoder = GzDecoder::new(&compressed[..]);
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).unwrap();
        assert_eq!(decompressed, body);
    }

    #[test]
    fn test_should_emit_gzip_magic_bytes() {
        let compressed = gzip(b"payload", 6).unwrap();
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_should_clamp_out_of_range_level() {
        assert!(gzip(b"payload", 99).is_some());
    }

    #[test]
    fn test_should_compress_empty_input() {
        let compressed = gzip(b"", 6).unwrap();
        assert!(!compressed.is_empty());
    }
}

//! The HTTP response value returned by the serving pipeline.

use std::io::Read;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use presigned_storage::ObjectRead;

/// Response body variants.
///
/// Small and compressed bodies are buffered; large plain transfers are
/// handed out as open byte streams so the whole object never sits in
/// memory at once.
pub enum ResponseBody {
    /// No body (304, HEAD, error statuses before a body is attached).
    Empty,
    /// Fully buffered bytes.
    Buffered(Bytes),
    /// An open, seekable byte stream owned by this response. Closed on
    /// drop.
    Stream(Box<dyn ObjectRead>),
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// An HTTP response produced by the serving pipeline.
///
/// Created fresh per request and never mutated after being returned;
/// the only sanctioned post-hoc change is
/// [`with_header`](Self::with_header), which copies. Header lookup is
/// case-insensitive (header names are stored normalized).
#[derive(Debug)]
pub struct FileResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// The response body.
    pub body: ResponseBody,
}

impl FileResponse {
    /// Create a bodiless response with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        }
    }

    /// Copy this response with one header added (or replaced).
    ///
    /// A name or value that is not a valid HTTP header is silently
    /// dropped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<HeaderName>(),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Look up a header value by name, case-insensitively.
    ///
    /// Returns `None` for absent headers and for values that are not
    /// valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether a header is present, case-insensitively.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether the status is 304 Not Modified.
    #[must_use]
    pub fn is_not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED
    }

    /// Whether the status is 206 Partial Content.
    #[must_use]
    pub fn is_partial_content(&self) -> bool {
        self.status == StatusCode::PARTIAL_CONTENT
    }

    /// Whether the response carries a body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !matches!(self.body, ResponseBody::Empty)
    }

    /// Consume the response and drain its body into memory.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from reading a streamed body.
    pub fn into_body_bytes(self) -> std::io::Result<Bytes> {
        match self.body {
            ResponseBody::Empty => Ok(Bytes::new()),
            ResponseBody::Buffered(bytes) => Ok(bytes),
            ResponseBody::Stream(mut stream) => {
                let mut buf = Vec::new();
                stream.read_to_end(&mut buf)?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_should_start_bodiless() {
        let response = FileResponse::new(StatusCode::OK);
        assert!(response.is_success());
        assert!(!response.has_body());
        assert!(response.headers.is_empty());
    }

    #[test]
    fn test_should_look_up_headers_case_insensitively() {
        let response = FileResponse::new(StatusCode::OK).with_header("Content-Type", "text/plain");
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/plain"));
        assert!(response.has_header("cOnTenT-tYpE"));
        assert!(response.header("x-missing").is_none());
    }

    #[test]
    fn test_should_replace_header_on_repeat() {
        let response = FileResponse::new(StatusCode::OK)
            .with_header("ETag", "\"a\"")
            .with_header("etag", "\"b\"");
        assert_eq!(response.header("ETag"), Some("\"b\""));
        assert_eq!(response.headers.len(), 1);
    }

    #[test]
    fn test_should_drop_invalid_header() {
        let response = FileResponse::new(StatusCode::OK).with_header("bad name", "x");
        assert!(response.headers.is_empty());
    }

    #[test]
    fn test_should_report_status_predicates() {
        assert!(FileResponse::new(StatusCode::NOT_MODIFIED).is_not_modified());
        assert!(FileResponse::new(StatusCode::PARTIAL_CONTENT).is_partial_content());
        assert!(!FileResponse::new(StatusCode::FORBIDDEN).is_success());
    }

    #[test]
    fn test_should_drain_buffered_body() {
        let mut response = FileResponse::new(StatusCode::OK);
        response.body = ResponseBody::Buffered(Bytes::from("hello"));
        assert!(response.has_body());
        assert_eq!(response.into_body_bytes().unwrap(), Bytes::from("hello"));
    }

    #[test]
    fn test_should_drain_streamed_body() {
        let mut response = FileResponse::new(StatusCode::OK);
        response.body = ResponseBody::Stream(Box::new(Cursor::new(Bytes::from("streamed"))));
        assert_eq!(response.into_body_bytes().unwrap(), Bytes::from("streamed"));
    }
}

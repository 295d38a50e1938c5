//! Multipart body rewriting for the submission relay.
//!
//! The relay never re-encodes the client's parts. It serializes its own
//! synthetic text parts with the client's boundary and places them ahead of
//! the untouched original bytes, so the workflow's multipart-aware trigger
//! sees the injected fields first and every original part byte-for-byte.

use axum::body::Bytes;

/// Form field carrying the request token to the workflow.
pub const REQUEST_ID_FIELD: &str = "request_id";

/// A text form part to be written ahead of an existing multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPart {
    pub name: String,
    pub value: String,
}

impl TextPart {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Serializes text parts using a borrowed boundary.
#[derive(Debug)]
pub struct MultipartWriter<'a> {
    boundary: &'a str,
    parts: Vec<TextPart>,
}

impl<'a> MultipartWriter<'a> {
    pub fn new(boundary: &'a str) -> Self {
        Self {
            boundary,
            parts: Vec::new(),
        }
    }

    pub fn part(mut self, part: TextPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Write every part followed by `tail`, which must already be a complete
    /// multipart body using the same boundary (including its closing delimiter).
    pub fn finish_with(self, tail: &[u8]) -> Bytes {
        let mut out = Vec::with_capacity(tail.len() + self.parts.len() * 128);
        for part in &self.parts {
            out.extend_from_slice(b"--");
            out.extend_from_slice(self.boundary.as_bytes());
            out.extend_from_slice(b"\r\nContent-Disposition: form-data; name=\"");
            out.extend_from_slice(escape_name(&part.name).as_bytes());
            out.extend_from_slice(b"\"\r\n\r\n");
            out.extend_from_slice(part.value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(tail);
        Bytes::from(out)
    }
}

/// Extract the boundary parameter from a `multipart/form-data` content type.
pub fn boundary(content_type: &str) -> Result<&str, MultipartError> {
    let mut params = content_type.split(';');
    let media_type = params.next().unwrap_or_default().trim();
    if !media_type.eq_ignore_ascii_case("multipart/form-data") {
        return Err(MultipartError::NotMultipart(media_type.to_string()));
    }

    params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
        .ok_or(MultipartError::MissingBoundary)
}

/// Prepend a `request_id` part to a raw multipart body, reusing its boundary.
pub fn inject_request_id(
    content_type: &str,
    body: &[u8],
    request_id: &str,
) -> Result<Bytes, MultipartError> {
    let boundary = boundary(content_type)?;

    let delimiter = format!("--{boundary}");
    if !contains(body, delimiter.as_bytes()) {
        return Err(MultipartError::BoundaryNotInBody);
    }

    Ok(MultipartWriter::new(boundary)
        .part(TextPart::new(REQUEST_ID_FIELD, request_id))
        .finish_with(body))
}

fn escape_name(name: &str) -> String {
    name.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartError {
    #[error("Missing Content-Type header")]
    MissingContentType,

    #[error("Expected multipart/form-data, got '{0}'")]
    NotMultipart(String),

    #[error("Content-Type header has no multipart boundary")]
    MissingBoundary,

    #[error("Request body does not contain the declared multipart boundary")]
    BoundaryNotInBody,
}

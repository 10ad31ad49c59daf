//! `multipart/form-data` decoding.
//!
//! The body is cut at every occurrence of `--<boundary>`. Each piece between
//! two consecutive delimiters is one part:
//!
//! ```text
//! --B\r\n
//! Content-Disposition: form-data; name="title"\r\n
//! \r\n
//! hi\r\n
//! --B\r\n
//! Content-Disposition: form-data; name="upload"; filename="a.txt"\r\n
//! Content-Type: text/plain\r\n
//! \r\n
//! hello\r\n
//! --B--\r\n
//! ```
//!
//! Parts without a `filename` become form fields. Parts with one become
//! [`FilePart`]s, which only record where their content sits in the body.
//! A malformed part is skipped and decoding goes on with the next one.

use std::collections::HashMap;
use std::ops::Range;

use memchr::memmem;
use tracing::debug;

use super::DecodedBody;
use crate::protocol::Arguments;

/// Parts shorter than this are boundary artifacts, such as the `--\r\n` after the last delimiter
const MIN_PART_LEN: usize = 6;

const CRLF: &[u8] = b"\r\n";
const HEADER_END: &[u8] = b"\r\n\r\n";

/// An uploaded file, recorded as a byte range of the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    filename: String,
    content_type: String,
    range: Range<usize>,
}

impl FilePart {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The part's own `Content-Type`, or the empty string when it declared none
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> usize {
        self.range.len()
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Borrows the file content out of the body it was decoded from.
    ///
    /// Returns `None` if `body` is too short to hold the recorded range.
    pub fn view<'a>(&'a self, body: &'a [u8]) -> Option<UploadFile<'a>> {
        let data = body.get(self.range.clone())?;
        Some(UploadFile { filename: &self.filename, content_type: &self.content_type, data })
    }
}

/// A borrowed view of an uploaded file.
///
/// The view cannot outlive the request body it points into; copy `data` to keep it longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadFile<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

impl UploadFile<'_> {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Decodes a multipart body delimited by `boundary`.
pub fn decode(boundary: &str, body: &[u8]) -> DecodedBody {
    let mut fields = Arguments::new();
    let mut files = HashMap::new();

    let delimiter = format!("--{boundary}");
    let positions: Vec<usize> = memmem::find_iter(body, delimiter.as_bytes()).collect();

    for window in positions.windows(2) {
        let start = window[0] + delimiter.len();
        let end = window[1];
        if end <= start || end - start < MIN_PART_LEN {
            continue;
        }

        match decode_part(body, start..end) {
            Some(Part::Field { name, value }) => fields.push(name, value),
            Some(Part::File { name, file }) => {
                files.insert(name, file);
            }
            None => {}
        }
    }

    DecodedBody { fields, files }
}

enum Part {
    Field { name: String, value: String },
    File { name: String, file: FilePart },
}

fn decode_part(body: &[u8], range: Range<usize>) -> Option<Part> {
    let mut start = range.start;
    let mut end = range.end;
    if body[start..end].starts_with(CRLF) {
        start += CRLF.len();
    }
    if body[start..end].ends_with(CRLF) {
        end -= CRLF.len();
    }
    let part = &body[start..end];

    let Some(header_len) = memmem::find(part, HEADER_END) else {
        debug!(offset = start, "multipart part without header terminator, skipped");
        return None;
    };
    let content = start + header_len + HEADER_END.len()..end;

    let mut name = None;
    let mut filename = None;
    let mut content_type = String::new();

    let header_block = String::from_utf8_lossy(&part[..header_len]);
    for line in header_block.split("\r\n") {
        let Some((header, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if header.trim().eq_ignore_ascii_case("content-type") {
            value.clone_into(&mut content_type);
        } else if header.trim().eq_ignore_ascii_case("content-disposition") {
            for token in value.split("; ") {
                match token.split_once('=') {
                    Some(("name", v)) => name = Some(unquote(v).to_owned()),
                    Some(("filename", v)) => filename = Some(unquote(v).to_owned()),
                    _ => {}
                }
            }
        }
    }

    let Some(name) = name else {
        debug!(offset = start, "multipart part without a name, skipped");
        return None;
    };

    match filename {
        Some(filename) => Some(Part::File { name, file: FilePart { filename, content_type, range: content } }),
        None => {
            let value = String::from_utf8_lossy(&body[content]).into_owned();
            Some(Part::Field { name, value })
        }
    }
}

fn unquote(value: &str) -> &str {
    value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value)
}

//! Request body decoding for HTML form submissions.
//!
//! Two content types are understood:
//!
//! - `application/x-www-form-urlencoded`: see [`urlencoded`]
//! - `multipart/form-data; boundary=...`: see [`multipart`]
//!
//! Any other content type, or no content type at all, leaves the body
//! undecoded. The raw bytes stay reachable through the connection either way.

use std::collections::HashMap;

use mime::Mime;
use tracing::debug;

use crate::protocol::Arguments;

pub mod multipart;
pub mod urlencoded;

pub use multipart::{FilePart, UploadFile};

/// Form fields and uploaded files recovered from a request body.
#[derive(Debug, Clone, Default)]
pub struct DecodedBody {
    pub fields: Arguments,
    pub files: HashMap<String, FilePart>,
}

/// Decodes `body` according to its `Content-Type` header value.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> DecodedBody {
    let Some(content_type) = content_type else {
        return DecodedBody::default();
    };

    let mime = match content_type.parse::<Mime>() {
        Ok(mime) => mime,
        Err(e) => {
            debug!(content_type, cause = %e, "unparsable content-type, body left undecoded");
            return DecodedBody::default();
        }
    };

    if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        return DecodedBody { fields: urlencoded::decode(body), files: HashMap::new() };
    }

    if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
        return match mime.get_param(mime::BOUNDARY) {
            Some(boundary) => multipart::decode(boundary.as_str(), body),
            None => {
                debug!(content_type, "multipart body without boundary, body left undecoded");
                DecodedBody::default()
            }
        };
    }

    DecodedBody::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencoded_content_type() {
        let decoded = decode_body(Some("application/x-www-form-urlencoded; charset=utf-8"), b"a=1&a=2");
        assert_eq!(decoded.fields.all("a").collect::<Vec<_>>(), vec!["1", "2"]);
        assert!(decoded.files.is_empty());
    }

    #[test]
    fn test_other_content_types_are_opaque() {
        assert!(decode_body(Some("application/json"), b"a=1").fields.is_empty());
        assert!(decode_body(None, b"a=1").fields.is_empty());
        assert!(decode_body(Some("not a mime"), b"a=1").fields.is_empty());
        assert!(decode_body(Some("multipart/form-data"), b"a=1").fields.is_empty());
    }
}

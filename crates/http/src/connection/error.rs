use thiserror::Error;

use crate::protocol::SendError;

/// Failure to build a connection from a raw request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("invalid request uri `{uri}`")]
    InvalidUri { uri: String },

    #[error("request path `{path}` is not valid percent-encoded utf-8")]
    InvalidPath { path: String },

    #[error("invalid request header `{name}`")]
    InvalidHeader { name: String },
}

/// An operation that is not legal in the current state of the response,
/// or whose arguments were rejected.
///
/// A failed operation leaves the connection exactly as it was.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("response already finished")]
    Finished,

    #[error("response headers already sent")]
    HeadersSent,

    #[error("unsupported status code {0}")]
    UnsupportedStatus(u16),

    #[error("invalid reason phrase")]
    InvalidReason,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("cookie `{name}` already set for domain `{domain}` and path `{path}`")]
    DuplicateCookie { name: String, domain: String, path: String },

    #[error("invalid cookie `{name}`")]
    InvalidCookie { name: String },

    #[error("no error handler installed")]
    MissingErrorHandler,

    #[error("failed to send response: {source}")]
    Send {
        #[from]
        source: SendError,
    },
}

impl ConnectionError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_cookie<S: ToString>(name: S) -> Self {
        Self::InvalidCookie { name: name.to_string() }
    }
}

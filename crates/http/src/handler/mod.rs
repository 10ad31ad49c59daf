//! Error handlers invoked through [`Connection::send_error`].
//!
//! An [`ErrorHandler`] receives the status code and the still open
//! connection. It is expected to produce a body and finish the response.
//! Any `Fn(u16, &mut Connection)` closure is an error handler.

use tracing::warn;

use crate::connection::Connection;
use crate::protocol::status;

pub trait ErrorHandler: Send + Sync {
    fn handle_error(&self, code: u16, conn: &mut Connection);
}

impl<F> ErrorHandler for F
where
    F: Fn(u16, &mut Connection) + Send + Sync,
{
    fn handle_error(&self, code: u16, conn: &mut Connection) {
        (self)(code, conn);
    }
}

/// Logs the code, then answers with that status and its reason phrase as a plain body.
///
/// Codes outside the supported set are answered as `500`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle_error(&self, code: u16, conn: &mut Connection) {
        warn!(status = code, method = %conn.method(), path = %conn.path(), "request failed");
        if conn.is_finished() || conn.is_chunked() {
            return;
        }

        let code = if status::is_supported(code) { code } else { 500 };
        let result = conn
            .set_status(code)
            .and_then(|()| conn.write(status::reason_phrase(code).unwrap_or_default()))
            .and_then(|()| conn.finish());
        if let Err(e) = result {
            warn!(status = code, cause = %e, "failed to send error response");
        }
    }
}

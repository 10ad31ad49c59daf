//! `application/x-www-form-urlencoded` decoding, shared by query strings and bodies.

use tracing::debug;

use crate::protocol::Arguments;

/// Decodes `key=value&...` pairs, keeping duplicate keys in arrival order.
///
/// Undecodable input yields no arguments rather than an error.
pub fn decode(input: &[u8]) -> Arguments {
    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(input) {
        Ok(pairs) => Arguments::from(pairs),
        Err(e) => {
            debug!(cause = %e, "failed to decode urlencoded pairs");
            Arguments::new()
        }
    }
}

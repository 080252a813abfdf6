//! First-pass interpretation of a response: transport failure or payload.

use tracing::{debug, warn};

use crate::error::HttpError;

/// Decide whether `body` should be parsed.
///
/// Statuses in `[200, 400)` always pass. Any other status passes only when
/// the body looks like the service's own structured error envelope; an empty
/// body or an HTML error page becomes an `HttpError`.
pub fn classify<'a>(status: u16, body: &'a str, content_type: &str) -> Result<&'a str, HttpError> {
    if (200..400).contains(&status) {
        debug!(status, body, "response accepted");
        return Ok(body);
    }
    if body.trim().is_empty() || is_html(content_type) {
        let err = HttpError::from_status(status);
        warn!(status, reason = err.reason, "transport error");
        return Err(err);
    }
    debug!(status, body, "structured error body, deferring to payload parser");
    Ok(body)
}

fn is_html(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case("text/html"))
}

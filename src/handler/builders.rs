//! Builders for the simple response facets.
//!
//! Each builder is independent of the others and validates its input up
//! front, so malformed values fail at configuration time.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::ConfigurationError;
use crate::handler::{Modifier, ResponseHandler};
use crate::resource::Resource;

/// Serve the content of `resource`.
pub fn content(resource: Resource) -> ResponseHandler {
    ResponseHandler::Single(Modifier::Content(resource))
}

/// Set the status parsed from its base-10 string form.
pub fn status(status: &str) -> Result<ResponseHandler, ConfigurationError> {
    let code = status
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| ConfigurationError::InvalidStatus(status.to_string()))?;
    Ok(ResponseHandler::Single(Modifier::Status(code)))
}

/// One header per entry, in map order.
pub fn headers(headers: &IndexMap<String, String>) -> Result<ResponseHandler, ConfigurationError> {
    let children = headers
        .iter()
        .map(|(name, value)| {
            let invalid = |reason: String| ConfigurationError::InvalidHeader {
                name: name.clone(),
                reason,
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            Ok(ResponseHandler::Single(Modifier::Header(header_name, header_value)))
        })
        .collect::<Result<Vec<_>, ConfigurationError>>()?;

    Ok(ResponseHandler::Composite(children))
}

/// Printable ASCII outside the RFC 6265 cookie-octet range. Controls and
/// non-ASCII bytes are encoded as well.
const COOKIE_VALUE: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b',').add(b';').add(b'\\');

/// One `Set-Cookie` line per entry, in map order.
///
/// Values are served as given when they are valid cookie octets and
/// percent-encoded otherwise, so `hello world` becomes `hello%20world`.
pub fn cookies(cookies: &IndexMap<String, String>) -> Result<ResponseHandler, ConfigurationError> {
    let children = cookies
        .iter()
        .map(|(name, value)| {
            let invalid = |reason: &str| ConfigurationError::InvalidCookie {
                name: name.clone(),
                reason: reason.to_string(),
            };
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(invalid("name must be a non-empty token"));
            }
            let value = utf8_percent_encode(value, COOKIE_VALUE);
            let line = HeaderValue::from_str(&format!("{name}={value}"))
                .map_err(|_| invalid("not a valid header value"))?;
            Ok(ResponseHandler::Single(Modifier::Cookie {
                name: name.clone(),
                value: line,
            }))
        })
        .collect::<Result<Vec<_>, ConfigurationError>>()?;

    Ok(ResponseHandler::Composite(children))
}

/// Hold the response back for at least `millis` milliseconds.
pub fn latency(millis: u64) -> ResponseHandler {
    ResponseHandler::Single(Modifier::Latency(Duration::from_millis(millis)))
}

// RFC 7230 token characters.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

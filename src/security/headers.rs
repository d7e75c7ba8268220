//! Outgoing request headers.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_CLIENT_VERSION: HeaderName = HeaderName::from_static("x-client-version");

/// Headers for one attempt: bearer credential, content type, request id and
/// client version.
pub fn build_request_headers(
    encrypted_key: &str,
    request_id: &str,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", encrypted_key))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(X_REQUEST_ID, HeaderValue::from_str(request_id)?);
    headers.insert(
        X_CLIENT_VERSION,
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    Ok(headers)
}

/// Extract the token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers() {
        let headers = build_request_headers("abc+/=", "0b7c3c1e-0000-4000-8000-000000000000").unwrap();
        assert_eq!(bearer_token(&headers), Some("abc+/="));
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[X_REQUEST_ID], "0b7c3c1e-0000-4000-8000-000000000000");
        assert_eq!(headers[X_CLIENT_VERSION], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_rejects_control_characters() {
        assert!(build_request_headers("bad\nvalue", "id").is_err());
    }
}

use axum::http::HeaderValue;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Headers set on every response regardless of environment
const BASELINE_HEADERS: &[(&str, &str)] = &[
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ("Cache-Control", "no-store, private"),
];

const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

/// RapiDoc loads its bundle from unpkg.
const DOCS_CSP: &str = "default-src 'self'; script-src 'self' https://unpkg.com; \
     style-src 'self' 'unsafe-inline'; img-src 'self' data:; \
     connect-src 'self'; frame-ancestors 'none'";

const HSTS: &str = "max-age=31536000; includeSubDomains";

#[derive(Clone, Debug)]
pub struct SecurityHeadersConfig {
    /// Adds HSTS; TLS is terminated upstream in production.
    pub is_production: bool,
}

impl SecurityHeadersConfig {
    pub fn new(is_production: bool) -> Self {
        Self { is_production }
    }
}

fn content_security_policy(path: &str) -> &'static str {
    if path.starts_with("/docs") {
        DOCS_CSP
    } else {
        API_CSP
    }
}

pub async fn security_headers_middleware(
    State(config): State<Arc<SecurityHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let csp = content_security_policy(request.uri().path());
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in BASELINE_HEADERS {
        headers.insert(*name, HeaderValue::from_static(*value));
    }
    headers.insert("Content-Security-Policy", HeaderValue::from_static(csp));
    if config.is_production {
        headers.insert("Strict-Transport-Security", HeaderValue::from_static(HSTS));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docs_get_relaxed_policy() {
        assert_eq!(content_security_policy("/docs"), DOCS_CSP);
        assert_eq!(content_security_policy("/api/upload"), API_CSP);
    }
}

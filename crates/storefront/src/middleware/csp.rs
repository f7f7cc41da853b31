//! Content Security Policy with a per-request nonce.
//!
//! Inline `<script>` and `<style>` blocks must carry `nonce="{{ nonce }}"`.
//! HTMX is loaded from unpkg; product photos may live on any HTTPS host.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// Script origin for HTMX.
pub const HTMX_ORIGIN: &str = "https://unpkg.com";

/// Checkout redirects the form post to WhatsApp, which `form-action` must allow.
const WHATSAPP_ORIGINS: &str = "https://wa.me https://api.whatsapp.com";

/// A CSP nonce value for inline scripts and styles.
///
/// Each request gets a unique, cryptographically random nonce (128-bit, base64-encoded).
#[derive(Clone, Debug)]
pub struct CspNonce(pub String);

impl CspNonce {
    /// Generate a new random nonce.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    /// Get the nonce value for use in templates.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// The `Content-Security-Policy` header value for this nonce.
    #[must_use]
    pub fn policy(&self) -> String {
        let nonce = &self.0;
        format!(
            "default-src 'none'; \
             script-src 'self' 'nonce-{nonce}' {HTMX_ORIGIN}; \
             style-src 'self' 'nonce-{nonce}'; \
             font-src 'self'; \
             img-src 'self' https: data:; \
             connect-src 'self'; \
             manifest-src 'self'; \
             frame-src 'none'; \
             object-src 'none'; \
             base-uri 'self'; \
             form-action 'self' {WHATSAPP_ORIGINS}; \
             frame-ancestors 'none'"
        )
    }
}

/// Middleware that generates a CSP nonce and stores it in request extensions.
///
/// Must run before `security_headers_middleware`, which reads the nonce back
/// when building the CSP header.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!(
                "CSP nonce not found in request extensions - middleware may be misconfigured"
            );
            Self(String::new())
        }))
    }
}

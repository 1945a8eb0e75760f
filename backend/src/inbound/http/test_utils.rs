//! Test helpers for inbound HTTP components.

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};

/// Session middleware mirroring the production cookie settings, minus the
/// `Secure` flag so plain-HTTP test requests still carry the cookie.
///
/// Each invocation generates a fresh signing/encryption key; cookies do not
/// transfer between separately built test services.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .cookie_same_site(SameSite::Lax)
        .cookie_content_security(CookieContentSecurity::Private)
        .session_lifecycle(PersistentSession::default().session_ttl(Duration::hours(2)))
        .build()
}

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Cookie carrying the shared site secret for the browser gate.
pub const SITE_COOKIE: &str = "cw_site";
/// Cookie carrying the partner user id set by the OAuth callback.
pub const SESSION_COOKIE: &str = "cw_session";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The authenticated partner user id, stored as a request extension by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct SessionUser(pub String);

/// Shared-secret cookie gate settings used by middleware.
#[derive(Debug, Clone)]
pub struct SiteGate {
    secret: Option<Arc<String>>,
    pub enabled: bool,
}

impl SiteGate {
    /// Builds the gate from the configured shared secret.
    ///
    /// In development, a missing secret disables the gate for local
    /// iteration. In non-development envs, a missing secret fails startup.
    pub fn new(secret: Option<String>, is_development: bool) -> anyhow::Result<Self> {
        match secret {
            Some(s) if !s.trim().is_empty() => Ok(Self {
                secret: Some(Arc::new(s)),
                enabled: true,
            }),
            _ => {
                if is_development {
                    tracing::warn!(
                        "CARTWISE_SITE_SECRET not set; site gate disabled in development environment"
                    );
                    return Ok(Self {
                        secret: None,
                        enabled: false,
                    });
                }
                anyhow::bail!("CARTWISE_SITE_SECRET is required outside development")
            }
        }
    }

    fn allows(&self, presented: &str) -> bool {
        self.secret
            .as_ref()
            .is_some_and(|s| s.as_bytes().ct_eq(presented.as_bytes()).into())
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Sliding fixed-window limiter for simple API protection.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing the shared-secret cookie gate when enabled.
pub async fn enforce_site_gate(State(gate): State<SiteGate>, req: Request, next: Next) -> Response {
    if !gate.enabled {
        return next.run(req).await;
    }

    let presented = cookie_value(req.headers(), SITE_COOKIE);

    match presented {
        Some(value) if gate.allows(value) => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "unauthorized",
                    message: "missing or invalid site cookie",
                },
            }),
        )
            .into_response(),
    }
}

/// Middleware requiring an authenticated session cookie.
///
/// Inserts [`SessionUser`] into request extensions on success; responds 401
/// when the cookie is absent. The cookie is set by the OAuth callback.
pub async fn require_session(mut req: Request, next: Next) -> Response {
    match cookie_value(req.headers(), SESSION_COOKIE) {
        Some(user_id) if !user_id.is_empty() => {
            let user = SessionUser(user_id.to_owned());
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "unauthorized",
                    message: "sign in required",
                },
            }),
        )
            .into_response(),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "rate_limited",
                    message: "rate limit exceeded",
                },
            }),
        )
            .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

/// Extracts the session user id from headers without enforcing presence.
/// Used by routes where the session is optional.
#[must_use]
pub fn maybe_session_user(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Finds a cookie value in the `Cookie` header(s) by name.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            Some((k.trim(), v.trim()))
        })
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn headers_with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn cookie_value_finds_named_cookie_among_many() {
        let headers = headers_with_cookie("a=1; cw_session=user-9; b=2");
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("user-9"));
        assert_eq!(cookie_value(&headers, "a"), Some("1"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn cookie_value_trims_whitespace() {
        let headers = headers_with_cookie("cw_site= secret-value ");
        assert_eq!(cookie_value(&headers, SITE_COOKIE), Some("secret-value"));
    }

    #[test]
    fn maybe_session_user_ignores_empty_cookie() {
        let headers = headers_with_cookie("cw_session=");
        assert_eq!(maybe_session_user(&headers), None);
    }

    #[test]
    fn site_gate_disabled_without_secret_in_dev() {
        let gate = SiteGate::new(None, true).expect("dev should allow missing secret");
        assert!(!gate.enabled);
    }

    #[test]
    fn site_gate_required_outside_dev() {
        assert!(SiteGate::new(None, false).is_err());
    }

    #[test]
    fn site_gate_compares_exact_secret() {
        let gate = SiteGate::new(Some("s3cret".to_owned()), false).expect("gate");
        assert!(gate.enabled);
        assert!(gate.allows("s3cret"));
        assert!(!gate.allows("s3cret2"));
        assert!(!gate.allows(""));
    }
}

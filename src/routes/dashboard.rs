//! `/dashboard` routes and their guard

use async_trait::async_trait;
use axum::{http::header, response::Html};
use route_guards::BoxError;
use route_guards::guard::Guard;
use route_guards::http::Parts;
use route_guards::route_guard;

/// Cookie that marks a signed-in browser session
const SESSION_COOKIE: &str = "session=";

/// Sends visitors without a session back to the start page
#[route_guard(path = "routes/dashboard/-guard.rs", redirect = "/")]
pub struct DashboardGuard;

#[async_trait]
impl Guard<Parts> for DashboardGuard {
    async fn check(&self, parts: &Parts) -> Result<bool, BoxError> {
        let has_session = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .any(|cookie| {
                cookie
                    .trim()
                    .strip_prefix(SESSION_COOKIE)
                    .is_some_and(|value| !value.is_empty())
            });
        Ok(has_session)
    }
}

pub async fn overview() -> Html<&'static str> {
    Html("<h1>Dashboard</h1>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/dashboard");
        if let Some(value) = cookie {
            builder = builder.header(header::COOKIE, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_dashboard_guard_requires_session_cookie() {
        let guard = DashboardGuard;
        assert!(guard.check(&parts(Some("theme=dark; session=abc"))).await.unwrap());
        assert!(!guard.check(&parts(Some("session="))).await.unwrap());
        assert!(!guard.check(&parts(Some("theme=dark"))).await.unwrap());
        assert!(!guard.check(&parts(None)).await.unwrap());
    }
}

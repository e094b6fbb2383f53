//! axum integration
//!
//! Runs a [`GuardHook`] as route middleware. Guards receive the request
//! [`Parts`]; the route id is the router's [`MatchedPath`], so the layer is
//! installed with `route_layer` (see [`with_guards`]). Requests that match no
//! route reach the fallback, which runs behind the same middleware and is
//! evaluated as `/`.
//!
//! | Outcome    | Response                         |
//! |------------|----------------------------------|
//! | `Continue` | downstream response, unchanged   |
//! | `Denied`   | `403 Forbidden`                  |
//! | `Redirect` | `307 Temporary Redirect`         |
//! | error      | `500 Internal Server Error`      |

pub mod registry;

pub use axum::http::request::Parts;
pub use registry::GuardRegistration;

use crate::guard::{EvaluatedGuards, GuardHook, GuardRequest, Outcome};
use axum::{
    Router,
    extract::{MatchedPath, Request, State},
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use std::sync::Arc;
use tower::{Service, ServiceBuilder};
use tracing::error;

/// Guard hook over axum request parts
pub type HttpGuardHook = GuardHook<Parts>;

/// Guard table attached to requests that passed their guards
///
/// Available to handlers as `Extension<HttpGuards>`.
pub type HttpGuards = EvaluatedGuards<Parts>;

impl GuardRequest for Parts {
    fn route_id(&self) -> Option<&str> {
        self.extensions.get::<MatchedPath>().map(MatchedPath::as_str)
    }

    fn record_guards(&mut self, guards: EvaluatedGuards<Self>) {
        self.extensions.insert(guards);
    }
}

/// Middleware running the guards of a hook
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn guard_middleware(
    State(hook): State<Arc<HttpGuardHook>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let result = hook
        .handle(parts, |parts| next.run(Request::from_parts(parts, body)))
        .await;

    match result {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => {
            error!(error = %e, "Guard evaluation failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Turn a hook outcome into an HTTP response
pub fn outcome_response(outcome: Outcome<Response>) -> Response {
    match outcome {
        Outcome::Continue(response) => response,
        Outcome::Denied { .. } => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
        Outcome::Redirect { target, .. } => Redirect::temporary(&target).into_response(),
    }
}

/// Guard every route of a router
///
/// Unmatched requests get a guarded `404 Not Found`. Routes and fallbacks
/// added after this call are not guarded; use [`with_guards_and_fallback`]
/// for a custom fallback.
pub fn with_guards<S>(router: Router<S>, hook: Arc<HttpGuardHook>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    with_guards_and_fallback(router, hook, not_found.into_service())
}

/// Guard every route of a router and serve `fallback` for unmatched requests
///
/// The fallback has no matched route, so only guards matching `/` apply.
pub fn with_guards_and_fallback<S, T>(
    router: Router<S>,
    hook: Arc<HttpGuardHook>,
    fallback: T,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    T: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
    T::Response: IntoResponse,
    T::Future: Send + 'static,
{
    let fallback = ServiceBuilder::new()
        .layer(middleware::from_fn_with_state(hook.clone(), guard_middleware))
        .service(fallback);

    router
        .route_layer(middleware::from_fn_with_state(hook, guard_middleware))
        .fallback_service(fallback)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

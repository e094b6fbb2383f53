//! Demo application routes
//!
//! ```text
//! /                     public
//! /api/...              bearer token required (403 otherwise)
//! /dashboard/...        session cookie required (307 to / otherwise)
//! ```

mod api;
mod dashboard;

use axum::{Extension, Json, Router, response::Html, routing::get};
use route_guards::config::GuardsConfig;
use route_guards::guard::{Always, GuardFileSet, GuardHook, GuardModule, RouteId};
use route_guards::http::{HttpGuardHook, HttpGuards, Parts, with_guards};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

use api::BearerGuard;

/// Guard file of the API routes; registered here because it needs the token
const API_GUARD_PATH: &str = "routes/api/-guard.rs";

/// Build the guard hook from registered guards plus the configured API guard
pub fn guard_hook(config: &GuardsConfig) -> HttpGuardHook {
    let mut files = GuardFileSet::<Parts>::from_registry();

    match config.api_token.clone() {
        Some(token) => files.insert_module(API_GUARD_PATH, move || {
            GuardModule::new(BearerGuard::new(&token))
        }),
        None => {
            warn!("No guards.api_token configured, /api routes are closed");
            files.insert_module(API_GUARD_PATH, || GuardModule::new(Always(false)));
        }
    }

    GuardHook::new(files).with_strategy(config.matching)
}

/// Build the application router
pub fn router(hook: Arc<HttpGuardHook>) -> Router {
    let routes = Router::new()
        .route("/", get(index))
        .route("/api/users", get(api::list_users))
        .route("/dashboard", get(dashboard::overview))
        .route("/dashboard/settings", get(guards_info));

    with_guards(routes, hook)
}

async fn index() -> Html<&'static str> {
    Html("<h1>route-guards demo</h1><p>Try /api/users and /dashboard.</p>")
}

/// Route ids of all guards known to the request
pub(crate) fn guard_ids(guards: &HttpGuards) -> Value {
    let ids: Vec<&RouteId> = guards.route_ids().collect();
    json!(ids)
}

async fn guards_info(Extension(guards): Extension<HttpGuards>) -> Json<Value> {
    Json(json!({ "guards": guard_ids(&guards) }))
}

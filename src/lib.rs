//! Route guards
//!
//! Route-level access control for axum: guards live next to the routes they
//! protect, are loaded once, and run before the route handler.
//!
//! ## Features
//!
//! - **Co-located guards** - a guard for `/dashboard` is registered as `routes/dashboard/-guard.rs`
//! - **Prefix matching** - a guard covers its route and every route below it
//! - **Ordered evaluation** - matching guards run root first and stop at the first failure
//! - **Deny or redirect** - a failing guard forbids the request or redirects it (307)
//! - **Load once** - the guard table is built on the first request and shared afterwards
//!
//! ## Example
//!
//! ```ignore
//! use route_guards::guard::{Guard, GuardFileSet, GuardHook};
//! use route_guards::http::{Parts, with_guards};
//! use route_guards::route_guard;
//!
//! #[route_guard(path = "routes/dashboard/-guard.rs", redirect = "/")]
//! struct DashboardGuard;
//!
//! #[async_trait::async_trait]
//! impl Guard<Parts> for DashboardGuard {
//!     async fn check(&self, parts: &Parts) -> Result<bool, route_guards::BoxError> {
//!         Ok(parts.headers.contains_key("x-session"))
//!     }
//! }
//!
//! let hook = Arc::new(GuardHook::new(GuardFileSet::from_registry()));
//! let app = with_guards(Router::new().route("/dashboard", get(dashboard)), hook);
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod http;

// Re-exports used by the `#[route_guard]` macro
pub use inventory;
pub use route_guards_macros::route_guard;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{AppError, BoxError, GuardError, LoadError, Result};
pub use guard::{Decision, Guard, GuardFileSet, GuardHook, GuardModule, Outcome};
pub use http::{HttpGuardHook, HttpGuards, guard_middleware, with_guards, with_guards_and_fallback};

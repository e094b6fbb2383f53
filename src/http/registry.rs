//! Compile-time guard registry
//!
//! Guard modules register themselves with `inventory`, either through the
//! [`route_guard`](crate::route_guard) attribute or by hand:
//!
//! ```ignore
//! fn admin_guard() -> GuardModule<Parts> {
//!     GuardModule::new(guard_fn(|parts: &Parts| parts.headers.contains_key("x-admin")))
//! }
//!
//! inventory::submit! {
//!     GuardRegistration::new("routes/admin/-guard.rs", admin_guard)
//! }
//! ```
//!
//! [`GuardFileSet::from_registry`] collects every registration into a file
//! set, the way a module glob would.

use crate::guard::{GuardFileSet, GuardModule};
use axum::http::request::Parts;
use tracing::debug;

/// Compile-time guard registration entry
///
/// Submitted via `inventory::submit!`, usually by the `#[route_guard]` macro.
pub struct GuardRegistration {
    /// Logical path of the guard file, e.g. `routes/admin/-guard.rs`
    pub path: &'static str,
    /// Builds the guard module
    pub module: fn() -> GuardModule<Parts>,
}

impl GuardRegistration {
    pub const fn new(path: &'static str, module: fn() -> GuardModule<Parts>) -> Self {
        Self { path, module }
    }
}

inventory::collect!(GuardRegistration);

/// Iterate over all registered guard files
pub fn registrations() -> impl Iterator<Item = &'static GuardRegistration> {
    inventory::iter::<GuardRegistration>.into_iter()
}

impl GuardFileSet<Parts> {
    /// Build a file set from every registered guard file
    pub fn from_registry() -> Self {
        let mut files = Self::new();
        for registration in registrations() {
            debug!(path = registration.path, "Discovered guard file");
            files.insert_module(registration.path, registration.module);
        }
        files
    }
}

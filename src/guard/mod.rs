//! Route guards
//!
//! Guards are predicates attached to a route prefix. A guard file lives in
//! the directory of the route it protects:
//!
//! ```text
//! routes/-guard.rs            → guards every route
//! routes/dashboard/-guard.rs  → guards /dashboard and everything below it
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! GuardFileSet ──load once──▶ GuardTable ──match route──▶ guards ──run in order──▶ Outcome
//! ```
//!
//! 1. **Load** - every file loader runs once; modules without a guard are skipped
//! 2. **Match** - guards whose route id is a prefix of the request route apply
//! 3. **Run** - matched guards run root first; the first failing guard ends the request
//! 4. **Decide** - all passed: continue; failed with a redirect target: redirect; otherwise deny
//!
//! Redirect targets are inherited: a failing guard without a target uses the
//! target of the closest guard evaluated before it.

pub mod hook;
pub mod loader;
pub mod matcher;
pub mod route_id;
pub mod table;
pub mod types;

pub use hook::{EvaluatedGuards, GuardHook, GuardRequest, ROOT_ROUTE};
pub use loader::{GuardFileSet, LoadFuture, load_guards};
pub use matcher::{MatchStrategy, matching_guards, route_matches};
pub use route_id::route_id_from_path;
pub use table::GuardTable;
pub use types::{
    Always, Decision, FnGuard, Guard, GuardEntry, GuardModule, Outcome, RouteId, SharedGuard,
    guard_fn,
};

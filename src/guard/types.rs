//! Guard types
//!
//! Core types used by the guard pipeline.

use crate::error::BoxError;
// async_trait required for dyn-compatibility with Arc<dyn Guard<R>>
use async_trait::async_trait;
use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Canonical route identifier of a guard
///
/// Always starts with `/`. The root guard has the id `/` and applies to
/// every route.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// The root route id (`/`)
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Build a route id from a route segment such as `api/users`
    ///
    /// An empty segment yields the root id.
    pub fn from_segment(segment: &str) -> Self {
        Self(format!("/{}", segment))
    }

    /// Get the route id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the root guard id
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for RouteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RouteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A route guard
///
/// Returns `Ok(true)` to let the request through and `Ok(false)` to deny it.
/// An `Err` is not a denial: it aborts the request as a failure.
#[async_trait]
pub trait Guard<R>: Send + Sync {
    async fn check(&self, request: &R) -> Result<bool, BoxError>;
}

/// Guard backed by a synchronous closure
pub struct FnGuard<F>(F);

#[async_trait]
impl<R, F> Guard<R> for FnGuard<F>
where
    R: Sync,
    F: Fn(&R) -> bool + Send + Sync,
{
    async fn check(&self, request: &R) -> Result<bool, BoxError> {
        Ok((self.0)(request))
    }
}

/// Wrap a synchronous predicate as a [`Guard`]
///
/// # Example
/// ```ignore
/// let module = GuardModule::new(guard_fn(|parts: &Parts| parts.headers.contains_key("x-admin")));
/// ```
pub fn guard_fn<F>(predicate: F) -> FnGuard<F> {
    FnGuard(predicate)
}

/// Guard that always returns the same answer
#[derive(Debug, Clone, Copy)]
pub struct Always(pub bool);

#[async_trait]
impl<R: Sync> Guard<R> for Always {
    async fn check(&self, _request: &R) -> Result<bool, BoxError> {
        Ok(self.0)
    }
}

/// Shared guard handle
pub type SharedGuard<R> = Arc<dyn Guard<R>>;

/// What a guard file exports
///
/// A module without `check` is not a guard and is skipped at load time.
/// The redirect target is optional.
pub struct GuardModule<R> {
    pub(crate) check: Option<SharedGuard<R>>,
    pub(crate) redirect_target: Option<String>,
}

impl<R> GuardModule<R> {
    /// Module exporting a guard
    pub fn new(guard: impl Guard<R> + 'static) -> Self {
        Self::from_shared(Arc::new(guard))
    }

    /// Module exporting an already shared guard
    pub fn from_shared(guard: SharedGuard<R>) -> Self {
        Self {
            check: Some(guard),
            redirect_target: None,
        }
    }

    /// Module that lives next to guards but exports no guard
    pub fn empty() -> Self {
        Self {
            check: None,
            redirect_target: None,
        }
    }

    /// Redirect denied requests to `target` instead of forbidding them
    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect_target = Some(target.into());
        self
    }

    /// Whether the module exports a guard
    pub fn is_guard(&self) -> bool {
        self.check.is_some()
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_target.as_deref()
    }
}

impl<R> fmt::Debug for GuardModule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardModule")
            .field("check", &self.check.is_some())
            .field("redirect_target", &self.redirect_target)
            .finish()
    }
}

/// A loaded guard, keyed by its route id in the guard table
pub struct GuardEntry<R> {
    route_id: RouteId,
    check: SharedGuard<R>,
    redirect_target: Option<String>,
}

impl<R> GuardEntry<R> {
    pub fn new(route_id: RouteId, check: SharedGuard<R>, redirect_target: Option<String>) -> Self {
        Self {
            route_id,
            check,
            redirect_target,
        }
    }

    /// Validate a loaded module; `None` when it exports no guard
    pub(crate) fn from_module(route_id: RouteId, module: GuardModule<R>) -> Option<Self> {
        let check = module.check?;
        Some(Self::new(route_id, check, module.redirect_target))
    }

    pub fn route_id(&self) -> &RouteId {
        &self.route_id
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_target.as_deref()
    }

    /// Run the guard predicate against a request
    pub async fn check(&self, request: &R) -> Result<bool, BoxError> {
        self.check.check(request).await
    }
}

impl<R> fmt::Debug for GuardEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardEntry")
            .field("route_id", &self.route_id)
            .field("redirect_target", &self.redirect_target)
            .finish_non_exhaustive()
    }
}

/// Result of evaluating the guards for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Every matched guard passed
    Allow,
    /// A guard failed and no redirect target applies
    Deny { route_id: RouteId },
    /// A guard failed and a redirect target applies
    Redirect { route_id: RouteId, target: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Deny { .. })
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Decision::Redirect { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Result of intercepting a request
///
/// `Continue` carries the downstream handler's result unchanged. The other
/// variants are terminal; the downstream handler did not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Continue(T),
    Denied { route_id: RouteId },
    Redirect { route_id: RouteId, target: String },
}

impl<T> Outcome<T> {
    /// Get the downstream result if the request was let through
    pub fn into_continue(self) -> Option<T> {
        match self {
            Outcome::Continue(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Outcome::Denied { .. })
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Outcome::Redirect { target, .. } => Some(target),
            _ => None,
        }
    }
}

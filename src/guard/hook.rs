//! Request interception
//!
//! [`GuardHook`] owns the guard files and the guard table built from them.
//! The table is loaded on the first request and shared by every request
//! after it. Each request runs the guards matching its route, least specific
//! first, and stops at the first guard that fails.

use crate::error::{GuardError, GuardResult, LoadError};
use crate::guard::loader::{GuardFileSet, load_guards};
use crate::guard::matcher::{MatchStrategy, matching_guards};
use crate::guard::table::GuardTable;
use crate::guard::types::{Decision, Outcome};
use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{Span, debug, field, info, instrument, trace, warn};

/// Route id used when the host does not provide one
pub const ROOT_ROUTE: &str = "/";

/// A request the hook can intercept
pub trait GuardRequest: Send + Sync + Sized + 'static {
    /// Route id matched by the host router, if any
    fn route_id(&self) -> Option<&str>;

    /// Store the guard table in request-scoped state once the guards passed
    fn record_guards(&mut self, guards: EvaluatedGuards<Self>);
}

/// The guard table, as attached to a request that passed its guards
pub struct EvaluatedGuards<R>(Arc<GuardTable<R>>);

impl<R> EvaluatedGuards<R> {
    pub fn new(table: Arc<GuardTable<R>>) -> Self {
        Self(table)
    }

    pub fn table(&self) -> &Arc<GuardTable<R>> {
        &self.0
    }
}

impl<R> Clone for EvaluatedGuards<R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<R> Deref for EvaluatedGuards<R> {
    type Target = GuardTable<R>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<R> fmt::Debug for EvaluatedGuards<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EvaluatedGuards").field(&self.0).finish()
    }
}

/// Guard hook
///
/// Each hook has its own table cache. Concurrent requests that arrive before
/// the table exists wait for a single load. A failed load leaves the hook
/// unloaded, and the next request tries again.
pub struct GuardHook<R> {
    files: GuardFileSet<R>,
    table: OnceCell<Arc<GuardTable<R>>>,
    strategy: MatchStrategy,
}

impl<R: GuardRequest> GuardHook<R> {
    /// Create a hook for a set of guard files
    pub fn new(files: GuardFileSet<R>) -> Self {
        Self {
            files,
            table: OnceCell::new(),
            strategy: MatchStrategy::default(),
        }
    }

    /// Use a different route matching strategy
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Whether the guard table has been loaded
    pub fn is_loaded(&self) -> bool {
        self.table.initialized()
    }

    /// Get the guard table, loading it on first use
    pub async fn table(&self) -> Result<Arc<GuardTable<R>>, LoadError> {
        let table = self
            .table
            .get_or_try_init(|| async {
                let table = load_guards(&self.files).await?;
                info!(
                    guards = table.len(),
                    strategy = %self.strategy,
                    "Guard table loaded"
                );
                Ok::<_, LoadError>(Arc::new(table))
            })
            .await?;
        Ok(Arc::clone(table))
    }

    /// Load the guard table ahead of the first request
    ///
    /// Returns the number of guards.
    pub async fn preload(&self) -> Result<usize, LoadError> {
        Ok(self.table().await?.len())
    }

    /// Evaluate the guards for a request without running anything downstream
    pub async fn evaluate(&self, request: &R) -> GuardResult<Decision> {
        let table = self.table().await?;
        self.run_guards(&table, request).await
    }

    /// Intercept a request
    ///
    /// When every matching guard passes, the guard table is recorded on the
    /// request and `next` runs with it; its result is returned unchanged.
    /// Otherwise `next` never runs.
    pub async fn handle<F, Fut, T>(&self, mut request: R, next: F) -> GuardResult<Outcome<T>>
    where
        F: FnOnce(R) -> Fut,
        Fut: Future<Output = T>,
    {
        let table = self.table().await?;

        match self.run_guards(&table, &request).await? {
            Decision::Allow => {
                request.record_guards(EvaluatedGuards::new(table));
                Ok(Outcome::Continue(next(request).await))
            }
            Decision::Deny { route_id } => Ok(Outcome::Denied { route_id }),
            Decision::Redirect { route_id, target } => Ok(Outcome::Redirect { route_id, target }),
        }
    }

    /// Run matching guards in order
    ///
    /// A failing guard redirects to its own target, or else to the target of
    /// the closest guard before it that has one, or else denies.
    #[instrument(skip_all, fields(route = field::Empty))]
    async fn run_guards(&self, table: &GuardTable<R>, request: &R) -> GuardResult<Decision> {
        let route = request.route_id().unwrap_or(ROOT_ROUTE);
        Span::current().record("route", route);

        let mut redirect: Option<&str> = None;
        let mut passed_guards = 0usize;

        for entry in matching_guards(table, route, self.strategy) {
            if let Some(target) = entry.redirect_target() {
                redirect = Some(target);
            }

            trace!(guard = %entry.route_id(), "Running guard");
            let passed = entry
                .check(request)
                .await
                .map_err(|e| GuardError::predicate(entry.route_id().as_str(), e))?;
            if passed {
                passed_guards += 1;
                continue;
            }

            let route_id = entry.route_id().clone();
            return Ok(match redirect {
                Some(target) => {
                    warn!(guard = %route_id, target, "Guard failed, redirecting");
                    Decision::Redirect {
                        route_id,
                        target: target.to_string(),
                    }
                }
                None => {
                    warn!(guard = %route_id, "Guard failed, access denied");
                    Decision::Deny { route_id }
                }
            });
        }

        debug!(guards = passed_guards, "Guards passed");
        Ok(Decision::Allow)
    }
}

impl<R> fmt::Debug for GuardHook<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardHook")
            .field("files", &self.files)
            .field("loaded", &self.table.initialized())
            .field("strategy", &self.strategy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::guard::types::{Always, GuardModule, guard_fn};

    #[derive(Default)]
    struct Req {
        route: Option<String>,
        admin: bool,
        guards: Option<EvaluatedGuards<Req>>,
    }

    impl Req {
        fn to(route: &str) -> Self {
            Self {
                route: Some(route.to_string()),
                ..Default::default()
            }
        }
    }

    impl GuardRequest for Req {
        fn route_id(&self) -> Option<&str> {
            self.route.as_deref()
        }

        fn record_guards(&mut self, guards: EvaluatedGuards<Self>) {
            self.guards = Some(guards);
        }
    }

    #[tokio::test]
    async fn test_allow_records_guards_and_runs_next() {
        let hook = GuardHook::new(
            GuardFileSet::new().with_module("routes/foo/-guard.rs", || GuardModule::new(Always(true))),
        );

        let outcome = hook
            .handle(Req::to("/foo/bar"), |req: Req| async move {
                assert!(req.guards.as_ref().unwrap().contains("/foo"));
                "ok"
            })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Continue("ok"));
    }

    #[tokio::test]
    async fn test_missing_route_defaults_to_root() {
        let hook = GuardHook::new(
            GuardFileSet::new()
                .with_module("routes/-guard.rs", || {
                    GuardModule::new(guard_fn(|req: &Req| req.admin))
                })
                .with_module("routes/foo/-guard.rs", || GuardModule::new(Always(false))),
        );

        let decision = hook.evaluate(&Req::default()).await.unwrap();
        assert!(decision.is_denied());

        let admin = Req {
            admin: true,
            ..Default::default()
        };
        assert!(hook.evaluate(&admin).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_redirect_falls_back_to_earlier_guard() {
        let hook = GuardHook::new(
            GuardFileSet::new()
                .with_module("routes/app/-guard.rs", || {
                    GuardModule::new(Always(true)).with_redirect("/login")
                })
                .with_module("routes/app/admin/-guard.rs", || GuardModule::new(Always(false))),
        );

        let decision = hook.evaluate(&Req::to("/app/admin/users")).await.unwrap();
        assert_eq!(decision.redirect_target(), Some("/login"));
    }

    #[tokio::test]
    async fn test_predicate_error_is_not_a_denial() {
        struct Failing;

        #[async_trait::async_trait]
        impl crate::guard::types::Guard<Req> for Failing {
            async fn check(&self, _request: &Req) -> Result<bool, BoxError> {
                Err("session store unavailable".into())
            }
        }

        let hook = GuardHook::new(
            GuardFileSet::new().with_module("routes/api/-guard.rs", || GuardModule::new(Failing)),
        );

        let err = hook.evaluate(&Req::to("/api")).await.unwrap_err();
        assert!(matches!(err, GuardError::Predicate { ref route_id, .. } if route_id == "/api"));
    }

    #[tokio::test]
    async fn test_preload_marks_hook_loaded() {
        let hook: GuardHook<Req> = GuardHook::new(
            GuardFileSet::new().with_module("routes/a/-guard.rs", || GuardModule::new(Always(true))),
        );
        assert!(!hook.is_loaded());
        assert_eq!(hook.preload().await.unwrap(), 1);
        assert!(hook.is_loaded());
    }
}

//! Guard matching
//!
//! Selects the guards that apply to a request route. A guard applies when its
//! route id is a prefix of the request route. The match is a plain string
//! prefix by default, so `/ab` also guards `/abc`; [`MatchStrategy::Segment`]
//! restricts it to whole path segments.

use crate::guard::table::GuardTable;
use crate::guard::types::{GuardEntry, RouteId};
use serde::Deserialize;
use std::fmt;

/// How a guard route id is compared with a request route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Literal string prefix
    #[default]
    Prefix,
    /// Prefix ending on a `/` boundary (or the whole route)
    Segment,
}

impl MatchStrategy {
    /// Check if a guard at `guard_route` applies to `route`
    pub fn matches(&self, guard_route: &str, route: &str) -> bool {
        match self {
            MatchStrategy::Prefix => route_matches(guard_route, route),
            MatchStrategy::Segment => segment_matches(guard_route, route),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Prefix => "prefix",
            MatchStrategy::Segment => "segment",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Literal prefix match between a guard route id and a request route
pub fn route_matches(guard_route: &str, route: &str) -> bool {
    route.starts_with(guard_route)
}

fn segment_matches(guard_route: &str, route: &str) -> bool {
    if guard_route.ends_with('/') {
        return route.starts_with(guard_route);
    }
    match route.strip_prefix(guard_route) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Guards that apply to `route`, least specific first
///
/// The iterator is lazy and borrows the table; calling this again yields the
/// same sequence.
pub fn matching_guards<'a, R>(
    table: &'a GuardTable<R>,
    route: &'a str,
    strategy: MatchStrategy,
) -> impl Iterator<Item = &'a GuardEntry<R>> + 'a {
    table
        .entries()
        .filter(move |entry| strategy.matches(entry.route_id().as_str(), route))
}

/// Route ids of the guards that apply to `route`
pub fn matching_route_ids<'a, R>(
    table: &'a GuardTable<R>,
    route: &'a str,
    strategy: MatchStrategy,
) -> Vec<&'a RouteId> {
    matching_guards(table, route, strategy)
        .map(GuardEntry::route_id)
        .collect()
}

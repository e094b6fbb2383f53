//! Route id extraction
//!
//! Guard files live in the directory of the route they protect, inside a
//! `routes` tree, and are named `-guard.<ext>`:
//!
//! ```text
//! src/routes/-guard.rs             → /
//! src/routes/api/-guard.rs         → /api
//! src/routes/api/users/-guard.rs   → /api/users
//! ```

use crate::guard::types::RouteId;
use regex::Regex;
use std::sync::LazyLock;

/// Greedy prefix so the last `routes/` boundary wins. The file name must be
/// `-guard.<ext>`, so `-guardrail/` directories and `-guardian.rs` files do
/// not yield a route.
static GUARD_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*routes/(.+?)/-guard\.[^/]+$").expect("guard path pattern is valid")
});

/// Extract the route segment from a guard file path
///
/// Returns `None` when the path does not have the expected shape, which
/// includes the root guard file `routes/-guard.<ext>`.
pub fn route_segment(path: &str) -> Option<&str> {
    GUARD_PATH
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Derive the canonical route id of a guard file
///
/// Paths that do not match the guard file convention map to the root id.
pub fn route_id_from_path(path: &str) -> RouteId {
    RouteId::from_segment(route_segment(path).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("routes/foo/-guard.ts", "/foo")]
    #[case("./routes/foo/-guard.rs", "/foo")]
    #[case("src/routes/api/users/-guard.rs", "/api/users")]
    #[case("routes/dashboard/settings/-guard.rs", "/dashboard/settings")]
    #[case("routes/a/routes/b/-guard.rs", "/b")]
    #[case("myroutes/x/-guard.rs", "/x")]
    fn test_route_id_from_guard_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(route_id_from_path(path).as_str(), expected);
    }

    #[rstest]
    #[case("routes/-guard.ts")]
    #[case("./src/routes/-guard.rs")]
    #[case("routes/skip/file.rs")]
    #[case("lib/helpers.rs")]
    #[case("")]
    #[case("-guard.rs")]
    #[case("routes/x/-guardrail/helpers.rs")]
    #[case("routes/x/-guardian.rs")]
    #[case("routes/x/-guard")]
    fn test_malformed_paths_map_to_root(#[case] path: &str) {
        assert!(route_id_from_path(path).is_root());
    }

    #[test]
    fn test_route_segment() {
        assert_eq!(route_segment("routes/api/-guard.rs"), Some("api"));
        assert_eq!(route_segment("routes/-guard.rs"), None);
        assert_eq!(route_segment("routes/api/-guard.test.rs"), Some("api"));
        assert_eq!(route_segment("routes/api/-guardian.rs"), None);
    }
}

//! Guard table loading tests

use route_guards::BoxError;
use route_guards::guard::{
    Always, GuardFileSet, GuardModule, GuardTable, RouteId, load_guards, route_id_from_path,
};
use rstest::rstest;

type Req = ();

fn guard(result: bool) -> GuardModule<Req> {
    GuardModule::new(Always(result))
}

fn keys(table: &GuardTable<Req>) -> Vec<String> {
    table.route_ids().map(|id| id.to_string()).collect()
}

#[rstest]
#[case("routes/-guard.ts", "/")]
#[case("routes/foo/-guard.ts", "/foo")]
#[case("routes/api/users/-guard.rs", "/api/users")]
#[case("src/routes/admin/-guard.rs", "/admin")]
#[case("routes/nested/routes/inner/-guard.rs", "/inner")]
#[case("guards/foo.rs", "/")]
fn test_route_id_from_path(#[case] path: &str, #[case] expected: &str) {
    assert_eq!(route_id_from_path(path).as_str(), expected);
}

#[tokio::test]
async fn test_table_has_one_entry_per_guard_module() {
    let files = GuardFileSet::new()
        .with_module("routes/-guard.rs", || guard(true))
        .with_module("routes/a/-guard.rs", || guard(true))
        .with_module("routes/a/b/-guard.rs", || guard(false))
        .with_module("routes/a/helpers.rs", GuardModule::empty)
        .with_loader("routes/c/-guard.rs", || async { Ok::<_, BoxError>(None) });

    let table = load_guards(&files).await.unwrap();

    assert_eq!(files.len(), 5);
    assert_eq!(table.len(), 3);
    assert_eq!(keys(&table), vec!["/", "/a", "/a/b"]);
    assert!(!table.contains("/c"));
}

#[tokio::test]
async fn test_loading_twice_yields_same_keys() {
    let files = GuardFileSet::new()
        .with_module("routes/x/-guard.rs", || guard(true))
        .with_module("routes/x/y/-guard.rs", || guard(true).with_redirect("/x"));

    let first = load_guards(&files).await.unwrap();
    let second = load_guards(&files).await.unwrap();

    assert_eq!(keys(&first), keys(&second));
    assert_eq!(
        second.get("/x/y").and_then(|e| e.redirect_target()),
        Some("/x")
    );
}

#[tokio::test]
async fn test_redirect_target_is_kept() {
    let files = GuardFileSet::new()
        .with_module("routes/dashboard/-guard.rs", || guard(false).with_redirect("/"));

    let table = load_guards(&files).await.unwrap();
    let entry = table.get("/dashboard").unwrap();

    assert_eq!(entry.route_id(), &RouteId::from_segment("dashboard"));
    assert_eq!(entry.redirect_target(), Some("/"));
}

#[tokio::test]
async fn test_lookalike_file_does_not_replace_guard() {
    let files = GuardFileSet::new()
        .with_module("routes/x/-guard.rs", || guard(false).with_redirect("/login"))
        .with_module("routes/x/-guardrail/helpers.rs", || guard(true))
        .with_module("routes/x/-guardian.rs", || guard(true));

    let table = load_guards(&files).await.unwrap();

    let entry = table.get("/x").unwrap();
    assert_eq!(entry.redirect_target(), Some("/login"));
    assert!(!entry.check(&()).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_route_id_later_path_wins() {
    // Both paths map to /admin; the file set iterates paths in order
    let files = GuardFileSet::new()
        .with_module("app/routes/admin/-guard.rs", || guard(true).with_redirect("/a"))
        .with_module("routes/admin/-guard.rs", || guard(true).with_redirect("/b"));

    let table = load_guards(&files).await.unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.get("/admin").unwrap().redirect_target(), Some("/b"));
}

#[tokio::test]
async fn test_any_loader_failure_fails_the_load() {
    let files = GuardFileSet::new()
        .with_loader("routes/ok/-guard.rs", || async { Ok::<_, BoxError>(Some(guard(true))) })
        .with_loader("routes/bad/-guard.rs", || async {
            Err::<Option<GuardModule<Req>>, BoxError>("syntax error".into())
        });

    let err = load_guards(&files).await.unwrap_err();

    assert_eq!(err.path(), "routes/bad/-guard.rs");
    assert!(err.to_string().contains("syntax error"));
}

#[tokio::test]
async fn test_empty_file_set_gives_empty_table() {
    let table = load_guards(&GuardFileSet::<Req>::new()).await.unwrap();
    assert!(table.is_empty());
}

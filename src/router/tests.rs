use super::{MethodSet, Route, RouteRequest, Router};
use crate::discovery::HandlerDefinition;
use http::Method;

fn router(entries: &[(&str, &'static str, Option<f64>)]) -> Router<&'static str> {
    let routes = entries
        .iter()
        .map(|(template, handler, priority)| {
            let mut def = HandlerDefinition::new(*handler);
            def.priority = *priority;
            Route::new(template, def).unwrap()
        })
        .collect();
    Router::from_routes(routes)
}

fn handler_for(router: &Router<&'static str>, method: Method, url: &str) -> Option<&'static str> {
    router.route(&method, url).map(|m| *m.handler())
}

#[test]
fn test_literal_beats_param_for_every_method() {
    let r = router(&[("/users/:id", "show", None), ("/users/login", "login", None)]);
    for method in [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS] {
        assert_eq!(handler_for(&r, method, "/users/login"), Some("login"));
    }
    assert_eq!(handler_for(&r, Method::GET, "/users/7"), Some("show"));
}

#[test]
fn test_single_method_route_rejects_other_methods() {
    let r = router(&[("/session.post", "create", None)]);
    assert_eq!(handler_for(&r, Method::POST, "/session"), Some("create"));
    assert_eq!(handler_for(&r, Method::GET, "/session"), None);
    assert_eq!(handler_for(&r, Method::PUT, "/session"), None);
}

#[test]
fn test_method_rejected_candidates_are_skipped() {
    let r = router(&[
        ("/items/:id.delete", "remove", None),
        ("/items/:id", "any", None),
    ]);
    assert_eq!(handler_for(&r, Method::DELETE, "/items/3"), Some("remove"));
    assert_eq!(handler_for(&r, Method::GET, "/items/3"), Some("any"));
}

#[test]
fn test_index_route_matches_directory() {
    let r = router(&[("/orders/index", "orders", None)]);
    let route = &r.routes()[0];
    assert!(route.is_index());
    assert_eq!(route.priority(), None);
    assert_eq!(route.effective_priority(), -1.0);

    let m = r.route(&Method::GET, "/orders").unwrap();
    assert!(m.params.is_empty());
    assert_eq!(*m.handler(), "orders");
    assert!(r.route(&Method::GET, "/orders/index").is_some());
}

#[test]
fn test_params_and_query_are_correlated() {
    let r = router(&[("/users/:id", "show", None)]);
    let m = r.route(&Method::GET, "/users/42?active=true").unwrap();
    assert_eq!(m.params.len(), 1);
    assert_eq!(m.param("id"), Some("42"));
    assert_eq!(m.query.len(), 1);
    assert_eq!(m.query_param("active"), Some("true"));
}

#[test]
fn test_duplicate_query_last_wins_and_all_kept() {
    let r = router(&[("/search", "search", None)]);
    let m = r.route(&Method::GET, "/search?tag=a&tag=b").unwrap();
    assert_eq!(m.query_param("tag"), Some("b"));
    assert_eq!(m.query_values("tag").collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_priority_overrides_specificity() {
    let r = router(&[
        ("/users/login", "login", Some(1.0)),
        ("/users/:id", "show", Some(2.0)),
    ]);
    assert_eq!(handler_for(&r, Method::GET, "/users/login"), Some("show"));
}

#[test]
fn test_explicit_path_overrides_default_template() {
    let def = HandlerDefinition::new("legacy").with_path("/old/:slug.get");
    let r = Router::from_routes(vec![Route::new("/ignored", def).unwrap()]);
    let route = &r.routes()[0];
    assert_eq!(route.path(), "/old/:slug");
    assert_eq!(route.methods(), &MethodSet::Only(Method::GET));
    assert!(r.route(&Method::GET, "/ignored").is_none());
    assert!(r.route(&Method::GET, "/old/x").is_some());
}

#[test]
fn test_dispatch_is_idempotent() {
    let r = router(&[
        ("/a/:x", "param", None),
        ("/a/b", "literal", None),
        ("/a/index", "index", None),
    ]);
    let first = handler_for(&r, Method::GET, "/a/b");
    for _ in 0..10 {
        assert_eq!(handler_for(&r, Method::GET, "/a/b"), first);
    }
}

#[test]
fn test_no_match_is_none() {
    let r = router(&[("/a", "a", None)]);
    assert!(r.route(&Method::GET, "/b").is_none());
    let empty: Router<&'static str> = Router::from_routes(Vec::new());
    assert!(empty.is_empty());
    assert!(empty.route(&Method::GET, "/").is_none());
}

#[test]
fn test_dispatch_http_request() {
    let r = router(&[("/users/:id.put", "update", None)]);
    let req = http::Request::builder()
        .method(Method::PUT)
        .uri("http://example.com/users/5?force=1")
        .body(())
        .unwrap();
    assert_eq!(req.request_url(), "/users/5?force=1");

    let m = r.dispatch(&req).unwrap();
    assert_eq!(*m.handler(), "update");
    assert_eq!(m.param("id"), Some("5"));
    assert_eq!(m.query_param("force"), Some("1"));

    assert!(r.dispatch(&(Method::GET, "/users/5")).is_none());
}

#[test]
fn test_path_templates_follow_evaluation_order() {
    let r = router(&[
        ("/users/index", "index", None),
        ("/users/:id", "show", None),
        ("/users/login.post", "login", None),
    ]);
    assert_eq!(
        r.path_templates(),
        vec!["POST /users/login", "ANY /users/:id", "ANY /users/index"]
    );
}

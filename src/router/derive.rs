//! Path derivation: file location to URL template, template to method set.

use http::Method;
use std::path::{Component, Path};

use super::core::MethodSet;

/// Method tokens recognised anywhere in a template, in alternation order.
const METHOD_TOKENS: [&str; 5] = [".get", ".post", ".put", ".delete", ".patch"];

/// Derive the default URL template for a handler unit from its location.
///
/// The path is taken relative to `root`, its final extension is stripped and
/// every separator becomes `/`. A unit at `<root>/users/:id.get.yaml` yields
/// `/users/:id.get`; method extraction happens later in [`extract_method`].
///
/// A `candidate` outside `root` is used as-is.
#[must_use]
pub fn derive_template(root: &Path, candidate: &Path) -> String {
    let relative = candidate.strip_prefix(root).unwrap_or(candidate);
    let relative = relative.with_extension("");

    let mut template = String::with_capacity(relative.as_os_str().len() + 1);
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            template.push('/');
            template.push_str(&segment.to_string_lossy());
        }
    }
    if template.is_empty() {
        template.push('/');
    }

    // Backslashes can survive inside a component when the tree was produced on Windows.
    if template.contains('\\') {
        template = template.replace('\\', "/");
    }
    template
}

/// Split the method token out of a template.
///
/// The leftmost occurrence of `.get`, `.post`, `.put`, `.delete` or `.patch`
/// is removed once and its verb becomes the only accepted method. Matching is
/// case-sensitive and not anchored to a segment, so `/items.getter` also loses
/// its `.get`. Without a token the route accepts [`MethodSet::Any`].
#[must_use]
pub fn extract_method(template: &str) -> (String, MethodSet) {
    let found = METHOD_TOKENS
        .iter()
        .filter_map(|token| template.find(token).map(|pos| (pos, *token)))
        .min_by_key(|(pos, _)| *pos);

    match found {
        Some((pos, token)) => {
            let mut residual = String::with_capacity(template.len() - token.len());
            residual.push_str(&template[..pos]);
            residual.push_str(&template[pos + token.len()..]);
            (residual, MethodSet::Only(token_method(token)))
        }
        None => (template.to_string(), MethodSet::Any),
    }
}

fn token_method(token: &str) -> Method {
    match token {
        ".post" => Method::POST,
        ".put" => Method::PUT,
        ".delete" => Method::DELETE,
        ".patch" => Method::PATCH,
        _ => Method::GET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_template_from_nested_file() {
        let root = PathBuf::from("/srv/routes");
        let file = root.join("users").join(":id.get.yaml");
        assert_eq!(derive_template(&root, &file), "/users/:id.get");
    }

    #[test]
    fn test_template_strips_only_final_extension() {
        let root = PathBuf::from("routes");
        let file = root.join("orders").join("index.toml");
        assert_eq!(derive_template(&root, &file), "/orders/index");
    }

    #[test]
    fn test_template_normalizes_backslashes() {
        let root = PathBuf::from("routes");
        let file = root.join("a\\b.yaml");
        assert_eq!(derive_template(&root, &file), "/a/b");
    }

    #[test]
    fn test_extract_method_token() {
        let (residual, methods) = extract_method("/users/login.post");
        assert_eq!(residual, "/users/login");
        assert_eq!(methods, MethodSet::Only(Method::POST));
    }

    #[test]
    fn test_extract_method_leftmost_wins() {
        let (residual, methods) = extract_method("/a.delete/b.get");
        assert_eq!(residual, "/a/b.get");
        assert_eq!(methods, MethodSet::Only(Method::DELETE));
    }

    #[test]
    fn test_extract_method_is_case_sensitive() {
        let (residual, methods) = extract_method("/users.GET");
        assert_eq!(residual, "/users.GET");
        assert_eq!(methods, MethodSet::Any);
    }

    #[test]
    fn test_extract_method_lookalike_segment() {
        // Known tradeoff: a name that merely starts with a verb token is treated as one.
        let (residual, methods) = extract_method("/items.getter");
        assert_eq!(residual, "/itemster");
        assert_eq!(methods, MethodSet::Only(Method::GET));
    }
}

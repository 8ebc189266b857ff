//! # Router Module
//!
//! Turns handler definitions into an ordered route table and resolves
//! requests against it.
//!
//! ## Architecture
//!
//! Construction runs once, eagerly:
//!
//! 1. **Derivation** ([`derive`]) - the unit's location becomes a template
//!    (`/users/:id.get`), and a method token in it becomes the route's only
//!    method.
//! 2. **Compilation** ([`pattern`]) - the residual template becomes a
//!    case-insensitive regex with one capture per `:name`/`%name` marker, an
//!    optional trailing query, and index folding for `/index` templates.
//! 3. **Ordering** ([`order`]) - explicit priority first, then literal
//!    segments ahead of parameters, then discovery order.
//!
//! Dispatch ([`Router::route`]) is a linear scan over that order: the first
//! route whose pattern matches the URL and whose method set accepts the
//! method wins.
//!
//! ## Example
//!
//! ```rust
//! use fsrouter::discovery::HandlerDefinition;
//! use fsrouter::router::{Route, Router};
//! use http::Method;
//!
//! # fn main() -> anyhow::Result<()> {
//! let router = Router::from_routes(vec![
//!     Route::new("/users/:id", HandlerDefinition::new("show_user"))?,
//!     Route::new("/users/login.post", HandlerDefinition::new("login"))?,
//! ]);
//!
//! let m = router.route(&Method::GET, "/users/42?active=true").unwrap();
//! assert_eq!(*m.handler(), "show_user");
//! assert_eq!(m.param("id"), Some("42"));
//! assert_eq!(m.query_param("active"), Some("true"));
//! # Ok(())
//! # }
//! ```

mod core;
pub mod derive;
pub mod order;
pub mod pattern;
#[cfg(test)]
mod tests;

pub use self::core::{MethodSet, ParamVec, Route, RouteMatch, RouteRequest, Router, MAX_INLINE_PARAMS};
pub use pattern::{PatternMatch, RoutePattern};

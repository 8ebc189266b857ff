//! # fsrouter
//!
//! **fsrouter** resolves a request (method + URL) to a single handler using a
//! route table derived from a directory tree: the file path is the URL.
//!
//! ## Overview
//!
//! ```text
//! routes/
//! ├── index.yaml            ANY    /            (also /index)
//! ├── users/
//! │   ├── index.yaml        ANY    /users       (priority -1)
//! │   ├── login.post.yaml   POST   /users/login
//! │   └── :id.yaml          ANY    /users/:id
//! └── orders/
//!     └── %id.get.yaml      GET    /orders/:id  (`%` for filesystems without `:`)
//! ```
//!
//! - **[`discovery`]** - enumerates and loads handler units (filesystem walk,
//!   manifest files, in-memory units)
//! - **[`router`]** - path derivation, template compilation, route ordering
//!   and dispatch
//! - **[`config`]** - which units are loaded
//! - **[`logging`]** - optional `tracing` subscriber setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Hosting server
//!     participant Router
//!     participant Route as Route (in order)
//!
//!     Host->>Router: route(GET, "/users/42?active=true")
//!     loop ordered routes
//!         Router->>Route: pattern.matches(url)
//!         alt url matches and method accepted
//!             Route-->>Router: params {id: 42}, query {active: true}
//!             Router-->>Host: Some(RouteMatch)
//!         end
//!     end
//!     Router-->>Host: None (404)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use fsrouter::config::RouterConfig;
//! use fsrouter::discovery::{FsDiscovery, HandlerRegistry, ManifestLoader};
//! use fsrouter::router::Router;
//! use http::Method;
//!
//! # fn main() -> anyhow::Result<()> {
//! let registry = HandlerRegistry::new()
//!     .with("show_user", "users#show")
//!     .with("login", "sessions#create");
//! let discovery = FsDiscovery::new(ManifestLoader::new(registry));
//!
//! let router = Router::build("routes", &RouterConfig::from_env(), &discovery)?;
//!
//! if let Some(m) = router.route(&Method::GET, "/users/42?active=true") {
//!     println!("handler={} id={:?}", m.handler(), m.param("id"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Ordering
//!
//! Routes are tried in this order:
//!
//! 1. Higher `priority` first (undeclared = `0`, index routes = `-1`)
//! 2. Literal segments before parameters (`/users/login` before `/users/:id`)
//! 3. Discovery order
//!
//! ## Runtime Considerations
//!
//! Construction is synchronous and fails fast. After that the [`Router`] is
//! immutable; dispatch borrows it shared and returns an owned
//! [`RouteMatch`](router::RouteMatch), so a single router can be shared
//! across threads behind an `Arc` without locking.
//!
//! [`Router`]: router::Router

pub mod config;
pub mod discovery;
pub mod logging;
pub mod router;

pub use config::RouterConfig;
pub use discovery::{Discovery, FsDiscovery, HandlerDefinition, HandlerRegistry, ManifestLoader, StaticDiscovery};
pub use router::{MethodSet, Route, RouteMatch, RouteRequest, Router};

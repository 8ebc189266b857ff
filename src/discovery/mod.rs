//! # Discovery Module
//!
//! Locating handler units and turning each into a [`HandlerDefinition`].
//!
//! The router never touches the filesystem itself; it asks a [`Discovery`]
//! for candidates, applies the [`RouterConfig`](crate::config::RouterConfig)
//! filters, then asks the same discovery to load the survivors. Splitting the
//! two steps means filtered units are never loaded.
//!
//! Provided implementations:
//!
//! - [`FsDiscovery`] - walks a directory tree and loads files through a
//!   [`HandlerLoader`], e.g. the [`ManifestLoader`].
//! - [`StaticDiscovery`] - serves units registered in memory.

mod fs;
mod manifest;

pub use fs::{FsDiscovery, HandlerLoader};
pub use manifest::{HandlerManifest, HandlerRegistry, ManifestError, ManifestLoader};

use anyhow::anyhow;
use std::path::{Path, PathBuf};

/// What a handler unit declares.
///
/// Everything except the handler is optional: `path` overrides the template
/// derived from the unit's location and `priority` overrides the default
/// ordering weight.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDefinition<H> {
    pub path: Option<String>,
    pub priority: Option<f64>,
    /// Opaque documentation carried onto the route.
    pub comment: Option<String>,
    pub handler: H,
}

impl<H> HandlerDefinition<H> {
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            path: None,
            priority: None,
            comment: None,
            handler,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Source of handler units.
pub trait Discovery {
    type Handler;

    /// Every candidate unit under `root`, in discovery order.
    ///
    /// # Errors
    ///
    /// Fails when `root` cannot be read.
    fn candidates(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>>;

    /// Load one candidate previously returned by [`candidates`](Discovery::candidates).
    ///
    /// # Errors
    ///
    /// Fails when the unit is unreadable or malformed.
    fn load(&self, root: &Path, candidate: &Path) -> anyhow::Result<HandlerDefinition<Self::Handler>>;
}

/// In-memory discovery.
///
/// Units are registered under root-relative paths (`users/:id.get.rs`); the
/// registration order is the discovery order.
#[derive(Debug, Clone)]
pub struct StaticDiscovery<H> {
    units: Vec<(PathBuf, HandlerDefinition<H>)>,
}

impl<H> Default for StaticDiscovery<H> {
    fn default() -> Self {
        Self { units: Vec::new() }
    }
}

impl<H: Clone> StaticDiscovery<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_unit(mut self, relative: impl Into<PathBuf>, definition: HandlerDefinition<H>) -> Self {
        self.units.push((relative.into(), definition));
        self
    }

    pub fn add_unit(&mut self, relative: impl Into<PathBuf>, definition: HandlerDefinition<H>) {
        self.units.push((relative.into(), definition));
    }
}

impl<H: Clone> Discovery for StaticDiscovery<H> {
    type Handler = H;

    fn candidates(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        Ok(self.units.iter().map(|(rel, _)| root.join(rel)).collect())
    }

    fn load(&self, root: &Path, candidate: &Path) -> anyhow::Result<HandlerDefinition<H>> {
        let relative = candidate.strip_prefix(root).unwrap_or(candidate);
        self.units
            .iter()
            .find(|(rel, _)| rel == relative)
            .map(|(_, def)| def.clone())
            .ok_or_else(|| anyhow!("no handler unit registered at {}", relative.display()))
    }
}

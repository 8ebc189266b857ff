//! # Router Configuration
//!
//! Controls which discovered handler units make it into the route table.
//!
//! Three filters are applied to every candidate, in order:
//!
//! 1. `skip_hidden` - any path component starting with `.` excludes the unit
//!    (default: off, so `/.well-known/...` trees load as-is).
//! 2. `ignore` - root-relative path prefixes, matched on whole components
//!    (`drafts` excludes `drafts/a.yaml` but not `drafts-old/a.yaml`).
//! 3. `filter` - an arbitrary predicate over the candidate's full path.
//!
//! ## Configuration file
//!
//! ```yaml
//! ignore:
//!   - drafts
//!   - internal/debug
//! skip_hidden: true
//! ```
//!
//! ## Environment Variables
//!
//! - `FSROUTER_IGNORE` - comma-separated ignore prefixes
//! - `FSROUTER_SKIP_HIDDEN` - `true`/`1` to exclude dot-files

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Component, Path};
use std::sync::Arc;

type CandidateFilter = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    ignore: Vec<String>,
    #[serde(default = "default_skip_hidden")]
    skip_hidden: bool,
}

fn default_skip_hidden() -> bool {
    false
}

/// Build-time options for [`Router::build`](crate::router::Router::build).
#[derive(Clone)]
pub struct RouterConfig {
    filter: Option<CandidateFilter>,
    ignore: Vec<String>,
    skip_hidden: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            filter: None,
            ignore: Vec::new(),
            skip_hidden: default_skip_hidden(),
        }
    }
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("ignore", &self.ignore)
            .field("skip_hidden", &self.skip_hidden)
            .finish()
    }
}

impl RouterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only candidates for which `filter` returns true.
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    #[must_use]
    pub fn with_ignore(mut self, prefix: impl Into<String>) -> Self {
        self.ignore.push(prefix.into());
        self
    }

    #[must_use]
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    #[must_use]
    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }

    #[must_use]
    pub fn skip_hidden(&self) -> bool {
        self.skip_hidden
    }

    /// Parse the YAML configuration format shown in the module docs.
    ///
    /// # Errors
    ///
    /// Fails on invalid YAML or unknown keys.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile = serde_yaml::from_str(content).context("invalid router configuration")?;
        Ok(Self {
            filter: None,
            ignore: file.ignore,
            skip_hidden: file.skip_hidden,
        })
    }

    /// Load a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file is unreadable or invalid.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read router configuration {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let ignore = env::var("FSROUTER_IGNORE")
            .map(|val| {
                val.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let skip_hidden = env::var("FSROUTER_SKIP_HIDDEN")
            .map(|val| matches!(val.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or_else(|_| default_skip_hidden());

        Self {
            filter: None,
            ignore,
            skip_hidden,
        }
    }

    /// Whether `candidate` (found under `root`) should be loaded.
    #[must_use]
    pub fn accepts(&self, root: &Path, candidate: &Path) -> bool {
        let relative = candidate.strip_prefix(root).unwrap_or(candidate);
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if self.skip_hidden && segments.iter().any(|s| s.starts_with('.')) {
            return false;
        }

        let ignored = self.ignore.iter().any(|prefix| {
            let prefix: Vec<&str> = prefix.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
            !prefix.is_empty()
                && prefix.len() <= segments.len()
                && prefix.iter().zip(&segments).all(|(p, s)| *p == s.as_str())
        });
        if ignored {
            return false;
        }

        self.filter.as_ref().map_or(true, |filter| filter(candidate))
    }
}

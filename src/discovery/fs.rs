use anyhow::{bail, Context};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::{Discovery, HandlerDefinition};

/// Turns one file into a handler definition.
pub trait HandlerLoader {
    type Handler;

    /// File extensions (without the dot) this loader understands.
    fn extensions(&self) -> &[&str];

    /// # Errors
    ///
    /// Fails when the file cannot be read or does not describe a handler.
    fn load(&self, file: &Path) -> anyhow::Result<HandlerDefinition<Self::Handler>>;
}

/// Directory-tree discovery.
///
/// Within each directory, files come before the contents of sub-directories
/// and entries are visited in file-name order, so the discovery order (the
/// last ordering tie-breaker) does not depend on the platform's `readdir`.
/// Symlinks are followed.
#[derive(Debug, Clone)]
pub struct FsDiscovery<L> {
    loader: L,
}

impl<L: HandlerLoader> FsDiscovery<L> {
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.loader.extensions().contains(&ext))
    }
}

impl<L: HandlerLoader> Discovery for FsDiscovery<L> {
    type Handler = L::Handler;

    fn candidates(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        if !root.is_dir() {
            bail!("route directory {} does not exist or is not a directory", root.display());
        }

        let walker = WalkDir::new(root)
            .follow_links(true)
            .min_depth(1)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            });

        let mut candidates = Vec::new();
        for entry in walker {
            let entry = entry.with_context(|| format!("failed to read {}", root.display()))?;
            if entry.file_type().is_file() && self.is_candidate(entry.path()) {
                candidates.push(entry.into_path());
            }
        }

        debug!(
            root = %root.display(),
            candidates = candidates.len(),
            "Handler units discovered"
        );
        Ok(candidates)
    }

    fn load(&self, _root: &Path, candidate: &Path) -> anyhow::Result<HandlerDefinition<L::Handler>> {
        self.loader.load(candidate)
    }
}

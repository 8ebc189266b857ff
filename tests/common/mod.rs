#![allow(dead_code)]

pub mod route_tree {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A temporary routes directory populated with manifest files.
    pub struct RouteTree {
        dir: TempDir,
    }

    impl RouteTree {
        pub fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        /// Write `content` at a root-relative path, creating parent directories.
        pub fn write(&self, relative: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            path
        }

        /// Write a YAML manifest naming `handler`.
        pub fn handler(&self, relative: &str, handler: &str) -> PathBuf {
            self.write(relative, &format!("handler: {handler}\n"))
        }

        pub fn with(self, relative: &str, handler: &str) -> Self {
            self.handler(relative, handler);
            self
        }
    }
}

pub mod handlers {
    use fsrouter::discovery::{FsDiscovery, HandlerRegistry, ManifestLoader};

    pub const NAMES: [&str; 10] = [
        "root", "list", "show", "login", "create", "update", "remove", "orders", "search", "legacy",
    ];

    /// Registry where every name in [`NAMES`] maps to itself.
    pub fn registry() -> HandlerRegistry<&'static str> {
        NAMES
            .iter()
            .fold(HandlerRegistry::new(), |reg, name| reg.with(*name, *name))
    }

    pub fn discovery() -> FsDiscovery<ManifestLoader<&'static str>> {
        FsDiscovery::new(ManifestLoader::new(registry()))
    }
}

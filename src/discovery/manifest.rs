//! Manifest handler units.
//!
//! A manifest is a small YAML, JSON or TOML file naming the handler that
//! serves its location, plus optional overrides:
//!
//! ```yaml
//! # Shows one user.
//! handler: show_user
//! priority: 2
//! path: /people/:id
//! ```
//!
//! The handler name is resolved through a [`HandlerRegistry`]. Leading `#`
//! comment lines (YAML/TOML) become the route's comment unless the manifest
//! sets `description`.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::fs::HandlerLoader;
use super::HandlerDefinition;

const MANIFEST_EXTENSIONS: [&str; 4] = ["yaml", "yml", "json", "toml"];

/// On-disk shape of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandlerManifest {
    pub handler: Option<String>,
    pub path: Option<String>,
    pub priority: Option<f64>,
    pub description: Option<String>,
    /// Accepted for compatibility only. Methods come from the file name.
    #[serde(default)]
    pub methods: Vec<String>,
}

/// Typed manifest failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// The extension is not one of yaml, yml, json or toml.
    UnsupportedFormat { file: PathBuf },
    /// The manifest does not name a handler.
    MissingHandler { file: PathBuf },
    /// The named handler was never registered.
    UnknownHandler { file: PathBuf, name: String },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::UnsupportedFormat { file } => write!(
                f,
                "unsupported manifest format for {}: expected one of {}",
                file.display(),
                MANIFEST_EXTENSIONS.join(", ")
            ),
            ManifestError::MissingHandler { file } => {
                write!(f, "manifest {} does not name a handler", file.display())
            }
            ManifestError::UnknownHandler { file, name } => write!(
                f,
                "manifest {} names handler '{}' which is not registered",
                file.display(),
                name
            ),
        }
    }
}

impl std::error::Error for ManifestError {}

/// Handler implementations by name.
#[derive(Debug, Clone)]
pub struct HandlerRegistry<H> {
    handlers: HashMap<String, H>,
}

impl<H> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<H> HandlerRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, handler: H) {
        self.handlers.insert(name.into(), handler);
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, handler: H) -> Self {
        self.register(name, handler);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&H> {
        self.handlers.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// [`HandlerLoader`] for manifest files.
#[derive(Debug, Clone)]
pub struct ManifestLoader<H> {
    registry: HandlerRegistry<H>,
}

impl<H: Clone> ManifestLoader<H> {
    #[must_use]
    pub fn new(registry: HandlerRegistry<H>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry<H> {
        &self.registry
    }

    /// Parse manifest text; `file` selects the format and labels errors.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported extension or a document that does not fit
    /// [`HandlerManifest`].
    pub fn parse(file: &Path, content: &str) -> anyhow::Result<HandlerManifest> {
        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let manifest = match ext.as_str() {
            "yaml" | "yml" if content.trim().is_empty() => HandlerManifest::default(),
            "yaml" | "yml" => serde_yaml::from_str(content)
                .with_context(|| format!("invalid YAML manifest {}", file.display()))?,
            "json" => serde_json::from_str(content)
                .with_context(|| format!("invalid JSON manifest {}", file.display()))?,
            "toml" => toml::from_str(content)
                .with_context(|| format!("invalid TOML manifest {}", file.display()))?,
            _ => {
                return Err(ManifestError::UnsupportedFormat {
                    file: file.to_path_buf(),
                }
                .into())
            }
        };
        Ok(manifest)
    }

    fn resolve(&self, file: &Path, manifest: HandlerManifest, content: &str) -> anyhow::Result<HandlerDefinition<H>> {
        let name = manifest.handler.ok_or_else(|| ManifestError::MissingHandler {
            file: file.to_path_buf(),
        })?;
        let handler = self
            .registry
            .get(&name)
            .cloned()
            .ok_or_else(|| ManifestError::UnknownHandler {
                file: file.to_path_buf(),
                name: name.clone(),
            })?;

        if !manifest.methods.is_empty() {
            warn!(
                file = %file.display(),
                handler = %name,
                declared_methods = ?manifest.methods,
                "Manifest declares methods; they are ignored, use a .get/.post/... file name instead"
            );
        }

        let comment = manifest.description.or_else(|| leading_comment(content));
        Ok(HandlerDefinition {
            path: manifest.path,
            priority: manifest.priority,
            comment,
            handler,
        })
    }
}

impl<H: Clone> HandlerLoader for ManifestLoader<H> {
    type Handler = H;

    fn extensions(&self) -> &[&str] {
        &MANIFEST_EXTENSIONS
    }

    fn load(&self, file: &Path) -> anyhow::Result<HandlerDefinition<H>> {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read manifest {}", file.display()))?;
        let manifest = Self::parse(file, &content)?;
        self.resolve(file, manifest, &content)
    }
}

/// The block of `#` comment lines at the top of a manifest, markers stripped.
fn leading_comment(content: &str) -> Option<String> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .skip_while(|line| line.is_empty())
        .take_while(|line| line.starts_with('#'))
        .map(|line| {
            let text = line.trim_start_matches('#');
            text.strip_prefix(' ').unwrap_or(text)
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> ManifestLoader<&'static str> {
        ManifestLoader::new(HandlerRegistry::new().with("show", "show-impl"))
    }

    #[test]
    fn test_yaml_manifest_with_comment() {
        let content = "# Shows a user.\n# Second line.\nhandler: show\npriority: 3\n";
        let file = Path::new("users/:id.yaml");
        let manifest = ManifestLoader::<&str>::parse(file, content).unwrap();
        let def = loader().resolve(file, manifest, content).unwrap();
        assert_eq!(def.handler, "show-impl");
        assert_eq!(def.priority, Some(3.0));
        assert_eq!(def.path, None);
        assert_eq!(def.comment.as_deref(), Some("Shows a user.\nSecond line."));
    }

    #[test]
    fn test_description_wins_over_comment() {
        let content = "# ignored\nhandler = \"show\"\ndescription = \"Explicit\"\npath = \"/x\"\n";
        let file = Path::new("x.toml");
        let manifest = ManifestLoader::<&str>::parse(file, content).unwrap();
        let def = loader().resolve(file, manifest, content).unwrap();
        assert_eq!(def.comment.as_deref(), Some("Explicit"));
        assert_eq!(def.path.as_deref(), Some("/x"));
    }

    #[test]
    fn test_json_manifest() {
        let content = r#"{"handler": "show", "methods": ["GET"]}"#;
        let file = Path::new("x.json");
        let manifest = ManifestLoader::<&str>::parse(file, content).unwrap();
        assert_eq!(manifest.methods, vec!["GET".to_string()]);
        let def = loader().resolve(file, manifest, content).unwrap();
        assert_eq!(def.comment, None);
    }

    #[test]
    fn test_missing_handler() {
        let file = Path::new("x.yaml");
        let manifest = ManifestLoader::<&str>::parse(file, "").unwrap();
        let err = loader().resolve(file, manifest, "").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ManifestError>(),
            Some(&ManifestError::MissingHandler {
                file: file.to_path_buf()
            })
        );
    }

    #[test]
    fn test_unknown_handler() {
        let file = Path::new("x.yaml");
        let manifest = ManifestLoader::<&str>::parse(file, "handler: nope").unwrap();
        let err = loader().resolve(file, manifest, "").unwrap_err();
        assert!(err.to_string().contains("'nope'"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let file = Path::new("x.yaml");
        assert!(ManifestLoader::<&str>::parse(file, "handler: show\nprio: 1\n").is_err());
    }

    #[test]
    fn test_unsupported_format() {
        let err = ManifestLoader::<&str>::parse(Path::new("x.ini"), "").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManifestError>(),
            Some(ManifestError::UnsupportedFormat { .. })
        ));
    }
}

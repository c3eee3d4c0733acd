//! Logical URI to filesystem path resolution.
//!
//! A logical URI has the form `scheme://target`, e.g. `public://images/x.png`.
//! Each scheme is rooted at a directory; the target is joined onto it.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::config::PathsConfig;

/// Maps a logical URI to a concrete filesystem path.
pub trait PathResolver: Send + Sync {
    /// Resolve `uri`, or `None` when it cannot be mapped to a path.
    fn resolve(&self, uri: &str) -> Option<PathBuf>;
}

impl<T: PathResolver + ?Sized> PathResolver for Arc<T> {
    fn resolve(&self, uri: &str) -> Option<PathBuf> {
        (**self).resolve(uri)
    }
}

/// Split `scheme://target` into its parts.
pub fn split_uri(uri: &str) -> Option<(&str, &str)> {
    let (scheme, target) = uri.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return None;
    }
    Some((scheme, target))
}

/// Resolver backed by a table of scheme roots.
#[derive(Debug, Clone, Default)]
pub struct SchemeResolver {
    roots: BTreeMap<String, PathBuf>,
}

impl SchemeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the default schemes under `files_dir` plus `temporary://`
    /// rooted at the system temp directory.
    pub fn with_defaults(files_dir: &Path) -> Self {
        let mut resolver = Self::new();
        for scheme in PathsConfig::DEFAULT_SCHEMES {
            resolver.insert(*scheme, files_dir.join(scheme));
        }
        resolver.insert(PathsConfig::TEMPORARY_SCHEME, std::env::temp_dir());
        resolver
    }

    /// Register (or replace) the root for `scheme`.
    pub fn insert(&mut self, scheme: impl Into<String>, root: impl Into<PathBuf>) {
        self.roots.insert(scheme.into(), root.into());
    }

    /// Builder-style variant of [`SchemeResolver::insert`].
    pub fn with_scheme(mut self, scheme: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.insert(scheme, root);
        self
    }

    pub fn root(&self, scheme: &str) -> Option<&Path> {
        self.roots.get(scheme).map(PathBuf::as_path)
    }
}

impl PathResolver for SchemeResolver {
    fn resolve(&self, uri: &str) -> Option<PathBuf> {
        let (scheme, target) = split_uri(uri)?;
        if target.is_empty() {
            return None;
        }
        let root = self.roots.get(scheme)?;
        let target = Path::new(target);

        // Only plain relative components; anything else could leave the root.
        let mut resolved = root.clone();
        for component in target.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

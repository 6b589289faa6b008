use std::path::{Path, PathBuf};

use crate::config::RenderConfig;
use crate::foundation::error::{CardError, CardResult};

/// Outcome of resolving an asset reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetLookup {
    /// The reference maps to an existing file.
    Found(PathBuf),
    /// The reference is well-formed but no file exists at the mapped path.
    Missing(PathBuf),
    /// The reference cannot map to a local file (scheme, traversal, empty).
    Unsupported(String),
}

impl AssetLookup {
    /// Path of a found asset.
    pub fn found(&self) -> Option<&Path> {
        match self {
            Self::Found(p) => Some(p),
            _ => None,
        }
    }
}

/// Maps background and image references onto local files.
///
/// Three forms are recognized:
///
/// 1. `<api_prefix><category>/<file>` maps to `<api_root>/<category>/<file>`
/// 2. `/any/dirs/<file>` keeps only `<file>` and maps to `<legacy_root>/<file>`
/// 3. `relative/<file>` maps to `<template_root>/relative/<file>`
///
/// References with a URL scheme or a drive letter never resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetResolver {
    template_root: PathBuf,
    api_root: PathBuf,
    legacy_root: PathBuf,
    api_prefix: String,
}

impl AssetResolver {
    /// Resolver over the roots in `config`.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            template_root: config.template_assets_root.clone(),
            api_root: config.api_assets_root.clone(),
            legacy_root: config.legacy_assets_root.clone(),
            api_prefix: config.api_prefix.clone(),
        }
    }

    /// Map `reference` to a path without touching the filesystem.
    pub fn map(&self, reference: &str) -> CardResult<PathBuf> {
        let r = reference.trim();
        if r.is_empty() {
            return Err(CardError::asset_missing("empty asset reference"));
        }
        if has_scheme(r) {
            return Err(CardError::asset_missing(format!(
                "unsupported asset reference \"{r}\""
            )));
        }

        if !self.api_prefix.is_empty()
            && let Some(rest) = r.strip_prefix(self.api_prefix.as_str())
        {
            let rel = normalize_rel_path(rest)?;
            return Ok(self.api_root.join(rel));
        }

        if r.starts_with('/') || r.starts_with('\\') {
            let name = r
                .rsplit(['/', '\\'])
                .find(|part| !part.is_empty() && *part != "." && *part != "..")
                .ok_or_else(|| {
                    CardError::asset_missing(format!("asset reference \"{r}\" has no file name"))
                })?;
            return Ok(self.legacy_root.join(name));
        }

        let rel = normalize_rel_path(r)?;
        Ok(self.template_root.join(rel))
    }

    /// Map `reference` and check that the file exists.
    pub fn resolve(&self, reference: &str) -> AssetLookup {
        match self.map(reference) {
            Ok(path) if path.is_file() => AssetLookup::Found(path),
            Ok(path) => AssetLookup::Missing(path),
            Err(e) => AssetLookup::Unsupported(e.to_string()),
        }
    }
}

/// Normalize a relative asset path.
///
/// The result uses `/` separators, drops `.` and empty segments, and rejects absolute paths
/// and parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> CardResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CardError::asset_missing("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(CardError::asset_missing("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CardError::asset_missing("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CardError::asset_missing("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// `http:`, `data:`, `C:` and friends: a run of scheme characters followed by `:` before any
/// path separator.
fn has_scheme(r: &str) -> bool {
    let Some((head, _)) = r.split_once(':') else {
        return false;
    };
    !head.is_empty()
        && head
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;

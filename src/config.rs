use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{CardError, CardResult};

/// Prefix of editor-served background URLs (`/api/templates/backgrounds/<category>/<file>`).
pub const DEFAULT_API_PREFIX: &str = "/api/templates/backgrounds/";

/// Renderer configuration.
///
/// Every field has a default, so an empty JSON object is a valid configuration. Environment
/// variables (`CARDSMITH_*`) override file values when applied with [`RenderConfig::with_env`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Root for relative asset references.
    pub template_assets_root: PathBuf,
    /// Root that API-style references (`<api_prefix><category>/<file>`) resolve against.
    pub api_assets_root: PathBuf,
    /// Root for legacy leading-slash references; only the file name is kept.
    pub legacy_assets_root: PathBuf,
    /// API URL prefix recognized by the asset resolver.
    pub api_prefix: String,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,
    /// Whether the platform font directories are scanned as well.
    pub load_system_fonts: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_assets_root: PathBuf::from("data/templates"),
            api_assets_root: PathBuf::from("data/templates"),
            legacy_assets_root: PathBuf::from("data/templates"),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            font_dirs: vec![PathBuf::from("fonts")],
            load_system_fonts: true,
        }
    }
}

impl RenderConfig {
    /// Configuration rooted at `root`: all three asset roots point at it and `root/fonts` is
    /// scanned for fonts.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            template_assets_root: root.clone(),
            api_assets_root: root.clone(),
            legacy_assets_root: root.clone(),
            font_dirs: vec![root.join("fonts")],
            ..Self::default()
        }
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: &Path) -> CardResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| CardError::configuration(format!("invalid config '{}': {e}", path.display())))
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> CardResult<Self> {
        Self::default().with_env()
    }

    /// Apply `CARDSMITH_*` environment overrides on top of `self`.
    ///
    /// - `CARDSMITH_ASSETS_ROOT`: sets all three asset roots
    /// - `CARDSMITH_TEMPLATE_ASSETS_ROOT`, `CARDSMITH_API_ASSETS_ROOT`,
    ///   `CARDSMITH_LEGACY_ASSETS_ROOT`: individual roots
    /// - `CARDSMITH_API_PREFIX`
    /// - `CARDSMITH_FONT_DIRS`: platform path-list of font directories
    /// - `CARDSMITH_SYSTEM_FONTS`: `0`/`false` disables system font scanning
    pub fn with_env(mut self) -> CardResult<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(root) = var("CARDSMITH_ASSETS_ROOT") {
            let root = PathBuf::from(root);
            self.template_assets_root = root.clone();
            self.api_assets_root = root.clone();
            self.legacy_assets_root = root;
        }
        if let Some(v) = var("CARDSMITH_TEMPLATE_ASSETS_ROOT") {
            self.template_assets_root = PathBuf::from(v);
        }
        if let Some(v) = var("CARDSMITH_API_ASSETS_ROOT") {
            self.api_assets_root = PathBuf::from(v);
        }
        if let Some(v) = var("CARDSMITH_LEGACY_ASSETS_ROOT") {
            self.legacy_assets_root = PathBuf::from(v);
        }
        if let Some(v) = var("CARDSMITH_API_PREFIX") {
            self.api_prefix = v;
        }
        if let Some(v) = var("CARDSMITH_FONT_DIRS") {
            self.font_dirs = std::env::split_paths(&v).collect();
        }
        if let Some(v) = var("CARDSMITH_SYSTEM_FONTS") {
            self.load_system_fonts = parse_flag(&v).ok_or_else(|| {
                CardError::configuration(format!("CARDSMITH_SYSTEM_FONTS: invalid flag \"{v}\""))
            })?;
        }
        Ok(self)
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Manifest loading and path resolution.
//!
//! The manifest is the single source of truth for one render cycle. The
//! serving front-end re-reads it from disk on every request, so edits to
//! it or to anything it references show up without a restart; the export
//! front-end reads it once per run.
//!
//! Every file path inside the manifest resolves against the manifest's own
//! directory, never the current working directory. Absolute paths pass
//! through unchanged.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root manifest object.
///
/// Unknown JSON keys are ignored and every section may be omitted, so a
/// serving manifest (routes only) and an export manifest (pages only) both
/// decode into the same shape.
#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    /// Layout files contributing named templates.
    #[serde(default)]
    pub layouts: Vec<String>,

    /// URL path -> route, exact matches only (serving variant).
    #[serde(default)]
    pub routes: BTreeMap<String, Route>,

    /// Page name -> page (export variant).
    #[serde(default)]
    pub pages: BTreeMap<String, Page>,

    /// Site-wide arguments. Parsed but not passed to templates yet.
    #[serde(default)]
    pub args: BTreeMap<String, String>,
}

/// One entry in `routes`.
///
/// A route is either a static file reference or a template invocation.
/// When `static_path` is set it wins and the template fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub static_path: Option<String>,

    /// Content-Type header to send with a static file.
    #[serde(default)]
    pub content_type: Option<String>,

    /// Named template to execute when `static_path` is absent.
    #[serde(default)]
    pub template: String,

    /// Flat map; values may be any JSON scalar or array.
    #[serde(default)]
    pub args: BTreeMap<String, serde_json::Value>,
}

/// One entry in `pages`.
#[derive(Debug, Deserialize)]
pub struct Page {
    /// Flat string-to-string arguments passed to the template.
    #[serde(default)]
    pub args: BTreeMap<String, String>,

    /// Template to execute. Historical single-template manifests omit
    /// this and get `post`.
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Output directory under the export root; `index.html` is written
    /// inside it.
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub markdown: Option<MarkdownRef>,
}

fn default_layout() -> String {
    "post".into()
}

/// Markdown source reference. An object rather than a bare string so it
/// can grow more fields later.
#[derive(Debug, Deserialize)]
pub struct MarkdownRef {
    pub path: String,
}

/// A manifest plus the directory it was loaded from.
#[derive(Debug)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub dir: PathBuf,
}

impl LoadedManifest {
    /// Read and decode the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path).map_err(|e| Error::ManifestRead(path.to_path_buf(), e))?;
        let manifest = serde_json::from_slice(&raw)
            .map_err(|e| Error::ManifestParse(path.to_path_buf(), e))?;
        let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(Self { manifest, dir })
    }

    /// Resolve a manifest-relative path. Absolute paths pass through.
    pub fn resolve(&self, p: &str) -> PathBuf {
        resolve_path(&self.dir, p)
    }

    /// Layout paths in manifest order, resolved.
    pub fn layout_paths(&self) -> Vec<PathBuf> {
        self.manifest.layouts.iter().map(|p| self.resolve(p)).collect()
    }
}

/// Join `p` onto `dir` unless `p` is already absolute.
pub fn resolve_path(dir: &Path, p: &str) -> PathBuf {
    let p = Path::new(p);
    if p.is_absolute() { p.to_path_buf() } else { dir.join(p) }
}

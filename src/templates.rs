//! Template set construction.
//!
//! Each layout file becomes one named template (named by file stem), parsed
//! fresh per render cycle. The set carries a single built-in function,
//! `render_markdown(path)`, which reads a markdown file relative to the
//! manifest directory and returns its HTML pre-escaped, so the engine does
//! not escape it again.

use crate::error::{Error, Result};
use crate::manifest::{LoadedManifest, resolve_path};
use crate::markdown;
use minijinja::{AutoEscape, Environment, ErrorKind, Value};
use std::fs;
use std::path::Path;

/// Parse all layout files from the manifest into a single environment.
///
/// Fails if any layout file is missing or does not parse, naming the
/// offending file. A route/page referencing a template name no layout
/// defined only fails later, at execution time.
pub fn build(loaded: &LoadedManifest) -> Result<Environment<'static>> {
    let mut env = Environment::new();
    // Templates are named by file stem, so extension-based escaping
    // detection never fires; these are HTML templates, escape as such.
    env.set_auto_escape_callback(|_| AutoEscape::Html);

    let dir = loaded.dir.clone();
    env.add_function("render_markdown", move |path: String| {
        render_markdown(&dir, &path)
    });

    for path in loaded.layout_paths() {
        let source = fs::read_to_string(&path).map_err(|e| Error::LayoutRead(path.clone(), e))?;
        env.add_template_owned(template_name(&path), source)
            .map_err(|e| Error::LayoutParse(path.clone(), Box::new(e)))?;
    }

    Ok(env)
}

/// `layouts/post.tmpl` contributes a template named `post`.
fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// The one template-visible function.
///
/// Failures travel through the engine's error channel and are recovered
/// where the render was invoked; they never abort the process.
fn render_markdown(dir: &Path, path: &str) -> std::result::Result<Value, minijinja::Error> {
    let full = resolve_path(dir, path);
    let bytes = fs::read(&full).map_err(|err| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read markdown `{}`", full.display()),
        )
        .with_source(err)
    })?;
    let html = markdown::to_html(&bytes).map_err(|err| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("markdown `{}` is not valid UTF-8", full.display()),
        )
        .with_source(err)
    })?;
    Ok(Value::from_safe_string(html))
}

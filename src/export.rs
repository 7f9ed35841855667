//! Static export front-end.
//!
//! Loads the manifest and template set once, then renders every page to
//! `<out>/<page.path>/index.html`. The first failure aborts the whole run;
//! partially written output is not considered valid.

use crate::error::Error;
use crate::manifest::LoadedManifest;
use crate::{log, render, templates};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn export_site(manifest_path: &Path, out_dir: &Path) -> Result<()> {
    let loaded = LoadedManifest::load(manifest_path)?;
    let env = templates::build(&loaded)?;

    for (name, page) in &loaded.manifest.pages {
        let rendered = render::render_page(&loaded, &env, page)
            .with_context(|| format!("rendering page '{name}'"))?;

        let target = write_index(out_dir, &page.path, &rendered.body)
            .with_context(|| format!("writing page '{name}'"))?;
        log!("export"; "{name} -> {}", target.display());
    }

    Ok(())
}

/// Create `<out>/<page_path>/` as needed and write `index.html` into it.
///
/// A leading separator in `page_path` is stripped so an absolute page
/// path still lands under the output root rather than replacing it.
fn write_index(
    out_dir: &Path,
    page_path: &str,
    body: &[u8],
) -> crate::error::Result<std::path::PathBuf> {
    let dir = out_dir.join(page_path.trim_start_matches(['/', '\\']));
    fs::create_dir_all(&dir).map_err(|e| Error::OutputWrite(dir.clone(), e))?;

    let target = dir.join("index.html");
    fs::write(&target, body).map_err(|e| Error::OutputWrite(target.clone(), e))?;
    Ok(target)
}

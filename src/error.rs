//! Render error taxonomy.
//!
//! One enum covers everything between reading a manifest and writing
//! rendered bytes to a sink. The serving front-end maps each variant to an
//! HTTP status via [`Error::status`]; the export front-end aborts the run
//! on the first one it sees.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the manifest/template/render pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("error reading manifest `{0}`")]
    ManifestRead(PathBuf, #[source] std::io::Error),

    #[error("error parsing manifest `{0}`")]
    ManifestParse(PathBuf, #[source] serde_json::Error),

    #[error("error reading layout `{0}`")]
    LayoutRead(PathBuf, #[source] std::io::Error),

    #[error("error parsing layout `{0}`")]
    LayoutParse(PathBuf, #[source] Box<minijinja::Error>),

    #[error("error reading `{0}`")]
    AssetRead(PathBuf, #[source] std::io::Error),

    #[error("error converting markdown `{0}`")]
    MarkdownConversion(PathBuf, #[source] std::str::Utf8Error),

    /// Covers both an undefined template name and a failure partway
    /// through execution.
    #[error("error executing template `{0}`")]
    TemplateExecution(String, #[source] Box<minijinja::Error>),

    #[error("no route for `{0}`")]
    RouteNotFound(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("error writing output `{0}`")]
    OutputWrite(PathBuf, #[source] std::io::Error),
}

impl Error {
    /// HTTP status the serving front-end responds with for this failure.
    ///
    /// A static route whose file is missing stays a 500: the route is
    /// registered, so a failed read means the site is broken, not that
    /// the URL is unknown.
    pub fn status(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

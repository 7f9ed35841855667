//! Serving front-end.
//!
//! A `tiny_http` accept loop that reloads the manifest and rebuilds the
//! template set on every request, so manifest, layout, and content edits
//! are live without a restart. There is no cache to invalidate because
//! nothing is cached.
//!
//! Ctrl+C unblocks the listener; in-flight requests are not drained.

use crate::error::{Error, Result};
use crate::manifest::LoadedManifest;
use crate::render::{self, Rendered};
use crate::{log, templates};
use anyhow::Context;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Bind and serve until Ctrl+C.
pub fn serve_site(manifest_path: &Path, interface: &str, port: u16) -> anyhow::Result<()> {
    let interface: std::net::IpAddr = interface.parse()?;
    let addr = SocketAddr::new(interface, port);

    let server = Server::http(addr).map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("failed to set Ctrl+C handler")?;

    log!("serve"; "http://{addr}");

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, manifest_path) {
            log!("serve"; "connection error: {e}");
        }
    }

    Ok(())
}

/// Handle a single request end to end.
///
/// Render failures become HTTP responses here; the returned error only
/// covers a sink that refused the write.
fn handle_request(request: Request, manifest_path: &Path) -> std::io::Result<()> {
    match respond_to(manifest_path, request.method(), request.url()) {
        Ok(rendered) => {
            let mut response = Response::from_data(rendered.body);
            if let Some(ct) = &rendered.content_type {
                match content_type_header(ct) {
                    Some(header) => response = response.with_header(header),
                    None => log!("serve"; "ignoring invalid content_type `{ct}`"),
                }
            }
            request.respond(response)
        }
        Err(err) => {
            log!("serve"; "{}", error_body(&err));
            let response =
                Response::from_string(error_body(&err)).with_status_code(StatusCode(err.status()));
            request.respond(response)
        }
    }
}

/// Resolve one (method, url) pair against a freshly loaded manifest.
///
/// Non-GET methods are rejected before anything touches the disk. An
/// unknown path is rejected before any template is looked up. Everything
/// else flows through the render pipeline.
pub fn respond_to(manifest_path: &Path, method: &Method, url: &str) -> Result<Rendered> {
    if *method != Method::Get {
        return Err(Error::MethodNotAllowed(method.to_string()));
    }

    let loaded = LoadedManifest::load(manifest_path)?;
    let route = loaded
        .manifest
        .routes
        .get(url)
        .ok_or_else(|| Error::RouteNotFound(url.to_string()))?;

    let env = templates::build(&loaded)?;
    render::render_route(&loaded, &env, url, route)
}

/// Build the Content-Type header for a manifest-supplied value.
///
/// The value comes from user configuration, so header construction can
/// fail (tiny_http rejects non-ASCII). A bad value drops the header
/// rather than panicking the serving thread.
fn content_type_header(ct: &str) -> Option<Header> {
    Header::from_bytes("Content-Type", ct.as_bytes()).ok()
}

/// Error text for the response body: the full cause chain on one line.
fn error_body(err: &Error) -> String {
    use std::fmt::Write;

    let mut body = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        write!(body, ": {cause}").ok();
        source = cause.source();
    }
    body
}

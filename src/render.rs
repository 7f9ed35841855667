//! The render pipeline: one manifest entry in, rendered bytes out.
//!
//! Output is buffered in full before it reaches any sink. A template
//! failure therefore can never truncate a response a client already
//! started receiving; the serving front-end only commits a status code
//! once rendering has finished.

use crate::error::{Error, Result};
use crate::manifest::{LoadedManifest, Page, Route};
use crate::markdown;
use minijinja::{Environment, Value, context};
use std::fs;

/// A fully rendered body with optional content-type metadata.
#[derive(Debug)]
pub struct Rendered {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Render one route for the request path `path` (serving variant).
///
/// A route with `static_path` set is a verbatim file read; templating is
/// never consulted for it, even when `template` is also present. The
/// template context is `{ path, args }`.
pub fn render_route(
    loaded: &LoadedManifest,
    env: &Environment<'_>,
    path: &str,
    route: &Route,
) -> Result<Rendered> {
    if let Some(static_path) = &route.static_path {
        let full = loaded.resolve(static_path);
        let body = fs::read(&full).map_err(|e| Error::AssetRead(full.clone(), e))?;
        return Ok(Rendered { body, content_type: route.content_type.clone() });
    }

    let ctx = context! {
        path => path,
        args => route.args,
    };
    let body = execute(env, &route.template, ctx)?;
    Ok(Rendered { body, content_type: None })
}

/// Render one page (export variant), pre-rendering its markdown source,
/// if any, into the `rendered_markdown` argument.
///
/// The template context is `{ rendered_markdown, args }`;
/// `rendered_markdown` is an empty string when the page has no markdown
/// reference, and pre-escaped HTML otherwise.
pub fn render_page(
    loaded: &LoadedManifest,
    env: &Environment<'_>,
    page: &Page,
) -> Result<Rendered> {
    let rendered_markdown = match &page.markdown {
        Some(md) => {
            let full = loaded.resolve(&md.path);
            let bytes = fs::read(&full).map_err(|e| Error::AssetRead(full.clone(), e))?;
            let html = markdown::to_html(&bytes)
                .map_err(|e| Error::MarkdownConversion(full.clone(), e))?;
            Value::from_safe_string(html)
        }
        None => Value::from(""),
    };

    let ctx = context! {
        rendered_markdown,
        args => page.args,
    };
    let body = execute(env, &page.layout, ctx)?;
    Ok(Rendered { body, content_type: None })
}

fn execute(env: &Environment<'_>, name: &str, ctx: Value) -> Result<Vec<u8>> {
    let template = env
        .get_template(name)
        .map_err(|e| Error::TemplateExecution(name.to_string(), Box::new(e)))?;
    let out = template
        .render(ctx)
        .map_err(|e| Error::TemplateExecution(name.to_string(), Box::new(e)))?;
    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::LoadedManifest;
    use crate::templates;
    use std::fs;
    use tempfile::TempDir;

    fn load_site(tmp: &TempDir, manifest_json: &str) -> (LoadedManifest, Environment<'static>) {
        let path = tmp.path().join("smolmanifest.json");
        fs::write(&path, manifest_json).unwrap();
        let loaded = LoadedManifest::load(&path).unwrap();
        let env = templates::build(&loaded).unwrap();
        (loaded, env)
    }

    #[test]
    fn test_static_route_returns_exact_bytes() {
        let tmp = TempDir::new().unwrap();
        let bytes = b"body { color: red }\n";
        fs::write(tmp.path().join("style.css"), bytes).unwrap();

        let (loaded, env) = load_site(
            &tmp,
            r#"{ "routes": { "/style.css": {
                "static_path": "style.css",
                "content_type": "text/css",
                "template": "ignored"
            } } }"#,
        );

        let route = &loaded.manifest.routes["/style.css"];
        let rendered = render_route(&loaded, &env, "/style.css", route).unwrap();
        assert_eq!(rendered.body, bytes);
        assert_eq!(rendered.content_type.as_deref(), Some("text/css"));
    }

    #[test]
    fn test_static_route_missing_file_is_asset_read() {
        let tmp = TempDir::new().unwrap();
        let (loaded, env) =
            load_site(&tmp, r#"{ "routes": { "/x": { "static_path": "gone.bin" } } }"#);

        let route = &loaded.manifest.routes["/x"];
        let err = render_route(&loaded, &env, "/x", route).unwrap_err();
        assert!(matches!(err, Error::AssetRead(..)));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_template_route_gets_path_and_args() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.tmpl"), "<h1>{{ args.title }}</h1>").unwrap();

        let (loaded, env) = load_site(
            &tmp,
            r#"{
                "layouts": ["index.tmpl"],
                "routes": { "/": { "template": "index", "args": { "title": "Hi" } } }
            }"#,
        );

        let route = &loaded.manifest.routes["/"];
        let rendered = render_route(&loaded, &env, "/", route).unwrap();
        assert_eq!(rendered.body, b"<h1>Hi</h1>");
        assert!(rendered.content_type.is_none());
    }

    #[test]
    fn test_request_path_is_in_the_context() {
        let tmp = TempDir::new().unwrap();
        // `/` is HTML-escaped like any other argument value
        fs::write(tmp.path().join("index.tmpl"), "{{ path }}").unwrap();

        let (loaded, env) = load_site(
            &tmp,
            r#"{ "layouts": ["index.tmpl"], "routes": { "/about": { "template": "index" } } }"#,
        );

        let route = &loaded.manifest.routes["/about"];
        let rendered = render_route(&loaded, &env, "/about", route).unwrap();
        assert_eq!(rendered.body, b"&#x2f;about");
    }

    #[test]
    fn test_undefined_template_fails_at_execution() {
        let tmp = TempDir::new().unwrap();
        let (loaded, env) =
            load_site(&tmp, r#"{ "routes": { "/": { "template": "nope" } } }"#);

        let route = &loaded.manifest.routes["/"];
        let err = render_route(&loaded, &env, "/", route).unwrap_err();
        match err {
            Error::TemplateExecution(name, _) => assert_eq!(name, "nope"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_page_markdown_is_prerendered_and_unescaped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("about.md"), "# Hi").unwrap();
        fs::write(tmp.path().join("post.tmpl"), "<body>{{ rendered_markdown }}</body>").unwrap();

        let (loaded, env) = load_site(
            &tmp,
            r#"{
                "layouts": ["post.tmpl"],
                "pages": { "about": { "path": "about", "markdown": { "path": "about.md" } } }
            }"#,
        );

        let page = &loaded.manifest.pages["about"];
        let rendered = render_page(&loaded, &env, page).unwrap();
        assert_eq!(rendered.body, b"<body><h1>Hi</h1>\n</body>");
    }

    #[test]
    fn test_page_without_markdown_leaves_field_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("post.tmpl"), "[{{ rendered_markdown }}]").unwrap();

        let (loaded, env) = load_site(
            &tmp,
            r#"{ "layouts": ["post.tmpl"], "pages": { "a": { "path": "a" } } }"#,
        );

        let rendered = render_page(&loaded, &env, &loaded.manifest.pages["a"]).unwrap();
        assert_eq!(rendered.body, b"[]");
    }

    #[test]
    fn test_absolute_markdown_path_is_used_verbatim() {
        let tmp = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let md_path = elsewhere.path().join("far.md");
        fs::write(&md_path, "# Far").unwrap();
        fs::write(tmp.path().join("post.tmpl"), "{{ rendered_markdown }}").unwrap();

        let manifest = serde_json::json!({
            "layouts": ["post.tmpl"],
            "pages": { "p": { "path": "p", "markdown": { "path": md_path } } }
        });
        let (loaded, env) = load_site(&tmp, &manifest.to_string());

        let rendered = render_page(&loaded, &env, &loaded.manifest.pages["p"]).unwrap();
        assert_eq!(rendered.body, b"<h1>Far</h1>\n");
    }

    #[test]
    fn test_rendering_twice_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.tmpl"), "<h1>{{ args.title }}</h1>").unwrap();
        let json = r#"{
            "layouts": ["index.tmpl"],
            "routes": { "/": { "template": "index", "args": { "title": "Hi" } } }
        }"#;

        let manifest_path = tmp.path().join("smolmanifest.json");
        fs::write(&manifest_path, json).unwrap();

        let mut bodies: Vec<Vec<u8>> = Vec::new();
        for _ in 0..2 {
            let loaded = LoadedManifest::load(&manifest_path).unwrap();
            let env = templates::build(&loaded).unwrap();
            let rendered =
                render_route(&loaded, &env, "/", &loaded.manifest.routes["/"]).unwrap();
            bodies.push(rendered.body);
        }
        assert_eq!(bodies[0], bodies[1]);
    }

    #[test]
    fn test_missing_markdown_source_is_asset_read() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("post.tmpl"), "{{ rendered_markdown }}").unwrap();

        let (loaded, env) = load_site(
            &tmp,
            r#"{ "layouts": ["post.tmpl"], "pages": { "p": { "path": "p", "markdown": { "path": "gone.md" } } } }"#,
        );

        let err = render_page(&loaded, &env, &loaded.manifest.pages["p"]).unwrap_err();
        match err {
            Error::AssetRead(path, _) => assert_eq!(path, tmp.path().join("gone.md")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_route_args_accept_arrays_and_scalars() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("list.tmpl"),
            "{% for item in args.items %}{{ item }};{% endfor %}{{ args.count }}",
        )
        .unwrap();

        let (loaded, env) = load_site(
            &tmp,
            r#"{
                "layouts": ["list.tmpl"],
                "routes": { "/": { "template": "list", "args": { "items": ["a", "b"], "count": 2 } } }
            }"#,
        );

        let rendered = render_route(&loaded, &env, "/", &loaded.manifest.routes["/"]).unwrap();
        assert_eq!(rendered.body, b"a;b;2");
    }

    #[test]
    fn test_markdown_path_relative_to_manifest_dir_not_cwd() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join("site");
        fs::create_dir_all(site.join("content")).unwrap();
        fs::write(site.join("post.tmpl"), "{{ rendered_markdown }}").unwrap();
        fs::write(site.join("content/home.md"), "# Home").unwrap();

        let manifest_path = site.join("smolmanifest.json");
        fs::write(
            &manifest_path,
            r#"{ "layouts": ["post.tmpl"], "pages": { "home": { "path": "", "markdown": { "path": "content/home.md" } } } }"#,
        )
        .unwrap();

        let loaded = LoadedManifest::load(&manifest_path).unwrap();
        let env = templates::build(&loaded).unwrap();
        let rendered = render_page(&loaded, &env, &loaded.manifest.pages["home"]).unwrap();
        assert_eq!(rendered.body, b"<h1>Home</h1>\n");
    }
}

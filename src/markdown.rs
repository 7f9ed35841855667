//! Markdown to HTML conversion.

use pulldown_cmark::{Parser, html as md_html};
use std::str::Utf8Error;

/// Convert raw markdown bytes to an HTML fragment.
///
/// Input must be UTF-8; that is the only failure mode, the parser itself
/// accepts any string.
pub fn to_html(bytes: &[u8]) -> Result<String, Utf8Error> {
    let text = std::str::from_utf8(bytes)?;
    let parser = Parser::new(text);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    Ok(out)
}

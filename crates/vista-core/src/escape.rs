//! # HTML Escaping
//!
//! Escapes merchant- and user-supplied text before it is embedded in markup.
//! Titles and variant labels come straight from the store admin; a title of
//! `<script>x</script>` must render as literal text, never execute.

/// Escapes the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes text so it can be interpolated into HTML element content or a
/// quoted attribute value and still read as literal text.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// CSS class derived from a source label: lowercased, everything outside
/// `a-z` dropped. "Ben's Bites" becomes "bensbites".
pub fn source_class(source: &str) -> String {
    source
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

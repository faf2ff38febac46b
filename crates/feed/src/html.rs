/// Escape text for use inside HTML element content or a quoted attribute.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Green for `true`, red for `false`.
pub(crate) fn flag(value: bool) -> String {
    let color = if value { "green" } else { "red" };
    format!(r#"<span style="color: {color};">{value}</span>"#)
}

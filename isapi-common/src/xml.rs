//! Tolerant XML helpers
//!
//! Clients send small, flat ISAPI fragments. Rather than insisting on a
//! well-formed document, fields are read by tag-scoped text extraction that
//! ignores namespace prefixes and attributes. A missing or empty field is
//! `None`, never an error.

/// Extract the text content of the first `<tag>` element that holds text
///
/// Matches `<tag>`, `<ns:tag>` and `<tag attr="...">`. Surrounding whitespace
/// is trimmed and the predefined entities are decoded. Elements with child
/// elements or no text are skipped.
pub fn extract_text(xml: &str, tag: &str) -> Option<String> {
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            break;
        };

        let head = &after[..close];
        let name = head.split_whitespace().next().unwrap_or("");

        if local_name(name) == tag && !head.ends_with('/') {
            let body = &after[close + 1..];
            let text_end = body.find('<').unwrap_or(body.len());
            let text = body[..text_end].trim();

            if !text.is_empty() && closes_element(&body[text_end..], tag) {
                return Some(unescape_text(text));
            }
        }

        rest = after;
    }

    None
}

/// Escape text for use as XML element content
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode the five predefined XML entities
///
/// Unknown or unterminated references are kept as written.
pub fn unescape_text(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let c = match &tail[1..semi] {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "apos" => '\'',
                _ => return None,
            };
            Some((c, semi + 1))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn closes_element(s: &str, tag: &str) -> bool {
    let Some(inner) = s.strip_prefix("</") else {
        return false;
    };
    match inner.find('>') {
        Some(end) => local_name(inner[..end].trim()) == tag,
        None => false,
    }
}

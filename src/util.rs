//! Utility functions for hlmark

/// Escapes HTML special characters.
///
/// Escapes `&`, `<`, `>`, `"` and `'` so the result is safe both as element
/// text and as a double quoted attribute value.
///
/// # Arguments
///
/// * `text`: Plain text to escape
///
/// # Returns
///
/// HTML safe string
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Decodes the HTML entities produced by [`escape_html`].
///
/// Runs in a single pass so `&amp;lt;` decodes to `&lt;` rather than `<`.
/// Numeric references (`&#39;`, `&#x27;`) are decoded when they name a valid
/// character. Unknown entities are kept as literal text.
///
/// # Arguments
///
/// * `html`: HTML encoded string
///
/// # Returns
///
/// Decoded string with actual characters
pub fn decode_html(html: &str) -> String {
    let mut decoded = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        match tail.find(';').and_then(|end| {
            decode_entity(&tail[1..end]).map(|ch| (ch, end + 1))
        }) {
            Some((ch, consumed)) => {
                decoded.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                decoded.push('&');
                rest = &tail[1..];
            }
        }
    }

    decoded.push_str(rest);
    decoded
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

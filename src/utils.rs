//! Pure text helpers for the fragment transform
//!
//! The streaming rewriter hands us text chunks exactly as they appear in the
//! page source, entities included, so decoding and re-escaping live here as
//! plain string functions that can be tested without any HTML machinery.

/// Escape `<` and `>` to their entity forms.
///
/// This is deliberately narrow: the fragment transform replaces only the two
/// angle brackets and preserves every other character, including bare `&`.
pub fn escape_angle_brackets(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Decode the HTML entities a documentation generator emits in code text.
///
/// Handles the named entities `&lt;`, `&gt;`, `&amp;`, `&quot;`, `&apos;`
/// and `&#39;`, plus decimal (`&#60;`) and hex (`&#x3C;`) numeric references.
/// Anything unrecognized is passed through verbatim.
pub fn decode_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let Some(end) = rest.find(';') else {
            // No terminating semicolon anywhere, nothing left to decode
            result.push_str(rest);
            return result;
        };

        let entity = &rest[1..end];
        match decode_one_entity(entity) {
            Some(decoded) => {
                result.push(decoded);
                rest = &rest[end + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Decode a single entity body (the part between `&` and `;`).
fn decode_one_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = if let Some(hex) = code.strip_prefix('x').or_else(|| code.strip_prefix('X'))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                code.parse::<u32>().ok()?
            };
            char::from_u32(value)
        }
    }
}

/// Safely truncate a string at a UTF-8 char boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Truncate a string and append an ellipsis, used for log previews of
/// fragment text.
pub fn truncate_with_ellipsis(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        s.to_string()
    } else {
        format!("{}...", truncate_to_char_boundary(s, max_bytes))
    }
}

//! Markup-to-plain-text conversion for notification bodies.
//!
//! Item descriptions arrive as HTML fragments; notifications carry plain
//! text. Tags are dropped and common entities are decoded, then runs of
//! whitespace collapse to single spaces.

/// Convert an HTML fragment to plain text.
pub fn to_plain_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '<' => {
                // Skip to the end of the tag.
                for tag_ch in chars.by_ref() {
                    if tag_ch == '>' {
                        break;
                    }
                }
            }
            '&' => {
                let mut name = String::new();
                let mut terminated = false;
                while let Some(&next) = chars.peek() {
                    if next == ';' {
                        chars.next();
                        terminated = true;
                        break;
                    }
                    // Entity names are short; give up on anything longer.
                    if next == '&' || next == '<' || name.len() > 8 {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                match (terminated, decode_entity(&name)) {
                    (true, Some(decoded)) => out.push_str(&decoded),
                    (true, None) => {
                        // Unknown entity, keep as-is.
                        out.push('&');
                        out.push_str(&name);
                        out.push(';');
                    }
                    (false, _) => {
                        out.push('&');
                        out.push_str(&name);
                    }
                }
            }
            _ => out.push(ch),
        }
    }

    out.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Decode one HTML entity name (without `&` and `;`).
fn decode_entity(name: &str) -> Option<String> {
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => return numeric_entity(name).map(String::from),
    };
    Some(decoded.to_string())
}

/// Decode a numeric entity name such as `#65` or `#x41`.
fn numeric_entity(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse().ok()?
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(to_plain_text("hello world"), "hello world");
    }

    #[test]
    fn test_tags_are_stripped() {
        assert_eq!(to_plain_text("<b>hi</b>"), "hi");
        assert_eq!(to_plain_text("<p>one</p><p>two</p>"), "onetwo");
        assert_eq!(to_plain_text("<div><em>nested</em></div>"), "nested");
    }

    #[test]
    fn test_tags_with_attributes() {
        assert_eq!(
            to_plain_text(r#"<a href="https://example.com">link</a> text"#),
            "link text"
        );
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(to_plain_text("a &amp; b"), "a & b");
        assert_eq!(to_plain_text("&lt;tag&gt;"), "<tag>");
        assert_eq!(to_plain_text("&quot;quoted&quot;"), "\"quoted\"");
        assert_eq!(to_plain_text("one&nbsp;two"), "one two");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(to_plain_text("&#65;"), "A");
        assert_eq!(to_plain_text("&#x41;"), "A");
        assert_eq!(to_plain_text("&#X41;"), "A");
    }

    #[test]
    fn test_unknown_entity_kept_verbatim() {
        assert_eq!(to_plain_text("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_unterminated_entity_kept_verbatim() {
        assert_eq!(to_plain_text("fish &chips"), "fish &chips");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(to_plain_text("<p>  too   many\n\tspaces </p>"), "too many spaces");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_plain_text(""), "");
    }
}

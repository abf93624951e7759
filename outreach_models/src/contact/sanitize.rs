use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());

/// Normalizes a field value before it is embedded in an email.
///
/// Trims surrounding whitespace, strips markup, truncates to `max_length`
/// characters and replaces each run of line breaks with a single space, so
/// the result can be used in a header line.
pub fn sanitize(raw: &str, max_length: usize) -> String {
    let stripped = strip_tags(raw.trim());
    let truncated = stripped.chars().take(max_length).collect::<String>();
    LINE_BREAKS.replace_all(&truncated, " ").into_owned()
}

/// Removes html/xml tags and comments.
///
/// A `<` only starts a tag if it is followed by a letter, `/`, `!` or `?`, so
/// text like `a < b` is kept. An unterminated tag swallows the rest of the
/// input.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tag = &rest[start..];

        if !opens_tag(tag) {
            out.push('<');
            rest = &tag[1..];
            continue;
        }

        rest = match tag.strip_prefix("<!--") {
            Some(comment) => comment.find("-->").map_or("", |end| &comment[end + 3..]),
            None => tag_end(tag).map_or("", |end| &tag[end + 1..]),
        };
    }

    out.push_str(rest);
    out
}

fn opens_tag(tag: &str) -> bool {
    tag[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// Byte offset of the `>` closing `tag`, ignoring any inside quoted attribute
/// values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if q == c => quote = None,
            (None, '>') => return Some(idx),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn trims() {
        assert_eq!(sanitize("  \t Jane Doe \n ", 100), "Jane Doe");
    }

    #[test]
    fn strips_markup() {
        for (input, expected) in [
            ("<b>bold</b> text", "bold text"),
            ("<script>alert('x')</script>hi", "alert('x')hi"),
            (r#"<a href="x>y">link</a>"#, "link"),
            ("before<!-- a > b -->after", "beforeafter"),
            ("1 < 2 and 3 > 2", "1 < 2 and 3 > 2"),
            ("unterminated <img src=x", "unterminated "),
            ("<?php echo 1; ?>done", "done"),
        ] {
            assert_eq!(sanitize(input, 100), expected, "{input}");
        }
    }

    #[test]
    fn removes_line_breaks() {
        for input in [
            "Subject\r\nBcc: victim@example.com",
            "Subject\nBcc: victim@example.com",
            "Subject\r\r\n\nBcc: victim@example.com",
        ] {
            let result = sanitize(input, 100);
            assert_eq!(result, "Subject Bcc: victim@example.com");
            assert!(!result.contains(['\r', '\n']));
        }
    }

    #[test]
    fn truncates() {
        let result = sanitize(&"x".repeat(150), 100);
        assert_eq!(result.chars().count(), 100);

        let result = sanitize(&"ü".repeat(30), 20);
        assert_eq!(result, "ü".repeat(20));

        assert_eq!(sanitize("short", 100), "short");
    }

    #[test]
    fn truncates_after_stripping() {
        let result = sanitize(&format!("<p>{}</p>", "y".repeat(50)), 50);
        assert_eq!(result, "y".repeat(50));
    }
}

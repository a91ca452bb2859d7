//! Depth-balanced extraction of top-level JSON objects from a text buffer.
//!
//! A fixed-depth regex breaks as soon as a record nests an object or array,
//! so the scan is an explicit brace-depth counter instead. String literals
//! and escape sequences are honoured: a `{` inside `"BTC{USDT"` does not
//! open an object.

/// Byte ranges of every complete, depth-balanced top-level `{...}` span in
/// `text`, in order of appearance. Text between spans (array brackets,
/// commas, whitespace, partial trailing objects) is ignored.
#[must_use]
pub fn balanced_objects(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    // JSON structural characters are ASCII, so scanning bytes is safe:
    // multi-byte UTF-8 continuation bytes never collide with them.
    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            // Strings are tracked at depth 0 as well: a `{` inside a bare
            // top-level string must not open a phantom object
            b'"' => in_string = true,
            b'{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            b'}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        spans.push((start, i + 1));
                    }
                }
                // A stray closing brace outside any object is noise
            }
            _ => {}
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(text: &str) -> Vec<&str> {
        balanced_objects(text)
            .into_iter()
            .map(|(s, e)| &text[s..e])
            .collect()
    }

    #[test]
    fn test_concatenated_objects() {
        let text = r#"{"a":1} {"b":2},{"c":3}"#;
        assert_eq!(extracted(text), vec![r#"{"a":1}"#, r#"{"b":2}"#, r#"{"c":3}"#]);
    }

    #[test]
    fn test_nested_objects_stay_whole() {
        let text = r#"{"path":["A","B"],"meta":{"depth":2}}"#;
        assert_eq!(extracted(text), vec![text]);
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"{"pair":"A{B}C"}{"x":"}{"}"#;
        assert_eq!(extracted(text), vec![r#"{"pair":"A{B}C"}"#, r#"{"x":"}{"}"#]);
    }

    #[test]
    fn test_braces_inside_top_level_string() {
        let text = r#""warming{up" {"a":1}"#;
        assert_eq!(extracted(text), vec![r#"{"a":1}"#]);
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let text = r#"{"note":"she said \"}\" loudly"}"#;
        assert_eq!(extracted(text), vec![text]);
    }

    #[test]
    fn test_incomplete_trailing_object_ignored() {
        let text = r#"{"a":1}{"path":["BTC","ET"#;
        assert_eq!(extracted(text), vec![r#"{"a":1}"#]);
    }

    #[test]
    fn test_stray_closing_brace_ignored() {
        let text = r#"} {"a":1}"#;
        assert_eq!(extracted(text), vec![r#"{"a":1}"#]);
    }

    #[test]
    fn test_objects_inside_array() {
        let text = r#"[{"a":1},{"b":2}"#;
        // The array never closes but its complete members are still found
        assert_eq!(extracted(text), vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[test]
    fn test_empty_input() {
        assert!(balanced_objects("").is_empty());
    }
}

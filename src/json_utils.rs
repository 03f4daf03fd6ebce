use tracing::{debug, instrument};

/// Type of a JSON node found by the structure scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
}

/// Coordinates of a root JSON structure within a larger text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjCoords {
    pub start: usize,
    pub end: usize, // inclusive index of the closing bracket/brace
    pub kind: NodeType,
}

impl ObjCoords {
    pub fn new(start: usize, end: usize, kind: NodeType) -> Self {
        Self { start, end, kind }
    }

    /// The slice of `text` this node spans.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..=self.end]
    }
}

#[derive(Debug)]
struct Frame {
    start: usize,
    kind: NodeType,
}

/// Find all root JSON object/array structures in the given text. Coordinates are byte indices.
///
/// Braces inside string literals are ignored; mismatched closers drop the open frame.
#[instrument(target = "quiz_gpt::json", skip(text), fields(text_len = text.len()))]
pub fn find_json_structures(text: &str) -> Vec<ObjCoords> {
    let bytes = text.as_bytes();
    let mut results: Vec<ObjCoords> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match b {
                b'\\' => escape = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let closing = match b {
            b'"' => {
                in_string = true;
                None
            }
            b'{' => {
                stack.push(Frame { start: i, kind: NodeType::Object });
                None
            }
            b'[' => {
                stack.push(Frame { start: i, kind: NodeType::Array });
                None
            }
            b'}' => Some(NodeType::Object),
            b']' => Some(NodeType::Array),
            _ => None,
        };

        if let Some(kind) = closing {
            if let Some(frame) = stack.pop() {
                if frame.kind == kind && stack.is_empty() {
                    results.push(ObjCoords::new(frame.start, i, kind));
                }
            }
        }
    }

    debug!(target: "quiz_gpt::json", count = results.len(), "found root structures");
    results
}

/// The first root JSON object in `text`, if any.
pub fn first_object(text: &str) -> Option<&str> {
    find_json_structures(text)
        .into_iter()
        .find(|node| node.kind == NodeType::Object)
        .map(|node| node.slice(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_root_structures_and_ignores_braces_in_strings() {
        let text = r#"intro {"a": "}{", "b": [1, {"c": 2}]} outro [3]"#;
        let roots = find_json_structures(text);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].kind, NodeType::Object);
        assert_eq!(roots[0].slice(text), r#"{"a": "}{", "b": [1, {"c": 2}]}"#);
        assert_eq!(roots[1].kind, NodeType::Array);
    }

    #[test]
    fn first_object_skips_leading_arrays() {
        let text = r#"[1,2] then {"x": 1}"#;
        assert_eq!(first_object(text), Some(r#"{"x": 1}"#));
        assert_eq!(first_object("no json here"), None);
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let text = r#"{"q": "say \"}\" now"}"#;
        let roots = find_json_structures(text);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].end, text.len() - 1);
    }
}

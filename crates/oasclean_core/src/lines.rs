//! Source line annotation for YAML documents.
//!
//! `serde_yaml` does not expose node positions, so the loader recovers them with a
//! line scanner that tracks block indentation. Each object node gets the 1-based line of its
//! first key. Block mappings, block sequences (including the compact `key:\n- item` form),
//! quoted keys, block scalars and flow collections spanning several lines are understood.
//! Anything the scanner cannot place is simply left unannotated.

use log::{debug, trace};
use std::collections::HashMap;

use crate::{
    node::Node,
    path::{Segment, StructuralPath},
};

struct Frame {
    indent: usize,
    segment: Segment,
}

/// Map of rendered object path to the line of its first key.
pub(crate) fn object_lines(src: &str) -> HashMap<String, usize> {
    let mut lines: HashMap<String, usize> = HashMap::new();
    let mut stack: Vec<Frame> = Vec::new();
    // Lines indented deeper than this belong to a block scalar
    let mut block_indent: Option<usize> = None;
    // Unclosed brackets of a flow collection spanning lines
    let mut flow_depth: i32 = 0;

    for (idx, raw) in src.lines().enumerate() {
        let line_no = idx + 1;

        if flow_depth > 0 {
            flow_depth += bracket_balance(raw);
            continue;
        }

        let trimmed = raw.trim_start_matches(' ');
        let indent = raw.len() - trimmed.len();
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(limit) = block_indent {
            if indent > limit {
                continue;
            }
            block_indent = None;
        }

        if indent == 0 && (trimmed.starts_with("---") || trimmed.starts_with("...")) {
            stack.clear();
            continue;
        }
        if indent == 0 && trimmed.starts_with('%') {
            continue;
        }

        let mut col = indent;
        let mut rest = trimmed;

        // Sequence item indicators, possibly several on one line (`- - a`)
        while rest == "-" || rest.starts_with("- ") {
            let mut next_index = 0;
            while let Some(top) = stack.last() {
                if top.indent > col {
                    stack.pop();
                } else if top.indent == col && matches!(top.segment, Segment::Index(_)) {
                    if let Some(Frame { segment: Segment::Index(i), .. }) = stack.pop() {
                        next_index = i + 1;
                    }
                } else {
                    break;
                }
            }
            stack.push(Frame { indent: col, segment: Segment::Index(next_index) });

            let after = &rest[1..];
            let stripped = after.trim_start_matches(' ');
            col += 1 + (after.len() - stripped.len());
            rest = stripped;
        }

        if rest.is_empty() {
            continue;
        }

        match split_key(rest) {
            Some((key, value)) => {
                while stack.last().is_some_and(|top| top.indent >= col) {
                    stack.pop();
                }
                let parent = render(&stack);
                trace!("Key '{}' at line {} under '{}'", key, line_no, parent);
                lines.entry(parent).or_insert(line_no);
                stack.push(Frame { indent: col, segment: Segment::Key(key) });

                let value = strip_comment(value.trim());
                if value.starts_with('|') || value.starts_with('>') {
                    block_indent = Some(col);
                } else if value.starts_with('{') || value.starts_with('[') {
                    if value.starts_with('{') {
                        lines.entry(render(&stack)).or_insert(line_no);
                    }
                    flow_depth = bracket_balance(value).max(0);
                }
            }
            None => {
                let value = strip_comment(rest);
                if value.starts_with('|') || value.starts_with('>') {
                    block_indent = Some(indent);
                } else if value.starts_with('{') || value.starts_with('[') {
                    if value.starts_with('{') {
                        lines.entry(render(&stack)).or_insert(line_no);
                    }
                    flow_depth = bracket_balance(value).max(0);
                }
            }
        }
    }

    debug!("Located {} object lines", lines.len());
    lines
}

/// Annotate every object node in `root` whose first key the scanner located in `src`.
///
/// Returns the number of objects annotated.
pub fn annotate_lines(root: &mut Node, src: &str) -> usize {
    let lines = object_lines(src);
    let mut path = StructuralPath::root();
    annotate(root, &mut path, &lines)
}

fn annotate(node: &mut Node, path: &mut StructuralPath, lines: &HashMap<String, usize>) -> usize {
    let mut count = 0;
    if node.is_object()
        && let Some(line) = lines.get(&path.to_string())
    {
        node.set_line(*line);
        count += 1;
    }

    match node {
        Node::Object(map) => {
            for (key, child) in map.iter_mut() {
                path.push_key(key);
                count += annotate(child, path, lines);
                path.pop();
            }
        }
        Node::Array(items) => {
            for (idx, child) in items.iter_mut().enumerate() {
                path.push_index(idx);
                count += annotate(child, path, lines);
                path.pop();
            }
        }
        Node::Scalar(_) => {}
    }
    count
}

fn render(stack: &[Frame]) -> String {
    StructuralPath::from(stack.iter().map(|f| f.segment.clone()).collect::<Vec<_>>()).to_string()
}

/// Split `key: value` into its key and the text after the colon.
fn split_key(rest: &str) -> Option<(String, &str)> {
    let (key, after) = match rest.chars().next()? {
        '"' => {
            let mut escaped = false;
            let mut end = None;
            for (i, c) in rest.char_indices().skip(1) {
                match c {
                    '\\' if !escaped => escaped = true,
                    '"' if !escaped => {
                        end = Some(i);
                        break;
                    }
                    _ => escaped = false,
                }
            }
            let end = end?;
            let key = rest[1..end].replace("\\\"", "\"").replace("\\\\", "\\");
            (key, rest[end + 1..].trim_start())
        }
        '\'' => {
            let bytes = rest.as_bytes();
            let mut i = 1;
            let end = loop {
                if i >= bytes.len() {
                    return None;
                }
                if bytes[i] == b'\'' {
                    if bytes.get(i + 1) == Some(&b'\'') {
                        i += 2;
                        continue;
                    }
                    break i;
                }
                i += 1;
            };
            (rest[1..end].replace("''", "'"), rest[end + 1..].trim_start())
        }
        '{' | '[' | '?' | '#' | '|' | '>' | '*' | '!' | '%' | '@' | '`' => return None,
        _ => {
            let bytes = rest.as_bytes();
            let mut pos = None;
            for (i, &b) in bytes.iter().enumerate() {
                if b == b'#' && i > 0 && bytes[i - 1] == b' ' {
                    return None;
                }
                if b == b':' && (i + 1 == bytes.len() || bytes[i + 1] == b' ') {
                    pos = Some(i);
                    break;
                }
            }
            let pos = pos?;
            return Some((rest[..pos].trim_end().to_string(), &rest[pos + 1..]));
        }
    };

    let value = after.strip_prefix(':')?;
    if !(value.is_empty() || value.starts_with(' ')) {
        return None;
    }
    Some((key, value))
}

fn strip_comment(value: &str) -> &str {
    if value.starts_with('#') { "" } else { value }
}

/// Opening minus closing brackets, ignoring quoted text.
fn bracket_balance(text: &str) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '{') | (None, '[') => depth += 1,
            (None, '}') | (None, ']') => depth -= 1,
            _ => {}
        }
    }
    depth
}

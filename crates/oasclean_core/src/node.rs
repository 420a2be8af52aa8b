use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::{
    constants::LINE_KEY,
    path::{Segment, StructuralPath},
};

/// A generic document tree: objects, arrays and scalars.
///
/// Object key order is preserved so a rewritten document reads like its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Object(IndexMap<String, Node>),
    Array(Vec<Node>),
    Scalar(Scalar),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            // Debug keeps the fractional part: `2.0` stays `2.0`, not `2`
            Scalar::Float(x) => write!(f, "{:?}", x),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

/// A YAML mapping key that has no string rendering (a sequence, mapping or tagged value).
#[derive(Debug, Error)]
#[error("unsupported mapping key: {0}")]
pub struct UnsupportedKey(pub String);

impl Node {
    pub fn object() -> Self {
        Node::Object(IndexMap::new())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Node::Object(_))
    }

    /// Child of an object by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Descendant at `path`, if every segment exists.
    pub fn get_path(&self, path: &StructuralPath) -> Option<&Node> {
        let mut current = self;
        for segment in path.segments() {
            current = match (current, segment) {
                (Node::Object(map), Segment::Key(key)) => map.get(key)?,
                (Node::Array(items), Segment::Index(idx)) => items.get(*idx)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Source line of an object node, if the loader annotated it.
    pub fn line(&self) -> Option<usize> {
        match self.get(LINE_KEY)? {
            Node::Scalar(Scalar::Int(line)) => usize::try_from(*line).ok(),
            _ => None,
        }
    }

    /// Annotate an object node with its source line. No-op for arrays and scalars.
    pub fn set_line(&mut self, line: usize) {
        if let Node::Object(map) = self {
            map.insert(LINE_KEY.to_string(), Node::Scalar(Scalar::Int(line as i64)));
        }
    }

    /// Remove every line annotation from this node and its descendants.
    ///
    /// Returns the number of annotations removed.
    pub fn strip_line_annotations(&mut self) -> usize {
        match self {
            Node::Object(map) => {
                let mut removed = usize::from(map.shift_remove(LINE_KEY).is_some());
                for child in map.values_mut() {
                    removed += child.strip_line_annotations();
                }
                removed
            }
            Node::Array(items) => items.iter_mut().map(Node::strip_line_annotations).sum(),
            Node::Scalar(_) => 0,
        }
    }

    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, UnsupportedKey> {
        use serde_yaml::Value;

        Ok(match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(yaml_number(&n)),
            Value::String(s) => Node::Scalar(Scalar::String(s)),
            Value::Sequence(items) => {
                Node::Array(items.into_iter().map(Node::from_yaml).collect::<Result<_, _>>()?)
            }
            Value::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    map.insert(yaml_key(key)?, Node::from_yaml(value)?);
                }
                Node::Object(map)
            }
            Value::Tagged(tagged) => Node::from_yaml(tagged.value)?,
        })
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else {
        // u64 beyond i64::MAX and real numbers
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, UnsupportedKey> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        other => Err(UnsupportedKey(format!("{:?}", other))),
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Node::Scalar(Scalar::String(s)),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(src: &str) -> Node {
        Node::from_yaml(serde_yaml::from_str(src).unwrap()).unwrap()
    }

    #[test]
    fn test_from_yaml_preserves_key_order() {
        let node = yaml("zeta: 1\nalpha: 2\nmid: 3\n");
        let keys: Vec<_> = node.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_yaml_stringifies_scalar_keys() {
        let node = yaml("responses:\n  200:\n    description: ok\n  true: yes\n");
        let responses = node.get("responses").unwrap();
        assert!(responses.get("200").is_some());
        assert!(responses.get("true").is_some());
    }

    #[test]
    fn test_from_yaml_rejects_sequence_keys() {
        let value: serde_yaml::Value = serde_yaml::from_str("? [a, b]\n: c\n").unwrap();
        assert!(Node::from_yaml(value).is_err());
    }

    #[test]
    fn test_scalar_display_keeps_float_fraction() {
        assert_eq!(Scalar::Float(2.0).to_string(), "2.0");
        assert_eq!(Scalar::Float(1.9).to_string(), "1.9");
        assert_eq!(Scalar::String("3.0.0".into()).to_string(), "3.0.0");
    }

    #[test]
    fn test_from_json_matches_from_yaml() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"openapi": "3.0.0", "tags": [{"name": "a"}], "n": 1.5}"#)
                .unwrap();
        let from_yaml = yaml("openapi: 3.0.0\ntags:\n  - name: a\nn: 1.5\n");
        assert_eq!(Node::from(json), from_yaml);
    }

    #[test]
    fn test_line_annotations_round_trip() {
        let mut node = yaml("a:\n  b:\n    c: 1\n");
        node.set_line(1);
        node.as_object_mut().unwrap().get_mut("a").unwrap().set_line(2);
        assert_eq!(node.line(), Some(1));
        assert_eq!(node.get("a").unwrap().line(), Some(2));
        assert_eq!(node.get("a").unwrap().get("b").unwrap().line(), None);

        assert_eq!(node.strip_line_annotations(), 2);
        assert_eq!(node, yaml("a:\n  b:\n    c: 1\n"));
    }

    #[test]
    fn test_get_path_walks_objects_and_arrays() {
        let node = yaml("tags:\n  - name: first\n  - name: second\n");
        let path = StructuralPath::root().child_key("tags").child_index(1).child_key("name");
        assert_eq!(node.get_path(&path).and_then(Node::as_str), Some("second"));
        let missing = StructuralPath::root().child_key("tags").child_key("name");
        assert!(node.get_path(&missing).is_none());
    }

    #[test]
    fn test_serializes_without_variant_tags() {
        let node = yaml("a: [1, true, null, text]\n");
        assert_eq!(serde_json::to_string(&node).unwrap(), r#"{"a":[1,true,null,"text"]}"#);
    }
}

use indexmap::IndexMap;
use log::{debug, trace};
use oasclean_core::{LINE_KEY, Node, Scalar, StructuralPath};
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

use crate::{dialect::Dialect, error::AnalysisError};

/// Key whose string value points at another node
pub const REF_KEY: &str = "$ref";

/// A reference naming another YAML document, possibly followed by a path into it
static REMOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?P<document>[^#]+?\.(?:ya?ml|json))").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A node at a declaration path, or the target of a reference
    Component,
    /// A node holding a `$ref`
    Referrer,
}

/// One node of the reference graph, keyed by its structural path.
#[derive(Debug, Clone, Serialize)]
pub struct GraphEntry {
    pub kind: EntryKind,
    pub path: String,
    pub line: Option<usize>,
    /// Visited as a declaration, not just named by a dangling reference
    pub declared: bool,
    /// Component this node sits inside. Never the node's own path.
    pub owning_component: Option<String>,
    /// Target of this node's `$ref`
    pub referent_path: Option<String>,
    /// Nodes whose `$ref` points here
    pub referrers: BTreeSet<String>,
    /// Memoized reachability
    #[serde(skip)]
    pub required: Option<bool>,
}

impl GraphEntry {
    fn new(path: &str, kind: EntryKind) -> Self {
        Self {
            kind,
            path: path.to_string(),
            line: None,
            declared: false,
            owning_component: None,
            referent_path: None,
            referrers: BTreeSet::new(),
            required: None,
        }
    }

    fn declare(&mut self, line: Option<usize>) {
        self.declared = true;
        if line.is_some() {
            self.line = line;
        }
    }

    pub fn is_component(&self) -> bool {
        self.kind == EntryKind::Component
    }
}

/// Every component and referrer of a document, with both directions of each reference.
#[derive(Debug, Clone)]
pub struct ReferenceGraph {
    pub(crate) dialect: Dialect,
    /// Discovery order
    pub(crate) entries: IndexMap<String, GraphEntry>,
    pub(crate) referrers_by_target: BTreeMap<String, BTreeSet<String>>,
}

impl ReferenceGraph {
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn entries(&self) -> impl Iterator<Item = &GraphEntry> {
        self.entries.values()
    }

    pub fn entry(&self, path: &str) -> Option<&GraphEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &GraphEntry> {
        self.entries.values().filter(|e| e.is_component())
    }

    /// Paths of every node whose `$ref` targets `path`.
    pub fn referrers_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.referrers_by_target.get(path)
    }
}

/// Where a `$ref` value points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reference {
    /// Structural path within the same document
    Local(String),
    /// Anything outside it
    Remote { document: String },
}

/// Classify a `$ref` value and decode a local fragment into a structural path.
///
/// `#/components/schemas/a~1b` becomes `/components/schemas/a/b`. Each segment is
/// percent-decoded, then `~1` and `~0` are decoded, so the result matches the path the builder
/// renders for that node.
pub(crate) fn parse_reference(value: &str) -> Reference {
    if let Some(fragment) = value.strip_prefix('#') {
        let path = fragment
            .split('/')
            .skip(1)
            .map(decode_pointer_segment)
            .fold(String::new(), |mut acc, seg| {
                acc.push('/');
                acc.push_str(&seg);
                acc
            });
        return Reference::Local(path);
    }

    let document = match REMOTE_RE.captures(value) {
        Some(caps) => caps["document"].to_string(),
        None => value.split('#').next().unwrap_or(value).to_string(),
    };
    Reference::Remote { document }
}

fn decode_pointer_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().replace("~1", "/").replace("~0", "~")
}

/// Single-pass walk of a document that records components, referrers and their links.
pub struct GraphBuilder {
    dialect: Dialect,
    entries: IndexMap<String, GraphEntry>,
    referrers_by_target: BTreeMap<String, BTreeSet<String>>,
}

impl GraphBuilder {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect, entries: IndexMap::new(), referrers_by_target: BTreeMap::new() }
    }

    pub fn build(mut self, root: &Node) -> Result<ReferenceGraph, AnalysisError> {
        debug!("Building {} reference graph", self.dialect);
        let mut path = StructuralPath::root();
        self.visit(root, &mut path, None)?;
        debug!(
            "Graph has {} entries, {} reference targets",
            self.entries.len(),
            self.referrers_by_target.len()
        );
        Ok(ReferenceGraph {
            dialect: self.dialect,
            entries: self.entries,
            referrers_by_target: self.referrers_by_target,
        })
    }

    fn visit(
        &mut self,
        node: &Node,
        path: &mut StructuralPath,
        owner: Option<&str>,
    ) -> Result<(), AnalysisError> {
        match node {
            Node::Object(map) => {
                let node_path = path.to_string();
                let line = node.line();

                let at_declaration = self.dialect.is_declaration(path);
                let owner = if at_declaration {
                    Some(self.declare_component(&node_path, line, owner)?)
                } else {
                    owner.map(str::to_string)
                };

                let mut has_ref = false;
                if let Some(Node::Scalar(Scalar::String(value))) = map.get(REF_KEY) {
                    self.add_reference(&node_path, line, value, owner.as_deref(), at_declaration)?;
                    has_ref = true;
                }

                for (key, child) in map {
                    if key == LINE_KEY || (key == REF_KEY && has_ref) {
                        continue;
                    }
                    path.push_key(key);
                    self.visit(child, path, owner.as_deref())?;
                    path.pop();
                }
            }
            Node::Array(items) => {
                for (idx, child) in items.iter().enumerate() {
                    path.push_index(idx);
                    self.visit(child, path, owner)?;
                    path.pop();
                }
            }
            Node::Scalar(_) => {}
        }
        Ok(())
    }

    /// Record the declaration at `path` and return it as the owner for its subtree.
    fn declare_component(
        &mut self,
        path: &str,
        line: Option<usize>,
        owner: Option<&str>,
    ) -> Result<String, AnalysisError> {
        if let Some(outer) = owner {
            return Err(AnalysisError::NestedComponent {
                path: path.to_string(),
                owner: outer.to_string(),
                line,
            });
        }
        trace!("Component declared at {}", path);
        self.get_or_create(path, EntryKind::Component).declare(line);
        Ok(path.to_string())
    }

    fn add_reference(
        &mut self,
        path: &str,
        line: Option<usize>,
        value: &str,
        owner: Option<&str>,
        at_declaration: bool,
    ) -> Result<(), AnalysisError> {
        let target = match parse_reference(value) {
            Reference::Local(target) => target,
            Reference::Remote { document } => {
                return Err(AnalysisError::UnsupportedReference {
                    path: path.to_string(),
                    reference: value.to_string(),
                    document,
                    line,
                });
            }
        };
        trace!("{} -> {}", path, target);

        let referrer = self.get_or_create(path, EntryKind::Referrer);
        // An earlier reference may have created this entry as a target. Outside the
        // declaration sections it is live structure, never a component.
        if !at_declaration {
            referrer.kind = EntryKind::Referrer;
        }
        referrer.declare(line);
        referrer.referent_path = Some(target.clone());
        if let Some(owner) = owner
            && owner != path
        {
            referrer.owning_component = Some(owner.to_string());
        }

        self.get_or_create(&target, EntryKind::Component).referrers.insert(path.to_string());
        self.referrers_by_target.entry(target).or_default().insert(path.to_string());
        Ok(())
    }

    /// An existing entry keeps its kind unless the caller changes it.
    fn get_or_create(&mut self, path: &str, kind: EntryKind) -> &mut GraphEntry {
        self.entries.entry(path.to_string()).or_insert_with(|| GraphEntry::new(path, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasclean_core::{Format, parse};
    use pretty_assertions::assert_eq;

    fn build(text: &str) -> Result<ReferenceGraph, AnalysisError> {
        let root = parse(text, Format::Yaml).unwrap();
        GraphBuilder::new(Dialect::detect(&root)?).build(&root)
    }

    const DOC: &str = r#"openapi: 3.0.0
paths:
  /pets:
    get:
      parameters:
        - $ref: '#/components/parameters/limit'
      responses:
        '200':
          $ref: '#/components/responses/PetList'
components:
  parameters:
    limit:
      name: limit
      in: query
  responses:
    PetList:
      description: pets
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Pet'
  schemas:
    Pet:
      type: object
"#;

    #[test]
    fn test_parse_reference() {
        assert_eq!(
            parse_reference("#/components/schemas/Pet"),
            Reference::Local("/components/schemas/Pet".into())
        );
        assert_eq!(
            parse_reference("#/paths/~1pets/get"),
            Reference::Local("/paths//pets/get".into())
        );
        assert_eq!(
            parse_reference("#/definitions/a~0b"),
            Reference::Local("/definitions/a~b".into())
        );
        assert_eq!(parse_reference("#"), Reference::Local(String::new()));
        assert_eq!(
            parse_reference("#/components/schemas/Pet%20Info"),
            Reference::Local("/components/schemas/Pet Info".into())
        );
        assert_eq!(
            parse_reference("#/paths/%7E1pets"),
            Reference::Local("/paths//pets".into())
        );
        assert_eq!(
            parse_reference("../floob.yaml/components/requestBodies/x"),
            Reference::Remote { document: "../floob.yaml".into() }
        );
        assert_eq!(
            parse_reference("common.JSON#/definitions/Error"),
            Reference::Remote { document: "common.JSON".into() }
        );
        assert_eq!(parse_reference("Pet"), Reference::Remote { document: "Pet".into() });
    }

    #[test]
    fn test_builds_components_and_referrers() {
        let graph = build(DOC).unwrap();

        let limit = graph.entry("/components/parameters/limit").unwrap();
        assert_eq!(limit.kind, EntryKind::Component);
        assert!(limit.declared);
        assert_eq!(limit.line, Some(13));
        assert_eq!(
            limit.referrers.iter().cloned().collect::<Vec<_>>(),
            vec!["/paths//pets/get/parameters/0".to_string()]
        );

        let param_ref = graph.entry("/paths//pets/get/parameters/0").unwrap();
        assert_eq!(param_ref.kind, EntryKind::Referrer);
        assert_eq!(param_ref.owning_component, None);
        assert_eq!(param_ref.referent_path.as_deref(), Some("/components/parameters/limit"));
        assert_eq!(param_ref.line, Some(6));

        let schema_ref =
            graph.entry("/components/responses/PetList/content/application/json/schema").unwrap();
        assert_eq!(schema_ref.owning_component.as_deref(), Some("/components/responses/PetList"));

        assert_eq!(graph.components().count(), 3);
        assert_eq!(graph.referrers_of("/components/schemas/Pet").map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_dangling_reference_creates_undeclared_component() {
        let graph = build(
            "openapi: 3.0.0\npaths:\n  /a:\n    get:\n      responses:\n        '404':\n          $ref: '#/components/responses/Missing'\n",
        )
        .unwrap();
        let missing = graph.entry("/components/responses/Missing").unwrap();
        assert_eq!(missing.kind, EntryKind::Component);
        assert!(!missing.declared);
        assert_eq!(missing.line, None);
        assert_eq!(missing.referrers.len(), 1);
    }

    #[test]
    fn test_component_that_is_itself_a_reference() {
        let graph = build(
            "openapi: 3.0.0\ncomponents:\n  schemas:\n    Alias:\n      $ref: '#/components/schemas/Pet'\n    Pet:\n      type: string\n",
        )
        .unwrap();
        let alias = graph.entry("/components/schemas/Alias").unwrap();
        assert_eq!(alias.kind, EntryKind::Component);
        assert!(alias.declared);
        assert_eq!(alias.owning_component, None);
        assert_eq!(alias.referent_path.as_deref(), Some("/components/schemas/Pet"));
    }

    #[test]
    fn test_referenced_live_node_stays_a_referrer() {
        let graph = build(
            "openapi: 3.0.0\ncomponents:\n  schemas:\n    Dead:\n      items:\n        $ref: '#/paths/~1b/get'\npaths:\n  /b:\n    get:\n      $ref: '#/components/schemas/Dead'\n",
        )
        .unwrap();
        let get = graph.entry("/paths//b/get").unwrap();
        assert_eq!(get.kind, EntryKind::Referrer);
        assert_eq!(get.owning_component, None);
        assert_eq!(get.referrers.len(), 1);
        assert_eq!(graph.components().count(), 1);
    }

    #[test]
    fn test_remote_reference_is_rejected() {
        let err = build(
            "openapi: 3.0.0\npaths:\n  /wibble:\n    post:\n      requestBody:\n        $ref: '../floob.yaml/components/requestBodies/x'\n",
        )
        .unwrap_err();
        match err {
            AnalysisError::UnsupportedReference { path, document, line, .. } => {
                assert_eq!(path, "/paths//wibble/post/requestBody");
                assert_eq!(document, "../floob.yaml");
                assert_eq!(line, Some(6));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_string_ref_is_ordinary_data() {
        let graph = build(
            "openapi: 3.0.0\ncomponents:\n  schemas:\n    Weird:\n      properties:\n        $ref:\n          type: string\n",
        )
        .unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.entry("/components/schemas/Weird/properties").is_none());
    }

    #[test]
    fn test_v2_paths() {
        let graph = build(
            "swagger: '2.0'\npaths:\n  /pets:\n    get:\n      responses:\n        '200':\n          schema:\n            $ref: '#/definitions/Pet'\ndefinitions:\n  Pet:\n    type: object\n",
        )
        .unwrap();
        let pet = graph.entry("/definitions/Pet").unwrap();
        assert!(pet.declared);
        assert_eq!(pet.referrers.len(), 1);
    }

    #[test]
    fn test_nested_declaration_is_rejected() {
        let mut builder = GraphBuilder::new(Dialect::V3);
        let err = builder
            .declare_component(
                "/components/schemas/Inner",
                Some(4),
                Some("/components/schemas/Outer"),
            )
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NestedComponent { line: Some(4), .. }));
        assert!(builder.entries.is_empty());
    }
}

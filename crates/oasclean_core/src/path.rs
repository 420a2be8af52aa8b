use std::fmt;

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// Ordered keys/indices from the document root to a node.
///
/// Rendered as a `/`-joined string, e.g. `/components/schemas/Pet`. The root renders as the
/// empty string. Keys are written verbatim, so `/pets` under `paths` renders as
/// `/paths//pets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuralPath {
    segments: Vec<Segment>,
}

impl StructuralPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push_key(&mut self, key: &str) {
        self.segments.push(Segment::Key(key.to_string()));
    }

    pub fn push_index(&mut self, idx: usize) {
        self.segments.push(Segment::Index(idx));
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// Key at `idx`, if that segment is a key.
    pub fn key_at(&self, idx: usize) -> Option<&str> {
        match self.segments.get(idx) {
            Some(Segment::Key(key)) => Some(key.as_str()),
            _ => None,
        }
    }

    /// Path of a child key, leaving `self` untouched.
    pub fn child_key(&self, key: &str) -> Self {
        let mut child = self.clone();
        child.push_key(key);
        child
    }

    /// Path of a child index, leaving `self` untouched.
    pub fn child_index(&self, idx: usize) -> Self {
        let mut child = self.clone();
        child.push_index(idx);
        child
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<Vec<Segment>> for StructuralPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

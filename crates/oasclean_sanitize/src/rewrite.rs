use log::{debug, trace};
use oasclean_core::{LINE_KEY, Node, StructuralPath};
use serde::Serialize;
use std::collections::BTreeSet;

/// What happens to an unused component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteMode {
    /// Set `<name>: true` on the component and keep it
    Tag(String),
    /// Remove the component from its parent
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub tagged: usize,
    pub deleted: usize,
    pub annotations_stripped: usize,
}

/// Tag or delete every object node whose structural path is in `unused`, then strip all line
/// annotations so the tree is ready to be written out.
pub fn rewrite(root: &mut Node, unused: &BTreeSet<String>, mode: &RewriteMode) -> RewriteStats {
    debug!("Rewriting {} unused components ({:?})", unused.len(), mode);
    let mut stats = RewriteStats::default();
    let mut path = StructuralPath::root();
    visit(root, &mut path, unused, mode, &mut stats);
    stats.annotations_stripped = root.strip_line_annotations();
    debug!(
        "Tagged {}, deleted {}, stripped {} line annotations",
        stats.tagged, stats.deleted, stats.annotations_stripped
    );
    stats
}

/// Applies the mode to `node` if it matches. Returns true when the node must be removed.
fn apply(
    node: &mut Node,
    path: &StructuralPath,
    mode: &RewriteMode,
    stats: &mut RewriteStats,
) -> bool {
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    match mode {
        RewriteMode::Tag(name) => {
            trace!("Tagging {}", path);
            map.insert(name.clone(), Node::bool(true));
            stats.tagged += 1;
            false
        }
        RewriteMode::Delete => {
            trace!("Deleting {}", path);
            stats.deleted += 1;
            true
        }
    }
}

fn visit(
    node: &mut Node,
    path: &mut StructuralPath,
    unused: &BTreeSet<String>,
    mode: &RewriteMode,
    stats: &mut RewriteStats,
) {
    match node {
        Node::Object(map) => {
            let mut doomed: Vec<String> = Vec::new();
            for (key, child) in map.iter_mut() {
                if key == LINE_KEY {
                    continue;
                }
                path.push_key(key);
                if unused.contains(&path.to_string()) && apply(child, path, mode, stats) {
                    doomed.push(key.clone());
                } else {
                    visit(child, path, unused, mode, stats);
                }
                path.pop();
            }
            for key in doomed {
                map.shift_remove(&key);
            }
        }
        Node::Array(items) => {
            let mut doomed: Vec<usize> = Vec::new();
            for (idx, child) in items.iter_mut().enumerate() {
                path.push_index(idx);
                if unused.contains(&path.to_string()) && apply(child, path, mode, stats) {
                    doomed.push(idx);
                } else {
                    visit(child, path, unused, mode, stats);
                }
                path.pop();
            }
            for idx in doomed.into_iter().rev() {
                items.remove(idx);
            }
        }
        Node::Scalar(_) => {}
    }
}

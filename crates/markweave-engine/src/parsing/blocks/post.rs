//! Post-match rewrites and the meta pre-pass.

use log::debug;

use crate::parsing::{content::NodePoint, registry::Registry};

use super::types::{BlockToken, BlockTree, TokenId};

/// Lets every post-match recognizer rewrite each container's child run,
/// deepest containers first.
pub fn post_match(tree: &mut BlockTree, registry: &Registry, points: &[NodePoint]) {
    let root = tree.root();
    transform(tree, root, registry, points);
}

fn transform(tree: &mut BlockTree, id: TokenId, registry: &Registry, points: &[NodePoint]) {
    let children = tree[id].children.clone();
    for child in children {
        if tree[child].containing {
            transform(tree, child, registry, points);
        }
    }

    let mut siblings = std::mem::take(&mut tree[id].children);
    for &index in registry.block_post_match() {
        siblings = registry
            .block(index)
            .transform_siblings(siblings, tree, points);
    }
    tree[id].children = siblings;
}

/// Builds the document-level lookup tables from out-of-flow tokens.
///
/// Each meta recognizer receives its tokens in document order; its result
/// is stored in [`BlockTree::meta`] under the recognizer's name.
pub fn collect_meta(tree: &mut BlockTree, registry: &Registry) {
    let order = tree.descendants(tree.root());
    for &index in registry.block_meta() {
        let recognizer = registry.block(index);
        let types = recognizer.node_types();
        let tokens: Vec<&BlockToken> = order
            .iter()
            .map(|&id| &tree[id])
            .filter(|t| types.contains(&t.node_type))
            .collect();
        let count = tokens.len();
        if let Some(value) = recognizer.parse_meta(&tokens) {
            debug!("meta `{}` built from {count} tokens", recognizer.name());
            tree.meta.insert_boxed(recognizer.name(), value);
        }
    }
}

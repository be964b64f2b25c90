//! Resolver helpers shared by merge-extensions and `Omit` evaluation (§4.7).

use tsdoc_model::{Node, NodeKind};

use crate::ctx::LinkCtx;

/// Collapses `link` (via the node table, then dependencies), `application`
/// (to its `base`), and `alias` (to its `value`) transitively until a
/// concrete node is reached or no further collapse is possible.
pub fn resolve_value(node: &Node, ctx: &LinkCtx) -> Node {
    let mut current = node.clone();
    loop {
        current = match &current.kind {
            NodeKind::Link { id } => match ctx.lookup_link(id) {
                Some(next) => next,
                None => return current,
            },
            NodeKind::Application { base, .. } => (**base).clone(),
            NodeKind::Alias { value, .. } => (**value).clone(),
            _ => return current,
        };
    }
}

/// Flattens nested unions reached via aliases and links into a flat
/// sequence, leaving embedded non-string elements unchanged.
pub fn resolve_union_elements(node: &Node, ctx: &LinkCtx) -> Vec<Node> {
    let resolved = resolve_value(node, ctx);
    match &resolved.kind {
        NodeKind::Union { elements } => elements
            .iter()
            .flat_map(|e| resolve_union_elements(e, ctx))
            .collect(),
        _ => vec![resolved],
    }
}

//! **merge-extensions** (§4.6): flattens an interface's resolved
//! extensions into its own property map, most-derived wins, tracking
//! `inheritedFrom`.

use indexmap::IndexMap;
use tsdoc_model::{Node, NodeKind};

use crate::ctx::LinkCtx;
use crate::resolve::resolve_value;

/// `extends` entries that resolved to an interface are merged away
/// entirely; anything else (an unresolved reference, a cross-file
/// interface left as a `link`) remains in the returned `extends` list.
pub fn merge_extensions(
    extends: Vec<Node>,
    own_properties: IndexMap<String, Node>,
    ctx: &LinkCtx,
) -> (Vec<Node>, IndexMap<String, Node>) {
    let mut merged = IndexMap::new();
    let mut remaining = Vec::new();

    for ext in extends {
        let resolved = resolve_value(&ext, ctx);
        match &resolved.kind {
            NodeKind::Interface {
                properties: ext_props,
                ..
            } => {
                let source_id = resolved.link_id().cloned();
                for (name, prop) in ext_props {
                    merged.entry(name.clone()).or_insert_with(|| {
                        attach_inherited_from(prop.clone(), source_id.clone())
                    });
                }
            }
            _ => remaining.push(ext),
        }
    }

    for (name, prop) in own_properties {
        merged.insert(name, prop);
    }

    (remaining, merged)
}

fn attach_inherited_from(mut node: Node, source_id: Option<tsdoc_common::NodeId>) -> Node {
    match &mut node.kind {
        NodeKind::Property { inherited_from, .. } | NodeKind::Method { inherited_from, .. } => {
            if inherited_from.is_none() {
                *inherited_from = source_id;
            }
        }
        _ => {}
    }
    node
}

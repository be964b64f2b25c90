//! Pass B: link collection (§4.6). Walks the Pass-A output once more,
//! saving every `link` target and every `inheritedFrom` source into the
//! output's `links` map. Already-saved ids are not re-expanded, which is
//! what keeps a circular reference graph from looping here.

use indexmap::IndexMap;
use tsdoc_common::NodeId;
use tsdoc_model::{Node, NodeKind, TemplatePiece};

use crate::ctx::LinkCtx;

pub fn collect_links(roots: &[&Node], ctx: &LinkCtx) -> IndexMap<NodeId, Node> {
    let mut links = IndexMap::new();
    for root in roots {
        visit(root, ctx, &mut links);
    }
    links
}

fn save(id: &NodeId, ctx: &LinkCtx, links: &mut IndexMap<NodeId, Node>) {
    if links.contains_key(id) {
        return;
    }
    let Some(node) = ctx.lookup_link(id) else {
        return;
    };
    links.insert(id.clone(), node.clone());
    visit(&node, ctx, links);
}

fn visit(node: &Node, ctx: &LinkCtx, links: &mut IndexMap<NodeId, Node>) {
    match &node.kind {
        NodeKind::Link { id } => save(id, ctx, links),
        NodeKind::Array { element_type } => visit(element_type, ctx, links),
        NodeKind::Tuple { elements } | NodeKind::Union { elements } => {
            for e in elements {
                visit(e, ctx, links);
            }
        }
        NodeKind::Intersection { types } => {
            for t in types {
                visit(t, ctx, links);
            }
        }
        NodeKind::Template { elements } => {
            for piece in elements {
                if let TemplatePiece::Expr(e) = piece {
                    visit(e, ctx, links);
                }
            }
        }
        NodeKind::TypeParameter { constraint, default, .. } => {
            if let Some(c) = constraint {
                visit(c, ctx, links);
            }
            if let Some(d) = default {
                visit(d, ctx, links);
            }
        }
        NodeKind::Parameter { value, .. } => visit(value, ctx, links),
        NodeKind::Interface {
            extends,
            properties,
            type_parameters,
            ..
        } => {
            for e in extends {
                visit(e, ctx, links);
            }
            for p in properties.values() {
                visit(p, ctx, links);
            }
            for tp in type_parameters {
                visit(tp, ctx, links);
            }
        }
        NodeKind::Object { properties } => {
            for p in properties.values() {
                visit(p, ctx, links);
            }
        }
        NodeKind::Property {
            value,
            index_type,
            inherited_from,
            ..
        } => {
            visit(value, ctx, links);
            if let Some(idx) = index_type {
                visit(idx, ctx, links);
            }
            if let Some(src) = inherited_from {
                save(src, ctx, links);
            }
        }
        NodeKind::Method {
            value,
            inherited_from,
            ..
        } => {
            visit(value, ctx, links);
            if let Some(src) = inherited_from {
                save(src, ctx, links);
            }
        }
        NodeKind::Function {
            parameters,
            return_type,
            type_parameters,
            ..
        } => {
            for p in parameters {
                visit(p, ctx, links);
            }
            visit(return_type, ctx, links);
            for tp in type_parameters {
                visit(tp, ctx, links);
            }
        }
        NodeKind::Component {
            props,
            component_ref,
            type_parameters,
            ..
        } => {
            if let Some(p) = props {
                visit(p, ctx, links);
            }
            if let Some(r) = component_ref {
                visit(r, ctx, links);
            }
            for tp in type_parameters {
                visit(tp, ctx, links);
            }
        }
        NodeKind::Application { base, type_parameters } => {
            visit(base, ctx, links);
            for tp in type_parameters {
                visit(tp, ctx, links);
            }
        }
        NodeKind::Alias {
            value,
            type_parameters,
            ..
        } => {
            visit(value, ctx, links);
            for tp in type_parameters {
                visit(tp, ctx, links);
            }
        }
        NodeKind::TypeOperator { value, .. } => visit(value, ctx, links),
        NodeKind::Keyof { operand } => visit(operand, ctx, links),
        NodeKind::Conditional {
            check_type,
            extends_type,
            true_type,
            false_type,
        } => {
            visit(check_type, ctx, links);
            visit(extends_type, ctx, links);
            visit(true_type, ctx, links);
            visit(false_type, ctx, links);
        }
        NodeKind::IndexedAccess { object_type, index_type } => {
            visit(object_type, ctx, links);
            visit(index_type, ctx, links);
        }
        NodeKind::Any
        | NodeKind::Null
        | NodeKind::Undefined
        | NodeKind::Void
        | NodeKind::Unknown
        | NodeKind::Never
        | NodeKind::This
        | NodeKind::Symbol
        | NodeKind::Boolean { .. }
        | NodeKind::String { .. }
        | NodeKind::Number { .. }
        | NodeKind::Enum { .. }
        | NodeKind::EnumMember { .. }
        | NodeKind::Identifier { .. }
        | NodeKind::Reference { .. } => {}
    }
}

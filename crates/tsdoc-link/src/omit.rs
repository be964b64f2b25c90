//! `Omit<T, K>` evaluation (§4.6 rule 4).

use std::collections::HashSet;

use indexmap::IndexMap;
use tsdoc_model::{Node, NodeKind};

use crate::ctx::LinkCtx;
use crate::resolve::{resolve_union_elements, resolve_value};

/// Evaluates `Omit<T, K>` given its already-walked type arguments. Returns
/// `T` unchanged when `T` does not resolve to an `interface`/`object`
/// (§7 "`Omit` applied to a non-object type").
pub fn evaluate_omit(args: &[Node], ctx: &LinkCtx) -> Node {
    let Some(t) = args.first() else {
        return Node::new(NodeKind::Any);
    };
    let resolved_t = resolve_value(t, ctx);
    let properties = match &resolved_t.kind {
        NodeKind::Interface { properties, .. } | NodeKind::Object { properties } => {
            properties.clone()
        }
        _ => return t.clone(),
    };

    let keys: HashSet<String> = args
        .get(1)
        .map(|k| {
            resolve_union_elements(k, ctx)
                .into_iter()
                .filter_map(|n| match n.kind {
                    NodeKind::String { value: Some(v) } => Some(v),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let filtered: IndexMap<String, Node> = properties
        .into_iter()
        .filter(|(name, _)| !keys.contains(name))
        .collect();

    match resolved_t.kind {
        NodeKind::Interface {
            id,
            name,
            extends,
            type_parameters,
            ..
        } => Node::new(NodeKind::Interface {
            id,
            name,
            extends,
            properties: filtered,
            type_parameters,
        }),
        NodeKind::Object { .. } => Node::new(NodeKind::Object {
            properties: filtered,
        }),
        _ => unreachable!("checked above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use tsdoc_model::Asset;

    fn prop(name: &str, value: NodeKind) -> Node {
        Node::new(NodeKind::Property {
            name: name.to_string(),
            value: Box::new(Node::new(value)),
            optional: false,
            index_type: None,
            inherited_from: None,
        })
    }

    #[test]
    fn removes_listed_keys() {
        let mut properties = IndexMap::new();
        properties.insert("foo".to_string(), prop("foo", NodeKind::String { value: None }));
        properties.insert("bar".to_string(), prop("bar", NodeKind::String { value: None }));
        let base = Node::new(NodeKind::Object { properties });
        let keys = Node::new(NodeKind::String {
            value: Some("bar".to_string()),
        });

        let locals = IndexMap::new();
        let deps = IndexMap::<String, Asset>::new();
        let ctx = LinkCtx::new(&locals, &deps);
        let result = evaluate_omit(&[base, keys], &ctx);
        match result.kind {
            NodeKind::Object { properties } => {
                assert!(properties.contains_key("foo"));
                assert!(!properties.contains_key("bar"));
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn non_object_base_is_returned_unchanged() {
        let base = Node::new(NodeKind::String { value: None });
        let locals = IndexMap::new();
        let deps = IndexMap::<String, Asset>::new();
        let ctx = LinkCtx::new(&locals, &deps);
        let result = evaluate_omit(&[base.clone()], &ctx);
        assert_eq!(result, base);
    }
}

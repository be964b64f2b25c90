//! Linker / Partial Evaluator (§4.6).
//!
//! Input: the raw, transformer-produced export tree for one file plus the
//! already-linked [`Asset`]s of its direct dependencies. Output: a fully
//! linked `{exports, links}` pair — no `reference` nodes remain, every
//! `link { id }` is backed by an entry in `links` (or the referenced
//! declaration is genuinely missing, §7).
//!
//! Two traversals, matching §4.6: Pass A ([`walk`] and friends) resolves
//! references, instantiates generic applications, evaluates `Omit`, and
//! flattens interface inheritance ([`merge`]); Pass B ([`collect`]) walks
//! the Pass-A result once more to populate the `links` map.

mod collect;
mod ctx;
mod merge;
mod omit;
mod resolve;

use std::collections::HashMap;

use indexmap::IndexMap;
use tsdoc_common::NodeId;
use tsdoc_model::{Asset, Node, NodeKind, TypeOperatorKind};

pub use ctx::LinkCtx;
pub use resolve::{resolve_union_elements, resolve_value};

/// Links one file's raw export tree against its dependencies, producing
/// the `exports`/`links` half of an [`Asset`] (§4.6). `locals` is every
/// top-level declaration the orchestrator transformed for this file, by
/// local name — a superset of what is publicly exported, used to resolve
/// same-file `reference` nodes (§4.6 rule 1's "falls back to the primary
/// asset"). `dependencies` are already-linked `Asset`s for this file's
/// imports, keyed by the import specifier string as written here.
pub fn link(
    exports: IndexMap<String, Node>,
    locals: &IndexMap<String, Node>,
    dependencies: &IndexMap<String, Asset>,
) -> (IndexMap<String, Node>, IndexMap<NodeId, Node>) {
    let mut link_ctx = LinkCtx::new(locals, dependencies);
    let mut linked_exports = IndexMap::new();

    for (name, node) in exports {
        let frame = root_frame(&node);
        if let Some(frame) = frame {
            link_ctx.param_stack.push(frame);
        }
        let linked = walk(&node, &mut link_ctx);
        if !link_ctx.param_stack.is_empty() {
            link_ctx.param_stack.pop();
        }
        linked_exports.insert(name, linked);
    }

    let roots: Vec<&Node> = linked_exports.values().collect();
    let links = collect::collect_links(&roots, &link_ctx);

    (linked_exports, links)
}

/// §4.6 rule 3: at the root of an export (empty key stack), a root-level
/// `alias`/`interface`/`component` with type parameters gets each bound to
/// its own `constraint` (when present), so the merged body reads as e.g.
/// `T extends DateValue` resolved to `DateValue` rather than a bare `T`.
fn root_frame(node: &Node) -> Option<HashMap<String, Node>> {
    let type_parameters = node.type_parameters()?;
    if type_parameters.is_empty() {
        return None;
    }
    let mut frame = HashMap::new();
    for tp in type_parameters {
        if let NodeKind::TypeParameter { name, constraint, .. } = &tp.kind {
            if let Some(c) = constraint {
                frame.insert(name.clone(), (**c).clone());
            }
        }
    }
    if frame.is_empty() {
        None
    } else {
        Some(frame)
    }
}

/// Follows a `reference` node to the concrete declaration it names,
/// without performing any of the rest of Pass A on it yet (§4.6 rule 1).
/// A same-file reference (empty `specifier`) is looked up in `locals`; an
/// unresolvable reference (missing dependency, name absent from either
/// map) resynthesizes a bare `identifier`.
fn resolve_reference_chain(node: &Node, ctx: &LinkCtx) -> Node {
    match &node.kind {
        NodeKind::Reference {
            local,
            imported,
            specifier,
        } => {
            let target = if specifier.is_empty() {
                ctx.local(imported)
            } else {
                ctx.dependency_export(specifier, imported)
            };
            match target {
                Some(next) => resolve_reference_chain(&next, ctx),
                None => Node::new(NodeKind::Identifier { name: local.clone() }),
            }
        }
        _ => node.clone(),
    }
}

/// Pass A's recursive rewrite (§4.6). Dispatches on node kind; most
/// variants simply recurse into their children, tracking the key-stack
/// path as they go (`ctx::LinkCtx::push_key`/`pop_key`).
fn walk(node: &Node, ctx: &mut LinkCtx) -> Node {
    match &node.kind {
        NodeKind::Reference { .. } => {
            let resolved = resolve_reference_chain(node, ctx);
            walk(&resolved, ctx)
        }
        NodeKind::Application { base, type_parameters } => walk_application(base, type_parameters, ctx),
        NodeKind::Identifier { name } => ctx.bound_param(name).cloned().unwrap_or_else(|| node.clone()),
        NodeKind::Interface {
            id,
            name,
            extends,
            properties,
            type_parameters,
        } => walk_interface(id.clone(), name.clone(), extends.clone(), properties.clone(), type_parameters.clone(), ctx),
        NodeKind::Alias {
            id,
            name,
            value,
            type_parameters,
        } => walk_alias(id.clone(), name.clone(), value, type_parameters.clone(), ctx),
        NodeKind::TypeOperator {
            operator: TypeOperatorKind::Keyof,
            value,
        } => walk_keyof(value, ctx),
        // Legacy shape kept for input compatibility (§9) — never produced
        // by this crate, but evaluated identically when it appears.
        NodeKind::Keyof { operand } => walk_keyof(operand, ctx),
        NodeKind::TypeOperator { operator, value } => Node::new(NodeKind::TypeOperator {
            operator: *operator,
            value: Box::new(walk(value, ctx)),
        }),
        NodeKind::Array { element_type } => Node::new(NodeKind::Array {
            element_type: Box::new(walk(element_type, ctx)),
        }),
        NodeKind::Tuple { elements } => Node::new(NodeKind::Tuple {
            elements: elements.iter().map(|e| walk(e, ctx)).collect(),
        }),
        NodeKind::Union { elements } => Node::new(NodeKind::Union {
            elements: elements.iter().map(|e| walk(e, ctx)).collect(),
        }),
        NodeKind::Intersection { types } => Node::new(NodeKind::Intersection {
            types: types.iter().map(|t| walk(t, ctx)).collect(),
        }),
        NodeKind::Template { elements } => Node::new(NodeKind::Template {
            elements: elements
                .iter()
                .map(|p| match p {
                    tsdoc_model::TemplatePiece::Literal(s) => tsdoc_model::TemplatePiece::Literal(s.clone()),
                    tsdoc_model::TemplatePiece::Expr(e) => tsdoc_model::TemplatePiece::Expr(Box::new(walk(e, ctx))),
                })
                .collect(),
        }),
        NodeKind::Object { properties } => Node::new(NodeKind::Object {
            properties: walk_properties(properties, ctx),
        }),
        NodeKind::TypeParameter { name, constraint, default } => Node::new(NodeKind::TypeParameter {
            name: name.clone(),
            constraint: constraint.as_ref().map(|c| Box::new(walk(c, ctx))),
            default: default.as_ref().map(|d| Box::new(walk(d, ctx))),
        }),
        NodeKind::Parameter { name, value, optional, rest } => Node::new(NodeKind::Parameter {
            name: name.clone(),
            value: Box::new(walk(value, ctx)),
            optional: *optional,
            rest: *rest,
        }),
        NodeKind::Function {
            id,
            name,
            parameters,
            return_type,
            type_parameters,
        } => Node::new(NodeKind::Function {
            id: id.clone(),
            name: name.clone(),
            parameters: parameters.iter().map(|p| walk(p, ctx)).collect(),
            return_type: Box::new(walk(return_type, ctx)),
            type_parameters: type_parameters.iter().map(|tp| walk(tp, ctx)).collect(),
        }),
        NodeKind::Component {
            id,
            name,
            props,
            component_ref,
            type_parameters,
        } => {
            let walked_props = props.as_ref().map(|p| {
                ctx.push_key(ctx::KEY_PROPS);
                let w = walk(p, ctx);
                ctx.pop_key();
                Box::new(w)
            });
            Node::new(NodeKind::Component {
                id: id.clone(),
                name: name.clone(),
                props: walked_props,
                component_ref: component_ref.as_ref().map(|r| Box::new(walk(r, ctx))),
                type_parameters: type_parameters.iter().map(|tp| walk(tp, ctx)).collect(),
            })
        }
        NodeKind::Conditional {
            check_type,
            extends_type,
            true_type,
            false_type,
        } => Node::new(NodeKind::Conditional {
            check_type: Box::new(walk(check_type, ctx)),
            extends_type: Box::new(walk(extends_type, ctx)),
            true_type: Box::new(walk(true_type, ctx)),
            false_type: Box::new(walk(false_type, ctx)),
        }),
        NodeKind::IndexedAccess { object_type, index_type } => Node::new(NodeKind::IndexedAccess {
            object_type: Box::new(walk(object_type, ctx)),
            index_type: Box::new(walk(index_type, ctx)),
        }),
        // `link` is linker output only (§3) — if one shows up in input
        // (a hand-authored fixture, say) it is already in final shape.
        NodeKind::Link { .. } => node.clone(),
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
        | NodeKind::EnumMember { .. } => node.clone(),
    }
}

fn walk_properties(properties: &IndexMap<String, Node>, ctx: &mut LinkCtx) -> IndexMap<String, Node> {
    let mut out = IndexMap::new();
    for (name, node) in properties {
        ctx.push_key(name.clone());
        let walked = walk_property_value(node, ctx);
        ctx.pop_key();
        out.insert(name.clone(), walked);
    }
    out
}

fn walk_property_value(node: &Node, ctx: &mut LinkCtx) -> Node {
    match &node.kind {
        NodeKind::Property {
            name,
            value,
            optional,
            index_type,
            inherited_from,
        } => Node::new(NodeKind::Property {
            name: name.clone(),
            value: Box::new(walk(value, ctx)),
            optional: *optional,
            index_type: index_type.as_ref().map(|i| Box::new(walk(i, ctx))),
            inherited_from: inherited_from.clone(),
        }),
        NodeKind::Method {
            name,
            value,
            optional,
            inherited_from,
        } => Node::new(NodeKind::Method {
            name: name.clone(),
            value: Box::new(walk(value, ctx)),
            optional: *optional,
            inherited_from: inherited_from.clone(),
        }),
        _ => walk(node, ctx),
    }
}

/// §4.6 rules 2 and 9 combined: an `application`'s type arguments are
/// walked first and held as the "pending application"; if the current
/// position merges (should-merge predicate, including the `Omit`
/// recognition of rule 4) the base is resolved and, when it carries type
/// parameters, a parameter frame binds them to the pending arguments
/// before descending — this both instantiates the generic and collapses
/// the `application` wrapper. Otherwise the `application` shape survives
/// with its (walked) base and arguments, matching rule 9's "inline only
/// under `props`" by falling out of the same should-merge check used to
/// decide whether the base is itself inlined.
fn walk_application(base: &Node, type_parameters: &[Node], ctx: &mut LinkCtx) -> Node {
    let args: Vec<Node> = type_parameters.iter().map(|a| walk(a, ctx)).collect();
    ctx.push_key(ctx::KEY_BASE);
    let merge_here = ctx.should_merge();
    let resolved_base = resolve_reference_chain(base, ctx);

    // §4.6 rule 4: `Omit` evaluates whenever an `identifier` named `Omit`
    // has a pending application — unconditionally, not gated by
    // should-merge. A root-level `export type X = Omit<A, 'k'>` sits in
    // alias-`value` position, where should-merge is false, and must still
    // evaluate rather than survive as an unresolved `application`.
    let result = if matches!(&resolved_base.kind, NodeKind::Identifier { name } if name == "Omit") {
        omit::evaluate_omit(&args, ctx)
    } else if merge_here {
        match &resolved_base.kind {
            NodeKind::Interface { type_parameters: tparams, .. } | NodeKind::Alias { type_parameters: tparams, .. }
                if !tparams.is_empty() =>
            {
                let frame = bind_frame(tparams, &args);
                ctx.param_stack.push(frame);
                let walked = walk(&resolved_base, ctx);
                ctx.param_stack.pop();
                walked
            }
            _ => Node::new(NodeKind::Application {
                base: Box::new(walk(&resolved_base, ctx)),
                type_parameters: args,
            }),
        }
    } else {
        Node::new(NodeKind::Application {
            base: Box::new(walk(&resolved_base, ctx)),
            type_parameters: args,
        })
    };

    ctx.pop_key();
    result
}

fn bind_frame(type_parameters: &[Node], args: &[Node]) -> HashMap<String, Node> {
    let mut frame = HashMap::new();
    for (i, tp) in type_parameters.iter().enumerate() {
        if let NodeKind::TypeParameter { name, default, .. } = &tp.kind {
            let bound = args.get(i).cloned().or_else(|| default.as_ref().map(|d| (**d).clone()));
            if let Some(bound) = bound {
                frame.insert(name.clone(), bound);
            }
        }
    }
    frame
}

/// §4.6 rules 6: flatten inheritance, store the merged form keyed by id,
/// and emit either that form inline or a `link` placeholder depending on
/// whether the current position should merge.
fn walk_interface(
    id: NodeId,
    name: String,
    extends: Vec<Node>,
    properties: IndexMap<String, Node>,
    type_parameters: Vec<Node>,
    ctx: &mut LinkCtx,
) -> Node {
    if !ctx.visiting.insert(id.clone()) {
        return Node::new(NodeKind::Link { id });
    }
    let merge_here = ctx.should_merge();

    let walked_extends: Vec<Node> = extends
        .iter()
        .map(|e| {
            ctx.push_key(ctx::KEY_EXTENDS);
            let w = walk(e, ctx);
            ctx.pop_key();
            w
        })
        .collect();
    let walked_properties = walk_properties(&properties, ctx);
    let walked_type_parameters: Vec<Node> = type_parameters.iter().map(|tp| walk(tp, ctx)).collect();

    let (final_extends, final_properties) = merge::merge_extensions(walked_extends, walked_properties, ctx);

    let merged = Node::with_doc(
        NodeKind::Interface {
            id: id.clone(),
            name,
            extends: final_extends,
            properties: final_properties,
            type_parameters: walked_type_parameters,
        },
        Default::default(),
    );

    ctx.node_table.insert(id.clone(), merged.clone());
    ctx.visiting.remove(&id);

    if merge_here {
        merged
    } else {
        Node::new(NodeKind::Link { id })
    }
}

/// §4.6 rule 7, generalized with the same should-merge predicate used for
/// interfaces (rather than only the literal "parent key == props" check)
/// so a root-level exported alias is also inlined in full rather than
/// reduced to a bare `link` — see DESIGN.md.
fn walk_alias(id: NodeId, name: String, value: &Node, type_parameters: Vec<Node>, ctx: &mut LinkCtx) -> Node {
    if !ctx.visiting.insert(id.clone()) {
        return Node::new(NodeKind::Link { id });
    }
    let merge_here = ctx.should_merge();

    ctx.push_key("value");
    let walked_value = walk(value, ctx);
    ctx.pop_key();
    let walked_type_parameters: Vec<Node> = type_parameters.iter().map(|tp| walk(tp, ctx)).collect();

    let merged = Node::new(NodeKind::Alias {
        id: id.clone(),
        name,
        value: Box::new(walked_value.clone()),
        type_parameters: walked_type_parameters,
    });
    ctx.node_table.insert(id.clone(), merged);
    ctx.visiting.remove(&id);

    if merge_here {
        walked_value
    } else {
        Node::new(NodeKind::Link { id })
    }
}

/// §4.6 rule 8: `keyof` over something that resolves to an interface
/// becomes a union of its property names as string literals, in source
/// order.
fn walk_keyof(value: &Node, ctx: &mut LinkCtx) -> Node {
    let previous = ctx.keyof_context;
    ctx.keyof_context = true;
    let walked_operand = walk(value, ctx);
    ctx.keyof_context = previous;

    let resolved = resolve_value(&walked_operand, ctx);
    match &resolved.kind {
        NodeKind::Interface { properties, .. } => Node::new(NodeKind::Union {
            elements: properties
                .keys()
                .map(|k| {
                    Node::new(NodeKind::String {
                        value: Some(k.clone()),
                    })
                })
                .collect(),
        }),
        _ => Node::new(NodeKind::TypeOperator {
            operator: TypeOperatorKind::Keyof,
            value: Box::new(walked_operand),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdoc_common::NodeId;

    fn prop(name: &str, value: NodeKind) -> Node {
        Node::new(NodeKind::Property {
            name: name.to_string(),
            value: Box::new(Node::new(value)),
            optional: false,
            index_type: None,
            inherited_from: None,
        })
    }

    fn interface(id: NodeId, extends: Vec<Node>, props: &[(&str, NodeKind)]) -> Node {
        let mut properties = IndexMap::new();
        for (name, kind) in props {
            properties.insert(name.to_string(), prop(name, kind.clone()));
        }
        Node::new(NodeKind::Interface {
            id: id.clone(),
            name: id.symbol.clone(),
            extends,
            properties,
            type_parameters: Vec::new(),
        })
    }

    #[test]
    fn simple_reexport_inlines_the_interface_at_root() {
        let base_id = NodeId::new("/base.ts", "Base");
        let base_node = interface(base_id.clone(), vec![], &[("value", NodeKind::Number { value: None })]);

        let mut locals = IndexMap::new();
        locals.insert("Base".to_string(), base_node.clone());
        let mut exports = IndexMap::new();
        exports.insert(
            "Base".to_string(),
            Node::new(NodeKind::Reference {
                local: "Base".to_string(),
                imported: "Base".to_string(),
                specifier: String::new(),
            }),
        );

        let deps = IndexMap::new();
        let (linked, _links) = link(exports, &locals, &deps);
        let base = linked.get("Base").unwrap();
        assert!(base.is_interface());
        assert!(base.properties().unwrap().contains_key("value"));
    }

    #[test]
    fn interface_flattening_preserves_order_and_inherited_from() {
        let a_id = NodeId::new("/a.ts", "A");
        let b_id = NodeId::new("/a.ts", "B");
        let c_id = NodeId::new("/a.ts", "C");

        let a = interface(a_id.clone(), vec![], &[("a", NodeKind::Number { value: None })]);
        let b = interface(
            b_id.clone(),
            vec![Node::new(NodeKind::Reference {
                local: "A".to_string(),
                imported: "A".to_string(),
                specifier: String::new(),
            })],
            &[("b", NodeKind::String { value: None })],
        );
        let c = interface(
            c_id.clone(),
            vec![Node::new(NodeKind::Reference {
                local: "B".to_string(),
                imported: "B".to_string(),
                specifier: String::new(),
            })],
            &[("c", NodeKind::Boolean { value: None })],
        );

        let mut locals = IndexMap::new();
        locals.insert("A".to_string(), a);
        locals.insert("B".to_string(), b);
        locals.insert("C".to_string(), c.clone());
        let mut exports = IndexMap::new();
        exports.insert("C".to_string(), c);

        let deps = IndexMap::new();
        let (linked, _links) = link(exports, &locals, &deps);
        let c = linked.get("C").unwrap();
        let props = c.properties().unwrap();
        let keys: Vec<_> = props.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert!(matches!(
            &props.get("a").unwrap().kind,
            NodeKind::Property { inherited_from: Some(id), .. } if *id == a_id
        ));
        assert!(matches!(
            &props.get("b").unwrap().kind,
            NodeKind::Property { inherited_from: Some(id), .. } if *id == b_id
        ));
        assert!(matches!(
            &props.get("c").unwrap().kind,
            NodeKind::Property { inherited_from: None, .. }
        ));
        match &c.kind {
            NodeKind::Interface { extends, .. } => assert!(extends.is_empty()),
            _ => panic!("expected interface"),
        }
    }

    #[test]
    fn omit_through_extends_drops_listed_keys() {
        let base_id = NodeId::new("/a.ts", "Base");
        let base = interface(
            base_id,
            vec![],
            &[
                ("foo", NodeKind::String { value: None }),
                ("bar", NodeKind::String { value: None }),
                ("onChange", NodeKind::String { value: None }),
            ],
        );

        let handlers_union = Node::new(NodeKind::Union {
            elements: vec![Node::new(NodeKind::String {
                value: Some("onChange".to_string()),
            })],
        });

        let omit_application = Node::new(NodeKind::Application {
            base: Box::new(Node::new(NodeKind::Reference {
                local: "Base".to_string(),
                imported: "Base".to_string(),
                specifier: String::new(),
            })),
            type_parameters: vec![handlers_union],
        });
        // `Omit` itself is an unresolved global identifier.
        let omit_application = match omit_application.kind {
            NodeKind::Application { type_parameters, .. } => Node::new(NodeKind::Application {
                base: Box::new(Node::new(NodeKind::Identifier {
                    name: "Omit".to_string(),
                })),
                type_parameters: {
                    let mut v = vec![Node::new(NodeKind::Reference {
                        local: "Base".to_string(),
                        imported: "Base".to_string(),
                        specifier: String::new(),
                    })];
                    v.extend(type_parameters);
                    v
                },
            }),
            _ => unreachable!(),
        };

        let result_id = NodeId::new("/a.ts", "Result");
        let result = Node::new(NodeKind::Interface {
            id: result_id,
            name: "Result".to_string(),
            extends: vec![omit_application],
            properties: IndexMap::new(),
            type_parameters: vec![],
        });

        let mut locals = IndexMap::new();
        locals.insert("Base".to_string(), base);
        locals.insert("Result".to_string(), result.clone());
        let mut exports = IndexMap::new();
        exports.insert("Result".to_string(), result);

        let deps = IndexMap::new();
        let (linked, _links) = link(exports, &locals, &deps);
        let result = linked.get("Result").unwrap();
        let props = result.properties().unwrap();
        assert!(props.contains_key("foo"));
        assert!(props.contains_key("bar"));
        assert!(!props.contains_key("onChange"));
    }

    /// §4.6 rule 4 is not gated by should-merge: `export type Trimmed =
    /// Omit<Base, 'b'>` puts the application in alias-`value` position,
    /// where should-merge is false, but `Omit` must still evaluate rather
    /// than surviving as an unresolved `application`.
    #[test]
    fn omit_evaluates_at_alias_root_outside_should_merge() {
        let base_id = NodeId::new("/a.ts", "Base");
        let base = interface(
            base_id,
            vec![],
            &[
                ("a", NodeKind::String { value: None }),
                ("b", NodeKind::Number { value: None }),
            ],
        );

        let omit_application = Node::new(NodeKind::Application {
            base: Box::new(Node::new(NodeKind::Identifier {
                name: "Omit".to_string(),
            })),
            type_parameters: vec![
                Node::new(NodeKind::Reference {
                    local: "Base".to_string(),
                    imported: "Base".to_string(),
                    specifier: String::new(),
                }),
                Node::new(NodeKind::String {
                    value: Some("b".to_string()),
                }),
            ],
        });

        let trimmed_id = NodeId::new("/a.ts", "Trimmed");
        let trimmed = Node::new(NodeKind::Alias {
            id: trimmed_id,
            name: "Trimmed".to_string(),
            value: Box::new(omit_application),
            type_parameters: vec![],
        });

        let mut locals = IndexMap::new();
        locals.insert("Base".to_string(), base);
        locals.insert("Trimmed".to_string(), trimmed.clone());
        let mut exports = IndexMap::new();
        exports.insert("Trimmed".to_string(), trimmed);

        let deps = IndexMap::new();
        let (linked, _links) = link(exports, &locals, &deps);
        let trimmed = linked.get("Trimmed").unwrap();
        assert!(trimmed.is_object_like());
        let props = trimmed.properties().unwrap();
        assert!(props.contains_key("a"));
        assert!(!props.contains_key("b"));
    }
}

//! Top-level declaration forms (§4.5: variable declarators, classes,
//! methods, function declarations/components, type aliases, interfaces,
//! enums).

use indexmap::IndexMap;
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};

use tsdoc_common::NodeId;
use tsdoc_model::{DocMeta, EnumMember, Node, NodeKind};

use crate::jsdoc::JsDoc;
use crate::scope::{FileScope, TypeDecl};
use crate::types::{is_jsx_element_type_ann, object_properties, resolve_identifier, transform_type};
use crate::TransformCtx;

/// Distributes a function/method's `@param`/`@returns` tags onto the
/// matching `parameter` node's and the `return` node's own `description`
/// (§4.5: "parameter and return descriptions are distributed into the
/// respective sub-nodes"). No-op for any other node kind.
fn apply_fn_jsdoc(node: &mut Node, jsdoc: &JsDoc) {
    if let NodeKind::Function {
        parameters,
        return_type,
        ..
    } = &mut node.kind
    {
        for param in parameters.iter_mut() {
            let name = match &param.kind {
                NodeKind::Parameter { name, .. } => name.clone(),
                _ => continue,
            };
            if let Some(desc) = jsdoc.params.get(&name) {
                if !desc.is_empty() {
                    param.doc.description = Some(desc.clone());
                }
            }
        }
        if let Some(ret) = &jsdoc.returns {
            if !ret.is_empty() {
                return_type.doc.description = Some(ret.clone());
            }
        }
    }
}

/// Dispatches on the kind of top-level declaration a name in
/// [`FileScope::decls`] is bound to.
pub fn transform_type_decl(decl: TypeDecl<'_>, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    match decl {
        TypeDecl::Interface(i) => transform_interface(i, scope, ctx),
        TypeDecl::Alias(a) => transform_alias(a, scope, ctx),
        TypeDecl::Enum(e) => transform_enum(e),
        TypeDecl::Class(c) => transform_class(c, scope, ctx),
        TypeDecl::Function(f) => transform_fn_decl(f, scope, ctx),
    }
}

/// Interfaces are emitted with their own `properties` only — inheritance is
/// flattened later by the linker (§4.5, §4.6).
pub fn transform_interface(decl: &TsInterfaceDecl, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    let name = decl.id.sym.to_string();
    let id = NodeId::new(ctx.file.clone(), name.clone());
    let extends = decl
        .extends
        .iter()
        .map(|e| transform_heritage(e, scope, ctx))
        .collect();
    let properties = object_properties(&decl.body.body, scope, ctx);
    let type_parameters = transform_type_param_decl(decl.type_params.as_deref(), scope, ctx);
    let doc = ctx.doc_at(decl.span.lo());
    Node::with_doc(
        NodeKind::Interface {
            id,
            name,
            extends,
            properties,
            type_parameters,
        },
        doc,
    )
}

pub fn transform_alias(decl: &TsTypeAliasDecl, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    let name = decl.id.sym.to_string();
    let id = NodeId::new(ctx.file.clone(), name.clone());
    let value = Box::new(transform_type(&decl.type_ann, scope, ctx));
    let type_parameters = transform_type_param_decl(decl.type_params.as_deref(), scope, ctx);
    let doc = ctx.doc_at(decl.span.lo());
    Node::with_doc(
        NodeKind::Alias {
            id,
            name,
            value,
            type_parameters,
        },
        doc,
    )
}

pub fn transform_enum(decl: &TsEnumDecl) -> Node {
    let name = decl.id.sym.to_string();
    let members = decl
        .members
        .iter()
        .map(|m| {
            let member_name = match &m.id {
                TsEnumMemberId::Ident(i) => i.sym.to_string(),
                TsEnumMemberId::Str(s) => s.value.to_string(),
            };
            let value = m.init.as_ref().and_then(|init| match init.as_ref() {
                Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
                Expr::Lit(Lit::Num(n)) => Some(format_number(n.value)),
                _ => None,
            });
            EnumMember {
                name: member_name,
                value,
            }
        })
        .collect();
    Node::new(NodeKind::Enum { name, members })
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A class becomes an `interface` node (§4.5): its superclass (and any
/// implemented interfaces) appear in `extends`, and only fields, methods,
/// and declare-methods are collected as properties. Constructors are not
/// documented members.
pub fn transform_class(decl: &ClassDecl, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    let name = decl.ident.sym.to_string();
    let id = NodeId::new(ctx.file.clone(), name.clone());

    let mut extends = Vec::new();
    if let Some(super_class) = &decl.class.super_class {
        extends.push(transform_heritage_expr(super_class, scope, ctx));
    }
    for impl_ref in &decl.class.implements {
        extends.push(transform_heritage(impl_ref, scope, ctx));
    }

    let properties = transform_class_members(&decl.class.body, scope, ctx);
    let type_parameters = transform_type_param_decl(decl.class.type_params.as_deref(), scope, ctx);
    let doc = ctx.doc_at(decl.class.span.lo());
    Node::with_doc(
        NodeKind::Interface {
            id,
            name,
            extends,
            properties,
            type_parameters,
        },
        doc,
    )
}

fn transform_class_members(
    members: &[ClassMember],
    scope: &FileScope,
    ctx: &mut TransformCtx,
) -> IndexMap<String, Node> {
    let mut properties = IndexMap::new();
    for member in members {
        match member {
            ClassMember::Method(m) => {
                let Some(name) = prop_name_to_string(&m.key) else {
                    continue;
                };
                if name == "constructor" {
                    continue;
                }
                match m.kind {
                    MethodKind::Getter => {
                        let value = m
                            .function
                            .return_type
                            .as_ref()
                            .map(|a| transform_type(&a.type_ann, scope, ctx))
                            .unwrap_or_else(|| Node::new(NodeKind::Any));
                        let doc = ctx.doc_at(m.span.lo());
                        properties.insert(
                            name.clone(),
                            Node::with_doc(
                                NodeKind::Property {
                                    name,
                                    value: Box::new(value),
                                    optional: false,
                                    index_type: None,
                                    inherited_from: None,
                                },
                                doc,
                            ),
                        );
                    }
                    MethodKind::Setter => {
                        let value = m
                            .function
                            .params
                            .first()
                            .map(|p| transform_param(&p.pat, scope, ctx).1)
                            .unwrap_or_else(|| Node::new(NodeKind::Any));
                        let doc = ctx.doc_at(m.span.lo());
                        properties.insert(
                            name.clone(),
                            Node::with_doc(
                                NodeKind::Property {
                                    name,
                                    value: Box::new(value),
                                    optional: false,
                                    index_type: None,
                                    inherited_from: None,
                                },
                                doc,
                            ),
                        );
                    }
                    MethodKind::Method => {
                        let jsdoc = ctx.jsdoc_at(m.span.lo());
                        let mut function = function_node_from_fn(None, None, &m.function, scope, ctx);
                        apply_fn_jsdoc(&mut function, &jsdoc);
                        properties.insert(
                            name.clone(),
                            Node::with_doc(
                                NodeKind::Method {
                                    name,
                                    value: Box::new(function),
                                    optional: m.is_optional,
                                    inherited_from: None,
                                },
                                jsdoc.into_doc_meta(),
                            ),
                        );
                    }
                }
            }
            ClassMember::ClassProp(p) => {
                let Some(name) = prop_name_to_string(&p.key) else {
                    continue;
                };
                let value = p
                    .type_ann
                    .as_ref()
                    .map(|a| transform_type(&a.type_ann, scope, ctx))
                    .unwrap_or_else(|| Node::new(NodeKind::Any));
                let doc = ctx.doc_at(p.span.lo());
                properties.insert(
                    name.clone(),
                    Node::with_doc(
                        NodeKind::Property {
                            name,
                            value: Box::new(value),
                            optional: p.is_optional,
                            index_type: None,
                            inherited_from: None,
                        },
                        doc,
                    ),
                );
            }
            ClassMember::TsIndexSignature(idx) => {
                let value = idx
                    .type_ann
                    .as_ref()
                    .map(|a| transform_type(&a.type_ann, scope, ctx))
                    .unwrap_or_else(|| Node::new(NodeKind::Any));
                let index_type = idx
                    .params
                    .first()
                    .and_then(|p| match p {
                        TsFnParam::Ident(i) => i.type_ann.as_ref(),
                        _ => None,
                    })
                    .map(|a| Box::new(transform_type(&a.type_ann, scope, ctx)));
                properties.insert(
                    "[index]".to_string(),
                    Node::new(NodeKind::Property {
                        name: "[index]".to_string(),
                        value: Box::new(value),
                        optional: false,
                        index_type,
                        inherited_from: None,
                    }),
                );
            }
            ClassMember::PrivateMethod(_) | ClassMember::PrivateProp(_) => {
                // Accepted by the parser facade (§4.1) but never part of
                // the public documentation surface.
            }
            ClassMember::Constructor(_)
            | ClassMember::StaticBlock(_)
            | ClassMember::Empty(_)
            | ClassMember::AutoAccessor(_) => {}
        }
    }
    properties
}

fn prop_name_to_string(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        PropName::Num(n) => Some(format_number(n.value)),
        PropName::BigInt(b) => Some(b.value.to_string()),
        // A computed key's name is not known without evaluating the
        // expression, which is out of scope (§1 Non-goals).
        PropName::Computed(_) => None,
    }
}

/// `extends`/`implements` heritage clause entry: resolves the named base,
/// then wraps it in `application` when type arguments are present.
fn transform_heritage(entry: &TsExprWithTypeArgs, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    let base = transform_heritage_expr(&entry.expr, scope, ctx);
    match &entry.type_args {
        Some(args) if !args.params.is_empty() => Node::new(NodeKind::Application {
            base: Box::new(base),
            type_parameters: args.params.iter().map(|p| transform_type(p, scope, ctx)).collect(),
        }),
        _ => base,
    }
}

fn transform_heritage_expr(expr: &Expr, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    match expr {
        Expr::Ident(ident) => resolve_identifier(&ident.sym, scope, ctx),
        Expr::Member(member) => Node::new(NodeKind::Identifier {
            name: member_expr_to_dotted_name(member),
        }),
        _ => Node::new(NodeKind::Identifier {
            name: "unknown".to_string(),
        }),
    }
}

fn member_expr_to_dotted_name(member: &MemberExpr) -> String {
    let obj = match member.obj.as_ref() {
        Expr::Ident(i) => i.sym.to_string(),
        Expr::Member(m) => member_expr_to_dotted_name(m),
        _ => "unknown".to_string(),
    };
    let prop = match &member.prop {
        MemberProp::Ident(i) => i.sym.to_string(),
        _ => "unknown".to_string(),
    };
    format!("{obj}.{prop}")
}

pub fn transform_type_param_decl(
    decl: Option<&TsTypeParamDecl>,
    scope: &FileScope,
    ctx: &mut TransformCtx,
) -> Vec<Node> {
    let Some(decl) = decl else { return Vec::new() };
    decl.params
        .iter()
        .map(|p| transform_type_param(p, scope, ctx))
        .collect()
}

fn transform_type_param(param: &TsTypeParam, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    Node::new(NodeKind::TypeParameter {
        name: param.name.sym.to_string(),
        constraint: param
            .constraint
            .as_ref()
            .map(|c| Box::new(transform_type(c, scope, ctx))),
        default: param
            .default
            .as_ref()
            .map(|d| Box::new(transform_type(d, scope, ctx))),
    })
}

/// Converts a `TsFnParam` (used in type-level signatures — method
/// signatures, call signatures) into a `parameter` node.
pub fn transform_fn_param(param: &TsFnParam, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    match param {
        TsFnParam::Ident(ident) => Node::new(NodeKind::Parameter {
            name: ident.id.sym.to_string(),
            value: Box::new(
                ident
                    .type_ann
                    .as_ref()
                    .map(|a| transform_type(&a.type_ann, scope, ctx))
                    .unwrap_or_else(|| Node::new(NodeKind::Any)),
            ),
            optional: ident.id.optional,
            rest: false,
        }),
        TsFnParam::Rest(rest) => Node::new(NodeKind::Parameter {
            name: pat_display_name(&rest.arg),
            value: Box::new(
                rest.type_ann
                    .as_ref()
                    .map(|a| transform_type(&a.type_ann, scope, ctx))
                    .unwrap_or_else(|| Node::new(NodeKind::Any)),
            ),
            optional: false,
            rest: true,
        }),
        TsFnParam::Array(_) | TsFnParam::Object(_) => Node::new(NodeKind::Parameter {
            name: String::new(),
            value: Box::new(Node::new(NodeKind::Any)),
            optional: false,
            rest: false,
        }),
    }
}

/// Converts a value-position `Pat` (function/method parameter) into a
/// `(name, type)` pair. Setter accessors (§4.5) need just the type half;
/// `transform_param_node` wraps both halves into a full `parameter` node.
fn transform_param(pat: &Pat, scope: &FileScope, ctx: &mut TransformCtx) -> (String, Node) {
    match pat {
        Pat::Ident(ident) => (
            ident.id.sym.to_string(),
            ident
                .type_ann
                .as_ref()
                .map(|a| transform_type(&a.type_ann, scope, ctx))
                .unwrap_or_else(|| Node::new(NodeKind::Any)),
        ),
        Pat::Assign(assign) => transform_param(&assign.left, scope, ctx),
        Pat::Rest(rest) => transform_param(&rest.arg, scope, ctx),
        _ => (pat_display_name(pat), Node::new(NodeKind::Any)),
    }
}

fn pat_display_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(ident) => ident.id.sym.to_string(),
        Pat::Rest(rest) => pat_display_name(&rest.arg),
        Pat::Assign(assign) => pat_display_name(&assign.left),
        Pat::Array(_) | Pat::Object(_) | Pat::Expr(_) | Pat::Invalid(_) => String::new(),
    }
}

fn transform_param_node(param: &Param, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    pat_to_parameter_node(&param.pat, scope, ctx)
}

fn pat_to_parameter_node(pat: &Pat, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    let optional = matches!(pat, Pat::Assign(_)) || matches!(pat, Pat::Ident(i) if i.id.optional);
    let rest = matches!(pat, Pat::Rest(_));
    let (name, value) = transform_param(pat, scope, ctx);
    Node::new(NodeKind::Parameter {
        name,
        value: Box::new(value),
        optional,
        rest,
    })
}

/// Builds a `function` node from an swc `Function` payload shared by class
/// methods, object-literal methods, and function declarations.
fn function_node_from_fn(
    id: Option<NodeId>,
    name: Option<String>,
    function: &Function,
    scope: &FileScope,
    ctx: &mut TransformCtx,
) -> Node {
    let parameters = function
        .params
        .iter()
        .map(|p| transform_param_node(p, scope, ctx))
        .collect();
    let return_type = function
        .return_type
        .as_ref()
        .map(|a| transform_type(&a.type_ann, scope, ctx))
        .unwrap_or_else(|| Node::new(NodeKind::Any));
    let type_parameters = transform_type_param_decl(function.type_params.as_deref(), scope, ctx);
    Node::new(NodeKind::Function {
        id,
        name,
        parameters,
        return_type: Box::new(return_type),
        type_parameters,
    })
}

/// Names recognized as transparent component wrappers (§4.5): the inner
/// function argument is unwrapped and treated as if it were declared
/// directly.
const COMPONENT_WRAPPERS: &[&str] = &["forwardRef", "createHideableComponent"];

fn wrapper_call_name(expr: &Expr) -> Option<&'static str> {
    let Expr::Call(call) = expr else { return None };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let name = callee_name(callee)?;
    COMPONENT_WRAPPERS.iter().find(|w| ***w == *name).copied()
}

fn callee_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(i) => Some(i.sym.to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn unwrap_component_wrapper(expr: &Expr) -> &Expr {
    if wrapper_call_name(expr).is_some() {
        if let Expr::Call(call) = expr {
            if let Some(first) = call.args.first() {
                return unwrap_component_wrapper(&first.expr);
            }
        }
    }
    expr
}

fn transform_arrow_params(arrow: &ArrowExpr, scope: &FileScope, ctx: &mut TransformCtx) -> Vec<Node> {
    arrow
        .params
        .iter()
        .map(|pat| pat_to_parameter_node(pat, scope, ctx))
        .collect()
}

struct JsxReturnFinder {
    found: bool,
}

impl Visit for JsxReturnFinder {
    fn visit_return_stmt(&mut self, node: &ReturnStmt) {
        if let Some(arg) = &node.arg {
            if expr_returns_jsx(arg) {
                self.found = true;
            }
        }
        node.visit_children_with(self);
    }

    // Do not descend into nested function scopes: a closure passed to
    // `.map()` inside this function's body returning JSX does not make
    // the *outer* declaration a component.
    fn visit_function(&mut self, _node: &Function) {}
    fn visit_arrow_expr(&mut self, _node: &ArrowExpr) {}
    fn visit_class(&mut self, _node: &Class) {}
}

fn expr_returns_jsx(expr: &Expr) -> bool {
    match expr {
        Expr::JSXElement(_) | Expr::JSXFragment(_) => true,
        Expr::Paren(p) => expr_returns_jsx(&p.expr),
        Expr::Cond(c) => expr_returns_jsx(&c.cons) || expr_returns_jsx(&c.alt),
        Expr::Call(call) => {
            let Callee::Expr(callee) = &call.callee else {
                return false;
            };
            matches!(callee_name(callee).as_deref(), Some("cloneElement") | Some("createPortal"))
        }
        _ => false,
    }
}

fn block_returns_jsx(body: &BlockStmt) -> bool {
    let mut finder = JsxReturnFinder { found: false };
    body.visit_with(&mut finder);
    finder.found
}

/// Whether a function declaration/expression should be emitted as a
/// `component` node rather than a plain `function` node (§4.5): the body
/// directly returns JSX (possibly via `cloneElement`/`createPortal`), or
/// the explicit return type annotation is `JSX.Element`.
fn is_component(body: Option<&BlockStmt>, explicit_return: Option<&TsTypeAnn>) -> bool {
    if let Some(ann) = explicit_return {
        if is_jsx_element_type_ann(&ann.type_ann) {
            return true;
        }
    }
    body.is_some_and(block_returns_jsx)
}

/// Builds a `component` node, taking `props`/`ref` from the first and
/// second parameter's *type* (not the full parameter node) per §4.5.
fn component_node(
    id: NodeId,
    name: String,
    parameters: &[Node],
    type_parameters: Vec<Node>,
    doc: DocMeta,
) -> Node {
    let props = parameters.first().map(|p| Box::new(parameter_value(p)));
    let component_ref = parameters.get(1).map(|p| Box::new(parameter_value(p)));
    Node::with_doc(
        NodeKind::Component {
            id,
            name,
            props,
            component_ref,
            type_parameters,
        },
        doc,
    )
}

/// Pulls the `value` (type) out of an already-built `parameter` node, for
/// use as a `component`'s `props`/`ref` (§4.5: "taken from the first and
/// second parameters' type annotations").
fn parameter_value(param: &Node) -> Node {
    match &param.kind {
        NodeKind::Parameter { value, .. } => value.as_ref().clone(),
        _ => param.clone(),
    }
}

pub fn transform_fn_decl(decl: &FnDecl, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    let name = decl.ident.sym.to_string();
    let id = NodeId::new(ctx.file.clone(), name.clone());
    let jsdoc = ctx.jsdoc_at(decl.function.span.lo());

    let parameters: Vec<Node> = decl
        .function
        .params
        .iter()
        .map(|p| transform_param_node(p, scope, ctx))
        .collect();

    if is_component(decl.function.body.as_ref(), decl.function.return_type.as_deref()) {
        let type_parameters = transform_type_param_decl(decl.function.type_params.as_deref(), scope, ctx);
        return component_node(id, name, &parameters, type_parameters, jsdoc.into_doc_meta());
    }

    let return_type = decl
        .function
        .return_type
        .as_ref()
        .map(|a| transform_type(&a.type_ann, scope, ctx))
        .unwrap_or_else(|| Node::new(NodeKind::Any));
    let type_parameters = transform_type_param_decl(decl.function.type_params.as_deref(), scope, ctx);
    let mut node = Node::with_doc(
        NodeKind::Function {
            id: Some(id),
            name: Some(name),
            parameters,
            return_type: Box::new(return_type),
            type_parameters,
        },
        jsdoc.clone().into_doc_meta(),
    );
    apply_fn_jsdoc(&mut node, &jsdoc);
    node
}

/// A variable declarator with no initializer produces no node (§4.5); an
/// initialized one is recursed into based on the shape of the initializer
/// expression.
pub fn transform_var_declarator(var: &VarDeclarator, scope: &FileScope, ctx: &mut TransformCtx) -> Option<Node> {
    let Pat::Ident(ident) = &var.name else {
        return None;
    };
    let name = ident.id.sym.to_string();
    let init = var.init.as_ref()?;
    let jsdoc = ctx.jsdoc_at(var.span.lo());
    Some(transform_var_init(&name, init, scope, ctx, &jsdoc))
}

fn transform_var_init(name: &str, init: &Expr, scope: &FileScope, ctx: &mut TransformCtx, jsdoc: &JsDoc) -> Node {
    let unwrapped = unwrap_component_wrapper(init);

    match unwrapped {
        Expr::Object(obj) => Node::with_doc(
            NodeKind::Interface {
                id: NodeId::new(ctx.file.clone(), name.to_string()),
                name: name.to_string(),
                extends: Vec::new(),
                properties: object_lit_properties(obj, scope, ctx),
                type_parameters: Vec::new(),
            },
            jsdoc.clone().into_doc_meta(),
        ),
        Expr::Arrow(arrow) => transform_arrow_as_decl(name, arrow, scope, ctx, jsdoc),
        Expr::Fn(fn_expr) => transform_fn_expr_as_decl(name, fn_expr, scope, ctx, jsdoc),
        Expr::Paren(p) => transform_var_init(name, &p.expr, scope, ctx, jsdoc),
        Expr::TsAs(a) => transform_var_init(name, &a.expr, scope, ctx, jsdoc),
        Expr::TsConstAssertion(a) => transform_var_init(name, &a.expr, scope, ctx, jsdoc),
        Expr::TsSatisfies(s) => transform_var_init(name, &s.expr, scope, ctx, jsdoc),
        Expr::Lit(lit) => Node::with_doc(literal_expr_kind(lit), jsdoc.clone().into_doc_meta()),
        Expr::Ident(ident) => resolve_identifier(&ident.sym, scope, ctx),
        _ => Node::with_doc(NodeKind::Any, jsdoc.clone().into_doc_meta()),
    }
}

fn literal_expr_kind(lit: &Lit) -> NodeKind {
    match lit {
        Lit::Str(s) => NodeKind::String {
            value: Some(s.value.to_string()),
        },
        Lit::Bool(b) => NodeKind::Boolean {
            value: Some(b.value.to_string()),
        },
        Lit::Num(n) => NodeKind::Number {
            value: Some(format_number(n.value)),
        },
        Lit::BigInt(b) => NodeKind::Number {
            value: Some(b.value.to_string()),
        },
        Lit::Null(_) => NodeKind::Null,
        Lit::Regex(_) | Lit::JSXText(_) => NodeKind::Any,
    }
}

fn transform_arrow_as_decl(
    name: &str,
    arrow: &ArrowExpr,
    scope: &FileScope,
    ctx: &mut TransformCtx,
    jsdoc: &JsDoc,
) -> Node {
    let explicit_jsx_return = arrow
        .return_type
        .as_ref()
        .is_some_and(|a| is_jsx_element_type_ann(&a.type_ann));
    let body_is_jsx = match arrow.body.as_ref() {
        BlockStmtOrExpr::Expr(expr) => expr_returns_jsx(expr),
        BlockStmtOrExpr::BlockStmt(block) => block_returns_jsx(block),
    };

    let id = NodeId::new(ctx.file.clone(), name.to_string());
    let parameters = transform_arrow_params(arrow, scope, ctx);

    if explicit_jsx_return || body_is_jsx {
        let type_parameters = transform_type_param_decl(arrow.type_params.as_deref(), scope, ctx);
        return component_node(id, name.to_string(), &parameters, type_parameters, jsdoc.clone().into_doc_meta());
    }

    let return_type = arrow
        .return_type
        .as_ref()
        .map(|a| transform_type(&a.type_ann, scope, ctx))
        .unwrap_or_else(|| Node::new(NodeKind::Any));
    let type_parameters = transform_type_param_decl(arrow.type_params.as_deref(), scope, ctx);
    let mut node = Node::with_doc(
        NodeKind::Function {
            id: Some(id),
            name: Some(name.to_string()),
            parameters,
            return_type: Box::new(return_type),
            type_parameters,
        },
        jsdoc.clone().into_doc_meta(),
    );
    apply_fn_jsdoc(&mut node, jsdoc);
    node
}

fn transform_fn_expr_as_decl(
    name: &str,
    fn_expr: &FnExpr,
    scope: &FileScope,
    ctx: &mut TransformCtx,
    jsdoc: &JsDoc,
) -> Node {
    let id = NodeId::new(ctx.file.clone(), name.to_string());
    let parameters: Vec<Node> = fn_expr
        .function
        .params
        .iter()
        .map(|p| transform_param_node(p, scope, ctx))
        .collect();

    if is_component(fn_expr.function.body.as_ref(), fn_expr.function.return_type.as_deref()) {
        let type_parameters = transform_type_param_decl(fn_expr.function.type_params.as_deref(), scope, ctx);
        return component_node(id, name.to_string(), &parameters, type_parameters, jsdoc.clone().into_doc_meta());
    }

    let mut function = function_node_from_fn(Some(id), Some(name.to_string()), &fn_expr.function, scope, ctx);
    apply_fn_jsdoc(&mut function, jsdoc);
    function.doc = jsdoc.clone().into_doc_meta();
    function
}

fn object_lit_properties(obj: &ObjectLit, scope: &FileScope, ctx: &mut TransformCtx) -> IndexMap<String, Node> {
    let mut properties = IndexMap::new();
    for prop in &obj.props {
        let PropOrSpread::Prop(prop) = prop else {
            // Spread properties merge another object at runtime; evaluating
            // that is out of scope (§1 Non-goals).
            continue;
        };
        match prop.as_ref() {
            Prop::KeyValue(kv) => {
                let Some(name) = prop_name_to_string(&kv.key) else {
                    continue;
                };
                let value = object_value_node(&kv.value, scope, ctx);
                properties.insert(
                    name.clone(),
                    Node::new(NodeKind::Property {
                        name,
                        value: Box::new(value),
                        optional: false,
                        index_type: None,
                        inherited_from: None,
                    }),
                );
            }
            Prop::Shorthand(ident) => {
                let name = ident.sym.to_string();
                properties.insert(
                    name.clone(),
                    Node::new(NodeKind::Property {
                        name,
                        value: Box::new(Node::new(NodeKind::Any)),
                        optional: false,
                        index_type: None,
                        inherited_from: None,
                    }),
                );
            }
            Prop::Method(m) => {
                let Some(name) = prop_name_to_string(&m.key) else {
                    continue;
                };
                let function = function_node_from_fn(None, Some(name.clone()), &m.function, scope, ctx);
                properties.insert(
                    name.clone(),
                    Node::new(NodeKind::Method {
                        name,
                        value: Box::new(function),
                        optional: false,
                        inherited_from: None,
                    }),
                );
            }
            Prop::Getter(g) => {
                let Some(name) = prop_name_to_string(&g.key) else {
                    continue;
                };
                let value = g
                    .type_ann
                    .as_ref()
                    .map(|a| transform_type(&a.type_ann, scope, ctx))
                    .unwrap_or_else(|| Node::new(NodeKind::Any));
                properties.insert(
                    name.clone(),
                    Node::new(NodeKind::Property {
                        name,
                        value: Box::new(value),
                        optional: false,
                        index_type: None,
                        inherited_from: None,
                    }),
                );
            }
            Prop::Setter(_) | Prop::Assign(_) => {
                // Assign shorthand only appears in destructuring patterns;
                // setters without a readable type contribute nothing
                // documentable.
            }
        }
    }
    properties
}

fn object_value_node(expr: &Expr, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    match expr {
        Expr::Lit(lit) => Node::new(literal_expr_kind(lit)),
        Expr::Object(obj) => Node::new(NodeKind::Object {
            properties: object_lit_properties(obj, scope, ctx),
        }),
        Expr::Ident(ident) => resolve_identifier(&ident.sym, scope, ctx),
        _ => Node::new(NodeKind::Any),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransformCtx;
    use std::path::{Path, PathBuf};

    fn transform(src: &str, name: &str) -> Option<Node> {
        let module = tsdoc_parser::parse_module(Path::new("/f.tsx"), src).unwrap();
        let scope = FileScope::build(&module);
        let mut ctx = TransformCtx::new(PathBuf::from("/f.tsx"), src, 0);
        crate::transform_declaration(name, &scope, &mut ctx)
    }

    #[test]
    fn class_becomes_interface_with_super_in_extends() {
        let node = transform(
            "class Base { a: number = 1; }\nexport class C extends Base { b: string = ''; }",
            "C",
        )
        .unwrap();
        assert!(node.is_interface());
        assert_eq!(
            match &node.kind {
                NodeKind::Interface { extends, .. } => extends.len(),
                _ => panic!(),
            },
            1
        );
        assert!(node.properties().unwrap().contains_key("b"));
    }

    #[test]
    fn getter_becomes_property_with_return_type() {
        let node = transform("export class C { get value(): number { return 1; } }", "C").unwrap();
        let props = node.properties().unwrap();
        let value = props.get("value").unwrap();
        match &value.kind {
            NodeKind::Property { value, .. } => {
                assert!(matches!(value.kind, NodeKind::Number { .. }));
            }
            _ => panic!("expected property"),
        }
    }

    #[test]
    fn function_returning_jsx_becomes_component() {
        let node = transform(
            "export function Widget(props: { label: string }) { return <div>{props.label}</div>; }",
            "Widget",
        )
        .unwrap();
        assert!(matches!(node.kind, NodeKind::Component { .. }));
    }

    #[test]
    fn plain_function_stays_a_function_node() {
        let node = transform("export function add(a: number, b: number): number { return a + b; }", "add").unwrap();
        match node.kind {
            NodeKind::Function { parameters, .. } => assert_eq!(parameters.len(), 2),
            _ => panic!("expected function"),
        }
    }

    #[test]
    fn forward_ref_wrapper_is_unwrapped() {
        let node = transform(
            "export const Widget = forwardRef(function Widget(props: { label: string }, ref: Ref) { return <div ref={ref}>{props.label}</div>; });",
            "Widget",
        )
        .unwrap();
        assert!(matches!(node.kind, NodeKind::Component { .. }));
    }

    #[test]
    fn object_literal_initializer_becomes_interface() {
        let node = transform("export const config = { retries: 3, name: 'x' };", "config").unwrap();
        assert!(node.is_interface());
        assert!(node.properties().unwrap().contains_key("retries"));
    }

    #[test]
    fn param_and_return_docs_land_on_sub_nodes() {
        let node = transform(
            "/**\n * Adds two numbers.\n * @param a the first addend\n * @param b the second addend\n * @returns the sum\n */\nexport function add(a: number, b: number): number { return a + b; }",
            "add",
        )
        .unwrap();
        match &node.kind {
            NodeKind::Function {
                parameters,
                return_type,
                ..
            } => {
                let a = parameters.iter().find(|p| matches!(&p.kind, NodeKind::Parameter { name, .. } if name == "a")).unwrap();
                assert_eq!(a.doc.description.as_deref(), Some("the first addend"));
                let b = parameters.iter().find(|p| matches!(&p.kind, NodeKind::Parameter { name, .. } if name == "b")).unwrap();
                assert_eq!(b.doc.description.as_deref(), Some("the second addend"));
                assert_eq!(return_type.doc.description.as_deref(), Some("the sum"));
            }
            _ => panic!("expected function"),
        }
        assert_eq!(node.doc.description.as_deref(), Some("Adds two numbers."));
    }

    #[test]
    fn method_param_docs_land_on_sub_nodes() {
        let node = transform(
            "export class C {\n  /**\n   * @param value the new value\n   */\n  set(value: number): void {}\n}",
            "C",
        )
        .unwrap();
        let props = node.properties().unwrap();
        let method = props.get("set").unwrap();
        match &method.kind {
            NodeKind::Method { value, .. } => match &value.kind {
                NodeKind::Function { parameters, .. } => {
                    assert_eq!(parameters[0].doc.description.as_deref(), Some("the new value"));
                }
                _ => panic!("expected function"),
            },
            _ => panic!("expected method"),
        }
    }

    #[test]
    fn enum_members_capture_string_and_numeric_initializers() {
        let node = transform("export enum Color { Red = 'red', Green, Blue = 2 }", "Color").unwrap();
        match node.kind {
            NodeKind::Enum { members, .. } => {
                assert_eq!(members[0].value.as_deref(), Some("red"));
                assert_eq!(members[1].value, None);
                assert_eq!(members[2].value.as_deref(), Some("2"));
            }
            _ => panic!("expected enum"),
        }
    }
}

//! Transforms a `TsType` into a documentation [`Node`] (§4.5: "literals used
//! as types", "template literal types", `TSTypeReference`, qualified names,
//! parentheses/`as`, type operators, indexed access, conditional types).

use indexmap::IndexMap;
use swc_core::ecma::ast::*;
use tsdoc_model::{Node, NodeKind, TemplatePiece, TypeOperatorKind};

use crate::scope::{FileScope, ImportKind, TypeDecl};
use crate::{decls, TransformCtx};

pub fn transform_type(ty: &TsType, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    match ty {
        TsType::TsKeywordType(kw) => Node::new(keyword_kind(kw.kind)),
        TsType::TsThisType(_) => Node::new(NodeKind::This),
        TsType::TsArrayType(arr) => Node::new(NodeKind::Array {
            element_type: Box::new(transform_type(&arr.elem_type, scope, ctx)),
        }),
        TsType::TsTupleType(tuple) => Node::new(NodeKind::Tuple {
            elements: tuple
                .elem_types
                .iter()
                .map(|e| transform_type(&e.ty, scope, ctx))
                .collect(),
        }),
        TsType::TsTypeLit(lit) => Node::new(NodeKind::Object {
            properties: object_properties(&lit.members, scope, ctx),
        }),
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(u)) => {
            Node::new(NodeKind::Union {
                elements: u.types.iter().map(|t| transform_type(t, scope, ctx)).collect(),
            })
        }
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(i)) => {
            Node::new(NodeKind::Intersection {
                types: i.types.iter().map(|t| transform_type(t, scope, ctx)).collect(),
            })
        }
        TsType::TsParenthesizedType(p) => transform_type(&p.type_ann, scope, ctx),
        TsType::TsTypeOperator(op) => {
            let kind = match op.op {
                TsTypeOperatorOp::KeyOf => TypeOperatorKind::Keyof,
                TsTypeOperatorOp::Unique => TypeOperatorKind::Unique,
                TsTypeOperatorOp::ReadOnly => TypeOperatorKind::Readonly,
            };
            Node::new(NodeKind::TypeOperator {
                operator: kind,
                value: Box::new(transform_type(&op.type_ann, scope, ctx)),
            })
        }
        TsType::TsTypeQuery(query) => {
            let name = match &query.expr_name {
                TsTypeQueryExpr::TsEntityName(e) => entity_name_string(e),
                TsTypeQueryExpr::Import(i) => i.arg.value.to_string(),
            };
            Node::new(NodeKind::TypeOperator {
                operator: TypeOperatorKind::Typeof,
                value: Box::new(Node::new(NodeKind::Identifier { name })),
            })
        }
        TsType::TsIndexedAccessType(idx) => Node::new(NodeKind::IndexedAccess {
            object_type: Box::new(transform_type(&idx.obj_type, scope, ctx)),
            index_type: Box::new(transform_type(&idx.index_type, scope, ctx)),
        }),
        TsType::TsConditionalType(c) => Node::new(NodeKind::Conditional {
            check_type: Box::new(transform_type(&c.check_type, scope, ctx)),
            extends_type: Box::new(transform_type(&c.extends_type, scope, ctx)),
            true_type: Box::new(transform_type(&c.true_type, scope, ctx)),
            false_type: Box::new(transform_type(&c.false_type, scope, ctx)),
        }),
        TsType::TsLitType(lit) => literal_type_node(&lit.lit),
        TsType::TsTplLitType(tpl) => template_literal_node(tpl, scope, ctx),
        TsType::TsTypeRef(type_ref) => transform_type_ref(type_ref, scope, ctx),
        TsType::TsFnOrConstructorType(_) => {
            tracing::warn!("unknown AST variant: function/constructor type literal");
            Node::new(NodeKind::Any)
        }
        TsType::TsOptionalType(opt) => transform_type(&opt.type_ann, scope, ctx),
        TsType::TsRestType(rest) => transform_type(&rest.type_ann, scope, ctx),
        TsType::TsInferType(_) | TsType::TsImportType(_) => {
            tracing::warn!("unknown AST variant in type position");
            Node::new(NodeKind::Any)
        }
    }
}

fn keyword_kind(kind: TsKeywordTypeKind) -> NodeKind {
    match kind {
        TsKeywordTypeKind::TsAnyKeyword => NodeKind::Any,
        TsKeywordTypeKind::TsNullKeyword => NodeKind::Null,
        TsKeywordTypeKind::TsUndefinedKeyword => NodeKind::Undefined,
        TsKeywordTypeKind::TsVoidKeyword => NodeKind::Void,
        TsKeywordTypeKind::TsUnknownKeyword => NodeKind::Unknown,
        TsKeywordTypeKind::TsNeverKeyword => NodeKind::Never,
        TsKeywordTypeKind::TsSymbolKeyword => NodeKind::Symbol,
        TsKeywordTypeKind::TsBooleanKeyword => NodeKind::Boolean { value: None },
        TsKeywordTypeKind::TsStringKeyword => NodeKind::String { value: None },
        TsKeywordTypeKind::TsNumberKeyword => NodeKind::Number { value: None },
        TsKeywordTypeKind::TsObjectKeyword => NodeKind::Object {
            properties: IndexMap::new(),
        },
        TsKeywordTypeKind::TsBigIntKeyword
        | TsKeywordTypeKind::TsIntrinsicKeyword => {
            tracing::warn!("unknown AST variant: keyword type {:?}", kind);
            NodeKind::Any
        }
    }
}

pub(crate) fn literal_type_node(lit: &TsLit) -> Node {
    match lit {
        TsLit::Str(s) => Node::new(NodeKind::String {
            value: Some(s.value.to_string()),
        }),
        TsLit::Number(n) => Node::new(NodeKind::Number {
            value: Some(format_number(n.value)),
        }),
        TsLit::Bool(b) => Node::new(NodeKind::Boolean {
            value: Some(b.value.to_string()),
        }),
        TsLit::BigInt(b) => Node::new(NodeKind::Number {
            value: Some(b.value.to_string()),
        }),
        TsLit::Tpl(tpl) => {
            let joined: String = tpl
                .quasis
                .iter()
                .map(|q| q.raw.to_string())
                .collect::<Vec<_>>()
                .join("");
            Node::new(NodeKind::String { value: Some(joined) })
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn template_literal_node(tpl: &TsTplLitType, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    let mut elements = Vec::new();
    for (i, quasi) in tpl.quasis.iter().enumerate() {
        let raw = quasi.raw.to_string();
        if !raw.is_empty() {
            elements.push(TemplatePiece::Literal(raw));
        }
        if let Some(ty) = tpl.types.get(i) {
            elements.push(TemplatePiece::Expr(Box::new(transform_type(ty, scope, ctx))));
        }
    }
    Node::new(NodeKind::Template { elements })
}

pub(crate) fn entity_name_string(entity: &TsEntityName) -> String {
    match entity {
        TsEntityName::Ident(ident) => ident.sym.to_string(),
        TsEntityName::TsQualifiedName(q) => {
            format!("{}.{}", entity_name_string(&q.left), q.right.sym)
        }
    }
}

/// Resolves a bare identifier against the file scope, producing the same
/// shapes the linker expects to see at a use site (§4.5, §4.6 rule 1): a
/// `reference` to a same-file declaration (empty `specifier` — the
/// linker's "falls back to the primary asset" clause resolves these), a
/// `reference` to an imported one, or a bare `identifier` when neither
/// applies (ambient/global names, type parameters). `link` is never
/// produced here — per §3 it is linker output only.
pub(crate) fn resolve_identifier(name: &str, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    if scope.decls.contains_key(name) {
        return Node::new(NodeKind::Reference {
            local: name.to_string(),
            imported: name.to_string(),
            specifier: String::new(),
        });
    }
    if let Some(binding) = scope.imports.get(name) {
        let import_kind = match binding.kind {
            ImportKind::Symbol => crate::ImportKind::Symbol,
            ImportKind::Default => crate::ImportKind::Default,
            ImportKind::Namespace => crate::ImportKind::Namespace,
        };
        ctx.record_dependency(&binding.specifier, import_kind, name, &binding.source_name);
        return Node::new(NodeKind::Reference {
            local: name.to_string(),
            imported: binding.source_name.clone(),
            specifier: binding.specifier.clone(),
        });
    }
    Node::new(NodeKind::Identifier {
        name: name.to_string(),
    })
}

fn transform_type_ref(type_ref: &TsTypeRef, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    let base = match &type_ref.type_name {
        TsEntityName::Ident(ident) => resolve_identifier(&ident.sym, scope, ctx),
        TsEntityName::TsQualifiedName(q) => transform_qualified_name(q, scope, ctx),
    };

    match &type_ref.type_params {
        Some(params) if !params.params.is_empty() => Node::new(NodeKind::Application {
            base: Box::new(base),
            type_parameters: params
                .params
                .iter()
                .map(|p| transform_type(p, scope, ctx))
                .collect(),
        }),
        _ => base,
    }
}

/// Qualified name `A.B`: if `A` is a locally declared interface/class whose
/// properties are known, inline `B`'s value; otherwise a joined identifier
/// (§4.5).
fn transform_qualified_name(q: &TsQualifiedName, scope: &FileScope, ctx: &mut TransformCtx) -> Node {
    if let TsEntityName::Ident(left) = &q.left {
        if let Some(TypeDecl::Interface(decl)) = scope.decls.get(left.sym.as_str()).copied() {
            let interface = decls::transform_interface(decl, scope, ctx);
            if let Some(properties) = interface.properties() {
                if let Some(prop) = properties.get(q.right.sym.as_str()) {
                    return prop.clone();
                }
            }
        }
    }
    Node::new(NodeKind::Identifier {
        name: entity_name_string(&TsEntityName::TsQualifiedName(Box::new(q.clone()))),
    })
}

pub(crate) fn object_properties(
    members: &[TsTypeElement],
    scope: &FileScope,
    ctx: &mut TransformCtx,
) -> IndexMap<String, Node> {
    let mut properties = IndexMap::new();
    for member in members {
        match member {
            TsTypeElement::TsPropertySignature(p) => {
                let Some(name) = member_name(&p.key) else {
                    continue;
                };
                let value = p
                    .type_ann
                    .as_ref()
                    .map(|a| transform_type(&a.type_ann, scope, ctx))
                    .unwrap_or_else(|| Node::new(NodeKind::Any));
                properties.insert(
                    name.clone(),
                    Node::new(NodeKind::Property {
                        name,
                        value: Box::new(value),
                        optional: p.optional,
                        index_type: None,
                        inherited_from: None,
                    }),
                );
            }
            TsTypeElement::TsMethodSignature(m) => {
                let Some(name) = member_name(&m.key) else {
                    continue;
                };
                let return_type = m
                    .type_ann
                    .as_ref()
                    .map(|a| transform_type(&a.type_ann, scope, ctx))
                    .unwrap_or_else(|| Node::new(NodeKind::Any));
                let parameters = m
                    .params
                    .iter()
                    .map(|p| decls::transform_fn_param(p, scope, ctx))
                    .collect();
                let function = Node::new(NodeKind::Function {
                    id: None,
                    name: Some(name.clone()),
                    parameters,
                    return_type: Box::new(return_type),
                    type_parameters: vec![],
                });
                properties.insert(
                    name.clone(),
                    Node::new(NodeKind::Method {
                        name,
                        value: Box::new(function),
                        optional: m.optional,
                        inherited_from: None,
                    }),
                );
            }
            TsTypeElement::TsGetterSignature(g) => {
                let Some(name) = member_name(&g.key) else {
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
            TsTypeElement::TsSetterSignature(s) => {
                let Some(name) = member_name(&s.key) else {
                    continue;
                };
                let value = transform_type(&s.param.ty(), scope, ctx);
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
            TsTypeElement::TsIndexSignature(idx) => {
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
            TsTypeElement::TsCallSignatureDecl(_) | TsTypeElement::TsConstructSignatureDecl(_) => {
                tracing::warn!("unknown AST variant: call/construct signature member");
            }
        }
    }
    properties
}

pub(crate) fn member_name(key: &Expr) -> Option<String> {
    match key {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        _ => None,
    }
}

/// True when `ty` is the qualified type reference `JSX.Element` (§4.5:
/// one of the three ways a function is recognized as a component).
pub(crate) fn is_jsx_element_type_ann(ty: &TsType) -> bool {
    let TsType::TsTypeRef(type_ref) = ty else {
        return false;
    };
    let TsEntityName::TsQualifiedName(q) = &type_ref.type_name else {
        return false;
    };
    let TsEntityName::Ident(left) = &q.left else {
        return false;
    };
    left.sym.as_str() == "JSX" && q.right.sym.as_str() == "Element"
}

trait SetterParamType {
    fn ty(&self) -> TsType;
}

impl SetterParamType for TsFnParam {
    fn ty(&self) -> TsType {
        match self {
            TsFnParam::Ident(i) => i
                .type_ann
                .as_ref()
                .map(|a| (*a.type_ann).clone())
                .unwrap_or(TsType::TsKeywordType(TsKeywordType {
                    span: swc_core::common::DUMMY_SP,
                    kind: TsKeywordTypeKind::TsAnyKeyword,
                })),
            _ => TsType::TsKeywordType(TsKeywordType {
                span: swc_core::common::DUMMY_SP,
                kind: TsKeywordTypeKind::TsAnyKeyword,
            }),
        }
    }
}

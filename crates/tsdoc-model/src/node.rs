//! `Node` and its variant payload, `NodeKind` (§3).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use tsdoc_common::NodeId;

/// The access modifier recorded from a JSDoc `@private`/`@protected`/
/// `@public` tag. `@deprecated` maps to `Private` per §4.5, with the
/// deprecation itself folded into `description` (§2.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Protected,
    Private,
}

/// Documentation fields shared by every `Node` (§3). `return` and `params`
/// from the distilled spec's shared-field list are not modeled here: per
/// §4.5's explicit transformer policy ("parameter and return descriptions
/// are distributed into the respective sub-nodes"), those two are written
/// directly onto the nested `parameter`/`return` nodes' own `description`
/// rather than kept as a separate field on the declaring node — see
/// DESIGN.md for the reasoning (the alternative collides with `function`'s
/// structural `return: Node` field under the same JSON key).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl DocMeta {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.access.is_none()
            && self.default.is_none()
            && self.selector.is_none()
    }
}

/// One piece of a `template` node: either a literal string chunk or an
/// embedded type expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplatePiece {
    Literal(String),
    Expr(Box<Node>),
}

/// The operator carried by a `typeOperator` node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeOperatorKind {
    Keyof,
    Typeof,
    Readonly,
    Unique,
}

/// An enum member's `(name, value)` pair (§3: `enumMember`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The variant-specific payload of a documentation node. Tagged with
/// `type` so serialization matches §6 ("Node discriminants are the
/// lowercase strings enumerated in §3").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "null")]
    Null,
    #[serde(rename = "undefined")]
    Undefined,
    #[serde(rename = "void")]
    Void,
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "this")]
    This,
    #[serde(rename = "symbol")]
    Symbol,

    #[serde(rename = "boolean")]
    Boolean {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    #[serde(rename = "string")]
    String {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    #[serde(rename = "number")]
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    #[serde(rename = "array")]
    Array { element_type: Box<Node> },
    #[serde(rename = "tuple")]
    Tuple { elements: Vec<Node> },
    #[serde(rename = "object")]
    Object {
        properties: IndexMap<String, Node>,
    },
    #[serde(rename = "union")]
    Union { elements: Vec<Node> },
    #[serde(rename = "intersection")]
    Intersection { types: Vec<Node> },
    #[serde(rename = "template")]
    Template { elements: Vec<TemplatePiece> },

    #[serde(rename = "typeParameter")]
    TypeParameter {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        constraint: Option<Box<Node>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Box<Node>>,
    },
    #[serde(rename = "parameter")]
    Parameter {
        name: String,
        value: Box<Node>,
        optional: bool,
        rest: bool,
    },

    #[serde(rename = "enum")]
    Enum {
        name: String,
        members: Vec<EnumMember>,
    },
    #[serde(rename = "enumMember")]
    EnumMember {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    #[serde(rename = "interface")]
    Interface {
        id: NodeId,
        name: String,
        extends: Vec<Node>,
        properties: IndexMap<String, Node>,
        type_parameters: Vec<Node>,
    },
    #[serde(rename = "property")]
    Property {
        name: String,
        value: Box<Node>,
        optional: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        index_type: Option<Box<Node>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        inherited_from: Option<NodeId>,
    },
    #[serde(rename = "method")]
    Method {
        name: String,
        value: Box<Node>,
        optional: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        inherited_from: Option<NodeId>,
    },
    #[serde(rename = "function")]
    Function {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<NodeId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        parameters: Vec<Node>,
        #[serde(rename = "return")]
        return_type: Box<Node>,
        type_parameters: Vec<Node>,
    },
    #[serde(rename = "component")]
    Component {
        id: NodeId,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        props: Option<Box<Node>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(rename = "ref")]
        component_ref: Option<Box<Node>>,
        type_parameters: Vec<Node>,
    },

    #[serde(rename = "application")]
    Application {
        base: Box<Node>,
        type_parameters: Vec<Node>,
    },
    #[serde(rename = "identifier")]
    Identifier { name: String },
    #[serde(rename = "reference")]
    Reference {
        local: String,
        imported: String,
        specifier: String,
    },
    #[serde(rename = "alias")]
    Alias {
        id: NodeId,
        name: String,
        value: Box<Node>,
        type_parameters: Vec<Node>,
    },
    #[serde(rename = "typeOperator")]
    TypeOperator {
        operator: TypeOperatorKind,
        value: Box<Node>,
    },
    /// Legacy pattern-matching-compatibility variant for `keyof` (§9):
    /// the transformer never produces this, only `typeOperator{operator:
    /// keyof}`; the linker still matches on it so that hand-authored or
    /// externally-produced trees in either shape evaluate identically.
    #[serde(rename = "keyof")]
    Keyof {
        #[serde(rename = "keyof")]
        operand: Box<Node>,
    },
    #[serde(rename = "conditional")]
    Conditional {
        check_type: Box<Node>,
        extends_type: Box<Node>,
        true_type: Box<Node>,
        false_type: Box<Node>,
    },
    #[serde(rename = "indexedAccess")]
    IndexedAccess {
        object_type: Box<Node>,
        index_type: Box<Node>,
    },
    #[serde(rename = "link")]
    Link { id: NodeId },
}

/// A documentation node: variant payload plus shared doc fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(flatten)]
    #[serde(skip_serializing_if = "DocMeta::is_empty")]
    pub doc: DocMeta,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            doc: DocMeta::default(),
        }
    }

    pub fn with_doc(kind: NodeKind, doc: DocMeta) -> Self {
        Node { kind, doc }
    }

    pub fn keyword(kind: NodeKind) -> Self {
        Node::new(kind)
    }

    /// `id` of the node when it is one of the two link-eligible kinds
    /// (`interface`, `alias` — §3 invariant), else `None`.
    pub fn link_id(&self) -> Option<&NodeId> {
        match &self.kind {
            NodeKind::Interface { id, .. } | NodeKind::Alias { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn type_parameters(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Interface { type_parameters, .. }
            | NodeKind::Alias { type_parameters, .. }
            | NodeKind::Component { type_parameters, .. }
            | NodeKind::Function { type_parameters, .. } => Some(type_parameters),
            _ => None,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, NodeKind::Interface { .. })
    }

    pub fn is_object_like(&self) -> bool {
        matches!(self.kind, NodeKind::Interface { .. } | NodeKind::Object { .. })
    }

    /// Borrowed view of an interface/object's property map, if applicable.
    pub fn properties(&self) -> Option<&IndexMap<String, Node>> {
        match &self.kind {
            NodeKind::Interface { properties, .. } | NodeKind::Object { properties } => {
                Some(properties)
            }
            _ => None,
        }
    }

    /// Direct children, for read-only tree walks that don't need the
    /// linker's context-aware rewriting (`tsdoc-loader`'s same-file
    /// reference discovery and cached-link collection both build on this
    /// rather than duplicating the match).
    pub fn child_nodes(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Array { element_type } => vec![element_type.as_ref()],
            NodeKind::Tuple { elements } | NodeKind::Union { elements } => elements.iter().collect(),
            NodeKind::Intersection { types } => types.iter().collect(),
            NodeKind::Template { elements } => elements
                .iter()
                .filter_map(|p| match p {
                    TemplatePiece::Expr(e) => Some(e.as_ref()),
                    TemplatePiece::Literal(_) => None,
                })
                .collect(),
            NodeKind::TypeParameter {
                constraint,
                default,
                ..
            } => constraint
                .iter()
                .map(|b| b.as_ref())
                .chain(default.iter().map(|b| b.as_ref()))
                .collect(),
            NodeKind::Parameter { value, .. } => vec![value.as_ref()],
            NodeKind::Interface {
                extends,
                properties,
                type_parameters,
                ..
            } => extends
                .iter()
                .chain(properties.values())
                .chain(type_parameters.iter())
                .collect(),
            NodeKind::Object { properties } => properties.values().collect(),
            NodeKind::Property {
                value, index_type, ..
            } => {
                let mut v = vec![value.as_ref()];
                if let Some(i) = index_type {
                    v.push(i.as_ref());
                }
                v
            }
            NodeKind::Method { value, .. } => vec![value.as_ref()],
            NodeKind::Function {
                parameters,
                return_type,
                type_parameters,
                ..
            } => parameters
                .iter()
                .chain(std::iter::once(return_type.as_ref()))
                .chain(type_parameters.iter())
                .collect(),
            NodeKind::Component {
                props,
                component_ref,
                type_parameters,
                ..
            } => props
                .iter()
                .map(|b| b.as_ref())
                .chain(component_ref.iter().map(|b| b.as_ref()))
                .chain(type_parameters.iter())
                .collect(),
            NodeKind::Application {
                base,
                type_parameters,
            } => std::iter::once(base.as_ref())
                .chain(type_parameters.iter())
                .collect(),
            NodeKind::Alias {
                value,
                type_parameters,
                ..
            } => std::iter::once(value.as_ref())
                .chain(type_parameters.iter())
                .collect(),
            NodeKind::TypeOperator { value, .. } => vec![value.as_ref()],
            NodeKind::Keyof { operand } => vec![operand.as_ref()],
            NodeKind::Conditional {
                check_type,
                extends_type,
                true_type,
                false_type,
            } => vec![check_type, extends_type, true_type, false_type]
                .into_iter()
                .map(|b| b.as_ref())
                .collect(),
            NodeKind::IndexedAccess {
                object_type,
                index_type,
            } => vec![object_type.as_ref(), index_type.as_ref()],
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
            | NodeKind::Reference { .. }
            | NodeKind::Link { .. } => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_nodes_walks_array_element() {
        let n = Node::new(NodeKind::Array {
            element_type: Box::new(Node::new(NodeKind::String { value: None })),
        });
        assert_eq!(n.child_nodes().len(), 1);
    }

    #[test]
    fn child_nodes_empty_for_keywords_and_references() {
        let n = Node::new(NodeKind::Reference {
            local: "A".into(),
            imported: "A".into(),
            specifier: "".into(),
        });
        assert!(n.child_nodes().is_empty());
    }

    #[test]
    fn serializes_keyword_variant_without_braces_noise() {
        let n = Node::new(NodeKind::Never);
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v, serde_json::json!({"type": "never"}));
    }

    #[test]
    fn serializes_number_literal_value_as_string() {
        let n = Node::new(NodeKind::Number {
            value: Some("1".to_string()),
        });
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v["value"], serde_json::json!("1"));
    }

    #[test]
    fn omits_empty_doc_fields() {
        let n = Node::new(NodeKind::String { value: None });
        let v = serde_json::to_value(&n).unwrap();
        assert!(v.get("description").is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let n = Node::new(NodeKind::Interface {
            id: NodeId::new("/a.ts", "Foo"),
            name: "Foo".to_string(),
            extends: vec![],
            properties: IndexMap::new(),
            type_parameters: vec![],
        });
        let s = serde_json::to_string(&n).unwrap();
        let back: Node = serde_json::from_str(&s).unwrap();
        assert_eq!(n, back);
    }
}

//! Per-invocation linker state (§9 "Mutable shared walker state"): the
//! parameter stack, key stack, node table, and cycle-breaking in-progress
//! set threaded through the recursive visitor by `&mut` reference, never
//! as thread-locals or statics.

use std::collections::HashMap;

use indexmap::IndexMap;
use tsdoc_common::NodeId;
use tsdoc_model::{Asset, Node};

/// Synthetic key-stack entries for the structural positions §4.6's
/// should-merge predicate inspects. Property traversals push the
/// property's own name instead.
pub const KEY_PROPS: &str = "props";
pub const KEY_EXTENDS: &str = "extends";
pub const KEY_BASE: &str = "base";

pub struct LinkCtx<'a> {
    /// This file's other top-level declarations, by local name, available
    /// so a same-file `reference` (empty `specifier`) can be resolved
    /// without a dependency lookup (§4.6 rule 1 "falling back to the
    /// primary asset").
    pub locals: &'a IndexMap<String, Node>,
    /// Already-linked `Asset`s for every file this one imports from, keyed
    /// by the import specifier string as written in this file (not by
    /// resolved path — the transformer recorded dependencies the same
    /// way, so the keys line up without a second resolver pass here).
    pub dependencies: &'a IndexMap<String, Asset>,
    /// Interfaces/aliases captured as the walk visits them (§4.6 rules 6,
    /// 7), keyed by id. Collected into the output `links` map by Pass B.
    pub node_table: IndexMap<NodeId, Node>,
    /// Type-parameter name -> bound Node, one frame per generic
    /// instantiation currently in scope. Looked up innermost-first.
    pub param_stack: Vec<HashMap<String, Node>>,
    /// Property-name path from the export root, plus the synthetic
    /// `KEY_*` markers for structural positions (§4.6).
    pub key_stack: Vec<String>,
    /// True while walking the operand of a `typeOperator { operator: keyof }`
    /// node — `keyof`'s operand always merges inline regardless of the
    /// surrounding key (§4.6 should-merge predicate).
    pub keyof_context: bool,
    /// Reentry guard for the cyclic-reference cut (§9 "Cyclic type
    /// references", §4.6 "Walker contract"): identity-keyed, not
    /// structural, since two distinct declarations can be structurally
    /// identical.
    pub visiting: std::collections::HashSet<NodeId>,
}

impl<'a> LinkCtx<'a> {
    pub fn new(locals: &'a IndexMap<String, Node>, dependencies: &'a IndexMap<String, Asset>) -> Self {
        LinkCtx {
            locals,
            dependencies,
            node_table: IndexMap::new(),
            param_stack: Vec::new(),
            key_stack: Vec::new(),
            keyof_context: false,
            visiting: std::collections::HashSet::new(),
        }
    }

    pub fn bound_param(&self, name: &str) -> Option<&Node> {
        self.param_stack.last().and_then(|frame| frame.get(name))
    }

    pub fn should_merge(&self) -> bool {
        if self.keyof_context {
            return true;
        }
        let Some(top) = self.key_stack.last() else {
            return true;
        };
        if top == KEY_PROPS || top == KEY_EXTENDS {
            return true;
        }
        if top == KEY_BASE {
            if let Some(parent) = self.key_stack.get(self.key_stack.len().wrapping_sub(2)) {
                return parent == KEY_PROPS || parent == KEY_EXTENDS;
            }
        }
        false
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.key_stack.push(key.into());
    }

    pub fn pop_key(&mut self) {
        self.key_stack.pop();
    }

    /// Looks up a same-file declaration by local name, for the `reference`
    /// fallback path (§4.6 rule 1).
    pub fn local(&self, name: &str) -> Option<Node> {
        self.locals.get(name).cloned()
    }

    pub fn dependency_export(&self, specifier: &str, imported: &str) -> Option<Node> {
        self.dependencies
            .get(specifier)
            .and_then(|asset| asset.exports.get(imported))
            .cloned()
    }

    /// Resolves a `link { id }` by id, first against this walk's own
    /// node table, then against every dependency's already-linked
    /// `links` map (§4.6 Pass B).
    pub fn lookup_link(&self, id: &NodeId) -> Option<Node> {
        if let Some(node) = self.node_table.get(id) {
            return Some(node.clone());
        }
        self.dependencies
            .values()
            .find_map(|asset| asset.links.get(id).cloned())
    }
}

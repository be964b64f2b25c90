//! AST-to-Node Transformer (§4.5).
//!
//! Converts a single declaration — named by local identifier within a
//! file's [`FileScope`] — into a documentation [`Node`]. The transformer is
//! a structural dispatch over swc's TypeScript AST: [`types`] handles type
//! positions, [`decls`] handles the top-level declaration forms (interface,
//! alias, enum, class, function/component, variable), and [`jsdoc`] pulls
//! doc-comment text from the raw source. [`scope`] builds the per-file
//! lookup table ("globalTypes" in §4.5) that both consult.
//!
//! Two side channels accumulate as a [`TransformCtx`] is threaded through a
//! transform call: the dependency list (imports actually referenced by the
//! declarations transformed so far) and doc-comment lookup. Neither is
//! global — each `load()` gets a fresh context (§5).

pub mod decls;
pub mod jsdoc;
pub mod scope;
pub mod types;

use std::path::PathBuf;

use indexmap::IndexMap;
use swc_core::common::BytePos;
use tsdoc_model::{DocMeta, Node};

pub use scope::FileScope;

/// How an import clause introduced a local name (§4.5 "dependencies").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    Symbol,
    Default,
    Namespace,
}

/// One imported binding the transformer actually touched while walking a
/// declaration, recorded so the orchestrator knows which dependency files
/// it must also load (§4.5, §4.9 "symbol-scoped loading").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedName {
    pub kind: ImportKind,
    pub local_name: String,
    pub source_name: String,
}

/// Dependencies are grouped by specifier, matching §4.5's
/// `{ specifier, imports: [...] }` shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyRecord {
    pub specifier: String,
    pub imports: Vec<ImportedName>,
}

/// Per-call transform state: the file being transformed, its source text
/// (for JSDoc lookup), and the dependency list accumulated so far.
///
/// Stateless across calls — a fresh `TransformCtx` is built per file per
/// orchestrator invocation, never shared or reused across a suspension
/// point (§5).
pub struct TransformCtx<'a> {
    pub file: PathBuf,
    source: &'a str,
    byte_pos_base: u32,
    dependencies: IndexMap<String, DependencyRecord>,
}

impl<'a> TransformCtx<'a> {
    pub fn new(file: PathBuf, source: &'a str, byte_pos_base: u32) -> Self {
        TransformCtx {
            file,
            source,
            byte_pos_base,
            dependencies: IndexMap::new(),
        }
    }

    /// Records that `local_name` (bound by an import of `source_name` from
    /// `specifier`) was referenced while transforming a declaration.
    /// Idempotent: re-recording the same binding from multiple reference
    /// sites does not duplicate the entry.
    pub fn record_dependency(
        &mut self,
        specifier: &str,
        kind: ImportKind,
        local_name: &str,
        source_name: &str,
    ) {
        let record = self
            .dependencies
            .entry(specifier.to_string())
            .or_insert_with(|| DependencyRecord {
                specifier: specifier.to_string(),
                imports: Vec::new(),
            });
        let already = record
            .imports
            .iter()
            .any(|i| i.local_name == local_name && i.kind == kind);
        if !already {
            record.imports.push(ImportedName {
                kind,
                local_name: local_name.to_string(),
                source_name: source_name.to_string(),
            });
        }
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.dependencies.values()
    }

    pub fn into_dependencies(self) -> Vec<DependencyRecord> {
        self.dependencies.into_values().collect()
    }

    /// Looks up the JSDoc comment immediately preceding `pos` (a swc
    /// `BytePos` in this file's coordinate space), full tag set included —
    /// `@param`/`@returns` text is only meaningful to a function/method
    /// builder, which distributes it onto the nested `parameter`/`return`
    /// nodes rather than keeping it on the declaring node (§4.5). Returns
    /// the default (empty) `JsDoc` when there is no preceding comment.
    pub fn jsdoc_at(&self, pos: BytePos) -> jsdoc::JsDoc {
        let offset = pos.0.saturating_sub(self.byte_pos_base) as usize;
        jsdoc::jsdoc_before(self.source, offset).unwrap_or_default()
    }

    /// Looks up the JSDoc comment immediately preceding `pos` and reduces
    /// it to the shared [`DocMeta`] shape (description/access/default/
    /// selector only). Use [`Self::jsdoc_at`] instead when building a
    /// `function`/`method` node, so `@param`/`@returns` text reaches the
    /// nested nodes too.
    pub fn doc_at(&self, pos: BytePos) -> DocMeta {
        self.jsdoc_at(pos).into_doc_meta()
    }
}

/// Transforms the declaration bound to `local_name` in `scope`, or `None`
/// when no such binding exists (the orchestrator/graph resolver already
/// verified existence before calling in; this is a defensive `None` for a
/// name that does not resolve, per §7's "requested export not found"
/// policy one layer up).
///
/// A variable declarator with no initializer produces no node (§4.5) —
/// also surfaced as `None` here.
pub fn transform_declaration(
    local_name: &str,
    scope: &FileScope,
    ctx: &mut TransformCtx,
) -> Option<Node> {
    if let Some(decl) = scope.decls.get(local_name).copied() {
        return Some(decls::transform_type_decl(decl, scope, ctx));
    }
    if let Some(var) = scope.vars.get(local_name).copied() {
        return decls::transform_var_declarator(var, scope, ctx);
    }
    tracing::warn!("unknown local declaration: {local_name}");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn transform_src(src: &str, name: &str) -> Option<Node> {
        let module = tsdoc_parser::parse_module(Path::new("/f.ts"), src).unwrap();
        let scope = FileScope::build(&module);
        let mut ctx = TransformCtx::new(PathBuf::from("/f.ts"), src, 0);
        transform_declaration(name, &scope, &mut ctx)
    }

    #[test]
    fn transforms_simple_interface() {
        let node = transform_src("export interface Base { value: number; }", "Base").unwrap();
        assert!(node.is_interface());
        assert!(node.properties().unwrap().contains_key("value"));
    }

    #[test]
    fn variable_without_initializer_produces_no_node() {
        let node = transform_src("export let value: number;", "value");
        assert!(node.is_none());
    }

    #[test]
    fn records_dependency_for_referenced_import() {
        let module =
            tsdoc_parser::parse_module(Path::new("/f.ts"), "import { A } from './a';\nexport interface B { a: A; }")
                .unwrap();
        let scope = FileScope::build(&module);
        let mut ctx = TransformCtx::new(PathBuf::from("/f.ts"), "", 0);
        transform_declaration("B", &scope, &mut ctx).unwrap();
        let deps = ctx.into_dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].specifier, "./a");
        assert_eq!(deps[0].imports[0].source_name, "A");
    }
}

//! Export Gatherer (§4.3).
//!
//! A single-file pass that enumerates every `export` statement into three
//! classified lists plus a type-scope table. This is the leaf of the
//! traversal the export-graph resolver (`tsdoc-graph`) drives — it never
//! looks past the one file it is given.

use swc_core::ecma::ast::*;

/// Where a publicly exported name's declaration lives, before any
/// cross-file following (§4.3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportTarget {
    /// The declaration with this local name lives in the gathered file.
    Local { local_name: String },
    /// `export * as Foo from "x"` — `Foo` names the *whole module* `x`,
    /// not a single declaration in the gathered file.
    Namespace { source_specifier: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceExport {
    pub public_name: String,
    pub target: ExportTarget,
}

/// A named (possibly renamed) re-export: `export { sourceName as exportName } from "spec"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReExport {
    pub export_name: String,
    pub source_name: String,
    pub source_specifier: String,
}

/// `export * from "spec"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardExport {
    pub source_specifier: String,
}

/// Names declared as `type`/`interface`/`enum`/`class`/`module`/ambient
/// function in this file, regardless of export status. Consulted by a
/// local export's binding lookup after the parser facade's value bindings
/// come up empty (§4.3).
#[derive(Clone, Debug, Default)]
pub struct TypeScopeTable {
    names: std::collections::HashSet<String>,
}

impl TypeScopeTable {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[derive(Clone, Debug, Default)]
pub struct GatherResult {
    pub source_exports: Vec<SourceExport>,
    pub re_exports: Vec<ReExport>,
    pub wildcard_exports: Vec<WildcardExport>,
    pub type_scope: TypeScopeTable,
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string(),
    }
}

fn decl_names(decl: &Decl, type_scope: &mut TypeScopeTable) -> Vec<String> {
    match decl {
        Decl::Class(c) => {
            type_scope.names.insert(c.ident.sym.to_string());
            vec![c.ident.sym.to_string()]
        }
        Decl::Fn(f) => {
            if f.declare {
                type_scope.names.insert(f.ident.sym.to_string());
            }
            vec![f.ident.sym.to_string()]
        }
        Decl::Var(v) => v
            .decls
            .iter()
            .filter_map(|d| pat_name(&d.name))
            .collect(),
        Decl::TsInterface(i) => {
            type_scope.names.insert(i.id.sym.to_string());
            vec![i.id.sym.to_string()]
        }
        Decl::TsTypeAlias(a) => {
            type_scope.names.insert(a.id.sym.to_string());
            vec![a.id.sym.to_string()]
        }
        Decl::TsEnum(e) => {
            type_scope.names.insert(e.id.sym.to_string());
            vec![e.id.sym.to_string()]
        }
        Decl::TsModule(m) => {
            if let TsModuleName::Ident(ident) = &m.id {
                type_scope.names.insert(ident.sym.to_string());
                vec![ident.sym.to_string()]
            } else {
                vec![]
            }
        }
        Decl::Using(_) | Decl::TsEnumMember(_) => vec![],
    }
}

fn pat_name(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(i) => Some(i.id.sym.to_string()),
        _ => None,
    }
}

/// Walks a parsed module's top-level items, classifying every export and
/// indexing every type-ish declaration (§4.3).
pub fn gather(module: &Module) -> GatherResult {
    let mut result = GatherResult::default();

    // First pass: index every type/interface/enum/class/module/ambient-fn
    // declaration regardless of export status, so local export lookups
    // (and later, identifier resolution in the transformer) can find them.
    for item in &module.body {
        let decl = match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(e)) => Some(&e.decl),
            ModuleItem::Stmt(Stmt::Decl(d)) => Some(d),
            _ => None,
        };
        if let Some(decl) = decl {
            decl_names(decl, &mut result.type_scope);
        }
    }

    for item in &module.body {
        let ModuleItem::ModuleDecl(module_decl) = item else {
            continue;
        };
        match module_decl {
            ModuleDecl::ExportDecl(export_decl) => {
                let mut scratch = TypeScopeTable::default();
                for name in decl_names(&export_decl.decl, &mut scratch) {
                    result.source_exports.push(SourceExport {
                        public_name: name.clone(),
                        target: ExportTarget::Local { local_name: name },
                    });
                }
            }
            ModuleDecl::ExportNamed(named) => {
                for spec in &named.specifiers {
                    match (spec, &named.src) {
                        (ExportSpecifier::Named(n), Some(src)) => {
                            let source_name = export_name(&n.orig);
                            let export_name = n
                                .exported
                                .as_ref()
                                .map(export_name)
                                .unwrap_or_else(|| source_name.clone());
                            result.re_exports.push(ReExport {
                                export_name,
                                source_name,
                                source_specifier: src.value.to_string(),
                            });
                        }
                        (ExportSpecifier::Named(n), None) => {
                            let local_name = export_name(&n.orig);
                            let public_name = n
                                .exported
                                .as_ref()
                                .map(export_name)
                                .unwrap_or_else(|| local_name.clone());
                            result.source_exports.push(SourceExport {
                                public_name,
                                target: ExportTarget::Local { local_name },
                            });
                        }
                        (ExportSpecifier::Namespace(ns), Some(src)) => {
                            result.source_exports.push(SourceExport {
                                public_name: export_name(&ns.name),
                                target: ExportTarget::Namespace {
                                    source_specifier: src.value.to_string(),
                                },
                            });
                        }
                        (ExportSpecifier::Namespace(_), None) => {
                            // `export * as ns` with no source is not valid syntax; ignore.
                        }
                        (ExportSpecifier::Default(_), _) => {
                            // `export { default as Foo } from "x"` — default exports
                            // are a non-goal (§1); skip.
                        }
                    }
                }
            }
            ModuleDecl::ExportAll(export_all) => {
                result.wildcard_exports.push(WildcardExport {
                    source_specifier: export_all.src.value.to_string(),
                });
            }
            ModuleDecl::ExportDefaultDecl(_) | ModuleDecl::ExportDefaultExpr(_) => {
                // Default exports: recognized, produce no entries (§4.3).
            }
            ModuleDecl::Import(_)
            | ModuleDecl::TsImportEquals(_)
            | ModuleDecl::TsExportAssignment(_)
            | ModuleDecl::TsNamespaceExport(_) => {
                // Imports are handled by the transformer's dependency
                // tracking; `export =`/`import =` namespace forms are not
                // part of this loader's supported export surface.
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn gather_src(src: &str) -> GatherResult {
        let module = tsdoc_parser::parse_module(Path::new("/f.ts"), src).unwrap();
        gather(&module)
    }

    #[test]
    fn classifies_local_source_export() {
        let r = gather_src("export interface Base { value: number; }");
        assert_eq!(r.source_exports.len(), 1);
        assert_eq!(r.source_exports[0].public_name, "Base");
        assert!(r.type_scope.contains("Base"));
    }

    #[test]
    fn classifies_named_reexport_with_rename() {
        let r = gather_src(r#"export { Base as Foo } from "./base";"#);
        assert_eq!(r.re_exports.len(), 1);
        assert_eq!(r.re_exports[0].export_name, "Foo");
        assert_eq!(r.re_exports[0].source_name, "Base");
        assert_eq!(r.re_exports[0].source_specifier, "./base");
    }

    #[test]
    fn classifies_wildcard_export() {
        let r = gather_src(r#"export * from "./a";"#);
        assert_eq!(r.wildcard_exports.len(), 1);
        assert_eq!(r.wildcard_exports[0].source_specifier, "./a");
    }

    #[test]
    fn classifies_namespace_reexport() {
        let r = gather_src(r#"export * as Foo from "./foo";"#);
        assert_eq!(r.source_exports.len(), 1);
        match &r.source_exports[0].target {
            ExportTarget::Namespace { source_specifier } => assert_eq!(source_specifier, "./foo"),
            _ => panic!("expected namespace target"),
        }
    }

    #[test]
    fn ignores_default_export() {
        let r = gather_src("export default function () {}");
        assert!(r.source_exports.is_empty());
    }

    #[test]
    fn local_rebind_export_is_a_source_export() {
        let r = gather_src("function f() {}\nexport { f as g };");
        assert_eq!(r.source_exports.len(), 1);
        assert_eq!(r.source_exports[0].public_name, "g");
        assert_eq!(
            r.source_exports[0].target,
            ExportTarget::Local {
                local_name: "f".to_string()
            }
        );
    }
}

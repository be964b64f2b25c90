//! A single file's top-level declarations and import bindings, built once
//! per transform and consulted whenever an identifier needs resolving
//! (§4.5 "globalTypes").

use std::collections::HashMap;

use swc_core::ecma::ast::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    Symbol,
    Default,
    Namespace,
}

#[derive(Clone, Debug)]
pub struct ImportBinding {
    pub source_name: String,
    pub specifier: String,
    pub kind: ImportKind,
}

/// A name declared somewhere in the module's top level, as the kind of
/// thing the transformer knows how to turn into a `Node`.
#[derive(Clone, Copy, Debug)]
pub enum TypeDecl<'a> {
    Interface(&'a TsInterfaceDecl),
    Alias(&'a TsTypeAliasDecl),
    Enum(&'a TsEnumDecl),
    Class(&'a ClassDecl),
    Function(&'a FnDecl),
}

#[derive(Default)]
pub struct FileScope<'a> {
    pub decls: HashMap<String, TypeDecl<'a>>,
    pub vars: HashMap<String, &'a VarDeclarator>,
    pub imports: HashMap<String, ImportBinding>,
}

impl<'a> FileScope<'a> {
    pub fn build(module: &'a Module) -> Self {
        let mut scope = FileScope::default();

        for item in &module.body {
            match item {
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(e)) => scope.index_decl(&e.decl),
                ModuleItem::Stmt(Stmt::Decl(d)) => scope.index_decl(d),
                ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => scope.index_import(import),
                _ => {}
            }
        }

        scope
    }

    fn index_decl(&mut self, decl: &'a Decl) {
        match decl {
            Decl::TsInterface(i) => {
                self.decls
                    .insert(i.id.sym.to_string(), TypeDecl::Interface(i));
            }
            Decl::TsTypeAlias(a) => {
                self.decls.insert(a.id.sym.to_string(), TypeDecl::Alias(a));
            }
            Decl::TsEnum(e) => {
                self.decls.insert(e.id.sym.to_string(), TypeDecl::Enum(e));
            }
            Decl::Class(c) => {
                self.decls
                    .insert(c.ident.sym.to_string(), TypeDecl::Class(c));
            }
            Decl::Fn(f) => {
                self.decls
                    .insert(f.ident.sym.to_string(), TypeDecl::Function(f));
            }
            Decl::Var(v) => {
                for d in &v.decls {
                    if let Pat::Ident(ident) = &d.name {
                        self.vars.insert(ident.id.sym.to_string(), d);
                    }
                }
            }
            Decl::TsModule(_) | Decl::Using(_) | Decl::TsEnumMember(_) => {}
        }
    }

    fn index_import(&mut self, import: &ImportDecl) {
        let specifier = import.src.value.to_string();
        for spec in &import.specifiers {
            match spec {
                ImportSpecifier::Named(n) => {
                    let local = n.local.sym.to_string();
                    let source_name = n
                        .imported
                        .as_ref()
                        .map(|m| match m {
                            ModuleExportName::Ident(i) => i.sym.to_string(),
                            ModuleExportName::Str(s) => s.value.to_string(),
                        })
                        .unwrap_or_else(|| local.clone());
                    self.imports.insert(
                        local,
                        ImportBinding {
                            source_name,
                            specifier: specifier.clone(),
                            kind: ImportKind::Symbol,
                        },
                    );
                }
                ImportSpecifier::Default(d) => {
                    let local = d.local.sym.to_string();
                    self.imports.insert(
                        local.clone(),
                        ImportBinding {
                            source_name: local,
                            specifier: specifier.clone(),
                            kind: ImportKind::Default,
                        },
                    );
                }
                ImportSpecifier::Namespace(ns) => {
                    let local = ns.local.sym.to_string();
                    self.imports.insert(
                        local.clone(),
                        ImportBinding {
                            source_name: local,
                            specifier: specifier.clone(),
                            kind: ImportKind::Namespace,
                        },
                    );
                }
            }
        }
    }
}

//! Value-binding table built by a single pass over a parsed module.
//!
//! The parser facade does not track type declarations as bindings (§4.1) —
//! that is deliberately the export gatherer's job (§4.3's type-scope
//! table). This module only records *value* bindings: `var`/`let`/`const`
//! declarators, function declarations, class declarations, and import
//! clauses, each keyed by the identifier name they introduce at module
//! scope.

use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};

/// What kind of declaration introduced a value binding; used by the
/// transformer to pick the right handler without re-walking the module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Function,
    Class,
    Import,
}

#[derive(Clone, Debug)]
pub struct ValueBinding {
    pub kind: BindingKind,
}

/// Module-scope value bindings, keyed by identifier name.
///
/// A flat table rather than a nested scope chain: the transformer only
/// ever resolves identifiers that name a top-level exported declaration or
/// one of its direct dependents, so a single module-level table is
/// sufficient here (the engineering budget for this facade is
/// deliberately small, per §2's per-component share).
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    by_name: std::collections::HashMap<String, ValueBinding>,
}

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&ValueBinding> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn collect(module: &Module) -> Bindings {
        let mut visitor = BindingVisitor {
            bindings: Bindings::default(),
        };
        module.visit_with(&mut visitor);
        visitor.bindings
    }
}

struct BindingVisitor {
    bindings: Bindings,
}

impl BindingVisitor {
    fn insert(&mut self, name: String, kind: BindingKind) {
        self.bindings
            .by_name
            .insert(name, ValueBinding { kind });
    }

    fn insert_pat(&mut self, pat: &Pat, kind: BindingKind) {
        match pat {
            Pat::Ident(ident) => self.insert(ident.id.sym.to_string(), kind),
            Pat::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    self.insert_pat(elem, kind);
                }
            }
            Pat::Object(obj) => {
                for prop in &obj.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => self.insert_pat(&kv.value, kind),
                        ObjectPatProp::Assign(a) => {
                            self.insert(a.key.sym.to_string(), kind)
                        }
                        ObjectPatProp::Rest(r) => self.insert_pat(&r.arg, kind),
                    }
                }
            }
            Pat::Rest(r) => self.insert_pat(&r.arg, kind),
            Pat::Assign(a) => self.insert_pat(&a.left, kind),
            _ => {}
        }
    }
}

impl Visit for BindingVisitor {
    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        self.insert_pat(&node.name, BindingKind::Var);
        node.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.insert(node.ident.sym.to_string(), BindingKind::Function);
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.insert(node.ident.sym.to_string(), BindingKind::Class);
        node.visit_children_with(self);
    }

    fn visit_import_named_specifier(&mut self, node: &ImportNamedSpecifier) {
        self.insert(node.local.sym.to_string(), BindingKind::Import);
    }

    fn visit_import_default_specifier(&mut self, node: &ImportDefaultSpecifier) {
        self.insert(node.local.sym.to_string(), BindingKind::Import);
    }

    fn visit_import_star_as_specifier(&mut self, node: &ImportStarAsSpecifier) {
        self.insert(node.local.sym.to_string(), BindingKind::Import);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn collects_top_level_value_bindings() {
        let src = "import { A } from './a';\nexport function f() {}\nexport const g = 1;\nexport class C {}\n";
        let module = crate::parse_module(Path::new("/x.ts"), src).unwrap();
        let bindings = Bindings::collect(&module);
        assert!(bindings.contains("A"));
        assert!(bindings.contains("f"));
        assert!(bindings.contains("g"));
        assert!(bindings.contains("C"));
    }
}

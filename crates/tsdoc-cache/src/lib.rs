//! Loader Cache (§4.8).
//!
//! Persistent across requests. Three maps, two kept here and one
//! delegated: parsed ASTs live in the [`tsdoc_parser::ParserFacade`]
//! this cache wraps (so the parser crate doesn't need to know about the
//! other two); the export-graph map is keyed by absolute file path; the
//! linked-symbol map is keyed by [`NodeId`]. Invalidating a file path
//! evicts that file's AST, its export-map entry, and every symbol whose
//! `NodeId`'s file equals the path — re-exports originating from other
//! files are unaffected (§4.8, §9 "Caching semantics").
//!
//! Internal synchronization is per-entry (`DashMap`'s sharded locking),
//! matching §5's "one lock per file path" policy: a `get`-then-`set`
//! sequence for one file never contends with a different file's.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use tsdoc_common::NodeId;
use tsdoc_graph::OriginatingExport;
use tsdoc_model::Node;
use tsdoc_parser::ParserFacade;

/// Per-file export graph, cached so repeated `load()` calls against the
/// same barrel don't re-walk its re-export chain (§4.4 "Caches per
/// file").
pub type ExportMap = HashMap<String, OriginatingExport>;

#[derive(Default)]
pub struct LoaderCache {
    pub parser: ParserFacade,
    export_maps: DashMap<PathBuf, Arc<ExportMap>>,
    symbols: DashMap<NodeId, Node>,
}

impl LoaderCache {
    pub fn new() -> Self {
        LoaderCache::default()
    }

    /// The cached export-graph map for `file`, if the export-graph
    /// resolver has already built one (§4.4 step 1).
    pub fn get_exports_from_file(&self, file: &Path) -> Option<Arc<ExportMap>> {
        self.export_maps.get(file).map(|entry| entry.clone())
    }

    /// Stores the freshly-built export-graph map for `file`. A map built
    /// while resolving a cycle (possibly incomplete, §4.4 step 4/5) is
    /// never passed here — the caller holds that case separately so a
    /// stub never gets cached (§4.9 "Circular-dependency cut").
    pub fn set_exports_from_file(&self, file: PathBuf, map: ExportMap) -> Arc<ExportMap> {
        let map = Arc::new(map);
        self.export_maps.insert(file, map.clone());
        map
    }

    /// The cached linked node for `id`, if this symbol has already been
    /// loaded and linked.
    pub fn get_symbol(&self, id: &NodeId) -> Option<Node> {
        self.symbols.get(id).map(|entry| entry.clone())
    }

    pub fn set_symbol(&self, id: NodeId, node: Node) {
        self.symbols.insert(id, node);
    }

    pub fn has_symbol(&self, id: &NodeId) -> bool {
        self.symbols.contains_key(id)
    }

    /// Evicts everything tied to `file`: its AST, its export-map entry,
    /// and every symbol cache entry whose id names a declaration in this
    /// file. A declaration in another file that merely *links to* one of
    /// those evicted ids is left untouched — it naturally re-resolves
    /// against the repopulated cache on its own next load (§9).
    pub fn invalidate_file(&self, file: &Path) {
        self.parser.invalidate(file);
        self.export_maps.remove(file);
        self.symbols.retain(|id, _| id.file() != file);
        tracing::debug!(file = %file.display(), "invalidated cache entries for file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdoc_model::NodeKind;

    fn interface_node(id: NodeId) -> Node {
        Node::new(NodeKind::Interface {
            id,
            name: "X".to_string(),
            extends: vec![],
            properties: indexmap::IndexMap::new(),
            type_parameters: vec![],
        })
    }

    #[test]
    fn invalidate_evicts_only_symbols_from_that_file() {
        let cache = LoaderCache::new();
        let a = NodeId::new("/a.ts", "A");
        let b = NodeId::new("/b.ts", "B");
        cache.set_symbol(a.clone(), interface_node(a.clone()));
        cache.set_symbol(b.clone(), interface_node(b.clone()));

        cache.invalidate_file(Path::new("/a.ts"));

        assert!(!cache.has_symbol(&a));
        assert!(cache.has_symbol(&b));
    }

    #[test]
    fn invalidate_evicts_export_map_for_file() {
        let cache = LoaderCache::new();
        let path = PathBuf::from("/barrel.ts");
        cache.set_exports_from_file(path.clone(), ExportMap::new());
        assert!(cache.get_exports_from_file(&path).is_some());

        cache.invalidate_file(&path);
        assert!(cache.get_exports_from_file(&path).is_none());
    }

    #[test]
    fn invalidate_forces_ast_reparse() {
        let cache = LoaderCache::new();
        let path = Path::new("/a.ts");
        cache.parser.parse(path, "export const x = 1;").unwrap();
        assert!(cache.parser.is_cached(path));
        cache.invalidate_file(path);
        assert!(!cache.parser.is_cached(path));
    }
}

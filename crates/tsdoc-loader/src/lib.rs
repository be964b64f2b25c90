//! Orchestrator (§4.9).
//!
//! `load(filePath, requestedSymbols?)` is the single external entry point
//! the rest of the pipeline exists to serve. It: builds (or reuses) the
//! file's export graph, splits the requested public names into
//! already-cached and still-needed, transforms and links whatever is
//! needed, recursively loads dependencies along the way, and unions the
//! freshly-linked result with whatever the cache already had.
//!
//! Reentrancy during that recursion is cut the same way the export-graph
//! resolver cuts re-export cycles (`tsdoc-graph`'s `in_progress` set):
//! a `(file, requestedSymbols)` pair that's already being loaded higher up
//! the call stack gets an empty [`Asset::stub`] instead of recursing
//! forever (§4.9 "Circular-dependency cut").

mod host;

pub use host::Host;

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use tsdoc_cache::LoaderCache;
use tsdoc_common::{NodeId, TsDocError, TsDocResult};
use tsdoc_gather::GatherResult;
use tsdoc_graph::{ExportGraphResolver, GraphError, GraphHost, OriginatingExport};
use tsdoc_model::{Asset, Node, NodeKind};
use tsdoc_transform::{FileScope, ImportKind, TransformCtx};

fn to_tsdoc_error(err: GraphError) -> TsDocError {
    match err {
        GraphError::UnresolvableSpecifier {
            specifier,
            containing_file,
        } => TsDocError::UnresolvableImport {
            specifier,
            containing_file,
        },
        // Unresolved/circular export names are not hard errors (§7): the
        // only caller of this conversion is the top-of-graph `enumerate`
        // call, which never raises these two variants itself (they only
        // surface from the per-name `resolve` path, which this loader
        // does not call directly).
        GraphError::UnresolvedExport { file, export_name }
        | GraphError::Circular { file, export_name } => TsDocError::UnresolvableImport {
            specifier: export_name,
            containing_file: file,
        },
    }
}

/// Bridges [`GraphHost`] (what `tsdoc-graph` needs) to the cache + the
/// caller-supplied [`Host`] (what actually reads files and resolves
/// specifiers). Parse failures degrade to "this file has no exports"
/// rather than aborting graph resolution (§7 "Parse error on a file").
struct CacheGraphHost<'a> {
    cache: &'a LoaderCache,
    host: &'a dyn Host,
}

impl<'a> GraphHost for CacheGraphHost<'a> {
    fn gather(&self, file: &Path) -> Arc<GatherResult> {
        let source = match self.host.get_source(file) {
            Ok(s) => s,
            Err(_) => return Arc::new(GatherResult::default()),
        };
        match self.cache.parser.parse(file, &source) {
            Ok(parsed) => Arc::new(tsdoc_gather::gather(&parsed.module)),
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "parse error; treating file as having no exports");
                Arc::new(GatherResult::default())
            }
        }
    }

    fn resolve_specifier(
        &self,
        specifier: &str,
        containing_file: &Path,
    ) -> Result<PathBuf, GraphError> {
        self.host
            .resolve(specifier, containing_file)
            .map_err(|e| GraphError::UnresolvableSpecifier {
                specifier: e.specifier,
                containing_file: e.containing_file,
            })
    }
}

/// A `(file, sorted requested names)` in-progress key. `None` means "the
/// full export set" — distinct from any concrete subset, including the
/// empty one.
type ProgressKey = (PathBuf, Option<Vec<String>>);

fn progress_key(file: &Path, requested: Option<&[String]>) -> ProgressKey {
    let symbols = requested.map(|s| {
        let mut v = s.to_vec();
        v.sort();
        v.dedup();
        v
    });
    (file.to_path_buf(), symbols)
}

/// The host-parameterized loader (§6). Stateless itself — every call
/// operates against the [`Host`] it is given, which owns the shared
/// [`LoaderCache`].
#[derive(Default)]
pub struct Orchestrator;

impl Orchestrator {
    pub fn new() -> Self {
        Orchestrator
    }

    /// Loads `requested_symbols` (or every public export, if `None`) from
    /// `file`. Propagates [`TsDocError::UnresolvableImport`] /
    /// [`TsDocError::SourceUnavailable`] only for the hard-error cases
    /// named in §7; everything else that goes wrong along the way
    /// degrades to a missing entry in the returned `Asset`.
    pub fn load(
        &self,
        host: &dyn Host,
        file: &Path,
        requested_symbols: Option<&[String]>,
    ) -> TsDocResult<Asset> {
        // Only the entry file's unreadable source is a hard error (§7);
        // a dependency that fails to read is skipped further down.
        host.get_source(file)
            .map_err(|reason| TsDocError::SourceUnavailable {
                file: file.to_path_buf(),
                reason: reason.to_string(),
            })?;

        let mut in_progress = HashSet::new();
        self.load_inner(host, file, requested_symbols, &mut in_progress)
    }

    fn load_inner(
        &self,
        host: &dyn Host,
        file: &Path,
        requested: Option<&[String]>,
        in_progress: &mut HashSet<ProgressKey>,
    ) -> TsDocResult<Asset> {
        let key = progress_key(file, requested);
        if !in_progress.insert(key.clone()) {
            return Ok(Asset::stub(file.to_path_buf()));
        }
        let result = self.load_uncycled(host, file, requested, in_progress);
        in_progress.remove(&key);
        result
    }

    fn load_uncycled(
        &self,
        host: &dyn Host,
        file: &Path,
        requested: Option<&[String]>,
        in_progress: &mut HashSet<ProgressKey>,
    ) -> TsDocResult<Asset> {
        let cache = host.cache();
        let export_map = self.export_map_for(host, file)?;

        let wanted: Vec<String> = match requested {
            Some(names) => names.to_vec(),
            None => export_map.keys().cloned().collect(),
        };

        let mut found: IndexMap<String, Node> = IndexMap::new();
        let mut symbols: IndexMap<String, String> = IndexMap::new();
        // Names still needing transformation, grouped by the file that
        // actually declares them: (public name, local name).
        let mut by_file: IndexMap<PathBuf, Vec<(String, String)>> = IndexMap::new();

        for name in &wanted {
            let Some(origin) = export_map.get(name) else {
                continue; // §7: requested export not found is dropped silently
            };
            match origin {
                OriginatingExport::Local {
                    file: origin_file,
                    local_name,
                } => {
                    let id = NodeId::new(origin_file.clone(), local_name.clone());
                    symbols.insert(local_name.clone(), name.clone());
                    if let Some(cached) = cache.get_symbol(&id) {
                        found.insert(name.clone(), cached);
                    } else {
                        by_file
                            .entry(origin_file.clone())
                            .or_default()
                            .push((name.clone(), local_name.clone()));
                    }
                }
                OriginatingExport::Namespace { file: ns_file } => {
                    let ns_asset = self.load_inner(host, ns_file, None, in_progress)?;
                    found.insert(name.clone(), namespace_node(&ns_asset));
                    symbols.insert(tsdoc_model::WILDCARD_SYMBOL.to_string(), name.clone());
                }
            }
        }

        let mut links: IndexMap<NodeId, Node> = IndexMap::new();
        for (origin_file, entries) in by_file {
            let local_names: Vec<String> = entries.iter().map(|(_, l)| l.clone()).collect();
            let (linked_by_local, file_links) =
                self.build_and_link(host, &origin_file, &local_names, in_progress)?;
            for (id, node) in file_links {
                links.entry(id).or_insert(node);
            }
            for (public_name, local_name) in entries {
                if let Some(node) = linked_by_local.get(&local_name) {
                    found.insert(public_name, node.clone());
                }
            }
        }

        // Cache hits may still reference ids only resolvable through the
        // symbol cache (an earlier load already linked and cached them);
        // pull those into this result's links too.
        let mut seen_link_ids: HashSet<NodeId> = links.keys().cloned().collect();
        for node in found.values() {
            collect_cached_links(cache, node, &mut links, &mut seen_link_ids);
        }

        Ok(Asset {
            id: file.to_path_buf(),
            exports: found,
            links,
            symbols,
        })
    }

    fn export_map_for(
        &self,
        host: &dyn Host,
        file: &Path,
    ) -> TsDocResult<Arc<HashMap<String, OriginatingExport>>> {
        let cache = host.cache();
        if let Some(map) = cache.get_exports_from_file(file) {
            return Ok(map);
        }
        let graph_host = CacheGraphHost { cache, host };
        let resolver = ExportGraphResolver::new();
        let built = resolver
            .enumerate(&graph_host, file)
            .map_err(to_tsdoc_error)?;
        Ok(cache.set_exports_from_file(file.to_path_buf(), built))
    }

    /// Transforms `local_names` (plus whatever same-file declarations they
    /// transitively reference) out of `file`, resolves and recursively
    /// loads every dependency those declarations actually touched, links
    /// the result, and caches each newly linked declaration by its
    /// originating [`NodeId`]. Returns the linked nodes keyed by local
    /// name, plus the link table produced for them.
    fn build_and_link(
        &self,
        host: &dyn Host,
        file: &Path,
        local_names: &[String],
        in_progress: &mut HashSet<ProgressKey>,
    ) -> TsDocResult<(HashMap<String, Node>, IndexMap<NodeId, Node>)> {
        let cache = host.cache();
        let Ok(source) = host.get_source(file) else {
            return Ok((HashMap::new(), IndexMap::new()));
        };
        let Ok(parsed) = cache.parser.parse(file, &source) else {
            return Ok((HashMap::new(), IndexMap::new()));
        };

        let scope = FileScope::build(&parsed.module);
        let mut ctx = TransformCtx::new(file.to_path_buf(), &parsed.source, parsed.byte_pos_base);

        let mut raw_locals: IndexMap<String, Node> = IndexMap::new();
        let mut queued: HashSet<String> = local_names.iter().cloned().collect();
        let mut worklist: VecDeque<String> = local_names.iter().cloned().collect();

        while let Some(name) = worklist.pop_front() {
            if raw_locals.contains_key(&name) {
                continue;
            }
            let Some(node) = tsdoc_transform::transform_declaration(&name, &scope, &mut ctx)
            else {
                continue;
            };
            for refname in same_file_reference_names(&node) {
                if queued.insert(refname.clone()) {
                    worklist.push_back(refname);
                }
            }
            raw_locals.insert(name, node);
        }

        let mut dependencies: IndexMap<String, Asset> = IndexMap::new();
        for dep in ctx.into_dependencies() {
            let target =
                host.resolve(&dep.specifier, file)
                    .map_err(|_| TsDocError::UnresolvableImport {
                        specifier: dep.specifier.clone(),
                        containing_file: file.to_path_buf(),
                    })?;
            let full = dep.imports.iter().any(|i| i.kind == ImportKind::Namespace);
            let subset: Vec<String> = dep.imports.iter().map(|i| i.source_name.clone()).collect();
            let dep_asset = self.load_inner(
                host,
                &target,
                if full { None } else { Some(&subset) },
                in_progress,
            )?;
            dependencies.insert(dep.specifier, dep_asset);
        }

        let exports_for_link: IndexMap<String, Node> = local_names
            .iter()
            .filter_map(|n| raw_locals.get(n).map(|node| (n.clone(), node.clone())))
            .collect();

        let (linked, links) = tsdoc_link::link(exports_for_link, &raw_locals, &dependencies);

        for (local_name, node) in &linked {
            let id = NodeId::new(file.to_path_buf(), local_name.clone());
            cache.set_symbol(id, node.clone());
        }
        for (id, node) in &links {
            if !cache.has_symbol(id) {
                cache.set_symbol(id.clone(), node.clone());
            }
        }

        let linked_by_local: HashMap<String, Node> = linked.into_iter().collect();
        Ok((linked_by_local, links))
    }
}

/// Walks a cache-hit node for `link{id}` references and pulls each target
/// out of the symbol cache, recursively, so a result assembled entirely
/// from cache hits still carries the `links` entries a consumer needs to
/// resolve them (§4.6's "every `link{id}` is backed by an entry in
/// `links`" invariant applies to cached results too).
fn collect_cached_links(
    cache: &LoaderCache,
    node: &Node,
    out: &mut IndexMap<NodeId, Node>,
    seen: &mut HashSet<NodeId>,
) {
    if let NodeKind::Link { id } = &node.kind {
        if seen.insert(id.clone()) {
            if let Some(target) = cache.get_symbol(id) {
                collect_cached_links(cache, &target, out, seen);
                out.insert(id.clone(), target);
            }
        }
        return;
    }
    for child in node.child_nodes() {
        collect_cached_links(cache, child, out, seen);
    }
}

/// Wraps a namespace import's target `Asset` into an `object` node whose
/// properties are the namespace's own exports, so `import * as Foo` has a
/// documentable shape without inventing a node variant outside §3's closed
/// set.
fn namespace_node(asset: &Asset) -> Node {
    let properties: IndexMap<String, Node> = asset
        .exports
        .iter()
        .map(|(name, node)| {
            (
                name.clone(),
                Node::new(NodeKind::Property {
                    name: name.clone(),
                    value: Box::new(node.clone()),
                    optional: false,
                    index_type: None,
                    inherited_from: None,
                }),
            )
        })
        .collect();
    Node::new(NodeKind::Object { properties })
}

/// Finds every same-file `reference` (`specifier` empty) inside `node`, so
/// the caller knows which additional local declarations must also be
/// transformed before `tsdoc-link::link` can resolve them (§4.6 rule 1).
fn same_file_reference_names(node: &Node) -> Vec<String> {
    let mut names = Vec::new();
    collect_same_file_references(node, &mut names);
    names
}

fn collect_same_file_references(node: &Node, out: &mut Vec<String>) {
    if let NodeKind::Reference {
        imported,
        specifier,
        ..
    } = &node.kind
    {
        if specifier.is_empty() {
            out.push(imported.clone());
        }
        return;
    }
    for child in node.child_nodes() {
        collect_same_file_references(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use tsdoc_resolver::ResolveError;

    struct FsHost {
        files: StdHashMap<PathBuf, String>,
        cache: LoaderCache,
    }

    impl FsHost {
        fn new(files: &[(&str, &str)]) -> Self {
            let files: StdHashMap<PathBuf, String> = files
                .iter()
                .map(|(p, s)| (PathBuf::from(p), s.to_string()))
                .collect();
            FsHost {
                files,
                cache: LoaderCache::new(),
            }
        }

        fn resolve_in_memory(&self, specifier: &str, containing_file: &Path) -> Option<PathBuf> {
            let dir = containing_file.parent().unwrap_or_else(|| Path::new("."));
            let joined = dir.join(specifier);
            let with_ext = PathBuf::from(format!("{}.ts", joined.display()));
            if self.files.contains_key(&with_ext) {
                return Some(with_ext);
            }
            if self.files.contains_key(&joined) {
                return Some(joined);
            }
            None
        }
    }

    impl Host for FsHost {
        fn get_source(&self, file: &Path) -> std::io::Result<String> {
            self.files.get(file).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file")
            })
        }

        fn resolve(
            &self,
            specifier: &str,
            containing_file: &Path,
        ) -> Result<PathBuf, ResolveError> {
            self.resolve_in_memory(specifier, containing_file)
                .ok_or_else(|| ResolveError {
                    specifier: specifier.to_string(),
                    containing_file: containing_file.to_path_buf(),
                })
        }

        fn cache(&self) -> &LoaderCache {
            &self.cache
        }
    }

    fn names(asset: &Asset) -> Vec<String> {
        let mut v: Vec<String> = asset.exports.keys().cloned().collect();
        v.sort();
        v
    }

    #[test]
    fn loads_simple_interface() {
        let host = FsHost::new(&[("/base.ts", "export interface Base { value: number; }")]);
        let orch = Orchestrator::new();
        let asset = orch.load(&host, Path::new("/base.ts"), None).unwrap();
        assert_eq!(names(&asset), vec!["Base".to_string()]);
        assert!(asset.exports["Base"].is_interface());
    }

    #[test]
    fn follows_rename_through_reexport() {
        let host = FsHost::new(&[
            ("/base.ts", "export interface Base { value: number; }"),
            ("/barrel.ts", "export { Base as Renamed } from './base';"),
        ]);
        let orch = Orchestrator::new();
        let asset = orch.load(&host, Path::new("/barrel.ts"), None).unwrap();
        assert_eq!(names(&asset), vec!["Renamed".to_string()]);
        assert!(asset.exports["Renamed"].is_interface());
    }

    #[test]
    fn three_file_barrel_cycle_does_not_hang() {
        let host = FsHost::new(&[
            (
                "/a.ts",
                "export * from './b';\nexport interface A { value: number; }",
            ),
            ("/b.ts", "export * from './c';"),
            ("/c.ts", "export * from './a';"),
        ]);
        let orch = Orchestrator::new();
        let asset = orch.load(&host, Path::new("/a.ts"), None).unwrap();
        assert!(asset.exports.contains_key("A"));
    }

    #[test]
    fn unreferenced_import_is_never_resolved() {
        // `Unused` is imported but nothing exported from this file touches
        // it, so the transformer never records a dependency on it and the
        // orchestrator never attempts to resolve './missing' (§8 scenario 6).
        let host = FsHost::new(&[(
            "/f.ts",
            "import { Unused } from './missing';\nexport interface Kept { value: number; }",
        )]);
        let orch = Orchestrator::new();
        let asset = orch.load(&host, Path::new("/f.ts"), None).unwrap();
        assert!(asset.exports.contains_key("Kept"));
    }

    #[test]
    fn second_load_reuses_cached_symbol() {
        let host = FsHost::new(&[("/base.ts", "export interface Base { value: number; }")]);
        let orch = Orchestrator::new();
        let first = orch.load(&host, Path::new("/base.ts"), None).unwrap();
        let id = first.exports["Base"].link_id().cloned().unwrap();
        assert!(host.cache().has_symbol(&id));
        let second = orch
            .load(&host, Path::new("/base.ts"), Some(&["Base".to_string()]))
            .unwrap();
        assert_eq!(second.exports["Base"], first.exports["Base"]);
    }

    #[test]
    fn entry_file_unreadable_is_a_hard_error() {
        let host = FsHost::new(&[]);
        let orch = Orchestrator::new();
        let err = orch
            .load(&host, Path::new("/missing.ts"), None)
            .unwrap_err();
        assert!(matches!(err, TsDocError::SourceUnavailable { .. }));
    }

    #[test]
    fn omit_through_reexport_evaluates_end_to_end() {
        let host = FsHost::new(&[(
            "/f.ts",
            "export interface Base { a: string; b: number; }\n\
             export type Trimmed = Omit<Base, 'b'>;",
        )]);
        let orch = Orchestrator::new();
        let asset = orch.load(&host, Path::new("/f.ts"), None).unwrap();
        let trimmed = &asset.exports["Trimmed"];
        assert!(trimmed.is_object_like());
        let props = trimmed.properties().unwrap();
        assert!(props.contains_key("a"));
        assert!(!props.contains_key("b"));
    }

    #[test]
    fn independent_loads_do_not_interfere() {
        let host = FsHost::new(&[
            ("/a.ts", "export interface A { value: number; }"),
            ("/b.ts", "export interface B { value: number; }"),
        ]);
        let orch = Orchestrator::new();
        let a = orch.load(&host, Path::new("/a.ts"), None).unwrap();
        let b = orch.load(&host, Path::new("/b.ts"), None).unwrap();
        assert!(a.exports.contains_key("A"));
        assert!(b.exports.contains_key("B"));
    }
}

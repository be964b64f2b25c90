//! Export-Graph Resolver (§4.4).
//!
//! Follows a requested export name across re-exports and wildcard exports
//! until it lands on the file that actually declares it (or on a namespace
//! object). Gathering a single file and resolving a specifier to a path are
//! both pushed behind [`GraphHost`] so this crate can be exercised without a
//! real parser/resolver pair.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tsdoc_gather::{ExportTarget, GatherResult};

#[derive(Debug, Clone)]
pub enum GraphError {
    UnresolvedExport {
        file: PathBuf,
        export_name: String,
    },
    UnresolvableSpecifier {
        specifier: String,
        containing_file: PathBuf,
    },
    Circular {
        file: PathBuf,
        export_name: String,
    },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::UnresolvedExport { file, export_name } => write!(
                f,
                "'{}' is not exported by {}",
                export_name,
                file.display()
            ),
            GraphError::UnresolvableSpecifier {
                specifier,
                containing_file,
            } => write!(
                f,
                "cannot resolve '{}' re-exported from {}",
                specifier,
                containing_file.display()
            ),
            GraphError::Circular { file, export_name } => write!(
                f,
                "circular re-export chain resolving '{}' from {}",
                export_name,
                file.display()
            ),
        }
    }
}

impl std::error::Error for GraphError {}

/// Services the graph resolver needs from the outside world: a file's
/// classified exports, and turning an import specifier into the file it
/// names.
pub trait GraphHost {
    fn gather(&self, file: &Path) -> Arc<GatherResult>;
    fn resolve_specifier(&self, specifier: &str, containing_file: &Path)
        -> Result<PathBuf, GraphError>;
}

/// Where a requested export name ultimately bottoms out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginatingExport {
    /// A concrete declaration, by its local name, in `file`.
    Local { file: PathBuf, local_name: String },
    /// The whole module `file`, exported as a namespace object.
    Namespace { file: PathBuf },
}

#[derive(Default)]
pub struct ExportGraphResolver;

impl ExportGraphResolver {
    pub fn new() -> Self {
        ExportGraphResolver
    }

    /// Resolves a single export name from `file`, following re-exports and
    /// wildcard exports as needed. Cycles (a barrel that re-exports from a
    /// file that, transitively, re-exports back from it) are cut rather than
    /// looped forever.
    pub fn resolve(
        &self,
        host: &impl GraphHost,
        file: &Path,
        export_name: &str,
    ) -> Result<OriginatingExport, GraphError> {
        let mut in_progress = HashSet::new();
        self.resolve_inner(host, file, export_name, &mut in_progress)
    }

    fn resolve_inner(
        &self,
        host: &impl GraphHost,
        file: &Path,
        export_name: &str,
        in_progress: &mut HashSet<(PathBuf, String)>,
    ) -> Result<OriginatingExport, GraphError> {
        let key = (file.to_path_buf(), export_name.to_string());
        if !in_progress.insert(key.clone()) {
            return Err(GraphError::Circular {
                file: file.to_path_buf(),
                export_name: export_name.to_string(),
            });
        }
        let result = self.resolve_uncycled(host, file, export_name, in_progress);
        in_progress.remove(&key);
        result
    }

    fn resolve_uncycled(
        &self,
        host: &impl GraphHost,
        file: &Path,
        export_name: &str,
        in_progress: &mut HashSet<(PathBuf, String)>,
    ) -> Result<OriginatingExport, GraphError> {
        let gathered = host.gather(file);

        if let Some(source) = gathered
            .source_exports
            .iter()
            .find(|e| e.public_name == export_name)
        {
            return match &source.target {
                ExportTarget::Local { local_name } => Ok(OriginatingExport::Local {
                    file: file.to_path_buf(),
                    local_name: local_name.clone(),
                }),
                ExportTarget::Namespace { source_specifier } => {
                    let target_file = host.resolve_specifier(source_specifier, file)?;
                    Ok(OriginatingExport::Namespace { file: target_file })
                }
            };
        }

        if let Some(re) = gathered
            .re_exports
            .iter()
            .find(|r| r.export_name == export_name)
        {
            let target_file = host.resolve_specifier(&re.source_specifier, file)?;
            return self.resolve_inner(host, &target_file, &re.source_name, in_progress);
        }

        for wildcard in &gathered.wildcard_exports {
            let Ok(target_file) = host.resolve_specifier(&wildcard.source_specifier, file) else {
                continue;
            };
            match self.resolve_inner(host, &target_file, export_name, in_progress) {
                Ok(found) => return Ok(found),
                Err(_) => continue,
            }
        }

        Err(GraphError::UnresolvedExport {
            file: file.to_path_buf(),
            export_name: export_name.to_string(),
        })
    }

    /// Enumerates every public export name reachable from `file`, following
    /// wildcard exports transitively. Local exports and named re-exports are
    /// collected first and always win; a wildcard only fills in names no
    /// earlier, more specific export already produced (§4.4).
    pub fn enumerate(
        &self,
        host: &impl GraphHost,
        file: &Path,
    ) -> Result<HashMap<String, OriginatingExport>, GraphError> {
        let mut seen_files = HashSet::new();
        self.enumerate_inner(host, file, &mut seen_files)
    }

    fn enumerate_inner(
        &self,
        host: &impl GraphHost,
        file: &Path,
        seen_files: &mut HashSet<PathBuf>,
    ) -> Result<HashMap<String, OriginatingExport>, GraphError> {
        if !seen_files.insert(file.to_path_buf()) {
            return Ok(HashMap::new());
        }

        let gathered = host.gather(file);
        let mut names = HashMap::new();

        for source in &gathered.source_exports {
            let target = match &source.target {
                ExportTarget::Local { local_name } => OriginatingExport::Local {
                    file: file.to_path_buf(),
                    local_name: local_name.clone(),
                },
                ExportTarget::Namespace { source_specifier } => {
                    let target_file = host.resolve_specifier(source_specifier, file)?;
                    OriginatingExport::Namespace { file: target_file }
                }
            };
            names.insert(source.public_name.clone(), target);
        }

        for re in &gathered.re_exports {
            if names.contains_key(&re.export_name) {
                continue;
            }
            let Ok(target_file) = host.resolve_specifier(&re.source_specifier, file) else {
                continue;
            };
            if let Ok(resolved) = self.resolve(host, &target_file, &re.source_name) {
                names.insert(re.export_name.clone(), resolved);
            }
        }

        for wildcard in &gathered.wildcard_exports {
            let Ok(target_file) = host.resolve_specifier(&wildcard.source_specifier, file) else {
                continue;
            };
            let nested = self.enumerate_inner(host, &target_file, seen_files)?;
            for (name, target) in nested {
                names.entry(name).or_insert(target);
            }
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdoc_gather::{ReExport, SourceExport, WildcardExport};

    #[derive(Default)]
    struct MockHost {
        files: HashMap<PathBuf, GatherResult>,
        specifiers: HashMap<(PathBuf, String), PathBuf>,
    }

    impl MockHost {
        fn with_specifier(mut self, from: &str, specifier: &str, to: &str) -> Self {
            self.specifiers
                .insert((PathBuf::from(from), specifier.to_string()), PathBuf::from(to));
            self
        }

        fn with_file(mut self, path: &str, gathered: GatherResult) -> Self {
            self.files.insert(PathBuf::from(path), gathered);
            self
        }
    }

    impl GraphHost for MockHost {
        fn gather(&self, file: &Path) -> Arc<GatherResult> {
            Arc::new(self.files.get(file).cloned().unwrap_or_default())
        }

        fn resolve_specifier(
            &self,
            specifier: &str,
            containing_file: &Path,
        ) -> Result<PathBuf, GraphError> {
            self.specifiers
                .get(&(containing_file.to_path_buf(), specifier.to_string()))
                .cloned()
                .ok_or_else(|| GraphError::UnresolvableSpecifier {
                    specifier: specifier.to_string(),
                    containing_file: containing_file.to_path_buf(),
                })
        }
    }

    #[test]
    fn resolves_simple_reexport() {
        let host = MockHost::default()
            .with_specifier("/barrel.ts", "./base", "/base.ts")
            .with_file(
                "/barrel.ts",
                GatherResult {
                    re_exports: vec![ReExport {
                        export_name: "Base".into(),
                        source_name: "Base".into(),
                        source_specifier: "./base".into(),
                    }],
                    ..Default::default()
                },
            )
            .with_file(
                "/base.ts",
                GatherResult {
                    source_exports: vec![SourceExport {
                        public_name: "Base".into(),
                        target: ExportTarget::Local {
                            local_name: "Base".into(),
                        },
                    }],
                    ..Default::default()
                },
            );

        let resolver = ExportGraphResolver::new();
        let found = resolver
            .resolve(&host, Path::new("/barrel.ts"), "Base")
            .unwrap();
        assert_eq!(
            found,
            OriginatingExport::Local {
                file: PathBuf::from("/base.ts"),
                local_name: "Base".into(),
            }
        );
    }

    #[test]
    fn follows_rename_through_reexport() {
        let host = MockHost::default()
            .with_specifier("/barrel.ts", "./base", "/base.ts")
            .with_file(
                "/barrel.ts",
                GatherResult {
                    re_exports: vec![ReExport {
                        export_name: "Renamed".into(),
                        source_name: "Base".into(),
                        source_specifier: "./base".into(),
                    }],
                    ..Default::default()
                },
            )
            .with_file(
                "/base.ts",
                GatherResult {
                    source_exports: vec![SourceExport {
                        public_name: "Base".into(),
                        target: ExportTarget::Local {
                            local_name: "Base".into(),
                        },
                    }],
                    ..Default::default()
                },
            );

        let resolver = ExportGraphResolver::new();
        let found = resolver
            .resolve(&host, Path::new("/barrel.ts"), "Renamed")
            .unwrap();
        assert_eq!(
            found,
            OriginatingExport::Local {
                file: PathBuf::from("/base.ts"),
                local_name: "Base".into(),
            }
        );
    }

    #[test]
    fn circular_barrel_chain_is_reported_not_looped() {
        let host = MockHost::default()
            .with_specifier("/a.ts", "./b", "/b.ts")
            .with_specifier("/b.ts", "./a", "/a.ts")
            .with_file(
                "/a.ts",
                GatherResult {
                    wildcard_exports: vec![WildcardExport {
                        source_specifier: "./b".into(),
                    }],
                    ..Default::default()
                },
            )
            .with_file(
                "/b.ts",
                GatherResult {
                    wildcard_exports: vec![WildcardExport {
                        source_specifier: "./a".into(),
                    }],
                    ..Default::default()
                },
            );

        let resolver = ExportGraphResolver::new();
        let err = resolver
            .resolve(&host, Path::new("/a.ts"), "Missing")
            .unwrap_err();
        assert!(matches!(err, GraphError::UnresolvedExport { .. }));
    }

    #[test]
    fn wildcard_does_not_overwrite_local_export() {
        let host = MockHost::default()
            .with_specifier("/barrel.ts", "./other", "/other.ts")
            .with_file(
                "/barrel.ts",
                GatherResult {
                    source_exports: vec![SourceExport {
                        public_name: "Shared".into(),
                        target: ExportTarget::Local {
                            local_name: "Shared".into(),
                        },
                    }],
                    wildcard_exports: vec![WildcardExport {
                        source_specifier: "./other".into(),
                    }],
                    ..Default::default()
                },
            )
            .with_file(
                "/other.ts",
                GatherResult {
                    source_exports: vec![SourceExport {
                        public_name: "Shared".into(),
                        target: ExportTarget::Local {
                            local_name: "OtherShared".into(),
                        },
                    }],
                    ..Default::default()
                },
            );

        let resolver = ExportGraphResolver::new();
        let all = resolver.enumerate(&host, Path::new("/barrel.ts")).unwrap();
        assert_eq!(
            all.get("Shared"),
            Some(&OriginatingExport::Local {
                file: PathBuf::from("/barrel.ts"),
                local_name: "Shared".into(),
            })
        );
    }
}

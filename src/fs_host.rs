//! Filesystem-backed [`Host`] (§6): reads files with `std::fs`, resolves
//! specifiers with [`tsdoc_resolver::ResolverFacade`], and owns the
//! [`LoaderCache`] a caller shares across `load` requests.

use std::io;
use std::path::{Path, PathBuf};

use tsdoc_cache::LoaderCache;
use tsdoc_loader::Host;
use tsdoc_resolver::{ResolveError, ResolverFacade};

#[derive(Default)]
pub struct FsHost {
    cache: LoaderCache,
    resolver: ResolverFacade,
}

impl FsHost {
    pub fn new() -> Self {
        FsHost::default()
    }
}

impl Host for FsHost {
    fn get_source(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn resolve(&self, specifier: &str, containing_file: &Path) -> Result<PathBuf, ResolveError> {
        self.resolver.resolve(specifier, containing_file)
    }

    fn cache(&self) -> &LoaderCache {
        &self.cache
    }

    /// Evicts both caches for `path`: the loader cache (AST/export-map/
    /// symbols) and, defensively, the resolver's `tsconfig.json` cache for
    /// its directory — covers the case where `path` is itself the config
    /// file that changed.
    fn invalidate(&self, path: &Path) {
        self.cache.invalidate_file(path);
        if let Some(dir) = path.parent() {
            self.resolver.invalidate_directory(dir);
        }
    }
}

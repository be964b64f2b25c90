//! The `Host` trait (§6 "External Interfaces"): everything the
//! orchestrator needs from the outside world but does not own itself —
//! reading a file's contents, resolving an import specifier, and the
//! shared [`LoaderCache`] instance.

use std::io;
use std::path::{Path, PathBuf};

use tsdoc_cache::LoaderCache;
use tsdoc_resolver::ResolveError;

pub trait Host {
    /// Supplies a file's contents. Only the entry file's failure here is a
    /// hard error (§7); a dependency file that fails to read is skipped.
    fn get_source(&self, path: &Path) -> io::Result<String>;

    /// Resolves an import specifier to an absolute path. Must fail loudly
    /// (§6) — a resolution failure for a declaration actually reached by
    /// the transformer propagates as the one hard error `load` can raise.
    fn resolve(&self, specifier: &str, containing_file: &Path) -> Result<PathBuf, ResolveError>;

    /// The cache instance this host shares across `load` requests.
    fn cache(&self) -> &LoaderCache;

    /// Evicts everything cached for `path`. The default forwards straight
    /// to the cache; a `--watch` front-end (§2.2) calls this from its
    /// filesystem notify handler.
    fn invalidate(&self, path: &Path) {
        self.cache().invalidate_file(path);
    }
}

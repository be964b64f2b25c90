//! AST cache keyed by absolute path (§4.1, §4.8).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::{bindings::Bindings, is_ambient_path, parse_module_with_base, ParseError, ParsedFile};

/// Caches parsed ASTs by absolute file path. One `ParserFacade` is shared
/// by every concurrent `load()` (§5); `DashMap` gives per-shard locking so
/// two different files can be parsed without contending on the same lock.
#[derive(Default)]
pub struct ParserFacade {
    cache: DashMap<PathBuf, Arc<ParsedFile>>,
}

impl ParserFacade {
    pub fn new() -> Self {
        ParserFacade::default()
    }

    /// Returns the cached parse for `path`, parsing and inserting it on a
    /// miss. A parse error is never cached (§7): the next call re-parses,
    /// so fixing the source is visible without an explicit invalidation.
    pub fn parse(&self, path: &Path, source: &str) -> Result<Arc<ParsedFile>, ParseError> {
        if let Some(existing) = self.cache.get(path) {
            return Ok(existing.clone());
        }

        let (module, byte_pos_base) = parse_module_with_base(path, source)?;
        let bindings = Bindings::collect(&module);
        let parsed = Arc::new(ParsedFile {
            path: path.to_path_buf(),
            source: Arc::from(source),
            module: Arc::new(module),
            bindings: Arc::new(bindings),
            is_ambient: is_ambient_path(path),
            byte_pos_base,
        });

        self.cache.insert(path.to_path_buf(), parsed.clone());
        Ok(parsed)
    }

    /// Evicts the cached AST for `path`, if any (§4.8 invalidation).
    pub fn invalidate(&self, path: &Path) {
        self.cache.remove(path);
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_successful_parses() {
        let facade = ParserFacade::new();
        let path = Path::new("/a.ts");
        let a = facade.parse(path, "export const x = 1;").unwrap();
        let b = facade.parse(path, "export const x = 1;").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn does_not_cache_parse_errors() {
        let facade = ParserFacade::new();
        let path = Path::new("/broken.ts");
        assert!(facade.parse(path, "export const x = ").is_err());
        assert!(!facade.is_cached(path));
    }

    #[test]
    fn invalidate_forces_reparse() {
        let facade = ParserFacade::new();
        let path = Path::new("/a.ts");
        facade.parse(path, "export const x = 1;").unwrap();
        facade.invalidate(path);
        assert!(!facade.is_cached(path));
    }
}

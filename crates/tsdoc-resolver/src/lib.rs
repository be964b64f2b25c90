//! Module Resolver Facade (§4.2).
//!
//! Translates `(specifier, containing_file)` to an absolute path. Discovers
//! the nearest `tsconfig.json` above the containing file's directory (§6
//! "Config discovery") and consults its `baseUrl`/`paths` before falling
//! back to relative-path resolution. TypeScript's own module resolver is
//! otherwise out of scope (§1) — this facade implements just enough of its
//! behavior (extension priority, `index.*`, `paths` wildcards) to locate
//! sibling `.ts`/`.tsx` files in a project, which is all the downstream
//! gatherer/graph resolver need.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use tsdoc_common::tsconfig::{self, TsConfig};

/// Extensions tried, in priority order, when a specifier names a file
/// without an extension. `.d.ts` sits after the source extensions so a
/// sibling `.ts` file wins when both exist, matching normal TypeScript
/// project layout (declaration files describe *other* modules, not a
/// same-named source file).
const RESOLVE_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".mts", ".cts", ".d.ts", ".d.mts", ".d.cts", ".js", ".jsx", ".mjs", ".cjs",
];

#[derive(Debug, Clone)]
pub struct ResolveError {
    pub specifier: String,
    pub containing_file: PathBuf,
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot resolve '{}' from {}",
            self.specifier,
            self.containing_file.display()
        )
    }
}

impl std::error::Error for ResolveError {}

/// Resolves specifiers against the filesystem, caching one `TsConfig` per
/// directory it has already discovered a config for (`None` is cached too,
/// so repeatedly resolving from a directory with no tsconfig does not
/// re-walk the filesystem every time).
#[derive(Default)]
pub struct ResolverFacade {
    config_cache: DashMap<PathBuf, Option<std::sync::Arc<TsConfig>>>,
}

impl ResolverFacade {
    pub fn new() -> Self {
        ResolverFacade::default()
    }

    fn config_for(&self, dir: &Path) -> Option<std::sync::Arc<TsConfig>> {
        if let Some(cached) = self.config_cache.get(dir) {
            return cached.clone();
        }
        let found = tsconfig::discover(dir).map(std::sync::Arc::new);
        self.config_cache.insert(dir.to_path_buf(), found.clone());
        found
    }

    /// Resolves `specifier` as imported by `containing_file`.
    pub fn resolve(
        &self,
        specifier: &str,
        containing_file: &Path,
    ) -> Result<PathBuf, ResolveError> {
        let dir = containing_file.parent().unwrap_or_else(|| Path::new("."));

        if specifier.starts_with('.') {
            if let Some(found) = resolve_relative(dir, specifier) {
                return Ok(found);
            }
        } else {
            let config = self.config_for(dir);
            if let Some(config) = &config {
                if let Some(found) = resolve_via_paths(config, specifier) {
                    return Ok(found);
                }
            }
        }

        Err(ResolveError {
            specifier: specifier.to_string(),
            containing_file: containing_file.to_path_buf(),
        })
    }

    pub fn invalidate_directory(&self, dir: &Path) {
        self.config_cache.remove(dir);
    }
}

fn resolve_relative(from_dir: &Path, specifier: &str) -> Option<PathBuf> {
    let joined = from_dir.join(specifier);
    resolve_candidate(&joined)
}

fn resolve_via_paths(config: &TsConfig, specifier: &str) -> Option<PathBuf> {
    let base = config.base_url_dir();

    for (pattern, targets) in &config.compiler_options.paths {
        if let Some(suffix) = match_path_pattern(pattern, specifier) {
            for target in targets {
                let substituted = target.replacen('*', &suffix, 1);
                if let Some(found) = resolve_candidate(&base.join(&substituted)) {
                    return Some(found);
                }
            }
        }
    }

    // Bare baseUrl-relative import, e.g. `baseUrl: "src"`, `import "utils/x"`.
    resolve_candidate(&base.join(specifier))
}

/// Matches `specifier` against a `paths` pattern like `"@app/*"`, returning
/// the text the `*` captured, or the empty string for an exact (non-glob)
/// pattern match.
fn match_path_pattern(pattern: &str, specifier: &str) -> Option<String> {
    match pattern.find('*') {
        Some(star) => {
            let prefix = &pattern[..star];
            let suffix = &pattern[star + 1..];
            if specifier.starts_with(prefix) && specifier.ends_with(suffix) {
                let captured = &specifier[prefix.len()..specifier.len() - suffix.len()];
                Some(captured.to_string())
            } else {
                None
            }
        }
        None if pattern == specifier => Some(String::new()),
        None => None,
    }
}

/// Tries `path` directly, then each known extension, then `path/index.*`.
fn resolve_candidate(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(normalize(path));
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = append_ext(path, ext);
        if candidate.is_file() {
            return Some(normalize(&candidate));
        }
    }
    for ext in RESOLVE_EXTENSIONS {
        let candidate = path.join(format!("index{ext}"));
        if candidate.is_file() {
            return Some(normalize(&candidate));
        }
    }
    None
}

fn append_ext(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(ext);
    PathBuf::from(s)
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_relative_sibling_with_extension() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("base.ts"), "export {}").unwrap();
        let index = tmp.path().join("index.ts");
        fs::write(&index, "export {}").unwrap();

        let facade = ResolverFacade::new();
        let resolved = facade.resolve("./base", &index).unwrap();
        assert_eq!(
            resolved.file_name().unwrap().to_str().unwrap(),
            "base.ts"
        );
    }

    #[test]
    fn resolves_directory_index() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("lib")).unwrap();
        fs::write(tmp.path().join("lib/index.ts"), "export {}").unwrap();
        let index = tmp.path().join("index.ts");
        fs::write(&index, "export {}").unwrap();

        let facade = ResolverFacade::new();
        let resolved = facade.resolve("./lib", &index).unwrap();
        assert!(resolved.ends_with("lib/index.ts"));
    }

    #[test]
    fn unresolvable_specifier_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let index = tmp.path().join("index.ts");
        fs::write(&index, "export {}").unwrap();
        let facade = ResolverFacade::new();
        assert!(facade.resolve("nonexistent-package", &index).is_err());
    }

    #[test]
    fn resolves_via_tsconfig_paths() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("tsconfig.json"),
            r#"{"compilerOptions":{"baseUrl":".","paths":{"@app/*":["src/*"]}}}"#,
        )
        .unwrap();
        fs::create_dir(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/widget.ts"), "export {}").unwrap();
        let index = tmp.path().join("index.ts");
        fs::write(&index, "export {}").unwrap();

        let facade = ResolverFacade::new();
        let resolved = facade.resolve("@app/widget", &index).unwrap();
        assert!(resolved.ends_with("src/widget.ts"));
    }
}

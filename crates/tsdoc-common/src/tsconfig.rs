//! `tsconfig.json` discovery and parsing.
//!
//! Used by the module resolver facade (§4.2, §6 "Config discovery") to turn
//! `compilerOptions.baseUrl`/`paths` into resolution hints. Only the fields
//! this loader actually consults are modeled; everything else in a real
//! `tsconfig.json` is ignored rather than rejected.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

/// The subset of `compilerOptions` the resolver facade needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub base_url: Option<String>,
    #[serde(default)]
    pub paths: HashMap<String, Vec<String>>,
    pub jsx: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<String>,
    #[serde(default)]
    compiler_options: CompilerOptions,
}

/// A fully-resolved (post `extends`-chain) tsconfig, together with the
/// directory it was discovered in, since `baseUrl`/`paths` are resolved
/// relative to that directory.
#[derive(Debug, Clone)]
pub struct TsConfig {
    pub directory: PathBuf,
    pub compiler_options: CompilerOptions,
}

impl TsConfig {
    /// Resolves `baseUrl` to an absolute directory, defaulting to the
    /// config's own directory when unset.
    pub fn base_url_dir(&self) -> PathBuf {
        match &self.compiler_options.base_url {
            Some(base) => self.directory.join(base),
            None => self.directory.clone(),
        }
    }
}

/// Parses a `tsconfig.json` source string, tolerating the two things real
/// configs do that strict JSON does not allow: `//` / `/* */` comments and
/// trailing commas before a closing brace.
pub fn parse_str(json: &str) -> Result<CompilerOptions, serde_json::Error> {
    // Trailing commas before a closing brace are common and not valid JSON.
    let trailing_comma = Regex::new(r",(?P<valid>\s*})").expect("static regex is valid");
    let without_trailing_commas = trailing_comma.replace_all(json, "$valid");
    let stripped = json_comments::StripComments::new(without_trailing_commas.as_bytes());
    let raw: RawTsConfig = serde_json::from_reader(stripped)?;
    Ok(raw.compiler_options)
}

/// Walks upward from `start_dir` looking for the nearest `tsconfig.json`.
/// Returns `None` if none is found before the filesystem root, in which
/// case the resolver facade falls back to its defaults (§4.2).
pub fn find_nearest(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = Some(start_dir);
    while let Some(d) = dir {
        let candidate = d.join("tsconfig.json");
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = d.parent();
    }
    None
}

/// Discovers and parses the nearest `tsconfig.json` above `start_dir`,
/// following one level of `extends` (sufficient for the resolver's needs;
/// deep `extends` chains are a TypeScript-resolver concern, out of scope).
pub fn discover(start_dir: &Path) -> Option<TsConfig> {
    let path = find_nearest(start_dir)?;
    let directory = path.parent()?.to_path_buf();
    let text = std::fs::read_to_string(&path).ok()?;
    let mut compiler_options = parse_str(&text).ok()?;

    if let Ok(raw) = {
        let trailing_comma = Regex::new(r",(?P<valid>\s*})").expect("static regex is valid");
        let stripped_text = trailing_comma.replace_all(&text, "$valid");
        let stripped = json_comments::StripComments::new(stripped_text.as_bytes());
        serde_json::from_reader::<_, RawTsConfig>(stripped)
    } {
        if let Some(extends) = raw.extends {
            let parent_path = directory.join(&extends);
            if let Some(parent_dir) = parent_path.parent() {
                if let Some(parent) = discover(parent_dir) {
                    // Child options win; inherited `paths`/`baseUrl` fill gaps.
                    if compiler_options.base_url.is_none() {
                        compiler_options.base_url = parent.compiler_options.base_url;
                    }
                    for (key, value) in parent.compiler_options.paths {
                        compiler_options.paths.entry(key).or_insert(value);
                    }
                }
            }
        }
    }

    Some(TsConfig {
        directory,
        compiler_options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_and_trailing_commas() {
        let json = r#"
        {
            // a comment
            "compilerOptions": {
                "baseUrl": ".",
                "paths": {
                    "@app/*": ["src/*"],
                },
            },
        }
        "#;
        let opts = parse_str(json).unwrap();
        assert_eq!(opts.base_url.as_deref(), Some("."));
        assert_eq!(opts.paths["@app/*"], vec!["src/*".to_string()]);
    }

    #[test]
    fn find_nearest_walks_upward() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join("tsconfig.json"), "{}").unwrap();
        let found = find_nearest(&nested).unwrap();
        assert_eq!(found, tmp.path().join("tsconfig.json"));
    }

    #[test]
    fn find_nearest_returns_none_without_config() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(find_nearest(tmp.path()).is_none());
    }
}

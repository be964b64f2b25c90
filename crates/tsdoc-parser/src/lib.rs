//! Parser Facade (§4.1).
//!
//! Wraps `swc_core`'s TypeScript/JSX parser, the black-box parser named in
//! §1's out-of-scope list. This crate's job is narrow: turn source text
//! into an AST, annotate it with the handful of value bindings the
//! downstream gatherer needs (type declarations are not bindings — the
//! gatherer's type-scope table, §4.3, covers those), and cache the result
//! per absolute path.

mod bindings;
mod cache;

pub use bindings::{Bindings, ValueBinding};
pub use cache::ParserFacade;

use std::path::Path;
use std::sync::Arc;

use swc_core::common::errors::{DiagnosticBuilder, Emitter};
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap};
use swc_core::ecma::ast::Module;
use swc_core::ecma::parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};

/// A parsed TypeScript/JSX source file, annotated with value bindings.
///
/// Shared (`Arc`) because the AST cache (§4.8) hands the same parsed file
/// to every concurrent caller that asks for it.
#[derive(Clone)]
pub struct ParsedFile {
    pub path: std::path::PathBuf,
    pub source: Arc<str>,
    pub module: Arc<Module>,
    pub bindings: Arc<Bindings>,
    /// `true` for `.d.ts`/`.d.mts`/`.d.cts` files — parsed as ambient
    /// (no runtime declarations required), per §4.1.
    pub is_ambient: bool,
    /// Byte offset of this file's first character within the `Span`
    /// coordinate space swc assigned it. JSDoc extraction (done by the
    /// transformer, working from raw source text rather than swc's
    /// `Comments` map) subtracts this from a node's `span.lo()` to get an
    /// offset into `source`.
    pub byte_pos_base: u32,
}

/// A parse failure, scoped to a single file (§7: "Parse error on a file").
#[derive(Debug, Clone)]
pub struct ParseError {
    pub path: std::path::PathBuf,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error in {}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for ParseError {}

/// A diagnostic sink that discards rendered output but records whether any
/// error-level diagnostic was emitted, so `parse_module` can surface parse
/// failures without routing through swc's terminal-oriented reporter.
struct SilentEmitter {
    had_error: std::sync::Arc<std::sync::atomic::AtomicBool>,
    message: std::sync::Arc<std::sync::Mutex<Option<String>>>,
}

impl Emitter for SilentEmitter {
    fn emit(&mut self, db: &DiagnosticBuilder<'_>) {
        self.had_error
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let mut slot = self.message.lock().expect("emitter mutex poisoned");
        if slot.is_none() {
            slot.replace(db.message());
        }
    }
}

fn syntax_for(path: &Path) -> Syntax {
    let name = path.to_string_lossy();
    let is_ambient = is_ambient_path(path);
    let tsx = name.ends_with(".tsx");
    if name.ends_with(".ts")
        || name.ends_with(".tsx")
        || name.ends_with(".mts")
        || name.ends_with(".cts")
        || is_ambient
    {
        Syntax::Typescript(TsSyntax {
            tsx,
            decorators: true,
            dts: is_ambient,
            no_early_errors: true,
            disallow_ambiguous_jsx_like: false,
        })
    } else {
        Syntax::Es(EsSyntax {
            jsx: name.ends_with(".jsx") || name.ends_with(".mjs") || name.ends_with(".cjs"),
            ..Default::default()
        })
    }
}

/// A file whose name ends in `.d.ts`/`.d.mts`/`.d.cts` is ambient (§4.1).
pub fn is_ambient_path(path: &Path) -> bool {
    let name = path.to_string_lossy();
    name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
}

/// Parses `source` (the contents of `path`) into a `Module`, without
/// caching. Callers that want caching should go through [`ParserFacade`].
pub fn parse_module(path: &Path, source: &str) -> Result<Module, ParseError> {
    parse_module_with_base(path, source).map(|(module, _)| module)
}

/// Same as [`parse_module`], additionally returning the byte offset this
/// file's contents start at within swc's `Span` coordinate space.
pub fn parse_module_with_base(path: &Path, source: &str) -> Result<(Module, u32), ParseError> {
    let cm: Lrc<SourceMap> = Default::default();
    let file = cm.new_source_file(FileName::Real(path.to_path_buf()).into(), source.to_string());
    let byte_pos_base = file.start_pos.0;

    let had_error = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let message = std::sync::Arc::new(std::sync::Mutex::new(None));
    let _handler = swc_core::common::errors::Handler::with_emitter(
        true,
        false,
        Box::new(SilentEmitter {
            had_error: had_error.clone(),
            message: message.clone(),
        }),
    );

    let syntax = syntax_for(path);
    let lexer = Lexer::new(
        syntax,
        Default::default(),
        StringInput::from(&*file),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| ParseError {
        path: path.to_path_buf(),
        message: format!("{e:?}"),
    })?;

    if had_error.load(std::sync::atomic::Ordering::SeqCst) {
        let msg = message
            .lock()
            .expect("emitter mutex poisoned")
            .clone()
            .unwrap_or_else(|| "unknown parse error".to_string());
        return Err(ParseError {
            path: path.to_path_buf(),
            message: msg,
        });
    }

    Ok((module, byte_pos_base))
}

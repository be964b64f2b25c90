//! Shared foundation for the tsdoc loader pipeline.
//!
//! This crate provides the types and utilities every other `tsdoc-*` crate
//! depends on:
//! - `NodeId` - the canonical `(file, symbol)` identity of a documented declaration
//! - `TsDocError` - the top-level error surfaced across the `load()` boundary (§7)
//! - `tsconfig` - `tsconfig.json` discovery and parsing used by the resolver facade
//! - `trace` - `tracing` subscriber initialization for CLI front-ends

pub mod node_id;
pub mod trace;
pub mod tsconfig;

pub use node_id::NodeId;

use std::path::PathBuf;

/// The single hard-error surface of the loader, per the error table in §7:
/// only an unresolvable import specifier propagates as a failure of the
/// whole `load()` request. Every other recoverable condition degrades by
/// omission inside the component that hit it.
#[derive(Debug)]
pub enum TsDocError {
    /// A module specifier could not be resolved to an absolute file path.
    UnresolvableImport {
        specifier: String,
        containing_file: PathBuf,
    },
    /// The host could not supply source text for a file that must be read
    /// (only raised for the entry file itself; dependency files that fail
    /// to read are treated the same as a parse error and skipped).
    SourceUnavailable { file: PathBuf, reason: String },
}

impl std::fmt::Display for TsDocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TsDocError::UnresolvableImport {
                specifier,
                containing_file,
            } => write!(
                f,
                "cannot resolve module specifier '{specifier}' from {}",
                containing_file.display()
            ),
            TsDocError::SourceUnavailable { file, reason } => {
                write!(f, "cannot read source for {}: {reason}", file.display())
            }
        }
    }
}

impl std::error::Error for TsDocError {}

pub type TsDocResult<T> = Result<T, TsDocError>;

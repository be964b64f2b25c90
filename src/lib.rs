//! Library surface for the documentation graph loader (§6 "External
//! Interfaces").
//!
//! Re-exports what a host bundler needs to embed the loader directly:
//! [`Host`] (the trait it implements to supply file contents and
//! specifier resolution), [`LoaderCache`] (the cache instance a `Host`
//! owns and shares across requests), [`FsHost`] (a filesystem-backed
//! `Host` ready to use as-is), and [`load`] (the `load(filePath,
//! requestedSymbols?)` entry point). [`cli`] is the `tsdoc` binary's own
//! front-end, built on top of this same surface.

pub mod cli;
mod fs_host;

pub use fs_host::FsHost;
pub use tsdoc_cache::LoaderCache;
pub use tsdoc_common::{NodeId, TsDocError, TsDocResult};
pub use tsdoc_loader::{Host, Orchestrator};
pub use tsdoc_model::{Asset, Node, NodeKind};

use std::path::Path;

/// Loads `requested_symbols` (or every public export, if `None`) from
/// `file` against `host`. A thin wrapper over [`Orchestrator::load`] for
/// callers that don't need to hold onto an `Orchestrator` instance — it
/// carries no state of its own, every request flows entirely through the
/// `Host` it's given.
pub fn load(
    host: &dyn Host,
    file: &Path,
    requested_symbols: Option<&[String]>,
) -> TsDocResult<Asset> {
    Orchestrator::new().load(host, file, requested_symbols)
}

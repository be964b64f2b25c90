//! `Asset`: the per-file bundle passed between the orchestrator and the
//! linker (§3).

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use tsdoc_common::NodeId;

use crate::Node;

/// The local-name -> exported-name mapping kind for a single file's
/// `symbols` table. A wildcard re-export (`export * from "x"`) records
/// `"*"` rather than a concrete exported name (§3).
pub const WILDCARD_SYMBOL: &str = "*";

/// The per-file bundle exchanged between the orchestrator (`tsdoc-loader`)
/// and the linker (`tsdoc-link`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Asset {
    pub id: PathBuf,
    pub exports: IndexMap<String, Node>,
    pub links: IndexMap<NodeId, Node>,
    pub symbols: IndexMap<String, String>,
}

impl Asset {
    pub fn new(id: PathBuf) -> Self {
        Asset {
            id,
            exports: IndexMap::new(),
            links: IndexMap::new(),
            symbols: IndexMap::new(),
        }
    }

    /// An empty stub for the circular-dependency cut (§4.9): the shape a
    /// reentrant `load` returns instead of recursing.
    pub fn stub(id: PathBuf) -> Self {
        Asset::new(id)
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty() && self.links.is_empty()
    }

    /// Merges `other` into `self`, keeping `self`'s entries on conflict.
    /// Used by the orchestrator when unioning a freshly-loaded result with
    /// whatever the cache already had for this request (§4.9 step 6).
    pub fn union_prefer_self(mut self, other: Asset) -> Asset {
        for (name, node) in other.exports {
            self.exports.entry(name).or_insert(node);
        }
        for (id, node) in other.links {
            self.links.entry(id).or_insert(node);
        }
        for (local, exported) in other.symbols {
            self.symbols.entry(local).or_insert(exported);
        }
        self
    }
}

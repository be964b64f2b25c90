//! `NodeId`: the canonical identity of a documented declaration (§3).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Uniquely identifies a documented declaration by the absolute path of the
/// file that defines it and the export name under which it was declared.
///
/// Two re-exports of the same declaration under different public names still
/// share one `NodeId` — the id tracks the *originating* declaration, not the
/// name a consumer sees it under (see spec §8 scenario 2).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub file: PathBuf,
    pub symbol: String,
}

impl NodeId {
    pub fn new(file: impl Into<PathBuf>, symbol: impl Into<String>) -> Self {
        NodeId {
            file: file.into(),
            symbol: symbol.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Canonical serialization `"<file>:<symbol>"` (§6).
    pub fn to_canonical_string(&self) -> String {
        format!("{}:{}", self.file.display(), self.symbol)
    }

    /// Parses a canonical string back into a `NodeId`.
    ///
    /// Colons are not expected inside absolute file paths on the platforms
    /// this loader targets; if one is present anyway, only the last `:`
    /// splits the symbol, matching the receiver-treats-it-opaquely rule in
    /// §6's NodeId string form.
    pub fn parse_canonical(s: &str) -> Option<NodeId> {
        let idx = s.rfind(':')?;
        let (file, symbol) = s.split_at(idx);
        let symbol = &symbol[1..];
        if file.is_empty() || symbol.is_empty() {
            return None;
        }
        Some(NodeId::new(PathBuf::from(file), symbol.to_string()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NodeId::parse_canonical(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid NodeId: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_canonical_string() {
        let id = NodeId::new("/abs/base.ts", "Base");
        let s = id.to_canonical_string();
        assert_eq!(s, "/abs/base.ts:Base");
        assert_eq!(NodeId::parse_canonical(&s), Some(id));
    }

    #[test]
    fn splits_on_last_colon_only() {
        // Not expected in practice, but the receiver must treat this opaquely.
        let id = NodeId::parse_canonical("/abs/weird:path.ts:Foo").unwrap();
        assert_eq!(id.file, PathBuf::from("/abs/weird:path.ts"));
        assert_eq!(id.symbol, "Foo");
    }
}

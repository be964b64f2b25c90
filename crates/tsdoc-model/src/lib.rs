//! The documentation node model (§3).
//!
//! `Node` is a closed discriminated union over every syntactic form the
//! transformer (`tsdoc-transform`) can produce and the linker
//! (`tsdoc-link`) can consume. The JSON discriminant for each variant is
//! its lowercase name, matching §6's serialized-output contract.

pub mod asset;
pub mod node;

pub use asset::Asset;
pub use node::{Access, DocMeta, Node, NodeKind, TemplatePiece, TypeOperatorKind};
pub use tsdoc_common::NodeId;

//! Semantic layer - how the tables of a request relate to each other.
//!
//! - [`relation_graph`] - foreign-key graph and join path resolution
//! - [`alias`] - per-statement table aliases
//! - [`error`] - generation errors shared by every phase

pub mod alias;
pub mod error;
pub mod relation_graph;

pub use alias::{AliasAllocator, AliasMap};
pub use error::{CompileResult, ErrorKind, GenerationError};
pub use relation_graph::{
    GraphError, JoinPath, JoinPathStrategy, JoinStep, Relation, RelationGraph,
};

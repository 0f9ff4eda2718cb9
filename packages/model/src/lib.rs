//! # Formwright Model
//!
//! The component tree of the form builder and the positional addressing
//! scheme used to edit it.
//!
//! ## Layout
//!
//! ```text
//! Tree
//!  └─ elements: [Node]
//!       ├─ form        ── elements: [Node]
//!       └─ column_set  ── columns: [Column ── elements: [Node]]
//! ```
//!
//! - [`Node`]: tagged variant per component kind; containers are declared
//!   by the variant, never looked up by name at runtime.
//! - [`Path`]: `elements.1.columns.0.elements.2`, a mix of container names
//!   and indices.
//! - [`resolver`]: the single place that turns a path into a live location.
//! - [`visitor`]: depth-first traversal, enumeration and lookup by id.

pub mod error;
pub mod id_generator;
pub mod node;
pub mod path;
pub mod resolver;
pub mod visitor;

pub use error::{ParsePathError, PathResolutionError};
pub use id_generator::IdGenerator;
pub use node::{Column, ContainerShape, Node, NodeId, NodeKind, Tree};
pub use path::{ContainerName, Path, Segment, StructuralStep};
pub use resolver::{
    resolve_columns, resolve_columns_mut, resolve_container, resolve_container_mut,
    resolve_lineage, resolve_node, resolve_node_mut, Container, ContainerMut, Shape,
};
pub use visitor::{duplicate_ids, enumerate, find_path, Visitor};

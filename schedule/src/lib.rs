//! Transform-dialect schedule builder.
//!
//! A schedule is an ordered list of named, parameterized transforms (tile,
//! fuse, pad, vectorize, lower, ...). Applying one to a
//! [`Module`](tessera_ir::Module) builds a transform-dialect region inside
//! the module itself: a `transform.with_pdl_patterns` container holding
//! generated match patterns and a `transform.sequence` of transform ops.
//! The region is then interpreted against the payload IR and erased, leaving
//! only the transformed payload.
//!
//! ```ignore
//! let mut module = Module::parse(payload_ir)?;
//! Schedule::new()
//!     .add(Tile::new("matmul", "linalg.matmul", Overrides::new().set("tile_sizes", vec![8, 16, 32]))?)
//!     .add(Vectorize::new("matmul", None, Overrides::new())?)
//!     .add(Bufferize::new())
//!     .apply(&mut module)?;
//! ```
//!
//! # Module Organization
//!
//! - [`variables`] - Typed, defaulted, validated transform variables
//! - [`registry`] - Deduplicated match patterns per (function, op-name) pair
//! - [`transforms`] - The transform kinds and their IR builders
//! - [`schedule`] - The runner: region construction, injection, passes
//! - [`passes`] - Named pass entry points
//! - [`interp`] - Reference interpreter for the schedule region
//! - [`error`] - Failure modes of the whole layer

pub mod error;
pub mod interp;
pub mod passes;
pub mod registry;
pub mod schedule;
pub mod transforms;
pub mod variables;

#[cfg(test)]
pub mod test;

pub use error::{Error, Result};
pub use schedule::{Schedule, ScheduleOptions};
pub use transforms::Transform;
pub use variables::{Overrides, VarKind, VarSpec, VarValue};

//! Generic op/region/block IR substrate for the Tessera transform scheduler.
//!
//! This crate provides the small IR-construction surface the schedule builder
//! layer consumes: create an operation with operands/attributes/regions at an
//! insertion point, walk the parent chain, look up symbols, move and erase
//! operations, print a module, and parse the crate's own textual form.
//!
//! # Module Organization
//!
//! - [`attr`] - Attribute values carried by operations
//! - [`op`] - Operation, block and value identifiers
//! - [`module`] - Arena-backed module owning all operations and blocks
//! - [`builder`] - Insertion-point builder and fluent op specification
//! - [`print`] - Textual form of a module
//! - [`parse`] - Parser for the textual form
//! - [`error`] - Error types and result handling
//!
//! Operations are fully generic: the substrate attaches no semantics to op
//! names. Dialect meaning lives in the consumer.

pub mod attr;
pub mod builder;
pub mod error;
pub mod module;
pub mod op;
pub mod parse;
pub mod prelude;
pub mod print;


pub use attr::Attr;
pub use builder::{Builder, OpSpec};
pub use error::{Error, Result};
pub use module::Module;
pub use op::{BlockId, OpData, OpId, Value};

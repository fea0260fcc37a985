//! Common imports for working with tessera IR.
//!
//! ```rust,ignore
//! use tessera_ir::prelude::*;
//! ```

pub use crate::attr::Attr;
pub use crate::builder::{Builder, OpSpec};
pub use crate::error::{Error, Result};
pub use crate::module::Module;
pub use crate::op::{BlockId, OpData, OpId, Value};

//! Whole-module replacement by literal IR text.

use snafu::ResultExt;
use tessera_ir::Module;

use crate::error::{InjectParseSnafu, Result};

/// Replace the module under transformation with parsed literal IR.
///
/// An escape hatch for experiments: the schedule runner applies this variant
/// directly instead of emitting transform ops for it. All handles into the
/// old module are invalidated, so the runner discards its container state and
/// re-opens a fresh schedule region for any later transform.
#[derive(Debug, Clone)]
pub struct Inject {
    ir: String,
}

impl Inject {
    pub fn new(ir: impl Into<String>) -> Self {
        Self { ir: ir.into() }
    }

    pub fn ir(&self) -> &str {
        &self.ir
    }

    /// Parse the literal IR into a standalone module.
    pub fn parse_module(&self) -> Result<Module> {
        Module::parse(&self.ir).context(InjectParseSnafu)
    }
}

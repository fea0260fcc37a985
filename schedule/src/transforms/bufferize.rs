//! One-shot bufferization of the whole module.

use tessera_ir::{Builder, OpSpec};

use super::BuildCtx;
use crate::error::Result;

/// Convert tensor values to memory buffers across the module.
///
/// Takes no variables and no target: bufferization is all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct Bufferize;

impl Bufferize {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(OpSpec::new("transform.bufferize"));
        Ok(())
    }
}

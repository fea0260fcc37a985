//! `linalg_ext` tiling and parallelism rewrites.

use tessera_ir::{Builder, OpSpec};

use super::{match_target, BuildCtx};
use crate::error::Result;
use crate::variables::{bind, Overrides, VarKind, VarSpec};

/// Tile a named op through the `linalg_ext.tile` wrapper.
#[derive(Debug, Clone)]
pub struct LinalgExtTile {
    fun_name: String,
    op_name: String,
    tile_sizes: Vec<i64>,
}

impl LinalgExtTile {
    pub fn new(fun_name: impl Into<String>, op_name: impl Into<String>, overrides: Overrides) -> Result<Self> {
        let specs = [VarSpec::new("tile_sizes", VarKind::SizeList, Vec::<i64>::new())];
        let vars = bind("LinalgExtTile", &specs, overrides)?;
        Ok(Self { fun_name: fun_name.into(), op_name: op_name.into(), tile_sizes: vars.int_list("tile_sizes")? })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let target = match_target(ctx, &self.fun_name, &self.op_name)?;
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(
            OpSpec::new("transform.linalg_ext.tile")
                .operand(target)
                .attr("sizes", self.tile_sizes.clone())
                .results(1),
        );
        Ok(())
    }
}

macro_rules! ext_rewrite {
    ($(#[$doc:meta])* $name:ident, $matched_op:literal, $emitted_op:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            fun_name: String,
        }

        impl $name {
            pub fn new(fun_name: impl Into<String>) -> Self {
                Self { fun_name: fun_name.into() }
            }

            pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
                let target = match_target(ctx, &self.fun_name, $matched_op)?;
                let mut b = Builder::at_end(ctx.module, ctx.body);
                b.build(OpSpec::new($emitted_op).operand(target).results(1));
                Ok(())
            }
        }
    };
}

ext_rewrite!(
    /// Rewrite `linalg_ext.tile` wrappers into sequential `scf.for` loops.
    LinalgExtTileToScfFor,
    "linalg_ext.tile",
    "transform.linalg_ext.tile_to_scf_for"
);

ext_rewrite!(
    /// Rewrite `linalg_ext.tile` wrappers into `linalg_ext.in_parallel` regions.
    LinalgExtTileToInParallel,
    "linalg_ext.tile",
    "transform.linalg_ext.tile_to_in_parallel"
);

ext_rewrite!(
    /// Serialize `linalg_ext.in_parallel` regions into `scf.for` loops.
    LinalgExtInParallelToScfFor,
    "linalg_ext.in_parallel",
    "transform.linalg_ext.in_parallel_to_scf_for"
);

ext_rewrite!(
    /// Lower `linalg_ext.in_parallel` regions onto the async runtime.
    LinalgExtInParallelToAsync,
    "linalg_ext.in_parallel",
    "transform.linalg_ext.in_parallel_to_async"
);

//! Tiling and producer fusion.

use tessera_ir::{Builder, OpId, OpSpec, Value};

use super::{match_target, BuildCtx};
use crate::error::{InvalidValueSnafu, Result};
use crate::variables::{bind, Overrides, VarKind, VarSpec};

fn tiling_specs() -> Vec<VarSpec> {
    vec![
        VarSpec::new("tile_sizes", VarKind::SizeList, Vec::<i64>::new()),
        VarSpec::new("tile_interchange", VarKind::IndexList, Vec::<i64>::new()),
        VarSpec::new("peel", VarKind::IndexList, Vec::<i64>::new()),
    ]
}

/// Loops are produced only for nonzero tile sizes.
fn loops_produced(tile_sizes: &[i64]) -> usize {
    tile_sizes.iter().filter(|s| **s != 0).count()
}

/// Check every requested peel index against the loop nest the tiling op will
/// produce, and return the indices sorted ascending with duplicates removed.
fn checked_peel(peel: &[i64], num_loops: usize) -> Result<Vec<i64>> {
    for &index in peel {
        if index as usize >= num_loops {
            return InvalidValueSnafu {
                name: "peel",
                reason: format!("loop index {index} is out of range for the {num_loops} loops produced by tiling"),
            }
            .fail();
        }
    }
    let mut sorted = peel.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    Ok(sorted)
}

/// Emit the tiling op plus one `transform.loop.peel` per requested loop, and
/// return the tiling op.
///
/// The tiling op yields the tiled payload at result 0 and the generated loop
/// at level `i` at result `1 + i`; peels consume the loop handles in
/// ascending level order.
fn emit_tiling(
    ctx: &mut BuildCtx<'_>,
    op_name: &'static str,
    target: Value,
    tile_sizes: &[i64],
    tile_interchange: &[i64],
    peel: &[i64],
) -> Result<OpId> {
    let num_loops = loops_produced(tile_sizes);
    let peel = checked_peel(peel, num_loops)?;

    let mut b = Builder::at_end(ctx.module, ctx.body);
    let mut spec = OpSpec::new(op_name)
        .operand(target)
        .attr("sizes", tile_sizes.to_vec())
        .results(1 + num_loops);
    if !tile_interchange.is_empty() {
        spec = spec.attr("interchange", tile_interchange.to_vec());
    }
    let tiled = b.build(spec);

    for index in peel {
        b.build(OpSpec::new("transform.loop.peel").operand(b.result(tiled, 1 + index as usize)).results(1));
    }
    Ok(tiled)
}

/// Tile a named op, optionally peeling generated loops and scalarizing
/// remaining dynamic dimensions of the tiled payload.
#[derive(Debug, Clone)]
pub struct Tile {
    fun_name: String,
    op_name: String,
    tile_sizes: Vec<i64>,
    tile_interchange: Vec<i64>,
    peel: Vec<i64>,
    scalarize_dyn_dims: bool,
}

impl Tile {
    pub fn new(fun_name: impl Into<String>, op_name: impl Into<String>, overrides: Overrides) -> Result<Self> {
        let mut specs = tiling_specs();
        specs.push(VarSpec::new("scalarize_dyn_dims", VarKind::Bool, false));
        let vars = bind("Tile", &specs, overrides)?;
        Ok(Self {
            fun_name: fun_name.into(),
            op_name: op_name.into(),
            tile_sizes: vars.int_list("tile_sizes")?,
            tile_interchange: vars.int_list("tile_interchange")?,
            peel: vars.int_list("peel")?,
            scalarize_dyn_dims: vars.boolean("scalarize_dyn_dims")?,
        })
    }

    pub fn tile_sizes(&self) -> &[i64] {
        &self.tile_sizes
    }

    pub fn peel(&self) -> &[i64] {
        &self.peel
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let target = match_target(ctx, &self.fun_name, &self.op_name)?;
        let tiled = emit_tiling(
            ctx,
            "transform.structured.tile",
            target,
            &self.tile_sizes,
            &self.tile_interchange,
            &self.peel,
        )?;
        if self.scalarize_dyn_dims {
            let mut b = Builder::at_end(ctx.module, ctx.body);
            b.build(OpSpec::new("transform.structured.scalarize").operand(b.result(tiled, 0)).results(1));
        }
        Ok(())
    }
}

/// Tile a named op and fuse its producers into the generated loop nest.
#[derive(Debug, Clone)]
pub struct Fuse {
    fun_name: String,
    op_name: String,
    tile_sizes: Vec<i64>,
    tile_interchange: Vec<i64>,
    peel: Vec<i64>,
}

impl Fuse {
    pub fn new(fun_name: impl Into<String>, op_name: impl Into<String>, overrides: Overrides) -> Result<Self> {
        let vars = bind("Fuse", &tiling_specs(), overrides)?;
        Ok(Self {
            fun_name: fun_name.into(),
            op_name: op_name.into(),
            tile_sizes: vars.int_list("tile_sizes")?,
            tile_interchange: vars.int_list("tile_interchange")?,
            peel: vars.int_list("peel")?,
        })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let target = match_target(ctx, &self.fun_name, &self.op_name)?;
        emit_tiling(
            ctx,
            "transform.structured.fuse",
            target,
            &self.tile_sizes,
            &self.tile_interchange,
            &self.peel,
        )
        .map(drop)
    }
}

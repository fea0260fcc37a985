//! Transforms scoped to an ancestor loop of a named op.
//!
//! Each resolves its anchor op, walks up `parent_loop_num` enclosing
//! `scf.for` loops with `transform.loop.get_parent_for`, and applies one
//! rewrite to that loop.

use tessera_ir::{Attr, Builder, OpSpec, Value};

use super::{match_target, BuildCtx};
use crate::error::{InvalidValueSnafu, Result};
use crate::variables::{bind, BoundVars, Overrides, VarKind, VarSpec};

fn parent_loop_spec() -> VarSpec {
    VarSpec::new("parent_loop_num", VarKind::Int, 1)
}

fn positive(vars: &BoundVars, name: &'static str) -> Result<i64> {
    let value = vars.int(name)?;
    if value < 1 {
        return InvalidValueSnafu { name, reason: format!("{value} is not a positive integer") }.fail();
    }
    Ok(value)
}

/// Emit `transform.loop.get_parent_for` and return the loop handle.
fn get_parent_loop(ctx: &mut BuildCtx<'_>, anchor: Value, parent_loop_num: i64) -> Value {
    let mut b = Builder::at_end(ctx.module, ctx.body);
    let parent = b.build(
        OpSpec::new("transform.loop.get_parent_for")
            .operand(anchor)
            .attr("num_loops", parent_loop_num)
            .results(1),
    );
    b.result(parent, 0)
}

/// Unroll the `parent_loop_num`-th loop above a named op by a constant factor.
#[derive(Debug, Clone)]
pub struct UnrollOneParentLoop {
    fun_name: String,
    op_name: String,
    parent_loop_num: i64,
    unroll_factor: i64,
}

impl UnrollOneParentLoop {
    pub fn new(fun_name: impl Into<String>, op_name: impl Into<String>, overrides: Overrides) -> Result<Self> {
        let specs = [parent_loop_spec(), VarSpec::new("unroll_factor", VarKind::Int, 1)];
        let vars = bind("UnrollOneParentLoop", &specs, overrides)?;
        Ok(Self {
            fun_name: fun_name.into(),
            op_name: op_name.into(),
            parent_loop_num: positive(&vars, "parent_loop_num")?,
            unroll_factor: positive(&vars, "unroll_factor")?,
        })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let anchor = match_target(ctx, &self.fun_name, &self.op_name)?;
        let parent = get_parent_loop(ctx, anchor, self.parent_loop_num);
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(OpSpec::new("transform.loop.unroll").operand(parent).attr("factor", self.unroll_factor));
        Ok(())
    }
}

/// Software-pipeline the `parent_loop_num`-th loop above a named op.
#[derive(Debug, Clone)]
pub struct PipelineOneParentLoop {
    fun_name: String,
    op_name: String,
    parent_loop_num: i64,
    iteration_interval: i64,
    read_latency: i64,
}

impl PipelineOneParentLoop {
    pub fn new(fun_name: impl Into<String>, op_name: impl Into<String>, overrides: Overrides) -> Result<Self> {
        let specs = [
            parent_loop_spec(),
            VarSpec::new("II", VarKind::Int, 1),
            VarSpec::new("read_latency", VarKind::Int, 10),
        ];
        let vars = bind("PipelineOneParentLoop", &specs, overrides)?;
        Ok(Self {
            fun_name: fun_name.into(),
            op_name: op_name.into(),
            parent_loop_num: positive(&vars, "parent_loop_num")?,
            iteration_interval: positive(&vars, "II")?,
            read_latency: positive(&vars, "read_latency")?,
        })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let anchor = match_target(ctx, &self.fun_name, &self.op_name)?;
        let parent = get_parent_loop(ctx, anchor, self.parent_loop_num);
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(
            OpSpec::new("transform.loop.pipeline")
                .operand(parent)
                .attr("iteration_interval", self.iteration_interval)
                .attr("read_latency", self.read_latency)
                .results(1),
        );
        Ok(())
    }
}

/// Outline the `parent_loop_num`-th loop above a named op into a new function.
#[derive(Debug, Clone)]
pub struct OutlineOneParentLoop {
    fun_name: String,
    op_name: String,
    parent_loop_num: i64,
    result_func_name: String,
}

impl OutlineOneParentLoop {
    pub fn new(
        fun_name: impl Into<String>,
        op_name: impl Into<String>,
        result_func_name: impl Into<String>,
        overrides: Overrides,
    ) -> Result<Self> {
        let specs = [parent_loop_spec()];
        let vars = bind("OutlineOneParentLoop", &specs, overrides)?;
        Ok(Self {
            fun_name: fun_name.into(),
            op_name: op_name.into(),
            parent_loop_num: positive(&vars, "parent_loop_num")?,
            result_func_name: result_func_name.into(),
        })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let anchor = match_target(ctx, &self.fun_name, &self.op_name)?;
        let parent = get_parent_loop(ctx, anchor, self.parent_loop_num);
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(
            OpSpec::new("transform.loop.outline")
                .operand(parent)
                .attr("func_name", Attr::str(&self.result_func_name))
                .results(1),
        );
        Ok(())
    }
}

//! Operand padding with packing, hoisting and layout transposition.

use tessera_ir::{Attr, Builder, OpSpec};

use super::{match_target, BuildCtx};
use crate::error::Result;
use crate::variables::{bind, Overrides, VarKind, VarSpec};

/// Pad the operands of a named op to static sizes.
///
/// `pack_paddings` and `hoist_paddings` are per-operand controls;
/// `transpose_paddings` carries one permutation vector per padded operand
/// and each row is validated as a permutation of `0..len`.
#[derive(Debug, Clone)]
pub struct Pad {
    fun_name: String,
    op_name: String,
    padding_values: Vec<i64>,
    padding_dimensions: Vec<i64>,
    pack_paddings: Vec<i64>,
    hoist_paddings: Vec<i64>,
    transpose_paddings: Vec<Vec<i64>>,
}

impl Pad {
    pub fn new(fun_name: impl Into<String>, op_name: impl Into<String>, overrides: Overrides) -> Result<Self> {
        let specs = [
            VarSpec::new("padding_values", VarKind::SizeList, Vec::<i64>::new()),
            VarSpec::new("padding_dimensions", VarKind::IndexList, Vec::<i64>::new()),
            VarSpec::new("pack_paddings", VarKind::IndexList, Vec::<i64>::new()),
            VarSpec::new("hoist_paddings", VarKind::IndexList, Vec::<i64>::new()),
            VarSpec::new("transpose_paddings", VarKind::PermutationList, Vec::<Vec<i64>>::new()),
        ];
        let vars = bind("Pad", &specs, overrides)?;
        Ok(Self {
            fun_name: fun_name.into(),
            op_name: op_name.into(),
            padding_values: vars.int_list("padding_values")?,
            padding_dimensions: vars.int_list("padding_dimensions")?,
            pack_paddings: vars.int_list("pack_paddings")?,
            hoist_paddings: vars.int_list("hoist_paddings")?,
            transpose_paddings: vars.int_list_list("transpose_paddings")?,
        })
    }

    pub fn transpose_paddings(&self) -> &[Vec<i64>] {
        &self.transpose_paddings
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let target = match_target(ctx, &self.fun_name, &self.op_name)?;
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(
            OpSpec::new("transform.structured.pad")
                .operand(target)
                .attr("padding_values", self.padding_values.clone())
                .attr("padding_dimensions", self.padding_dimensions.clone())
                .attr("pack_paddings", self.pack_paddings.clone())
                .attr("hoist_paddings", self.hoist_paddings.clone())
                .attr("transpose_paddings", Attr::IntArrayArray(self.transpose_paddings.clone()))
                .results(1),
        );
        Ok(())
    }
}

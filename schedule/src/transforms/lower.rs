//! Progressive lowering: staged vector lowering and the final LLVM lowering.

use strum::{Display, EnumString, VariantNames};
use tessera_ir::{Attr, Builder, OpSpec};

use super::BuildCtx;
use crate::error::{InvalidValueSnafu, NotSupportedSnafu, Result};
use crate::variables::{bind, Overrides, VarKind, VarSpec};

/// How `vector.contract` is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum ContractionLowering {
    #[strum(serialize = "outerproduct")]
    OuterProduct,
    #[strum(serialize = "dot")]
    Dot,
    #[strum(serialize = "matrixintrinsics")]
    MatrixIntrinsics,
}

/// How `vector.multi_reduction` is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum MultiReductionLowering {
    #[strum(serialize = "innerparallel")]
    InnerParallel,
    #[strum(serialize = "innerreduction")]
    InnerReduction,
}

/// How masked transfers are split into fast and slow paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum VectorTransferSplit {
    #[strum(serialize = "none")]
    None,
    #[strum(serialize = "linalg-copy")]
    LinalgCopy,
    #[strum(serialize = "vector-transfers")]
    VectorTransfers,
}

/// How `vector.transpose` is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum TransposeLowering {
    #[strum(serialize = "eltwise")]
    EltWise,
    #[strum(serialize = "flat_transpose")]
    FlatTranspose,
    #[strum(serialize = "shuffle")]
    Shuffle,
}

/// Number of lowering stages the vector pipeline defines.
pub const NUM_LOWERING_STAGES: i64 = 7;

fn parse_choice<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        InvalidValueSnafu { name, reason: format!("`{value}` is not a recognized option") }.build()
    })
}

/// Lower vector ops stage by stage.
///
/// The stages are cumulative: requesting stage `k` implies every stage up to
/// `k`, and one `transform.lower_vectors` op is emitted per stage in
/// ascending order, each carrying the full prefix of stages it applies.
#[derive(Debug, Clone)]
pub struct LowerVectors {
    stages: Vec<i64>,
    contraction_lowering: ContractionLowering,
    multi_reduction_lowering: MultiReductionLowering,
    split_transfers: VectorTransferSplit,
    transpose_lowering: TransposeLowering,
    transpose_avx2_lowering: bool,
    unroll_vector_transfers: bool,
    max_transfer_rank: i64,
    print_after_all: bool,
}

impl LowerVectors {
    pub fn new(overrides: Overrides) -> Result<Self> {
        let specs = [
            VarSpec::new("stages", VarKind::IndexList, (0..NUM_LOWERING_STAGES).collect::<Vec<i64>>()),
            VarSpec::new("contraction_lowering", VarKind::Choice(ContractionLowering::VARIANTS), "outerproduct"),
            VarSpec::new("max_transfer_rank", VarKind::Int, 1),
            VarSpec::new(
                "multi_reduction_lowering",
                VarKind::Choice(MultiReductionLowering::VARIANTS),
                "innerparallel",
            ),
            VarSpec::new("split_transfers", VarKind::Choice(VectorTransferSplit::VARIANTS), "linalg-copy"),
            VarSpec::new("transpose_lowering", VarKind::Choice(TransposeLowering::VARIANTS), "eltwise"),
            VarSpec::new("transpose_avx2_lowering", VarKind::Bool, false),
            VarSpec::new("unroll_vector_transfers", VarKind::Bool, true),
            VarSpec::new("print_after_all", VarKind::Bool, false),
        ];
        let vars = bind("LowerVectors", &specs, overrides)?;

        let stages = vars.int_list("stages")?;
        if let Some(stage) = stages.iter().find(|s| **s >= NUM_LOWERING_STAGES) {
            return InvalidValueSnafu {
                name: "stages",
                reason: format!("stage {stage} is out of range, the pipeline has {NUM_LOWERING_STAGES} stages"),
            }
            .fail();
        }

        Ok(Self {
            stages,
            contraction_lowering: parse_choice("contraction_lowering", &vars.choice("contraction_lowering")?)?,
            multi_reduction_lowering: parse_choice(
                "multi_reduction_lowering",
                &vars.choice("multi_reduction_lowering")?,
            )?,
            split_transfers: parse_choice("split_transfers", &vars.choice("split_transfers")?)?,
            transpose_lowering: parse_choice("transpose_lowering", &vars.choice("transpose_lowering")?)?,
            transpose_avx2_lowering: vars.boolean("transpose_avx2_lowering")?,
            unroll_vector_transfers: vars.boolean("unroll_vector_transfers")?,
            max_transfer_rank: vars.int("max_transfer_rank")?,
            print_after_all: vars.boolean("print_after_all")?,
        })
    }

    pub fn stages(&self) -> &[i64] {
        &self.stages
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        if self.max_transfer_rank != 1 {
            return NotSupportedSnafu { what: "max_transfer_rank" }.fail();
        }
        if self.print_after_all {
            return NotSupportedSnafu { what: "print_after_all" }.fail();
        }

        let Some(&max_stage) = self.stages.iter().max() else {
            return Ok(());
        };
        let mut b = Builder::at_end(ctx.module, ctx.body);
        for stage in 0..=max_stage {
            b.build(
                OpSpec::new("transform.lower_vectors")
                    // Stage numbering in the emitted op is 1-based.
                    .attr("stages", (1..=stage + 1).collect::<Vec<i64>>())
                    .attr("contraction_lowering", Attr::str(self.contraction_lowering.to_string()))
                    .attr("multireduction_lowering", Attr::str(self.multi_reduction_lowering.to_string()))
                    .attr("split_transfers", Attr::str(self.split_transfers.to_string()))
                    .attr("unroll_vector_transfers", self.unroll_vector_transfers)
                    .attr("transpose_lowering", Attr::str(self.transpose_lowering.to_string()))
                    .attr("transpose_avx2_lowering", self.transpose_avx2_lowering),
            );
        }
        Ok(())
    }
}

/// Final lowering of the whole module to the LLVM dialect.
#[derive(Debug, Clone)]
pub struct LowerToLlvm {
    reassociate_fp_reductions: bool,
    enable_index_optimizations: bool,
    enable_arm_neon: bool,
    enable_arm_sve: bool,
    enable_amx: bool,
    enable_x86vector: bool,
    enable_async: bool,
}

impl LowerToLlvm {
    pub fn new(overrides: Overrides) -> Result<Self> {
        let specs = [
            VarSpec::new("reassociate_fp_reductions", VarKind::Bool, false),
            VarSpec::new("enable_index_optimizations", VarKind::Bool, false),
            VarSpec::new("enable_arm_neon", VarKind::Bool, false),
            VarSpec::new("enable_arm_sve", VarKind::Bool, false),
            VarSpec::new("enable_amx", VarKind::Bool, false),
            VarSpec::new("enable_x86vector", VarKind::Bool, false),
            VarSpec::new("enable_async", VarKind::Bool, false),
        ];
        let vars = bind("LowerToLLVM", &specs, overrides)?;
        Ok(Self {
            reassociate_fp_reductions: vars.boolean("reassociate_fp_reductions")?,
            enable_index_optimizations: vars.boolean("enable_index_optimizations")?,
            enable_arm_neon: vars.boolean("enable_arm_neon")?,
            enable_arm_sve: vars.boolean("enable_arm_sve")?,
            enable_amx: vars.boolean("enable_amx")?,
            enable_x86vector: vars.boolean("enable_x86vector")?,
            enable_async: vars.boolean("enable_async")?,
        })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(
            OpSpec::new("transform.lower_to_llvm")
                .attr("reassociate_fp_reductions", self.reassociate_fp_reductions)
                .attr("enable_index_optimizations", self.enable_index_optimizations)
                .attr("enable_arm_neon", self.enable_arm_neon)
                .attr("enable_arm_sve", self.enable_arm_sve)
                .attr("enable_amx", self.enable_amx)
                .attr("enable_x86vector", self.enable_x86vector)
                .attr("enable_async", self.enable_async),
        );
        Ok(())
    }
}

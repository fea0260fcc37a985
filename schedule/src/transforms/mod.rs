//! Transform builders: one variant per named transformation.
//!
//! Each builder turns its validated variables plus a target selection into
//! exactly one pass-invocation request in the transform-dialect region.
//! Builders that target a named op resolve it through the
//! [pattern registry](crate::registry); whole-module builders emit
//! unconditionally.
//!
//! # Module Organization
//!
//! - [`tile`] - Structural tiling and producer fusion
//! - [`pad`] - Operand padding (packing, hoisting, transposition)
//! - [`vectorize`] - Vectorization, generalization, interchange, decomposition
//! - [`bufferize`] - One-shot bufferization
//! - [`lower`] - Staged vector lowering and lowering to LLVM
//! - [`loops`] - Unroll/pipeline/outline scoped to an ancestor loop
//! - [`inject`] - Whole-module replacement by literal IR
//! - [`ext`] - `linalg_ext` tiling and parallelism rewrites

pub mod bufferize;
pub mod ext;
pub mod inject;
pub mod loops;
pub mod lower;
pub mod pad;
pub mod tile;
pub mod vectorize;

use tessera_ir::{Attr, BlockId, Builder, Module, OpSpec, Value};

pub use bufferize::Bufferize;
pub use ext::{
    LinalgExtInParallelToAsync, LinalgExtInParallelToScfFor, LinalgExtTile, LinalgExtTileToInParallel,
    LinalgExtTileToScfFor,
};
pub use inject::Inject;
pub use loops::{OutlineOneParentLoop, PipelineOneParentLoop, UnrollOneParentLoop};
pub use lower::{
    ContractionLowering, LowerToLlvm, LowerVectors, MultiReductionLowering, TransposeLowering, VectorTransferSplit,
};
pub use pad::Pad;
pub use tile::{Fuse, Tile};
pub use vectorize::{Decompose, Generalize, Interchange, Vectorize};

use crate::error::Result;
use crate::registry;

/// Explicit build context handed to every builder by the schedule runner.
///
/// Carries the module, the block inside the active `transform.sequence`, and
/// the sequence's target handle. Builders never discover their surroundings
/// through ambient state; the registry's parent walk from `body` is the one
/// documented exception, and it is a checked precondition.
pub struct BuildCtx<'m> {
    pub module: &'m mut Module,
    /// Block inside the active `transform.sequence` region.
    pub body: BlockId,
    /// The sequence's root target handle (its block argument).
    pub target: Value,
}

/// Resolve a (function, op-name) target selection: ensure the match pattern
/// exists, then emit a `transform.pdl_match` and return its result handle.
pub(crate) fn match_target(ctx: &mut BuildCtx<'_>, fun_name: &str, op_name: &str) -> Result<Value> {
    let symbol = registry::ensure_pattern(ctx.module, ctx.body, fun_name, op_name)?;
    let mut b = Builder::at_end(ctx.module, ctx.body);
    let matched = b.build(
        OpSpec::new("transform.pdl_match")
            .operand(ctx.target)
            .attr("pattern", Attr::symbol(symbol))
            .results(1),
    );
    Ok(b.result(matched, 0))
}

/// A named, parameterized request to modify IR.
///
/// Tagged variant over every transform kind; the schedule runner dispatches
/// on the tag. Instances hold validated variable values and identifying
/// fields, are consumed once when asked to build their IR fragment, and are
/// stateless afterwards.
#[derive(Debug, Clone)]
pub enum Transform {
    Tile(Tile),
    Fuse(Fuse),
    Pad(Pad),
    Vectorize(Vectorize),
    Generalize(Generalize),
    Interchange(Interchange),
    Decompose(Decompose),
    Bufferize(Bufferize),
    LowerVectors(LowerVectors),
    LowerToLlvm(LowerToLlvm),
    UnrollOneParentLoop(UnrollOneParentLoop),
    PipelineOneParentLoop(PipelineOneParentLoop),
    OutlineOneParentLoop(OutlineOneParentLoop),
    Inject(Inject),
    LinalgExtTile(LinalgExtTile),
    LinalgExtTileToScfFor(LinalgExtTileToScfFor),
    LinalgExtTileToInParallel(LinalgExtTileToInParallel),
    LinalgExtInParallelToScfFor(LinalgExtInParallelToScfFor),
    LinalgExtInParallelToAsync(LinalgExtInParallelToAsync),
}

impl Transform {
    /// Stable name of the transform kind, used in errors and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tile(_) => "Tile",
            Self::Fuse(_) => "Fuse",
            Self::Pad(_) => "Pad",
            Self::Vectorize(_) => "Vectorize",
            Self::Generalize(_) => "Generalize",
            Self::Interchange(_) => "Interchange",
            Self::Decompose(_) => "Decompose",
            Self::Bufferize(_) => "Bufferize",
            Self::LowerVectors(_) => "LowerVectors",
            Self::LowerToLlvm(_) => "LowerToLlvm",
            Self::UnrollOneParentLoop(_) => "UnrollOneParentLoop",
            Self::PipelineOneParentLoop(_) => "PipelineOneParentLoop",
            Self::OutlineOneParentLoop(_) => "OutlineOneParentLoop",
            Self::Inject(_) => "Inject",
            Self::LinalgExtTile(_) => "LinalgExtTile",
            Self::LinalgExtTileToScfFor(_) => "LinalgExtTileToScfFor",
            Self::LinalgExtTileToInParallel(_) => "LinalgExtTileToInParallel",
            Self::LinalgExtInParallelToScfFor(_) => "LinalgExtInParallelToScfFor",
            Self::LinalgExtInParallelToAsync(_) => "LinalgExtInParallelToAsync",
        }
    }

    /// Contribute this transform's IR fragment to the schedule region.
    ///
    /// `Inject` never reaches this point: the schedule runner applies it
    /// directly to the module.
    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        match self {
            Self::Tile(t) => t.build_ir(ctx),
            Self::Fuse(t) => t.build_ir(ctx),
            Self::Pad(t) => t.build_ir(ctx),
            Self::Vectorize(t) => t.build_ir(ctx),
            Self::Generalize(t) => t.build_ir(ctx),
            Self::Interchange(t) => t.build_ir(ctx),
            Self::Decompose(t) => t.build_ir(ctx),
            Self::Bufferize(t) => t.build_ir(ctx),
            Self::LowerVectors(t) => t.build_ir(ctx),
            Self::LowerToLlvm(t) => t.build_ir(ctx),
            Self::UnrollOneParentLoop(t) => t.build_ir(ctx),
            Self::PipelineOneParentLoop(t) => t.build_ir(ctx),
            Self::OutlineOneParentLoop(t) => t.build_ir(ctx),
            Self::Inject(_) => unreachable!("inject is applied by the schedule runner"),
            Self::LinalgExtTile(t) => t.build_ir(ctx),
            Self::LinalgExtTileToScfFor(t) => t.build_ir(ctx),
            Self::LinalgExtTileToInParallel(t) => t.build_ir(ctx),
            Self::LinalgExtInParallelToScfFor(t) => t.build_ir(ctx),
            Self::LinalgExtInParallelToAsync(t) => t.build_ir(ctx),
        }
    }
}

macro_rules! impl_from_transform {
    ($($variant:ident),+ $(,)?) => {
        $(impl From<$variant> for Transform {
            fn from(t: $variant) -> Self {
                Self::$variant(t)
            }
        })+
    };
}

impl_from_transform!(
    Tile,
    Fuse,
    Pad,
    Vectorize,
    Generalize,
    Interchange,
    Decompose,
    Bufferize,
    LowerVectors,
    LowerToLlvm,
    UnrollOneParentLoop,
    PipelineOneParentLoop,
    OutlineOneParentLoop,
    Inject,
    LinalgExtTile,
    LinalgExtTileToScfFor,
    LinalgExtTileToInParallel,
    LinalgExtInParallelToScfFor,
    LinalgExtInParallelToAsync,
);

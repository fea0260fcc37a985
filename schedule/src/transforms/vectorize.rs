//! Vectorization and the rewrites that prepare payloads for it.

use tessera_ir::{Builder, OpSpec};

use super::{match_target, BuildCtx};
use crate::error::{NotSupportedSnafu, Result};
use crate::variables::{bind, Overrides, VarKind, VarSpec};

/// Vectorize a named op, or every supported op in the module when no op name
/// is given.
#[derive(Debug, Clone)]
pub struct Vectorize {
    fun_name: String,
    op_name: Option<String>,
    vectorize_paddings: bool,
    vectorize_only_tiled: bool,
}

impl Vectorize {
    pub fn new(fun_name: impl Into<String>, op_name: Option<&str>, overrides: Overrides) -> Result<Self> {
        let specs = [
            VarSpec::new("vectorize_paddings", VarKind::Bool, true),
            VarSpec::new("vectorize_only_tiled", VarKind::Bool, false),
        ];
        let vars = bind("Vectorize", &specs, overrides)?;
        Ok(Self {
            fun_name: fun_name.into(),
            op_name: op_name.map(str::to_owned),
            vectorize_paddings: vars.boolean("vectorize_paddings")?,
            vectorize_only_tiled: vars.boolean("vectorize_only_tiled")?,
        })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let spec = OpSpec::new("transform.structured.vectorize")
            .attr("vectorize_padding", self.vectorize_paddings)
            .attr("vectorize_only_tiled", self.vectorize_only_tiled);
        match &self.op_name {
            Some(op_name) => {
                let target = match_target(ctx, &self.fun_name, op_name)?;
                let mut b = Builder::at_end(ctx.module, ctx.body);
                b.build(spec.operand(target).results(1));
            }
            // Module-scoped form: no target operand, applies everywhere.
            None => {
                let mut b = Builder::at_end(ctx.module, ctx.body);
                b.build(spec);
            }
        }
        Ok(())
    }
}

/// Rewrite a named structured op into its generic form.
#[derive(Debug, Clone)]
pub struct Generalize {
    fun_name: String,
    op_name: String,
}

impl Generalize {
    pub fn new(fun_name: impl Into<String>, op_name: impl Into<String>, overrides: Overrides) -> Result<Self> {
        let specs = [VarSpec::new("iterator_interchange", VarKind::IndexList, Vec::<i64>::new())];
        let vars = bind("Generalize", &specs, overrides)?;
        if !vars.int_list("iterator_interchange")?.is_empty() {
            return NotSupportedSnafu { what: "iterator_interchange on generalize" }.fail();
        }
        Ok(Self { fun_name: fun_name.into(), op_name: op_name.into() })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let target = match_target(ctx, &self.fun_name, &self.op_name)?;
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(OpSpec::new("transform.structured.generalize").operand(target).results(1));
        Ok(())
    }
}

/// Permute the iterators of generic ops in the named function.
#[derive(Debug, Clone)]
pub struct Interchange {
    fun_name: String,
    iterator_interchange: Vec<i64>,
}

impl Interchange {
    pub fn new(fun_name: impl Into<String>, overrides: Overrides) -> Result<Self> {
        let specs = [VarSpec::new("iterator_interchange", VarKind::IndexList, Vec::<i64>::new())];
        let vars = bind("Interchange", &specs, overrides)?;
        Ok(Self { fun_name: fun_name.into(), iterator_interchange: vars.int_list("iterator_interchange")? })
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        // Interchange only applies to the generic form.
        let target = match_target(ctx, &self.fun_name, "linalg.generic")?;
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(
            OpSpec::new("transform.structured.interchange")
                .operand(target)
                .attr("iterator_interchange", self.iterator_interchange.clone())
                .results(1),
        );
        Ok(())
    }
}

/// Decompose convolution-like ops into lower-dimensional forms, module-wide.
#[derive(Debug, Clone, Default)]
pub struct Decompose;

impl Decompose {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn build_ir(&self, ctx: &mut BuildCtx<'_>) -> Result<()> {
        let mut b = Builder::at_end(ctx.module, ctx.body);
        b.build(OpSpec::new("transform.structured.decompose"));
        Ok(())
    }
}

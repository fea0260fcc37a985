//! Pattern registry: one match-pattern per (function, op-name) pair.
//!
//! Transforms targeting a named op resolve it through a generated PDL
//! pattern. Within one enclosing `transform.with_pdl_patterns` container the
//! registry guarantees at most one pattern per distinct pair: the first
//! request constructs the fragment, later requests return the existing
//! symbol.

use tessera_ir::{Attr, BlockId, Builder, Module, OpId, OpSpec};

use crate::error::{MissingContextSnafu, Result};

/// Name of the op that scopes pattern deduplication.
pub const PATTERN_CONTAINER: &str = "transform.with_pdl_patterns";

/// Deterministic pattern symbol for a (function, op-name) pair.
///
/// Dots in the op name are not valid in symbols and are replaced.
pub fn pattern_name(fun_name: &str, op_name: &str) -> String {
    format!("match_{}_in_{}", op_name.replace('.', "_"), fun_name)
}

/// Return the match-pattern symbol for the pair, emitting the pattern into
/// the nearest enclosing container on first request.
///
/// Walks the parent chain from `insert_block`; calling this outside a
/// `transform.with_pdl_patterns` op is a structural precondition violation
/// and fails with [`Error::MissingContext`](crate::Error). Idempotent across
/// repeated calls with the same pair.
pub fn ensure_pattern(module: &mut Module, insert_block: BlockId, fun_name: &str, op_name: &str) -> Result<String> {
    let container = Builder::at_end(module, insert_block)
        .find_enclosing(PATTERN_CONTAINER)
        .ok_or_else(|| MissingContextSnafu { expected: PATTERN_CONTAINER }.build())?;

    let name = pattern_name(fun_name, op_name);
    if module.lookup_symbol(container, &name).is_none() {
        let body = module.op(container).regions[0][0];
        emit_matcher(module, body, &name, fun_name, op_name);
        tracing::debug!(pattern = %name, fun = fun_name, op = op_name, "emitted match pattern");
    }
    Ok(name)
}

/// Construct the pattern fragment: operand/result wildcards, a match on the
/// op name, a constraint that the op is lexically nested inside the named
/// function, and the rewrite hook handing the match to the transform
/// interpreter.
fn emit_matcher(module: &mut Module, container_body: BlockId, name: &str, fun_name: &str, op_name: &str) {
    let mut b = Builder::at_end(module, container_body);
    let pattern = b.build(
        OpSpec::new("pdl.pattern")
            .attr("sym_name", Attr::str(name))
            .attr("benefit", Attr::Int(1))
            .regions(1),
    );
    let body = b.module_mut().append_block(pattern, 0, 0);

    let mut b = Builder::at_end(module, body);
    let operands = b.build(OpSpec::new("pdl.operands").results(1));
    let types = b.build(OpSpec::new("pdl.types").results(1));
    let operands = b.result(operands, 0);
    let types = b.result(types, 0);
    let op = b.build(
        OpSpec::new("pdl.operation")
            .operands([operands, types])
            .attr("opName", Attr::str(op_name))
            .results(1),
    );
    let op = b.result(op, 0);
    let fun = b.build(OpSpec::new("pdl.attribute").attr("value", Attr::symbol(fun_name)).results(1));
    let fun = b.result(fun, 0);
    b.build(
        OpSpec::new("pdl.apply_native_constraint")
            .operands([op, fun])
            .attr("name", Attr::str("nestedInFunc")),
    );
    b.build(OpSpec::new("pdl.rewrite").operand(op).attr("name", Attr::str("transform.dialect")));
}

/// Read back the (op-name, function) pair a registered pattern matches.
///
/// Used by the interpreter when resolving `transform.pdl_match` operations.
pub fn matcher_target(module: &Module, pattern: OpId) -> Option<(String, String)> {
    let body = *module.op(pattern).regions.first()?.first()?;
    let mut op_name = None;
    let mut fun_name = None;
    for &op in &module.block(body).ops {
        let data = module.op(op);
        match data.name.as_str() {
            "pdl.operation" => op_name = data.attr("opName").and_then(Attr::as_str).map(str::to_owned),
            "pdl.attribute" => fun_name = data.attr("value").and_then(Attr::as_symbol).map(str::to_owned),
            _ => {}
        }
    }
    Some((op_name?, fun_name?))
}

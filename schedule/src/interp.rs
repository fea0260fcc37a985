//! Reference interpreter for the schedule region.
//!
//! Executes the ops inside the `transform.sequence` against the payload IR in
//! the same module. Handle values map to lists of payload ops; structural
//! transforms (tiling, outlining, `linalg_ext` wrapping) materialize real IR,
//! while purely numeric rewrites record themselves as attributes on the
//! payload or the module root so their effect is observable and printable.

use std::collections::HashMap;

use tessera_ir::{Attr, Module, OpId, OpSpec, Value};

use crate::error::{Error, PassFailedSnafu, Result};
use crate::passes::INTERPRET_SCHEDULE;
use crate::registry::{matcher_target, PATTERN_CONTAINER};

fn fail(reason: impl Into<String>) -> Error {
    PassFailedSnafu { pass: INTERPRET_SCHEDULE, reason: reason.into() }.build()
}

/// Interpret the schedule region, if the module has one.
///
/// A module without a pattern container is left untouched.
pub fn interpret_schedule(module: &mut Module) -> Result<()> {
    let body = module.body();
    let Some(container) = module.find_in_block(body, PATTERN_CONTAINER) else {
        return Ok(());
    };
    let container_body = module.op(container).regions[0][0];
    let sequence = module
        .find_in_block(container_body, "transform.sequence")
        .ok_or_else(|| fail("pattern container has no transform.sequence"))?;
    let sequence_body = module.op(sequence).regions[0][0];

    let mut interp = Interpreter { env: HashMap::new(), container };
    // The sequence's block argument denotes the whole module.
    let root = module.root();
    interp.env.insert(module.arg(sequence_body, 0), vec![root]);

    let steps = module.block(sequence_body).ops.clone();
    for step in steps {
        interp.step(module, step)?;
    }
    Ok(())
}

/// Erase the schedule region. A no-op when the module has none.
pub fn drop_schedule(module: &mut Module) {
    let body = module.body();
    if let Some(container) = module.find_in_block(body, PATTERN_CONTAINER) {
        module.erase_op(container);
        tracing::debug!("dropped schedule region");
    }
}

struct Interpreter {
    /// Handle values to the payload ops they currently denote.
    env: HashMap<Value, Vec<OpId>>,
    container: OpId,
}

impl Interpreter {
    fn payload(&self, data: &tessera_ir::OpData, index: usize) -> Result<Vec<OpId>> {
        let value = *data.operands.get(index).ok_or_else(|| fail(format!("`{}` is missing an operand", data.name)))?;
        self.env.get(&value).cloned().ok_or_else(|| fail("transform handle has no payload"))
    }

    fn step(&mut self, module: &mut Module, op: OpId) -> Result<()> {
        let data = module.op(op).clone();
        match data.name.as_str() {
            "transform.pdl_match" => {
                let sym = data
                    .attr("pattern")
                    .and_then(Attr::as_symbol)
                    .ok_or_else(|| fail("pdl_match without a pattern attribute"))?;
                let pattern = module
                    .lookup_symbol(self.container, sym)
                    .ok_or_else(|| fail(format!("unknown pattern @{sym}")))?;
                let (op_name, fun_name) =
                    matcher_target(module, pattern).ok_or_else(|| fail(format!("malformed pattern @{sym}")))?;
                let matched = self.match_payload(module, &op_name, &fun_name);
                self.env.insert(module.result(op, 0), matched);
            }
            name @ ("transform.structured.tile" | "transform.structured.fuse") => {
                let payload = self.payload(&data, 0)?;
                let sizes = data.attr("sizes").and_then(Attr::as_int_array).unwrap_or(&[]);
                let num_loops = sizes.iter().filter(|s| **s != 0).count();
                let mut loops: Vec<Vec<OpId>> = vec![Vec::new(); num_loops];
                for &p in &payload {
                    let nest = materialize_loop_nest(module, p, num_loops)?;
                    for (level, l) in nest.into_iter().enumerate() {
                        loops[level].push(l);
                    }
                    let key = if name.ends_with("fuse") { "fused" } else { "tiled" };
                    module.op_mut(p).set_attr(key, Attr::Bool(true));
                }
                self.env.insert(module.result(op, 0), payload);
                for (level, l) in loops.into_iter().enumerate() {
                    self.env.insert(module.result(op, 1 + level), l);
                }
            }
            "transform.loop.peel" => {
                let payload = self.payload(&data, 0)?;
                mark(module, &payload, "peeled");
                self.env.insert(module.result(op, 0), payload);
            }
            "transform.structured.scalarize" => {
                let payload = self.payload(&data, 0)?;
                mark(module, &payload, "scalarized");
                self.env.insert(module.result(op, 0), payload);
            }
            "transform.structured.generalize" => {
                let payload = self.payload(&data, 0)?;
                for &p in &payload {
                    module.op_mut(p).name = "linalg.generic".to_owned();
                }
                self.env.insert(module.result(op, 0), payload);
            }
            "transform.structured.interchange" => {
                let payload = self.payload(&data, 0)?;
                let perm = data.attr("iterator_interchange").cloned();
                for &p in &payload {
                    if let Some(perm) = &perm {
                        module.op_mut(p).set_attr("iterator_interchange", perm.clone());
                    }
                }
                self.env.insert(module.result(op, 0), payload);
            }
            "transform.structured.pad" => {
                let payload = self.payload(&data, 0)?;
                mark(module, &payload, "padded");
                self.env.insert(module.result(op, 0), payload);
            }
            "transform.structured.vectorize" => {
                if data.operands.is_empty() {
                    module.set_root_attr("vectorized", Attr::Bool(true));
                } else {
                    let payload = self.payload(&data, 0)?;
                    mark(module, &payload, "vectorized");
                    self.env.insert(module.result(op, 0), payload);
                }
            }
            "transform.structured.decompose" => module.set_root_attr("decomposed", Attr::Bool(true)),
            "transform.bufferize" => module.set_root_attr("bufferized", Attr::Bool(true)),
            "transform.lower_vectors" => {
                let stages = data.attr("stages").cloned().unwrap_or(Attr::IntArray(Vec::new()));
                // Ops are emitted in ascending stage order; the last write is
                // the full stage prefix.
                module.set_root_attr("lower_vectors_stages", stages);
            }
            "transform.lower_to_llvm" => module.set_root_attr("lowered_to_llvm", Attr::Bool(true)),
            "transform.loop.get_parent_for" => {
                let payload = self.payload(&data, 0)?;
                let n = data.attr("num_loops").and_then(Attr::as_int).unwrap_or(1);
                let mut parents = Vec::with_capacity(payload.len());
                for p in payload {
                    parents.push(nth_enclosing_loop(module, p, n)?);
                }
                self.env.insert(module.result(op, 0), parents);
            }
            "transform.loop.unroll" => {
                let payload = self.payload(&data, 0)?;
                let factor = data.attr("factor").cloned().unwrap_or(Attr::Int(1));
                for &p in &payload {
                    module.op_mut(p).set_attr("unroll_factor", factor.clone());
                }
            }
            "transform.loop.pipeline" => {
                let payload = self.payload(&data, 0)?;
                mark(module, &payload, "pipelined");
                self.env.insert(module.result(op, 0), payload);
            }
            "transform.loop.outline" => {
                let name = data
                    .attr("func_name")
                    .and_then(Attr::as_str)
                    .ok_or_else(|| fail("loop.outline without a func_name attribute"))?
                    .to_owned();
                let payload = self.payload(&data, 0)?;
                let body = module.body();
                let mut funcs = Vec::with_capacity(payload.len());
                for l in payload {
                    module.detach_op(l);
                    let func = module.create_op(OpSpec::new("func").attr("sym_name", name.as_str()).regions(1));
                    let func_body = module.append_block(func, 0, 0);
                    module.insert_at_end(func_body, l);
                    module.insert_at_end(body, func);
                    funcs.push(func);
                }
                self.env.insert(module.result(op, 0), funcs);
            }
            "transform.linalg_ext.tile" => {
                let payload = self.payload(&data, 0)?;
                let sizes = data.attr("sizes").cloned().unwrap_or(Attr::IntArray(Vec::new()));
                let mut wrappers = Vec::with_capacity(payload.len());
                for p in payload {
                    let (block, index) =
                        module.detach_op(p).ok_or_else(|| fail("payload op is not inserted in a block"))?;
                    let wrapper =
                        module.create_op(OpSpec::new("linalg_ext.tile").attr("sizes", sizes.clone()).regions(1));
                    module.insert_at(block, index, wrapper);
                    let wrapper_body = module.append_block(wrapper, 0, 0);
                    module.insert_at_end(wrapper_body, p);
                    wrappers.push(wrapper);
                }
                self.env.insert(module.result(op, 0), wrappers);
            }
            name @ ("transform.linalg_ext.tile_to_scf_for"
            | "transform.linalg_ext.tile_to_in_parallel"
            | "transform.linalg_ext.in_parallel_to_scf_for"
            | "transform.linalg_ext.in_parallel_to_async") => {
                let replacement = match name {
                    "transform.linalg_ext.tile_to_in_parallel" => "linalg_ext.in_parallel",
                    "transform.linalg_ext.in_parallel_to_async" => "async.execute",
                    _ => "scf.for",
                };
                let payload = self.payload(&data, 0)?;
                for &p in &payload {
                    module.op_mut(p).name = replacement.to_owned();
                }
                self.env.insert(module.result(op, 0), payload);
            }
            other => return Err(fail(format!("unsupported transform op `{other}`"))),
        }
        Ok(())
    }

    /// All payload ops with the given name lexically nested inside the named
    /// function, excluding the schedule region itself.
    fn match_payload(&self, module: &Module, op_name: &str, fun_name: &str) -> Vec<OpId> {
        module
            .descendants(module.root())
            .into_iter()
            .filter(|&c| {
                module.op(c).name == op_name
                    && !self.inside_container(module, c)
                    && nested_in_func(module, c, fun_name)
            })
            .collect()
    }

    fn inside_container(&self, module: &Module, mut op: OpId) -> bool {
        if op == self.container {
            return true;
        }
        while let Some(parent) = module.parent_op(op) {
            if parent == self.container {
                return true;
            }
            op = parent;
        }
        false
    }
}

fn mark(module: &mut Module, ops: &[OpId], key: &str) {
    for &op in ops {
        module.op_mut(op).set_attr(key, Attr::Bool(true));
    }
}

fn nested_in_func(module: &Module, mut op: OpId, fun_name: &str) -> bool {
    while let Some(parent) = module.parent_op(op) {
        let data = module.op(parent);
        if data.name == "func" && data.sym_name() == Some(fun_name) {
            return true;
        }
        op = parent;
    }
    false
}

/// Replace `payload` with a nest of `num_loops` fresh `scf.for` loops at its
/// former position, moving the payload into the innermost body. Returns the
/// loops outermost first.
fn materialize_loop_nest(module: &mut Module, payload: OpId, num_loops: usize) -> Result<Vec<OpId>> {
    if num_loops == 0 {
        return Ok(Vec::new());
    }
    let (block, index) = module.detach_op(payload).ok_or_else(|| fail("payload op is not inserted in a block"))?;
    let mut loops = Vec::with_capacity(num_loops);
    let mut insert_block = block;
    let mut insert_index = index;
    for _ in 0..num_loops {
        let l = module.create_op(OpSpec::new("scf.for").regions(1));
        module.insert_at(insert_block, insert_index, l);
        insert_block = module.append_block(l, 0, 0);
        insert_index = 0;
        loops.push(l);
    }
    module.insert_at_end(insert_block, payload);
    Ok(loops)
}

fn nth_enclosing_loop(module: &Module, op: OpId, n: i64) -> Result<OpId> {
    let mut found = 0;
    let mut current = op;
    while let Some(parent) = module.parent_op(current) {
        if module.op(parent).name == "scf.for" {
            found += 1;
            if found == n {
                return Ok(parent);
            }
        }
        current = parent;
    }
    Err(fail(format!("op has fewer than {n} enclosing loops")))
}

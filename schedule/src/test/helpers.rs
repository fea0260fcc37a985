use tessera_ir::{Attr, BlockId, Builder, Module, OpId, OpSpec};

use crate::error::Result;
use crate::schedule::open_schedule_region;
use crate::transforms::{BuildCtx, Transform};

/// A payload module with one function holding a fill and a matmul.
pub fn matmul_module(fun_name: &str) -> Module {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    let func = b.build(OpSpec::new("func").attr("sym_name", Attr::str(fun_name)).regions(1));
    let func_body = module.append_block(func, 0, 0);
    let mut b = Builder::at_end(&mut module, func_body);
    b.build(OpSpec::new("linalg.fill").results(1));
    b.build(OpSpec::new("linalg.matmul").results(1));
    module
}

/// Open a schedule region in a fresh module and build one transform into it.
/// Returns the module and the sequence body block.
pub fn build_transform(transform: impl Into<Transform>) -> Result<(Module, BlockId)> {
    let mut module = Module::new();
    let (body, target) = open_schedule_region(&mut module);
    transform.into().build_ir(&mut BuildCtx { module: &mut module, body, target })?;
    Ok((module, body))
}

/// Names of the ops directly inside `block`, in order.
pub fn op_names(module: &Module, block: BlockId) -> Vec<String> {
    module.block(block).ops.iter().map(|&op| module.op(op).name.clone()).collect()
}

/// Every op in the module with the given name, in preorder.
pub fn find_ops(module: &Module, name: &str) -> Vec<OpId> {
    module.descendants(module.root()).into_iter().filter(|&op| module.op(op).name == name).collect()
}

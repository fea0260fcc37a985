//! Insertion-point builder and fluent op specification.

use smallvec::SmallVec;

use crate::attr::Attr;
use crate::module::Module;
use crate::op::{BlockId, OpId, Value};

/// Specification of an operation to create.
///
/// ```ignore
/// let op = builder.build(
///     OpSpec::new("transform.structured.tile")
///         .operand(target)
///         .attr("sizes", Attr::IntArray(vec![4, 4, 4]))
///         .results(4),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct OpSpec {
    pub(crate) name: String,
    pub(crate) operands: SmallVec<[Value; 2]>,
    pub(crate) num_results: usize,
    pub(crate) attrs: Vec<(String, Attr)>,
    pub(crate) num_regions: usize,
}

impl OpSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), operands: SmallVec::new(), num_results: 0, attrs: Vec::new(), num_regions: 0 }
    }

    pub fn operand(mut self, value: Value) -> Self {
        self.operands.push(value);
        self
    }

    pub fn operands(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.operands.extend(values);
        self
    }

    pub fn results(mut self, count: usize) -> Self {
        self.num_results = count;
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Attr>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn regions(mut self, count: usize) -> Self {
        self.num_regions = count;
        self
    }
}

/// Builds operations at the end of a block.
///
/// Borrows the module mutably for its lifetime; everything runs on one thread
/// and each builder is used to completion before the next is created.
pub struct Builder<'m> {
    module: &'m mut Module,
    block: BlockId,
}

impl<'m> Builder<'m> {
    pub fn at_end(module: &'m mut Module, block: BlockId) -> Self {
        Self { module, block }
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn module(&self) -> &Module {
        self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        self.module
    }

    /// Move the insertion point to the end of another block.
    pub fn set_block(&mut self, block: BlockId) {
        self.block = block;
    }

    /// Create the op described by `spec` and insert it at the insertion point.
    pub fn build(&mut self, spec: OpSpec) -> OpId {
        let op = self.module.create_op(spec);
        self.module.insert_at_end(self.block, op);
        op
    }

    /// Value handle for the `index`-th result of `op`.
    pub fn result(&self, op: OpId, index: usize) -> Value {
        self.module.result(op, index)
    }

    /// Walk the parent chain from the insertion point to the nearest enclosing
    /// op with the given name.
    pub fn find_enclosing(&self, name: &str) -> Option<OpId> {
        let mut current = self.module.block(self.block).parent_op();
        while let Some(op) = current {
            if self.module.op(op).name == name {
                return Some(op);
            }
            current = self.module.parent_op(op);
        }
        None
    }
}

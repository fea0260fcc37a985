//! Arena-backed module owning all operations and blocks.
//!
//! A [`Module`] is a single mutable resource owned by the caller. All
//! mutation goes through `&mut self`; there is no interior mutability and no
//! locking (construction is single-threaded by design).

use crate::attr::Attr;
use crate::builder::OpSpec;
use crate::op::{BlockData, BlockId, OpData, OpId, Value};

/// The in-memory IR being built and transformed.
///
/// Holds an op/block arena plus a distinguished root operation named
/// `module` with a single region and a single block (the module body).
/// Erased entries are tombstoned; identifiers are never reused.
#[derive(Debug, Clone)]
pub struct Module {
    ops: Vec<Option<OpData>>,
    blocks: Vec<Option<BlockData>>,
    root: OpId,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    /// Create an empty module (`module {}` in textual form).
    pub fn new() -> Self {
        let mut module = Self { ops: Vec::new(), blocks: Vec::new(), root: OpId(0) };
        let root = module.alloc_op(OpData::new("module"));
        module.root = root;
        module.op_mut(root).regions.push(Vec::new());
        module.append_block(root, 0, 0);
        module
    }

    /// Parse textual IR into a fresh module.
    pub fn parse(text: &str) -> crate::Result<Self> {
        crate::parse::parse_module(text)
    }

    pub fn root(&self) -> OpId {
        self.root
    }

    /// The module body block.
    pub fn body(&self) -> BlockId {
        self.op(self.root).regions[0][0]
    }

    pub fn op(&self, id: OpId) -> &OpData {
        self.ops[id.index()].as_ref().expect("op was erased")
    }

    pub fn op_mut(&mut self, id: OpId) -> &mut OpData {
        self.ops[id.index()].as_mut().expect("op was erased")
    }

    pub fn block(&self, id: BlockId) -> &BlockData {
        self.blocks[id.index()].as_ref().expect("block was erased")
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BlockData {
        self.blocks[id.index()].as_mut().expect("block was erased")
    }

    fn alloc_op(&mut self, data: OpData) -> OpId {
        let id = OpId(self.ops.len() as u32);
        self.ops.push(Some(data));
        id
    }

    fn alloc_block(&mut self, data: BlockData) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Some(data));
        id
    }

    /// Create a detached operation from a spec. The op owns `spec.num_regions`
    /// empty regions; add blocks with [`Module::append_block`].
    pub fn create_op(&mut self, spec: OpSpec) -> OpId {
        let mut data = OpData::new(spec.name);
        data.operands = spec.operands;
        data.num_results = spec.num_results;
        data.attrs = spec.attrs;
        for _ in 0..spec.num_regions {
            data.regions.push(Vec::new());
        }
        self.alloc_op(data)
    }

    /// Append a fresh block with `num_args` arguments to a region of `op`.
    pub fn append_block(&mut self, op: OpId, region: usize, num_args: usize) -> BlockId {
        let block = self.alloc_block(BlockData { parent_op: Some(op), num_args, ops: Vec::new() });
        self.op_mut(op).regions[region].push(block);
        block
    }

    /// Insert a detached op at the end of `block`.
    pub fn insert_at_end(&mut self, block: BlockId, op: OpId) {
        debug_assert!(self.op(op).parent.is_none(), "op is already inserted");
        self.op_mut(op).parent = Some(block);
        self.block_mut(block).ops.push(op);
    }

    /// Insert a detached op into `block` at position `index`.
    pub fn insert_at(&mut self, block: BlockId, index: usize, op: OpId) {
        debug_assert!(self.op(op).parent.is_none(), "op is already inserted");
        self.op_mut(op).parent = Some(block);
        self.block_mut(block).ops.insert(index, op);
    }

    /// Remove an op from its block without destroying it. Returns its former
    /// position, if it was inserted anywhere.
    pub fn detach_op(&mut self, op: OpId) -> Option<(BlockId, usize)> {
        let block = self.op_mut(op).parent.take()?;
        let position = self.block(block).ops.iter().position(|&o| o == op)?;
        self.block_mut(block).ops.remove(position);
        Some((block, position))
    }

    /// Erase an op and everything nested inside it.
    pub fn erase_op(&mut self, op: OpId) {
        self.detach_op(op);
        let regions = std::mem::take(&mut self.op_mut(op).regions);
        for region in regions {
            for block in region {
                let ops = std::mem::take(&mut self.block_mut(block).ops);
                for nested in ops {
                    // Nested ops no longer need detaching from the dropped block.
                    self.op_mut(nested).parent = None;
                    self.erase_op(nested);
                }
                self.blocks[block.index()] = None;
            }
        }
        self.ops[op.index()] = None;
    }

    /// Operation owning the block that contains `op`.
    pub fn parent_op(&self, op: OpId) -> Option<OpId> {
        self.op(op).parent.and_then(|b| self.block(b).parent_op())
    }

    /// The `index`-th result of `op` as a value handle.
    pub fn result(&self, op: OpId, index: usize) -> Value {
        debug_assert!(index < self.op(op).num_results, "result index out of range");
        Value::Result { op, index }
    }

    /// The `index`-th argument of `block` as a value handle.
    pub fn arg(&self, block: BlockId, index: usize) -> Value {
        debug_assert!(index < self.block(block).num_args, "block arg index out of range");
        Value::Arg { block, index }
    }

    /// Preorder traversal of `root` and every op nested inside it.
    pub fn descendants(&self, root: OpId) -> Vec<OpId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(op) = stack.pop() {
            out.push(op);
            for region in self.op(op).regions.iter().rev() {
                for block in region.iter().rev() {
                    for &nested in self.block(*block).ops.iter().rev() {
                        stack.push(nested);
                    }
                }
            }
        }
        out
    }

    /// Look up a symbol among the direct children of `scope`'s regions.
    pub fn lookup_symbol(&self, scope: OpId, name: &str) -> Option<OpId> {
        for region in &self.op(scope).regions {
            for &block in region {
                for &op in &self.block(block).ops {
                    if self.op(op).sym_name() == Some(name) {
                        return Some(op);
                    }
                }
            }
        }
        None
    }

    /// First direct child of `block` with the given op name.
    pub fn find_in_block(&self, block: BlockId, name: &str) -> Option<OpId> {
        self.block(block).ops.iter().copied().find(|&op| self.op(op).name == name)
    }

    /// Set an attribute on the root op.
    pub fn set_root_attr(&mut self, key: impl Into<String>, value: Attr) {
        let root = self.root;
        self.op_mut(root).set_attr(key, value);
    }
}

//! Operation, block and value identifiers.
//!
//! Operations live in a [`Module`](crate::module::Module) arena and are
//! referenced by [`OpId`]. A region is an ordered list of blocks; a block is
//! an ordered list of operations plus a number of block arguments. Values are
//! lightweight handles naming either an op result or a block argument.

use smallvec::SmallVec;

use crate::attr::Attr;

/// Arena index of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub(crate) u32);

/// Arena index of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl OpId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl BlockId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A handle to an SSA-like value: an op result or a block argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Result { op: OpId, index: usize },
    Arg { block: BlockId, index: usize },
}

/// An operation: a name, operands, a result count, attributes and regions.
///
/// The substrate attaches no semantics to the name. Attributes keep insertion
/// order so printing is deterministic.
#[derive(Debug, Clone)]
pub struct OpData {
    pub name: String,
    pub operands: SmallVec<[Value; 2]>,
    pub num_results: usize,
    pub attrs: Vec<(String, Attr)>,
    /// Regions, each an ordered list of blocks.
    pub regions: SmallVec<[Vec<BlockId>; 1]>,
    pub(crate) parent: Option<BlockId>,
}

impl OpData {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operands: SmallVec::new(),
            num_results: 0,
            attrs: Vec::new(),
            regions: SmallVec::new(),
            parent: None,
        }
    }

    /// Block this operation is inserted into, if any.
    pub fn parent_block(&self) -> Option<BlockId> {
        self.parent
    }

    pub fn attr(&self, key: &str) -> Option<&Attr> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Set or replace an attribute, preserving the position of existing keys.
    pub fn set_attr(&mut self, key: impl Into<String>, value: Attr) {
        let key = key.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Symbol name of this operation (`sym_name` attribute), if any.
    pub fn sym_name(&self) -> Option<&str> {
        self.attr("sym_name").and_then(Attr::as_str)
    }
}

/// A block: an argument count and an ordered list of operations.
#[derive(Debug, Clone)]
pub struct BlockData {
    pub(crate) parent_op: Option<OpId>,
    pub num_args: usize,
    pub ops: Vec<OpId>,
}

impl BlockData {
    /// Operation owning the region this block belongs to.
    pub fn parent_op(&self) -> Option<OpId> {
        self.parent_op
    }
}

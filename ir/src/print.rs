//! Textual form of a module.
//!
//! The format is deliberately compact and round-trips through
//! [`parse`](crate::parse):
//!
//! ```text
//! module {
//!   func @main {
//!     linalg.matmul
//!   }
//!   transform.with_pdl_patterns {
//!     ^(%0):
//!     pdl.pattern @match_linalg_matmul_in_main {benefit = 1} { ... }
//!   }
//! }
//! ```
//!
//! Results print as `%N = ` (or `%N:k = ` for multi-result ops), operand
//! references as `%N` or `%N#i`, symbols as `@name` after the op name, the
//! attribute dictionary as `{key = value, ...}` and regions as brace-enclosed
//! op lists. An empty module prints as `module {}`.

use std::collections::HashMap;
use std::fmt;

use crate::module::Module;
use crate::op::{BlockId, OpId, Value};

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer { module: self, names: HashMap::new(), next: 0 };
        printer.print_op(f, self.root(), 0)
    }
}

struct Printer<'m> {
    module: &'m Module,
    names: HashMap<Value, usize>,
    next: usize,
}

impl Printer<'_> {
    fn define(&mut self, value: Value) -> usize {
        let id = self.next;
        self.next += 1;
        self.names.insert(value, id);
        id
    }

    fn print_operand(&self, f: &mut fmt::Formatter<'_>, value: Value) -> fmt::Result {
        match value {
            Value::Result { op, index } => {
                // Operands always refer to earlier definitions; a missing name
                // would be a construction bug, surfaced as `%?`.
                match self.names.get(&Value::Result { op, index: 0 }) {
                    Some(id) if self.module.op(op).num_results > 1 => write!(f, "%{id}#{index}"),
                    Some(id) => write!(f, "%{id}"),
                    None => write!(f, "%?"),
                }
            }
            Value::Arg { .. } => match self.names.get(&value) {
                Some(id) => write!(f, "%{id}"),
                None => write!(f, "%?"),
            },
        }
    }

    fn print_op(&mut self, f: &mut fmt::Formatter<'_>, op: OpId, indent: usize) -> fmt::Result {
        let module = self.module;
        let data = module.op(op);

        if data.num_results > 0 {
            let id = self.define(Value::Result { op, index: 0 });
            if data.num_results > 1 {
                write!(f, "%{id}:{} = ", data.num_results)?;
            } else {
                write!(f, "%{id} = ")?;
            }
        }

        write!(f, "{}", data.name)?;

        if let Some(sym) = data.sym_name() {
            write!(f, " @{sym}")?;
        }

        if !data.operands.is_empty() {
            write!(f, "(")?;
            for (i, &operand) in data.operands.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                self.print_operand(f, operand)?;
            }
            write!(f, ")")?;
        }

        let visible_attrs: Vec<_> = data.attrs.iter().filter(|(k, _)| k != "sym_name").collect();
        if !visible_attrs.is_empty() {
            write!(f, " {{")?;
            for (i, (key, value)) in visible_attrs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key} = {value}")?;
            }
            write!(f, "}}")?;
        }

        for region in &data.regions {
            self.print_region(f, region, indent)?;
        }

        Ok(())
    }

    fn print_region(&mut self, f: &mut fmt::Formatter<'_>, blocks: &[BlockId], indent: usize) -> fmt::Result {
        let module = self.module;
        let empty = blocks.len() == 1
            && module.block(blocks[0]).num_args == 0
            && module.block(blocks[0]).ops.is_empty();
        if empty {
            return write!(f, " {{}}");
        }

        writeln!(f, " {{")?;
        let inner = indent + 1;
        for &block in blocks {
            let num_args = module.block(block).num_args;
            if num_args > 0 {
                write!(f, "{}^(", "  ".repeat(inner))?;
                for index in 0..num_args {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    let id = self.define(Value::Arg { block, index });
                    write!(f, "%{id}")?;
                }
                writeln!(f, "):")?;
            }
            for &op in &module.block(block).ops {
                write!(f, "{}", "  ".repeat(inner))?;
                self.print_op(f, op, inner)?;
                writeln!(f)?;
            }
        }
        write!(f, "{}}}", "  ".repeat(indent))
    }
}

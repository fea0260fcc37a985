//! Named pass entry points invoked by the schedule runner.

use tessera_ir::Module;

use crate::error::{PassFailedSnafu, Result};
use crate::interp;

/// Executes the schedule region against the payload IR.
pub const INTERPRET_SCHEDULE: &str = "interpret-transform-schedule";

/// Erases the schedule region after interpretation.
pub const DROP_SCHEDULE: &str = "drop-transform-schedule";

/// Run a pass by name over the module.
pub fn run_pass(module: &mut Module, pass: &str) -> Result<()> {
    tracing::debug!(pass, "running pass");
    match pass {
        INTERPRET_SCHEDULE => interp::interpret_schedule(module),
        DROP_SCHEDULE => {
            interp::drop_schedule(module);
            Ok(())
        }
        other => PassFailedSnafu { pass: other, reason: "no such pass" }.fail(),
    }
}

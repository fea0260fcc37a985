//! The schedule: an ordered list of transforms applied to a module.

use std::path::PathBuf;

use bon::Builder;
use snafu::ResultExt;
use tessera_ir::{BlockId, Module, OpSpec, Value};

use crate::error::{DumpSnafu, Result};
use crate::passes;
use crate::registry::PATTERN_CONTAINER;
use crate::transforms::{BuildCtx, Transform};

/// Options controlling how a schedule is applied.
#[derive(Debug, Clone, Default, Builder)]
pub struct ScheduleOptions {
    /// Write the module's textual form to this path after the schedule region
    /// is built, right before interpretation.
    #[builder(into)]
    pub dump_module_to: Option<PathBuf>,
}

impl ScheduleOptions {
    /// Read options from the environment.
    ///
    /// `TESSERA_DUMP_MODULE_TO` sets the dump path.
    pub fn from_env() -> Self {
        Self { dump_module_to: std::env::var_os("TESSERA_DUMP_MODULE_TO").map(PathBuf::from) }
    }
}

/// An ordered list of transforms.
///
/// Applying a schedule builds the transform-dialect region inside the module,
/// interprets it against the payload IR and erases it again, leaving only the
/// transformed payload behind.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    transforms: Vec<Transform>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform. Chains for readability at call sites.
    pub fn add(mut self, transform: impl Into<Transform>) -> Self {
        self.transforms.push(transform.into());
        self
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn apply(&self, module: &mut Module) -> Result<()> {
        self.apply_with_options(module, &ScheduleOptions::default())
    }

    /// Apply every transform in order, then run the interpretation and
    /// cleanup passes.
    ///
    /// The schedule region is opened lazily on the first transform that needs
    /// one, so an empty schedule leaves the module untouched. `Inject`
    /// replaces the module wholesale and discards the open region: handles
    /// into the old module would be meaningless in the new one.
    pub fn apply_with_options(&self, module: &mut Module, options: &ScheduleOptions) -> Result<()> {
        let mut region: Option<(BlockId, Value)> = None;
        for transform in &self.transforms {
            if let Transform::Inject(inject) = transform {
                *module = inject.parse_module()?;
                region = None;
                tracing::info!("replaced module with injected IR");
                continue;
            }
            let (body, target) = match region {
                Some(open) => open,
                None => {
                    let open = open_schedule_region(module);
                    region = Some(open);
                    open
                }
            };
            tracing::debug!(transform = transform.name(), "building transform IR");
            transform.build_ir(&mut BuildCtx { module, body, target })?;
        }

        if let Some(path) = &options.dump_module_to {
            std::fs::write(path, module.to_string()).context(DumpSnafu { path: path.clone() })?;
            tracing::info!(path = %path.display(), "dumped module");
        }

        passes::run_pass(module, passes::INTERPRET_SCHEDULE)?;
        passes::run_pass(module, passes::DROP_SCHEDULE)
    }
}

/// Open a fresh `transform.with_pdl_patterns` container at the end of the
/// module body, with a `transform.sequence` inside. Returns the sequence body
/// and its target handle.
pub(crate) fn open_schedule_region(module: &mut Module) -> (BlockId, Value) {
    let body = module.body();
    let container = module.create_op(OpSpec::new(PATTERN_CONTAINER).regions(1));
    module.insert_at_end(body, container);
    let container_body = module.append_block(container, 0, 1);

    let container_arg = module.arg(container_body, 0);
    let sequence = module.create_op(OpSpec::new("transform.sequence").operand(container_arg).regions(1));
    module.insert_at_end(container_body, sequence);
    let sequence_body = module.append_block(sequence, 0, 1);

    (sequence_body, module.arg(sequence_body, 0))
}

use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure modes of the schedule builder layer.
///
/// The first four variants are local pre-flight checks raised at transform
/// construction or IR-construction time, before any pass runs; they are never
/// retried. The remaining variants propagate external failures unchanged.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// An override names no declared variable of the transform.
    #[snafu(display("unknown variable `{name}` for transform {transform}"))]
    UnknownVariable { transform: &'static str, name: String },

    /// A supplied value failed its variable's validation rule.
    #[snafu(display("invalid value for variable `{name}`: {reason}"))]
    InvalidValue { name: String, reason: String },

    /// A requested option is not representable by the invoked pass version.
    #[snafu(display("{what} is not supported by the transform dialect"))]
    NotSupported { what: String },

    /// A builder ran outside its required enclosing structure.
    #[snafu(display("expected an enclosing `{expected}` op"))]
    MissingContext { expected: &'static str },

    /// Injected literal IR failed to parse; the parser error is carried verbatim.
    #[snafu(display("failed to parse injected IR"))]
    InjectParse { source: tessera_ir::Error },

    /// An external pass reported a failure.
    #[snafu(display("pass `{pass}` failed: {reason}"))]
    PassFailed { pass: String, reason: String },

    /// The pre-interpretation module dump could not be written.
    #[snafu(display("failed to dump module to {}", path.display()))]
    Dump { path: PathBuf, source: std::io::Error },
}

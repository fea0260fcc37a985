use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Textual IR failed to parse.
    #[snafu(display("parse error at {line}:{column}: {message}"))]
    Parse { message: String, line: usize, column: usize },

    /// A value reference in textual IR names no visible definition.
    #[snafu(display("unknown value `%{name}` at {line}:{column}"))]
    UnknownValue { name: String, line: usize, column: usize },

    /// A result index exceeds the defining op's result count.
    #[snafu(display("result index {index} out of range for `%{name}` with {count} results at {line}:{column}"))]
    ResultIndexOutOfRange { name: String, index: usize, count: usize, line: usize, column: usize },
}

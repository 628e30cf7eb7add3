use thiserror::Error;

/// Failure categories a caller embedding the parser/simulator may want to
/// distinguish. The CLI entry point never surfaces these directly — a
/// [`SimError`] reaching `main` is handled by falling back to the silent
/// exit-0 behaviour the original tool relied on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("header truncated: expected `total_procs num_nodes quantum`")]
    TruncatedHeader,
    #[error("process {index} truncated: expected `name size priority node_id`")]
    TruncatedProcess { index: usize },
}

use std::io;
use nix::errno::Errno;
use nix::unistd::Pid;
use thiserror::Error;

/// Failures the evaluator reports and turns into a nonzero exit status.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("pipe: {0}")]
    Pipe(#[source] Errno),
    #[error("fork: {0}")]
    Fork(#[source] Errno),
    #[error("waitpid {pid}: {source}")]
    Wait {
        pid: Pid,
        #[source]
        source: Errno,
    },
    #[error("{0}: argument contains a nul byte")]
    NulByte(String),
    #[error("empty command")]
    EmptyCommand,
}

use std::ffi::CString;
use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execvp, fork, ForkResult, Pid};
use crate::error::EvalError;
use super::descriptors::DescriptorTriple;
use super::status::ExitStatus;

/// Result of launching one simple command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    /// The command ran in the foreground and terminated.
    Finished(ExitStatus),
    /// The command was left running; nobody has waited for it yet.
    Background(Pid),
}

/// Creates the process of a simple command. The evaluator only talks to
/// processes through this trait.
pub trait Launcher {
    /// Runs `argv` with `descriptors` as its standard streams. The launcher
    /// owns `descriptors` and must release them before returning.
    fn launch(
        &mut self,
        argv: &[String],
        descriptors: DescriptorTriple,
        background: bool,
    ) -> Result<Launched, EvalError>;

    /// Non-blocking check on a background child: `None` while it still runs.
    fn try_wait(&mut self, pid: Pid) -> Result<Option<ExitStatus>, EvalError>;

    /// Blocks until a background child terminates.
    fn wait(&mut self, pid: Pid) -> Result<ExitStatus, EvalError>;
}

/// `fork` + `execvp` launcher.
pub struct ProcessLauncher {
    exec_failure_status: i32,
}

impl ProcessLauncher {
    pub fn new(exec_failure_status: i32) -> Self {
        ProcessLauncher { exec_failure_status }
    }
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        ProcessLauncher::new(ExitStatus::NOT_FOUND.0)
    }
}

impl Launcher for ProcessLauncher {
    fn launch(
        &mut self,
        argv: &[String],
        mut descriptors: DescriptorTriple,
        background: bool,
    ) -> Result<Launched, EvalError> {
        // Everything the child needs is allocated before forking.
        let args = to_c_strings(argv)?;
        let prefix = format!("{}: ", argv[0]);

        match unsafe { fork() } {
            Ok(ForkResult::Child) => {
                // The Rust runtime ignores SIGPIPE and exec keeps ignored
                // dispositions; pipeline writers must die when the reader goes.
                let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };
                let code = match descriptors.install() {
                    Ok(()) => {
                        let errno = match execvp(&args[0], &args) {
                            Ok(never) => match never {},
                            Err(errno) => errno,
                        };
                        child_report(prefix.as_bytes(), errno);
                        self.exec_failure_status
                    }
                    Err(errno) => {
                        child_report(b"dup2: ", errno);
                        ExitStatus::FAILURE.0
                    }
                };
                unsafe { libc::_exit(code) }
            }
            Ok(ForkResult::Parent { child }) => {
                descriptors.release();
                log::debug!("launched {} as pid {} (background: {})", argv[0], child, background);
                if background {
                    Ok(Launched::Background(child))
                } else {
                    self.wait(child).map(Launched::Finished)
                }
            }
            Err(errno) => Err(EvalError::Fork(errno)),
        }
    }

    fn try_wait(&mut self, pid: Pid) -> Result<Option<ExitStatus>, EvalError> {
        loop {
            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => return Ok(None),
                Ok(status) => {
                    if let Some(status) = ExitStatus::from_wait_status(status) {
                        return Ok(Some(status));
                    }
                    return Ok(None);
                }
                Err(Errno::EINTR) => continue,
                Err(source) => return Err(EvalError::Wait { pid, source }),
            }
        }
    }

    fn wait(&mut self, pid: Pid) -> Result<ExitStatus, EvalError> {
        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    if let Some(status) = ExitStatus::from_wait_status(status) {
                        return Ok(status);
                    }
                }
                Err(Errno::EINTR) => {}
                Err(source) => return Err(EvalError::Wait { pid, source }),
            }
        }
    }
}

fn to_c_strings(argv: &[String]) -> Result<Vec<CString>, EvalError> {
    if argv.is_empty() {
        return Err(EvalError::EmptyCommand);
    }
    argv.iter()
        .map(|arg| CString::new(arg.as_str()).map_err(|_| EvalError::NulByte(arg.clone())))
        .collect()
}

// Runs between fork and exec: raw writes only, no allocation.
fn child_report(prefix: &[u8], errno: Errno) {
    let reason = errno.desc().as_bytes();
    for part in [prefix, reason, &b"\n"[..]] {
        unsafe {
            libc::write(libc::STDERR_FILENO, part.as_ptr().cast(), part.len());
        }
    }
}

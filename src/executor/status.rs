use std::fmt;
use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;

/// Exit status of an evaluated expression: the exit code of a normally
/// terminated process, or 128 + signal number for a killed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExitStatus(pub i32);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    pub const FAILURE: ExitStatus = ExitStatus(1);
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    pub fn from_signal(signal: Signal) -> Self {
        ExitStatus(128 + signal as i32)
    }

    /// `None` for wait results that are not a termination (stopped, continued).
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ExitStatus(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Self::from_signal(signal)),
            _ => None,
        }
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        ExitStatus(code)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

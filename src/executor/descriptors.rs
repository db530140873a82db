//! The (stdin, stdout, stderr) redirection context threaded through
//! evaluation.
//!
//! A slot is either the inherited standard descriptor or a shared handle on
//! a descriptor opened by the evaluator. Copies of a triple share handles, so
//! a descriptor is closed exactly once: when its last copy is released. All
//! descriptors stored here are close-on-exec; a child only keeps the ones
//! `install` duplicates onto 0, 1 and 2.

use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::rc::Rc;
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg};
use nix::unistd::{close, dup2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Stdin,
    Stdout,
    Stderr,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Stdin, Slot::Stdout, Slot::Stderr];

    pub fn fileno(self) -> RawFd {
        match self {
            Slot::Stdin => libc::STDIN_FILENO,
            Slot::Stdout => libc::STDOUT_FILENO,
            Slot::Stderr => libc::STDERR_FILENO,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default)]
enum Handle {
    #[default]
    Inherited,
    Open(Rc<OwnedFd>),
}

#[derive(Debug, Clone, Default)]
pub struct DescriptorTriple {
    slots: [Handle; 3],
}

impl DescriptorTriple {
    /// The triple {0, 1, 2}.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Descriptor number currently held by `slot`.
    pub fn raw(&self, slot: Slot) -> RawFd {
        match &self.slots[slot.index()] {
            Handle::Inherited => slot.fileno(),
            Handle::Open(fd) => fd.as_raw_fd(),
        }
    }

    pub fn is_standard(&self) -> bool {
        self.slots.iter().all(|h| matches!(h, Handle::Inherited))
    }

    /// Points `slot` at `fd`, dropping this copy's previous handle.
    pub fn redirect(&mut self, slot: Slot, fd: OwnedFd) {
        self.slots[slot.index()] = Handle::Open(Rc::new(fd));
    }

    /// Points stdout and stderr at the same descriptor.
    pub fn redirect_out_err(&mut self, fd: OwnedFd) {
        let shared = Rc::new(fd);
        self.slots[Slot::Stdout.index()] = Handle::Open(Rc::clone(&shared));
        self.slots[Slot::Stderr.index()] = Handle::Open(shared);
    }

    /// Builder form of [`redirect`](Self::redirect).
    pub fn with(mut self, slot: Slot, fd: OwnedFd) -> Self {
        self.redirect(slot, fd);
        self
    }

    /// Child side: duplicates every redirected slot onto its standard number,
    /// then closes each distinct non-standard descriptor once.
    ///
    /// Only async-signal-safe calls are made, so this is usable between
    /// `fork` and `exec`.
    pub fn install(&self) -> Result<(), Errno> {
        for slot in Slot::ALL {
            let fd = self.raw(slot);
            if fd != slot.fileno() {
                dup2(fd, slot.fileno())?;
            }
        }

        let mut closed = [-1; 3];
        for (i, slot) in Slot::ALL.into_iter().enumerate() {
            let fd = self.raw(slot);
            if fd > libc::STDERR_FILENO && !closed.contains(&fd) {
                close(fd)?;
                closed[i] = fd;
            }
        }
        Ok(())
    }

    /// Parent side: normalizes this copy back to {0, 1, 2}. Descriptors no
    /// other copy holds are closed here.
    pub fn release(&mut self) {
        self.slots = Default::default();
    }
}

/// Moves `fd` to a close-on-exec descriptor above 2, closing the original.
///
/// A process started with 0, 1 or 2 closed gets those numbers back from
/// `open` and `pipe`; left there, an opened descriptor would alias a slot
/// that `install` treats as inherited.
pub fn above_standard(fd: OwnedFd) -> Result<OwnedFd, Errno> {
    if fd.as_raw_fd() > libc::STDERR_FILENO {
        return Ok(fd);
    }
    let moved = fcntl(fd.as_raw_fd(), FcntlArg::F_DUPFD_CLOEXEC(libc::STDERR_FILENO + 1))?;
    Ok(unsafe { OwnedFd::from_raw_fd(moved) })
}

/// Creates a pipe whose two ends are close-on-exec and above 2.
pub fn pipe() -> Result<(OwnedFd, OwnedFd), Errno> {
    let (read_end, write_end) = cloexec_pipe()?;
    Ok((above_standard(read_end)?, above_standard(write_end)?))
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn cloexec_pipe() -> Result<(OwnedFd, OwnedFd), Errno> {
    nix::unistd::pipe2(nix::fcntl::OFlag::O_CLOEXEC)
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn cloexec_pipe() -> Result<(OwnedFd, OwnedFd), Errno> {
    use nix::fcntl::FdFlag;

    let (read_end, write_end) = nix::unistd::pipe()?;
    for fd in [&read_end, &write_end] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    }
    Ok((read_end, write_end))
}

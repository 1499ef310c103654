#![allow(unsafe_code)]

use std::{
    ffi::{CStr, CString},
    fmt,
    num::NonZeroI32,
};

use nix::sys::signal::Signal;
use nix::unistd::Pid;

use crate::error::Result;
use crate::launch::Launch;

/// Exit status of a child whose image replacement failed.
pub const EXEC_FAILED: i32 = 127;

/// How a reaped process ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessEnd {
    /// The process exited with status 0.
    Success,

    /// The process exited with a non-zero status.
    ExitError(NonZeroI32),

    /// The process was killed by a signal.
    ExitSignal(Signal),
}

impl ProcessEnd {
    pub fn from_code(code: i32) -> Self {
        NonZeroI32::new(code).map_or(ProcessEnd::Success, ProcessEnd::ExitError)
    }

    /// Exit code, if the process exited normally.
    pub fn code(self) -> Option<i32> {
        match self {
            ProcessEnd::Success => Some(0),
            ProcessEnd::ExitError(code) => Some(code.get()),
            ProcessEnd::ExitSignal(_) => None,
        }
    }

    pub fn signal(self) -> Option<Signal> {
        match self {
            ProcessEnd::ExitSignal(sig) => Some(sig),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessEnd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProcessEnd::Success => write!(f, "exited with code 0"),
            ProcessEnd::ExitError(code) => write!(f, "exited with code {}", code),
            ProcessEnd::ExitSignal(sig) => {
                write!(f, "terminated by signal {} ({:?})", *sig as i32, sig)
            }
        }
    }
}

/// What a liveness poll or a blocking wait observed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// No change of state since the last look.
    Alive,
    /// The process ended and has been reaped.
    Ended(ProcessEnd),
    /// A state change that is not an exit: stopped, continued, ptrace stops.
    Other,
}

/// The operating system calls the supervisor is built on.
///
/// [`System`] is the real thing; tests swap in fakes to watch which calls
/// are made.
pub trait Processes {
    /// Starts `launch` as a child inheriting our standard streams.
    ///
    /// Returns as soon as the child exists. Failure to replace the child's
    /// image is not seen here: the child exits with [`EXEC_FAILED`] instead.
    fn spawn(&mut self, launch: &Launch) -> Result<Pid>;

    /// Non-blocking look at `pid`, reaping it if it has ended.
    fn poll(&mut self, pid: Pid) -> Result<Status>;

    /// Blocks until `pid` changes state, reaping it if it has ended.
    fn wait(&mut self, pid: Pid) -> Result<Status>;

    fn signal(&mut self, pid: Pid, signal: Signal) -> Result<()>;
}

/// [`Processes`] backed by fork, execv, waitpid and kill.
#[derive(Clone, Copy, Debug, Default)]
pub struct System;

impl System {
    fn status(status: nix::sys::wait::WaitStatus) -> Status {
        use nix::sys::wait::WaitStatus;

        match status {
            WaitStatus::StillAlive => Status::Alive,
            WaitStatus::Exited(_, code) => Status::Ended(ProcessEnd::from_code(code)),
            WaitStatus::Signaled(_, sig, _) => Status::Ended(ProcessEnd::ExitSignal(sig)),
            other => {
                trace!("Unclassified wait status {:?}", other);
                Status::Other
            }
        }
    }
}

impl Processes for System {
    fn spawn(&mut self, launch: &Launch) -> Result<Pid> {
        use nix::unistd::{fork, ForkResult};

        // Everything that allocates happens before the fork.
        let (path, argv) = launch.to_c_strings()?;
        let argv: Vec<&CStr> = argv.iter().map(CString::as_c_str).collect();
        debug!("Assembled command {:?}", launch.argv());

        match fork()? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => exec_child(&path, &argv),
        }
    }

    fn poll(&mut self, pid: Pid) -> Result<Status> {
        use nix::sys::wait::{waitpid, WaitPidFlag};

        let status = waitpid(pid, Some(WaitPidFlag::WNOHANG))?;
        Ok(Self::status(status))
    }

    fn wait(&mut self, pid: Pid) -> Result<Status> {
        use nix::errno::Errno;
        use nix::sys::wait::waitpid;

        loop {
            match waitpid(pid, None) {
                Err(nix::Error::Sys(Errno::EINTR)) => continue,
                Err(err) => return Err(err.into()),
                Ok(status) => return Ok(Self::status(status)),
            }
        }
    }

    fn signal(&mut self, pid: Pid, signal: Signal) -> Result<()> {
        debug!("Sending {:?} (int: {}) to process {}", signal, signal as i32, pid);
        nix::sys::signal::kill(pid, signal)?;
        Ok(())
    }
}

/// Child side of the fork: replace the image, or report and exit.
///
/// Only async-signal-safe calls are made here, since the parent may have
/// other threads whose locks were copied mid-flight.
fn exec_child(path: &CStr, argv: &[&CStr]) -> ! {
    use nix::libc::{_exit, STDERR_FILENO};
    use nix::unistd::{execv, write};

    let err = match execv(path, argv) {
        Ok(never) => match never {},
        Err(err) => err,
    };

    let reason = match err {
        nix::Error::Sys(errno) => errno.desc(),
        _ => "exec failed",
    };

    let parts: [&[u8]; 5] = [
        b"net-access: cannot execute ",
        path.to_bytes(),
        b": ",
        reason.as_bytes(),
        b"\n",
    ];
    for part in &parts {
        let _ = write(STDERR_FILENO, part);
    }

    unsafe { _exit(EXEC_FAILED) }
}

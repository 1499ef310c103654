//! Start, check and terminate the process held in a [`Slot`].
//!
//! The supervisor keeps no state of its own: everything it knows about a
//! program is the pid in the slot it is handed, and every status is worked
//! out at call time from the operating system.
//!
//! # Known limitations
//!
//! [`Supervisor::start`] reports [`Start::Started`] as soon as the fork
//! succeeds. If the image replacement then fails, only the child knows: it
//! writes the reason to stderr and exits with
//! [`EXEC_FAILED`](crate::process::EXEC_FAILED), which the next
//! [`check_alive`](Supervisor::check_alive) or
//! [`terminate`](Supervisor::terminate) picks up.
//!
//! When signal delivery fails, [`Supervisor::terminate`] leaves the slot
//! holding its pid even if the process is already gone; a following
//! [`check_alive`](Supervisor::check_alive) clears it.

use nix::sys::signal::Signal;
use nix::unistd::Pid;

use crate::error::Error;
use crate::launch::Launch;
use crate::process::{ProcessEnd, Processes, Status, System};
use crate::slot::Slot;

/// Result of [`Supervisor::check_alive`].
#[derive(Debug)]
pub enum Alive {
    /// The slot was empty, no system call was made.
    NotRunning,
    /// The process had ended; it is now reaped and the slot is empty.
    Exited(Pid, ProcessEnd),
    /// The process can no longer be waited for; the slot is now empty.
    Lost(Pid, Error),
    Running(Pid),
}

impl Alive {
    pub fn is_running(&self) -> bool {
        matches!(self, Alive::Running(_))
    }
}

/// Result of [`Supervisor::start`].
#[derive(Debug)]
pub enum Start {
    Started(Pid),
    /// The slot already holds this pid, nothing was done.
    AlreadyRunning(Pid),
    /// No child could be created; the slot is still empty.
    ForkFailed(Error),
}

/// Result of [`Supervisor::terminate`].
#[derive(Debug)]
pub enum Terminate {
    /// The slot was empty, no system call was made.
    NotRunning,
    /// SIGTERM could not be delivered; the slot is unchanged.
    SignalFailed(Pid, Error),
    /// The process is gone and the slot is empty. The error is set when the
    /// final wait failed and the exit status could not be collected.
    Reaped(Pid, std::result::Result<ProcessEnd, Error>),
}

/// Drives slots through their lifecycle using a [`Processes`] backend.
#[derive(Debug, Default)]
pub struct Supervisor<P = System> {
    processes: P,
}

impl Supervisor<System> {
    pub const fn new() -> Self {
        Self { processes: System }
    }
}

impl<P: Processes> Supervisor<P> {
    pub fn with_processes(processes: P) -> Self {
        Self { processes }
    }

    pub fn processes(&self) -> &P {
        &self.processes
    }

    /// Looks at the slot's process without blocking.
    ///
    /// An ended process is reaped here, exactly once, and the slot emptied.
    pub fn check_alive(&mut self, slot: &mut Slot) -> Alive {
        let pid = match slot.pid() {
            Some(pid) => pid,
            None => return Alive::NotRunning,
        };

        match self.processes.poll(pid) {
            Ok(Status::Ended(end)) => {
                info!("Process {} {}", pid, end);
                slot.clear();
                Alive::Exited(pid, end)
            }
            Ok(Status::Alive) => Alive::Running(pid),
            Ok(Status::Other) => {
                debug!("Process {} changed state without exiting", pid);
                Alive::Running(pid)
            }
            Err(err) => {
                warn!("Cannot poll process {}: {}", pid, err);
                slot.clear();
                Alive::Lost(pid, err)
            }
        }
    }

    /// Launches a program into an empty slot.
    ///
    /// A slot that still holds a pid is refused without looking at the
    /// process: call [`check_alive`](Self::check_alive) first to collect a
    /// program that has exited.
    pub fn start(&mut self, slot: &mut Slot, launch: &Launch) -> Start {
        if let Some(pid) = slot.pid() {
            debug!("Not starting {}: slot holds {}", launch.program(), pid);
            return Start::AlreadyRunning(pid);
        }

        match self.processes.spawn(launch) {
            Ok(pid) => {
                info!("Started {} as process {}", launch.program(), pid);
                slot.set(pid);
                Start::Started(pid)
            }
            Err(err) => {
                warn!("Cannot start {}: {}", launch.program(), err);
                Start::ForkFailed(err)
            }
        }
    }

    /// Sends SIGTERM and blocks until the process has exited and is reaped.
    ///
    /// There is no timeout: a process that ignores SIGTERM blocks the caller.
    pub fn terminate(&mut self, slot: &mut Slot) -> Terminate {
        let pid = match slot.pid() {
            Some(pid) => pid,
            None => return Terminate::NotRunning,
        };

        if let Err(err) = self.processes.signal(pid, Signal::SIGTERM) {
            warn!("Cannot signal process {}: {}", pid, err);
            return Terminate::SignalFailed(pid, err);
        }

        debug!("Waiting for process {} to exit", pid);
        let end = loop {
            match self.processes.wait(pid) {
                Ok(Status::Ended(end)) => break Ok(end),
                Ok(status) => trace!("Process {} is still around: {:?}", pid, status),
                Err(err) => break Err(err),
            }
        };

        match &end {
            Ok(end) => info!("Process {} {}", pid, end),
            Err(err) => warn!("Lost track of process {}: {}", pid, err),
        }

        slot.clear();
        Terminate::Reaped(pid, end)
    }
}

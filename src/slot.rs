//! Tracking record for one supervised process.

use nix::libc::pid_t;
use nix::unistd::Pid;

/// Handle value of a slot that holds no process.
pub const NOT_RUNNING: pid_t = -1;

/// Zero or one process started by the supervisor and not yet reaped.
///
/// The handle is either [`NOT_RUNNING`] or the pid of a child this process
/// forked itself. Only the supervisor moves a slot between the two.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Slot {
    handle: pid_t,
}

impl Slot {
    pub const fn new() -> Self {
        Self {
            handle: NOT_RUNNING,
        }
    }

    pub const fn handle(&self) -> pid_t {
        self.handle
    }

    pub const fn is_running(&self) -> bool {
        self.handle != NOT_RUNNING
    }

    pub fn pid(&self) -> Option<Pid> {
        if self.is_running() {
            Some(Pid::from_raw(self.handle))
        } else {
            None
        }
    }

    pub(crate) fn set(&mut self, pid: Pid) {
        debug_assert!(!self.is_running(), "slot already holds {}", self.handle);
        self.handle = pid.as_raw();
    }

    pub(crate) fn clear(&mut self) {
        self.handle = NOT_RUNNING;
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::new()
    }
}

#![cfg(unix)]

use std::thread::sleep;
use std::time::{Duration, Instant};

use nix::sys::signal::Signal;
use net_access::{
    launch::Launch,
    process::{ProcessEnd, EXEC_FAILED},
    slot::{Slot, NOT_RUNNING},
    supervisor::{Alive, Start, Supervisor, Terminate},
};

fn launch(argv: &[&str]) -> Launch {
    Launch::new(argv.iter().copied()).expect("valid launch")
}

/// Polls until the process ends, giving up after `timeout`.
fn wait_until_exit(supervisor: &mut Supervisor, slot: &mut Slot, timeout: Duration) -> ProcessEnd {
    let deadline = Instant::now() + timeout;
    loop {
        match supervisor.check_alive(slot) {
            Alive::Running(_) if Instant::now() < deadline => sleep(Duration::from_millis(20)),
            Alive::Exited(_, end) => return end,
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn sleep_runs_then_exits_cleanly() {
    let mut supervisor = Supervisor::new();
    let mut slot = Slot::new();

    let pid = match supervisor.start(&mut slot, &launch(&["/bin/sleep", "1"])) {
        Start::Started(pid) => pid,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(slot.handle(), pid.as_raw());

    match supervisor.check_alive(&mut slot) {
        Alive::Running(running) => assert_eq!(running, pid),
        other => panic!("unexpected {:?}", other),
    }

    let end = wait_until_exit(&mut supervisor, &mut slot, Duration::from_secs(10));
    assert_eq!(end, ProcessEnd::Success);
    assert_eq!(end.code(), Some(0));
    assert_eq!(slot.handle(), NOT_RUNNING);

    assert!(matches!(supervisor.check_alive(&mut slot), Alive::NotRunning));
}

#[test]
fn missing_executable_is_started_then_reported() {
    let mut supervisor = Supervisor::new();
    let mut slot = Slot::new();

    assert!(matches!(
        supervisor.start(&mut slot, &launch(&["/bin/nonexistent-net-access"])),
        Start::Started(_)
    ));

    let end = wait_until_exit(&mut supervisor, &mut slot, Duration::from_secs(10));
    assert_eq!(end.code(), Some(EXEC_FAILED));
    assert!(!slot.is_running());
}

#[test]
fn second_start_is_refused() {
    let mut supervisor = Supervisor::new();
    let mut slot = Slot::new();
    let sleeper = launch(&["/bin/sleep", "30"]);

    assert!(matches!(
        supervisor.start(&mut slot, &sleeper),
        Start::Started(_)
    ));
    let handle = slot.handle();

    match supervisor.start(&mut slot, &sleeper) {
        Start::AlreadyRunning(pid) => assert_eq!(pid.as_raw(), handle),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(slot.handle(), handle);

    assert!(matches!(supervisor.terminate(&mut slot), Terminate::Reaped(..)));
}

#[test]
fn terminate_kills_and_reaps() {
    let mut supervisor = Supervisor::new();
    let mut slot = Slot::new();

    let pid = match supervisor.start(&mut slot, &launch(&["/bin/sleep", "30"])) {
        Start::Started(pid) => pid,
        other => panic!("unexpected {:?}", other),
    };

    match supervisor.terminate(&mut slot) {
        Terminate::Reaped(reaped, Ok(end)) => {
            assert_eq!(reaped, pid);
            assert_eq!(end, ProcessEnd::ExitSignal(Signal::SIGTERM));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(slot.handle(), NOT_RUNNING);

    assert!(matches!(supervisor.terminate(&mut slot), Terminate::NotRunning));
}

#[test]
fn terminate_reports_exit_code_of_trapping_process() {
    let mut supervisor = Supervisor::new();
    let mut slot = Slot::new();

    // the trap is only in place once the marker line has been read back
    let (read, write) = nix::unistd::pipe().expect("pipe");
    let script = format!(
        "trap 'exit 5' TERM; echo ready >&{}; while :; do sleep 1; done",
        write
    );
    assert!(matches!(
        supervisor.start(&mut slot, &launch(&["/bin/sh", "-c", script.as_str()])),
        Start::Started(_)
    ));
    nix::unistd::close(write).expect("close");

    let mut buf = [0u8; 6];
    nix::unistd::read(read, &mut buf).expect("read marker");
    nix::unistd::close(read).expect("close");

    match supervisor.terminate(&mut slot) {
        Terminate::Reaped(_, Ok(end)) => assert_eq!(end.code(), Some(5)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn exit_code_is_reported_by_terminate_of_exited_process() {
    let mut supervisor = Supervisor::new();
    let mut slot = Slot::new();

    assert!(matches!(
        supervisor.start(&mut slot, &launch(&["/bin/sh", "-c", "exit 9"])),
        Start::Started(_)
    ));
    // the child is a zombie until reaped, so SIGTERM still reaches it
    sleep(Duration::from_millis(200));

    match supervisor.terminate(&mut slot) {
        Terminate::Reaped(_, Ok(end)) => assert_eq!(end.code(), Some(9)),
        other => panic!("unexpected {:?}", other),
    }
    assert!(!slot.is_running());
}

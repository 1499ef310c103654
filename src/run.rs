//! The interactive shell: read a command, act on one of the three slots,
//! print one status line per outcome.

use std::io::{self, BufRead, Write};

use log::LevelFilter;

use crate::cli::Args;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::Interface;
use crate::launch::{LaunchTable, Program};
use crate::line::LineReader;
use crate::process::{Processes, System};
use crate::slot::Slot;
use crate::supervisor::{Alive, Start, Supervisor, Terminate};

const PROMPT: &str = "net-access> ";

const HELP_TEXT: &str = "\
Commands:
  help, h, ?.......... print this help text
  quit, q, exit....... quit, stopping every running program
  iface............... show the selected network interface
  iface NAME.......... select the network interface to work on
  start PROG.......... start a program on the selected interface
  status [PROG]....... show whether a program (or all of them) is running
  stop PROG........... send SIGTERM to a program and wait for it to exit
  # TEXT.............. comment, ignored

Programs:
  wpa, supplicant..... wpa_supplicant, the WPA supplicant daemon
  gui................. wpa_gui, the supplicant monitor
  dhcp, dhclient...... dhclient, the DHCP client

A program that fails to execute is still reported as started; its
failure shows up on the next status or stop.
";

/// One parsed line of input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Nothing,
    Help,
    Quit,
    ShowInterface,
    SelectInterface(String),
    Start(Program),
    Status(Option<Program>),
    Stop(Program),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Command::Nothing;
        }

        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let arg = words.next();
        if words.next().is_some() {
            return Command::Unknown(line.into());
        }

        match (verb, arg) {
            ("h", None) | ("?", None) | ("help", None) => Command::Help,
            ("q", None) | ("quit", None) | ("exit", None) => Command::Quit,
            ("iface", None) | ("interface", None) => Command::ShowInterface,
            ("iface", Some(name)) | ("interface", Some(name)) => {
                Command::SelectInterface(name.into())
            }
            ("status", None) => Command::Status(None),
            ("start", Some(name)) | ("stop", Some(name)) | ("status", Some(name)) => {
                let program = match name.parse::<Program>() {
                    Ok(program) => program,
                    Err(err) => {
                        debug!("{}", err);
                        return Command::Unknown(line.into());
                    }
                };

                match verb {
                    "start" => Command::Start(program),
                    "stop" => Command::Stop(program),
                    _ => Command::Status(Some(program)),
                }
            }
            _ => Command::Unknown(line.into()),
        }
    }
}

/// Whether the shell keeps reading after a command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Default)]
struct Slots {
    supplicant: Slot,
    gui: Slot,
    dhcp: Slot,
}

impl Slots {
    fn get(&self, program: Program) -> &Slot {
        match program {
            Program::Supplicant => &self.supplicant,
            Program::Gui => &self.gui,
            Program::Dhcp => &self.dhcp,
        }
    }

    fn get_mut(&mut self, program: Program) -> &mut Slot {
        match program {
            Program::Supplicant => &mut self.supplicant,
            Program::Gui => &mut self.gui,
            Program::Dhcp => &mut self.dhcp,
        }
    }
}

/// Top-level state: the selected interface and one slot per program.
#[derive(Debug)]
pub struct Shell<P = System> {
    supervisor: Supervisor<P>,
    table: LaunchTable,
    interface: Option<Interface>,
    slots: Slots,
    keep_running: bool,
}

impl Shell<System> {
    pub fn new(config: Config) -> Self {
        Self::with_processes(config, System)
    }
}

impl<P: Processes> Shell<P> {
    pub fn with_processes(config: Config, processes: P) -> Self {
        Self {
            supervisor: Supervisor::with_processes(processes),
            interface: config.interface.clone(),
            keep_running: config.keep_running,
            table: LaunchTable::new(config),
            slots: Slots::default(),
        }
    }

    pub fn interface(&self) -> Option<&Interface> {
        self.interface.as_ref()
    }

    pub fn slot(&self, program: Program) -> &Slot {
        self.slots.get(program)
    }

    pub fn supervisor(&self) -> &Supervisor<P> {
        &self.supervisor
    }

    /// Runs one command, writing its status lines to `out`.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        trace!("Executing {:?}", command);
        match command {
            Command::Nothing => {}
            Command::Help => out.write_all(HELP_TEXT.as_bytes())?,
            Command::Quit => {
                writeln!(out, "Quitting...")?;
                return Ok(Flow::Quit);
            }
            Command::ShowInterface => match &self.interface {
                Some(iface) => writeln!(out, "Interface: {}", iface)?,
                None => writeln!(out, "No interface selected.")?,
            },
            Command::SelectInterface(name) => self.select_interface(&name, out)?,
            Command::Start(program) => self.start(program, out)?,
            Command::Status(Some(program)) => self.status(program, out)?,
            Command::Status(None) => {
                for &program in &Program::ALL {
                    self.status(program, out)?;
                }
            }
            Command::Stop(program) => self.stop(program, out)?,
            Command::Unknown(line) => {
                debug!("Unknown command {:?}", line);
                writeln!(out, "Unknown command.")?;
            }
        }

        Ok(Flow::Continue)
    }

    fn select_interface<W: Write>(&mut self, name: &str, out: &mut W) -> io::Result<()> {
        let iface = match name.parse::<Interface>() {
            Ok(iface) => iface,
            Err(err) => return writeln!(out, "{}", err),
        };

        for &program in &Program::ALL {
            if self.slots.get(program).is_running() {
                warn!("{} keeps running on its previous interface", program);
            }
        }

        writeln!(out, "Interface set to {}.", iface)?;
        self.interface = Some(iface);
        Ok(())
    }

    fn start<W: Write>(&mut self, program: Program, out: &mut W) -> io::Result<()> {
        let iface = match &self.interface {
            Some(iface) => iface,
            None => return writeln!(out, "No interface selected; use 'iface NAME' first."),
        };

        let launch = match self.table.launch(program, iface) {
            Ok(launch) => launch,
            Err(err) => return writeln!(out, "{}: {}", program, err),
        };

        match self.supervisor.start(self.slots.get_mut(program), &launch) {
            Start::Started(pid) => writeln!(out, "{}: started (pid {}).", program, pid),
            Start::AlreadyRunning(pid) => writeln!(
                out,
                "{}: already running (pid {}); check its status first.",
                program, pid
            ),
            Start::ForkFailed(err) => writeln!(out, "{}: cannot start: {}", program, err),
        }
    }

    fn status<W: Write>(&mut self, program: Program, out: &mut W) -> io::Result<()> {
        match self.supervisor.check_alive(self.slots.get_mut(program)) {
            Alive::NotRunning => writeln!(out, "{}: not running.", program),
            Alive::Running(pid) => writeln!(out, "{}: running (pid {}).", program, pid),
            Alive::Exited(pid, end) => {
                writeln!(out, "{}: not running; pid {} {}.", program, pid, end)
            }
            Alive::Lost(pid, err) => {
                writeln!(out, "{}: not running; lost pid {}: {}", program, pid, err)
            }
        }
    }

    fn stop<W: Write>(&mut self, program: Program, out: &mut W) -> io::Result<()> {
        match self.supervisor.terminate(self.slots.get_mut(program)) {
            Terminate::NotRunning => writeln!(out, "{}: not running.", program),
            Terminate::SignalFailed(pid, err) => {
                writeln!(out, "{}: cannot stop pid {}: {}", program, pid, err)
            }
            Terminate::Reaped(pid, Ok(end)) => {
                writeln!(out, "{}: stopped; pid {} {}.", program, pid, end)
            }
            Terminate::Reaped(pid, Err(err)) => writeln!(
                out,
                "{}: stopped; exit status of pid {} lost: {}",
                program, pid, err
            ),
        }
    }

    /// Stops whatever is still running, unless configured to leave it.
    ///
    /// Every running program is stopped even if writing its status line
    /// fails; the first write error is returned afterwards.
    pub fn shutdown<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.keep_running {
            for &program in &Program::ALL {
                if let Some(pid) = self.slots.get(program).pid() {
                    info!("Leaving {} running as pid {}", program, pid);
                }
            }
            return Ok(());
        }

        let mut result = Ok(());
        for &program in &Program::ALL {
            if self.slots.get(program).is_running() {
                let stopped = self.stop(program, out);
                if result.is_ok() {
                    result = stopped;
                }
            }
        }

        result
    }

    /// Reads and executes commands until `quit` or end of input, then
    /// shuts down.
    ///
    /// A line that is not valid UTF-8 counts as an unknown command. Any
    /// other read or write failure ends the loop, but never skips the
    /// shutdown.
    pub fn run_lines<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
        prompt: bool,
    ) -> Result<()> {
        let looped = self.read_commands(input, out, prompt);
        let stopped = self.shutdown(out);
        looped?;
        stopped?;
        Ok(())
    }

    fn read_commands<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
        prompt: bool,
    ) -> Result<()> {
        let mut lines = LineReader::new(input);

        loop {
            if prompt {
                write!(out, "{}", PROMPT)?;
                out.flush()?;
            }

            let command = match lines.next_line() {
                Ok(Some(line)) => Command::parse(&line),
                Ok(None) => {
                    debug!("End of input");
                    return Ok(());
                }
                // the bad bytes were consumed up to the newline
                Err(Error::Io(ref err)) if err.kind() == io::ErrorKind::InvalidData => {
                    warn!("Unreadable input line: {}", err);
                    Command::Unknown(String::new())
                }
                Err(err) => {
                    warn!("Cannot read input: {}", err);
                    return Err(err);
                }
            };

            if self.execute(command, out)? == Flow::Quit {
                return Ok(());
            }
        }
    }
}

pub fn init_logger(verbose: u64) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut log_builder = env_logger::Builder::new();
    log_builder
        .format(|buf, r| writeln!(buf, "*** {}", r.args()))
        .filter(None, level);

    if let Ok(filters) = std::env::var("RUST_LOG") {
        log_builder.parse_filters(&filters);
    }

    if log_builder.try_init().is_err() {
        debug!("Logger already initialised");
    }
}

pub fn run(args: Args) -> Result<()> {
    init_logger(args.verbose);
    debug!("Configuration: {:?}", args.config);

    let interactive = nix::unistd::isatty(nix::libc::STDIN_FILENO).unwrap_or(false);
    let stdin = io::stdin();
    let stderr = io::stderr();

    let mut shell = Shell::new(args.config);
    if interactive {
        match shell.interface() {
            Some(iface) => eprintln!("Working on {}. Type 'help' for commands.", iface),
            None => eprintln!("No interface selected. Type 'help' for commands."),
        }
    }

    shell.run_lines(stdin.lock(), &mut stderr.lock(), interactive)
}

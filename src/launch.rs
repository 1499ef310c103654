//! What to run for each supervised program.

use std::{ffi::CString, fmt, str::FromStr};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::Interface;

/// An executable path followed by its arguments, passed to `execv` verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Launch {
    argv: Vec<String>,
}

impl Launch {
    pub fn new<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        if argv.is_empty() {
            return Err(Error::Launch("nothing to execute".into()));
        }

        if let Some(arg) = argv.iter().find(|arg| arg.contains('\0')) {
            return Err(Error::Launch(format!("argument {:?} contains a NUL byte", arg)));
        }

        Ok(Self { argv })
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Path and argument vector as C strings, ready for `execv`.
    pub(crate) fn to_c_strings(&self) -> Result<(CString, Vec<CString>)> {
        let argv = self
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| Error::Launch(err.to_string()))?;
        Ok((argv[0].clone(), argv))
    }
}

impl fmt::Display for Launch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

/// The three programs the shell knows how to run.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Program {
    Supplicant,
    Gui,
    Dhcp,
}

impl Program {
    pub const ALL: [Program; 3] = [Program::Supplicant, Program::Gui, Program::Dhcp];

    pub const fn name(self) -> &'static str {
        match self {
            Program::Supplicant => "wpa_supplicant",
            Program::Gui => "wpa_gui",
            Program::Dhcp => "dhclient",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Program {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wpa" | "supplicant" | "wpa_supplicant" => Ok(Program::Supplicant),
            "gui" | "wpa_gui" => Ok(Program::Gui),
            "dhcp" | "dhclient" => Ok(Program::Dhcp),
            other => Err(format!("unknown program '{}'", other)),
        }
    }
}

/// Builds the launch specification of each program from the configuration.
#[derive(Clone, Debug)]
pub struct LaunchTable {
    config: Config,
}

impl LaunchTable {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn launch(&self, program: Program, interface: &Interface) -> Result<Launch> {
        let config = &self.config;
        let iface = interface.as_str();

        let mut argv: Vec<String> = match program {
            Program::Supplicant => vec![
                config.supplicant.display().to_string(),
                "-i".into(),
                iface.into(),
                "-c".into(),
                config.supplicant_config.display().to_string(),
            ],
            Program::Gui => vec![config.gui.display().to_string(), "-i".into(), iface.into()],
            // -d keeps dhclient in the foreground, so the slot tracks it
            Program::Dhcp => vec![config.dhcp.display().to_string(), "-d".into(), iface.into()],
        };

        if let (Program::Supplicant, Some(driver)) = (program, &config.driver) {
            argv.push("-D".into());
            argv.push(driver.clone());
        }

        debug!("Launch table entry for {}: {:?}", program, argv);
        Launch::new(argv)
    }
}

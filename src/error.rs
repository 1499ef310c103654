use std::{error::Error as StdError, fmt, io};

pub type Result<T> = ::std::result::Result<T, Error>;

pub enum Error {
    Config(String),
    Interface(String),
    Launch(String),
    Io(io::Error),
    Nix(nix::Error),
}

impl StdError for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<nix::Error> for Error {
    fn from(err: nix::Error) -> Self {
        Error::Nix(err)
    }
}

impl Error {
    /// The errno behind this error, if it came from a system call.
    pub fn errno(&self) -> Option<nix::errno::Errno> {
        match self {
            Error::Nix(err) => err.as_errno(),
            Error::Io(err) => err.raw_os_error().map(nix::errno::Errno::from_i32),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} error: {}",
            match self {
                Error::Config(_) => "Config",
                Error::Interface(_) => "Interface",
                Error::Launch(_) => "Launch",
                Error::Io(_) => "I/O",
                Error::Nix(_) => "System",
            },
            match self {
                Error::Config(msg) | Error::Launch(msg) => msg.clone(),
                Error::Interface(name) => format!("invalid interface name '{}'", name),
                Error::Io(err) => err.to_string(),
                Error::Nix(err) => err.to_string(),
            }
        )
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

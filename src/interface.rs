use std::{fmt, str::FromStr};

use crate::error::Error;

/// Longest name the kernel accepts (`IFNAMSIZ` minus the terminating NUL).
pub const MAX_LEN: usize = 15;

/// A validated network interface name, e.g. `wlan0`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Interface(String);

impl Interface {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == ':'
}

impl FromStr for Interface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > MAX_LEN || s == "." || s == ".." || !s.chars().all(is_name_char)
        {
            return Err(Error::Interface(s.into()));
        }

        Ok(Interface(s.into()))
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Configuration for net-access.
//!
//! The [`Config`] struct is not constructable, use [`ConfigBuilder`].
//!
//! # Examples
//!
//! ```
//! # use net_access::config::ConfigBuilder;
//! ConfigBuilder::default()
//!     .supplicant_config("/etc/wpa_supplicant/wpa_supplicant-wlan0.conf")
//!     .interface("wlan0".parse::<net_access::interface::Interface>().expect("bad name"))
//!     .build()
//!     .expect("mission failed");
//! ```

use std::path::PathBuf;

use crate::interface::Interface;

/// Paths and options for the supervised programs.
#[derive(Builder, Clone, Debug)]
#[builder(setter(into, strip_option))]
#[builder(build_fn(validate = "Self::validate"))]
#[non_exhaustive]
pub struct Config {
    /// The supplicant daemon executable.
    #[builder(default = "PathBuf::from(\"/sbin/wpa_supplicant\")")]
    pub supplicant: PathBuf,
    /// Configuration file handed to the supplicant with `-c`.
    #[builder(default = "PathBuf::from(\"/etc/wpa_supplicant/wpa_supplicant.conf\")")]
    pub supplicant_config: PathBuf,
    /// Driver backend handed to the supplicant with `-D`, if any.
    #[builder(default)]
    pub driver: Option<String>,
    /// The monitoring GUI executable.
    #[builder(default = "PathBuf::from(\"/usr/sbin/wpa_gui\")")]
    pub gui: PathBuf,
    /// The DHCP client executable.
    #[builder(default = "PathBuf::from(\"/sbin/dhclient\")")]
    pub dhcp: PathBuf,
    /// Interface selected at startup.
    #[builder(default)]
    pub interface: Option<Interface>,
    /// Leave running programs alone when the shell quits.
    #[builder(default)]
    pub keep_running: bool,
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let executables = [
            ("supplicant", &self.supplicant),
            ("gui", &self.gui),
            ("dhcp", &self.dhcp),
        ];

        for (name, path) in &executables {
            if let Some(path) = path {
                if !path.is_absolute() {
                    return Err(format!(
                        "{} path must be absolute, got '{}'",
                        name,
                        path.display()
                    ));
                }
            }
        }

        if let Some(Some(driver)) = &self.driver {
            if driver.is_empty() {
                return Err("driver must not be empty".into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigBuilder;
    use std::path::Path;

    #[test]
    fn defaults() {
        let config = ConfigBuilder::default().build().expect("defaults are valid");
        assert_eq!(config.supplicant, Path::new("/sbin/wpa_supplicant"));
        assert_eq!(config.dhcp, Path::new("/sbin/dhclient"));
        assert_eq!(config.driver, None);
        assert_eq!(config.interface, None);
        assert!(!config.keep_running);
    }

    #[test]
    fn relative_executable_is_rejected() {
        let err = ConfigBuilder::default()
            .dhcp("dhclient")
            .build()
            .expect_err("relative path accepted");
        assert!(err.contains("dhcp path must be absolute"), "{}", err);
    }

    #[test]
    fn empty_driver_is_rejected() {
        assert!(ConfigBuilder::default().driver("").build().is_err());
    }
}

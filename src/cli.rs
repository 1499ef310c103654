use clap::{App, Arg, ArgMatches};

use crate::config::{Config, ConfigBuilder};
use crate::error::{Error, Result};
use crate::interface::Interface;

#[derive(Debug)]
pub struct Args {
    pub config: Config,
    pub verbose: u64,
}

pub fn app() -> App<'static, 'static> {
    App::new("net-access")
        .version(crate_version!())
        .about("Start, watch and stop wpa_supplicant, wpa_gui and dhclient from a prompt")
        .arg(Arg::with_name("interface")
                 .help("Network interface to work on, e.g. wlan0")
                 .short("i")
                 .long("interface")
                 .takes_value(true)
                 .value_name("name"))
        .arg(Arg::with_name("supplicant")
                 .help("Path to wpa_supplicant [default: /sbin/wpa_supplicant]")
                 .long("supplicant")
                 .takes_value(true)
                 .value_name("path"))
        .arg(Arg::with_name("supplicant-config")
                 .help("Configuration file for wpa_supplicant [default: /etc/wpa_supplicant/wpa_supplicant.conf]")
                 .short("c")
                 .long("supplicant-config")
                 .takes_value(true)
                 .value_name("file"))
        .arg(Arg::with_name("driver")
                 .help("Driver backend for wpa_supplicant, e.g. nl80211")
                 .short("D")
                 .long("driver")
                 .takes_value(true)
                 .value_name("name"))
        .arg(Arg::with_name("gui")
                 .help("Path to wpa_gui [default: /usr/sbin/wpa_gui]")
                 .long("gui")
                 .takes_value(true)
                 .value_name("path"))
        .arg(Arg::with_name("dhclient")
                 .help("Path to dhclient [default: /sbin/dhclient]")
                 .long("dhclient")
                 .takes_value(true)
                 .value_name("path"))
        .arg(Arg::with_name("keep-running")
                 .help("Leave running programs alone on quit instead of stopping them")
                 .short("k")
                 .long("keep-running"))
        .arg(Arg::with_name("verbose")
                 .help("Print diagnostics to stderr, repeat for more")
                 .short("v")
                 .long("verbose")
                 .multiple(true))
}

pub fn get_args() -> Result<Args> {
    args_from(&app().get_matches())
}

pub fn args_from(args: &ArgMatches) -> Result<Args> {
    let mut builder = ConfigBuilder::default();

    if let Some(name) = args.value_of("interface") {
        builder.interface(name.parse::<Interface>()?);
    }
    if let Some(path) = args.value_of("supplicant") {
        builder.supplicant(path);
    }
    if let Some(path) = args.value_of("supplicant-config") {
        builder.supplicant_config(path);
    }
    if let Some(driver) = args.value_of("driver") {
        builder.driver(driver);
    }
    if let Some(path) = args.value_of("gui") {
        builder.gui(path);
    }
    if let Some(path) = args.value_of("dhclient") {
        builder.dhcp(path);
    }
    builder.keep_running(args.is_present("keep-running"));

    let config = builder.build().map_err(Error::Config)?;

    Ok(Args {
        config,
        verbose: args.occurrences_of("verbose"),
    })
}

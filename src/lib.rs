//! net-access: the library
//!
//! This is the library behind the `net-access` shell, which starts, watches
//! and stops `wpa_supplicant`, `wpa_gui` and `dhclient` for one network
//! interface. The heart of it is the [`supervisor`]: three operations over a
//! [`slot::Slot`] that holds the pid of at most one child process.
//!
//! The library is Unix-only, as it is built on fork, execv, waitpid and kill.

#![forbid(
    clippy::pedantic,
    clippy::nursery,
    deprecated,
    rustdoc::broken_intra_doc_links,
    clippy::unwrap_used,
)]
#![deny(unsafe_code, clippy::missing_const_for_fn)]

#[macro_use]
extern crate clap;
#[macro_use]
extern crate derive_builder;
#[macro_use]
extern crate log;

pub mod cli;
pub mod config;
pub mod error;
pub mod interface;
pub mod launch;
pub mod line;
pub mod process;
pub mod run;
pub mod slot;
pub mod supervisor;

pub use run::run;

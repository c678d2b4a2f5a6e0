// Paw Extension Installer — engine layer
// Everything with side effects: filesystem, subprocesses, config loading.

pub mod config;
pub mod installer;

//! Interactive SSH host picker.
//!
//! Reads the SSH client config, lets the user pick a host in a terminal list,
//! then runs `ssh` (or `zzh connect`) with its output copied into a session log.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod host_list;
pub mod models;
pub mod ssh_config;
pub mod ssh_service;
pub mod ui;

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ssh-selector", version, about = "Pick a host from your SSH config and connect")]
pub struct Cli {
    /// Connect through the zzh panel instead of running ssh directly
    #[arg(long = "zzh")]
    pub zzh: bool,

    /// zzh panel ID (only used with --zzh)
    #[arg(long = "panel-id", value_name = "ID")]
    pub panel_id: Option<String>,

    /// Session log file path
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// SSH client config to read instead of the configured one
    #[arg(long = "ssh-config", value_name = "PATH")]
    pub ssh_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Native,
    Delegated,
}

/// Everything the run needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: LaunchMode,
    pub panel_id: Option<String>,
    pub log_file: Option<PathBuf>,
    pub ssh_config_path: PathBuf,
    pub ssh_program: String,
    pub delegate_program: String,
    pub term: String,
    pub session_log_dir: PathBuf,
}

impl Settings {
    pub fn new(cli: Cli, config: AppConfig) -> Self {
        let mode = if cli.zzh {
            LaunchMode::Delegated
        } else {
            LaunchMode::Native
        };
        Self {
            mode,
            panel_id: cli.panel_id.filter(|id| !id.is_empty()),
            log_file: cli.log_file,
            ssh_config_path: cli
                .ssh_config
                .unwrap_or_else(|| PathBuf::from(config.ssh_config_path)),
            ssh_program: config.ssh_program,
            delegate_program: config.delegate_program,
            term: config.term,
            session_log_dir: PathBuf::from(config.session_log_dir),
        }
    }

    /// Program the launcher will run for the current mode.
    pub fn program(&self) -> &str {
        match self.mode {
            LaunchMode::Native => &self.ssh_program,
            LaunchMode::Delegated => &self.delegate_program,
        }
    }

    /// Path of the application's own tracing log.
    pub fn app_log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => {
                let mut name = path.clone().into_os_string();
                name.push(".app.log");
                PathBuf::from(name)
            }
            None => PathBuf::from("ssh_selector.log"),
        }
    }
}

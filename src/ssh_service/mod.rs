mod invocation;
mod session;
mod signals;
mod tee;

pub use invocation::Invocation;
pub use session::{Output, Session};
pub use signals::SignalSource;
pub use tee::{SharedWriter, TeeWriter};

use crate::cli::{LaunchMode, Settings};
use crate::error::LaunchError;
use crate::models::HostRecord;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Runs the selected host through ssh or the zzh panel.
pub struct SessionLauncher<'a> {
    settings: &'a Settings,
}

impl<'a> SessionLauncher<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    pub fn invocation(&self, host: &HostRecord) -> Invocation {
        match self.settings.mode {
            LaunchMode::Native => {
                Invocation::native(host, &self.settings.ssh_program, &self.settings.term)
            }
            LaunchMode::Delegated => Invocation::delegated(
                host,
                &self.settings.delegate_program,
                self.settings.panel_id.as_deref(),
                &self.settings.term,
            ),
        }
    }

    /// `--log-file` if given, else a per-host name stamped to the second.
    pub fn log_path(&self, host: &HostRecord, now: DateTime<Local>) -> PathBuf {
        if let Some(path) = &self.settings.log_file {
            return path.clone();
        }
        let safe_name: String = host
            .name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.settings.session_log_dir.join(format!(
            "ssh_session_{}_{}.log",
            safe_name,
            now.format("%Y%m%d-%H%M%S")
        ))
    }

    fn label(&self, host: &HostRecord) -> String {
        match self.settings.mode {
            LaunchMode::Native => host.name.clone(),
            LaunchMode::Delegated => format!("{} via zzh panel", host.name),
        }
    }

    /// Blocks until the session ends. Signals received meanwhile go to the child.
    pub async fn launch(&self, host: &HostRecord) -> Result<(), LaunchError> {
        let log_path = self.log_path(host, Local::now());
        tracing::info!("Launching {:?} session for {}", self.settings.mode, host.name);

        let signals = SignalSource::os()?;
        Session::new(self.invocation(host), log_path, self.label(host))
            .run(signals)
            .await
    }
}

/// Locates `program` the way a shell would, through `PATH` unless it
/// already contains a path separator.
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = full.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn settings(mode: LaunchMode, log_file: Option<&str>) -> Settings {
        let config = AppConfig::default();
        Settings {
            mode,
            panel_id: Some("panel-1".to_string()),
            log_file: log_file.map(PathBuf::from),
            ssh_config_path: PathBuf::from(config.ssh_config_path),
            ssh_program: config.ssh_program,
            delegate_program: config.delegate_program,
            term: config.term,
            session_log_dir: PathBuf::from("/var/log/sessions"),
        }
    }

    fn host() -> HostRecord {
        HostRecord {
            name: "web".to_string(),
            hostname: "web.example.com".to_string(),
            user: "alice".to_string(),
            port: "22".to_string(),
            identity_file: "/home/alice/.ssh/id_rsa".to_string(),
        }
    }

    #[test]
    fn generated_log_name_has_host_and_timestamp() {
        let settings = settings(LaunchMode::Native, None);
        let launcher = SessionLauncher::new(&settings);
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        assert_eq!(
            launcher.log_path(&host(), now),
            PathBuf::from("/var/log/sessions/ssh_session_web_20240309-140507.log")
        );
    }

    #[test]
    fn log_file_override_wins() {
        let settings = settings(LaunchMode::Native, Some("/tmp/custom.log"));
        let launcher = SessionLauncher::new(&settings);
        assert_eq!(
            launcher.log_path(&host(), Local::now()),
            PathBuf::from("/tmp/custom.log")
        );
    }

    #[test]
    fn mode_selects_invocation() {
        let native = settings(LaunchMode::Native, None);
        let invocation = SessionLauncher::new(&native).invocation(&host());
        assert_eq!(invocation.program, "ssh");
        assert_eq!(invocation.args.first().map(String::as_str), Some("-t"));

        let delegated = settings(LaunchMode::Delegated, None);
        let launcher = SessionLauncher::new(&delegated);
        let invocation = launcher.invocation(&host());
        assert_eq!(invocation.program, "zzh");
        assert_eq!(invocation.args, vec!["connect", "web", "--panel-id", "panel-1"]);
        assert_eq!(launcher.label(&host()), "web via zzh panel");
    }

    #[cfg(unix)]
    #[test]
    fn resolves_programs_on_path() {
        assert!(resolve_program("sh").is_some());
        assert!(resolve_program("definitely-not-a-real-program-xyz").is_none());
        assert_eq!(resolve_program("/bin/sh"), Some(PathBuf::from("/bin/sh")));
    }
}

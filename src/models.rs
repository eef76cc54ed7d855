/// Port assumed when a host does not declare one.
pub const DEFAULT_PORT: &str = "22";

/// A connectable host from the SSH config with every field resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub name: String,
    pub hostname: String,
    pub user: String,
    pub port: String,
    pub identity_file: String,
}

impl HostRecord {
    pub fn title(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> String {
        format!("{}@{}:{}", self.user, self.hostname, self.port)
    }

    pub fn filter_value(&self) -> &str {
        &self.name
    }

    /// `user@hostname`, the destination argument for ssh.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.hostname)
    }
}

use crate::error::ConfigError;
use crate::models::{HostRecord, DEFAULT_PORT};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_INCLUDE_DEPTH: usize = 5;

#[derive(Debug, Clone)]
struct HostBlock {
    patterns: Vec<String>,
    // Keys are stored lowercased.
    options: Vec<(String, String)>,
    implicit: bool,
}

impl HostBlock {
    fn implicit() -> Self {
        Self {
            patterns: vec!["*".to_string()],
            options: Vec::new(),
            implicit: true,
        }
    }

    fn matches(&self, alias: &str) -> bool {
        self.implicit || match_pattern_list(&self.patterns, alias)
    }
}

/// Parsed SSH client configuration.
///
/// Lines before the first `Host` directive belong to an implicit block that
/// matches every alias, as in OpenSSH.
#[derive(Debug, Clone)]
pub struct SshConfig {
    blocks: Vec<HostBlock>,
    home: PathBuf,
}

impl SshConfig {
    pub fn load(path: &Path, home: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path, home)
    }

    pub fn parse(content: &str, path: &Path, home: &Path) -> Result<Self, ConfigError> {
        let mut config = Self {
            blocks: vec![HostBlock::implicit()],
            home: home.to_path_buf(),
        };
        config.parse_into(content, path, 0)?;
        Ok(config)
    }

    fn parse_into(&mut self, content: &str, path: &Path, depth: usize) -> Result<(), ConfigError> {
        let parse_error = |line: usize, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            line,
            message,
        };

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            let (keyword, value) = split_keyword(line);
            let key = keyword.to_lowercase();
            if value.is_empty() {
                return Err(parse_error(line_no, format!("missing argument for {}", keyword)));
            }

            match key.as_str() {
                "host" => {
                    let patterns = split_args(value).map_err(|m| parse_error(line_no, m))?;
                    if patterns.is_empty() {
                        return Err(parse_error(line_no, "Host requires a pattern".to_string()));
                    }
                    if patterns.iter().any(String::is_empty) {
                        return Err(parse_error(line_no, "empty Host pattern".to_string()));
                    }
                    self.blocks.push(HostBlock {
                        patterns,
                        options: Vec::new(),
                        implicit: false,
                    });
                }
                "match" => {
                    return Err(parse_error(
                        line_no,
                        "Match directive is not supported".to_string(),
                    ));
                }
                "include" => {
                    if depth >= MAX_INCLUDE_DEPTH {
                        return Err(parse_error(
                            line_no,
                            format!("Include nested deeper than {} levels", MAX_INCLUDE_DEPTH),
                        ));
                    }
                    let targets = split_args(value).map_err(|m| parse_error(line_no, m))?;
                    for target in targets {
                        let files =
                            self.include_files(&target).map_err(|m| parse_error(line_no, m))?;
                        for file in files {
                            tracing::debug!("Including SSH config {:?}", file);
                            let included = fs::read_to_string(&file).map_err(|source| {
                                ConfigError::Io {
                                    path: file.clone(),
                                    source,
                                }
                            })?;
                            self.parse_into(&included, &file, depth + 1)?;
                        }
                    }
                }
                _ => {
                    let value = unquote(value).map_err(|m| parse_error(line_no, m))?;
                    if value.is_empty() {
                        return Err(parse_error(line_no, format!("missing argument for {}", keyword)));
                    }
                    if key == "port" && !is_valid_port(&value) {
                        return Err(parse_error(line_no, format!("invalid port {:?}", value)));
                    }
                    if let Some(block) = self.blocks.last_mut() {
                        block.options.push((key, value));
                    }
                }
            }
        }
        Ok(())
    }

    /// Files named by one `Include` argument, sorted. Relative paths are
    /// taken from `~/.ssh`; a pattern matching nothing is skipped.
    fn include_files(&self, target: &str) -> Result<Vec<PathBuf>, String> {
        let pattern = if let Some(rest) = target.strip_prefix("~/") {
            format!("{}/{}", glob::Pattern::escape(&self.home.to_string_lossy()), rest)
        } else if Path::new(target).is_absolute() {
            target.to_string()
        } else {
            let ssh_dir = self.home.join(".ssh");
            format!("{}/{}", glob::Pattern::escape(&ssh_dir.to_string_lossy()), target)
        };

        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        let entries = glob::glob_with(&pattern, options)
            .map_err(|e| format!("invalid Include pattern {:?}: {}", target, e))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Error reading Include pattern {:?}: {}", target, e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        if files.is_empty() {
            tracing::warn!("Included SSH config {:?} matched no files, skipping", target);
        }
        Ok(files)
    }

    /// Host patterns in file order, excluding the implicit global block.
    pub fn host_patterns(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(|b| !b.implicit)
            .flat_map(|b| b.patterns.iter().map(String::as_str))
    }

    /// First value of `key` among all blocks matching `alias`.
    pub fn get(&self, alias: &str, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.blocks
            .iter()
            .filter(|b| b.matches(alias))
            .find_map(|b| {
                b.options
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.as_str())
            })
    }
}

/// Loads selectable hosts from an SSH config file.
#[derive(Debug, Clone)]
pub struct HostLoader {
    config_path: PathBuf,
    home: PathBuf,
    user: String,
}

impl HostLoader {
    pub fn new(config_path: PathBuf, home: PathBuf, user: String) -> Self {
        Self {
            config_path,
            home,
            user,
        }
    }

    /// Uses the home directory and login name of the current process.
    pub fn from_env(config_path: PathBuf) -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(Self::new(config_path, home, whoami::username()))
    }

    pub fn load_hosts(&self) -> Result<Vec<HostRecord>, ConfigError> {
        let config = SshConfig::load(&self.config_path, &self.home)?;
        let hosts = resolve_hosts(&config, &self.home, &self.user);
        tracing::info!(
            "Loaded {} hosts from SSH config {:?}",
            hosts.len(),
            self.config_path
        );
        Ok(hosts)
    }
}

/// Turns every literal host alias into a fully resolved record.
pub fn resolve_hosts(config: &SshConfig, home: &Path, user: &str) -> Vec<HostRecord> {
    config
        .host_patterns()
        .filter(|pattern| !has_wildcard(pattern) && !pattern.starts_with('!'))
        .map(|name| {
            let hostname = config.get(name, "HostName").unwrap_or(name);
            let user = config.get(name, "User").unwrap_or(user);
            let port = config.get(name, "Port").unwrap_or(DEFAULT_PORT);
            let identity_file = match config.get(name, "IdentityFile") {
                Some(path) => expand_tilde(path, home),
                None => home.join(".ssh").join("id_rsa").to_string_lossy().into_owned(),
            };

            HostRecord {
                name: name.to_string(),
                hostname: hostname.to_string(),
                user: user.to_string(),
                port: port.to_string(),
                identity_file,
            }
        })
        .collect()
}

/// Replaces a leading `~` with the home directory.
pub fn expand_tilde(path: &str, home: &Path) -> String {
    if path == "~" {
        home.to_string_lossy().into_owned()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest).to_string_lossy().into_owned()
    } else {
        path.to_string()
    }
}

pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn is_valid_port(value: &str) -> bool {
    matches!(value.parse::<u16>(), Ok(port) if port != 0)
}

// `Key value`, `Key=value` and `Key = value` are all accepted.
fn split_keyword(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let keyword = &line[..end];
    let mut rest = line[end..].trim_start();
    if let Some(stripped) = rest.strip_prefix('=') {
        rest = stripped.trim_start();
    }
    (keyword, rest.trim_end())
}

// An unquoted `#` at the start of a word begins a comment.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut word_start = true;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes && word_start => return &line[..idx],
            _ => {}
        }
        word_start = c.is_whitespace();
    }
    line
}

fn split_args(value: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in value.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if pending {
        args.push(current);
    }
    Ok(args)
}

fn unquote(value: &str) -> Result<String, String> {
    match value.strip_prefix('"') {
        Some(inner) => inner
            .strip_suffix('"')
            .map(str::to_string)
            .ok_or_else(|| "unterminated quoted string".to_string()),
        None => Ok(value.to_string()),
    }
}

fn match_pattern_list(patterns: &[String], alias: &str) -> bool {
    let alias = alias.to_lowercase();
    let mut matched = false;
    for pattern in patterns {
        let pattern = pattern.to_lowercase();
        if let Some(negated) = pattern.strip_prefix('!') {
            if wildcard_match(negated, &alias) {
                return false;
            }
        } else if wildcard_match(&pattern, &alias) {
            matched = true;
        }
    }
    matched
}

/// Host pattern match supporting `*` (any run) and `?` (any single char).
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

use std::{path::PathBuf, time::Duration};

pub const DEFAULT_DIRECTORY: &str = "./policies";
pub const DEFAULT_SUFFIX: &str = "perm";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where policy files live and how often to look at them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub directory: PathBuf,
    /// File extension, without the dot.
    pub suffix: String,
    pub poll_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            suffix: DEFAULT_SUFFIX.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WatchConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::default().directory(directory)
    }

    /// Defaults overridden by `SQLGUARD_POLICY_DIR`, `SQLGUARD_POLICY_SUFFIX`
    /// and `SQLGUARD_POLL_INTERVAL_MS`. Unusable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup("SQLGUARD_POLICY_DIR").filter(|v| !v.is_empty()) {
            config.directory = dir.into();
        }
        if let Some(suffix) = lookup("SQLGUARD_POLICY_SUFFIX")
            .map(|v| v.trim_start_matches('.').to_string())
            .filter(|v| !v.is_empty())
        {
            config.suffix = suffix;
        }
        if let Some(ms) = lookup("SQLGUARD_POLL_INTERVAL_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
        {
            config.poll_interval = Duration::from_millis(ms);
        }
        config
    }

    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

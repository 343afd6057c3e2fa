//! Keeps a [`PolicyRegistry`] in sync with a directory of policy files.
//!
//! `alice.perm` is published as identity `alice`; `.perm` (or a file named
//! just `perm`) is the default policy. The directory is polled, and a file is
//! considered changed when its modification time or length differs from the
//! previous pass.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use tokio::task::JoinHandle;

use crate::{config::WatchConfig, error::WatchError, registry::PolicyRegistry, validator::Policy};

/// What one scan did to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyEvent {
    Created(String),
    Modified(String),
    Removed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: Option<SystemTime>,
    len: u64,
}

#[derive(Debug, Clone)]
struct Tracked {
    identity: String,
    stamp: Stamp,
}

pub struct PolicyWatcher {
    config: WatchConfig,
    registry: Arc<PolicyRegistry>,
    known: HashMap<PathBuf, Tracked>,
}

impl PolicyWatcher {
    pub fn new(config: WatchConfig, registry: Arc<PolicyRegistry>) -> Self {
        Self {
            config,
            registry,
            known: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<PolicyRegistry> {
        &self.registry
    }

    /// Initial pass: publish every policy file found.
    pub fn load(&mut self) -> Result<Vec<PolicyEvent>, WatchError> {
        log::info!(
            "loading policies from {} (*.{})",
            self.config.directory.display(),
            self.config.suffix
        );
        self.scan()
    }

    /// Compare the directory against the previous pass and apply the difference.
    ///
    /// Files that cannot be read are skipped and retried on the next pass.
    pub fn scan(&mut self) -> Result<Vec<PolicyEvent>, WatchError> {
        let listing = self.listing()?;
        let mut events = Vec::new();

        let mut gone: Vec<PathBuf> = self
            .known
            .keys()
            .filter(|path| !listing.contains_key(*path))
            .cloned()
            .collect();
        gone.sort();
        for path in gone {
            if let Some(tracked) = self.known.remove(&path) {
                self.registry.remove_configuration(&tracked.identity);
                log::info!("policy {:?} removed", tracked.identity);
                events.push(PolicyEvent::Removed(tracked.identity));
            }
        }

        let mut present: Vec<(PathBuf, Tracked)> = listing.into_iter().collect();
        present.sort_by(|a, b| a.0.cmp(&b.0));
        for (path, tracked) in present {
            let previous = self.known.get(&path).map(|known| known.stamp);
            if previous == Some(tracked.stamp) {
                continue;
            }
            let policy = match Policy::from_file(&path) {
                Ok(policy) => policy,
                Err(e) => {
                    log::warn!("{e}");
                    continue;
                }
            };
            self.registry.add_configuration(&tracked.identity, policy);
            let identity = tracked.identity.clone();
            self.known.insert(path, tracked);
            if previous.is_some() {
                log::info!("policy {identity:?} reloaded");
                events.push(PolicyEvent::Modified(identity));
            } else {
                log::info!("policy {identity:?} loaded");
                events.push(PolicyEvent::Created(identity));
            }
        }
        Ok(events)
    }

    /// Poll forever on the current tokio runtime.
    ///
    /// Directory errors are logged and retried; the loop only ends if a scan
    /// panics or the handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        let interval = self.config.poll_interval;
        log::info!(
            "watching {} every {:?}",
            self.config.directory.display(),
            interval
        );
        tokio::spawn(async move {
            let mut watcher = self;
            loop {
                tokio::time::sleep(interval).await;
                let scanned = tokio::task::spawn_blocking(move || {
                    let outcome = watcher.scan();
                    (watcher, outcome)
                })
                .await;
                let outcome = match scanned {
                    Ok((returned, outcome)) => {
                        watcher = returned;
                        outcome
                    }
                    Err(e) => {
                        log::error!("{}", WatchError::from(e));
                        return;
                    }
                };
                if let Err(e) = outcome {
                    log::warn!("{e}");
                }
            }
        })
    }

    fn listing(&self) -> Result<HashMap<PathBuf, Tracked>, WatchError> {
        let directory = &self.config.directory;
        let entries = fs::read_dir(directory).map_err(|source| WatchError::Directory {
            path: directory.clone(),
            source,
        })?;

        let mut listing = HashMap::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping entry of {}: {e}", directory.display());
                    continue;
                }
            };
            let path = entry.path();
            let Some(identity) = file_identity(&path, &self.config.suffix) else {
                continue;
            };
            match entry.metadata() {
                Ok(meta) if meta.is_file() => {
                    let stamp = Stamp {
                        modified: meta.modified().ok(),
                        len: meta.len(),
                    };
                    listing.insert(path, Tracked { identity, stamp });
                }
                Ok(_) => {}
                Err(e) => log::warn!("cannot stat {}: {e}", path.display()),
            }
        }
        Ok(listing)
    }
}

/// Identity a policy file publishes, or `None` for unrelated files.
fn file_identity(path: &Path, suffix: &str) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if name == suffix {
        return Some(String::new());
    }
    name.strip_suffix(suffix)?
        .strip_suffix('.')
        .map(str::to_string)
}

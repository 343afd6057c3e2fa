pub mod check;
pub mod config;
pub mod error;
pub mod extract;
pub mod grammar;
pub mod operator;
pub mod registry;
pub mod rule;
pub mod statement;
pub mod validator;
pub mod watcher;

use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::task::JoinHandle;

pub use config::WatchConfig;
pub use error::{Error, LoadError, Result, WatchError};
pub use grammar::PolicyCompiler;
pub use operator::ComparisonOperator;
pub use registry::PolicyRegistry;
pub use statement::{Statement, StatementKind};
pub use validator::Policy;
pub use watcher::{PolicyEvent, PolicyWatcher};

static REGISTRY: Lazy<Arc<PolicyRegistry>> = Lazy::new(|| Arc::new(PolicyRegistry::new()));

/// The process-wide registry used by [`validate`] and [`watch`].
pub fn registry() -> Arc<PolicyRegistry> {
    Arc::clone(&REGISTRY)
}

/// Authorize `sql` for `identity`; the statement comes back untouched.
pub fn validate<'a>(identity: &str, sql: &'a str) -> Result<&'a str> {
    REGISTRY.resolve(identity, sql)
}

/// Load `config.directory` into the process-wide registry and keep it in sync.
///
/// Must be called from within a tokio runtime.
pub fn watch(config: WatchConfig) -> std::result::Result<JoinHandle<()>, WatchError> {
    let mut watcher = PolicyWatcher::new(config, registry());
    watcher.load()?;
    Ok(watcher.spawn())
}

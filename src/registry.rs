use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{error::Result, validator::Policy};

type Snapshot = Arc<HashMap<String, Arc<Policy>>>;

/// Policies by identity.
///
/// Identities are `/`-separated paths. A statement from `team/alice` is
/// checked against `team/alice`, else `team`, else the default policy stored
/// under the empty identity. With no default, statements pass unchecked.
///
/// Readers take a snapshot and release the lock before validating; writers
/// publish a whole new map, so a reader sees either the old or the new policy
/// of an identity and never a mix.
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    policies: RwLock<Snapshot>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Snapshot {
        self.policies.read().clone()
    }

    /// Publish `policy` for `identity`, replacing any previous one.
    pub fn add_configuration(&self, identity: &str, policy: Policy) {
        let policy = Arc::new(policy);
        let mut guard = self.policies.write();
        let mut next = (**guard).clone();
        next.insert(identity.to_string(), policy);
        *guard = Arc::new(next);
        log::debug!("published policy for {identity:?}");
    }

    /// Remove `identity` and everything nested beneath it.
    ///
    /// The empty identity only ever names the default policy.
    pub fn remove_configuration(&self, identity: &str) {
        let mut guard = self.policies.write();
        let nested = format!("{identity}/");
        let next: HashMap<_, _> = guard
            .iter()
            .filter(|(key, _)| {
                let doomed = key.as_str() == identity
                    || (!identity.is_empty() && key.starts_with(&nested));
                !doomed
            })
            .map(|(key, policy)| (key.clone(), Arc::clone(policy)))
            .collect();
        if next.len() != guard.len() {
            log::debug!(
                "removed {} policies under {identity:?}",
                guard.len() - next.len()
            );
            *guard = Arc::new(next);
        }
    }

    /// The policy `identity` resolves to, if any.
    pub fn policy_for(&self, identity: &str) -> Option<Arc<Policy>> {
        let snapshot = self.snapshot();
        candidates(identity).find_map(|candidate| snapshot.get(candidate).cloned())
    }

    /// Published identities in sorted order; the default shows up as `""`.
    pub fn identities(&self) -> Vec<String> {
        let mut identities: Vec<String> = self.snapshot().keys().cloned().collect();
        identities.sort();
        identities
    }

    /// Validate `sql` for `identity`, returning it unchanged when allowed.
    pub fn resolve<'a>(&self, identity: &str, sql: &'a str) -> Result<&'a str> {
        let Some(policy) = self.policy_for(identity) else {
            log::debug!("no policy for {identity:?}, statement passes unchecked");
            return Ok(sql);
        };
        let verdict = policy.validate(sql);
        if let Err(e) = &verdict {
            log::debug!("rejected statement for {identity:?}: {e}");
        }
        verdict
    }
}

/// `a/b/c`, `a/b`, `a`, then the default `""`.
fn candidates(identity: &str) -> impl Iterator<Item = &str> {
    let prefixes = std::iter::successors(
        (!identity.is_empty()).then_some(identity),
        |&current| current.rfind('/').map(|i| &current[..i]),
    );
    prefixes.chain(std::iter::once(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn registry(entries: &[(&str, &str)]) -> PolicyRegistry {
        let registry = PolicyRegistry::new();
        for (identity, source) in entries {
            registry.add_configuration(identity, Policy::compile(source));
        }
        registry
    }

    #[test]
    fn candidate_order() {
        assert_eq!(
            candidates("a/b/c").collect::<Vec<_>>(),
            vec!["a/b/c", "a/b", "a", ""]
        );
        assert_eq!(candidates("").collect::<Vec<_>>(), vec![""]);
    }

    #[test]
    fn hierarchical_resolution() {
        let registry = registry(&[("a", "select x from t"), ("a/b", "select y from t")]);
        assert_eq!(registry.resolve("a/b/c", "select y from t"), Ok("select y from t"));
        assert_eq!(
            registry.resolve("a/b/c", "select x from t"),
            Err(Error::AspectViolation("Fields [x] cannot be queried".into()))
        );
        assert_eq!(registry.resolve("a/z", "select x from t"), Ok("select x from t"));
        assert!(registry.resolve("a", "select y from t").is_err());
    }

    #[test]
    fn default_policy_and_open_fallback() {
        let registry = registry(&[("a", "select * from t")]);
        // Nothing applies, so even garbage passes unparsed.
        assert_eq!(registry.resolve("other", "garbage"), Ok("garbage"));

        registry.add_configuration("", Policy::compile("delete from t"));
        assert!(matches!(
            registry.resolve("other", "select * from t"),
            Err(Error::StatementNotAllowed(_))
        ));
        assert_eq!(registry.resolve("", "delete from t"), Ok("delete from t"));
        assert!(matches!(
            registry.resolve("other", "garbage"),
            Err(Error::UnparsableStatement(_))
        ));
    }

    #[test]
    fn removal_cascades_to_nested_identities() {
        let registry = registry(&[
            ("", "select * from *"),
            ("a", "select * from *"),
            ("a/b", "select * from *"),
            ("ab", "select * from *"),
        ]);
        registry.remove_configuration("a");
        assert_eq!(registry.identities(), vec!["", "ab"]);

        registry.remove_configuration("");
        assert_eq!(registry.identities(), vec!["ab"]);
    }

    #[test]
    fn republish_replaces() {
        let registry = registry(&[("a", "select x from t")]);
        registry.add_configuration("a", Policy::compile("select y from t"));
        assert!(registry.resolve("a", "select y from t").is_ok());
        assert!(registry.resolve("a", "select x from t").is_err());
        assert_eq!(registry.identities(), vec!["a"]);
    }

    #[test]
    fn concurrent_readers_see_whole_policies() {
        let registry = Arc::new(registry(&[("a", "select x from t\nselect * from u")]));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        // Exactly one of the two policies is visible at a time.
                        let policy = registry.policy_for("a").expect("published");
                        let x = policy.validate("select x from t").is_ok();
                        let y = policy.validate("select y from t").is_ok();
                        assert_ne!(x, y);
                        assert!(registry.resolve("a", "select * from u").is_ok());
                    }
                })
            })
            .collect();
        for i in 0..200 {
            let source = if i % 2 == 0 {
                "select y from t\nselect * from u"
            } else {
                "select x from t\nselect * from u"
            };
            registry.add_configuration("a", Policy::compile(source));
        }
        for reader in readers {
            reader.join().expect("reader thread");
        }
    }
}

use std::collections::HashMap;

/// Source of environment variables.
///
/// Production code reads the process environment, tests hand in a map.
pub trait EnvLookup: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;

    /// Value of `key` when set and not empty
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

//! Reporter trait for dependency injection
//!
//! Lets the engine report progress without knowing how the terminal
//! renders it.

use pluto_schema::ReverseMapKey;

pub trait Reporter: Send + Sync {
    /// A new phase has started (e.g. "Resolving", "Installing").
    fn section(&self, title: &str);

    fn info(&self, msg: &str);

    fn success(&self, msg: &str);

    fn warning(&self, msg: &str);

    fn error(&self, msg: &str);

    /// A target was served from the module cache.
    fn cache_hit(&self, key: &ReverseMapKey);

    /// A target was written into the module cache for the first time.
    fn cached(&self, key: &ReverseMapKey, revision: &str);

    /// A target was copied into the project.
    fn installed(&self, key: &ReverseMapKey, revision: &str);

    /// A target was removed from the project.
    fn removed(&self, key: &ReverseMapKey);

    /// Display a final summary of multiple operations.
    fn summary(&self, count: usize, action: &str, elapsed_secs: f64);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
    fn cache_hit(&self, key: &ReverseMapKey) {
        (**self).cache_hit(key);
    }
    fn cached(&self, key: &ReverseMapKey, revision: &str) {
        (**self).cached(key, revision);
    }
    fn installed(&self, key: &ReverseMapKey, revision: &str) {
        (**self).installed(key, revision);
    }
    fn removed(&self, key: &ReverseMapKey) {
        (**self).removed(key);
    }
    fn summary(&self, count: usize, action: &str, elapsed_secs: f64) {
        (**self).summary(count, action, elapsed_secs);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
    fn cache_hit(&self, _: &ReverseMapKey) {}
    fn cached(&self, _: &ReverseMapKey, _: &str) {}
    fn installed(&self, _: &ReverseMapKey, _: &str) {}
    fn removed(&self, _: &ReverseMapKey) {}
    fn summary(&self, _: usize, _: &str, _: f64) {}
}

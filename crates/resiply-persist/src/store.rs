use crate::error::Result;

/// Durable string key/value surface that survives restarts.
///
/// Every key has exactly one owning component; implementations need not
/// coordinate concurrent writers to the same key.
pub trait LocalStore: Send + Sync {
    /// Raw value for `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

//! Pluggable credential storage. The client persists exactly two entries — the
//! bearer token and an advisory cache of the last known user — under fixed
//! keys that survive restarts. The trait surface is infallible: absence is a
//! normal outcome and clearing a missing key is a no-op.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "mentis_token";

/// Storage key for the serialized user cache.
pub const USER_KEY: &str = "mentis_user";

/// Durable key-value storage for credentials.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored value, or `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Overwrites the value unconditionally.
    fn set(&self, key: &str, value: &str);

    /// Removes the value; removing an absent key is a no-op.
    fn clear(&self, key: &str);
}
